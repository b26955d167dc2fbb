// tests/metadata_normalize.rs
use noscroll::metadata::{normalize, NormalizedMetadata, MAX_CROSSPOST_DEPTH, WHITELIST};
use serde_json::{json, Value};

fn keys(v: &Value) -> Vec<String> {
    let mut k: Vec<String> = v.as_object().expect("object").keys().cloned().collect();
    k.sort();
    k
}

fn whitelist_sorted() -> Vec<String> {
    let mut k: Vec<String> = WHITELIST.iter().map(|s| s.to_string()).collect();
    k.sort();
    k
}

#[test]
fn exactly_whitelisted_keys_for_any_input() {
    for raw in [
        json!({}),
        json!(null),
        json!(17),
        json!({ "id": "abc", "selftext": "long text", "author": "someone", "ups": 10 }),
        json!({ "preview": null, "media": { "oembed": {} }, "crosspost_parent_list": null }),
    ] {
        let v = serde_json::to_value(normalize(&raw)).unwrap();
        assert_eq!(keys(&v), whitelist_sorted(), "input: {raw}");
    }
}

#[test]
fn nested_ancestors_are_normalized_too() {
    let raw = json!({
        "id": "child",
        "author": "dropped",
        "crosspost_parent_list": [{
            "id": "parent",
            "subreddit": { "display_name": "videos" },
            "link_flair_text": "dropped",
            "media": { "reddit_video": { "fallback_url": "https://v.redd.it/p.mp4" } }
        }]
    });
    let n = normalize(&raw);
    assert_eq!(n.crosspost_parent_list.len(), 1);
    let parent = &n.crosspost_parent_list[0];
    assert_eq!(parent.id.as_deref(), Some("parent"));
    assert_eq!(parent.subreddit.as_deref(), Some("videos"));
    assert_eq!(
        parent.media["reddit_video"]["fallback_url"],
        "https://v.redd.it/p.mp4"
    );

    let v = serde_json::to_value(&n).unwrap();
    assert_eq!(keys(&v["crosspost_parent_list"][0]), whitelist_sorted());
}

#[test]
fn ancestry_depth_is_capped() {
    let mut raw = json!({ "id": "root-most" });
    for i in 0..(MAX_CROSSPOST_DEPTH + 10) {
        raw = json!({ "id": format!("n{i}"), "crosspost_parent_list": [raw] });
    }
    let n = normalize(&raw);
    // The submission plus at most MAX_CROSSPOST_DEPTH ancestors.
    assert_eq!(n.lineage().len(), MAX_CROSSPOST_DEPTH + 1);
}

#[test]
fn stored_metadata_round_trips_through_json() {
    let raw = json!({
        "id": "abc",
        "is_self": false,
        "over_18": true,
        "num_comments": 12,
        "permalink": "/r/rust/comments/abc/x/",
        "subreddit": "rust",
        "preview": { "images": [{ "source": { "url": "https://i.redd.it/a.jpg" } }] }
    });
    let n = normalize(&raw);
    let stored = serde_json::to_string(&n).unwrap();
    let back: NormalizedMetadata = serde_json::from_str(&stored).unwrap();
    assert_eq!(back, n);

    // Rows written before a key existed still load.
    let legacy: NormalizedMetadata = serde_json::from_str(r#"{"id":"old","url":"https://x"}"#).unwrap();
    assert_eq!(legacy.id.as_deref(), Some("old"));
    assert!(legacy.preview.is_null());
}
