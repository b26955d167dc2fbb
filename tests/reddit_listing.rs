// tests/reddit_listing.rs
use noscroll::scoring::mean;
use noscroll::scoring::source::parse_listing_scores;

#[test]
fn listing_fixture_yields_scores_in_order() {
    let body: serde_json::Value =
        serde_json::from_str(include_str!("fixtures/reddit_top_listing.json")).expect("fixture");
    let scores = parse_listing_scores(&body);
    // The entry with a null score is skipped
    assert_eq!(scores, vec![1520, 1100, 380]);
    assert_eq!(mean(&scores), Some(1000.0));
}

#[test]
fn unexpected_shapes_yield_no_scores() {
    assert!(parse_listing_scores(&serde_json::json!({ "error": 429 })).is_empty());
    assert!(parse_listing_scores(&serde_json::json!({ "data": { "children": {} } })).is_empty());
}
