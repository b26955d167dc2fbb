// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /embed
// - POST /submissions
// - GET /scoring/{topic}
// - PUT /users/{user}/seen, POST /users/{user}/seen/lookup

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value as Json};
use std::sync::Arc;
use tower::ServiceExt as _; // for `oneshot`

use noscroll::api::{create_router, AppState};
use noscroll::scoring::{MemoryScoringStore, RelativeScoring, ScoringStore};
use noscroll::seen::MemorySeenStore;

const BODY_LIMIT: usize = 1024 * 1024;

fn test_router(store: Arc<MemoryScoringStore>) -> Router {
    create_router(
        AppState {
            scoring: store,
            seen: Arc::new(MemorySeenStore::new()),
        },
        None,
    )
}

async fn read_json(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn post_json(uri: &str, payload: &Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build request")
}

#[tokio::test]
async fn health_returns_ok() {
    let app = test_router(Arc::new(MemoryScoringStore::new()));
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap().trim(), "OK");
}

#[tokio::test]
async fn embed_endpoint_returns_descriptor_or_null() {
    let app = test_router(Arc::new(MemoryScoringStore::new()));

    let video = json!({
        "media": { "reddit_video": { "fallback_url": "https://v.redd.it/abc.mp4" } },
        "preview": { "images": [{ "source": { "url": "https://i.redd.it/poster.jpg", "width": 640, "height": 360 } }] }
    });
    let resp = app.clone().oneshot(post_json("/embed", &video)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = read_json(resp).await;
    assert_eq!(v["kind"], "video");
    assert_eq!(v["width"], 640);
    assert_eq!(v["video"]["url"], "https://v.redd.it/abc.mp4");

    let selfpost = json!({ "is_self": true, "media": video["media"].clone() });
    let resp = app.oneshot(post_json("/embed", &selfpost)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(read_json(resp).await.is_null());
}

#[tokio::test]
async fn submissions_endpoint_skips_invalid_items() {
    let app = test_router(Arc::new(MemoryScoringStore::new()));
    let payload = json!([
        {
            "id": "abc123",
            "title": "A picture",
            "created_utc": 1700000000,
            "score": 77,
            "subreddit": "pics",
            "num_comments": 3,
            "permalink": "/r/pics/comments/abc123/a_picture/",
            "url": "https://i.redd.it/a.jpg",
            "post_hint": "image",
            "preview": { "images": [{ "source": { "url": "https://i.redd.it/a.jpg", "width": 10, "height": 10 } }] }
        },
        { "title": "no id" }
    ]);

    let resp = app.oneshot(post_json("/submissions", &payload)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = read_json(resp).await;
    let items = v.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "reddit:abc123");
    assert_eq!(items[0]["subreddit"], "pics");
    assert_eq!(items[0]["embed"]["kind"], "image");
}

#[tokio::test]
async fn scoring_lookup_hits_store() {
    let store = Arc::new(MemoryScoringStore::new());
    store
        .upsert(RelativeScoring {
            topic: "rust".into(),
            baseline_score: 812.5,
            last_updated: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        })
        .await
        .unwrap();
    let app = test_router(store);

    let req = Request::builder().uri("/scoring/Rust").body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = read_json(resp).await;
    assert_eq!(v["baseline_score"], 812.5);

    let req = Request::builder().uri("/scoring/unknown").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn seen_state_round_trips_per_user() {
    let app = test_router(Arc::new(MemoryScoringStore::new()));

    let mark = Request::builder()
        .method("PUT")
        .uri("/users/alice/seen")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "ids": ["reddit:a", "hn:1"] }).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(mark).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let query = json!({ "ids": ["hn:1", "reddit:b", "reddit:a"] });
    let resp = app
        .clone()
        .oneshot(post_json("/users/alice/seen/lookup", &query))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["seen"], json!(["hn:1", "reddit:a"]));

    let resp = app
        .oneshot(post_json("/users/bob/seen/lookup", &query))
        .await
        .unwrap();
    assert_eq!(read_json(resp).await["seen"], json!([]));
}
