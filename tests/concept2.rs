use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde_json::json;
use valkyrie_rs::error::SourceError;
use valkyrie_rs::source::concept2::{AccessToken, LogbookClient, StrokeRequest, MAX_PAGES};
use valkyrie_rs::source::store::DataStore;
use valkyrie_rs::source::WorkoutSource;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        == Some("Bearer good-token")
}

async fn results(State(base): State<String>, Path(id): Path<u64>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id == 404 {
        return (StatusCode::NOT_FOUND, "no such user").into_response();
    }
    // User 500's results page links back to itself.
    let next = if id == 500 {
        format!("{}/api/users/{}/results", base, id)
    } else {
        format!("{}/more/{}", base, id)
    };
    Json(json!({
        "data": [{"id": id * 10, "user_id": id, "type": "rower", "distance": 2000, "time": 4200}],
        "meta": {"pagination": {"links": {"next": next}}}
    }))
    .into_response()
}

async fn more(Path(id): Path<u64>) -> Json<serde_json::Value> {
    Json(json!({
        "data": [{
            "id": id * 10 + 1,
            "user_id": id,
            "type": "bike",
            "distance": 4000,
            "time": 4200
        }],
        "meta": {"pagination": {"links": {}}}
    }))
}

async fn strokes(Path((_user, workout)): Path<(u64, u64)>) -> Json<serde_json::Value> {
    Json(json!({
        "data": [
            {"t": 20, "d": 90, "p": 1100, "spm": 34},
            {"t": 40, "d": 180, "p": 1090, "spm": 35, "hr": 150}
        ],
        "workout": workout
    }))
}

async fn logbook() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let base = format!("http://{}", listener.local_addr().expect("addr"));
    let app = Router::new()
        .route("/api/users/:id/results", get(results))
        .route("/more/:id", get(more))
        .route("/api/users/:user/results/:workout/strokes", get(strokes))
        .with_state(base.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    base
}

fn client(base: &str) -> LogbookClient {
    LogbookClient::new(base, Duration::from_secs(5), 2).expect("client")
}

fn scratch(name: &str) -> DataStore {
    let dir = std::env::temp_dir().join(format!("valkyrie-c2-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    DataStore::new(dir)
}

fn since() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("date")
}

#[tokio::test]
async fn results_follow_pagination_links() {
    let base = logbook().await;
    let token = AccessToken::new("good-token");

    let page = client(&base).fetch_results(&token, 7, since()).await.expect("results");

    let ids: Vec<Option<u64>> = page.data.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![Some(70), Some(71)]);
}

#[tokio::test]
async fn pagination_stops_at_the_page_limit() {
    let base = logbook().await;
    let token = AccessToken::new("good-token");

    let page = client(&base).fetch_results(&token, 500, since()).await.expect("results");

    assert_eq!(page.data.len(), MAX_PAGES);
    assert!(page.data.iter().all(|w| w.id == Some(5000)));
}

#[tokio::test]
async fn rejected_token_is_unauthorized() {
    let base = logbook().await;
    let token = AccessToken::new("bad-token");

    let err = client(&base).fetch_results(&token, 7, since()).await.expect_err("unauthorized");

    assert!(matches!(err, SourceError::Unauthorized));
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let base = logbook().await;
    let token = AccessToken::new("good-token");

    let err = client(&base).fetch_results(&token, 404, since()).await.expect_err("not found");

    assert!(matches!(err, SourceError::NotFound(404)));
}

#[tokio::test]
async fn sync_writes_results_and_collects_failures() {
    let base = logbook().await;
    let token = AccessToken::new("good-token");
    let store = scratch("sync");

    let report = client(&base)
        .sync_results(&token, vec![1, 2, 404], since(), &store)
        .await;

    assert_eq!(report.requested, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].id, 404);
    assert_eq!(store.athlete_workouts(1).expect("stored").len(), 2);
    assert_eq!(store.workouts().expect("workouts").count(), 4);
}

#[tokio::test]
async fn strokes_are_prefetched_into_the_store() {
    let base = logbook().await;
    let token = AccessToken::new("good-token");
    let store = scratch("strokes");
    let requests = vec![
        StrokeRequest { user_id: 1, workout_id: 10 },
        StrokeRequest { user_id: 1, workout_id: 11 },
    ];

    let report = client(&base).prefetch_strokes(&token, requests, &store).await;

    assert_eq!(report.succeeded, 2);
    assert!(store.has_strokes(10));
    assert!(store.has_strokes(11));
}

#[test]
fn token_is_not_printed() {
    let token = AccessToken::new("secret-value");
    assert_eq!(format!("{:?}", token), "AccessToken(***)");
}
