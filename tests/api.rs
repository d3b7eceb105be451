use std::path::PathBuf;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use valkyrie_rs::{
    api_router,
    config::Config,
    source::store::DataStore,
    state::AppState,
    types::workout::{RawInterval, RawWorkout, RawWorkoutDetail, ResultsPage},
};

struct TestApp {
    router: Router,
    root: PathBuf,
}

fn interval_workout(id: u64, user_id: u64, interval_time: u32) -> RawWorkout {
    RawWorkout {
        id: Some(id),
        user_id: Some(user_id),
        machine: Some("rower".to_string()),
        workout_type: Some("FixedDistanceInterval".to_string()),
        distance: Some(4000),
        time: Some(interval_time * 4),
        date: Some("2024-03-01 07:30:00".to_string()),
        stroke_rate: Some(30),
        stroke_count: None,
        workout: Some(RawWorkoutDetail {
            intervals: vec![
                RawInterval {
                    distance: Some(1000),
                    time: Some(interval_time),
                };
                4
            ],
        }),
    }
}

fn test_app(name: &str) -> TestApp {
    let root = std::env::temp_dir().join(format!("valkyrie-api-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(&root).expect("root");

    let roster = json!([
        {"id": 10, "name": "Anna Berg"},
        {"id": 11, "name": "Carl Dahl", "novice": true}
    ]);
    std::fs::write(root.join("athletes.json"), roster.to_string()).expect("roster");

    let store = DataStore::new(root.join("data"));
    store
        .save_results(10, &ResultsPage { data: vec![interval_workout(1, 10, 2100)] })
        .expect("results");
    store
        .save_results(11, &ResultsPage { data: vec![interval_workout(2, 11, 2000)] })
        .expect("results");

    let mut config = Config::from_env();
    config.data_dir = root.join("data");
    config.reports_dir = root.join("reports");
    config.roster_path = root.join("athletes.json");
    config.api_root = "http://127.0.0.1:9".to_string();

    TestApp {
        router: api_router().with_state(AppState::new(config)),
        root,
    }
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(uri).method(method);
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = router
        .clone()
        .oneshot(request.body(body).expect("request"))
        .await
        .expect("response");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

#[tokio::test]
async fn lists_the_category_catalog() {
    let app = test_app("categories");

    let (status, body) = send(&app.router, "GET", "/api/categories", None).await;

    assert_eq!(status, StatusCode::OK);
    let slugs: Vec<&str> = body
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|c| c["slug"].as_str())
        .collect();
    assert_eq!(
        slugs,
        vec!["peak_power", "1min", "1k", "2k", "6k", "hour", "4x1k", "3x6k", "3x12min", "3x30min"]
    );
    assert_eq!(body[0]["kind"], "peak_power");
    assert_eq!(body[0]["needs_strokes"], true);
}

#[tokio::test]
async fn ranks_stored_results() {
    let app = test_app("ranking");

    let (status, body) = send(&app.router, "GET", "/api/rankings/4x1k", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "4x1k");
    assert_eq!(body["header"].as_array().expect("header").len(), 10);
    let rows = body["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Dahl, Carl");
    assert_eq!(rows[0]["split"], "1:40.0");
    assert_eq!(rows[1]["name"], "Berg, Anna");
    assert!(body.get("strokes").is_none());
}

#[tokio::test]
async fn unknown_category_is_not_found() {
    let app = test_app("unknown-category");

    let (status, body) = send(&app.router, "GET", "/api/rankings/marathon", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().expect("error").contains("marathon"));
}

#[tokio::test]
async fn missing_strokes_are_reported() {
    let app = test_app("missing-strokes");
    let store = DataStore::new(app.root.join("data"));
    let mut piece = interval_workout(3, 10, 2000);
    piece.workout_type = Some("FixedDistanceSplits".to_string());
    piece.distance = Some(2000);
    piece.workout = None;
    store
        .save_results(10, &ResultsPage { data: vec![piece] })
        .expect("results");

    let (status, body) = send(&app.router, "GET", "/api/rankings/2k", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().expect("error").contains("stroke"));
}

#[tokio::test]
async fn report_is_written_as_csv() {
    let app = test_app("report");

    let (status, body) = send(&app.router, "POST", "/api/rankings/4x1k/report", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], 2);
    let path = body["path"].as_str().expect("path");
    assert!(path.ends_with("_4x1k.csv"));
    let csv = std::fs::read_to_string(path).expect("csv");
    assert!(csv.starts_with("Name,Bike,Date,Avg Split,Watts,SPM,Split 1"));
    assert!(app.root.join("reports").is_dir());
}

#[tokio::test]
async fn athletes_can_be_managed() {
    let app = test_app("athletes");

    let (status, body) = send(&app.router, "GET", "/api/athletes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("athletes").len(), 2);

    let (status, body) = send(
        &app.router,
        "PUT",
        "/api/athletes/12",
        Some(json!({"name": "Eva  Fors", "lightweight": true})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Eva Fors");
    assert_eq!(body["lightweight"], true);

    let (status, _) = send(
        &app.router,
        "PUT",
        "/api/athletes/12",
        Some(json!({"name": "Eva Fors Lind"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app.router, "GET", "/api/athletes/12", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Eva Fors Lind");

    let saved = std::fs::read_to_string(app.root.join("athletes.json")).expect("roster");
    assert!(saved.contains("Eva Fors Lind"));

    let (status, _) = send(&app.router, "DELETE", "/api/athletes/12", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app.router, "DELETE", "/api/athletes/12", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn athlete_needs_first_and_last_name() {
    let app = test_app("bad-name");

    let (status, body) = send(
        &app.router,
        "PUT",
        "/api/athletes/12",
        Some(json!({"name": "Eva"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn athlete_workouts_come_from_the_store() {
    let app = test_app("athlete-workouts");

    let (status, body) = send(&app.router, "GET", "/api/athletes/10/workouts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["athlete"]["name"], "Anna Berg");
    assert_eq!(body["workouts"].as_array().expect("workouts").len(), 1);

    let (status, _) = send(&app.router, "GET", "/api/athletes/99/workouts", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn personal_bests_are_kept_per_category() {
    let app = test_app("personal-bests");

    let (status, body) = send(
        &app.router,
        "PUT",
        "/api/athletes/10/pbs/2K",
        Some(json!({"value": " 7:05.3 "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["personal_bests"]["2k"], "7:05.3");

    // Renaming the athlete keeps the recorded bests.
    let (status, _) = send(
        &app.router,
        "PUT",
        "/api/athletes/10",
        Some(json!({"name": "Anna Berg Ek"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app.router, "GET", "/api/athletes/10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["personal_bests"]["2k"], "7:05.3");

    let (status, body) = send(&app.router, "GET", "/api/pbs", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().expect("personal bests");
    assert_eq!(entries.len(), 2);
    let anna = entries.iter().find(|entry| entry["id"] == 10).expect("athlete 10");
    assert_eq!(anna["personal_bests"]["2k"], "7:05.3");
    let carl = entries.iter().find(|entry| entry["id"] == 11).expect("athlete 11");
    assert_eq!(carl["personal_bests"], json!({}));

    let saved = std::fs::read_to_string(app.root.join("athletes.json")).expect("roster");
    assert!(saved.contains("7:05.3"));

    let (status, _) = send(
        &app.router,
        "PUT",
        "/api/athletes/10/pbs/5k",
        Some(json!({"value": "18:00.0"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app.router,
        "PUT",
        "/api/athletes/99/pbs/2k",
        Some(json!({"value": "7:00.0"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app.router,
        "PUT",
        "/api/athletes/10/pbs/2k",
        Some(json!({"value": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sync_requires_a_bearer_token() {
    let app = test_app("sync");

    let (status, body) = send(&app.router, "POST", "/api/sync", Some(json!({"days": 7}))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().expect("error").contains("Bearer"));
}

#[tokio::test]
async fn sync_reports_per_athlete_failures() {
    let app = test_app("sync-failures");

    let request = Request::builder()
        .uri("/api/sync")
        .method("POST")
        .header("authorization", "Bearer test-token")
        .header("content-type", "application/json")
        .body(Body::from(json!({"days": 3}).to_string()))
        .expect("request");
    let response = app.router.clone().oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body["requested"], 2);
    assert_eq!(body["succeeded"], 0);
    assert_eq!(body["failures"].as_array().expect("failures").len(), 2);
}
