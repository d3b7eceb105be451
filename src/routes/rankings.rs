use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, SourceError},
    pipeline::{categorize, rank::Ranker},
    routes::bearer_token,
    source::{
        concept2::{StrokeRequest, SyncReport},
        report::report_name,
        store::DataStore,
        ReportWriter, WorkoutSource,
    },
    state::AppState,
    types::{
        category::{Category, CATALOG},
        ranking::RankingTable,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_categories))
        .route("/api/rankings/:category", get(ranking))
        .route("/api/rankings/:category/report", post(save_report))
}

#[derive(Debug, Deserialize, Default)]
struct RankingQuery {
    bikes: Option<bool>,
}

#[derive(Debug, Serialize)]
struct CategorySummary {
    #[serde(flatten)]
    category: Category,
    header: Vec<String>,
    split_columns: usize,
    needs_strokes: bool,
}

#[derive(Debug, Serialize)]
struct RankingResponse {
    #[serde(flatten)]
    table: RankingTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    strokes: Option<SyncReport>,
}

#[derive(Debug, Serialize)]
struct ReportResponse {
    category: String,
    rows: usize,
    path: String,
}

async fn list_categories() -> Json<Vec<CategorySummary>> {
    Json(
        CATALOG
            .iter()
            .map(|category| CategorySummary {
                category: *category,
                header: category.header(),
                split_columns: category.split_columns(),
                needs_strokes: categorize::needs_strokes(category),
            })
            .collect(),
    )
}

async fn ranking(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<RankingQuery>,
    headers: HeaderMap,
) -> Result<Json<RankingResponse>, AppError> {
    let (table, strokes) = run_ranking(&state, &slug, query, &headers).await?;
    Ok(Json(RankingResponse { table, strokes }))
}

async fn save_report(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<RankingQuery>,
    headers: HeaderMap,
) -> Result<Json<ReportResponse>, AppError> {
    let (table, _) = run_ranking(&state, &slug, query, &headers).await?;
    let destination = report_name(&table.category, Local::now().date_naive());
    let rows = table.rows.len();
    let category = table.category.clone();

    let writer = state.reports();
    let path = tokio::task::spawn_blocking(move || writer.emit(&table, &destination))
        .await
        .map_err(|err| AppError::Internal(format!("Report task failed: {}", err)))??;

    Ok(Json(ReportResponse { category, rows, path }))
}

/// Ranks `slug` against the stored results. With a bearer token, stroke files
/// the category needs are downloaded first.
async fn run_ranking(
    state: &AppState,
    slug: &str,
    query: RankingQuery,
    headers: &HeaderMap,
) -> Result<(RankingTable, Option<SyncReport>), AppError> {
    let category = *Category::find(slug)
        .ok_or_else(|| AppError::NotFound(format!("Unknown category {}", slug)))?;
    let include_bikes = query.bikes.unwrap_or(state.config().include_bikes);

    let strokes = match bearer_token(headers) {
        Some(token) if categorize::needs_strokes(&category) => {
            let store = state.store().clone();
            let requests = tokio::task::spawn_blocking(move || {
                missing_strokes(&store, &category, include_bikes)
            })
            .await
            .map_err(|err| AppError::Internal(format!("Stroke scan failed: {}", err)))??;

            let client = state.logbook()?;
            Some(client.prefetch_strokes(&token, requests, state.store()).await)
        }
        _ => None,
    };

    let store = state.store().clone();
    let roster = state.roster_handle();
    let table = tokio::task::spawn_blocking(move || {
        Ranker::new(&store, roster.as_ref(), include_bikes).rank_source(&category, &store)
    })
    .await
    .map_err(|err| AppError::Internal(format!("Ranking task failed: {}", err)))??;

    Ok((table, strokes))
}

/// Workouts in `category` whose strokes are not stored yet.
fn missing_strokes(
    store: &DataStore,
    category: &Category,
    include_bikes: bool,
) -> Result<Vec<StrokeRequest>, SourceError> {
    let mut requests = Vec::new();
    for raw in store.workouts()? {
        let Ok(record) = raw?.validate() else {
            continue;
        };
        if categorize::matches(category, &record, include_bikes) && !store.has_strokes(record.id) {
            requests.push(StrokeRequest {
                user_id: record.user_id,
                workout_id: record.id,
            });
        }
    }
    tracing::debug!("{} workouts in {} need strokes", requests.len(), category.slug);
    Ok(requests)
}
