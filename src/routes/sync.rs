use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use chrono::{Duration, Local};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    routes::bearer_token,
    source::concept2::SyncReport,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/sync", post(sync_results))
}

#[derive(Debug, Deserialize, Default)]
struct SyncRequest {
    days: Option<u32>,
    /// Restricts the download to these athletes; defaults to the whole roster.
    athletes: Option<Vec<u64>>,
    #[serde(default)]
    clear_strokes: bool,
}

#[derive(Debug, Serialize)]
struct SyncResponse {
    from: String,
    cleared_strokes: usize,
    #[serde(flatten)]
    report: SyncReport,
}

async fn sync_results(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Option<Json<SyncRequest>>,
) -> Result<Json<SyncResponse>, AppError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::Unauthorized("Missing Concept2 Bearer token".to_string()))?;
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();

    let days = payload.days.unwrap_or(state.config().lookback_days);
    let from = Local::now()
        .date_naive()
        .checked_sub_signed(Duration::days(days as i64))
        .ok_or_else(|| AppError::BadRequest(format!("Cannot look back {} days", days)))?;

    let athletes = match payload.athletes {
        Some(ids) => {
            if let Some(unknown) = ids.iter().find(|id| state.roster().get(**id).is_none()) {
                return Err(AppError::NotFound(format!("Athlete {} is not on the roster", unknown)));
            }
            ids
        }
        None => state.roster().ids(),
    };
    if athletes.is_empty() {
        return Err(AppError::BadRequest("The roster is empty".to_string()));
    }

    let cleared_strokes = if payload.clear_strokes {
        state.store().clear_strokes()?
    } else {
        0
    };

    tracing::info!(
        "Downloading results since {} for {} athletes",
        from,
        athletes.len()
    );
    let client = state.logbook()?;
    let report = client
        .sync_results(&token, athletes, from, state.store())
        .await;

    Ok(Json(SyncResponse {
        from: from.format("%Y-%m-%d").to_string(),
        cleared_strokes,
        report,
    }))
}
