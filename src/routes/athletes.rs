use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, SourceError},
    pipeline::convert::format_display_name,
    source::{roster::Athlete, WorkoutSource},
    state::AppState,
    types::{category::Category, workout::RawWorkout},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/athletes", get(list_athletes))
        .route(
            "/api/athletes/:id",
            get(get_athlete).put(put_athlete).delete(delete_athlete),
        )
        .route("/api/athletes/:id/workouts", get(athlete_workouts))
        .route("/api/athletes/:id/pbs/:category", put(put_personal_best))
        .route("/api/pbs", get(list_personal_bests))
}

#[derive(Debug, Deserialize)]
struct AthleteRequest {
    name: String,
    #[serde(default)]
    lightweight: bool,
    #[serde(default)]
    novice: bool,
}

#[derive(Debug, Deserialize)]
struct PersonalBestRequest {
    value: String,
}

#[derive(Debug, Serialize)]
struct PersonalBests {
    id: u64,
    name: String,
    personal_bests: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct AthleteWorkouts {
    athlete: Athlete,
    workouts: Vec<RawWorkout>,
}

async fn list_athletes(State(state): State<AppState>) -> Json<Vec<Athlete>> {
    Json(state.roster().list())
}

async fn get_athlete(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Athlete>, AppError> {
    state
        .roster()
        .get(id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Athlete {}", id)))
}

async fn put_athlete(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<AthleteRequest>,
) -> Result<(StatusCode, Json<Athlete>), AppError> {
    let name = payload.name.split_whitespace().collect::<Vec<_>>().join(" ");
    format_display_name(&name).map_err(|err| AppError::BadRequest(err.to_string()))?;

    let existing = state.roster().get(id);
    let status = if existing.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let athlete = Athlete {
        id,
        name,
        lightweight: payload.lightweight,
        novice: payload.novice,
        personal_bests: existing
            .map(|athlete| athlete.personal_bests)
            .unwrap_or_default(),
    };
    state.roster().upsert(athlete.clone())?;

    tracing::info!("Saved athlete {} ({})", athlete.id, athlete.name);
    Ok((status, Json(athlete)))
}

async fn delete_athlete(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    match state.roster().remove(id)? {
        Some(athlete) => {
            tracing::info!("Removed athlete {} ({})", athlete.id, athlete.name);
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(AppError::NotFound(format!("Athlete {}", id))),
    }
}

async fn athlete_workouts(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<AthleteWorkouts>, AppError> {
    let athlete = state
        .roster()
        .get(id)
        .ok_or(SourceError::UnknownAthlete(id))?;
    let workouts = state.store().athlete_workouts(id)?;
    Ok(Json(AthleteWorkouts { athlete, workouts }))
}

async fn put_personal_best(
    State(state): State<AppState>,
    Path((id, slug)): Path<(u64, String)>,
    Json(payload): Json<PersonalBestRequest>,
) -> Result<Json<Athlete>, AppError> {
    let category = Category::find(&slug)
        .ok_or_else(|| AppError::NotFound(format!("Unknown category {}", slug)))?;
    let value = payload.value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest("Personal best is empty".to_string()));
    }

    let athlete = state
        .roster()
        .set_personal_best(id, category.slug, value.to_string())?
        .ok_or_else(|| AppError::NotFound(format!("Athlete {}", id)))?;

    tracing::info!("Athlete {} {} best is now {}", id, category.slug, value);
    Ok(Json(athlete))
}

async fn list_personal_bests(State(state): State<AppState>) -> Json<Vec<PersonalBests>> {
    Json(
        state
            .roster()
            .list()
            .into_iter()
            .map(|athlete| PersonalBests {
                id: athlete.id,
                name: athlete.name,
                personal_bests: athlete.personal_bests,
            })
            .collect(),
    )
}
