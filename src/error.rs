use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FormatError {
    #[error("Invalid name {0:?}: expected at least a first and a last name")]
    InvalidName(String),
    #[error("Invalid split {0:?}: expected M:SS.T")]
    InvalidSplit(String),
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ArithmeticError {
    #[error("Zero-length interpolation interval at {0}")]
    ZeroInterval(f64),
    #[error("Cannot compute a split over a distance of {0} m")]
    NonPositiveDistance(f64),
    #[error("Invalid elapsed time {0}")]
    InvalidTime(f64),
    #[error("Cannot convert {0} W to a split")]
    NonPositivePower(f64),
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DataError {
    #[error("Workout {workout} is missing field `{field}`")]
    MissingField { workout: String, field: &'static str },
    #[error("Workout {workout} has an invalid `{field}`: {value:?}")]
    InvalidField {
        workout: String,
        field: &'static str,
        value: String,
    },
    #[error("Workout {workout} has {found} intervals, expected {expected}")]
    MissingIntervals {
        workout: u64,
        found: usize,
        expected: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Athlete {0} not found")]
    NotFound(u64),
    #[error("Unknown athlete {0}")]
    UnknownAthlete(u64),
    #[error("No stroke data stored for workout {0}")]
    MissingStrokes(u64),
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed JSON in {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Logbook request failed: {0}")]
    Http(String),
    #[error("Logbook returned {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },
    #[error("Logbook rejected the access token")]
    Unauthorized,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Row {row} has {found} cells but the header has {expected}")]
    RowShape {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("Report write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RankError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Rank(#[from] RankError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Source(err) | AppError::Rank(RankError::Source(err)) => source_status(err),
            AppError::Rank(RankError::Format(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Report(_) | AppError::Rank(RankError::Report(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

fn source_status(err: &SourceError) -> StatusCode {
    match err {
        SourceError::NotFound(_)
        | SourceError::UnknownAthlete(_)
        | SourceError::MissingStrokes(_) => StatusCode::NOT_FOUND,
        SourceError::Unauthorized => StatusCode::UNAUTHORIZED,
        SourceError::Http(_) | SourceError::Status { .. } => StatusCode::BAD_GATEWAY,
        SourceError::Io(_) | SourceError::Decode { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
