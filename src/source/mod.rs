pub mod concept2;
pub mod report;
pub mod roster;
pub mod store;

use crate::error::{ReportError, SourceError};
use crate::types::ranking::RankingTable;
use crate::types::workout::{RawStroke, RawWorkout, WorkoutRecord};

pub type WorkoutIter<'a> = Box<dyn Iterator<Item = Result<RawWorkout, SourceError>> + 'a>;

/// Workout records for every athlete. `workouts` may be called again for
/// each ranking run and starts over from the beginning.
pub trait WorkoutSource {
    fn workouts(&self) -> Result<WorkoutIter<'_>, SourceError>;

    fn athlete_workouts(&self, athlete_id: u64) -> Result<Vec<RawWorkout>, SourceError>;
}

pub trait StrokeSource {
    fn strokes(&self, workout: &WorkoutRecord) -> Result<Vec<RawStroke>, SourceError>;
}

pub trait AthleteDirectory {
    fn lookup_name(&self, athlete_id: u64) -> Result<String, SourceError>;
}

pub trait ReportWriter {
    /// Writes `table` under `destination` and returns where it ended up.
    fn emit(&self, table: &RankingTable, destination: &str) -> Result<String, ReportError>;
}
