//! Downloaded logbook data on disk.
//!
//! ```text
//! {root}/results/{athlete_id}.json   {"data": [workout, ...]}
//! {root}/strokes/{workout_id}.json   {"data": [stroke, ...]}
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::SourceError;
use crate::source::{StrokeSource, WorkoutIter, WorkoutSource};
use crate::types::workout::{RawStroke, RawWorkout, ResultsPage, StrokePage, WorkoutRecord};

#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn results_dir(&self) -> PathBuf {
        self.root.join("results")
    }

    pub fn strokes_dir(&self) -> PathBuf {
        self.root.join("strokes")
    }

    fn results_path(&self, athlete_id: u64) -> PathBuf {
        self.results_dir().join(format!("{}.json", athlete_id))
    }

    fn strokes_path(&self, workout_id: u64) -> PathBuf {
        self.strokes_dir().join(format!("{}.json", workout_id))
    }

    pub fn save_results(&self, athlete_id: u64, page: &ResultsPage) -> Result<(), SourceError> {
        write_json(&self.results_path(athlete_id), page)
    }

    pub fn save_strokes(&self, workout_id: u64, page: &StrokePage) -> Result<(), SourceError> {
        write_json(&self.strokes_path(workout_id), page)
    }

    pub fn has_strokes(&self, workout_id: u64) -> bool {
        self.strokes_path(workout_id).is_file()
    }

    /// Deletes every stored stroke file. Returns how many were removed.
    pub fn clear_strokes(&self) -> Result<usize, SourceError> {
        let mut removed = 0;
        for path in json_files(&self.strokes_dir())? {
            fs::remove_file(&path)?;
            removed += 1;
        }
        tracing::info!("Removed {} stored stroke files", removed);
        Ok(removed)
    }
}

impl WorkoutSource for DataStore {
    fn workouts(&self) -> Result<WorkoutIter<'_>, SourceError> {
        let files = json_files(&self.results_dir())?;
        Ok(Box::new(StoredWorkouts {
            files: files.into_iter(),
            current: Vec::new().into_iter(),
        }))
    }

    fn athlete_workouts(&self, athlete_id: u64) -> Result<Vec<RawWorkout>, SourceError> {
        let path = self.results_path(athlete_id);
        if !path.is_file() {
            return Err(SourceError::NotFound(athlete_id));
        }
        Ok(read_json::<ResultsPage>(&path)?.data)
    }
}

impl StrokeSource for DataStore {
    fn strokes(&self, workout: &WorkoutRecord) -> Result<Vec<RawStroke>, SourceError> {
        let path = self.strokes_path(workout.id);
        if !path.is_file() {
            return Err(SourceError::MissingStrokes(workout.id));
        }
        Ok(read_json::<StrokePage>(&path)?.data)
    }
}

/// Reads one athlete's file at a time, in file-name order.
struct StoredWorkouts {
    files: std::vec::IntoIter<PathBuf>,
    current: std::vec::IntoIter<RawWorkout>,
}

impl Iterator for StoredWorkouts {
    type Item = Result<RawWorkout, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(workout) = self.current.next() {
                return Some(Ok(workout));
            }
            let path = self.files.next()?;
            match read_json::<ResultsPage>(&path) {
                Ok(page) => self.current = page.data.into_iter(),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|source| SourceError::Decode {
        path: path.display().to_string(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SourceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| SourceError::Decode {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, bytes)?;
    Ok(())
}
