use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::source::AthleteDirectory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Athlete {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub lightweight: bool,
    #[serde(default)]
    pub novice: bool,
    /// Personal bests as entered by the coach, keyed by category slug.
    #[serde(default)]
    pub personal_bests: BTreeMap<String, String>,
}

/// Athletes whose logbooks are downloaded and ranked, keyed by logbook user id.
/// Changes are written back to `path` when one is set.
pub struct Roster {
    path: Option<PathBuf>,
    athletes: DashMap<u64, Athlete>,
}

impl Roster {
    pub fn new(athletes: impl IntoIterator<Item = Athlete>) -> Self {
        Self {
            path: None,
            athletes: athletes.into_iter().map(|a| (a.id, a)).collect(),
        }
    }

    /// Loads the roster file; a missing file gives an empty roster.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path = path.into();
        let athletes: Vec<Athlete> = if path.is_file() {
            let bytes = fs::read(&path)?;
            serde_json::from_slice(&bytes).map_err(|source| SourceError::Decode {
                path: path.display().to_string(),
                source,
            })?
        } else {
            Vec::new()
        };

        tracing::info!("Loaded {} athletes from {}", athletes.len(), path.display());
        let mut roster = Self::new(athletes);
        roster.path = Some(path);
        Ok(roster)
    }

    pub fn list(&self) -> Vec<Athlete> {
        let mut athletes: Vec<Athlete> = self
            .athletes
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        athletes.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        athletes
    }

    pub fn get(&self, athlete_id: u64) -> Option<Athlete> {
        self.athletes.get(&athlete_id).map(|entry| entry.value().clone())
    }

    pub fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.athletes.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.athletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.athletes.is_empty()
    }

    pub fn upsert(&self, athlete: Athlete) -> Result<(), SourceError> {
        self.athletes.insert(athlete.id, athlete);
        self.persist()
    }

    pub fn remove(&self, athlete_id: u64) -> Result<Option<Athlete>, SourceError> {
        let removed = self.athletes.remove(&athlete_id).map(|(_, athlete)| athlete);
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Records `value` as the athlete's best for `category`. Returns the
    /// updated athlete, or `None` when the id is not on the roster.
    pub fn set_personal_best(
        &self,
        athlete_id: u64,
        category: &str,
        value: String,
    ) -> Result<Option<Athlete>, SourceError> {
        let updated = match self.athletes.get_mut(&athlete_id) {
            Some(mut entry) => {
                entry.personal_bests.insert(category.to_string(), value);
                entry.value().clone()
            }
            None => return Ok(None),
        };
        self.persist()?;
        Ok(Some(updated))
    }

    fn persist(&self) -> Result<(), SourceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(&self.list()).map_err(|source| SourceError::Decode {
            path: path.display().to_string(),
            source,
        })?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

impl AthleteDirectory for Roster {
    fn lookup_name(&self, athlete_id: u64) -> Result<String, SourceError> {
        self.athletes
            .get(&athlete_id)
            .map(|entry| entry.name.clone())
            .ok_or(SourceError::UnknownAthlete(athlete_id))
    }
}
