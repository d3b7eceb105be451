use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::pipeline::convert;

/// Bike distances count half towards rowing-equivalent distance.
pub const BIKE_DISTANCE_FACTOR: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineType {
    Rower,
    Bike,
    SkiErg,
    Other,
}

impl MachineType {
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "rower" => MachineType::Rower,
            "bike" => MachineType::Bike,
            "skierg" => MachineType::SkiErg,
            _ => MachineType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MachineType::Rower => "rower",
            MachineType::Bike => "bike",
            MachineType::SkiErg => "skierg",
            MachineType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkoutType {
    JustRow,
    FixedDistanceSplits,
    FixedTimeSplits,
    FixedCalorie,
    FixedDistanceInterval,
    FixedTimeInterval,
    FixedCalorieInterval,
    VariableInterval,
    VariableIntervalUndefinedRest,
    Other(String),
}

impl WorkoutType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "JustRow" => WorkoutType::JustRow,
            "FixedDistanceSplits" => WorkoutType::FixedDistanceSplits,
            "FixedTimeSplits" => WorkoutType::FixedTimeSplits,
            "FixedCalorie" => WorkoutType::FixedCalorie,
            "FixedDistanceInterval" => WorkoutType::FixedDistanceInterval,
            "FixedTimeInterval" => WorkoutType::FixedTimeInterval,
            "FixedCalorieInterval" => WorkoutType::FixedCalorieInterval,
            "VariableInterval" => WorkoutType::VariableInterval,
            "VariableIntervalUndefinedRest" => WorkoutType::VariableIntervalUndefinedRest,
            other => WorkoutType::Other(other.to_string()),
        }
    }
}

/// One workout as the logbook API returns it. Every field is optional here;
/// [`RawWorkout::validate`] decides what a usable record needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawWorkout {
    pub id: Option<u64>,
    pub user_id: Option<u64>,
    #[serde(rename = "type")]
    pub machine: Option<String>,
    pub workout_type: Option<String>,
    pub distance: Option<u32>,
    pub time: Option<u32>,
    pub date: Option<String>,
    pub stroke_rate: Option<u32>,
    pub stroke_count: Option<u32>,
    pub workout: Option<RawWorkoutDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawWorkoutDetail {
    #[serde(default)]
    pub intervals: Vec<RawInterval>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInterval {
    pub distance: Option<u32>,
    pub time: Option<u32>,
}

/// A page of results (`{"data": [...]}`), as stored per athlete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsPage {
    #[serde(default)]
    pub data: Vec<RawWorkout>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub distance_m: u32,
    pub time_tenths: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: u64,
    pub user_id: u64,
    pub machine: MachineType,
    pub workout_type: WorkoutType,
    pub distance_m: u32,
    pub time_tenths: u32,
    pub date: NaiveDate,
    pub stroke_rate: Option<u32>,
    pub stroke_count: Option<u32>,
    pub intervals: Vec<Interval>,
}

impl WorkoutRecord {
    pub fn is_bike(&self) -> bool {
        self.machine == MachineType::Bike
    }

    pub fn rower_equivalent_distance(&self) -> f64 {
        rower_equivalent(self.machine, self.distance_m as f64)
    }

    /// Average stroke rate, falling back to stroke count per minute.
    pub fn average_stroke_rate(&self) -> Option<u32> {
        if let Some(rate) = self.stroke_rate {
            return Some(rate);
        }
        let count = self.stroke_count?;
        let minutes = self.time_tenths as f64 / 600.0;
        if minutes <= 0.0 {
            return None;
        }
        Some((count as f64 / minutes).floor() as u32)
    }
}

pub fn rower_equivalent(machine: MachineType, distance: f64) -> f64 {
    match machine {
        MachineType::Bike => distance / BIKE_DISTANCE_FACTOR as f64,
        _ => distance,
    }
}

impl RawWorkout {
    pub fn label(&self) -> String {
        self.id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "<no id>".to_string())
    }

    pub fn validate(&self) -> Result<WorkoutRecord, DataError> {
        let label = self.label();
        let missing = |field: &'static str| DataError::MissingField {
            workout: label.clone(),
            field,
        };

        let id = self.id.ok_or_else(|| missing("id"))?;
        let user_id = self.user_id.ok_or_else(|| missing("user_id"))?;
        let machine = self.machine.as_deref().ok_or_else(|| missing("type"))?;
        let workout_type = self
            .workout_type
            .as_deref()
            .ok_or_else(|| missing("workout_type"))?;
        let distance_m = self.distance.ok_or_else(|| missing("distance"))?;
        let time_tenths = self.time.ok_or_else(|| missing("time"))?;
        let raw_date = self.date.as_deref().ok_or_else(|| missing("date"))?;

        let date = raw_date
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
            .ok_or_else(|| DataError::InvalidField {
                workout: label.clone(),
                field: "date",
                value: raw_date.to_string(),
            })?;

        let intervals = match &self.workout {
            Some(detail) => detail
                .intervals
                .iter()
                .map(|interval| {
                    Ok(Interval {
                        distance_m: interval
                            .distance
                            .ok_or_else(|| missing("workout.intervals.distance"))?,
                        time_tenths: interval
                            .time
                            .ok_or_else(|| missing("workout.intervals.time"))?,
                    })
                })
                .collect::<Result<Vec<_>, DataError>>()?,
            None => Vec::new(),
        };

        Ok(WorkoutRecord {
            id,
            user_id,
            machine: MachineType::from_tag(machine),
            workout_type: WorkoutType::from_tag(workout_type),
            distance_m,
            time_tenths,
            date,
            stroke_rate: self.stroke_rate,
            stroke_count: self.stroke_count,
            intervals,
        })
    }
}

/// One stroke as the logbook API returns it (`t`, `d`, `p`, `spm`, `hr`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStroke {
    pub t: Option<u32>,
    pub d: Option<u32>,
    pub p: Option<u32>,
    pub spm: Option<u32>,
    pub hr: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrokePage {
    #[serde(default)]
    pub data: Vec<RawStroke>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeSample {
    /// Elapsed time in tenths of a second.
    pub time_tenths: u32,
    /// Cumulative distance in decimetres.
    pub distance_dm: u32,
    /// Stroke pace in tenths of a second per 500 m.
    pub pace_tenths: Option<u32>,
    pub stroke_rate: Option<u32>,
}

impl StrokeSample {
    pub fn new(time_tenths: u32, distance_dm: u32) -> Self {
        Self {
            time_tenths,
            distance_dm,
            pace_tenths: None,
            stroke_rate: None,
        }
    }

    pub fn rower_equivalent(self, machine: MachineType) -> Self {
        match machine {
            MachineType::Bike => Self {
                distance_dm: self.distance_dm / BIKE_DISTANCE_FACTOR,
                ..self
            },
            _ => self,
        }
    }

    pub fn watts(&self) -> Option<u32> {
        self.pace_tenths
            .and_then(|pace| convert::watts_for_pace_tenths(pace as u64).ok())
    }
}

impl RawStroke {
    pub fn validate(&self, workout: u64) -> Result<StrokeSample, DataError> {
        let missing = |field: &'static str| DataError::MissingField {
            workout: workout.to_string(),
            field,
        };
        Ok(StrokeSample {
            time_tenths: self.t.ok_or_else(|| missing("strokes.t"))?,
            distance_dm: self.d.ok_or_else(|| missing("strokes.d"))?,
            pace_tenths: self.p,
            stroke_rate: self.spm,
        })
    }
}

pub fn validate_strokes(workout: u64, raw: &[RawStroke]) -> Result<Vec<StrokeSample>, DataError> {
    raw.iter().map(|stroke| stroke.validate(workout)).collect()
}
