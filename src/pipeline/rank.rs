//! Builds a category's ranking table from raw workout records.
//!
//! Records that are missing data, or whose numbers cannot be converted, are
//! logged and left out; the run always completes with whatever rows remain.
//! Collaborator failures and malformed athlete names abort the run.

use crate::error::{ArithmeticError, DataError, FormatError, RankError, SourceError};
use crate::pipeline::categorize;
use crate::pipeline::convert::{
    elapsed_to_clock, format_display_name, format_split, split_from_elapsed, watts_from_elapsed,
};
use crate::pipeline::splits::{reconstruct_by_distance, reconstruct_by_time, SplitResult};
use crate::source::{AthleteDirectory, StrokeSource, WorkoutSource};
use crate::types::category::{Category, CategoryKind};
use crate::types::ranking::{Cell, RankingRow, RankingTable};
use crate::types::workout::{
    rower_equivalent, validate_strokes, Interval, RawWorkout, StrokeSample, WorkoutRecord,
};

enum RowFailure {
    Data(DataError),
    Arithmetic(ArithmeticError),
    Fatal(RankError),
}

impl From<DataError> for RowFailure {
    fn from(err: DataError) -> Self {
        RowFailure::Data(err)
    }
}

impl From<ArithmeticError> for RowFailure {
    fn from(err: ArithmeticError) -> Self {
        RowFailure::Arithmetic(err)
    }
}

impl From<SourceError> for RowFailure {
    fn from(err: SourceError) -> Self {
        RowFailure::Fatal(err.into())
    }
}

impl From<FormatError> for RowFailure {
    fn from(err: FormatError) -> Self {
        RowFailure::Fatal(err.into())
    }
}

/// Per-workout summary columns shared by every category except peak power.
struct Summary {
    split: String,
    watts: u32,
    stroke_rate: u32,
    pace_seconds: f64,
}

pub struct Ranker<'a> {
    strokes: &'a dyn StrokeSource,
    directory: &'a dyn AthleteDirectory,
    include_bikes: bool,
}

impl<'a> Ranker<'a> {
    pub fn new(
        strokes: &'a dyn StrokeSource,
        directory: &'a dyn AthleteDirectory,
        include_bikes: bool,
    ) -> Self {
        Self {
            strokes,
            directory,
            include_bikes,
        }
    }

    pub fn rank_source(
        &self,
        category: &Category,
        source: &dyn WorkoutSource,
    ) -> Result<RankingTable, RankError> {
        self.rank(category, source.workouts()?)
    }

    pub fn rank<I>(&self, category: &Category, workouts: I) -> Result<RankingTable, RankError>
    where
        I: IntoIterator<Item = Result<RawWorkout, SourceError>>,
    {
        let mut table = RankingTable::new(category);
        let mut skipped = 0usize;

        for raw in workouts {
            let raw = raw?;
            let record = match raw.validate() {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!("Skipping workout: {}", err);
                    skipped += 1;
                    continue;
                }
            };

            if !categorize::matches(category, &record, self.include_bikes) {
                tracing::debug!(
                    "Workout {} ({}) is not a {} result",
                    record.id,
                    record.machine.as_str(),
                    category.slug
                );
                continue;
            }

            match self.build_row(category, &record) {
                Ok(Some(row)) => table.rows.push(row),
                Ok(None) => {
                    tracing::debug!(
                        "Workout {} has no usable strokes for {}",
                        record.id,
                        category.slug
                    );
                }
                Err(RowFailure::Data(err)) => {
                    tracing::warn!("Skipping workout {}: {}", record.id, err);
                    skipped += 1;
                }
                Err(RowFailure::Arithmetic(err)) => {
                    tracing::warn!("Skipping workout {}: {}", record.id, err);
                    skipped += 1;
                }
                Err(RowFailure::Fatal(err)) => return Err(err),
            }
        }

        table.sort();
        table.check_shape()?;

        tracing::info!(
            "Ranked {} workouts for {} ({} skipped)",
            table.rows.len(),
            category.slug,
            skipped
        );
        Ok(table)
    }

    fn build_row(
        &self,
        category: &Category,
        record: &WorkoutRecord,
    ) -> Result<Option<RankingRow>, RowFailure> {
        let name = format_display_name(&self.directory.lookup_name(record.user_id)?)?;
        let mut row = RankingRow {
            name,
            tag: RankingRow::tag_for(record.is_bike()),
            date: record.date,
            headline: None,
            split: String::new(),
            watts: 0,
            stroke_rate: 0,
            splits: Vec::new(),
            is_bike: record.is_bike(),
            sort_key: 0.0,
        };

        if let CategoryKind::PeakPower { .. } = category.kind {
            let raw = self.strokes.strokes(record)?;
            let samples = validate_strokes(record.id, &raw)?;
            let Some((pace, spm, watts)) = fastest_stroke(record.id, &samples)? else {
                return Ok(None);
            };
            row.split = format_split(pace as u64);
            row.watts = watts;
            row.stroke_rate = spm;
            row.sort_key = pace as f64 / 10.0;
            return Ok(Some(row));
        }

        let summary = summarize(record)?;
        row.split = summary.split;
        row.watts = summary.watts;
        row.stroke_rate = summary.stroke_rate;
        row.sort_key = summary.pace_seconds;

        match category.kind {
            CategoryKind::PeakPower { .. } => {}
            CategoryKind::SingleDistance { step_m, splits, .. } => {
                row.headline = Some(Cell::Text(elapsed_to_clock(record.time_tenths as f64)));
                if splits > 0 {
                    let samples = self.samples(record)?;
                    let result = reconstruct_by_distance(&samples, step_m, splits - 1);
                    row.splits = with_remainder(record.id, result, splits, |accumulated| {
                        split_from_elapsed(record.time_tenths as f64 - accumulated, step_m as f64)
                    });
                }
            }
            CategoryKind::SingleTime {
                step_tenths, splits, ..
            } => {
                row.headline = Some(Cell::Integer(record.distance_m as i64));
                if splits > 0 {
                    let samples = self.samples(record)?;
                    let result = reconstruct_by_time(&samples, step_tenths, splits - 1);
                    let distance = record.rower_equivalent_distance();
                    row.splits = with_remainder(record.id, result, splits, |accumulated| {
                        split_from_elapsed(step_tenths as f64, distance - accumulated)
                    });
                }
            }
            CategoryKind::DistanceIntervals { interval_m, count } => {
                row.splits = intervals(record, count)?
                    .iter()
                    .map(|interval| {
                        split_from_elapsed(interval.time_tenths as f64, interval_m as f64)
                    })
                    .collect::<Result<_, _>>()?;
            }
            CategoryKind::TimeIntervals {
                interval_tenths,
                count,
            } => {
                row.splits = intervals(record, count)?
                    .iter()
                    .map(|interval| {
                        split_from_elapsed(
                            interval_tenths as f64,
                            rower_equivalent(record.machine, interval.distance_m as f64),
                        )
                    })
                    .collect::<Result<_, _>>()?;
            }
        }

        Ok(Some(row))
    }

    /// Validated stroke samples in rower-equivalent distance.
    fn samples(&self, record: &WorkoutRecord) -> Result<Vec<StrokeSample>, RowFailure> {
        let raw = self.strokes.strokes(record)?;
        Ok(validate_strokes(record.id, &raw)?
            .into_iter()
            .map(|sample| sample.rower_equivalent(record.machine))
            .collect())
    }
}

fn summarize(record: &WorkoutRecord) -> Result<Summary, RowFailure> {
    let distance = record.rower_equivalent_distance();
    let time = record.time_tenths as f64;
    let stroke_rate = record.average_stroke_rate().ok_or_else(|| DataError::MissingField {
        workout: record.id.to_string(),
        field: "stroke_rate",
    })?;
    let split = split_from_elapsed(time, distance)?;
    let watts = watts_from_elapsed(time, distance)?;

    Ok(Summary {
        split,
        watts,
        stroke_rate,
        pace_seconds: 500.0 * (time / 10.0) / distance,
    })
}

/// Fastest non-zero stroke pace with its stroke rate and power.
fn fastest_stroke(
    workout: u64,
    strokes: &[StrokeSample],
) -> Result<Option<(u32, u32, u32)>, RowFailure> {
    let missing = |field: &'static str| DataError::MissingField {
        workout: workout.to_string(),
        field,
    };

    let mut best: Option<(u32, u32, &StrokeSample)> = None;
    for stroke in strokes {
        let pace = stroke.pace_tenths.ok_or_else(|| missing("strokes.p"))?;
        let spm = stroke.stroke_rate.ok_or_else(|| missing("strokes.spm"))?;
        if pace == 0 {
            continue;
        }
        if best.map_or(true, |(fastest, _, _)| pace < fastest) {
            best = Some((pace, spm, stroke));
        }
    }

    let Some((pace, spm, stroke)) = best else {
        return Ok(None);
    };
    let watts = stroke
        .watts()
        .ok_or(ArithmeticError::InvalidTime(pace as f64))?;
    Ok(Some((pace, spm, watts)))
}

fn intervals(record: &WorkoutRecord, count: usize) -> Result<&[Interval], DataError> {
    record
        .intervals
        .get(..count)
        .ok_or(DataError::MissingIntervals {
            workout: record.id,
            found: record.intervals.len(),
            expected: count,
        })
}

/// Completes reconstructed splits with the remainder after the last
/// checkpoint. Incomplete reconstructions are padded with blank cells.
fn with_remainder<F>(workout: u64, result: SplitResult, columns: usize, remainder: F) -> Vec<String>
where
    F: FnOnce(f64) -> Result<String, ArithmeticError>,
{
    let complete = result.is_complete(columns - 1);
    let accumulated = result.accumulated;
    let mut splits = result.splits;

    if complete {
        match remainder(accumulated) {
            Ok(split) => splits.push(split),
            Err(err) => tracing::warn!("Workout {}: no final split ({})", workout, err),
        }
    } else {
        tracing::warn!(
            "Workout {}: stroke data covers {} of {} splits",
            workout,
            splits.len(),
            columns
        );
    }

    splits.resize(columns, String::new());
    splits
}
