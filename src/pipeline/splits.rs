//! Reconstructs fixed-step splits from a workout's stroke samples.
//!
//! Checkpoints form the sequence `step, 2*step, ...`. Walking the samples in
//! order, a checkpoint is reported when a sample lands exactly on it or past
//! it; in the second case the crossing is interpolated between that sample
//! and the one before it (the first sample is paired with the origin).
//!
//! At most one checkpoint is reported per sample. A sample that jumps over
//! several checkpoints leaves the walk lagging behind the data; this is a
//! known limitation and is not compensated for.

use crate::error::ArithmeticError;
use crate::pipeline::convert::split_from_elapsed;
use crate::pipeline::interpolate::{interpolate_scaled, DISTANCE_SCALE};
use crate::types::workout::StrokeSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoints {
    /// Every `step_m` metres; each split is the time taken for the step.
    Distance { step_m: u32 },
    /// Every `step_tenths`; each split is the pace over the distance covered.
    Time { step_tenths: u32 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitResult {
    pub splits: Vec<String>,
    /// Elapsed tenths (distance checkpoints) or metres (time checkpoints) at
    /// the last reported checkpoint.
    pub accumulated: f64,
}

impl SplitResult {
    pub fn is_complete(&self, count: usize) -> bool {
        self.splits.len() >= count
    }
}

impl Checkpoints {
    fn step(&self) -> u32 {
        match *self {
            Checkpoints::Distance { step_m } => step_m,
            Checkpoints::Time { step_tenths } => step_tenths,
        }
    }

    fn scale(&self) -> f64 {
        match self {
            Checkpoints::Distance { .. } => DISTANCE_SCALE,
            Checkpoints::Time { .. } => 1.0,
        }
    }

    fn coordinate(&self, sample: &StrokeSample) -> f64 {
        match self {
            Checkpoints::Distance { .. } => sample.distance_dm as f64,
            Checkpoints::Time { .. } => sample.time_tenths as f64,
        }
    }

    fn value(&self, sample: &StrokeSample) -> f64 {
        match self {
            Checkpoints::Distance { .. } => sample.time_tenths as f64,
            Checkpoints::Time { .. } => sample.distance_dm as f64,
        }
    }

    fn split(&self, covered: f64) -> Result<String, ArithmeticError> {
        match *self {
            Checkpoints::Distance { step_m } => split_from_elapsed(covered, step_m as f64),
            Checkpoints::Time { step_tenths } => {
                split_from_elapsed(step_tenths as f64, covered / DISTANCE_SCALE)
            }
        }
    }

    fn report_accumulated(&self, raw: f64) -> f64 {
        match self {
            Checkpoints::Distance { .. } => raw,
            Checkpoints::Time { .. } => raw / DISTANCE_SCALE,
        }
    }
}

pub fn reconstruct_by_distance(samples: &[StrokeSample], step_m: u32, count: usize) -> SplitResult {
    reconstruct(samples, Checkpoints::Distance { step_m }, count)
}

pub fn reconstruct_by_time(
    samples: &[StrokeSample],
    step_tenths: u32,
    count: usize,
) -> SplitResult {
    reconstruct(samples, Checkpoints::Time { step_tenths }, count)
}

pub fn reconstruct(
    samples: &[StrokeSample],
    checkpoints: Checkpoints,
    count: usize,
) -> SplitResult {
    let mut splits = Vec::with_capacity(count);
    let mut accumulated = 0.0;

    if samples.len() < 2 || count == 0 || checkpoints.step() == 0 {
        return SplitResult { splits, accumulated };
    }

    let scale = checkpoints.scale();
    let origin = StrokeSample::new(0, 0);
    let mut previous = &origin;
    let mut next_checkpoint: u64 = 1;

    for sample in samples {
        let target = checkpoints.step() as f64 * next_checkpoint as f64;
        let coordinate = checkpoints.coordinate(sample);

        if coordinate >= target * scale {
            let reached = if coordinate == target * scale {
                Ok(checkpoints.value(sample))
            } else {
                interpolate_scaled(
                    checkpoints.coordinate(previous),
                    coordinate,
                    checkpoints.value(previous),
                    checkpoints.value(sample),
                    target,
                    scale,
                )
            };

            let reached = reached.and_then(|value| {
                checkpoints
                    .split(value - accumulated)
                    .map(|split| (value, split))
            });
            match reached {
                Ok((value, split)) => {
                    splits.push(split);
                    accumulated = value;
                    if splits.len() == count {
                        break;
                    }
                    next_checkpoint += 1;
                }
                Err(err) => {
                    tracing::warn!("Skipping checkpoint {} at this stroke: {}", target, err);
                }
            }
        }

        previous = sample;
    }

    if splits.len() < count {
        tracing::debug!(
            "Stroke data ended after {} of {} checkpoints",
            splits.len(),
            count
        );
    }

    SplitResult {
        splits,
        accumulated: checkpoints.report_accumulated(accumulated),
    }
}
