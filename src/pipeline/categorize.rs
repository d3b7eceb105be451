use crate::types::category::{Category, CategoryKind};
use crate::types::workout::{MachineType, WorkoutRecord, WorkoutType, BIKE_DISTANCE_FACTOR};

/// Whether `record` belongs in `category`'s ranking.
pub fn matches(category: &Category, record: &WorkoutRecord, include_bikes: bool) -> bool {
    match record.machine {
        MachineType::Rower => {}
        MachineType::Bike if include_bikes => {}
        _ => return false,
    }

    match category.kind {
        CategoryKind::PeakPower { max_distance_m } => record.distance_m <= max_distance_m,
        CategoryKind::SingleDistance { distance_m, .. } => {
            record.workout_type == WorkoutType::FixedDistanceSplits
                && record.rower_equivalent_distance() == distance_m as f64
        }
        CategoryKind::SingleTime { time_tenths, .. } => {
            record.workout_type == WorkoutType::FixedTimeSplits && record.time_tenths == time_tenths
        }
        CategoryKind::DistanceIntervals { interval_m, count } => {
            let total = interval_m * count as u32;
            is_distance_interval(&record.workout_type)
                && ((record.machine == MachineType::Rower && record.distance_m == total)
                    || (include_bikes
                        && record.machine == MachineType::Bike
                        && record.distance_m == total * BIKE_DISTANCE_FACTOR))
        }
        CategoryKind::TimeIntervals {
            interval_tenths,
            count,
        } => {
            is_time_interval(&record.workout_type)
                && record.time_tenths == interval_tenths * count as u32
        }
    }
}

/// Whether ranking `category` reads stroke data.
pub fn needs_strokes(category: &Category) -> bool {
    match category.kind {
        CategoryKind::PeakPower { .. } => true,
        CategoryKind::SingleDistance { splits, .. } | CategoryKind::SingleTime { splits, .. } => {
            splits > 0
        }
        CategoryKind::DistanceIntervals { .. } | CategoryKind::TimeIntervals { .. } => false,
    }
}

fn is_distance_interval(workout_type: &WorkoutType) -> bool {
    matches!(
        workout_type,
        WorkoutType::FixedDistanceInterval | WorkoutType::VariableInterval
    )
}

fn is_time_interval(workout_type: &WorkoutType) -> bool {
    matches!(
        workout_type,
        WorkoutType::FixedTimeInterval | WorkoutType::VariableInterval
    )
}
