//! Conversions between elapsed time, per-500m pace ("split") and watts.
//!
//! Times are carried in tenths of a second. Formatting always truncates to
//! the tenth, never rounds, so a split shown on a report matches what the
//! monitor showed.

use crate::error::{ArithmeticError, FormatError};

/// Concept2 power constant: `watts = 2.80 / pace^3`, pace in seconds per metre.
const WATTS_CONSTANT: f64 = 2.80;
const SPLIT_METERS: f64 = 500.0;
const TENTHS_PER_HOUR: u64 = 36_000;

/// Average pace per 500 m, in whole tenths of a second (truncated).
pub fn pace_tenths(time_tenths: f64, distance_m: f64) -> Result<u64, ArithmeticError> {
    if !distance_m.is_finite() || distance_m <= 0.0 {
        return Err(ArithmeticError::NonPositiveDistance(distance_m));
    }
    if !time_tenths.is_finite() || time_tenths < 0.0 {
        return Err(ArithmeticError::InvalidTime(time_tenths));
    }
    let pace_seconds = SPLIT_METERS * (time_tenths / 10.0) / distance_m;
    Ok((pace_seconds * 10.0).trunc() as u64)
}

/// `"M:SS.T"` average split for covering `distance_m` in `time_tenths`.
pub fn split_from_elapsed(time_tenths: f64, distance_m: f64) -> Result<String, ArithmeticError> {
    pace_tenths(time_tenths, distance_m).map(format_split)
}

/// Formats an elapsed time as `"M:SS.T"`, or `"H:MM:SS.T"` from one hour on.
pub fn elapsed_to_clock(time_tenths: f64) -> String {
    let tenths = if time_tenths.is_finite() && time_tenths > 0.0 {
        time_tenths.trunc() as u64
    } else {
        0
    };
    format_clock(tenths)
}

pub fn format_split(pace_tenths: u64) -> String {
    let minutes = pace_tenths / 600;
    let seconds = (pace_tenths / 10) % 60;
    let tenth = pace_tenths % 10;
    format!("{}:{:02}.{}", minutes, seconds, tenth)
}

pub fn format_clock(tenths: u64) -> String {
    if tenths < TENTHS_PER_HOUR {
        return format_split(tenths);
    }
    let hours = tenths / TENTHS_PER_HOUR;
    let minutes = (tenths / 600) % 60;
    let seconds = (tenths / 10) % 60;
    let tenth = tenths % 10;
    format!("{}:{:02}:{:02}.{}", hours, minutes, seconds, tenth)
}

/// Parses `"M:SS.T"` and converts the pace to watts.
pub fn split_to_watts(split: &str) -> Result<u32, FormatError> {
    let invalid = || FormatError::InvalidSplit(split.to_string());

    let (minutes, seconds) = split.trim().split_once(':').ok_or_else(invalid)?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    let seconds: f64 = seconds.parse().map_err(|_| invalid())?;
    if !seconds.is_finite() || !(0.0..60.0).contains(&seconds) {
        return Err(invalid());
    }

    let total = minutes as f64 * 60.0 + seconds;
    if total <= 0.0 {
        return Err(invalid());
    }
    Ok(watts_for_pace_seconds(total))
}

/// Watts for a pace given in tenths of a second per 500 m.
pub fn watts_for_pace_tenths(pace_tenths: u64) -> Result<u32, ArithmeticError> {
    if pace_tenths == 0 {
        return Err(ArithmeticError::InvalidTime(0.0));
    }
    Ok(watts_for_pace_seconds(pace_tenths as f64 / 10.0))
}

fn watts_for_pace_seconds(split_seconds: f64) -> u32 {
    let pace = split_seconds / SPLIT_METERS;
    (WATTS_CONSTANT / pace.powi(3)).round() as u32
}

/// Watts column of a ranking row: the average split, converted.
pub fn watts_from_elapsed(time_tenths: f64, distance_m: f64) -> Result<u32, ArithmeticError> {
    watts_for_pace_tenths(pace_tenths(time_tenths, distance_m)?)
}

pub fn watts_to_split(watts: f64) -> Result<String, ArithmeticError> {
    if !watts.is_finite() || watts <= 0.0 {
        return Err(ArithmeticError::NonPositivePower(watts));
    }
    let pace = (WATTS_CONSTANT / watts).cbrt();
    let time_seconds = pace * SPLIT_METERS;
    Ok(elapsed_to_clock(time_seconds * 10.0))
}

/// `"First Last"` becomes `"Last, First"`; any further tokens join the surname.
pub fn format_display_name(full_name: &str) -> Result<String, FormatError> {
    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    match tokens.as_slice() {
        [first, rest @ ..] if !rest.is_empty() => Ok(format!("{}, {}", rest.join(" "), first)),
        _ => Err(FormatError::InvalidName(full_name.to_string())),
    }
}
