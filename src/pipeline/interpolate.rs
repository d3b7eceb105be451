use crate::error::ArithmeticError;

/// Checkpoints are given in metres, stroke distances in decimetres.
pub const DISTANCE_SCALE: f64 = 10.0;

/// Linear interpolation of `value` at `target` between `(known_a, value_a)`
/// and `(known_b, value_b)`.
pub fn interpolate(
    known_a: f64,
    known_b: f64,
    value_a: f64,
    value_b: f64,
    target: f64,
) -> Result<f64, ArithmeticError> {
    interpolate_scaled(known_a, known_b, value_a, value_b, target, 1.0)
}

/// Same as [`interpolate`], with `target` first multiplied by `scale` to bring
/// it into the unit of the known coordinates.
pub fn interpolate_scaled(
    known_a: f64,
    known_b: f64,
    value_a: f64,
    value_b: f64,
    target: f64,
    scale: f64,
) -> Result<f64, ArithmeticError> {
    let span = known_b - known_a;
    if span == 0.0 {
        return Err(ArithmeticError::ZeroInterval(known_a));
    }
    let fraction = (target * scale - known_a) / span;
    Ok(value_a + (value_b - value_a) * fraction)
}
