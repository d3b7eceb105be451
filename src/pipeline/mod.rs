pub mod categorize;
pub mod convert;
pub mod interpolate;
pub mod rank;
pub mod splits;
