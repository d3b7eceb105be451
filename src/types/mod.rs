pub mod category;
pub mod ranking;
pub mod workout;
