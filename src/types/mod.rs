//! Type definitions for the survival predictor

pub mod passenger;
pub mod prediction;

pub use passenger::PassengerRecord;
pub use prediction::SurvivalPrediction;
