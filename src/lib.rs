//! Titanic Survival Predictor Library
//!
//! Offline training of a logistic-regression survival model over passenger
//! records, persisted artifacts, and a small inference service that tracks
//! request latency.

pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod preprocess;
pub mod schema;
pub mod service;
pub mod training;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use dataset::Dataset;
pub use error::{PredictorError, PredictorResult};
pub use feature_extractor::FeatureExtractor;
pub use models::inference::InferenceEngine;
pub use schema::{FeatureRecord, FeatureSchema, FeatureValue};
pub use service::ServiceState;
pub use training::{train, TrainedModel, TrainingParams};
pub use types::{passenger::PassengerRecord, prediction::SurvivalPrediction};
