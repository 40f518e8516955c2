//! Process-wide service state handed to every request handler.

use crate::error::PredictorResult;
use crate::metrics::{MetricsSnapshot, SharedMetrics};
use crate::models::inference::InferenceEngine;
use crate::types::passenger::PassengerRecord;
use crate::types::prediction::SurvivalPrediction;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Static facts shown alongside predictions.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    /// Deployment environment label
    pub app_env: String,
    /// File name of the loaded model
    pub model_name: String,
    pub model_version: String,
}

/// Inference engine plus the metrics it feeds. Constructed once at startup.
pub struct ServiceState {
    engine: InferenceEngine,
    metrics: Arc<SharedMetrics>,
    info: ServiceInfo,
}

impl ServiceState {
    pub fn new(engine: InferenceEngine, metrics: Arc<SharedMetrics>, info: ServiceInfo) -> Self {
        Self {
            engine,
            metrics,
            info,
        }
    }

    pub fn info(&self) -> &ServiceInfo {
        &self.info
    }

    pub fn metrics(&self) -> Arc<SharedMetrics> {
        self.metrics.clone()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Predict for one passenger and record the outcome.
    ///
    /// Failures are logged and counted; the artifact and the latency window are
    /// left as they were.
    pub fn predict(&self, passenger: &PassengerRecord) -> PredictorResult<SurvivalPrediction> {
        match self.engine.predict_passenger(passenger) {
            Ok(prediction) => {
                self.metrics.record_success(prediction.latency_ms);
                info!(
                    request_id = %prediction.request_id,
                    latency_ms = format!("{:.1}", prediction.latency_ms),
                    proba = format!("{:.3}", prediction.probability),
                    "prediction_ok"
                );
                Ok(prediction)
            }
            Err(e) => {
                self.metrics.record_error();
                error!(error = %e, "prediction_error");
                Err(e)
            }
        }
    }

    /// Count and log a request whose body could not be read as a passenger.
    pub fn record_rejected_input(&self, reason: &str) {
        self.metrics.record_error();
        error!(error = %reason, "prediction_error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::artifact::{LoadedArtifact, ModelArtifact, DEFAULT_VERSION};
    use crate::testing::trained_scenario_model;

    fn state() -> ServiceState {
        let model = ModelArtifact::from_trained(&trained_scenario_model(), DEFAULT_VERSION);
        let features = model.pipeline.feature_names();
        let engine = InferenceEngine::new(Arc::new(LoadedArtifact {
            model,
            features,
            version: DEFAULT_VERSION.to_string(),
        }));
        ServiceState::new(
            engine,
            Arc::new(SharedMetrics::new()),
            ServiceInfo {
                app_env: "test".to_string(),
                model_name: "model.json".to_string(),
                model_version: DEFAULT_VERSION.to_string(),
            },
        )
    }

    #[test]
    fn test_success_updates_window_and_requests() {
        let state = state();
        let prediction = state.predict(&PassengerRecord::default()).unwrap();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.total_errors, 0);
        assert_eq!(snapshot.window_len, 1);
        assert_eq!(snapshot.p95_latency_ms, Some(prediction.latency_ms));
    }

    #[test]
    fn test_failure_only_counts_error() {
        let state = state();
        state.predict(&PassengerRecord::default()).unwrap();
        let before = state.snapshot();

        let bad = PassengerRecord {
            pclass: 9,
            ..PassengerRecord::default()
        };
        assert!(state.predict(&bad).is_err());

        let after = state.snapshot();
        assert_eq!(after.total_errors, 1);
        assert_eq!(after.total_requests, before.total_requests);
        assert_eq!(after.window_len, before.window_len);
        assert_eq!(after.p95_latency_ms, before.p95_latency_ms);

        // Service keeps working after a failure
        assert!(state.predict(&PassengerRecord::default()).is_ok());
        assert_eq!(state.snapshot().total_requests, 2);
    }

    #[test]
    fn test_rejected_input_only_counts_error() {
        let state = state();
        state.record_rejected_input("Age: invalid type");

        let snapshot = state.snapshot();
        assert_eq!(snapshot.total_errors, 1);
        assert_eq!(snapshot.total_requests, 0);
        assert_eq!(snapshot.window_len, 0);
    }
}
