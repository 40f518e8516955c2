//! Single-record inference over a loaded artifact

use crate::error::{PredictorError, PredictorResult};
use crate::feature_extractor::FeatureExtractor;
use crate::models::artifact::LoadedArtifact;
use crate::schema::FeatureRecord;
use crate::types::passenger::PassengerRecord;
use crate::types::prediction::SurvivalPrediction;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Inference engine over an immutable, shared artifact
pub struct InferenceEngine {
    artifact: Arc<LoadedArtifact>,
    extractor: FeatureExtractor,
}

impl InferenceEngine {
    pub fn new(artifact: Arc<LoadedArtifact>) -> Self {
        Self {
            artifact,
            extractor: FeatureExtractor::new(),
        }
    }

    /// Model version marker
    pub fn version(&self) -> &str {
        &self.artifact.version
    }

    /// Field order the model expects
    pub fn feature_names(&self) -> &[String] {
        &self.artifact.features
    }

    /// Class-1 probability for a name-keyed record
    pub fn predict_proba(&self, record: &FeatureRecord) -> PredictorResult<f64> {
        let row = self.extractor.select(record, &self.artifact.features)?;
        let probability = self.artifact.pipeline().predict_proba(&row)?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(PredictorError::PredictionFailure(format!(
                "probability {probability} out of range"
            )));
        }
        Ok(probability)
    }

    /// Predict and time the compute step
    pub fn predict(&self, record: &FeatureRecord) -> PredictorResult<SurvivalPrediction> {
        let start = Instant::now();
        let probability = self.predict_proba(record)?;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let prediction = SurvivalPrediction::new(probability, latency_ms);
        debug!(
            request_id = %prediction.request_id,
            probability,
            label = prediction.label,
            "Inference complete"
        );
        Ok(prediction)
    }

    /// Validate a passenger from the form and predict
    pub fn predict_passenger(
        &self,
        passenger: &PassengerRecord,
    ) -> PredictorResult<SurvivalPrediction> {
        passenger.validate()?;
        self.predict(&passenger.to_record())
    }
}
