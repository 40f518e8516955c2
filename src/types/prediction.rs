//! Survival prediction data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed decision threshold on the class-1 probability
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Result of one successful prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalPrediction {
    /// Unique request identifier, also attached to log lines
    pub request_id: Uuid,

    /// Predicted class: 1 = survived, 0 = did not survive
    pub label: u8,

    /// Class-1 probability (0.0 - 1.0)
    pub probability: f64,

    /// Wall-clock duration of the compute step
    pub latency_ms: f64,

    /// Prediction timestamp
    pub timestamp: DateTime<Utc>,
}

impl SurvivalPrediction {
    /// Threshold a probability into a prediction
    pub fn new(probability: f64, latency_ms: f64) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            label: label_for(probability),
            probability,
            latency_ms,
            timestamp: Utc::now(),
        }
    }

    pub fn survived(&self) -> bool {
        self.label == 1
    }
}

/// 1 iff `probability >= DECISION_THRESHOLD`
pub fn label_for(probability: f64) -> u8 {
    u8::from(probability >= DECISION_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_threshold() {
        assert_eq!(label_for(0.0), 0);
        assert_eq!(label_for(0.4999), 0);
        assert_eq!(label_for(0.5), 1);
        assert_eq!(label_for(1.0), 1);
    }

    #[test]
    fn test_prediction_serialization() {
        let prediction = SurvivalPrediction::new(0.73, 1.25);
        assert!(prediction.survived());

        let json = serde_json::to_string(&prediction).unwrap();
        let deserialized: SurvivalPrediction = serde_json::from_str(&json).unwrap();

        assert_eq!(prediction.request_id, deserialized.request_id);
        assert_eq!(prediction.label, deserialized.label);
        assert_eq!(prediction.probability, deserialized.probability);
    }
}
