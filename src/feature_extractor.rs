//! Feature selection for model inference.
//!
//! Records arrive keyed by field name; the fitted pipeline consumes values in
//! the exact order stored alongside the artifact. This module bridges the two.

use crate::error::{PredictorError, PredictorResult};
use crate::schema::{FeatureRecord, FeatureValue};
use crate::types::passenger::PassengerRecord;

/// Turns name-keyed records into artifact-ordered feature rows.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Select `order`'s fields from `record`, in that order.
    ///
    /// Every field in `order` must be present; extra fields are an error too,
    /// since the model must see exactly its own field set.
    pub fn select(
        &self,
        record: &FeatureRecord,
        order: &[String],
    ) -> PredictorResult<Vec<FeatureValue>> {
        let mut missing = Vec::new();
        let mut values = Vec::with_capacity(order.len());
        for name in order {
            match record.get(name) {
                Some(value) => values.push(value.clone()),
                None => missing.push(name.as_str()),
            }
        }
        if !missing.is_empty() {
            return Err(PredictorError::SchemaMismatch(format!(
                "record is missing fields: {}",
                missing.join(", ")
            )));
        }
        if record.len() != order.len() {
            return Err(PredictorError::SchemaMismatch(format!(
                "record has {} fields, model expects {}",
                record.len(),
                order.len()
            )));
        }
        Ok(values)
    }

    /// Validate a passenger and extract its features in `order`.
    pub fn extract(
        &self,
        passenger: &PassengerRecord,
        order: &[String],
    ) -> PredictorResult<Vec<FeatureValue>> {
        passenger.validate()?;
        self.select(&passenger.to_record(), order)
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FeatureSchema;

    #[test]
    fn test_select_reorders_to_model_order() {
        let record = FeatureRecord::new()
            .with("Embarked", "S")
            .with("Fare", 7.25)
            .with("Sex", "male")
            .with("Age", 30.0)
            .with("Parch", 0.0)
            .with("SibSp", 0.0)
            .with("Pclass", 3.0);
        let order = FeatureSchema::titanic().names();

        let values = FeatureExtractor::new().select(&record, &order).unwrap();
        assert_eq!(values.len(), 7);
        assert_eq!(values[0], FeatureValue::Numeric(3.0));
        assert_eq!(values[1], FeatureValue::Categorical("male".to_string()));
        assert_eq!(values[6], FeatureValue::Categorical("S".to_string()));
    }

    #[test]
    fn test_select_rejects_missing_and_extra_fields() {
        let order = FeatureSchema::titanic().names();
        let extractor = FeatureExtractor::new();

        let partial = FeatureRecord::new().with("Pclass", 3.0).with("Sex", "male");
        match extractor.select(&partial, &order) {
            Err(PredictorError::SchemaMismatch(msg)) => assert!(msg.contains("Fare")),
            other => panic!("unexpected: {other:?}"),
        }

        let extra = PassengerRecord::default().to_record().with("Cabin", "C85");
        assert!(matches!(
            extractor.select(&extra, &order),
            Err(PredictorError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_extract_validates_passenger() {
        let order = FeatureSchema::titanic().names();
        let passenger = PassengerRecord {
            age: -1.0,
            ..PassengerRecord::default()
        };
        assert!(matches!(
            FeatureExtractor::new().extract(&passenger, &order),
            Err(PredictorError::InvalidInput(_))
        ));
    }
}
