//! Preprocessing + classifier, fitted and applied as one unit.

use crate::error::{PredictorError, PredictorResult};
use crate::models::classifier::LogisticModel;
use crate::preprocess::Preprocessor;
use crate::schema::{FeatureSchema, FeatureValue};
use crate::types::prediction::label_for;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Fitted survival pipeline.
///
/// Rows passed in must already be in schema order; see
/// [`FeatureExtractor`](crate::feature_extractor::FeatureExtractor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalPipeline {
    preprocessor: Preprocessor,
    classifier: LogisticModel,
}

impl SurvivalPipeline {
    pub fn fit(
        schema: &FeatureSchema,
        rows: &[Vec<FeatureValue>],
        labels: &[usize],
    ) -> PredictorResult<Self> {
        let preprocessor = Preprocessor::fit(schema, rows)?;
        let x = design_matrix(&preprocessor, rows)?;
        let classifier = LogisticModel::fit(x, Array1::from(labels.to_vec()))?;
        Ok(Self {
            preprocessor,
            classifier,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.preprocessor.schema()
    }

    /// Ordered input field names.
    pub fn feature_names(&self) -> Vec<String> {
        self.preprocessor.schema().names()
    }

    /// Class-1 probability for one schema-ordered row.
    pub fn predict_proba(&self, row: &[FeatureValue]) -> PredictorResult<f64> {
        let x = self.preprocessor.transform_row(row)?;
        self.classifier.probability(&x)
    }

    /// Hard 0/1 label at the fixed decision threshold.
    pub fn predict(&self, row: &[FeatureValue]) -> PredictorResult<usize> {
        Ok(usize::from(label_for(self.predict_proba(row)?)))
    }

    /// Classifier coefficient per preprocessed output column.
    pub fn coefficients(&self) -> Vec<(String, f64)> {
        self.preprocessor
            .output_names()
            .into_iter()
            .zip(self.classifier.weights.iter().copied())
            .collect()
    }

    pub fn intercept(&self) -> f64 {
        self.classifier.intercept
    }
}

fn design_matrix(
    preprocessor: &Preprocessor,
    rows: &[Vec<FeatureValue>],
) -> PredictorResult<Array2<f64>> {
    let width = preprocessor.width();
    let mut flat = Vec::with_capacity(rows.len() * width);
    for row in rows {
        flat.extend(preprocessor.transform_row(row)?);
    }
    Array2::from_shape_vec((rows.len(), width), flat)
        .map_err(|e| PredictorError::Training(e.to_string()))
}
