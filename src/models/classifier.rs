//! Binary logistic regression fitted with linfa and stored as plain weights.

use crate::error::{PredictorError, PredictorResult};
use linfa::prelude::*;
use linfa_logistic::LogisticRegression;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Iteration budget of the optimizer.
pub const MAX_ITERATIONS: u64 = 1000;

/// Fitted logistic model: `P(class 1) = sigmoid(intercept + weights · x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    /// Fit on a design matrix and 0/1 labels.
    pub fn fit(x: Array2<f64>, y: Array1<usize>) -> PredictorResult<Self> {
        if x.nrows() != y.len() {
            return Err(PredictorError::Training(format!(
                "{} rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }

        let dataset = Dataset::new(x, y);
        let fitted = LogisticRegression::default()
            .max_iterations(MAX_ITERATIONS)
            .fit(&dataset)
            .map_err(|e| PredictorError::Training(e.to_string()))?;

        let mut model = Self {
            weights: fitted.params().to_vec(),
            intercept: fitted.intercept(),
        };

        // linfa picks its own positive class; align the sigmoid with class 1
        let predicted: Array1<usize> = fitted.predict(dataset.records());
        let agree = predicted
            .iter()
            .zip(dataset.records().rows())
            .filter(|(label, row)| {
                let p = model.probability_unchecked(row.as_slice().unwrap_or(&[]));
                (p >= 0.5) == (**label == 1)
            })
            .count();
        if agree * 2 < predicted.len() {
            model.weights.iter_mut().for_each(|w| *w = -*w);
            model.intercept = -model.intercept;
        }

        debug!(
            features = model.weights.len(),
            intercept = model.intercept,
            "Logistic model fitted"
        );
        Ok(model)
    }

    /// Class-1 probability for one preprocessed row.
    pub fn probability(&self, x: &[f64]) -> PredictorResult<f64> {
        if x.len() != self.weights.len() {
            return Err(PredictorError::PredictionFailure(format!(
                "expected {} inputs, got {}",
                self.weights.len(),
                x.len()
            )));
        }
        let p = self.probability_unchecked(x);
        if p.is_nan() {
            return Err(PredictorError::PredictionFailure(
                "model produced NaN".to_string(),
            ));
        }
        Ok(p)
    }

    fn probability_unchecked(&self, x: &[f64]) -> f64 {
        let z = self.intercept
            + self
                .weights
                .iter()
                .zip(x)
                .map(|(w, v)| w * v)
                .sum::<f64>();
        sigmoid(z)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
