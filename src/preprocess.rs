//! Column preprocessing: median imputation for numeric fields, most-frequent
//! imputation plus one-hot encoding for categorical fields.
//!
//! Output columns are laid out numeric group first (schema order), then one
//! indicator block per categorical field over its sorted vocabulary.

use crate::error::{PredictorError, PredictorResult};
use crate::schema::{FeatureKind, FeatureSchema, FeatureValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Median imputer for one numeric field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericImputer {
    pub name: String,
    pub median: f64,
}

impl NumericImputer {
    /// Learn the median of the present values; an all-missing column imputes 0.
    pub fn fit<'a, I>(name: &str, values: I) -> PredictorResult<Self>
    where
        I: IntoIterator<Item = &'a FeatureValue>,
    {
        let mut present = Vec::new();
        for value in values {
            match value {
                FeatureValue::Numeric(v) => present.push(*v),
                FeatureValue::Missing => {}
                FeatureValue::Categorical(s) => {
                    return Err(PredictorError::SchemaMismatch(format!(
                        "numeric field {name} holds categorical value {s:?}"
                    )))
                }
            }
        }
        let median = match median(&mut present) {
            Some(m) => m,
            None => {
                warn!(field = %name, "No observed values, imputing 0.0");
                0.0
            }
        };
        Ok(Self {
            name: name.to_string(),
            median,
        })
    }

    pub fn transform(&self, value: &FeatureValue) -> PredictorResult<f64> {
        match value {
            FeatureValue::Numeric(v) if v.is_finite() => Ok(*v),
            FeatureValue::Numeric(v) => Err(PredictorError::InvalidInput(format!(
                "{} must be finite, got {v}",
                self.name
            ))),
            FeatureValue::Missing => Ok(self.median),
            FeatureValue::Categorical(s) => Err(PredictorError::SchemaMismatch(format!(
                "numeric field {} holds categorical value {s:?}",
                self.name
            ))),
        }
    }
}

/// Most-frequent imputer and one-hot encoder for one categorical field.
///
/// Values outside the learned vocabulary encode to an all-zero block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub name: String,
    pub most_frequent: String,
    pub categories: Vec<String>,
}

impl OneHotEncoder {
    pub fn fit<'a, I>(name: &str, values: I) -> PredictorResult<Self>
    where
        I: IntoIterator<Item = &'a FeatureValue>,
    {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut missing = 0usize;
        for value in values {
            match value {
                FeatureValue::Categorical(s) => *counts.entry(s.as_str()).or_insert(0) += 1,
                FeatureValue::Missing => missing += 1,
                FeatureValue::Numeric(v) => {
                    return Err(PredictorError::SchemaMismatch(format!(
                        "categorical field {name} holds numeric value {v}"
                    )))
                }
            }
        }

        // BTreeMap iterates in sorted order, so ties go to the smallest value
        let most_frequent = counts
            .iter()
            .fold(None::<(&str, usize)>, |best, (value, count)| match best {
                Some((_, best_count)) if best_count >= *count => best,
                _ => Some((*value, *count)),
            })
            .map(|(value, _)| value.to_string())
            .ok_or_else(|| {
                PredictorError::InsufficientData(format!(
                    "categorical field {name} has no observed values"
                ))
            })?;

        if missing > 0 {
            debug!(field = %name, missing, imputed = %most_frequent, "Imputing missing categories");
        }

        Ok(Self {
            name: name.to_string(),
            most_frequent,
            categories: counts.keys().map(|s| s.to_string()).collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Append this field's indicator block to `out`.
    pub fn encode_into(&self, value: &FeatureValue, out: &mut Vec<f64>) -> PredictorResult<()> {
        let category = match value {
            FeatureValue::Categorical(s) => s.as_str(),
            FeatureValue::Missing => self.most_frequent.as_str(),
            FeatureValue::Numeric(v) => {
                return Err(PredictorError::SchemaMismatch(format!(
                    "categorical field {} holds numeric value {v}",
                    self.name
                )))
            }
        };
        let hit = self.categories.binary_search_by(|c| c.as_str().cmp(category)).ok();
        out.extend((0..self.width()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
        Ok(())
    }
}

/// Fitted column transformer over a feature schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    schema: FeatureSchema,
    numeric: Vec<(usize, NumericImputer)>,
    categorical: Vec<(usize, OneHotEncoder)>,
}

impl Preprocessor {
    /// Learn imputation statistics and vocabularies from schema-ordered rows.
    pub fn fit(schema: &FeatureSchema, rows: &[Vec<FeatureValue>]) -> PredictorResult<Self> {
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();
        for (idx, field) in schema.fields().iter().enumerate() {
            let column = rows.iter().map(|row| &row[idx]);
            match field.kind {
                FeatureKind::Numeric => numeric.push((idx, NumericImputer::fit(&field.name, column)?)),
                FeatureKind::Categorical => {
                    categorical.push((idx, OneHotEncoder::fit(&field.name, column)?))
                }
            }
        }
        Ok(Self {
            schema: schema.clone(),
            numeric,
            categorical,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Number of output columns.
    pub fn width(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(|(_, e)| e.width()).sum::<usize>()
    }

    /// Output column names, e.g. `num__Age`, `cat__Sex_male`.
    pub fn output_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .numeric
            .iter()
            .map(|(_, imp)| format!("num__{}", imp.name))
            .collect();
        for (_, enc) in &self.categorical {
            names.extend(enc.categories.iter().map(|c| format!("cat__{}_{}", enc.name, c)));
        }
        names
    }

    /// Transform one schema-ordered row.
    pub fn transform_row(&self, row: &[FeatureValue]) -> PredictorResult<Vec<f64>> {
        if row.len() != self.schema.len() {
            return Err(PredictorError::SchemaMismatch(format!(
                "expected {} values, got {}",
                self.schema.len(),
                row.len()
            )));
        }
        let mut out = Vec::with_capacity(self.width());
        for (idx, imputer) in &self.numeric {
            out.push(imputer.transform(&row[*idx])?);
        }
        for (idx, encoder) in &self.categorical {
            encoder.encode_into(&row[*idx], &mut out)?;
        }
        Ok(out)
    }
}

/// Median with the midpoint of the two central values for even lengths.
fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
