//! Feature schema and the name-keyed records that flow through training and inference.

use crate::error::{PredictorError, PredictorResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Target column of the canonical dataset.
pub const TARGET_FIELD: &str = "Survived";

/// How a field is preprocessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// Median-imputed real value
    Numeric,
    /// Most-frequent-imputed, one-hot encoded string
    Categorical,
}

/// A named, typed field of the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
}

impl FeatureSpec {
    pub fn numeric(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FeatureKind::Numeric,
        }
    }

    pub fn categorical(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FeatureKind::Categorical,
        }
    }
}

/// Ordered list of fields the model expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    fields: Vec<FeatureSpec>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty or duplicated field lists.
    pub fn new(fields: Vec<FeatureSpec>) -> PredictorResult<Self> {
        if fields.is_empty() {
            return Err(PredictorError::SchemaMismatch(
                "schema has no fields".to_string(),
            ));
        }
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(PredictorError::SchemaMismatch(format!(
                    "duplicate field {}",
                    field.name
                )));
            }
        }
        Ok(Self { fields })
    }

    /// The passenger schema used by the service and the training tool.
    pub fn titanic() -> Self {
        Self {
            fields: vec![
                FeatureSpec::numeric("Pclass"),
                FeatureSpec::categorical("Sex"),
                FeatureSpec::numeric("Age"),
                FeatureSpec::numeric("SibSp"),
                FeatureSpec::numeric("Parch"),
                FeatureSpec::numeric("Fare"),
                FeatureSpec::categorical("Embarked"),
            ],
        }
    }

    pub fn fields(&self) -> &[FeatureSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in schema order.
    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::titanic()
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(String),
    Missing,
}

impl FeatureValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FeatureValue::Missing)
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Numeric(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Categorical(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Categorical(value)
    }
}

impl<T: Into<FeatureValue>> From<Option<T>> for FeatureValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FeatureValue::Missing)
    }
}

/// Name-keyed feature values of one row, in no particular order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRecord {
    values: BTreeMap<String, FeatureValue>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<FeatureValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<FeatureValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
