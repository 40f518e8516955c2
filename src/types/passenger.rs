//! Passenger data structures for survival prediction

use crate::error::{PredictorError, PredictorResult};
use crate::schema::FeatureRecord;
use serde::{Deserialize, Serialize};

/// Passenger attributes submitted for a survival prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerRecord {
    /// Ticket class (1 = first, 2 = second, 3 = third)
    #[serde(alias = "Pclass")]
    pub pclass: u8,

    /// Sex ("male" / "female")
    #[serde(alias = "Sex")]
    pub sex: String,

    /// Age in years
    #[serde(alias = "Age")]
    pub age: f64,

    /// Siblings / spouses aboard
    #[serde(alias = "SibSp")]
    pub sibsp: u32,

    /// Parents / children aboard
    #[serde(alias = "Parch")]
    pub parch: u32,

    /// Passenger fare
    #[serde(alias = "Fare")]
    pub fare: f64,

    /// Port of embarkation (C = Cherbourg, Q = Queenstown, S = Southampton)
    #[serde(alias = "Embarked")]
    pub embarked: String,
}

impl PassengerRecord {
    /// Check the value ranges the input form allows.
    pub fn validate(&self) -> PredictorResult<()> {
        if !(1..=3).contains(&self.pclass) {
            return Err(PredictorError::InvalidInput(format!(
                "pclass must be 1, 2 or 3, got {}",
                self.pclass
            )));
        }
        if !self.age.is_finite() || !(0.0..=100.0).contains(&self.age) {
            return Err(PredictorError::InvalidInput(format!(
                "age must be between 0 and 100, got {}",
                self.age
            )));
        }
        if self.sibsp > 8 {
            return Err(PredictorError::InvalidInput(format!(
                "sibsp must be at most 8, got {}",
                self.sibsp
            )));
        }
        if self.parch > 6 {
            return Err(PredictorError::InvalidInput(format!(
                "parch must be at most 6, got {}",
                self.parch
            )));
        }
        if !self.fare.is_finite() || self.fare < 0.0 {
            return Err(PredictorError::InvalidInput(format!(
                "fare must be a non-negative number, got {}",
                self.fare
            )));
        }
        Ok(())
    }

    /// Convert to a record keyed by the dataset's column names.
    pub fn to_record(&self) -> FeatureRecord {
        FeatureRecord::new()
            .with("Pclass", f64::from(self.pclass))
            .with("Sex", self.sex.as_str())
            .with("Age", self.age)
            .with("SibSp", f64::from(self.sibsp))
            .with("Parch", f64::from(self.parch))
            .with("Fare", self.fare)
            .with("Embarked", self.embarked.as_str())
    }
}

impl Default for PassengerRecord {
    fn default() -> Self {
        Self {
            pclass: 3,
            sex: "male".to_string(),
            age: 30.0,
            sibsp: 0,
            parch: 0,
            fare: 7.25,
            embarked: "S".to_string(),
        }
    }
}
