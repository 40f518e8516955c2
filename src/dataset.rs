//! CSV dataset loading and extraction of labelled rows against a feature schema.

use crate::error::{PredictorError, PredictorResult};
use crate::schema::{FeatureKind, FeatureRecord, FeatureSchema, FeatureValue};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Raw tabular data: a header row and string cells.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

/// A row extracted for training; `target` is `None` when the label cell was empty.
#[derive(Debug, Clone)]
pub struct LabeledRow {
    pub features: FeatureRecord,
    pub target: Option<usize>,
}

impl Dataset {
    /// Read a CSV file with a header row.
    pub fn from_path<P: AsRef<Path>>(path: P) -> PredictorResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PredictorError::DatasetUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let dataset = Self::from_reader(file)?;
        debug!(
            path = %path.display(),
            rows = dataset.len(),
            columns = dataset.columns.len(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    /// Read CSV data with a header row from any reader.
    pub fn from_reader<R: Read>(reader: R) -> PredictorResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns = reader
            .headers()
            .map_err(|e| PredictorError::MalformedDataset(format!("unreadable header: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();

        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PredictorError::MalformedDataset(e.to_string()))?;

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Locate a column by exact name, then case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .or_else(|| self.columns.iter().position(|c| c.eq_ignore_ascii_case(name)))
    }

    /// Extract every row as schema-keyed features plus an optional binary target.
    ///
    /// Fails with `SchemaMismatch` naming all absent columns.
    pub fn labeled_rows(
        &self,
        schema: &FeatureSchema,
        target_field: &str,
    ) -> PredictorResult<Vec<LabeledRow>> {
        let mut missing = Vec::new();
        let mut feature_columns = Vec::with_capacity(schema.len());
        for field in schema.fields() {
            match self.column_index(&field.name) {
                Some(idx) => feature_columns.push((field, idx)),
                None => missing.push(field.name.clone()),
            }
        }
        let target_idx = self.column_index(target_field);
        if target_idx.is_none() {
            missing.push(target_field.to_string());
        }
        let target_idx = match target_idx {
            Some(idx) if missing.is_empty() => idx,
            _ => {
                return Err(PredictorError::SchemaMismatch(format!(
                    "dataset is missing required columns: {}",
                    missing.join(", ")
                )))
            }
        };

        self.rows
            .iter()
            .enumerate()
            .map(|(line, row)| {
                let mut features = FeatureRecord::new();
                for (field, idx) in &feature_columns {
                    let cell = row.get(*idx).unwrap_or("");
                    let value = parse_cell(cell, field.kind).ok_or_else(|| {
                        PredictorError::MalformedDataset(format!(
                            "row {}: column {} is not numeric: {:?}",
                            line + 1,
                            field.name,
                            cell
                        ))
                    })?;
                    features.insert(&field.name, value);
                }
                let target = parse_target(row.get(target_idx).unwrap_or("")).map_err(|cell| {
                    PredictorError::MalformedDataset(format!(
                        "row {}: target {} must be 0 or 1, got {:?}",
                        line + 1,
                        target_field,
                        cell
                    ))
                })?;
                Ok(LabeledRow { features, target })
            })
            .collect()
    }
}

fn parse_cell(cell: &str, kind: FeatureKind) -> Option<FeatureValue> {
    if cell.is_empty() {
        return Some(FeatureValue::Missing);
    }
    match kind {
        FeatureKind::Numeric => cell.parse::<f64>().ok().map(FeatureValue::Numeric),
        FeatureKind::Categorical => Some(FeatureValue::Categorical(cell.to_string())),
    }
}

fn parse_target(cell: &str) -> Result<Option<usize>, String> {
    if cell.is_empty() {
        return Ok(None);
    }
    match cell.parse::<f64>() {
        Ok(v) if v == 0.0 => Ok(Some(0)),
        Ok(v) if v == 1.0 => Ok(Some(1)),
        _ => Err(cell.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Fare,Embarked
1,0,3,Braund,male,22,1,0,7.25,S
2,1,1,Cumings,female,38,1,0,71.2833,C
3,,3,Heikkinen,female,,0,0,7.925,
4,1.0,1,Futrelle,female,35,1,0,53.1,S
";

    #[test]
    fn test_labeled_rows_parse_missing_cells() {
        let dataset = Dataset::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 4);

        let rows = dataset
            .labeled_rows(&FeatureSchema::titanic(), "Survived")
            .unwrap();
        assert_eq!(rows[0].target, Some(0));
        assert_eq!(rows[1].target, Some(1));
        assert_eq!(rows[2].target, None);
        assert_eq!(rows[3].target, Some(1));
        assert_eq!(rows[2].features.get("Age"), Some(&FeatureValue::Missing));
        assert_eq!(rows[2].features.get("Embarked"), Some(&FeatureValue::Missing));
        assert_eq!(
            rows[1].features.get("Embarked"),
            Some(&FeatureValue::Categorical("C".to_string()))
        );
        // Name and PassengerId are not schema fields
        assert!(rows[0].features.get("Name").is_none());
    }

    #[test]
    fn test_lowercase_columns_match() {
        let csv = "survived,pclass,sex,age,sibsp,parch,fare,embarked\n1,1,female,29,0,0,211.3,S\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        let rows = dataset
            .labeled_rows(&FeatureSchema::titanic(), "Survived")
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].features.get("Fare"), Some(&FeatureValue::Numeric(211.3)));
    }

    #[test]
    fn test_missing_columns_reported() {
        let csv = "Survived,Pclass,Sex,Age\n0,3,male,22\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        let err = dataset
            .labeled_rows(&FeatureSchema::titanic(), "Survived")
            .unwrap_err();
        match err {
            PredictorError::SchemaMismatch(msg) => {
                assert!(msg.contains("SibSp"));
                assert!(msg.contains("Embarked"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_cells_are_malformed() {
        let csv = "Survived,Pclass,Sex,Age,SibSp,Parch,Fare,Embarked\n0,3,male,old,0,0,7.25,S\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert!(matches!(
            dataset.labeled_rows(&FeatureSchema::titanic(), "Survived"),
            Err(PredictorError::MalformedDataset(_))
        ));

        let csv = "Survived,Pclass,Sex,Age,SibSp,Parch,Fare,Embarked\n2,3,male,22,0,0,7.25,S\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert!(matches!(
            dataset.labeled_rows(&FeatureSchema::titanic(), "Survived"),
            Err(PredictorError::MalformedDataset(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Dataset::from_path("/nonexistent/titanic.csv").unwrap_err();
        assert!(matches!(err, PredictorError::DatasetUnavailable { .. }));
    }
}
