//! On-disk artifacts: serialized pipeline, ordered feature list, version marker.

use crate::error::{PredictorError, PredictorResult};
use crate::models::pipeline::SurvivalPipeline;
use crate::training::{TrainedModel, TrainingReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Version written when none is supplied
pub const DEFAULT_VERSION: &str = "v1";

/// Locations of the three artifact files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub columns: PathBuf,
    pub version: PathBuf,
}

impl ArtifactPaths {
    /// Standard file names inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join("model.json"),
            columns: dir.join("columns.json"),
            version: dir.join("version.txt"),
        }
    }
}

/// `columns.json` contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureList {
    pub features: Vec<String>,
}

/// Provenance stored next to the pipeline in `model.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub version: String,
    pub trained_at: DateTime<Utc>,
    pub held_out_accuracy: f64,
    pub fit_rows: usize,
    pub test_rows: usize,
}

/// `model.json` contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub metadata: ArtifactMetadata,
    pub pipeline: SurvivalPipeline,
}

impl ModelArtifact {
    pub fn from_trained(trained: &TrainedModel, version: &str) -> Self {
        let TrainingReport {
            held_out_accuracy,
            fit_rows,
            test_rows,
            ..
        } = trained.report;
        Self {
            metadata: ArtifactMetadata {
                version: version.to_string(),
                trained_at: Utc::now(),
                held_out_accuracy,
                fit_rows,
                test_rows,
            },
            pipeline: trained.pipeline.clone(),
        }
    }
}

/// A loaded, validated artifact. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedArtifact {
    pub model: ModelArtifact,
    /// Field order presented to the pipeline
    pub features: Vec<String>,
    pub version: String,
}

impl LoadedArtifact {
    pub fn pipeline(&self) -> &SurvivalPipeline {
        &self.model.pipeline
    }
}

/// Write `model.json`, `columns.json` and `version.txt`, creating parent directories.
///
/// All three files are staged under a `.tmp` suffix before any is renamed into
/// place, so a failed serialization or write leaves the previous set intact.
/// The renames themselves are not atomic as a group.
pub fn write_artifacts(paths: &ArtifactPaths, artifact: &ModelArtifact) -> PredictorResult<()> {
    let features = FeatureList {
        features: artifact.pipeline.feature_names(),
    };

    let staged = [
        (paths.model.as_path(), to_json(&paths.model, artifact)?),
        (paths.columns.as_path(), to_json(&paths.columns, &features)?),
        (
            paths.version.as_path(),
            format!("{}\n", artifact.metadata.version).into_bytes(),
        ),
    ];

    let mut temps = Vec::with_capacity(staged.len());
    for (path, contents) in &staged {
        let temp = staging_path(path);
        if let Err(e) = write_file(&temp, contents) {
            for temp in &temps {
                let _ = fs::remove_file(temp);
            }
            return Err(e);
        }
        temps.push(temp);
    }
    for ((path, _), temp) in staged.iter().zip(&temps) {
        fs::rename(temp, path).map_err(|e| PredictorError::io(*path, e))?;
    }

    info!(
        model = %paths.model.display(),
        columns = %paths.columns.display(),
        version = %artifact.metadata.version,
        "Artifacts written"
    );
    Ok(())
}

/// Read and cross-check the artifact files. A missing version file reads as `unknown`.
pub fn read_artifacts(paths: &ArtifactPaths) -> PredictorResult<LoadedArtifact> {
    let model: ModelArtifact = read_json(&paths.model)?;
    let FeatureList { features } = read_json(&paths.columns)?;

    if features != model.pipeline.feature_names() {
        return Err(PredictorError::artifact(
            &paths.columns,
            format!(
                "feature list {:?} does not match the model's fields {:?}",
                features,
                model.pipeline.feature_names()
            ),
        ));
    }

    let version = match fs::read_to_string(&paths.version) {
        Ok(text) => text.trim().to_string(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => "unknown".to_string(),
        Err(e) => return Err(PredictorError::artifact(&paths.version, e)),
    };

    Ok(LoadedArtifact {
        model,
        features,
        version,
    })
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> PredictorResult<T> {
    let bytes = fs::read(path).map_err(|e| PredictorError::artifact(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| PredictorError::artifact(path, e))
}

fn to_json<T: Serialize>(path: &Path, value: &T) -> PredictorResult<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(|e| PredictorError::io(path, std::io::Error::other(e)))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> PredictorResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PredictorError::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| PredictorError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::trained_scenario_model;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path().join("artifacts"));
        let artifact = ModelArtifact::from_trained(&trained_scenario_model(), "v7");

        write_artifacts(&paths, &artifact).unwrap();

        let columns = fs::read_to_string(&paths.columns).unwrap();
        let list: FeatureList = serde_json::from_str(&columns).unwrap();
        assert_eq!(
            list.features,
            vec!["Pclass", "Sex", "Age", "SibSp", "Parch", "Fare", "Embarked"]
        );
        assert_eq!(fs::read_to_string(&paths.version).unwrap(), "v7\n");

        let loaded = read_artifacts(&paths).unwrap();
        assert_eq!(loaded.version, "v7");
        assert_eq!(loaded.model, artifact);
        assert_eq!(loaded.features, list.features);
    }

    #[test]
    fn test_missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_artifacts(&ArtifactPaths::in_dir(dir.path())).unwrap_err();
        assert!(matches!(err, PredictorError::ArtifactLoadFailure { .. }));
    }

    #[test]
    fn test_corrupt_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let artifact = ModelArtifact::from_trained(&trained_scenario_model(), DEFAULT_VERSION);
        write_artifacts(&paths, &artifact).unwrap();
        fs::write(&paths.model, b"{\"metadata\": 12").unwrap();

        assert!(matches!(
            read_artifacts(&paths),
            Err(PredictorError::ArtifactLoadFailure { .. })
        ));
    }

    #[test]
    fn test_feature_list_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let artifact = ModelArtifact::from_trained(&trained_scenario_model(), DEFAULT_VERSION);
        write_artifacts(&paths, &artifact).unwrap();
        fs::write(&paths.columns, r#"{"features": ["Sex", "Pclass"]}"#).unwrap();

        assert!(matches!(
            read_artifacts(&paths),
            Err(PredictorError::ArtifactLoadFailure { .. })
        ));
    }

    #[test]
    fn test_failed_write_keeps_previous_set() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let first = ModelArtifact::from_trained(&trained_scenario_model(), "v1");
        write_artifacts(&paths, &first).unwrap();

        // A regular file where the version directory should be blocks the last write
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let broken = ArtifactPaths {
            version: blocker.join("version.txt"),
            ..paths.clone()
        };
        let second = ModelArtifact::from_trained(&trained_scenario_model(), "v2");
        assert!(write_artifacts(&broken, &second).is_err());

        let loaded = read_artifacts(&paths).unwrap();
        assert_eq!(loaded.version, "v1");
        assert_eq!(loaded.model, first);
        assert!(!staging_path(&paths.model).exists());
        assert!(!staging_path(&paths.columns).exists());
    }

    #[test]
    fn test_missing_version_reads_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let artifact = ModelArtifact::from_trained(&trained_scenario_model(), DEFAULT_VERSION);
        write_artifacts(&paths, &artifact).unwrap();
        fs::remove_file(&paths.version).unwrap();

        assert_eq!(read_artifacts(&paths).unwrap().version, "unknown");
    }
}
