//! Artifact loader with a per-loader cache

use crate::dataset::Dataset;
use crate::error::PredictorResult;
use crate::models::artifact::{
    read_artifacts, write_artifacts, ArtifactPaths, LoadedArtifact, ModelArtifact, DEFAULT_VERSION,
};
use crate::schema::{FeatureSchema, TARGET_FIELD};
use crate::training::{train, TrainingParams};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

/// Loads the artifact files once and hands out the shared result
pub struct ModelLoader {
    paths: ArtifactPaths,
    cached: Mutex<Option<Arc<LoadedArtifact>>>,
    /// Number of times the backing files were actually read
    reads: AtomicUsize,
}

impl ModelLoader {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self {
            paths,
            cached: Mutex::new(None),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Load the artifact, reading files only on the first successful call
    pub fn load(&self) -> PredictorResult<Arc<LoadedArtifact>> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(artifact) = cached.as_ref() {
            return Ok(artifact.clone());
        }

        info!(
            model = %self.paths.model.display(),
            columns = %self.paths.columns.display(),
            "Loading model artifact"
        );
        self.reads.fetch_add(1, Ordering::Relaxed);
        let artifact = Arc::new(read_artifacts(&self.paths)?);

        info!(
            version = %artifact.version,
            features = ?artifact.features,
            accuracy = artifact.model.metadata.held_out_accuracy,
            "Model loaded successfully"
        );
        *cached = Some(artifact.clone());
        Ok(artifact)
    }

    /// Load the artifact, training and writing it first from `dataset` when the model file is absent
    pub fn load_or_bootstrap(
        &self,
        dataset: Option<&Path>,
        params: TrainingParams,
    ) -> PredictorResult<Arc<LoadedArtifact>> {
        match dataset {
            Some(dataset) if !self.paths.model.exists() => {
                warn!(
                    model = %self.paths.model.display(),
                    dataset = %dataset.display(),
                    "Model file not found, training in-process"
                );
                self.bootstrap(dataset, params)?;
            }
            _ => {}
        }
        self.load()
    }

    fn bootstrap(&self, dataset: &Path, params: TrainingParams) -> PredictorResult<()> {
        let data = Dataset::from_path(dataset)?;
        let trained = train(&data, &FeatureSchema::titanic(), TARGET_FIELD, params)?;
        info!(
            accuracy = trained.held_out_accuracy(),
            "Bootstrap training complete"
        );
        write_artifacts(
            &self.paths,
            &ModelArtifact::from_trained(&trained, DEFAULT_VERSION),
        )
    }

    /// Number of times the files were read
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}
