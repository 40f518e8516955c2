//! Survival model: classifier, fitted pipeline, artifacts and inference

pub mod artifact;
pub mod classifier;
pub mod inference;
pub mod loader;
pub mod pipeline;

pub use artifact::{ArtifactPaths, LoadedArtifact, ModelArtifact};
pub use inference::InferenceEngine;
pub use loader::ModelLoader;
pub use pipeline::SurvivalPipeline;
