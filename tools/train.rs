//! Offline Training Tool
//!
//! Fits the survival pipeline on a CSV of passengers, reports held-out
//! accuracy and writes the model, feature list and version artifacts.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use titanic_survival::{
    models::artifact::{write_artifacts, ArtifactPaths, ModelArtifact, DEFAULT_VERSION},
    schema::{FeatureSchema, TARGET_FIELD},
    training::{train, TrainingParams},
    Dataset,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "train", about = "Train the Titanic survival model")]
struct Args {
    /// Training CSV with a header row
    #[arg(long, default_value = "data/titanic.csv")]
    data: PathBuf,

    /// Directory receiving model.json, columns.json and version.txt
    #[arg(long, default_value = "artifacts")]
    artifacts_dir: PathBuf,

    /// Binary target column
    #[arg(long, default_value = TARGET_FIELD)]
    target: String,

    /// Share of rows held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Version marker written to version.txt
    #[arg(long, default_value = DEFAULT_VERSION)]
    version: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("titanic_survival=info".parse()?)
                .add_directive("train=info".parse()?),
        )
        .init();

    let args = Args::parse();
    info!(data = %args.data.display(), seed = args.seed, "Starting training run");

    let dataset = Dataset::from_path(&args.data)
        .with_context(|| format!("Failed to read dataset {}", args.data.display()))?;

    let params = TrainingParams {
        test_fraction: args.test_fraction,
        seed: args.seed,
    };
    let trained = train(&dataset, &FeatureSchema::titanic(), &args.target, params)
        .context("Training failed")?;

    info!(
        fit_rows = trained.report.fit_rows,
        test_rows = trained.report.test_rows,
        dropped_rows = trained.report.dropped_rows,
        class_counts = ?trained.report.class_counts,
        "Training complete"
    );
    info!(intercept = trained.pipeline.intercept(), "Model intercept");
    for (name, weight) in trained.pipeline.coefficients() {
        info!(feature = %name, weight = format!("{:+.4}", weight), "Coefficient");
    }

    println!("Test Accuracy: {:.3}", trained.held_out_accuracy());

    let paths = ArtifactPaths::in_dir(&args.artifacts_dir);
    let artifact = ModelArtifact::from_trained(&trained, &args.version);
    write_artifacts(&paths, &artifact).with_context(|| {
        format!("Failed to write artifacts to {}", args.artifacts_dir.display())
    })?;

    Ok(())
}
