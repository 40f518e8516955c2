//! Offline training: stratified split, pipeline fit and held-out evaluation.

use crate::dataset::{Dataset, LabeledRow};
use crate::error::{PredictorError, PredictorResult};
use crate::feature_extractor::FeatureExtractor;
use crate::models::pipeline::SurvivalPipeline;
use crate::schema::{FeatureSchema, FeatureValue};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

/// Split and seed parameters.
#[derive(Debug, Clone, Copy)]
pub struct TrainingParams {
    /// Share of rows held out for evaluation, strictly between 0 and 1
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Summary of a training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub held_out_accuracy: f64,
    pub dropped_rows: usize,
    pub fit_rows: usize,
    pub test_rows: usize,
    /// Row counts of class 0 and class 1 after dropping null targets
    pub class_counts: [usize; 2],
}

/// Output of [`train`].
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub pipeline: SurvivalPipeline,
    pub report: TrainingReport,
}

impl TrainedModel {
    pub fn held_out_accuracy(&self) -> f64 {
        self.report.held_out_accuracy
    }
}

/// Fit the survival pipeline on `dataset` and score it on a stratified held-out split.
pub fn train(
    dataset: &Dataset,
    schema: &FeatureSchema,
    target_field: &str,
    params: TrainingParams,
) -> PredictorResult<TrainedModel> {
    if !(params.test_fraction > 0.0 && params.test_fraction < 1.0) {
        return Err(PredictorError::InvalidInput(format!(
            "test fraction must be in (0, 1), got {}",
            params.test_fraction
        )));
    }

    let rows = dataset.labeled_rows(schema, target_field)?;
    let total = rows.len();
    let extractor = FeatureExtractor::new();
    let names = schema.names();

    let mut features = Vec::with_capacity(total);
    let mut labels = Vec::with_capacity(total);
    for LabeledRow { features: record, target } in rows {
        if let Some(label) = target {
            features.push(extractor.select(&record, &names)?);
            labels.push(label);
        }
    }
    let dropped_rows = total - labels.len();

    let class_counts = [
        labels.iter().filter(|&&l| l == 0).count(),
        labels.iter().filter(|&&l| l == 1).count(),
    ];
    if class_counts.contains(&0) {
        return Err(PredictorError::InsufficientData(format!(
            "need both classes to stratify, got {} negative and {} positive rows",
            class_counts[0], class_counts[1]
        )));
    }

    let (fit_idx, test_idx) = stratified_split(&labels, params.test_fraction, params.seed);
    if test_idx.is_empty() {
        return Err(PredictorError::InsufficientData(format!(
            "{} labelled rows leave no held-out rows at test fraction {}",
            labels.len(),
            params.test_fraction
        )));
    }

    let (fit_rows, fit_labels) = gather(&features, &labels, &fit_idx);
    let (test_rows, test_labels) = gather(&features, &labels, &test_idx);
    if !(test_labels.contains(&0) && test_labels.contains(&1)) {
        return Err(PredictorError::InsufficientData(format!(
            "held-out split of {} rows has a single class; class counts {:?}",
            test_labels.len(),
            class_counts
        )));
    }

    let pipeline = SurvivalPipeline::fit(schema, &fit_rows, &fit_labels)?;

    let mut correct = 0usize;
    for (row, label) in test_rows.iter().zip(&test_labels) {
        if pipeline.predict(row)? == *label {
            correct += 1;
        }
    }
    let held_out_accuracy = correct as f64 / test_rows.len() as f64;

    info!(
        fit_rows = fit_rows.len(),
        test_rows = test_rows.len(),
        dropped_rows,
        accuracy = held_out_accuracy,
        "Training complete"
    );

    Ok(TrainedModel {
        pipeline,
        report: TrainingReport {
            held_out_accuracy,
            dropped_rows,
            fit_rows: fit_rows.len(),
            test_rows: test_rows.len(),
            class_counts,
        },
    })
}

/// Per-class shuffled split; returns sorted (fit, test) row indices.
///
/// Each class keeps at least one row in the fit split.
pub fn stratified_split(labels: &[usize], test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut fit = Vec::new();
    let mut test = Vec::new();

    for class in [0usize, 1] {
        let mut idx: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == class)
            .map(|(i, _)| i)
            .collect();
        if idx.is_empty() {
            continue;
        }
        idx.shuffle(&mut rng);
        let n_test = ((idx.len() as f64 * test_fraction).round() as usize).min(idx.len() - 1);
        test.extend_from_slice(&idx[..n_test]);
        fit.extend_from_slice(&idx[n_test..]);
    }

    fit.sort_unstable();
    test.sort_unstable();
    (fit, test)
}

fn gather(
    features: &[Vec<FeatureValue>],
    labels: &[usize],
    idx: &[usize],
) -> (Vec<Vec<FeatureValue>>, Vec<usize>) {
    idx.iter()
        .map(|&i| (features[i].clone(), labels[i]))
        .unzip()
}
