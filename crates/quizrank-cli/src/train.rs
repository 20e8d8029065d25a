//! Training pipeline: encode samples, fit the tree, write the artifact.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use quizrank_ai::{LabelSet, ModelArtifact, TreeParams};
use quizrank_core::{Difficulty, TrainingSample};
use tracing::info;

pub struct TrainStats {
    pub total_samples: usize,
    pub per_class: [usize; Difficulty::COUNT],
    pub nodes: usize,
    pub leaves: usize,
    pub depth: usize,
    /// Fraction of training samples the fitted tree reproduces.
    pub training_accuracy: f64,
    pub elapsed_secs: f64,
}

/// Read a JSON array of `{score, time_taken, difficulty}` objects.
pub fn load_samples(path: &Path) -> anyhow::Result<Vec<TrainingSample>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading samples from {}", path.display()))?;
    let samples: Vec<TrainingSample> = serde_json::from_str(&text)
        .with_context(|| format!("parsing samples in {}", path.display()))?;
    info!(path = %path.display(), count = samples.len(), "loaded training samples");
    Ok(samples)
}

/// Run the full training pipeline: encode → fit → score → save.
pub fn run_train_pipeline(
    samples: &[TrainingSample],
    params: &TreeParams,
    output: &Path,
) -> anyhow::Result<TrainStats> {
    let start = Instant::now();

    // 1. Encode through the label map.
    let set = LabelSet::from_samples(samples).context("encoding training samples")?;
    let summary = set.summary();
    if summary.distinct_classes < Difficulty::COUNT {
        tracing::warn!(
            distinct = summary.distinct_classes,
            "training set does not cover every difficulty label"
        );
    }
    if summary.conflicting_samples > 0 {
        tracing::warn!(
            conflicting = summary.conflicting_samples,
            "identical feature rows carry different labels"
        );
    }

    // 2. Fit.
    let artifact = ModelArtifact::train(samples, params).context("fitting decision tree")?;

    // 3. Score on the training set.
    let correct = set
        .labelled_rows()
        .filter(|(row, label)| {
            artifact
                .tree
                .predict(row)
                .is_ok_and(|class| class == label.class())
        })
        .count();
    let training_accuracy = correct as f64 / set.len() as f64;

    // 4. Persist.
    artifact
        .save(output)
        .with_context(|| format!("writing model to {}", output.display()))?;

    Ok(TrainStats {
        total_samples: summary.total_samples,
        per_class: summary.per_class,
        nodes: artifact.tree.node_count(),
        leaves: artifact.tree.leaf_count(),
        depth: artifact.tree.depth(),
        training_accuracy,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}
