//! Label-encoded training data.
//!
//! Turns [`TrainingSample`]s into the numeric matrix the tree is fit on:
//! one feature row per sample in `FEATURE_NAMES` order, plus a class index
//! per sample from [`Difficulty::class`].

use std::collections::HashSet;

use quizrank_core::{Difficulty, TrainingSample};

use crate::error::ModelError;

/// Encoded training set, row-aligned: `features[i]` is labelled `targets[i]`.
pub struct LabelSet {
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<usize>,
}

/// Summary statistics for a LabelSet.
pub struct LabelSummary {
    pub total_samples: usize,
    /// Sample count per class, indexed by class.
    pub per_class: [usize; Difficulty::COUNT],
    pub distinct_classes: usize,
    /// Samples whose feature row also appears with a different label.
    pub conflicting_samples: usize,
}

impl LabelSet {
    /// Encode samples. Rejects non-finite feature values.
    pub fn from_samples(samples: &[TrainingSample]) -> Result<Self, ModelError> {
        if samples.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }

        let mut features = Vec::with_capacity(samples.len());
        let mut targets = Vec::with_capacity(samples.len());

        for (index, sample) in samples.iter().enumerate() {
            let row = sample.features().to_array();
            if let Some(bad) = row.iter().find(|v| !v.is_finite()) {
                return Err(ModelError::InvalidSample {
                    index,
                    reason: format!("non-finite feature value {bad}"),
                });
            }
            features.push(row.to_vec());
            targets.push(sample.difficulty.class());
        }

        Ok(Self { features, targets })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Summary statistics.
    pub fn summary(&self) -> LabelSummary {
        let mut per_class = [0usize; Difficulty::COUNT];
        for &t in &self.targets {
            per_class[t] += 1;
        }

        let distinct: HashSet<usize> = self.targets.iter().copied().collect();

        // Identical rows with different labels cap training accuracy below 1.
        let conflicting_samples = (0..self.len())
            .filter(|&i| {
                (0..self.len()).any(|j| {
                    j != i
                        && self.targets[j] != self.targets[i]
                        && self.features[j] == self.features[i]
                })
            })
            .count();

        LabelSummary {
            total_samples: self.len(),
            per_class,
            distinct_classes: distinct.len(),
            conflicting_samples,
        }
    }

    /// Iterate over `(feature_row, label)` pairs.
    pub fn labelled_rows(&self) -> impl Iterator<Item = (&[f64], Difficulty)> {
        self.features
            .iter()
            .zip(&self.targets)
            .filter_map(|(row, &t)| Difficulty::from_class(t).map(|d| (row.as_slice(), d)))
    }
}
