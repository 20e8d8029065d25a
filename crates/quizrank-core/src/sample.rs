//! Labelled training samples and the built-in training set.

use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::schema::FeatureVector;

/// One labelled observation: a quiz attempt and the difficulty it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub score: f64,
    /// Seconds spent on the attempt.
    pub time_taken: f64,
    pub difficulty: Difficulty,
}

impl TrainingSample {
    pub const fn new(score: f64, time_taken: f64, difficulty: Difficulty) -> Self {
        Self {
            score,
            time_taken,
            difficulty,
        }
    }

    pub fn features(&self) -> FeatureVector {
        FeatureVector::new(self.score, self.time_taken)
    }
}

const BUILTIN: [TrainingSample; 7] = [
    TrainingSample::new(80.0, 300.0, Difficulty::Medium),
    TrainingSample::new(60.0, 600.0, Difficulty::Medium),
    TrainingSample::new(45.0, 800.0, Difficulty::Hard),
    TrainingSample::new(90.0, 250.0, Difficulty::Easy),
    TrainingSample::new(30.0, 1000.0, Difficulty::Hard),
    TrainingSample::new(70.0, 350.0, Difficulty::Easy),
    TrainingSample::new(55.0, 750.0, Difficulty::Hard),
];

/// The fixed seven-row training set the shipped model is fit on.
pub fn builtin_samples() -> Vec<TrainingSample> {
    BUILTIN.to_vec()
}
