//! Feature layout shared by training and inference.

/// Feature names in column order. Index 0 is `score`, index 1 is `time_taken`.
pub const FEATURE_NAMES: [&str; 2] = ["score", "time_taken"];

/// Number of input features.
pub const N_FEATURES: usize = FEATURE_NAMES.len();

/// Where `train` writes the model artifact and the predictor reads it,
/// relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "ml_models/difficulty_predictor.json";

/// The ordered pair `(score, time_taken)` fed to the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub score: f64,
    pub time_taken: f64,
}

impl FeatureVector {
    pub const fn new(score: f64, time_taken: f64) -> Self {
        Self { score, time_taken }
    }

    /// Values in [`FEATURE_NAMES`] order.
    pub fn to_array(self) -> [f64; N_FEATURES] {
        [self.score, self.time_taken]
    }
}
