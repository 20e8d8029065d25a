use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot access model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported model format version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("model label table does not match Easy/Medium/Hard")]
    LabelMismatch,

    #[error("corrupt model: {0}")]
    Corrupt(String),

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("invalid training sample {index}: {reason}")]
    InvalidSample { index: usize, reason: String },

    #[error("expected {expected} features, found {found}")]
    FeatureCount { expected: usize, found: usize },
}
