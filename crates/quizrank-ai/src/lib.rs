//! Learning layer: label encoding, CART training, model artifacts, and inference.

pub mod artifact;
pub mod classifier;
mod error;
pub mod heuristic;
pub mod labels;
pub mod predictor;

pub use artifact::{FORMAT_VERSION, ModelArtifact};
pub use classifier::{DecisionTree, Node, TreeParams};
pub use error::ModelError;
pub use heuristic::{AssessError, Assessment, assess, assess_json};
pub use labels::{LabelSet, LabelSummary};
pub use predictor::{InvokeError, Predictor, invoke};
