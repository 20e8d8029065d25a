//! Shared plumbing for the `quizrank` and `predict-difficulty` binaries.

pub mod display;
pub mod logging;
pub mod train;

/// Environment variable overriding the model artifact path.
pub const MODEL_ENV: &str = "QUIZRANK_MODEL";
