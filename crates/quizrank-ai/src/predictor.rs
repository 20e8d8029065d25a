//! Single-shot difficulty prediction behind one error boundary.
//!
//! [`invoke`] is the whole predictor contract: whatever happens while parsing
//! the request, loading the model, or running the tree (including a panic)
//! comes back as a [`PredictionResponse`], never as an `Err` or an unwind.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use quizrank_core::{Difficulty, FeatureVector, PredictionRequest, PredictionResponse, RequestError};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::artifact::ModelArtifact;
use crate::error::ModelError;

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A loaded model, held explicitly for the lifetime of one invocation.
pub struct Predictor {
    artifact: ModelArtifact,
    source: PathBuf,
}

impl Predictor {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let artifact = ModelArtifact::load(path)?;
        Ok(Self {
            artifact,
            source: path.to_path_buf(),
        })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Path the model was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<Difficulty, ModelError> {
        self.artifact.predict(features)
    }

    pub fn predict_proba(
        &self,
        features: &FeatureVector,
    ) -> Result<Vec<(Difficulty, f64)>, ModelError> {
        self.artifact.predict_proba(features)
    }
}

/// Run one prediction request end to end.
///
/// The request is validated before the model is touched, so a missing field
/// is reported as such even when no artifact exists.
pub fn invoke(raw: Option<&str>, model_path: &Path) -> PredictionResponse {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| try_invoke(raw, model_path)));

    match outcome {
        Ok(Ok(difficulty)) => {
            debug!(%difficulty, "prediction complete");
            difficulty.into()
        }
        Ok(Err(e)) => {
            warn!(error = %e, "prediction failed");
            PredictionResponse::failure(e)
        }
        Err(payload) => {
            let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };
            error!(panic_msg = %msg, "predictor panicked");
            PredictionResponse::failure(format!("internal error: {msg}"))
        }
    }
}

fn try_invoke(raw: Option<&str>, model_path: &Path) -> Result<Difficulty, InvokeError> {
    let raw = raw.ok_or(RequestError::NoRequest)?;
    let features = PredictionRequest::parse(raw)?;
    let predictor = Predictor::load(model_path)?;
    Ok(predictor.predict(&features)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::TreeParams;
    use quizrank_core::{MISSING_INPUT_MESSAGE, builtin_samples};

    fn model_dir() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ml_models/difficulty_predictor.json");
        ModelArtifact::train(&builtin_samples(), &TreeParams::default())
            .unwrap()
            .save(&path)
            .unwrap();
        (dir, path)
    }

    #[test]
    fn predicts_medium_for_80_300() {
        let (_dir, path) = model_dir();
        let resp = invoke(Some(r#"{"score": 80, "time_taken": 300}"#), &path);
        assert_eq!(resp, PredictionResponse::success(Difficulty::Medium));
    }

    #[test]
    fn same_request_same_output() {
        let (_dir, path) = model_dir();
        let raw = Some(r#"{"score": 62.5, "time_taken": 480}"#);
        let a = invoke(raw, &path).to_json().unwrap();
        let b = invoke(raw, &path).to_json().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn well_formed_requests_always_succeed() {
        let (_dir, path) = model_dir();
        for (score, time) in [(0, 0), (100, 100), (50, 2000), (-5, 60), (1000, 1)] {
            let raw = format!(r#"{{"score": {score}, "time_taken": {time}}}"#);
            assert!(invoke(Some(&raw), &path).is_success(), "{raw}");
        }
    }

    #[test]
    fn missing_field_message() {
        let (_dir, path) = model_dir();
        let resp = invoke(Some(r#"{"score": 80}"#), &path);
        assert_eq!(resp, PredictionResponse::failure(MISSING_INPUT_MESSAGE));
    }

    #[test]
    fn missing_field_reported_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let resp = invoke(Some(r#"{"time_taken": 300}"#), &dir.path().join("none.json"));
        assert_eq!(resp, PredictionResponse::failure(MISSING_INPUT_MESSAGE));
    }

    #[test]
    fn absent_model_is_error_payload() {
        let dir = tempfile::tempdir().unwrap();
        let resp = invoke(
            Some(r#"{"score": 80, "time_taken": 300}"#),
            &dir.path().join("none.json"),
        );
        match resp {
            PredictionResponse::Failure { error } => {
                assert!(error.starts_with("model artifact not found"), "{error}")
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_model_is_error_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{ definitely not a model").unwrap();
        let resp = invoke(Some(r#"{"score": 80, "time_taken": 300}"#), &path);
        assert!(!resp.is_success());
    }

    #[test]
    fn no_argument_is_error_payload() {
        let (_dir, path) = model_dir();
        let resp = invoke(None, &path);
        assert_eq!(resp, PredictionResponse::failure(RequestError::NoRequest));
    }

    #[test]
    fn malformed_json_is_error_payload() {
        let (_dir, path) = model_dir();
        match invoke(Some("{score: 80}"), &path) {
            PredictionResponse::Failure { error } => {
                assert!(error.starts_with("malformed request"), "{error}")
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn array_request_is_rejected() {
        let (_dir, path) = model_dir();
        for raw in ["[80, 300]", "[80]", "80"] {
            match invoke(Some(raw), &path) {
                PredictionResponse::Failure { error } => assert!(
                    error.starts_with("malformed request: expected a JSON object"),
                    "{raw}: {error}"
                ),
                other => panic!("{raw}: expected failure, got {other:?}"),
            }
        }
    }

    #[test]
    fn predictor_handle_reports_source() {
        let (_dir, path) = model_dir();
        let p = Predictor::load(&path).unwrap();
        assert_eq!(p.source(), path.as_path());
        assert_eq!(
            p.predict(&FeatureVector::new(90.0, 250.0)).unwrap(),
            Difficulty::Easy
        );
    }
}
