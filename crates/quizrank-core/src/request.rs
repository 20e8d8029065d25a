//! The predictor's wire contract: one JSON request in, one JSON response out.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::difficulty::Difficulty;
use crate::schema::FeatureVector;

/// Message reported when either feature is absent or `null`.
pub const MISSING_INPUT_MESSAGE: &str = "Missing required input: 'score' and 'time_taken'";

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{}", MISSING_INPUT_MESSAGE)]
    Missing,

    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("malformed request: expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("malformed request: '{field}' must be a number, got {found}")]
    NotANumber {
        field: &'static str,
        found: &'static str,
    },

    #[error("no request given: expected one JSON argument with 'score' and 'time_taken'")]
    NoRequest,
}

/// A prediction request as received from the caller.
///
/// Both fields are optional at the wire level so that an absent key and an
/// explicit `null` are reported the same way. Unknown keys (the web caller
/// also sends `userId` and `subject`) are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub score: Option<f64>,
    pub time_taken: Option<f64>,
}

impl PredictionRequest {
    /// Only a JSON object is accepted. A repeated key keeps its last value.
    pub fn from_json(raw: &str) -> Result<Self, RequestError> {
        let object = match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => map,
            other => return Err(RequestError::NotAnObject(json_kind(&other))),
        };
        Ok(Self {
            score: number_field(&object, "score")?,
            time_taken: number_field(&object, "time_taken")?,
        })
    }

    /// Require both features.
    pub fn features(&self) -> Result<FeatureVector, RequestError> {
        match (self.score, self.time_taken) {
            (Some(score), Some(time_taken)) => Ok(FeatureVector::new(score, time_taken)),
            _ => Err(RequestError::Missing),
        }
    }

    /// Parse a raw JSON argument straight into a feature vector.
    pub fn parse(raw: &str) -> Result<FeatureVector, RequestError> {
        Self::from_json(raw)?.features()
    }
}

/// Exactly one of these is printed per predictor invocation.
///
/// Serializes untagged, so the two shapes are
/// `{"predicted_difficulty": "Easy"}` and `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionResponse {
    Success { predicted_difficulty: Difficulty },
    Failure { error: String },
}

impl PredictionResponse {
    pub fn success(difficulty: Difficulty) -> Self {
        Self::Success {
            predicted_difficulty: difficulty,
        }
    }

    pub fn failure(err: impl fmt::Display) -> Self {
        Self::Failure {
            error: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Compact single-line JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn number_field(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<f64>, RequestError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(other) => Err(RequestError::NotANumber {
            field,
            found: json_kind(other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl From<Difficulty> for PredictionResponse {
    fn from(difficulty: Difficulty) -> Self {
        Self::success(difficulty)
    }
}
