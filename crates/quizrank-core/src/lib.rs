pub mod difficulty;
pub mod request;
pub mod sample;
pub mod schema;

pub use difficulty::Difficulty;
pub use request::{MISSING_INPUT_MESSAGE, PredictionRequest, PredictionResponse, RequestError};
pub use sample::{TrainingSample, builtin_samples};
pub use schema::{DEFAULT_MODEL_PATH, FEATURE_NAMES, FeatureVector, N_FEATURES};
