//! The persisted model: a fitted tree plus the metadata needed to trust it.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use quizrank_core::{Difficulty, FEATURE_NAMES, FeatureVector, N_FEATURES, TrainingSample};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classifier::{DecisionTree, TreeParams};
use crate::error::ModelError;
use crate::labels::LabelSet;

/// Artifact layout version written by this build.
pub const FORMAT_VERSION: u32 = 1;

/// A trained difficulty model as stored on disk (pretty-printed JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    /// Labels in class-index order.
    pub labels: Vec<Difficulty>,
    pub training_samples: usize,
    pub params: TreeParams,
    pub tree: DecisionTree,
}

#[derive(Deserialize)]
struct VersionProbe {
    format_version: u32,
}

impl ModelArtifact {
    /// Encode `samples` through the fixed label map and fit a tree.
    pub fn train(samples: &[TrainingSample], params: &TreeParams) -> Result<Self, ModelError> {
        let set = LabelSet::from_samples(samples)?;
        let tree = DecisionTree::fit(&set.features, &set.targets, Difficulty::COUNT, params)?;

        info!(
            samples = set.len(),
            nodes = tree.node_count(),
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            "fitted decision tree"
        );

        Ok(Self {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            labels: Difficulty::ALL.to_vec(),
            training_samples: set.len(),
            params: *params,
            tree,
        })
    }

    /// Read and verify an artifact.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;

        // Check the version before the full decode so an incompatible layout
        // reports as such rather than as a missing field.
        let probe: VersionProbe = serde_json::from_str(&text)?;
        if probe.format_version != FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                found: probe.format_version,
                expected: FORMAT_VERSION,
            });
        }

        let artifact: Self = serde_json::from_str(&text)?;
        artifact.verify()?;
        debug!(path = %path.display(), nodes = artifact.tree.node_count(), "loaded model artifact");
        Ok(artifact)
    }

    /// Write atomically: serialize to a temp file beside `path`, then rename.
    /// Creates missing parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| io_error(&dir, e))?;
        serde_json::to_writer_pretty(&mut tmp, self)?;
        tmp.write_all(b"\n").map_err(|e| io_error(path, e))?;
        tmp.as_file().sync_all().map_err(|e| io_error(path, e))?;
        tmp.persist(path).map_err(|e| io_error(path, e.error))?;

        info!(path = %path.display(), "saved model artifact");
        Ok(())
    }

    /// Cross-check metadata against the fixed feature layout and label map.
    pub fn verify(&self) -> Result<(), ModelError> {
        if self.labels != Difficulty::ALL {
            return Err(ModelError::LabelMismatch);
        }
        if self.feature_names.len() != N_FEATURES
            || self.feature_names.iter().zip(FEATURE_NAMES).any(|(a, b)| a != b)
        {
            return Err(ModelError::Corrupt(format!(
                "feature names {:?}, expected {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }
        if self.tree.n_features() != N_FEATURES {
            return Err(ModelError::FeatureCount {
                expected: N_FEATURES,
                found: self.tree.n_features(),
            });
        }
        if self.tree.n_classes() != Difficulty::COUNT {
            return Err(ModelError::LabelMismatch);
        }
        Ok(())
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<Difficulty, ModelError> {
        let class = self.tree.predict(&features.to_array())?;
        Difficulty::from_class(class)
            .ok_or_else(|| ModelError::Corrupt(format!("tree predicted unknown class {class}")))
    }

    /// Per-label probability of the leaf `features` lands in.
    pub fn predict_proba(
        &self,
        features: &FeatureVector,
    ) -> Result<Vec<(Difficulty, f64)>, ModelError> {
        let proba = self.tree.predict_proba(&features.to_array())?;
        Ok(Difficulty::ALL.into_iter().zip(proba).collect())
    }
}

fn io_error(path: &Path, source: io::Error) -> ModelError {
    if source.kind() == io::ErrorKind::NotFound {
        ModelError::NotFound(path.to_path_buf())
    } else {
        ModelError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizrank_core::builtin_samples;

    fn trained() -> ModelArtifact {
        ModelArtifact::train(&builtin_samples(), &TreeParams::default()).unwrap()
    }

    #[test]
    fn train_records_metadata() {
        let a = trained();
        assert_eq!(a.format_version, FORMAT_VERSION);
        assert_eq!(a.feature_names, vec!["score", "time_taken"]);
        assert_eq!(a.labels, Difficulty::ALL.to_vec());
        assert_eq!(a.training_samples, 7);
        assert!(a.verify().is_ok());
    }

    #[test]
    fn trained_model_predicts_training_labels() {
        let a = trained();
        for s in builtin_samples() {
            assert_eq!(a.predict(&s.features()).unwrap(), s.difficulty);
        }
        assert_eq!(
            a.predict(&FeatureVector::new(80.0, 300.0)).unwrap(),
            Difficulty::Medium
        );
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/models/model.json");

        let a = trained();
        a.save(&path).unwrap();
        let b = ModelArtifact::load(&path).unwrap();

        assert_eq!(a, b);
        for score in [10.0, 50.0, 57.5, 65.0, 85.0, 100.0] {
            let v = FeatureVector::new(score, 400.0);
            assert_eq!(a.predict(&v).unwrap(), b.predict(&v).unwrap());
        }
    }

    #[test]
    fn save_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, "stale").unwrap();

        trained().save(&path).unwrap();
        assert!(ModelArtifact::load(&path).is_ok());
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = ModelArtifact::load(&path).unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn load_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, b"\x80\x81 not json").unwrap();
        assert!(ModelArtifact::load(&path).is_err());

        fs::write(&path, "{\"format_version\": 1, \"tree\": ").unwrap();
        assert!(matches!(
            ModelArtifact::load(&path),
            Err(ModelError::Parse(_))
        ));
    }

    #[test]
    fn load_rejects_other_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, r#"{"format_version": 99}"#).unwrap();
        assert!(matches!(
            ModelArtifact::load(&path),
            Err(ModelError::UnsupportedVersion {
                found: 99,
                expected: FORMAT_VERSION
            })
        ));
    }

    #[test]
    fn load_rejects_reordered_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let mut json = serde_json::to_value(trained()).unwrap();
        json["labels"] = serde_json::json!(["Hard", "Medium", "Easy"]);
        fs::write(&path, json.to_string()).unwrap();

        assert!(matches!(
            ModelArtifact::load(&path),
            Err(ModelError::LabelMismatch)
        ));
    }

    #[test]
    fn load_rejects_corrupt_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let mut json = serde_json::to_value(trained()).unwrap();
        json["tree"]["nodes"][0]["left"] = serde_json::json!(0);
        fs::write(&path, json.to_string()).unwrap();

        let err = ModelArtifact::load(&path).unwrap_err();
        assert!(err.to_string().contains("invalid child index"), "{err}");
    }

    #[test]
    fn proba_lists_every_label() {
        let p = trained()
            .predict_proba(&FeatureVector::new(40.0, 900.0))
            .unwrap();
        assert_eq!(p.len(), 3);
        assert_eq!(p[2], (Difficulty::Hard, 1.0));
    }
}
