//! The three-class difficulty label and its fixed class-index mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Output classification of the predictor.
///
/// Class indices are fixed: `Easy = 0`, `Medium = 1`, `Hard = 2`. Training
/// encodes through [`Difficulty::class`] and inference decodes through
/// [`Difficulty::from_class`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// All labels in class-index order.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Number of classes.
    pub const COUNT: usize = Self::ALL.len();

    /// Encode as a class index.
    pub fn class(self) -> usize {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 2,
        }
    }

    /// Decode a class index. `None` outside `0..3`.
    pub fn from_class(class: usize) -> Option<Self> {
        Self::ALL.get(class).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
