//! Rule-based difficulty recommendation.
//!
//! A model-free alternative to the decision tree. It scores an attempt by
//! `performance_ratio = score / max(1, minutes)` and walks a fixed rule list,
//! recommending the difficulty of the *next* test: strong, fast attempts get
//! Hard, weak or slow ones get Easy.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use quizrank_core::Difficulty;

#[derive(Debug, Error)]
pub enum AssessError {
    #[error("Missing required fields: score and time_taken")]
    Missing,

    #[error("Invalid input: score and time_taken must be numbers")]
    NotNumbers,

    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Inputs echoed back with the derived ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Factors {
    pub score: f64,
    pub time_taken: f64,
    /// Rounded to two decimal places.
    pub performance_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub success: bool,
    pub predicted_difficulty: Difficulty,
    /// Percent.
    pub confidence: u8,
    pub factors: Factors,
    pub suggestion: &'static str,
}

/// Score per minute, with time floored at one minute.
pub fn performance_ratio(score: f64, time_taken: f64) -> f64 {
    score / (time_taken / 60.0).max(1.0)
}

pub fn assess(score: f64, time_taken: f64) -> Assessment {
    let ratio = performance_ratio(score, time_taken);

    let (difficulty, confidence) = if score >= 85.0 && time_taken <= 300.0 {
        (Difficulty::Hard, 85)
    } else if score >= 80.0 && ratio > 2.5 {
        (Difficulty::Hard, 80)
    } else if score >= 70.0 && time_taken <= 600.0 {
        (Difficulty::Medium, 75)
    } else if score >= 60.0 && ratio > 1.5 {
        (Difficulty::Medium, 70)
    } else {
        (Difficulty::Easy, 65)
    };

    Assessment {
        success: true,
        predicted_difficulty: difficulty,
        confidence,
        factors: Factors {
            score,
            time_taken,
            performance_ratio: round2(ratio),
        },
        suggestion: suggestion(difficulty),
    }
}

/// Parse a JSON object and assess it.
///
/// An absent key is `Missing`. A present key that is not a number, `null`
/// included, is `NotNumbers`.
pub fn assess_json(raw: &str) -> Result<Assessment, AssessError> {
    let value: Value = serde_json::from_str(raw)?;
    let (Some(score), Some(time_taken)) = (value.get("score"), value.get("time_taken")) else {
        return Err(AssessError::Missing);
    };
    match (score.as_f64(), time_taken.as_f64()) {
        (Some(s), Some(t)) => Ok(assess(s, t)),
        _ => Err(AssessError::NotNumbers),
    }
}

pub fn suggestion(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "Based on your performance, an easier test will help build confidence.",
        Difficulty::Medium => "Your performance suggests you're ready for a moderate challenge.",
        Difficulty::Hard => "Your strong performance indicates you're ready for a challenging test.",
    }
}

/// Round half up to two decimals.
fn round2(x: f64) -> f64 {
    (x * 100.0 + 0.5).floor() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_high_score_is_hard() {
        let a = assess(90.0, 240.0);
        assert_eq!(a.predicted_difficulty, Difficulty::Hard);
        assert_eq!(a.confidence, 85);
    }

    #[test]
    fn first_rule_boundaries() {
        assert_eq!(assess(85.0, 300.0).confidence, 85);
        // 301s: ratio 85 / 5.0167 ≈ 16.9, caught by the second rule instead.
        assert_eq!(assess(85.0, 301.0).confidence, 80);
    }

    #[test]
    fn high_ratio_is_hard() {
        // 80 / (1800/60) = 2.67
        let a = assess(80.0, 1800.0);
        assert_eq!(a.predicted_difficulty, Difficulty::Hard);
        assert_eq!(a.confidence, 80);
        assert_eq!(a.factors.performance_ratio, 2.67);
    }

    #[test]
    fn ratio_exactly_2_5_is_not_hard() {
        // 80 / 32 = 2.5, and 1920s is over the 600s medium cutoff.
        let a = assess(80.0, 1920.0);
        assert_eq!(a.predicted_difficulty, Difficulty::Medium);
        assert_eq!(a.confidence, 70);
    }

    #[test]
    fn moderate_is_medium() {
        let a = assess(72.0, 600.0);
        assert_eq!(a.predicted_difficulty, Difficulty::Medium);
        assert_eq!(a.confidence, 75);
    }

    #[test]
    fn slow_sixties_by_ratio() {
        // 65 / 40 = 1.625 > 1.5
        let a = assess(65.0, 2400.0);
        assert_eq!(a.predicted_difficulty, Difficulty::Medium);
        assert_eq!(a.confidence, 70);
    }

    #[test]
    fn low_score_is_easy() {
        let a = assess(40.0, 100.0);
        assert_eq!(a.predicted_difficulty, Difficulty::Easy);
        assert_eq!(a.confidence, 65);
        assert_eq!(a.suggestion, suggestion(Difficulty::Easy));
    }

    #[test]
    fn time_under_a_minute_is_floored() {
        assert_eq!(performance_ratio(50.0, 10.0), 50.0);
        assert_eq!(performance_ratio(50.0, 0.0), 50.0);
    }

    #[test]
    fn json_missing_field() {
        assert!(matches!(
            assess_json(r#"{"score": 80}"#),
            Err(AssessError::Missing)
        ));
    }

    #[test]
    fn json_non_numbers() {
        assert!(matches!(
            assess_json(r#"{"score": "80", "time_taken": 300}"#),
            Err(AssessError::NotNumbers)
        ));
        assert!(matches!(
            assess_json(r#"{"score": null, "time_taken": 300}"#),
            Err(AssessError::NotNumbers)
        ));
    }

    #[test]
    fn json_output_shape() {
        let a = assess_json(r#"{"score": 90, "time_taken": 240}"#).unwrap();
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["predicted_difficulty"], "Hard");
        assert_eq!(v["confidence"], 85);
        assert_eq!(v["factors"]["performance_ratio"], 22.5);
        assert!(v["suggestion"].as_str().unwrap().contains("challenging"));
    }
}
