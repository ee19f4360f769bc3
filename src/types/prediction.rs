//! Prediction results and the report shown to the user

use crate::error::InferenceError;
use crate::feature_row::FeatureRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary model verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    NotAtRisk,
    AtRisk,
}

impl Label {
    /// Map a raw class id; only 0 and 1 are valid.
    pub fn from_class(class: i64) -> Result<Self, InferenceError> {
        match class {
            0 => Ok(Label::NotAtRisk),
            1 => Ok(Label::AtRisk),
            other => Err(InferenceError::UnexpectedLabel(other)),
        }
    }

    /// Label implied by P(at-risk) when the model exposes no label output.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.5 {
            Label::AtRisk
        } else {
            Label::NotAtRisk
        }
    }

    pub fn is_at_risk(self) -> bool {
        self == Label::AtRisk
    }

    /// Verdict string shown on the result page
    pub fn verdict(self) -> &'static str {
        match self {
            Label::AtRisk => "At Risk",
            Label::NotAtRisk => "Not At Risk",
        }
    }
}

/// Qualitative bucketing of P(at-risk), display only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Unknown,
}

impl RiskLevel {
    /// Determine risk level from an optional probability and thresholds
    pub fn from_probability(probability: Option<f64>, thresholds: &RiskBandThresholds) -> Self {
        match probability {
            None => RiskLevel::Unknown,
            Some(p) if p >= thresholds.high => RiskLevel::High,
            Some(p) if p >= thresholds.moderate => RiskLevel::Moderate,
            Some(_) => RiskLevel::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::High => "High Risk",
            RiskLevel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configurable risk band thresholds (lower bounds, inclusive)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskBandThresholds {
    pub moderate: f64,
    pub high: f64,
}

impl Default for RiskBandThresholds {
    fn default() -> Self {
        Self {
            moderate: 0.40,
            high: 0.70,
        }
    }
}

/// Static follow-up actions keyed by the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub actions: &'static [&'static str],
}

impl Recommendation {
    pub const AT_RISK: Recommendation = Recommendation {
        actions: &[
            "Provide early academic support",
            "Monitor attendance and engagement",
            "Consider counselling or remedial assistance",
        ],
    };

    pub const NOT_AT_RISK: Recommendation = Recommendation {
        actions: &[
            "Continue normal academic monitoring",
            "Encourage consistent study habits",
        ],
    };
}

/// Raw model output for one row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: Label,
    /// P(at-risk) if the model exposes probabilities
    pub probability: Option<f64>,
}

/// Everything the result view needs for one scored submission
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    /// Unique submission identifier
    pub submission_id: String,

    pub label: Label,

    /// "At Risk" / "Not At Risk"
    pub verdict: &'static str,

    /// P(at-risk) in [0, 1]
    pub probability: Option<f64>,

    pub risk_level: RiskLevel,

    pub recommendation: Recommendation,

    /// Full row handed to the model
    pub model_input: FeatureRow,

    pub timestamp: DateTime<Utc>,
}

impl PredictionReport {
    pub fn new(
        prediction: Prediction,
        risk_level: RiskLevel,
        recommendation: Recommendation,
        model_input: FeatureRow,
    ) -> Self {
        Self {
            submission_id: uuid::Uuid::new_v4().to_string(),
            label: prediction.label,
            verdict: prediction.label.verdict(),
            probability: prediction.probability,
            risk_level,
            recommendation,
            model_input,
            timestamp: Utc::now(),
        }
    }

    /// Probability clamped to [0, 1] for the progress bar
    pub fn progress(&self) -> Option<f64> {
        self.probability.map(|p| p.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_from_probability() {
        let thresholds = RiskBandThresholds::default();

        assert_eq!(RiskLevel::from_probability(Some(0.1), &thresholds), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(Some(0.4), &thresholds), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_probability(Some(0.69), &thresholds), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_probability(Some(0.7), &thresholds), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(None, &thresholds), RiskLevel::Unknown);
    }

    #[test]
    fn test_label_from_class() {
        assert_eq!(Label::from_class(0).unwrap(), Label::NotAtRisk);
        assert_eq!(Label::from_class(1).unwrap(), Label::AtRisk);
        assert!(matches!(
            Label::from_class(2),
            Err(InferenceError::UnexpectedLabel(2))
        ));
    }

    #[test]
    fn test_risk_level_serialization() {
        let json = serde_json::to_string(&RiskLevel::Moderate).unwrap();
        assert_eq!(json, "\"moderate\"");
        assert_eq!(RiskLevel::High.to_string(), "High Risk");
    }
}
