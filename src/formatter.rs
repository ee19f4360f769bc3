//! Maps raw model output to the risk band and recommendation shown to users.

use crate::types::prediction::{Label, Recommendation, RiskBandThresholds, RiskLevel};

/// Classify with the default 0.70 / 0.40 band thresholds.
pub fn classify(label: Label, probability: Option<f64>) -> (RiskLevel, Recommendation) {
    classify_with(label, probability, &RiskBandThresholds::default())
}

/// Classify with configured thresholds.
///
/// The band depends only on the probability and the recommendation only on
/// the label; a model may say "at risk" while the band reads "Low Risk".
pub fn classify_with(
    label: Label,
    probability: Option<f64>,
    thresholds: &RiskBandThresholds,
) -> (RiskLevel, Recommendation) {
    let band = RiskLevel::from_probability(probability, thresholds);
    let recommendation = match label {
        Label::AtRisk => Recommendation::AT_RISK,
        Label::NotAtRisk => Recommendation::NOT_AT_RISK,
    };
    (band, recommendation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_risk() {
        let (band, rec) = classify(Label::AtRisk, Some(0.85));
        assert_eq!(band, RiskLevel::High);
        assert_eq!(rec, Recommendation::AT_RISK);
    }

    #[test]
    fn test_low_risk() {
        let (band, rec) = classify(Label::NotAtRisk, Some(0.10));
        assert_eq!(band, RiskLevel::Low);
        assert_eq!(rec, Recommendation::NOT_AT_RISK);
    }

    #[test]
    fn test_moderate_risk() {
        let (band, _) = classify(Label::AtRisk, Some(0.55));
        assert_eq!(band, RiskLevel::Moderate);
    }

    #[test]
    fn test_missing_probability() {
        let (band, rec) = classify(Label::AtRisk, None);
        assert_eq!(band, RiskLevel::Unknown);
        assert_eq!(rec, Recommendation::AT_RISK);
    }

    #[test]
    fn test_band_boundaries_are_inclusive() {
        assert_eq!(classify(Label::NotAtRisk, Some(0.40)).0, RiskLevel::Moderate);
        assert_eq!(classify(Label::NotAtRisk, Some(0.70)).0, RiskLevel::High);
        assert_eq!(classify(Label::NotAtRisk, Some(0.3999)).0, RiskLevel::Low);
    }

    #[test]
    fn test_recommendation_ignores_band() {
        let (band, rec) = classify(Label::AtRisk, Some(0.05));
        assert_eq!(band, RiskLevel::Low);
        assert_eq!(rec.actions.len(), 3);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = RiskBandThresholds {
            moderate: 0.2,
            high: 0.5,
        };
        let (band, _) = classify_with(Label::AtRisk, Some(0.55), &thresholds);
        assert_eq!(band, RiskLevel::High);
    }
}
