//! One submission end to end: validate, build the row, score, format.

use crate::error::{AssessmentError, InferenceError};
use crate::feature_row::build_row;
use crate::formatter::classify_with;
use crate::metrics::PredictionMetrics;
use crate::models::Artifacts;
use crate::types::prediction::{PredictionReport, RiskBandThresholds};
use crate::types::student::StudentSubmission;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Scores submissions against the loaded artifacts
pub struct RiskAssessor {
    artifacts: Arc<Artifacts>,
    thresholds: RiskBandThresholds,
    metrics: Arc<PredictionMetrics>,
}

impl RiskAssessor {
    pub fn new(
        artifacts: Arc<Artifacts>,
        thresholds: RiskBandThresholds,
        metrics: Arc<PredictionMetrics>,
    ) -> Self {
        Self {
            artifacts,
            thresholds,
            metrics,
        }
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn metrics(&self) -> &Arc<PredictionMetrics> {
        &self.metrics
    }

    /// Validate and score one submission.
    ///
    /// The model is only called once every field is present and in range.
    pub fn assess(
        &self,
        submission: &StudentSubmission,
    ) -> Result<PredictionReport, AssessmentError> {
        let profile = match submission.validate() {
            Ok(profile) => profile,
            Err(e) => {
                self.metrics.record_rejected();
                warn!(error = %e, "Submission rejected");
                return Err(e.into());
            }
        };

        let template = self.artifacts.template();
        let row = build_row(template, &profile.to_input_values());
        debug!(columns = row.len(), "Model input row built");

        let model = self.artifacts.model();
        let start_time = Instant::now();
        let prediction = model.score(&row).map_err(|e: InferenceError| {
            self.metrics.record_failure();
            error!(model = %model.name(), error = %e, "Inference failed");
            e
        })?;
        let inference_time = start_time.elapsed();

        let (risk_level, recommendation) =
            classify_with(prediction.label, prediction.probability, &self.thresholds);

        self.metrics
            .record_prediction(inference_time, prediction.label, risk_level);

        let report = PredictionReport::new(prediction, risk_level, recommendation, row);

        info!(
            submission_id = %report.submission_id,
            verdict = report.verdict,
            probability = ?report.probability,
            risk_level = %risk_level,
            inference_time_us = inference_time.as_micros(),
            "Submission scored"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubmissionError;
    use crate::feature_row::{FeatureRow, FeatureValue, SchemaTemplate};
    use crate::models::Classifier;
    use crate::types::prediction::{Label, Prediction, Recommendation, RiskLevel};
    use crate::types::student::{Subject, YesNo};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Flags students with G2 below 10
    struct GradeRule {
        calls: Arc<AtomicUsize>,
    }

    impl Classifier for GradeRule {
        fn name(&self) -> &str {
            "grade-rule"
        }

        fn predict(&self, row: &FeatureRow) -> Result<Label, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match row.get("G2") {
                Some(FeatureValue::Integer(g)) if *g < 10 => Ok(Label::AtRisk),
                _ => Ok(Label::NotAtRisk),
            }
        }

        fn predict_proba(&self, row: &FeatureRow) -> Result<Option<f64>, InferenceError> {
            match row.get("G2") {
                Some(FeatureValue::Integer(g)) if *g < 10 => Ok(Some(0.875)),
                Some(FeatureValue::Integer(_)) => Ok(Some(0.125)),
                _ => Ok(None),
            }
        }
    }

    fn assessor() -> (RiskAssessor, Arc<AtomicUsize>) {
        let template = SchemaTemplate::new(vec![
            ("school", FeatureValue::from("GP")),
            ("age", FeatureValue::from(17_i64)),
            ("G1", FeatureValue::from(11_i64)),
            ("G2", FeatureValue::from(11_i64)),
        ])
        .unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let model = GradeRule {
            calls: Arc::clone(&calls),
        };
        let artifacts = Arc::new(Artifacts::new(template, Box::new(model)));
        let assessor = RiskAssessor::new(
            artifacts,
            RiskBandThresholds::default(),
            Arc::new(PredictionMetrics::new()),
        );
        (assessor, calls)
    }

    fn submission(grade2: i64) -> StudentSubmission {
        StudentSubmission {
            age: Some(18),
            subject: Some(Subject::Portuguese),
            failures: Some(2),
            absences: Some(12),
            studytime: Some(1),
            schoolsup: Some(YesNo::No),
            famsup: Some(YesNo::No),
            internet: Some(YesNo::Yes),
            higher: Some(YesNo::Yes),
            grade1: Some(6),
            grade2: Some(grade2),
        }
    }

    #[test]
    fn test_at_risk_submission() {
        let (assessor, calls) = assessor();

        let report = assessor.assess(&submission(3)).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.label, Label::AtRisk);
        assert_eq!(report.verdict, "At Risk");
        assert_eq!(report.probability, Some(0.875));
        assert_eq!(report.risk_level, RiskLevel::High);
        assert_eq!(report.recommendation, Recommendation::AT_RISK);
        // template columns only, collected values written through
        assert_eq!(report.model_input.len(), 4);
        assert_eq!(report.model_input.get("G1"), Some(&FeatureValue::Integer(6)));
        assert_eq!(report.model_input.get("school"), Some(&FeatureValue::from("GP")));
    }

    #[test]
    fn test_not_at_risk_submission() {
        let (assessor, _) = assessor();

        let report = assessor.assess(&submission(18)).unwrap();

        assert_eq!(report.label, Label::NotAtRisk);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert_eq!(report.recommendation, Recommendation::NOT_AT_RISK);
    }

    #[test]
    fn test_incomplete_submission_never_scored() {
        let (assessor, calls) = assessor();
        let mut incomplete = submission(3);
        incomplete.famsup = None;

        let err = assessor.assess(&incomplete).unwrap_err();

        assert!(matches!(
            err,
            AssessmentError::Submission(SubmissionError::MissingFields(ref f))
                if f == &vec!["famsup"]
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(assessor.metrics().snapshot().rejected, 1);
    }

    #[test]
    fn test_score_default_combines_predict_and_proba() {
        let (assessor, _) = assessor();
        let row = assessor.artifacts().template().fresh_row();

        let prediction = assessor.artifacts().model().score(&row).unwrap();

        assert_eq!(
            prediction,
            Prediction {
                label: Label::NotAtRisk,
                probability: Some(0.125),
            }
        );
    }
}
