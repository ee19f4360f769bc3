//! Type definitions for submissions and predictions

pub mod prediction;
pub mod student;

pub use prediction::{
    Label, Prediction, PredictionReport, Recommendation, RiskBandThresholds, RiskLevel,
};
pub use student::{StudentForm, StudentProfile, StudentSubmission, Subject, YesNo};
