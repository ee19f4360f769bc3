//! Early Student At-Risk Detection
//!
//! A decision-support web form: student attributes are merged into the
//! model's schema template, scored by a pre-trained ONNX classifier and
//! rendered as a verdict, risk band and recommended follow-up.

pub mod assessment;
pub mod config;
pub mod error;
pub mod feature_row;
pub mod formatter;
pub mod metrics;
pub mod models;
pub mod types;
pub mod web;

pub use assessment::RiskAssessor;
pub use config::AppConfig;
pub use feature_row::{build_row, FeatureRow, FeatureValue, InputValues, SchemaTemplate};
pub use formatter::classify;
pub use models::{Artifacts, Classifier};
pub use types::{prediction::PredictionReport, student::StudentSubmission};
