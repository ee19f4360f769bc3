//! Error types for artifact loading, submissions and inference

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the model, feature info or schema template.
///
/// Every variant is fatal at startup: the server does not bind until all
/// artifacts are loaded.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Artifact file does not exist
    #[error("{kind} file not found: {}", path.display())]
    NotFound { kind: &'static str, path: PathBuf },

    /// Artifact file exists but could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact is not valid JSON or has the wrong shape
    #[error("malformed artifact JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema template violates its structural invariants
    #[error("invalid schema template: {0}")]
    InvalidSchema(String),

    /// ONNX Runtime rejected the model
    #[error("failed to load model {}: {reason}", path.display())]
    Model { path: PathBuf, reason: String },
}

/// A submission the model must not see.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    /// One or more required form fields were left unset
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A field was set but outside its accepted range or choices
    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Failures while encoding a row or scoring it with the model.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Text value not present in the column's category list
    #[error("unknown category {value:?} for column {column}")]
    UnknownCategory { column: String, value: String },

    /// Text column without a category list in the feature info
    #[error("column {0} has text values but no category mapping")]
    UnmappedColumn(String),

    /// Model produced a class outside {0, 1}
    #[error("model returned unsupported class label {0}")]
    UnexpectedLabel(i64),

    /// Model produced neither a label nor a probability
    #[error("model output did not contain a usable {0}")]
    MissingOutput(&'static str),

    #[error(transparent)]
    Runtime(#[from] anyhow::Error),
}

/// Why a submission produced no prediction.
#[derive(Debug, Error)]
pub enum AssessmentError {
    /// Rejected before the model was called
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// Model call failed
    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message() {
        let err = SubmissionError::MissingFields(vec!["age", "G1"]);
        assert_eq!(err.to_string(), "missing required fields: age, G1");
    }

    #[test]
    fn test_not_found_mentions_path() {
        let err = ArtifactError::NotFound {
            kind: "model",
            path: PathBuf::from("artifacts/model.onnx"),
        };
        let msg = err.to_string();
        assert!(msg.contains("model file not found"));
        assert!(msg.contains("artifacts/model.onnx"));
    }
}
