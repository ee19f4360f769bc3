//! The seam between the service and whatever scores a feature row

use crate::error::InferenceError;
use crate::feature_row::FeatureRow;
use crate::types::prediction::{Label, Prediction};

/// A pre-trained binary classifier over template-shaped rows.
pub trait Classifier: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Predicted class for the row.
    fn predict(&self, row: &FeatureRow) -> Result<Label, InferenceError>;

    /// P(at-risk) for the row, `Ok(None)` when the model has no probability
    /// output.
    fn predict_proba(&self, _row: &FeatureRow) -> Result<Option<f64>, InferenceError> {
        Ok(None)
    }

    /// Label and probability together. Backends that produce both from a
    /// single forward pass should override this.
    fn score(&self, row: &FeatureRow) -> Result<Prediction, InferenceError> {
        Ok(Prediction {
            label: self.predict(row)?,
            probability: self.predict_proba(row)?,
        })
    }
}
