//! ONNX Runtime backed classifier

use crate::error::InferenceError;
use crate::feature_row::FeatureRow;
use crate::models::classifier::Classifier;
use crate::models::encoder::{FeatureInfo, RowEncoder};
use crate::models::loader::LoadedModel;
use crate::types::prediction::{Label, Prediction};
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Binary classifier running an ONNX graph exported from the training pipeline
pub struct OnnxClassifier {
    name: String,
    /// Session needs exclusive access to run
    model: Mutex<LoadedModel>,
    input_name: String,
    encoder: RowEncoder,
}

impl OnnxClassifier {
    pub fn new(model: LoadedModel, info: FeatureInfo) -> Self {
        Self {
            name: model.name.clone(),
            model: Mutex::new(model),
            input_name: info.input_name,
            encoder: RowEncoder::new(info.categories),
        }
    }

    /// Run the graph once and read label and probability outputs
    fn run(&self, features: &[f32]) -> Result<(Option<i64>, Option<f64>)> {
        use ort::value::Tensor;

        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .context("Failed to create input tensor")?;

        let mut model = self
            .model
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        let label_output = model.label_output.clone();
        let probability_output = model.probability_output.clone();

        let outputs = model
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])?;

        let label = match &label_output {
            Some(name) => match outputs.get(name.as_str()) {
                Some(output) => {
                    let (_, data) = output
                        .try_extract_tensor::<i64>()
                        .context("Label output is not an int64 tensor")?;
                    data.first().copied()
                }
                None => None,
            },
            None => None,
        };

        let probability = match &probability_output {
            Some(name) => match outputs.get(name.as_str()) {
                Some(output) => self.extract_probability(output)?,
                None => None,
            },
            None => None,
        };

        Ok((label, probability))
    }

    /// Extract P(class 1) from a tensor output (zipmap disabled) or a
    /// seq(map(int64, float)) output (skl2onnx default)
    fn extract_probability(&self, output: &ort::value::DynValue) -> Result<Option<f64>> {
        let dtype = output.dtype();

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            let prob = class_one_probability(&dims, data);
            debug!(model = %self.name, prob = ?prob, "Extracted from tensor");
            return Ok(prob);
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            return self.extract_from_sequence_map(output).map(Some);
        }

        warn!(model = %self.name, "Unsupported probability output type");
        Ok(None)
    }

    /// Extract probability from seq(map(int64, float)) format
    fn extract_from_sequence_map(&self, output: &ort::value::DynValue) -> Result<f64> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

        let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

        // batch size is always 1
        let map_value = maps
            .first()
            .ok_or_else(|| anyhow::anyhow!("Empty sequence"))?;

        let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;

        if let Some((_, prob)) = kv_pairs.iter().find(|(class_id, _)| *class_id == 1) {
            debug!(model = %self.name, prob = *prob, "Extracted from seq(map)");
            return Ok(*prob as f64);
        }

        if let Some((_, prob)) = kv_pairs.iter().find(|(class_id, _)| *class_id == 0) {
            return Ok(1.0 - *prob as f64);
        }

        Err(anyhow::anyhow!("No probability found in map"))
    }
}

/// Pick P(class 1) from a probability tensor's flat data.
///
/// `[batch, 2]` and `[2]` take index 1; `[batch, 1]` and `[1]` are already
/// the positive-class probability.
pub fn class_one_probability(dims: &[i64], data: &[f32]) -> Option<f64> {
    let classes = match dims {
        [_, classes] | [classes] => *classes,
        _ => return data.last().map(|&v| v as f64),
    };

    match classes {
        c if c >= 2 => data.get(1).map(|&v| v as f64),
        1 => data.first().map(|&v| v as f64),
        _ => None,
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, row: &FeatureRow) -> Result<Label, InferenceError> {
        self.score(row).map(|p| p.label)
    }

    fn predict_proba(&self, row: &FeatureRow) -> Result<Option<f64>, InferenceError> {
        self.score(row).map(|p| p.probability)
    }

    fn score(&self, row: &FeatureRow) -> Result<Prediction, InferenceError> {
        let features = self.encoder.encode(row)?;
        let (class, probability) = self.run(&features)?;

        let label = match (class, probability) {
            (Some(class), _) => Label::from_class(class)?,
            (None, Some(p)) => Label::from_probability(p),
            (None, None) => return Err(InferenceError::MissingOutput("label or probability")),
        };

        debug!(
            model = %self.name,
            label = ?label,
            probability = ?probability,
            "Inference complete"
        );

        Ok(Prediction { label, probability })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_one_probability_two_classes() {
        assert_eq!(class_one_probability(&[1, 2], &[0.25, 0.75]), Some(0.75));
        assert_eq!(class_one_probability(&[2], &[0.625, 0.375]), Some(0.375));
    }

    #[test]
    fn test_class_one_probability_single_column() {
        assert_eq!(class_one_probability(&[1, 1], &[0.5]), Some(0.5));
    }

    #[test]
    fn test_class_one_probability_fallback() {
        assert_eq!(class_one_probability(&[1, 1, 2], &[0.125, 0.875]), Some(0.875));
        assert_eq!(class_one_probability(&[1, 0], &[]), None);
    }
}
