//! Encodes a populated feature row into the float vector the ONNX model takes.
//!
//! Numeric columns pass through; text columns are replaced by the ordinal of
//! their value in the category list exported alongside the model in
//! `feature_info.json`. The output order is the template's column order.

use crate::error::{ArtifactError, InferenceError};
use crate::feature_row::{FeatureRow, FeatureValue, SchemaTemplate};
use serde::Deserialize;
use std::collections::HashMap;

/// Model-side metadata exported during training.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureInfo {
    /// ONNX input name (skl2onnx default: `float_input`)
    #[serde(default = "default_input_name")]
    pub input_name: String,
    /// Ordinal category lists for text columns
    #[serde(default)]
    pub categories: HashMap<String, Vec<String>>,
}

fn default_input_name() -> String {
    "float_input".to_string()
}

/// Row-to-tensor encoder
#[derive(Debug, Clone)]
pub struct RowEncoder {
    categories: HashMap<String, Vec<String>>,
}

impl RowEncoder {
    pub fn new(categories: HashMap<String, Vec<String>>) -> Self {
        Self { categories }
    }

    /// Encode a row; fails on a text value the model never saw.
    pub fn encode(&self, row: &FeatureRow) -> Result<Vec<f32>, InferenceError> {
        let mut features = Vec::with_capacity(row.len());

        for (column, value) in row.iter() {
            let encoded = match value {
                FeatureValue::Text(text) => {
                    let categories = self
                        .categories
                        .get(column)
                        .ok_or_else(|| InferenceError::UnmappedColumn(column.to_string()))?;
                    let position = categories.iter().position(|c| c == text).ok_or_else(|| {
                        InferenceError::UnknownCategory {
                            column: column.to_string(),
                            value: text.clone(),
                        }
                    })?;
                    position as f32
                }
                numeric => numeric.as_f32().unwrap_or_default(),
            };
            features.push(encoded);
        }

        Ok(features)
    }

    /// Encode the template's default row once so a template and feature info
    /// that disagree are rejected at load time.
    pub fn check_template(&self, template: &SchemaTemplate) -> Result<(), ArtifactError> {
        self.encode(&template.fresh_row()).map(|_| ()).map_err(|e| {
            ArtifactError::InvalidSchema(format!("template does not match feature info: {}", e))
        })
    }
}
