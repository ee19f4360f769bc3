//! Artifact loaders: ONNX model, feature info and schema template

use crate::error::ArtifactError;
use crate::feature_row::SchemaTemplate;
use crate::models::encoder::FeatureInfo;
use anyhow::Context;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

/// Loaded ONNX model with metadata
pub struct LoadedModel {
    /// Model name (file stem)
    pub name: String,
    /// ONNX Runtime session
    pub session: Session,
    /// Output carrying the predicted class, if any
    pub label_output: Option<String>,
    /// Output carrying class probabilities, if any
    pub probability_output: Option<String>,
}

/// Loader for the service's artifacts
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new loader with default settings (1 thread)
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a new loader with specified number of ONNX threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Load the ONNX classifier
    pub fn load_model<P: AsRef<Path>>(&self, path: P) -> Result<LoadedModel, ArtifactError> {
        let path = path.as_ref();
        ensure_exists("model", path)?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());

        info!(
            model = %name,
            path = %path.display(),
            threads = self.onnx_threads,
            "Loading ONNX model"
        );

        let session = self
            .build_session(path)
            .map_err(|e| ArtifactError::Model {
                path: path.to_path_buf(),
                reason: format!("{:#}", e),
            })?;

        let label_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("label"))
            .map(|o| o.name.clone());

        let probability_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .map(|o| o.name.clone());

        if label_output.is_none() && probability_output.is_none() {
            return Err(ArtifactError::Model {
                path: path.to_path_buf(),
                reason: "model exposes neither a label nor a probability output".to_string(),
            });
        }

        info!(
            model = %name,
            label_output = ?label_output,
            probability_output = ?probability_output,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            name,
            session,
            label_output,
            probability_output,
        })
    }

    fn build_session(&self, path: &Path) -> anyhow::Result<Session> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;
        Ok(session)
    }

    /// Load `feature_info.json`
    pub fn load_feature_info<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<FeatureInfo, ArtifactError> {
        let path = path.as_ref();
        let raw = read_artifact("feature info", path)?;
        let info: FeatureInfo = serde_json::from_str(&raw)?;

        info!(
            path = %path.display(),
            input = %info.input_name,
            categorical_columns = info.categories.len(),
            "Feature info loaded"
        );

        Ok(info)
    }

    /// Load the split-orient schema template
    pub fn load_template<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<SchemaTemplate, ArtifactError> {
        let path = path.as_ref();
        let raw = read_artifact("schema template", path)?;
        let template = SchemaTemplate::from_split_json(&raw)?;

        info!(
            path = %path.display(),
            columns = template.len(),
            "Schema template loaded"
        );

        Ok(template)
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_exists(kind: &'static str, path: &Path) -> Result<(), ArtifactError> {
    if path.exists() {
        Ok(())
    } else {
        Err(ArtifactError::NotFound {
            kind,
            path: path.to_path_buf(),
        })
    }
}

fn read_artifact(kind: &'static str, path: &Path) -> Result<String, ArtifactError> {
    ensure_exists(kind, path)?;
    std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_model_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = ModelLoader::new().load_model(dir.path().join("model.onnx"));
        assert!(matches!(
            result,
            Err(ArtifactError::NotFound { kind: "model", .. })
        ));
    }

    #[test]
    fn test_load_template_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"columns": ["age", "subject"], "index": [0], "data": [[17, "Math"]]}}"#
        )
        .unwrap();

        let template = ModelLoader::new().load_template(file.path()).unwrap();
        assert_eq!(template.len(), 2);
        assert!(template.contains("subject"));
    }

    #[test]
    fn test_missing_template_is_not_found() {
        let result = ModelLoader::new().load_template("no/such/default_row.json");
        assert!(matches!(
            result,
            Err(ArtifactError::NotFound { kind: "schema template", .. })
        ));
    }

    #[test]
    fn test_load_feature_info() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"input_name": "input", "categories": {{"subject": ["Math", "Portuguese"]}}}}"#
        )
        .unwrap();

        let info = ModelLoader::new().load_feature_info(file.path()).unwrap();
        assert_eq!(info.input_name, "input");
        assert_eq!(info.categories["subject"].len(), 2);
    }
}
