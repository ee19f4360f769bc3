//! Process-wide model and schema artifacts.
//!
//! Both artifacts are loaded once, before the server binds, and are read-only
//! for the lifetime of the process. There is no reload path.

use crate::config::ArtifactsConfig;
use crate::error::ArtifactError;
use crate::feature_row::SchemaTemplate;
use crate::models::classifier::Classifier;
use crate::models::encoder::RowEncoder;
use crate::models::inference::OnnxClassifier;
use crate::models::loader::ModelLoader;
use std::sync::{Arc, OnceLock};
use tracing::info;

static ARTIFACTS: OnceLock<Arc<Artifacts>> = OnceLock::new();

/// The schema template and the classifier that consumes rows built from it
pub struct Artifacts {
    template: SchemaTemplate,
    model: Box<dyn Classifier>,
}

impl Artifacts {
    pub fn new(template: SchemaTemplate, model: Box<dyn Classifier>) -> Self {
        Self { template, model }
    }

    /// Load all artifact files named in the configuration.
    ///
    /// The template's defaults must encode with the feature info before the
    /// model is opened.
    pub fn load(config: &ArtifactsConfig) -> Result<Self, ArtifactError> {
        let loader = ModelLoader::with_threads(config.onnx_threads);

        let template = loader.load_template(config.schema_path())?;
        let info = loader.load_feature_info(config.feature_info_path())?;
        RowEncoder::new(info.categories.clone()).check_template(&template)?;
        let model = loader.load_model(config.model_path())?;

        Ok(Self::new(template, Box::new(OnnxClassifier::new(model, info))))
    }

    /// The process-wide artifacts, loading them on first call.
    ///
    /// A failed load leaves the singleton empty and returns the error; later
    /// calls ignore `config` once loading has succeeded.
    pub fn global(config: &ArtifactsConfig) -> Result<Arc<Artifacts>, ArtifactError> {
        if let Some(artifacts) = ARTIFACTS.get() {
            return Ok(Arc::clone(artifacts));
        }

        let loaded = Arc::new(Self::load(config)?);
        let artifacts = ARTIFACTS.get_or_init(|| loaded);

        info!(
            model = %artifacts.model.name(),
            columns = artifacts.template.len(),
            "Artifacts initialized"
        );

        Ok(Arc::clone(artifacts))
    }

    pub fn template(&self) -> &SchemaTemplate {
        &self.template
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }
}
