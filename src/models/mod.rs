//! Model artifacts and inference components

pub mod artifacts;
pub mod classifier;
pub mod encoder;
pub mod inference;
pub mod loader;

pub use artifacts::Artifacts;
pub use classifier::Classifier;
pub use encoder::{FeatureInfo, RowEncoder};
pub use inference::OnnxClassifier;
pub use loader::ModelLoader;
