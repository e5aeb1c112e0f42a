//! Validin Classifiers
//!
//! Indonesian news preprocessing and hoax classification.
//!
//! The detector runs each article through a fixed pipeline:
//! - Normalization: lowercase, strip mentions, URLs, and punctuation
//! - Tokenization and Indonesian stopword removal
//! - Vocabulary lookup and padding to a fixed-length id sequence
//! - LSTM classification into HOAX/VALID probabilities
//! - Threshold decision into a labelled verdict
//!
//! Artifacts are loaded once at startup; everything after that is read-only
//! and safe to share across tasks.

pub mod config;
pub mod decision;
pub mod encoder;
pub mod lstm;
pub mod model_loader;
pub mod normalizer;
pub mod pipeline;
pub mod preprocess;
pub mod registry;
pub mod tokenizer;
pub mod vocabulary;

pub use config::{
    DetectorConfig, DeviceKind, DeviceSetting, IndexedDevice, LayerSizes, ModelSettings,
    VocabularySettings, WeightsFormat,
};
pub use decision::{DecisionPolicy, DEFAULT_THRESHOLD};
pub use encoder::SequenceEncoder;
pub use lstm::{LstmArchitecture, LstmClassifier};
pub use model_loader::{DeviceType, LoadedWeights, ModelFormat, ModelSource, WeightsConfig};
pub use normalizer::TextNormalizer;
pub use pipeline::{Detection, HoaxDetector};
pub use preprocess::{Inspection, PreparedText, Preprocessor};
pub use registry::{load_detector, load_vocabulary, SharedDetector, DETECTOR};
pub use tokenizer::{StopwordFilter, WordTokenizer};
pub use vocabulary::VocabularyIndex;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::DetectorConfig;
    pub use crate::decision::DecisionPolicy;
    pub use crate::pipeline::{Detection, HoaxDetector};
    pub use crate::preprocess::Preprocessor;
    pub use crate::registry::{load_detector, SharedDetector};
    pub use crate::vocabulary::VocabularyIndex;
    pub use validin_core::prelude::*;
}
