//! Configuration for the detector and its artifacts

use crate::decision::DEFAULT_THRESHOLD;
use crate::lstm::LstmArchitecture;
use crate::model_loader::{DeviceType, ModelFormat, ModelSource, WeightsConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validin_core::{Error, Result, DEFAULT_MAX_LEN};

const DEFAULT_MODEL_PATH: &str = "./models/hoax_lstm.safetensors";

/// Detector configuration (the `detector:` section of `validin.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Classifier weights and architecture
    #[serde(default)]
    pub model: ModelSettings,

    /// Vocabulary artifact
    #[serde(default)]
    pub vocabulary: VocabularySettings,

    /// Stopword list replacing the built-in Indonesian one
    #[serde(default)]
    pub stopwords: Option<PathBuf>,

    /// Padded sequence length
    #[serde(default = "default_max_len")]
    pub max_len: usize,

    /// Hoax probability threshold
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

/// The `model:` section. Weights come from `path`, or from the Hugging Face
/// Hub when `repo_id` and `filename` are set; with neither, the default
/// local path is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    #[serde(default)]
    pub device: DeviceSetting,

    /// Weights format; guessed from the file extension when absent
    #[serde(default)]
    pub format: Option<WeightsFormat>,

    #[serde(default)]
    pub architecture: LayerSizes,
}

impl ModelSettings {
    /// Where the weights come from
    pub fn source(&self) -> Result<ModelSource> {
        match (&self.path, &self.repo_id, &self.filename) {
            (Some(_), Some(_), _) => Err(Error::config(
                "model: set either path or repo_id, not both",
            )),
            (Some(path), None, _) => Ok(ModelSource::LocalPath(path.clone())),
            (None, Some(repo_id), Some(filename)) => Ok(ModelSource::HuggingFace {
                repo_id: repo_id.clone(),
                revision: self.revision.clone(),
                filename: filename.clone(),
            }),
            (None, Some(repo_id), None) => Err(Error::config(format!(
                "model: repo_id {} needs a filename",
                repo_id
            ))),
            (None, None, Some(_)) => Err(Error::config("model: filename needs a repo_id")),
            (None, None, None) => Ok(ModelSource::LocalPath(PathBuf::from(DEFAULT_MODEL_PATH))),
        }
    }
}

/// Layer sizes as written in config files. `input_len` is taken from the
/// detector's `max_len`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LayerSizes {
    #[serde(default = "default_vocab_size")]
    pub vocab_size: usize,
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
    #[serde(default = "default_hidden_size")]
    pub hidden_size: usize,
    #[serde(default = "default_num_layers")]
    pub num_layers: usize,
}

impl Default for LayerSizes {
    fn default() -> Self {
        let defaults = LstmArchitecture::default();
        Self {
            vocab_size: defaults.vocab_size,
            embedding_dim: defaults.embedding_dim,
            hidden_size: defaults.hidden_size,
            num_layers: defaults.num_layers,
        }
    }
}

/// Inference device: `cpu`, `cuda`, `metal`, or `cuda: {index: 1}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceSetting {
    Kind(DeviceKind),
    Indexed(IndexedDevice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Cpu,
    Cuda,
    Metal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexedDevice {
    Cuda {
        #[serde(default)]
        index: usize,
    },
    Metal {
        #[serde(default)]
        index: usize,
    },
}

impl Default for DeviceSetting {
    fn default() -> Self {
        Self::Kind(DeviceKind::Cpu)
    }
}

impl DeviceSetting {
    pub fn to_device_type(self) -> DeviceType {
        match self {
            Self::Kind(DeviceKind::Cpu) => DeviceType::Cpu,
            Self::Kind(DeviceKind::Cuda) => DeviceType::Cuda(0),
            Self::Kind(DeviceKind::Metal) => DeviceType::Metal(0),
            Self::Indexed(IndexedDevice::Cuda { index }) => DeviceType::Cuda(index),
            Self::Indexed(IndexedDevice::Metal { index }) => DeviceType::Metal(index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightsFormat {
    SafeTensors,
    PyTorch,
}

impl From<WeightsFormat> for ModelFormat {
    fn from(format: WeightsFormat) -> Self {
        match format {
            WeightsFormat::SafeTensors => ModelFormat::SafeTensors,
            WeightsFormat::PyTorch => ModelFormat::PyTorch,
        }
    }
}

/// The `vocabulary:` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularySettings {
    /// Path to the vocabulary JSON
    #[serde(default = "default_vocabulary_path")]
    pub path: PathBuf,

    /// Override the artifact's id cap
    #[serde(default)]
    pub num_words: Option<u32>,
}

impl Default for VocabularySettings {
    fn default() -> Self {
        Self {
            path: default_vocabulary_path(),
            num_words: None,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model: ModelSettings::default(),
            vocabulary: VocabularySettings::default(),
            stopwords: None,
            max_len: default_max_len(),
            threshold: default_threshold(),
        }
    }
}

impl DetectorConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Invalid detector config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and the model source
    pub fn validate(&self) -> Result<()> {
        if self.max_len == 0 {
            return Err(Error::config("max_len must be positive"));
        }

        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::config(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }

        if self.vocabulary.num_words == Some(0) {
            return Err(Error::config("vocabulary num_words must be positive"));
        }

        self.model.source()?;
        self.architecture().validate()
    }

    /// Runtime architecture, with `input_len` tied to `max_len`
    pub fn architecture(&self) -> LstmArchitecture {
        let sizes = self.model.architecture;
        LstmArchitecture {
            vocab_size: sizes.vocab_size,
            embedding_dim: sizes.embedding_dim,
            hidden_size: sizes.hidden_size,
            num_layers: sizes.num_layers,
            input_len: self.max_len,
        }
    }

    /// Where and how to load the classifier weights
    pub fn weights_config(&self) -> Result<WeightsConfig> {
        Ok(WeightsConfig {
            source: self.model.source()?,
            device: self.model.device.to_device_type(),
            format: self.model.format.map(ModelFormat::from),
        })
    }

    /// Point the model at a local weights file
    pub fn set_model_path(&mut self, path: impl Into<PathBuf>) {
        self.model.path = Some(path.into());
        self.model.repo_id = None;
        self.model.filename = None;
        self.model.revision = None;
    }
}

fn default_max_len() -> usize {
    DEFAULT_MAX_LEN
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_vocabulary_path() -> PathBuf {
    PathBuf::from("./models/tokenizer.json")
}

fn default_vocab_size() -> usize {
    LstmArchitecture::default().vocab_size
}

fn default_embedding_dim() -> usize {
    LstmArchitecture::default().embedding_dim
}

fn default_hidden_size() -> usize {
    LstmArchitecture::default().hidden_size
}

fn default_num_layers() -> usize {
    LstmArchitecture::default().num_layers
}
