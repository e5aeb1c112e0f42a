//! Model weight loading for the Candle-based classifier

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::path::{Path, PathBuf};
use tracing::info;
use validin_core::{Error, Result};

/// Source location for model weights
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    /// Load from local file system
    LocalPath(PathBuf),

    /// Download from Hugging Face Hub
    HuggingFace {
        repo_id: String,
        revision: Option<String>,
        filename: String,
    },
}

/// Device type for inference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// CPU inference (always available)
    Cpu,
    /// CUDA GPU inference (if available)
    Cuda(usize),
    /// Metal (Apple Silicon)
    Metal(usize),
}

/// Model file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// SafeTensors format (recommended)
    SafeTensors,
    /// PyTorch format
    PyTorch,
}

impl ModelFormat {
    /// Guess the format from a file extension, defaulting to SafeTensors
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("pt") | Some("pth") | Some("bin") => Self::PyTorch,
            _ => Self::SafeTensors,
        }
    }
}

/// Where and how to load weights
#[derive(Debug, Clone)]
pub struct WeightsConfig {
    /// Source of the weights
    pub source: ModelSource,

    /// Device to run inference on
    pub device: DeviceType,

    /// Weights file format; guessed from the file name when `None`
    pub format: Option<ModelFormat>,
}

/// Weights mapped into a `VarBuilder`, ready for layer construction
pub struct LoadedWeights {
    var_builder: VarBuilder<'static>,
    path: PathBuf,
}

impl LoadedWeights {
    /// Resolve, map and wrap the weights described by `config`
    pub fn load(config: &WeightsConfig) -> Result<Self> {
        let path = resolve_weights_path(&config.source)?;
        let device = create_device(config.device)?;
        let format = config.format.unwrap_or_else(|| ModelFormat::from_path(&path));

        let var_builder = match format {
            ModelFormat::SafeTensors => {
                // SAFETY: the file is memory-mapped read-only and is not
                // modified while the process runs.
                unsafe { VarBuilder::from_mmaped_safetensors(&[&path], DType::F32, &device) }
                    .map_err(|e| Error::model_load(format!("Failed to load SafeTensors: {}", e)))?
            }
            ModelFormat::PyTorch => VarBuilder::from_pth(&path, DType::F32, &device)
                .map_err(|e| Error::model_load(format!("Failed to load PyTorch weights: {}", e)))?,
        };

        info!("Mapped {:?} weights from {}", format, path.display());

        Ok(Self { var_builder, path })
    }

    /// VarBuilder rooted at the top of the weights file
    pub fn var_builder(&self) -> &VarBuilder<'static> {
        &self.var_builder
    }

    /// Resolved weights path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Resolve model path from source, downloading from the Hub if needed
pub fn resolve_weights_path(source: &ModelSource) -> Result<PathBuf> {
    match source {
        ModelSource::LocalPath(path) => {
            if !path.exists() {
                return Err(Error::model_load(format!(
                    "Model file not found: {}",
                    path.display()
                )));
            }
            Ok(path.clone())
        }
        ModelSource::HuggingFace {
            repo_id,
            revision,
            filename,
        } => {
            info!("Fetching {} from Hugging Face repo {}", filename, repo_id);

            let api = Api::new()
                .map_err(|e| Error::model_load(format!("Failed to initialize HF API: {}", e)))?;

            let repo = api.repo(Repo::with_revision(
                repo_id.clone(),
                RepoType::Model,
                revision.clone().unwrap_or_else(|| "main".to_string()),
            ));

            repo.get(filename)
                .map_err(|e| Error::model_load(format!("Failed to download model from HF: {}", e)))
        }
    }
}

/// Create Candle device from device type
pub fn create_device(device_type: DeviceType) -> Result<Device> {
    match device_type {
        DeviceType::Cpu => Ok(Device::Cpu),
        DeviceType::Cuda(idx) => Device::new_cuda(idx)
            .map_err(|e| Error::model_load(format!("Failed to create CUDA device: {}", e))),
        DeviceType::Metal(idx) => Device::new_metal(idx)
            .map_err(|e| Error::model_load(format!("Failed to create Metal device: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ModelFormat::from_path(Path::new("m.pth")), ModelFormat::PyTorch);
        assert_eq!(ModelFormat::from_path(Path::new("m.safetensors")), ModelFormat::SafeTensors);
    }

    #[test]
    fn test_missing_local_file_is_model_load_error() {
        let err = resolve_weights_path(&ModelSource::LocalPath("/nonexistent/model.safetensors".into()))
            .unwrap_err();
        assert!(err.is_startup_failure());
    }
}
