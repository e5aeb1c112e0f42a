//! Detector initialization and process-wide sharing

use crate::config::DetectorConfig;
use crate::decision::DecisionPolicy;
use crate::lstm::LstmClassifier;
use crate::model_loader::LoadedWeights;
use crate::pipeline::HoaxDetector;
use crate::preprocess::Preprocessor;
use crate::tokenizer::StopwordFilter;
use crate::vocabulary::VocabularyIndex;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;
use validin_core::{Error, Result};

/// Load every artifact named by `config` and assemble a detector.
///
/// Blocking: reads files and may download weights from the Hub.
pub fn load_detector(config: &DetectorConfig) -> Result<HoaxDetector> {
    config.validate()?;

    let vocabulary = load_vocabulary(&config.vocabulary.path, config.vocabulary.num_words)?;

    let architecture = config.architecture();
    if vocabulary.max_id() as usize >= architecture.vocab_size {
        return Err(Error::model_load(format!(
            "vocabulary uses ids up to {} but the embedding has {} rows",
            vocabulary.max_id(),
            architecture.vocab_size
        )));
    }

    let stopwords = match &config.stopwords {
        Some(path) => StopwordFilter::from_file(path)?,
        None => StopwordFilter::indonesian(),
    };
    info!("Using {} stopwords", stopwords.len());

    let preprocessor = Preprocessor::new(Arc::new(vocabulary))?
        .with_stopwords(stopwords)
        .with_max_len(config.max_len)?;

    let weights = LoadedWeights::load(&config.weights_config()?)?;
    let classifier = LstmClassifier::from_weights(&weights, architecture)?;

    let policy = DecisionPolicy::new(config.threshold)?;
    let detector = HoaxDetector::new(preprocessor, Arc::new(classifier), policy)?;

    info!(
        "Detector ready (classifier={}, threshold={})",
        detector.classifier_name(),
        config.threshold
    );

    Ok(detector)
}

/// Load the vocabulary artifact, applying a `num_words` override
pub fn load_vocabulary(path: impl AsRef<Path>, num_words: Option<u32>) -> Result<VocabularyIndex> {
    let vocabulary = VocabularyIndex::from_file(path)?;
    match num_words {
        Some(_) => vocabulary.with_num_words(num_words),
        None => Ok(vocabulary),
    }
}

/// Detector loaded at most once and shared by all callers.
///
/// Concurrent first callers wait for a single load; a failed load leaves the
/// cell empty so a later call can retry.
pub struct SharedDetector {
    cell: OnceCell<Arc<HoaxDetector>>,
}

impl SharedDetector {
    /// Create an empty holder
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Loaded detector, if any
    pub fn get(&self) -> Option<Arc<HoaxDetector>> {
        self.cell.get().cloned()
    }

    /// Return the detector, loading it from `config` on first use
    pub async fn get_or_load(&self, config: &DetectorConfig) -> Result<Arc<HoaxDetector>> {
        let config = config.clone();
        self.get_or_try_init_with(|| async move {
            tokio::task::spawn_blocking(move || load_detector(&config))
                .await
                .map_err(|e| Error::internal(format!("Detector loading task failed: {}", e)))?
        })
        .await
    }

    /// Return the detector, building it with `init` on first use
    pub async fn get_or_try_init_with<F, Fut>(&self, init: F) -> Result<Arc<HoaxDetector>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<HoaxDetector>>,
    {
        self.cell
            .get_or_try_init(|| async { init().await.map(Arc::new) })
            .await
            .cloned()
    }
}

impl Default for SharedDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide detector
pub static DETECTOR: SharedDetector = SharedDetector::new();
