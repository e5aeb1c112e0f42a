//! Recurrent hoax classifier
//!
//! Embedding → stacked unidirectional LSTM → last hidden state → dense
//! layer with two outputs → softmax. Output index 0 is VALID, index 1 is
//! HOAX.
//!
//! Expected tensor names in the weights file:
//!
//! | name                   | shape                        |
//! |------------------------|------------------------------|
//! | `embedding.weight`     | `(vocab_size, embedding_dim)`|
//! | `lstm.weight_ih_l{k}`  | `(4 * hidden, input_dim)`    |
//! | `lstm.weight_hh_l{k}`  | `(4 * hidden, hidden)`       |
//! | `lstm.bias_ih_l{k}`    | `(4 * hidden)`               |
//! | `lstm.bias_hh_l{k}`    | `(4 * hidden)`               |
//! | `dense.weight`         | `(2, hidden)`                |
//! | `dense.bias`           | `(2)`                        |
//!
//! Gates are ordered input, forget, cell, output. Models exported from
//! frameworks with a single LSTM bias store it in `bias_ih` and zeros in
//! `bias_hh`; kernels stored as `(input_dim, 4 * hidden)` must be
//! transposed on export.

use crate::model_loader::LoadedWeights;
use async_trait::async_trait;
use candle_core::{Device, IndexOp, Tensor, D};
use candle_nn::rnn::{LSTMConfig, LSTM, RNN};
use candle_nn::{Embedding, Linear, Module, VarBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use validin_core::{Error, PaddedSequence, Prediction, Result, SequenceClassifier, DEFAULT_MAX_LEN};

/// Number of output classes
const NUM_CLASSES: usize = 2;

const CLASSIFIER_NAME: &str = "hoax-lstm";

/// Layer sizes of the recurrent classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LstmArchitecture {
    /// Rows of the embedding table (largest usable id + 1)
    #[serde(default = "default_vocab_size")]
    pub vocab_size: usize,

    /// Embedding width
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    /// LSTM hidden state width
    #[serde(default = "default_hidden_size")]
    pub hidden_size: usize,

    /// Number of stacked LSTM layers
    #[serde(default = "default_num_layers")]
    pub num_layers: usize,

    /// Input sequence length
    #[serde(default = "default_input_len")]
    pub input_len: usize,
}

impl Default for LstmArchitecture {
    fn default() -> Self {
        Self {
            vocab_size: default_vocab_size(),
            embedding_dim: default_embedding_dim(),
            hidden_size: default_hidden_size(),
            num_layers: default_num_layers(),
            input_len: default_input_len(),
        }
    }
}

impl LstmArchitecture {
    /// Reject zero-sized layers
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("vocab_size", self.vocab_size),
            ("embedding_dim", self.embedding_dim),
            ("hidden_size", self.hidden_size),
            ("num_layers", self.num_layers),
            ("input_len", self.input_len),
        ];

        for (name, value) in fields {
            if value == 0 {
                return Err(Error::config(format!("model {} must be positive", name)));
            }
        }
        Ok(())
    }
}

fn default_vocab_size() -> usize {
    5000
}

fn default_embedding_dim() -> usize {
    100
}

fn default_hidden_size() -> usize {
    64
}

fn default_num_layers() -> usize {
    1
}

fn default_input_len() -> usize {
    DEFAULT_MAX_LEN
}

/// Candle implementation of the recurrent hoax classifier
pub struct LstmClassifier {
    network: Arc<LstmNetwork>,
    architecture: LstmArchitecture,
}

/// Layers shared with blocking inference tasks
struct LstmNetwork {
    embedding: Embedding,
    layers: Vec<LSTM>,
    dense: Linear,
    device: Device,
}

impl LstmClassifier {
    /// Build layers from a VarBuilder rooted at the top of the weights
    pub fn new(vb: VarBuilder, architecture: LstmArchitecture) -> Result<Self> {
        architecture.validate()?;

        let embedding = candle_nn::embedding(
            architecture.vocab_size,
            architecture.embedding_dim,
            vb.pp("embedding"),
        )
        .map_err(|e| Error::model_load(format!("Failed to load embedding: {}", e)))?;

        let mut layers = Vec::with_capacity(architecture.num_layers);
        for layer_idx in 0..architecture.num_layers {
            let input_dim = if layer_idx == 0 {
                architecture.embedding_dim
            } else {
                architecture.hidden_size
            };

            let config = LSTMConfig {
                layer_idx,
                ..Default::default()
            };

            let layer = candle_nn::rnn::lstm(input_dim, architecture.hidden_size, config, vb.pp("lstm"))
                .map_err(|e| {
                    Error::model_load(format!("Failed to load LSTM layer {}: {}", layer_idx, e))
                })?;
            layers.push(layer);
        }

        let dense = candle_nn::linear(architecture.hidden_size, NUM_CLASSES, vb.pp("dense"))
            .map_err(|e| Error::model_load(format!("Failed to load dense layer: {}", e)))?;

        Ok(Self {
            network: Arc::new(LstmNetwork {
                embedding,
                layers,
                dense,
                device: vb.device().clone(),
            }),
            architecture,
        })
    }

    /// Build from loaded weights
    pub fn from_weights(weights: &LoadedWeights, architecture: LstmArchitecture) -> Result<Self> {
        let classifier = Self::new(weights.var_builder().clone(), architecture)?;

        info!(
            "Loaded LSTM classifier from {} (vocab={}, embedding={}, hidden={}, layers={})",
            weights.path().display(),
            architecture.vocab_size,
            architecture.embedding_dim,
            architecture.hidden_size,
            architecture.num_layers
        );

        Ok(classifier)
    }
}

impl LstmNetwork {
    /// Class probabilities for a `(batch, input_len)` u32 id tensor
    fn forward(&self, input_ids: &Tensor) -> candle_core::Result<Tensor> {
        let mut xs = self.embedding.forward(input_ids)?;

        let mut last_hidden = None;
        for (idx, layer) in self.layers.iter().enumerate() {
            let states = layer.seq(&xs)?;

            if idx + 1 < self.layers.len() {
                xs = layer.states_to_tensor(&states)?;
            } else {
                last_hidden = states.last().map(|state| state.h().clone());
            }
        }

        let hidden = match last_hidden {
            Some(hidden) => hidden,
            None => xs.i((.., xs.dim(1)? - 1, ..))?,
        };

        let logits = self.dense.forward(&hidden)?;
        candle_nn::ops::softmax(&logits, D::Minus1)
    }

    /// Probability rows for `batch_len` flattened sequences
    fn infer(&self, flat: Vec<u32>, batch_len: usize, input_len: usize) -> Result<Vec<Vec<f32>>> {
        let input_ids = Tensor::from_vec(flat, (batch_len, input_len), &self.device)
            .map_err(|e| Error::classifier(format!("Failed to build input tensor: {}", e)))?;

        self.forward(&input_ids)
            .and_then(|probs| probs.to_vec2())
            .map_err(|e| Error::classifier(format!("Inference failed: {}", e)))
    }
}

#[async_trait]
impl SequenceClassifier for LstmClassifier {
    async fn predict_batch(&self, batch: &[PaddedSequence]) -> Result<Vec<Prediction>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let input_len = self.architecture.input_len;

        let mut flat = Vec::with_capacity(batch.len() * input_len);
        for sequence in batch {
            if sequence.len() != input_len {
                return Err(Error::classifier(format!(
                    "expected sequences of length {}, got {}",
                    input_len,
                    sequence.len()
                )));
            }
            flat.extend_from_slice(sequence.as_slice());
        }

        let batch_len = batch.len();
        let rows = if batch_len == 1 {
            self.network.infer(flat, batch_len, input_len)?
        } else {
            // Larger batches would stall the runtime worker
            let network = Arc::clone(&self.network);
            tokio::task::spawn_blocking(move || network.infer(flat, batch_len, input_len))
                .await
                .map_err(|e| Error::internal(format!("Inference task failed: {}", e)))??
        };

        debug!(
            "LSTM inference on batch of {} took {}us",
            batch.len(),
            start.elapsed().as_micros()
        );

        rows.iter().map(|row| Prediction::from_output_row(row)).collect()
    }

    fn name(&self) -> &str {
        CLASSIFIER_NAME
    }

    fn input_len(&self) -> usize {
        self.architecture.input_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use std::collections::HashMap;

    const VOCAB: usize = 10;
    const EMBED: usize = 4;
    const HIDDEN: usize = 3;
    const LEN: usize = 6;

    fn architecture(num_layers: usize) -> LstmArchitecture {
        LstmArchitecture {
            vocab_size: VOCAB,
            embedding_dim: EMBED,
            hidden_size: HIDDEN,
            num_layers,
            input_len: LEN,
        }
    }

    /// Zero recurrent weights keep the hidden state at zero, so the output
    /// is softmax(dense.bias) regardless of input.
    fn weights(num_layers: usize, dense_bias: [f32; 2]) -> HashMap<String, Tensor> {
        let dev = Device::Cpu;
        let mut ts = HashMap::new();

        ts.insert(
            "embedding.weight".to_string(),
            Tensor::ones((VOCAB, EMBED), DType::F32, &dev).unwrap(),
        );

        for k in 0..num_layers {
            let input_dim = if k == 0 { EMBED } else { HIDDEN };
            ts.insert(
                format!("lstm.weight_ih_l{k}"),
                Tensor::zeros((4 * HIDDEN, input_dim), DType::F32, &dev).unwrap(),
            );
            ts.insert(
                format!("lstm.weight_hh_l{k}"),
                Tensor::zeros((4 * HIDDEN, HIDDEN), DType::F32, &dev).unwrap(),
            );
            ts.insert(
                format!("lstm.bias_ih_l{k}"),
                Tensor::zeros(4 * HIDDEN, DType::F32, &dev).unwrap(),
            );
            ts.insert(
                format!("lstm.bias_hh_l{k}"),
                Tensor::zeros(4 * HIDDEN, DType::F32, &dev).unwrap(),
            );
        }

        ts.insert(
            "dense.weight".to_string(),
            Tensor::zeros((2, HIDDEN), DType::F32, &dev).unwrap(),
        );
        ts.insert(
            "dense.bias".to_string(),
            Tensor::new(&dense_bias, &dev).unwrap(),
        );
        ts
    }

    fn classifier(num_layers: usize, dense_bias: [f32; 2]) -> LstmClassifier {
        let vb = VarBuilder::from_tensors(weights(num_layers, dense_bias), DType::F32, &Device::Cpu);
        LstmClassifier::new(vb, architecture(num_layers)).unwrap()
    }

    #[tokio::test]
    async fn test_softmax_of_bias() {
        // softmax([0, ln 3]) = [0.25, 0.75]
        let model = classifier(1, [0.0, 3f32.ln()]);
        let seq = PaddedSequence::pad(&[1, 2, 3], LEN);

        let prediction = model.predict(&seq).await.unwrap();
        assert!((prediction.hoax - 0.75).abs() < 1e-5);
        assert!((prediction.valid - 0.25).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_size() {
        let model = classifier(2, [0.0, 0.0]);
        let batch = vec![
            PaddedSequence::pad(&[1], LEN),
            PaddedSequence::pad(&[2, 3], LEN),
            PaddedSequence::pad(&[4, 5, 6, 7, 8, 9, 1], LEN),
        ];

        let predictions = model.predict_batch(&batch).await.unwrap();
        assert_eq!(predictions.len(), 3);
        for p in predictions {
            assert!((p.hoax - 0.5).abs() < 1e-5);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_batched_inference_matches_single() {
        let model = classifier(2, [0.3, -0.2]);
        let batch: Vec<PaddedSequence> = (1..8u32)
            .map(|id| PaddedSequence::pad(&[id, (id + 2) % VOCAB as u32], LEN))
            .collect();

        let batched = model.predict_batch(&batch).await.unwrap();
        assert_eq!(batched.len(), batch.len());

        for (sequence, prediction) in batch.iter().zip(&batched) {
            let single = model.predict(sequence).await.unwrap();
            assert!((single.hoax - prediction.hoax).abs() < 1e-5);
        }
    }

    #[tokio::test]
    async fn test_wrong_length_rejected() {
        let model = classifier(1, [0.0, 0.0]);
        let err = model
            .predict(&PaddedSequence::pad(&[1], LEN + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Classifier(_)));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let model = classifier(1, [0.0, 0.0]);
        assert!(model.predict_batch(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_missing_tensor_is_load_error() {
        let mut ts = weights(1, [0.0, 0.0]);
        ts.remove("dense.bias");
        let vb = VarBuilder::from_tensors(ts, DType::F32, &Device::Cpu);

        let err = LstmClassifier::new(vb, architecture(1)).err().unwrap();
        assert!(err.is_startup_failure());
    }

    #[test]
    fn test_architecture_validation() {
        let mut arch = LstmArchitecture::default();
        assert!(arch.validate().is_ok());
        arch.hidden_size = 0;
        assert!(arch.validate().is_err());
    }
}
