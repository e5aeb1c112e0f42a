//! Hoax detection pipeline
//!
//! Wires the preprocessor, the sequence classifier and the decision policy
//! together. One detector is built at startup and shared read-only by every
//! request.

use crate::decision::DecisionPolicy;
use crate::preprocess::{Inspection, PreparedText, Preprocessor};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use validin_core::{Error, Prediction, Result, SequenceClassifier, Verdict};

/// Outcome of classifying one article
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    /// Final label and confidence
    pub verdict: Verdict,

    /// Raw class probabilities
    pub prediction: Prediction,

    /// Tokens after stopword removal
    pub token_count: usize,

    /// Tokens found in the vocabulary
    pub known_token_count: usize,

    /// Time spent in the pipeline
    pub latency_us: u64,
}

/// End-to-end detector for one loaded model
pub struct HoaxDetector {
    preprocessor: Preprocessor,
    classifier: Arc<dyn SequenceClassifier>,
    policy: DecisionPolicy,
}

impl HoaxDetector {
    /// Assemble a detector. The classifier's input length must match the
    /// preprocessor's padded length.
    pub fn new(
        preprocessor: Preprocessor,
        classifier: Arc<dyn SequenceClassifier>,
        policy: DecisionPolicy,
    ) -> Result<Self> {
        if classifier.input_len() != preprocessor.max_len() {
            return Err(Error::config(format!(
                "classifier '{}' expects sequences of {} ids, preprocessor pads to {}",
                classifier.name(),
                classifier.input_len(),
                preprocessor.max_len()
            )));
        }

        Ok(Self {
            preprocessor,
            classifier,
            policy,
        })
    }

    /// Classifier name
    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Decision policy in use
    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    /// Preprocessing front end
    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    /// Intermediate forms of `text`, without classification
    pub fn inspect(&self, text: &str) -> Inspection {
        self.preprocessor.inspect(text)
    }

    /// Classify one article.
    ///
    /// Rejections ([`Error::EmptyInput`], [`Error::UnprocessableText`])
    /// happen before the classifier is invoked.
    pub async fn detect(&self, text: &str) -> Result<Detection> {
        let start = Instant::now();

        let prepared = self.prepare(text)?;
        let prediction = self.classifier.predict(&prepared.sequence).await?;

        Ok(self.finish(prepared, prediction, start))
    }

    /// Classify several articles with a single classifier call.
    ///
    /// Rejected inputs get their own error; the rest share one batch.
    /// Results are in input order. A classifier failure fails the whole
    /// batch.
    pub async fn detect_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Result<Detection>>> {
        let start = Instant::now();

        let prepared: Vec<Result<PreparedText>> =
            texts.iter().map(|text| self.prepare(text.as_ref())).collect();

        let batch: Vec<_> = prepared
            .iter()
            .filter_map(|p| p.as_ref().ok())
            .map(|p| p.sequence.clone())
            .collect();

        let predictions = if batch.is_empty() {
            Vec::new()
        } else {
            self.classifier.predict_batch(&batch).await?
        };

        if predictions.len() != batch.len() {
            return Err(Error::classifier(format!(
                "classifier returned {} predictions for {} sequences",
                predictions.len(),
                batch.len()
            )));
        }

        debug!(
            "Batch of {} texts, {} sent to '{}'",
            texts.len(),
            batch.len(),
            self.classifier.name()
        );

        let mut predictions = predictions.into_iter();
        let results = prepared
            .into_iter()
            .map(|p| {
                let p = p?;
                let prediction = predictions
                    .next()
                    .ok_or_else(|| Error::internal("batch predictions exhausted"))?;
                Ok(self.finish(p, prediction, start))
            })
            .collect();

        Ok(results)
    }

    fn prepare(&self, text: &str) -> Result<PreparedText> {
        self.preprocessor.prepare(text).map_err(|e| {
            let reason = match e {
                Error::EmptyInput => "empty",
                Error::UnprocessableText => "unprocessable",
                _ => "other",
            };
            metrics::counter!("validin_rejections_total", "reason" => reason).increment(1);
            debug!("Rejected input: {}", e);
            e
        })
    }

    fn finish(&self, prepared: PreparedText, prediction: Prediction, start: Instant) -> Detection {
        let verdict = self.policy.decide(&prediction);
        let latency_us = start.elapsed().as_micros() as u64;

        metrics::counter!("validin_detections_total", "label" => verdict.label.as_str()).increment(1);
        metrics::histogram!("validin_pipeline_latency_us").record(latency_us as f64);

        debug!(
            "{} (p_hoax={:.4}, {} of {} tokens known) in {}us",
            verdict, prediction.hoax, prepared.known_token_count, prepared.token_count, latency_us
        );

        Detection {
            verdict,
            prediction,
            token_count: prepared.token_count,
            known_token_count: prepared.known_token_count,
            latency_us,
        }
    }
}
