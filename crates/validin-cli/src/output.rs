//! User-facing messages and report shapes

use serde::Serialize;
use validin_advisor::Recommendation;
use validin_classifiers::{Detection, Inspection};
use validin_core::{Error, Label, Verdict};

/// Shown when the submitted text is blank
pub const EMPTY_INPUT_MESSAGE: &str = "Mohon masukkan teks berita!";

/// Shown when no word of the text is known to the model
pub const UNPROCESSABLE_MESSAGE: &str = "Teks tidak dapat diproses. Pastikan teks relevan.";

/// Indonesian verdict line
pub fn verdict_line(verdict: &Verdict) -> String {
    match verdict.label {
        Label::Hoax => format!(
            "Peringatan: Berita ini kemungkinan HOAX (Kepercayaan: {:.2}%)",
            verdict.confidence
        ),
        Label::Valid => format!(
            "Hasil: Berita ini kemungkinan VALID (Kepercayaan: {:.2}%)",
            verdict.confidence
        ),
    }
}

/// Message for a per-request rejection, `None` for other errors
pub fn rejection_message(error: &Error) -> Option<&'static str> {
    match error {
        Error::EmptyInput => Some(EMPTY_INPUT_MESSAGE),
        Error::UnprocessableText => Some(UNPROCESSABLE_MESSAGE),
        _ => None,
    }
}

/// Second line of `check --json` output; the first is the detection
#[derive(Debug, Serialize)]
pub struct RecommendationLine<'a> {
    pub recommendation: &'a Recommendation,
}

/// One line of `batch` output
#[derive(Debug, Serialize)]
pub struct BatchLine<'a> {
    /// 1-based input line number
    pub line: usize,

    #[serde(flatten)]
    pub result: BatchResult<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchResult<'a> {
    Detected(&'a Detection),
    Rejected { error: String, message: String },
}

impl<'a> BatchResult<'a> {
    pub fn from_result(result: &'a validin_core::Result<Detection>) -> Self {
        match result {
            Ok(detection) => Self::Detected(detection),
            Err(error) => Self::Rejected {
                error: error.to_string(),
                message: rejection_message(error)
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string()),
            },
        }
    }
}

/// Human-readable `inspect` output
pub fn render_inspection(inspection: &Inspection) -> String {
    let ids = inspection
        .ids
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "normalized: {}\ntokens ({}): {}\nids ({}): {}",
        inspection.normalized,
        inspection.tokens.len(),
        inspection.tokens.join(" "),
        inspection.ids.len(),
        ids
    )
}
