//! Command execution

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::output::{
    render_inspection, rejection_message, verdict_line, BatchLine, BatchResult, RecommendationLine,
};
use anyhow::Context;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use validin_advisor::RecommendationClient;
use validin_classifiers::{load_vocabulary, HoaxDetector, Preprocessor, StopwordFilter, DETECTOR};

/// A verdict was produced
pub const EXIT_SUCCESS: u8 = 0;

/// Configuration or artifacts could not be loaded
pub const EXIT_STARTUP_FAILURE: u8 = 1;

/// The article was rejected (empty or unprocessable)
pub const EXIT_REJECTED: u8 = 2;

/// Run the parsed command, writing results to stdout
pub async fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = AppConfig::load(&cli)?;
    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::Check {
            text,
            file,
            no_advice,
            json,
        } => {
            let text = read_article(text, file)?;
            let detector = DETECTOR.get_or_load(&config.detector).await?;

            let advisor = if no_advice {
                None
            } else {
                Some(RecommendationClient::new(config.advisor.clone())?)
            };

            check(&detector, advisor.as_ref(), &text, json, &mut stdout).await
        }

        Commands::Batch { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let detector = DETECTOR.get_or_load(&config.detector).await?;

            batch(&detector, &content, &mut stdout).await
        }

        Commands::Inspect { text, file } => {
            let text = read_article(text, file)?;
            inspect(&config, &text, &mut stdout)
        }
    }
}

/// Classify one article, print the verdict, then the guidance.
///
/// The verdict (or, with `json`, the detection line) is written and flushed
/// before the recommendation request is sent; a failed request only changes
/// the guidance text.
pub async fn check<W: Write>(
    detector: &HoaxDetector,
    advisor: Option<&RecommendationClient>,
    text: &str,
    json: bool,
    out: &mut W,
) -> anyhow::Result<u8> {
    debug!("Checking article of {} characters", text.chars().count());

    let detection = match detector.detect(text).await {
        Ok(detection) => detection,
        Err(e) => {
            let Some(message) = rejection_message(&e) else {
                return Err(e.into());
            };

            if json {
                serde_json::to_writer(
                    &mut *out,
                    &serde_json::json!({ "error": e.to_string(), "message": message }),
                )?;
                writeln!(out)?;
            } else {
                writeln!(out, "{}", message)?;
            }
            return Ok(EXIT_REJECTED);
        }
    };

    if json {
        serde_json::to_writer(&mut *out, &detection)?;
    } else {
        write!(out, "{}", verdict_line(&detection.verdict))?;
    }
    writeln!(out)?;
    out.flush()?;

    let Some(advisor) = advisor else {
        return Ok(EXIT_SUCCESS);
    };
    let recommendation = advisor.recommend(text, &detection.verdict).await;

    if json {
        serde_json::to_writer(
            &mut *out,
            &RecommendationLine {
                recommendation: &recommendation,
            },
        )?;
        writeln!(out)?;
    } else {
        writeln!(out)?;
        writeln!(out, "Rekomendasi:")?;
        writeln!(out, "{}", recommendation.text())?;
    }
    out.flush()?;

    Ok(EXIT_SUCCESS)
}

/// Classify every line of `content` in one batch, one JSON object per line
pub async fn batch<W: Write>(detector: &HoaxDetector, content: &str, out: &mut W) -> anyhow::Result<u8> {
    let lines: Vec<&str> = content.lines().collect();
    info!("Classifying {} articles", lines.len());

    let results = detector.detect_batch(&lines).await?;

    for (idx, result) in results.iter().enumerate() {
        let line = BatchLine {
            line: idx + 1,
            result: BatchResult::from_result(result),
        };
        serde_json::to_writer(&mut *out, &line)?;
        writeln!(out)?;
    }
    out.flush()?;

    Ok(EXIT_SUCCESS)
}

/// Print the preprocessing stages; loads only the vocabulary
pub fn inspect<W: Write>(config: &AppConfig, text: &str, out: &mut W) -> anyhow::Result<u8> {
    let detector_config = &config.detector;
    let vocabulary = load_vocabulary(
        &detector_config.vocabulary.path,
        detector_config.vocabulary.num_words,
    )?;

    let stopwords = match &detector_config.stopwords {
        Some(path) => StopwordFilter::from_file(path)?,
        None => StopwordFilter::indonesian(),
    };

    let preprocessor = Preprocessor::new(Arc::new(vocabulary))?
        .with_stopwords(stopwords)
        .with_max_len(detector_config.max_len)?;

    writeln!(out, "{}", render_inspection(&preprocessor.inspect(text)))?;
    Ok(EXIT_SUCCESS)
}

/// Article from the positional argument, a file, or stdin
fn read_article(text: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }

    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read article from stdin")?;
    Ok(buffer)
}
