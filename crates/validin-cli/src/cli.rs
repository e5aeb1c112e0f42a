use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "validin")]
#[command(
    author,
    version,
    about = "Detect hoax Indonesian news articles and get verification guidance"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "VALIDIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Model weights file (overrides the config file)
    #[arg(long, global = true, env = "VALIDIN_MODEL")]
    pub model: Option<PathBuf>,

    /// Vocabulary file (overrides the config file)
    #[arg(long, global = true, env = "VALIDIN_VOCAB")]
    pub vocab: Option<PathBuf>,

    /// Hoax probability threshold (overrides the config file)
    #[arg(long, global = true, env = "VALIDIN_THRESHOLD")]
    pub threshold: Option<f64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify one article and ask for guidance
    Check {
        /// Article text (read from --file or stdin when omitted)
        text: Option<String>,

        /// Read the article from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Skip the recommendation request
        #[arg(long)]
        no_advice: bool,

        /// Print the detection, then the recommendation, as JSON Lines
        #[arg(long)]
        json: bool,
    },

    /// Classify one article per line, printing JSON Lines
    Batch {
        /// Input file, one article per line
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show preprocessing output without loading the model
    Inspect {
        /// Article text (read from --file or stdin when omitted)
        text: Option<String>,

        /// Read the article from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },
}
