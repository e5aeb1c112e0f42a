//! Validin
//!
//! Command-line hoax detector for Indonesian news, with digital-literacy
//! guidance from a chat-completions API.

use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use validin_cli::app;
use validin_cli::{Cli, EXIT_STARTUP_FAILURE};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_json);

    match app::run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_STARTUP_FAILURE)
        }
    }
}

fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("validin=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("validin=info"))
    };

    // stdout carries verdicts and JSON Lines
    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
