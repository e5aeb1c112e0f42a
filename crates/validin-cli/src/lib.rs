pub mod app;
pub mod cli;
pub mod config;
pub mod output;

pub use app::{EXIT_REJECTED, EXIT_STARTUP_FAILURE, EXIT_SUCCESS};
pub use cli::*;
pub use config::*;
