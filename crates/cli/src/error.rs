//! Error types for CLI operations.

use std::path::PathBuf;

use contracts::Verdict;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    /// Construction or setup of the scenario failed before any tick
    #[error("Scenario setup failed: {message}")]
    Setup { message: String },

    /// The scenario ran to a failing verdict
    #[error("Scenario '{scenario}' finished with verdict {verdict}")]
    ScenarioFailed { scenario: String, verdict: Verdict },
}

impl CliError {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }
}
