use std::path::PathBuf;

use pagefix_core::{LoadError, PipelineError, SaveError, ValidationError};
use thiserror::Error;

/// Everything that can stop a command-line run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read parameters from {}: {source}", path.display())]
    ParamsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid parameter file {}: {source}", path.display())]
    ParamsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error("Failed to serialize parameters: {0}")]
    Serialize(#[source] serde_json::Error),
}
