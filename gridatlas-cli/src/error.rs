//! CLI error type.

use gridatlas::generator::GenerateError;
use gridatlas::store::StoreError;
use thiserror::Error;

/// Errors surfaced to the CLI user. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum CliError {
    /// Region list file could not be read
    #[error("cannot read region list: {0}")]
    RegionFile(#[from] std::io::Error),

    /// Region list file could not be parsed
    #[error("invalid region list: {0}")]
    RegionParse(#[from] serde_json::Error),

    /// Malformed color argument
    #[error("invalid color {0:?}: expected #RRGGBB")]
    InvalidColor(String),

    /// Logging could not be initialized
    #[error("cannot initialize logging: {0}")]
    Logging(std::io::Error),

    /// Tile store could not be opened
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Generation cycle failed fatally
    #[error(transparent)]
    Generate(#[from] GenerateError),
}
