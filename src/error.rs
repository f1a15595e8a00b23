use thiserror::Error;

/// Errors that can occur during recipe extraction and storage operations
///
/// Most of the extraction pipeline degrades to empty output instead of
/// failing; the variants here are the contract violations and plumbing
/// failures callers must handle explicitly.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A measurement unit missing from every conversion table
    #[error("Unknown measurement unit: {0}")]
    UnknownUnit(String),

    /// Scaling factor passed to ingredient scaling was not positive
    #[error("Invalid scaling factor: {0} (must be > 0)")]
    InvalidScaleFactor(f64),

    /// Filesystem error while reaching an input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// Storage collaborator failure
    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}
