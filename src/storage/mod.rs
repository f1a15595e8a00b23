//! Knowledge-base storage collaborator.
//!
//! The extraction core hands a finished [`crate::model::Recipe`] to this
//! boundary; everything page-shaped lives here. "Not found" is a distinct
//! failure from transient service trouble, and only the latter is retried,
//! by this client itself, never by the core.

mod client;
mod render;

pub use client::KnowledgeBaseClient;
pub use render::{recipe_properties, recipe_to_blocks};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identifier for a stored page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(pub String);

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage collaborator failures.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The requested page does not exist
    #[error("Page not found: {0}")]
    NotFound(PageId),

    /// Transient service failure that outlived the retry budget
    #[error("Transient storage failure after {attempts} attempts: HTTP {status}")]
    Transient { status: u16, attempts: u32 },

    /// Non-retryable API rejection
    #[error("Storage API rejected the request (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure
    #[error("Storage transport error: {0}")]
    Http(#[from] reqwest::Error),
}
