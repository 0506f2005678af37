use std::path::PathBuf;

use thiserror::Error;

/// Why weather for a single city could not be obtained.
///
/// The `Display` output is what ends up on the error card.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The provider answered with a non-success status.
    #[error("{message}")]
    Retrieval { status: u16, message: String },

    /// The body was not the JSON shape we expect.
    #[error("Malformed weather response: {0}")]
    MalformedResponse(String),

    /// The request never produced a response, or the body could not be read.
    #[error("Network error: {0}")]
    Transport(String),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Retrieval { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures of the display area itself, not tied to any city.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("Failed to write page {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
