// File: src/error.rs
// Purpose: Error taxonomy for dispatch, context and view rendering

use std::path::PathBuf;
use thiserror::Error;
use trailhead_router::RouterError;

/// Errors surfaced by the application and the request context
#[derive(Debug, Error)]
pub enum Error {
    /// Registration-time failure: unknown verb or uncompilable pattern
    #[error(transparent)]
    Router(#[from] RouterError),

    /// The view file does not exist under the views root
    #[error("view `{name}` not found at {}", path.display())]
    ViewNotFound { name: String, path: PathBuf },

    /// The view file exists but could not be read
    #[error("failed to read view {}: {source}", path.display())]
    ViewIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template `meta` must be an even-length delimiter pair such as `{}` or `{{}}`
    #[error("invalid template delimiters `{0}`")]
    InvalidMeta(String),

    /// A response-writing operation ran after the response was finalized
    #[error("response already finished")]
    ResponseFinished,

    /// The host supplied an environment the context cannot be built from
    #[error("invalid environment: {0}")]
    InvalidEnvironment(String),

    #[error("failed to serialize response body: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Whatever the route handler failed with, untouched
    #[error(transparent)]
    Handler(anyhow::Error),
}

impl Error {
    /// The handler's own error when this is a [`Error::Handler`]
    pub fn handler_error(&self) -> Option<&anyhow::Error> {
        match self {
            Error::Handler(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
