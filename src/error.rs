//! Error types shared by the library components

use thiserror::Error;

/// Errors raised while loading content or touching persisted state
#[derive(Debug, Error)]
pub enum BlogError {
    #[error("failed to load {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request for {path} failed with status {status}")]
    Status { path: String, status: u16 },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("post not found: {0}")]
    Lookup(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// The three failure kinds a page can run into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Index or post could not be fetched or decoded
    Load,
    /// The requested post is not in the index or the pages directory
    Lookup,
    /// Local persisted state could not be read or written
    Storage,
}

impl BlogError {
    pub fn kind(&self) -> FailureKind {
        match self {
            BlogError::Load { .. } | BlogError::Status { .. } | BlogError::Parse { .. } => {
                FailureKind::Load
            }
            BlogError::Lookup(_) => FailureKind::Lookup,
            BlogError::Storage(_) => FailureKind::Storage,
        }
    }

    /// A missing document, reported either as a lookup miss or a 404
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BlogError::Lookup(_) | BlogError::Status { status: 404, .. }
        )
    }
}

pub type BlogResult<T> = std::result::Result<T, BlogError>;
