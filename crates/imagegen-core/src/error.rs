//! Error types module
//!
//! Failures are split by how far they reach:
//!
//! - [`RetrievalError`] and [`WriteError`] are local to one attachment. The
//!   persistence orchestrator turns them into [`PersistError`] outcome records
//!   and keeps going with the rest of the batch.
//! - [`CompositionError`] means the generation request itself failed. There is
//!   nothing to persist, so it propagates to the caller.

use std::io;
use std::path::PathBuf;

/// The content-retrieval collaborator could not produce bytes.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RetrievalError {
    #[error("Transport error fetching {reference}: {message}")]
    Transport { reference: String, message: String },

    #[error("Attachment not found: {0}")]
    NotFound(String),

    #[error("Unauthorized to fetch {0}")]
    Unauthorized(String),

    #[error("Fetching {reference} failed with status {status}: {body}")]
    Status {
        reference: String,
        status: u16,
        body: String,
    },

    #[error("Content session already closed")]
    SessionClosed,
}

/// A local filesystem write failed.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create file {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to sync file {}: {source}", .path.display())]
    Sync {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to move {} into place at {}: {source}", .from.display(), .path.display())]
    Rename {
        from: PathBuf,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The generation request failed or returned no usable response.
#[derive(Debug, thiserror::Error)]
pub enum CompositionError {
    #[error("Generation request failed: {0}")]
    Transport(String),

    #[error("Generation request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid completion response: {0}")]
    InvalidResponse(String),

    #[error("Completion response contained no choices")]
    EmptyResponse,
}

/// Why a single attachment ended up as `Failed`.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("Attachment task aborted: {0}")]
    Task(String),
}

impl RetrievalError {
    /// Short machine-readable kind, used in structured logs and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            RetrievalError::Transport { .. } => "transport",
            RetrievalError::NotFound(_) => "not_found",
            RetrievalError::Unauthorized(_) => "unauthorized",
            RetrievalError::Status { .. } => "status",
            RetrievalError::SessionClosed => "session_closed",
        }
    }
}

impl PersistError {
    pub fn kind(&self) -> &'static str {
        match self {
            PersistError::Retrieval(_) => "retrieval",
            PersistError::Write(_) => "write",
            PersistError::Task(_) => "task",
        }
    }
}

impl From<serde_json::Error> for CompositionError {
    fn from(err: serde_json::Error) -> Self {
        CompositionError::InvalidResponse(format!("JSON parsing error: {}", err))
    }
}
