//! Imagegen Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! filename resolver shared by the client, storage and CLI crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod filename;
pub mod models;
pub mod traits;

// Re-export commonly used types
pub use config::DialConfig;
pub use error::{CompositionError, PersistError, RetrievalError, WriteError};
pub use models::{
    AttachmentDescriptor, BatchStamp, BatchSummary, Completion, GenerationRequest, ImageQuality,
    ImageSize, ImageStyle, Message, OutcomeRecord, PersistOutcome, Role, SavedFile,
};
pub use traits::{ContentClient, ContentSession};
