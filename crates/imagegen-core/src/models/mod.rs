//! Data models for a generation run
//!
//! Wire models mirror the DIAL chat-completions shapes; outcome models are
//! what the persistence pipeline reports back.

mod attachment;
mod completion;
mod generation;
mod message;
mod outcome;

// Re-export all models for convenient imports
pub use attachment::*;
pub use completion::*;
pub use generation::*;
pub use message::*;
pub use outcome::*;
