//! Imagegen Storage Library
//!
//! Persists generated attachments to a local output directory.
//!
//! # Output layout
//!
//! Every file of a batch lands directly in the output directory as
//! `<batch-timestamp>_<resolved-filename>`, e.g.
//! `20240101_120000_generated_20240101_120000.jpg`. The shared timestamp keeps
//! one request's images together and apart from earlier runs; names that
//! repeat within a batch get an index suffix.

pub mod console;
pub mod local;
pub mod persist;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use console::Console;
pub use local::OutputWriter;
pub use persist::Persister;
