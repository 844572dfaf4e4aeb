//! Per-attachment console lines.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

type Sink = Arc<Mutex<dyn Write + Send>>;

/// Where confirmation and failure lines go.
///
/// Saved files are reported on `out` as `Saved image to <path>`, failures on
/// `err`. Write errors on either sink are ignored.
#[derive(Clone)]
pub struct Console {
    out: Sink,
    err: Sink,
}

impl Console {
    /// Process stdout and stderr.
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }

    pub fn new(out: impl Write + Send + 'static, err: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
            err: Arc::new(Mutex::new(err)),
        }
    }

    pub fn saved(&self, path: &Path) {
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "Saved image to {}", path.display());
        }
    }

    pub fn download_failed(&self, reference: &str, error: &impl Display) {
        if let Ok(mut err) = self.err.lock() {
            let _ = writeln!(err, "Failed to download {}: {}", reference, error);
        }
    }

    pub fn save_failed(&self, path: &Path, error: &impl Display) {
        if let Ok(mut err) = self.err.lock() {
            let _ = writeln!(err, "Failed to save {}: {}", path.display(), error);
        }
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Console")
    }
}
