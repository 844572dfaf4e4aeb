use bytes::Bytes;
use imagegen_core::{BatchStamp, SavedFile, WriteError};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem output for generated attachments
#[derive(Clone, Debug)]
pub struct OutputWriter {
    base_path: PathBuf,
}

impl OutputWriter {
    /// Create a writer rooted at `base_path`.
    ///
    /// The directory is created lazily on the first write, so a batch with
    /// nothing to save never touches the disk.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// `<base>/<stamp>_<filename>`
    pub fn output_path(&self, stamp: &BatchStamp, filename: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}", stamp, filename))
    }

    async fn ensure_base_dir(&self) -> Result<(), WriteError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|source| WriteError::CreateDir {
                path: self.base_path.clone(),
                source,
            })
    }

    /// Write `data` to `path`, replacing any existing file.
    ///
    /// Bytes go to a uniquely named hidden temp file next to `path` and are
    /// renamed into place once synced, so `path` never holds a half-written
    /// image and no other output name is ever touched.
    pub async fn write(&self, path: &Path, data: Bytes) -> Result<SavedFile, WriteError> {
        self.ensure_base_dir().await?;

        let start = std::time::Instant::now();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => self.base_path.clone(),
        };
        let target = path.to_path_buf();
        let size = data.len();

        tokio::task::spawn_blocking(move || write_synced(&dir, &target, &data))
            .await
            .map_err(|e| WriteError::Write {
                path: path.to_path_buf(),
                source: io::Error::other(e),
            })??;

        tracing::info!(
            path = %path.display(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local output write successful"
        );

        Ok(SavedFile {
            path: path.to_path_buf(),
            bytes: size as u64,
        })
    }
}

// Errors name the final path; the temp file is removed on drop if anything fails.
fn write_synced(dir: &Path, path: &Path, data: &[u8]) -> Result<(), WriteError> {
    let mut temp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|source| WriteError::Create {
            path: path.to_path_buf(),
            source,
        })?;

    temp.write_all(data).map_err(|source| WriteError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    temp.as_file().sync_all().map_err(|source| WriteError::Sync {
        path: path.to_path_buf(),
        source,
    })?;

    let from = temp.path().to_path_buf();
    temp.persist(path).map_err(|e| WriteError::Rename {
        from,
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}
