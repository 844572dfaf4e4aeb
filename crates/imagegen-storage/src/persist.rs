//! Attachment persistence: fetch → name → write, for a whole batch.
//!
//! One content session serves the batch. Attachments are fetched and written
//! concurrently (bounded by `max_concurrent`), and one attachment's failure
//! never stops the others. Outcomes come back in input order.

use imagegen_core::filename::{disambiguate, generated_name, resolve, sanitize_base_name};
use imagegen_core::{
    AttachmentDescriptor, BatchStamp, ContentClient, ContentSession, PersistError,
    PersistOutcome,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::console::Console;
use crate::local::OutputWriter;

const DEFAULT_MAX_CONCURRENT: usize = 4;

/// A retrievable attachment with its final filename decided.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedDownload {
    index: usize,
    reference: String,
    filename: String,
}

/// Drives fetch + write for every attachment of a completion.
#[derive(Clone)]
pub struct Persister {
    client: Arc<dyn ContentClient>,
    writer: OutputWriter,
    max_concurrent: usize,
    console: Option<Console>,
}

impl Persister {
    pub fn new(client: Arc<dyn ContentClient>, writer: OutputWriter) -> Self {
        Self {
            client,
            writer,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            console: Some(Console::stdio()),
        }
    }

    /// Limit how many attachments are fetched and written at once (minimum 1).
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Where per-attachment lines go; `None` silences them. Defaults to stdio.
    pub fn with_console(mut self, console: Option<Console>) -> Self {
        self.console = console;
        self
    }

    /// Persist a batch stamped with the current local time.
    pub async fn persist_all(
        &self,
        attachments: &[AttachmentDescriptor],
    ) -> Vec<PersistOutcome> {
        self.persist_all_at(attachments, BatchStamp::now()).await
    }

    /// Persist a batch under an explicit timestamp.
    ///
    /// Returns exactly one outcome per input attachment, in input order.
    pub async fn persist_all_at(
        &self,
        attachments: &[AttachmentDescriptor],
        stamp: BatchStamp,
    ) -> Vec<PersistOutcome> {
        let mut outcomes: Vec<Option<PersistOutcome>> =
            attachments.iter().map(|_| None).collect();

        let planned = plan_downloads(attachments, &stamp);
        for (index, attachment) in attachments.iter().enumerate() {
            if attachment.retrieval_reference().is_none() {
                tracing::debug!(index, "Attachment has no URL, skipping");
                outcomes[index] = Some(PersistOutcome::Skipped);
            }
        }

        tracing::info!(
            batch = %stamp,
            attachments = attachments.len(),
            retrievable = planned.len(),
            "Persisting attachments"
        );

        let session: Arc<dyn ContentSession> = match self.client.open_session().await {
            Ok(session) => Arc::from(session),
            Err(e) => {
                tracing::error!(error = %e, "Failed to open content session");
                for download in &planned {
                    outcomes[download.index] =
                        Some(PersistOutcome::Failed(PersistError::Retrieval(e.clone())));
                }
                return finish(outcomes);
            }
        };

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        for download in planned {
            let session = session.clone();
            let writer = self.writer.clone();
            let semaphore = semaphore.clone();
            let stamp = stamp.clone();
            let console = self.console.clone();

            tasks.spawn(async move {
                let index = download.index;
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        persist_one(session.as_ref(), &writer, &stamp, download, console.as_ref())
                            .await
                    }
                    Err(e) => PersistOutcome::Failed(PersistError::Task(e.to_string())),
                };
                (index, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => tracing::error!(error = %e, "Attachment task failed"),
            }
        }

        session.close().await;

        finish(outcomes)
    }
}

/// Decide the output filename of every retrievable attachment, in input order.
///
/// Names already claimed earlier in the batch (compared case-insensitively)
/// get `_1`, `_2`, ... inserted before the extension.
fn plan_downloads(
    attachments: &[AttachmentDescriptor],
    stamp: &BatchStamp,
) -> Vec<PlannedDownload> {
    let mut claimed = HashSet::new();

    attachments
        .iter()
        .enumerate()
        .filter_map(|(index, attachment)| {
            let reference = attachment.retrieval_reference()?;

            let base_name = attachment
                .declared_title()
                .and_then(sanitize_base_name)
                .unwrap_or_else(|| generated_name(stamp));
            let resolved = resolve(&base_name, attachment.content_type.as_deref());

            let mut suffix = 0;
            let mut filename = resolved.clone();
            while !claimed.insert(filename.to_lowercase()) {
                suffix += 1;
                filename = disambiguate(&resolved, suffix);
            }

            Some(PlannedDownload {
                index,
                reference: reference.to_string(),
                filename,
            })
        })
        .collect()
}

async fn persist_one(
    session: &dyn ContentSession,
    writer: &OutputWriter,
    stamp: &BatchStamp,
    download: PlannedDownload,
    console: Option<&Console>,
) -> PersistOutcome {
    let data = match session.fetch(&download.reference).await {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(
                index = download.index,
                reference = %download.reference,
                kind = e.kind(),
                error = %e,
                "Attachment download failed"
            );
            if let Some(console) = console {
                console.download_failed(&download.reference, &e);
            }
            return PersistOutcome::Failed(e.into());
        }
    };

    let path = writer.output_path(stamp, &download.filename);
    match writer.write(&path, data).await {
        Ok(saved) => {
            if let Some(console) = console {
                console.saved(&saved.path);
            }
            PersistOutcome::Saved(saved)
        }
        Err(e) => {
            tracing::warn!(
                index = download.index,
                path = %path.display(),
                error = %e,
                "Attachment write failed"
            );
            if let Some(console) = console {
                console.save_failed(&path, &e);
            }
            PersistOutcome::Failed(e.into())
        }
    }
}

// Slots left empty belong to tasks that panicked or were cancelled.
fn finish(outcomes: Vec<Option<PersistOutcome>>) -> Vec<PersistOutcome> {
    outcomes
        .into_iter()
        .map(|outcome| {
            outcome.unwrap_or_else(|| {
                PersistOutcome::Failed(PersistError::Task(
                    "attachment task did not complete".to_string(),
                ))
            })
        })
        .collect()
}
