use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

use crate::constants::BATCH_STAMP_FORMAT;
use crate::error::PersistError;

/// Timestamp shared by every file written in one batch, e.g. `20240101_120000`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchStamp(String);

impl BatchStamp {
    /// Capture the current local time at second granularity.
    pub fn now() -> Self {
        Self::from_datetime(&chrono::Local::now())
    }

    pub fn from_datetime<Tz>(at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self(at.format(BATCH_STAMP_FORMAT).to_string())
    }

    /// Use a preformatted stamp as is.
    pub fn from_string(stamp: impl Into<String>) -> Self {
        Self(stamp.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BatchStamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// A file written by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// What happened to one attachment of a batch.
#[derive(Debug)]
pub enum PersistOutcome {
    Saved(SavedFile),
    /// The attachment had no retrieval reference.
    Skipped,
    Failed(PersistError),
}

impl PersistOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, PersistOutcome::Saved(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, PersistOutcome::Skipped)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PersistOutcome::Failed(_))
    }

    pub fn saved(&self) -> Option<&SavedFile> {
        match self {
            PersistOutcome::Saved(file) => Some(file),
            _ => None,
        }
    }

    /// Serializable view of this outcome at `index` in the batch.
    pub fn record(&self, index: usize) -> OutcomeRecord {
        match self {
            PersistOutcome::Saved(file) => OutcomeRecord {
                index,
                status: "saved",
                path: Some(file.path.display().to_string()),
                bytes: Some(file.bytes),
                error_kind: None,
                error: None,
            },
            PersistOutcome::Skipped => OutcomeRecord {
                index,
                status: "skipped",
                path: None,
                bytes: None,
                error_kind: None,
                error: None,
            },
            PersistOutcome::Failed(err) => OutcomeRecord {
                index,
                status: "failed",
                path: None,
                bytes: None,
                error_kind: Some(err.kind()),
                error: Some(err.to_string()),
            },
        }
    }
}

/// JSON-friendly form of a [`PersistOutcome`].
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeRecord {
    pub index: usize,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Counts per outcome kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes_written: u64,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[PersistOutcome]) -> Self {
        outcomes
            .iter()
            .fold(BatchSummary::default(), |mut summary, outcome| {
                match outcome {
                    PersistOutcome::Saved(file) => {
                        summary.saved += 1;
                        summary.bytes_written += file.bytes;
                    }
                    PersistOutcome::Skipped => summary.skipped += 1,
                    PersistOutcome::Failed(_) => summary.failed += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.saved + self.skipped + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RetrievalError;
    use chrono::Utc;

    #[test]
    fn stamp_formats_to_seconds() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(BatchStamp::from_datetime(&at).as_str(), "20240101_120000");
    }

    #[test]
    fn summary_counts_each_kind() {
        let outcomes = vec![
            PersistOutcome::Saved(SavedFile {
                path: PathBuf::from("a.png"),
                bytes: 10,
            }),
            PersistOutcome::Skipped,
            PersistOutcome::Failed(RetrievalError::NotFound("x".to_string()).into()),
            PersistOutcome::Saved(SavedFile {
                path: PathBuf::from("b.png"),
                bytes: 5,
            }),
        ];
        let summary = BatchSummary::from_outcomes(&outcomes);
        assert_eq!(summary.saved, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.bytes_written, 15);
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn failed_record_carries_error_kind() {
        let outcome = PersistOutcome::Failed(RetrievalError::Unauthorized("x".to_string()).into());
        let record = serde_json::to_value(outcome.record(3)).unwrap();
        assert_eq!(record["index"], 3);
        assert_eq!(record["status"], "failed");
        assert_eq!(record["error_kind"], "retrieval");
        assert!(record.get("path").is_none());
    }
}
