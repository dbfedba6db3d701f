//! Per-file redaction job lifecycle
//!
//! `Queued -> Uploading -> Done | Error`. `Queued` is the only initial state,
//! `Done` and `Error` are terminal, and nothing skips `Uploading`. A retry is a
//! brand-new job.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use veil_core::UploadedFile;

use crate::error::JobError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum JobStatus {
    Queued,
    Uploading,
    #[serde(rename_all = "camelCase")]
    Done { output_name: String },
    Error { message: String },
}

impl JobStatus {
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Uploading => "uploading",
            JobStatus::Done { .. } => "done",
            JobStatus::Error { .. } => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done { .. } | JobStatus::Error { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionJob {
    file: UploadedFile,
    status: JobStatus,
}

impl RedactionJob {
    pub fn new(file: UploadedFile) -> Self {
        Self {
            file,
            status: JobStatus::Queued,
        }
    }

    pub fn file(&self) -> &UploadedFile {
        &self.file
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    pub fn is_queued(&self) -> bool {
        self.status == JobStatus::Queued
    }

    pub fn begin_upload(&mut self) -> Result<(), JobError> {
        match self.status {
            JobStatus::Queued => {
                self.status = JobStatus::Uploading;
                Ok(())
            }
            _ => Err(self.invalid("uploading")),
        }
    }

    pub fn complete(&mut self, output_name: impl Into<String>) -> Result<(), JobError> {
        match self.status {
            JobStatus::Uploading => {
                self.status = JobStatus::Done {
                    output_name: output_name.into(),
                };
                Ok(())
            }
            _ => Err(self.invalid("done")),
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), JobError> {
        match self.status {
            JobStatus::Uploading => {
                self.status = JobStatus::Error {
                    message: message.into(),
                };
                Ok(())
            }
            _ => Err(self.invalid("error")),
        }
    }

    fn invalid(&self, to: &'static str) -> JobError {
        JobError::InvalidTransition {
            from: self.status.label(),
            to,
        }
    }
}

/// Batch cancellation flag, shared with in-flight uploads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> RedactionJob {
        RedactionJob::new(UploadedFile::ingest("a.pdf", "application/pdf", b"%PDF"))
    }

    #[test]
    fn test_happy_path() {
        let mut job = job();
        assert!(job.is_queued());
        job.begin_upload().unwrap();
        assert_eq!(job.status(), &JobStatus::Uploading);
        job.complete("redacted_a.pdf").unwrap();
        assert!(job.status().is_terminal());
    }

    #[test]
    fn test_cannot_skip_uploading() {
        let mut job = job();
        assert!(matches!(
            job.complete("x"),
            Err(JobError::InvalidTransition {
                from: "queued",
                to: "done"
            })
        ));
        assert!(job.fail("boom").is_err());
        assert!(job.is_queued());
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut job = job();
        job.begin_upload().unwrap();
        job.fail("HTTP 500").unwrap();
        assert!(job.begin_upload().is_err());
        assert!(job.complete("x").is_err());
        assert!(job.fail("again").is_err());
        assert_eq!(
            job.status(),
            &JobStatus::Error {
                message: "HTTP 500".to_string()
            }
        );
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(JobStatus::Done {
            output_name: "r.pdf".to_string(),
        })
        .unwrap();
        assert_eq!(json["state"], "done");
        assert_eq!(json["outputName"], "r.pdf");
    }

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
