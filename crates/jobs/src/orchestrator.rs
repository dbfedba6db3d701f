//! Batch dispatch to a redaction endpoint
//!
//! Files are uploaded one at a time in batch order. Each status transition is
//! published as it happens, and one file's failure never stops its siblings.

use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use veil_core::{RedactedArtifact, UploadedFile};

use crate::endpoint::RedactionEndpoint;
use crate::error::JobError;
use crate::job::{CancelToken, JobStatus, RedactionJob};

/// A file waiting for dispatch, with its payload.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub file: UploadedFile,
    pub payload: Arc<[u8]>,
}

impl PendingFile {
    pub fn ingest(name: impl Into<String>, mime_type: &str, bytes: Vec<u8>) -> Self {
        let file = UploadedFile::ingest(name, mime_type, &bytes);
        Self {
            file,
            payload: Arc::from(bytes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum JobEvent {
    Status {
        index: usize,
        name: String,
        status: JobStatus,
    },
    Finished(BatchSummary),
}

/// Outcome of one `run_selected` call, by batch index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub done: Vec<usize>,
    pub failed: Vec<(usize, String)>,
    /// Selected but never dispatched because the batch was cancelled
    pub skipped: Vec<usize>,
}

pub struct Orchestrator<E> {
    endpoint: E,
    files: Vec<PendingFile>,
    jobs: Vec<RedactionJob>,
    selected: HashSet<usize>,
    artifacts: VecDeque<RedactedArtifact>,
}

impl<E: RedactionEndpoint> Orchestrator<E> {
    pub fn new(endpoint: E) -> Self {
        Self {
            endpoint,
            files: Vec::new(),
            jobs: Vec::new(),
            selected: HashSet::new(),
            artifacts: VecDeque::new(),
        }
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Replace the batch. Prior jobs, selection and artifacts are dropped.
    pub fn submit_batch(&mut self, files: Vec<PendingFile>) {
        log::info!("[Jobs] new batch of {} file(s)", files.len());
        self.jobs = files
            .iter()
            .map(|f| RedactionJob::new(f.file.clone()))
            .collect();
        self.files = files;
        self.selected.clear();
        self.artifacts.clear();
    }

    /// Flip selection of a queued file. Returns the new selection state.
    /// Files past `Queued` are left alone.
    pub fn toggle_selection(&mut self, index: usize) -> Result<bool, JobError> {
        let job = self.jobs.get(index).ok_or(JobError::NoSuchFile(index))?;
        if !job.is_queued() {
            return Ok(self.selected.contains(&index));
        }
        if self.selected.remove(&index) {
            Ok(false)
        } else {
            self.selected.insert(index);
            Ok(true)
        }
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn jobs(&self) -> &[RedactionJob] {
        &self.jobs
    }

    pub fn job(&self, index: usize) -> Option<&RedactionJob> {
        self.jobs.get(index)
    }

    /// Collected artifacts, newest first.
    pub fn artifacts(&self) -> impl Iterator<Item = &RedactedArtifact> {
        self.artifacts.iter()
    }

    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Dispatch every selected queued file, sequentially in batch order.
    pub fn run_selected(
        &mut self,
        events: Option<&Sender<JobEvent>>,
        cancel: &CancelToken,
    ) -> Result<BatchSummary, JobError> {
        let mut order: Vec<usize> = self
            .selected
            .iter()
            .copied()
            .filter(|&i| self.jobs.get(i).is_some_and(RedactionJob::is_queued))
            .collect();
        if order.is_empty() {
            return Err(JobError::EmptySelection);
        }
        order.sort_unstable();

        let mut summary = BatchSummary::default();
        for index in order {
            if cancel.is_cancelled() {
                summary.skipped.push(index);
                continue;
            }

            self.jobs[index].begin_upload()?;
            self.selected.remove(&index);
            self.publish(events, index);

            let pending = &self.files[index];
            match self
                .endpoint
                .redact(&pending.file, pending.payload.clone(), cancel)
            {
                Ok(reply) => {
                    self.jobs[index].complete(reply.file_name.clone())?;
                    self.artifacts.push_front(RedactedArtifact::new(
                        reply.file_name,
                        reply.mime_type,
                        reply.body,
                    ));
                    summary.done.push(index);
                }
                Err(err) => {
                    let message = err.job_message();
                    log::warn!("[Jobs] {} failed: {}", pending.file.name, err);
                    self.jobs[index].fail(message.clone())?;
                    summary.failed.push((index, message));
                }
            }
            self.publish(events, index);
        }

        log::info!(
            "[Jobs] batch finished: {} done, {} failed, {} skipped",
            summary.done.len(),
            summary.failed.len(),
            summary.skipped.len()
        );
        if let Some(tx) = events {
            let _ = tx.send(JobEvent::Finished(summary.clone()));
        }
        Ok(summary)
    }

    /// Replace a failed job with a fresh queued job for the same file, selected.
    pub fn retry(&mut self, index: usize) -> Result<(), JobError> {
        let job = self.jobs.get(index).ok_or(JobError::NoSuchFile(index))?;
        if !matches!(job.status(), JobStatus::Error { .. }) {
            return Err(JobError::InvalidTransition {
                from: job.status().label(),
                to: "queued",
            });
        }
        self.jobs[index] = RedactionJob::new(self.files[index].file.clone());
        self.selected.insert(index);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.jobs.clear();
        self.selected.clear();
        self.artifacts.clear();
    }

    /// Write every collected artifact into `dir`, newest first.
    /// Returns the written paths; empty when nothing has been collected.
    pub fn download_all(&self, dir: &Path) -> Result<Vec<PathBuf>, JobError> {
        if self.artifacts.is_empty() {
            return Ok(Vec::new());
        }
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(self.artifacts.len());
        for artifact in &self.artifacts {
            let path = create_unique(dir, &safe_file_name(&artifact.name), &artifact.payload)?;
            log::info!("[Jobs] saved {:?}", path);
            written.push(path);
        }
        Ok(written)
    }

    fn publish(&self, events: Option<&Sender<JobEvent>>, index: usize) {
        if let Some(tx) = events {
            let job = &self.jobs[index];
            let _ = tx.send(JobEvent::Status {
                index,
                name: job.file().name.clone(),
                status: job.status().clone(),
            });
        }
    }
}

/// Final path component only; server-supplied names never escape `dir`.
fn safe_file_name(name: &str) -> String {
    let base = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();
    match base {
        "" | "." | ".." => "artifact".to_string(),
        other => other.to_string(),
    }
}

/// `name`, then `name (1)`, `name (2)`, ... keeping the extension last.
fn numbered_name(name: &str, n: usize) -> String {
    if n == 0 {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], &name[pos..]),
        _ => (name, ""),
    };
    format!("{} ({}){}", stem, n, ext)
}

/// Write `payload` under the first free numbered variant of `name`.
/// Files are created exclusively, so an existing file is never overwritten.
fn create_unique(dir: &Path, name: &str, payload: &[u8]) -> Result<PathBuf, JobError> {
    let mut n = 0;
    loop {
        let path = dir.join(numbered_name(name, n));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(payload)?;
                return Ok(path);
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(err) => return Err(err.into()),
        }
    }
}
