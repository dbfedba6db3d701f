//! File-level data model
//!
//! Every file entering the pipeline is described by an [`UploadedFile`] whose
//! hash is computed once at ingestion. The bytes themselves are never stored
//! here; they travel with whichever component is processing the file.

use serde::{Deserialize, Serialize};

use crate::digest::content_hash;
use crate::rules::PiiHit;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Descriptor of a submitted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub name: String,
    pub size_bytes: u64,
    /// Declared MIME type, `application/octet-stream` when unknown
    pub mime_type: String,
    /// SHA-256 of the content, lowercase hex
    pub content_hash: String,
}

impl UploadedFile {
    /// Describe `bytes`, hashing them.
    pub fn ingest(name: impl Into<String>, mime_type: &str, bytes: &[u8]) -> Self {
        let mime_type = match mime_type.trim() {
            "" => OCTET_STREAM.to_string(),
            declared => declared.to_string(),
        };
        Self {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            mime_type,
            content_hash: content_hash(bytes),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// What the hygiene step did to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HygieneAction {
    StrippedMetadata,
    ScannedText,
    PassedThrough,
    NoAction,
}

/// One report per file that went through hygiene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HygieneReport {
    pub file: UploadedFile,
    pub action: HygieneAction,
    pub pii_hits: Vec<PiiHit>,
    pub warning: Option<String>,
}

/// Output of a completed redaction job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactedArtifact {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    #[serde(skip)]
    pub payload: Vec<u8>,
}

impl RedactedArtifact {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size_bytes: payload.len() as u64,
            mime_type: mime_type.into(),
            payload,
        }
    }
}

/// Human-readable size: `512 B`, `1.5 KB`, `2.0 MB`.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
