//! Client-side hygiene triage, routed by MIME type

use std::sync::Arc;

use veil_core::{Catalog, HygieneAction, HygieneReport, ImageConfig, PiiHit, UploadedFile};
use veil_image::ImageHygiene;

use crate::error::HygieneError;
use crate::orchestrator::PendingFile;

const PDF_WARNING: &str = "PDF metadata not removed client-side";

/// Hygiene outcome for one file plus the bytes to hand onward.
#[derive(Debug, Clone)]
pub struct CleanedFile {
    pub report: HygieneReport,
    pub payload: Vec<u8>,
}

impl CleanedFile {
    /// Queue the cleaned bytes for server-side redaction.
    pub fn into_pending(self) -> PendingFile {
        PendingFile {
            file: self.report.file,
            payload: Arc::from(self.payload),
        }
    }
}

pub struct HygieneTriage {
    images: ImageHygiene,
    catalog: Catalog,
}

impl HygieneTriage {
    pub fn new(config: &ImageConfig) -> Self {
        Self {
            images: ImageHygiene::new(config),
            catalog: Catalog::strict(),
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn process(
        &self,
        file: &UploadedFile,
        bytes: Vec<u8>,
    ) -> Result<CleanedFile, HygieneError> {
        let mime = file.mime_type.as_str();

        if file.is_image() {
            let clean = self
                .images
                .strip_metadata(&bytes, mime, &file.name)
                .map_err(|source| HygieneError::Decode {
                    name: file.name.clone(),
                    source,
                })?;
            let cleaned = UploadedFile::ingest(clean.file_name, &clean.mime_type, &clean.bytes);
            return Ok(CleanedFile {
                report: report(cleaned, HygieneAction::StrippedMetadata, Vec::new(), None),
                payload: clean.bytes,
            });
        }

        let (action, hits, warning) = match mime {
            "text/plain" => {
                let text = String::from_utf8_lossy(&bytes);
                (HygieneAction::ScannedText, self.hits(&text), None)
            }
            "application/pdf" => (
                HygieneAction::PassedThrough,
                self.hits(&file.name),
                Some(PDF_WARNING.to_string()),
            ),
            other => (
                HygieneAction::NoAction,
                Vec::new(),
                Some(format!("no hygiene actions applied (unsupported type {})", other)),
            ),
        };
        if let Some(warning) = &warning {
            log::warn!("[Hygiene] {}: {}", file.name, warning);
        }
        if !hits.is_empty() {
            log::info!("[Hygiene] {}: {} PII hit(s)", file.name, hits.len());
        }

        Ok(CleanedFile {
            report: report(file.clone(), action, hits, warning),
            payload: bytes,
        })
    }

    /// One result per input, in input order. Failures stay local to their file.
    pub fn process_batch(
        &self,
        files: Vec<(UploadedFile, Vec<u8>)>,
    ) -> Vec<Result<CleanedFile, HygieneError>> {
        files
            .into_iter()
            .map(|(file, bytes)| self.process(&file, bytes))
            .collect()
    }

    fn hits(&self, text: &str) -> Vec<PiiHit> {
        self.catalog.scan(text).into_iter().map(PiiHit::from).collect()
    }
}

fn report(
    file: UploadedFile,
    action: HygieneAction,
    pii_hits: Vec<PiiHit>,
    warning: Option<String>,
) -> HygieneReport {
    HygieneReport {
        file,
        action,
        pii_hits,
        warning,
    }
}
