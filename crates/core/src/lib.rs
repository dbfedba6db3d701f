//! Core types for document hygiene and redaction.
//!
//! Owns the PII pattern catalog and scanner, the content hasher, the shared
//! file/report data model and the pipeline configuration.

pub mod config;
pub mod digest;
pub mod file;
pub mod rules;

pub use config::{
    load_config, save_config, ConfigError, EndpointConfig, ImageConfig, MaskConfig, MaskMode,
    PipelineConfig, ResizeFilter, Strategy,
};
pub use digest::{content_hash, hash_file, hash_reader};
pub use file::{
    format_size, HygieneAction, HygieneReport, RedactedArtifact, UploadedFile, OCTET_STREAM,
};
pub use rules::{scan, Catalog, Pattern, PatternKind, PiiHit, PiiMatch};

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid pattern for {kind}: {source}")]
    InvalidPattern {
        kind: PatternKind,
        #[source]
        source: regex::Error,
    },
    #[error("pattern kind {0} declared more than once")]
    DuplicateKind(PatternKind),
}
