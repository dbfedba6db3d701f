use thiserror::Error;

use veil_image::ImageError;

#[derive(Error, Debug)]
pub enum JobError {
    /// Transport failure talking to the redaction endpoint
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx reply; `message` is the response body, or the status reason if empty
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("upload cancelled")]
    Cancelled,

    #[error("invalid job transition: {from} -> {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("no file at index {0}")]
    NoSuchFile(usize),

    #[error("no queued file selected")]
    EmptySelection,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl JobError {
    /// Text recorded on a failed job. HTTP error bodies are kept verbatim.
    pub fn job_message(&self) -> String {
        match self {
            JobError::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Per-file hygiene failure. The file produces no cleaned output.
#[derive(Error, Debug)]
pub enum HygieneError {
    #[error("{name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: ImageError,
    },
}

impl HygieneError {
    pub fn file_name(&self) -> &str {
        match self {
            HygieneError::Decode { name, .. } => name,
        }
    }
}
