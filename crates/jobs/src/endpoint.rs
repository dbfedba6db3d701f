//! Client side of the server-side redaction endpoint

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::{multipart, Client};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use std::io::{self, Read};
use std::sync::Arc;
use std::time::Duration;

use veil_core::{EndpointConfig, UploadedFile, OCTET_STREAM};

use crate::error::JobError;
use crate::job::CancelToken;

/// Successful endpoint response.
#[derive(Debug, Clone)]
pub struct EndpointReply {
    pub file_name: String,
    pub mime_type: String,
    pub body: Vec<u8>,
}

/// Anything that can turn an uploaded file into a redacted artifact.
pub trait RedactionEndpoint {
    fn redact(
        &self,
        file: &UploadedFile,
        payload: Arc<[u8]>,
        cancel: &CancelToken,
    ) -> Result<EndpointReply, JobError>;
}

/// Multipart upload to `{base_url}{path}` with blocking reqwest.
pub struct HttpEndpoint {
    client: Client,
    url: String,
    strategy: &'static str,
    burn: bool,
    mask_label: String,
}

impl HttpEndpoint {
    pub fn new(config: &EndpointConfig) -> Result<Self, JobError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.url(),
            strategy: config.strategy.as_str(),
            burn: config.burn,
            mask_label: config.mask_label.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn file_part(
        file: &UploadedFile,
        payload: Arc<[u8]>,
        cancel: &CancelToken,
    ) -> Result<multipart::Part, JobError> {
        let len = payload.len() as u64;
        let part = || {
            multipart::Part::reader_with_length(CancelReader::new(payload.clone(), cancel), len)
                .file_name(file.name.clone())
        };
        match part().mime_str(&file.mime_type) {
            Ok(part) => Ok(part),
            Err(_) => {
                log::warn!(
                    "[Endpoint] invalid MIME {:?} for {}, sending as {}",
                    file.mime_type,
                    file.name,
                    OCTET_STREAM
                );
                Ok(part().mime_str(OCTET_STREAM)?)
            }
        }
    }
}

impl RedactionEndpoint for HttpEndpoint {
    fn redact(
        &self,
        file: &UploadedFile,
        payload: Arc<[u8]>,
        cancel: &CancelToken,
    ) -> Result<EndpointReply, JobError> {
        if cancel.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let form = multipart::Form::new()
            .part("file", Self::file_part(file, payload, cancel)?)
            .text("strategy", self.strategy)
            .text("burn", if self.burn { "true" } else { "false" })
            .text("mask_label", self.mask_label.clone());

        log::info!("[Endpoint] POST {} ({})", self.url, file.name);
        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .map_err(|err| {
                if cancel.is_cancelled() {
                    JobError::Cancelled
                } else {
                    JobError::Network(err)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
            } else {
                body
            };
            log::warn!("[Endpoint] {} failed: HTTP {}", file.name, status.as_u16());
            return Err(JobError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| format!("redacted_{}", file.name));
        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| OCTET_STREAM.to_string());
        let body = response.bytes()?.to_vec();

        log::info!(
            "[Endpoint] {} -> {} ({} bytes)",
            file.name,
            file_name,
            body.len()
        );
        Ok(EndpointReply {
            file_name,
            mime_type,
            body,
        })
    }
}

/// Upload body that stops producing bytes once the batch is cancelled.
struct CancelReader {
    payload: Arc<[u8]>,
    pos: usize,
    cancel: CancelToken,
}

impl CancelReader {
    fn new(payload: Arc<[u8]>, cancel: &CancelToken) -> Self {
        Self {
            payload,
            pos: 0,
            cancel: cancel.clone(),
        }
    }
}

impl Read for CancelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.cancel.is_cancelled() {
            return Err(io::Error::new(io::ErrorKind::Other, "upload cancelled"));
        }
        let rest = &self.payload[self.pos..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }
}

// RFC 5987: charset'language'value, charset required
static FILENAME_EXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)filename\*\s*=\s*"?[\w-]+'[^']*'([^";]*)"?"#).unwrap());
static FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)filename\s*=\s*(?:"([^"]*)"|([^;]+))"#).unwrap());

/// Output name from a `Content-Disposition` value. `filename*` wins over `filename`.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    if let Some(caps) = FILENAME_EXT.captures(header) {
        let raw = caps.get(1)?.as_str().trim();
        let decoded = urlencoding::decode(raw)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        if !decoded.is_empty() {
            return Some(decoded);
        }
    }

    let caps = FILENAME.captures(header)?;
    let raw = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
    if raw.is_empty() {
        return None;
    }
    Some(
        urlencoding::decode(raw)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string()),
    )
}
