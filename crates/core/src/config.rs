use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::rules::PatternKind;

/// Pipeline configuration, passed into each component at construction.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    pub image: ImageConfig,
    pub mask: MaskConfig,
    pub endpoint: EndpointConfig,
}

// ============ Image hygiene ============

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageConfig {
    /// Longest allowed edge in pixels; larger images are scaled down uniformly.
    pub max_edge: u32,
    /// JPEG quality, 1-100
    pub jpeg_quality: u8,
    pub filter: ResizeFilter,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_edge: 2400,
            jpeg_quality: 92,
            filter: ResizeFilter::Triangle,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    /// Bilinear
    Triangle,
    Lanczos3,
}

// ============ Text masking ============

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MaskConfig {
    /// Replacement token; `{kind}` is substituted with the kind label.
    pub template: String,
    pub mode: MaskMode,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            template: "[{kind}]".to_string(),
            mode: MaskMode::Sequential,
        }
    }
}

impl MaskConfig {
    pub fn token(&self, kind: PatternKind) -> String {
        self.template.replace("{kind}", kind.label())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MaskMode {
    /// One replace pass per kind, in catalog order, over the already-masked text.
    #[default]
    Sequential,
    /// One scan of the original text; overlaps resolved by catalog priority.
    Unified,
}

// ============ Redaction endpoint ============

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EndpointConfig {
    pub base_url: String,
    pub path: String,
    pub strategy: Strategy,
    /// Burn annotations into pixels
    pub burn: bool,
    pub mask_label: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            path: "/redact".to_string(),
            strategy: Strategy::Auto,
            burn: true,
            mask_label: "[REDACTED]".to_string(),
            timeout_secs: 120,
        }
    }
}

impl EndpointConfig {
    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Auto,
    Text,
    Pdf,
    Image,
    Docx,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Auto => "auto",
            Strategy::Text => "text",
            Strategy::Pdf => "pdf",
            Strategy::Image => "image",
            Strategy::Docx => "docx",
        }
    }
}

// ============ Persistence ============

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read a config file; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    if !path.exists() {
        log::info!("[Config] {} not found, using defaults", path.display());
        return Ok(PipelineConfig::default());
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn save_config(path: &Path, config: &PipelineConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let raw = serde_json::to_string_pretty(config)?;
    fs::write(path, raw)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.image.max_edge, 2400);
        assert_eq!(config.image.jpeg_quality, 92);
        assert_eq!(config.mask.token(PatternKind::Ssn), "[SSN]");
        assert_eq!(config.endpoint.url(), "http://localhost:8000/redact");
        assert_eq!(config.endpoint.strategy.as_str(), "auto");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let raw = r#"{ "image": { "maxEdge": 1024 }, "mask": { "mode": "unified" } }"#;
        let config: PipelineConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.image.max_edge, 1024);
        assert_eq!(config.image.jpeg_quality, 92);
        assert_eq!(config.mask.mode, MaskMode::Unified);
        assert_eq!(config.mask.template, "[{kind}]");
        assert!(config.endpoint.burn);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("veil.json");

        let mut config = PipelineConfig::default();
        config.endpoint.base_url = "https://redact.internal/".to_string();
        config.endpoint.strategy = Strategy::Pdf;
        config.mask.template = "<{kind}>".to_string();
        save_config(&path, &config).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.endpoint.url(), "https://redact.internal/redact");
        assert_eq!(loaded.mask.token(PatternKind::Email), "<EMAIL>");
    }

    #[test]
    fn test_malformed_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Json(_))));
    }
}
