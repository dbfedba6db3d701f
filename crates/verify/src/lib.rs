//! Post-processing verification checks.

mod metadata;

pub use metadata::{scan_image_metadata, MetadataBlock, MetadataKind};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use veil_core::{Catalog, PatternKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOptions {
    /// Re-scan output text for residual PII
    pub text_search: bool,
    /// Look for metadata blocks left in output images
    pub metadata_scan: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            text_search: true,
            metadata_scan: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyResult {
    pub ok: bool,
    pub warnings: Vec<String>,
}

impl VerifyResult {
    fn from_warnings(warnings: Vec<String>) -> Self {
        Self {
            ok: warnings.is_empty(),
            warnings,
        }
    }
}

/// Residual PII check. Warnings name the kind and count, never the value.
pub fn verify_text(text: &str, catalog: &Catalog) -> VerifyResult {
    let mut counts: BTreeMap<usize, (PatternKind, usize)> = BTreeMap::new();
    for m in catalog.scan(text) {
        let rank = catalog.rank(m.kind).unwrap_or(usize::MAX);
        counts.entry(rank).or_insert((m.kind, 0)).1 += 1;
    }

    let warnings: Vec<String> = counts
        .into_values()
        .map(|(kind, n)| format!("{} residual {} match(es)", n, kind))
        .collect();
    if !warnings.is_empty() {
        log::warn!("[Verify] residual PII: {}", warnings.join("; "));
    }
    VerifyResult::from_warnings(warnings)
}

/// Residual metadata check on an encoded image.
pub fn verify_image(bytes: &[u8], options: &VerifyOptions) -> VerifyResult {
    if !options.metadata_scan {
        return VerifyResult::from_warnings(Vec::new());
    }

    let warnings: Vec<String> = scan_image_metadata(bytes)
        .iter()
        .map(|block| {
            format!(
                "{:?} block ({} bytes) at offset {}",
                block.kind, block.length, block.offset
            )
        })
        .collect();
    if !warnings.is_empty() {
        log::warn!("[Verify] image still carries {} metadata block(s)", warnings.len());
    }
    VerifyResult::from_warnings(warnings)
}

/// Run the checks enabled in `options` over a redacted text.
pub fn verify_output_text(text: &str, catalog: &Catalog, options: &VerifyOptions) -> VerifyResult {
    if options.text_search {
        verify_text(text, catalog)
    } else {
        VerifyResult::from_warnings(Vec::new())
    }
}
