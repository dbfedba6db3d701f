//! Plain-text redaction
//!
//! In-memory masking of PII in text, plus loading of `.txt` / `.md` files.

mod redactor;

pub use redactor::{Redaction, TextRedactor};

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

use veil_core::{Catalog, PiiMatch};

/// Extensions accepted by [`TextDocument::load`].
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "text"];

/// Conventional filename for saved redacted text.
pub const REDACTED_FILE_NAME: &str = "redacted.txt";

/// A plain-text document held in memory.
///
/// The whole file is one unit; there is no paging.
pub struct TextDocument {
    name: String,
    content: String,
}

impl TextDocument {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow!("file not found: {}", path.display()));
        }

        let extension = path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or("")
            .to_lowercase();
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(anyhow!(
                "only plain text or markdown is supported, got: {}",
                path.display()
            ));
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Ok(Self { name, content })
    }

    /// Invalid UTF-8 is replaced, not rejected.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            content: String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn scan(&self, catalog: &Catalog) -> Vec<PiiMatch> {
        catalog.scan(&self.content)
    }

    pub fn redact(&self, redactor: &TextRedactor) -> Redaction {
        redactor.redact(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_core::{MaskConfig, PatternKind};

    #[test]
    fn test_load_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "# Intake\nDOB 04/12/1987\n").unwrap();

        let doc = TextDocument::load(&path).unwrap();
        assert_eq!(doc.name(), "notes.md");
        let matches = doc.scan(&Catalog::standard());
        assert!(matches.iter().any(|m| m.kind == PatternKind::Dob));

        let r = doc.redact(&TextRedactor::new(&MaskConfig::default()));
        assert_eq!(r.masked_text, "# Intake\nDOB [DOB]\n");
    }

    #[test]
    fn test_load_rejects_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        fs::write(&path, b"%PDF-1.7").unwrap();
        assert!(TextDocument::load(&path).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TextDocument::load(&dir.path().join("gone.txt")).is_err());
    }

    #[test]
    fn test_from_bytes_lossy() {
        let doc = TextDocument::from_bytes("raw.txt", b"ok \xff 555-123-4567");
        assert!(doc.content().contains('\u{fffd}'));
        assert_eq!(doc.scan(&Catalog::standard()).len(), 1);
    }
}
