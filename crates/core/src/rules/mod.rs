//! PII pattern catalog and scanner
//!
//! A catalog is an ordered list of detectors, exactly one per [`PatternKind`].
//! The declared order decides tie-breaking in [`Catalog::scan`] and the order
//! in which masks are applied by the text redactor.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CoreError, Result};

mod patterns;

use patterns::{STANDARD, STRICT};

/// Kinds of PII the catalog knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternKind {
    /// Social security number
    Ssn,
    Phone,
    Email,
    /// Date of birth (any numeric date)
    Dob,
    /// House-number-plus-words heuristic
    AddressLike,
    Zip,
    /// Bank account / routing number
    BankRouting,
}

impl PatternKind {
    pub const ALL: [PatternKind; 7] = [
        PatternKind::Ssn,
        PatternKind::Phone,
        PatternKind::Email,
        PatternKind::Dob,
        PatternKind::AddressLike,
        PatternKind::Zip,
        PatternKind::BankRouting,
    ];

    /// Label used inside mask tokens, e.g. `[SSN]`.
    pub fn label(self) -> &'static str {
        match self {
            PatternKind::Ssn => "SSN",
            PatternKind::Phone => "PHONE",
            PatternKind::Email => "EMAIL",
            PatternKind::Dob => "DOB",
            PatternKind::AddressLike => "ADDRESS-ish",
            PatternKind::Zip => "ZIP",
            PatternKind::BankRouting => "BANK/ROUTING",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One scanner hit.
///
/// `start`/`end` are byte offsets into the scanned text, so
/// `&text[start..end] == value` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiMatch {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub start: usize,
    pub end: usize,
    pub value: String,
}

/// A match reduced to what a report needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PiiHit {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub value: String,
}

impl From<PiiMatch> for PiiHit {
    fn from(m: PiiMatch) -> Self {
        Self {
            kind: m.kind,
            value: m.value,
        }
    }
}

/// A compiled detector.
#[derive(Debug, Clone)]
pub struct Pattern {
    kind: PatternKind,
    regex: Regex,
}

impl Pattern {
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Ordered set of detectors.
#[derive(Debug, Clone)]
pub struct Catalog {
    patterns: Vec<Pattern>,
}

impl Catalog {
    /// The seven-kind catalog: SSN, PHONE, EMAIL, DOB, ADDRESS-ish, ZIP, BANK/ROUTING.
    pub fn standard() -> Self {
        STANDARD.clone()
    }

    /// Narrower catalog used for file hygiene reports: SSN (dashed), DOB
    /// (plausible month/day/year), PHONE, EMAIL.
    pub fn strict() -> Self {
        STRICT.clone()
    }

    /// Build a catalog from `(kind, pattern)` pairs, keeping their order.
    ///
    /// # Errors
    /// - a pattern does not compile
    /// - a kind appears more than once
    pub fn from_patterns<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (PatternKind, &'a str)>,
    {
        let mut patterns: Vec<Pattern> = Vec::new();
        for (kind, source) in entries {
            if patterns.iter().any(|p| p.kind == kind) {
                return Err(CoreError::DuplicateKind(kind));
            }
            let regex =
                Regex::new(source).map_err(|source| CoreError::InvalidPattern { kind, source })?;
            patterns.push(Pattern { kind, regex });
        }
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn kinds(&self) -> impl Iterator<Item = PatternKind> + '_ {
        self.patterns.iter().map(|p| p.kind)
    }

    /// Position of `kind` in declaration order.
    pub fn rank(&self, kind: PatternKind) -> Option<usize> {
        self.patterns.iter().position(|p| p.kind == kind)
    }

    pub fn get(&self, kind: PatternKind) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Run every detector over the whole text.
    ///
    /// Kinds do not suppress each other, so the result may contain
    /// overlapping matches. Sorted by `start`; equal starts keep catalog order.
    pub fn scan(&self, text: &str) -> Vec<PiiMatch> {
        let mut matches = Vec::new();

        for pattern in &self.patterns {
            for m in pattern.regex.find_iter(text) {
                if m.start() == m.end() {
                    continue;
                }
                matches.push(PiiMatch {
                    kind: pattern.kind,
                    start: m.start(),
                    end: m.end(),
                    value: m.as_str().to_string(),
                });
            }
        }

        // stable: ties stay in catalog order
        matches.sort_by_key(|m| m.start);
        log::debug!(
            "[Scanner] {} matches over {} bytes",
            matches.len(),
            text.len()
        );
        matches
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Scan with the standard catalog.
pub fn scan(text: &str) -> Vec<PiiMatch> {
    STANDARD.scan(text)
}
