//! Text masking
//!
//! [`MaskMode::Sequential`] applies one replace pass per kind in catalog order.
//! Each pass sees the output of the previous ones, so a later detector can
//! match inside a token written by an earlier one.
//! [`MaskMode::Unified`] scans the original text once and keeps, for every
//! overlap, the match whose kind is declared first.

use regex::Captures;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use veil_core::{Catalog, MaskConfig, MaskMode, PatternKind, PiiHit, PiiMatch};

/// Result of masking one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redaction {
    pub masked_text: String,
    /// Number of replacements performed
    pub hit_count: usize,
    /// Distinct `(kind, value)` pairs, first-seen order
    pub hits: Vec<PiiHit>,
}

pub struct TextRedactor {
    catalog: Catalog,
    config: MaskConfig,
}

impl TextRedactor {
    /// Standard catalog.
    pub fn new(config: &MaskConfig) -> Self {
        Self::with_catalog(Catalog::standard(), config)
    }

    pub fn with_catalog(catalog: Catalog, config: &MaskConfig) -> Self {
        Self {
            catalog,
            config: config.clone(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn mode(&self) -> MaskMode {
        self.config.mode
    }

    pub fn redact(&self, text: &str) -> Redaction {
        let redaction = match self.config.mode {
            MaskMode::Sequential => self.redact_sequential(text),
            MaskMode::Unified => self.redact_unified(text),
        };
        log::info!(
            "[Redactor] {:?}: {} replacements, {} distinct hits",
            self.config.mode,
            redaction.hit_count,
            redaction.hits.len()
        );
        redaction
    }

    fn redact_sequential(&self, text: &str) -> Redaction {
        let mut masked = text.to_string();
        let mut hit_count = 0;
        let mut hits = HitList::default();

        for pattern in self.catalog.patterns() {
            let kind = pattern.kind();
            let token = self.config.token(kind);
            let mut replaced = 0;

            let next = pattern
                .regex()
                .replace_all(&masked, |caps: &Captures<'_>| {
                    replaced += 1;
                    hits.push(kind, &caps[0]);
                    token.clone()
                })
                .into_owned();
            masked = next;

            if replaced > 0 {
                log::debug!("[Redactor] {} pass: {} replacements", kind, replaced);
            }
            hit_count += replaced;
        }

        Redaction {
            masked_text: masked,
            hit_count,
            hits: hits.into_vec(),
        }
    }

    fn redact_unified(&self, text: &str) -> Redaction {
        let accepted = self.resolve_overlaps(self.catalog.scan(text));

        let mut masked = String::with_capacity(text.len());
        let mut hits = HitList::default();
        let mut last_end = 0;

        for m in &accepted {
            masked.push_str(&text[last_end..m.start]);
            masked.push_str(&self.config.token(m.kind));
            hits.push(m.kind, &m.value);
            last_end = m.end;
        }
        masked.push_str(&text[last_end..]);

        Redaction {
            masked_text: masked,
            hit_count: accepted.len(),
            hits: hits.into_vec(),
        }
    }

    /// Keep matches in catalog priority; drop anything overlapping a kept one.
    /// Returned sorted by position.
    fn resolve_overlaps(&self, mut matches: Vec<PiiMatch>) -> Vec<PiiMatch> {
        matches.sort_by_key(|m| (self.catalog.rank(m.kind), m.start));

        let mut accepted: Vec<PiiMatch> = Vec::with_capacity(matches.len());
        for m in matches {
            let overlaps = accepted
                .iter()
                .any(|kept| m.start < kept.end && kept.start < m.end);
            if !overlaps {
                accepted.push(m);
            }
        }

        accepted.sort_by_key(|m| m.start);
        accepted
    }
}

#[derive(Default)]
struct HitList {
    seen: HashSet<(PatternKind, String)>,
    hits: Vec<PiiHit>,
}

impl HitList {
    fn push(&mut self, kind: PatternKind, value: &str) {
        if self.seen.insert((kind, value.to_string())) {
            self.hits.push(PiiHit {
                kind,
                value: value.to_string(),
            });
        }
    }

    fn into_vec(self) -> Vec<PiiHit> {
        self.hits
    }
}
