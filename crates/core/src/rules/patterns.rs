//! Built-in detector sources, compiled once.

use once_cell::sync::Lazy;

use super::{Catalog, PatternKind};

// Boundaries and digits are ASCII-only: PII glued to CJK or accented text
// must still match, and non-Latin digits must not.

// ============================================================================
// Standard catalog (mask order)
// ============================================================================

const STANDARD_SOURCES: [(PatternKind, &str); 7] = [
    (
        PatternKind::Ssn,
        r"(?-u:\b)[0-9]{3}-?[0-9]{2}-?[0-9]{4}(?-u:\b)",
    ),
    (
        PatternKind::Phone,
        r"(?-u:\b)(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}(?-u:\b)",
    ),
    (
        PatternKind::Email,
        r"(?i)(?-u:\b)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}(?-u:\b)",
    ),
    (
        PatternKind::Dob,
        r"(?-u:\b)(?:[0-9]{1,2}[/-]){2}[0-9]{2,4}(?-u:\b)",
    ),
    (
        PatternKind::AddressLike,
        r"(?-u:\b)[0-9]{1,6}\s+[A-Za-z0-9.\s]{3,}(?-u:\b)",
    ),
    (PatternKind::Zip, r"(?-u:\b)[0-9]{5}(?:-[0-9]{4})?(?-u:\b)"),
    (PatternKind::BankRouting, r"(?-u:\b)[0-9]{9,12}(?-u:\b)"),
];

// ============================================================================
// Strict catalog (file hygiene reports)
// ============================================================================

const STRICT_SOURCES: [(PatternKind, &str); 4] = [
    (PatternKind::Ssn, r"(?-u:\b)[0-9]{3}-[0-9]{2}-[0-9]{4}(?-u:\b)"),
    (
        PatternKind::Dob,
        r"(?-u:\b)(?:0?[1-9]|1[0-2])[/\-](?:0?[1-9]|[12][0-9]|3[01])[/\-](?:19|20)[0-9]{2}(?-u:\b)",
    ),
    (
        PatternKind::Phone,
        r"(?:\+?1[\s\-.]?)?\(?[0-9]{3}\)?[\s\-.]?[0-9]{3}[\s\-.]?[0-9]{4}(?-u:\b)",
    ),
    (
        PatternKind::Email,
        r"(?i)(?-u:\b)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}(?-u:\b)",
    ),
];

pub(super) static STANDARD: Lazy<Catalog> = Lazy::new(|| {
    Catalog::from_patterns(STANDARD_SOURCES).expect("built-in standard patterns must compile")
});

pub(super) static STRICT: Lazy<Catalog> = Lazy::new(|| {
    Catalog::from_patterns(STRICT_SOURCES).expect("built-in strict patterns must compile")
});
