use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named chain address owned by the contact store. Callers always
/// receive clones; the store keeps the authoritative record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn new(name: &str, address: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            address: address.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

lazy_static! {
    static ref NON_WORD_RE: Regex = Regex::new(r"[^\w\s]").unwrap();
}

/// Write-side normalization: stored names are lowercased and trimmed.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Lookup-side normalization additionally strips punctuation, so
/// "Alice!" still resolves. Insertion does not strip punctuation; the
/// asymmetry is observed legacy behavior (see DESIGN.md).
pub fn normalize_lookup(raw: &str) -> String {
    NON_WORD_RE
        .replace_all(raw, "")
        .to_lowercase()
        .trim()
        .to_string()
}
