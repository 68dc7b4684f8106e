use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// A normalized symptom identifier such as `stomach_pain`.
///
/// Identifiers are trimmed and case-folded on construction. Underscores and
/// hyphens are kept in the identifier itself and only treated as word
/// separators when the symptom is compared against free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symptom(String);

impl Symptom {
    /// Parse a raw table cell. Empty cells and `nan` placeholders yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() || normalized == "nan" {
            return None;
        }
        Some(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constituent words, splitting on underscores, hyphens and whitespace.
    pub fn words(&self) -> Vec<&str> {
        self.0
            .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
            .filter(|w| !w.is_empty())
            .collect()
    }

    /// Human readable form, e.g. `stomach pain`.
    pub fn display_name(&self) -> String {
        self.words().join(" ")
    }
}

impl fmt::Display for Symptom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Symptom {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Symptom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
