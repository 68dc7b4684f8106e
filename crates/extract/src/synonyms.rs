use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Maps everyday phrases onto vocabulary symptoms, e.g. `"tummy ache"` -> `stomach_pain`.
///
/// Stored as JSON object `{ "phrase": "symptom_id", ... }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymTable {
    entries: BTreeMap<String, String>,
}

impl SynonymTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, phrase: &str, symptom: &str) -> Self {
        self.insert(phrase, symptom);
        self
    }

    pub fn insert(&mut self, phrase: &str, symptom: &str) {
        self.entries.insert(phrase.to_string(), symptom.to_string());
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse synonym table")
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read synonym table: {:?}", path))?;
        Self::from_json_str(&content)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, s)| (p.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
