use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// How dangerous a disease is regardless of how well it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Low,
    Medium,
    High,
}

const HIGH_SEVERITY: &[&str] = &[
    "heart attack",
    "stroke",
    "myocardial infarction",
    "sepsis",
    "acute respiratory distress",
    "pneumonia",
    "meningitis",
    "encephalitis",
    "anaphylaxis",
    "status asthmaticus",
    "hemorrhage",
    "trauma",
];

const MEDIUM_SEVERITY: &[&str] = &[
    "appendicitis",
    "pancreatitis",
    "cholecystitis",
    "dengue",
    "malaria",
    "typhoid",
    "hepatitis",
    "gastroenteritis",
    "urinary tract infection",
    "kidney stones",
    "severe infection",
    "diabetes",
];

/// Phrase -> tier table, matched against disease names.
///
/// JSON form: `{ "sepsis": "high", "dengue": "medium", ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityTable {
    phrases: BTreeMap<String, SeverityTier>,
}

impl Default for SeverityTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for phrase in HIGH_SEVERITY {
            table.insert(phrase, SeverityTier::High);
        }
        for phrase in MEDIUM_SEVERITY {
            table.insert(phrase, SeverityTier::Medium);
        }
        table
    }
}

impl SeverityTable {
    pub fn empty() -> Self {
        Self {
            phrases: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, phrase: &str, tier: SeverityTier) {
        let phrase = phrase.trim().to_lowercase();
        if !phrase.is_empty() {
            self.phrases.insert(phrase, tier);
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, SeverityTier> =
            serde_json::from_str(json).context("Failed to parse severity table")?;
        let mut table = Self::empty();
        for (phrase, tier) in raw {
            table.insert(&phrase, tier);
        }
        Ok(table)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read severity table: {:?}", path))?;
        Self::from_json_str(&content)
    }

    /// Highest tier whose phrase is contained in the disease name; `Low` if none.
    pub fn tier_of(&self, disease_name: &str) -> SeverityTier {
        self.phrases
            .iter()
            .filter(|(phrase, _)| name_contains_phrase(disease_name, phrase))
            .map(|(_, tier)| *tier)
            .max()
            .unwrap_or(SeverityTier::Low)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// Case-insensitive substring containment.
///
/// Deliberately loose: "Heart attack risk factor" contains "heart attack" and is
/// treated as high severity.
pub fn name_contains_phrase(disease_name: &str, phrase: &str) -> bool {
    disease_name
        .to_lowercase()
        .contains(&phrase.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers() {
        let table = SeverityTable::default();

        assert_eq!(table.tier_of("Sepsis"), SeverityTier::High);
        assert_eq!(table.tier_of("Pneumonia"), SeverityTier::High);
        assert_eq!(table.tier_of("Dengue"), SeverityTier::Medium);
        assert_eq!(table.tier_of("Chronic cholestasis"), SeverityTier::Low);
        assert_eq!(table.tier_of("Common Cold"), SeverityTier::Low);
    }

    #[test]
    fn test_substring_over_match_is_accepted() {
        let table = SeverityTable::default();

        assert_eq!(table.tier_of("Heart attack risk factor"), SeverityTier::High);
        assert_eq!(table.tier_of("Hepatitis B"), SeverityTier::Medium);
        assert!(name_contains_phrase("Paralysis (brain hemorrhage)", "HEMORRHAGE"));
    }

    #[test]
    fn test_highest_tier_wins() {
        let mut table = SeverityTable::empty();
        table.insert("infection", SeverityTier::Medium);
        table.insert("Severe", SeverityTier::High);

        assert_eq!(table.tier_of("Severe infection"), SeverityTier::High);
    }

    #[test]
    fn test_from_json() {
        let table = SeverityTable::from_json_str(r#"{"Cholera": "high", "flu": "medium"}"#).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.tier_of("cholera"), SeverityTier::High);
        assert_eq!(table.tier_of("Sepsis"), SeverityTier::Low);
        assert!(SeverityTable::from_json_str(r#"{"flu": "extreme"}"#).is_err());
    }
}
