//! Symptom extraction: maps free text onto the known symptom vocabulary.

pub mod normalizer;
pub mod synonyms;

pub use normalizer::{normalize, NormalizedText};
pub use synonyms::SynonymTable;

use knowledge::Symptom;
use std::collections::BTreeSet;
use tracing::debug;

/// One vocabulary symptom (or synonym phrase) and the words that must be present.
#[derive(Debug, Clone)]
struct Pattern {
    words: Vec<String>,
    symptom: Symptom,
}

impl Pattern {
    fn new(phrase: &str, symptom: Symptom) -> Option<Self> {
        let words = normalize(phrase).tokens().to_vec();
        (!words.is_empty()).then_some(Self { words, symptom })
    }
}

/// Finds vocabulary symptoms mentioned in free text.
///
/// A symptom is mentioned when its words appear back to back in the normalized
/// text, or, for multi-word symptoms, when all of its words appear anywhere in
/// the text ("pain in my stomach" mentions `stomach_pain`). Synonym phrases use
/// the same rule. Extraction is a pure function of text, vocabulary and synonyms.
#[derive(Debug, Clone, Default)]
pub struct SymptomExtractor {
    patterns: Vec<Pattern>,
}

impl SymptomExtractor {
    pub fn new<'a, I>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = &'a Symptom>,
    {
        let patterns = vocabulary
            .into_iter()
            .filter_map(|s| Pattern::new(s.as_str(), s.clone()))
            .collect();
        Self { patterns }
    }

    /// Layer a synonym table on top of the vocabulary. Entries pointing at
    /// symptoms outside the vocabulary are ignored.
    pub fn with_synonyms(mut self, synonyms: &SynonymTable) -> Self {
        let known: BTreeSet<Symptom> = self.patterns.iter().map(|p| p.symptom.clone()).collect();

        for (phrase, target) in synonyms.iter() {
            let Some(symptom) = Symptom::parse(target).filter(|s| known.contains(s)) else {
                debug!(phrase, target, "Ignoring synonym for unknown symptom");
                continue;
            };
            if let Some(pattern) = Pattern::new(phrase, symptom) {
                self.patterns.push(pattern);
            }
        }
        self
    }

    pub fn extract(&self, text: &str) -> BTreeSet<Symptom> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return BTreeSet::new();
        }

        self.patterns
            .iter()
            .filter(|p| is_mentioned(&p.words, &normalized))
            .map(|p| p.symptom.clone())
            .collect()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

/// Matching rule shared by vocabulary entries and synonyms.
pub fn is_mentioned(words: &[String], text: &NormalizedText) -> bool {
    text.contains_sequence(words) || (words.len() > 1 && text.contains_all(words))
}
