//! Transcript-level triage from emergency keywords.

use anyhow::{Context, Result};
use knowledge::Symptom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use crate::urgency::{UrgencyClassification, UrgencyLevel};

pub const DEFAULT_MODERATE_SYMPTOM_THRESHOLD: usize = 3;

/// A keyword group that raises the overall urgency to `level`.
///
/// `reasoning` may contain `{keyword}`, replaced by the keyword that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageRule {
    pub keywords: Vec<String>,
    pub level: UrgencyLevel,
    pub reasoning: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageRules {
    pub rules: Vec<TriageRule>,
    #[serde(default = "default_threshold")]
    pub moderate_symptom_threshold: usize,
}

fn default_threshold() -> usize {
    DEFAULT_MODERATE_SYMPTOM_THRESHOLD
}

fn rule(level: UrgencyLevel, keywords: &[&str], reasoning: &str, action: &str) -> TriageRule {
    TriageRule {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        level,
        reasoning: reasoning.to_string(),
        action: action.to_string(),
    }
}

impl Default for TriageRules {
    fn default() -> Self {
        let emergency = "Call emergency services (102/911) immediately";
        Self {
            rules: vec![
                rule(
                    UrgencyLevel::Critical,
                    &[
                        "chest pain",
                        "difficulty breathing",
                        "trouble breathing",
                        "not breathing",
                        "choking",
                        "heart attack",
                    ],
                    "Emergency warning sign reported: {keyword}",
                    emergency,
                ),
                rule(
                    UrgencyLevel::Critical,
                    &[
                        "unconscious",
                        "unconsciousness",
                        "loss of consciousness",
                        "unresponsive",
                        "coma",
                        "seizure",
                        "seizures",
                        "convulsions",
                        "slurred speech",
                        "weakness of one body side",
                        "stroke",
                    ],
                    "Neurological emergency sign reported: {keyword}",
                    emergency,
                ),
                rule(
                    UrgencyLevel::Critical,
                    &["severe bleeding", "vomiting blood", "stomach bleeding", "coughing blood"],
                    "Serious bleeding reported: {keyword}",
                    emergency,
                ),
                rule(
                    UrgencyLevel::Urgent,
                    &[
                        "bleeding",
                        "high fever",
                        "breathlessness",
                        "shortness of breath",
                        "fainting",
                        "fainted",
                        "palpitations",
                        "fast heart rate",
                        "stiff neck",
                        "blood in sputum",
                        "confusion",
                        "altered sensorium",
                        "dehydration",
                        "severe pain",
                        "acute liver failure",
                    ],
                    "Warning sign reported: {keyword}",
                    "Go to hospital/emergency center within a few hours",
                ),
            ],
            moderate_symptom_threshold: DEFAULT_MODERATE_SYMPTOM_THRESHOLD,
        }
    }
}

impl TriageRules {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse triage rules")
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read triage rules: {:?}", path))?;
        Self::from_json_str(&content)
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.moderate_symptom_threshold = threshold;
        self
    }

    /// Overall urgency for a transcript, triggered by the union of extracted
    /// symptoms and the transcript's own words.
    pub fn classify(&self, symptoms: &BTreeSet<Symptom>, transcript: &str) -> UrgencyClassification {
        let units: Vec<String> = symptoms
            .iter()
            .map(|s| s.as_str().to_string())
            .chain(clauses(transcript))
            .collect();
        self.classify_units(&units, symptoms.len())
    }

    /// Highest-level rule with a keyword present in one of `units`; ties go to
    /// the earlier rule. Without a match, `symptom_count` decides Moderate vs Mild.
    ///
    /// A unit is one symptom id or one clause of text. Keywords never span two units.
    pub fn classify_units(&self, units: &[String], symptom_count: usize) -> UrgencyClassification {
        let haystack = UnitSet::new(units);

        let mut best: Option<(&TriageRule, &str)> = None;
        for rule in &self.rules {
            if best.is_some_and(|(b, _)| b.level >= rule.level) {
                continue;
            }
            if let Some(keyword) = rule.keywords.iter().find(|k| haystack.contains(k)) {
                best = Some((rule, keyword.as_str()));
            }
        }

        if let Some((rule, keyword)) = best {
            let keyword = normalize_token(keyword);
            debug!(level = %rule.level, keyword = %keyword, "Triage rule matched");
            return UrgencyClassification::new(
                rule.level,
                rule.reasoning.replace("{keyword}", &keyword),
                rule.action.clone(),
            );
        }

        if symptom_count >= self.moderate_symptom_threshold.max(1) {
            UrgencyClassification::new(
                UrgencyLevel::Moderate,
                format!("{} symptoms reported together, no emergency signs", symptom_count),
                "See a doctor within 24 hours",
            )
        } else if symptom_count > 0 {
            UrgencyClassification::new(
                UrgencyLevel::Mild,
                "No emergency warning signs detected",
                "Home care and rest, consult a doctor if symptoms persist or worsen",
            )
        } else {
            UrgencyClassification::new(
                UrgencyLevel::Mild,
                "No recognized symptoms or warning signs",
                "Monitor how you feel, consult a doctor if symptoms appear",
            )
        }
    }
}

/// Normalized units, each space padded so keywords match whole word runs.
/// A symptom id such as `chest_pain` reads as `chest pain`.
struct UnitSet {
    units: Vec<String>,
}

impl UnitSet {
    fn new(units: &[String]) -> Self {
        Self {
            units: units
                .iter()
                .map(|u| normalize_token(u))
                .filter(|u| !u.is_empty())
                .map(|u| format!(" {} ", u))
                .collect(),
        }
    }

    fn contains(&self, keyword: &str) -> bool {
        let keyword = normalize_token(keyword);
        if keyword.is_empty() {
            return false;
        }
        let needle = format!(" {} ", keyword);
        self.units.iter().any(|u| u.contains(&needle))
    }
}

/// Split text at sentence and list punctuation. `_`, `-` and apostrophes stay
/// inside words.
fn clauses(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '-' | '\'' | '\u{2019}')))
        .filter(|clause| !clause.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercase, `_`/`-` to spaces, punctuation stripped.
fn normalize_token(token: &str) -> String {
    token
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
