//! Per-disease urgency: severity tier of the disease crossed with match strength.

use crate::severity::{SeverityTable, SeverityTier};
use crate::urgency::{UrgencyClassification, UrgencyLevel};

/// How well a disease matched the reported symptoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchStrength {
    /// 0 or 1 shared symptom.
    Weak,
    /// 2 or 3 shared symptoms.
    Partial,
    /// 4 or more shared symptoms.
    Strong,
}

impl MatchStrength {
    pub fn from_count(match_count: usize) -> Self {
        match match_count {
            0..=1 => MatchStrength::Weak,
            2..=3 => MatchStrength::Partial,
            _ => MatchStrength::Strong,
        }
    }
}

pub fn disease_urgency(
    table: &SeverityTable,
    disease_name: &str,
    match_count: usize,
) -> UrgencyClassification {
    classify(table.tier_of(disease_name), MatchStrength::from_count(match_count), disease_name)
}

/// | tier   | strong   | partial  | weak     |
/// |--------|----------|----------|----------|
/// | high   | Critical | Urgent   | Moderate |
/// | medium | Urgent   | Moderate | Mild     |
/// | low    | Moderate | Mild     | Mild     |
pub fn classify(tier: SeverityTier, strength: MatchStrength, disease: &str) -> UrgencyClassification {
    use MatchStrength::*;
    use SeverityTier::*;
    use UrgencyLevel as L;

    match (tier, strength) {
        (High, Strong) => UrgencyClassification::with_color(
            L::Critical,
            "red",
            format!("{} is a critical condition", disease),
            "Call emergency services (102/911) immediately",
        ),
        (High, Partial) => UrgencyClassification::with_color(
            L::Urgent,
            "red",
            format!("{} requires immediate hospital visit", disease),
            "Go to hospital/emergency center NOW",
        ),
        (High, Weak) => UrgencyClassification::with_color(
            L::Moderate,
            "amber",
            format!("Symptoms suggest {}, needs urgent evaluation", disease),
            "Visit hospital within 2-4 hours",
        ),
        (Medium, Strong) => UrgencyClassification::with_color(
            L::Urgent,
            "amber",
            format!("{} needs prompt medical attention", disease),
            "Visit hospital/clinic today",
        ),
        (Medium, Partial) => UrgencyClassification::with_color(
            L::Moderate,
            "amber",
            format!("{} requires medical consultation soon", disease),
            "See doctor within 24 hours",
        ),
        (Medium, Weak) => UrgencyClassification::with_color(
            L::Mild,
            "green",
            format!("Possible {}, monitor symptoms", disease),
            "Home care, consult doctor if symptoms worsen",
        ),
        (Low, Strong) => UrgencyClassification::with_color(
            L::Moderate,
            "amber",
            format!("Likely {}, moderate match", disease),
            "See doctor within 2-3 days",
        ),
        (Low, Partial) => UrgencyClassification::with_color(
            L::Mild,
            "green",
            format!("Possible {}, monitor symptoms", disease),
            "Home care, consult doctor if needed",
        ),
        (Low, Weak) => UrgencyClassification::with_color(
            L::Mild,
            "green",
            format!("Low likelihood of {}", disease),
            "Monitor symptoms, consult if they persist",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_severity_strong_match_is_critical() {
        let c = disease_urgency(&SeverityTable::default(), "Sepsis", 4);

        assert_eq!(c.level, UrgencyLevel::Critical);
        assert_eq!(c.color, "red");
        assert!(c.action.contains("emergency"));
        assert!(c.reasoning.contains("Sepsis"));
    }

    #[test]
    fn test_table() {
        let table = SeverityTable::default();
        let cases = [
            ("Sepsis", 5, UrgencyLevel::Critical),
            ("Sepsis", 3, UrgencyLevel::Urgent),
            ("Sepsis", 2, UrgencyLevel::Urgent),
            ("Sepsis", 1, UrgencyLevel::Moderate),
            ("Malaria", 4, UrgencyLevel::Urgent),
            ("Malaria", 3, UrgencyLevel::Moderate),
            ("Malaria", 1, UrgencyLevel::Mild),
            ("Common Cold", 6, UrgencyLevel::Moderate),
            ("Common Cold", 2, UrgencyLevel::Mild),
            ("Common Cold", 0, UrgencyLevel::Mild),
        ];

        for (disease, count, expected) in cases {
            assert_eq!(
                disease_urgency(&table, disease, count).level,
                expected,
                "{} with {} matches",
                disease,
                count
            );
        }
    }

    #[test]
    fn test_monotonic_in_match_count() {
        let table = SeverityTable::default();

        for disease in ["Heart attack", "Typhoid", "Acne"] {
            let levels: Vec<UrgencyLevel> = (0..10)
                .map(|n| disease_urgency(&table, disease, n).level)
                .collect();
            assert!(levels.windows(2).all(|w| w[0] <= w[1]), "{}: {:?}", disease, levels);
        }
    }

    #[test]
    fn test_strings_only_name_the_disease() {
        let c = disease_urgency(&SeverityTable::default(), "Typhoid", 2);
        assert_eq!(c.reasoning, "Typhoid requires medical consultation soon");
        assert_eq!(c.action, "See doctor within 24 hours");
    }
}
