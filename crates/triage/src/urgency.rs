use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered urgency tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UrgencyLevel {
    Mild,
    Moderate,
    Urgent,
    Critical,
}

impl UrgencyLevel {
    pub const ALL: [UrgencyLevel; 4] = [
        UrgencyLevel::Mild,
        UrgencyLevel::Moderate,
        UrgencyLevel::Urgent,
        UrgencyLevel::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyLevel::Mild => "Mild",
            UrgencyLevel::Moderate => "Moderate",
            UrgencyLevel::Urgent => "Urgent",
            UrgencyLevel::Critical => "Critical",
        }
    }

    pub fn default_color(self) -> &'static str {
        match self {
            UrgencyLevel::Critical | UrgencyLevel::Urgent => "red",
            UrgencyLevel::Moderate => "amber",
            UrgencyLevel::Mild => "green",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            UrgencyLevel::Critical => "🚨",
            UrgencyLevel::Urgent => "⚠️",
            UrgencyLevel::Moderate => "⏱️",
            UrgencyLevel::Mild => "✓",
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency tier plus the guidance shown alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyClassification {
    pub level: UrgencyLevel,
    pub color: String,
    pub icon: String,
    pub reasoning: String,
    pub action: String,
}

impl UrgencyClassification {
    /// Classification using the level's default color and icon.
    pub fn new(level: UrgencyLevel, reasoning: impl Into<String>, action: impl Into<String>) -> Self {
        Self::with_color(level, level.default_color(), reasoning, action)
    }

    pub fn with_color(
        level: UrgencyLevel,
        color: &str,
        reasoning: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            level,
            color: color.to_string(),
            icon: level.icon().to_string(),
            reasoning: reasoning.into(),
            action: action.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(UrgencyLevel::Mild < UrgencyLevel::Moderate);
        assert!(UrgencyLevel::Moderate < UrgencyLevel::Urgent);
        assert!(UrgencyLevel::Urgent < UrgencyLevel::Critical);
        assert_eq!(UrgencyLevel::ALL.iter().max(), Some(&UrgencyLevel::Critical));
    }

    #[test]
    fn test_serializes_level_name() {
        let c = UrgencyClassification::new(UrgencyLevel::Critical, "r", "a");
        let json = serde_json::to_value(&c).unwrap();

        assert_eq!(json["level"], "Critical");
        assert_eq!(json["color"], "red");
        assert_eq!(json["icon"], "🚨");
    }
}
