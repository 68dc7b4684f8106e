//! Rule-table reasoning: disease matching and urgency classification.

pub mod disease;
pub mod matcher;
pub mod overall;
pub mod severity;
pub mod urgency;

pub use disease::{disease_urgency, MatchStrength};
pub use matcher::{rank, ranking_order, score, DiseaseMatch};
pub use overall::{TriageRule, TriageRules, DEFAULT_MODERATE_SYMPTOM_THRESHOLD};
pub use severity::{name_contains_phrase, SeverityTable, SeverityTier};
pub use urgency::{UrgencyClassification, UrgencyLevel};
