use serde::{Deserialize, Serialize};
use triage::UrgencyLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub transcript: String,
    /// Expected top-ranked disease; `None` when nothing should match.
    pub expected_disease: Option<String>,
    pub expected_level: UrgencyLevel,
    pub category: ScenarioCategory,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScenarioCategory {
    Emergency,  // Warning signs present
    Infectious, // Fever-type presentations
    Routine,    // Skin, allergy, everyday complaints
    NoMatch,    // Nothing in the vocabulary
}

fn scenario(
    transcript: &str,
    expected_disease: Option<&str>,
    expected_level: UrgencyLevel,
    category: ScenarioCategory,
) -> Scenario {
    Scenario {
        transcript: transcript.to_string(),
        expected_disease: expected_disease.map(str::to_string),
        expected_level,
        category,
    }
}

/// Scenarios written against the bundled `data/` tables.
pub fn get_test_set() -> Vec<Scenario> {
    use ScenarioCategory::*;
    use UrgencyLevel::*;

    vec![
        // Emergency
        scenario("Crushing chest pain, breathlessness and sweating", Some("Heart attack"), Critical, Emergency),
        scenario(
            "Cough with phlegm and rusty sputum, fast heart rate and high fever",
            Some("Pneumonia"),
            Urgent,
            Emergency,
        ),
        scenario(
            "Lots of vomiting and diarrhoea, sunken eyes, signs of dehydration",
            Some("Gastroenteritis"),
            Urgent,
            Emergency,
        ),
        scenario(
            "Severe headache with blurred and distorted vision and a stiff neck",
            Some("Migraine"),
            Urgent,
            Emergency,
        ),

        // Infectious
        scenario(
            "I have high fever, chills, sweating, headache and nausea with muscle pain",
            Some("Malaria"),
            Urgent,
            Infectious,
        ),
        scenario(
            "Fever with pain behind the eyes, joint pain, back pain and red spots over body",
            Some("Dengue"),
            Moderate,
            Infectious,
        ),
        scenario(
            "Burning micturition, bladder discomfort and a foul smell of urine",
            Some("Urinary tract infection"),
            Moderate,
            Infectious,
        ),
        scenario("Cough, runny nose, congestion and throat irritation", Some("Common Cold"), Moderate, Infectious),

        // Routine
        scenario(
            "I have itching all over and a skin rash with some dischromic patches",
            Some("Fungal infection"),
            Moderate,
            Routine,
        ),
        scenario(
            "Continuous sneezing, shivering and watering from eyes since this morning",
            Some("Allergy"),
            Moderate,
            Routine,
        ),
        scenario("Pus filled pimples and blackheads on my face", Some("Acne"), Mild, Routine),

        // No match
        scenario("My knee feels a bit sore today", None, Mild, NoMatch),
    ]
}
