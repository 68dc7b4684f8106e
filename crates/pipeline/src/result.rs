use serde::Serialize;
use triage::UrgencyClassification;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedSymptom {
    pub name: String,
}

/// One ranked candidate disease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub name: String,
    pub match_count: usize,
    pub matched_symptoms: Vec<String>,
    pub urgency: UrgencyClassification,
    pub precautions: Vec<String>,
}

/// Precautions for the top-ranked disease; `{}` when there is none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MappedPrecautions {
    Top {
        disease: String,
        precautions: Vec<String>,
    },
    Empty {},
}

impl MappedPrecautions {
    pub fn disease(&self) -> Option<&str> {
        match self {
            MappedPrecautions::Top { disease, .. } => Some(disease.as_str()),
            MappedPrecautions::Empty {} => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, MappedPrecautions::Empty {})
    }
}

/// Everything produced for one transcript.
///
/// On failure `success` is false, `error` is set, collections are empty and
/// `overall_triage` is null; the transcript is still echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub transcript: String,
    pub symptoms_extracted: Vec<ExtractedSymptom>,
    pub diagnoses: Vec<Diagnosis>,
    pub overall_triage: Option<UrgencyClassification>,
    pub mapped_precautions: MappedPrecautions,
    pub age: Option<u32>,
    pub sex: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn failure(transcript: &str, age: Option<u32>, sex: Option<String>, error: String) -> Self {
        Self {
            transcript: transcript.to_string(),
            symptoms_extracted: Vec::new(),
            diagnoses: Vec::new(),
            overall_triage: None,
            mapped_precautions: MappedPrecautions::Empty {},
            age,
            sex,
            success: false,
            error: Some(error),
        }
    }

    pub fn top_diagnosis(&self) -> Option<&Diagnosis> {
        self.diagnoses.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mapped_precautions_is_empty_object() {
        let json = serde_json::to_value(MappedPrecautions::Empty {}).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn test_failure_shape() {
        let result = AnalysisResult::failure("help", Some(40), None, "boom".to_string());
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
        assert_eq!(json["transcript"], "help");
        assert_eq!(json["diagnoses"], serde_json::json!([]));
        assert_eq!(json["symptoms_extracted"], serde_json::json!([]));
        assert!(json["overall_triage"].is_null());
        assert_eq!(json["mapped_precautions"], serde_json::json!({}));
    }
}
