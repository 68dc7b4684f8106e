pub mod error;
pub mod result;

pub use error::AnalysisError;
pub use result::{AnalysisResult, Diagnosis, ExtractedSymptom, MappedPrecautions};

use extract::{SymptomExtractor, SynonymTable};
use knowledge::{KnowledgeStore, Symptom};
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};
use triage::{SeverityTable, TriageRules};

/// Swappable rule tables for a pipeline.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub severity: SeverityTable,
    pub triage_rules: TriageRules,
    pub synonyms: SynonymTable,
}

/// Symptom extraction, disease ranking and triage over one knowledge store.
///
/// Immutable after construction and safe to share across threads; `analyze`
/// does no I/O.
pub struct Pipeline {
    store: Arc<KnowledgeStore>,
    extractor: SymptomExtractor,
    severity: SeverityTable,
    triage_rules: TriageRules,
}

impl Pipeline {
    pub fn new(store: Arc<KnowledgeStore>, config: PipelineConfig) -> Self {
        let extractor = SymptomExtractor::new(store.vocabulary()).with_synonyms(&config.synonyms);
        Self {
            store,
            extractor,
            severity: config.severity,
            triage_rules: config.triage_rules,
        }
    }

    pub fn with_defaults(store: Arc<KnowledgeStore>) -> Self {
        Self::new(store, PipelineConfig::default())
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    pub fn extract(&self, text: &str) -> BTreeSet<Symptom> {
        self.extractor.extract(text)
    }

    /// Analyze a transcript. Always returns a well-formed result; internal
    /// faults (including panics) become `success: false` with an error message.
    pub fn analyze(&self, transcript: &str, age: Option<u32>, sex: Option<String>) -> AnalysisResult {
        guarded(transcript, age, sex, || self.run(transcript))
    }

    fn run(&self, transcript: &str) -> Analysis {
        let symptoms = self.extractor.extract(transcript);
        let overall_triage = self.triage_rules.classify(&symptoms, transcript);
        let ranked = triage::rank(triage::score(&symptoms, self.store.diseases()));

        let mut diagnoses = Vec::with_capacity(ranked.len());
        for candidate in ranked {
            let urgency = triage::disease_urgency(&self.severity, &candidate.name, candidate.match_count);
            let precautions = self.store.precautions_of(&candidate.name).to_vec();

            diagnoses.push(Diagnosis {
                matched_symptoms: candidate
                    .matched_symptoms
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
                name: candidate.name,
                match_count: candidate.match_count,
                urgency,
                precautions,
            });
        }

        let mapped_precautions = match diagnoses.first() {
            Some(top) => MappedPrecautions::Top {
                disease: top.name.clone(),
                precautions: self.store.precautions_of(&top.name).to_vec(),
            },
            None => MappedPrecautions::Empty {},
        };

        Analysis {
            symptoms,
            diagnoses,
            overall_triage,
            mapped_precautions,
        }
    }
}

/// Run one analysis; a panic becomes a failed result that still echoes the
/// request fields.
fn guarded<F>(transcript: &str, age: Option<u32>, sex: Option<String>, analysis: F) -> AnalysisResult
where
    F: FnOnce() -> Analysis,
{
    match panic::catch_unwind(AssertUnwindSafe(analysis)) {
        Ok(analysis) => {
            debug!(
                symptoms = analysis.symptoms.len(),
                diagnoses = analysis.diagnoses.len(),
                level = %analysis.overall_triage.level,
                "Analysis complete"
            );
            analysis.into_result(transcript, age, sex)
        }
        Err(payload) => {
            let e = AnalysisError::Panicked(panic_message(&*payload));
            warn!(error = %e, "Analysis failed");
            AnalysisResult::failure(transcript, age, sex, e.to_string())
        }
    }
}

struct Analysis {
    symptoms: BTreeSet<Symptom>,
    diagnoses: Vec<Diagnosis>,
    overall_triage: triage::UrgencyClassification,
    mapped_precautions: MappedPrecautions,
}

impl Analysis {
    fn into_result(self, transcript: &str, age: Option<u32>, sex: Option<String>) -> AnalysisResult {
        AnalysisResult {
            transcript: transcript.to_string(),
            symptoms_extracted: self
                .symptoms
                .into_iter()
                .map(|s| ExtractedSymptom {
                    name: s.as_str().to_string(),
                })
                .collect(),
            diagnoses: self.diagnoses,
            overall_triage: Some(self.overall_triage),
            mapped_precautions: self.mapped_precautions,
            age,
            sex,
            success: true,
            error: None,
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage::UrgencyLevel;

    fn cold_and_pneumonia() -> Arc<KnowledgeStore> {
        Arc::new(
            KnowledgeStore::builder()
                .disease("Common Cold", ["fever", "cough", "headache"])
                .disease("Pneumonia", ["fever", "cough", "chest_pain"])
                .precautions("Common Cold", ["drink warm fluids", "rest"])
                .precautions("Pneumonia", ["see a doctor"])
                .build(),
        )
    }

    #[test]
    fn test_round_trip_scenario() {
        let pipeline = Pipeline::with_defaults(cold_and_pneumonia());
        let result = pipeline.analyze("I have a fever, cough, and headache", Some(30), Some("M".into()));

        assert!(result.success);
        let ranked: Vec<(&str, usize)> = result
            .diagnoses
            .iter()
            .map(|d| (d.name.as_str(), d.match_count))
            .collect();
        assert_eq!(ranked, vec![("Common Cold", 3), ("Pneumonia", 2)]);
        assert_eq!(result.mapped_precautions.disease(), Some("Common Cold"));
        assert_eq!(result.diagnoses[0].precautions, vec!["drink warm fluids", "rest"]);
        assert_eq!(result.age, Some(30));
        assert_eq!(result.sex.as_deref(), Some("M"));
    }

    #[test]
    fn test_mapped_precautions_only_for_top() {
        let pipeline = Pipeline::with_defaults(cold_and_pneumonia());
        let result = pipeline.analyze("fever and cough and headache", None, None);

        match &result.mapped_precautions {
            MappedPrecautions::Top { disease, precautions } => {
                assert_eq!(disease, "Common Cold");
                assert_eq!(precautions, &vec!["drink warm fluids".to_string(), "rest".to_string()]);
            }
            MappedPrecautions::Empty {} => panic!("expected precautions for top diagnosis"),
        }
    }

    #[test]
    fn test_empty_transcript() {
        let pipeline = Pipeline::with_defaults(cold_and_pneumonia());
        let result = pipeline.analyze("   ", None, None);

        assert!(result.success);
        assert!(result.symptoms_extracted.is_empty());
        assert!(result.diagnoses.is_empty());
        assert!(result.mapped_precautions.is_empty());
        assert_eq!(result.overall_triage.unwrap().level, UrgencyLevel::Mild);
    }

    #[test]
    fn test_no_vocabulary_symptoms() {
        let pipeline = Pipeline::with_defaults(cold_and_pneumonia());
        let result = pipeline.analyze("my knee feels odd", None, None);

        assert!(pipeline.extract("my knee feels odd").is_empty());
        assert!(result.diagnoses.is_empty());
        assert!(result.mapped_precautions.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let pipeline = Pipeline::with_defaults(cold_and_pneumonia());
        let a = pipeline.analyze("fever cough", None, None);
        let b = pipeline.analyze("fever cough", None, None);

        assert_eq!(a, b);
        let names: Vec<&str> = a.diagnoses.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Common Cold", "Pneumonia"]);
    }

    #[test]
    fn test_per_disease_urgency_attached() {
        let pipeline = Pipeline::with_defaults(cold_and_pneumonia());
        let result = pipeline.analyze("fever, cough and chest pain", None, None);

        let pneumonia = &result.diagnoses[0];
        assert_eq!(pneumonia.name, "Pneumonia");
        assert_eq!(pneumonia.match_count, 3);
        assert_eq!(pneumonia.urgency.level, UrgencyLevel::Urgent);
        assert_eq!(result.overall_triage.unwrap().level, UrgencyLevel::Critical);
    }

    #[test]
    fn test_missing_precaution_table_is_no_data() {
        let (store, report) = KnowledgeStore::from_csv(
            "Disease,Symptom_1,Symptom_2\nFlu, fever, cough\n",
            "not,a,knowledge,table\n",
            "",
        );
        assert!(!report.knowledge.is_loaded());
        assert!(!report.precautions.is_loaded());

        let pipeline = Pipeline::with_defaults(Arc::new(store));
        let result = pipeline.analyze("fever and cough", None, None);

        assert!(result.success);
        assert_eq!(result.diagnoses.len(), 1);
        assert!(result.diagnoses[0].precautions.is_empty());
        assert_eq!(result.mapped_precautions.disease(), Some("Flu"));
    }

    #[test]
    fn test_empty_store_analyzes() {
        let pipeline = Pipeline::with_defaults(Arc::new(KnowledgeStore::default()));
        let result = pipeline.analyze("chest pain", None, None);

        assert!(result.success);
        assert!(result.diagnoses.is_empty());
        assert_eq!(result.overall_triage.unwrap().level, UrgencyLevel::Critical);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }

    #[test]
    fn test_panic_becomes_failed_result() {
        let result = guarded("fever and cough", Some(41), Some("F".into()), || {
            panic!("precaution table vanished")
        });

        assert!(!result.success);
        assert_eq!(result.transcript, "fever and cough");
        assert_eq!(result.age, Some(41));
        assert_eq!(result.sex.as_deref(), Some("F"));
        assert!(result.symptoms_extracted.is_empty());
        assert!(result.diagnoses.is_empty());
        assert!(result.mapped_precautions.is_empty());
        assert!(result.overall_triage.is_none());
        let error = result.error.unwrap();
        assert!(error.contains("precaution table vanished"), "{}", error);
    }

    #[test]
    fn test_guarded_passes_through_analysis() {
        let pipeline = Pipeline::with_defaults(cold_and_pneumonia());
        let result = guarded("fever", None, None, || pipeline.run("fever"));

        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(result.diagnoses.len(), 2);
        assert_eq!(result, pipeline.analyze("fever", None, None));
    }

    #[test]
    fn test_pipeline_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pipeline>();
    }
}
