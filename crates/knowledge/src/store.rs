use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::symptom::Symptom;
use crate::tables::{self, LoadError};

pub const DEFAULT_SYMPTOM_TABLE: &str = "DiseaseAndSymptoms.csv";
pub const DEFAULT_KNOWLEDGE_TABLE: &str = "disease_knowledgebase.csv";
pub const DEFAULT_PRECAUTION_TABLE: &str = "Disease precaution.csv";

/// Locations of the three tabular sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgePaths {
    pub symptoms: PathBuf,
    pub knowledge: PathBuf,
    pub precautions: PathBuf,
}

impl KnowledgePaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            symptoms: dir.join(DEFAULT_SYMPTOM_TABLE),
            knowledge: dir.join(DEFAULT_KNOWLEDGE_TABLE),
            precautions: dir.join(DEFAULT_PRECAUTION_TABLE),
        }
    }
}

/// Free-text knowledge row for one disease, as `(column, value)` pairs in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiseaseInfo {
    fields: Vec<(String, String)>,
}

impl DiseaseInfo {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(column))
            .map(|(_, v)| v.as_str())
    }

    /// The first column whose header mentions "description", otherwise every
    /// field rendered as `Column: value` lines.
    pub fn description(&self) -> String {
        if let Some((_, value)) = self
            .fields
            .iter()
            .find(|(c, _)| c.to_lowercase().contains("description"))
        {
            return value.clone();
        }

        self.fields
            .iter()
            .map(|(c, v)| format!("{}: {}", c, v))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Outcome of loading one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TableReport {
    Loaded { rows: usize, diseases: usize },
    Empty { reason: String },
}

impl TableReport {
    pub fn is_loaded(&self) -> bool {
        matches!(self, TableReport::Loaded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub symptoms: TableReport,
    pub knowledge: TableReport,
    pub precautions: TableReport,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.symptoms.is_loaded() && self.knowledge.is_loaded() && self.precautions.is_loaded()
    }
}

/// Immutable disease lookup tables, built once and shared read-only.
///
/// Disease names are trimmed but otherwise used verbatim as keys. A name known
/// to one table is not guaranteed to be present in the others; lookups report
/// absence as empty data.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeStore {
    symptoms: HashMap<String, BTreeSet<Symptom>>,
    info: HashMap<String, DiseaseInfo>,
    precautions: HashMap<String, Vec<String>>,
    vocabulary: BTreeSet<Symptom>,
    fingerprint: String,
}

impl KnowledgeStore {
    pub fn builder() -> KnowledgeStoreBuilder {
        KnowledgeStoreBuilder::default()
    }

    /// Load all three tables from disk. A missing or malformed table is
    /// replaced by an empty one and recorded in the report; this never fails.
    pub fn load(paths: &KnowledgePaths) -> (Self, LoadReport) {
        let (store, report) = Self::from_sources(
            tables::read_source(&paths.symptoms),
            tables::read_source(&paths.knowledge),
            tables::read_source(&paths.precautions),
        );

        info!(
            diseases = store.disease_count(),
            symptoms = store.vocabulary.len(),
            fingerprint = %store.fingerprint,
            complete = report.is_complete(),
            "Knowledge store loaded"
        );

        (store, report)
    }

    /// Build from in-memory CSV text.
    pub fn from_csv(symptoms: &str, knowledge: &str, precautions: &str) -> (Self, LoadReport) {
        Self::from_sources(
            Ok(symptoms.as_bytes().to_vec()),
            Ok(knowledge.as_bytes().to_vec()),
            Ok(precautions.as_bytes().to_vec()),
        )
    }

    fn from_sources(
        symptoms: Result<Vec<u8>, LoadError>,
        knowledge: Result<Vec<u8>, LoadError>,
        precautions: Result<Vec<u8>, LoadError>,
    ) -> (Self, LoadReport) {
        let mut hasher = Sha256::new();

        let (symptom_map, symptoms_report) =
            load_table("symptoms", symptoms, &mut hasher, tables::symptom_map);
        let (info_map, knowledge_report) =
            load_table("knowledge", knowledge, &mut hasher, tables::info_map);
        let (precaution_map, precautions_report) =
            load_table("precautions", precautions, &mut hasher, tables::precaution_map);

        let fingerprint = hex::encode(&hasher.finalize()[..16]);
        let store = Self::assemble(symptom_map, info_map, precaution_map, fingerprint);

        let report = LoadReport {
            symptoms: symptoms_report,
            knowledge: knowledge_report,
            precautions: precautions_report,
        };

        (store, report)
    }

    fn assemble(
        symptoms: HashMap<String, BTreeSet<Symptom>>,
        info: HashMap<String, DiseaseInfo>,
        precautions: HashMap<String, Vec<String>>,
        fingerprint: String,
    ) -> Self {
        let vocabulary = symptoms.values().flatten().cloned().collect();
        Self {
            symptoms,
            info,
            precautions,
            vocabulary,
            fingerprint,
        }
    }

    /// Every disease with its symptom set, in unspecified order.
    pub fn diseases(&self) -> impl Iterator<Item = (&str, &BTreeSet<Symptom>)> {
        self.symptoms.iter().map(|(name, set)| (name.as_str(), set))
    }

    pub fn disease_count(&self) -> usize {
        self.symptoms.len()
    }

    /// Union of all diseases' symptom sets.
    pub fn vocabulary(&self) -> &BTreeSet<Symptom> {
        &self.vocabulary
    }

    pub fn symptoms_of(&self, disease: &str) -> Option<&BTreeSet<Symptom>> {
        self.symptoms.get(disease.trim())
    }

    pub fn info_of(&self, disease: &str) -> Option<&DiseaseInfo> {
        self.info.get(disease.trim())
    }

    /// Precautions in source order; empty when the disease has none on record.
    pub fn precautions_of(&self, disease: &str) -> &[String] {
        self.precautions
            .get(disease.trim())
            .map(|p| p.as_slice())
            .unwrap_or(&[])
    }

    /// Hex digest identifying the source data this store was built from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }
}

fn load_table<T>(
    table: &'static str,
    source: Result<Vec<u8>, LoadError>,
    hasher: &mut Sha256,
    parse: fn(&tables::Table) -> Result<HashMap<String, T>, LoadError>,
) -> (HashMap<String, T>, TableReport) {
    hasher.update(table.as_bytes());

    let parsed = source.and_then(|bytes| {
        hasher.update(&bytes);
        let raw = tables::read_table(&bytes)?;
        let map = parse(&raw)?;
        Ok((raw.len(), map))
    });

    match parsed {
        Ok((rows, map)) => {
            let report = TableReport::Loaded {
                rows,
                diseases: map.len(),
            };
            (map, report)
        }
        Err(e) => {
            warn!(table, error = %e, "Knowledge table unavailable, using empty table");
            (
                HashMap::new(),
                TableReport::Empty {
                    reason: e.to_string(),
                },
            )
        }
    }
}

/// In-code construction of a store, mainly for tests and fixtures.
#[derive(Debug, Default)]
pub struct KnowledgeStoreBuilder {
    symptoms: HashMap<String, BTreeSet<Symptom>>,
    info: HashMap<String, DiseaseInfo>,
    precautions: HashMap<String, Vec<String>>,
}

impl KnowledgeStoreBuilder {
    pub fn disease<I, S>(mut self, name: &str, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.symptoms
            .entry(name.trim().to_string())
            .or_default()
            .extend(symptoms.into_iter().filter_map(|s| Symptom::parse(s.as_ref())));
        self
    }

    pub fn description(mut self, name: &str, description: &str) -> Self {
        self.info.insert(
            name.trim().to_string(),
            DiseaseInfo::new(vec![("Description".to_string(), description.to_string())]),
        );
        self
    }

    pub fn precautions<I, S>(mut self, name: &str, precautions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.precautions.insert(
            name.trim().to_string(),
            precautions.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn build(self) -> KnowledgeStore {
        let fingerprint = content_fingerprint(&self.symptoms, &self.info, &self.precautions);
        KnowledgeStore::assemble(self.symptoms, self.info, self.precautions, fingerprint)
    }
}

fn content_fingerprint(
    symptoms: &HashMap<String, BTreeSet<Symptom>>,
    info: &HashMap<String, DiseaseInfo>,
    precautions: &HashMap<String, Vec<String>>,
) -> String {
    let mut hasher = Sha256::new();

    let mut names: Vec<&String> = symptoms.keys().chain(info.keys()).chain(precautions.keys()).collect();
    names.sort();
    names.dedup();

    for name in names {
        hasher.update(name.as_bytes());
        for s in symptoms.get(name).into_iter().flatten() {
            hasher.update(s.as_str().as_bytes());
        }
        for (c, v) in info.get(name).map(|i| i.fields()).unwrap_or(&[]) {
            hasher.update(c.as_bytes());
            hasher.update(v.as_bytes());
        }
        for p in precautions.get(name).into_iter().flatten() {
            hasher.update(p.as_bytes());
        }
    }

    hex::encode(&hasher.finalize()[..16])
}
