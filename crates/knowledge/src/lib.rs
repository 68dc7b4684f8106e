//! Disease knowledge tables: symptom sets, descriptive text and precautions.

pub mod store;
pub mod symptom;
pub mod tables;

pub use store::{
    DiseaseInfo, KnowledgePaths, KnowledgeStore, KnowledgeStoreBuilder, LoadReport, TableReport,
    DEFAULT_KNOWLEDGE_TABLE, DEFAULT_PRECAUTION_TABLE, DEFAULT_SYMPTOM_TABLE,
};
pub use symptom::Symptom;
pub use tables::LoadError;
