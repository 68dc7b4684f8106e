use anyhow::Result;
use extract::SynonymTable;
use knowledge::{KnowledgePaths, DEFAULT_KNOWLEDGE_TABLE, DEFAULT_PRECAUTION_TABLE, DEFAULT_SYMPTOM_TABLE};
use pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use triage::{SeverityTable, TriageRules};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub bind_addr: String,
    pub log_format: LogFormat,
    pub data: DataConfig,
    pub tables: TableConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Read `TRIAGE_LOG_FORMAT` alone, so the subscriber can be installed
    /// before the rest of the configuration is resolved.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        std::env::var("TRIAGE_LOG_FORMAT")
            .map(|value| Self::parse(&value))
            .unwrap_or(LogFormat::Pretty)
    }

    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Where the three knowledge tables live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub symptom_table: String,
    pub knowledge_table: String,
    pub precaution_table: String,
}

/// Optional JSON overrides for the rule tables; built-in tables when unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub severity: Option<PathBuf>,
    pub triage_rules: Option<PathBuf>,
    pub synonyms: Option<PathBuf>,
    /// Overrides the threshold carried by the triage rule table when set.
    pub moderate_symptom_threshold: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            log_format: LogFormat::Pretty,
            data: DataConfig {
                dir: PathBuf::from("data"),
                symptom_table: DEFAULT_SYMPTOM_TABLE.to_string(),
                knowledge_table: DEFAULT_KNOWLEDGE_TABLE.to_string(),
                precaution_table: DEFAULT_PRECAUTION_TABLE.to_string(),
            },
            tables: TableConfig {
                severity: None,
                triage_rules: None,
                synonyms: None,
                moderate_symptom_threshold: None,
            },
        }
    }
}

impl AppConfig {
    /// Resolve configuration once at startup from `TRIAGE_*` variables
    /// (a `.env` file is honoured).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(addr) = lookup("TRIAGE_BIND_ADDR") {
            cfg.bind_addr = addr;
        }
        if let Some(format) = lookup("TRIAGE_LOG_FORMAT") {
            cfg.log_format = LogFormat::parse(&format);
        }

        if let Some(dir) = lookup("TRIAGE_DATA_DIR") {
            cfg.data.dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup("TRIAGE_SYMPTOM_TABLE") {
            cfg.data.symptom_table = name;
        }
        if let Some(name) = lookup("TRIAGE_KNOWLEDGE_TABLE") {
            cfg.data.knowledge_table = name;
        }
        if let Some(name) = lookup("TRIAGE_PRECAUTION_TABLE") {
            cfg.data.precaution_table = name;
        }

        cfg.tables.severity = lookup("TRIAGE_SEVERITY_TABLE").map(PathBuf::from);
        cfg.tables.triage_rules = lookup("TRIAGE_RULES").map(PathBuf::from);
        cfg.tables.synonyms = lookup("TRIAGE_SYNONYMS").map(PathBuf::from);

        if let Some(raw) = lookup("TRIAGE_MODERATE_THRESHOLD") {
            match raw.trim().parse::<usize>() {
                Ok(n) => cfg.tables.moderate_symptom_threshold = Some(n),
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid TRIAGE_MODERATE_THRESHOLD"),
            }
        }

        cfg
    }

    pub fn knowledge_paths(&self) -> KnowledgePaths {
        KnowledgePaths {
            symptoms: self.data.dir.join(&self.data.symptom_table),
            knowledge: self.data.dir.join(&self.data.knowledge_table),
            precautions: self.data.dir.join(&self.data.precaution_table),
        }
    }

    /// Load the configured rule tables. Unlike knowledge tables, an explicitly
    /// configured rule file that cannot be read is an error.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let severity = match &self.tables.severity {
            Some(path) => SeverityTable::from_json_file(path)?,
            None => SeverityTable::default(),
        };
        let mut triage_rules = match &self.tables.triage_rules {
            Some(path) => TriageRules::from_json_file(path)?,
            None => TriageRules::default(),
        };
        if let Some(threshold) = self.tables.moderate_symptom_threshold {
            triage_rules = triage_rules.with_threshold(threshold);
        }
        let synonyms = match &self.tables.synonyms {
            Some(path) => SynonymTable::from_json_file(path)?,
            None => SynonymTable::default(),
        };

        Ok(PipelineConfig {
            severity,
            triage_rules,
            synonyms,
        })
    }
}
