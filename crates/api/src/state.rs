use anyhow::{Context, Result};
use knowledge::{KnowledgeStore, LoadReport};
use pipeline::Pipeline;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

use crate::config::AppConfig;
use crate::metrics::Metrics;

pub struct AppState {
    config: AppConfig,
    pipeline: RwLock<Arc<Pipeline>>,
    pub metrics: Arc<Metrics>,
}

#[derive(Debug, Serialize)]
pub struct ReloadOutcome {
    pub knowledge_version: String,
    pub previous_version: String,
    pub changed: bool,
    pub diseases: usize,
    pub symptoms: usize,
    pub report: LoadReport,
}

/// Load the knowledge tables and rule tables named by `config`.
pub fn build_pipeline(config: &AppConfig) -> Result<(Pipeline, LoadReport)> {
    let pipeline_config = config
        .pipeline_config()
        .context("Failed to load rule tables")?;
    let (store, report) = KnowledgeStore::load(&config.knowledge_paths());
    Ok((Pipeline::new(Arc::new(store), pipeline_config), report))
}

impl AppState {
    pub fn with_pipeline(config: AppConfig, pipeline: Pipeline) -> Arc<Self> {
        Arc::new(Self {
            config,
            pipeline: RwLock::new(Arc::new(pipeline)),
            metrics: Metrics::new(),
        })
    }

    /// The current pipeline. In-flight requests keep the one they started with
    /// across a reload.
    pub fn pipeline(&self) -> Arc<Pipeline> {
        self.pipeline
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rebuild from the configured files and swap it in. On error the current
    /// pipeline stays in place.
    pub fn reload(&self) -> Result<ReloadOutcome> {
        let previous_version = self.pipeline().store().fingerprint().to_string();
        let (pipeline, report) = build_pipeline(&self.config)?;

        let outcome = ReloadOutcome {
            knowledge_version: pipeline.store().fingerprint().to_string(),
            changed: pipeline.store().fingerprint() != previous_version,
            previous_version,
            diseases: pipeline.store().disease_count(),
            symptoms: pipeline.store().vocabulary().len(),
            report,
        };

        *self.pipeline.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(pipeline);
        self.metrics.record_reload();

        info!(
            version = %outcome.knowledge_version,
            changed = outcome.changed,
            diseases = outcome.diseases,
            "Knowledge reloaded"
        );

        Ok(outcome)
    }
}
