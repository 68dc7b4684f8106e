use pipeline::Pipeline;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use triage::UrgencyLevel;

use crate::test_set::{Scenario, ScenarioCategory};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResults {
    pub total_scenarios: usize,
    pub repetitions: usize,
    pub top1_accuracy: f64,
    pub level_agreement: f64,
    pub latency: LatencyStats,
    pub by_category: Vec<CategoryScore>,
    pub scenarios: Vec<ScenarioOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyStats {
    pub mean_us: f64,
    pub median_us: f64,
    pub std_dev_us: f64,
    pub p95_us: f64,
    pub max_us: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: ScenarioCategory,
    pub top1_accuracy: f64,
    pub level_agreement: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub transcript: String,
    pub category: ScenarioCategory,
    pub expected_disease: Option<String>,
    pub predicted_disease: Option<String>,
    pub expected_level: UrgencyLevel,
    pub predicted_level: Option<UrgencyLevel>,
    pub disease_correct: bool,
    pub level_correct: bool,
    pub mean_latency_us: f64,
}

pub struct Benchmarker {
    pipeline: Pipeline,
    repetitions: usize,
}

impl Benchmarker {
    pub fn new(pipeline: Pipeline, repetitions: usize) -> Self {
        Self {
            pipeline,
            repetitions: repetitions.max(1),
        }
    }

    pub fn run_benchmark(&self, test_set: &[Scenario]) -> BenchmarkResults {
        println!(
            "Running benchmark with {} scenarios x {} repetitions...",
            test_set.len(),
            self.repetitions
        );

        let mut all_latencies = Vec::with_capacity(test_set.len() * self.repetitions);
        let mut outcomes = Vec::with_capacity(test_set.len());

        for scenario in test_set {
            let (outcome, latencies) = self.run_scenario(scenario);
            all_latencies.extend(latencies);
            outcomes.push(outcome);
        }

        BenchmarkResults {
            total_scenarios: outcomes.len(),
            repetitions: self.repetitions,
            top1_accuracy: fraction(outcomes.iter().filter(|o| o.disease_correct).count(), outcomes.len()),
            level_agreement: fraction(outcomes.iter().filter(|o| o.level_correct).count(), outcomes.len()),
            latency: latency_stats(all_latencies),
            by_category: category_scores(&outcomes),
            scenarios: outcomes,
        }
    }

    fn run_scenario(&self, scenario: &Scenario) -> (ScenarioOutcome, Vec<f64>) {
        let mut latencies = Vec::with_capacity(self.repetitions);
        let mut last = None;

        for _ in 0..self.repetitions {
            let start = Instant::now();
            let result = self.pipeline.analyze(&scenario.transcript, None, None);
            latencies.push(start.elapsed().as_secs_f64() * 1_000_000.0);
            last = Some(result);
        }

        let predicted_disease = last
            .as_ref()
            .and_then(|r| r.top_diagnosis())
            .map(|d| d.name.clone());
        let predicted_level = last
            .as_ref()
            .and_then(|r| r.overall_triage.as_ref())
            .map(|t| t.level);

        let outcome = ScenarioOutcome {
            transcript: scenario.transcript.clone(),
            category: scenario.category,
            disease_correct: predicted_disease == scenario.expected_disease,
            level_correct: predicted_level == Some(scenario.expected_level),
            expected_disease: scenario.expected_disease.clone(),
            predicted_disease,
            expected_level: scenario.expected_level,
            predicted_level,
            mean_latency_us: mean(&latencies),
        };

        (outcome, latencies)
    }
}

fn fraction(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        0.0
    } else {
        statistical::mean(data)
    }
}

fn latency_stats(mut latencies: Vec<f64>) -> LatencyStats {
    latencies.sort_by(|a, b| a.total_cmp(b));

    LatencyStats {
        mean_us: mean(&latencies),
        median_us: if latencies.is_empty() {
            0.0
        } else {
            statistical::median(&latencies)
        },
        // statistical's standard deviation needs at least two samples
        std_dev_us: if latencies.len() < 2 {
            0.0
        } else {
            statistical::standard_deviation(&latencies, None)
        },
        p95_us: percentile(&latencies, 95),
        max_us: latencies.last().copied().unwrap_or(0.0),
    }
}

fn category_scores(outcomes: &[ScenarioOutcome]) -> Vec<CategoryScore> {
    let mut grouped: BTreeMap<ScenarioCategory, Vec<&ScenarioOutcome>> = BTreeMap::new();
    for outcome in outcomes {
        grouped.entry(outcome.category).or_default().push(outcome);
    }

    grouped
        .into_iter()
        .map(|(category, group)| CategoryScore {
            category,
            top1_accuracy: fraction(group.iter().filter(|o| o.disease_correct).count(), group.len()),
            level_agreement: fraction(group.iter().filter(|o| o.level_correct).count(), group.len()),
            count: group.len(),
        })
        .collect()
}

fn percentile(sorted_data: &[f64], p: usize) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }
    let index = (p as f64 / 100.0 * sorted_data.len() as f64) as usize;
    sorted_data[index.min(sorted_data.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_set::get_test_set;
    use knowledge::KnowledgeStore;
    use std::sync::Arc;

    fn bundled_pipeline() -> Pipeline {
        let (store, report) = KnowledgeStore::from_csv(
            include_str!("../../../data/DiseaseAndSymptoms.csv"),
            include_str!("../../../data/disease_knowledgebase.csv"),
            include_str!("../../../data/Disease precaution.csv"),
        );
        assert!(report.is_complete(), "{:?}", report);
        Pipeline::with_defaults(Arc::new(store))
    }

    #[test]
    fn test_bundled_scenarios_all_pass() {
        let results = Benchmarker::new(bundled_pipeline(), 1).run_benchmark(&get_test_set());

        for outcome in &results.scenarios {
            assert!(
                outcome.disease_correct && outcome.level_correct,
                "{:?}",
                outcome
            );
        }
        assert_eq!(results.top1_accuracy, 1.0);
        assert_eq!(results.level_agreement, 1.0);
        assert_eq!(results.by_category.len(), 4);
    }

    #[test]
    fn test_latency_stats_small_samples() {
        let empty = latency_stats(Vec::new());
        assert_eq!(empty.mean_us, 0.0);
        assert_eq!(empty.p95_us, 0.0);

        let single = latency_stats(vec![5.0]);
        assert_eq!(single.median_us, 5.0);
        assert_eq!(single.std_dev_us, 0.0);

        let several = latency_stats(vec![3.0, 1.0, 2.0]);
        assert_eq!(several.median_us, 2.0);
        assert_eq!(several.max_us, 3.0);
        assert!(several.std_dev_us > 0.0);
    }

    #[test]
    fn test_wrong_expectation_is_scored() {
        let mut scenarios = get_test_set();
        scenarios.truncate(1);
        scenarios[0].expected_disease = Some("Acne".to_string());

        let results = Benchmarker::new(bundled_pipeline(), 2).run_benchmark(&scenarios);

        assert_eq!(results.top1_accuracy, 0.0);
        assert_eq!(results.level_agreement, 1.0);
        assert_eq!(results.scenarios[0].predicted_disease.as_deref(), Some("Heart attack"));
    }
}
