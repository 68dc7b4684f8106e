use anyhow::{Context, Result};
use eval::{get_test_set, Benchmarker, BenchmarkResults, generate_plots};
use knowledge::{KnowledgePaths, KnowledgeStore};
use pipeline::Pipeline;
use std::path::PathBuf;
use std::sync::Arc;

const REPETITIONS: usize = 50;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== Symptom Triage Benchmark ===\n");

    let data_dir = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TRIAGE_DATA_DIR").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    let (store, report) = KnowledgeStore::load(&KnowledgePaths::in_dir(&data_dir));
    if store.is_empty() {
        anyhow::bail!("No diseases loaded from {:?}: {:?}", data_dir, report);
    }
    println!(
        "Knowledge: {} diseases, {} symptoms (version {})\n",
        store.disease_count(),
        store.vocabulary().len(),
        store.fingerprint()
    );

    let benchmarker = Benchmarker::new(Pipeline::with_defaults(Arc::new(store)), REPETITIONS);

    // Get test set
    let test_set = get_test_set();
    println!("Test set: {} scenarios\n", test_set.len());

    // Run benchmark
    let results = benchmarker.run_benchmark(&test_set);

    // Print results
    print_results(&results);

    // Save results
    let results_json = serde_json::to_string_pretty(&results)?;
    std::fs::write("benchmark_results.json", results_json)
        .context("Failed to write benchmark_results.json")?;
    println!("\n✅ Results saved to benchmark_results.json");

    // Generate plots
    generate_plots(&results, "plots")?;
    println!("✅ Plots saved to plots/");

    // Generate README section
    generate_readme_section(&results)?;
    println!("✅ README section saved to BENCHMARK.md");

    Ok(())
}

fn print_results(results: &BenchmarkResults) {
    println!("\n=== RESULTS ===\n");

    println!("📊 ACCURACY:");
    println!("  Top-1 disease: {:.0}%", results.top1_accuracy * 100.0);
    println!("  Triage level:  {:.0}%", results.level_agreement * 100.0);

    println!("\n⏱️ LATENCY ({} runs per scenario):", results.repetitions);
    println!("  Mean:   {:.1} µs", results.latency.mean_us);
    println!("  Median: {:.1} µs", results.latency.median_us);
    println!("  StdDev: {:.1} µs", results.latency.std_dev_us);
    println!("  P95:    {:.1} µs", results.latency.p95_us);

    let misses: Vec<_> = results
        .scenarios
        .iter()
        .filter(|s| !(s.disease_correct && s.level_correct))
        .collect();
    if !misses.is_empty() {
        println!("\n❌ MISSES:");
        for miss in misses {
            println!(
                "  {:?}: expected {:?}/{:?}, got {:?}/{:?}",
                miss.transcript,
                miss.expected_disease,
                miss.expected_level,
                miss.predicted_disease,
                miss.predicted_level
            );
        }
    }
}

fn generate_readme_section(results: &BenchmarkResults) -> Result<()> {
    let category_rows: String = results
        .by_category
        .iter()
        .map(|c| {
            format!(
                "| {:?} | {} | {:.0}% | {:.0}% |\n",
                c.category,
                c.count,
                c.top1_accuracy * 100.0,
                c.level_agreement * 100.0
            )
        })
        .collect();

    let content = format!(
r#"# Benchmark Results

## Accuracy

| Category | Scenarios | Top-1 Disease | Triage Level |
|----------|-----------|---------------|--------------|
{}| **All** | {} | {:.0}% | {:.0}% |

![Accuracy by Category](plots/accuracy_by_category.png)

## Latency

| Mean | Median | Std Dev | P95 | Max |
|------|--------|---------|-----|-----|
| {:.1} µs | {:.1} µs | {:.1} µs | {:.1} µs | {:.1} µs |

![Scenario Latency](plots/scenario_latency.png)

## Test Environment
- Repetitions per scenario: {}
- Scenarios: {} across {} categories
"#,
        category_rows,
        results.total_scenarios,
        results.top1_accuracy * 100.0,
        results.level_agreement * 100.0,
        results.latency.mean_us,
        results.latency.median_us,
        results.latency.std_dev_us,
        results.latency.p95_us,
        results.latency.max_us,
        results.repetitions,
        results.total_scenarios,
        results.by_category.len(),
    );

    std::fs::write("BENCHMARK.md", content)?;
    Ok(())
}
