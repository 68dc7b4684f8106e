use anyhow::Result;
use plotters::prelude::*;

use crate::benchmark::BenchmarkResults;

pub fn generate_plots(results: &BenchmarkResults, output_dir: &str) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;

    // Plot 1: Latency per scenario
    plot_scenario_latency(results, &format!("{}/scenario_latency.png", output_dir))?;

    // Plot 2: Accuracy by category
    plot_accuracy_by_category(results, &format!("{}/accuracy_by_category.png", output_dir))?;

    Ok(())
}

fn plot_scenario_latency(results: &BenchmarkResults, path: &str) -> Result<()> {
    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let latencies: Vec<f64> = results.scenarios.iter().map(|s| s.mean_latency_us).collect();
    let max_latency = latencies.iter().copied().fold(1.0f64, f64::max);

    let mut chart = ChartBuilder::on(&root)
        .caption("Mean Analysis Latency per Scenario (µs)", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..latencies.len().max(1) as f64, 0f64..(max_latency * 1.2))?;

    chart.configure_mesh()
        .x_desc("Scenario")
        .y_desc("Latency (µs)")
        .draw()?;

    for (i, (latency, outcome)) in latencies.iter().zip(&results.scenarios).enumerate() {
        // Misses drawn in red
        let color = if outcome.disease_correct && outcome.level_correct { BLUE } else { RED };
        chart.draw_series(std::iter::once(Rectangle::new([
            (i as f64 + 0.2, 0.0),
            (i as f64 + 0.8, *latency),
        ], color.filled())))?;
    }

    root.present()?;
    println!("Saved latency plot to {}", path);
    Ok(())
}

fn plot_accuracy_by_category(results: &BenchmarkResults, path: &str) -> Result<()> {
    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let categories = results.by_category.len().max(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption("Accuracy by Scenario Category", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(80)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..categories, 0f64..1.05f64)?;

    chart.configure_mesh()
        .y_desc("Fraction correct")
        .x_labels(results.by_category.len().max(1))
        .x_label_formatter(&|x| {
            results
                .by_category
                .get(*x as usize)
                .map(|c| format!("{:?}", c.category))
                .unwrap_or_default()
        })
        .draw()?;

    for (idx, cat) in results.by_category.iter().enumerate() {
        let x = idx as f64 + 0.5;

        // Top-1 disease
        chart.draw_series(std::iter::once(Circle::new((x - 0.1, cat.top1_accuracy), 6, BLUE.filled())))?;

        // Triage level
        chart.draw_series(std::iter::once(Circle::new((x + 0.1, cat.level_agreement), 6, GREEN.filled())))?;
    }

    root.present()?;
    println!("Saved accuracy plot to {}", path);
    Ok(())
}
