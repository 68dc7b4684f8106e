pub mod test_set;
pub mod benchmark;
pub mod plots;

pub use test_set::{get_test_set, Scenario, ScenarioCategory};
pub use benchmark::{Benchmarker, BenchmarkResults};
pub use plots::generate_plots;
