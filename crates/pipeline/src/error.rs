use thiserror::Error;

/// Faults inside a single analysis. Never returned from `Pipeline::analyze`;
/// they are folded into a failed `AnalysisResult`.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("analysis panicked: {0}")]
    Panicked(String),
}
