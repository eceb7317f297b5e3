//! Background summarization jobs

pub mod deliver;
pub mod handler;
pub mod summarize;

// Re-export the main entry points for convenience
pub use handler::{JobLauncher, TokioJobLauncher, spawn_summary_job};
pub use summarize::{SummarizationPipeline, build_summary_input};
