//! Detached execution of summary jobs.
//!
//! The webhook path hands a [`SummaryJob`] to a [`JobLauncher`] and returns
//! immediately. The Tokio launcher spawns the pipeline and a supervisor task
//! that awaits it, so a panicking job is logged instead of vanishing.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, info_span, warn};

use super::summarize::SummarizationPipeline;
use crate::core::models::SummaryJob;

/// Starts a job without waiting for it.
#[cfg_attr(test, mockall::automock)]
pub trait JobLauncher: Send + Sync {
    fn launch(&self, job: SummaryJob);
}

/// Spawns `job` on the current Tokio runtime and returns the handle of its supervisor.
///
/// The supervisor resolves once the job has finished (or panicked); callers are
/// free to drop it.
pub fn spawn_summary_job(pipeline: Arc<SummarizationPipeline>, job: SummaryJob) -> JoinHandle<()> {
    let span = info_span!(
        "summary_job",
        correlation_id = %job.correlation_id,
        channel = %job.channel,
        user = %job.requesting_user,
    );

    let job_handle = tokio::spawn(
        async move {
            info!(
                window_start = %job.window.start,
                window_end = %job.window.end,
                "Summary job started"
            );
            let result = pipeline.run(&job).await;
            if result.success {
                info!("Summary job finished");
            } else {
                warn!(
                    failure_detail = result.failure_detail.as_deref().unwrap_or_default(),
                    "Summary job finished with failure"
                );
            }
        }
        .instrument(span.clone()),
    );

    tokio::spawn(
        async move {
            if let Err(e) = job_handle.await {
                if e.is_panic() {
                    error!(error = %e, "Summary job panicked");
                } else {
                    warn!(error = %e, "Summary job was cancelled");
                }
            }
        }
        .instrument(span),
    )
}

/// Launches jobs as Tokio tasks sharing one pipeline.
#[derive(Clone)]
pub struct TokioJobLauncher {
    pipeline: Arc<SummarizationPipeline>,
}

impl TokioJobLauncher {
    #[must_use]
    pub fn new(pipeline: Arc<SummarizationPipeline>) -> Self {
        Self { pipeline }
    }
}

impl JobLauncher for TokioJobLauncher {
    fn launch(&self, job: SummaryJob) {
        // The supervisor keeps running after its handle is dropped.
        drop(spawn_summary_job(Arc::clone(&self.pipeline), job));
    }
}
