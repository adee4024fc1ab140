// crates/client/src/handle.rs
//! A job snapshot bound to the executor that can update it.

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use jobtrack_types::{CompleteOptions, FailOptions, Job, ProgressUpdate};
use tracing::debug;

use crate::error::{Error, Result};
use crate::executor::{segment, ApiRequest, RequestExecutor};

/// Local mirror of one server-side job.
///
/// Every mutating call is a full round-trip: on success the local snapshot is
/// replaced by the server's answer (identity fields excepted), on failure it
/// is left exactly as it was after the last successful call.
///
/// Mutations take `&mut self`, so one handle can only have one in-flight
/// update at a time. Two handles for the same job id are independent copies
/// that only converge through `refresh` or further updates. To share a handle
/// between tasks, wrap it in a `tokio::sync::Mutex`.
///
/// Read-only accessors (`is_terminal`, `child_progress`, `eta_remaining`, ...)
/// come from [`Job`] through `Deref`.
#[derive(Debug, Clone)]
pub struct JobHandle {
    job: Job,
    executor: Arc<RequestExecutor>,
}

impl JobHandle {
    pub(crate) fn new(job: Job, executor: Arc<RequestExecutor>) -> Self {
        Self { job, executor }
    }

    pub fn id(&self) -> &str {
        &self.job.id
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn into_job(self) -> Job {
        self.job
    }

    /// Report progress (0-100). Accepts a bare `f64` or a full [`ProgressUpdate`].
    pub async fn set_progress(&mut self, update: impl Into<ProgressUpdate>) -> Result<&mut Self> {
        let update = update.into();
        let request = ApiRequest::post(self.action_path("progress"))
            .json(&update)?
            .idempotency_key(update.idempotency_key.clone());
        self.apply(request).await
    }

    /// Mark the job completed, optionally with a result payload.
    pub async fn complete(&mut self, options: CompleteOptions) -> Result<&mut Self> {
        let request = ApiRequest::post(self.action_path("complete"))
            .json(&options)?
            .idempotency_key(options.idempotency_key.clone());
        self.apply(request).await
    }

    /// Mark the job failed with a structured error payload.
    pub async fn fail(&mut self, options: FailOptions) -> Result<&mut Self> {
        let request = ApiRequest::post(self.action_path("fail"))
            .json(&options)?
            .idempotency_key(options.idempotency_key.clone());
        self.apply(request).await
    }

    /// Pull the authoritative state, e.g. after children were added.
    pub async fn refresh(&mut self) -> Result<&mut Self> {
        let request = ApiRequest::get(format!("/v1/jobs/{}", segment(&self.job.id)));
        self.apply(request).await
    }

    /// Poll with `refresh` until the job reaches a terminal status.
    ///
    /// Returns [`Error::WaitTimeout`] if `max_wait` elapses first. Refresh
    /// failures end the wait immediately.
    pub async fn wait_until_terminal(
        &mut self,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> Result<&mut Self> {
        let deadline = tokio::time::Instant::now() + max_wait;
        loop {
            if self.job.is_terminal() {
                return Ok(self);
            }
            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Err(Error::WaitTimeout { after: max_wait });
            }
            tokio::time::sleep(poll_interval.min(deadline - now)).await;
            self.refresh().await?;
        }
    }

    fn action_path(&self, action: &str) -> String {
        format!("/v1/jobs/{}/{action}", segment(&self.job.id))
    }

    async fn apply(&mut self, request: ApiRequest) -> Result<&mut Self> {
        let fresh: Job = self.executor.execute(&request).await?;
        debug!(
            job_id = %self.job.id,
            path = request.path(),
            status = %fresh.status,
            progress = fresh.progress,
            "Job state updated"
        );
        self.job.apply_update(fresh);
        Ok(self)
    }
}

impl Deref for JobHandle {
    type Target = Job;

    fn deref(&self) -> &Job {
        &self.job
    }
}

impl From<JobHandle> for Job {
    fn from(handle: JobHandle) -> Self {
        handle.job
    }
}
