// crates/client/src/client.rs
//! Entry point: job creation, lookup, listing and batch fan-out.

use std::sync::Arc;

use futures_util::future::join_all;
use jobtrack_types::{
    ChildSummary, CreateChildRequest, CreateJobRequest, CreateParentRequest, Job, JobList,
    JobWithChildren, ListJobsQuery, ProgressMode,
};
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::eta::EtaClient;
use crate::executor::{segment, ApiRequest, RequestExecutor};
use crate::handle::JobHandle;

/// Client for the job tracking service.
///
/// Cheap to clone; all clones share one connection pool and the same
/// immutable configuration.
#[derive(Debug, Clone)]
pub struct JobTracker {
    executor: Arc<RequestExecutor>,
}

/// One page of `list` results.
#[derive(Debug)]
pub struct JobPage {
    pub jobs: Vec<JobHandle>,
    /// Pass back as `ListJobsQuery::cursor` for the next page. `None` once
    /// the listing is exhausted.
    pub next_cursor: Option<String>,
}

/// A parent handle plus a flat summary of each child.
#[derive(Debug)]
pub struct ParentWithChildren {
    pub parent: JobHandle,
    pub children: Vec<ChildSummary>,
}

/// Parent description plus one title per child to create under it.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub parent: CreateParentRequest,
    pub child_titles: Vec<String>,
}

impl BatchRequest {
    pub fn new(
        job_type: impl Into<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
        child_titles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let child_titles: Vec<String> = child_titles.into_iter().map(Into::into).collect();
        let parent = CreateParentRequest::new(job_type, user_id, title, child_titles.len() as u32);
        Self {
            parent,
            child_titles,
        }
    }

    pub fn progress_mode(mut self, mode: ProgressMode) -> Self {
        self.parent.progress_mode = mode;
        self
    }

    pub fn workflow(mut self, workflow_id: impl Into<String>) -> Self {
        self.parent.workflow_id = Some(workflow_id.into());
        self
    }

    /// Key for the parent creation. Each child derives `<key>:child:<index>`.
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.parent.idempotency_key = Some(key.into());
        self
    }
}

/// Result of [`JobTracker::create_batch`].
#[derive(Debug)]
pub struct Batch {
    /// Refreshed after every child was created.
    pub parent: JobHandle,
    /// In the same order as `BatchRequest::child_titles`.
    pub children: Vec<JobHandle>,
}

impl JobTracker {
    /// Build a client. Fails with [`crate::Error::Config`] before any network
    /// traffic if the configuration is unusable.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let executor = RequestExecutor::new(&config)?;
        Ok(Self {
            executor: Arc::new(executor),
        })
    }

    /// Build a client from `JOBTRACK_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Wrap an existing snapshot, e.g. one received from another process.
    pub fn handle(&self, job: Job) -> JobHandle {
        JobHandle::new(job, Arc::clone(&self.executor))
    }

    /// Create a standalone job.
    pub async fn start(&self, request: CreateJobRequest) -> Result<JobHandle> {
        let api_request = ApiRequest::post("/v1/jobs")
            .json(&request)?
            .idempotency_key(request.idempotency_key.clone());
        let job: Job = self.executor.execute(&api_request).await?;
        Ok(self.handle(job))
    }

    pub async fn get(&self, job_id: &str) -> Result<JobHandle> {
        let job: Job = self
            .executor
            .execute(&ApiRequest::get(format!("/v1/jobs/{}", segment(job_id))))
            .await?;
        Ok(self.handle(job))
    }

    pub async fn list(&self, query: &ListJobsQuery) -> Result<JobPage> {
        let request = ApiRequest::get("/v1/jobs").query(query_pairs(query));
        let page: JobList = self.executor.execute(&request).await?;
        Ok(JobPage {
            jobs: page.jobs.into_iter().map(|job| self.handle(job)).collect(),
            next_cursor: page.next_cursor.filter(|cursor| !cursor.is_empty()),
        })
    }

    /// Create a container job that expects `expected_children` children.
    pub async fn create_parent(&self, request: CreateParentRequest) -> Result<JobHandle> {
        self.start(request.into()).await
    }

    pub async fn create_child(&self, request: CreateChildRequest) -> Result<JobHandle> {
        self.start(request.into()).await
    }

    pub async fn get_with_children(&self, job_id: &str) -> Result<ParentWithChildren> {
        let request = ApiRequest::get(format!("/v1/jobs/{}/children", segment(job_id)));
        let body: JobWithChildren = self.executor.execute(&request).await?;
        Ok(ParentWithChildren {
            parent: self.handle(body.parent),
            children: body.children,
        })
    }

    /// Create a parent, then all of its children concurrently, then refresh
    /// the parent once so its aggregate counters are current.
    ///
    /// All child requests are allowed to settle before a failure is
    /// reported; the first failing child (by index) is returned. Children
    /// that were created are not rolled back, so the parent may end up with
    /// fewer children than it declared.
    pub async fn create_batch(&self, request: BatchRequest) -> Result<Batch> {
        let BatchRequest {
            mut parent,
            child_titles,
        } = request;
        parent.expected_children = child_titles.len() as u32;

        let job_type = parent.job_type.clone();
        let user_id = parent.user_id.clone();
        let workflow_id = parent.workflow_id.clone();
        let base_key = parent.idempotency_key.clone();

        let mut parent = self.create_parent(parent).await?;
        let parent_id = parent.id().to_string();

        let creations = child_titles.into_iter().enumerate().map(|(index, title)| {
            let mut child = CreateChildRequest::new(
                parent_id.clone(),
                index as u32,
                job_type.clone(),
                user_id.clone(),
                title,
            );
            child.workflow_id = workflow_id.clone();
            child.idempotency_key = base_key.as_ref().map(|key| format!("{key}:child:{index}"));
            self.create_child(child)
        });
        let results = join_all(creations).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!(
                parent_id = %parent_id,
                failed,
                total = results.len(),
                "Batch child creation failed"
            );
        }
        let children = results.into_iter().collect::<Result<Vec<_>>>()?;

        parent.refresh().await?;
        info!(parent_id = %parent_id, children = children.len(), "Created job batch");

        Ok(Batch { parent, children })
    }

    /// ETA statistics endpoints.
    pub fn eta(&self) -> EtaClient {
        EtaClient::new(Arc::clone(&self.executor))
    }
}

fn query_pairs(query: &ListJobsQuery) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    if let Some(user_id) = &query.user_id {
        pairs.push(("userId".to_string(), user_id.clone()));
    }
    if let Some(status) = query.status {
        pairs.push(("status".to_string(), status.to_string()));
    }
    if let Some(job_type) = &query.job_type {
        pairs.push(("jobType".to_string(), job_type.clone()));
    }
    if let Some(limit) = query.limit {
        pairs.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(cursor) = &query.cursor {
        pairs.push(("cursor".to_string(), cursor.clone()));
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobtrack_types::JobStatus;

    #[test]
    fn test_query_pairs_skip_unset() {
        assert!(query_pairs(&ListJobsQuery::default()).is_empty());

        let pairs = query_pairs(
            &ListJobsQuery::for_user("u1")
                .limit(20)
                .cursor("c_abc")
                .status(JobStatus::Running),
        );
        assert_eq!(
            pairs,
            vec![
                ("userId".to_string(), "u1".to_string()),
                ("status".to_string(), "running".to_string()),
                ("limit".to_string(), "20".to_string()),
                ("cursor".to_string(), "c_abc".to_string()),
            ]
        );
    }

    #[test]
    fn test_batch_request_counts_children() {
        let req = BatchRequest::new("render", "u1", "Trailer", ["a", "b", "c"])
            .progress_mode(ProgressMode::Sequential);
        assert_eq!(req.parent.expected_children, 3);
        assert_eq!(req.parent.progress_mode, ProgressMode::Sequential);
        assert_eq!(req.child_titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_new_validates_before_network() {
        let err = JobTracker::new(ClientConfig::new("not-a-key")).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
