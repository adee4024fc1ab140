// crates/types/src/requests.rs
//! Request bodies and response envelopes for the `/v1/jobs` endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::job::{Job, JobErrorInfo, JobStatus, Metadata, ProgressMode, StageInfo};

/// Body of `POST /v1/jobs`.
///
/// The same endpoint creates standalone, parent and child jobs; which one is
/// decided by `total_children` / `parent_job_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub job_type: String,
    pub user_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_children: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_progress_mode: Option<ProgressMode>,
    /// Sent as the `Idempotency-Key` header, never in the body.
    #[serde(skip)]
    pub idempotency_key: Option<String>,
}

impl CreateJobRequest {
    pub fn new(
        job_type: impl Into<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            job_type: job_type.into(),
            user_id: user_id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn workflow(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = Some(workflow_id.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn estimated_duration_ms(mut self, ms: u64) -> Self {
        self.estimated_duration_ms = Some(ms);
        self
    }

    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// A container job that pre-declares how many children it will have.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateParentRequest {
    pub job_type: String,
    pub user_id: String,
    pub title: String,
    pub workflow_id: Option<String>,
    pub metadata: Option<Metadata>,
    pub expected_children: u32,
    pub progress_mode: ProgressMode,
    pub idempotency_key: Option<String>,
}

impl CreateParentRequest {
    pub fn new(
        job_type: impl Into<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
        expected_children: u32,
    ) -> Self {
        Self {
            job_type: job_type.into(),
            user_id: user_id.into(),
            title: title.into(),
            workflow_id: None,
            metadata: None,
            expected_children,
            progress_mode: ProgressMode::default(),
            idempotency_key: None,
        }
    }

    pub fn progress_mode(mut self, mode: ProgressMode) -> Self {
        self.progress_mode = mode;
        self
    }

    pub fn workflow(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = Some(workflow_id.into());
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

impl From<CreateParentRequest> for CreateJobRequest {
    fn from(req: CreateParentRequest) -> Self {
        Self {
            job_type: req.job_type,
            user_id: req.user_id,
            title: req.title,
            workflow_id: req.workflow_id,
            metadata: req.metadata,
            total_children: Some(req.expected_children),
            child_progress_mode: Some(req.progress_mode),
            idempotency_key: req.idempotency_key,
            ..Self::default()
        }
    }
}

/// A job attached to an existing parent at a zero-based position.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateChildRequest {
    pub parent_job_id: String,
    pub child_index: u32,
    pub job_type: String,
    pub user_id: String,
    pub title: String,
    pub workflow_id: Option<String>,
    pub metadata: Option<Metadata>,
    pub idempotency_key: Option<String>,
}

impl CreateChildRequest {
    pub fn new(
        parent_job_id: impl Into<String>,
        child_index: u32,
        job_type: impl Into<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            parent_job_id: parent_job_id.into(),
            child_index,
            job_type: job_type.into(),
            user_id: user_id.into(),
            title: title.into(),
            workflow_id: None,
            metadata: None,
            idempotency_key: None,
        }
    }

    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

impl From<CreateChildRequest> for CreateJobRequest {
    fn from(req: CreateChildRequest) -> Self {
        Self {
            job_type: req.job_type,
            user_id: req.user_id,
            title: req.title,
            workflow_id: req.workflow_id,
            metadata: req.metadata,
            parent_job_id: Some(req.parent_job_id),
            child_index: Some(req.child_index),
            idempotency_key: req.idempotency_key,
            ..Self::default()
        }
    }
}

/// Body of `POST /v1/jobs/:id/progress`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip)]
    pub idempotency_key: Option<String>,
}

impl ProgressUpdate {
    pub fn new(progress: f64) -> Self {
        Self {
            progress,
            ..Self::default()
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn stage(mut self, stage: StageInfo) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

impl From<f64> for ProgressUpdate {
    fn from(progress: f64) -> Self {
        Self::new(progress)
    }
}

/// Body of `POST /v1/jobs/:id/complete`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip)]
    pub idempotency_key: Option<String>,
}

impl CompleteOptions {
    pub fn with_result(result: Value) -> Self {
        Self {
            result: Some(result),
            ..Self::default()
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Body of `POST /v1/jobs/:id/fail`. The error payload is mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailOptions {
    pub error: JobErrorInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip)]
    pub idempotency_key: Option<String>,
}

impl FailOptions {
    pub fn new(error: JobErrorInfo) -> Self {
        Self {
            error,
            metadata: None,
            idempotency_key: None,
        }
    }

    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Query parameters for `GET /v1/jobs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListJobsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Opaque token from a previous page's `next_cursor`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl ListJobsQuery {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Response of `GET /v1/jobs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobList {
    pub jobs: Vec<Job>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Flattened child entry returned by `GET /v1/jobs/:id/children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildSummary {
    pub id: String,
    pub child_index: u32,
    pub title: String,
    pub status: JobStatus,
    #[serde(serialize_with = "crate::number::f64_compact")]
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JobErrorInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Response of `GET /v1/jobs/:id/children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobWithChildren {
    pub parent: Job,
    #[serde(default)]
    pub children: Vec<ChildSummary>,
}
