// crates/types/src/job.rs
//! Server-reported job snapshot and its derived views.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form job metadata. The server merges updates into the stored map.
pub type Metadata = serde_json::Map<String, Value>;

/// Lifecycle status of a job. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

/// How a parent job combines the progress of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMode {
    #[default]
    Average,
    Weighted,
    Sequential,
}

impl std::str::FromStr for ProgressMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "average" => Ok(ProgressMode::Average),
            "weighted" => Ok(ProgressMode::Weighted),
            "sequential" => Ok(ProgressMode::Sequential),
            other => Err(format!("unknown progress mode: {other}")),
        }
    }
}

/// Position of a pending job in the server's queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueInfo {
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
}

/// Multi-stage progress, e.g. "stage 2 of 4: encoding".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageInfo {
    pub current: u32,
    pub total: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Error payload attached to a failed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobErrorInfo {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl JobErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            details: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Link from a child job to its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRef {
    pub parent_job_id: String,
    pub child_index: u32,
}

/// Aggregate counters the server keeps on a parent job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildrenInfo {
    pub total: u32,
    pub completed: u32,
    pub failed: u32,
    pub running: u32,
    pub pending: u32,
    /// Server default (`average`) applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_mode: Option<ProgressMode>,
}

/// Caller-facing view of a parent's children counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildProgress {
    pub total: u32,
    pub completed: u32,
    pub failed: u32,
    pub running: u32,
    pub pending: u32,
    pub mode: ProgressMode,
}

impl ChildProgress {
    /// Children that reached a terminal status.
    pub fn settled(&self) -> u32 {
        self.completed + self.failed
    }

    pub fn is_settled(&self) -> bool {
        self.settled() >= self.total
    }
}

impl From<&ChildrenInfo> for ChildProgress {
    fn from(info: &ChildrenInfo) -> Self {
        Self {
            total: info.total,
            completed: info.completed,
            failed: info.failed,
            running: info.running,
            pending: info.pending,
            mode: info.progress_mode.unwrap_or_default(),
        }
    }
}

/// A job as reported by the tracking service.
///
/// This is a plain value: it never talks to the network. `id`, `app_id`,
/// `user_id`, `job_type` and `created_at` identify the job and never change
/// after creation; everything else is replaced wholesale by [`Job::apply_update`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub app_id: String,
    pub user_id: String,
    pub job_type: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    pub status: JobStatus,
    /// 0-100, clamped by the server.
    #[serde(serialize_with = "crate::number::f64_compact")]
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<QueueInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JobErrorInfo>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::number::opt_f64_compact"
    )]
    pub eta_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_sample_count: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<ChildrenInfo>,
}

impl Job {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_parent(&self) -> bool {
        self.children.is_some()
    }

    pub fn is_child(&self) -> bool {
        self.parent.is_some()
    }

    /// Children counters, or `None` if this job is not a parent.
    pub fn child_progress(&self) -> Option<ChildProgress> {
        self.children.as_ref().map(ChildProgress::from)
    }

    /// Time left until the estimated completion, floored at zero.
    pub fn eta_remaining(&self) -> Option<Duration> {
        self.eta_remaining_at(Utc::now())
    }

    pub fn eta_remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.estimated_completion_at
            .map(|eta| (eta - now).to_std().unwrap_or(Duration::ZERO))
    }

    /// True when the job is still running past its estimated completion.
    pub fn is_past_eta(&self) -> bool {
        self.is_past_eta_at(Utc::now())
    }

    pub fn is_past_eta_at(&self, now: DateTime<Utc>) -> bool {
        match self.estimated_completion_at {
            Some(eta) => !self.is_terminal() && eta < now,
            None => false,
        }
    }

    /// Overwrite every mutable field with the authoritative state in `fresh`.
    ///
    /// Identity fields are kept from `self` even if the server echoes
    /// something different.
    pub fn apply_update(&mut self, fresh: Job) {
        let Job {
            id: _,
            app_id: _,
            user_id: _,
            job_type: _,
            created_at: _,
            title,
            workflow_id,
            status,
            progress,
            message,
            queue,
            stage,
            result,
            error,
            metadata,
            estimated_completion_at,
            eta_confidence,
            eta_sample_count,
            updated_at,
            started_at,
            completed_at,
            parent,
            children,
        } = fresh;

        self.title = title;
        self.workflow_id = workflow_id;
        self.status = status;
        self.progress = progress;
        self.message = message;
        self.queue = queue;
        self.stage = stage;
        self.result = result;
        self.error = error;
        self.metadata = metadata;
        self.estimated_completion_at = estimated_completion_at;
        self.eta_confidence = eta_confidence;
        self.eta_sample_count = eta_sample_count;
        self.updated_at = updated_at;
        self.started_at = started_at;
        self.completed_at = completed_at;
        self.parent = parent;
        self.children = children;
    }
}
