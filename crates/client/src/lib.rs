// crates/client/src/lib.rs
//! Async client for the jobtrack job tracking service.
//!
//! - [`JobTracker`]: creates, lists and batches jobs
//! - [`JobHandle`]: a job snapshot with progress/complete/fail/refresh
//! - [`RequestExecutor`]: timeout, error classification and retry for every call
//! - [`Error`]: the closed set of failures callers can see
//!
//! ```no_run
//! use jobtrack_client::{ClientConfig, CompleteOptions, CreateJobRequest, JobTracker};
//!
//! # async fn run() -> jobtrack_client::Result<()> {
//! let tracker = JobTracker::new(ClientConfig::new("sk_live_abc123"))?;
//! let mut job = tracker
//!     .start(CreateJobRequest::new("video-generation", "u1", "Render intro"))
//!     .await?;
//! job.set_progress(50.0).await?;
//! job.complete(CompleteOptions::default()).await?;
//! assert!(job.is_terminal());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod eta;
pub mod executor;
pub mod handle;
pub mod retry;

pub use client::{Batch, BatchRequest, JobPage, JobTracker, ParentWithChildren};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use eta::EtaClient;
pub use executor::{ApiRequest, RequestExecutor};
pub use handle::JobHandle;
pub use retry::RetryPolicy;

pub use jobtrack_types as types;
pub use jobtrack_types::{
    ChildProgress, ChildSummary, CompleteOptions, CreateChildRequest, CreateJobRequest,
    CreateParentRequest, EtaStats, FailOptions, Job, JobErrorInfo, JobStatus, ListJobsQuery,
    Metadata, ProgressMode, ProgressUpdate, StageInfo,
};
