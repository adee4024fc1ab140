// crates/types/src/lib.rs
//! Data-transfer types shared by the jobtrack client and CLI.
//!
//! Everything here is a plain serde value; nothing performs I/O.

pub mod error;
pub mod eta;
pub mod job;
mod number;
pub mod requests;

pub use error::{ErrorBody, ErrorEnvelope};
pub use eta::{EtaStats, EtaStatsList};
pub use job::{
    ChildProgress, ChildrenInfo, Job, JobErrorInfo, JobStatus, Metadata, ParentRef, ProgressMode,
    QueueInfo, StageInfo,
};
pub use requests::{
    ChildSummary, CompleteOptions, CreateChildRequest, CreateJobRequest, CreateParentRequest,
    FailOptions, JobList, JobWithChildren, ListJobsQuery, ProgressUpdate,
};
