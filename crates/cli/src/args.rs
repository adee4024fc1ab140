// crates/cli/src/args.rs
//! Command-line surface of the `jobtrack` binary.

use clap::{Parser, Subcommand};
use jobtrack_client::{JobStatus, Metadata, ProgressMode};

#[derive(Debug, Parser)]
#[command(name = "jobtrack")]
#[command(about = "Create, inspect and update tracked jobs", version)]
pub struct Cli {
    /// Log line format (text or json). Overrides JOBTRACK_LOG_FORMAT.
    #[arg(long, global = true)]
    pub log_format: Option<jobtrack_observability::LogFormat>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a standalone job
    Start {
        job_type: String,
        user_id: String,
        title: String,

        #[arg(long)]
        workflow: Option<String>,

        /// Metadata as a JSON object
        #[arg(long, value_parser = parse_metadata)]
        metadata: Option<Metadata>,

        #[arg(long)]
        idempotency_key: Option<String>,
    },

    /// Fetch one job
    Get { job_id: String },

    /// List jobs, newest first
    List {
        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        status: Option<JobStatus>,

        #[arg(long = "type")]
        job_type: Option<String>,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        cursor: Option<String>,
    },

    /// Show a parent job and its children
    Children { job_id: String },

    /// Create a parent job plus one child per title
    Batch {
        job_type: String,
        user_id: String,
        title: String,

        /// Child titles, in order
        #[arg(long = "child", required = true)]
        children: Vec<String>,

        #[arg(long, default_value = "average")]
        mode: ProgressMode,

        #[arg(long)]
        workflow: Option<String>,

        #[arg(long)]
        idempotency_key: Option<String>,
    },

    /// Report progress on a job
    Progress {
        job_id: String,

        #[arg(value_parser = parse_percent)]
        progress: f64,

        #[arg(long, short = 'm')]
        message: Option<String>,
    },

    /// Mark a job completed
    Complete {
        job_id: String,

        /// Result payload as JSON
        #[arg(long, value_parser = parse_json)]
        result: Option<serde_json::Value>,

        #[arg(long, short = 'm')]
        message: Option<String>,
    },

    /// Mark a job failed
    Fail {
        job_id: String,
        message: String,

        #[arg(long)]
        code: Option<String>,
    },

    /// Block until a job completes or fails
    Wait {
        job_id: String,

        /// Seconds between polls
        #[arg(long, default_value_t = 2)]
        interval: u64,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 600)]
        timeout: u64,
    },

    /// Historical duration statistics
    Eta {
        #[command(subcommand)]
        action: EtaCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum EtaCommand {
    /// Show statistics for one workflow id or job type
    Get { key: String },
    /// List all statistics
    List,
    /// Drop the samples for one key
    Reset { key: String },
}

fn parse_json(raw: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))
}

fn parse_metadata(raw: &str) -> Result<Metadata, String> {
    match parse_json(raw)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err("metadata must be a JSON object".to_string()),
    }
}

fn parse_percent(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|_| format!("not a number: {raw}"))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(format!("progress must be between 0 and 100, got {value}"));
    }
    Ok(value)
}
