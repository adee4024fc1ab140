// crates/cli/src/main.rs
//! `jobtrack` command-line client.
//!
//! Reads `JOBTRACK_API_KEY` (and optional `JOBTRACK_BASE_URL`,
//! `JOBTRACK_TIMEOUT_SECS`, `JOBTRACK_MAX_ATTEMPTS`) from the environment and
//! prints every result as JSON on stdout. Logs go to stderr.

mod args;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use jobtrack_client::{
    BatchRequest, CompleteOptions, CreateJobRequest, FailOptions, JobErrorInfo, JobTracker,
    ListJobsQuery, ProgressUpdate,
};
use jobtrack_observability::LogFormat;
use serde_json::{json, Value};

use crate::args::{Cli, Command, EtaCommand};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    jobtrack_observability::init(cli.log_format.unwrap_or_else(LogFormat::from_env), "warn");

    let tracker = JobTracker::from_env().context("failed to configure jobtrack client")?;
    let output = run(&tracker, cli.command).await?;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}

async fn run(tracker: &JobTracker, command: Command) -> Result<Value> {
    let output = match command {
        Command::Start {
            job_type,
            user_id,
            title,
            workflow,
            metadata,
            idempotency_key,
        } => {
            let mut request = CreateJobRequest::new(job_type, user_id, title);
            request.workflow_id = workflow;
            request.metadata = metadata;
            request.idempotency_key = idempotency_key;
            let job = tracker.start(request).await?;
            serde_json::to_value(job.job())?
        }
        Command::Get { job_id } => serde_json::to_value(tracker.get(&job_id).await?.job())?,
        Command::List {
            user,
            status,
            job_type,
            limit,
            cursor,
        } => {
            let query = ListJobsQuery {
                user_id: user,
                status,
                job_type,
                limit,
                cursor,
            };
            let page = tracker.list(&query).await?;
            let jobs: Vec<_> = page.jobs.iter().map(|job| job.job()).collect();
            json!({ "jobs": jobs, "nextCursor": page.next_cursor })
        }
        Command::Children { job_id } => {
            let view = tracker.get_with_children(&job_id).await?;
            json!({ "parent": view.parent.job(), "children": view.children })
        }
        Command::Batch {
            job_type,
            user_id,
            title,
            children,
            mode,
            workflow,
            idempotency_key,
        } => {
            let mut request =
                BatchRequest::new(job_type, user_id, title, children).progress_mode(mode);
            if let Some(workflow) = workflow {
                request = request.workflow(workflow);
            }
            if let Some(key) = idempotency_key {
                request = request.idempotency_key(key);
            }
            let batch = tracker.create_batch(request).await?;
            let children: Vec<_> = batch.children.iter().map(|child| child.job()).collect();
            json!({ "parent": batch.parent.job(), "children": children })
        }
        Command::Progress {
            job_id,
            progress,
            message,
        } => {
            let mut update = ProgressUpdate::new(progress);
            update.message = message;
            let mut job = tracker.get(&job_id).await?;
            job.set_progress(update).await?;
            serde_json::to_value(job.job())?
        }
        Command::Complete {
            job_id,
            result,
            message,
        } => {
            let options = CompleteOptions {
                result,
                message,
                ..CompleteOptions::default()
            };
            let mut job = tracker.get(&job_id).await?;
            job.complete(options).await?;
            serde_json::to_value(job.job())?
        }
        Command::Fail {
            job_id,
            message,
            code,
        } => {
            let mut error = JobErrorInfo::new(message);
            error.code = code;
            let mut job = tracker.get(&job_id).await?;
            job.fail(FailOptions::new(error)).await?;
            serde_json::to_value(job.job())?
        }
        Command::Wait {
            job_id,
            interval,
            timeout,
        } => {
            let mut job = tracker.get(&job_id).await?;
            job.wait_until_terminal(Duration::from_secs(interval), Duration::from_secs(timeout))
                .await?;
            serde_json::to_value(job.job())?
        }
        Command::Eta { action } => match action {
            EtaCommand::Get { key } => match tracker.eta().get_stats(&key).await? {
                Some(stats) => serde_json::to_value(stats)?,
                None => Value::Null,
            },
            EtaCommand::List => json!({ "stats": tracker.eta().list().await? }),
            EtaCommand::Reset { key } => {
                tracker.eta().reset(&key).await?;
                json!({ "reset": key })
            }
        },
    };
    Ok(output)
}
