// crates/client/src/eta.rs
//! Read and reset the server's historical duration statistics.

use std::sync::Arc;

use jobtrack_types::{EtaStats, EtaStatsList};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::executor::{segment, ApiRequest, RequestExecutor};

/// Obtained from [`crate::JobTracker::eta`].
#[derive(Debug, Clone)]
pub struct EtaClient {
    executor: Arc<RequestExecutor>,
}

impl EtaClient {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Statistics for one workflow id or job type.
    ///
    /// `Ok(None)` means the server has no samples for `key` yet. Any other
    /// failure, including a rejected key, is returned as an error.
    pub async fn get_stats(&self, key: &str) -> Result<Option<EtaStats>> {
        let request = ApiRequest::get(stats_path(key)?);
        match self.executor.execute::<EtaStats>(&request).await {
            Ok(stats) => Ok(Some(stats)),
            Err(err) if err.is_not_found() => {
                debug!(key, "No ETA statistics recorded yet");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn list(&self) -> Result<Vec<EtaStats>> {
        let list: EtaStatsList = self.executor.execute(&ApiRequest::get("/v1/eta")).await?;
        Ok(list.stats)
    }

    /// Drop all samples recorded under `key`.
    pub async fn reset(&self, key: &str) -> Result<()> {
        let _: Value = self
            .executor
            .execute(&ApiRequest::delete(stats_path(key)?))
            .await?;
        Ok(())
    }
}

fn stats_path(key: &str) -> Result<String> {
    if key.trim().is_empty() {
        return Err(Error::Validation {
            code: "INVALID_ETA_KEY".into(),
            message: "ETA key must not be empty".into(),
            details: None,
        });
    }
    Ok(format!("/v1/eta/{}", segment(key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_path() {
        assert_eq!(stats_path("video-generation").unwrap(), "/v1/eta/video-generation");
        assert_eq!(stats_path("wf/v2").unwrap(), "/v1/eta/wf%2Fv2");
    }

    #[test]
    fn test_blank_key_rejected_locally() {
        let err = stats_path("  ").unwrap_err();
        assert_eq!(err.code(), "INVALID_ETA_KEY");
        assert_eq!(err.status(), 400);
    }
}
