// crates/types/src/eta.rs
//! Historical duration statistics the server keeps per ETA key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Duration statistics for one workflow id or job type.
///
/// How the percentiles are computed is up to the server; the client only
/// reads them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtaStats {
    pub key: String,
    pub sample_count: u64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::number::opt_f64_compact"
    )]
    pub mean_duration_ms: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::number::opt_f64_compact"
    )]
    pub p50_duration_ms: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::number::opt_f64_compact"
    )]
    pub p90_duration_ms: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::number::opt_f64_compact"
    )]
    pub p99_duration_ms: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::number::opt_f64_compact"
    )]
    pub min_duration_ms: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::number::opt_f64_compact"
    )]
    pub max_duration_ms: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Response of `GET /v1/eta`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EtaStatsList {
    #[serde(default)]
    pub stats: Vec<EtaStats>,
}
