// crates/types/src/number.rs
//! Serializers that write integral floats as JSON integers.
//!
//! The service emits `"progress": 0`, not `0.0`. Deserializing into `f64`
//! and writing back through these keeps the value equal to what came in.

use serde::Serializer;

/// Largest magnitude an `f64` integer can have and still be exact.
const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

pub(crate) fn f64_compact<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

pub(crate) fn opt_f64_compact<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => f64_compact(v, serializer),
        None => serializer.serialize_none(),
    }
}
