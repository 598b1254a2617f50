//! Telemetry metric name constants.
//!
//! Centralised metric names for lectio operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `lectio_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: primary provider name (e.g. "gemini", "openai")
//! - `status`: outcome of a single call: "ok" or "error"
//! - `outcome`: terminal state of a generation: "cache_hit", "primary",
//!   "fallback", "all_failed"

/// Total generations served by the gateway.
///
/// Labels: `outcome`.
pub const GENERATIONS_TOTAL: &str = "lectio_generations_total";

/// Total upstream calls made with a pooled key.
///
/// Labels: `provider`, `status` ("ok" | "error").
pub const PROVIDER_CALLS_TOTAL: &str = "lectio_provider_calls_total";

/// Upstream call duration in seconds.
///
/// Labels: `provider`.
pub const PROVIDER_CALL_DURATION_SECONDS: &str = "lectio_provider_call_duration_seconds";

/// Total keys marked failed (quota, auth or empty response).
///
/// Labels: `class` ("quota" | "auth" | "empty").
pub const KEY_ROTATIONS_TOTAL: &str = "lectio_key_rotations_total";

/// Total content cache hits.
pub const CACHE_HITS_TOTAL: &str = "lectio_cache_hits_total";

/// Total content cache misses.
pub const CACHE_MISSES_TOTAL: &str = "lectio_cache_misses_total";

/// Total fallback compositions.
///
/// Labels: `result` ("ok" | "error").
pub const FALLBACK_TOTAL: &str = "lectio_fallback_total";
