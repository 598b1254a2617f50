//! Read-side projections of gateway state for status endpoints.
//!
//! Everything here is a serde-serializable snapshot; nothing holds a
//! reference back into the gateway.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheEntrySummary;
use crate::history::{CallRecord, SourceStats};
use crate::keys::{KeyRecord, PoolSnapshot};

/// Id used for the retrieval source in [`ApiStatus::apis`].
pub const BIBLE_API_ID: &str = "bible_api";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStatus {
    Available,
    QuotaExceeded,
    Unset,
}

impl KeyStatus {
    fn of(key: &KeyRecord) -> Self {
        if !key.is_set() {
            KeyStatus::Unset
        } else if key.failed {
            KeyStatus::QuotaExceeded
        } else {
            KeyStatus::Available
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiEntry {
    pub name: String,
    pub status: KeyStatus,
    pub last_error: Option<String>,
    pub last_used: Option<DateTime<Utc>>,
    pub success_count: u64,
    pub error_count: u64,
}

impl From<&KeyRecord> for ApiEntry {
    fn from(key: &KeyRecord) -> Self {
        Self {
            name: key.label.clone(),
            status: KeyStatus::of(key),
            last_error: key.last_error.clone(),
            last_used: key.last_used,
            success_count: key.success_count,
            error_count: key.error_count,
        }
    }
}

/// Per-upstream status with the recent call history.
#[derive(Debug, Clone, Serialize)]
pub struct ApiStatus {
    pub timestamp: DateTime<Utc>,
    pub apis: BTreeMap<String, ApiEntry>,
    /// Id of the key the next selection starts from, or `bible_api` when
    /// the pool is empty.
    pub active_api: String,
    pub call_history: Vec<CallRecord>,
}

impl ApiStatus {
    pub fn project(
        pool: &PoolSnapshot,
        bible: &SourceStats,
        bible_configured: bool,
        call_history: Vec<CallRecord>,
    ) -> Self {
        let mut apis: BTreeMap<String, ApiEntry> = pool
            .keys
            .iter()
            .map(|k| (k.id.clone(), ApiEntry::from(k)))
            .collect();

        apis.insert(
            BIBLE_API_ID.to_string(),
            ApiEntry {
                name: "Bible API".to_string(),
                status: if bible_configured {
                    KeyStatus::Available
                } else {
                    KeyStatus::Unset
                },
                last_error: None,
                last_used: bible.last_used,
                success_count: bible.success_count,
                error_count: bible.error_count,
            },
        );

        let active_api = pool
            .current()
            .map(|k| k.id.clone())
            .unwrap_or_else(|| BIBLE_API_ID.to_string());

        Self {
            timestamp: Utc::now(),
            apis,
            active_api,
            call_history,
        }
    }
}

/// Liveness summary.
#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: String,
    /// One `"{label}: available|failed|unset"` line per key.
    pub keys: Vec<String>,
    pub current_key: Option<String>,
    pub primary_configured: bool,
    pub retrieval_configured: bool,
    pub cache_entries: u64,
    pub version: String,
}

impl Health {
    pub fn key_line(key: &KeyRecord) -> String {
        let state = match KeyStatus::of(key) {
            KeyStatus::Available => "available",
            KeyStatus::QuotaExceeded => "failed",
            KeyStatus::Unset => "unset",
        };
        format!("{}: {state}", key.label)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_entries: u64,
    pub entries: Vec<CacheEntrySummary>,
    pub primary_available: bool,
    pub quota_message: String,
    pub retrieval_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub total_calls: usize,
    pub recent_calls: Vec<CallRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPool;

    fn pool() -> KeyPool {
        KeyPool::from_secrets("gemini", [("Key 1", "a"), ("Key 2", "b"), ("Key 3", "")])
    }

    #[test]
    fn projects_every_key_plus_bible_api() {
        let pool = pool();
        pool.mark_failed(0);
        let status = ApiStatus::project(&pool.snapshot(), &SourceStats::default(), true, vec![]);

        assert_eq!(status.apis.len(), 4);
        assert_eq!(status.apis["gemini_1"].status, KeyStatus::QuotaExceeded);
        assert_eq!(status.apis["gemini_2"].status, KeyStatus::Available);
        assert_eq!(status.apis["gemini_3"].status, KeyStatus::Unset);
        assert_eq!(status.apis[BIBLE_API_ID].status, KeyStatus::Available);
        assert_eq!(status.active_api, "gemini_2");
    }

    #[test]
    fn empty_pool_points_at_bible_api() {
        let pool = KeyPool::new(vec![]);
        let status = ApiStatus::project(&pool.snapshot(), &SourceStats::default(), false, vec![]);
        assert_eq!(status.active_api, BIBLE_API_ID);
        assert_eq!(status.apis[BIBLE_API_ID].status, KeyStatus::Unset);
    }

    #[test]
    fn serializes_snake_case_status() {
        let pool = pool();
        pool.mark_failed(1);
        let status = ApiStatus::project(&pool.snapshot(), &SourceStats::default(), true, vec![]);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["apis"]["gemini_2"]["status"], "quota_exceeded");
        assert_eq!(json["apis"]["gemini_2"]["name"], "Key 2");
    }

    #[test]
    fn health_lines() {
        let snap = pool().snapshot();
        assert_eq!(Health::key_line(&snap.keys[0]), "Key 1: available");
        assert_eq!(Health::key_line(&snap.keys[2]), "Key 3: unset");
    }
}
