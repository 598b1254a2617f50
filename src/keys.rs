//! Key pool and daily quota tracker for the primary provider.
//!
//! Keys are tried in strict round-robin order starting from the position
//! after the last failure. A key marked failed (quota or auth) stays out
//! of rotation until the local calendar day changes, at which point every
//! key is restored and selection restarts at index 0.

use chrono::{DateTime, Local, NaiveDate, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

/// One upstream credential and its health.
#[derive(Debug, Clone, Serialize)]
pub struct KeyRecord {
    /// Stable slot identifier (`gemini_1`, `openai_1`, `key_1`, ...).
    pub id: String,
    #[serde(skip)]
    pub secret: String,
    /// Human label shown in status output.
    pub label: String,
    pub failed: bool,
    pub success_count: u64,
    pub error_count: u64,
    pub last_used: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl KeyRecord {
    pub fn new(id: impl Into<String>, label: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
            label: label.into(),
            failed: false,
            success_count: 0,
            error_count: 0,
            last_used: None,
            last_error: None,
        }
    }

    /// Whether the slot carries a credential at all.
    pub fn is_set(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Selectable: configured and not failed today.
    pub fn is_available(&self) -> bool {
        self.is_set() && !self.failed
    }
}

/// Day-scoped rotation cursor.
#[derive(Debug, Clone, Serialize)]
pub struct QuotaTracker {
    pub reset_date: NaiveDate,
    pub current_index: usize,
}

/// A key handed out for a single upstream attempt.
#[derive(Debug, Clone)]
pub struct KeySelection {
    pub index: usize,
    pub id: String,
    pub label: String,
    pub secret: String,
}

/// Point-in-time copy of the pool, for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct PoolSnapshot {
    pub keys: Vec<KeyRecord>,
    pub tracker: QuotaTracker,
}

impl PoolSnapshot {
    /// The key the next selection starts from, if any keys exist.
    pub fn current(&self) -> Option<&KeyRecord> {
        self.keys.get(self.tracker.current_index)
    }
}

struct PoolState {
    keys: Vec<KeyRecord>,
    tracker: QuotaTracker,
}

impl PoolState {
    fn roll_over(&mut self, today: NaiveDate) {
        if self.tracker.reset_date != today {
            info!(
                previous = %self.tracker.reset_date,
                %today,
                "new day, restoring all keys"
            );
            self.restore(today);
        }
    }

    fn restore(&mut self, today: NaiveDate) {
        self.tracker = QuotaTracker {
            reset_date: today,
            current_index: 0,
        };
        for key in &mut self.keys {
            key.failed = false;
        }
    }
}

/// Ordered pool of credentials for a rate-limited provider.
///
/// Thread-safe; the lock is held only for the duration of each call and
/// never across an upstream request.
pub struct KeyPool {
    state: Mutex<PoolState>,
}

impl KeyPool {
    /// Create a pool from records in rotation order.
    pub fn new(keys: Vec<KeyRecord>) -> Self {
        Self::new_on(keys, today())
    }

    /// Create a pool whose tracker starts on the given date.
    pub fn new_on(keys: Vec<KeyRecord>, today: NaiveDate) -> Self {
        Self {
            state: Mutex::new(PoolState {
                keys,
                tracker: QuotaTracker {
                    reset_date: today,
                    current_index: 0,
                },
            }),
        }
    }

    /// Build a pool from `(label, secret)` pairs; ids are `{prefix}_{n}`.
    pub fn from_secrets<I, L, S>(prefix: &str, secrets: I) -> Self
    where
        I: IntoIterator<Item = (L, S)>,
        L: Into<String>,
        S: Into<String>,
    {
        let keys = secrets
            .into_iter()
            .enumerate()
            .map(|(i, (label, secret))| KeyRecord::new(format!("{prefix}_{}", i + 1), label, secret))
            .collect();
        Self::new(keys)
    }

    /// Number of slots, including unset ones.
    pub fn len(&self) -> usize {
        self.state.lock().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any slot carries a secret, failed or not.
    pub fn has_configured_keys(&self) -> bool {
        self.state.lock().keys.iter().any(KeyRecord::is_set)
    }

    /// Select the next usable key for today.
    pub fn next_available(&self) -> Option<KeySelection> {
        self.next_available_on(today())
    }

    /// Select the next usable key, treating `today` as the current date.
    pub fn next_available_on(&self, today: NaiveDate) -> Option<KeySelection> {
        let mut state = self.state.lock();
        state.roll_over(today);

        let len = state.keys.len();
        let start = state.tracker.current_index;
        for offset in 0..len {
            let index = (start + offset) % len;
            let key = &state.keys[index];
            if key.is_available() {
                debug!(key = %key.label, index, "selected key");
                return Some(KeySelection {
                    index,
                    id: key.id.clone(),
                    label: key.label.clone(),
                    secret: key.secret.clone(),
                });
            }
        }
        warn!(pool_size = len, "no key available");
        None
    }

    /// Take a key out of rotation for the rest of the day and move the
    /// cursor past it.
    pub fn mark_failed(&self, index: usize) {
        let mut state = self.state.lock();
        let len = state.keys.len();
        if index >= len {
            return;
        }
        state.keys[index].failed = true;
        state.tracker.current_index = (index + 1) % len;
        info!(
            key = %state.keys[index].label,
            next_index = state.tracker.current_index,
            "key marked failed"
        );
    }

    /// Record the outcome of a call made with the key at `index`.
    pub fn record_call(&self, index: usize, success: bool, error: Option<&str>) {
        let mut state = self.state.lock();
        if let Some(key) = state.keys.get_mut(index) {
            key.last_used = Some(Utc::now());
            if success {
                key.success_count += 1;
            } else {
                key.error_count += 1;
                key.last_error = error.map(str::to_owned);
            }
        }
    }

    /// Restore every key and rewind the cursor, regardless of date.
    pub fn reset(&self) {
        self.state.lock().restore(today());
    }

    /// Copy of the current pool state.
    pub fn snapshot(&self) -> PoolSnapshot {
        let state = self.state.lock();
        PoolSnapshot {
            keys: state.keys.clone(),
            tracker: state.tracker.clone(),
        }
    }

    /// `(any available, human-readable summary)`.
    pub fn quota_summary(&self) -> (bool, String) {
        let state = self.state.lock();
        let (available, exhausted): (Vec<&KeyRecord>, Vec<&KeyRecord>) =
            state.keys.iter().partition(|k| k.is_available());
        let names = |keys: &[&KeyRecord]| {
            keys.iter()
                .map(|k| k.label.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        if available.is_empty() {
            return (false, format!("All keys exhausted: {}", names(&exhausted)));
        }
        let mut message = format!("Available keys: {}", names(&available));
        if !exhausted.is_empty() {
            message.push_str(&format!(" | Exhausted keys: {}", names(&exhausted)));
        }
        (true, message)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn pool(n: usize) -> KeyPool {
        let keys = (1..=n)
            .map(|i| KeyRecord::new(format!("k_{i}"), format!("Key {i}"), format!("secret-{i}")))
            .collect();
        KeyPool::new_on(keys, day(1))
    }

    #[test]
    fn selects_first_key_initially() {
        let pool = pool(3);
        let sel = pool.next_available_on(day(1)).unwrap();
        assert_eq!(sel.index, 0);
        assert_eq!(sel.secret, "secret-1");
    }

    #[test]
    fn mark_failed_advances_cursor() {
        let pool = pool(3);
        pool.mark_failed(0);
        assert_eq!(pool.next_available_on(day(1)).unwrap().index, 1);
        pool.mark_failed(1);
        assert_eq!(pool.next_available_on(day(1)).unwrap().index, 2);
    }

    #[test]
    fn selection_wraps_around() {
        let pool = pool(3);
        pool.mark_failed(2);
        // cursor at 0 after wrapping
        assert_eq!(pool.snapshot().tracker.current_index, 0);
        pool.mark_failed(0);
        assert_eq!(pool.next_available_on(day(1)).unwrap().index, 1);
    }

    #[test]
    fn exhausted_pool_returns_none() {
        let pool = pool(2);
        pool.mark_failed(0);
        pool.mark_failed(1);
        assert!(pool.next_available_on(day(1)).is_none());
        let (ok, msg) = pool.quota_summary();
        assert!(!ok);
        assert!(msg.contains("Key 1"));
    }

    #[test]
    fn unset_keys_are_skipped() {
        let keys = vec![
            KeyRecord::new("k_1", "Key 1", ""),
            KeyRecord::new("k_2", "Key 2", "secret"),
        ];
        let pool = KeyPool::new_on(keys, day(1));
        assert_eq!(pool.next_available_on(day(1)).unwrap().index, 1);
    }

    #[test]
    fn configured_keys_ignore_failure_state() {
        let unset = KeyPool::new_on(vec![KeyRecord::new("k_1", "Key 1", "")], day(1));
        assert!(!unset.has_configured_keys());
        assert!(!KeyPool::new(vec![]).has_configured_keys());

        let pool = pool(1);
        pool.mark_failed(0);
        assert!(pool.has_configured_keys());
    }

    #[test]
    fn day_rollover_restores_everything() {
        let pool = pool(3);
        pool.mark_failed(0);
        pool.mark_failed(1);
        pool.mark_failed(2);
        assert!(pool.next_available_on(day(1)).is_none());

        let sel = pool.next_available_on(day(2)).unwrap();
        assert_eq!(sel.index, 0);
        let snap = pool.snapshot();
        assert_eq!(snap.tracker.reset_date, day(2));
        assert!(snap.keys.iter().all(|k| !k.failed));
    }

    #[test]
    fn rollover_resets_cursor_even_without_failures() {
        let pool = pool(3);
        pool.mark_failed(1);
        assert_eq!(pool.snapshot().tracker.current_index, 2);
        pool.next_available_on(day(5));
        assert_eq!(pool.snapshot().tracker.current_index, 0);
    }

    #[test]
    fn mark_failed_out_of_range_is_ignored() {
        let pool = pool(2);
        pool.mark_failed(7);
        assert!(pool.snapshot().keys.iter().all(|k| !k.failed));
    }

    #[test]
    fn record_call_updates_counters() {
        let pool = pool(1);
        pool.record_call(0, true, None);
        pool.record_call(0, false, Some("quota"));
        let key = &pool.snapshot().keys[0];
        assert_eq!(key.success_count, 1);
        assert_eq!(key.error_count, 1);
        assert_eq!(key.last_error.as_deref(), Some("quota"));
        assert!(key.last_used.is_some());
    }

    #[test]
    fn from_secrets_assigns_ids_in_order() {
        let pool = KeyPool::from_secrets("gemini", [("Primary", "a"), ("Secondary", "b")]);
        let snap = pool.snapshot();
        assert_eq!(snap.keys[0].id, "gemini_1");
        assert_eq!(snap.keys[1].label, "Secondary");
    }
}
