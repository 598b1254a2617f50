//! Bounded call history and retrieval-source counters.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

/// Number of calls retained by [`CallHistory`].
pub const HISTORY_CAPACITY: usize = 50;

/// A single logged upstream call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallRecord {
    pub timestamp: DateTime<Utc>,
    pub api_name: String,
    pub success: bool,
    pub content_length: usize,
    pub error: Option<String>,
}

/// Append-only ring buffer of the most recent calls (FIFO eviction).
pub struct CallHistory {
    records: Mutex<VecDeque<CallRecord>>,
    capacity: usize,
}

impl CallHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append a record, dropping the oldest once over capacity.
    pub fn log(&self, api_name: &str, success: bool, content_length: usize, error: Option<&str>) {
        if success {
            info!(api = api_name, content_length, "call succeeded");
        } else {
            warn!(api = api_name, error = error.unwrap_or(""), "call failed");
        }

        let record = CallRecord {
            timestamp: Utc::now(),
            api_name: api_name.to_owned(),
            success,
            content_length,
            error: error.map(str::to_owned),
        };
        let mut records = self.records.lock();
        records.push_back(record);
        while records.len() > self.capacity {
            records.pop_front();
        }
    }

    /// The last `n` records, oldest first.
    pub fn recent(&self, n: usize) -> Vec<CallRecord> {
        let records = self.records.lock();
        let skip = records.len().saturating_sub(n);
        records.iter().skip(skip).cloned().collect()
    }

    /// Every retained record, oldest first.
    pub fn snapshot(&self) -> Vec<CallRecord> {
        self.records.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CallHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate counters for the retrieval source.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceStats {
    pub success_count: u64,
    pub error_count: u64,
    pub last_used: Option<DateTime<Utc>>,
}

impl SourceStats {
    pub fn record(&mut self, success: bool) {
        self.last_used = Some(Utc::now());
        if success {
            self.success_count += 1;
        } else {
            self.error_count += 1;
        }
    }
}
