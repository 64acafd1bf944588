//! Shared status surface polled by the HTTP API
//!
//! The board holds the latest run snapshot behind an `RwLock<Arc<..>>`: the
//! engine swaps in a complete clone after every mutation, readers clone the
//! `Arc` out. A reader therefore always sees an internally consistent run,
//! never one mid-update. Logs live in a bounded ring with a monotonic cursor
//! that keeps advancing across evictions, so pollers never re-receive or
//! silently lose position.

use crate::core::state::DeploymentRun;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Severity of a status log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// One entry in the polled log stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Position in the stream; assigned by the ring
    #[serde(skip)]
    pub seq: u64,

    pub timestamp: DateTime<Utc>,

    pub level: LogLevel,

    /// Step the entry belongs to; `None` for run-level entries
    pub step_id: Option<String>,

    pub message: String,
}

/// Bounded log buffer with never-reset sequence numbers. Sequences start at
/// 1 so a cursor of 0 means "from the beginning".
struct LogRing {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_seq: u64,
}

impl LogRing {
    fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            next_seq: 1,
        }
    }

    fn push(&mut self, mut entry: LogEntry) {
        entry.seq = self.next_seq;
        self.next_seq += 1;
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    fn since(&self, cursor: Option<u64>) -> (Vec<LogEntry>, u64) {
        let floor = cursor.unwrap_or(0);
        let entries = self
            .entries
            .iter()
            .filter(|entry| entry.seq > floor)
            .cloned()
            .collect();
        (entries, self.next_seq - 1)
    }
}

/// Thread-safe run snapshot plus log ring.
pub struct StatusBoard {
    run: RwLock<Arc<DeploymentRun>>,
    logs: Mutex<LogRing>,
}

impl StatusBoard {
    pub fn new(log_capacity: usize) -> Self {
        Self {
            run: RwLock::new(Arc::new(DeploymentRun::new(Vec::new()))),
            logs: Mutex::new(LogRing::new(log_capacity)),
        }
    }

    /// Latest consistent snapshot of the run.
    pub async fn status(&self) -> Arc<DeploymentRun> {
        self.run.read().await.clone()
    }

    /// Atomically publish a new snapshot.
    pub async fn replace_run(&self, run: DeploymentRun) {
        *self.run.write().await = Arc::new(run);
    }

    pub async fn append_log(&self, level: LogLevel, step_id: Option<&str>, message: String) {
        let mut ring = self.logs.lock().await;
        ring.push(LogEntry {
            seq: 0,
            timestamp: Utc::now(),
            level,
            step_id: step_id.map(str::to_string),
            message,
        });
    }

    /// Entries strictly after `cursor`, plus the cursor to poll from next.
    pub async fn logs_since(&self, cursor: Option<u64>) -> (Vec<LogEntry>, u64) {
        let ring = self.logs.lock().await;
        ring.since(cursor)
    }
}
