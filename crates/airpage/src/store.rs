// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Persistence seams for message status and transmission logs.
//!
//! The worker never talks to a database directly. It opens a short-lived
//! session per write, and the session either commits or rolls back on
//! every exit path: dropping an uncommitted session discards its staged
//! changes. Backends (SQL stores, remote services) implement [`Store`]
//! outside this crate; [`MemoryStore`] is the in-process reference used
//! by tests and degraded deployments.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::Result;

/// Factory for scoped persistence sessions.
pub trait Store: Send + Sync {
    /// Open a session. Fails with `Error::StoreUnavailable` when the
    /// backend cannot be reached; the caller logs and continues.
    fn session(&self) -> Result<Box<dyn StoreSession + '_>>;
}

/// A unit of persistence work. All writes are staged until [`commit`];
/// dropping the session without committing rolls everything back.
///
/// [`commit`]: StoreSession::commit
pub trait StoreSession {
    /// Set the status of a message, optionally recording an error text.
    fn update_message_status(
        &mut self,
        message_id: i64,
        status: &str,
        error: Option<&str>,
    ) -> Result<()>;

    /// Append a transmission log entry for a message.
    fn insert_log(&mut self, message_id: i64, stage: &str, details: Option<&str>) -> Result<()>;

    /// Apply all staged writes atomically.
    fn commit(self: Box<Self>) -> Result<()>;
}

/// Message row as tracked by the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub status: String,
    pub error: Option<String>,
}

/// Transmission log row as tracked by the in-memory store.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub message_id: i64,
    pub stage: String,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    messages: HashMap<i64, MessageRecord>,
    logs: Vec<LogRecord>,
}

/// In-memory store with transactional sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status of a message, if any session committed one.
    pub fn message_status(&self, message_id: i64) -> Option<MessageRecord> {
        self.state.lock().messages.get(&message_id).cloned()
    }

    /// Committed log entries for a message, in insertion order.
    pub fn logs_for(&self, message_id: i64) -> Vec<LogRecord> {
        self.state
            .lock()
            .logs
            .iter()
            .filter(|l| l.message_id == message_id)
            .cloned()
            .collect()
    }
}

enum StagedWrite {
    Status {
        message_id: i64,
        status: String,
        error: Option<String>,
    },
    Log(LogRecord),
}

struct MemorySession<'a> {
    state: &'a Mutex<MemoryState>,
    staged: Vec<StagedWrite>,
}

impl Store for MemoryStore {
    fn session(&self) -> Result<Box<dyn StoreSession + '_>> {
        Ok(Box::new(MemorySession {
            state: &self.state,
            staged: Vec::new(),
        }))
    }
}

impl StoreSession for MemorySession<'_> {
    fn update_message_status(
        &mut self,
        message_id: i64,
        status: &str,
        error: Option<&str>,
    ) -> Result<()> {
        self.staged.push(StagedWrite::Status {
            message_id,
            status: status.to_string(),
            error: error.map(str::to_string),
        });
        Ok(())
    }

    fn insert_log(&mut self, message_id: i64, stage: &str, details: Option<&str>) -> Result<()> {
        self.staged.push(StagedWrite::Log(LogRecord {
            message_id,
            stage: stage.to_string(),
            details: details.map(str::to_string),
            timestamp: Utc::now(),
        }));
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        let mut state = self.state.lock();
        for write in self.staged.drain(..) {
            match write {
                StagedWrite::Status {
                    message_id,
                    status,
                    error,
                } => {
                    let entry = state
                        .messages
                        .entry(message_id)
                        .or_insert_with(|| MessageRecord {
                            status: String::new(),
                            error: None,
                        });
                    entry.status = status;
                    if error.is_some() {
                        entry.error = error;
                    }
                }
                StagedWrite::Log(record) => state.logs.push(record),
            }
        }
        Ok(())
    }
}
