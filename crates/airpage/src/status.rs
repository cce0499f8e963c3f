// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared system status registry.
//!
//! Producers, the worker, and the device monitor all observe the same
//! radio, so this state is process-wide by design. It lives behind one
//! lock-guarded object instead of scattered globals; every accessor takes
//! the lock for the duration of a field copy only.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug)]
struct StatusInner {
    radio_connected: bool,
    last_transmission: Option<DateTime<Utc>>,
    error_count: u64,
    uptime_start: DateTime<Utc>,
}

/// Thread-safe registry of radio and pipeline health.
#[derive(Debug)]
pub struct SystemStatus {
    inner: Mutex<StatusInner>,
}

/// Point-in-time copy of the registry, serializable for status events.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub radio_connected: bool,
    pub last_transmission: Option<DateTime<Utc>>,
    pub error_count: u64,
    pub uptime_seconds: f64,
    pub queue_size: usize,
}

impl SystemStatus {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StatusInner {
                radio_connected: false,
                last_transmission: None,
                error_count: 0,
                uptime_start: Utc::now(),
            }),
        }
    }

    /// Reset all fields, restarting the uptime clock.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.radio_connected = false;
        inner.last_transmission = None;
        inner.error_count = 0;
        inner.uptime_start = Utc::now();
    }

    pub fn set_radio_status(&self, connected: bool) {
        self.inner.lock().radio_connected = connected;
    }

    pub fn radio_connected(&self) -> bool {
        self.inner.lock().radio_connected
    }

    /// Stamp the last successful transmission with the current time.
    pub fn record_transmission(&self) {
        self.inner.lock().last_transmission = Some(Utc::now());
    }

    pub fn last_transmission(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().last_transmission
    }

    pub fn increment_error_count(&self) {
        self.inner.lock().error_count += 1;
    }

    pub fn error_count(&self) -> u64 {
        self.inner.lock().error_count
    }

    /// Seconds since the registry was created or last reset.
    pub fn uptime_seconds(&self) -> f64 {
        let start = self.inner.lock().uptime_start;
        (Utc::now() - start).num_milliseconds() as f64 / 1000.0
    }

    /// Snapshot for status events. The queue size is passed in because
    /// the registry deliberately holds no reference to the queue.
    pub fn snapshot(&self, queue_size: usize) -> StatusSnapshot {
        let inner = self.inner.lock();
        StatusSnapshot {
            radio_connected: inner.radio_connected,
            last_transmission: inner.last_transmission,
            error_count: inner.error_count,
            uptime_seconds: (Utc::now() - inner.uptime_start).num_milliseconds() as f64 / 1000.0,
            queue_size,
        }
    }
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radio_status_round_trip() {
        let status = SystemStatus::new();
        assert!(!status.radio_connected());
        status.set_radio_status(true);
        assert!(status.radio_connected());
    }

    #[test]
    fn test_error_counter() {
        let status = SystemStatus::new();
        status.increment_error_count();
        status.increment_error_count();
        assert_eq!(status.error_count(), 2);
        status.reset();
        assert_eq!(status.error_count(), 0);
    }

    #[test]
    fn test_snapshot_fields() {
        let status = SystemStatus::new();
        status.set_radio_status(true);
        status.record_transmission();
        let snap = status.snapshot(3);
        assert!(snap.radio_connected);
        assert!(snap.last_transmission.is_some());
        assert_eq!(snap.queue_size, 3);
        assert!(snap.uptime_seconds >= 0.0);
    }
}
