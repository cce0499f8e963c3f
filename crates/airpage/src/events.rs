// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lifecycle event publication.
//!
//! Events mirror every state transition of a request plus radio status
//! changes. Delivery is best-effort: sinks must never block the worker,
//! and a lost event does not affect correctness because the same
//! transition is also persisted through the store.

use chrono::{DateTime, Utc};
use crossbeam::channel::{unbounded, Receiver, Sender};
use serde_json::{json, Value};

/// A pipeline lifecycle event with its emission timestamp.
#[derive(Debug, Clone)]
pub enum Event {
    MessageQueued {
        message_id: i64,
        timestamp: DateTime<Utc>,
    },
    EncodingStarted {
        message_id: i64,
        timestamp: DateTime<Utc>,
    },
    Transmitting {
        message_id: i64,
        ric: String,
        timestamp: DateTime<Utc>,
    },
    TransmissionComplete {
        message_id: i64,
        duration_secs: f64,
        timestamp: DateTime<Utc>,
    },
    TransmissionFailed {
        message_id: i64,
        error: String,
        timestamp: DateTime<Utc>,
    },
    StatusUpdate {
        fields: Value,
        timestamp: DateTime<Utc>,
    },
    HistoryUpdate {
        message_id: i64,
        timestamp: DateTime<Utc>,
    },
    AnalyticsUpdate {
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    pub fn message_queued(message_id: i64) -> Self {
        Event::MessageQueued {
            message_id,
            timestamp: Utc::now(),
        }
    }

    pub fn encoding_started(message_id: i64) -> Self {
        Event::EncodingStarted {
            message_id,
            timestamp: Utc::now(),
        }
    }

    pub fn transmitting(message_id: i64, ric: &str) -> Self {
        Event::Transmitting {
            message_id,
            ric: ric.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn transmission_complete(message_id: i64, duration_secs: f64) -> Self {
        Event::TransmissionComplete {
            message_id,
            duration_secs,
            timestamp: Utc::now(),
        }
    }

    pub fn transmission_failed(message_id: i64, error: impl Into<String>) -> Self {
        Event::TransmissionFailed {
            message_id,
            error: error.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn status_update(fields: Value) -> Self {
        Event::StatusUpdate {
            fields,
            timestamp: Utc::now(),
        }
    }

    pub fn history_update(message_id: i64) -> Self {
        Event::HistoryUpdate {
            message_id,
            timestamp: Utc::now(),
        }
    }

    pub fn analytics_update() -> Self {
        Event::AnalyticsUpdate {
            timestamp: Utc::now(),
        }
    }

    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Event::MessageQueued { .. } => "message_queued",
            Event::EncodingStarted { .. } => "encoding_started",
            Event::Transmitting { .. } => "transmitting",
            Event::TransmissionComplete { .. } => "transmission_complete",
            Event::TransmissionFailed { .. } => "transmission_failed",
            Event::StatusUpdate { .. } => "status_update",
            Event::HistoryUpdate { .. } => "history_update",
            Event::AnalyticsUpdate { .. } => "analytics_update",
        }
    }

    /// JSON payload carried alongside the name. Always includes the
    /// RFC 3339 UTC timestamp; stage events include the message id.
    pub fn payload(&self) -> Value {
        match self {
            Event::MessageQueued {
                message_id,
                timestamp,
            } => json!({
                "message_id": message_id,
                "stage": "queued",
                "timestamp": timestamp.to_rfc3339(),
            }),
            Event::EncodingStarted {
                message_id,
                timestamp,
            } => json!({
                "message_id": message_id,
                "stage": "encoding",
                "timestamp": timestamp.to_rfc3339(),
            }),
            Event::Transmitting {
                message_id,
                ric,
                timestamp,
            } => json!({
                "message_id": message_id,
                "stage": "transmitting",
                "ric": ric,
                "timestamp": timestamp.to_rfc3339(),
            }),
            Event::TransmissionComplete {
                message_id,
                duration_secs,
                timestamp,
            } => json!({
                "message_id": message_id,
                "stage": "complete",
                "duration_secs": duration_secs,
                "timestamp": timestamp.to_rfc3339(),
            }),
            Event::TransmissionFailed {
                message_id,
                error,
                timestamp,
            } => json!({
                "message_id": message_id,
                "stage": "error",
                "error": error,
                "timestamp": timestamp.to_rfc3339(),
            }),
            Event::StatusUpdate { fields, timestamp } => {
                let mut payload = fields.clone();
                if let Value::Object(map) = &mut payload {
                    map.insert("timestamp".into(), json!(timestamp.to_rfc3339()));
                }
                payload
            }
            Event::HistoryUpdate {
                message_id,
                timestamp,
            } => json!({
                "message_id": message_id,
                "timestamp": timestamp.to_rfc3339(),
            }),
            Event::AnalyticsUpdate { timestamp } => json!({
                "timestamp": timestamp.to_rfc3339(),
            }),
        }
    }
}

/// Publish-only sink for lifecycle events.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: Event);
}

/// Sink that discards everything. Useful when no consumer is attached.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: Event) {}
}

/// Sink backed by an unbounded channel. The embedding application drains
/// the receiver and forwards events to its own transport.
pub struct ChannelSink {
    tx: Sender<Event>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<Event>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn publish(&self, event: Event) {
        // Receiver gone means nobody is listening; that is fine.
        let _ = self.tx.send(event);
    }
}
