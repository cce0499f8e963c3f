// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! FIFO queue feeding the transmission worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use crate::error::Result;
use crate::request::TransmissionRequest;

/// Unbounded FIFO of transmission requests with pause/resume.
///
/// Pausing suppresses dequeues without draining anything: producers keep
/// enqueueing while the radio is down, and the backlog transmits in the
/// original order once the device monitor resumes the queue.
pub struct TransmissionQueue {
    tx: Sender<TransmissionRequest>,
    rx: Receiver<TransmissionRequest>,
    paused: AtomicBool,
}

impl TransmissionQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            paused: AtomicBool::new(false),
        }
    }

    /// Validate and append a request. Wakes a blocked consumer.
    pub fn enqueue(&self, request: TransmissionRequest) -> Result<()> {
        request.validate()?;
        let message_id = request.message_id;
        let recipients = request.recipients.len();
        // Send on an unbounded channel only fails when the receiver half
        // is gone, and the queue owns both halves.
        self.tx.send(request).ok();
        log::info!(
            "[queue] enqueued message {} for {} recipient(s), depth {}",
            message_id,
            recipients,
            self.rx.len()
        );
        Ok(())
    }

    /// Wait up to `timeout` for the next request. Returns `None` on
    /// timeout or while the queue is paused.
    pub fn dequeue(&self, timeout: Duration) -> Option<TransmissionRequest> {
        if self.paused.load(Ordering::Acquire) {
            log::debug!("[queue] dequeue suppressed: queue paused");
            // Consume the timeout so a paused consumer does not spin.
            std::thread::sleep(timeout);
            return None;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(request) => Some(request),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
        log::warn!("[queue] transmission queue paused");
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        log::info!("[queue] transmission queue resumed");
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Observed depth; advisory only.
    pub fn size(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for TransmissionQueue {
    fn default() -> Self {
        Self::new()
    }
}
