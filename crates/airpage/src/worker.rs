// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Background transmission worker.
//!
//! Exactly one worker runs per process. It is the only consumer of the
//! queue, the only caller of the driver's `transmit`, and the sole writer
//! of request state transitions, which keeps the per-request lifecycle
//! totally ordered without any cross-task coordination:
//!
//! ```text
//! Queued -> Encoding -> Transmitting -> Success
//!                \            \
//!                 +------------+-----> Failed
//! ```
//!
//! Every transition is persisted through a scoped store session and
//! published to the event sink. A persistence outage degrades to
//! in-memory progress; it never stops the pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde_json::json;

use crate::config::Config;
use crate::encoder::MessageEncoder;
use crate::error::{Error, Result};
use crate::events::{Event, EventSink};
use crate::queue::TransmissionQueue;
use crate::request::TransmissionRequest;
use crate::sdr::SharedDriver;
use crate::status::SystemStatus;
use crate::store::Store;

/// Lifecycle state of a request while owned by the worker. `Success` and
/// `Failed` are terminal; transitions never go backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Queued,
    Encoding,
    Transmitting,
    Success,
    Failed,
}

impl RequestState {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestState::Queued => "queued",
            RequestState::Encoding => "encoding",
            RequestState::Transmitting => "transmitting",
            RequestState::Success => "success",
            RequestState::Failed => "failed",
        }
    }
}

/// Everything the worker thread and the submit path share.
struct WorkerShared {
    queue: Arc<TransmissionQueue>,
    sdr: SharedDriver,
    store: Arc<dyn Store>,
    events: Arc<dyn EventSink>,
    status: Arc<SystemStatus>,
    config: Config,
}

/// Owns the worker thread and the submit façade.
pub struct TransmissionWorker {
    shared: Arc<WorkerShared>,
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TransmissionWorker {
    /// Connect the radio (unless the encoder owns the RF path) and spawn
    /// the worker thread. A failed initial connect leaves the pipeline in
    /// degraded mode; the device monitor recovers it.
    pub fn start(
        queue: Arc<TransmissionQueue>,
        encoder: Box<dyn MessageEncoder>,
        sdr: SharedDriver,
        store: Arc<dyn Store>,
        events: Arc<dyn EventSink>,
        status: Arc<SystemStatus>,
        config: Config,
    ) -> Self {
        let shared = Arc::new(WorkerShared {
            queue,
            sdr,
            store,
            events,
            status,
            config,
        });

        let connected = if encoder.handles_transmit() {
            true
        } else {
            shared.sdr.lock().connect().unwrap_or(false)
        };
        shared.status.set_radio_status(connected);
        if !connected {
            log::warn!("[worker] radio not connected at startup; running in degraded mode");
            shared
                .events
                .publish(Event::status_update(json!({ "radio_connected": false })));
        }

        let stop_flag = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop_flag);
        let loop_shared = Arc::clone(&shared);
        let handle = thread::spawn(move || worker_loop(&loop_shared, encoder.as_ref(), &flag));

        log::info!("[worker] transmission worker started");
        Self {
            shared,
            stop_flag,
            handle: Some(handle),
        }
    }

    /// Validate a request, persist its queued status, publish
    /// `message_queued`, and only then hand it to the queue. The enqueue
    /// comes last: the worker wakes the moment the request lands, and the
    /// queued status must already be committed by then or the worker's
    /// own `encoding` write would be overwritten backward. Validation
    /// failures are returned to the caller and nothing is persisted or
    /// queued.
    pub fn submit(&self, request: TransmissionRequest) -> Result<()> {
        request.validate()?;
        let message_id = request.message_id;
        update_message_status(&self.shared, message_id, RequestState::Queued, None);
        self.shared.events.publish(Event::message_queued(message_id));
        self.shared.queue.enqueue(request)
    }

    /// Depth of the feeding queue; advisory only.
    pub fn queue_size(&self) -> usize {
        self.shared.queue.size()
    }

    /// Stop the worker and disconnect the radio. An in-flight
    /// transmission runs to completion; the loop re-checks the stop flag
    /// at least once per second otherwise.
    pub fn stop(mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("[worker] worker thread panicked during shutdown");
            }
        }
        self.shared.sdr.lock().disconnect();
        log::info!("[worker] transmission worker stopped");
    }
}

impl Drop for TransmissionWorker {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(shared: &WorkerShared, encoder: &dyn MessageEncoder, stop_flag: &AtomicBool) {
    while !stop_flag.load(Ordering::Relaxed) {
        let Some(request) = shared.queue.dequeue(Duration::from_secs(1)) else {
            continue;
        };
        process_request(shared, encoder, &request);
    }
}

fn process_request(shared: &WorkerShared, encoder: &dyn MessageEncoder, request: &TransmissionRequest) {
    let message_id = request.message_id;
    log::info!(
        "[worker] starting request: message {} to {} recipient(s), {} MHz, {} baud, {} chars",
        message_id,
        request.recipients.len(),
        request.frequency_mhz,
        request.baud_rate,
        request.message_text.len()
    );

    let started = Instant::now();
    update_message_status(shared, message_id, RequestState::Encoding, None);
    create_log_entry(
        shared,
        message_id,
        "encoding",
        Some(&format!(
            "Encoding started (baud={}, type={}, len={})",
            request.baud_rate,
            request.message_type.as_str(),
            request.message_text.len()
        )),
    );
    shared.events.publish(Event::encoding_started(message_id));

    match transmit_recipients(shared, encoder, request) {
        Ok(()) => {
            let duration = started.elapsed().as_secs_f64();
            update_message_status(shared, message_id, RequestState::Success, None);
            create_log_entry(
                shared,
                message_id,
                "complete",
                Some(&format!("Transmission complete in {:.2}s", duration)),
            );
            shared
                .events
                .publish(Event::transmission_complete(message_id, duration));
            shared.events.publish(Event::history_update(message_id));
            shared.events.publish(Event::analytics_update());
            shared.status.record_transmission();
            log::info!(
                "[worker] transmission complete: message {} in {:.2}s",
                message_id,
                duration
            );
        }
        Err(err) => handle_error(shared, message_id, &err),
    }
}

fn transmit_recipients(
    shared: &WorkerShared,
    encoder: &dyn MessageEncoder,
    request: &TransmissionRequest,
) -> Result<()> {
    let sys = &shared.config.system;
    let total = request.recipients.len();

    for (idx, ric) in request.recipients.iter().enumerate() {
        log::info!(
            "[worker] recipient {}/{}: RIC {} (message {})",
            idx + 1,
            total,
            ric,
            request.message_id
        );

        if encoder.handles_transmit() {
            update_message_status(shared, request.message_id, RequestState::Transmitting, None);
            create_log_entry(
                shared,
                request.message_id,
                "transmitting",
                Some(&format!(
                    "Delegated transmission to RIC {} at {} MHz (baud={})",
                    ric, request.frequency_mhz, request.baud_rate
                )),
            );
            shared.events.publish(Event::transmitting(request.message_id, ric));
            encoder.encode_and_transmit(
                ric,
                &request.message_text,
                request.message_type,
                request.baud_rate,
                request.frequency_mhz,
                sys.if_gain_db,
                sys.transmit_power_dbm,
            )?;
            shared.status.set_radio_status(true);
        } else {
            let samples = encoder.encode(
                ric,
                &request.message_text,
                request.message_type,
                request.baud_rate,
            )?;
            update_message_status(shared, request.message_id, RequestState::Transmitting, None);
            create_log_entry(
                shared,
                request.message_id,
                "transmitting",
                Some(&format!(
                    "Transmitting to RIC {} at {} MHz (sr={} MHz, gain={} dB, power={} dBm)",
                    ric,
                    request.frequency_mhz,
                    sys.sample_rate_mhz,
                    sys.if_gain_db,
                    sys.transmit_power_dbm
                )),
            );
            shared.events.publish(Event::transmitting(request.message_id, ric));

            let mut sdr = shared.sdr.lock();
            sdr.configure(
                request.frequency_mhz,
                sys.sample_rate_mhz,
                sys.if_gain_db,
                sys.transmit_power_dbm,
            )?;
            sdr.transmit(&samples)?;
        }
        log::info!("[worker] transmission completed for RIC {}", ric);
    }
    Ok(())
}

/// Route a pipeline failure to its terminal state. Encoding and
/// configuration failures fail the request only; RF write failures and
/// anything unclassified also take the radio down and pause the queue
/// until the monitor brings it back.
fn handle_error(shared: &WorkerShared, message_id: i64, err: &Error) {
    let keeps_radio = matches!(err, Error::Encoding(_) | Error::Configuration(_));
    if !keeps_radio {
        shared.status.set_radio_status(false);
        shared.sdr.lock().disconnect();
        shared.queue.pause();
        shared
            .events
            .publish(Event::status_update(json!({ "radio_connected": false })));
    }

    log::error!("[worker] transmission failed for message {}: {}", message_id, err);
    update_message_status(shared, message_id, RequestState::Failed, Some(err.detail()));
    create_log_entry(
        shared,
        message_id,
        "error",
        Some(&format!("{}: {}", err.kind(), err.detail())),
    );
    shared
        .events
        .publish(Event::transmission_failed(message_id, err.detail()));
    shared.events.publish(Event::history_update(message_id));
    shared.status.increment_error_count();
}

fn update_message_status(
    shared: &WorkerShared,
    message_id: i64,
    state: RequestState,
    error: Option<&str>,
) {
    let mut session = match shared.store.session() {
        Ok(session) => session,
        Err(e) => {
            log::warn!("[worker] store unavailable, skipping status write: {}", e);
            return;
        }
    };
    if let Err(e) = session.update_message_status(message_id, state.as_str(), error) {
        log::warn!("[worker] failed to stage status for message {}: {}", message_id, e);
        return;
    }
    if let Err(e) = session.commit() {
        log::warn!("[worker] failed to commit status for message {}: {}", message_id, e);
    }
}

fn create_log_entry(shared: &WorkerShared, message_id: i64, stage: &str, details: Option<&str>) {
    let mut session = match shared.store.session() {
        Ok(session) => session,
        Err(e) => {
            log::warn!("[worker] store unavailable, skipping log entry: {}", e);
            return;
        }
    };
    if let Err(e) = session.insert_log(message_id, stage, details) {
        log::warn!("[worker] failed to stage log for message {}: {}", message_id, e);
        return;
    }
    if let Err(e) = session.commit() {
        log::warn!("[worker] failed to commit log for message {}: {}", message_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ChannelSink;
    use crate::pocsag::BasebandEncoder;
    use crate::request::MessageType;
    use crate::sdr::{self, SdrDriver};
    use crate::store::{MemoryStore, StoreSession};
    use num_complex::Complex;
    use parking_lot::{Condvar, Mutex};

    #[derive(Debug, Default)]
    struct DriverLog {
        configures: usize,
        transmits: usize,
        disconnects: usize,
        last_sample_count: usize,
    }

    struct MockSdr {
        connected: bool,
        fail_configure: bool,
        fail_transmit: bool,
        log: Arc<Mutex<DriverLog>>,
    }

    impl MockSdr {
        fn healthy(log: Arc<Mutex<DriverLog>>) -> Self {
            Self {
                connected: false,
                fail_configure: false,
                fail_transmit: false,
                log,
            }
        }
    }

    impl SdrDriver for MockSdr {
        fn connect(&mut self) -> crate::error::Result<bool> {
            self.connected = true;
            Ok(true)
        }

        fn disconnect(&mut self) {
            self.connected = false;
            self.log.lock().disconnects += 1;
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn configure(&mut self, _f: f64, _sr: f64, _g: f64, _p: f64) -> crate::error::Result<()> {
            if self.fail_configure {
                return Err(Error::Configuration("tuner rejected frequency".into()));
            }
            self.log.lock().configures += 1;
            Ok(())
        }

        fn transmit(&mut self, iq_samples: &[Complex<f32>]) -> crate::error::Result<()> {
            if self.fail_transmit {
                return Err(Error::Transmission("stream write failed".into()));
            }
            let mut log = self.log.lock();
            log.transmits += 1;
            log.last_sample_count = iq_samples.len();
            Ok(())
        }
    }

    /// Store whose sessions always fail to open.
    struct DownStore;

    impl Store for DownStore {
        fn session(&self) -> crate::error::Result<Box<dyn StoreSession + '_>> {
            Err(Error::StoreUnavailable("backend offline".into()))
        }
    }

    /// Store that parks any session writing the queued status until the
    /// test opens the gate, and records every committed status in order.
    /// This pins the submit thread inside its persistence call, so a
    /// worker racing ahead of the queued commit becomes observable.
    struct GatedStore {
        inner: MemoryStore,
        gate: Arc<(Mutex<bool>, Condvar)>,
        committed: Arc<Mutex<Vec<String>>>,
    }

    struct GatedSession<'a> {
        inner: Box<dyn StoreSession + 'a>,
        gate: Arc<(Mutex<bool>, Condvar)>,
        committed: Arc<Mutex<Vec<String>>>,
        staged: Vec<String>,
    }

    impl Store for GatedStore {
        fn session(&self) -> crate::error::Result<Box<dyn StoreSession + '_>> {
            Ok(Box::new(GatedSession {
                inner: self.inner.session()?,
                gate: Arc::clone(&self.gate),
                committed: Arc::clone(&self.committed),
                staged: Vec::new(),
            }))
        }
    }

    impl StoreSession for GatedSession<'_> {
        fn update_message_status(
            &mut self,
            message_id: i64,
            status: &str,
            error: Option<&str>,
        ) -> crate::error::Result<()> {
            if status == RequestState::Queued.as_str() {
                let (released, cvar) = &*self.gate;
                let mut released = released.lock();
                while !*released {
                    cvar.wait(&mut released);
                }
            }
            self.staged.push(status.to_string());
            self.inner.update_message_status(message_id, status, error)
        }

        fn insert_log(
            &mut self,
            message_id: i64,
            stage: &str,
            details: Option<&str>,
        ) -> crate::error::Result<()> {
            self.inner.insert_log(message_id, stage, details)
        }

        fn commit(self: Box<Self>) -> crate::error::Result<()> {
            let this = *self;
            this.inner.commit()?;
            this.committed.lock().extend(this.staged);
            Ok(())
        }
    }

    struct Harness {
        worker: TransmissionWorker,
        queue: Arc<TransmissionQueue>,
        store: MemoryStore,
        status: Arc<SystemStatus>,
        events: crossbeam::channel::Receiver<Event>,
        driver_log: Arc<Mutex<DriverLog>>,
    }

    fn harness_with(configure_mock: impl FnOnce(&mut MockSdr)) -> Harness {
        let queue = Arc::new(TransmissionQueue::new());
        let store = MemoryStore::new();
        let status = Arc::new(SystemStatus::new());
        let (sink, events) = ChannelSink::new();
        let driver_log = Arc::new(Mutex::new(DriverLog::default()));
        let mut mock = MockSdr::healthy(Arc::clone(&driver_log));
        configure_mock(&mut mock);

        // Low sample rate keeps encode cheap in tests.
        let encoder = Box::new(BasebandEncoder::new(96_000.0, 4_500.0, false));
        let worker = TransmissionWorker::start(
            Arc::clone(&queue),
            encoder,
            sdr::shared(Box::new(mock)),
            Arc::new(store.clone()),
            Arc::new(sink),
            Arc::clone(&status),
            Config::default(),
        );
        Harness {
            worker,
            queue,
            store,
            status,
            events,
            driver_log,
        }
    }

    fn request(message_id: i64, recipients: &[&str]) -> TransmissionRequest {
        TransmissionRequest::new(
            message_id,
            recipients.iter().map(|s| s.to_string()).collect(),
            "TEST",
            MessageType::Alphanumeric,
            439.9875,
            1200,
        )
        .unwrap()
    }

    fn wait_until(mut pred: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !pred() {
            assert!(Instant::now() < deadline, "timed out waiting for condition");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_success_path_orders_events_and_persists_stages() {
        let h = harness_with(|_| {});
        h.worker.submit(request(1, &["1234567"])).unwrap();

        wait_until(|| {
            h.store
                .message_status(1)
                .is_some_and(|r| r.status == "success")
        });

        let stages: Vec<String> = h.store.logs_for(1).iter().map(|l| l.stage.clone()).collect();
        assert_eq!(stages, ["encoding", "transmitting", "complete"]);

        let mut names = Vec::new();
        while let Ok(event) = h.events.recv_timeout(Duration::from_millis(200)) {
            names.push(event.name());
            if names.last() == Some(&"transmission_complete") {
                break;
            }
        }
        assert_eq!(
            names,
            [
                "message_queued",
                "encoding_started",
                "transmitting",
                "transmission_complete"
            ]
        );

        let log = h.driver_log.lock();
        assert_eq!(log.configures, 1);
        assert_eq!(log.transmits, 1);
        assert!(log.last_sample_count > 0);
        drop(log);

        assert!(h.status.last_transmission().is_some());
        h.worker.stop();
    }

    #[test]
    fn test_queued_status_commits_before_the_worker_can_observe_the_request() {
        let queue = Arc::new(TransmissionQueue::new());
        let status = Arc::new(SystemStatus::new());
        let (sink, _events) = ChannelSink::new();
        let driver_log = Arc::new(Mutex::new(DriverLog::default()));
        let gate = Arc::new((Mutex::new(false), Condvar::new()));
        let committed = Arc::new(Mutex::new(Vec::new()));
        let mem = MemoryStore::new();

        let worker = TransmissionWorker::start(
            Arc::clone(&queue),
            Box::new(BasebandEncoder::new(96_000.0, 4_500.0, false)),
            sdr::shared(Box::new(MockSdr::healthy(Arc::clone(&driver_log)))),
            Arc::new(GatedStore {
                inner: mem.clone(),
                gate: Arc::clone(&gate),
                committed: Arc::clone(&committed),
            }),
            Arc::new(sink),
            Arc::clone(&status),
            Config::default(),
        );

        thread::scope(|s| {
            let submitter = s.spawn(|| worker.submit(request(8, &["1234567"])).unwrap());

            // The gate holds submit inside its queued-status write, so the
            // request must not have reached the queue yet. A submit that
            // enqueued first would already show the worker's commits here.
            thread::sleep(Duration::from_millis(200));
            assert!(queue.is_empty(), "request enqueued before queued commit");
            assert!(mem.message_status(8).is_none());
            assert!(committed.lock().is_empty());

            let (released, cvar) = &*gate;
            *released.lock() = true;
            cvar.notify_all();
            submitter.join().unwrap();
        });

        wait_until(|| {
            mem.message_status(8)
                .is_some_and(|r| r.status == "success")
        });

        // Commits land in lifecycle order; the terminal state is never
        // overwritten by a late queued write.
        assert_eq!(
            *committed.lock(),
            ["queued", "encoding", "transmitting", "success"]
        );
        worker.stop();
    }

    #[test]
    fn test_submit_rejects_invalid_requests_without_side_effects() {
        let h = harness_with(|_| {});
        let bad = TransmissionRequest {
            message_id: 11,
            recipients: vec![],
            message_text: "TEST".into(),
            message_type: MessageType::Alphanumeric,
            frequency_mhz: 439.9875,
            baud_rate: 1200,
        };
        assert!(h.worker.submit(bad).is_err());
        assert!(h.store.message_status(11).is_none());
        assert!(h.events.try_recv().is_err(), "no event for a rejected request");
        h.worker.stop();
    }

    #[test]
    fn test_recipients_transmit_in_order() {
        let h = harness_with(|_| {});
        h.worker.submit(request(2, &["1", "2", "3"])).unwrap();

        wait_until(|| {
            h.store
                .message_status(2)
                .is_some_and(|r| r.status == "success")
        });

        let rics: Vec<String> = (0..)
            .map_while(|_| h.events.try_recv().ok())
            .filter_map(|e| match e {
                Event::Transmitting { ric, .. } => Some(ric),
                _ => None,
            })
            .collect();
        assert_eq!(rics, ["1", "2", "3"]);
        assert_eq!(h.driver_log.lock().transmits, 3);
        h.worker.stop();
    }

    #[test]
    fn test_transmission_error_pauses_queue_and_disconnects() {
        let h = harness_with(|m| m.fail_transmit = true);
        h.worker.submit(request(3, &["1234567"])).unwrap();

        wait_until(|| {
            h.store
                .message_status(3)
                .is_some_and(|r| r.status == "failed")
        });

        assert!(h.queue.is_paused());
        assert!(!h.status.radio_connected());
        assert!(h.driver_log.lock().disconnects >= 1);
        assert_eq!(h.status.error_count(), 1);

        let record = h.store.message_status(3).unwrap();
        assert_eq!(record.error.as_deref(), Some("stream write failed"));
        let stages: Vec<String> = h.store.logs_for(3).iter().map(|l| l.stage.clone()).collect();
        assert_eq!(stages, ["encoding", "transmitting", "error"]);

        // The radio-down status event precedes the failure event.
        let mut saw_radio_down = false;
        let mut saw_failure = false;
        while let Ok(event) = h.events.recv_timeout(Duration::from_millis(200)) {
            match &event {
                Event::StatusUpdate { fields, .. } => {
                    if fields["radio_connected"] == serde_json::json!(false) {
                        saw_radio_down = true;
                        assert!(!saw_failure, "status update must precede the failure event");
                    }
                }
                Event::TransmissionFailed { error, .. } => {
                    saw_failure = true;
                    assert_eq!(error, "stream write failed");
                    break;
                }
                _ => {}
            }
        }
        assert!(saw_radio_down && saw_failure);
        h.worker.stop();
    }

    #[test]
    fn test_configuration_error_fails_without_pausing() {
        let h = harness_with(|m| m.fail_configure = true);
        h.worker.submit(request(4, &["1234567"])).unwrap();

        wait_until(|| {
            h.store
                .message_status(4)
                .is_some_and(|r| r.status == "failed")
        });

        assert!(!h.queue.is_paused());
        assert_eq!(h.driver_log.lock().disconnects, 0);
        let record = h.store.message_status(4).unwrap();
        assert_eq!(record.error.as_deref(), Some("tuner rejected frequency"));
        h.worker.stop();
    }

    #[test]
    fn test_delegated_encoder_skips_driver() {
        struct DelegatedEncoder {
            calls: Arc<Mutex<Vec<String>>>,
        }

        impl MessageEncoder for DelegatedEncoder {
            fn encode(
                &self,
                _ric: &str,
                _message: &str,
                _t: MessageType,
                _b: u32,
            ) -> crate::error::Result<Vec<Complex<f32>>> {
                Err(Error::Encoding("delegated".into()))
            }

            fn handles_transmit(&self) -> bool {
                true
            }

            fn encode_and_transmit(
                &self,
                ric: &str,
                _message: &str,
                _t: MessageType,
                _b: u32,
                _f: f64,
                _g: f64,
                _p: f64,
            ) -> crate::error::Result<()> {
                self.calls.lock().push(ric.to_string());
                Ok(())
            }
        }

        let queue = Arc::new(TransmissionQueue::new());
        let store = MemoryStore::new();
        let status = Arc::new(SystemStatus::new());
        let (sink, _events) = ChannelSink::new();
        let driver_log = Arc::new(Mutex::new(DriverLog::default()));
        let calls = Arc::new(Mutex::new(Vec::new()));

        let worker = TransmissionWorker::start(
            Arc::clone(&queue),
            Box::new(DelegatedEncoder {
                calls: Arc::clone(&calls),
            }),
            sdr::shared(Box::new(MockSdr::healthy(Arc::clone(&driver_log)))),
            Arc::new(store.clone()),
            Arc::new(sink),
            Arc::clone(&status),
            Config::default(),
        );

        worker.submit(request(5, &["2000000"])).unwrap();
        wait_until(|| {
            store
                .message_status(5)
                .is_some_and(|r| r.status == "success")
        });

        assert_eq!(*calls.lock(), ["2000000"]);
        let log = driver_log.lock();
        assert_eq!(log.configures, 0);
        assert_eq!(log.transmits, 0);
        drop(log);
        worker.stop();
    }

    #[test]
    fn test_store_outage_does_not_stop_the_pipeline() {
        let queue = Arc::new(TransmissionQueue::new());
        let status = Arc::new(SystemStatus::new());
        let (sink, events) = ChannelSink::new();
        let driver_log = Arc::new(Mutex::new(DriverLog::default()));

        let worker = TransmissionWorker::start(
            Arc::clone(&queue),
            Box::new(BasebandEncoder::new(96_000.0, 4_500.0, false)),
            sdr::shared(Box::new(MockSdr::healthy(Arc::clone(&driver_log)))),
            Arc::new(DownStore),
            Arc::new(sink),
            Arc::clone(&status),
            Config::default(),
        );

        worker.submit(request(6, &["1234567"])).unwrap();

        // Events keep flowing even though nothing persists.
        let mut names = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(10);
        while names.last() != Some(&"transmission_complete") {
            assert!(Instant::now() < deadline, "pipeline stalled on store outage");
            if let Ok(event) = events.recv_timeout(Duration::from_millis(200)) {
                names.push(event.name());
            }
        }
        assert_eq!(
            names,
            [
                "message_queued",
                "encoding_started",
                "transmitting",
                "transmission_complete"
            ]
        );
        assert_eq!(driver_log.lock().transmits, 1);
        worker.stop();
    }

    #[test]
    fn test_state_events_form_a_prefix_of_the_lifecycle() {
        // Both outcomes must follow the same prefix ordering.
        for fail in [false, true] {
            let h = harness_with(|m| m.fail_transmit = fail);
            h.worker.submit(request(7, &["1234567"])).unwrap();
            let terminal = if fail { "failed" } else { "success" };
            wait_until(|| {
                h.store
                    .message_status(7)
                    .is_some_and(|r| r.status == terminal)
            });

            let expected_order = ["message_queued", "encoding_started", "transmitting"];
            let mut idx = 0;
            while let Ok(event) = h.events.recv_timeout(Duration::from_millis(200)) {
                match event.name() {
                    "status_update" => continue,
                    "transmission_complete" | "transmission_failed" => break,
                    name => {
                        assert_eq!(name, expected_order[idx]);
                        idx += 1;
                    }
                }
            }
            assert_eq!(idx, expected_order.len());
            h.worker.stop();
        }
    }
}
