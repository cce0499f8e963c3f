// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Periodic radio health monitor.
//!
//! The monitor is the recovery half of the disconnect story: when the
//! worker hits an RF write failure it pauses the queue and marks the
//! radio down, and every tick here tries to reconnect, reapply the
//! current configuration, and resume the queue. Monitor failures are
//! logged and swallowed; a broken probe must never take the worker down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::json;

use crate::config::Config;
use crate::events::{Event, EventSink};
use crate::queue::TransmissionQueue;
use crate::sdr::SharedDriver;
use crate::status::SystemStatus;

/// Default probe interval.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Granularity of the interval sleep, so stop() stays prompt.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Owns the monitor thread.
pub struct DeviceMonitor {
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl DeviceMonitor {
    /// Spawn the monitor thread probing at `interval`.
    pub fn start(
        sdr: SharedDriver,
        queue: Arc<TransmissionQueue>,
        status: Arc<SystemStatus>,
        events: Arc<dyn EventSink>,
        config: Config,
        interval: Duration,
    ) -> Self {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop_flag);
        let handle = thread::spawn(move || {
            monitor_loop(&sdr, &queue, &status, events.as_ref(), &config, interval, &flag);
        });
        log::info!(
            "[monitor] device monitor started (interval {:.1}s)",
            interval.as_secs_f64()
        );
        Self {
            stop_flag,
            handle: Some(handle),
        }
    }

    pub fn stop(mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("[monitor] monitor thread panicked during shutdown");
            }
        }
        log::info!("[monitor] device monitor stopped");
    }
}

impl Drop for DeviceMonitor {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn monitor_loop(
    sdr: &SharedDriver,
    queue: &TransmissionQueue,
    status: &SystemStatus,
    events: &dyn EventSink,
    config: &Config,
    interval: Duration,
    stop_flag: &AtomicBool,
) {
    let mut last_connected = false;

    while !stop_flag.load(Ordering::Relaxed) {
        let connected = sdr.lock().is_connected();

        if !connected {
            if last_connected {
                log::warn!("[monitor] radio disconnected, pausing queue");
                status.set_radio_status(false);
                queue.pause();
                events.publish(Event::status_update(json!({ "radio_connected": false })));
            }
            attempt_reconnect(sdr, queue, status, events, config);
        } else if !last_connected {
            log::info!("[monitor] radio connection restored");
            status.set_radio_status(true);
            queue.resume();
            events.publish(Event::status_update(json!({ "radio_connected": true })));
        }

        // A successful reconnect already updated the registry, so fold it
        // into the edge detection for the next tick.
        last_connected = connected || status.radio_connected();

        sleep_interval(interval, stop_flag);
    }
}

fn attempt_reconnect(
    sdr: &SharedDriver,
    queue: &TransmissionQueue,
    status: &SystemStatus,
    events: &dyn EventSink,
    config: &Config,
) {
    let mut driver = sdr.lock();
    match driver.connect() {
        Ok(true) => {
            let sys = &config.system;
            if let Err(e) = driver.configure(
                sys.frequency_mhz,
                sys.sample_rate_mhz,
                sys.if_gain_db,
                sys.transmit_power_dbm,
            ) {
                log::warn!("[monitor] reconnected but failed to configure radio: {}", e);
            }
            drop(driver);

            log::info!("[monitor] radio reconnected");
            status.set_radio_status(true);
            events.publish(Event::status_update(json!({
                "radio_connected": true,
                "frequency": config.system.frequency_mhz,
                "baud_rate": config.pocsag.baud_rate,
            })));
            queue.resume();
        }
        Ok(false) => {
            log::debug!("[monitor] reconnect attempt found no device");
        }
        Err(e) => {
            log::debug!("[monitor] reconnect attempt failed: {}", e);
        }
    }
}

fn sleep_interval(interval: Duration, stop_flag: &AtomicBool) {
    let mut remaining = interval;
    while remaining > Duration::ZERO && !stop_flag.load(Ordering::Relaxed) {
        let slice = remaining.min(SLEEP_SLICE);
        thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
}
