// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Radio driver seam.
//!
//! The crate never links a hardware SDR library. It defines the operations
//! the pipeline invokes on one and ships two stand-ins: [`NoopSdr`] for
//! deployments where an external flowgraph owns the RF path, and the
//! registry hook for an embedding application to inject its own driver.

use std::sync::Arc;

use num_complex::Complex;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

mod noop;
pub mod subprocess;

pub use noop::NoopSdr;
pub use subprocess::SubprocessEncoder;

/// Operations the transmission pipeline requires from a radio front end.
///
/// Implementations are stateful (connection handles, stream state), so
/// every method takes `&mut self`; the pipeline shares a driver between
/// the worker and the device monitor behind [`SharedDriver`].
pub trait SdrDriver: Send {
    /// Open the device. Idempotent; returns whether a device is attached.
    fn connect(&mut self) -> Result<bool>;

    /// Close the device. Idempotent.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Apply transmit parameters. Fails with `Error::Configuration`.
    fn configure(
        &mut self,
        frequency_mhz: f64,
        sample_rate_mhz: f64,
        if_gain_db: f64,
        tx_power_dbm: f64,
    ) -> Result<()>;

    /// Stream IQ samples at the configured rate, blocking until the
    /// driver consumed all of them. Fails with `Error::Transmission`.
    fn transmit(&mut self, iq_samples: &[Complex<f32>]) -> Result<()>;
}

/// Driver handle shared between the worker and the device monitor. The
/// two never overlap on the radio: the monitor reconfigures only after a
/// reconnect while the queue is paused.
pub type SharedDriver = Arc<Mutex<Box<dyn SdrDriver>>>;

/// Wrap a driver for shared use.
pub fn shared(driver: Box<dyn SdrDriver>) -> SharedDriver {
    Arc::new(Mutex::new(driver))
}

/// Closed set of driver variants selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverSelection {
    /// Placeholder driver; an external flowgraph owns the RF path.
    #[default]
    Noop,
    /// Hardware driver injected by the embedding application.
    External,
}

/// Build the configured driver variant.
///
/// `External` has no in-crate constructor; the embedding application
/// builds its hardware driver itself and passes it to the pipeline, so
/// requesting it here is a configuration mistake.
pub fn build_driver(selection: DriverSelection) -> Result<Box<dyn SdrDriver>> {
    match selection {
        DriverSelection::Noop => Ok(Box::new(NoopSdr::new())),
        DriverSelection::External => Err(Error::Config(
            "external driver must be injected by the embedding application".into(),
        )),
    }
}
