// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Placeholder driver for delegated-RF deployments.

use num_complex::Complex;

use crate::error::Result;

use super::SdrDriver;

/// Driver that accepts every operation and transmits nothing.
///
/// Paired with the subprocess encoder, which carries the samples to the
/// air itself; the pipeline still needs a driver object to probe and to
/// satisfy the monitor, and this one is always healthy.
#[derive(Debug, Default)]
pub struct NoopSdr;

impl NoopSdr {
    pub fn new() -> Self {
        Self
    }
}

impl SdrDriver for NoopSdr {
    fn connect(&mut self) -> Result<bool> {
        log::info!("[sdr] noop driver connect (external flowgraph owns the RF path)");
        Ok(true)
    }

    fn disconnect(&mut self) {
        log::info!("[sdr] noop driver disconnect");
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn configure(
        &mut self,
        frequency_mhz: f64,
        sample_rate_mhz: f64,
        if_gain_db: f64,
        tx_power_dbm: f64,
    ) -> Result<()> {
        log::debug!(
            "[sdr] noop configure: {} MHz, {} MHz sample rate, {} dB IF, {} dBm",
            frequency_mhz,
            sample_rate_mhz,
            if_gain_db,
            tx_power_dbm
        );
        Ok(())
    }

    fn transmit(&mut self, iq_samples: &[Complex<f32>]) -> Result<()> {
        log::debug!("[sdr] noop transmit of {} samples dropped", iq_samples.len());
        Ok(())
    }
}
