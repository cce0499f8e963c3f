// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime configuration for the transmission pipeline.
//!
//! The crate only defines the configuration tree, defaults, and
//! validation; reading it from a file or database belongs to the
//! embedding application. All structs derive `Deserialize` with
//! per-field defaults so partial documents merge over the defaults.

use serde::{Deserialize, Serialize};

use crate::encoder::EncoderSelection;
use crate::error::{Error, Result};
use crate::pocsag::SUPPORTED_BAUD_RATES;
use crate::sdr::DriverSelection;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub system: SystemConfig,
    pub pocsag: PocsagConfig,
    pub subprocess: SubprocessConfig,
    pub registry: RegistryConfig,
}

/// Radio-side parameters shared by the worker and the device monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Default carrier frequency in MHz.
    pub frequency_mhz: f64,
    /// Transmit power in dBm.
    pub transmit_power_dbm: f64,
    /// IF gain in dB.
    pub if_gain_db: f64,
    /// Complex sample rate in MHz.
    pub sample_rate_mhz: f64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            frequency_mhz: 929.6125,
            transmit_power_dbm: 10.0,
            if_gain_db: 40.0,
            sample_rate_mhz: 12.0,
        }
    }
}

impl SystemConfig {
    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_mhz * 1_000_000.0
    }
}

/// Protocol-level parameters of the baseband encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PocsagConfig {
    /// Default baud rate for requests that do not override it.
    pub baud_rate: u32,
    /// FSK deviation in kHz.
    pub deviation_khz: f64,
    /// Swap mark and space tones.
    pub invert: bool,
}

impl Default for PocsagConfig {
    fn default() -> Self {
        Self {
            baud_rate: 1200,
            deviation_khz: 4.5,
            invert: false,
        }
    }
}

impl PocsagConfig {
    pub fn deviation_hz(&self) -> f64 {
        self.deviation_khz * 1_000.0
    }
}

/// Parameters of the subprocess-delegated encoder, which hands the whole
/// RF path to an external flowgraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubprocessConfig {
    /// Interpreter used to launch the flowgraph.
    pub interpreter: String,
    /// Path of the flowgraph script.
    pub script_path: String,
    /// Skip the subprocess but still report success. Explicit key so
    /// bench runs never depend on ambient environment variables.
    pub dry_run: bool,
    /// Sub-RIC passed through to the flowgraph.
    pub subric: u32,
    /// AF gain forwarded via the child environment.
    pub af_gain: f64,
    /// Maximum deviation in Hz forwarded via the child environment.
    pub max_deviation_hz: f64,
    /// Symbol rate forwarded via the child environment.
    pub symbol_rate: u32,
    /// Sample rate in Hz forwarded via the child environment.
    pub sample_rate_hz: u64,
}

impl Default for SubprocessConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".into(),
            script_path: "flowgraphs/pocsag_sender.py".into(),
            dry_run: false,
            subric: 0,
            af_gain: 190.0,
            max_deviation_hz: 4_500.0,
            symbol_rate: 38_400,
            sample_rate_hz: 12_000_000,
        }
    }
}

/// Which encoder and driver variants to build at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub encoder: EncoderSelection,
    pub driver: DriverSelection,
}

impl Config {
    /// Validate ranges before the pipeline starts. The bounds are those
    /// of common wideband transmitter front ends.
    pub fn validate(&self) -> Result<()> {
        let freq = self.system.frequency_mhz;
        if !(1.0..=6000.0).contains(&freq) {
            return Err(Error::Config(format!(
                "frequency must be between 1 and 6000 MHz, got {}",
                freq
            )));
        }

        let power = self.system.transmit_power_dbm;
        if !(-10.0..=15.0).contains(&power) {
            return Err(Error::Config(format!(
                "transmit power must be between -10 and 15 dBm, got {}",
                power
            )));
        }

        let rate = self.system.sample_rate_mhz;
        if !(2.0..=30.0).contains(&rate) {
            return Err(Error::Config(format!(
                "sample rate must be between 2 and 30 MHz, got {}",
                rate
            )));
        }

        if !SUPPORTED_BAUD_RATES.contains(&self.pocsag.baud_rate) {
            return Err(Error::Config(format!(
                "baud rate must be one of {:?}, got {}",
                SUPPORTED_BAUD_RATES, self.pocsag.baud_rate
            )));
        }

        Ok(())
    }
}
