// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Subprocess-delegated encoder.
//!
//! Spawns an external flowgraph (a GNU Radio sender script, typically)
//! that performs POCSAG encoding and RF transmission in one shot. The
//! pipeline pairs this encoder with the noop driver since there is
//! nothing left for a local driver to do.

use std::process::Command;

use num_complex::Complex;

use crate::config::SubprocessConfig;
use crate::encoder::MessageEncoder;
use crate::error::{Error, Result};
use crate::pocsag::SUPPORTED_BAUD_RATES;
use crate::request::{parse_ric, MessageType};

/// Encoder delegating the entire RF path to an external command.
#[derive(Debug, Clone)]
pub struct SubprocessEncoder {
    config: SubprocessConfig,
}

impl SubprocessEncoder {
    pub fn new(config: SubprocessConfig) -> Self {
        Self { config }
    }

    /// The argv used for a transmission, exposed for logging and tests.
    fn build_command(
        &self,
        ric: u32,
        message: &str,
        baud_rate: u32,
        frequency_mhz: f64,
        if_gain_db: f64,
    ) -> Vec<String> {
        vec![
            self.config.interpreter.clone(),
            self.config.script_path.clone(),
            "--RIC".into(),
            ric.to_string(),
            "--SubRIC".into(),
            self.config.subric.to_string(),
            "--Text".into(),
            message.to_string(),
            "--Frequency".into(),
            frequency_mhz.to_string(),
            "--Bitrate".into(),
            baud_rate.to_string(),
            "--TXGain".into(),
            if_gain_db.to_string(),
        ]
    }

    fn validate(&self, ric: &str, message: &str, baud_rate: u32) -> Result<u32> {
        let ric_value = parse_ric(ric).map_err(|e| Error::Encoding(e.to_string()))?;
        if !SUPPORTED_BAUD_RATES.contains(&baud_rate) {
            return Err(Error::Encoding(format!(
                "baud rate {} not supported",
                baud_rate
            )));
        }
        if message.is_empty() {
            return Err(Error::Encoding("message text is required".into()));
        }
        Ok(ric_value)
    }
}

impl MessageEncoder for SubprocessEncoder {
    fn encode(
        &self,
        _ric: &str,
        _message: &str,
        _message_type: MessageType,
        _baud_rate: u32,
    ) -> Result<Vec<Complex<f32>>> {
        Err(Error::Encoding(
            "subprocess encoder transmits directly; encode() is not available".into(),
        ))
    }

    fn handles_transmit(&self) -> bool {
        true
    }

    fn encode_and_transmit(
        &self,
        ric: &str,
        message: &str,
        _message_type: MessageType,
        baud_rate: u32,
        frequency_mhz: f64,
        if_gain_db: f64,
        tx_power_dbm: f64,
    ) -> Result<()> {
        let ric_value = self.validate(ric, message, baud_rate)?;
        let argv = self.build_command(ric_value, message, baud_rate, frequency_mhz, if_gain_db);

        log::info!(
            "[subprocess] invoking flowgraph: {} (dry_run={})",
            argv.join(" "),
            self.config.dry_run
        );

        if self.config.dry_run {
            // Bench mode: skip the child process but report success so the
            // request completes its normal lifecycle.
            log::info!("[subprocess] dry run enabled; skipping execution");
            return Ok(());
        }

        let status = Command::new(&argv[0])
            .args(&argv[1..])
            .env(
                "AIRPAGE_FLOWGRAPH_SAMPLE_RATE",
                self.config.sample_rate_hz.to_string(),
            )
            .env("AIRPAGE_FLOWGRAPH_AF_GAIN", self.config.af_gain.to_string())
            .env(
                "AIRPAGE_FLOWGRAPH_MAX_DEVIATION",
                self.config.max_deviation_hz.to_string(),
            )
            .env(
                "AIRPAGE_FLOWGRAPH_SYMRATE",
                self.config.symbol_rate.to_string(),
            )
            .env("AIRPAGE_FLOWGRAPH_POWER", tx_power_dbm.to_string())
            .status()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::Transmission(format!(
                        "flowgraph interpreter {:?} not found",
                        self.config.interpreter
                    ))
                } else {
                    Error::Transmission(format!("failed to spawn flowgraph: {}", e))
                }
            })?;

        if !status.success() {
            return Err(Error::Transmission(format!(
                "flowgraph exited with {}",
                status
            )));
        }

        log::info!("[subprocess] flowgraph transmission complete for RIC {}", ric_value);
        Ok(())
    }
}
