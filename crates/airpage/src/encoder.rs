// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encoder seam and variant registry.
//!
//! Encoders are selected by a configuration key from a closed set; there
//! is no runtime class loading. The baseband variant produces IQ samples
//! for the pipeline's own driver, while the subprocess variant hands the
//! whole RF path to an external flowgraph and therefore implements
//! [`MessageEncoder::encode_and_transmit`] instead of
//! [`MessageEncoder::encode`].

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::pocsag::BasebandEncoder;
use crate::request::MessageType;
use crate::sdr::SubprocessEncoder;

/// A POCSAG message encoder.
pub trait MessageEncoder: Send {
    /// Encode one message for one RIC into IQ samples.
    fn encode(
        &self,
        ric: &str,
        message: &str,
        message_type: MessageType,
        baud_rate: u32,
    ) -> Result<Vec<Complex<f32>>>;

    /// Whether this encoder owns the RF path end to end. When true the
    /// worker calls [`encode_and_transmit`] and skips driver
    /// configuration entirely.
    ///
    /// [`encode_and_transmit`]: MessageEncoder::encode_and_transmit
    fn handles_transmit(&self) -> bool {
        false
    }

    /// Encode and transmit in one step, bypassing the driver.
    #[allow(clippy::too_many_arguments)]
    fn encode_and_transmit(
        &self,
        ric: &str,
        message: &str,
        message_type: MessageType,
        baud_rate: u32,
        frequency_mhz: f64,
        if_gain_db: f64,
        tx_power_dbm: f64,
    ) -> Result<()> {
        let _ = (
            ric,
            message,
            message_type,
            baud_rate,
            frequency_mhz,
            if_gain_db,
            tx_power_dbm,
        );
        Err(Error::Encoding(
            "this encoder does not own the RF path".into(),
        ))
    }
}

/// Closed set of encoder variants selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderSelection {
    /// In-process encoder with BCH forward error correction and FSK
    /// modulation.
    #[default]
    Baseband,
    /// Delegate encoding and transmission to an external flowgraph.
    Subprocess,
}

/// Build the configured encoder variant.
pub fn build_encoder(config: &Config) -> Box<dyn MessageEncoder> {
    match config.registry.encoder {
        EncoderSelection::Baseband => Box::new(BasebandEncoder::from_config(config)),
        EncoderSelection::Subprocess => Box::new(SubprocessEncoder::new(config.subprocess.clone())),
    }
}
