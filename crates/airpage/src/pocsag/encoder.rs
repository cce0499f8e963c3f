// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process POCSAG encoder producing IQ samples.

use num_complex::Complex;

use crate::config::Config;
use crate::encoder::MessageEncoder;
use crate::error::{Error, Result};
use crate::fsk::FskModulator;
use crate::request::{parse_ric, MessageType};

use super::batch::{assemble_transmission, codewords_to_bits};
use super::codeword::{address_codeword, encode_alphanumeric, encode_numeric};
use super::SUPPORTED_BAUD_RATES;

/// Baseband encoder: codeword construction, batch framing, and 2-FSK
/// modulation in one pass.
#[derive(Debug, Clone)]
pub struct BasebandEncoder {
    modulator: FskModulator,
}

impl BasebandEncoder {
    pub fn new(sample_rate_hz: f64, deviation_hz: f64, invert: bool) -> Self {
        Self {
            modulator: FskModulator::new(sample_rate_hz, deviation_hz, invert),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.system.sample_rate_hz(),
            config.pocsag.deviation_hz(),
            config.pocsag.invert,
        )
    }

    /// Assemble the codeword sequence for one message without modulating.
    /// This is the bit-exact protocol layer; callers that want samples use
    /// [`MessageEncoder::encode`].
    pub fn build_codewords(
        &self,
        ric: u32,
        message: &str,
        message_type: MessageType,
    ) -> Result<Vec<u32>> {
        let address = address_codeword(ric);
        let message_cws = match message_type {
            MessageType::Alphanumeric => {
                for ch in message.chars() {
                    if !(' '..='~').contains(&ch) {
                        return Err(Error::Encoding(format!(
                            "character {:?} is not printable ASCII",
                            ch
                        )));
                    }
                }
                encode_alphanumeric(message)
            }
            MessageType::Numeric => encode_numeric(message)?,
        };
        Ok(assemble_transmission(ric, address, &message_cws))
    }
}

impl MessageEncoder for BasebandEncoder {
    fn encode(
        &self,
        ric: &str,
        message: &str,
        message_type: MessageType,
        baud_rate: u32,
    ) -> Result<Vec<Complex<f32>>> {
        // Enqueue-time validation makes failures here unreachable; treat
        // any slip-through as an encoding fault rather than panicking.
        let ric_value = parse_ric(ric).map_err(|e| Error::Encoding(e.to_string()))?;
        if !SUPPORTED_BAUD_RATES.contains(&baud_rate) {
            return Err(Error::Encoding(format!(
                "baud rate {} not supported",
                baud_rate
            )));
        }

        log::info!(
            "[pocsag] encoding message for RIC {} ({}, {} baud, {} chars)",
            ric_value,
            message_type.as_str(),
            baud_rate,
            message.len()
        );

        let codewords = self.build_codewords(ric_value, message, message_type)?;
        let bits = codewords_to_bits(&codewords);
        let samples = self.modulator.modulate(&bits, baud_rate);

        log::info!(
            "[pocsag] encoding complete: {} codeword(s), {} samples ({:.3}s at {:.1} MHz)",
            codewords.len(),
            samples.len(),
            samples.len() as f64 / self.modulator.sample_rate_hz(),
            self.modulator.sample_rate_hz() / 1e6
        );
        Ok(samples)
    }
}
