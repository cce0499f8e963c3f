// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transmission request records and enqueue-time validation.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pocsag::codeword::{bcd_nibble, MAX_RIC};
use crate::pocsag::SUPPORTED_BAUD_RATES;

/// Content encoding of a pager message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Printable ASCII, 7 bits per character.
    Alphanumeric,
    /// BCD digits plus `U`, `-`, `[`, `]`, and space.
    Numeric,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Alphanumeric => "alphanumeric",
            MessageType::Numeric => "numeric",
        }
    }
}

impl std::str::FromStr for MessageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "alphanumeric" => Ok(MessageType::Alphanumeric),
            "numeric" => Ok(MessageType::Numeric),
            other => Err(Error::Validation(format!(
                "message_type must be 'alphanumeric' or 'numeric', got {:?}",
                other
            ))),
        }
    }
}

/// Alphanumeric length beyond which receivers commonly truncate.
const ALPHA_TRUNCATION_HINT: usize = 80;

/// A validated transmission request. Immutable once enqueued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransmissionRequest {
    pub message_id: i64,
    /// Receiver identity codes as decimal digit strings, in delivery order.
    pub recipients: Vec<String>,
    pub message_text: String,
    pub message_type: MessageType,
    pub frequency_mhz: f64,
    pub baud_rate: u32,
}

impl TransmissionRequest {
    /// Build and validate a request. Invalid requests never reach the
    /// queue, which is what lets the encoder treat its own re-validation
    /// as a defensive check.
    pub fn new(
        message_id: i64,
        recipients: Vec<String>,
        message_text: impl Into<String>,
        message_type: MessageType,
        frequency_mhz: f64,
        baud_rate: u32,
    ) -> Result<Self> {
        let request = Self {
            message_id,
            recipients,
            message_text: message_text.into(),
            message_type,
            frequency_mhz,
            baud_rate,
        };
        request.validate()?;
        Ok(request)
    }

    /// Check every field against the protocol rules.
    pub fn validate(&self) -> Result<()> {
        if self.recipients.is_empty() {
            return Err(Error::Validation("at least one recipient is required".into()));
        }
        for ric in &self.recipients {
            parse_ric(ric)?;
        }

        if !SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            return Err(Error::Validation(format!(
                "baud rate {} not supported (expected one of {:?})",
                self.baud_rate, SUPPORTED_BAUD_RATES
            )));
        }

        if self.frequency_mhz <= 0.0 {
            return Err(Error::Validation(format!(
                "frequency must be positive, got {} MHz",
                self.frequency_mhz
            )));
        }

        match self.message_type {
            MessageType::Alphanumeric => {
                for ch in self.message_text.chars() {
                    if !(' '..='~').contains(&ch) {
                        return Err(Error::Validation(format!(
                            "alphanumeric messages must use printable ASCII, got {:?}",
                            ch
                        )));
                    }
                }
                if self.message_text.len() > ALPHA_TRUNCATION_HINT {
                    log::warn!(
                        "[request] message {} is {} characters; receivers may truncate past {}",
                        self.message_id,
                        self.message_text.len(),
                        ALPHA_TRUNCATION_HINT
                    );
                }
            }
            MessageType::Numeric => {
                for ch in self.message_text.chars() {
                    if bcd_nibble(ch).is_none() {
                        return Err(Error::Validation(format!(
                            "numeric messages may contain digits, space, U, -, [, ], got {:?}",
                            ch
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Parse a RIC digit string into its numeric value.
pub fn parse_ric(ric: &str) -> Result<u32> {
    if ric.is_empty() || ric.len() > 7 || !ric.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Validation(format!(
            "RIC must be a digit string of length 1-7, got {:?}",
            ric
        )));
    }
    let value: u32 = ric
        .parse()
        .map_err(|_| Error::Validation(format!("RIC {:?} is not a number", ric)))?;
    if value > MAX_RIC {
        return Err(Error::Validation(format!(
            "RIC {} out of range (0 to {})",
            value, MAX_RIC
        )));
    }
    Ok(value)
}
