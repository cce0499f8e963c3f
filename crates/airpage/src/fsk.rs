// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! 2-FSK modulation of a bitstream into complex IQ samples.
//!
//! The samples-per-bit ratio is rarely an integer (12 MHz / 1200 baud is,
//! 12 MHz / 512 baud is not). Rounding it per bit would accumulate drift
//! and push a decoder off the bit boundary late in a long transmission, so
//! the modulator carries a fractional accumulator and stretches individual
//! bits by one sample whenever the error crosses a whole sample.

use num_complex::Complex;

/// 2-FSK modulator with continuous phase across bit boundaries.
#[derive(Debug, Clone)]
pub struct FskModulator {
    sample_rate_hz: f64,
    deviation_hz: f64,
    invert: bool,
}

impl FskModulator {
    pub fn new(sample_rate_hz: f64, deviation_hz: f64, invert: bool) -> Self {
        Self {
            sample_rate_hz,
            deviation_hz,
            invert,
        }
    }

    /// Output sample rate in Hz.
    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    /// Total sample count the modulator will produce for a bit count at a
    /// baud rate: `round(sample_rate / baud * bits)`.
    pub fn planned_samples(&self, bit_count: usize, baud_rate: u32) -> usize {
        let spb = self.sample_rate_hz / f64::from(baud_rate);
        (spb * bit_count as f64).round() as usize
    }

    /// Modulate a bitstream into IQ samples.
    ///
    /// A `1` bit shifts the carrier by `+deviation`, a `0` bit by
    /// `-deviation` (swapped when inversion is enabled). Phase is
    /// integrated per sample and never reset, so the spectrum stays clean
    /// at bit transitions.
    pub fn modulate(&self, bits: &[u8], baud_rate: u32) -> Vec<Complex<f32>> {
        let spb = self.sample_rate_hz / f64::from(baud_rate);
        let spb_base = spb as usize;
        let spb_err = spb - spb_base as f64;
        let planned = self.planned_samples(bits.len(), baud_rate);

        let mut samples = Vec::with_capacity(planned);
        let two_pi_over_sr = 2.0 * std::f64::consts::PI / self.sample_rate_hz;
        let mut phase = 0.0f64;
        let mut acc = 0.0f64;

        for &bit in bits {
            let mark = (bit != 0) != self.invert;
            let freq = if mark {
                self.deviation_hz
            } else {
                -self.deviation_hz
            };

            let mut n = spb_base;
            acc += spb_err;
            if acc >= 1.0 {
                n += 1;
                acc -= 1.0;
            }

            let phase_increment = two_pi_over_sr * freq;
            for _ in 0..n {
                phase += phase_increment;
                samples.push(Complex::new(phase.cos() as f32, phase.sin() as f32));
            }
        }

        // Accumulator rounding can land one sample past the planned count.
        if samples.len() > planned {
            samples.truncate(planned);
        }
        samples
    }
}
