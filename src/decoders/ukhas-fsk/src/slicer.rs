// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Adaptive-threshold bit slicer for FM-demodulated FSK samples.
//!
//! The threshold is a moving average over roughly eight bit periods, which
//! assumes the transmitted stream has enough transitions to stay centred.

use thiserror::Error;

/// UKHASnet layer-1 bit rate.
pub const BIT_RATE: u32 = 2_000;

/// Bit periods covered by the threshold moving average.
const THRESHOLD_WINDOW_BITS: i64 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleRateError {
    #[error("Illegal sampling rate - {sample_rate} Hz: must be at least {min} Hz")]
    TooLow { sample_rate: u32, min: u32 },

    #[error("Illegal sampling rate - {sample_rate} Hz: must be a multiple of {bit_rate} Hz")]
    NotMultiple { sample_rate: u32, bit_rate: u32 },
}

/// Validate `sample_rate` and return the number of samples per bit.
pub fn oversampling_ratio(sample_rate: u32) -> Result<u32, SampleRateError> {
    let min = 2 * BIT_RATE;
    if sample_rate < min {
        return Err(SampleRateError::TooLow { sample_rate, min });
    }
    if sample_rate % BIT_RATE != 0 {
        return Err(SampleRateError::NotMultiple {
            sample_rate,
            bit_rate: BIT_RATE,
        });
    }
    Ok(sample_rate / BIT_RATE)
}

#[derive(Debug, Clone)]
pub struct BitSlicer {
    ratio: u32,
    window: i64,
    threshold: i16,
    countdown: u32,
}

impl BitSlicer {
    pub fn new(sample_rate: u32) -> Result<Self, SampleRateError> {
        let ratio = oversampling_ratio(sample_rate)?;
        Ok(Self {
            ratio,
            window: THRESHOLD_WINDOW_BITS * i64::from(ratio),
            threshold: 0,
            countdown: ratio,
        })
    }

    /// Samples per bit.
    pub fn ratio(&self) -> u32 {
        self.ratio
    }

    pub fn threshold(&self) -> i16 {
        self.threshold
    }

    /// Feed one sample. Returns a bit once every `ratio` samples.
    pub fn push_sample(&mut self, sample: i16) -> Option<bool> {
        // Weighted mean of two i16 values always fits back into i16.
        let acc = i64::from(sample) + (self.window - 1) * i64::from(self.threshold);
        self.threshold = (acc / self.window) as i16;

        self.countdown -= 1;
        if self.countdown >= 1 {
            return None;
        }
        self.countdown = self.ratio;
        Some(sample > self.threshold)
    }
}
