// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! UKHASnet 2 kbit/s FSK packet decoder.
//!
//! Consumes FM-discriminator output (as produced by `rtl_fm`) and emits
//! checksum-validated packets. The pipeline is fully synchronous: each
//! sample updates the slicer, and at bit boundaries the bit is pushed through
//! the framer and packet assembler before the next sample is taken.

pub mod crc;
pub mod frame;
pub mod framer;
pub mod packet;
pub mod reader;
pub mod slicer;

use ukhas_core::decode::DecodeEvent;

pub use framer::{FramerState, SyncFramer, SYNC_WORD, SYNC_WORD_INVERTED};
pub use packet::{AssemblerState, ByteOutcome, PacketAssembler};
pub use reader::SampleReader;
pub use slicer::{oversampling_ratio, BitSlicer, SampleRateError, BIT_RATE};

/// Counters accumulated over one decoder run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    pub samples: u64,
    pub bits: u64,
    pub syncs: u64,
    pub packets: u64,
    pub crc_errors: u64,
    pub oversize: u64,
}

impl DecoderStats {
    fn record(&mut self, event: &DecodeEvent) {
        match event {
            DecodeEvent::SyncAcquired { .. } => self.syncs += 1,
            DecodeEvent::LengthDeclared { .. } => {}
            DecodeEvent::Packet(_) => self.packets += 1,
            DecodeEvent::CrcMismatch { .. } => self.crc_errors += 1,
            DecodeEvent::Oversize { .. } => self.oversize += 1,
        }
    }
}

/// Slicer and framer composed into one sample-driven decoder.
pub struct UkhasDecoder {
    slicer: BitSlicer,
    framer: SyncFramer,
    pending: Option<u8>,
    stats: DecoderStats,
}

impl UkhasDecoder {
    /// Fails unless `sample_rate` is a multiple of [`BIT_RATE`] and at least
    /// twice it.
    pub fn new(sample_rate: u32) -> Result<Self, SampleRateError> {
        Ok(Self {
            slicer: BitSlicer::new(sample_rate)?,
            framer: SyncFramer::new(),
            pending: None,
            stats: DecoderStats::default(),
        })
    }

    pub fn slicer(&self) -> &BitSlicer {
        &self.slicer
    }

    pub fn framer(&self) -> &SyncFramer {
        &self.framer
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    pub fn process_sample(&mut self, sample: i16) -> Option<DecodeEvent> {
        self.stats.samples += 1;
        let bit = self.slicer.push_sample(sample)?;
        self.stats.bits += 1;
        let event = self.framer.push_bit(bit)?;
        self.stats.record(&event);
        Some(event)
    }

    /// Decode a chunk of raw s16le bytes. An odd trailing byte is held
    /// until the next call.
    pub fn process_bytes(&mut self, bytes: &[u8]) -> Vec<DecodeEvent> {
        let mut events = Vec::new();
        let mut rest = bytes;

        if let Some(lo) = self.pending.take() {
            match rest.split_first() {
                Some((&hi, tail)) => {
                    events.extend(self.process_sample(i16::from_le_bytes([lo, hi])));
                    rest = tail;
                }
                None => {
                    self.pending = Some(lo);
                    return events;
                }
            }
        }

        let mut pairs = rest.chunks_exact(2);
        for pair in &mut pairs {
            events.extend(self.process_sample(i16::from_le_bytes([pair[0], pair[1]])));
        }
        if let [odd] = pairs.remainder() {
            self.pending = Some(*odd);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::{crc_xmodem, CRC_SEED};
    use crate::frame::{bits_to_samples, bytes_to_bits, frame_bits, samples_to_bytes};
    use ukhas_core::decode::MAX_PAYLOAD_LEN;

    const AMPLITUDE: i16 = 6_000;

    fn modulate(bits: &[bool], sample_rate: u32) -> Vec<i16> {
        let ratio = oversampling_ratio(sample_rate).unwrap();
        bits_to_samples(bits, ratio, AMPLITUDE)
    }

    fn decode(decoder: &mut UkhasDecoder, samples: &[i16]) -> Vec<DecodeEvent> {
        samples
            .iter()
            .filter_map(|&s| decoder.process_sample(s))
            .collect()
    }

    fn packets(events: &[DecodeEvent]) -> Vec<Vec<u8>> {
        events
            .iter()
            .filter_map(|e| match e {
                DecodeEvent::Packet(pkt) => Some(pkt.payload().to_vec()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_rejects_invalid_sample_rate() {
        assert!(UkhasDecoder::new(3_000).is_err());
        assert!(UkhasDecoder::new(64_000).is_ok());
    }

    #[test]
    fn test_end_to_end_abc() {
        let payload = b"ABC";
        let mut frame = vec![0x03, b'A', b'B', b'C'];
        let crc = 0xFFFF - crc_xmodem(CRC_SEED, &frame);
        frame.extend_from_slice(&crc.to_be_bytes());

        let mut bytes = vec![0xAA; 4];
        bytes.extend_from_slice(&[0x2D, 0xAA]);
        bytes.extend_from_slice(&frame);
        bytes.extend_from_slice(&[0xAA; 2]);

        let mut decoder = UkhasDecoder::new(64_000).unwrap();
        let events = decode(&mut decoder, &modulate(&bytes_to_bits(&bytes), 64_000));
        assert_eq!(packets(&events), vec![payload.to_vec()]);
        assert_eq!(decoder.stats().packets, 1);
        assert_eq!(decoder.stats().syncs, 1);
    }

    #[test]
    fn test_round_trip_lengths() {
        for len in [0usize, 1, 3, 64, MAX_PAYLOAD_LEN] {
            let payload: Vec<u8> = (0..len).map(|i| (i * 7 + 1) as u8).collect();
            let bits = frame_bits(4, &payload).unwrap();
            for sample_rate in [4_000, 64_000] {
                let mut decoder = UkhasDecoder::new(sample_rate).unwrap();
                let events = decode(&mut decoder, &modulate(&bits, sample_rate));
                assert_eq!(
                    packets(&events),
                    vec![payload.clone()],
                    "len {} at {} Hz",
                    len,
                    sample_rate
                );
            }
        }
    }

    #[test]
    fn test_payload_bit_flip_suppresses_packet() {
        let payload = b"2aT24.5[AB]";
        let clean = frame_bits(4, payload).unwrap();
        // Preamble + sync + length byte come first.
        let payload_start = (4 + 2 + 1) * 8;
        for bit in [0, 5, 8 * payload.len() - 1] {
            let mut bits = clean.clone();
            bits[payload_start + bit] = !bits[payload_start + bit];
            let mut decoder = UkhasDecoder::new(8_000).unwrap();
            let events = decode(&mut decoder, &modulate(&bits, 8_000));
            assert!(packets(&events).is_empty());
            match events.last() {
                Some(DecodeEvent::CrcMismatch { received, computed }) => {
                    assert_ne!(received, computed)
                }
                other => panic!("unexpected event {:?}", other),
            }
            assert_eq!(decoder.stats().crc_errors, 1);
            assert_eq!(decoder.framer().state(), FramerState::Searching);
        }
    }

    #[test]
    fn test_oversize_length_emits_no_packet() {
        let mut bytes = vec![0xAA; 4];
        bytes.extend_from_slice(&SYNC_WORD.to_be_bytes());
        bytes.extend_from_slice(&[0xFF, b'A', b'B', b'C']);
        let mut decoder = UkhasDecoder::new(64_000).unwrap();
        let events = decode(&mut decoder, &modulate(&bytes_to_bits(&bytes), 64_000));
        assert!(packets(&events).is_empty());
        assert!(events.contains(&DecodeEvent::Oversize { length: 255 }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, DecodeEvent::LengthDeclared { .. })));
        assert_eq!(decoder.stats().oversize, 1);
    }

    #[test]
    fn test_noise_never_wedges_decoder() {
        // Deterministic pseudo-random noise, then a clean frame behind a
        // preamble long enough to flush any session opened by the noise.
        let mut state = 0x1234_5678u32;
        let mut samples: Vec<i16> = (0..200_000)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as i16
            })
            .collect();
        samples.extend(modulate(&frame_bits(300, b"alive").unwrap(), 64_000));

        let mut decoder = UkhasDecoder::new(64_000).unwrap();
        let events = decode(&mut decoder, &samples);
        assert_eq!(packets(&events).last(), Some(&b"alive".to_vec()));
    }

    #[test]
    fn test_process_bytes_carries_odd_byte() {
        let samples = modulate(&frame_bits(4, b"split").unwrap(), 8_000);
        let bytes = samples_to_bytes(&samples);

        let mut decoder = UkhasDecoder::new(8_000).unwrap();
        let mut events = Vec::new();
        for chunk in bytes.chunks(7) {
            events.extend(decoder.process_bytes(chunk));
        }
        assert_eq!(packets(&events), vec![b"split".to_vec()]);
        assert_eq!(decoder.stats().samples, samples.len() as u64);
    }

    #[test]
    fn test_stats_count_bits() {
        let mut decoder = UkhasDecoder::new(8_000).unwrap();
        for _ in 0..40 {
            decoder.process_sample(0);
        }
        assert_eq!(decoder.stats().samples, 40);
        assert_eq!(decoder.stats().bits, 10);
    }
}
