// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Transmit-side framing helpers for loopback testing and signal synthesis.

use ukhas_core::decode::MAX_PAYLOAD_LEN;

use crate::crc::{crc_xmodem, CRC_SEED};
use crate::framer::SYNC_WORD;

/// Preamble byte sent before the sync word.
pub const PREAMBLE_BYTE: u8 = 0xAA;

/// Build `[L, payload.., CRC_HI, CRC_LO]` with the checksum inverted the way
/// the receiver expects it. Returns `None` for payloads over 254 bytes.
pub fn encode_frame(payload: &[u8]) -> Option<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return None;
    }
    let mut frame = Vec::with_capacity(payload.len() + 3);
    frame.push(payload.len() as u8);
    frame.extend_from_slice(payload);
    let crc = crc_xmodem(CRC_SEED, &frame);
    frame.extend_from_slice(&(0xFFFF - crc).to_be_bytes());
    Some(frame)
}

/// MSB-first bits of `bytes`.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|&b| (0..8).rev().map(move |i| (b >> i) & 1 == 1))
        .collect()
}

/// Full on-air bit stream: preamble, sync word, then the framed payload.
pub fn frame_bits(preamble_len: usize, payload: &[u8]) -> Option<Vec<bool>> {
    let frame = encode_frame(payload)?;
    let mut bytes = vec![PREAMBLE_BYTE; preamble_len];
    bytes.extend_from_slice(&SYNC_WORD.to_be_bytes());
    bytes.extend_from_slice(&frame);
    Some(bytes_to_bits(&bytes))
}

/// Render bits as an ideal two-level FSK discriminator output.
pub fn bits_to_samples(bits: &[bool], ratio: u32, amplitude: i16) -> Vec<i16> {
    bits.iter()
        .flat_map(|&bit| {
            let level = if bit { amplitude } else { -amplitude };
            std::iter::repeat(level).take(ratio as usize)
        })
        .collect()
}

/// Serialize samples the way `rtl_fm` writes them (s16le).
pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}
