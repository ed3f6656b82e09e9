// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! CRC-16 (polynomial 0x1021, MSB first) as used by RFM69 packet engines.

/// Start value used by the RFM69 radios for every packet.
pub const CRC_SEED: u16 = 0x1D0F;

const CRC_POLY: u16 = 0x1021;

/// Fold one byte into a running XMODEM-style checksum.
pub fn crc_xmodem_update(crc: u16, byte: u8) -> u16 {
    let mut crc = crc ^ (u16::from(byte) << 8);
    for _ in 0..8 {
        if crc & 0x8000 != 0 {
            crc = (crc << 1) ^ CRC_POLY;
        } else {
            crc <<= 1;
        }
    }
    crc
}

/// Checksum of a whole byte sequence starting from `seed`.
pub fn crc_xmodem(seed: u16, bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(seed, |crc, &byte| crc_xmodem_update(crc, byte))
}
