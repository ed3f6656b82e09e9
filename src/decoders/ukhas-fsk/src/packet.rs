// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Byte-level packet parser: length, payload, then a big-endian checksum.
//!
//! One session runs per sync acquisition. Every terminal outcome closes the
//! session and hands control back to the bit-level framer.

use tracing::trace;
use ukhas_core::decode::{DecodeEvent, Packet, MAX_PAYLOAD_LEN};

use crate::crc::{crc_xmodem_update, CRC_SEED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// No session open.
    Idle,
    AwaitLength,
    ReadPayload,
    ReadCrcHi,
    ReadCrcLo,
}

/// Result of feeding one byte to the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteOutcome {
    /// Session stays open. Carries the length declaration when the length
    /// byte was just consumed.
    Continue(Option<DecodeEvent>),
    /// Session closed with an accepted packet or a rejection.
    End(DecodeEvent),
}

impl ByteOutcome {
    pub fn ends_session(&self) -> bool {
        matches!(self, ByteOutcome::End(_))
    }
}

#[derive(Clone)]
pub struct PacketAssembler {
    state: AssemblerState,
    length: u8,
    offset: usize,
    buffer: [u8; MAX_PAYLOAD_LEN],
    computed_crc: u16,
    received_crc: u16,
}

impl Default for PacketAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketAssembler {
    pub fn new() -> Self {
        Self {
            state: AssemblerState::Idle,
            length: 0,
            offset: 0,
            buffer: [0; MAX_PAYLOAD_LEN],
            computed_crc: CRC_SEED,
            received_crc: 0,
        }
    }

    /// Open a fresh session. Called exactly when sync is acquired.
    pub fn start(&mut self) {
        self.state = AssemblerState::AwaitLength;
        self.length = 0;
        self.offset = 0;
        self.computed_crc = CRC_SEED;
        self.received_crc = 0;
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Payload bytes stored so far in this session.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Declared payload length (valid once past `AwaitLength`).
    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn computed_crc(&self) -> u16 {
        self.computed_crc
    }

    pub fn push_byte(&mut self, byte: u8) -> ByteOutcome {
        match self.state {
            AssemblerState::Idle => ByteOutcome::Continue(None),
            AssemblerState::AwaitLength => {
                self.length = byte;
                self.computed_crc = crc_xmodem_update(self.computed_crc, byte);
                if usize::from(byte) > MAX_PAYLOAD_LEN {
                    trace!("declared length {} exceeds {}", byte, MAX_PAYLOAD_LEN);
                    return self.close(DecodeEvent::Oversize { length: byte });
                }
                self.state = if byte == 0 {
                    AssemblerState::ReadCrcHi
                } else {
                    AssemblerState::ReadPayload
                };
                ByteOutcome::Continue(Some(DecodeEvent::LengthDeclared { length: byte }))
            }
            AssemblerState::ReadPayload => {
                self.buffer[self.offset] = byte;
                self.offset += 1;
                self.computed_crc = crc_xmodem_update(self.computed_crc, byte);
                if self.offset == usize::from(self.length) {
                    self.state = AssemblerState::ReadCrcHi;
                }
                ByteOutcome::Continue(None)
            }
            AssemblerState::ReadCrcHi => {
                self.received_crc = u16::from(byte) << 8;
                self.state = AssemblerState::ReadCrcLo;
                ByteOutcome::Continue(None)
            }
            AssemblerState::ReadCrcLo => {
                self.received_crc |= u16::from(byte);
                // The transmitted checksum arrives inverted. Unexplained, but
                // required to match captured traffic.
                let received = 0xFFFF - self.received_crc;
                let computed = self.computed_crc;
                if received != computed {
                    return self.close(DecodeEvent::CrcMismatch { received, computed });
                }
                let packet = Packet::from_buffer(self.buffer, self.length, computed);
                self.close(DecodeEvent::Packet(packet))
            }
        }
    }

    fn close(&mut self, event: DecodeEvent) -> ByteOutcome {
        self.state = AssemblerState::Idle;
        ByteOutcome::End(event)
    }
}
