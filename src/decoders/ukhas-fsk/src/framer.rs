// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Bit-level sync search and byte framing.
//!
//! While searching, every bit is shifted into a 16-bit register and compared
//! against the sync word. Once synced, bits are grouped MSB first into bytes
//! and handed to the [`PacketAssembler`] until it closes the session.

use tracing::{debug, trace};
use ukhas_core::decode::DecodeEvent;

use crate::packet::{ByteOutcome, PacketAssembler};

/// RFM69 sync word configured on UKHASnet nodes.
pub const SYNC_WORD: u16 = 0x2DAA;
/// Complement of [`SYNC_WORD`], accepted as well.
pub const SYNC_WORD_INVERTED: u16 = 0xFFFF - SYNC_WORD;

const BITS_PER_BYTE: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramerState {
    Searching,
    Synced,
}

#[derive(Clone)]
pub struct SyncFramer {
    state: FramerState,
    sync_register: u16,
    byte: u8,
    bits_remaining: u8,
    assembler: PacketAssembler,
}

impl Default for SyncFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncFramer {
    pub fn new() -> Self {
        Self {
            state: FramerState::Searching,
            sync_register: 0,
            byte: 0,
            bits_remaining: BITS_PER_BYTE,
            assembler: PacketAssembler::new(),
        }
    }

    pub fn state(&self) -> FramerState {
        self.state
    }

    /// Most recent bits seen while searching, newest in the LSB.
    pub fn sync_register(&self) -> u16 {
        self.sync_register
    }

    /// Bits still needed to complete the current byte.
    pub fn bits_remaining(&self) -> u8 {
        self.bits_remaining
    }

    pub fn assembler(&self) -> &PacketAssembler {
        &self.assembler
    }

    pub fn push_bit(&mut self, bit: bool) -> Option<DecodeEvent> {
        match self.state {
            FramerState::Searching => self.search(bit),
            FramerState::Synced => self.accumulate(bit),
        }
    }

    fn search(&mut self, bit: bool) -> Option<DecodeEvent> {
        self.sync_register = (self.sync_register << 1) | u16::from(bit);
        if self.sync_register != SYNC_WORD && self.sync_register != SYNC_WORD_INVERTED {
            return None;
        }
        // Bits after an inverted sync word are read with normal polarity.
        trace!("sync word {:04X} matched", self.sync_register);
        self.state = FramerState::Synced;
        self.bits_remaining = BITS_PER_BYTE;
        self.assembler.start();
        Some(DecodeEvent::SyncAcquired {
            register: self.sync_register,
        })
    }

    fn accumulate(&mut self, bit: bool) -> Option<DecodeEvent> {
        self.byte = (self.byte << 1) | u8::from(bit);
        self.bits_remaining -= 1;
        if self.bits_remaining > 0 {
            return None;
        }
        self.bits_remaining = BITS_PER_BYTE;

        match self.assembler.push_byte(self.byte) {
            ByteOutcome::Continue(event) => event,
            ByteOutcome::End(event) => {
                debug!("packet session closed, resuming sync search");
                self.state = FramerState::Searching;
                Some(event)
            }
        }
    }
}
