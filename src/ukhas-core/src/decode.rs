// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Shared types for decoded UKHASnet traffic.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Largest payload a length byte may declare.
pub const MAX_PAYLOAD_LEN: usize = 254;

/// A validated packet payload.
///
/// The payload is kept in a fixed-capacity buffer so that the decoder never
/// allocates per packet.
#[derive(Clone)]
pub struct Packet {
    len: u8,
    data: [u8; MAX_PAYLOAD_LEN],
    crc: u16,
}

impl Packet {
    /// Build a packet from a payload slice and the checksum that validated it.
    /// Returns `None` when the payload exceeds [`MAX_PAYLOAD_LEN`].
    pub fn new(payload: &[u8], crc: u16) -> Option<Self> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return None;
        }
        let mut data = [0u8; MAX_PAYLOAD_LEN];
        data[..payload.len()].copy_from_slice(payload);
        Some(Self {
            len: payload.len() as u8,
            data,
            crc,
        })
    }

    /// Take ownership of a full-capacity buffer holding `len` payload bytes.
    /// `len` is capped at [`MAX_PAYLOAD_LEN`].
    pub fn from_buffer(data: [u8; MAX_PAYLOAD_LEN], len: u8, crc: u16) -> Self {
        Self {
            len: len.min(MAX_PAYLOAD_LEN as u8),
            data,
            crc,
        }
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Raw payload bytes, unmodified.
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    pub fn crc(&self) -> u16 {
        self.crc
    }
}

impl PartialEq for Packet {
    fn eq(&self, other: &Self) -> bool {
        self.crc == other.crc && self.payload() == other.payload()
    }
}

impl Eq for Packet {}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("len", &self.len)
            .field("payload", &String::from_utf8_lossy(self.payload()))
            .field("crc", &format_args!("{:04X}", self.crc))
            .finish()
    }
}

impl Serialize for Packet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Packet", 4)?;
        s.serialize_field("length", &self.len)?;
        s.serialize_field("payload", &String::from_utf8_lossy(self.payload()))?;
        s.serialize_field("payload_hex", &hex::encode(self.payload()))?;
        s.serialize_field("crc", &self.crc)?;
        s.end()
    }
}

/// Everything the decode pipeline reports to its driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecodeEvent {
    /// The sync register matched the sync word or its complement.
    SyncAcquired { register: u16 },
    /// The first byte after sync declared a payload length.
    LengthDeclared { length: u8 },
    /// A packet passed its checksum.
    Packet(Packet),
    /// Received and computed checksums differ; the packet was dropped.
    CrcMismatch { received: u16, computed: u16 },
    /// The declared length exceeds [`MAX_PAYLOAD_LEN`].
    Oversize { length: u8 },
}

impl DecodeEvent {
    /// True for events that are only reported in verbose mode.
    pub fn is_diagnostic(&self) -> bool {
        !matches!(self, DecodeEvent::Packet(_))
    }
}
