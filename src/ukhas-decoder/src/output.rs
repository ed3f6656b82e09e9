// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Rendering of decode events to stdout.

use std::io::{self, Write};
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use serde_json::json;
use ukhas_core::decode::{DecodeEvent, MAX_PAYLOAD_LEN};

use crate::config::{OutputConfig, OutputFormat};

const DECODER_LABEL: &str = "ukhasnet";

pub struct EventWriter<W: Write> {
    out: W,
    format: OutputFormat,
    timestamp_format: String,
    utc: bool,
    verbose: bool,
}

impl<W: Write> EventWriter<W> {
    pub fn new(out: W, cfg: &OutputConfig, verbose: bool) -> Self {
        Self {
            out,
            format: cfg.format,
            timestamp_format: cfg.timestamp_format.clone(),
            utc: cfg.utc,
            verbose,
        }
    }

    /// Write one event stamped with the current time. Diagnostics are
    /// skipped unless verbose.
    pub fn write_event(&mut self, event: &DecodeEvent) -> io::Result<()> {
        self.write_event_at(event, Utc::now())
    }

    pub fn write_event_at(&mut self, event: &DecodeEvent, now: DateTime<Utc>) -> io::Result<()> {
        if event.is_diagnostic() && !self.verbose {
            return Ok(());
        }
        match self.format {
            OutputFormat::Text => self.write_text(event, now)?,
            OutputFormat::Json => self.write_json(event, now)?,
        }
        self.out.flush()
    }

    /// End-of-run line. JSON output carries no summary.
    pub fn write_summary(&mut self, samples: u64, elapsed: Duration) -> io::Result<()> {
        if self.format != OutputFormat::Text {
            return Ok(());
        }
        writeln!(self.out, "{} samples in {} sec", samples, elapsed.as_secs())?;
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_timestamp(&mut self, now: DateTime<Utc>) -> io::Result<()> {
        if self.utc {
            write!(self.out, "{} ", now.format(&self.timestamp_format))
        } else {
            let local = now.with_timezone(&Local);
            write!(self.out, "{} ", local.format(&self.timestamp_format))
        }
    }

    fn write_text(&mut self, event: &DecodeEvent, now: DateTime<Utc>) -> io::Result<()> {
        self.write_timestamp(now)?;
        match event {
            DecodeEvent::Packet(packet) => {
                // Payload goes out verbatim, it is not necessarily text.
                self.out.write_all(b"PACKET ")?;
                self.out.write_all(packet.payload())?;
                self.out.write_all(b"\n")
            }
            DecodeEvent::SyncAcquired { register } => writeln!(self.out, "Sync: {:04X}", register),
            DecodeEvent::LengthDeclared { length } => {
                writeln!(self.out, "Parsing {} bytes", length)
            }
            DecodeEvent::CrcMismatch { received, computed } => writeln!(
                self.out,
                "CRC mismatch: read({:04X}), computed({:04X})",
                received, computed
            ),
            DecodeEvent::Oversize { length } => {
                writeln!(self.out, "Length: {} > {}, skip", length, MAX_PAYLOAD_LEN)
            }
        }
    }

    fn write_json(&mut self, event: &DecodeEvent, now: DateTime<Utc>) -> io::Result<()> {
        let line = json!({
            "ts_ms": now.timestamp_millis(),
            "decoder": DECODER_LABEL,
            "payload": event,
        });
        serde_json::to_writer(&mut self.out, &line)?;
        self.out.write_all(b"\n")
    }
}
