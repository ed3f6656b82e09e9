// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::io::{self, ErrorKind, Read};

/// Iterator over signed 16-bit little-endian samples from a byte stream.
///
/// Ends at end-of-input. A dangling odd byte at the end is dropped.
pub struct SampleReader<R> {
    inner: R,
    done: bool,
}

impl<R: Read> SampleReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, done: false }
    }
}

impl<R: Read> Iterator for SampleReader<R> {
    type Item = io::Result<i16>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut pair = [0u8; 2];
        match self.inner.read_exact(&mut pair) {
            Ok(()) => Some(Ok(i16::from_le_bytes(pair))),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
