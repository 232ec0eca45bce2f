//! Emulation prevention handling for H.264/H.265 style NAL payloads.
//!
//! Inside a NAL unit the sequence `00 00` followed by a byte `<= 03` is
//! escaped by inserting `03` after the zeros. Parsers need the unescaped
//! RBSP, containers that store raw NAL units keep the escaped form.

use std::io;

/// A wrapper around a [`io::Read`] or [`io::Write`] that removes or inserts
/// emulation prevention bytes, when reading or writing respectively.
///
/// Only one byte of the inner io is touched per step, so the inner reader or
/// writer should be buffered (or in memory).
#[derive(Debug)]
pub struct EmulationPreventionIo<I> {
    inner: I,
    zero_count: u8,
}

impl<I> EmulationPreventionIo<I> {
    /// Wraps `inner`.
    pub const fn new(inner: I) -> Self {
        Self { inner, zero_count: 0 }
    }

    /// Returns the wrapped io
    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: io::Write> io::Write for EmulationPreventionIo<I> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            if self.zero_count >= 2 && byte <= 0x03 {
                self.inner.write_all(&[0x03])?;
                self.zero_count = 0;
            }

            self.inner.write_all(&[byte])?;
            if byte == 0x00 {
                self.zero_count += 1;
            } else {
                self.zero_count = 0;
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<I: io::Read> io::Read for EmulationPreventionIo<I> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut read_size = 0;
        let mut one_byte = [0; 1];
        while read_size < buf.len() {
            if self.inner.read(&mut one_byte)? == 0 {
                break;
            }

            let byte = one_byte[0];
            match byte {
                0x03 if self.zero_count >= 2 => {
                    self.zero_count = 0;
                    continue;
                }
                0x00 => self.zero_count = self.zero_count.saturating_add(1),
                _ => self.zero_count = 0,
            }

            buf[read_size] = byte;
            read_size += 1;
        }

        Ok(read_size)
    }
}

/// Returns `nal` with every emulation prevention byte removed.
pub fn strip_emulation_prevention(nal: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(nal.len());
    let mut zero_count = 0u8;

    for &byte in nal {
        if byte == 0x03 && zero_count >= 2 {
            zero_count = 0;
            continue;
        }

        if byte == 0x00 {
            zero_count = zero_count.saturating_add(1);
        } else {
            zero_count = 0;
        }
        out.push(byte);
    }

    out
}
