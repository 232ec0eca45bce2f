use std::io;

/// Packs bits most significant bit first into a byte stream.
///
/// Whole bytes are handed to the inner writer as soon as they are complete,
/// a partial byte stays pending until [`align`](Self::align) or
/// [`finish`](Self::finish) pads it with zeros.
#[derive(Debug)]
#[must_use]
pub struct BitWriter<W> {
    writer: W,
    pending: u8,
    pending_len: u8,
    written: u64,
}

impl<W: Default> Default for BitWriter<W> {
    fn default() -> Self {
        Self::new(W::default())
    }
}

impl<W: io::Write> BitWriter<W> {
    /// Writes a single bit.
    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        self.write_bits(bit as u64, 1)
    }

    /// Writes the low `count` bits of `bits`, most significant bit first.
    ///
    /// Fails with [`io::ErrorKind::InvalidData`] if `bits` does not fit in
    /// `count` bits.
    pub fn write_bits(&mut self, bits: u64, count: u8) -> io::Result<()> {
        let count = count.min(64);
        if count < 64 && bits >> count != 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "bits too large to write"));
        }

        let mut remaining = count;
        while remaining > 0 {
            let free = 8 - self.pending_len;
            let take = free.min(remaining);
            remaining -= take;

            let chunk = ((bits >> remaining) & ((1 << take) - 1)) as u8;
            self.pending |= chunk << (free - take);
            self.pending_len += take;
            self.written += take as u64;

            if self.pending_len == 8 {
                self.writer.write_all(&[self.pending])?;
                self.pending = 0;
                self.pending_len = 0;
            }
        }

        Ok(())
    }

    /// Pads with zero bits up to the byte boundary and returns the
    /// underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.align()?;
        Ok(self.writer)
    }

    /// Pads with zero bits up to the byte boundary
    pub fn align(&mut self) -> io::Result<()> {
        if !self.is_aligned() {
            self.write_bits(0, 8 - self.pending_len)?;
        }

        Ok(())
    }
}

impl<W> BitWriter<W> {
    /// Wraps `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            pending: 0,
            pending_len: 0,
            written: 0,
        }
    }

    /// Number of bits pending in the current byte (0-7)
    #[inline(always)]
    #[must_use]
    pub const fn bit_pos(&self) -> u8 {
        self.pending_len
    }

    /// Total number of bits written, including any pending partial byte.
    #[inline(always)]
    #[must_use]
    pub const fn bits_written(&self) -> u64 {
        self.written
    }

    /// `true` when no partial byte is pending.
    #[inline(always)]
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.pending_len == 0
    }

    /// The inner writer. Pending bits are not in it yet.
    #[inline(always)]
    #[must_use]
    pub const fn get_ref(&self) -> &W {
        &self.writer
    }
}

impl<W: io::Write> io::Write for BitWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.is_aligned() {
            let n = self.writer.write(buf)?;
            self.written += n as u64 * 8;
            return Ok(n);
        }

        for &byte in buf {
            self.write_bits(byte as u64, 8)?;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
