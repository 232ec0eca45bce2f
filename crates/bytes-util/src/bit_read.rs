use std::io;

/// A reader that reads individual bits from a stream.
///
/// Every read fails closed: asking for bits past the end of the underlying
/// reader returns [`io::ErrorKind::UnexpectedEof`] and never yields padding.
#[derive(Debug)]
#[must_use]
pub struct BitReader<T> {
    data: T,
    bit_pos: u8,
    current_byte: u8,
    consumed: u64,
}

impl<T> BitReader<T> {
    /// Create a new BitReader from a reader
    pub const fn new(data: T) -> Self {
        Self {
            data,
            bit_pos: 0,
            current_byte: 0,
            consumed: 0,
        }
    }
}

impl<B: AsRef<[u8]>> BitReader<io::Cursor<B>> {
    /// Creates a new BitReader from a slice
    pub const fn new_from_slice(data: B) -> Self {
        Self::new(io::Cursor::new(data))
    }
}

impl<T: io::Read> BitReader<T> {
    /// Reads a single bit
    pub fn read_bit(&mut self) -> io::Result<bool> {
        if self.is_aligned() {
            self.update_byte()?;
        }

        let bit = (self.current_byte >> (7 - self.bit_pos)) & 1;

        self.bit_pos = (self.bit_pos + 1) % 8;
        self.consumed += 1;

        Ok(bit == 1)
    }

    fn update_byte(&mut self) -> io::Result<()> {
        let mut buf = [0];
        self.data.read_exact(&mut buf)?;
        self.current_byte = buf[0];
        Ok(())
    }

    /// Reads up to 64 bits, most significant bit first.
    pub fn read_bits(&mut self, count: u8) -> io::Result<u64> {
        let count = count.min(64);

        let mut bits = 0;
        for _ in 0..count {
            bits = (bits << 1) | self.read_bit()? as u64;
        }

        Ok(bits)
    }

    /// Skips `count` bits.
    ///
    /// Whole bytes are pulled straight from the underlying reader once the
    /// cursor is aligned, so skipping large reserved blocks stays cheap.
    pub fn skip_bits(&mut self, count: u64) -> io::Result<()> {
        let mut remaining = count;

        while remaining > 0 && !self.is_aligned() {
            self.read_bit()?;
            remaining -= 1;
        }

        let whole_bytes = remaining / 8;
        if whole_bytes > 0 {
            let skipped = io::copy(&mut io::Read::take(&mut self.data, whole_bytes), &mut io::sink())?;
            if skipped != whole_bytes {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "not enough bits left to skip",
                ));
            }
            self.consumed += whole_bytes * 8;
            remaining %= 8;
        }

        for _ in 0..remaining {
            self.read_bit()?;
        }

        Ok(())
    }

    /// Aligns the reader to the next byte boundary
    #[inline(always)]
    pub fn align(&mut self) -> io::Result<()> {
        // The next read_bit call pulls a fresh byte.
        if !self.is_aligned() {
            self.consumed += (8 - self.bit_pos) as u64;
            self.bit_pos = 0;
        }
        Ok(())
    }
}

impl<T> BitReader<T> {
    /// Returns the underlying reader
    #[inline(always)]
    #[must_use]
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Returns a reference to the underlying reader
    #[inline(always)]
    #[must_use]
    pub const fn get_ref(&self) -> &T {
        &self.data
    }

    /// Returns the current bit position within the current byte (0-7)
    #[inline(always)]
    #[must_use]
    pub const fn bit_pos(&self) -> u8 {
        self.bit_pos
    }

    /// Number of bits consumed since the reader was created.
    #[inline(always)]
    #[must_use]
    pub const fn bits_consumed(&self) -> u64 {
        self.consumed
    }

    /// Checks if the reader is aligned to the byte boundary
    #[inline(always)]
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.bit_pos == 0
    }
}

impl<T: io::Read> io::Read for BitReader<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.is_aligned() {
            let read = self.data.read(buf)?;
            self.consumed += read as u64 * 8;
            return Ok(read);
        }

        // Unaligned: every output byte straddles two input bytes.
        for byte in buf.iter_mut() {
            *byte = self.read_bits(8)? as u8;
        }

        Ok(buf.len())
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use io::Read;

    use super::*;

    #[test]
    fn test_bit_reader() {
        let binary = 0b10101010110011001111000101010101u32;

        let mut reader = BitReader::new_from_slice(binary.to_be_bytes());
        for i in 0..32 {
            assert_eq!(
                reader.read_bit().unwrap(),
                (binary & (1 << (31 - i))) != 0,
                "bit {i} is not correct",
            );
        }

        let err = reader.read_bit().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(reader.bits_consumed(), 32);
    }

    #[test]
    fn test_bit_reader_read_bits() {
        let binary = 0b10101010110011001111000101010101u32;
        let mut reader = BitReader::new_from_slice(binary.to_be_bytes());
        let cases = [
            (3, 0b101),
            (4, 0b0101),
            (3, 0b011),
            (3, 0b001),
            (3, 0b100),
            (3, 0b111),
            (5, 0b10001),
            (1, 0b0),
            (7, 0b1010101),
        ];

        for (i, (count, expected)) in cases.into_iter().enumerate() {
            assert_eq!(
                reader.read_bits(count).ok(),
                Some(expected),
                "reading {count} bits ({i}) are not correct",
            );
        }

        assert!(reader.read_bit().is_err(), "there shouldnt be any bits left");
    }

    #[test]
    fn test_bit_reader_read_48_bits() {
        let mut reader =
            BitReader::new_from_slice([0x90, 0x00, 0x00, 0x00, 0x00, 0x01, 0x99]);
        assert_eq!(reader.read_bits(48).unwrap(), 0x9000_0000_0001);
        assert_eq!(reader.read_bits(8).unwrap(), 0x99);
    }

    #[test]
    fn test_bit_reader_skip_bits() {
        let mut reader = BitReader::new_from_slice([0b1010_0000, 0xff, 0xff, 0b0000_0101]);

        assert!(reader.read_bit().unwrap());
        // 7 bits to the boundary, 16 whole bits, then 5 more
        reader.skip_bits(28).unwrap();
        assert_eq!(reader.bits_consumed(), 29);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);

        let err = reader.skip_bits(1).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_bit_reader_skip_bits_through_wrapped_reader() {
        let data = [0x00, 0x00, 0x03, 0x01, 0xab];
        let mut reader = BitReader::new(crate::EmulationPreventionIo::new(io::Cursor::new(data)));

        // the escape byte is dropped before the whole-byte skip counts
        reader.skip_bits(24).unwrap();
        assert_eq!(reader.bits_consumed(), 24);
        assert_eq!(reader.read_bits(8).unwrap(), 0xab);
    }

    #[test]
    fn test_bit_reader_skip_past_end() {
        let mut reader = BitReader::new_from_slice([0u8; 4]);
        let err = reader.skip_bits(40).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_bit_reader_align() {
        let mut reader = BitReader::new_from_slice([
            0b10000000, 0b10000000, 0b10000000, 0b10000000, 0b10000000, 0b10000000,
        ]);

        for i in 0..6 {
            assert_eq!(reader.bits_consumed(), i * 8);
            assert_eq!(reader.bit_pos(), 0, "bit pos");
            assert!(reader.read_bit().unwrap(), "bit {i} is not correct");
            reader.align().unwrap();
            assert_eq!(reader.bits_consumed(), (i + 1) * 8);
            assert_eq!(reader.bit_pos(), 0, "bit pos");
        }

        assert!(reader.read_bit().is_err(), "there shouldnt be any bits left");
    }

    #[test]
    fn test_bit_reader_io_read() {
        let binary = 0b10101010110011001111000101010101u32;
        let mut reader = BitReader::new_from_slice(binary.to_be_bytes());

        // Aligned read goes straight to the underlying reader
        let mut buf = [0; 1];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0b10101010]);

        assert_eq!(reader.read_bits(1).unwrap(), 0b1);
        let mut buf = [0; 1];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0b10011001]);
        assert_eq!(reader.bits_consumed(), 17);
    }
}
