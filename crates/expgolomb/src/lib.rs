//! Exp-Golomb (`ue(v)` / `se(v)`) coding on top of the [`BitReader`] and
//! [`BitWriter`] from [`bytes-util`](bytes_util).
//!
//! ```rust
//! # fn test() -> std::io::Result<()> {
//! use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};
//! use bytes_util::{BitReader, BitWriter};
//!
//! let mut bit_writer = BitWriter::default();
//! bit_writer.write_exp_golomb(0)?;
//! bit_writer.write_signed_exp_golomb(-2)?;
//!
//! let data: Vec<u8> = bit_writer.finish()?;
//!
//! let mut bit_reader = BitReader::new_from_slice(data);
//! assert_eq!(bit_reader.read_exp_golomb()?, 0);
//! assert_eq!(bit_reader.read_signed_exp_golomb()?, -2);
//! # Ok(())
//! # }
//! # test().expect("failed to run test");
//! ```
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]

use std::io;

use bytes_util::{BitReader, BitWriter};

/// Longest prefix of zero bits accepted by [`BitReaderExpGolombExt::read_exp_golomb`].
///
/// 31 leading zeros decode to at most `2^32 - 2`, the largest value any
/// H.264/H.265 syntax element carries.
pub const MAX_LEADING_ZEROS: u32 = 31;

/// Extension trait for reading Exp-Golomb encoded numbers from a bit reader
///
/// See: <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
pub trait BitReaderExpGolombExt {
    /// Reads an unsigned Exp-Golomb number, `ue(v)`.
    ///
    /// Codes with more than [`MAX_LEADING_ZEROS`] leading zeros fail with
    /// [`io::ErrorKind::InvalidData`].
    fn read_exp_golomb(&mut self) -> io::Result<u64>;

    /// Reads a signed Exp-Golomb number, `se(v)`.
    fn read_signed_exp_golomb(&mut self) -> io::Result<i64> {
        let code = self.read_exp_golomb()?;

        if code % 2 == 0 {
            Ok(-((code / 2) as i64))
        } else {
            Ok((code / 2) as i64 + 1)
        }
    }
}

impl<R: io::Read> BitReaderExpGolombExt for BitReader<R> {
    fn read_exp_golomb(&mut self) -> io::Result<u64> {
        let mut leading_zeros = 0;
        while !self.read_bit()? {
            leading_zeros += 1;
            if leading_zeros > MAX_LEADING_ZEROS {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "exp-golomb code too long",
                ));
            }
        }

        let suffix = self.read_bits(leading_zeros as u8)?;

        Ok((1 << leading_zeros) + suffix - 1)
    }
}

/// Extension trait for writing Exp-Golomb encoded numbers to a bit writer
///
/// See: <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
pub trait BitWriterExpGolombExt {
    /// Writes an unsigned Exp-Golomb number
    fn write_exp_golomb(&mut self, input: u64) -> io::Result<()>;

    /// Writes a signed Exp-Golomb number
    fn write_signed_exp_golomb(&mut self, number: i64) -> io::Result<()> {
        let number = if number <= 0 {
            number.unsigned_abs() * 2
        } else {
            number as u64 * 2 - 1
        };

        self.write_exp_golomb(number)
    }
}

impl<W: io::Write> BitWriterExpGolombExt for BitWriter<W> {
    fn write_exp_golomb(&mut self, input: u64) -> io::Result<()> {
        let code = input.checked_add(1).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "exp-golomb value too large")
        })?;
        let leading_zeros = (63 - code.leading_zeros()) as u8;

        self.write_bits(0, leading_zeros)?;
        self.write_bits(code, leading_zeros + 1)?;

        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::io;

    use bytes_util::{BitReader, BitWriter};

    use crate::{BitReaderExpGolombExt, BitWriterExpGolombExt};

    #[test]
    fn test_exp_golomb_decode() {
        let mut bit_writer = BitWriter::<Vec<u8>>::default();

        bit_writer.write_bits(0b1, 1).unwrap(); // 0
        bit_writer.write_bits(0b010, 3).unwrap(); // 1
        bit_writer.write_bits(0b011, 3).unwrap(); // 2
        bit_writer.write_bits(0b00100, 5).unwrap(); // 3
        bit_writer.write_bits(0b00111, 5).unwrap(); // 6
        bit_writer.write_bits(0b0001000, 7).unwrap(); // 7

        let data = bit_writer.finish().unwrap();
        let mut bit_reader = BitReader::new_from_slice(data);

        for (expected, consumed) in [(0, 1), (1, 4), (2, 7), (3, 12), (6, 17), (7, 24)] {
            assert_eq!(bit_reader.read_exp_golomb().unwrap(), expected);
            assert_eq!(bit_reader.bits_consumed(), consumed);
        }
    }

    #[test]
    fn test_signed_exp_golomb_decode() {
        let mut bit_writer = BitWriter::<Vec<u8>>::default();

        bit_writer.write_bits(0b1, 1).unwrap(); // 0
        bit_writer.write_bits(0b010, 3).unwrap(); // 1
        bit_writer.write_bits(0b011, 3).unwrap(); // -1
        bit_writer.write_bits(0b00100, 5).unwrap(); // 2
        bit_writer.write_bits(0b00101, 5).unwrap(); // -2

        let data = bit_writer.finish().unwrap();
        let mut bit_reader = BitReader::new_from_slice(data);

        for expected in [0, 1, -1, 2, -2] {
            assert_eq!(bit_reader.read_signed_exp_golomb().unwrap(), expected);
        }
        assert_eq!(bit_reader.bits_consumed(), 17);
    }

    #[test]
    fn test_exp_golomb_encode() {
        let mut bit_writer = BitWriter::<Vec<u8>>::default();

        for value in [0, 1, 2, 3, 26, 255] {
            bit_writer.write_exp_golomb(value).unwrap();
        }
        bit_writer.write_signed_exp_golomb(-26).unwrap();
        bit_writer.write_signed_exp_golomb(7).unwrap();
        // largest value with 31 leading zeros
        bit_writer.write_exp_golomb(u32::MAX as u64 - 1).unwrap();

        let data = bit_writer.finish().unwrap();
        let mut bit_reader = BitReader::new_from_slice(data);

        for value in [0, 1, 2, 3, 26, 255] {
            assert_eq!(bit_reader.read_exp_golomb().unwrap(), value);
        }
        assert_eq!(bit_reader.read_signed_exp_golomb().unwrap(), -26);
        assert_eq!(bit_reader.read_signed_exp_golomb().unwrap(), 7);
        assert_eq!(bit_reader.read_exp_golomb().unwrap(), u32::MAX as u64 - 1);
        // 1 + 3 + 3 + 5 + 9 + 17 + 11 + 7 + 63
        assert_eq!(bit_reader.bits_consumed(), 119);
    }

    #[test]
    fn test_exp_golomb_too_long() {
        let mut bit_writer = BitWriter::<Vec<u8>>::default();
        bit_writer.write_exp_golomb(u32::MAX as u64).unwrap();
        let data = bit_writer.finish().unwrap();

        let err = BitReader::new_from_slice(data).read_exp_golomb().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(err.to_string(), "exp-golomb code too long");
    }

    #[test]
    fn test_exp_golomb_truncated() {
        assert_eq!(BitReader::new_from_slice([0b0001_0000u8]).read_exp_golomb().unwrap(), 7);

        // seven leading zeros, the suffix runs past the end
        let err = BitReader::new_from_slice([0b0000_0001u8]).read_exp_golomb().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
