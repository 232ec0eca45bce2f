//! Annex-B byte stream splitting and the length-prefixed form.

use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes_util::strip_emulation_prevention;
use memchr::memmem;

use crate::{HvccError, NALUnitType};

const START_CODE: [u8; 3] = [0x00, 0x00, 0x01];

/// Returns `true` if `data` begins with a 3 or 4 byte start code.
pub fn starts_with_start_code(data: &[u8]) -> bool {
    data.starts_with(&START_CODE) || data.starts_with(&[0x00, 0x00, 0x00, 0x01])
}

/// Reads the NAL unit type from the first header byte, if any.
pub fn nal_unit_type_of(nal: &[u8]) -> Option<NALUnitType> {
    nal.first().map(|byte| NALUnitType::from(byte >> 1))
}

/// Iterator over the NAL units of an Annex-B byte stream.
///
/// Yields each unit without its start code and with trailing zero bytes
/// removed, so a 4 byte start code leaves no stray zero on the previous unit.
/// Bytes before the first start code and empty units are skipped. Emulation
/// prevention bytes are left in place.
#[derive(Debug, Clone)]
pub struct NalUnits<'a> {
    remaining: &'a [u8],
}

impl<'a> NalUnits<'a> {
    /// Splits `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { remaining: data }
    }
}

impl<'a> Iterator for NalUnits<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let start = memmem::find(self.remaining, &START_CODE)? + START_CODE.len();
            let rest = &self.remaining[start..];
            let end = memmem::find(rest, &START_CODE).unwrap_or(rest.len());
            self.remaining = &rest[end..];

            let nal = trim_trailing_zeros(&rest[..end]);
            if !nal.is_empty() {
                tracing::trace!(
                    nal_unit_type = ?nal_unit_type_of(nal),
                    size = nal.len(),
                    "found NAL unit"
                );
                return Some(nal);
            }
        }
    }
}

fn trim_trailing_zeros(nal: &[u8]) -> &[u8] {
    let len = nal.iter().rposition(|&b| b != 0).map_or(0, |pos| pos + 1);
    &nal[..len]
}

/// Writes every NAL unit of `data` to `sink` as a 4 byte big-endian length
/// followed by the unit with its emulation prevention bytes removed.
///
/// Returns the number of bytes written.
pub fn write_length_prefixed<W: io::Write>(sink: &mut W, data: &[u8]) -> io::Result<usize> {
    let mut written = 0;

    for nal in NalUnits::new(data) {
        let payload = strip_emulation_prevention(nal);
        let len = u32::try_from(payload.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidData, "NAL unit larger than 4 GiB")
        })?;

        sink.write_u32::<BigEndian>(len)?;
        sink.write_all(&payload)?;
        written += 4 + payload.len();
    }

    Ok(written)
}

/// Buffered form of [`write_length_prefixed`].
pub fn to_length_prefixed(data: &[u8]) -> Result<Vec<u8>, HvccError> {
    let mut out = Vec::new();
    out.try_reserve(data.len())?;

    write_length_prefixed(&mut out, data)?;

    Ok(out)
}
