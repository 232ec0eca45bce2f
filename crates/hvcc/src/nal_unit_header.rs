use std::io;

use bytes_util::BitReader;

use crate::{HvccError, NALUnitType};

/// NAL unit header.
///
/// - ISO/IEC 23008-2 - 7.3.1.2
///
/// Only the forbidden bit is validated. The layer id and temporal id are
/// carried as read, the hvcC builder never looks at them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NALUnitHeader {
    /// Type of the RBSP carried by the NAL unit, ISO/IEC 23008-2 Table 7-1.
    pub nal_unit_type: NALUnitType,
    /// `nuh_layer_id`, 6 bits.
    pub nuh_layer_id: u8,
    /// `nuh_temporal_id_plus1`, 3 bits.
    pub nuh_temporal_id_plus1: u8,
}

impl NALUnitHeader {
    /// Reads the 16 bit header from the start of a NAL unit.
    pub fn parse<R: io::Read>(bit_reader: &mut BitReader<R>) -> io::Result<Self> {
        let forbidden_zero_bit = bit_reader.read_bit()?;
        if forbidden_zero_bit {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "forbidden_zero_bit is not zero",
            ));
        }

        let nal_unit_type = NALUnitType::from(bit_reader.read_bits(6)? as u8);
        let nuh_layer_id = bit_reader.read_bits(6)? as u8;
        let nuh_temporal_id_plus1 = bit_reader.read_bits(3)? as u8;

        Ok(Self {
            nal_unit_type,
            nuh_layer_id,
            nuh_temporal_id_plus1,
        })
    }

    /// Reads the header and checks that it announces `expected`.
    pub(crate) fn parse_expecting<R: io::Read>(
        bit_reader: &mut BitReader<R>,
        expected: NALUnitType,
    ) -> Result<Self, HvccError> {
        let header = Self::parse(bit_reader)?;
        if header.nal_unit_type != expected {
            return Err(HvccError::UnexpectedNalType {
                expected,
                found: header.nal_unit_type,
            });
        }

        Ok(header)
    }

    /// `TemporalId`, saturating at 0 for a (non conforming) zero `nuh_temporal_id_plus1`.
    pub fn temporal_id(&self) -> u8 {
        self.nuh_temporal_id_plus1.saturating_sub(1)
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::io;

    use bytes_util::BitReader;

    use super::NALUnitHeader;
    use crate::{HvccError, NALUnitType};

    #[test]
    fn test_parse_header() {
        let header = NALUnitHeader::parse(&mut BitReader::new_from_slice([0x42, 0x01])).unwrap();
        assert_eq!(header.nal_unit_type, NALUnitType::SpsNut);
        assert_eq!(header.nuh_layer_id, 0);
        assert_eq!(header.temporal_id(), 0);

        // layer 63, temporal id 6 are carried without validation
        let header = NALUnitHeader::parse(&mut BitReader::new_from_slice([0x41, 0xff])).unwrap();
        assert_eq!(header.nal_unit_type, NALUnitType::VpsNut);
        assert_eq!(header.nuh_layer_id, 63);
        assert_eq!(header.temporal_id(), 6);
    }

    #[test]
    fn test_forbidden_bit() {
        let err = NALUnitHeader::parse(&mut BitReader::new_from_slice([0xc2, 0x01])).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(err.to_string(), "forbidden_zero_bit is not zero");
    }

    #[test]
    fn test_truncated_header() {
        let err = NALUnitHeader::parse(&mut BitReader::new_from_slice([0x42])).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_parse_expecting() {
        let mut reader = BitReader::new_from_slice([0x44, 0x01]);
        let err = NALUnitHeader::parse_expecting(&mut reader, NALUnitType::SpsNut).unwrap_err();
        assert!(matches!(
            err,
            HvccError::UnexpectedNalType {
                expected: NALUnitType::SpsNut,
                found: NALUnitType::PpsNut,
            }
        ));

        let mut reader = BitReader::new_from_slice([0x44, 0x01]);
        let header = NALUnitHeader::parse_expecting(&mut reader, NALUnitType::PpsNut).unwrap();
        assert_eq!(header.nal_unit_type, NALUnitType::PpsNut);
    }
}
