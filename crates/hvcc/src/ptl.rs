use std::io;

use byteorder::{BigEndian, ReadBytesExt};
use bytes_util::BitReader;

use crate::ProfileCompatibilityFlags;

/// Highest `maxNumSubLayersMinus1` the syntax can address.
const MAX_SUB_LAYERS_MINUS1: u8 = 7;

/// Profile, tier and level.
///
/// `profile_tier_level(1, maxNumSubLayersMinus1)`
///
/// - ISO/IEC 23008-2 - 7.3.3
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileTierLevel {
    /// The `general_*` fields, the only part the hvcC record consumes.
    pub general: PtlCommon,
    /// One entry per sub-layer below the highest one.
    pub sub_layers: Vec<SubLayerPtl>,
}

/// Profile fields shared by the general and sub-layer parts of the PTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtlCommon {
    /// `profile_space`, 2 bits.
    pub profile_space: u8,
    /// `tier_flag`: `false` is Main tier, `true` is High tier.
    pub tier_flag: bool,
    /// `profile_idc`, 5 bits.
    pub profile_idc: u8,
    /// `profile_compatibility_flag[j]` for j in 0..32.
    pub profile_compatibility_flags: ProfileCompatibilityFlags,
    /// The 48 bits following the compatibility flags: progressive, interlaced,
    /// non-packed and frame-only source flags, the 43 profile specific bits and
    /// the inbld/reserved bit.
    pub constraint_indicator_flags: u64,
    /// `level_idc`, 0 for a sub-layer without `sub_layer_level_present_flag`.
    pub level_idc: u8,
}

impl PtlCommon {
    /// Reads the 88 bit profile part, everything up to `level_idc`.
    fn parse_profile<R: io::Read>(bit_reader: &mut BitReader<R>) -> io::Result<Self> {
        let profile_space = bit_reader.read_bits(2)? as u8;
        let tier_flag = bit_reader.read_bit()?;
        let profile_idc = bit_reader.read_bits(5)? as u8;
        let profile_compatibility_flags =
            ProfileCompatibilityFlags::from_bits_retain(bit_reader.read_u32::<BigEndian>()?);
        let constraint_indicator_flags = bit_reader.read_bits(48)?;

        Ok(Self {
            profile_space,
            tier_flag,
            profile_idc,
            profile_compatibility_flags,
            constraint_indicator_flags,
            level_idc: 0,
        })
    }

    /// `general_progressive_source_flag`
    pub fn progressive_source_flag(&self) -> bool {
        self.constraint_indicator_flags & (1 << 47) != 0
    }

    /// `general_interlaced_source_flag`
    pub fn interlaced_source_flag(&self) -> bool {
        self.constraint_indicator_flags & (1 << 46) != 0
    }

    /// `general_frame_only_constraint_flag`
    pub fn frame_only_constraint_flag(&self) -> bool {
        self.constraint_indicator_flags & (1 << 44) != 0
    }
}

/// `sub_layer_*` entries of the PTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubLayerPtl {
    /// Present when `sub_layer_profile_present_flag[i]` is set.
    pub profile: Option<PtlCommon>,
    /// Present when `sub_layer_level_present_flag[i]` is set.
    pub level_idc: Option<u8>,
}

impl ProfileTierLevel {
    /// Parses the structure with `profilePresentFlag` equal to 1, the only form
    /// found in a VPS or SPS of the base layer.
    pub fn parse<R: io::Read>(
        bit_reader: &mut BitReader<R>,
        max_sub_layers_minus1: u8,
    ) -> io::Result<Self> {
        let max_sub_layers_minus1 = max_sub_layers_minus1.min(MAX_SUB_LAYERS_MINUS1);

        let mut general = PtlCommon::parse_profile(bit_reader)?;
        general.level_idc = bit_reader.read_u8()?;

        let mut present_flags = Vec::with_capacity(max_sub_layers_minus1 as usize);
        for _ in 0..max_sub_layers_minus1 {
            let profile_present = bit_reader.read_bit()?;
            let level_present = bit_reader.read_bit()?;
            present_flags.push((profile_present, level_present));
        }

        // reserved_zero_2bits
        if max_sub_layers_minus1 > 0 {
            bit_reader.read_bits(2 * (8 - max_sub_layers_minus1))?;
        }

        let mut sub_layers = Vec::with_capacity(present_flags.len());
        for (profile_present, level_present) in present_flags {
            let mut profile = None;
            if profile_present {
                profile = Some(PtlCommon::parse_profile(bit_reader)?);
            }

            let mut level_idc = None;
            if level_present {
                let level = bit_reader.read_u8()?;
                if let Some(profile) = profile.as_mut() {
                    profile.level_idc = level;
                }
                level_idc = Some(level);
            }

            sub_layers.push(SubLayerPtl { profile, level_idc });
        }

        Ok(Self { general, sub_layers })
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use bytes_util::{BitReader, BitWriter};

    use super::*;

    fn write_profile(writer: &mut BitWriter<Vec<u8>>, profile_idc: u64, tier: bool) {
        writer.write_bits(0, 2).unwrap(); // profile_space
        writer.write_bit(tier).unwrap();
        writer.write_bits(profile_idc, 5).unwrap();
        writer.write_bits(1 << (31 - profile_idc), 32).unwrap();
        writer.write_bits(0x9000_0000_0000, 48).unwrap();
    }

    #[test]
    fn test_parse_general_only() {
        // general PTL of a Main profile, level 5.1 SPS
        let data = [0x01, 0x40, 0x00, 0x00, 0x00, 0x90, 0x00, 0x00, 0x00, 0x00, 0x00, 0x99];
        let mut reader = BitReader::new_from_slice(data);
        let ptl = ProfileTierLevel::parse(&mut reader, 0).unwrap();

        assert_eq!(ptl.general.profile_space, 0);
        assert!(!ptl.general.tier_flag);
        assert_eq!(ptl.general.profile_idc, 1);
        assert_eq!(
            ptl.general.profile_compatibility_flags,
            ProfileCompatibilityFlags::MainProfile
        );
        assert_eq!(ptl.general.constraint_indicator_flags, 0x9000_0000_0000);
        assert!(ptl.general.progressive_source_flag());
        assert!(!ptl.general.interlaced_source_flag());
        assert!(ptl.general.frame_only_constraint_flag());
        assert_eq!(ptl.general.level_idc, 153);
        assert!(ptl.sub_layers.is_empty());
        assert_eq!(reader.bits_consumed(), 96);
    }

    #[test]
    fn test_parse_sub_layers() {
        let mut writer = BitWriter::<Vec<u8>>::default();
        write_profile(&mut writer, 2, true);
        writer.write_bits(120, 8).unwrap(); // general_level_idc

        // sub-layer 0: profile + level, sub-layer 1: level only
        writer.write_bits(0b11, 2).unwrap();
        writer.write_bits(0b01, 2).unwrap();
        writer.write_bits(0, 2 * 6).unwrap(); // reserved_zero_2bits

        write_profile(&mut writer, 1, false);
        writer.write_bits(93, 8).unwrap();
        writer.write_bits(90, 8).unwrap();
        writer.write_bits(0b1010, 4).unwrap(); // trailing data
        let data = writer.finish().unwrap();

        let mut reader = BitReader::new_from_slice(data);
        let ptl = ProfileTierLevel::parse(&mut reader, 2).unwrap();

        assert_eq!(ptl.general.profile_idc, 2);
        assert!(ptl.general.tier_flag);
        assert_eq!(ptl.general.level_idc, 120);
        assert_eq!(ptl.sub_layers.len(), 2);

        let sub_layer = ptl.sub_layers[0].profile.unwrap();
        assert_eq!(sub_layer.profile_idc, 1);
        assert_eq!(sub_layer.level_idc, 93);
        assert_eq!(ptl.sub_layers[0].level_idc, Some(93));

        assert_eq!(ptl.sub_layers[1].profile, None);
        assert_eq!(ptl.sub_layers[1].level_idc, Some(90));

        assert_eq!(reader.bits_consumed(), 96 + 4 + 12 + 88 + 8 + 8);
        assert_eq!(reader.read_bits(4).unwrap(), 0b1010);
    }

    #[test]
    fn test_parse_truncated() {
        let mut reader = BitReader::new_from_slice([0x01, 0x40, 0x00, 0x00]);
        let err = ProfileTierLevel::parse(&mut reader, 0).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
