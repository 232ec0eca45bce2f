use std::cmp::Ordering;
use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use bytes_util::{BitReader, BitWriter};

use crate::{
    ConstantFrameRate, NALUnitType, ParallelismType, PpsRbsp, ProfileCompatibilityFlags, PtlCommon, SpsRbsp, VpsRbsp,
};

/// `min_spatial_segmentation_idc` before any VUI restricted it, one above the
/// 12 bit range.
pub const MIN_SPATIAL_SEGMENTATION_IDC_UNSET: u16 = 4097;

/// All 48 `general_constraint_indicator_flags` set.
const CONSTRAINT_INDICATOR_FLAGS_ALL: u64 = 0xFFFF_FFFF_FFFF;

/// NAL unit types an hvcC may carry arrays for, in the order they are written.
const ARRAY_ORDER: [NALUnitType; 5] = [
    NALUnitType::VpsNut,
    NALUnitType::SpsNut,
    NALUnitType::PpsNut,
    NALUnitType::PrefixSeiNut,
    NALUnitType::SuffixSeiNut,
];

/// HEVC Decoder Configuration Record.
///
/// Built by folding every VPS, SPS and PPS of a stream into it with the
/// `update_from_*` methods, then [`finalize`](Self::finalize)d once before
/// [`mux`](Self::mux).
///
/// ISO/IEC 14496-15 - 8.3.2.1
#[derive(Debug, Clone, PartialEq)]
pub struct HEVCDecoderConfigurationRecord {
    /// Highest `general_profile_space` seen.
    pub general_profile_space: u8,
    /// Highest `general_tier_flag` seen.
    pub general_tier_flag: bool,
    /// Highest `general_profile_idc` seen.
    pub general_profile_idc: u8,
    /// Flags set by every PTL seen.
    pub general_profile_compatibility_flags: ProfileCompatibilityFlags,
    /// Flags set by every PTL seen. Only the low 48 bits are used.
    pub general_constraint_indicator_flags: u64,
    /// Highest `general_level_idc` seen within the highest tier.
    pub general_level_idc: u8,
    /// Lowest `min_spatial_segmentation_idc` of all SPS VUIs, in the range 0 to 4095
    /// once finalized.
    pub min_spatial_segmentation_idc: u16,
    /// See [`ParallelismType`] for more info.
    pub parallelism_type: ParallelismType,
    /// `chroma_format_idc` of the last SPS.
    pub chroma_format_idc: u8,
    /// `bit_depth_luma_minus8` of the last SPS.
    pub bit_depth_luma_minus8: u8,
    /// `bit_depth_chroma_minus8` of the last SPS.
    pub bit_depth_chroma_minus8: u8,
    /// Average frame rate in frames/(256 seconds), 0 if unspecified.
    pub avg_frame_rate: u16,
    /// See [`ConstantFrameRate`] for more info.
    pub constant_frame_rate: ConstantFrameRate,
    /// Highest `max_sub_layers_minus1 + 1` of all VPSs and SPSs.
    pub num_temporal_layers: u8,
    /// Set if any VPS or SPS has its temporal id nesting flag set.
    pub temporal_id_nested: bool,
    /// Length in bytes of the NAL unit length field minus one: 0, 1 or 3.
    pub length_size_minus_one: u8,
    /// NAL unit arrays carried by this record.
    pub arrays: Vec<NaluArray>,
}

/// Nalu Array Structure
///
/// ISO/IEC 14496-15 - 8.3.2.1
#[derive(Debug, Clone, PartialEq)]
pub struct NaluArray {
    /// When `true` every NAL unit of this type is in the array and none are in
    /// the stream.
    pub array_completeness: bool,
    /// VPS, SPS, PPS, prefix SEI or suffix SEI.
    pub nal_unit_type: NALUnitType,
    /// The NAL units, header included, emulation prevention bytes kept.
    pub nalus: Vec<Bytes>,
}

impl Default for HEVCDecoderConfigurationRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl HEVCDecoderConfigurationRecord {
    /// A record nothing was folded into yet: the AND-merged flags are all set
    /// and `min_spatial_segmentation_idc` is [`MIN_SPATIAL_SEGMENTATION_IDC_UNSET`].
    pub fn new() -> Self {
        Self {
            general_profile_space: 0,
            general_tier_flag: false,
            general_profile_idc: 0,
            general_profile_compatibility_flags: ProfileCompatibilityFlags::from_bits_retain(u32::MAX),
            general_constraint_indicator_flags: CONSTRAINT_INDICATOR_FLAGS_ALL,
            general_level_idc: 0,
            min_spatial_segmentation_idc: MIN_SPATIAL_SEGMENTATION_IDC_UNSET,
            parallelism_type: ParallelismType::MixedOrUnknown,
            chroma_format_idc: 0,
            bit_depth_luma_minus8: 0,
            bit_depth_chroma_minus8: 0,
            avg_frame_rate: 0,
            constant_frame_rate: ConstantFrameRate::Unknown,
            num_temporal_layers: 0,
            temporal_id_nested: false,
            length_size_minus_one: 3,
            arrays: Vec::new(),
        }
    }

    /// Folds a general profile, tier and level into the record.
    pub fn merge_ptl(&mut self, ptl: &PtlCommon) {
        self.general_profile_space = self.general_profile_space.max(ptl.profile_space);
        self.general_profile_idc = self.general_profile_idc.max(ptl.profile_idc);

        // The level of a higher tier wins outright, in either order. The tier is
        // updated after the level is decided.
        match self.general_tier_flag.cmp(&ptl.tier_flag) {
            Ordering::Less => self.general_level_idc = ptl.level_idc,
            Ordering::Equal => self.general_level_idc = self.general_level_idc.max(ptl.level_idc),
            Ordering::Greater => {}
        }
        self.general_tier_flag |= ptl.tier_flag;

        self.general_profile_compatibility_flags &= ptl.profile_compatibility_flags;
        self.general_constraint_indicator_flags &= ptl.constraint_indicator_flags;
    }

    fn merge_sub_layers(&mut self, max_sub_layers_minus1: u8, temporal_id_nesting_flag: bool) {
        self.num_temporal_layers = self.num_temporal_layers.max(max_sub_layers_minus1 + 1);
        self.temporal_id_nested |= temporal_id_nesting_flag;
    }

    /// Keeps the lowest `min_spatial_segmentation_idc` seen.
    pub fn merge_min_spatial_segmentation_idc(&mut self, min_spatial_segmentation_idc: u16) {
        self.min_spatial_segmentation_idc = self.min_spatial_segmentation_idc.min(min_spatial_segmentation_idc);
    }

    /// Folds a VPS into the record.
    pub fn update_from_vps(&mut self, vps: &VpsRbsp) {
        self.merge_sub_layers(vps.vps_max_sub_layers_minus1, vps.vps_temporal_id_nesting_flag);
        self.merge_ptl(&vps.profile_tier_level.general);
    }

    /// Folds an SPS into the record.
    pub fn update_from_sps(&mut self, sps: &SpsRbsp) {
        self.merge_sub_layers(sps.sps_max_sub_layers_minus1, sps.sps_temporal_id_nesting_flag);
        self.merge_ptl(&sps.profile_tier_level.general);

        self.chroma_format_idc = (sps.chroma_format_idc & 0b11) as u8;
        self.bit_depth_luma_minus8 = (sps.bit_depth_luma_minus8 & 0b111) as u8;
        self.bit_depth_chroma_minus8 = (sps.bit_depth_chroma_minus8 & 0b111) as u8;

        if let Some(idc) = sps
            .vui_parameters
            .as_ref()
            .and_then(|vui| vui.min_spatial_segmentation_idc())
        {
            self.merge_min_spatial_segmentation_idc(idc);
        }
    }

    /// Folds a PPS into the record. The last PPS decides `parallelismType`.
    pub fn update_from_pps(&mut self, pps: &PpsRbsp) {
        self.parallelism_type = pps.parallelism_type();
    }

    /// Resolves the unset `min_spatial_segmentation_idc`. Without a spatial
    /// segmentation restriction the parallelism type is meaningless.
    pub fn finalize(&mut self) {
        if self.min_spatial_segmentation_idc == MIN_SPATIAL_SEGMENTATION_IDC_UNSET {
            self.min_spatial_segmentation_idc = 0;
        }

        if self.min_spatial_segmentation_idc == 0 {
            self.parallelism_type = ParallelismType::MixedOrUnknown;
        }
    }

    /// Appends a NAL unit to the array of its type, creating the array in
    /// VPS, SPS, PPS, prefix SEI, suffix SEI order.
    ///
    /// Other NAL unit types cannot be carried and are ignored, `false` is
    /// returned for them.
    pub fn push_nalu(&mut self, nal_unit_type: NALUnitType, nalu: Bytes, array_completeness: bool) -> bool {
        let Some(rank) = ARRAY_ORDER.iter().position(|&ty| ty == nal_unit_type) else {
            return false;
        };

        if let Some(array) = self.arrays.iter_mut().find(|array| array.nal_unit_type == nal_unit_type) {
            array.nalus.push(nalu);
            return true;
        }

        let index = self
            .arrays
            .iter()
            .position(|array| ARRAY_ORDER.iter().position(|&ty| ty == array.nal_unit_type) > Some(rank))
            .unwrap_or(self.arrays.len());
        self.arrays.insert(
            index,
            NaluArray {
                array_completeness,
                nal_unit_type,
                nalus: vec![nalu],
            },
        );

        true
    }

    /// Demuxes an [`HEVCDecoderConfigurationRecord`] from a byte stream.
    pub fn demux(data: impl io::Read) -> io::Result<Self> {
        let mut bit_reader = BitReader::new(data);

        // This demuxer only supports version 1
        let configuration_version = bit_reader.read_u8()?;
        if configuration_version != 1 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported configuration version: {configuration_version}"),
            ));
        }

        let general_profile_space = bit_reader.read_bits(2)? as u8;
        let general_tier_flag = bit_reader.read_bit()?;
        let general_profile_idc = bit_reader.read_bits(5)? as u8;
        let general_profile_compatibility_flags =
            ProfileCompatibilityFlags::from_bits_retain(bit_reader.read_u32::<BigEndian>()?);
        let general_constraint_indicator_flags = bit_reader.read_u48::<BigEndian>()?;
        let general_level_idc = bit_reader.read_u8()?;

        bit_reader.read_bits(4)?; // reserved_4bits
        let min_spatial_segmentation_idc = bit_reader.read_bits(12)? as u16;

        bit_reader.read_bits(6)?; // reserved_6bits
        let parallelism_type = bit_reader.read_bits(2)? as u8;

        bit_reader.read_bits(6)?; // reserved_6bits
        let chroma_format_idc = bit_reader.read_bits(2)? as u8;

        bit_reader.read_bits(5)?; // reserved_5bits
        let bit_depth_luma_minus8 = bit_reader.read_bits(3)? as u8;

        bit_reader.read_bits(5)?; // reserved_5bits
        let bit_depth_chroma_minus8 = bit_reader.read_bits(3)? as u8;

        let avg_frame_rate = bit_reader.read_u16::<BigEndian>()?;
        let constant_frame_rate = ConstantFrameRate::try_from(bit_reader.read_bits(2)? as u8)?;
        let num_temporal_layers = bit_reader.read_bits(3)? as u8;
        let temporal_id_nested = bit_reader.read_bit()?;
        let length_size_minus_one = bit_reader.read_bits(2)? as u8;

        if length_size_minus_one == 2 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "length_size_minus_one must be 0, 1, or 3",
            ));
        }

        let num_of_arrays = bit_reader.read_u8()?;
        let mut arrays = Vec::with_capacity(num_of_arrays as usize);

        for _ in 0..num_of_arrays {
            let array_completeness = bit_reader.read_bit()?;
            bit_reader.read_bits(1)?; // reserved

            let nal_unit_type = NALUnitType::from(bit_reader.read_bits(6)? as u8);
            if !ARRAY_ORDER.contains(&nal_unit_type) {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("{nal_unit_type} cannot be carried in an hvcC array"),
                ));
            }

            let num_nalus = bit_reader.read_u16::<BigEndian>()?;
            let mut nalus = Vec::with_capacity(num_nalus as usize);
            for _ in 0..num_nalus {
                let nal_unit_length = bit_reader.read_u16::<BigEndian>()?;
                let mut data = vec![0; nal_unit_length as usize];
                bit_reader.read_exact(&mut data)?;
                nalus.push(Bytes::from(data));
            }

            arrays.push(NaluArray {
                array_completeness,
                nal_unit_type,
                nalus,
            });
        }

        Ok(Self {
            general_profile_space,
            general_tier_flag,
            general_profile_idc,
            general_profile_compatibility_flags,
            general_constraint_indicator_flags,
            general_level_idc,
            min_spatial_segmentation_idc,
            parallelism_type: ParallelismType::from(parallelism_type),
            chroma_format_idc,
            bit_depth_luma_minus8,
            bit_depth_chroma_minus8,
            avg_frame_rate,
            constant_frame_rate,
            num_temporal_layers,
            temporal_id_nested,
            length_size_minus_one,
            arrays,
        })
    }

    /// Returns the total byte size of the [`HEVCDecoderConfigurationRecord`].
    pub fn size(&self) -> u64 {
        1 // configuration_version
        + 1 // general_profile_space, general_tier_flag, general_profile_idc
        + 4 // general_profile_compatibility_flags
        + 6 // general_constraint_indicator_flags
        + 1 // general_level_idc
        + 2 // reserved_4bits, min_spatial_segmentation_idc
        + 1 // reserved_6bits, parallelism_type
        + 1 // reserved_6bits, chroma_format_idc
        + 1 // reserved_5bits, bit_depth_luma_minus8
        + 1 // reserved_5bits, bit_depth_chroma_minus8
        + 2 // avg_frame_rate
        + 1 // constant_frame_rate, num_temporal_layers, temporal_id_nested, length_size_minus_one
        + 1 // num_of_arrays
        + self.arrays.iter().map(|array| {
            1 // array_completeness, reserved, nal_unit_type
            + 2 // num_nalus
            + array.nalus.iter().map(|nalu| {
                2 // nal_unit_length
                + nalu.len() as u64 // nal_unit
            }).sum::<u64>()
        }).sum::<u64>()
    }

    /// Muxes the [`HEVCDecoderConfigurationRecord`] into a byte stream.
    ///
    /// Fields are truncated to their width in the record. Fails with
    /// [`io::ErrorKind::InvalidData`] if an array or a NAL unit does not fit
    /// its 16 bit length field.
    pub fn mux<T: io::Write>(&self, writer: &mut T) -> io::Result<()> {
        let num_of_arrays = u8::try_from(self.arrays.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "too many NAL unit arrays"))?;

        let mut bit_writer = BitWriter::new(writer);

        // This muxer only supports version 1
        bit_writer.write_u8(1)?; // configuration_version
        bit_writer.write_bits(self.general_profile_space as u64 & 0b11, 2)?;
        bit_writer.write_bit(self.general_tier_flag)?;
        bit_writer.write_bits(self.general_profile_idc as u64 & 0b11111, 5)?;
        bit_writer.write_u32::<BigEndian>(self.general_profile_compatibility_flags.bits())?;
        bit_writer.write_u48::<BigEndian>(self.general_constraint_indicator_flags & CONSTRAINT_INDICATOR_FLAGS_ALL)?;
        bit_writer.write_u8(self.general_level_idc)?;

        bit_writer.write_bits(0b1111, 4)?; // reserved_4bits
        bit_writer.write_bits(self.min_spatial_segmentation_idc as u64 & 0xFFF, 12)?;

        bit_writer.write_bits(0b111111, 6)?; // reserved_6bits
        bit_writer.write_bits(self.parallelism_type as u64, 2)?;

        bit_writer.write_bits(0b111111, 6)?; // reserved_6bits
        bit_writer.write_bits(self.chroma_format_idc as u64 & 0b11, 2)?;

        bit_writer.write_bits(0b11111, 5)?; // reserved_5bits
        bit_writer.write_bits(self.bit_depth_luma_minus8 as u64 & 0b111, 3)?;

        bit_writer.write_bits(0b11111, 5)?; // reserved_5bits
        bit_writer.write_bits(self.bit_depth_chroma_minus8 as u64 & 0b111, 3)?;

        bit_writer.write_u16::<BigEndian>(self.avg_frame_rate)?;
        bit_writer.write_bits(self.constant_frame_rate as u64, 2)?;

        bit_writer.write_bits(self.num_temporal_layers as u64 & 0b111, 3)?;
        bit_writer.write_bit(self.temporal_id_nested)?;
        bit_writer.write_bits(self.length_size_minus_one as u64 & 0b11, 2)?;

        bit_writer.write_u8(num_of_arrays)?;
        for array in &self.arrays {
            bit_writer.write_bit(array.array_completeness)?;
            bit_writer.write_bits(0b0, 1)?; // reserved
            bit_writer.write_bits(u8::from(array.nal_unit_type) as u64, 6)?;

            let num_nalus = u16::try_from(array.nalus.len()).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("too many {} NAL units: {}", array.nal_unit_type, array.nalus.len()),
                )
            })?;
            bit_writer.write_u16::<BigEndian>(num_nalus)?;

            for nalu in &array.nalus {
                let nal_unit_length = u16::try_from(nalu.len()).map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("{} NAL unit too large: {} bytes", array.nal_unit_type, nalu.len()),
                    )
                })?;
                bit_writer.write_u16::<BigEndian>(nal_unit_length)?;
                bit_writer.write_all(nalu)?;
            }
        }

        bit_writer.finish()?;

        Ok(())
    }
}
