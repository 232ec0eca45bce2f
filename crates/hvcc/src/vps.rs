use std::io;

use byteorder::{BigEndian, ReadBytesExt};
use bytes_util::{BitReader, EmulationPreventionIo, range_check};
use expgolomb::BitReaderExpGolombExt;

use crate::{HrdParameters, HvccError, NALUnitHeader, NALUnitType, ProfileTierLevel, SubLayerOrderingInfo};

/// The VPS NAL unit.
#[derive(Debug, Clone, PartialEq)]
pub struct VpsNALUnit {
    /// The NAL unit header.
    pub nal_unit_header: NALUnitHeader,
    /// The VPS RBSP.
    pub rbsp: VpsRbsp,
}

impl VpsNALUnit {
    /// Parses a VPS NAL unit, header included, emulation prevention bytes
    /// still in place.
    pub fn parse(reader: impl io::Read) -> Result<Self, HvccError> {
        let mut bit_reader = BitReader::new(EmulationPreventionIo::new(reader));
        let nal_unit_header = NALUnitHeader::parse_expecting(&mut bit_reader, NALUnitType::VpsNut)?;
        let rbsp = VpsRbsp::parse(&mut bit_reader)?;

        Ok(Self { nal_unit_header, rbsp })
    }
}

/// Video parameter set up to, but excluding, `vps_extension_flag`.
///
/// - ISO/IEC 23008-2 - 7.3.2.1
#[derive(Debug, Clone, PartialEq)]
pub struct VpsRbsp {
    /// `vps_video_parameter_set_id`, 4 bits.
    pub vps_video_parameter_set_id: u8,
    /// `vps_max_layers_minus1`, 6 bits.
    pub vps_max_layers_minus1: u8,
    /// `vps_max_sub_layers_minus1`, 3 bits.
    pub vps_max_sub_layers_minus1: u8,
    /// `vps_temporal_id_nesting_flag`
    pub vps_temporal_id_nesting_flag: bool,
    /// `profile_tier_level(1, vps_max_sub_layers_minus1)`
    pub profile_tier_level: ProfileTierLevel,
    /// `vps_max_dec_pic_buffering_minus1` and friends.
    pub sub_layer_ordering_info: SubLayerOrderingInfo,
    /// `vps_max_layer_id`, 6 bits.
    pub vps_max_layer_id: u8,
    /// `layer_id_included_flag[i][j]` for layer sets 1..=`vps_num_layer_sets_minus1`.
    pub layer_id_included_flags: Vec<Vec<bool>>,
    /// Present when `vps_timing_info_present_flag` is set.
    pub timing_info: Option<VpsTimingInfo>,
}

/// Timing block at the end of the VPS.
#[derive(Debug, Clone, PartialEq)]
pub struct VpsTimingInfo {
    /// `vps_num_units_in_tick`
    pub num_units_in_tick: u32,
    /// `vps_time_scale`
    pub time_scale: u32,
    /// `vps_num_ticks_poc_diff_one_minus1`, if `vps_poc_proportional_to_timing_flag`.
    pub num_ticks_poc_diff_one_minus1: Option<u64>,
    /// `(hrd_layer_set_idx[i], hrd_parameters(cprms_present_flag[i], ..))`
    pub hrd_parameters: Vec<(u64, HrdParameters)>,
}

impl VpsRbsp {
    fn parse<R: io::Read>(bit_reader: &mut BitReader<R>) -> io::Result<Self> {
        let vps_video_parameter_set_id = bit_reader.read_bits(4)? as u8;
        // vps_base_layer_internal_flag, vps_base_layer_available_flag
        bit_reader.read_bits(2)?;
        let vps_max_layers_minus1 = bit_reader.read_bits(6)? as u8;
        let vps_max_sub_layers_minus1 = bit_reader.read_bits(3)? as u8;
        let vps_temporal_id_nesting_flag = bit_reader.read_bit()?;
        // vps_reserved_0xffff_16bits
        bit_reader.skip_bits(16)?;

        let profile_tier_level = ProfileTierLevel::parse(bit_reader, vps_max_sub_layers_minus1)?;

        let vps_sub_layer_ordering_info_present_flag = bit_reader.read_bit()?;
        let sub_layer_ordering_info = SubLayerOrderingInfo::parse(
            bit_reader,
            vps_sub_layer_ordering_info_present_flag,
            vps_max_sub_layers_minus1,
        )?;

        let vps_max_layer_id = bit_reader.read_bits(6)? as u8;
        let vps_num_layer_sets_minus1 = bit_reader.read_exp_golomb()?;
        range_check!(vps_num_layer_sets_minus1, 0, 1023)?;

        let mut layer_id_included_flags = Vec::with_capacity(vps_num_layer_sets_minus1 as usize);
        for _ in 1..=vps_num_layer_sets_minus1 {
            let mut flags = Vec::with_capacity(vps_max_layer_id as usize + 1);
            for _ in 0..=vps_max_layer_id {
                flags.push(bit_reader.read_bit()?);
            }
            layer_id_included_flags.push(flags);
        }

        let mut timing_info = None;
        let vps_timing_info_present_flag = bit_reader.read_bit()?;
        if vps_timing_info_present_flag {
            let num_units_in_tick = bit_reader.read_u32::<BigEndian>()?;
            let time_scale = bit_reader.read_u32::<BigEndian>()?;

            let mut num_ticks_poc_diff_one_minus1 = None;
            let vps_poc_proportional_to_timing_flag = bit_reader.read_bit()?;
            if vps_poc_proportional_to_timing_flag {
                num_ticks_poc_diff_one_minus1 = Some(bit_reader.read_exp_golomb()?);
            }

            let vps_num_hrd_parameters = bit_reader.read_exp_golomb()?;
            range_check!(vps_num_hrd_parameters, 0, vps_num_layer_sets_minus1 + 1)?;

            let mut hrd_parameters = Vec::with_capacity(vps_num_hrd_parameters as usize);
            for i in 0..vps_num_hrd_parameters {
                let hrd_layer_set_idx = bit_reader.read_exp_golomb()?;

                // cprms_present_flag[0] is inferred to be 1
                let mut cprms_present_flag = true;
                if i > 0 {
                    cprms_present_flag = bit_reader.read_bit()?;
                }

                let hrd = HrdParameters::parse(bit_reader, cprms_present_flag, vps_max_sub_layers_minus1)?;
                hrd_parameters.push((hrd_layer_set_idx, hrd));
            }

            timing_info = Some(VpsTimingInfo {
                num_units_in_tick,
                time_scale,
                num_ticks_poc_diff_one_minus1,
                hrd_parameters,
            });
        }

        Ok(Self {
            vps_video_parameter_set_id,
            vps_max_layers_minus1,
            vps_max_sub_layers_minus1,
            vps_temporal_id_nesting_flag,
            profile_tier_level,
            sub_layer_ordering_info,
            vps_max_layer_id,
            layer_id_included_flags,
            timing_info,
        })
    }
}
