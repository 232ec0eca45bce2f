use std::io;

use bytes_util::{BitReader, EmulationPreventionIo, range_check};
use expgolomb::BitReaderExpGolombExt;

use crate::{HvccError, NALUnitHeader, NALUnitType, ProfileTierLevel, SubLayerOrderingInfo};

mod long_term_ref_pics;
mod scaling_list;
mod st_ref_pic_set;
mod vui;

pub use long_term_ref_pics::LongTermRefPic;
pub use scaling_list::*;
pub use st_ref_pic_set::*;
pub use vui::*;

/// Upper bound of `num_short_term_ref_pic_sets`.
pub const MAX_SHORT_TERM_REF_PIC_SETS: u64 = 64;

/// Sequence parameter set contained in a NAL unit.
#[derive(Debug, Clone, PartialEq)]
pub struct SpsNALUnit {
    /// The NAL unit header.
    pub nal_unit_header: NALUnitHeader,
    /// The SPS RBSP.
    pub rbsp: SpsRbsp,
}

impl SpsNALUnit {
    /// Parses an SPS NAL unit, header included, emulation prevention bytes
    /// still in place.
    pub fn parse(reader: impl io::Read) -> Result<Self, HvccError> {
        let mut bit_reader = BitReader::new(EmulationPreventionIo::new(reader));
        let nal_unit_header = NALUnitHeader::parse_expecting(&mut bit_reader, NALUnitType::SpsNut)?;
        let rbsp = SpsRbsp::parse(&mut bit_reader)?;

        Ok(Self { nal_unit_header, rbsp })
    }
}

/// Sequence parameter set RBSP up to, but excluding, `sps_extension_present_flag`.
///
/// `seq_parameter_set_rbsp()`
///
/// - ISO/IEC 23008-2 - 7.3.2.2
/// - ISO/IEC 23008-2 - 7.4.3.2
#[derive(Debug, Clone, PartialEq)]
pub struct SpsRbsp {
    /// `sps_video_parameter_set_id`
    pub sps_video_parameter_set_id: u8,
    /// `sps_max_sub_layers_minus1`
    pub sps_max_sub_layers_minus1: u8,
    /// `sps_temporal_id_nesting_flag`
    pub sps_temporal_id_nesting_flag: bool,
    /// `profile_tier_level(1, sps_max_sub_layers_minus1)`
    pub profile_tier_level: ProfileTierLevel,
    /// `sps_seq_parameter_set_id`
    pub sps_seq_parameter_set_id: u64,
    /// `chroma_format_idc`, as coded.
    pub chroma_format_idc: u64,
    /// `separate_colour_plane_flag`, only coded for 4:4:4.
    pub separate_colour_plane_flag: bool,
    /// `pic_width_in_luma_samples`
    pub pic_width_in_luma_samples: u64,
    /// `pic_height_in_luma_samples`
    pub pic_height_in_luma_samples: u64,
    /// Present if `conformance_window_flag` is `true`.
    pub conformance_window: Option<ConformanceWindow>,
    /// `bit_depth_luma_minus8`, as coded.
    pub bit_depth_luma_minus8: u64,
    /// `bit_depth_chroma_minus8`, as coded.
    pub bit_depth_chroma_minus8: u64,
    /// `log2_max_pic_order_cnt_lsb_minus4`
    pub log2_max_pic_order_cnt_lsb_minus4: u64,
    /// `sps_max_dec_pic_buffering_minus1`, `sps_max_num_reorder_pics` and
    /// `sps_max_latency_increase_plus1`.
    pub sub_layer_ordering_info: SubLayerOrderingInfo,
    /// `log2_min_luma_coding_block_size_minus3`
    pub log2_min_luma_coding_block_size_minus3: u64,
    /// `log2_diff_max_min_luma_coding_block_size`
    pub log2_diff_max_min_luma_coding_block_size: u64,
    /// `log2_min_luma_transform_block_size_minus2`
    pub log2_min_luma_transform_block_size_minus2: u64,
    /// `log2_diff_max_min_luma_transform_block_size`
    pub log2_diff_max_min_luma_transform_block_size: u64,
    /// `max_transform_hierarchy_depth_inter`
    pub max_transform_hierarchy_depth_inter: u64,
    /// `max_transform_hierarchy_depth_intra`
    pub max_transform_hierarchy_depth_intra: u64,
    /// `scaling_list_enabled_flag`
    pub scaling_list_enabled_flag: bool,
    /// Present if `sps_scaling_list_data_present_flag` is `true`.
    pub scaling_list_data: Option<ScalingListData>,
    /// `amp_enabled_flag`
    pub amp_enabled_flag: bool,
    /// `sample_adaptive_offset_enabled_flag`
    pub sample_adaptive_offset_enabled_flag: bool,
    /// Present if `pcm_enabled_flag` is `true`.
    pub pcm: Option<Pcm>,
    /// `st_ref_pic_set(i)` for every `i` below `num_short_term_ref_pic_sets`.
    pub short_term_ref_pic_sets: Vec<ShortTermRefPicSet>,
    /// Present if `long_term_ref_pics_present_flag` is `true`.
    pub long_term_ref_pics: Option<Vec<LongTermRefPic>>,
    /// `sps_temporal_mvp_enabled_flag`
    pub sps_temporal_mvp_enabled_flag: bool,
    /// `strong_intra_smoothing_enabled_flag`
    pub strong_intra_smoothing_enabled_flag: bool,
    /// Present if `vui_parameters_present_flag` is `true`.
    pub vui_parameters: Option<VuiParameters>,
}

impl SpsRbsp {
    fn parse<R: io::Read>(bit_reader: &mut BitReader<R>) -> io::Result<Self> {
        let sps_video_parameter_set_id = bit_reader.read_bits(4)? as u8;
        let sps_max_sub_layers_minus1 = bit_reader.read_bits(3)? as u8;
        let sps_temporal_id_nesting_flag = bit_reader.read_bit()?;

        let profile_tier_level = ProfileTierLevel::parse(bit_reader, sps_max_sub_layers_minus1)?;

        let sps_seq_parameter_set_id = bit_reader.read_exp_golomb()?;
        let chroma_format_idc = bit_reader.read_exp_golomb()?;

        let mut separate_colour_plane_flag = false;
        if chroma_format_idc == 3 {
            separate_colour_plane_flag = bit_reader.read_bit()?;
        }

        let pic_width_in_luma_samples = bit_reader.read_exp_golomb()?;
        let pic_height_in_luma_samples = bit_reader.read_exp_golomb()?;

        let mut conformance_window = None;
        let conformance_window_flag = bit_reader.read_bit()?;
        if conformance_window_flag {
            conformance_window = Some(ConformanceWindow {
                left_offset: bit_reader.read_exp_golomb()?,
                right_offset: bit_reader.read_exp_golomb()?,
                top_offset: bit_reader.read_exp_golomb()?,
                bottom_offset: bit_reader.read_exp_golomb()?,
            });
        }

        let bit_depth_luma_minus8 = bit_reader.read_exp_golomb()?;
        let bit_depth_chroma_minus8 = bit_reader.read_exp_golomb()?;
        let log2_max_pic_order_cnt_lsb_minus4 = bit_reader.read_exp_golomb()?;

        let sps_sub_layer_ordering_info_present_flag = bit_reader.read_bit()?;
        let sub_layer_ordering_info = SubLayerOrderingInfo::parse(
            bit_reader,
            sps_sub_layer_ordering_info_present_flag,
            sps_max_sub_layers_minus1,
        )?;

        let log2_min_luma_coding_block_size_minus3 = bit_reader.read_exp_golomb()?;
        let log2_diff_max_min_luma_coding_block_size = bit_reader.read_exp_golomb()?;
        let log2_min_luma_transform_block_size_minus2 = bit_reader.read_exp_golomb()?;
        let log2_diff_max_min_luma_transform_block_size = bit_reader.read_exp_golomb()?;
        let max_transform_hierarchy_depth_inter = bit_reader.read_exp_golomb()?;
        let max_transform_hierarchy_depth_intra = bit_reader.read_exp_golomb()?;

        let mut scaling_list_data = None;
        let scaling_list_enabled_flag = bit_reader.read_bit()?;
        if scaling_list_enabled_flag {
            let sps_scaling_list_data_present_flag = bit_reader.read_bit()?;
            if sps_scaling_list_data_present_flag {
                scaling_list_data = Some(ScalingListData::parse(bit_reader)?);
            }
        }

        let amp_enabled_flag = bit_reader.read_bit()?;
        let sample_adaptive_offset_enabled_flag = bit_reader.read_bit()?;

        let mut pcm = None;
        let pcm_enabled_flag = bit_reader.read_bit()?;
        if pcm_enabled_flag {
            pcm = Some(Pcm {
                pcm_sample_bit_depth_luma_minus1: bit_reader.read_bits(4)? as u8,
                pcm_sample_bit_depth_chroma_minus1: bit_reader.read_bits(4)? as u8,
                log2_min_pcm_luma_coding_block_size_minus3: bit_reader.read_exp_golomb()?,
                log2_diff_max_min_pcm_luma_coding_block_size: bit_reader.read_exp_golomb()?,
                pcm_loop_filter_disabled_flag: bit_reader.read_bit()?,
            });
        }

        let num_short_term_ref_pic_sets = bit_reader.read_exp_golomb()?;
        range_check!(num_short_term_ref_pic_sets, 0, MAX_SHORT_TERM_REF_PIC_SETS)?;
        let short_term_ref_pic_sets = ShortTermRefPicSet::parse_all(bit_reader, num_short_term_ref_pic_sets as usize)?;

        let mut long_term_ref_pics = None;
        let long_term_ref_pics_present_flag = bit_reader.read_bit()?;
        if long_term_ref_pics_present_flag {
            long_term_ref_pics = Some(long_term_ref_pics::parse(bit_reader, log2_max_pic_order_cnt_lsb_minus4)?);
        }

        let sps_temporal_mvp_enabled_flag = bit_reader.read_bit()?;
        let strong_intra_smoothing_enabled_flag = bit_reader.read_bit()?;

        let mut vui_parameters = None;
        let vui_parameters_present_flag = bit_reader.read_bit()?;
        if vui_parameters_present_flag {
            vui_parameters = Some(VuiParameters::parse(bit_reader, sps_max_sub_layers_minus1)?);
        }

        Ok(Self {
            sps_video_parameter_set_id,
            sps_max_sub_layers_minus1,
            sps_temporal_id_nesting_flag,
            profile_tier_level,
            sps_seq_parameter_set_id,
            chroma_format_idc,
            separate_colour_plane_flag,
            pic_width_in_luma_samples,
            pic_height_in_luma_samples,
            conformance_window,
            bit_depth_luma_minus8,
            bit_depth_chroma_minus8,
            log2_max_pic_order_cnt_lsb_minus4,
            sub_layer_ordering_info,
            log2_min_luma_coding_block_size_minus3,
            log2_diff_max_min_luma_coding_block_size,
            log2_min_luma_transform_block_size_minus2,
            log2_diff_max_min_luma_transform_block_size,
            max_transform_hierarchy_depth_inter,
            max_transform_hierarchy_depth_intra,
            scaling_list_enabled_flag,
            scaling_list_data,
            amp_enabled_flag,
            sample_adaptive_offset_enabled_flag,
            pcm,
            short_term_ref_pic_sets,
            long_term_ref_pics,
            sps_temporal_mvp_enabled_flag,
            strong_intra_smoothing_enabled_flag,
            vui_parameters,
        })
    }

    /// `SubWidthC`, ISO/IEC 23008-2 - Table 6-1.
    pub fn sub_width_c(&self) -> u64 {
        match (self.chroma_format_idc, self.separate_colour_plane_flag) {
            (1 | 2, false) => 2,
            _ => 1,
        }
    }

    /// `SubHeightC`, ISO/IEC 23008-2 - Table 6-1.
    pub fn sub_height_c(&self) -> u64 {
        match (self.chroma_format_idc, self.separate_colour_plane_flag) {
            (1, false) => 2,
            _ => 1,
        }
    }

    /// Picture width after the conformance window is applied.
    pub fn cropped_width(&self) -> u64 {
        let crop = self
            .conformance_window
            .map(|window| window.left_offset.saturating_add(window.right_offset))
            .unwrap_or(0);
        self.pic_width_in_luma_samples
            .saturating_sub(self.sub_width_c().saturating_mul(crop))
    }

    /// Picture height after the conformance window is applied.
    pub fn cropped_height(&self) -> u64 {
        let crop = self
            .conformance_window
            .map(|window| window.top_offset.saturating_add(window.bottom_offset))
            .unwrap_or(0);
        self.pic_height_in_luma_samples
            .saturating_sub(self.sub_height_c().saturating_mul(crop))
    }

    /// `BitDepthY`
    pub fn bit_depth_y(&self) -> u64 {
        self.bit_depth_luma_minus8 + 8
    }

    /// `BitDepthC`
    pub fn bit_depth_c(&self) -> u64 {
        self.bit_depth_chroma_minus8 + 8
    }
}

/// Conformance cropping window, in chroma sample units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConformanceWindow {
    /// `conf_win_left_offset`
    pub left_offset: u64,
    /// `conf_win_right_offset`
    pub right_offset: u64,
    /// `conf_win_top_offset`
    pub top_offset: u64,
    /// `conf_win_bottom_offset`
    pub bottom_offset: u64,
}

/// PCM sample parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pcm {
    /// `pcm_sample_bit_depth_luma_minus1`
    pub pcm_sample_bit_depth_luma_minus1: u8,
    /// `pcm_sample_bit_depth_chroma_minus1`
    pub pcm_sample_bit_depth_chroma_minus1: u8,
    /// `log2_min_pcm_luma_coding_block_size_minus3`
    pub log2_min_pcm_luma_coding_block_size_minus3: u64,
    /// `log2_diff_max_min_pcm_luma_coding_block_size`
    pub log2_diff_max_min_pcm_luma_coding_block_size: u64,
    /// `pcm_loop_filter_disabled_flag`
    pub pcm_loop_filter_disabled_flag: bool,
}
