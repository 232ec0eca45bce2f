use std::io;

use byteorder::{BigEndian, ReadBytesExt};
use bytes_util::{BitReader, range_check};
use expgolomb::BitReaderExpGolombExt;

use crate::{EXTENDED_SAR, HrdParameters, SampleAspectRatio};

/// VUI parameters.
///
/// Every branch is decoded so the cursor stays aligned, only a subset of the
/// values ends up in the configuration record.
///
/// `vui_parameters()`
///
/// - ISO/IEC 23008-2 - E.2.1
/// - ISO/IEC 23008-2 - E.3.1
#[derive(Debug, Clone, PartialEq)]
pub struct VuiParameters {
    /// Sample aspect ratio, `None` when `aspect_ratio_info_present_flag` is `false`
    /// or `aspect_ratio_idc` is reserved.
    pub sample_aspect_ratio: Option<SampleAspectRatio>,
    /// `overscan_appropriate_flag`, if `overscan_info_present_flag` is `true`.
    pub overscan_appropriate_flag: Option<bool>,
    /// See [`VideoSignalType`].
    pub video_signal_type: Option<VideoSignalType>,
    /// See [`ChromaLocInfo`].
    pub chroma_loc_info: Option<ChromaLocInfo>,
    /// `neutral_chroma_indication_flag`
    pub neutral_chroma_indication_flag: bool,
    /// `field_seq_flag`
    pub field_seq_flag: bool,
    /// `frame_field_info_present_flag`
    pub frame_field_info_present_flag: bool,
    /// See [`DefaultDisplayWindow`].
    pub default_display_window: Option<DefaultDisplayWindow>,
    /// See [`VuiTimingInfo`].
    pub timing_info: Option<VuiTimingInfo>,
    /// See [`BitstreamRestriction`].
    pub bitstream_restriction: Option<BitstreamRestriction>,
}

impl VuiParameters {
    pub(crate) fn parse<R: io::Read>(bit_reader: &mut BitReader<R>, sps_max_sub_layers_minus1: u8) -> io::Result<Self> {
        let mut sample_aspect_ratio = None;
        let aspect_ratio_info_present_flag = bit_reader.read_bit()?;
        if aspect_ratio_info_present_flag {
            let aspect_ratio_idc = bit_reader.read_u8()?;
            if aspect_ratio_idc == EXTENDED_SAR {
                let num = bit_reader.read_u16::<BigEndian>()?;
                let den = bit_reader.read_u16::<BigEndian>()?;
                sample_aspect_ratio = Some(SampleAspectRatio { num, den });
            } else {
                sample_aspect_ratio = SampleAspectRatio::from_idc(aspect_ratio_idc);
            }
        }

        let mut overscan_appropriate_flag = None;
        let overscan_info_present_flag = bit_reader.read_bit()?;
        if overscan_info_present_flag {
            overscan_appropriate_flag = Some(bit_reader.read_bit()?);
        }

        let mut video_signal_type = None;
        let video_signal_type_present_flag = bit_reader.read_bit()?;
        if video_signal_type_present_flag {
            let video_format = bit_reader.read_bits(3)? as u8;
            let video_full_range_flag = bit_reader.read_bit()?;

            let mut colour_description = None;
            let colour_description_present_flag = bit_reader.read_bit()?;
            if colour_description_present_flag {
                colour_description = Some(ColourDescription {
                    colour_primaries: bit_reader.read_u8()?,
                    transfer_characteristics: bit_reader.read_u8()?,
                    matrix_coeffs: bit_reader.read_u8()?,
                });
            }

            video_signal_type = Some(VideoSignalType {
                video_format,
                video_full_range_flag,
                colour_description,
            });
        }

        let mut chroma_loc_info = None;
        let chroma_loc_info_present_flag = bit_reader.read_bit()?;
        if chroma_loc_info_present_flag {
            chroma_loc_info = Some(ChromaLocInfo {
                top_field: bit_reader.read_exp_golomb()?,
                bottom_field: bit_reader.read_exp_golomb()?,
            });
        }

        let neutral_chroma_indication_flag = bit_reader.read_bit()?;
        let field_seq_flag = bit_reader.read_bit()?;
        let frame_field_info_present_flag = bit_reader.read_bit()?;

        let mut default_display_window = None;
        let default_display_window_flag = bit_reader.read_bit()?;
        if default_display_window_flag {
            default_display_window = Some(DefaultDisplayWindow {
                left_offset: bit_reader.read_exp_golomb()?,
                right_offset: bit_reader.read_exp_golomb()?,
                top_offset: bit_reader.read_exp_golomb()?,
                bottom_offset: bit_reader.read_exp_golomb()?,
            });
        }

        let mut timing_info = None;
        let vui_timing_info_present_flag = bit_reader.read_bit()?;
        if vui_timing_info_present_flag {
            let num_units_in_tick = bit_reader.read_u32::<BigEndian>()?;
            let time_scale = bit_reader.read_u32::<BigEndian>()?;

            let mut num_ticks_poc_diff_one_minus1 = None;
            let vui_poc_proportional_to_timing_flag = bit_reader.read_bit()?;
            if vui_poc_proportional_to_timing_flag {
                num_ticks_poc_diff_one_minus1 = Some(bit_reader.read_exp_golomb()?);
            }

            let mut hrd_parameters = None;
            let vui_hrd_parameters_present_flag = bit_reader.read_bit()?;
            if vui_hrd_parameters_present_flag {
                hrd_parameters = Some(HrdParameters::parse(bit_reader, true, sps_max_sub_layers_minus1)?);
            }

            timing_info = Some(VuiTimingInfo {
                num_units_in_tick,
                time_scale,
                num_ticks_poc_diff_one_minus1,
                hrd_parameters,
            });
        }

        let mut bitstream_restriction = None;
        let bitstream_restriction_flag = bit_reader.read_bit()?;
        if bitstream_restriction_flag {
            let tiles_fixed_structure_flag = bit_reader.read_bit()?;
            let motion_vectors_over_pic_boundaries_flag = bit_reader.read_bit()?;
            let restricted_ref_pic_lists_flag = bit_reader.read_bit()?;

            let min_spatial_segmentation_idc = bit_reader.read_exp_golomb()?;
            range_check!(min_spatial_segmentation_idc, 0, 4095)?;

            bitstream_restriction = Some(BitstreamRestriction {
                tiles_fixed_structure_flag,
                motion_vectors_over_pic_boundaries_flag,
                restricted_ref_pic_lists_flag,
                min_spatial_segmentation_idc: min_spatial_segmentation_idc as u16,
                max_bytes_per_pic_denom: bit_reader.read_exp_golomb()?,
                max_bits_per_min_cu_denom: bit_reader.read_exp_golomb()?,
                log2_max_mv_length_horizontal: bit_reader.read_exp_golomb()?,
                log2_max_mv_length_vertical: bit_reader.read_exp_golomb()?,
            });
        }

        Ok(Self {
            sample_aspect_ratio,
            overscan_appropriate_flag,
            video_signal_type,
            chroma_loc_info,
            neutral_chroma_indication_flag,
            field_seq_flag,
            frame_field_info_present_flag,
            default_display_window,
            timing_info,
            bitstream_restriction,
        })
    }

    /// `min_spatial_segmentation_idc`, only known when `bitstream_restriction_flag` is set.
    pub fn min_spatial_segmentation_idc(&self) -> Option<u16> {
        self.bitstream_restriction
            .as_ref()
            .map(|restriction| restriction.min_spatial_segmentation_idc)
    }
}

/// Directly part of [`VuiParameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoSignalType {
    /// `video_format`, ISO/IEC 23008-2 - Table E.2.
    pub video_format: u8,
    /// `video_full_range_flag`
    pub video_full_range_flag: bool,
    /// Present if `colour_description_present_flag` is `true`.
    pub colour_description: Option<ColourDescription>,
}

/// `colour_primaries`, `transfer_characteristics` and `matrix_coeffs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColourDescription {
    /// ISO/IEC 23008-2 - Table E.3
    pub colour_primaries: u8,
    /// ISO/IEC 23008-2 - Table E.4
    pub transfer_characteristics: u8,
    /// ISO/IEC 23008-2 - Table E.5
    pub matrix_coeffs: u8,
}

/// Directly part of [`VuiParameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromaLocInfo {
    /// `chroma_sample_loc_type_top_field`
    pub top_field: u64,
    /// `chroma_sample_loc_type_bottom_field`
    pub bottom_field: u64,
}

/// Directly part of [`VuiParameters`]. Offsets are in chroma sample units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultDisplayWindow {
    /// `def_disp_win_left_offset`
    pub left_offset: u64,
    /// `def_disp_win_right_offset`
    pub right_offset: u64,
    /// `def_disp_win_top_offset`
    pub top_offset: u64,
    /// `def_disp_win_bottom_offset`
    pub bottom_offset: u64,
}

/// Directly part of [`VuiParameters`].
#[derive(Debug, Clone, PartialEq)]
pub struct VuiTimingInfo {
    /// `vui_num_units_in_tick`
    pub num_units_in_tick: u32,
    /// `vui_time_scale`
    pub time_scale: u32,
    /// `vui_num_ticks_poc_diff_one_minus1`, if `vui_poc_proportional_to_timing_flag` is `true`.
    pub num_ticks_poc_diff_one_minus1: Option<u64>,
    /// `hrd_parameters(1, sps_max_sub_layers_minus1)`, if `vui_hrd_parameters_present_flag` is `true`.
    pub hrd_parameters: Option<HrdParameters>,
}

impl VuiTimingInfo {
    /// `time_scale / num_units_in_tick`, `None` when either is zero.
    pub fn frame_rate(&self) -> Option<f64> {
        if self.num_units_in_tick == 0 || self.time_scale == 0 {
            return None;
        }

        Some(self.time_scale as f64 / self.num_units_in_tick as f64)
    }
}

/// Directly part of [`VuiParameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitstreamRestriction {
    /// `tiles_fixed_structure_flag`
    pub tiles_fixed_structure_flag: bool,
    /// `motion_vectors_over_pic_boundaries_flag`
    pub motion_vectors_over_pic_boundaries_flag: bool,
    /// `restricted_ref_pic_lists_flag`
    pub restricted_ref_pic_lists_flag: bool,
    /// `min_spatial_segmentation_idc`, in the range 0 to 4095.
    pub min_spatial_segmentation_idc: u16,
    /// `max_bytes_per_pic_denom`
    pub max_bytes_per_pic_denom: u64,
    /// `max_bits_per_min_cu_denom`
    pub max_bits_per_min_cu_denom: u64,
    /// `log2_max_mv_length_horizontal`
    pub log2_max_mv_length_horizontal: u64,
    /// `log2_max_mv_length_vertical`
    pub log2_max_mv_length_vertical: u64,
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::io;

    use bytes_util::{BitReader, BitWriter};
    use expgolomb::BitWriterExpGolombExt;

    use super::*;

    #[test]
    fn test_nothing_present() {
        let mut writer = BitWriter::<Vec<u8>>::default();
        writer.write_bits(0, 10).unwrap();
        writer.write_bits(0b111111, 6).unwrap();
        let data = writer.finish().unwrap();

        let mut reader = BitReader::new_from_slice(data);
        let vui = VuiParameters::parse(&mut reader, 0).unwrap();

        assert_eq!(reader.bits_consumed(), 10);
        assert_eq!(vui.sample_aspect_ratio, None);
        assert_eq!(vui.video_signal_type, None);
        assert_eq!(vui.timing_info, None);
        assert_eq!(vui.min_spatial_segmentation_idc(), None);
    }

    #[test]
    fn test_everything_present() {
        let mut writer = BitWriter::<Vec<u8>>::default();

        writer.write_bit(true).unwrap();
        writer.write_bits(EXTENDED_SAR as u64, 8).unwrap();
        writer.write_bits(4, 16).unwrap();
        writer.write_bits(3, 16).unwrap();

        writer.write_bit(true).unwrap();
        writer.write_bit(false).unwrap(); // overscan_appropriate_flag

        writer.write_bit(true).unwrap();
        writer.write_bits(5, 3).unwrap(); // video_format
        writer.write_bit(true).unwrap(); // video_full_range_flag
        writer.write_bit(true).unwrap();
        writer.write_bits(9, 8).unwrap();
        writer.write_bits(16, 8).unwrap();
        writer.write_bits(9, 8).unwrap();

        writer.write_bit(true).unwrap();
        writer.write_exp_golomb(2).unwrap();
        writer.write_exp_golomb(2).unwrap();

        writer.write_bits(0b010, 3).unwrap();

        writer.write_bit(true).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_exp_golomb(4).unwrap();
        writer.write_exp_golomb(4).unwrap();

        writer.write_bit(true).unwrap();
        writer.write_bits(1001, 32).unwrap();
        writer.write_bits(60000, 32).unwrap();
        writer.write_bit(true).unwrap();
        writer.write_exp_golomb(1).unwrap();
        writer.write_bit(true).unwrap(); // vui_hrd_parameters_present_flag
        writer.write_bit(false).unwrap(); // nal_hrd_parameters_present_flag
        writer.write_bit(false).unwrap(); // vcl_hrd_parameters_present_flag
        writer.write_bit(false).unwrap(); // fixed_pic_rate_general_flag
        writer.write_bit(false).unwrap(); // fixed_pic_rate_within_cvs_flag
        writer.write_bit(true).unwrap(); // low_delay_hrd_flag

        writer.write_bit(true).unwrap();
        writer.write_bits(0b101, 3).unwrap();
        writer.write_exp_golomb(0).unwrap(); // min_spatial_segmentation_idc
        writer.write_exp_golomb(2).unwrap();
        writer.write_exp_golomb(1).unwrap();
        writer.write_exp_golomb(15).unwrap();
        writer.write_exp_golomb(15).unwrap();
        let data = writer.finish().unwrap();

        let vui = VuiParameters::parse(&mut BitReader::new_from_slice(data), 0).unwrap();

        assert_eq!(vui.sample_aspect_ratio, Some(SampleAspectRatio { num: 4, den: 3 }));
        assert_eq!(vui.overscan_appropriate_flag, Some(false));
        assert_eq!(
            vui.video_signal_type,
            Some(VideoSignalType {
                video_format: 5,
                video_full_range_flag: true,
                colour_description: Some(ColourDescription {
                    colour_primaries: 9,
                    transfer_characteristics: 16,
                    matrix_coeffs: 9,
                }),
            })
        );
        assert_eq!(
            vui.chroma_loc_info,
            Some(ChromaLocInfo {
                top_field: 2,
                bottom_field: 2,
            })
        );
        assert!(!vui.neutral_chroma_indication_flag);
        assert!(vui.field_seq_flag);
        assert!(!vui.frame_field_info_present_flag);
        assert_eq!(vui.default_display_window.unwrap().bottom_offset, 4);

        let timing = vui.timing_info.as_ref().unwrap();
        assert_eq!(timing.num_units_in_tick, 1001);
        assert_eq!(timing.time_scale, 60000);
        assert_eq!(timing.num_ticks_poc_diff_one_minus1, Some(1));
        let hrd = timing.hrd_parameters.as_ref().unwrap();
        assert!(hrd.sub_layers[0].low_delay_hrd_flag);
        assert!((timing.frame_rate().unwrap() - 59.94).abs() < 0.01);

        let restriction = vui.bitstream_restriction.unwrap();
        assert!(restriction.tiles_fixed_structure_flag);
        assert!(!restriction.motion_vectors_over_pic_boundaries_flag);
        assert!(restriction.restricted_ref_pic_lists_flag);
        assert_eq!(restriction.max_bytes_per_pic_denom, 2);
        assert_eq!(restriction.log2_max_mv_length_vertical, 15);
        assert_eq!(vui.min_spatial_segmentation_idc(), Some(0));
    }

    #[test]
    fn test_reserved_aspect_ratio() {
        let mut writer = BitWriter::<Vec<u8>>::default();
        writer.write_bit(true).unwrap();
        writer.write_bits(200, 8).unwrap();
        writer.write_bits(0, 9).unwrap();
        let data = writer.finish().unwrap();

        let mut reader = BitReader::new_from_slice(data);
        let vui = VuiParameters::parse(&mut reader, 0).unwrap();
        assert_eq!(vui.sample_aspect_ratio, None);
        assert_eq!(reader.bits_consumed(), 18);
    }

    #[test]
    fn test_min_spatial_segmentation_out_of_range() {
        let mut writer = BitWriter::<Vec<u8>>::default();
        writer.write_bits(0, 9).unwrap();
        writer.write_bit(true).unwrap();
        writer.write_bits(0, 3).unwrap();
        writer.write_exp_golomb(4096).unwrap();
        let data = writer.finish().unwrap();

        let err = VuiParameters::parse(&mut BitReader::new_from_slice(data), 0).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_truncated() {
        let mut writer = BitWriter::<Vec<u8>>::default();
        writer.write_bit(true).unwrap();
        writer.write_bits(EXTENDED_SAR as u64, 8).unwrap();
        let data = writer.finish().unwrap();

        let err = VuiParameters::parse(&mut BitReader::new_from_slice(data), 0).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
