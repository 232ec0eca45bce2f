use std::io;

use byteorder::ReadBytesExt;
use bytes_util::{BitReader, range_check};
use expgolomb::BitReaderExpGolombExt;

/// HRD parameters.
///
/// `hrd_parameters(commonInfPresentFlag, maxNumSubLayersMinus1)`
///
/// - ISO/IEC 23008-2 - E.2.2
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HrdParameters {
    /// `nal_hrd_parameters_present_flag`
    pub nal_hrd_parameters_present_flag: bool,
    /// `vcl_hrd_parameters_present_flag`
    pub vcl_hrd_parameters_present_flag: bool,
    /// Sub-picture timing, if `sub_pic_hrd_params_present_flag` is set.
    pub sub_pic_hrd_params: Option<SubPicHrdParams>,
    /// `bit_rate_scale`, 4 bits.
    pub bit_rate_scale: u8,
    /// `cpb_size_scale`, 4 bits.
    pub cpb_size_scale: u8,
    /// One entry per sub-layer, `0..=maxNumSubLayersMinus1`.
    pub sub_layers: Vec<HrdSubLayer>,
}

/// Sub-picture fields of the common HRD information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubPicHrdParams {
    /// `tick_divisor_minus2`
    pub tick_divisor_minus2: u8,
    /// `du_cpb_removal_delay_increment_length_minus1`
    pub du_cpb_removal_delay_increment_length_minus1: u8,
    /// `sub_pic_cpb_params_in_pic_timing_sei_flag`
    pub sub_pic_cpb_params_in_pic_timing_sei_flag: bool,
    /// `dpb_output_delay_du_length_minus1`
    pub dpb_output_delay_du_length_minus1: u8,
    /// `cpb_size_du_scale`
    pub cpb_size_du_scale: u8,
}

impl HrdParameters {
    pub(crate) fn parse<R: io::Read>(
        bit_reader: &mut BitReader<R>,
        common_inf_present_flag: bool,
        max_sub_layers_minus1: u8,
    ) -> io::Result<Self> {
        let mut hrd = Self::default();

        if common_inf_present_flag {
            hrd.nal_hrd_parameters_present_flag = bit_reader.read_bit()?;
            hrd.vcl_hrd_parameters_present_flag = bit_reader.read_bit()?;

            if hrd.nal_hrd_parameters_present_flag || hrd.vcl_hrd_parameters_present_flag {
                let sub_pic_hrd_params_present_flag = bit_reader.read_bit()?;
                let mut sub_pic = None;
                if sub_pic_hrd_params_present_flag {
                    sub_pic = Some(SubPicHrdParams {
                        tick_divisor_minus2: bit_reader.read_u8()?,
                        du_cpb_removal_delay_increment_length_minus1: bit_reader.read_bits(5)? as u8,
                        sub_pic_cpb_params_in_pic_timing_sei_flag: bit_reader.read_bit()?,
                        dpb_output_delay_du_length_minus1: bit_reader.read_bits(5)? as u8,
                        cpb_size_du_scale: 0,
                    });
                }

                hrd.bit_rate_scale = bit_reader.read_bits(4)? as u8;
                hrd.cpb_size_scale = bit_reader.read_bits(4)? as u8;

                if let Some(sub_pic) = sub_pic.as_mut() {
                    sub_pic.cpb_size_du_scale = bit_reader.read_bits(4)? as u8;
                }
                hrd.sub_pic_hrd_params = sub_pic;

                // initial_cpb_removal_delay_length_minus1
                // au_cpb_removal_delay_length_minus1
                // dpb_output_delay_length_minus1
                bit_reader.skip_bits(15)?;
            }
        }

        for _ in 0..=max_sub_layers_minus1 {
            let sub_layer = HrdSubLayer::parse(
                bit_reader,
                hrd.sub_pic_hrd_params.is_some(),
                hrd.nal_hrd_parameters_present_flag,
                hrd.vcl_hrd_parameters_present_flag,
            )?;
            hrd.sub_layers.push(sub_layer);
        }

        Ok(hrd)
    }
}

/// Per sub-layer part of [`HrdParameters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HrdSubLayer {
    /// `fixed_pic_rate_general_flag[i]`
    pub fixed_pic_rate_general_flag: bool,
    /// `fixed_pic_rate_within_cvs_flag[i]`, inferred to be `true` when the
    /// general flag is set.
    pub fixed_pic_rate_within_cvs_flag: bool,
    /// `elemental_duration_in_tc_minus1[i]`, in range \[0, 2047\].
    pub elemental_duration_in_tc_minus1: Option<u64>,
    /// `low_delay_hrd_flag[i]`
    pub low_delay_hrd_flag: bool,
    /// `cpb_cnt_minus1[i]`, in range \[0, 31\].
    pub cpb_cnt_minus1: u64,
    /// NAL HRD CPB specifications, empty without `nal_hrd_parameters_present_flag`.
    pub nal_cpb: Vec<CpbSpec>,
    /// VCL HRD CPB specifications, empty without `vcl_hrd_parameters_present_flag`.
    pub vcl_cpb: Vec<CpbSpec>,
}

impl HrdSubLayer {
    fn parse<R: io::Read>(
        bit_reader: &mut BitReader<R>,
        sub_pic_hrd_params_present_flag: bool,
        nal_hrd_parameters_present_flag: bool,
        vcl_hrd_parameters_present_flag: bool,
    ) -> io::Result<Self> {
        let fixed_pic_rate_general_flag = bit_reader.read_bit()?;

        let mut fixed_pic_rate_within_cvs_flag = true;
        if !fixed_pic_rate_general_flag {
            fixed_pic_rate_within_cvs_flag = bit_reader.read_bit()?;
        }

        let mut elemental_duration_in_tc_minus1 = None;
        let mut low_delay_hrd_flag = false;
        if fixed_pic_rate_within_cvs_flag {
            let elemental_duration = bit_reader.read_exp_golomb()?;
            range_check!(elemental_duration, 0, 2047)?;
            elemental_duration_in_tc_minus1 = Some(elemental_duration);
        } else {
            low_delay_hrd_flag = bit_reader.read_bit()?;
        }

        let mut cpb_cnt_minus1 = 0;
        if !low_delay_hrd_flag {
            cpb_cnt_minus1 = bit_reader.read_exp_golomb()?;
            range_check!(cpb_cnt_minus1, 0, 31)?;
        }

        let mut nal_cpb = Vec::new();
        if nal_hrd_parameters_present_flag {
            nal_cpb = CpbSpec::parse_all(bit_reader, cpb_cnt_minus1 + 1, sub_pic_hrd_params_present_flag)?;
        }

        let mut vcl_cpb = Vec::new();
        if vcl_hrd_parameters_present_flag {
            vcl_cpb = CpbSpec::parse_all(bit_reader, cpb_cnt_minus1 + 1, sub_pic_hrd_params_present_flag)?;
        }

        Ok(Self {
            fixed_pic_rate_general_flag,
            fixed_pic_rate_within_cvs_flag,
            elemental_duration_in_tc_minus1,
            low_delay_hrd_flag,
            cpb_cnt_minus1,
            nal_cpb,
            vcl_cpb,
        })
    }
}

/// One CPB specification of `sub_layer_hrd_parameters(subLayerId)`.
///
/// - ISO/IEC 23008-2 - E.2.3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpbSpec {
    /// `bit_rate_value_minus1[i]`
    pub bit_rate_value_minus1: u64,
    /// `cpb_size_value_minus1[i]`
    pub cpb_size_value_minus1: u64,
    /// `cpb_size_du_value_minus1[i]` and `bit_rate_du_value_minus1[i]`, with
    /// sub-picture HRD parameters only.
    pub du_values_minus1: Option<(u64, u64)>,
    /// `cbr_flag[i]`
    pub cbr_flag: bool,
}

impl CpbSpec {
    fn parse_all<R: io::Read>(
        bit_reader: &mut BitReader<R>,
        cpb_cnt: u64,
        sub_pic_hrd_params_present_flag: bool,
    ) -> io::Result<Vec<Self>> {
        let mut specs = Vec::with_capacity(cpb_cnt as usize);

        for _ in 0..cpb_cnt {
            let bit_rate_value_minus1 = bit_reader.read_exp_golomb()?;
            let cpb_size_value_minus1 = bit_reader.read_exp_golomb()?;

            let mut du_values_minus1 = None;
            if sub_pic_hrd_params_present_flag {
                let cpb_size_du_value_minus1 = bit_reader.read_exp_golomb()?;
                let bit_rate_du_value_minus1 = bit_reader.read_exp_golomb()?;
                du_values_minus1 = Some((cpb_size_du_value_minus1, bit_rate_du_value_minus1));
            }

            specs.push(Self {
                bit_rate_value_minus1,
                cpb_size_value_minus1,
                du_values_minus1,
                cbr_flag: bit_reader.read_bit()?,
            });
        }

        Ok(specs)
    }
}
