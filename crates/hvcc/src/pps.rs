use std::io;

use bytes_util::{BitReader, EmulationPreventionIo};
use expgolomb::BitReaderExpGolombExt;

use crate::{HvccError, NALUnitHeader, NALUnitType, ParallelismType};

/// Picture parameter set contained in a NAL unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PpsNALUnit {
    /// The NAL unit header.
    pub nal_unit_header: NALUnitHeader,
    /// The PPS RBSP.
    pub rbsp: PpsRbsp,
}

impl PpsNALUnit {
    /// Parses a PPS NAL unit, header included, emulation prevention bytes
    /// still in place.
    pub fn parse(reader: impl io::Read) -> Result<Self, HvccError> {
        let mut bit_reader = BitReader::new(EmulationPreventionIo::new(reader));
        let nal_unit_header = NALUnitHeader::parse_expecting(&mut bit_reader, NALUnitType::PpsNut)?;
        let rbsp = PpsRbsp::parse(&mut bit_reader)?;

        Ok(Self { nal_unit_header, rbsp })
    }
}

/// Picture parameter set RBSP, up to `entropy_coding_sync_enabled_flag`.
///
/// `pic_parameter_set_rbsp()`
///
/// - ISO/IEC 23008-2 - 7.3.2.3.1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpsRbsp {
    /// `pps_pic_parameter_set_id`
    pub pps_pic_parameter_set_id: u64,
    /// `pps_seq_parameter_set_id`
    pub pps_seq_parameter_set_id: u64,
    /// `dependent_slice_segments_enabled_flag`
    pub dependent_slice_segments_enabled_flag: bool,
    /// `output_flag_present_flag`
    pub output_flag_present_flag: bool,
    /// `num_extra_slice_header_bits`
    pub num_extra_slice_header_bits: u8,
    /// `sign_data_hiding_enabled_flag`
    pub sign_data_hiding_enabled_flag: bool,
    /// `cabac_init_present_flag`
    pub cabac_init_present_flag: bool,
    /// `num_ref_idx_l0_default_active_minus1`
    pub num_ref_idx_l0_default_active_minus1: u64,
    /// `num_ref_idx_l1_default_active_minus1`
    pub num_ref_idx_l1_default_active_minus1: u64,
    /// `init_qp_minus26`
    pub init_qp_minus26: i64,
    /// `constrained_intra_pred_flag`
    pub constrained_intra_pred_flag: bool,
    /// `transform_skip_enabled_flag`
    pub transform_skip_enabled_flag: bool,
    /// `diff_cu_qp_delta_depth`, if `cu_qp_delta_enabled_flag` is `true`.
    pub diff_cu_qp_delta_depth: Option<u64>,
    /// `pps_cb_qp_offset`
    pub pps_cb_qp_offset: i64,
    /// `pps_cr_qp_offset`
    pub pps_cr_qp_offset: i64,
    /// `pps_slice_chroma_qp_offsets_present_flag`
    pub pps_slice_chroma_qp_offsets_present_flag: bool,
    /// `weighted_pred_flag`
    pub weighted_pred_flag: bool,
    /// `weighted_bipred_flag`
    pub weighted_bipred_flag: bool,
    /// `transquant_bypass_enabled_flag`
    pub transquant_bypass_enabled_flag: bool,
    /// `tiles_enabled_flag`
    pub tiles_enabled_flag: bool,
    /// `entropy_coding_sync_enabled_flag`
    pub entropy_coding_sync_enabled_flag: bool,
}

impl PpsRbsp {
    fn parse<R: io::Read>(bit_reader: &mut BitReader<R>) -> io::Result<Self> {
        let pps_pic_parameter_set_id = bit_reader.read_exp_golomb()?;
        let pps_seq_parameter_set_id = bit_reader.read_exp_golomb()?;

        let dependent_slice_segments_enabled_flag = bit_reader.read_bit()?;
        let output_flag_present_flag = bit_reader.read_bit()?;
        let num_extra_slice_header_bits = bit_reader.read_bits(3)? as u8;
        let sign_data_hiding_enabled_flag = bit_reader.read_bit()?;
        let cabac_init_present_flag = bit_reader.read_bit()?;

        let num_ref_idx_l0_default_active_minus1 = bit_reader.read_exp_golomb()?;
        let num_ref_idx_l1_default_active_minus1 = bit_reader.read_exp_golomb()?;
        let init_qp_minus26 = bit_reader.read_signed_exp_golomb()?;

        let constrained_intra_pred_flag = bit_reader.read_bit()?;
        let transform_skip_enabled_flag = bit_reader.read_bit()?;

        let mut diff_cu_qp_delta_depth = None;
        let cu_qp_delta_enabled_flag = bit_reader.read_bit()?;
        if cu_qp_delta_enabled_flag {
            diff_cu_qp_delta_depth = Some(bit_reader.read_exp_golomb()?);
        }

        let pps_cb_qp_offset = bit_reader.read_signed_exp_golomb()?;
        let pps_cr_qp_offset = bit_reader.read_signed_exp_golomb()?;

        let pps_slice_chroma_qp_offsets_present_flag = bit_reader.read_bit()?;
        let weighted_pred_flag = bit_reader.read_bit()?;
        let weighted_bipred_flag = bit_reader.read_bit()?;
        let transquant_bypass_enabled_flag = bit_reader.read_bit()?;
        let tiles_enabled_flag = bit_reader.read_bit()?;
        let entropy_coding_sync_enabled_flag = bit_reader.read_bit()?;

        Ok(Self {
            pps_pic_parameter_set_id,
            pps_seq_parameter_set_id,
            dependent_slice_segments_enabled_flag,
            output_flag_present_flag,
            num_extra_slice_header_bits,
            sign_data_hiding_enabled_flag,
            cabac_init_present_flag,
            num_ref_idx_l0_default_active_minus1,
            num_ref_idx_l1_default_active_minus1,
            init_qp_minus26,
            constrained_intra_pred_flag,
            transform_skip_enabled_flag,
            diff_cu_qp_delta_depth,
            pps_cb_qp_offset,
            pps_cr_qp_offset,
            pps_slice_chroma_qp_offsets_present_flag,
            weighted_pred_flag,
            weighted_bipred_flag,
            transquant_bypass_enabled_flag,
            tiles_enabled_flag,
            entropy_coding_sync_enabled_flag,
        })
    }

    /// The `parallelismType` this PPS allows.
    pub fn parallelism_type(&self) -> ParallelismType {
        ParallelismType::from_pps_flags(self.tiles_enabled_flag, self.entropy_coding_sync_enabled_flag)
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::io;

    use bytes_util::{BitWriter, EmulationPreventionIo};
    use expgolomb::BitWriterExpGolombExt;

    use super::PpsNALUnit;
    use crate::{HvccError, ParallelismType};

    fn build_pps(tiles: bool, sync: bool) -> Vec<u8> {
        let mut writer = BitWriter::new(EmulationPreventionIo::new(Vec::new()));
        writer.write_bits(0x4401, 16).unwrap();
        writer.write_exp_golomb(2).unwrap(); // pps_pic_parameter_set_id
        writer.write_exp_golomb(1).unwrap(); // pps_seq_parameter_set_id
        writer.write_bits(0b0101001, 7).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_exp_golomb(1).unwrap();
        writer.write_signed_exp_golomb(-4).unwrap(); // init_qp_minus26
        writer.write_bits(0b00, 2).unwrap();
        writer.write_bit(false).unwrap(); // cu_qp_delta_enabled_flag
        writer.write_signed_exp_golomb(2).unwrap();
        writer.write_signed_exp_golomb(-2).unwrap();
        writer.write_bits(0b1010, 4).unwrap();
        writer.write_bit(tiles).unwrap();
        writer.write_bit(sync).unwrap();
        writer.write_bits(0b11, 2).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_parse_pps() {
        let data = [0x44, 0x01, 0xc0, 0x93, 0x7c, 0x0c, 0xc9];

        let pps = PpsNALUnit::parse(io::Cursor::new(data)).unwrap().rbsp;
        assert_eq!(pps.pps_pic_parameter_set_id, 0);
        assert_eq!(pps.pps_seq_parameter_set_id, 0);
        assert!(pps.cabac_init_present_flag);
        assert_eq!(pps.num_ref_idx_l0_default_active_minus1, 3);
        assert_eq!(pps.num_ref_idx_l1_default_active_minus1, 0);
        assert_eq!(pps.init_qp_minus26, 0);
        assert!(pps.transform_skip_enabled_flag);
        assert_eq!(pps.diff_cu_qp_delta_depth, Some(0));
        assert!(!pps.tiles_enabled_flag);
        assert!(!pps.entropy_coding_sync_enabled_flag);
        assert_eq!(pps.parallelism_type(), ParallelismType::Slice);
    }

    #[test]
    fn test_parse_synthesized() {
        let pps = PpsNALUnit::parse(io::Cursor::new(build_pps(true, false))).unwrap().rbsp;

        assert_eq!(pps.pps_pic_parameter_set_id, 2);
        assert_eq!(pps.pps_seq_parameter_set_id, 1);
        assert!(pps.output_flag_present_flag);
        assert_eq!(pps.num_extra_slice_header_bits, 0b010);
        assert!(pps.cabac_init_present_flag);
        assert_eq!(pps.init_qp_minus26, -4);
        assert_eq!(pps.diff_cu_qp_delta_depth, None);
        assert_eq!(pps.pps_cb_qp_offset, 2);
        assert_eq!(pps.pps_cr_qp_offset, -2);
        assert!(pps.pps_slice_chroma_qp_offsets_present_flag);
        assert!(!pps.weighted_pred_flag);
        assert!(pps.weighted_bipred_flag);
        assert!(!pps.transquant_bypass_enabled_flag);
    }

    #[test]
    fn test_parallelism_type() {
        let cases = [
            (false, false, ParallelismType::Slice),
            (true, false, ParallelismType::Tile),
            (false, true, ParallelismType::EntropyCodingSync),
            (true, true, ParallelismType::MixedOrUnknown),
        ];

        for (tiles, sync, expected) in cases {
            let pps = PpsNALUnit::parse(io::Cursor::new(build_pps(tiles, sync))).unwrap().rbsp;
            assert_eq!(pps.parallelism_type(), expected, "tiles={tiles} sync={sync}");
        }
    }

    #[test]
    fn test_forbidden_zero_bit() {
        let err = PpsNALUnit::parse(io::Cursor::new([0xc4, 0x01, 0xc0])).unwrap_err();
        assert!(err.is_invalid_data());
    }

    #[test]
    fn test_truncated() {
        let err = PpsNALUnit::parse(io::Cursor::new([0x44, 0x01, 0xc0])).unwrap_err();
        assert!(matches!(err, HvccError::InvalidData(_)));
    }
}
