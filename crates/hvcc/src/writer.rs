//! Annex-B VPS/SPS/PPS to `hvcC`.

use std::io;

use bytes::Bytes;

use crate::annexb::{NalUnits, nal_unit_type_of, starts_with_start_code};
use crate::{HEVCDecoderConfigurationRecord, HvccError, NALUnitType, PpsNALUnit, SpsNALUnit, VpsNALUnit};

/// Options for [`write_hvcc_with_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HvccConfig {
    /// Written into the `array_completeness` bit of every NAL unit array.
    pub array_completeness: bool,
    /// Carry prefix and suffix SEI NAL units in their own arrays.
    pub include_sei: bool,
}

impl Default for HvccConfig {
    fn default() -> Self {
        Self {
            array_completeness: false,
            include_sei: true,
        }
    }
}

impl HvccConfig {
    /// Sets [`array_completeness`](Self::array_completeness).
    pub fn with_array_completeness(mut self, array_completeness: bool) -> Self {
        self.array_completeness = array_completeness;
        self
    }

    /// Sets [`include_sei`](Self::include_sei).
    pub fn with_include_sei(mut self, include_sei: bool) -> Self {
        self.include_sei = include_sei;
        self
    }
}

/// Writes the `hvcC` payload for the parameter sets in `data` to `sink`.
///
/// See [`write_hvcc_with_config`].
pub fn write_hvcc<W: io::Write>(sink: &mut W, data: &[u8]) -> Result<(), HvccError> {
    write_hvcc_with_config(sink, data, &HvccConfig::default())
}

/// Writes the `hvcC` payload for the parameter sets in `data` to `sink`.
///
/// `data` that does not start with a start code is taken to be an `hvcC`
/// already and is copied to `sink` unchanged. Otherwise every VPS, SPS and PPS
/// found is folded into one record and the serialized record is written in a
/// single call, nothing reaches `sink` if any parameter set fails to parse.
pub fn write_hvcc_with_config<W: io::Write>(sink: &mut W, data: &[u8], config: &HvccConfig) -> Result<(), HvccError> {
    if !starts_with_start_code(data) {
        tracing::debug!(size = data.len(), "no start code, writing data through");
        sink.write_all(data).map_err(HvccError::Io)?;
        return Ok(());
    }

    let record = build_record(data, config)?;

    let mut buf = Vec::new();
    buf.try_reserve(record.size() as usize)?;
    record.mux(&mut buf)?;

    sink.write_all(&buf).map_err(HvccError::Io)?;

    Ok(())
}

/// Builds and finalizes the record for the parameter sets of an Annex-B
/// buffer.
///
/// VPS, SPS and PPS may come in any order, at least one of each is required.
/// NAL units of other types are skipped, SEI is kept if the config says so.
pub fn build_record(data: &[u8], config: &HvccConfig) -> Result<HEVCDecoderConfigurationRecord, HvccError> {
    let mut record = HEVCDecoderConfigurationRecord::new();

    for nal in NalUnits::new(data) {
        let Some(nal_unit_type) = nal_unit_type_of(nal) else {
            continue;
        };

        match nal_unit_type {
            NALUnitType::VpsNut => record.update_from_vps(&VpsNALUnit::parse(nal)?.rbsp),
            NALUnitType::SpsNut => record.update_from_sps(&SpsNALUnit::parse(nal)?.rbsp),
            NALUnitType::PpsNut => record.update_from_pps(&PpsNALUnit::parse(nal)?.rbsp),
            ty if ty.is_sei() && config.include_sei => {}
            _ => continue,
        }

        if nal.len() > u16::MAX as usize {
            return Err(HvccError::InvalidData(format!(
                "{nal_unit_type} NAL unit too large: {} bytes",
                nal.len()
            )));
        }

        record.push_nalu(nal_unit_type, Bytes::copy_from_slice(nal), config.array_completeness);
    }

    for required in [NALUnitType::VpsNut, NALUnitType::SpsNut, NALUnitType::PpsNut] {
        if !record.arrays.iter().any(|array| array.nal_unit_type == required) {
            return Err(HvccError::InvalidData(format!("missing {required} NAL unit")));
        }
    }

    record.finalize();

    tracing::debug!(
        profile_idc = record.general_profile_idc,
        tier_flag = record.general_tier_flag,
        level_idc = record.general_level_idc,
        parallelism_type = ?record.parallelism_type,
        num_temporal_layers = record.num_temporal_layers,
        arrays = record.arrays.len(),
        "built hvcC record"
    );

    Ok(record)
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use bytes::Bytes;

    use super::{HvccConfig, build_record, write_hvcc, write_hvcc_with_config};
    use crate::{HvccError, NALUnitType, ParallelismType};

    const VPS: &[u8] = b"\x40\x01\x0c\x01\xff\xff\x01\x40\x00\x00\x03\x00\x90\x00\x00\x03\x00\x00\x03\x00\x99\x95\x40\x90";
    const SPS: &[u8] = b"\x42\x01\x01\x01\x40\x00\x00\x03\x00\x90\x00\x00\x03\x00\x00\x03\x00\x99\xa0\x01\x40\x20\x05\xa1\x65\x95\x52\x90\x84\x64\x5f\xf8\xc0\x5a\x80\x80\x80\x82\x00\x00\x03\x00\x02\x00\x00\x03\x01\x20\xc0\x0b\xbc\xa2\x00\x02\x62\x58\x00\x01\x31\x2d\x08";
    const PPS: &[u8] = b"\x44\x01\xc0\x93\x7c\x0c\xc9";
    const SEI: &[u8] = b"\x4e\x01\x05\x01\x80";

    fn annex_b(nals: &[&[u8]]) -> Vec<u8> {
        let mut data = Vec::new();
        for nal in nals {
            data.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]);
            data.extend_from_slice(nal);
        }
        data
    }

    #[test]
    fn test_write_hvcc() {
        let mut out = Vec::new();
        write_hvcc(&mut out, &annex_b(&[VPS, SPS, PPS])).unwrap();

        insta::assert_debug_snapshot!(Bytes::from(out), @r#"b"\x01\x01@\0\0\0\x90\0\0\0\0\0\x99\xf0\0\xfc\xfd\xf8\xf8\0\0\x0f\x03 \0\x01\0\x18@\x01\x0c\x01\xff\xff\x01@\0\0\x03\0\x90\0\0\x03\0\0\x03\0\x99\x95@\x90!\0\x01\0=B\x01\x01\x01@\0\0\x03\0\x90\0\0\x03\0\0\x03\0\x99\xa0\x01@ \x05\xa1e\x95R\x90\x84d_\xf8\xc0Z\x80\x80\x80\x82\0\0\x03\0\x02\0\0\x03\x01 \xc0\x0b\xbc\xa2\0\x02bX\0\x011-\x08\"\0\x01\0\x07D\x01\xc0\x93|\x0c\xc9""#);
    }

    #[test]
    fn test_parameter_set_order() {
        let forward = build_record(&annex_b(&[VPS, SPS, PPS]), &HvccConfig::default()).unwrap();
        let backward = build_record(&annex_b(&[PPS, SPS, VPS]), &HvccConfig::default()).unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward.general_level_idc, 153);
        assert_eq!(forward.min_spatial_segmentation_idc, 0);
        assert_eq!(forward.parallelism_type, ParallelismType::MixedOrUnknown);
        assert!(forward.temporal_id_nested);
    }

    #[test]
    fn test_pass_through() {
        let data = b"\x01\x01\x60\x00\x00\x00";
        let mut out = Vec::new();
        write_hvcc(&mut out, data).unwrap();
        assert_eq!(out, data);

        let mut out = Vec::new();
        write_hvcc(&mut out, &[]).unwrap();
        assert!(out.is_empty());

        let mut out = Vec::new();
        write_hvcc(&mut out, &[0x00, 0x00]).unwrap();
        assert_eq!(out, [0x00, 0x00]);
    }

    #[test]
    fn test_missing_vps() {
        let mut out = Vec::new();
        let err = write_hvcc(&mut out, &annex_b(&[SPS, PPS])).unwrap_err();

        assert!(matches!(&err, HvccError::InvalidData(msg) if msg == "missing VPS_NUT NAL unit"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_pps() {
        let err = build_record(&annex_b(&[VPS, SPS]), &HvccConfig::default()).unwrap_err();
        assert!(err.is_invalid_data());
    }

    #[test]
    fn test_forbidden_zero_bit() {
        let mut bad_sps = SPS.to_vec();
        bad_sps[0] |= 0x80;

        let mut out = Vec::new();
        let err = write_hvcc(&mut out, &annex_b(&[VPS, &bad_sps, PPS])).unwrap_err();
        assert!(err.is_invalid_data());
        assert!(out.is_empty());
    }

    #[test]
    fn test_sei_arrays() {
        let data = annex_b(&[VPS, SEI, SPS, PPS, &[0x26, 0x01, 0xaf]]);

        let record = build_record(&data, &HvccConfig::default()).unwrap();
        let types: Vec<_> = record.arrays.iter().map(|array| array.nal_unit_type).collect();
        assert_eq!(
            types,
            vec![
                NALUnitType::VpsNut,
                NALUnitType::SpsNut,
                NALUnitType::PpsNut,
                NALUnitType::PrefixSeiNut,
            ]
        );
        assert_eq!(record.arrays[3].nalus[0].as_ref(), SEI);

        let record = build_record(&data, &HvccConfig::default().with_include_sei(false)).unwrap();
        assert_eq!(record.arrays.len(), 3);
    }

    #[test]
    fn test_array_completeness() {
        let config = HvccConfig::default().with_array_completeness(true);
        let mut out = Vec::new();
        write_hvcc_with_config(&mut out, &annex_b(&[VPS, SPS, PPS]), &config).unwrap();

        assert_eq!(out[23], 0x80 | 32);
        assert_eq!(out.len(), 130);
    }
}
