//! Legacy single SPS/PPS extradata to Annex-B.

use std::io;

use byteorder::{BigEndian, ReadBytesExt};

use crate::HvccError;
use crate::annexb::starts_with_start_code;

const MIN_EXTRADATA_SIZE: usize = 11;
const START_CODE: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

/// Converts legacy extradata into `00 00 00 01 SPS 00 00 00 01 PPS`.
///
/// Layout: `version(8) = 1`, six ignored bytes, `sps_size(16)`, the SPS,
/// `pps_size(16)`, the PPS. Input that already starts with a start code
/// needs no conversion and yields an empty vector, the caller keeps using
/// the input as is.
pub fn to_annex_b(extradata: &[u8]) -> Result<Vec<u8>, HvccError> {
    if starts_with_start_code(extradata) {
        tracing::debug!("extradata is already Annex-B, nothing to convert");
        return Ok(Vec::new());
    }

    if extradata.len() < MIN_EXTRADATA_SIZE {
        return Err(HvccError::InvalidData(format!(
            "extradata too short: {} bytes",
            extradata.len()
        )));
    }

    let mut reader = io::Cursor::new(extradata);

    let version = reader.read_u8()?;
    if version != 1 {
        return Err(HvccError::InvalidData(format!(
            "unsupported extradata version: {version}"
        )));
    }

    reader.set_position(7);
    let sps = read_parameter_set(&mut reader, "SPS")?;
    let pps = read_parameter_set(&mut reader, "PPS")?;

    let mut out = Vec::new();
    out.try_reserve(2 * START_CODE.len() + sps.len() + pps.len())?;
    out.extend_from_slice(&START_CODE);
    out.extend_from_slice(sps);
    out.extend_from_slice(&START_CODE);
    out.extend_from_slice(pps);

    Ok(out)
}

fn read_parameter_set<'a>(
    reader: &mut io::Cursor<&'a [u8]>,
    name: &str,
) -> Result<&'a [u8], HvccError> {
    let size = reader.read_u16::<BigEndian>()? as usize;
    let start = reader.position() as usize;
    let data: &'a [u8] = *reader.get_ref();

    let set = data.get(start..start + size).ok_or_else(|| {
        HvccError::InvalidData(format!(
            "{name} size {size} exceeds the {} bytes left",
            data.len() - start
        ))
    })?;

    reader.set_position((start + size) as u64);

    Ok(set)
}
