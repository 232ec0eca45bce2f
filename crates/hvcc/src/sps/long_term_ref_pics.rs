use std::io;

use bytes_util::{BitReader, range_check};
use expgolomb::BitReaderExpGolombExt;

/// A candidate long-term reference picture listed in the SPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongTermRefPic {
    /// `lt_ref_pic_poc_lsb_sps[i]`, the POC modulo `MaxPicOrderCntLsb`.
    pub poc_lsb: u16,
    /// `used_by_curr_pic_lt_sps_flag[i]`
    pub used_by_curr_pic: bool,
}

/// Parses `num_long_term_ref_pics_sps` and the candidates that follow it.
///
/// - ISO/IEC 23008-2 - 7.3.2.2.1
pub(crate) fn parse<R: io::Read>(
    bit_reader: &mut BitReader<R>,
    log2_max_pic_order_cnt_lsb_minus4: u64,
) -> io::Result<Vec<LongTermRefPic>> {
    let num_long_term_ref_pics_sps = bit_reader.read_exp_golomb()?;
    range_check!(num_long_term_ref_pics_sps, 0, 32)?;

    // u(v) with v = log2_max_pic_order_cnt_lsb_minus4 + 4
    let width = log2_max_pic_order_cnt_lsb_minus4.saturating_add(4).min(16) as u8;

    let mut pics = Vec::with_capacity(num_long_term_ref_pics_sps as usize);
    for _ in 0..num_long_term_ref_pics_sps {
        pics.push(LongTermRefPic {
            poc_lsb: bit_reader.read_bits(width)? as u16,
            used_by_curr_pic: bit_reader.read_bit()?,
        });
    }

    Ok(pics)
}
