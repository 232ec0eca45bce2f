use std::io;

use bytes_util::{BitReader, range_check};
use expgolomb::BitReaderExpGolombExt;

/// Default intra lists for 8x8 and larger, ISO/IEC 23008-2 - Table 7-6.
#[rustfmt::skip]
const DEFAULT_INTRA: [u8; 64] = [
    16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 17, 16, 17, 16, 17, 18,
    17, 18, 18, 17, 18, 21, 19, 20, 21, 20, 19, 21, 24, 22, 22, 24,
    24, 22, 22, 24, 25, 25, 27, 30, 27, 25, 25, 29, 31, 35, 35, 31,
    29, 36, 41, 44, 41, 36, 47, 54, 54, 47, 65, 70, 65, 88, 88, 115,
];

/// Default inter lists for 8x8 and larger, ISO/IEC 23008-2 - Table 7-6.
#[rustfmt::skip]
const DEFAULT_INTER: [u8; 64] = [
    16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 17, 17, 17, 17, 17, 18,
    18, 18, 18, 18, 18, 20, 20, 20, 20, 20, 20, 20, 24, 24, 24, 24,
    24, 24, 24, 24, 25, 25, 25, 25, 25, 25, 25, 28, 28, 28, 28, 28,
    28, 33, 33, 33, 33, 33, 41, 41, 41, 41, 54, 54, 54, 71, 71, 91,
];

/// Scaling list data.
///
/// `scaling_list_data()`
///
/// - ISO/IEC 23008-2 - 7.3.4
/// - ISO/IEC 23008-2 - 7.4.5
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalingListData {
    /// `ScalingList[sizeId][matrixId][i]` in coding order. 4x4 lists only use
    /// the first 16 entries, 32x32 only has matrices 0 and 3.
    pub scaling_list: [[[u8; 64]; 6]; 4],
    /// `scaling_list_dc_coef_minus8 + 8` of the 16x16 and 32x32 lists.
    pub dc_coef: [[u8; 6]; 2],
}

impl ScalingListData {
    /// Fills a list the way `scaling_list_pred_matrix_id_delta == 0` does.
    fn set_default(&mut self, size_id: usize, matrix_id: usize) {
        let list = &mut self.scaling_list[size_id][matrix_id];
        if size_id == 0 {
            list[..16].fill(16);
        } else if matrix_id < 3 {
            *list = DEFAULT_INTRA;
        } else {
            *list = DEFAULT_INTER;
        }

        if size_id > 1 {
            self.dc_coef[size_id - 2][matrix_id] = 16;
        }
    }

    pub(crate) fn parse<R: io::Read>(bit_reader: &mut BitReader<R>) -> io::Result<Self> {
        let mut data = Self {
            scaling_list: [[[0; 64]; 6]; 4],
            dc_coef: [[0; 6]; 2],
        };

        for size_id in 0..4 {
            let step = if size_id == 3 { 3 } else { 1 };
            let coef_num = usize::min(64, 1 << (4 + (size_id << 1)));

            let mut matrix_id = 0;
            while matrix_id < 6 {
                let scaling_list_pred_mode_flag = bit_reader.read_bit()?;

                if !scaling_list_pred_mode_flag {
                    let scaling_list_pred_matrix_id_delta = bit_reader.read_exp_golomb()?;
                    range_check!(scaling_list_pred_matrix_id_delta, 0, (matrix_id / step) as u64)?;

                    if scaling_list_pred_matrix_id_delta == 0 {
                        data.set_default(size_id, matrix_id);
                    } else {
                        let ref_matrix_id = matrix_id - scaling_list_pred_matrix_id_delta as usize * step;
                        data.scaling_list[size_id][matrix_id] = data.scaling_list[size_id][ref_matrix_id];
                        if size_id > 1 {
                            data.dc_coef[size_id - 2][matrix_id] = data.dc_coef[size_id - 2][ref_matrix_id];
                        }
                    }
                } else {
                    let mut next_coef: i64 = 8;

                    if size_id > 1 {
                        let scaling_list_dc_coef_minus8 = bit_reader.read_signed_exp_golomb()?;
                        range_check!(scaling_list_dc_coef_minus8, -7, 247)?;
                        next_coef = scaling_list_dc_coef_minus8 + 8;
                        data.dc_coef[size_id - 2][matrix_id] = next_coef as u8;
                    }

                    for i in 0..coef_num {
                        let scaling_list_delta_coef = bit_reader.read_signed_exp_golomb()?;
                        next_coef = (next_coef + scaling_list_delta_coef).rem_euclid(256);
                        data.scaling_list[size_id][matrix_id][i] = next_coef as u8;
                    }
                }

                matrix_id += step;
            }
        }

        Ok(data)
    }
}
