use std::io;

use bytes_util::{BitReader, range_check};
use expgolomb::BitReaderExpGolombExt;

/// Largest `num_negative_pics` / `num_positive_pics` an explicit set may carry.
const MAX_PICS_PER_DIRECTION: u64 = 16;

/// One short-term reference picture set of the SPS, with the derived
/// `DeltaPocS0/S1` and `UsedByCurrPicS0/S1` arrays.
///
/// `st_ref_pic_set(stRpsIdx)`
///
/// - ISO/IEC 23008-2 - 7.3.7
/// - ISO/IEC 23008-2 - 7.4.8
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShortTermRefPicSet {
    /// `DeltaPocS0[stRpsIdx][i]`, decreasing.
    pub delta_poc_s0: Vec<i64>,
    /// `UsedByCurrPicS0[stRpsIdx][i]`
    pub used_by_curr_pic_s0: Vec<bool>,
    /// `DeltaPocS1[stRpsIdx][i]`, increasing.
    pub delta_poc_s1: Vec<i64>,
    /// `UsedByCurrPicS1[stRpsIdx][i]`
    pub used_by_curr_pic_s1: Vec<bool>,
}

impl ShortTermRefPicSet {
    /// `NumNegativePics[stRpsIdx]`
    pub fn num_negative_pics(&self) -> usize {
        self.delta_poc_s0.len()
    }

    /// `NumPositivePics[stRpsIdx]`
    pub fn num_positive_pics(&self) -> usize {
        self.delta_poc_s1.len()
    }

    /// `NumDeltaPocs[stRpsIdx]` (7-71)
    pub fn num_delta_pocs(&self) -> usize {
        self.num_negative_pics() + self.num_positive_pics()
    }

    /// Parses the `num_short_term_ref_pic_sets` sets coded in the SPS.
    pub(crate) fn parse_all<R: io::Read>(
        bit_reader: &mut BitReader<R>,
        num_short_term_ref_pic_sets: usize,
    ) -> io::Result<Vec<Self>> {
        let mut sets: Vec<Self> = Vec::with_capacity(num_short_term_ref_pic_sets);

        for st_rps_idx in 0..num_short_term_ref_pic_sets {
            let mut inter_ref_pic_set_prediction_flag = false;
            if st_rps_idx != 0 {
                inter_ref_pic_set_prediction_flag = bit_reader.read_bit()?;
            }

            let set = match sets.last() {
                // delta_idx_minus1 is only coded in slice headers, so RefRpsIdx
                // is always the previous set here (7-59)
                Some(reference) if inter_ref_pic_set_prediction_flag => {
                    Self::parse_predicted(bit_reader, reference)?
                }
                _ => Self::parse_explicit(bit_reader)?,
            };
            sets.push(set);
        }

        Ok(sets)
    }

    fn parse_predicted<R: io::Read>(bit_reader: &mut BitReader<R>, reference: &Self) -> io::Result<Self> {
        let delta_rps_sign = bit_reader.read_bit()?;
        let abs_delta_rps_minus1 = bit_reader.read_exp_golomb()?;
        range_check!(abs_delta_rps_minus1, 0, 2u64.pow(15) - 1)?;
        // (7-60)
        let delta_rps = (1 - 2 * delta_rps_sign as i64) * (abs_delta_rps_minus1 as i64 + 1);

        let len = reference.num_delta_pocs() + 1;
        let mut used_by_curr_pic_flag = Vec::with_capacity(len);
        let mut use_delta_flag = Vec::with_capacity(len);
        for _ in 0..len {
            let used = bit_reader.read_bit()?;
            // use_delta_flag is inferred to be 1 when absent
            let use_delta = used || bit_reader.read_bit()?;
            used_by_curr_pic_flag.push(used);
            use_delta_flag.push(use_delta);
        }

        let num_negative = reference.num_negative_pics();
        let num_delta_pocs = reference.num_delta_pocs();
        let mut set = Self::default();

        // (7-61)
        for j in (0..reference.num_positive_pics()).rev() {
            let d_poc = reference.delta_poc_s1[j] + delta_rps;
            if d_poc < 0 && use_delta_flag[num_negative + j] {
                set.delta_poc_s0.push(d_poc);
                set.used_by_curr_pic_s0.push(used_by_curr_pic_flag[num_negative + j]);
            }
        }
        if delta_rps < 0 && use_delta_flag[num_delta_pocs] {
            set.delta_poc_s0.push(delta_rps);
            set.used_by_curr_pic_s0.push(used_by_curr_pic_flag[num_delta_pocs]);
        }
        for j in 0..num_negative {
            let d_poc = reference.delta_poc_s0[j] + delta_rps;
            if d_poc < 0 && use_delta_flag[j] {
                set.delta_poc_s0.push(d_poc);
                set.used_by_curr_pic_s0.push(used_by_curr_pic_flag[j]);
            }
        }

        // (7-62)
        for j in (0..num_negative).rev() {
            let d_poc = reference.delta_poc_s0[j] + delta_rps;
            if d_poc > 0 && use_delta_flag[j] {
                set.delta_poc_s1.push(d_poc);
                set.used_by_curr_pic_s1.push(used_by_curr_pic_flag[j]);
            }
        }
        if delta_rps > 0 && use_delta_flag[num_delta_pocs] {
            set.delta_poc_s1.push(delta_rps);
            set.used_by_curr_pic_s1.push(used_by_curr_pic_flag[num_delta_pocs]);
        }
        for j in 0..reference.num_positive_pics() {
            let d_poc = reference.delta_poc_s1[j] + delta_rps;
            if d_poc > 0 && use_delta_flag[num_negative + j] {
                set.delta_poc_s1.push(d_poc);
                set.used_by_curr_pic_s1.push(used_by_curr_pic_flag[num_negative + j]);
            }
        }

        range_check!(set.num_negative_pics() as u64, 0, MAX_PICS_PER_DIRECTION)?;
        range_check!(set.num_positive_pics() as u64, 0, MAX_PICS_PER_DIRECTION)?;

        Ok(set)
    }

    fn parse_explicit<R: io::Read>(bit_reader: &mut BitReader<R>) -> io::Result<Self> {
        let num_negative_pics = bit_reader.read_exp_golomb()?;
        range_check!(num_negative_pics, 0, MAX_PICS_PER_DIRECTION)?;
        let num_positive_pics = bit_reader.read_exp_golomb()?;
        range_check!(num_positive_pics, 0, MAX_PICS_PER_DIRECTION)?;

        let mut set = Self::default();

        let mut poc = 0;
        for _ in 0..num_negative_pics {
            let delta_poc_s0_minus1 = bit_reader.read_exp_golomb()?;
            range_check!(delta_poc_s0_minus1, 0, 2u64.pow(15) - 1)?;
            // (7-67), (7-69)
            poc -= delta_poc_s0_minus1 as i64 + 1;
            set.delta_poc_s0.push(poc);
            set.used_by_curr_pic_s0.push(bit_reader.read_bit()?);
        }

        poc = 0;
        for _ in 0..num_positive_pics {
            let delta_poc_s1_minus1 = bit_reader.read_exp_golomb()?;
            range_check!(delta_poc_s1_minus1, 0, 2u64.pow(15) - 1)?;
            // (7-68), (7-70)
            poc += delta_poc_s1_minus1 as i64 + 1;
            set.delta_poc_s1.push(poc);
            set.used_by_curr_pic_s1.push(bit_reader.read_bit()?);
        }

        Ok(set)
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::io;

    use bytes_util::{BitReader, BitWriter};
    use expgolomb::BitWriterExpGolombExt;

    use super::ShortTermRefPicSet;

    #[test]
    fn test_explicit_sets() {
        let mut writer = BitWriter::<Vec<u8>>::default();

        // set 0: two negative, one positive
        writer.write_exp_golomb(2).unwrap();
        writer.write_exp_golomb(1).unwrap();
        writer.write_exp_golomb(0).unwrap(); // -1
        writer.write_bit(true).unwrap();
        writer.write_exp_golomb(1).unwrap(); // -3
        writer.write_bit(false).unwrap();
        writer.write_exp_golomb(3).unwrap(); // +4
        writer.write_bit(true).unwrap();

        // set 1: not predicted, empty
        writer.write_bit(false).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_exp_golomb(0).unwrap();
        let data = writer.finish().unwrap();

        let sets = ShortTermRefPicSet::parse_all(&mut BitReader::new_from_slice(data), 2).unwrap();
        assert_eq!(sets[0].delta_poc_s0, vec![-1, -3]);
        assert_eq!(sets[0].used_by_curr_pic_s0, vec![true, false]);
        assert_eq!(sets[0].delta_poc_s1, vec![4]);
        assert_eq!(sets[0].num_delta_pocs(), 3);
        assert_eq!(sets[1], ShortTermRefPicSet::default());
    }

    #[test]
    fn test_predicted_set() {
        let mut writer = BitWriter::<Vec<u8>>::default();

        // set 0: DeltaPocS0 = [-1, -2]
        writer.write_exp_golomb(2).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_bit(true).unwrap();
        writer.write_exp_golomb(0).unwrap();
        writer.write_bit(true).unwrap();

        // set 1: predicted from set 0 with deltaRps = -1
        writer.write_bit(true).unwrap(); // inter_ref_pic_set_prediction_flag
        writer.write_bit(true).unwrap(); // delta_rps_sign
        writer.write_exp_golomb(0).unwrap(); // abs_delta_rps_minus1
        // NumDeltaPocs[0] + 1 = 3 entries
        writer.write_bit(true).unwrap(); // -1 - 1 = -2, used
        writer.write_bit(false).unwrap(); // -2 - 1 = -3, not used
        writer.write_bit(false).unwrap(); // use_delta_flag = 0, dropped
        writer.write_bit(true).unwrap(); // deltaRps itself, used
        writer.write_bits(0b11, 2).unwrap();
        let data = writer.finish().unwrap();

        let mut reader = BitReader::new_from_slice(data);
        let sets = ShortTermRefPicSet::parse_all(&mut reader, 2).unwrap();

        assert_eq!(sets[1].delta_poc_s0, vec![-1, -2]);
        assert_eq!(sets[1].used_by_curr_pic_s0, vec![true, true]);
        assert!(sets[1].delta_poc_s1.is_empty());
        assert_eq!(reader.read_bits(2).unwrap(), 0b11);
    }

    #[test]
    fn test_too_many_pics() {
        let mut writer = BitWriter::<Vec<u8>>::default();
        writer.write_exp_golomb(17).unwrap();
        let data = writer.finish().unwrap();

        let err = ShortTermRefPicSet::parse_all(&mut BitReader::new_from_slice(data), 1).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(err.to_string(), "num_negative_pics is out of range [0, 16]: 17");
    }
}
