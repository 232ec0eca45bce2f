use std::io;

use bytes_util::BitReader;
use expgolomb::BitReaderExpGolombExt;

/// DPB sizing per sub-layer, shared by the VPS and SPS syntax.
///
/// The values are carried as read, nothing downstream depends on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubLayerOrderingInfo {
    /// `max_dec_pic_buffering_minus1[i]`
    pub max_dec_pic_buffering_minus1: Vec<u64>,
    /// `max_num_reorder_pics[i]`
    pub max_num_reorder_pics: Vec<u64>,
    /// `max_latency_increase_plus1[i]`
    pub max_latency_increase_plus1: Vec<u64>,
}

impl SubLayerOrderingInfo {
    /// Without `sub_layer_ordering_info_present_flag` only the highest
    /// sub-layer is coded and its values apply to every sub-layer.
    pub(crate) fn parse<R: io::Read>(
        bit_reader: &mut BitReader<R>,
        sub_layer_ordering_info_present_flag: bool,
        max_sub_layers_minus1: u8,
    ) -> io::Result<Self> {
        let count = max_sub_layers_minus1 as usize + 1;
        let coded = if sub_layer_ordering_info_present_flag { count } else { 1 };

        let mut info = Self {
            max_dec_pic_buffering_minus1: Vec::with_capacity(count),
            max_num_reorder_pics: Vec::with_capacity(count),
            max_latency_increase_plus1: Vec::with_capacity(count),
        };

        for _ in 0..coded {
            info.max_dec_pic_buffering_minus1.push(bit_reader.read_exp_golomb()?);
            info.max_num_reorder_pics.push(bit_reader.read_exp_golomb()?);
            info.max_latency_increase_plus1.push(bit_reader.read_exp_golomb()?);
        }

        if coded == 1 {
            info.max_dec_pic_buffering_minus1.resize(count, info.max_dec_pic_buffering_minus1[0]);
            info.max_num_reorder_pics.resize(count, info.max_num_reorder_pics[0]);
            info.max_latency_increase_plus1.resize(count, info.max_latency_increase_plus1[0]);
        }

        Ok(info)
    }
}
