use std::fs;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use hvcc::{HEVCDecoderConfigurationRecord, HvccConfig, to_annex_b, write_hvcc_with_config, write_length_prefixed};
use tracing::info;

use crate::error::AppError;

/// Runs `write_hvcc` over `input` and stores the payload in `output`.
pub fn build(input: &Path, output: &Path, config: &HvccConfig) -> Result<(), AppError> {
    let data = fs::read(input)?;

    let mut hvcc = Vec::new();
    write_hvcc_with_config(&mut hvcc, &data, config)?;
    fs::write(output, &hvcc)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        size = hvcc.len(),
        "wrote hvcC"
    );
    Ok(())
}

/// Converts legacy extradata. Input that is Annex-B already is copied.
pub fn annexb(input: &Path, output: &Path) -> Result<(), AppError> {
    let data = fs::read(input)?;

    let converted = to_annex_b(&data)?;
    let out = if converted.is_empty() { &data } else { &converted };
    fs::write(output, out)?;

    info!(output = %output.display(), size = out.len(), "wrote Annex-B");
    Ok(())
}

/// Rewrites an Annex-B file with 4 byte big-endian length prefixes.
pub fn split(input: &Path, output: &Path) -> Result<(), AppError> {
    let data = fs::read(input)?;

    let mut writer = BufWriter::new(fs::File::create(output)?);
    let written = write_length_prefixed(&mut writer, &data)?;
    writer.flush()?;

    info!(output = %output.display(), size = written, "wrote length-prefixed stream");
    Ok(())
}

/// Demuxes an hvcC payload and logs its fields.
pub fn inspect(input: &Path) -> Result<HEVCDecoderConfigurationRecord, AppError> {
    let data = fs::read(input)?;
    let record = HEVCDecoderConfigurationRecord::demux(Cursor::new(&data))?;

    let trailing = data.len() as u64 - record.size().min(data.len() as u64);
    if trailing > 0 {
        return Err(AppError::InvalidInput(format!(
            "{trailing} trailing bytes after the hvcC record"
        )));
    }

    info!(
        profile_space = record.general_profile_space,
        tier_flag = record.general_tier_flag,
        profile_idc = record.general_profile_idc,
        compatibility_flags = %format!("{:#010x}", record.general_profile_compatibility_flags.bits()),
        constraint_flags = %format!("{:#014x}", record.general_constraint_indicator_flags),
        level_idc = record.general_level_idc,
        "profile"
    );
    info!(
        min_spatial_segmentation_idc = record.min_spatial_segmentation_idc,
        parallelism_type = ?record.parallelism_type,
        chroma_format_idc = record.chroma_format_idc,
        bit_depth_luma = record.bit_depth_luma_minus8 + 8,
        bit_depth_chroma = record.bit_depth_chroma_minus8 + 8,
        num_temporal_layers = record.num_temporal_layers,
        temporal_id_nested = record.temporal_id_nested,
        length_size = record.length_size_minus_one + 1,
        "format"
    );
    for array in &record.arrays {
        let sizes: Vec<usize> = array.nalus.iter().map(|nalu| nalu.len()).collect();
        info!(
            nal_unit_type = %array.nal_unit_type,
            complete = array.array_completeness,
            ?sizes,
            "array"
        );
    }

    Ok(record)
}
