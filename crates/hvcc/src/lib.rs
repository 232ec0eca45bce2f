//! Builds the HEVC decoder configuration record (`hvcC`) from Annex-B
//! parameter sets.
//!
//! The VPS, SPS and PPS of an Annex-B buffer are parsed far enough to fill the
//! record: profile, tier and level are merged across every parameter set, the
//! VUI bitstream restriction gives `min_spatial_segmentation_idc` and the PPS
//! gives the parallelism type. The parameter sets themselves are carried in the
//! record's NAL unit arrays.
//!
//! ## Examples
//!
//! ```
//! use hvcc::{HEVCDecoderConfigurationRecord, write_hvcc};
//!
//! # fn test() -> Result<(), Box<dyn std::error::Error>> {
//! # let data = b"\x00\x00\x00\x01\x40\x01\x0c\x01\xff\xff\x01\x40\x00\x00\x03\x00\x90\x00\x00\x03\x00\x00\x03\x00\x99\x95\x40\x90\x00\x00\x00\x01\x42\x01\x01\x01\x40\x00\x00\x03\x00\x90\x00\x00\x03\x00\x00\x03\x00\x99\xa0\x01\x40\x20\x05\xa1\x65\x95\x52\x90\x84\x64\x5f\xf8\xc0\x5a\x80\x80\x80\x82\x00\x00\x03\x00\x02\x00\x00\x03\x01\x20\xc0\x0b\xbc\xa2\x00\x02\x62\x58\x00\x01\x31\x2d\x08\x00\x00\x00\x01\x44\x01\xc0\x93\x7c\x0c\xc9";
//! let mut hvcc = Vec::new();
//! write_hvcc(&mut hvcc, data)?;
//!
//! let record = HEVCDecoderConfigurationRecord::demux(std::io::Cursor::new(hvcc))?;
//! assert_eq!(record.general_level_idc, 153);
//! # Ok(())
//! # }
//! # test().unwrap();
//! ```
//!
//! ## License
//!
//! This project is licensed under the MIT or Apache-2.0 license.
//! You can choose between one of them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(unreachable_pub)]

mod annexb;
mod enums;
mod error;
mod extradata;
mod hrd;
mod nal_unit_header;
mod pps;
mod ptl;
mod record;
mod sps;
mod sub_layer_ordering_info;
mod vps;
mod writer;

pub use annexb::{NalUnits, nal_unit_type_of, starts_with_start_code, to_length_prefixed, write_length_prefixed};
pub use enums::*;
pub use error::HvccError;
pub use extradata::to_annex_b;
pub use hrd::*;
pub use nal_unit_header::NALUnitHeader;
pub use pps::{PpsNALUnit, PpsRbsp};
pub use ptl::{ProfileTierLevel, PtlCommon, SubLayerPtl};
pub use record::{HEVCDecoderConfigurationRecord, MIN_SPATIAL_SEGMENTATION_IDC_UNSET, NaluArray};
pub use sps::*;
pub use sub_layer_ordering_info::SubLayerOrderingInfo;
pub use vps::{VpsNALUnit, VpsRbsp, VpsTimingInfo};
pub use writer::{HvccConfig, build_record, write_hvcc, write_hvcc_with_config};
