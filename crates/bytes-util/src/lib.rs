//! Bit level readers and writers plus NAL payload helpers shared by the
//! bitstream parsers in this workspace.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]

mod bit_read;
mod bit_write;
mod nal_emulation_prevention;
mod range_check;

pub use bit_read::BitReader;
pub use bit_write::BitWriter;
pub use nal_emulation_prevention::{EmulationPreventionIo, strip_emulation_prevention};
