use std::fmt;

/// NAL unit types as defined by ISO/IEC 23008-2 Table 7-1.
///
/// Only the non-VCL types an hvcC record cares about get their own variant,
/// everything else keeps its raw 6-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NALUnitType {
    /// Coded slice segments and reserved VCL types (0-31).
    Vcl(u8),
    /// Video parameter set
    VpsNut,
    /// Sequence parameter set
    SpsNut,
    /// Picture parameter set
    PpsNut,
    /// Access unit delimiter
    AudNut,
    /// End of sequence
    EosNut,
    /// End of bitstream
    EobNut,
    /// Filler data
    FdNut,
    /// Supplemental enhancement information, prefix
    PrefixSeiNut,
    /// Supplemental enhancement information, suffix
    SuffixSeiNut,
    /// Reserved non-VCL types (41-47).
    Reserved(u8),
    /// Unspecified non-VCL types (48-63).
    Unspecified(u8),
}

impl NALUnitType {
    /// Returns `true` for VPS, SPS and PPS.
    pub fn is_parameter_set(self) -> bool {
        matches!(self, Self::VpsNut | Self::SpsNut | Self::PpsNut)
    }

    /// Returns `true` for prefix and suffix SEI.
    pub fn is_sei(self) -> bool {
        matches!(self, Self::PrefixSeiNut | Self::SuffixSeiNut)
    }
}

impl From<u8> for NALUnitType {
    fn from(value: u8) -> Self {
        match value & 0x3f {
            v @ 0..=31 => Self::Vcl(v),
            32 => Self::VpsNut,
            33 => Self::SpsNut,
            34 => Self::PpsNut,
            35 => Self::AudNut,
            36 => Self::EosNut,
            37 => Self::EobNut,
            38 => Self::FdNut,
            39 => Self::PrefixSeiNut,
            40 => Self::SuffixSeiNut,
            v @ 41..=47 => Self::Reserved(v),
            v => Self::Unspecified(v),
        }
    }
}

impl From<NALUnitType> for u8 {
    fn from(value: NALUnitType) -> Self {
        match value {
            NALUnitType::Vcl(v) | NALUnitType::Reserved(v) | NALUnitType::Unspecified(v) => v,
            NALUnitType::VpsNut => 32,
            NALUnitType::SpsNut => 33,
            NALUnitType::PpsNut => 34,
            NALUnitType::AudNut => 35,
            NALUnitType::EosNut => 36,
            NALUnitType::EobNut => 37,
            NALUnitType::FdNut => 38,
            NALUnitType::PrefixSeiNut => 39,
            NALUnitType::SuffixSeiNut => 40,
        }
    }
}

impl fmt::Display for NALUnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VpsNut => f.write_str("VPS_NUT"),
            Self::SpsNut => f.write_str("SPS_NUT"),
            Self::PpsNut => f.write_str("PPS_NUT"),
            Self::AudNut => f.write_str("AUD_NUT"),
            Self::EosNut => f.write_str("EOS_NUT"),
            Self::EobNut => f.write_str("EOB_NUT"),
            Self::FdNut => f.write_str("FD_NUT"),
            Self::PrefixSeiNut => f.write_str("PREFIX_SEI_NUT"),
            Self::SuffixSeiNut => f.write_str("SUFFIX_SEI_NUT"),
            Self::Vcl(v) => write!(f, "VCL({v})"),
            Self::Reserved(v) => write!(f, "RSV_NVCL({v})"),
            Self::Unspecified(v) => write!(f, "UNSPEC({v})"),
        }
    }
}
