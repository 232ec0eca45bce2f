use std::io;

/// Represents all possible values of the `constant_frame_rate` field in the
/// [`HEVCDecoderConfigurationRecord`](crate::HEVCDecoderConfigurationRecord).
///
/// ISO/IEC 14496-15 - 8.3.2.1.3
#[derive(Debug, Clone, PartialEq, Copy, PartialOrd, Ord, Eq, Default)]
#[repr(u8)]
pub enum ConstantFrameRate {
    /// Indicates that the stream may or may not be of constant frame rate.
    #[default]
    Unknown = 0,
    /// Indicates that the stream to which this configuration record
    /// applies is of constant frame rate.
    Constant = 1,
    /// Indicates that the representation of each temporal
    /// layer in the stream is of constant frame rate.
    TemporalLayerConstant = 2,
}

impl TryFrom<u8> for ConstantFrameRate {
    type Error = io::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Constant),
            2 => Ok(Self::TemporalLayerConstant),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid constant_frame_rate: {value}"),
            )),
        }
    }
}
