use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

use crate::NALUnitType;

/// Errors returned by the hvcC builder and the Annex-B converters.
#[derive(Error, Debug)]
pub enum HvccError {
    /// The bitstream is malformed, truncated or incomplete.
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// A parameter-set parser was handed a NAL unit of another type.
    #[error("Unexpected NAL unit type: expected {expected}, found {found}")]
    UnexpectedNalType {
        /// Type the parser handles.
        expected: NALUnitType,
        /// Type found in the NAL unit header.
        found: NALUnitType,
    },
    /// An intermediate buffer could not be allocated.
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
    /// The output sink failed.
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl HvccError {
    /// Returns `true` for errors caused by the input rather than the environment.
    pub fn is_invalid_data(&self) -> bool {
        matches!(self, Self::InvalidData(_) | Self::UnexpectedNalType { .. })
    }
}

impl From<io::Error> for HvccError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
                Self::InvalidData(err.to_string())
            }
            _ => Self::Io(err),
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::io;

    use super::HvccError;
    use crate::NALUnitType;

    #[test]
    fn test_io_error_mapping() {
        let err = HvccError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert!(matches!(err, HvccError::InvalidData(ref msg) if msg == "eof"));
        assert!(err.is_invalid_data());

        let err = HvccError::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe"));
        assert!(matches!(err, HvccError::Io(_)));
        assert!(!err.is_invalid_data());
    }

    #[test]
    fn test_unexpected_nal_type_display() {
        let err = HvccError::UnexpectedNalType {
            expected: NALUnitType::SpsNut,
            found: NALUnitType::PpsNut,
        };
        assert!(err.is_invalid_data());
        assert_eq!(
            err.to_string(),
            "Unexpected NAL unit type: expected SPS_NUT, found PPS_NUT"
        );
    }
}
