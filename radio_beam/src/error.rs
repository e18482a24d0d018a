//! Error types for beam operations.
//!
//! Every fallible operation in the crate returns [`BeamResult`]. Variants carry
//! enough context (keyword, line number, path) to be reported directly to a user.

use std::path::PathBuf;

/// Result type for beam operations
pub type BeamResult<T> = Result<T, BeamError>;

/// Error type for beam construction, algebra and FITS header I/O.
#[derive(Debug, thiserror::Error)]
pub enum BeamError {
    /// Neither a major axis nor an area was supplied to the builder.
    #[error("Beam requires a major axis or an area")]
    MissingAxis,

    /// The second beam is larger than the first along some direction.
    #[error("Beam could not be deconvolved: {message}")]
    Deconvolution { message: String },

    /// Header has neither `BMAJ` nor an AIPS `HISTORY` beam record.
    #[error("No BMAJ found and does not appear to be an AIPS header")]
    NoBeamInHeader,

    /// A keyword required by the operation is not present in the header.
    #[error("Missing header keyword: {keyword}")]
    MissingKeyword { keyword: String },

    /// A keyword is present but its value has the wrong type.
    #[error("Header keyword {keyword} has invalid value: {message}")]
    InvalidKeyword { keyword: String, message: String },

    /// A header card could not be parsed.
    #[error("Header parse error at card {line}: {message}")]
    HeaderParse { line: usize, message: String },

    /// File name does not carry a recognised FITS extension.
    #[error("Unrecognized extension: {}", path.display())]
    UnrecognizedExtension { path: PathBuf },

    /// Compressed FITS files are recognised but cannot be decoded.
    #[error("Compressed FITS files are not supported: {}", path.display())]
    UnsupportedCompression { path: PathBuf },

    /// Frequency must be strictly positive and finite.
    #[error("Invalid frequency: {value} Hz")]
    InvalidFrequency { value: f64 },

    /// Kernel discretisation options are inconsistent.
    #[error("Invalid kernel options: {message}")]
    InvalidKernel { message: String },

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Underlying I/O failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BeamError {
    /// Build a [`BeamError::HeaderParse`] for a 1-based card index.
    pub fn header_parse(line: usize, message: impl Into<String>) -> Self {
        Self::HeaderParse {
            line,
            message: message.into(),
        }
    }

    /// Build a [`BeamError::MissingKeyword`].
    pub fn missing_keyword(keyword: impl Into<String>) -> Self {
        Self::MissingKeyword {
            keyword: keyword.into(),
        }
    }

    /// Build a [`BeamError::Io`] attached to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error was caused by the input data rather than the environment.
    pub fn is_data_error(&self) -> bool {
        !matches!(self, Self::Io { .. } | Self::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = BeamError::header_parse(4, "missing value indicator");
        assert_eq!(
            err.to_string(),
            "Header parse error at card 4: missing value indicator"
        );

        let err = BeamError::missing_keyword("CDELT1");
        assert!(err.to_string().contains("CDELT1"));
    }

    #[test]
    fn test_io_error_is_not_data_error() {
        let err = BeamError::io(
            "cube.fits",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(!err.is_data_error());
        assert!(err.to_string().contains("cube.fits"));
        assert!(BeamError::NoBeamInHeader.is_data_error());
    }
}
