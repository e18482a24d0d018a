//! FITS header support.
//!
//! Beams live in primary-header keywords (`BMAJ`, `BMIN`, `BPA`) or, for
//! AIPS-processed images, in `HISTORY` cards. This module provides just enough
//! of the FITS header format to read and write those records.
//!
//! # Modules
//!
//! - [`card`]: single 80-column cards and their values
//! - [`header`]: ordered header with keyword lookup and record serialisation
//!
//! # Example
//!
//! ```
//! use radio_beam::fits::FitsHeader;
//!
//! let header = FitsHeader::parse("BMAJ    = 1.0E-03\nBMIN    = 5.0E-04\nEND").unwrap();
//! assert_eq!(header.get_f64("bmaj").unwrap(), Some(1.0e-3));
//! ```

pub mod card;
pub mod header;


use std::path::Path;

pub use card::{Card, HeaderValue, CARD_LENGTH};
pub use header::{FitsHeader, BLOCK_LENGTH};

use crate::error::{BeamError, BeamResult};

/// Plain FITS file extensions.
const FITS_EXTENSIONS: [&str; 2] = [".fits", ".fit"];

/// Compressed FITS file extensions. Recognised, but not decoded.
const COMPRESSED_EXTENSIONS: [&str; 4] = [".fits.gz", ".fit.gz", ".fits.z", ".fit.z"];

/// How a path will be treated by [`open_header`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitsFileKind {
    Plain,
    Compressed,
    Unknown,
}

/// Classify a path by its extension.
pub fn classify_path(path: &Path) -> FitsFileKind {
    let name = path.to_string_lossy().to_lowercase();
    if COMPRESSED_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        FitsFileKind::Compressed
    } else if FITS_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        FitsFileKind::Plain
    } else {
        FitsFileKind::Unknown
    }
}

/// Read the primary header of the FITS file at `path`.
///
/// # Errors
///
/// [`BeamError::UnsupportedCompression`] for gzip/compress files,
/// [`BeamError::UnrecognizedExtension`] for anything not named like a FITS file.
pub fn open_header<P: AsRef<Path>>(path: P) -> BeamResult<FitsHeader> {
    let path = path.as_ref();
    match classify_path(path) {
        FitsFileKind::Plain => FitsHeader::from_file(path),
        FitsFileKind::Compressed => Err(BeamError::UnsupportedCompression {
            path: path.to_path_buf(),
        }),
        FitsFileKind::Unknown => Err(BeamError::UnrecognizedExtension {
            path: path.to_path_buf(),
        }),
    }
}
