//! Conversions between [`Beam`] and the Python-facing [`PyBeam`].
//!
//! - `Beam` → `PyBeam`: axes to arcseconds, position angle to degrees
//! - `BeamError` → `PyErr`: `TypeError` where the caller passed the wrong
//!   kind of input, `OSError` for I/O, `ValueError` otherwise

use pyo3::exceptions::{PyOSError, PyTypeError, PyValueError};
use pyo3::PyErr;
use qtty::{Arcsecond, Arcseconds};

use crate::api::types::PyBeam;
use crate::beam::Beam;
use crate::error::BeamError;

impl From<&Beam> for PyBeam {
    fn from(beam: &Beam) -> Self {
        PyBeam {
            major: beam.major().to::<Arcsecond>().value(),
            minor: beam.minor().to::<Arcsecond>().value(),
            pa: beam.pa().value(),
        }
    }
}

impl From<Beam> for PyBeam {
    fn from(beam: Beam) -> Self {
        PyBeam::from(&beam)
    }
}

impl From<&PyBeam> for Beam {
    fn from(beam: &PyBeam) -> Self {
        Beam::new(Arcseconds::new(beam.major), Arcseconds::new(beam.minor), beam.pa)
    }
}

impl From<BeamError> for PyErr {
    fn from(err: BeamError) -> Self {
        match err {
            BeamError::MissingAxis
            | BeamError::NoBeamInHeader
            | BeamError::UnrecognizedExtension { .. } => PyTypeError::new_err(err.to_string()),
            BeamError::Io { .. } => PyOSError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}
