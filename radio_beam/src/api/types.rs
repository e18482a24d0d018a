//! Python-facing beam class.

use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::beam::{Beam, DeconvolveFailure};
use crate::fits::FitsHeader;
use crate::units::{Hertzes, SquareArcseconds};

/// Elliptical Gaussian beam.
///
/// Axes are FWHM in arcseconds, the position angle is in degrees.
#[pyclass(name = "Beam", module = "radio_beam", get_all, frozen)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyBeam {
    /// Major axis FWHM, arcsec
    pub major: f64,
    /// Minor axis FWHM, arcsec
    pub minor: f64,
    /// Position angle, deg
    pub pa: f64,
}

impl PyBeam {
    fn beam(&self) -> Beam {
        Beam::from(self)
    }
}

#[pymethods]
impl PyBeam {
    /// `minor` defaults to `major` and `pa` to 0. `area` (arcsec²) overrides
    /// the axes and gives a round beam.
    #[new]
    #[pyo3(signature = (major=None, minor=None, pa=None, area=None))]
    pub fn new(
        major: Option<f64>,
        minor: Option<f64>,
        pa: Option<f64>,
        area: Option<f64>,
    ) -> PyResult<Self> {
        let mut builder = Beam::builder();
        if let Some(major) = major {
            builder = builder.major(qtty::Arcseconds::new(major));
        }
        if let Some(minor) = minor {
            builder = builder.minor(qtty::Arcseconds::new(minor));
        }
        if let Some(pa) = pa {
            builder = builder.pa(pa);
        }
        if let Some(area) = area {
            builder = builder.area(SquareArcseconds::new(area));
        }
        Ok(builder.build()?.into())
    }

    /// Round beam of solid angle `area` arcsec².
    #[staticmethod]
    pub fn from_area(area: f64) -> Self {
        Beam::from_area(SquareArcseconds::new(area)).into()
    }

    /// Beam from header text (newline separated cards or raw 80-column records).
    #[staticmethod]
    pub fn from_header_string(text: &str) -> PyResult<Self> {
        let header = FitsHeader::parse(text)?;
        Ok(Beam::from_fits_header(&header)?.into())
    }

    /// Beam from the primary header of a `.fits` / `.fit` file.
    #[staticmethod]
    pub fn from_fits_file(path: &str) -> PyResult<Self> {
        Ok(Beam::from_fits_file(path)?.into())
    }

    /// Solid angle in steradians.
    #[getter]
    pub fn sr(&self) -> f64 {
        self.beam().sr().value()
    }

    pub fn convolve(&self, other: &PyBeam) -> Self {
        self.beam().convolve(&other.beam()).into()
    }

    #[pyo3(signature = (other, failure_returns_pointlike=false))]
    pub fn deconvolve(&self, other: &PyBeam, failure_returns_pointlike: bool) -> PyResult<Self> {
        let on_failure = if failure_returns_pointlike {
            DeconvolveFailure::PointLike
        } else {
            DeconvolveFailure::Error
        };
        Ok(self.beam().deconvolve_with(&other.beam(), on_failure)?.into())
    }

    /// Kelvin per Jy/beam at `freq_hz`.
    pub fn jtok(&self, freq_hz: f64) -> PyResult<f64> {
        Ok(self.beam().jtok(Hertzes::new(freq_hz))?.value())
    }

    /// `{"BMAJ": deg, "BMIN": deg, "BPA": deg}`
    pub fn to_header_keywords<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        for (keyword, value) in self.beam().to_header_keywords() {
            dict.set_item(keyword, value)?;
        }
        Ok(dict)
    }

    fn __repr__(&self) -> String {
        self.beam().to_string()
    }

    fn __eq__(&self, other: &PyBeam) -> bool {
        self.beam() == other.beam()
    }

    fn __mul__(&self, other: &PyBeam) -> Self {
        self.convolve(other)
    }
}
