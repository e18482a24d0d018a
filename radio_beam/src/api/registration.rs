//! Python module registration.

use pyo3::prelude::*;

use crate::api::types::PyBeam;

/// Register all classes and constants with the Python module.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyBeam>()?;
    m.add("SIGMA_TO_FWHM", crate::units::SIGMA_TO_FWHM)?;
    m.add("FWHM_TO_AREA", crate::units::FWHM_TO_AREA)?;
    Ok(())
}
