//! # radio-beam
//!
//! Elliptical Gaussian beams for radio astronomy images.
//!
//! - [`beam`]: the [`Beam`] type, convolution/deconvolution, header I/O
//! - [`fits`]: minimal FITS primary-header model
//! - [`brightness`]: Jy/beam ↔ K conversion
//! - [`kernel`]: Gaussian and top-hat convolution kernels sampled from a beam
//! - [`wcs`]: pixel scale from linear WCS keywords
//! - [`units`]: solid angle, frequency, flux density and temperature units
//! - [`config`]: TOML configuration for the `beam` tool
//!
//! The Python extension module is built with the `python` feature.

pub mod beam;
pub mod brightness;
pub mod config;
pub mod error;
pub mod fits;
pub mod kernel;
pub mod units;
pub mod wcs;

#[cfg(feature = "python")]
pub mod api;

pub use beam::{Beam, BeamBuilder, DeconvolveFailure, PlotEllipse};
pub use brightness::BrightnessTemperature;
pub use config::BeamConfig;
pub use error::{BeamError, BeamResult};
pub use fits::FitsHeader;
pub use kernel::{EllipticalGaussian2DKernel, EllipticalTophat2DKernel, Kernel2D, KernelOptions};
pub use wcs::wcs_to_platescale;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module `radio_beam`.
#[cfg(feature = "python")]
#[pymodule]
fn radio_beam(m: &Bound<'_, PyModule>) -> PyResult<()> {
    api::register(m)
}
