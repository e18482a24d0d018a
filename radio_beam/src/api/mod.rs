//! # Python API
//!
//! PyO3 bindings, compiled with the `python` feature. Angles cross the
//! boundary as plain `f64` (axes in arcseconds, position angle in degrees)
//! so Python callers never see qtty types.
//!
//! - [`types`]: `#[pyclass]` types
//! - [`conversions`]: beam/DTO conversions and error mapping
//! - [`registration`]: module registration

pub mod conversions;
pub mod registration;
pub mod types;

pub use registration::register;
pub use types::PyBeam;
