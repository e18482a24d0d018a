//! Pixel scale of a celestial image from its WCS keywords.
//!
//! Only the linear part of the WCS is read: `CDELTi` with an optional `PCi_j`
//! matrix, or a `CDi_j` matrix. Projection and reference point are ignored.

use serde::{Deserialize, Serialize};

use crate::error::{BeamError, BeamResult};
use crate::fits::FitsHeader;

/// Linear transformation part of a 2-D celestial WCS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CelestialWcs {
    /// Increment per axis, degrees per pixel.
    pub cdelt: [f64; 2],
    /// Rotation/skew matrix, `pc[i][j]` is `PC(i+1)_(j+1)`.
    pub pc: [[f64; 2]; 2],
}

const IDENTITY: [[f64; 2]; 2] = [[1.0, 0.0], [0.0, 1.0]];

impl CelestialWcs {
    pub fn new(cdelt: [f64; 2], pc: [[f64; 2]; 2]) -> Self {
        Self { cdelt, pc }
    }

    /// Read the linear WCS from a header.
    ///
    /// A `CDi_j` matrix takes precedence (with unit `CDELT`). Otherwise
    /// `CDELT1`/`CDELT2` are required and missing `PCi_j` entries default to
    /// the identity matrix.
    pub fn from_header(header: &FitsHeader) -> BeamResult<Self> {
        if let Some(cd) = read_matrix(header, "CD", [[0.0; 2]; 2])? {
            return Ok(Self::new([1.0, 1.0], cd));
        }

        let cdelt = [header.require_f64("CDELT1")?, header.require_f64("CDELT2")?];
        let pc = read_matrix(header, "PC", IDENTITY)?.unwrap_or(IDENTITY);
        Ok(Self::new(cdelt, pc))
    }

    /// Absolute pixel scale of the first axis, degrees per pixel.
    ///
    /// This is the first component of the row vector `cdelt · PC`. It is
    /// exact for unrotated square pixels and approximate otherwise.
    pub fn pixel_scale(&self) -> f64 {
        (self.cdelt[0] * self.pc[0][0] + self.cdelt[1] * self.pc[1][0]).abs()
    }
}

/// Read `{prefix}i_j` for i, j in 1..=2, filling absent entries from
/// `default`. `None` if no entry is present at all.
fn read_matrix(
    header: &FitsHeader,
    prefix: &str,
    default: [[f64; 2]; 2],
) -> BeamResult<Option<[[f64; 2]; 2]>> {
    let mut matrix = default;
    let mut found = false;
    for (i, row) in matrix.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            if let Some(value) = header.get_f64(&format!("{}{}_{}", prefix, i + 1, j + 1))? {
                *cell = value;
                found = true;
            }
        }
    }
    Ok(found.then_some(matrix))
}

/// Pixel scale in degrees per pixel of the image described by `header`.
pub fn wcs_to_platescale(header: &FitsHeader) -> BeamResult<f64> {
    let scale = CelestialWcs::from_header(header)?.pixel_scale();
    if scale == 0.0 || !scale.is_finite() {
        return Err(BeamError::InvalidKeyword {
            keyword: "CDELT1".to_string(),
            message: format!("pixel scale must be non-zero, got {}", scale),
        });
    }
    Ok(scale)
}
