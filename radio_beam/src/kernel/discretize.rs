//! Sampling of analytic models onto a pixel grid.
//!
//! Pixel centres sit at integer offsets `-(n / 2) ..= n / 2` from the kernel
//! centre, so grids are always odd-sized.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::models::Model2D;

/// Number of Simpson intervals per pixel axis used by [`DiscretizeMode::Integrate`].
const SIMPSON_INTERVALS: usize = 16;

/// How a model is turned into pixel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscretizeMode {
    /// Value at the pixel centre.
    #[default]
    Center,
    /// Mean of the four pixel corners.
    LinearInterp,
    /// Mean over a `factor × factor` sub-grid inside each pixel.
    Oversample,
    /// Integral over the pixel area (composite Simpson rule).
    Integrate,
}

impl fmt::Display for DiscretizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Center => "center",
            Self::LinearInterp => "linear_interp",
            Self::Oversample => "oversample",
            Self::Integrate => "integrate",
        };
        f.write_str(name)
    }
}

impl FromStr for DiscretizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "center" => Ok(Self::Center),
            "linear_interp" => Ok(Self::LinearInterp),
            "oversample" => Ok(Self::Oversample),
            "integrate" => Ok(Self::Integrate),
            other => Err(format!(
                "Unknown discretization mode '{}'. Use 'center', 'linear_interp', 'oversample' or 'integrate'",
                other
            )),
        }
    }
}

/// Offsets of the pixel centres along an axis of `size` pixels.
fn axis(size: usize) -> impl Iterator<Item = f64> + Clone {
    let half = (size / 2) as f64;
    (0..size).map(move |i| i as f64 - half)
}

/// Sample `model` on an `ny × nx` grid, row-major.
pub fn discretize<M: Model2D + ?Sized>(
    model: &M,
    nx: usize,
    ny: usize,
    mode: DiscretizeMode,
    factor: usize,
) -> Vec<f64> {
    let mut out = Vec::with_capacity(nx * ny);
    for y in axis(ny) {
        for x in axis(nx) {
            let value = match mode {
                DiscretizeMode::Center => model.evaluate(x, y),
                DiscretizeMode::LinearInterp => linear_interp(model, x, y),
                DiscretizeMode::Oversample => oversample(model, x, y, factor.max(1)),
                DiscretizeMode::Integrate => integrate(model, x, y),
            };
            out.push(value);
        }
    }
    out
}

fn linear_interp<M: Model2D + ?Sized>(model: &M, x: f64, y: f64) -> f64 {
    0.25 * (model.evaluate(x - 0.5, y - 0.5)
        + model.evaluate(x + 0.5, y - 0.5)
        + model.evaluate(x - 0.5, y + 0.5)
        + model.evaluate(x + 0.5, y + 0.5))
}

fn oversample<M: Model2D + ?Sized>(model: &M, x: f64, y: f64, factor: usize) -> f64 {
    let step = 1.0 / factor as f64;
    let mut total = 0.0;
    for j in 0..factor {
        let sy = y - 0.5 + (j as f64 + 0.5) * step;
        for i in 0..factor {
            let sx = x - 0.5 + (i as f64 + 0.5) * step;
            total += model.evaluate(sx, sy);
        }
    }
    total / (factor * factor) as f64
}

fn simpson_weight(i: usize, n: usize) -> f64 {
    if i == 0 || i == n {
        1.0
    } else if i % 2 == 1 {
        4.0
    } else {
        2.0
    }
}

fn integrate<M: Model2D + ?Sized>(model: &M, x: f64, y: f64) -> f64 {
    let n = SIMPSON_INTERVALS;
    let h = 1.0 / n as f64;
    let mut total = 0.0;
    for j in 0..=n {
        let sy = y - 0.5 + j as f64 * h;
        let wy = simpson_weight(j, n);
        for i in 0..=n {
            let sx = x - 0.5 + i as f64 * h;
            total += wy * simpson_weight(i, n) * model.evaluate(sx, sy);
        }
    }
    total * h * h / 9.0
}
