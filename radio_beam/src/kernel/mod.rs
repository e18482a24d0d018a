//! Convolution kernels built from beams.
//!
//! A [`Kernel2D`] is a row-major grid of weights. The two beam-shaped kernels
//! are:
//!
//! - [`EllipticalGaussian2DKernel`]: the beam itself, normalised to unit volume
//! - [`EllipticalTophat2DKernel`]: a flat ellipse with the same area as the beam
//!
//! Both are sized from the bounding box of the ellipse unless explicit sizes
//! are given through [`KernelOptions`].

pub mod discretize;
pub mod geometry;
pub mod models;

use serde::{Deserialize, Serialize};

pub use discretize::{discretize, DiscretizeMode};
pub use geometry::{ellipse_extent, round_up_to_odd};
pub use models::{Ellipse2D, Gaussian2D, Model2D};

use crate::error::{BeamError, BeamResult};

/// Default support scaling of the Gaussian kernel, in standard deviations.
pub const GAUSSIAN_SUPPORT_SCALING: f64 = 8.0;

/// Default support scaling of the top-hat kernel, in radii.
pub const TOPHAT_SUPPORT_SCALING: f64 = 1.0;

/// Largest kernel grid, in pixels.
pub const MAX_KERNEL_PIXELS: usize = 1 << 26;

/// Default oversampling factor.
pub const DEFAULT_FACTOR: usize = 10;

/// Discretisation options shared by all kernels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelOptions {
    /// Width in pixels. Must be odd. Defaults to the support size.
    #[serde(default)]
    pub x_size: Option<usize>,
    /// Height in pixels. Must be odd. Defaults to `x_size`, then to the support size.
    #[serde(default)]
    pub y_size: Option<usize>,
    #[serde(default)]
    pub mode: DiscretizeMode,
    /// Oversampling factor for [`DiscretizeMode::Oversample`].
    #[serde(default = "default_factor")]
    pub factor: usize,
    /// Overrides the kernel's own support scaling.
    #[serde(default)]
    pub support_scaling: Option<f64>,
}

fn default_factor() -> usize {
    DEFAULT_FACTOR
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self {
            x_size: None,
            y_size: None,
            mode: DiscretizeMode::default(),
            factor: default_factor(),
            support_scaling: None,
        }
    }
}

impl KernelOptions {
    pub fn with_mode(mut self, mode: DiscretizeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_size(mut self, x_size: usize, y_size: usize) -> Self {
        self.x_size = Some(x_size);
        self.y_size = Some(y_size);
        self
    }

    pub fn with_factor(mut self, factor: usize) -> Self {
        self.factor = factor;
        self
    }

    pub fn with_support_scaling(mut self, scaling: f64) -> Self {
        self.support_scaling = Some(scaling);
        self
    }

    /// Resolve the grid shape `(nx, ny)` for a kernel whose default edge is `default_size`.
    fn shape(&self, default_size: usize) -> BeamResult<(usize, usize)> {
        let nx = self.x_size.unwrap_or(default_size);
        let ny = self.y_size.or(self.x_size).unwrap_or(default_size);
        for (name, size) in [("x_size", nx), ("y_size", ny)] {
            if size % 2 == 0 {
                return Err(BeamError::InvalidKernel {
                    message: format!("{} must be odd, got {}", name, size),
                });
            }
        }
        if self.factor == 0 {
            return Err(BeamError::InvalidKernel {
                message: "factor must be at least 1".to_string(),
            });
        }
        match nx.checked_mul(ny) {
            Some(pixels) if pixels <= MAX_KERNEL_PIXELS => Ok((nx, ny)),
            _ => Err(BeamError::InvalidKernel {
                message: format!(
                    "{}x{} kernel exceeds the limit of {} pixels",
                    ny, nx, MAX_KERNEL_PIXELS
                ),
            }),
        }
    }
}

fn validate_axes(major: f64, minor: f64) -> BeamResult<()> {
    if !(major.is_finite() && minor.is_finite() && major > 0.0 && minor > 0.0) {
        return Err(BeamError::InvalidKernel {
            message: format!("kernel axes must be positive, got {} and {}", major, minor),
        });
    }
    Ok(())
}

/// Row-major 2-D kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kernel2D {
    array: Vec<f64>,
    nx: usize,
    ny: usize,
    truncation: f64,
    is_bool: bool,
    separable: bool,
}

impl Kernel2D {
    /// Sample `model` with the given options. `default_size` is used when
    /// the options carry no explicit size.
    pub fn from_model<M: Model2D + ?Sized>(
        model: &M,
        default_size: usize,
        options: &KernelOptions,
    ) -> BeamResult<Self> {
        let (nx, ny) = options.shape(default_size)?;
        let array = discretize(model, nx, ny, options.mode, options.factor);
        Ok(Self {
            array,
            nx,
            ny,
            truncation: 0.0,
            is_bool: false,
            separable: false,
        })
    }

    /// `(ny, nx)`, matching row-major indexing.
    pub fn shape(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    /// Index of the central pixel as `(row, column)`.
    pub fn center(&self) -> (usize, usize) {
        (self.ny / 2, self.nx / 2)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.ny && col < self.nx {
            self.array.get(row * self.nx + col).copied()
        } else {
            None
        }
    }

    pub fn array(&self) -> &[f64] {
        &self.array
    }

    pub fn rows(&self) -> std::slice::Chunks<'_, f64> {
        self.array.chunks(self.nx.max(1))
    }

    pub fn sum(&self) -> f64 {
        self.array.iter().sum()
    }

    /// Relative amount of the model lost by truncating it to the grid.
    pub fn truncation(&self) -> f64 {
        self.truncation
    }

    /// Whether every non-zero weight has the same value.
    pub fn is_bool(&self) -> bool {
        self.is_bool
    }

    pub fn separable(&self) -> bool {
        self.separable
    }

    /// Scale weights so they sum to one.
    pub fn normalize(&mut self) -> BeamResult<()> {
        let sum = self.sum();
        if sum == 0.0 || !sum.is_finite() {
            return Err(BeamError::InvalidKernel {
                message: format!("cannot normalise kernel with sum {}", sum),
            });
        }
        for value in &mut self.array {
            *value /= sum;
        }
        Ok(())
    }
}

/// Elliptical Gaussian kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipticalGaussian2DKernel {
    model: Gaussian2D,
    kernel: Kernel2D,
}

impl EllipticalGaussian2DKernel {
    /// Kernel with standard deviations `stddev_maj`, `stddev_min` (pixels),
    /// rotated by `position_angle` radians.
    pub fn new(
        stddev_maj: f64,
        stddev_min: f64,
        position_angle: f64,
        options: &KernelOptions,
    ) -> BeamResult<Self> {
        validate_axes(stddev_maj, stddev_min)?;
        let model = Gaussian2D::normalized(stddev_maj, stddev_min, position_angle);

        let (dx, dy) = ellipse_extent(stddev_maj, stddev_min, position_angle);
        let scaling = options.support_scaling.unwrap_or(GAUSSIAN_SUPPORT_SCALING);
        let default_size = round_up_to_odd(scaling * 2.0 * dx.max(dy));

        let mut kernel = Kernel2D::from_model(&model, default_size, options)?;
        kernel.truncation = (1.0 - 1.0 / kernel.sum()).abs();
        kernel.separable = true;
        kernel.is_bool = false;
        Ok(Self { model, kernel })
    }

    pub fn model(&self) -> &Gaussian2D {
        &self.model
    }

    pub fn kernel(&self) -> &Kernel2D {
        &self.kernel
    }

    pub fn into_kernel(self) -> Kernel2D {
        self.kernel
    }
}

impl From<EllipticalGaussian2DKernel> for Kernel2D {
    fn from(value: EllipticalGaussian2DKernel) -> Self {
        value.kernel
    }
}

/// Elliptical top-hat kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipticalTophat2DKernel {
    model: Ellipse2D,
    kernel: Kernel2D,
}

impl EllipticalTophat2DKernel {
    /// Kernel with semi-axes `radius_maj`, `radius_min` (pixels), rotated by
    /// `position_angle` radians.
    pub fn new(
        radius_maj: f64,
        radius_min: f64,
        position_angle: f64,
        options: &KernelOptions,
    ) -> BeamResult<Self> {
        validate_axes(radius_maj, radius_min)?;
        let model = Ellipse2D::normalized(radius_maj, radius_min, position_angle);

        let (dx, dy) = ellipse_extent(radius_maj, radius_min, position_angle);
        let scaling = options.support_scaling.unwrap_or(TOPHAT_SUPPORT_SCALING);
        let default_size = round_up_to_odd(scaling * 2.0 * dx.max(dy));

        let mut kernel = Kernel2D::from_model(&model, default_size, options)?;
        kernel.truncation = 0.0;
        kernel.is_bool = true;
        Ok(Self { model, kernel })
    }

    pub fn model(&self) -> &Ellipse2D {
        &self.model
    }

    pub fn kernel(&self) -> &Kernel2D {
        &self.kernel
    }

    pub fn into_kernel(self) -> Kernel2D {
        self.kernel
    }
}

impl From<EllipticalTophat2DKernel> for Kernel2D {
    fn from(value: EllipticalTophat2DKernel) -> Self {
        value.kernel
    }
}
