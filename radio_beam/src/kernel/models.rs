//! Analytic 2-D models sampled into kernels.

/// A scalar function of pixel offsets from the kernel centre.
pub trait Model2D {
    fn evaluate(&self, x: f64, y: f64) -> f64;
}

/// Rotate `(x, y)` into the model frame.
#[inline]
fn rotate(x: f64, y: f64, sin_t: f64, cos_t: f64) -> (f64, f64) {
    (x * cos_t + y * sin_t, -x * sin_t + y * cos_t)
}

/// Rotated elliptical Gaussian centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian2D {
    pub amplitude: f64,
    pub x_stddev: f64,
    pub y_stddev: f64,
    pub theta: f64,
    sin_t: f64,
    cos_t: f64,
}

impl Gaussian2D {
    pub fn new(amplitude: f64, x_stddev: f64, y_stddev: f64, theta: f64) -> Self {
        let (sin_t, cos_t) = theta.sin_cos();
        Self {
            amplitude,
            x_stddev,
            y_stddev,
            theta,
            sin_t,
            cos_t,
        }
    }

    /// Gaussian with unit integral over the plane.
    pub fn normalized(x_stddev: f64, y_stddev: f64, theta: f64) -> Self {
        Self::new(
            1.0 / (2.0 * std::f64::consts::PI * x_stddev * y_stddev),
            x_stddev,
            y_stddev,
            theta,
        )
    }
}

impl Model2D for Gaussian2D {
    fn evaluate(&self, x: f64, y: f64) -> f64 {
        let (u, v) = rotate(x, y, self.sin_t, self.cos_t);
        let exponent = 0.5 * ((u / self.x_stddev).powi(2) + (v / self.y_stddev).powi(2));
        self.amplitude * (-exponent).exp()
    }
}

/// Rotated filled ellipse centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse2D {
    pub amplitude: f64,
    pub a: f64,
    pub b: f64,
    pub theta: f64,
    sin_t: f64,
    cos_t: f64,
}

impl Ellipse2D {
    pub fn new(amplitude: f64, a: f64, b: f64, theta: f64) -> Self {
        let (sin_t, cos_t) = theta.sin_cos();
        Self {
            amplitude,
            a,
            b,
            theta,
            sin_t,
            cos_t,
        }
    }

    /// Ellipse with unit integral over the plane.
    pub fn normalized(a: f64, b: f64, theta: f64) -> Self {
        Self::new(1.0 / (std::f64::consts::PI * a * b), a, b, theta)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (u, v) = rotate(x, y, self.sin_t, self.cos_t);
        (u / self.a).powi(2) + (v / self.b).powi(2) <= 1.0
    }
}

impl Model2D for Ellipse2D {
    fn evaluate(&self, x: f64, y: f64) -> f64 {
        if self.contains(x, y) {
            self.amplitude
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_gaussian_peak_and_half_width() {
        let g = Gaussian2D::new(1.0, 2.0, 1.0, 0.0);
        assert_relative_eq!(g.evaluate(0.0, 0.0), 1.0);
        // one sigma along x
        assert_relative_eq!(g.evaluate(2.0, 0.0), (-0.5f64).exp());
        assert_relative_eq!(g.evaluate(0.0, 1.0), (-0.5f64).exp());
    }

    #[test]
    fn test_gaussian_rotation_swaps_axes() {
        let g = Gaussian2D::new(1.0, 2.0, 1.0, FRAC_PI_2);
        assert_relative_eq!(g.evaluate(0.0, 2.0), (-0.5f64).exp(), epsilon = 1e-12);
        assert_relative_eq!(g.evaluate(1.0, 0.0), (-0.5f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_ellipse_membership() {
        let e = Ellipse2D::normalized(3.0, 1.0, 0.0);
        assert!(e.contains(2.9, 0.0));
        assert!(!e.contains(0.0, 1.5));
        assert_relative_eq!(e.evaluate(0.0, 0.0), 1.0 / (std::f64::consts::PI * 3.0));
        assert_eq!(e.evaluate(5.0, 5.0), 0.0);
    }
}
