//! Gaussian parameter algebra for convolution and deconvolution.
//!
//! A rotated elliptical Gaussian with FWHM axes `M`, `m` and position angle
//! `p` is described by the quadratic-form coefficients
//!
//! ```text
//! α = (M cos p)² + (m sin p)²
//! β = (M sin p)² + (m cos p)²
//! γ = 2 (m² − M²) sin p cos p
//! ```
//!
//! Convolution adds these coefficients, deconvolution subtracts them. The
//! resulting beam is recovered from the eigen-decomposition of the form
//! (after Sault's `gaupar` routine in MIRIAD).

/// Quadratic-form coefficients of one or more Gaussians. Axes in degrees,
/// coefficients in square degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GaussianTerms {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

/// Axes (degrees) and position angle (radians) recovered from [`GaussianTerms`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Solved {
    pub major: f64,
    pub minor: f64,
    pub pa_rad: f64,
}

impl GaussianTerms {
    pub fn of(major: f64, minor: f64, pa_rad: f64) -> Self {
        let (sin_p, cos_p) = pa_rad.sin_cos();
        Self {
            alpha: (major * cos_p).powi(2) + (minor * sin_p).powi(2),
            beta: (major * sin_p).powi(2) + (minor * cos_p).powi(2),
            gamma: 2.0 * (minor.powi(2) - major.powi(2)) * sin_p * cos_p,
        }
    }

    pub fn plus(self, other: Self) -> Self {
        Self {
            alpha: self.alpha + other.alpha,
            beta: self.beta + other.beta,
            gamma: self.gamma + other.gamma,
        }
    }

    pub fn minus(self, other: Self) -> Self {
        Self {
            alpha: self.alpha - other.alpha,
            beta: self.beta - other.beta,
            gamma: self.gamma - other.gamma,
        }
    }

    fn sum(&self) -> f64 {
        self.alpha + self.beta
    }

    fn spread(&self) -> f64 {
        ((self.alpha - self.beta).powi(2) + self.gamma.powi(2)).sqrt()
    }

    /// Whether the terms describe a real (non-negative width) Gaussian.
    pub fn is_physical(&self) -> bool {
        self.alpha >= 0.0 && self.beta >= 0.0 && self.sum() >= self.spread()
    }

    pub fn solve(&self) -> Solved {
        let s = self.sum();
        let t = self.spread();
        let major = (0.5 * (s + t)).max(0.0).sqrt();
        let minor = (0.5 * (s - t)).max(0.0).sqrt();
        let pa_rad = if self.gamma.abs() + (self.alpha - self.beta).abs() == 0.0 {
            0.0
        } else {
            0.5 * (-self.gamma).atan2(self.alpha - self.beta)
        };
        Solved {
            major,
            minor,
            pa_rad,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_single_beam_round_trips() {
        let solved = GaussianTerms::of(3.0, 1.0, 0.4).solve();
        assert_relative_eq!(solved.major, 3.0, epsilon = 1e-12);
        assert_relative_eq!(solved.minor, 1.0, epsilon = 1e-12);
        assert_relative_eq!(solved.pa_rad, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_circular_terms_have_zero_pa() {
        let terms = GaussianTerms::of(2.0, 2.0, 1.0);
        assert_relative_eq!(terms.alpha, terms.beta, epsilon = 1e-12);
        let solved = GaussianTerms::of(2.0, 2.0, 0.0).solve();
        assert_eq!(solved.pa_rad, 0.0);
    }

    #[test]
    fn test_orthogonal_sum_is_round() {
        let terms = GaussianTerms::of(2.0, 1.0, 0.0).plus(GaussianTerms::of(2.0, 1.0, FRAC_PI_2));
        let solved = terms.solve();
        assert_relative_eq!(solved.major, 5f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(solved.minor, 5f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_negative_terms_are_unphysical() {
        let terms = GaussianTerms::of(1.0, 1.0, 0.0).minus(GaussianTerms::of(2.0, 1.0, 0.0));
        assert!(!terms.is_physical());
        assert!(GaussianTerms::of(2.0, 1.0, 0.0)
            .minus(GaussianTerms::of(2.0, 1.0, 0.0))
            .is_physical());
    }
}
