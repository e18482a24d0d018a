//! Physical units used by beam calculations.
//!
//! Angles come straight from [`qtty`]. Solid angle, spectral frequency, flux
//! density and temperature are not part of qtty, so they are declared here as
//! qtty [`Unit`]s on crate-local dimensions. That keeps conversions such as
//! `Steradians::to::<SquareArcsecond>()` type-checked the same way angular
//! conversions are.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use qtty::{Degrees, Dimension, Quantity, Unit};
use serde::{Deserialize, Serialize};

/// Conversion between a 2-D Gaussian FWHM² and its effective area.
pub const FWHM_TO_AREA: f64 = 2.0 * PI / (8.0 * std::f64::consts::LN_2);

/// Ratio of the FWHM of a Gaussian to its standard deviation, `sqrt(8 ln 2)`.
pub const SIGMA_TO_FWHM: f64 = 2.354_820_045_030_949_3;

/// Speed of light in vacuum, m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Boltzmann constant, J/K.
pub const BOLTZMANN: f64 = 1.380_649e-23;

const DEG_TO_RAD: f64 = PI / 180.0;

macro_rules! define_unit {
    ($(#[$meta:meta])* $name:ident, $alias:ident, $dim:ty, $symbol:expr, $ratio:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
        pub struct $name;

        impl Unit for $name {
            const RATIO: f64 = $ratio;
            type Dim = $dim;
            const SYMBOL: &'static str = $symbol;
        }

        #[doc = concat!("Quantity expressed in [`", stringify!($name), "`].")]
        pub type $alias = Quantity<$name>;
    };
}

/// Dimension tag for solid angles.
pub enum SolidAngle {}
impl Dimension for SolidAngle {}

/// Dimension tag for spectral (cycle) frequency.
pub enum SpectralFrequency {}
impl Dimension for SpectralFrequency {}

/// Dimension tag for spectral flux density.
pub enum FluxDensity {}
impl Dimension for FluxDensity {}

/// Dimension tag for thermodynamic temperature.
pub enum Temperature {}
impl Dimension for Temperature {}

define_unit!(
    /// Steradian, canonical solid angle unit.
    Steradian, Steradians, SolidAngle, "sr", 1.0
);
define_unit!(
    /// Square degree.
    SquareDegree, SquareDegrees, SolidAngle, "deg2", DEG_TO_RAD * DEG_TO_RAD
);
define_unit!(
    /// Square arcsecond.
    SquareArcsecond,
    SquareArcseconds,
    SolidAngle,
    "arcsec2",
    (DEG_TO_RAD / 3600.0) * (DEG_TO_RAD / 3600.0)
);

define_unit!(
    /// Hertz, canonical frequency unit.
    Hertz, Hertzes, SpectralFrequency, "Hz", 1.0
);
define_unit!(
    /// Megahertz.
    Megahertz, Megahertzes, SpectralFrequency, "MHz", 1.0e6
);
define_unit!(
    /// Gigahertz.
    Gigahertz, Gigahertzes, SpectralFrequency, "GHz", 1.0e9
);

define_unit!(
    /// Jansky (1e-26 W m^-2 Hz^-1), canonical flux density unit.
    Jansky, Janskys, FluxDensity, "Jy", 1.0
);
define_unit!(
    /// Millijansky.
    Millijansky, Millijanskys, FluxDensity, "mJy", 1.0e-3
);

define_unit!(
    /// Kelvin.
    Kelvin, Kelvins, Temperature, "K", 1.0
);

/// Size of one Jansky in SI units (W m^-2 Hz^-1).
pub const JANSKY_SI: f64 = 1.0e-26;

/// Angular unit a beam is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngularDisplayUnit {
    #[serde(alias = "deg")]
    Degree,
    #[serde(alias = "arcmin")]
    Arcminute,
    #[default]
    #[serde(alias = "arcsec")]
    Arcsecond,
}

impl AngularDisplayUnit {
    /// Short symbol used in plain-text output.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Degree => "deg",
            Self::Arcminute => "arcmin",
            Self::Arcsecond => "arcsec",
        }
    }

    /// Superscript used in LaTeX output.
    pub fn latex(&self) -> &'static str {
        match self {
            Self::Degree => "\\circ",
            Self::Arcminute => "'",
            Self::Arcsecond => "''",
        }
    }

    /// Express an angle in this unit.
    pub fn value_of(&self, angle: Degrees) -> f64 {
        match self {
            Self::Degree => angle.value(),
            Self::Arcminute => angle.value() * 60.0,
            Self::Arcsecond => angle.value() * 3600.0,
        }
    }
}

impl fmt::Display for AngularDisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for AngularDisplayUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deg" | "degree" | "degrees" => Ok(Self::Degree),
            "arcmin" | "arcminute" | "arcminutes" => Ok(Self::Arcminute),
            "arcsec" | "arcsecond" | "arcseconds" => Ok(Self::Arcsecond),
            other => Err(format!(
                "Unknown angular unit '{}'. Use 'deg', 'arcmin' or 'arcsec'",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qtty::Arcseconds;

    #[test]
    fn test_gaussian_constants() {
        assert_relative_eq!(SIGMA_TO_FWHM, (8.0 * 2f64.ln()).sqrt(), epsilon = 1e-15);
        assert_relative_eq!(
            FWHM_TO_AREA,
            2.0 * PI / SIGMA_TO_FWHM.powi(2),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_solid_angle_conversions() {
        let one_sr = Steradians::new(1.0);
        let deg2: SquareDegrees = one_sr.to();
        assert_relative_eq!(deg2.value(), (180.0 / PI).powi(2), max_relative = 1e-12);

        let arcsec2 = SquareDegrees::new(1.0).to::<SquareArcsecond>();
        assert_relative_eq!(arcsec2.value(), 3600.0 * 3600.0, max_relative = 1e-12);
    }

    #[test]
    fn test_frequency_and_flux_conversions() {
        let f = Gigahertzes::new(1.4).to::<Hertz>();
        assert_relative_eq!(f.value(), 1.4e9);
        let s = Millijanskys::new(250.0).to::<Jansky>();
        assert_relative_eq!(s.value(), 0.25);
    }

    #[test]
    fn test_display_unit_values() {
        let angle: Degrees = Arcseconds::new(36.0).into();
        assert_relative_eq!(AngularDisplayUnit::Arcsecond.value_of(angle), 36.0, epsilon = 1e-9);
        assert_relative_eq!(AngularDisplayUnit::Arcminute.value_of(angle), 0.6, epsilon = 1e-12);
        assert_eq!(AngularDisplayUnit::default(), AngularDisplayUnit::Arcsecond);
    }

    #[test]
    fn test_display_unit_parsing() {
        assert_eq!("deg".parse(), Ok(AngularDisplayUnit::Degree));
        assert_eq!(" Arcmin ".parse(), Ok(AngularDisplayUnit::Arcminute));
        assert!("parsec".parse::<AngularDisplayUnit>().is_err());
    }
}
