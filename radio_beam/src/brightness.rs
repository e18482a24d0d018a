//! Jy/beam ↔ K brightness temperature conversion.
//!
//! Uses the Rayleigh-Jeans approximation
//!
//! ```text
//! T = S c² / (2 k ν² Ω)
//! ```
//!
//! where `S` is the flux density per beam, `ν` the observing frequency and `Ω`
//! the beam solid angle.

use qtty::{Quantity, Unit};
use serde::{Deserialize, Serialize};

use crate::error::{BeamError, BeamResult};
use crate::units::{
    FluxDensity, Hertz, Hertzes, Jansky, Janskys, Kelvins, SpectralFrequency, Steradians,
    BOLTZMANN, JANSKY_SI, SPEED_OF_LIGHT,
};

/// Conversion between flux density per beam and brightness temperature at a
/// fixed frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrightnessTemperature {
    beam_area: Steradians,
    frequency: Hertzes,
}

impl BrightnessTemperature {
    /// # Errors
    ///
    /// [`BeamError::InvalidFrequency`] if the frequency is not a positive finite number.
    pub fn new<F: Unit<Dim = SpectralFrequency>>(
        beam_area: Steradians,
        frequency: Quantity<F>,
    ) -> BeamResult<Self> {
        let frequency = frequency.to::<Hertz>();
        if !(frequency.value().is_finite() && frequency.value() > 0.0) {
            return Err(BeamError::InvalidFrequency {
                value: frequency.value(),
            });
        }
        Ok(Self {
            beam_area,
            frequency,
        })
    }

    pub fn beam_area(&self) -> Steradians {
        self.beam_area
    }

    pub fn frequency(&self) -> Hertzes {
        self.frequency
    }

    /// Kelvin per Jansky/beam.
    pub fn kelvin_per_jansky(&self) -> f64 {
        let nu = self.frequency.value();
        JANSKY_SI * SPEED_OF_LIGHT * SPEED_OF_LIGHT
            / (2.0 * BOLTZMANN * nu * nu * self.beam_area.value())
    }

    /// Brightness temperature of a flux density per beam.
    pub fn jy_to_k<F: Unit<Dim = FluxDensity>>(&self, flux: Quantity<F>) -> Kelvins {
        Kelvins::new(flux.to::<Jansky>().value() * self.kelvin_per_jansky())
    }

    /// Flux density per beam of a brightness temperature.
    pub fn k_to_jy(&self, temperature: Kelvins) -> Janskys {
        Janskys::new(temperature.value() / self.kelvin_per_jansky())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{Gigahertzes, Millijanskys, SquareArcsecond, SquareArcseconds};
    use approx::assert_relative_eq;

    fn one_arcsec2_at_1ghz() -> BrightnessTemperature {
        let area = SquareArcseconds::new(1.0).to::<crate::units::Steradian>();
        BrightnessTemperature::new(area, Gigahertzes::new(1.0)).unwrap()
    }

    #[test]
    fn test_kelvin_per_jansky_reference_value() {
        // 1 Jy in 1 arcsec² at 1 GHz is ~1.3848e6 K
        let equiv = one_arcsec2_at_1ghz();
        assert_relative_eq!(equiv.kelvin_per_jansky(), 1.3848e6, max_relative = 1e-4);
    }

    #[test]
    fn test_round_trip_between_jy_and_k() {
        let equiv = one_arcsec2_at_1ghz();
        let t = equiv.jy_to_k(Millijanskys::new(2.0));
        assert_relative_eq!(t.value(), 2.0e-3 * equiv.kelvin_per_jansky());
        let s = equiv.k_to_jy(t);
        assert_relative_eq!(s.value(), 2.0e-3, max_relative = 1e-12);
    }

    #[test]
    fn test_scales_inversely_with_area_and_frequency_squared() {
        let base = one_arcsec2_at_1ghz();
        let area = SquareArcseconds::new(4.0).to::<crate::units::Steradian>();
        let wide = BrightnessTemperature::new(area, Gigahertzes::new(2.0)).unwrap();
        assert_relative_eq!(
            wide.kelvin_per_jansky() * 16.0,
            base.kelvin_per_jansky(),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            wide.beam_area().to::<SquareArcsecond>().value(),
            4.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_rejects_non_positive_frequency() {
        let area = Steradians::new(1e-9);
        assert!(matches!(
            BrightnessTemperature::new(area, Gigahertzes::new(0.0)),
            Err(BeamError::InvalidFrequency { .. })
        ));
        assert!(BrightnessTemperature::new(area, Hertzes::new(f64::NAN)).is_err());
    }
}
