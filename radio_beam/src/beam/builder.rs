//! Optional-field beam construction.

use qtty::{Degrees, Quantity, Unit};

use super::Beam;
use crate::error::{BeamError, BeamResult};
use crate::units::{AngularDisplayUnit, SolidAngle, Steradian, Steradians};

/// Builder for [`Beam`].
///
/// `minor` defaults to `major` and `pa` to zero. An `area` overrides the axes
/// and yields a round beam of that solid angle.
///
/// ```
/// use qtty::Arcseconds;
/// use radio_beam::Beam;
///
/// let beam = Beam::builder().major(Arcseconds::new(3.0)).build().unwrap();
/// assert_eq!(beam.minor(), beam.major());
/// ```
#[derive(Debug, Clone, Default)]
pub struct BeamBuilder {
    major: Option<Degrees>,
    minor: Option<Degrees>,
    pa: Option<Degrees>,
    area: Option<Steradians>,
    default_unit: Option<AngularDisplayUnit>,
}

impl BeamBuilder {
    pub fn major(mut self, major: impl Into<Degrees>) -> Self {
        self.major = Some(major.into());
        self
    }

    pub fn minor(mut self, minor: impl Into<Degrees>) -> Self {
        self.minor = Some(minor.into());
        self
    }

    pub fn pa(mut self, pa: impl Into<Degrees>) -> Self {
        self.pa = Some(pa.into());
        self
    }

    pub fn area<U: Unit<Dim = SolidAngle>>(mut self, area: Quantity<U>) -> Self {
        self.area = Some(area.to::<Steradian>());
        self
    }

    pub fn default_unit(mut self, unit: AngularDisplayUnit) -> Self {
        self.default_unit = Some(unit);
        self
    }

    /// # Errors
    ///
    /// [`BeamError::MissingAxis`] if neither a major axis nor an area was given.
    pub fn build(self) -> BeamResult<Beam> {
        let beam = match (self.area, self.major) {
            (Some(area), _) => Beam::from_area(area),
            (None, Some(major)) => Beam::new(
                major,
                self.minor.unwrap_or(major),
                self.pa.unwrap_or_else(|| Degrees::new(0.0)),
            ),
            (None, None) => return Err(BeamError::MissingAxis),
        };
        Ok(beam.with_default_unit(self.default_unit.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::SquareArcseconds;
    use approx::assert_relative_eq;
    use qtty::Arcseconds;

    #[test]
    fn test_defaults() {
        let beam = BeamBuilder::default().major(1.0).build().unwrap();
        assert_eq!(beam, Beam::new(1.0, 1.0, 0.0));
        assert_eq!(beam.default_unit(), AngularDisplayUnit::Arcsecond);
    }

    #[test]
    fn test_area_wins_over_axes() {
        let beam = BeamBuilder::default()
            .major(Arcseconds::new(10.0))
            .minor(Arcseconds::new(1.0))
            .pa(45.0)
            .area(SquareArcseconds::new(50.0))
            .build()
            .unwrap();
        assert_eq!(beam.major(), beam.minor());
        assert_eq!(beam.pa().value(), 0.0);
        assert_relative_eq!(
            beam.sr().to::<crate::units::SquareArcsecond>().value(),
            50.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_missing_axis() {
        let err = BeamBuilder::default().minor(1.0).build().unwrap_err();
        assert!(matches!(err, BeamError::MissingAxis));
    }

    #[test]
    fn test_default_unit_is_carried() {
        let beam = Beam::builder()
            .major(1.0)
            .default_unit(AngularDisplayUnit::Degree)
            .build()
            .unwrap();
        assert_eq!(beam.default_unit(), AngularDisplayUnit::Degree);
    }
}
