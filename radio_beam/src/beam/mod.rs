//! Elliptical Gaussian beams.
//!
//! A [`Beam`] is the FWHM major and minor axes plus the position angle of a
//! 2-D Gaussian point spread function. Beams are plain values: every
//! operation returns a new beam.
//!
//! # Modules
//!
//! - [`algebra`]: convolution/deconvolution in Gaussian parameter space
//! - [`builder`]: optional-field construction ([`BeamBuilder`])
//!
//! # Example
//!
//! ```
//! use qtty::Arcseconds;
//! use radio_beam::Beam;
//!
//! let beam = Beam::new(Arcseconds::new(10.0), Arcseconds::new(5.0), 30.0);
//! let smoothed = beam.convolve(&Beam::circular(Arcseconds::new(5.0)));
//! let recovered = smoothed.deconvolve(&Beam::circular(Arcseconds::new(5.0))).unwrap();
//! assert!(recovered.approx_eq(&beam, 1e-9));
//! ```

pub(crate) mod algebra;
pub mod builder;


use std::fmt;
use std::ops::Mul;
use std::path::Path;

use qtty::length::LengthUnit;
use qtty::{Degree, Degrees, Quantity, Radian, Radians, Unit};
use serde::{Deserialize, Serialize};

pub use builder::BeamBuilder;

use crate::brightness::BrightnessTemperature;
use crate::error::{BeamError, BeamResult};
use crate::fits::{self, FitsHeader};
use crate::kernel::{EllipticalGaussian2DKernel, EllipticalTophat2DKernel, KernelOptions};
use crate::units::{
    AngularDisplayUnit, FluxDensity, Janskys, Kelvins, SolidAngle, SpectralFrequency, Steradian,
    Steradians, FWHM_TO_AREA, SIGMA_TO_FWHM,
};
use algebra::GaussianTerms;

/// Header keywords holding the beam, in write order.
pub const BEAM_KEYWORDS: [&str; 3] = ["BMAJ", "BMIN", "BPA"];

/// What [`Beam::deconvolve_with`] does when the result would be unphysical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeconvolveFailure {
    /// Return [`BeamError::Deconvolution`].
    #[default]
    Error,
    /// Return [`Beam::point`].
    PointLike,
}

/// Elliptical Gaussian beam.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Beam {
    major: Degrees,
    minor: Degrees,
    pa: Degrees,
    #[serde(default, skip_serializing)]
    default_unit: AngularDisplayUnit,
}

/// Geometry for drawing a beam on a pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotEllipse {
    /// Centre, pixels.
    pub center: (f64, f64),
    /// Full major axis, pixels.
    pub width: f64,
    /// Full minor axis, pixels.
    pub height: f64,
    /// Rotation, degrees.
    pub angle: f64,
}

impl Beam {
    /// Beam with the given FWHM axes and position angle.
    ///
    /// Bare `f64` arguments are taken as degrees.
    pub fn new(
        major: impl Into<Degrees>,
        minor: impl Into<Degrees>,
        pa: impl Into<Degrees>,
    ) -> Self {
        Self {
            major: major.into(),
            minor: minor.into(),
            pa: pa.into(),
            default_unit: AngularDisplayUnit::default(),
        }
    }

    /// Round beam.
    pub fn circular(fwhm: impl Into<Degrees>) -> Self {
        let fwhm = fwhm.into();
        Self::new(fwhm, fwhm, 0.0)
    }

    /// Round beam whose solid angle is `area`.
    pub fn from_area<U: Unit<Dim = SolidAngle>>(area: Quantity<U>) -> Self {
        let sr = area.to::<Steradian>().value();
        let fwhm = Radians::new((sr / (2.0 * std::f64::consts::PI)).sqrt() * SIGMA_TO_FWHM);
        Self::circular(fwhm.to::<Degree>())
    }

    /// Zero-size beam, the result of a failed deconvolution.
    pub fn point() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn builder() -> BeamBuilder {
        BeamBuilder::default()
    }

    pub fn major(&self) -> Degrees {
        self.major
    }

    pub fn minor(&self) -> Degrees {
        self.minor
    }

    pub fn pa(&self) -> Degrees {
        self.pa
    }

    /// Unit the axes are rendered in by `Display` and [`Beam::to_latex`].
    pub fn default_unit(&self) -> AngularDisplayUnit {
        self.default_unit
    }

    pub fn with_default_unit(mut self, unit: AngularDisplayUnit) -> Self {
        self.default_unit = unit;
        self
    }

    /// Solid angle of the beam.
    pub fn sr(&self) -> Steradians {
        let major = self.major.to::<Radian>().value();
        let minor = self.minor.to::<Radian>().value();
        Steradians::new(major * minor * FWHM_TO_AREA)
    }

    /// Alias of [`Beam::sr`].
    pub fn area(&self) -> Steradians {
        self.sr()
    }

    /// Physical area subtended at `distance`, in square units of the distance.
    pub fn projected_area<L: LengthUnit>(&self, distance: Quantity<L>) -> f64 {
        self.sr().value() * distance.value() * distance.value()
    }

    /// Whether all three parameters agree within `tolerance` degrees.
    pub fn approx_eq(&self, other: &Beam, tolerance: f64) -> bool {
        (self.major.value() - other.major.value()).abs() <= tolerance
            && (self.minor.value() - other.minor.value()).abs() <= tolerance
            && (self.pa.value() - other.pa.value()).abs() <= tolerance
    }

    fn terms(&self) -> GaussianTerms {
        GaussianTerms::of(
            self.major.value(),
            self.minor.value(),
            self.pa.to::<Radian>().value(),
        )
    }

    fn with_terms(&self, terms: GaussianTerms) -> Self {
        let solved = terms.solve();
        Self {
            major: Degrees::new(solved.major),
            minor: Degrees::new(solved.minor),
            pa: Radians::new(solved.pa_rad).to::<Degree>(),
            default_unit: self.default_unit,
        }
    }

    /// Beam obtained by convolving this beam with `other`.
    pub fn convolve(&self, other: &Beam) -> Beam {
        self.with_terms(self.terms().plus(other.terms()))
    }

    /// Beam that, convolved with `other`, gives this beam.
    ///
    /// # Errors
    ///
    /// [`BeamError::Deconvolution`] if `other` is larger than this beam along
    /// some direction.
    pub fn deconvolve(&self, other: &Beam) -> BeamResult<Beam> {
        self.deconvolve_with(other, DeconvolveFailure::Error)
    }

    pub fn deconvolve_with(&self, other: &Beam, on_failure: DeconvolveFailure) -> BeamResult<Beam> {
        let terms = self.terms().minus(other.terms());
        if terms.is_physical() {
            return Ok(self.with_terms(terms));
        }
        match on_failure {
            DeconvolveFailure::PointLike => {
                log::debug!("Deconvolving {} from {} failed, returning point beam", other, self);
                Ok(Beam::point())
            }
            DeconvolveFailure::Error => Err(BeamError::Deconvolution {
                message: format!("{} is larger than {} along some direction", other, self),
            }),
        }
    }

    /// LaTeX rendering of the beam.
    pub fn to_latex(&self) -> String {
        let unit = self.default_unit;
        format!(
            "Beam: BMAJ=${}^{{{sym}}}$ BMIN=${}^{{{sym}}}$ BPA=${}^\\circ$",
            unit.value_of(self.major),
            unit.value_of(self.minor),
            self.pa.value(),
            sym = unit.latex(),
        )
    }

    /// `BMAJ`, `BMIN`, `BPA` in degrees.
    pub fn to_header_keywords(&self) -> [(&'static str, f64); 3] {
        [
            (BEAM_KEYWORDS[0], self.major.value()),
            (BEAM_KEYWORDS[1], self.minor.value()),
            (BEAM_KEYWORDS[2], self.pa.value()),
        ]
    }

    /// Write the beam keywords into `header`, replacing existing ones.
    pub fn attach_to_header(&self, header: &mut FitsHeader) {
        header.update(self.to_header_keywords());
    }

    /// Copy of `header` carrying the beam keywords.
    pub fn with_header(&self, header: &FitsHeader) -> FitsHeader {
        let mut header = header.clone();
        self.attach_to_header(&mut header);
        header
    }

    /// Beam stored in `header`.
    ///
    /// `BMAJ` selects keyword mode, with `BMIN` defaulting to `BMAJ` and `BPA`
    /// to zero. Without `BMAJ` the last AIPS `HISTORY` beam record is used.
    ///
    /// # Errors
    ///
    /// [`BeamError::NoBeamInHeader`] if neither form is present.
    pub fn from_fits_header(header: &FitsHeader) -> BeamResult<Beam> {
        let Some(major) = header.get_f64("BMAJ")? else {
            return Self::from_aips_header(header)?.ok_or(BeamError::NoBeamInHeader);
        };
        let mut builder = Beam::builder().major(major);
        if let Some(minor) = header.get_f64("BMIN")? {
            builder = builder.minor(minor);
        }
        if let Some(pa) = header.get_f64("BPA")? {
            builder = builder.pa(pa);
        }
        builder.build()
    }

    /// Beam from the last AIPS `HISTORY` record, if any.
    ///
    /// Records look like `AIPS   CLEAN BMAJ=  1.7599E-03 BMIN=  1.5740E-03 BPA=   2.61`,
    /// all values in degrees.
    pub fn from_aips_header(header: &FitsHeader) -> BeamResult<Option<Beam>> {
        let Some(line) = header.history().filter(|text| text.contains("BMAJ")).last() else {
            return Ok(None);
        };
        log::debug!("Reading beam from AIPS history: {}", line.trim());

        let major = aips_value(line, "BMAJ=")?;
        let minor = aips_value(line, "BMIN=")?;
        let pa = aips_value(line, "BPA=")?;
        Ok(Some(Beam::new(major, minor, pa)))
    }

    /// Beam from the primary header of a FITS file.
    pub fn from_fits_file<P: AsRef<Path>>(path: P) -> BeamResult<Beam> {
        Self::from_fits_header(&fits::open_header(path)?)
    }

    /// Jy/beam ↔ K conversion at `frequency`.
    pub fn jtok_equiv<F: Unit<Dim = SpectralFrequency>>(
        &self,
        frequency: Quantity<F>,
    ) -> BeamResult<BrightnessTemperature> {
        BrightnessTemperature::new(self.sr(), frequency)
    }

    /// Brightness temperature of 1 Jy/beam.
    pub fn jtok<F: Unit<Dim = SpectralFrequency>>(&self, frequency: Quantity<F>) -> BeamResult<Kelvins> {
        self.jtok_value(frequency, Janskys::new(1.0))
    }

    /// Brightness temperature of `flux` per beam.
    pub fn jtok_value<F, S>(&self, frequency: Quantity<F>, flux: Quantity<S>) -> BeamResult<Kelvins>
    where
        F: Unit<Dim = SpectralFrequency>,
        S: Unit<Dim = FluxDensity>,
    {
        Ok(self.jtok_equiv(frequency)?.jy_to_k(flux))
    }

    /// Axes in pixels, divided by `SIGMA_TO_FWHM · pixscale`.
    fn stddev_pixels(&self, pixscale: Degrees) -> (f64, f64) {
        let scale = pixscale.value() * SIGMA_TO_FWHM;
        (self.major.value() / scale, self.minor.value() / scale)
    }

    /// Gaussian kernel of this beam on a grid of `pixscale` per pixel.
    pub fn as_kernel(
        &self,
        pixscale: impl Into<Degrees>,
        options: &KernelOptions,
    ) -> BeamResult<EllipticalGaussian2DKernel> {
        log::warn!("as_kernel is not aware of any misalignment between pixel and world coordinates");
        let (stddev_maj, stddev_min) = self.stddev_pixels(pixscale.into());
        EllipticalGaussian2DKernel::new(stddev_maj, stddev_min, self.pa.to::<Radian>().value(), options)
    }

    /// Top-hat kernel with the same area as this beam.
    pub fn as_tophat_kernel(
        &self,
        pixscale: impl Into<Degrees>,
        options: &KernelOptions,
    ) -> BeamResult<EllipticalTophat2DKernel> {
        log::warn!(
            "as_tophat_kernel is not aware of any misalignment between pixel and world coordinates"
        );
        // π r² = 2 π σ²
        let (stddev_maj, stddev_min) = self.stddev_pixels(pixscale.into());
        EllipticalTophat2DKernel::new(
            std::f64::consts::SQRT_2 * stddev_maj,
            std::f64::consts::SQRT_2 * stddev_min,
            self.pa.to::<Radian>().value(),
            options,
        )
    }

    /// Ellipse centred on `(xcen, ycen)` for a grid of `pixscale` per pixel.
    pub fn ellipse_to_plot(&self, xcen: f64, ycen: f64, pixscale: impl Into<Degrees>) -> PlotEllipse {
        let pixscale = pixscale.into().value();
        PlotEllipse {
            center: (xcen, ycen),
            width: self.major.value() / pixscale,
            height: self.minor.value() / pixscale,
            angle: self.pa.value(),
        }
    }
}

/// Parse the number that follows `tag` in an AIPS history record.
fn aips_value(line: &str, tag: &str) -> BeamResult<f64> {
    let keyword = tag.trim_end_matches('=');
    let rest = line
        .find(tag)
        .map(|pos| &line[pos + tag.len()..])
        .ok_or_else(|| BeamError::missing_keyword(keyword))?;
    let token = rest.split_whitespace().next().unwrap_or("");
    token.parse::<f64>().map_err(|e| BeamError::InvalidKeyword {
        keyword: keyword.to_string(),
        message: format!("'{}' in AIPS history: {}", token, e),
    })
}

/// Exact comparison of the axes and position angle; the display unit is ignored.
impl PartialEq for Beam {
    fn eq(&self, other: &Self) -> bool {
        self.major == other.major && self.minor == other.minor && self.pa == other.pa
    }
}

impl fmt::Display for Beam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.default_unit;
        write!(
            f,
            "Beam: BMAJ={} {unit} BMIN={} {unit} BPA={} deg",
            unit.value_of(self.major),
            unit.value_of(self.minor),
            self.pa.value(),
        )
    }
}

impl Mul for Beam {
    type Output = Beam;

    fn mul(self, rhs: Beam) -> Beam {
        self.convolve(&rhs)
    }
}

impl Mul<&Beam> for &Beam {
    type Output = Beam;

    fn mul(self, rhs: &Beam) -> Beam {
        self.convolve(rhs)
    }
}
