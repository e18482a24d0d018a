//! Integration tests: FITS files on disk, WCS-driven kernels, configuration.

use std::io::Write;

use approx::assert_relative_eq;
use qtty::Arcseconds;
use radio_beam::fits::BLOCK_LENGTH;
use radio_beam::units::{Gigahertzes, SIGMA_TO_FWHM};
use radio_beam::{wcs_to_platescale, Beam, BeamConfig, BeamError, FitsHeader, KernelOptions};
use tempfile::NamedTempFile;

fn image_header() -> FitsHeader {
    let mut header = FitsHeader::new();
    header.set("SIMPLE", true);
    header.set("BITPIX", -32i64);
    header.set("NAXIS", 2i64);
    header.set("NAXIS1", 64i64);
    header.set("NAXIS2", 64i64);
    header.set_with_comment("CDELT1", -2.0e-4, "deg/pixel");
    header.set_with_comment("CDELT2", 2.0e-4, "deg/pixel");
    header.set("BUNIT", "JY/BEAM");
    header
}

fn write_fits(header: &FitsHeader, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    header.write_to(&mut file).unwrap();
    file.write_all(&vec![0u8; BLOCK_LENGTH]).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_beam_round_trips_through_fits_file() {
    let beam = Beam::new(Arcseconds::new(3.6), Arcseconds::new(1.8), 25.0);
    let header = beam.with_header(&image_header());

    let file = write_fits(&header, ".fits");
    let read = Beam::from_fits_file(file.path()).unwrap();
    assert_eq!(read, beam);

    let file = write_fits(&header, ".FIT");
    assert_eq!(Beam::from_fits_file(file.path()).unwrap(), beam);
}

#[test]
fn test_aips_beam_from_file() {
    let mut header = image_header();
    header.add_history("AIPS   CLEAN BMAJ=  1.7599E-03 BMIN=  1.5740E-03 BPA=   2.61");
    let file = write_fits(&header, ".fits");

    let beam = Beam::from_fits_file(file.path()).unwrap();
    assert_relative_eq!(beam.major().value(), 1.7599e-3);
    assert_relative_eq!(beam.minor().value(), 1.5740e-3);
    assert_relative_eq!(beam.pa().value(), 2.61);
}

#[test]
fn test_file_without_beam() {
    let file = write_fits(&image_header(), ".fits");
    assert!(matches!(
        Beam::from_fits_file(file.path()),
        Err(BeamError::NoBeamInHeader)
    ));
}

#[test]
fn test_file_extension_handling() {
    let header = Beam::circular(1.0e-3).with_header(&image_header());

    let compressed = write_fits(&header, ".fits.gz");
    assert!(matches!(
        Beam::from_fits_file(compressed.path()),
        Err(BeamError::UnsupportedCompression { .. })
    ));

    let other = write_fits(&header, ".img");
    assert!(matches!(
        Beam::from_fits_file(other.path()),
        Err(BeamError::UnrecognizedExtension { .. })
    ));

    assert!(matches!(
        Beam::from_fits_file("/nonexistent/cube.fits"),
        Err(BeamError::Io { .. })
    ));
}

#[test]
fn test_truncated_file() {
    let mut file = tempfile::Builder::new().suffix(".fits").tempfile().unwrap();
    file.write_all(format!("{:<80}", "SIMPLE  =                    T").as_bytes())
        .unwrap();
    file.flush().unwrap();
    assert!(matches!(
        Beam::from_fits_file(file.path()),
        Err(BeamError::HeaderParse { .. })
    ));
}

#[test]
fn test_kernel_from_header_pixel_scale() {
    // 2 sigma per pixel
    let pixscale = 2.0e-4;
    let beam = Beam::circular(2.0 * SIGMA_TO_FWHM * pixscale);
    let header = beam.with_header(&image_header());

    let read = Beam::from_fits_header(&header).unwrap();
    let scale = wcs_to_platescale(&header).unwrap();
    assert_relative_eq!(scale, pixscale);

    let kernel = read.as_kernel(scale, &KernelOptions::default()).unwrap();
    assert_relative_eq!(kernel.model().x_stddev, 2.0, epsilon = 1e-9);
    assert_relative_eq!(kernel.kernel().sum(), 1.0, epsilon = 1e-3);
}

#[test]
fn test_smoothing_workflow() {
    // Smooth a 10"x6" image to a round 12" beam
    let native = Beam::new(Arcseconds::new(10.0), Arcseconds::new(6.0), 40.0);
    let target = Beam::circular(Arcseconds::new(12.0));

    let smoothing = target.deconvolve(&native).unwrap();
    let achieved = native.convolve(&smoothing);
    // PA of a round beam is not defined
    assert_relative_eq!(achieved.major().value(), target.major().value(), max_relative = 1e-9);
    assert_relative_eq!(achieved.minor().value(), target.minor().value(), max_relative = 1e-9);

    // Going the other way is impossible
    assert!(native.deconvolve(&target).is_err());
}

#[test]
fn test_brightness_scales_with_area() {
    let small = Beam::circular(Arcseconds::new(1.0));
    let large = Beam::circular(Arcseconds::new(2.0));
    let freq = Gigahertzes::new(1.4);
    let ratio = small.jtok(freq).unwrap().value() / large.jtok(freq).unwrap().value();
    assert_relative_eq!(ratio, 4.0, max_relative = 1e-12);
}

#[test]
fn test_config_file_drives_deconvolution() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[display]\nunit = \"arcmin\"\n\n[deconvolution]\non_failure = \"point_like\""
    )
    .unwrap();
    let config = BeamConfig::from_file(file.path()).unwrap();

    let small = Beam::circular(Arcseconds::new(1.0));
    let large = Beam::circular(Arcseconds::new(5.0));
    let result = config.deconvolve(&small, &large).unwrap();
    assert_eq!(result, Beam::point());
    assert!(config.present(large).to_string().contains("arcmin"));
}
