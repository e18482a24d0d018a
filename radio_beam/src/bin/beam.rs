//! `beam` command line tool.
//!
//! Inspect and combine radio beams from the shell.
//!
//! # Usage
//!
//! ```bash
//! # Beam stored in a FITS header
//! beam show image.fits
//!
//! # Beams are written MAJOR[xMINOR][@PA], axes in arcsec, PA in degrees
//! beam convolve 10x5@30 3
//! beam deconvolve 12x8@30 3 --point-like
//! beam jtok 10x5 --freq-ghz 1.4 --flux-jy 0.02
//! beam kernel 10x5@30 --pixscale 1.0 --tophat
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter, e.g. `debug` or `radio_beam=debug` (default: info)

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use qtty::Arcseconds;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use radio_beam::kernel::DiscretizeMode;
use radio_beam::units::{Gigahertzes, Janskys};
use radio_beam::{Beam, BeamConfig, DeconvolveFailure, Kernel2D};

#[derive(Parser, Debug)]
#[command(name = "beam", version, about = "Radio beam calculator")]
struct Cli {
    #[arg(long, global = true, help = "Configuration file (default: radio_beam.toml if present)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the beam stored in a FITS file header
    Show { file: PathBuf },
    /// Convolve two beams
    Convolve { beam: BeamArg, other: BeamArg },
    /// Deconvolve OTHER from BEAM
    Deconvolve {
        beam: BeamArg,
        other: BeamArg,
        #[arg(long, help = "Return a point beam instead of failing")]
        point_like: bool,
    },
    /// Brightness temperature of a flux density per beam
    Jtok {
        beam: BeamArg,
        #[arg(long)]
        freq_ghz: f64,
        #[arg(long, default_value_t = 1.0)]
        flux_jy: f64,
    },
    /// Sample the beam as a convolution kernel
    Kernel {
        beam: BeamArg,
        #[arg(long, help = "Pixel scale, arcsec per pixel")]
        pixscale: f64,
        #[arg(long, help = "Top-hat kernel with the beam's area")]
        tophat: bool,
        #[arg(long)]
        mode: Option<DiscretizeMode>,
        #[arg(long, help = "Odd kernel size in pixels")]
        size: Option<usize>,
    },
}

/// Beam given on the command line as `MAJOR[xMINOR][@PA]`.
#[derive(Debug, Clone, Copy)]
struct BeamArg(Beam);

impl FromStr for BeamArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (axes, pa) = match s.split_once('@') {
            Some((axes, pa)) => (axes, Some(pa)),
            None => (s, None),
        };
        let (major, minor) = match axes.split_once(['x', 'X']) {
            Some((major, minor)) => (major, Some(minor)),
            None => (axes, None),
        };

        let number = |text: &str, what: &str| {
            text.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid {} '{}': {}", what, text, e))
        };
        let mut builder = Beam::builder().major(Arcseconds::new(number(major, "major axis")?));
        if let Some(minor) = minor {
            builder = builder.minor(Arcseconds::new(number(minor, "minor axis")?));
        }
        if let Some(pa) = pa {
            builder = builder.pa(number(pa, "position angle")?);
        }
        builder.build().map(BeamArg).map_err(|e| e.to_string())
    }
}

#[derive(Serialize)]
struct BeamReport {
    major_arcsec: f64,
    minor_arcsec: f64,
    pa_deg: f64,
    area_sr: f64,
}

impl From<&Beam> for BeamReport {
    fn from(beam: &Beam) -> Self {
        Self {
            major_arcsec: beam.major().to::<qtty::Arcsecond>().value(),
            minor_arcsec: beam.minor().to::<qtty::Arcsecond>().value(),
            pa_deg: beam.pa().value(),
            area_sr: beam.sr().value(),
        }
    }
}

#[derive(Serialize)]
struct JtokReport {
    beam: BeamReport,
    frequency_hz: f64,
    flux_jy: f64,
    kelvin: f64,
}

#[derive(Serialize)]
struct KernelReport<'a> {
    shape: (usize, usize),
    sum: f64,
    truncation: f64,
    is_bool: bool,
    array: &'a [f64],
}

fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => BeamConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => BeamConfig::load_or_default().context("Failed to load configuration")?,
    };
    debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Show { file } => {
            let beam = Beam::from_fits_file(&file)
                .with_context(|| format!("Failed to read beam from {}", file.display()))?;
            print_beam(&config.present(beam), cli.json)?;
        }
        Commands::Convolve { beam, other } => {
            let result = beam.0.convolve(&other.0);
            print_beam(&config.present(result), cli.json)?;
        }
        Commands::Deconvolve {
            beam,
            other,
            point_like,
        } => {
            let result = if point_like {
                beam.0.deconvolve_with(&other.0, DeconvolveFailure::PointLike)
            } else {
                config.deconvolve(&beam.0, &other.0)
            }
            .context("Deconvolution failed")?;
            print_beam(&config.present(result), cli.json)?;
        }
        Commands::Jtok {
            beam,
            freq_ghz,
            flux_jy,
        } => {
            let kelvin = beam
                .0
                .jtok_value(Gigahertzes::new(freq_ghz), Janskys::new(flux_jy))
                .context("Brightness temperature conversion failed")?;
            if cli.json {
                let report = JtokReport {
                    beam: BeamReport::from(&beam.0),
                    frequency_hz: freq_ghz * 1.0e9,
                    flux_jy,
                    kelvin: kelvin.value(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{} Jy/beam = {} K", flux_jy, kelvin.value());
            }
        }
        Commands::Kernel {
            beam,
            pixscale,
            tophat,
            mode,
            size,
        } => {
            if pixscale <= 0.0 {
                bail!("pixscale must be positive, got {}", pixscale);
            }
            let mut options = config.kernel.clone();
            if let Some(mode) = mode {
                options = options.with_mode(mode);
            }
            if let Some(size) = size {
                options = options.with_size(size, size);
            }
            let pixscale = Arcseconds::new(pixscale);
            let kernel: Kernel2D = if tophat {
                beam.0.as_tophat_kernel(pixscale, &options)?.into()
            } else {
                beam.0.as_kernel(pixscale, &options)?.into()
            };
            print_kernel(&kernel, cli.json)?;
        }
    }

    Ok(())
}

fn print_beam(beam: &Beam, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&BeamReport::from(beam))?);
    } else {
        println!("{}", beam);
    }
    Ok(())
}

fn print_kernel(kernel: &Kernel2D, json: bool) -> anyhow::Result<()> {
    if json {
        let report = KernelReport {
            shape: kernel.shape(),
            sum: kernel.sum(),
            truncation: kernel.truncation(),
            is_bool: kernel.is_bool(),
            array: kernel.array(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let (ny, nx) = kernel.shape();
    println!(
        "Kernel {}x{} sum={:.6} truncation={:.3e}{}",
        ny,
        nx,
        kernel.sum(),
        kernel.truncation(),
        if kernel.is_bool() { " (top-hat)" } else { "" }
    );
    for row in kernel.rows() {
        let line: Vec<String> = row.iter().map(|v| format!("{:.3e}", v)).collect();
        println!("{}", line.join(" "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(text: &str) -> Beam {
        text.parse::<BeamArg>().unwrap().0
    }

    fn arcsec(angle: qtty::Degrees) -> f64 {
        angle.to::<qtty::Arcsecond>().value()
    }

    #[test]
    fn test_major_only_is_circular() {
        let beam = parse("10");
        assert_relative_eq!(arcsec(beam.major()), 10.0, max_relative = 1e-12);
        assert_eq!(beam.minor(), beam.major());
        assert_eq!(beam.pa().value(), 0.0);
    }

    #[test]
    fn test_axes_and_position_angle() {
        for text in ["10x5@30", "10X5@30", " 10 x 5 @ 30 "] {
            let beam = parse(text);
            assert_relative_eq!(arcsec(beam.major()), 10.0, max_relative = 1e-12);
            assert_relative_eq!(arcsec(beam.minor()), 5.0, max_relative = 1e-12);
            assert_eq!(beam.pa().value(), 30.0);
        }

        let beam = parse("4@-45.5");
        assert_eq!(beam.minor(), beam.major());
        assert_eq!(beam.pa().value(), -45.5);
    }

    #[test]
    fn test_malformed_beams_are_rejected() {
        let err = "x5".parse::<BeamArg>().unwrap_err();
        assert!(err.starts_with("invalid major axis ''"), "{}", err);

        let err = "10@".parse::<BeamArg>().unwrap_err();
        assert!(err.starts_with("invalid position angle ''"), "{}", err);

        let err = "10xfive".parse::<BeamArg>().unwrap_err();
        assert!(err.starts_with("invalid minor axis 'five'"), "{}", err);

        assert!("".parse::<BeamArg>().is_err());
    }

    #[test]
    fn test_cli_accepts_beam_arguments() {
        let cli = Cli::try_parse_from(["beam", "convolve", "10x5@30", "3", "--json"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Convolve { beam, other } => {
                assert_eq!(beam.0.pa().value(), 30.0);
                assert_relative_eq!(arcsec(other.0.minor()), 3.0, max_relative = 1e-12);
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["beam", "convolve", "10@", "3"]).is_err());
    }
}
