//! Configuration file support.
//!
//! Defaults used by the `beam` tool (display unit, kernel discretisation,
//! deconvolution failure policy) can be set in a TOML file:
//!
//! ```toml
//! [display]
//! unit = "arcsec"
//!
//! [kernel]
//! mode = "oversample"
//! factor = 10
//! support_scaling = 6.0
//!
//! [deconvolution]
//! on_failure = "point_like"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::beam::{Beam, DeconvolveFailure};
use crate::error::{BeamError, BeamResult};
use crate::kernel::KernelOptions;
use crate::units::AngularDisplayUnit;

/// Name of the configuration file searched by [`BeamConfig::from_default_location`].
pub const CONFIG_FILE_NAME: &str = "radio_beam.toml";

/// Beam tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeamConfig {
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub kernel: KernelOptions,
    #[serde(default)]
    pub deconvolution: DeconvolutionSettings,
}

/// How beams are printed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default)]
    pub unit: AngularDisplayUnit,
}

/// Deconvolution behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeconvolutionSettings {
    #[serde(default)]
    pub on_failure: DeconvolveFailure,
}

impl BeamConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> BeamResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            BeamError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> BeamResult<Self> {
        toml::from_str(content)
            .map_err(|e| BeamError::Configuration(format!("Failed to parse config file: {}", e)))
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `radio_beam.toml` in:
    /// 1. Current directory
    /// 2. `radio_beam/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> BeamResult<Self> {
        let path = default_path().ok_or_else(|| {
            BeamError::Configuration(format!(
                "No {} found in standard locations",
                CONFIG_FILE_NAME
            ))
        })?;
        log::debug!("Loading configuration from {}", path.display());
        Self::from_file(&path)
    }

    /// Configuration from the default location, or defaults if there is none.
    pub fn load_or_default() -> BeamResult<Self> {
        if default_path().is_none() {
            log::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
            return Ok(Self::default());
        }
        Self::from_default_location()
    }

    /// Apply the configured display unit.
    pub fn present(&self, beam: Beam) -> Beam {
        beam.with_default_unit(self.display.unit)
    }

    /// Deconvolve with the configured failure policy.
    pub fn deconvolve(&self, beam: &Beam, other: &Beam) -> BeamResult<Beam> {
        beam.deconvolve_with(other, self.deconvolution.on_failure)
    }
}

fn default_path() -> Option<PathBuf> {
    [
        PathBuf::from(CONFIG_FILE_NAME),
        PathBuf::from("radio_beam").join(CONFIG_FILE_NAME),
        PathBuf::from("..").join(CONFIG_FILE_NAME),
    ]
    .into_iter()
    .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::DiscretizeMode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[display]
unit = "deg"

[kernel]
mode = "integrate"
factor = 4
x_size = 11

[deconvolution]
on_failure = "point_like"
"#;

        let config = BeamConfig::from_toml(toml).unwrap();
        assert_eq!(config.display.unit, AngularDisplayUnit::Degree);
        assert_eq!(config.kernel.mode, DiscretizeMode::Integrate);
        assert_eq!(config.kernel.factor, 4);
        assert_eq!(config.kernel.x_size, Some(11));
        assert_eq!(config.kernel.support_scaling, None);
        assert_eq!(config.deconvolution.on_failure, DeconvolveFailure::PointLike);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BeamConfig::from_toml("").unwrap();
        assert_eq!(config, BeamConfig::default());
        assert_eq!(config.kernel.factor, crate::kernel::DEFAULT_FACTOR);
    }

    #[test]
    fn test_invalid_config() {
        let err = BeamConfig::from_toml("[display]\nunit = \"parsec\"").unwrap_err();
        assert!(matches!(err, BeamError::Configuration(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[deconvolution]\non_failure = \"error\"").unwrap();
        let config = BeamConfig::from_file(file.path()).unwrap();
        assert_eq!(config.deconvolution.on_failure, DeconvolveFailure::Error);

        assert!(BeamConfig::from_file("/nonexistent/radio_beam.toml").is_err());
    }

    #[test]
    fn test_policy_is_applied() {
        let config = BeamConfig::from_toml("[deconvolution]\non_failure = \"point_like\"").unwrap();
        let small = Beam::circular(1.0e-4);
        let large = Beam::circular(1.0e-3);
        assert_eq!(config.deconvolve(&small, &large).unwrap(), Beam::point());

        let shown = config.present(small);
        assert_eq!(shown.default_unit(), AngularDisplayUnit::Arcsecond);
    }
}
