//! Print settings.
//!
//! `PrintSettings` is the one piece of process-wide configuration. The
//! caller owns it and may change it between jobs; a job takes its own copy
//! when it starts so nothing can mutate the values it is laying out with.
//!
//! Settings are loaded from TOML. Missing keys fall back to the defaults:
//!
//! ```toml
//! dpi = 300
//! sheet_margin_cm = 0.5
//! card_size_cm = 5.0
//! use_borders = true
//! use_cut_guides = false
//! use_registration_marks = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::CM_TO_INCH;

/// Accepted DPI range.
pub const DPI_RANGE: (u32, u32) = (100, 1200);

/// Accepted sheet margin range, in centimetres.
pub const MARGIN_RANGE_CM: (f64, f64) = (0.5, 2.0);

/// Accepted card edge length range, in centimetres.
pub const CARD_SIZE_RANGE_CM: (f64, f64) = (4.0, 20.0);

/// Settings read by the layout engine at job start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrintSettings {
    /// Raster resolution of the rendered cards.
    #[serde(default = "default_dpi")]
    pub dpi: u32,

    /// Blank margin around the printable area of each sheet.
    #[serde(default = "default_margin")]
    pub sheet_margin_cm: f64,

    /// Edge length of one (square) card.
    #[serde(default = "default_card_size")]
    pub card_size_cm: f64,

    /// Draw the shape border over every card.
    #[serde(default = "default_true")]
    pub use_borders: bool,

    /// Draw dashed lines between card cells.
    #[serde(default)]
    pub use_cut_guides: bool,

    /// Draw trim ticks in the sheet margins.
    #[serde(default)]
    pub use_registration_marks: bool,
}

fn default_dpi() -> u32 {
    300
}

fn default_margin() -> f64 {
    0.5
}

fn default_card_size() -> f64 {
    5.0
}

fn default_true() -> bool {
    true
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            sheet_margin_cm: default_margin(),
            card_size_cm: default_card_size(),
            use_borders: true,
            use_cut_guides: false,
            use_registration_marks: false,
        }
    }
}

impl PrintSettings {
    /// Create settings with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Check every value against its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dpi = f64::from(self.dpi);
        check_range("dpi", dpi, (f64::from(DPI_RANGE.0), f64::from(DPI_RANGE.1)))?;
        check_range("sheet_margin_cm", self.sheet_margin_cm, MARGIN_RANGE_CM)?;
        check_range("card_size_cm", self.card_size_cm, CARD_SIZE_RANGE_CM)?;
        Ok(())
    }

    /// Edge length in pixels of one rendered card raster.
    #[must_use]
    pub fn render_size_px(&self) -> u32 {
        (self.card_size_cm * CM_TO_INCH * f64::from(self.dpi)) as u32
    }

    #[must_use]
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    #[must_use]
    pub fn with_margin_cm(mut self, margin: f64) -> Self {
        self.sheet_margin_cm = margin;
        self
    }

    #[must_use]
    pub fn with_card_size_cm(mut self, size: f64) -> Self {
        self.card_size_cm = size;
        self
    }

    #[must_use]
    pub fn with_borders(mut self, enabled: bool) -> Self {
        self.use_borders = enabled;
        self
    }

    #[must_use]
    pub fn with_cut_guides(mut self, enabled: bool) -> Self {
        self.use_cut_guides = enabled;
        self
    }

    #[must_use]
    pub fn with_registration_marks(mut self, enabled: bool) -> Self {
        self.use_registration_marks = enabled;
        self
    }
}

fn check_range(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<(), ConfigError> {
    if value.is_nan() || value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("{field} = {value} is outside the accepted range {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}
