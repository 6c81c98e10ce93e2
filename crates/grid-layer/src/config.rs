//! Configuration for a grid layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use grid_common::time::parse_iso8601;
use grid_common::{Palette, PaletteExtentSpec, DEFAULT_TILE_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::{LayerError, Result};

/// When the layer asks its host to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedrawMode {
    /// Emit `Redraw` after every change that affects pixels.
    #[default]
    OnChange,
    /// Only emit `Redraw` from an explicit `redraw()` call.
    Manual,
}

impl RedrawMode {
    /// Get the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnChange => "onchange",
            Self::Manual => "manual",
        }
    }
}

impl FromStr for RedrawMode {
    type Err = LayerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "onchange" => Ok(Self::OnChange),
            "manual" => Ok(Self::Manual),
            other => Err(LayerError::config(format!(
                "unknown redraw mode '{}' (expected onchange or manual)",
                other
            ))),
        }
    }
}

impl fmt::Display for RedrawMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Construction parameters of a grid layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerOptions {
    /// Key of the parameter to draw.
    pub parameter: String,

    /// Preferred time; the nearest time step is drawn.
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,

    /// Preferred vertical coordinate; the nearest level is drawn.
    #[serde(default)]
    pub vertical: Option<f64>,

    /// Palette override. Defaults to the category colours or a blue ramp.
    #[serde(skip)]
    pub palette: Option<Palette>,

    /// Palette extent policy. Only valid for continuous parameters; `None`
    /// means `subset` for them.
    #[serde(default)]
    pub palette_extent: Option<PaletteExtentSpec>,

    #[serde(default)]
    pub redraw: RedrawMode,

    /// Tile edge length in pixels.
    #[serde(default = "default_tile_size")]
    pub tile_size: usize,
}

fn default_tile_size() -> usize {
    DEFAULT_TILE_SIZE
}

impl LayerOptions {
    pub fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            time: None,
            vertical: None,
            palette: None,
            palette_extent: None,
            redraw: RedrawMode::default(),
            tile_size: DEFAULT_TILE_SIZE,
        }
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_vertical(mut self, vertical: f64) -> Self {
        self.vertical = Some(vertical);
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn with_palette_extent(mut self, spec: PaletteExtentSpec) -> Self {
        self.palette_extent = Some(spec);
        self
    }

    pub fn with_redraw(mut self, redraw: RedrawMode) -> Self {
        self.redraw = redraw;
        self
    }

    /// Load options from `GRID_LAYER_*` environment variables.
    ///
    /// `GRID_LAYER_PARAMETER` is required; the rest fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let parameter = std::env::var("GRID_LAYER_PARAMETER")
            .map_err(|_| LayerError::config("GRID_LAYER_PARAMETER is not set"))?;
        let mut options = Self::new(parameter);

        if let Ok(val) = std::env::var("GRID_LAYER_TIME") {
            options.time = Some(parse_iso8601(&val)?);
        }

        if let Ok(val) = std::env::var("GRID_LAYER_VERTICAL") {
            let vertical = val
                .parse()
                .map_err(|_| LayerError::config(format!("GRID_LAYER_VERTICAL: '{}'", val)))?;
            options.vertical = Some(vertical);
        }

        if let Ok(val) = std::env::var("GRID_LAYER_PALETTE_EXTENT") {
            options.palette_extent = Some(val.parse()?);
        }

        if let Ok(val) = std::env::var("GRID_LAYER_REDRAW") {
            options.redraw = val.parse()?;
        }

        if let Ok(val) = std::env::var("GRID_LAYER_TILE_SIZE") {
            options.tile_size = val
                .parse()
                .map_err(|_| LayerError::config(format!("GRID_LAYER_TILE_SIZE: '{}'", val)))?;
        }

        options.validate()?;
        Ok(options)
    }

    /// Validate the options.
    pub fn validate(&self) -> Result<()> {
        if self.parameter.trim().is_empty() {
            return Err(LayerError::config("parameter must not be empty"));
        }

        if self.tile_size == 0 || self.tile_size > renderer::config::MAX_TILE_SIZE {
            return Err(LayerError::config(format!(
                "tile_size must be 1-{}",
                renderer::config::MAX_TILE_SIZE
            )));
        }

        if let Some(v) = self.vertical {
            if !v.is_finite() {
                return Err(LayerError::config("vertical must be finite"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_options() {
        let options = LayerOptions::new("TMP");
        assert_eq!(options.redraw, RedrawMode::OnChange);
        assert_eq!(options.tile_size, 256);
        assert!(options.palette_extent.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(LayerOptions::new("  ").validate().is_err());

        let mut options = LayerOptions::new("TMP");
        options.tile_size = 0;
        assert!(options.validate().is_err());

        assert!(LayerOptions::new("TMP")
            .with_vertical(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_redraw_mode_parse() {
        assert_eq!("onchange".parse::<RedrawMode>().unwrap(), RedrawMode::OnChange);
        assert_eq!("MANUAL".parse::<RedrawMode>().unwrap(), RedrawMode::Manual);
        assert!("sometimes".parse::<RedrawMode>().is_err());
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{
            "parameter": "TMP",
            "time": "2024-01-15T06:00:00Z",
            "palette_extent": [250, 300],
            "redraw": "manual"
        }"#;
        let options: LayerOptions = serde_json::from_str(json).unwrap();
        assert_eq!(
            options.time,
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 6, 0, 0).unwrap())
        );
        assert_eq!(
            options.palette_extent,
            Some(PaletteExtentSpec::explicit(250.0, 300.0).unwrap())
        );
        assert_eq!(options.redraw, RedrawMode::Manual);
        assert_eq!(options.tile_size, 256);
    }
}
