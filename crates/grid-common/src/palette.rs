//! Palettes and palette extents.
//!
//! A palette is an ordered list of colors. Continuous parameters map values
//! onto it through a [`PaletteExtent`]; categorical parameters index it
//! directly by category.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{GridError, GridResult};
use crate::parameter::Category;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self { r, g, b })
    }

    /// Linear interpolation between two colors.
    pub fn lerp(&self, other: &Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// An ordered sequence of colors; `steps` is its length.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Arc<[Rgb]>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> GridResult<Self> {
        if colors.is_empty() {
            return Err(GridError::InvalidPalette("palette has no colors".to_string()));
        }
        Ok(Self {
            colors: colors.into(),
        })
    }

    /// Build a palette of `steps` colors linearly interpolated between stops.
    pub fn linear(stops: &[Rgb], steps: usize) -> GridResult<Self> {
        if stops.is_empty() || steps == 0 {
            return Err(GridError::InvalidPalette(
                "linear palette needs at least one stop and one step".to_string(),
            ));
        }
        if stops.len() == 1 || steps == 1 {
            return Self::new(vec![stops[0]; steps]);
        }

        let segments = (stops.len() - 1) as f64;
        let colors = (0..steps)
            .map(|i| {
                let pos = i as f64 / (steps - 1) as f64 * segments;
                let seg = (pos.floor() as usize).min(stops.len() - 2);
                stops[seg].lerp(&stops[seg + 1], pos - seg as f64)
            })
            .collect();
        Self::new(colors)
    }

    /// Parse hex stops and build a linear palette.
    pub fn linear_hex(stops: &[&str], steps: usize) -> GridResult<Self> {
        let stops = stops
            .iter()
            .map(|s| {
                Rgb::from_hex(s)
                    .ok_or_else(|| GridError::InvalidPalette(format!("invalid color '{}'", s)))
            })
            .collect::<GridResult<Vec<_>>>()?;
        Self::linear(&stops, steps)
    }

    /// One color per category, taken from each category's preferred color.
    pub fn from_categories(categories: &[Category]) -> GridResult<Self> {
        let colors = categories
            .iter()
            .map(|c| {
                c.preferred_color
                    .as_deref()
                    .and_then(Rgb::from_hex)
                    .ok_or_else(|| GridError::MissingCategoryColor(c.id.clone()))
            })
            .collect::<GridResult<Vec<_>>>()?;
        Self::new(colors)
    }

    /// Default ramp for continuous parameters.
    pub fn default_continuous() -> Self {
        let colors = (0..256)
            .map(|i| DEFAULT_LOW.lerp(&DEFAULT_HIGH, i as f64 / 255.0))
            .collect::<Vec<_>>();
        Self {
            colors: colors.into(),
        }
    }

    pub fn steps(&self) -> usize {
        self.colors.len()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<Rgb> {
        self.colors.get(idx).copied()
    }

    /// Check that a categorical palette has one color per category.
    pub fn ensure_matches_categories(&self, categories: &[Category]) -> GridResult<()> {
        if self.steps() != categories.len() {
            return Err(GridError::PaletteCategoryMismatch {
                palette_steps: self.steps(),
                categories: categories.len(),
            });
        }
        Ok(())
    }
}

const DEFAULT_LOW: Rgb = Rgb::new(0xde, 0xeb, 0xf7);
const DEFAULT_HIGH: Rgb = Rgb::new(0x31, 0x82, 0xbd);

/// A resolved numeric `[low, high]` extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaletteExtent {
    pub low: f64,
    pub high: f64,
}

impl PaletteExtent {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Scale a value onto `[0, steps - 1]`.
    ///
    /// Out-of-extent values clamp to the end colors. A degenerate extent
    /// (`low == high`) maps everything to index 0; NaN maps to nothing.
    #[inline]
    pub fn palette_index(&self, value: f64, steps: usize) -> Option<usize> {
        if value.is_nan() || steps == 0 {
            return None;
        }
        let span = self.high - self.low;
        if span == 0.0 || !span.is_finite() {
            return Some(0);
        }
        let max_idx = (steps - 1) as f64;
        let scaled = ((value - self.low) / span * max_idx).round();
        Some(scaled.clamp(0.0, max_idx) as usize)
    }
}

impl fmt::Display for PaletteExtent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

/// How the palette extent of a continuous parameter is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawExtentSpec", into = "RawExtentSpec")]
pub enum PaletteExtentSpec {
    /// Fixed `[low, high]`; low may exceed high for an inverted scale.
    Explicit(PaletteExtent),
    /// Min/max of the current subset.
    #[default]
    Subset,
    /// Min/max of the values currently in view.
    Fov,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawExtentSpec {
    Pair([f64; 2]),
    Policy(String),
}

impl TryFrom<RawExtentSpec> for PaletteExtentSpec {
    type Error = GridError;

    fn try_from(raw: RawExtentSpec) -> Result<Self, Self::Error> {
        match raw {
            RawExtentSpec::Pair([low, high]) => Ok(Self::explicit(low, high)?),
            RawExtentSpec::Policy(s) => s.parse(),
        }
    }
}

impl From<PaletteExtentSpec> for RawExtentSpec {
    fn from(spec: PaletteExtentSpec) -> Self {
        match spec {
            PaletteExtentSpec::Explicit(e) => RawExtentSpec::Pair([e.low, e.high]),
            PaletteExtentSpec::Subset => RawExtentSpec::Policy("subset".to_string()),
            PaletteExtentSpec::Fov => RawExtentSpec::Policy("fov".to_string()),
        }
    }
}

impl PaletteExtentSpec {
    /// An explicit extent; both ends must be finite.
    pub fn explicit(low: f64, high: f64) -> GridResult<Self> {
        if !low.is_finite() || !high.is_finite() {
            return Err(GridError::InvalidPaletteExtent(format!(
                "extent bounds must be finite, got [{}, {}]",
                low, high
            )));
        }
        Ok(PaletteExtentSpec::Explicit(PaletteExtent::new(low, high)))
    }
}

impl FromStr for PaletteExtentSpec {
    type Err = GridError;

    /// Accepts `subset`, `fov`, or `low,high`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "subset" => return Ok(PaletteExtentSpec::Subset),
            "fov" => return Ok(PaletteExtentSpec::Fov),
            _ => {}
        }

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 2 {
            return Err(GridError::InvalidPaletteExtent(format!(
                "'{}': expected \"subset\", \"fov\", or \"low,high\"",
                s
            )));
        }
        let parse = |p: &str| {
            p.parse::<f64>()
                .map_err(|_| GridError::InvalidPaletteExtent(format!("invalid number '{}'", p)))
        };
        Self::explicit(parse(parts[0])?, parse(parts[1])?)
    }
}

impl fmt::Display for PaletteExtentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteExtentSpec::Explicit(e) => write!(f, "{},{}", e.low, e.high),
            PaletteExtentSpec::Subset => f.write_str("subset"),
            PaletteExtentSpec::Fov => f.write_str("fov"),
        }
    }
}
