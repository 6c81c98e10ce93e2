//! Continuous legends.
//!
//! A legend is a small data model (title, unit, end labels) plus a gradient
//! swatch drawn from the palette. Layout comes from a [`LegendTemplate`]
//! looked up by id in a [`LegendTemplates`] registry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use grid_common::{GridError, GridResult, Palette, PaletteExtent, Parameter};

use crate::png::{encode_png_auto, PngError};

/// Direction the gradient runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendOrientation {
    /// Low on the left, high on the right.
    Horizontal,
    /// High at the top, low at the bottom.
    Vertical,
}

/// Layout of a legend swatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendTemplate {
    pub id: String,
    pub orientation: LegendOrientation,
    pub width: usize,
    pub height: usize,
    /// Decimal places of the end labels.
    pub precision: usize,
}

impl LegendTemplate {
    pub fn horizontal() -> Self {
        Self {
            id: "horizontal".to_string(),
            orientation: LegendOrientation::Horizontal,
            width: 300,
            height: 20,
            precision: 2,
        }
    }

    pub fn vertical() -> Self {
        Self {
            id: "vertical".to_string(),
            orientation: LegendOrientation::Vertical,
            width: 20,
            height: 200,
            precision: 2,
        }
    }
}

/// Legend templates by id.
///
/// Registration is inject-once: the first template registered under an id
/// wins and later registrations are ignored.
#[derive(Debug, Clone)]
pub struct LegendTemplates {
    templates: HashMap<String, LegendTemplate>,
}

impl Default for LegendTemplates {
    fn default() -> Self {
        let mut templates = HashMap::new();
        for template in [LegendTemplate::horizontal(), LegendTemplate::vertical()] {
            templates.insert(template.id.clone(), template);
        }
        Self { templates }
    }
}

impl LegendTemplates {
    /// Register a template. Returns `false` if the id was already taken.
    pub fn register(&mut self, template: LegendTemplate) -> bool {
        if self.templates.contains_key(&template.id) {
            debug!(id = %template.id, "Legend template already registered");
            return false;
        }
        self.templates.insert(template.id.clone(), template);
        true
    }

    pub fn get(&self, id: &str) -> Option<&LegendTemplate> {
        self.templates.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

/// A continuous legend for one parameter.
#[derive(Debug, Clone)]
pub struct ContinuousLegend {
    pub title: String,
    pub unit: Option<String>,
    pub low_label: String,
    pub high_label: String,
    palette: Palette,
    extent: PaletteExtent,
    template: LegendTemplate,
}

impl ContinuousLegend {
    /// Build a legend. Categorical parameters have no continuous legend.
    pub fn new(
        parameter: &Parameter,
        palette: &Palette,
        extent: PaletteExtent,
        template: &LegendTemplate,
    ) -> GridResult<Self> {
        if parameter.is_categorical() {
            return Err(GridError::InvalidOperation(format!(
                "parameter '{}' is categorical",
                parameter.key
            )));
        }

        Ok(Self {
            title: parameter.title().to_string(),
            unit: parameter.unit.clone(),
            low_label: format_value(extent.low, template.precision),
            high_label: format_value(extent.high, template.precision),
            palette: palette.clone(),
            extent,
            template: template.clone(),
        })
    }

    pub fn extent(&self) -> PaletteExtent {
        self.extent
    }

    pub fn template(&self) -> &LegendTemplate {
        &self.template
    }

    /// RGBA gradient swatch, row-major.
    pub fn swatch(&self) -> Vec<u8> {
        let LegendTemplate {
            width,
            height,
            orientation,
            ..
        } = self.template;
        let colors = self.palette.colors();
        let mut pixels = vec![0u8; width * height * 4];

        // Position along the gradient, 0 at the low end
        let along = |row: usize, col: usize| -> (usize, usize) {
            match orientation {
                LegendOrientation::Horizontal => (col, width),
                LegendOrientation::Vertical => (height - 1 - row, height),
            }
        };

        for row in 0..height {
            for col in 0..width {
                let (pos, len) = along(row, col);
                let idx = if len > 1 {
                    pos * (colors.len() - 1) / (len - 1)
                } else {
                    0
                };
                let color = colors[idx.min(colors.len() - 1)];
                let offset = (row * width + col) * 4;
                pixels[offset..offset + 4].copy_from_slice(&[color.r, color.g, color.b, 255]);
            }
        }

        pixels
    }

    /// The swatch as a PNG.
    pub fn swatch_png(&self) -> Result<Vec<u8>, PngError> {
        encode_png_auto(&self.swatch(), self.template.width, self.template.height)
    }
}

/// Format a label with at most `precision` decimals, trailing zeros removed.
pub fn format_value(value: f64, precision: usize) -> String {
    let s = format!("{:.*}", precision, value);
    if !s.contains('.') {
        return s;
    }
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}
