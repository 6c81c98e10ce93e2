//! Value-to-colour mapping.
//!
//! A [`ColorMode`] is chosen once per tile; the resampler then runs a loop
//! that is generic over the lookup closure it produces.

use std::collections::HashMap;

use grid_common::{
    Category, CategoryEncoding, GridError, GridResult, Palette, PaletteExtent, Parameter,
    ParameterKind, Rgb,
};

/// Widest raw value span stored as a dense table.
const DENSE_SPAN_LIMIT: i64 = 1 << 16;

/// How range values become colours.
#[derive(Debug, Clone)]
pub enum ColorMode {
    /// Linear scale of the extent onto the palette.
    Continuous {
        palette: Palette,
        extent: PaletteExtent,
    },
    /// Raw integer codes looked up through the category encoding.
    Categorical {
        palette: Palette,
        index: CategoryIndex,
    },
}

impl ColorMode {
    pub fn continuous(palette: Palette, extent: PaletteExtent) -> Self {
        ColorMode::Continuous { palette, extent }
    }

    /// Categorical mode; the palette must have one colour per category.
    pub fn categorical(
        palette: Palette,
        categories: &[Category],
        encoding: &CategoryEncoding,
    ) -> GridResult<Self> {
        palette.ensure_matches_categories(categories)?;
        Ok(ColorMode::Categorical {
            palette,
            index: CategoryIndex::new(categories, encoding),
        })
    }

    /// Pick the mode for a parameter. Continuous parameters need an extent.
    pub fn for_parameter(
        parameter: &Parameter,
        palette: Palette,
        extent: Option<PaletteExtent>,
    ) -> GridResult<Self> {
        match &parameter.kind {
            ParameterKind::Categorical {
                categories,
                encoding,
            } => Self::categorical(palette, categories, encoding),
            ParameterKind::Continuous => {
                let extent = extent.ok_or_else(|| {
                    GridError::InvalidOperation(format!(
                        "no palette extent resolved for '{}'",
                        parameter.key
                    ))
                })?;
                Ok(Self::continuous(palette, extent))
            }
        }
    }

    pub fn palette(&self) -> &Palette {
        match self {
            ColorMode::Continuous { palette, .. } | ColorMode::Categorical { palette, .. } => {
                palette
            }
        }
    }

    /// Colour of a single value; `None` means transparent.
    pub fn color(&self, value: Option<f64>) -> Option<Rgb> {
        let value = value?;
        match self {
            ColorMode::Continuous { palette, extent } => extent
                .palette_index(value, palette.steps())
                .and_then(|i| palette.get(i)),
            ColorMode::Categorical { palette, index } => {
                index.get(value).and_then(|i| palette.get(i))
            }
        }
    }
}

/// Raw stored value to category index.
#[derive(Debug, Clone)]
pub enum CategoryIndex {
    /// `table[raw - offset]`
    Dense {
        offset: i64,
        table: Vec<Option<usize>>,
    },
    Sparse(HashMap<i64, usize>),
}

impl CategoryIndex {
    /// Compile the encoding. Categories without an encoding entry are never
    /// drawn.
    pub fn new(categories: &[Category], encoding: &CategoryEncoding) -> Self {
        let pairs: Vec<(i64, usize)> = categories
            .iter()
            .enumerate()
            .flat_map(|(idx, c)| encoding.values_for(&c.id).iter().map(move |v| (*v, idx)))
            .collect();

        let min = pairs.iter().map(|(v, _)| *v).min();
        let max = pairs.iter().map(|(v, _)| *v).max();
        match (min, max) {
            (Some(min), Some(max)) if max.saturating_sub(min) < DENSE_SPAN_LIMIT => {
                let mut table = vec![None; (max - min + 1) as usize];
                for (v, idx) in pairs {
                    table[(v - min) as usize] = Some(idx);
                }
                CategoryIndex::Dense { offset: min, table }
            }
            _ => CategoryIndex::Sparse(pairs.into_iter().collect()),
        }
    }

    /// Category index of a raw value; non-integers and unmapped codes miss.
    #[inline]
    pub fn get(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || value.fract() != 0.0 {
            return None;
        }
        if value < i64::MIN as f64 || value >= i64::MAX as f64 {
            return None;
        }
        let raw = value as i64;
        match self {
            CategoryIndex::Dense { offset, table } => {
                let slot = raw.checked_sub(*offset)?;
                if slot < 0 {
                    return None;
                }
                table.get(slot as usize).copied().flatten()
            }
            CategoryIndex::Sparse(map) => map.get(&raw).copied(),
        }
    }
}
