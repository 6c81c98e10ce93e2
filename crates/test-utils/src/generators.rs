//! Test data generators for synthetic coverages.
//!
//! These generators create predictable, verifiable grids, domains and
//! CoverageJSON documents that can be used across the test suite.

use grid_common::{Domain, NdRange};
use serde_json::{json, Value};

use crate::fixtures::categories::LAND_COVER;
use crate::fixtures::grid::GridSpec;

/// `n` evenly spaced values from `start` to `stop` inclusive.
pub fn linear_values(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that a pixel was drawn from the expected
/// cell by checking that grid[row][col] == col * 1000 + row.
///
/// # Returns
///
/// Values in row-major `[y, x]` order (row 0 first, then row 1, etc.)
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], Some(0.0));   // col=0, row=0
/// assert_eq!(grid[1], Some(1000.0)); // col=1, row=0
/// assert_eq!(grid[10], Some(1.0));  // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<Option<f64>> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push(Some((col * 1000 + row) as f64));
        }
    }
    data
}

/// Creates a test grid with temperature-like values in Kelvin.
///
/// The values run from 250K at the first cell to 310K at the last,
/// a gradient similar to real model output.
pub fn create_temperature_grid(width: usize, height: usize) -> Vec<Option<f64>> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f64 / width.saturating_sub(1).max(1) as f64;
            let y_factor = row as f64 / height.saturating_sub(1).max(1) as f64;
            data.push(Some(250.0 + x_factor * 30.0 + y_factor * 30.0));
        }
    }
    data
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f64) -> Vec<Option<f64>> {
    vec![Some(value); width * height]
}

/// Replaces the cells at `(col, row)` positions with missing values.
pub fn with_missing(
    mut data: Vec<Option<f64>>,
    width: usize,
    positions: &[(usize, usize)],
) -> Vec<Option<f64>> {
    for &(col, row) in positions {
        if let Some(cell) = data.get_mut(row * width + col) {
            *cell = None;
        }
    }
    data
}

/// Creates a grid of raw category codes cycling through `codes`.
pub fn create_category_grid(width: usize, height: usize, codes: &[i64]) -> Vec<Option<f64>> {
    if codes.is_empty() {
        return vec![None; width * height];
    }
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push(Some(codes[(row + col) % codes.len()] as f64));
        }
    }
    data
}

/// Builds a WGS84 grid domain and `[y, x]` range for a spec.
///
/// # Panics
///
/// If `values` does not hold `spec.size()` entries.
pub fn grid_coverage(spec: &GridSpec, values: Vec<Option<f64>>) -> (Domain, NdRange) {
    let domain = Domain::grid(spec.lon_values(), spec.lat_values(), None, None)
        .expect("fixture grid domain");
    let range = NdRange::grid(spec.width, spec.height, values).expect("fixture grid range");
    (domain, range)
}

fn axes_json(spec: &GridSpec, times: &[&str]) -> Value {
    let mut axes = json!({
        "x": { "start": spec.min_lon, "stop": spec.max_lon, "num": spec.width },
        "y": { "start": spec.min_lat, "stop": spec.max_lat, "num": spec.height },
    });
    if !times.is_empty() {
        axes["t"] = json!({ "values": times });
    }
    axes
}

fn ndarray_json(spec: &GridSpec, times: &[&str], values: Vec<Option<f64>>) -> Value {
    if times.is_empty() {
        json!({
            "type": "NdArray",
            "dataType": "float",
            "axisNames": ["y", "x"],
            "shape": [spec.height, spec.width],
            "values": values,
        })
    } else {
        json!({
            "type": "NdArray",
            "dataType": "float",
            "axisNames": ["t", "y", "x"],
            "shape": [times.len(), spec.height, spec.width],
            "values": values,
        })
    }
}

fn coverage_json(
    spec: &GridSpec,
    times: &[&str],
    key: &str,
    parameter: Value,
    values: Vec<Option<f64>>,
) -> String {
    json!({
        "type": "Coverage",
        "domain": {
            "type": "Domain",
            "domainType": "Grid",
            "axes": axes_json(spec, times),
            "referencing": [{
                "coordinates": ["x", "y"],
                "system": {
                    "type": "GeographicCRS",
                    "id": "http://www.opengis.net/def/crs/OGC/1.3/CRS84"
                }
            }]
        },
        "parameters": { key: parameter },
        "ranges": { key: ndarray_json(spec, times, values) }
    })
    .to_string()
}

/// A CoverageJSON grid with one continuous `TMP` parameter in Kelvin.
///
/// With time steps, slice `t` holds the temperature grid shifted by
/// `10 * t`.
pub fn temperature_coverage_json(spec: &GridSpec, times: &[&str]) -> String {
    let base = create_temperature_grid(spec.width, spec.height);
    let values: Vec<Option<f64>> = if times.is_empty() {
        base
    } else {
        (0..times.len())
            .flat_map(|t| base.iter().map(move |v| v.map(|v| v + 10.0 * t as f64)))
            .collect()
    };

    let parameter = json!({
        "type": "Parameter",
        "observedProperty": { "label": { "en": "Air temperature" } },
        "unit": { "symbol": { "value": "K", "type": "http://www.opengis.net/def/uom/UCUM/" } }
    });
    coverage_json(spec, times, "TMP", parameter, values)
}

/// A CoverageJSON grid with one categorical `LC` parameter.
///
/// Codes cycle through the land cover fixture, and cell (0, 0) holds
/// `unmapped_code` when given.
pub fn land_cover_coverage_json(spec: &GridSpec, unmapped_code: Option<i64>) -> String {
    let codes: Vec<i64> = LAND_COVER.iter().map(|c| c.3).collect();
    let mut values = create_category_grid(spec.width, spec.height, &codes);
    if let (Some(code), Some(first)) = (unmapped_code, values.first_mut()) {
        *first = Some(code as f64);
    }

    let categories: Vec<Value> = LAND_COVER
        .iter()
        .map(|(id, label, color, _)| {
            json!({ "id": id, "label": { "en": label }, "preferredColor": color })
        })
        .collect();
    let encoding: serde_json::Map<String, Value> = LAND_COVER
        .iter()
        .map(|(id, _, _, code)| (id.to_string(), json!(code)))
        .collect();

    let parameter = json!({
        "type": "Parameter",
        "observedProperty": {
            "label": { "en": "Land cover" },
            "categories": categories
        },
        "categoryEncoding": encoding
    });
    coverage_json(spec, &[], "LC", parameter, values)
}

/// Creates RGBA pixel data for a simple test pattern.
///
/// The gradient has more than 256 colours once the image is large enough,
/// which exercises the RGBA PNG path.
pub fn create_test_rgba_pixels(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let r = ((x as f32 / width as f32) * 255.0) as u8;
            let g = ((y as f32 / height as f32) * 255.0) as u8;
            pixels.extend_from_slice(&[r, g, 128, 255]);
        }
    }
    pixels
}
