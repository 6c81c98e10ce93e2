//! Affine mapping between projected coordinates and the pixel plane.

use crate::point::PixelPoint;

/// `pixel = scale * (a * x + b, c * y + d)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl Transformation {
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// Projected coordinates to pixels.
    #[inline]
    pub fn transform(&self, x: f64, y: f64, scale: f64) -> PixelPoint {
        PixelPoint::new(
            scale * (self.a * x + self.b),
            scale * (self.c * y + self.d),
        )
    }

    /// Pixels to projected coordinates.
    #[inline]
    pub fn untransform(&self, point: PixelPoint, scale: f64) -> (f64, f64) {
        (
            (point.x / scale - self.b) / self.a,
            (point.y / scale - self.d) / self.c,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_inverse() {
        let t = Transformation::new(2.0, 1.0, -3.0, 0.5);
        let p = t.transform(4.0, -2.0, 10.0);
        assert_eq!(p, PixelPoint::new(90.0, 65.0));
        assert_eq!(t.untransform(p, 10.0), (4.0, -2.0));
    }
}
