//! Horizontal zoom/pan transform
//!
//! A transform maps a base pixel `p` to `p * k + x`. Charts only zoom along
//! the domain axis; the value axis keeps its full extent.
//!
//! Constraints, for a plot area spanning pixels `[r0, r1]`:
//! - `k` stays inside the configured scale extent (`[1, 32]` by default)
//! - `x` stays inside `[r1 * (1 - k), r0 * (1 - k)]`, so the visible window
//!   never leaves the data extent

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform { k: 1.0, x: 0.0 };

    pub fn new(k: f64, x: f64) -> Self {
        Self { k, x }
    }

    pub fn apply_x(&self, pixel: f64) -> f64 {
        pixel * self.k + self.x
    }

    pub fn invert_x(&self, pixel: f64) -> f64 {
        (pixel - self.x) / self.k
    }

    /// Rescaled pixel range
    pub fn apply_range(&self, range: [f64; 2]) -> [f64; 2] {
        [self.apply_x(range[0]), self.apply_x(range[1])]
    }

    /// Clamp into the allowed scale factors and translation window
    pub fn clamp(self, range: [f64; 2], scale_extent: [f64; 2]) -> Self {
        let [lo, hi] = scale_extent;
        let k = if self.k.is_finite() { self.k.clamp(lo, hi) } else { lo };

        let [r0, r1] = range;
        let (min_x, max_x) = (r1 * (1.0 - k), r0 * (1.0 - k));
        let x = if self.x.is_finite() { self.x } else { 0.0 };
        let x = if min_x <= max_x { x.clamp(min_x, max_x) } else { max_x };

        Self { k, x }
    }

    /// Scale by `factor` keeping the pixel under the pointer fixed
    pub fn scale_at(self, factor: f64, pixel: f64, range: [f64; 2], scale_extent: [f64; 2]) -> Self {
        let target = Self { k: self.k * factor, x: self.x }.clamp(range, scale_extent).k;
        let anchor = self.invert_x(pixel);
        Self { k: target, x: pixel - anchor * target }.clamp(range, scale_extent)
    }

    /// Shift by `dx` pixels
    pub fn translate(self, dx: f64, range: [f64; 2], scale_extent: [f64; 2]) -> Self {
        Self { k: self.k, x: self.x + dx }.clamp(range, scale_extent)
    }
}
