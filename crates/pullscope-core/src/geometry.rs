// File: crates/pullscope-core/src/geometry.rs
// Summary: Lightweight geometry helpers for pixel math.

use crate::types::Insets;

/// Plot rectangle in surface pixels (y grows downward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotArea {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl PlotArea {
    pub const fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Surface minus insets; never narrower than one pixel.
    pub fn inset(width: u32, height: u32, insets: &Insets) -> Self {
        let left = insets.left as f32;
        let top = insets.top as f32;
        let right = (width.saturating_sub(insets.right) as f32).max(left + 1.0);
        let bottom = (height.saturating_sub(insets.bottom) as f32).max(top + 1.0);
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> f32 { self.right - self.left }
    pub fn height(&self) -> f32 { self.bottom - self.top }

    pub fn contains_x(&self, px: f32) -> bool {
        px >= self.left && px <= self.right
    }

    pub fn clamp_x(&self, px: f32) -> f32 {
        px.clamp(self.left, self.right)
    }
}
