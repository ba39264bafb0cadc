use serde::Serialize;

use crate::theme::CategoryColors;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecadeRow {
    pub decade: i32,
    pub label: String,
    pub x: f32,
    /// Offset of the row's bottom edge from the bottom of the canvas.
    pub y_from_bottom: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividerLayout {
    pub year: i32,
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
}

/// One figure's bar. `width` runs along the time axis and `height` across the
/// lane; the renderer turns it upright with a 90 degree rotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarLayout {
    pub index: usize,
    pub name: String,
    pub lane: usize,
    pub start_year: i32,
    pub end_year: i32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub colors: CategoryColors,
}

impl BarLayout {
    /// Pivot that turns the bar into the `lane_width`-wide column at `x`.
    pub fn rotation_origin(&self) -> (f32, f32) {
        (self.x + self.height / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskLayout {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub start_year: i32,
    pub end_year: i32,
    pub effective_end_year: i32,
    pub lane_count: usize,
    pub decades: Vec<DecadeRow>,
    pub dividers: Vec<DividerLayout>,
    pub bars: Vec<BarLayout>,
    pub future_mask: Option<MaskLayout>,
}
