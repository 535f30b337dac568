use serde::{Deserialize, Serialize};

use super::Color;

/// A plain or rounded rectangle drawn at the element box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleElement {
    pub corner_radius_mm: f64,
    pub color: Color,
}

impl RectangleElement {
    pub fn new() -> Self {
        Self {
            corner_radius_mm: 0.0,
            color: Color::engrave(),
        }
    }

    pub fn with_corner_radius(mut self, corner_radius_mm: f64) -> Self {
        self.corner_radius_mm = corner_radius_mm.max(0.0);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Default for RectangleElement {
    fn default() -> Self {
        Self::new()
    }
}
