use serde::{Deserialize, Serialize};

use super::Color;
use crate::canvas::Rect;

/// How an image fills its element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectMode {
    /// Fill the whole box, distorting if needed.
    #[default]
    Stretch,
    /// Largest aspect-preserving rectangle, centred in the box.
    Fit,
}

/// An image reference. The drawing carries a placeholder outline for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    /// Path or URI of the image source.
    pub source: String,
    pub aspect: AspectMode,
    /// Intrinsic width and height of the image, in any unit.
    pub intrinsic_size: Option<(f64, f64)>,
    pub color: Color,
}

impl ImageElement {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            aspect: AspectMode::Stretch,
            intrinsic_size: None,
            color: Color::engrave(),
        }
    }

    pub fn fitted(mut self, intrinsic_width: f64, intrinsic_height: f64) -> Self {
        self.aspect = AspectMode::Fit;
        self.intrinsic_size = Some((intrinsic_width, intrinsic_height));
        self
    }

    /// The placeholder rectangle drawn for this image inside `bounds`.
    pub fn placeholder_rect(&self, bounds: &Rect) -> Rect {
        let (iw, ih) = match (self.aspect, self.intrinsic_size) {
            (AspectMode::Fit, Some((w, h))) if w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite() => {
                (w, h)
            }
            _ => return *bounds,
        };

        let scale = (bounds.width / iw).min(bounds.height / ih);
        let width = iw * scale;
        let height = ih * scale;
        Rect::new(
            bounds.x + (bounds.width - width) / 2.0,
            bounds.y + (bounds.height - height) / 2.0,
            width,
            height,
        )
    }
}
