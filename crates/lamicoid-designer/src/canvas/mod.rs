//! Label canvas: plate dimensions, margin, corner radius and placement grid.

pub mod operations;
pub mod types;

pub use operations::{outline_path, resolve_rect, rounded_corner_radius, snap_to_grid};
pub use types::{OutlineBoundary, Rect};

use serde::Serialize;

/// Smallest accepted plate dimension.
pub const MIN_DIMENSION_MM: f64 = 1.0;

/// Smallest accepted grid spacing.
pub const MIN_GRID_SPACING_MM: f64 = 0.1;

/// A label plate.
///
/// Construction never fails: every parameter is clamped so that the content
/// rectangle (the plate inset by the margin) holds at least one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Canvas {
    width_mm: f64,
    height_mm: f64,
    corner_radius_mm: f64,
    margin_mm: f64,
    grid_spacing_mm: f64,
}

fn positive_or(value: f64, minimum: f64) -> f64 {
    if value.is_finite() {
        value.max(minimum)
    } else {
        minimum
    }
}

impl Canvas {
    pub fn new(
        width_mm: f64,
        height_mm: f64,
        corner_radius_mm: f64,
        margin_mm: f64,
        grid_spacing_mm: f64,
    ) -> Self {
        let width = positive_or(width_mm, MIN_DIMENSION_MM);
        let height = positive_or(height_mm, MIN_DIMENSION_MM);
        let shortest = width.min(height);

        let grid = positive_or(grid_spacing_mm, MIN_GRID_SPACING_MM).min(shortest);
        let radius = if corner_radius_mm.is_finite() {
            corner_radius_mm.clamp(0.0, shortest / 2.0)
        } else {
            0.0
        };
        let max_margin = ((shortest - grid) / 2.0).max(0.0);
        let margin = if margin_mm.is_finite() {
            margin_mm.clamp(0.0, max_margin)
        } else {
            0.0
        };

        if width != width_mm || height != height_mm {
            tracing::warn!(
                "Canvas size {}x{}mm adjusted to {}x{}mm",
                width_mm,
                height_mm,
                width,
                height
            );
        }
        if radius != corner_radius_mm {
            tracing::debug!("Corner radius {}mm clamped to {}mm", corner_radius_mm, radius);
        }
        if margin != margin_mm {
            tracing::debug!("Margin {}mm clamped to {}mm", margin_mm, margin);
        }
        if grid != grid_spacing_mm {
            tracing::debug!("Grid spacing {}mm clamped to {}mm", grid_spacing_mm, grid);
        }

        Self {
            width_mm: width,
            height_mm: height,
            corner_radius_mm: radius,
            margin_mm: margin,
            grid_spacing_mm: grid,
        }
    }

    pub fn width_mm(&self) -> f64 {
        self.width_mm
    }

    pub fn height_mm(&self) -> f64 {
        self.height_mm
    }

    pub fn corner_radius_mm(&self) -> f64 {
        self.corner_radius_mm
    }

    pub fn margin_mm(&self) -> f64 {
        self.margin_mm
    }

    pub fn grid_spacing_mm(&self) -> f64 {
        self.grid_spacing_mm
    }

    /// The whole plate, in plate coordinates.
    pub fn plate_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width_mm, self.height_mm)
    }

    /// The area elements may occupy, in plate coordinates.
    pub fn content_rect(&self) -> Rect {
        Rect::new(
            self.margin_mm,
            self.margin_mm,
            self.width_mm - 2.0 * self.margin_mm,
            self.height_mm - 2.0 * self.margin_mm,
        )
    }

    /// Resolves a requested element rectangle, given relative to the content
    /// origin, into an accepted one.
    pub fn resolve(&self, requested: Rect) -> Rect {
        let content = self.content_rect();
        resolve_rect(
            content.width,
            content.height,
            self.grid_spacing_mm,
            requested,
        )
    }

    /// The rectangle and corner radius traced by the cut outline.
    ///
    /// The content boundary uses the plate radius reduced by the margin so both
    /// outlines stay concentric.
    pub fn outline(&self, boundary: OutlineBoundary) -> (Rect, Option<f64>) {
        let (rect, radius) = match boundary {
            OutlineBoundary::Plate => (self.plate_rect(), self.corner_radius_mm),
            OutlineBoundary::Content => (
                self.content_rect(),
                (self.corner_radius_mm - self.margin_mm).max(0.0),
            ),
        };
        (rect, rounded_corner_radius(&rect, radius))
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(50.0, 20.0, 0.0, 1.0, 1.0)
    }
}
