//! Pure placement rules: grid snapping, margin containment and minimum size.
//!
//! Every function here is total. Out-of-range input is resolved by snapping and
//! clamping, never rejected.

use lyon::math::point;
use lyon::path::Path;

use super::types::Rect;

/// Tolerance used when comparing positions against grid multiples.
pub const GRID_EPSILON: f64 = 1e-9;

/// Smallest corner radius that is drawn as a rounded corner.
pub const MIN_ROUNDED_RADIUS_MM: f64 = 0.01;

/// Snaps `value` to the nearest multiple of `grid`. NaN snaps to the origin.
pub fn snap_to_grid(value: f64, grid: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    (value / grid).round() * grid
}

fn resolve_axis(position: f64, size: f64, extent: f64, grid: f64) -> (f64, f64) {
    // NaN.max(grid) == grid
    let size = size.max(grid);
    if size >= extent - GRID_EPSILON {
        return (0.0, extent);
    }

    let max_position = ((extent - size) / grid + GRID_EPSILON).floor() * grid;
    let position = snap_to_grid(position, grid).clamp(0.0, max_position);
    (position, size)
}

/// Resolves a requested element rectangle against a content area of
/// `content_width` x `content_height`, with coordinates relative to the
/// content origin.
///
/// The top-left corner is snapped to the nearest grid intersection and the
/// rectangle is clamped inside the content area. Each dimension is at least one
/// grid cell. A dimension larger than the content area is pinned at 0 and shrunk
/// to the content extent.
pub fn resolve_rect(
    content_width: f64,
    content_height: f64,
    grid: f64,
    requested: Rect,
) -> Rect {
    let (x, width) = resolve_axis(requested.x, requested.width, content_width, grid);
    let (y, height) = resolve_axis(requested.y, requested.height, content_height, grid);
    Rect::new(x, y, width, height)
}

/// Returns the radius to draw for a rectangle's corners, or `None` when the
/// corners are square.
///
/// Corners are rounded when the radius exceeds [`MIN_ROUNDED_RADIUS_MM`] and two
/// radii fit within the shorter side.
pub fn rounded_corner_radius(rect: &Rect, corner_radius: f64) -> Option<f64> {
    if corner_radius > MIN_ROUNDED_RADIUS_MM
        && corner_radius * 2.0 <= rect.width.min(rect.height)
    {
        Some(corner_radius)
    } else {
        None
    }
}

/// Builds a closed outline path for `rect`, rounded when `radius` is given.
///
/// Units are whatever `rect` is expressed in.
pub fn outline_path(rect: &Rect, radius: Option<f64>) -> Path {
    let mut builder = Path::builder();
    let bounds = lyon::math::Box2D::new(
        point(rect.x as f32, rect.y as f32),
        point(rect.right() as f32, rect.bottom() as f32),
    );

    match radius {
        Some(r) => builder.add_rounded_rectangle(
            &bounds,
            &lyon::path::builder::BorderRadii::new(r as f32),
            lyon::path::Winding::Positive,
        ),
        None => builder.add_rectangle(&bounds, lyon::path::Winding::Positive),
    }

    builder.build()
}
