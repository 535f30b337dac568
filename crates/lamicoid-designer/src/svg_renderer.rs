//! Drawing serializer.
//!
//! Produces the SVG document handed to the print engine: the cut outline first,
//! then one `<path>` per element in z-order. Text is emitted as glyph outlines,
//! never as `<text>`, so the engine needs no fonts of its own.
//!
//! Layout happens in editing pixels with the origin at the plate's top-left
//! corner. [`PathWriter`] converts every emitted point to millimetres, and is
//! the only place that conversion happens.

use lamicoid_core::units::{px_per_mm, DEFAULT_DPI};
use lamicoid_core::SerializeError;
use lyon::path::{Event, Path};
use rusttype::OutlineBuilder;
use std::fmt::Write as _;

use crate::canvas::{outline_path, rounded_corner_radius, OutlineBoundary, Rect};
use crate::font_manager::FontMetricsProvider;
use crate::model::{
    text_lines, Color, ElementKind, HorizontalAlign, TextStyle, VariableValues, VerticalAlign,
};
use crate::templates::LamicoidTemplate;

/// Formats a millimetre value with three decimals, without negative zero.
pub fn format_mm(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.3}", rounded)
}

/// Accumulates SVG path data, converting editing pixels to millimetres.
pub struct PathWriter {
    data: String,
    px_per_mm: f64,
}

impl PathWriter {
    pub fn new(px_per_mm: f64) -> Self {
        Self {
            data: String::new(),
            px_per_mm,
        }
    }

    fn push(&mut self, command: char, points: &[(f64, f64)]) {
        self.data.push(command);
        self.data.push(' ');
        for (x, y) in points {
            let _ = write!(
                self.data,
                "{} {} ",
                format_mm(x / self.px_per_mm),
                format_mm(y / self.px_per_mm)
            );
        }
    }

    pub fn move_to_px(&mut self, x: f64, y: f64) {
        self.push('M', &[(x, y)]);
    }

    pub fn line_to_px(&mut self, x: f64, y: f64) {
        self.push('L', &[(x, y)]);
    }

    /// Appends every segment of a lyon path given in editing pixels.
    pub fn append_path(&mut self, path: &Path) {
        for event in path.iter() {
            match event {
                Event::Begin { at } => self.move_to(at.x, at.y),
                Event::Line { to, .. } => self.line_to(to.x, to.y),
                Event::Quadratic { ctrl, to, .. } => self.quad_to(ctrl.x, ctrl.y, to.x, to.y),
                Event::Cubic {
                    ctrl1, ctrl2, to, ..
                } => self.curve_to(ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y),
                Event::End { close, .. } => {
                    if close {
                        self.close();
                    }
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn finish(self) -> String {
        self.data.trim_end().to_string()
    }
}

impl OutlineBuilder for PathWriter {
    fn move_to(&mut self, x: f32, y: f32) {
        self.push('M', &[(f64::from(x), f64::from(y))]);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push('L', &[(f64::from(x), f64::from(y))]);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.push(
            'Q',
            &[
                (f64::from(x1), f64::from(y1)),
                (f64::from(x), f64::from(y)),
            ],
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.push(
            'C',
            &[
                (f64::from(x1), f64::from(y1)),
                (f64::from(x2), f64::from(y2)),
                (f64::from(x), f64::from(y)),
            ],
        );
    }

    fn close(&mut self) {
        self.data.push_str("Z ");
    }
}

/// Options controlling drawing output.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingOptions {
    /// Boundary traced by the cut outline; the content rectangle unless the
    /// plate edge is asked for.
    pub outline: OutlineBoundary,
    /// Resolution of the editing space.
    pub dpi: f64,
    pub stroke_width_mm: f64,
}

impl Default for DrawingOptions {
    fn default() -> Self {
        Self {
            outline: OutlineBoundary::Content,
            dpi: DEFAULT_DPI,
            stroke_width_mm: 0.1,
        }
    }
}

/// Renders label templates to SVG drawings.
pub struct SvgRenderer<'a> {
    fonts: &'a dyn FontMetricsProvider,
    options: DrawingOptions,
}

impl<'a> SvgRenderer<'a> {
    pub fn new(fonts: &'a dyn FontMetricsProvider) -> Self {
        Self {
            fonts,
            options: DrawingOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DrawingOptions) -> Self {
        self.options = options;
        self
    }

    fn px_per_mm(&self) -> f64 {
        px_per_mm(self.options.dpi)
    }

    fn path_element(&self, data: &str, color: &Color) -> String {
        format!(
            "    <path d=\"{}\" style=\"fill:none; stroke:{}; stroke-width:{}mm;\" />",
            data, color, self.options.stroke_width_mm
        )
    }

    /// Renders `template` with variables resolved from `values`.
    pub fn render(
        &self,
        template: &LamicoidTemplate,
        values: &VariableValues,
    ) -> Result<String, SerializeError> {
        let canvas = template.canvas();
        let ppm = self.px_per_mm();
        let width = format_mm(canvas.width_mm());
        let height = format_mm(canvas.height_mm());

        let mut parts = vec![
            format!(
                "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}mm\" height=\"{h}mm\" version=\"1.1\" viewBox=\"0 0 {w} {h}\">",
                w = width,
                h = height
            ),
            "  <g id=\"LamicoidContent\">".to_string(),
        ];

        let (outline_rect, outline_radius) = canvas.outline(self.options.outline);
        let mut writer = PathWriter::new(ppm);
        writer.append_path(&outline_path(
            &outline_rect.scaled(ppm),
            outline_radius.map(|r| r * ppm),
        ));
        parts.push(self.path_element(&writer.finish(), &Color::cut()));

        let content = canvas.content_rect();
        let mut emitted = 0usize;
        for element in template.list_elements_ordered() {
            let rect_mm = element.rect().translated(content.x, content.y);
            let primitive = match &element.kind {
                ElementKind::Text(text) => self
                    .text_path(&text.content, &text.style, &rect_mm.scaled(ppm))?
                    .map(|data| (data, text.style.color.clone())),
                ElementKind::VariableText(var) => {
                    let text = element.kind.resolved_text(values).unwrap_or_default();
                    self.text_path(text, &var.style, &rect_mm.scaled(ppm))?
                        .map(|data| (data, var.style.color.clone()))
                }
                ElementKind::Image(image) => {
                    let placeholder = image.placeholder_rect(&rect_mm);
                    Some((self.rect_path(&placeholder, None), image.color.clone()))
                }
                ElementKind::Rectangle(shape) => {
                    let radius = rounded_corner_radius(&rect_mm, shape.corner_radius_mm);
                    Some((self.rect_path(&rect_mm, radius), shape.color.clone()))
                }
            };

            match primitive {
                Some((data, color)) => {
                    parts.push(self.path_element(&data, &color));
                    emitted += 1;
                }
                None => tracing::debug!(
                    "{} element {} has nothing to draw",
                    element.kind.name(),
                    element.id()
                ),
            }
        }

        parts.push("  </g>".to_string());
        parts.push("</svg>".to_string());

        tracing::debug!(
            "Serialized drawing {}x{}mm with {} of {} elements",
            width,
            height,
            emitted,
            template.len()
        );
        Ok(parts.join("\n"))
    }

    fn rect_path(&self, rect_mm: &Rect, radius_mm: Option<f64>) -> String {
        let ppm = self.px_per_mm();
        let mut writer = PathWriter::new(ppm);
        writer.append_path(&outline_path(&rect_mm.scaled(ppm), radius_mm.map(|r| r * ppm)));
        writer.finish()
    }

    /// Lays out `text` inside `rect_px` and returns its path data, or `None`
    /// when there is nothing visible.
    fn text_path(
        &self,
        text: &str,
        style: &TextStyle,
        rect_px: &Rect,
    ) -> Result<Option<String>, SerializeError> {
        let lines = text_lines(text);
        if lines.is_empty() {
            return Ok(None);
        }

        let metrics = self.fonts.metrics(style)?;
        let block_height = (lines.len() - 1) as f64 * metrics.line_spacing + metrics.height;

        let start_y = match style.v_align {
            VerticalAlign::Top => rect_px.y,
            VerticalAlign::Center => rect_px.y + (rect_px.height - block_height) / 2.0,
            VerticalAlign::Bottom => rect_px.y + rect_px.height - block_height,
        };
        let first_baseline = start_y + metrics.ascent;

        let mut writer = PathWriter::new(self.px_per_mm());
        for (i, line) in lines.iter().enumerate() {
            let baseline = first_baseline + i as f64 * metrics.line_spacing;
            let advance = self.fonts.advance(style, line)?;
            let x = match style.h_align {
                HorizontalAlign::Left => rect_px.x,
                HorizontalAlign::Center => rect_px.x + (rect_px.width - advance) / 2.0,
                HorizontalAlign::Right => rect_px.x + rect_px.width - advance,
            };

            self.fonts.outline(style, line, (x, baseline), &mut writer)?;

            if style.underline {
                let y = baseline + metrics.underline_offset;
                writer.move_to_px(x, y);
                writer.line_to_px(x + advance, y);
            }
        }

        if writer.is_empty() {
            return Ok(None);
        }
        Ok(Some(writer.finish()))
    }
}

/// Serializes `template` to an SVG drawing with default options: the cut
/// outline traces the content rectangle.
pub fn serialize_drawing(
    template: &LamicoidTemplate,
    values: &VariableValues,
    fonts: &dyn FontMetricsProvider,
) -> Result<String, SerializeError> {
    SvgRenderer::new(fonts).render(template, values)
}
