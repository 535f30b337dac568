//! # Lamicoid Designer
//!
//! Label geometry and the two documents the print engine consumes.
//!
//! ## Components
//!
//! - **Canvas**: plate size, corner radius, margin and placement grid, with the
//!   pure placement rules (grid snapping, margin containment, minimum size)
//! - **Model**: text, variable text, image and rectangle elements
//! - **Templates**: a canvas plus its elements, ordered by z-order
//! - **Font manager**: font metrics and glyph outlines behind a provider trait
//! - **SVG renderer**: the drawing, with text converted to outlines
//! - **Job settings**: the JSON process descriptor
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lamicoid_designer::{Canvas, ElementKind, LamicoidTemplate, Rect, TextElement};
//!
//! let mut template = LamicoidTemplate::new("Door sign", Canvas::new(100.0, 50.0, 3.0, 5.0, 2.0));
//! template.add_element(
//!     ElementKind::Text(TextElement::new("ROOM 12")),
//!     Rect::new(0.0, 0.0, 40.0, 10.0),
//! );
//! let svg = lamicoid_designer::serialize_drawing(&template, &Default::default(), &SystemFonts::new())?;
//! ```

pub mod canvas;
pub mod font_manager;
pub mod job_settings;
pub mod model;
pub mod svg_renderer;
pub mod templates;

pub use canvas::{Canvas, OutlineBoundary, Rect};
pub use font_manager::{FontMetrics, FontMetricsProvider, SystemFonts};
pub use job_settings::{
    serialize_settings, ColorFilter, EngraveProcess, JobSettings, Process, VectorProcess,
    DEFAULT_FIRMWARE_VERSION,
};
pub use model::{
    AspectMode, Color, Element, ElementId, ElementKind, HorizontalAlign, ImageElement,
    RectangleElement, TextElement, TextStyle, VariableTextElement, VariableValues, VerticalAlign,
};
pub use svg_renderer::{serialize_drawing, DrawingOptions, PathWriter, SvgRenderer};
pub use templates::LamicoidTemplate;
