use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::canvas::Rect;

mod image;
mod rectangle;
mod text;

pub use image::{AspectMode, ImageElement};
pub use rectangle::RectangleElement;
pub use text::{
    text_lines, HorizontalAlign, TextElement, TextStyle, VariableTextElement, VerticalAlign,
};

/// Values supplied by one label instance, keyed by variable name.
pub type VariableValues = BTreeMap<String, String>;

/// Stroke colour of an emitted primitive. The colour selects which process
/// the engraver applies to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    /// Colour picked up by the engrave process.
    pub const ENGRAVE: &'static str = "blue";
    /// Colour picked up by the cut process.
    pub const CUT: &'static str = "aqua";

    /// Creates a colour from an SVG colour name or `#rrggbb` value.
    ///
    /// Characters that cannot appear in either form are dropped.
    pub fn new(name: &str) -> Self {
        Self(
            name.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '#')
                .collect::<String>()
                .to_lowercase(),
        )
    }

    pub fn engrave() -> Self {
        Self(Self::ENGRAVE.to_string())
    }

    pub fn cut() -> Self {
        Self(Self::CUT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable element identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an element draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Text(TextElement),
    VariableText(VariableTextElement),
    Image(ImageElement),
    Rectangle(RectangleElement),
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::VariableText(_) => "variable_text",
            Self::Image(_) => "image",
            Self::Rectangle(_) => "rectangle",
        }
    }

    /// Style of text-bearing elements.
    pub fn text_style(&self) -> Option<&TextStyle> {
        match self {
            Self::Text(text) => Some(&text.style),
            Self::VariableText(var) => Some(&var.style),
            Self::Image(_) | Self::Rectangle(_) => None,
        }
    }

    /// The text to render, resolving variables against `values` and falling
    /// back to their default value.
    pub fn resolved_text<'a>(&'a self, values: &'a VariableValues) -> Option<&'a str> {
        match self {
            Self::Text(text) => Some(text.content.as_str()),
            Self::VariableText(var) => Some(
                values
                    .get(&var.variable_name)
                    .map(String::as_str)
                    .unwrap_or(var.default_value.as_str()),
            ),
            Self::Image(_) | Self::Rectangle(_) => None,
        }
    }
}

/// An element placed on a label.
///
/// `rect` is relative to the canvas content origin and is only changed through
/// the template's placement operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    id: ElementId,
    rect: Rect,
    z_order: i32,
    pub kind: ElementKind,
}

impl Element {
    pub(crate) fn new(kind: ElementKind, rect: Rect, z_order: i32) -> Self {
        Self {
            id: ElementId::new(),
            rect,
            z_order,
            kind,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    pub(crate) fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub(crate) fn set_z_order(&mut self, z_order: i32) {
        self.z_order = z_order;
    }
}
