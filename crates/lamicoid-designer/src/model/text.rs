use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Color;

/// Horizontal anchor of each text line within its element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical placement of the whole text block within its element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

impl fmt::Display for HorizontalAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Center => write!(f, "center"),
            Self::Right => write!(f, "right"),
        }
    }
}

impl FromStr for HorizontalAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" | "start" => Ok(Self::Left),
            "center" | "middle" => Ok(Self::Center),
            "right" | "end" => Ok(Self::Right),
            _ => Err(format!("Unknown horizontal alignment: {}", s)),
        }
    }
}

impl fmt::Display for VerticalAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => write!(f, "top"),
            Self::Center => write!(f, "center"),
            Self::Bottom => write!(f, "bottom"),
        }
    }
}

impl FromStr for VerticalAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "center" | "middle" => Ok(Self::Center),
            "bottom" => Ok(Self::Bottom),
            _ => Err(format!("Unknown vertical alignment: {}", s)),
        }
    }
}

/// Font and placement attributes shared by static and variable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: String,
    pub size_pt: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub h_align: HorizontalAlign,
    pub v_align: VerticalAlign,
    pub color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            size_pt: 12.0,
            bold: false,
            italic: false,
            underline: false,
            h_align: HorizontalAlign::Left,
            v_align: VerticalAlign::Top,
            color: Color::engrave(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub content: String,
    pub style: TextStyle,
}

impl TextElement {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: TextStyle::default(),
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }
}

/// Text whose content is supplied per label instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableTextElement {
    /// Key looked up in the instance's variable values.
    pub variable_name: String,
    /// Human-readable description shown when filling in values.
    pub label: String,
    /// Used when the instance supplies no value.
    pub default_value: String,
    pub style: TextStyle,
}

impl VariableTextElement {
    pub fn new(variable_name: impl Into<String>) -> Self {
        let variable_name = variable_name.into();
        Self {
            label: variable_name.clone(),
            variable_name,
            default_value: String::new(),
            style: TextStyle::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = default_value.into();
        self
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }
}

/// Splits text into its renderable lines: each line trimmed, blank lines dropped.
pub fn text_lines(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
