use lamicoid_core::SerializeError;
use lamicoid_designer::{
    serialize_drawing, Canvas, Color, DrawingOptions, ElementKind, HorizontalAlign, ImageElement,
    LamicoidTemplate, OutlineBoundary, Rect, RectangleElement, SvgRenderer, TextElement,
    TextStyle, VariableTextElement, VariableValues, VerticalAlign,
};

use crate::box_font::{BoxFont, NoFonts};

/// `(d, stroke)` of every `<path>` in document order.
fn paths(svg: &str) -> Vec<(String, String)> {
    svg.lines()
        .filter_map(|line| {
            let d = line.split("d=\"").nth(1)?.split('"').next()?;
            let stroke = line.split("stroke:").nth(1)?.split(';').next()?;
            Some((d.to_string(), stroke.to_string()))
        })
        .collect()
}

fn points(d: &str) -> Vec<(f64, f64)> {
    let numbers: Vec<f64> = d
        .split_whitespace()
        .filter_map(|token| token.parse::<f64>().ok())
        .collect();
    numbers.chunks(2).map(|pair| (pair[0], pair[1])).collect()
}

fn door_sign() -> LamicoidTemplate {
    let mut template = LamicoidTemplate::new("Door", Canvas::new(100.0, 50.0, 0.0, 5.0, 2.0));
    template.add_element(
        ElementKind::Text(TextElement::new("ABC")),
        Rect::new(0.0, 0.0, 40.0, 10.0),
    );
    template
}

fn text_with(h_align: HorizontalAlign, v_align: VerticalAlign) -> LamicoidTemplate {
    let mut template = LamicoidTemplate::new("Door", Canvas::new(100.0, 50.0, 0.0, 5.0, 2.0));
    let style = TextStyle {
        h_align,
        v_align,
        ..TextStyle::default()
    };
    template.add_element(
        ElementKind::Text(TextElement::new("ABC").with_style(style)),
        Rect::new(0.0, 0.0, 40.0, 10.0),
    );
    template
}

#[test]
fn test_outline_matches_content_rect() {
    let svg = serialize_drawing(&door_sign(), &VariableValues::new(), &BoxFont).unwrap();
    assert!(svg.starts_with(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"100.000mm\" height=\"50.000mm\" version=\"1.1\" viewBox=\"0 0 100.000 50.000\">"
    ));
    assert!(svg.ends_with("</svg>"));

    let paths = paths(&svg);
    let (outline, stroke) = &paths[0];
    assert_eq!(stroke, "aqua");
    assert_eq!(outline.matches('M').count(), 1);
    assert!(outline.ends_with('Z'));

    let mut corners = points(outline);
    corners.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(
        corners,
        vec![(5.0, 5.0), (5.0, 45.0), (95.0, 5.0), (95.0, 45.0)]
    );
}

#[test]
fn test_plate_outline_on_request() {
    let options = DrawingOptions {
        outline: OutlineBoundary::Plate,
        ..DrawingOptions::default()
    };
    let svg = SvgRenderer::new(&BoxFont)
        .with_options(options)
        .render(&door_sign(), &VariableValues::new())
        .unwrap();

    let (outline, _) = &paths(&svg)[0];
    let xs: Vec<f64> = points(outline).iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points(outline).iter().map(|p| p.1).collect();
    assert_eq!(xs.iter().cloned().fold(f64::INFINITY, f64::min), 0.0);
    assert_eq!(xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 100.0);
    assert_eq!(ys.iter().cloned().fold(f64::INFINITY, f64::min), 0.0);
    assert_eq!(ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 50.0);
}

#[test]
fn test_rounded_outline_uses_curves() {
    let mut template = door_sign();
    // Content radius is the plate radius less the margin.
    template.set_canvas(100.0, 50.0, 8.0, 5.0, 2.0);
    let svg = serialize_drawing(&template, &VariableValues::new(), &BoxFont).unwrap();
    let (outline, _) = &paths(&svg)[0];
    assert!(outline.contains('Q') || outline.contains('C'));
    assert!(outline.ends_with('Z'));
}

#[test]
fn test_output_is_deterministic() {
    let first = serialize_drawing(&door_sign(), &VariableValues::new(), &BoxFont).unwrap();
    let second = serialize_drawing(&door_sign(), &VariableValues::new(), &BoxFont).unwrap();
    assert_eq!(first, second);
    assert!(!first.contains("<text"));
}

#[test]
fn test_text_glyphs_at_baseline() {
    let svg = serialize_drawing(&door_sign(), &VariableValues::new(), &BoxFont).unwrap();
    let paths = paths(&svg);
    assert_eq!(paths.len(), 2);

    let (text, stroke) = &paths[1];
    assert_eq!(stroke, "blue");
    // one box per glyph
    assert_eq!(text.matches('M').count(), 3);
    // 12pt em = 4.233mm; glyph top = 5 + (0.8 - 0.7) * em
    assert!(text.starts_with("M 5.000 5.423 "), "{}", text);
}

#[test]
fn test_horizontal_alignment() {
    let values = VariableValues::new();
    let center = serialize_drawing(
        &text_with(HorizontalAlign::Center, VerticalAlign::Top),
        &values,
        &BoxFont,
    )
    .unwrap();
    // advance = 3 * 0.6 * 4.233 = 7.62mm, centred in 40mm from x = 5
    assert!(paths(&center)[1].0.starts_with("M 21.190 "));

    let right = serialize_drawing(
        &text_with(HorizontalAlign::Right, VerticalAlign::Top),
        &values,
        &BoxFont,
    )
    .unwrap();
    assert!(paths(&right)[1].0.starts_with("M 37.380 "));
}

#[test]
fn test_vertical_alignment() {
    let values = VariableValues::new();
    let center = serialize_drawing(
        &text_with(HorizontalAlign::Left, VerticalAlign::Center),
        &values,
        &BoxFont,
    )
    .unwrap();
    assert!(paths(&center)[1].0.starts_with("M 5.000 8.307 "));

    let bottom = serialize_drawing(
        &text_with(HorizontalAlign::Left, VerticalAlign::Bottom),
        &values,
        &BoxFont,
    )
    .unwrap();
    assert!(paths(&bottom)[1].0.starts_with("M 5.000 11.190 "));
}

#[test]
fn test_blank_lines_dropped() {
    let mut template = LamicoidTemplate::new("Door", Canvas::new(100.0, 50.0, 0.0, 5.0, 2.0));
    template.add_element(
        ElementKind::Text(TextElement::new("A\n\n   \n  B  ")),
        Rect::new(0.0, 0.0, 40.0, 20.0),
    );
    template.add_element(
        ElementKind::Text(TextElement::new(" \n ")),
        Rect::new(0.0, 24.0, 40.0, 10.0),
    );

    let svg = serialize_drawing(&template, &VariableValues::new(), &BoxFont).unwrap();
    let paths = paths(&svg);
    assert_eq!(paths.len(), 2);

    let tops: Vec<f64> = paths[1]
        .0
        .split('M')
        .filter(|s| !s.trim().is_empty())
        .map(|s| points(s)[0].1)
        .collect();
    assert_eq!(tops.len(), 2);
    // second line one line spacing (1.1 em) lower
    assert!((tops[1] - tops[0] - 1.1 * 4.233_333).abs() < 1e-3);
}

#[test]
fn test_variable_text_resolution() {
    let mut template = LamicoidTemplate::new("Asset", Canvas::new(100.0, 50.0, 0.0, 5.0, 2.0));
    template.add_element(
        ElementKind::VariableText(VariableTextElement::new("asset").with_default("NONE")),
        Rect::new(0.0, 0.0, 40.0, 10.0),
    );
    template.add_element(
        ElementKind::VariableText(VariableTextElement::new("unset")),
        Rect::new(0.0, 20.0, 40.0, 10.0),
    );

    let defaulted = serialize_drawing(&template, &VariableValues::new(), &BoxFont).unwrap();
    assert_eq!(paths(&defaulted).len(), 2);
    assert_eq!(paths(&defaulted)[1].0.matches('M').count(), 4);

    let mut values = VariableValues::new();
    values.insert("asset".to_string(), "P7".to_string());
    values.insert("unset".to_string(), "X".to_string());
    let filled = serialize_drawing(&template, &values, &BoxFont).unwrap();
    let filled = paths(&filled);
    assert_eq!(filled.len(), 3);
    assert_eq!(filled[1].0.matches('M').count(), 2);
    assert_eq!(filled[2].0.matches('M').count(), 1);
}

#[test]
fn test_underline_adds_stroke() {
    let mut template = LamicoidTemplate::new("U", Canvas::new(100.0, 50.0, 0.0, 5.0, 2.0));
    let style = TextStyle {
        underline: true,
        ..TextStyle::default()
    };
    template.add_element(
        ElementKind::Text(TextElement::new("AB").with_style(style)),
        Rect::new(0.0, 0.0, 40.0, 10.0),
    );

    let svg = serialize_drawing(&template, &VariableValues::new(), &BoxFont).unwrap();
    let text = &paths(&svg)[1].0;
    assert_eq!(text.matches('M').count(), 3);
    // underline spans the advance: 2 * 0.6 * 4.233 = 5.08mm
    assert!(text.ends_with("M 5.000 8.810 L 10.080 8.810"), "{}", text);
}

#[test]
fn test_elements_emitted_in_z_order() {
    let mut template = LamicoidTemplate::new("Z", Canvas::new(100.0, 50.0, 0.0, 5.0, 2.0));
    let text = template.add_element(
        ElementKind::Text(TextElement::new("T")),
        Rect::new(0.0, 0.0, 20.0, 10.0),
    );
    template.add_element(
        ElementKind::Rectangle(RectangleElement::new().with_color(Color::new("red"))),
        Rect::new(0.0, 0.0, 20.0, 10.0),
    );
    template.set_z_order(text, 1);

    let svg = serialize_drawing(&template, &VariableValues::new(), &BoxFont).unwrap();
    let strokes: Vec<String> = paths(&svg).into_iter().map(|(_, s)| s).collect();
    assert_eq!(strokes, vec!["aqua", "red", "blue"]);
}

#[test]
fn test_image_placeholder_fits_aspect() {
    let mut template = LamicoidTemplate::new("Logo", Canvas::new(100.0, 50.0, 0.0, 5.0, 2.0));
    template.add_element(
        ElementKind::Image(ImageElement::new("logo.png").fitted(300.0, 150.0)),
        Rect::new(0.0, 0.0, 40.0, 10.0),
    );

    let svg = serialize_drawing(&template, &VariableValues::new(), &NoFonts).unwrap();
    let mut corners = points(&paths(&svg)[1].0);
    corners.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(
        corners,
        vec![(15.0, 5.0), (15.0, 15.0), (35.0, 5.0), (35.0, 15.0)]
    );
}

#[test]
fn test_missing_fonts_only_fail_text() {
    let mut template = LamicoidTemplate::new("Plain", Canvas::new(100.0, 50.0, 0.0, 5.0, 2.0));
    template.add_element(
        ElementKind::Rectangle(RectangleElement::new()),
        Rect::new(0.0, 0.0, 20.0, 10.0),
    );
    assert!(serialize_drawing(&template, &VariableValues::new(), &NoFonts).is_ok());

    let err = serialize_drawing(&door_sign(), &VariableValues::new(), &NoFonts).unwrap_err();
    assert_eq!(
        err,
        SerializeError::FontUnavailable {
            family: "Arial".to_string()
        }
    );
}
