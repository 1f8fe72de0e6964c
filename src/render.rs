//! Recursive renderer from report [`Value`]s to display lines.
//!
//! Pure and total: any JSON-decoded value renders to a `Vec<Line>` without
//! panicking. Recursion depth is bounded by the nesting of the service
//! response, which a JSON-decoded document keeps well within stack limits.

use ratatui::prelude::*;

use crate::report::{Scalar, Value};

pub const NOT_AVAILABLE: &str = "not available";
pub const NONE_LISTED: &str = "none listed";

/// Stringified scalars longer than this keep their internal line breaks.
pub const LONG_TEXT_THRESHOLD: usize = 100;

const INDENT_WIDTH: usize = 2;

/// Render a value into styled display lines.
pub fn render_value(value: &Value) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    push_value(&mut out, value, 0);
    out
}

/// Plain-text rendering for the one-shot CLI output.
pub fn render_value_plain(value: &Value) -> Vec<String> {
    render_value(value).iter().map(line_text).collect()
}

/// Concatenated span contents of a line.
pub fn line_text(line: &Line) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

/// Integers print without a trailing ".0".
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn muted_style() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC)
}

fn muted_span(text: &str) -> Span<'static> {
    Span::styled(text.to_string(), muted_style())
}

fn key_span(key: &str) -> Span<'static> {
    Span::styled(
        format!("{key}: "),
        Style::default().add_modifier(Modifier::BOLD),
    )
}

fn pad(depth: usize) -> String {
    " ".repeat(depth * INDENT_WIDTH)
}

fn scalar_text(scalar: &Scalar) -> Option<String> {
    match scalar {
        Scalar::Text(s) => Some(s.clone()),
        Scalar::Number(n) => Some(format_number(*n)),
        Scalar::Bool(b) => Some(b.to_string()),
        Scalar::Missing => None,
    }
}

fn push_value(out: &mut Vec<Line<'static>>, value: &Value, depth: usize) {
    match value {
        Value::Scalar(scalar) => match scalar_text(scalar) {
            Some(text) => push_scalar_lines(out, &text, depth, false),
            None => out.push(Line::from(vec![
                Span::raw(pad(depth)),
                muted_span(NOT_AVAILABLE),
            ])),
        },
        Value::List(items) if items.is_empty() => out.push(Line::from(vec![
            Span::raw(pad(depth)),
            muted_span(NONE_LISTED),
        ])),
        Value::List(items) => {
            for item in items {
                push_item(out, item, depth);
            }
        }
        Value::Object(fields) => {
            for (key, field) in fields {
                push_field(out, key, field, depth);
            }
        }
    }
}

/// One bulleted line per scalar item; nested items get a bare bullet and an
/// indented block underneath.
fn push_item(out: &mut Vec<Line<'static>>, item: &Value, depth: usize) {
    match item {
        Value::Scalar(scalar) => match scalar_text(scalar) {
            Some(text) => push_scalar_lines(out, &text, depth, true),
            None => out.push(Line::from(vec![
                Span::raw(format!("{}• ", pad(depth))),
                muted_span(NOT_AVAILABLE),
            ])),
        },
        Value::List(items) if items.is_empty() => out.push(Line::from(vec![
            Span::raw(format!("{}• ", pad(depth))),
            muted_span(NONE_LISTED),
        ])),
        nested => {
            out.push(Line::raw(format!("{}•", pad(depth))));
            push_value(out, nested, depth + 1);
        }
    }
}

fn push_field(out: &mut Vec<Line<'static>>, key: &str, value: &Value, depth: usize) {
    match value {
        Value::Scalar(scalar) => match scalar_text(scalar) {
            None => out.push(Line::from(vec![
                Span::raw(pad(depth)),
                key_span(key),
                muted_span(NOT_AVAILABLE),
            ])),
            Some(text) if text.len() <= LONG_TEXT_THRESHOLD && !text.contains('\n') => {
                out.push(Line::from(vec![
                    Span::raw(pad(depth)),
                    key_span(key),
                    Span::raw(text),
                ]))
            }
            Some(text) => {
                out.push(Line::from(vec![Span::raw(pad(depth)), key_span(key)]));
                push_scalar_lines(out, &text, depth + 1, false);
            }
        },
        Value::List(items) if items.is_empty() => out.push(Line::from(vec![
            Span::raw(pad(depth)),
            key_span(key),
            muted_span(NONE_LISTED),
        ])),
        nested => {
            out.push(Line::from(vec![Span::raw(pad(depth)), key_span(key)]));
            push_value(out, nested, depth + 1);
        }
    }
}

/// Internal line breaks become separate display lines so preformatted text
/// (toxicology paragraphs, multi-line advice) keeps its shape.
fn push_scalar_lines(out: &mut Vec<Line<'static>>, text: &str, depth: usize, bullet: bool) {
    let mut first = true;
    for part in text.split('\n') {
        let marker = match (bullet, first) {
            (true, true) => "• ",
            (true, false) => "  ",
            (false, _) => "",
        };
        out.push(Line::from(vec![
            Span::raw(format!("{}{}", pad(depth), marker)),
            Span::raw(part.to_string()),
        ]));
        first = false;
    }
}
