//! Root-element rewriting for attached markup.
//!
//! The opening `<svg ...>` tag is read with the `svg` parser and written back
//! with its attributes in name order; everything after it is kept byte for
//! byte.

use std::collections::BTreeMap;

use svg::{node::element::tag::Type, parser::Event};

use tracery_core::geometry::Size;

use super::ViewportError;

type Attributes = BTreeMap<String, String>;

/// Markup ready to be shown in a viewport.
#[derive(Debug)]
pub(super) struct Prepared {
    pub content: String,
    pub natural: Size,
}

/// Strips `max-width` from the root and pins its size to the natural size.
pub(super) fn prepare(markup: &str) -> Result<Prepared, ViewportError> {
    let start = find_root(markup)
        .ok_or_else(|| ViewportError::MalformedMarkup("no <svg> root element".to_string()))?;
    let end = tag_end(&markup[start..])
        .map(|offset| start + offset + 1)
        .ok_or_else(|| ViewportError::MalformedMarkup("unterminated <svg> tag".to_string()))?;

    let (self_closing, mut attributes) = read_root(&markup[start..end])?;
    let natural = natural_size(&attributes).ok_or_else(|| {
        ViewportError::MalformedMarkup("root element has no usable size".to_string())
    })?;

    attributes.insert("width".to_string(), natural.width().to_string());
    attributes.insert("height".to_string(), natural.height().to_string());
    strip_max_width(&mut attributes);

    let mut content = String::with_capacity(markup.len());
    content.push_str(&markup[..start]);
    content.push_str("<svg");
    for (name, value) in &attributes {
        content.push_str(&format!(" {name}=\"{}\"", value.replace('"', "&quot;")));
    }
    content.push_str(if self_closing { "/>" } else { ">" });
    content.push_str(&markup[end..]);

    Ok(Prepared { content, natural })
}

fn find_root(markup: &str) -> Option<usize> {
    markup.match_indices("<svg").map(|(idx, _)| idx).find(|&idx| {
        markup[idx + 4..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_whitespace() || c == '>' || c == '/')
    })
}

/// Offset of the `>` closing the tag that starts `markup`, skipping quoted
/// values.
fn tag_end(markup: &str) -> Option<usize> {
    let mut quote = None;
    for (idx, c) in markup.char_indices() {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(idx),
            (None, _) => {}
        }
    }
    None
}

/// Attributes of the root tag and whether it closes itself.
fn read_root(tag: &str) -> Result<(bool, Attributes), ViewportError> {
    let malformed = |reason: String| ViewportError::MalformedMarkup(reason);
    let mut events = svg::read(tag).map_err(|err| malformed(err.to_string()))?;

    match events.next() {
        Some(Event::Tag("svg", kind @ (Type::Start | Type::Empty), attributes)) => {
            let attributes = attributes
                .into_iter()
                .map(|(name, value)| (name, value.to_string()))
                .collect();
            Ok((matches!(kind, Type::Empty), attributes))
        }
        Some(Event::Error(err)) => Err(malformed(format!("invalid <svg> tag: {err}"))),
        _ => Err(malformed("invalid <svg> tag".to_string())),
    }
}

/// Natural size from the `viewBox`, falling back to absolute `width`/`height`.
fn natural_size(attributes: &Attributes) -> Option<Size> {
    let from_view_box = attributes.get("viewBox").and_then(|view_box| {
        let numbers: Vec<f32> = view_box
            .split(|c: char| c.is_ascii_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()?;
        match numbers.as_slice() {
            [_, _, width, height] => Some(Size::new(*width, *height)),
            _ => None,
        }
    });
    let size = from_view_box.or_else(|| {
        let width = attributes.get("width").and_then(|w| parse_length(w))?;
        let height = attributes.get("height").and_then(|h| parse_length(h))?;
        Some(Size::new(width, height))
    })?;
    (!size.is_degenerate()).then_some(size)
}

fn parse_length(value: &str) -> Option<f32> {
    let value = value.trim();
    value.strip_suffix("px").unwrap_or(value).trim().parse().ok()
}

fn strip_max_width(attributes: &mut Attributes) {
    let Some(style) = attributes.get("style") else {
        return;
    };

    let kept: Vec<&str> = style
        .split(';')
        .map(str::trim)
        .filter(|declaration| {
            let property = declaration.split(':').next().unwrap_or_default().trim();
            !declaration.is_empty() && !property.eq_ignore_ascii_case("max-width")
        })
        .collect();

    if kept.is_empty() {
        attributes.remove("style");
    } else {
        let style = format!("{};", kept.join("; "));
        attributes.insert("style".to_string(), style);
    }
}
