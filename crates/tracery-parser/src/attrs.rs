//! Attribute value helpers shared by both front-ends.

use tracery_core::color::Color;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    span::Span,
};

/// Parse a CSS color, emitting an E300 warning and returning `None` when the
/// value is not a color.
pub(crate) fn parse_color(
    value: &str,
    span: Span,
    diagnostics: &mut DiagnosticCollector,
) -> Option<Color> {
    match Color::new(value) {
        Ok(color) => Some(color),
        Err(err) => {
            diagnostics.emit(
                Diagnostic::warning(format!("ignoring color: {err}"))
                    .with_code(ErrorCode::E300)
                    .with_label(span, ErrorCode::E300.description())
                    .with_help("use a CSS color name such as `teal` or a hex value such as `#ff8800`"),
            );
            None
        }
    }
}
