//! Label measurement and node sizing.
//!
//! Labels are shaped with `cosmic-text` against the sans-serif family, which
//! matches the font stack the SVG exporter declares. One [`FontSystem`] is
//! shared by every measurement in the process.

use std::sync::{Mutex, OnceLock, PoisonError};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use log::{info, warn};

use tracery_core::{geometry::Size, semantic::NodeShape};

const LINE_HEIGHT: f32 = 1.25;
/// Advance per character when no font could shape the text.
const FALLBACK_ADVANCE: f32 = 0.55;

static TEXT_MANAGER: OnceLock<TextManager> = OnceLock::new();

/// Owns the font database used for shaping.
struct TextManager {
    font_system: Mutex<FontSystem>,
}

impl TextManager {
    fn new() -> Self {
        info!("Initializing FontSystem");
        Self {
            font_system: Mutex::new(FontSystem::new()),
        }
    }

    /// Width of the widest shaped line of `text`, or `None` when no font
    /// produced any glyphs.
    fn shaped_width(&self, text: &str, font_size: f32, line_height: f32) -> Option<f32> {
        let mut font_system = self
            .font_system
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let metrics = Metrics::new(font_size, line_height);
        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);
        let attrs = Attrs::new().family(Family::SansSerif);

        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let widest = buffer
            .layout_runs()
            .filter_map(|run| run.glyphs.last().map(|glyph| glyph.x + glyph.w))
            .fold(0.0_f32, f32::max);
        (widest > 0.0).then_some(widest)
    }
}

/// Measures text at a fixed font size.
#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    font_size: f32,
}

impl TextMetrics {
    pub fn new(font_size: f32) -> Self {
        Self { font_size }
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn line_height(&self) -> f32 {
        self.font_size * LINE_HEIGHT
    }

    /// Size of a possibly multi-line label. Empty text measures zero.
    pub fn measure(&self, text: &str) -> Size {
        if text.is_empty() {
            return Size::default();
        }
        let lines = text.split('\n').count();
        let height = lines as f32 * self.line_height();

        let shaped = TEXT_MANAGER.get_or_init(TextManager::new).shaped_width(
            text,
            self.font_size,
            self.line_height(),
        );
        let width = match shaped {
            Some(width) => width,
            None => {
                warn!(text = text; "No font could shape label, estimating its width");
                self.estimated_width(text)
            }
        };
        Size::new(width, height)
    }

    fn estimated_width(&self, text: &str) -> f32 {
        text.split('\n')
            .map(|line| line.chars().count() as f32 * FALLBACK_ADVANCE * self.font_size)
            .fold(0.0, f32::max)
    }
}

/// Outer size of a node with the given shape around a label of `label` size.
pub fn node_size(shape: NodeShape, label: Size, padding: f32, metrics: &TextMetrics) -> Size {
    let min_width = metrics.font_size() * 3.0;
    let min_height = metrics.line_height() + padding;
    let width = (label.width() + 2.0 * padding).max(min_width);
    let height = (label.height() + 2.0 * padding).max(min_height);

    match shape {
        NodeShape::Rectangle | NodeShape::Rounded => Size::new(width, height),
        NodeShape::Stadium => Size::new(width + height / 2.0, height),
        NodeShape::Subroutine => Size::new(width + 16.0, height),
        NodeShape::Cylinder => Size::new(width, height + 16.0),
        NodeShape::Hexagon | NodeShape::Asymmetric => Size::new(width + height / 2.0, height),
        NodeShape::Ellipse => Size::new(width * 1.3, height * 1.3),
        NodeShape::Circle | NodeShape::DoubleCircle => {
            let ring = if shape == NodeShape::DoubleCircle {
                8.0
            } else {
                0.0
            };
            let diameter = label.width().hypot(label.height()) + 2.0 * padding + ring;
            let diameter = diameter.max(min_height);
            Size::new(diameter, diameter)
        }
        // The inscribed label box touches the diamond at half its extents.
        NodeShape::Diamond => Size::new(width * 2.0, height * 2.0),
        NodeShape::Plaintext => Size::new(
            label.width().max(metrics.font_size()),
            label.height().max(metrics.line_height()),
        ),
    }
}
