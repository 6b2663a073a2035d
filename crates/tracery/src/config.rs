//! Configuration types for Tracery rendering.
//!
//! All types implement [`serde::Deserialize`] so the command-line tool (or an
//! embedder) can load them from TOML. Every field has a default, so a partial
//! file only overrides what it names.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration root.
//! - [`LayoutConfig`] - Spacing and text metrics used by the layered layout.
//! - [`RenderConfig`] - Resource limits and the render failure policy.
//! - [`ViewportConfig`] - Zoom limits and step factor.
//! - [`StyleConfig`] - Colors applied to exported diagrams.
//!
//! # Example
//!
//! ```
//! # use tracery::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.viewport().zoom_step(), 1.2);
//! ```

use serde::Deserialize;

use tracery_core::color::Color;

/// Top-level configuration combining every section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    render: RenderConfig,

    #[serde(default)]
    viewport: ViewportConfig,

    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    pub fn new(
        layout: LayoutConfig,
        render: RenderConfig,
        viewport: ViewportConfig,
        style: StyleConfig,
    ) -> Self {
        Self {
            layout,
            render,
            viewport,
            style,
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn render(&self) -> &RenderConfig {
        &self.render
    }

    pub fn viewport(&self) -> &ViewportConfig {
        &self.viewport
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Replaces the render section.
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    /// Replaces the viewport section.
    pub fn with_viewport(mut self, viewport: ViewportConfig) -> Self {
        self.viewport = viewport;
        self
    }

    /// Checks values that deserialization alone cannot reject.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        self.layout.validate()?;
        self.viewport.validate()?;
        self.style.theme().map(|_| ())
    }
}

/// Spacing and text metrics for the layered layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    horizontal_spacing: f32,
    vertical_spacing: f32,
    padding: f32,
    node_padding: f32,
    font_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 40.0,
            vertical_spacing: 60.0,
            padding: 20.0,
            node_padding: 12.0,
            font_size: 14.0,
        }
    }
}

impl LayoutConfig {
    /// Gap between neighbouring nodes within a rank.
    pub fn horizontal_spacing(&self) -> f32 {
        self.horizontal_spacing
    }

    /// Gap between consecutive ranks.
    pub fn vertical_spacing(&self) -> f32 {
        self.vertical_spacing
    }

    /// Margin around the whole drawing.
    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// Space between a node label and its outline.
    pub fn node_padding(&self) -> f32 {
        self.node_padding
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    fn validate(&self) -> Result<(), String> {
        let values = [
            ("layout.horizontal_spacing", self.horizontal_spacing),
            ("layout.vertical_spacing", self.vertical_spacing),
            ("layout.padding", self.padding),
            ("layout.node_padding", self.node_padding),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(format!(
                "layout.font_size must be positive, got {}",
                self.font_size
            ));
        }
        Ok(())
    }
}

/// What the pipeline shows on a surface after a render failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Leave the surface untouched.
    #[default]
    Silent,
    /// Attach a neutral "unable to render" placeholder.
    Placeholder,
}

/// Resource limits and failure handling for render attempts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    max_nodes: usize,
    max_edges: usize,
    failure: FailurePolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_nodes: 2_000,
            max_edges: 8_000,
            failure: FailurePolicy::Silent,
        }
    }
}

impl RenderConfig {
    pub fn new(max_nodes: usize, max_edges: usize, failure: FailurePolicy) -> Self {
        Self {
            max_nodes,
            max_edges,
            failure,
        }
    }

    /// Largest node count an engine will lay out.
    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Largest edge count an engine will lay out.
    pub fn max_edges(&self) -> usize {
        self.max_edges
    }

    pub fn failure(&self) -> FailurePolicy {
        self.failure
    }
}

/// Zoom limits for attached viewports.
///
/// Zoom values are relative to the fit-to-container scale, so `1.0` always
/// means "the whole diagram fits".
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    zoom_step: f32,
    min_zoom: f32,
    max_zoom: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            zoom_step: 1.2,
            min_zoom: 0.5,
            max_zoom: 10.0,
        }
    }
}

impl ViewportConfig {
    pub fn new(zoom_step: f32, min_zoom: f32, max_zoom: f32) -> Self {
        Self {
            zoom_step,
            min_zoom,
            max_zoom,
        }
    }

    /// Multiplicative factor applied by one zoom-in step.
    pub fn zoom_step(&self) -> f32 {
        self.zoom_step
    }

    pub fn min_zoom(&self) -> f32 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    fn validate(&self) -> Result<(), String> {
        if !self.zoom_step.is_finite() || self.zoom_step <= 1.0 {
            return Err(format!(
                "viewport.zoom_step must be greater than 1, got {}",
                self.zoom_step
            ));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= 1.0) {
            return Err(format!(
                "viewport.min_zoom must be in (0, 1], got {}",
                self.min_zoom
            ));
        }
        if !self.max_zoom.is_finite() || self.max_zoom < 1.0 {
            return Err(format!(
                "viewport.max_zoom must be at least 1, got {}",
                self.max_zoom
            ));
        }
        Ok(())
    }
}

/// Colors for exported diagrams, as CSS color strings.
///
/// Unset fields fall back to the built-in [`Theme`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    background_color: Option<String>,
    node_fill: Option<String>,
    node_stroke: Option<String>,
    edge_color: Option<String>,
    text_color: Option<String>,
}

impl StyleConfig {
    /// Resolves the configured strings into a [`Theme`].
    ///
    /// # Errors
    ///
    /// Returns an error naming the field whose value is not a valid color.
    pub fn theme(&self) -> Result<Theme, String> {
        let defaults = Theme::default();
        let resolve = |name: &str, value: &Option<String>, fallback: Color| {
            value
                .as_deref()
                .map(Color::new)
                .transpose()
                .map(|color| color.unwrap_or(fallback))
                .map_err(|err| format!("Invalid style.{name} in config: {err}"))
        };

        Ok(Theme {
            background: resolve("background_color", &self.background_color, defaults.background)?,
            node_fill: resolve("node_fill", &self.node_fill, defaults.node_fill)?,
            node_stroke: resolve("node_stroke", &self.node_stroke, defaults.node_stroke)?,
            edge: resolve("edge_color", &self.edge_color, defaults.edge)?,
            text: resolve("text_color", &self.text_color, defaults.text)?,
        })
    }
}

/// Resolved colors used by the SVG exporter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub node_fill: Color,
    pub node_stroke: Color,
    pub edge: Color,
    pub text: Color,
}

impl Default for Theme {
    fn default() -> Self {
        let color = |css: &str| Color::new(css).unwrap_or_default();
        Self {
            background: color("white"),
            node_fill: color("#f4f6fb"),
            node_stroke: color("#4a5568"),
            edge: color("#4a5568"),
            text: color("#1a202c"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r##"
            [render]
            max_nodes = 10
            failure = "placeholder"

            [style]
            node_fill = "#ffeecc"
            "##,
        )
        .unwrap();

        assert_eq!(config.render().max_nodes(), 10);
        assert_eq!(config.render().max_edges(), 8_000);
        assert_eq!(config.render().failure(), FailurePolicy::Placeholder);
        assert_eq!(config.viewport().max_zoom(), 10.0);

        let theme = config.style().theme().unwrap();
        assert_eq!(theme.node_fill, Color::new("#ffeecc").unwrap());
        assert_eq!(theme.background, Theme::default().background);
    }

    #[test]
    fn test_invalid_color_is_reported() {
        let config: AppConfig = toml::from_str("[style]\nedge_color = \"nope\"").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.contains("style.edge_color"));
    }

    #[test]
    fn test_viewport_validation() {
        let config = AppConfig::default().with_viewport(ViewportConfig::new(1.0, 0.5, 10.0));
        assert!(config.validate().unwrap_err().contains("zoom_step"));

        let config = AppConfig::default().with_viewport(ViewportConfig::new(1.5, 2.0, 10.0));
        assert!(config.validate().unwrap_err().contains("min_zoom"));
    }

    #[test]
    fn test_unknown_failure_policy_is_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[render]\nfailure = \"explode\"");
        assert!(result.is_err());
    }
}
