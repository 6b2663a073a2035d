//! Pan/zoom viewports over rendered markup.
//!
//! [`ViewportController::attach`] prepares engine markup for display and
//! installs it on a [`DisplaySurface`]:
//!
//! 1. any `max-width` declaration on the root `<svg>` is removed, so the
//!    drawing may scale past its natural width;
//! 2. the root's `width`/`height` are pinned to its natural size, taken from
//!    the `viewBox` when present;
//! 3. the view starts fitted and centered in the container;
//! 4. whatever viewport the surface showed before is replaced.
//!
//! Zoom is expressed relative to the fit scale, so a zoom of `1.0` always
//! shows the whole diagram no matter how large the container is.

mod markup;

use std::{cell::RefCell, rc::Rc};

use log::{debug, trace};
use svg::node::{Blob, element as svg_element};
use thiserror::Error;

use tracery_core::geometry::{Point, Size};

use crate::{
    config::ViewportConfig,
    surface::{DisplaySurface, WeakSurface},
};

/// Why markup could not be attached to a surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewportError {
    #[error("surface `{0}` is detached")]
    Detached(String),

    #[error("surface `{0}` has no usable area")]
    Unusable(String),

    #[error("malformed markup: {0}")]
    MalformedMarkup(String),
}

/// User-controlled part of a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    zoom: f32,
    pan: Point,
    fit_to_container: bool,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::default(),
            fit_to_container: true,
        }
    }
}

impl ViewportState {
    /// Zoom relative to the fit scale.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Offset from the centered position, in container pixels.
    pub fn pan(&self) -> Point {
        self.pan
    }

    /// Whether the view is the fit-and-center view, untouched since the
    /// last attach or reset.
    pub fn is_fit(&self) -> bool {
        self.fit_to_container
    }
}

/// Mapping from diagram coordinates to container coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale: f32,
    translate: Point,
}

impl ViewTransform {
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn translate(&self) -> Point {
        self.translate
    }

    /// Maps a diagram point into the container.
    pub fn apply(&self, point: Point) -> Point {
        point.scale(self.scale).add_point(self.translate)
    }

    /// Maps a container point back into the diagram.
    pub fn invert(&self, point: Point) -> Point {
        point.sub_point(self.translate).scale(1.0 / self.scale)
    }

    fn to_attribute(self) -> String {
        format!(
            "translate({} {}) scale({})",
            self.translate.x(),
            self.translate.y(),
            self.scale
        )
    }
}

/// Attaches markup to surfaces.
#[derive(Debug, Clone, Default)]
pub struct ViewportController {
    config: ViewportConfig,
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Shows `markup` on `surface` in a fresh, fitted viewport.
    ///
    /// # Errors
    ///
    /// Fails when the surface is detached or has no area, or when the markup
    /// has no `<svg>` root with a usable size. The surface is left untouched
    /// in every error case.
    pub fn attach(
        &self,
        surface: &DisplaySurface,
        markup: &str,
    ) -> Result<ViewportHandle, ViewportError> {
        surface.check_usable()?;
        let prepared = markup::prepare(markup)?;

        debug!(
            surface = surface.id(),
            width = prepared.natural.width(),
            height = prepared.natural.height();
            "Attaching viewport"
        );
        let handle = ViewportHandle {
            inner: Rc::new(RefCell::new(Viewport {
                surface: surface.downgrade(),
                content: prepared.content,
                natural: prepared.natural,
                state: ViewportState::default(),
                config: self.config.clone(),
                active: true,
            })),
        };
        surface.replace_viewport(handle.clone());
        Ok(handle)
    }
}

#[derive(Debug)]
struct Viewport {
    surface: WeakSurface,
    content: String,
    natural: Size,
    state: ViewportState,
    config: ViewportConfig,
    active: bool,
}

impl Viewport {
    /// Container size, or the natural size once the surface is gone.
    fn container(&self) -> Size {
        self.surface
            .upgrade()
            .map(|surface| surface.size())
            .filter(|size| !size.is_degenerate())
            .unwrap_or(self.natural)
    }

    fn transform(&self) -> ViewTransform {
        let container = self.container();
        let scale = self.fit_scale(container) * self.state.zoom;
        ViewTransform {
            scale,
            translate: self.centering(container, scale).add_point(self.state.pan),
        }
    }

    fn fit_scale(&self, container: Size) -> f32 {
        (container.width() / self.natural.width()).min(container.height() / self.natural.height())
    }

    fn centering(&self, container: Size, scale: f32) -> Point {
        Point::new(
            (container.width() - self.natural.width() * scale) / 2.0,
            (container.height() - self.natural.height() * scale) / 2.0,
        )
    }

    fn zoom_at(&mut self, focus: Point, factor: f32) {
        let zoom = (self.state.zoom * factor)
            .min(self.config.max_zoom())
            .max(self.config.min_zoom());
        if zoom == self.state.zoom {
            return;
        }

        let container = self.container();
        let anchor = self.transform().invert(focus);
        let scale = self.fit_scale(container) * zoom;
        let translate = focus.sub_point(anchor.scale(scale));

        self.state.zoom = zoom;
        self.state.pan = translate.sub_point(self.centering(container, scale));
        self.state.fit_to_container = false;
        trace!(zoom = zoom; "Viewport zoomed");
    }
}

/// Controls for one attached viewport.
///
/// Once the surface shows a different viewport, or is detached, the handle
/// becomes inactive and its controls do nothing.
#[derive(Debug, Clone)]
pub struct ViewportHandle {
    inner: Rc<RefCell<Viewport>>,
}

impl ViewportHandle {
    /// Whether this viewport is still the one its surface shows.
    pub fn is_active(&self) -> bool {
        self.inner.borrow().active
    }

    pub fn state(&self) -> ViewportState {
        self.inner.borrow().state
    }

    pub fn transform(&self) -> ViewTransform {
        self.inner.borrow().transform()
    }

    /// Natural size of the attached drawing.
    pub fn natural_size(&self) -> Size {
        self.inner.borrow().natural
    }

    /// The prepared markup: `max-width` removed, size pinned.
    pub fn markup(&self) -> String {
        self.inner.borrow().content.clone()
    }

    /// Zooms in one step about the container center.
    pub fn zoom_in(&self) {
        let step = self.inner.borrow().config.zoom_step();
        self.zoom_about_center(step);
    }

    /// Zooms out one step about the container center.
    pub fn zoom_out(&self) {
        let step = self.inner.borrow().config.zoom_step();
        self.zoom_about_center(1.0 / step);
    }

    /// Multiplies the zoom by `factor`, keeping the diagram point under
    /// `focus` (container coordinates) fixed. The result is clamped to the
    /// configured zoom limits.
    pub fn zoom_at(&self, focus: Point, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let mut viewport = self.inner.borrow_mut();
        if viewport.active {
            viewport.zoom_at(focus, factor);
        }
    }

    /// Moves the view by a container-pixel delta.
    pub fn pan_by(&self, dx: f32, dy: f32) {
        let mut viewport = self.inner.borrow_mut();
        if viewport.active && dx.is_finite() && dy.is_finite() {
            viewport.state.pan = viewport.state.pan.add_point(Point::new(dx, dy));
            viewport.state.fit_to_container = false;
        }
    }

    /// Returns to the initial fit-and-center view.
    pub fn reset_to_fit(&self) {
        let mut viewport = self.inner.borrow_mut();
        if viewport.active {
            viewport.state = ViewportState::default();
        }
    }

    /// Markup of the whole container: the drawing wrapped in a group that
    /// applies the current transform.
    ///
    /// Returns `None` once the viewport is inactive.
    pub fn surface_markup(&self) -> Option<String> {
        let viewport = self.inner.borrow();
        if !viewport.active {
            return None;
        }
        let surface = viewport.surface.upgrade()?;
        let size = surface.size();

        let group = svg_element::Group::new()
            .set("transform", viewport.transform().to_attribute())
            .add(Blob::new(viewport.content.clone()));
        let document = svg::Document::new()
            .set("viewBox", format!("0 0 {} {}", size.width(), size.height()))
            .set("width", size.width())
            .set("height", size.height())
            .set("data-surface", surface.id())
            .set("data-zoom", viewport.state.zoom)
            .add(group);
        Some(document.to_string())
    }

    pub(crate) fn deactivate(&self) {
        self.inner.borrow_mut().active = false;
    }

    fn zoom_about_center(&self, factor: f32) {
        let center = {
            let container = self.inner.borrow().container();
            Point::new(container.width() / 2.0, container.height() / 2.0)
        };
        self.zoom_at(center, factor);
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    const MARKUP: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 100" width="200" height="100" style="max-width: 200px;"><rect width="200" height="100"/></svg>"#;

    fn attached(width: f32, height: f32) -> (DisplaySurface, ViewportHandle) {
        let surface = DisplaySurface::new("view", Size::new(width, height));
        let handle = ViewportController::default()
            .attach(&surface, MARKUP)
            .unwrap();
        (surface, handle)
    }

    #[test]
    fn test_attach_prepares_markup() {
        let (surface, handle) = attached(400.0, 400.0);
        let markup = handle.markup();
        assert!(!markup.contains("max-width"));
        assert!(markup.contains("width=\"200\""));
        assert!(markup.contains("height=\"100\""));
        assert!(markup.ends_with("</svg>"));
        assert_eq!(handle.natural_size(), Size::new(200.0, 100.0));
        assert!(handle.state().is_fit());
        assert!(surface.viewport().is_some());
    }

    #[test]
    fn test_fit_and_center() {
        let (_surface, handle) = attached(400.0, 400.0);
        let transform = handle.transform();
        assert!(approx_eq!(f32, transform.scale(), 2.0));
        assert!(approx_eq!(f32, transform.translate().x(), 0.0));
        assert!(approx_eq!(f32, transform.translate().y(), 100.0));
    }

    #[test]
    fn test_zoom_in_keeps_center() {
        let (_surface, handle) = attached(400.0, 400.0);
        let center = Point::new(200.0, 200.0);
        let before = handle.transform().invert(center);
        handle.zoom_in();
        assert!(approx_eq!(f32, handle.state().zoom(), 1.2));
        let after = handle.transform().invert(center);
        assert!(approx_eq!(f32, before.x(), after.x(), epsilon = 1e-3));
        assert!(approx_eq!(f32, before.y(), after.y(), epsilon = 1e-3));
    }

    #[test]
    fn test_zoom_at_keeps_focus() {
        let (_surface, handle) = attached(400.0, 400.0);
        let focus = Point::new(50.0, 120.0);
        let before = handle.transform().invert(focus);
        handle.zoom_at(focus, 3.0);
        let after = handle.transform().invert(focus);
        assert!(approx_eq!(f32, before.x(), after.x(), epsilon = 1e-3));
        assert!(approx_eq!(f32, before.y(), after.y(), epsilon = 1e-3));
        assert!(!handle.state().is_fit());
    }

    #[test]
    fn test_pan_and_reset() {
        let (_surface, handle) = attached(400.0, 400.0);
        handle.zoom_in();
        handle.pan_by(15.0, -5.0);
        assert_eq!(handle.state().pan().x(), 15.0);
        handle.reset_to_fit();
        assert_eq!(handle.state(), ViewportState::default());
    }

    #[test]
    fn test_zoom_out_stops_at_minimum() {
        let (_surface, handle) = attached(400.0, 400.0);
        for _ in 0..20 {
            handle.zoom_out();
        }
        assert!(approx_eq!(f32, handle.state().zoom(), 0.5));
    }

    #[test]
    fn test_reattach_replaces_viewport() {
        let (surface, first) = attached(400.0, 400.0);
        first.zoom_in();
        let second = ViewportController::default()
            .attach(&surface, MARKUP)
            .unwrap();

        assert!(!first.is_active());
        assert!(second.is_active());
        assert!(second.state().is_fit());

        first.zoom_in();
        assert!(approx_eq!(f32, first.state().zoom(), 1.2));
        assert!(first.surface_markup().is_none());
        assert!(second.surface_markup().is_some());
    }

    #[test]
    fn test_attach_errors_leave_surface_untouched() {
        let (surface, handle) = attached(400.0, 400.0);
        let controller = ViewportController::default();

        let err = controller.attach(&surface, "<div>not svg</div>").unwrap_err();
        assert!(matches!(err, ViewportError::MalformedMarkup(_)));
        assert!(handle.is_active());

        surface.resize(Size::new(0.0, 0.0));
        assert_eq!(
            controller.attach(&surface, MARKUP).unwrap_err(),
            ViewportError::Unusable("view".to_string())
        );

        surface.detach();
        assert!(!handle.is_active());
        assert_eq!(
            controller.attach(&surface, MARKUP).unwrap_err(),
            ViewportError::Detached("view".to_string())
        );
    }

    #[test]
    fn test_surface_markup_wraps_drawing() {
        let (surface, handle) = attached(400.0, 300.0);
        let markup = handle.surface_markup().unwrap();
        assert!(markup.contains("data-surface=\"view\""));
        assert!(markup.contains("transform=\"translate("));
        assert!(markup.contains("<rect width=\"200\" height=\"100\"/>"));
        assert_eq!(surface.markup(), Some(markup));
    }

    proptest! {
        #[test]
        fn zoom_stays_within_limits(
            steps in proptest::collection::vec((0u8..3, -200.0f32..600.0, -200.0f32..600.0), 0..40)
        ) {
            let config = ViewportConfig::default();
            let (_surface, handle) = attached(400.0, 400.0);
            for (kind, x, y) in steps {
                match kind {
                    0 => handle.zoom_in(),
                    1 => handle.zoom_out(),
                    _ => handle.zoom_at(Point::new(x, y), 2.5),
                }
                let zoom = handle.state().zoom();
                prop_assert!(zoom >= config.min_zoom() && zoom <= config.max_zoom());
            }
        }
    }
}
