//! Display surfaces: the containers diagrams are shown in.
//!
//! A [`DisplaySurface`] stands in for a host-side container. It has an
//! identity, a size the host may change at any time, and an attachment flag
//! that goes false when the host removes it. The surface also owns the two
//! pieces of per-container render state: the generation counter used to
//! discard stale results, and the currently attached viewport.

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use log::debug;

use tracery_core::geometry::Size;

use crate::viewport::{ViewportError, ViewportHandle};

#[derive(Debug)]
struct SurfaceState {
    id: String,
    size: Cell<Size>,
    attached: Cell<bool>,
    generation: Cell<u64>,
    viewport: RefCell<Option<ViewportHandle>>,
}

/// Shared handle to one display container.
///
/// Clones refer to the same surface.
#[derive(Debug, Clone)]
pub struct DisplaySurface {
    state: Rc<SurfaceState>,
}

impl DisplaySurface {
    pub fn new(id: impl Into<String>, size: Size) -> Self {
        Self {
            state: Rc::new(SurfaceState {
                id: id.into(),
                size: Cell::new(size),
                attached: Cell::new(true),
                generation: Cell::new(0),
                viewport: RefCell::new(None),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.state.id
    }

    /// Current container size.
    pub fn size(&self) -> Size {
        self.state.size.get()
    }

    /// Changes the container size. An attached viewport keeps its zoom and
    /// pan; only its fit scale follows the new size.
    pub fn resize(&self, size: Size) {
        debug!(
            surface = self.id(),
            width = size.width(),
            height = size.height();
            "Surface resized"
        );
        self.state.size.set(size);
    }

    /// Removes the surface from the host. The attached viewport, if any, is
    /// dropped, and later attaches fail with [`ViewportError::Detached`].
    pub fn detach(&self) {
        self.state.attached.set(false);
        if let Some(previous) = self.state.viewport.borrow_mut().take() {
            previous.deactivate();
        }
        debug!(surface = self.id(); "Surface detached");
    }

    pub fn is_attached(&self) -> bool {
        self.state.attached.get()
    }

    /// The viewport currently shown on this surface.
    pub fn viewport(&self) -> Option<ViewportHandle> {
        self.state.viewport.borrow().clone()
    }

    /// What the surface currently displays, if anything.
    pub fn markup(&self) -> Option<String> {
        self.viewport().and_then(|viewport| viewport.surface_markup())
    }

    /// Starts a new render generation and returns its token.
    pub(crate) fn next_generation(&self) -> u64 {
        let next = self.state.generation.get() + 1;
        self.state.generation.set(next);
        next
    }

    /// Whether `generation` is still the latest one started.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.state.generation.get() == generation
    }

    pub(crate) fn check_usable(&self) -> Result<(), ViewportError> {
        if !self.is_attached() {
            return Err(ViewportError::Detached(self.id().to_string()));
        }
        if self.size().is_degenerate() {
            return Err(ViewportError::Unusable(self.id().to_string()));
        }
        Ok(())
    }

    /// Installs `viewport`, deactivating the one it replaces.
    pub(crate) fn replace_viewport(&self, viewport: ViewportHandle) {
        let previous = self.state.viewport.borrow_mut().replace(viewport);
        if let Some(previous) = previous {
            previous.deactivate();
        }
    }

    pub(crate) fn downgrade(&self) -> WeakSurface {
        WeakSurface(Rc::downgrade(&self.state))
    }
}

/// Non-owning reference held by viewports.
#[derive(Debug, Clone)]
pub(crate) struct WeakSurface(Weak<SurfaceState>);

impl WeakSurface {
    pub(crate) fn upgrade(&self) -> Option<DisplaySurface> {
        self.0.upgrade().map(|state| DisplaySurface { state })
    }
}
