//! Ownership of render engines.
//!
//! The [`EngineLifecycleManager`] keeps at most one live engine per format.
//! Engines are created lazily through an [`EngineFactory`] and discarded as
//! soon as one of their renders fails, so the next request for that format
//! gets a fresh instance with a new [`EngineId`].

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use log::{debug, info};

use tracery_core::source::DiagramFormat;

use crate::{
    config::AppConfig,
    engine::{DirectedGraphEngine, EngineId, FlowchartEngine, RenderEngine},
};

/// Creates engines on demand.
pub trait EngineFactory {
    /// Builds a fresh engine for `format`.
    fn create(&self, format: DiagramFormat, id: EngineId) -> Box<dyn RenderEngine>;
}

impl<T: EngineFactory + ?Sized> EngineFactory for Rc<T> {
    fn create(&self, format: DiagramFormat, id: EngineId) -> Box<dyn RenderEngine> {
        (**self).create(format, id)
    }
}

/// Factory for the built-in DOT and flowchart engines.
#[derive(Debug, Clone, Default)]
pub struct StandardEngines {
    config: AppConfig,
}

impl StandardEngines {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}

impl EngineFactory for StandardEngines {
    fn create(&self, format: DiagramFormat, id: EngineId) -> Box<dyn RenderEngine> {
        debug!(format = format.name(), engine = id.get(); "Creating engine");
        match format {
            DiagramFormat::DirectedGraph => Box::new(DirectedGraphEngine::new(&self.config)),
            DiagramFormat::Flowchart => Box::new(FlowchartEngine::new(&self.config)),
        }
    }
}

/// Whether an engine may still be handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EngineState {
    Fresh,
    Poisoned,
}

/// A live engine together with its identity.
pub(crate) struct EngineHandle {
    id: EngineId,
    format: DiagramFormat,
    engine: Box<dyn RenderEngine>,
    state: Cell<EngineState>,
}

impl EngineHandle {
    pub(crate) fn id(&self) -> EngineId {
        self.id
    }

    pub(crate) fn format(&self) -> DiagramFormat {
        self.format
    }

    pub(crate) fn state(&self) -> EngineState {
        self.state.get()
    }

    pub(crate) fn engine(&self) -> &dyn RenderEngine {
        self.engine.as_ref()
    }
}

/// Hands out one engine per format and replaces engines that failed.
pub(crate) struct EngineLifecycleManager {
    factory: Box<dyn EngineFactory>,
    slots: RefCell<HashMap<DiagramFormat, Rc<EngineHandle>>>,
    next_id: Cell<u64>,
}

impl EngineLifecycleManager {
    pub(crate) fn new(factory: Box<dyn EngineFactory>) -> Self {
        Self {
            factory,
            slots: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
        }
    }

    /// Returns the live engine for `format`, creating one if the slot is
    /// vacant. A poisoned engine is never returned.
    pub(crate) fn get_engine(&self, format: DiagramFormat) -> Rc<EngineHandle> {
        let mut slots = self.slots.borrow_mut();
        if let Some(handle) = slots.get(&format) {
            if handle.state() == EngineState::Fresh {
                return Rc::clone(handle);
            }
        }

        let id = EngineId::new(self.next_id.get());
        self.next_id.set(id.get() + 1);
        let handle = Rc::new(EngineHandle {
            id,
            format,
            engine: self.factory.create(format, id),
            state: Cell::new(EngineState::Fresh),
        });
        slots.insert(format, Rc::clone(&handle));
        handle
    }

    /// Poisons `handle` and vacates its slot if the slot still holds it.
    ///
    /// Reporting a handle that was already replaced leaves the newer engine
    /// in place.
    pub(crate) fn report_failure(&self, handle: &EngineHandle) {
        handle.state.set(EngineState::Poisoned);

        let mut slots = self.slots.borrow_mut();
        let occupied_by_handle = slots
            .get(&handle.format())
            .is_some_and(|live| live.id() == handle.id());
        if occupied_by_handle {
            slots.remove(&handle.format());
            info!(
                format = handle.format().name(),
                engine = handle.id().get();
                "Engine discarded after failure"
            );
        }
    }

    /// Identity of the live engine for `format`, if any.
    pub(crate) fn live_engine(&self, format: DiagramFormat) -> Option<EngineId> {
        self.slots.borrow().get(&format).map(|handle| handle.id())
    }
}
