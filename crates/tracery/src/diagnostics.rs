//! Reporting of render failures.
//!
//! Failed renders never reach the caller as errors. Each one is handed to a
//! [`FailureSink`] for diagnostics, and the pipeline moves on.

use std::rc::Rc;

use log::warn;

use tracery_core::source::DiagramFormat;

use crate::engine::{EngineError, EngineId};

/// One failed render attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRecord {
    pub format: DiagramFormat,
    /// The engine that failed; it has already been discarded.
    pub engine: EngineId,
    pub reason: EngineError,
}

/// Destination for [`FailureRecord`]s.
pub trait FailureSink {
    fn report(&self, record: &FailureRecord);
}

impl<T: FailureSink + ?Sized> FailureSink for Rc<T> {
    fn report(&self, record: &FailureRecord) {
        (**self).report(record)
    }
}

/// Writes failures to the `log` facade at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl FailureSink for LogSink {
    fn report(&self, record: &FailureRecord) {
        warn!(
            format = record.format.name(),
            engine = record.engine.get(),
            reason = record.reason.to_string();
            "Diagram render failed"
        );
    }
}
