//! Export of laid-out diagrams.
//!
//! ```text
//! DiagramSource
//!     ↓ parse (tracery-parser)
//! Diagram
//!     ↓ layout
//! Layout
//!     ↓ export (this module)
//! SVG markup
//! ```

mod svg;

pub use self::svg::{ExportOptions, SvgExporter};
