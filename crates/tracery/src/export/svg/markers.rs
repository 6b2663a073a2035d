//! Arrow marker definitions.
//!
//! Every edge color used in a document gets one head and one tail marker.
//! Marker ids are prefixed so several diagrams can share one page without
//! their `<defs>` colliding.

use std::collections::BTreeMap;

use svg::node::element as svg_element;

use tracery_core::{color::Color, semantic::EdgeEnd};

use super::layer::SvgNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum End {
    Head,
    Tail,
}

/// Collects the markers referenced while drawing edges.
#[derive(Debug)]
pub struct MarkerSet {
    prefix: String,
    used: BTreeMap<(String, End), Color>,
}

impl MarkerSet {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            used: BTreeMap::new(),
        }
    }

    /// Returns the `marker-start`/`marker-end` references for an edge and
    /// records the markers they point to.
    pub fn references(
        &mut self,
        tail: EdgeEnd,
        head: EdgeEnd,
        color: Color,
    ) -> (Option<String>, Option<String>) {
        let start = (tail == EdgeEnd::Arrow).then(|| self.register(End::Tail, color));
        let end = (head == EdgeEnd::Arrow).then(|| self.register(End::Head, color));
        (start, end)
    }

    fn register(&mut self, end: End, color: Color) -> String {
        let id = self.marker_id(end, color);
        self.used.insert((id.clone(), end), color);
        format!("url(#{id})")
    }

    fn marker_id(&self, end: End, color: Color) -> String {
        let side = match end {
            End::Head => "head",
            End::Tail => "tail",
        };
        format!("{}arrow-{side}-{}", self.prefix, color.to_id_safe_string())
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// `<defs>` holding every recorded marker, in a stable order.
    pub fn definitions(&self) -> SvgNode {
        let mut defs = svg_element::Definitions::new();
        for ((id, end), color) in &self.used {
            defs = defs.add(marker(id, *end, *color));
        }
        Box::new(defs)
    }
}

fn marker(id: &str, end: End, color: Color) -> svg_element::Marker {
    let (ref_x, data) = match end {
        End::Head => (9, "M 0 0 L 10 5 L 0 10 z"),
        End::Tail => (1, "M 10 0 L 0 5 L 10 10 z"),
    };
    svg_element::Marker::new()
        .set("id", id)
        .set("viewBox", "0 0 10 10")
        .set("refX", ref_x)
        .set("refY", 5)
        .set("markerWidth", 7)
        .set("markerHeight", 7)
        .set("orient", "auto")
        .add(
            svg_element::Path::new()
                .set("d", data)
                .set("fill", color)
                .set("fill-opacity", color.alpha()),
        )
}
