//! Edge geometry: clipping lines to node outlines, parallel-edge bows and
//! self-loops.

use tracery_core::{
    geometry::{Bounds, Point, Size},
    semantic::NodeShape,
};

/// Geometry of one routed edge, in final drawing coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgePath {
    Line {
        start: Point,
        end: Point,
    },
    /// Quadratic curve used to separate parallel edges.
    Bow {
        start: Point,
        control: Point,
        end: Point,
    },
    /// Cubic loop from a node back to itself.
    Loop {
        start: Point,
        first: Point,
        second: Point,
        end: Point,
    },
}

impl EdgePath {
    pub fn start(&self) -> Point {
        match *self {
            Self::Line { start, .. } | Self::Bow { start, .. } | Self::Loop { start, .. } => start,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            Self::Line { end, .. } | Self::Bow { end, .. } | Self::Loop { end, .. } => end,
        }
    }

    /// Point halfway along the path parameter.
    pub fn midpoint(&self) -> Point {
        match *self {
            Self::Line { start, end } => start.midpoint(end),
            Self::Bow {
                start,
                control,
                end,
            } => start
                .scale(0.25)
                .add_point(control.scale(0.5))
                .add_point(end.scale(0.25)),
            Self::Loop {
                start,
                first,
                second,
                end,
            } => start
                .scale(0.125)
                .add_point(first.scale(0.375))
                .add_point(second.scale(0.375))
                .add_point(end.scale(0.125)),
        }
    }

    /// Bounds of the path including its control points.
    pub fn bounds(&self) -> Bounds {
        let points = match *self {
            Self::Line { start, end } => vec![start, end],
            Self::Bow {
                start,
                control,
                end,
            } => vec![start, control, end],
            Self::Loop {
                start,
                first,
                second,
                end,
            } => vec![start, first, second, end],
        };
        points
            .iter()
            .map(|p| Bounds::new(p.x(), p.y(), p.x(), p.y()))
            .reduce(|acc, b| acc.merge(&b))
            .unwrap_or_default()
    }

    pub fn translate(&self, offset: Point) -> Self {
        let t = |p: Point| p.add_point(offset);
        match *self {
            Self::Line { start, end } => Self::Line {
                start: t(start),
                end: t(end),
            },
            Self::Bow {
                start,
                control,
                end,
            } => Self::Bow {
                start: t(start),
                control: t(control),
                end: t(end),
            },
            Self::Loop {
                start,
                first,
                second,
                end,
            } => Self::Loop {
                start: t(start),
                first: t(first),
                second: t(second),
                end: t(end),
            },
        }
    }

    /// SVG path data (`d` attribute).
    pub fn to_path_data(&self) -> String {
        match self {
            Self::Line { start, end } => {
                format!("M {} {} L {} {}", start.x(), start.y(), end.x(), end.y())
            }
            Self::Bow {
                start,
                control,
                end,
            } => format!(
                "M {} {} Q {} {} {} {}",
                start.x(),
                start.y(),
                control.x(),
                control.y(),
                end.x(),
                end.y()
            ),
            Self::Loop {
                start,
                first,
                second,
                end,
            } => format!(
                "M {} {} C {} {} {} {} {} {}",
                start.x(),
                start.y(),
                first.x(),
                first.y(),
                second.x(),
                second.y(),
                end.x(),
                end.y()
            ),
        }
    }
}

/// Point where the ray from `center` towards `toward` leaves the outline of a
/// node of `shape` and `size` centered at `center`.
pub fn boundary_point(shape: NodeShape, center: Point, size: Size, toward: Point) -> Point {
    let delta = toward.sub_point(center);
    let length = delta.x().hypot(delta.y());
    if length < 0.001 {
        return center;
    }
    let dx = delta.x() / length;
    let dy = delta.y() / length;
    let a = size.width() / 2.0;
    let b = size.height() / 2.0;

    let t = match shape {
        NodeShape::Ellipse | NodeShape::Circle | NodeShape::DoubleCircle => {
            1.0 / ((dx / a).powi(2) + (dy / b).powi(2)).sqrt()
        }
        NodeShape::Diamond => 1.0 / (dx.abs() / a + dy.abs() / b),
        _ => rectangle_distance(dx, dy, a, b),
    };

    if !t.is_finite() {
        return center;
    }
    // Never overshoot a target that sits inside the outline.
    let t = t.min(length);
    Point::new(center.x() + dx * t, center.y() + dy * t)
}

fn rectangle_distance(dx: f32, dy: f32, half_width: f32, half_height: f32) -> f32 {
    let tx = if dx.abs() > f32::EPSILON {
        half_width / dx.abs()
    } else {
        f32::INFINITY
    };
    let ty = if dy.abs() > f32::EPSILON {
        half_height / dy.abs()
    } else {
        f32::INFINITY
    };
    tx.min(ty)
}

/// Control point for the `index`-th of `count` edges between the same pair,
/// bowed perpendicular to the straight line. Returns `None` for the middle
/// edge of an odd group, which stays straight.
pub fn bow_control(
    start: Point,
    end: Point,
    index: usize,
    count: usize,
    spacing: f32,
) -> Option<Point> {
    let offset = index as f32 - (count as f32 - 1.0) / 2.0;
    if offset.abs() < f32::EPSILON {
        return None;
    }
    let delta = end.sub_point(start);
    let length = delta.x().hypot(delta.y());
    if length < 0.001 {
        return None;
    }
    let normal = Point::new(-delta.y() / length, delta.x() / length);
    Some(start.midpoint(end).add_point(normal.scale(offset * spacing * 2.0)))
}

/// Loop leaving the right side of a node and re-entering lower down.
///
/// Successive loops on the same node grow outwards.
pub fn self_loop(center: Point, size: Size, nth: usize, reach: f32) -> EdgePath {
    let right = center.x() + size.width() / 2.0;
    let spread = size.height() / 4.0;
    let reach = reach * (1.0 + nth as f32 * 0.6);
    EdgePath::Loop {
        start: Point::new(right, center.y() - spread),
        first: Point::new(right + reach, center.y() - spread - reach / 2.0),
        second: Point::new(right + reach, center.y() + spread + reach / 2.0),
        end: Point::new(right, center.y() + spread),
    }
}
