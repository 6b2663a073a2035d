//! Node outlines.

use svg::node::element as svg_element;

use tracery_core::{
    color::Color,
    geometry::{Point, Size},
    semantic::NodeShape,
};

use super::layer::SvgNode;

/// Fill and stroke applied to an outline.
#[derive(Debug, Clone, Copy)]
pub struct Paint {
    pub fill: Color,
    pub stroke: Color,
}

/// Draws the outline of `shape` centered on `center`.
///
/// Returns `None` for [`NodeShape::Plaintext`], which has no outline.
pub fn outline(shape: NodeShape, center: Point, size: Size, paint: Paint) -> Option<SvgNode> {
    let (cx, cy) = (center.x(), center.y());
    let (w, h) = (size.width(), size.height());
    let (left, top) = (cx - w / 2.0, cy - h / 2.0);
    let (right, bottom) = (cx + w / 2.0, cy + h / 2.0);

    let node: SvgNode = match shape {
        NodeShape::Plaintext => return None,
        NodeShape::Rectangle => Box::new(paint_rect(rect(left, top, w, h), paint)),
        NodeShape::Rounded => Box::new(paint_rect(rect(left, top, w, h).set("rx", 8.0), paint)),
        NodeShape::Stadium => Box::new(paint_rect(
            rect(left, top, w, h).set("rx", h / 2.0),
            paint,
        )),
        NodeShape::Subroutine => {
            let inset = 8.0_f32.min(w / 4.0);
            let group = svg_element::Group::new()
                .add(paint_rect(rect(left, top, w, h), paint))
                .add(line(left + inset, top, left + inset, bottom, paint.stroke))
                .add(line(right - inset, top, right - inset, bottom, paint.stroke));
            Box::new(group)
        }
        NodeShape::Cylinder => {
            let ry = 8.0_f32.min(h / 4.0);
            let rx = w / 2.0;
            let body = format!(
                "M {left} {t} A {rx} {ry} 0 0 1 {right} {t} L {right} {b} A {rx} {ry} 0 0 1 {left} {b} Z",
                t = top + ry,
                b = bottom - ry,
            );
            let rim = format!("M {left} {t} A {rx} {ry} 0 0 0 {right} {t}", t = top + ry);
            let group = svg_element::Group::new()
                .add(paint_path(body, paint))
                .add(
                    svg_element::Path::new()
                        .set("d", rim)
                        .set("fill", "none")
                        .set("stroke", paint.stroke),
                );
            Box::new(group)
        }
        NodeShape::Ellipse => Box::new(paint_ellipse(cx, cy, w / 2.0, h / 2.0, paint)),
        NodeShape::Circle => Box::new(paint_ellipse(cx, cy, w / 2.0, w / 2.0, paint)),
        NodeShape::DoubleCircle => {
            let r = w / 2.0;
            let group = svg_element::Group::new()
                .add(paint_ellipse(cx, cy, r, r, paint))
                .add(
                    svg_element::Circle::new()
                        .set("cx", cx)
                        .set("cy", cy)
                        .set("r", (r - 4.0).max(1.0))
                        .set("fill", "none")
                        .set("stroke", paint.stroke),
                );
            Box::new(group)
        }
        NodeShape::Diamond => Box::new(paint_polygon(
            &[
                Point::new(cx, top),
                Point::new(right, cy),
                Point::new(cx, bottom),
                Point::new(left, cy),
            ],
            paint,
        )),
        NodeShape::Hexagon => {
            let inset = (h / 4.0).min(w / 4.0);
            Box::new(paint_polygon(
                &[
                    Point::new(left + inset, top),
                    Point::new(right - inset, top),
                    Point::new(right, cy),
                    Point::new(right - inset, bottom),
                    Point::new(left + inset, bottom),
                    Point::new(left, cy),
                ],
                paint,
            ))
        }
        NodeShape::Asymmetric => {
            let notch = (h / 4.0).min(w / 4.0);
            Box::new(paint_polygon(
                &[
                    Point::new(left, top),
                    Point::new(right, top),
                    Point::new(right, bottom),
                    Point::new(left, bottom),
                    Point::new(left + notch, cy),
                ],
                paint,
            ))
        }
    };
    Some(node)
}

fn rect(x: f32, y: f32, width: f32, height: f32) -> svg_element::Rectangle {
    svg_element::Rectangle::new()
        .set("x", x)
        .set("y", y)
        .set("width", width)
        .set("height", height)
}

fn paint_rect(rect: svg_element::Rectangle, paint: Paint) -> svg_element::Rectangle {
    rect.set("fill", paint.fill)
        .set("fill-opacity", paint.fill.alpha())
        .set("stroke", paint.stroke)
}

fn paint_ellipse(cx: f32, cy: f32, rx: f32, ry: f32, paint: Paint) -> svg_element::Ellipse {
    svg_element::Ellipse::new()
        .set("cx", cx)
        .set("cy", cy)
        .set("rx", rx)
        .set("ry", ry)
        .set("fill", paint.fill)
        .set("fill-opacity", paint.fill.alpha())
        .set("stroke", paint.stroke)
}

fn paint_polygon(points: &[Point], paint: Paint) -> svg_element::Polygon {
    let points = points
        .iter()
        .map(|p| format!("{},{}", p.x(), p.y()))
        .collect::<Vec<_>>()
        .join(" ");
    svg_element::Polygon::new()
        .set("points", points)
        .set("fill", paint.fill)
        .set("fill-opacity", paint.fill.alpha())
        .set("stroke", paint.stroke)
}

fn paint_path(data: String, paint: Paint) -> svg_element::Path {
    svg_element::Path::new()
        .set("d", data)
        .set("fill", paint.fill)
        .set("fill-opacity", paint.fill.alpha())
        .set("stroke", paint.stroke)
}

fn line(x1: f32, y1: f32, x2: f32, y2: f32, stroke: Color) -> svg_element::Line {
    svg_element::Line::new()
        .set("x1", x1)
        .set("y1", y1)
        .set("x2", x2)
        .set("y2", y2)
        .set("stroke", stroke)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paint() -> Paint {
        Paint {
            fill: Color::new("white").unwrap(),
            stroke: Color::new("black").unwrap(),
        }
    }

    fn draw(shape: NodeShape) -> Option<String> {
        outline(shape, Point::new(50.0, 50.0), Size::new(40.0, 20.0), paint())
            .map(|node| node.to_string())
    }

    #[test]
    fn test_plaintext_has_no_outline() {
        assert!(draw(NodeShape::Plaintext).is_none());
    }

    #[test]
    fn test_outline_elements() {
        assert!(draw(NodeShape::Rectangle).unwrap().starts_with("<rect"));
        assert!(draw(NodeShape::Ellipse).unwrap().starts_with("<ellipse"));
        assert!(draw(NodeShape::Diamond).unwrap().contains("50,40 70,50 50,60 30,50"));
        assert!(draw(NodeShape::Stadium).unwrap().contains("rx=\"10\""));
        assert_eq!(draw(NodeShape::DoubleCircle).unwrap().matches("stroke=").count(), 2);
    }
}
