use std::f64::consts::PI;

use kurbo::Shape;

use crate::foundation::core::{BezPath, Point, Rect, Vec2};

const GLYPH_TOLERANCE: f64 = 0.1;

/// Person silhouette drawn in an empty photo placeholder, centred in `bounds`.
pub fn placeholder_glyph(bounds: Rect) -> BezPath {
    let size = bounds.width().min(bounds.height()) * 0.4;
    let c = bounds.center();

    let mut out = BezPath::new();
    let head = kurbo::Circle::new(Point::new(c.x, c.y - size * 0.18), size * 0.2);
    for el in head.path_elements(GLYPH_TOLERANCE) {
        out.push(el);
    }

    // Shoulders: upper half of an ellipse, closed along its diameter.
    let torso = kurbo::Arc {
        center: Point::new(c.x, c.y + size * 0.42),
        radii: Vec2::new(size * 0.38, size * 0.3),
        start_angle: PI,
        sweep_angle: PI,
        x_rotation: 0.0,
    };
    out.move_to(Point::new(c.x - size * 0.38, c.y + size * 0.42));
    for el in torso.append_iter(GLYPH_TOLERANCE) {
        out.push(el);
    }
    out.close_path();
    out
}
