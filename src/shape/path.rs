use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::str::FromStr;

use crate::foundation::core::{BezPath, Point, Rect, Vec2};
use crate::foundation::error::{DpError, DpResult};

const ARC_TOLERANCE: f64 = 0.1;
const ROUNDED_CORNER_RATIO: f64 = 0.2;
const STAR_SPIKES: usize = 5;
const STAR_INNER_DIVISOR: f64 = 2.5;
const HEART_TOP_CURVE_RATIO: f64 = 0.3;

/// Outline used to mask the attendee photo.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PlaceholderShape {
    #[default]
    Circle,
    Square,
    RoundedSquare,
    Hexagon,
    Star,
    Heart,
}

impl PlaceholderShape {
    pub const ALL: [PlaceholderShape; 6] = [
        PlaceholderShape::Circle,
        PlaceholderShape::Square,
        PlaceholderShape::RoundedSquare,
        PlaceholderShape::Hexagon,
        PlaceholderShape::Star,
        PlaceholderShape::Heart,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PlaceholderShape::Circle => "circle",
            PlaceholderShape::Square => "square",
            PlaceholderShape::RoundedSquare => "rounded-square",
            PlaceholderShape::Hexagon => "hexagon",
            PlaceholderShape::Star => "star",
            PlaceholderShape::Heart => "heart",
        }
    }
}

impl fmt::Display for PlaceholderShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceholderShape {
    type Err = DpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlaceholderShape::ALL
            .into_iter()
            .find(|shape| shape.as_str() == s.trim())
            .ok_or_else(|| DpError::invalid_argument(format!("unknown placeholder shape '{s}'")))
    }
}

/// How a shape outline is put on the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
    /// Outline only (dashed in the editor).
    Stroke,
    /// Solid interior; also the clip mask.
    Fill,
}

/// One canvas-style path construction command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CurveTo(Point, Point, Point),
    /// Circular arc; angles in radians, positive sweep is clockwise in y-down space.
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        sweep_angle: f64,
    },
    ClosePath,
}

/// Path construction commands for one placeholder outline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathGeometry {
    commands: Vec<PathCommand>,
}

impl PathGeometry {
    fn push(&mut self, cmd: PathCommand) {
        self.commands.push(cmd);
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.commands.last(), Some(PathCommand::ClosePath))
    }

    /// Explicit polygon vertices (move/line endpoints) in command order.
    pub fn vertices(&self) -> Vec<Point> {
        self.commands
            .iter()
            .filter_map(|cmd| match *cmd {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// Exact bounds of the outline (curves use their true extrema, arcs their axis crossings).
    pub fn bounds(&self) -> Rect {
        use kurbo::{CubicBez, ParamCurveExtrema, QuadBez};

        let mut acc: Option<Rect> = None;
        let mut include = |r: Rect| {
            acc = Some(match acc {
                Some(a) => a.union(r),
                None => r,
            });
        };
        let mut current = Point::ZERO;

        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => {
                    include(Rect::from_points(p, p));
                    current = p;
                }
                PathCommand::QuadTo(c, p) => {
                    include(QuadBez::new(current, c, p).bounding_box());
                    current = p;
                }
                PathCommand::CurveTo(c1, c2, p) => {
                    include(CubicBez::new(current, c1, c2, p).bounding_box());
                    current = p;
                }
                PathCommand::Arc {
                    center,
                    radius,
                    start_angle,
                    sweep_angle,
                } => {
                    let at = |a: f64| center + Vec2::from_angle(a) * radius;
                    let start = at(start_angle);
                    let end = at(start_angle + sweep_angle);
                    include(Rect::from_points(start, end));
                    let (lo, hi) = if sweep_angle >= 0.0 {
                        (start_angle, start_angle + sweep_angle)
                    } else {
                        (start_angle + sweep_angle, start_angle)
                    };
                    let mut k = (lo / FRAC_PI_2).ceil();
                    while k * FRAC_PI_2 <= hi {
                        let p = at(k * FRAC_PI_2);
                        include(Rect::from_points(p, p));
                        k += 1.0;
                    }
                    current = end;
                }
                PathCommand::ClosePath => {}
            }
        }

        acc.unwrap_or(Rect::ZERO)
    }

    /// Flatten into a `kurbo` path. Arcs become cubic segments.
    pub fn to_bezpath(&self) -> BezPath {
        let mut out = BezPath::new();
        let mut has_current = false;
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) => {
                    out.move_to(p);
                    has_current = true;
                }
                PathCommand::LineTo(p) => {
                    out.line_to(p);
                    has_current = true;
                }
                PathCommand::QuadTo(c, p) => out.quad_to(c, p),
                PathCommand::CurveTo(c1, c2, p) => out.curve_to(c1, c2, p),
                PathCommand::Arc {
                    center,
                    radius,
                    start_angle,
                    sweep_angle,
                } => {
                    let arc = kurbo::Arc {
                        center,
                        radii: Vec2::new(radius, radius),
                        start_angle,
                        sweep_angle,
                        x_rotation: 0.0,
                    };
                    let start = center + Vec2::from_angle(start_angle) * radius;
                    // Canvas semantics: an arc continues the current subpath with a line.
                    if has_current {
                        out.line_to(start);
                    } else {
                        out.move_to(start);
                        has_current = true;
                    }
                    for el in arc.append_iter(ARC_TOLERANCE) {
                        out.push(el);
                    }
                }
                PathCommand::ClosePath => out.close_path(),
            }
        }
        out
    }

    /// SVG path data for the outline.
    pub fn to_svg(&self) -> String {
        self.to_bezpath().to_svg()
    }
}

/// Build the outline of `shape` inside the box `(x, y, width, height)`.
pub fn build_path(
    shape: PlaceholderShape,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> DpResult<PathGeometry> {
    if ![x, y, width, height].iter().all(|v| v.is_finite()) {
        return Err(DpError::invalid_argument(
            "shape box coordinates must be finite",
        ));
    }
    if width <= 0.0 || height <= 0.0 {
        return Err(DpError::invalid_argument(
            "shape box width and height must be > 0",
        ));
    }

    let mut g = PathGeometry::default();
    match shape {
        PlaceholderShape::Circle => circle(&mut g, x, y, width, height),
        PlaceholderShape::Square => square(&mut g, x, y, width, height),
        PlaceholderShape::RoundedSquare => rounded_square(&mut g, x, y, width, height),
        PlaceholderShape::Hexagon => hexagon(&mut g, x, y, width, height),
        PlaceholderShape::Star => star(&mut g, x, y, width, height),
        PlaceholderShape::Heart => heart(&mut g, x, y, width, height),
    }
    Ok(g)
}

/// Convenience wrapper for callers holding a rectangle.
pub fn build_path_in(shape: PlaceholderShape, rect: Rect) -> DpResult<PathGeometry> {
    build_path(shape, rect.x0, rect.y0, rect.width(), rect.height())
}

fn circle(g: &mut PathGeometry, x: f64, y: f64, width: f64, height: f64) {
    // Compatibility: the radius only follows `width`. Non-square boxes keep the circle centred
    // but overflow or underfill vertically; circle placeholders are authored square.
    g.push(PathCommand::Arc {
        center: Point::new(x + width / 2.0, y + height / 2.0),
        radius: width / 2.0,
        start_angle: 0.0,
        sweep_angle: TAU,
    });
    g.push(PathCommand::ClosePath);
}

fn square(g: &mut PathGeometry, x: f64, y: f64, width: f64, height: f64) {
    g.push(PathCommand::MoveTo(Point::new(x, y)));
    g.push(PathCommand::LineTo(Point::new(x + width, y)));
    g.push(PathCommand::LineTo(Point::new(x + width, y + height)));
    g.push(PathCommand::LineTo(Point::new(x, y + height)));
    g.push(PathCommand::ClosePath);
}

fn rounded_square(g: &mut PathGeometry, x: f64, y: f64, width: f64, height: f64) {
    let r = width.min(height) * ROUNDED_CORNER_RATIO;
    let (r0, b0) = (x + width, y + height);
    g.push(PathCommand::MoveTo(Point::new(x + r, y)));
    g.push(PathCommand::LineTo(Point::new(r0 - r, y)));
    g.push(PathCommand::QuadTo(Point::new(r0, y), Point::new(r0, y + r)));
    g.push(PathCommand::LineTo(Point::new(r0, b0 - r)));
    g.push(PathCommand::QuadTo(Point::new(r0, b0), Point::new(r0 - r, b0)));
    g.push(PathCommand::LineTo(Point::new(x + r, b0)));
    g.push(PathCommand::QuadTo(Point::new(x, b0), Point::new(x, b0 - r)));
    g.push(PathCommand::LineTo(Point::new(x, y + r)));
    g.push(PathCommand::QuadTo(Point::new(x, y), Point::new(x + r, y)));
    g.push(PathCommand::ClosePath);
}

fn hexagon(g: &mut PathGeometry, x: f64, y: f64, width: f64, height: f64) {
    let q = height / 4.0;
    let cx = x + width / 2.0;
    g.push(PathCommand::MoveTo(Point::new(cx, y)));
    g.push(PathCommand::LineTo(Point::new(x + width, y + q)));
    g.push(PathCommand::LineTo(Point::new(x + width, y + height - q)));
    g.push(PathCommand::LineTo(Point::new(cx, y + height)));
    g.push(PathCommand::LineTo(Point::new(x, y + height - q)));
    g.push(PathCommand::LineTo(Point::new(x, y + q)));
    g.push(PathCommand::ClosePath);
}

fn star(g: &mut PathGeometry, x: f64, y: f64, width: f64, height: f64) {
    let center = Point::new(x + width / 2.0, y + height / 2.0);
    let outer = width / 2.0;
    let inner = outer / STAR_INNER_DIVISOR;
    let step = PI / STAR_SPIKES as f64;
    // Straight up in y-down space.
    let mut rot = PI / 2.0 * 3.0;

    for i in 0..STAR_SPIKES * 2 {
        let radius = if i % 2 == 0 { outer } else { inner };
        let p = center + Vec2::from_angle(rot) * radius;
        if i == 0 {
            g.push(PathCommand::MoveTo(p));
        } else {
            g.push(PathCommand::LineTo(p));
        }
        rot += step;
    }
    g.push(PathCommand::ClosePath);
}

fn heart(g: &mut PathGeometry, x: f64, y: f64, width: f64, height: f64) {
    let top = height * HEART_TOP_CURVE_RATIO;
    let cx = x + width / 2.0;
    let mid = y + (height + top) / 2.0;
    let notch = Point::new(cx, y + top);
    let bottom = Point::new(cx, y + height);

    g.push(PathCommand::MoveTo(notch));
    g.push(PathCommand::CurveTo(
        Point::new(cx, y),
        Point::new(x, y),
        Point::new(x, y + top),
    ));
    g.push(PathCommand::CurveTo(
        Point::new(x, mid),
        Point::new(cx, mid),
        bottom,
    ));
    g.push(PathCommand::CurveTo(
        Point::new(cx, mid),
        Point::new(x + width, mid),
        Point::new(x + width, y + top),
    ));
    g.push(PathCommand::CurveTo(
        Point::new(x + width, y),
        Point::new(cx, y),
        notch,
    ));
    g.push(PathCommand::ClosePath);
}

#[cfg(test)]
#[path = "../../tests/unit/shape/path.rs"]
mod tests;
