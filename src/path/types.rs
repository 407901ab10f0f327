use std::fmt;
use std::ops::{Add, Sub};

use kurbo::Vec2;

/// 2D point in path coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Mirror this point through `center`.
    pub fn reflect(self, center: Point) -> Self {
        Point::new(2.0 * center.x - self.x, 2.0 * center.y - self.y)
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<Point> for kurbo::Point {
    fn from(p: Point) -> Self {
        kurbo::Point::new(p.x, p.y)
    }
}

impl From<kurbo::Point> for Point {
    fn from(p: kurbo::Point) -> Self {
        Point::new(p.x, p.y)
    }
}

/// Segment kind without its coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Line,
    CubicBezier,
    QuadraticBezier,
    Arc,
    PolyLine,
    PolyCubicBezier,
    PolyQuadraticBezier,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SegmentKind::Line => "line",
            SegmentKind::CubicBezier => "cubic",
            SegmentKind::QuadraticBezier => "quadratic",
            SegmentKind::Arc => "arc",
            SegmentKind::PolyLine => "poly-line",
            SegmentKind::PolyCubicBezier => "poly-cubic",
            SegmentKind::PolyQuadraticBezier => "poly-quadratic",
        };
        f.write_str(name)
    }
}

/// One drawing primitive of a figure. The implicit start point is the
/// terminal point of the previous segment (or the figure start).
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Line {
        end: Point,
    },
    CubicBezier {
        c1: Point,
        c2: Point,
        end: Point,
    },
    QuadraticBezier {
        c1: Point,
        end: Point,
    },
    Arc {
        end: Point,
        radii: Vec2,
        /// x-axis rotation in degrees
        rotation: f64,
        large_arc: bool,
        sweep: bool,
    },
    PolyLine {
        points: Vec<Point>,
    },
    /// Control, control, end triples
    PolyCubicBezier {
        points: Vec<Point>,
    },
    /// Control, end pairs
    PolyQuadraticBezier {
        points: Vec<Point>,
    },
}

/// The prefix of `points` made of complete groups of `size`
pub(crate) fn whole_groups(points: &[Point], size: usize) -> &[Point] {
    &points[..points.len() - points.len() % size]
}

impl Segment {
    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::Line { .. } => SegmentKind::Line,
            Segment::CubicBezier { .. } => SegmentKind::CubicBezier,
            Segment::QuadraticBezier { .. } => SegmentKind::QuadraticBezier,
            Segment::Arc { .. } => SegmentKind::Arc,
            Segment::PolyLine { .. } => SegmentKind::PolyLine,
            Segment::PolyCubicBezier { .. } => SegmentKind::PolyCubicBezier,
            Segment::PolyQuadraticBezier { .. } => SegmentKind::PolyQuadraticBezier,
        }
    }

    /// The point the next segment starts from.
    ///
    /// A trailing partial group of a poly Bezier is not drawn, so the
    /// terminal is the end of the last whole group.
    pub fn terminal(&self) -> Option<Point> {
        match self {
            Segment::Line { end }
            | Segment::CubicBezier { end, .. }
            | Segment::QuadraticBezier { end, .. }
            | Segment::Arc { end, .. } => Some(*end),
            Segment::PolyLine { points } => points.last().copied(),
            Segment::PolyCubicBezier { points } => whole_groups(points, 3).last().copied(),
            Segment::PolyQuadraticBezier { points } => whole_groups(points, 2).last().copied(),
        }
    }

    /// Editable coordinates in slot order.
    pub fn points(&self) -> Vec<Point> {
        match self {
            Segment::Line { end } | Segment::Arc { end, .. } => vec![*end],
            Segment::CubicBezier { c1, c2, end } => vec![*c1, *c2, *end],
            Segment::QuadraticBezier { c1, end } => vec![*c1, *end],
            Segment::PolyLine { points }
            | Segment::PolyCubicBezier { points }
            | Segment::PolyQuadraticBezier { points } => points.clone(),
        }
    }

    pub fn point_count(&self) -> usize {
        match self {
            Segment::Line { .. } | Segment::Arc { .. } => 1,
            Segment::CubicBezier { .. } => 3,
            Segment::QuadraticBezier { .. } => 2,
            Segment::PolyLine { points }
            | Segment::PolyCubicBezier { points }
            | Segment::PolyQuadraticBezier { points } => points.len(),
        }
    }

    pub fn point(&self, slot: usize) -> Option<Point> {
        match self {
            Segment::Line { end } | Segment::Arc { end, .. } => (slot == 0).then_some(*end),
            Segment::CubicBezier { c1, c2, end } => match slot {
                0 => Some(*c1),
                1 => Some(*c2),
                2 => Some(*end),
                _ => None,
            },
            Segment::QuadraticBezier { c1, end } => match slot {
                0 => Some(*c1),
                1 => Some(*end),
                _ => None,
            },
            Segment::PolyLine { points }
            | Segment::PolyCubicBezier { points }
            | Segment::PolyQuadraticBezier { points } => points.get(slot).copied(),
        }
    }

    pub fn point_mut(&mut self, slot: usize) -> Option<&mut Point> {
        match self {
            Segment::Line { end } | Segment::Arc { end, .. } => (slot == 0).then_some(end),
            Segment::CubicBezier { c1, c2, end } => match slot {
                0 => Some(c1),
                1 => Some(c2),
                2 => Some(end),
                _ => None,
            },
            Segment::QuadraticBezier { c1, end } => match slot {
                0 => Some(c1),
                1 => Some(end),
                _ => None,
            },
            Segment::PolyLine { points }
            | Segment::PolyCubicBezier { points }
            | Segment::PolyQuadraticBezier { points } => points.get_mut(slot),
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        for slot in 0..self.point_count() {
            if let Some(p) = self.point_mut(slot) {
                *p = p.offset(dx, dy);
            }
        }
    }
}

/// A sub-path: start point plus ordered segments
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub start: Point,
    pub segments: Vec<Segment>,
    pub closed: bool,
}

impl Figure {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            segments: Vec::new(),
            closed: false,
        }
    }

    /// Terminal point of the last segment, or the start point.
    pub fn terminal(&self) -> Point {
        self.segments
            .iter()
            .rev()
            .find_map(Segment::terminal)
            .unwrap_or(self.start)
    }

    /// Start point plus every segment coordinate.
    pub fn point_count(&self) -> usize {
        1 + self.segments.iter().map(Segment::point_count).sum::<usize>()
    }

    /// Offset the start point and every segment coordinate by (dx, dy).
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.start = self.start.offset(dx, dy);
        for seg in &mut self.segments {
            seg.translate(dx, dy);
        }
    }
}

/// Where one editable coordinate lives inside a figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointSlot {
    Start,
    Segment { segment: usize, point: usize },
}

/// Index path to one editable coordinate of a [`Path`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointRef {
    pub figure: usize,
    pub slot: PointSlot,
}

impl PointRef {
    pub fn start(figure: usize) -> Self {
        Self {
            figure,
            slot: PointSlot::Start,
        }
    }

    pub fn segment(figure: usize, segment: usize, point: usize) -> Self {
        Self {
            figure,
            slot: PointSlot::Segment { segment, point },
        }
    }
}

impl fmt::Display for PointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot {
            PointSlot::Start => write!(f, "figure {} start", self.figure),
            PointSlot::Segment { segment, point } => write!(
                f,
                "figure {} segment {} point {}",
                self.figure, segment, point
            ),
        }
    }
}

/// Ordered figures; the authoritative geometry
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub figures: Vec<Figure>,
}

impl Path {
    pub fn new(figures: Vec<Figure>) -> Self {
        Self { figures }
    }

    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }

    pub fn editable_point_count(&self) -> usize {
        self.figures.iter().map(Figure::point_count).sum()
    }

    pub fn point(&self, at: PointRef) -> Option<Point> {
        let figure = self.figures.get(at.figure)?;
        match at.slot {
            PointSlot::Start => Some(figure.start),
            PointSlot::Segment { segment, point } => figure.segments.get(segment)?.point(point),
        }
    }

    pub fn point_mut(&mut self, at: PointRef) -> Option<&mut Point> {
        let figure = self.figures.get_mut(at.figure)?;
        match at.slot {
            PointSlot::Start => Some(&mut figure.start),
            PointSlot::Segment { segment, point } => {
                figure.segments.get_mut(segment)?.point_mut(point)
            }
        }
    }

    /// Overwrite one coordinate. Returns false if `at` does not resolve.
    pub fn set_point(&mut self, at: PointRef, p: Point) -> bool {
        match self.point_mut(at) {
            Some(slot) => {
                *slot = p;
                true
            }
            None => false,
        }
    }

    /// Every editable coordinate with its index path, in overlay order.
    pub fn point_refs(&self) -> Vec<(PointRef, Point)> {
        let mut refs = Vec::with_capacity(self.editable_point_count());
        for (fi, figure) in self.figures.iter().enumerate() {
            refs.push((PointRef::start(fi), figure.start));
            for (si, seg) in figure.segments.iter().enumerate() {
                for (pi, p) in seg.points().into_iter().enumerate() {
                    refs.push((PointRef::segment(fi, si, pi), p));
                }
            }
        }
        refs
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::serialize::serialize(self))
    }
}
