use kurbo::{Arc, BezPath, Line, ParamCurveNearest, PathEl, Rect, Shape, SvgArc};

use super::types::{Figure, Path, Point, Segment};

/// Tolerance used when arcs are approximated by cubic curves
const ARC_TOLERANCE: f64 = 0.01;
/// Flattening tolerance for stroke hit testing
const FLATTEN_TOLERANCE: f64 = 0.05;

/// Convert a figure into kurbo path elements, appending to `bez`.
fn append_figure(bez: &mut BezPath, figure: &Figure) {
    bez.move_to(figure.start);
    let mut current = figure.start;

    for seg in &figure.segments {
        match seg {
            Segment::Line { end } => bez.line_to(*end),
            Segment::CubicBezier { c1, c2, end } => bez.curve_to(*c1, *c2, *end),
            Segment::QuadraticBezier { c1, end } => bez.quad_to(*c1, *end),
            Segment::Arc {
                end,
                radii,
                rotation,
                large_arc,
                sweep,
            } => {
                let svg_arc = SvgArc {
                    from: current.into(),
                    to: (*end).into(),
                    radii: *radii,
                    x_rotation: rotation.to_radians(),
                    large_arc: *large_arc,
                    sweep: *sweep,
                };
                match Arc::from_svg_arc(&svg_arc) {
                    Some(arc) => bez.extend(arc.append_iter(ARC_TOLERANCE)),
                    // Degenerate radii draw a straight line
                    None => bez.line_to(*end),
                }
            }
            Segment::PolyLine { points } => {
                for p in points {
                    bez.line_to(*p);
                }
            }
            Segment::PolyCubicBezier { points } => {
                for triple in points.chunks_exact(3) {
                    bez.curve_to(triple[0], triple[1], triple[2]);
                }
            }
            Segment::PolyQuadraticBezier { points } => {
                for pair in points.chunks_exact(2) {
                    bez.quad_to(pair[0], pair[1]);
                }
            }
        }
        if let Some(end) = seg.terminal() {
            current = end;
        }
    }

    if figure.closed {
        bez.close_path();
    }
}

/// Build a kurbo [`BezPath`] for a single figure
pub fn figure_to_bez_path(figure: &Figure) -> BezPath {
    let mut bez = BezPath::new();
    append_figure(&mut bez, figure);
    bez
}

/// Build a kurbo [`BezPath`] for the whole path
pub fn to_bez_path(path: &Path) -> BezPath {
    let mut bez = BezPath::new();
    for figure in &path.figures {
        append_figure(&mut bez, figure);
    }
    bez
}

fn stroked(rect: Rect, stroke_width: f64) -> Rect {
    let half = stroke_width.max(0.0) / 2.0;
    rect.inflate(half, half)
}

/// Tight bounds of one figure. A figure with nothing drawn is its start point.
fn tight(figure: &Figure) -> Rect {
    let start = kurbo::Point::from(figure.start);
    figure_to_bez_path(figure)
        .segments()
        .map(|seg| seg.bounding_box())
        .fold(Rect::from_points(start, start), |acc, r| acc.union(r))
}

/// Bounding box of the stroked outline: the tight geometric bounds grown
/// by half the stroke width on every side. `None` for an empty path.
pub fn bounds(path: &Path, stroke_width: f64) -> Option<Rect> {
    path.figures
        .iter()
        .map(tight)
        .reduce(|acc, r| acc.union(r))
        .map(|r| stroked(r, stroke_width))
}

pub fn figure_bounds(figure: &Figure, stroke_width: f64) -> Rect {
    stroked(tight(figure), stroke_width)
}

/// Whether `point` lies in the figure's fill or within half the stroke
/// width (at least `tolerance`) of its outline.
pub fn figure_contains(figure: &Figure, point: Point, stroke_width: f64, tolerance: f64) -> bool {
    let bez = figure_to_bez_path(figure);
    let target: kurbo::Point = point.into();

    if figure.closed && bez.contains(target) {
        return true;
    }

    let reach = (stroke_width / 2.0).max(tolerance);
    let reach_sq = reach * reach;
    let mut last = None;
    let mut start = None;
    let mut hit = false;

    kurbo::flatten(bez.iter(), FLATTEN_TOLERANCE, |el| {
        if hit {
            return;
        }
        match el {
            PathEl::MoveTo(p) => {
                last = Some(p);
                start = Some(p);
            }
            PathEl::LineTo(p) => {
                if let Some(from) = last {
                    let nearest = Line::new(from, p).nearest(target, 1e-9);
                    hit = nearest.distance_sq <= reach_sq;
                }
                last = Some(p);
            }
            PathEl::ClosePath => {
                if let (Some(from), Some(to)) = (last, start) {
                    let nearest = Line::new(from, to).nearest(target, 1e-9);
                    hit = nearest.distance_sq <= reach_sq;
                }
                last = start;
            }
            // flatten only emits move, line and close elements
            _ => {}
        }
    });

    hit || (figure.segments.is_empty() && figure.start.distance(&point) <= reach)
}
