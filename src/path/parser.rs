use kurbo::Vec2;
use svgtypes::{PathParser, PathSegment};
use tracing::debug;

use super::types::{Figure, Path, Point, Segment};
use crate::error::ParseError;

/// Parse SVG path data into a [`Path`].
///
/// Relative commands are resolved to absolute coordinates, `H`/`V` become
/// lines and `S`/`T` become curves with the reflected control point. Runs of
/// two or more lines, cubics or quadratics are grouped into poly segments.
pub fn parse(text: &str) -> Result<Path, ParseError> {
    let mut builder = PathBuilder::default();

    for segment in PathParser::from(text) {
        let segment = segment.map_err(|e| ParseError::new(e.to_string()))?;
        builder.push(segment)?;
    }

    let path = builder.finish();
    debug!(
        figures = path.figures.len(),
        points = path.editable_point_count(),
        "parsed path data"
    );
    Ok(path)
}

#[derive(Default)]
struct PathBuilder {
    figures: Vec<Figure>,
    current: Option<Figure>,
    pos: Point,
    subpath_start: Point,
    /// Second control point of the previous C/S command
    last_cubic_ctrl: Option<Point>,
    /// Control point of the previous Q/T command
    last_quad_ctrl: Option<Point>,
}

impl PathBuilder {
    fn push(&mut self, segment: PathSegment) -> Result<(), ParseError> {
        let mut cubic_ctrl = None;
        let mut quad_ctrl = None;

        match segment {
            PathSegment::MoveTo { abs, x, y } => {
                let to = self.resolve(abs, x, y);
                self.finish_figure();
                self.current = Some(Figure::new(to));
                self.subpath_start = to;
                self.pos = to;
            }
            PathSegment::LineTo { abs, x, y } => {
                let end = self.resolve(abs, x, y);
                self.append(Segment::Line { end })?;
            }
            PathSegment::HorizontalLineTo { abs, x } => {
                let x = if abs { x } else { self.pos.x + x };
                let end = Point::new(x, self.pos.y);
                self.append(Segment::Line { end })?;
            }
            PathSegment::VerticalLineTo { abs, y } => {
                let y = if abs { y } else { self.pos.y + y };
                let end = Point::new(self.pos.x, y);
                self.append(Segment::Line { end })?;
            }
            PathSegment::CurveTo {
                abs,
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                let c1 = self.resolve(abs, x1, y1);
                let c2 = self.resolve(abs, x2, y2);
                let end = self.resolve(abs, x, y);
                self.append(Segment::CubicBezier { c1, c2, end })?;
                cubic_ctrl = Some(c2);
            }
            PathSegment::SmoothCurveTo { abs, x2, y2, x, y } => {
                let c1 = self
                    .last_cubic_ctrl
                    .map(|c| c.reflect(self.pos))
                    .unwrap_or(self.pos);
                let c2 = self.resolve(abs, x2, y2);
                let end = self.resolve(abs, x, y);
                self.append(Segment::CubicBezier { c1, c2, end })?;
                cubic_ctrl = Some(c2);
            }
            PathSegment::Quadratic { abs, x1, y1, x, y } => {
                let c1 = self.resolve(abs, x1, y1);
                let end = self.resolve(abs, x, y);
                self.append(Segment::QuadraticBezier { c1, end })?;
                quad_ctrl = Some(c1);
            }
            PathSegment::SmoothQuadratic { abs, x, y } => {
                let c1 = self
                    .last_quad_ctrl
                    .map(|c| c.reflect(self.pos))
                    .unwrap_or(self.pos);
                let end = self.resolve(abs, x, y);
                self.append(Segment::QuadraticBezier { c1, end })?;
                quad_ctrl = Some(c1);
            }
            PathSegment::EllipticalArc {
                abs,
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                x,
                y,
            } => {
                let end = self.resolve(abs, x, y);
                self.append(Segment::Arc {
                    end,
                    radii: Vec2::new(rx, ry),
                    rotation: x_axis_rotation,
                    large_arc,
                    sweep,
                })?;
            }
            PathSegment::ClosePath { .. } => {
                if let Some(mut figure) = self.current.take() {
                    figure.closed = true;
                    self.figures.push(figure);
                }
                self.pos = self.subpath_start;
            }
        }

        self.last_cubic_ctrl = cubic_ctrl;
        self.last_quad_ctrl = quad_ctrl;
        Ok(())
    }

    fn resolve(&self, abs: bool, x: f64, y: f64) -> Point {
        if abs {
            Point::new(x, y)
        } else {
            self.pos.offset(x, y)
        }
    }

    /// Add a segment to the open figure. A drawing command right after `Z`
    /// opens a new figure at the previous start point.
    fn append(&mut self, segment: Segment) -> Result<(), ParseError> {
        if self.current.is_none() {
            if self.figures.is_empty() {
                return Err(ParseError::new(
                    "path data must begin with a move command".to_string(),
                ));
            }
            self.current = Some(Figure::new(self.subpath_start));
        }

        if let Some(end) = segment.terminal() {
            self.pos = end;
        }
        if let Some(figure) = self.current.as_mut() {
            figure.segments.push(segment);
        }
        Ok(())
    }

    fn finish_figure(&mut self) {
        if let Some(figure) = self.current.take() {
            self.figures.push(figure);
        }
    }

    fn finish(mut self) -> Path {
        self.finish_figure();
        let figures = self
            .figures
            .into_iter()
            .map(|mut figure| {
                figure.segments = group_runs(figure.segments);
                figure
            })
            .collect();
        Path::new(figures)
    }
}

/// Merge consecutive single lines, cubics and quadratics into poly segments.
fn group_runs(segments: Vec<Segment>) -> Vec<Segment> {
    let mut grouped: Vec<Segment> = Vec::with_capacity(segments.len());
    let mut run: Vec<Segment> = Vec::new();

    for seg in segments {
        let groupable = matches!(
            seg,
            Segment::Line { .. } | Segment::CubicBezier { .. } | Segment::QuadraticBezier { .. }
        );
        let same_kind = run.first().is_some_and(|first| first.kind() == seg.kind());

        if !same_kind {
            flush_run(&mut run, &mut grouped);
        }
        if groupable {
            run.push(seg);
        } else {
            grouped.push(seg);
        }
    }
    flush_run(&mut run, &mut grouped);

    grouped
}

fn flush_run(run: &mut Vec<Segment>, out: &mut Vec<Segment>) {
    if run.len() < 2 {
        out.append(run);
        return;
    }

    let points: Vec<Point> = run.iter().flat_map(Segment::points).collect();
    let merged = match run[0] {
        Segment::Line { .. } => Segment::PolyLine { points },
        Segment::CubicBezier { .. } => Segment::PolyCubicBezier { points },
        _ => Segment::PolyQuadraticBezier { points },
    };
    run.clear();
    out.push(merged);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::SegmentKind;

    fn kinds(path: &Path, figure: usize) -> Vec<SegmentKind> {
        path.figures[figure]
            .segments
            .iter()
            .map(Segment::kind)
            .collect()
    }

    #[test]
    fn test_parse_single_line() {
        let path = parse("M0,0 L10,0").unwrap();
        assert_eq!(path.figures.len(), 1);
        assert_eq!(
            path.figures[0].segments,
            vec![Segment::Line {
                end: Point::new(10.0, 0.0)
            }]
        );
        assert!(!path.figures[0].closed);
    }

    #[test]
    fn test_parse_groups_consecutive_lines() {
        let path = parse("M0,0 L10,0 L10,10").unwrap();
        assert_eq!(kinds(&path, 0), vec![SegmentKind::PolyLine]);
        assert_eq!(path.editable_point_count(), 3);
    }

    #[test]
    fn test_parse_relative_and_axis_commands() {
        let path = parse("m5,5 h10 v5 l-2,-1").unwrap();
        assert_eq!(
            path.figures[0].segments,
            vec![Segment::PolyLine {
                points: vec![
                    Point::new(15.0, 5.0),
                    Point::new(15.0, 10.0),
                    Point::new(13.0, 9.0),
                ]
            }]
        );
    }

    #[test]
    fn test_parse_smooth_cubic_reflects_control() {
        let path = parse("M0,0 C0,5 5,10 10,10 S20,5 20,0").unwrap();
        let Segment::PolyCubicBezier { points } = &path.figures[0].segments[0] else {
            panic!("expected poly cubic");
        };
        assert_eq!(points[3], Point::new(15.0, 10.0));
        assert_eq!(points[5], Point::new(20.0, 0.0));
    }

    #[test]
    fn test_parse_smooth_quadratic_without_previous_uses_current_point() {
        let path = parse("M0,0 L4,0 T8,4").unwrap();
        assert_eq!(
            path.figures[0].segments[1],
            Segment::QuadraticBezier {
                c1: Point::new(4.0, 0.0),
                end: Point::new(8.0, 4.0)
            }
        );
    }

    #[test]
    fn test_parse_arc_is_never_grouped() {
        let path = parse("M0,0 A5,5 30 0 1 10,0 A5,5 0 1 0 20,0").unwrap();
        assert_eq!(kinds(&path, 0), vec![SegmentKind::Arc, SegmentKind::Arc]);
        let Segment::Arc {
            radii,
            rotation,
            large_arc,
            sweep,
            ..
        } = &path.figures[0].segments[0]
        else {
            panic!("expected arc");
        };
        assert_eq!(*radii, Vec2::new(5.0, 5.0));
        assert_eq!(*rotation, 30.0);
        assert!(!*large_arc);
        assert!(*sweep);
    }

    #[test]
    fn test_parse_close_then_draw_starts_new_figure() {
        let path = parse("M1,1 L5,1 L5,5 Z L0,9").unwrap();
        assert_eq!(path.figures.len(), 2);
        assert!(path.figures[0].closed);
        assert_eq!(path.figures[1].start, Point::new(1.0, 1.0));
        assert!(!path.figures[1].closed);
    }

    #[test]
    fn test_parse_mixed_kinds_keep_order() {
        let path = parse("M0,0 L1,0 Q2,0 2,1 L3,3 L4,4").unwrap();
        assert_eq!(
            kinds(&path, 0),
            vec![
                SegmentKind::Line,
                SegmentKind::QuadraticBezier,
                SegmentKind::PolyLine
            ]
        );
    }

    #[test]
    fn test_parse_empty_text() {
        let path = parse("   ").unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_parse_malformed_text() {
        let err = parse("M0,0 L10").unwrap_err();
        assert!(!err.message.is_empty());
        assert!(parse("M 0,0 X 5,5").is_err());
    }
}
