use tracing::trace;

use super::{
    ControlLine, ControlPointHandle, HandleId, LineEnd, LineId, Overlay, OverlayBox,
    OverlayOptions,
};
use crate::path::{Path, Point, PointRef, Segment};

struct OverlayBuilder {
    overlay: Overlay,
}

impl OverlayBuilder {
    fn new(box_side: f64) -> Self {
        Self {
            overlay: Overlay {
                box_side,
                ..Default::default()
            },
        }
    }

    fn add_handle(&mut self, target: PointRef, at: Point) -> HandleId {
        let o = &mut self.overlay;
        let id = HandleId(o.handles.len());
        o.handles.push(ControlPointHandle { id, target });
        o.boxes.push(OverlayBox {
            handle: id,
            center: at,
            side: o.box_side,
        });
        o.dependents.push(Vec::new());
        id
    }

    fn add_line(&mut self, anchor: HandleId, free: HandleId) -> LineId {
        let o = &mut self.overlay;
        let id = LineId(o.lines.len());
        o.lines.push(ControlLine {
            id,
            anchor,
            free,
            from: o.boxes[anchor.0].center,
            to: o.boxes[free.0].center,
        });
        o.dependents[anchor.0].push((id, LineEnd::Anchor));
        o.dependents[free.0].push((id, LineEnd::Free));
        id
    }

    /// Handles and lines for one cubic: `start -> c1` and `end -> c2`.
    fn add_cubic(&mut self, start: HandleId, at: [(PointRef, Point); 3]) -> HandleId {
        let [(r1, c1), (r2, c2), (re, end)] = at;
        let h1 = self.add_handle(r1, c1);
        let h2 = self.add_handle(r2, c2);
        let he = self.add_handle(re, end);
        self.add_line(start, h1);
        self.add_line(he, h2);
        he
    }

    /// Handles and line for one quadratic: `start -> c1`.
    fn add_quadratic(&mut self, start: HandleId, at: [(PointRef, Point); 2]) -> HandleId {
        let [(r1, c1), (re, end)] = at;
        let h1 = self.add_handle(r1, c1);
        let he = self.add_handle(re, end);
        self.add_line(start, h1);
        he
    }
}

/// Build handles, drag boxes and control lines for every editable
/// coordinate of `path`.
///
/// Control lines hang from the implicit start of their segment, which is
/// the previous segment's terminal handle (or the figure start), so moving
/// that joint also moves the line's anchor.
pub fn build_overlay(path: &Path, options: &OverlayOptions) -> Overlay {
    let mut b = OverlayBuilder::new(options.box_side());

    for (fi, figure) in path.figures.iter().enumerate() {
        let mut prev_end = b.add_handle(PointRef::start(fi), figure.start);

        for (si, seg) in figure.segments.iter().enumerate() {
            let at = |pi: usize, p: Point| (PointRef::segment(fi, si, pi), p);

            match seg {
                Segment::Line { end } | Segment::Arc { end, .. } => {
                    prev_end = b.add_handle(PointRef::segment(fi, si, 0), *end);
                }
                Segment::CubicBezier { c1, c2, end } => {
                    prev_end = b.add_cubic(prev_end, [at(0, *c1), at(1, *c2), at(2, *end)]);
                }
                Segment::QuadraticBezier { c1, end } => {
                    prev_end = b.add_quadratic(prev_end, [at(0, *c1), at(1, *end)]);
                }
                Segment::PolyLine { points } => {
                    for (pi, p) in points.iter().enumerate() {
                        prev_end = b.add_handle(PointRef::segment(fi, si, pi), *p);
                    }
                }
                Segment::PolyCubicBezier { points } => {
                    let mut triples = points.chunks_exact(3);
                    for (ti, t) in triples.by_ref().enumerate() {
                        let base = ti * 3;
                        prev_end = b.add_cubic(
                            prev_end,
                            [at(base, t[0]), at(base + 1, t[1]), at(base + 2, t[2])],
                        );
                    }
                    // A trailing partial triple is not drawn: boxes only, and
                    // the next segment keeps hanging from `Segment::terminal`
                    let base = points.len() - triples.remainder().len();
                    for (i, p) in triples.remainder().iter().enumerate() {
                        b.add_handle(PointRef::segment(fi, si, base + i), *p);
                    }
                }
                Segment::PolyQuadraticBezier { points } => {
                    let mut pairs = points.chunks_exact(2);
                    for (qi, q) in pairs.by_ref().enumerate() {
                        let base = qi * 2;
                        prev_end = b.add_quadratic(prev_end, [at(base, q[0]), at(base + 1, q[1])]);
                    }
                    // Same for a trailing partial pair
                    let base = points.len() - pairs.remainder().len();
                    for (i, p) in pairs.remainder().iter().enumerate() {
                        b.add_handle(PointRef::segment(fi, si, base + i), *p);
                    }
                }
            }
        }
    }

    let overlay = b.overlay;
    trace!(
        handles = overlay.handles.len(),
        lines = overlay.lines.len(),
        "built overlay"
    );
    overlay
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::parse;

    fn build(text: &str) -> Overlay {
        build_overlay(&parse(text).unwrap(), &OverlayOptions::default())
    }

    fn segments(overlay: &Overlay) -> Vec<(Point, Point)> {
        overlay.lines().iter().map(|l| (l.from, l.to)).collect()
    }

    #[test]
    fn test_lines_only() {
        let overlay = build("M0,0 L10,0 L10,10");
        assert_eq!(overlay.handles().len(), 3);
        assert_eq!(overlay.boxes().len(), 3);
        assert!(overlay.lines().is_empty());
    }

    #[test]
    fn test_single_cubic() {
        let overlay = build("M0,0 C2,0 8,10 10,10");
        assert_eq!(overlay.handles().len(), 4);
        assert_eq!(
            segments(&overlay),
            vec![
                (Point::new(0.0, 0.0), Point::new(2.0, 0.0)),
                (Point::new(10.0, 10.0), Point::new(8.0, 10.0)),
            ]
        );
        // start -> c1 and end -> c2
        assert_eq!(overlay.lines()[0].anchor, HandleId(0));
        assert_eq!(overlay.lines()[0].free, HandleId(1));
        assert_eq!(overlay.lines()[1].anchor, HandleId(3));
        assert_eq!(overlay.lines()[1].free, HandleId(2));
    }

    #[test]
    fn test_quadratic_and_arc() {
        let overlay = build("M0,0 Q5,5 10,0 A2,2 0 0 1 14,0");
        assert_eq!(overlay.handles().len(), 4);
        assert_eq!(
            segments(&overlay),
            vec![(Point::new(0.0, 0.0), Point::new(5.0, 5.0))]
        );
    }

    #[test]
    fn test_poly_cubic_anchors_follow_previous_end() {
        let overlay = build("M0,0 C1,0 2,1 3,3 C4,5 5,6 7,7");
        assert_eq!(overlay.handles().len(), 7);
        assert_eq!(overlay.lines().len(), 4);

        // Second triple hangs from the first triple's end point (handle 3)
        let third = overlay.lines()[2];
        assert_eq!(third.anchor, HandleId(3));
        assert_eq!(third.from, Point::new(3.0, 3.0));
        assert_eq!(third.to, Point::new(4.0, 5.0));
    }

    #[test]
    fn test_poly_quadratic_lines() {
        let overlay = build("M0,0 Q1,1 2,0 Q3,-1 4,0 Q5,1 6,0");
        assert_eq!(overlay.handles().len(), 7);
        let anchors: Vec<HandleId> = overlay.lines().iter().map(|l| l.anchor).collect();
        assert_eq!(anchors, vec![HandleId(0), HandleId(2), HandleId(4)]);
    }

    #[test]
    fn test_segment_after_line_anchors_at_line_end() {
        let overlay = build("M0,0 L4,0 Q6,2 8,0");
        assert_eq!(overlay.lines()[0].anchor, HandleId(1));
        assert_eq!(overlay.dependents(HandleId(1)), &[(LineId(0), LineEnd::Anchor)]);
        assert_eq!(overlay.dependents(HandleId(2)), &[(LineId(0), LineEnd::Free)]);
        assert!(overlay.dependents(HandleId(3)).is_empty());
    }

    #[test]
    fn test_handle_count_matches_editable_points() {
        let path = parse("M0,0 L1,1 2,2 C3,3 4,4 5,5 Q6,6 7,7 A1,1 0 0 0 9,9 Z M20,20 H30").unwrap();
        let overlay = build_overlay(&path, &OverlayOptions::default());
        assert_eq!(overlay.handles().len(), path.editable_point_count());
        for h in overlay.handles() {
            assert_eq!(
                overlay.overlay_box(h.id).map(|b| b.center),
                path.point(h.target)
            );
        }
    }

    #[test]
    fn test_incomplete_poly_cubic_gets_boxes_only() {
        let path = Path::new(vec![crate::path::Figure {
            start: Point::ZERO,
            segments: vec![Segment::PolyCubicBezier {
                points: vec![
                    Point::new(1.0, 0.0),
                    Point::new(2.0, 0.0),
                    Point::new(3.0, 0.0),
                    Point::new(4.0, 0.0),
                ],
            }],
            closed: false,
        }]);
        let overlay = build_overlay(&path, &OverlayOptions::default());
        assert_eq!(overlay.handles().len(), 5);
        assert_eq!(overlay.lines().len(), 2);
        assert_eq!(
            overlay.handles()[4].target,
            PointRef::segment(0, 0, 3)
        );
    }

    #[test]
    fn test_segment_after_incomplete_poly_hangs_from_drawn_end() {
        let figure = crate::path::Figure {
            start: Point::ZERO,
            segments: vec![
                Segment::PolyCubicBezier {
                    points: vec![
                        Point::new(1.0, 0.0),
                        Point::new(2.0, 0.0),
                        Point::new(3.0, 0.0),
                        Point::new(4.0, 0.0),
                    ],
                },
                Segment::QuadraticBezier {
                    c1: Point::new(5.0, 5.0),
                    end: Point::new(6.0, 0.0),
                },
            ],
            closed: false,
        };
        let drawn_start = figure.segments[0].terminal();
        let overlay = build_overlay(&Path::new(vec![figure]), &OverlayOptions::default());

        assert_eq!(overlay.handles().len(), 7);
        let quad_line = overlay.lines()[2];
        assert_eq!(quad_line.anchor, HandleId(3));
        assert_eq!(Some(quad_line.from), drawn_start);
        assert_eq!(quad_line.free, HandleId(5));
        assert!(overlay.dependents(HandleId(4)).is_empty());
    }

    #[test]
    fn test_geometry_paths() {
        let overlay = build("M0,0 C2,0 8,10 10,10");
        let boxes = overlay.boxes_geometry();
        assert_eq!(boxes.figures.len(), 4);
        assert!(boxes.figures.iter().all(|f| f.closed));

        let lines = overlay.lines_geometry();
        assert_eq!(lines.figures.len(), 2);
        assert!(lines.figures.iter().all(|f| !f.closed));
        assert_eq!(lines.figures[1].start, Point::new(10.0, 10.0));
    }
}
