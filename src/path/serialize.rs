use super::types::{Figure, Path, Point, Segment};

/// Format a number in its shortest round-trip form, treating -0 as 0
fn f(n: f64) -> String {
    let n = if n == 0.0 { 0.0 } else { n };
    format!("{}", n)
}

fn p(point: &Point) -> String {
    format!("{},{}", f(point.x), f(point.y))
}

/// Generate path data text from a [`Path`].
///
/// Commands are absolute and upper case. Every coordinate group gets its own
/// command letter, so a poly segment and a run of single segments of the
/// same kind produce the same text. A trailing partial group of a poly
/// Bezier is not drawn and is not written.
pub fn serialize(path: &Path) -> String {
    path.figures
        .iter()
        .map(figure_data)
        .collect::<Vec<_>>()
        .join(" ")
}

fn figure_data(figure: &Figure) -> String {
    let mut d = format!("M{}", p(&figure.start));

    for seg in &figure.segments {
        match seg {
            Segment::Line { end } => {
                d.push_str(&format!(" L{}", p(end)));
            }
            Segment::CubicBezier { c1, c2, end } => {
                d.push_str(&format!(" C{} {} {}", p(c1), p(c2), p(end)));
            }
            Segment::QuadraticBezier { c1, end } => {
                d.push_str(&format!(" Q{} {}", p(c1), p(end)));
            }
            Segment::Arc {
                end,
                radii,
                rotation,
                large_arc,
                sweep,
            } => {
                d.push_str(&format!(
                    " A{},{} {} {} {} {}",
                    f(radii.x),
                    f(radii.y),
                    f(*rotation),
                    u8::from(*large_arc),
                    u8::from(*sweep),
                    p(end)
                ));
            }
            Segment::PolyLine { points } => {
                for end in points {
                    d.push_str(&format!(" L{}", p(end)));
                }
            }
            Segment::PolyCubicBezier { points } => {
                for t in points.chunks_exact(3) {
                    d.push_str(&format!(" C{} {} {}", p(&t[0]), p(&t[1]), p(&t[2])));
                }
            }
            Segment::PolyQuadraticBezier { points } => {
                for q in points.chunks_exact(2) {
                    d.push_str(&format!(" Q{} {}", p(&q[0]), p(&q[1])));
                }
            }
        }
    }

    if figure.closed {
        d.push_str(" Z");
    }

    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::parse;
    use kurbo::Vec2;

    #[test]
    fn test_number_format() {
        assert_eq!(f(10.0), "10");
        assert_eq!(f(2.5), "2.5");
        assert_eq!(f(-0.0), "0");
        assert_eq!(f(-3.25), "-3.25");
    }

    #[test]
    fn test_serialize_empty_path() {
        assert_eq!(serialize(&Path::default()), "");
    }

    #[test]
    fn test_serialize_all_kinds() {
        let figure = Figure {
            start: Point::new(0.0, 0.0),
            segments: vec![
                Segment::Line {
                    end: Point::new(1.0, 0.0),
                },
                Segment::CubicBezier {
                    c1: Point::new(2.0, 0.0),
                    c2: Point::new(3.0, 1.0),
                    end: Point::new(3.0, 2.0),
                },
                Segment::Arc {
                    end: Point::new(5.0, 2.0),
                    radii: Vec2::new(1.0, 1.5),
                    rotation: 45.0,
                    large_arc: true,
                    sweep: false,
                },
                Segment::PolyQuadraticBezier {
                    points: vec![
                        Point::new(6.0, 3.0),
                        Point::new(7.0, 2.0),
                        Point::new(8.0, 1.0),
                        Point::new(9.0, 2.0),
                    ],
                },
            ],
            closed: true,
        };
        let path = Path::new(vec![figure]);
        assert_eq!(
            serialize(&path),
            "M0,0 L1,0 C2,0 3,1 3,2 A1,1.5 45 1 0 5,2 Q6,3 7,2 Q8,1 9,2 Z"
        );
    }

    #[test]
    fn test_serialize_multiple_figures() {
        let path = parse("M0,0 L1,1 Z m4,4 l1,0").unwrap();
        assert_eq!(serialize(&path), "M0,0 L1,1 Z M4,4 L5,4");
    }

    #[test]
    fn test_single_and_poly_runs_serialize_alike() {
        let built = Path::new(vec![Figure {
            start: Point::new(0.0, 0.0),
            segments: vec![
                Segment::Line {
                    end: Point::new(1.0, 1.0),
                },
                Segment::Line {
                    end: Point::new(2.0, 2.0),
                },
            ],
            closed: false,
        }]);
        let once = serialize(&built);
        assert_eq!(once, "M0,0 L1,1 L2,2");

        let reparsed = parse(&once).unwrap();
        assert!(matches!(
            reparsed.figures[0].segments[..],
            [Segment::PolyLine { .. }]
        ));
        assert_eq!(serialize(&reparsed), once);
    }

    #[test]
    fn test_partial_poly_group_is_dropped() {
        let built = Path::new(vec![Figure {
            start: Point::new(0.0, 0.0),
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
        let once = serialize(&built);
        assert_eq!(once, "M0,0 C1,0 2,0 3,0");
        assert_eq!(serialize(&parse(&once).unwrap()), once);

        let lone = Path::new(vec![Figure {
            start: Point::new(0.0, 0.0),
            segments: vec![Segment::PolyQuadraticBezier {
                points: vec![Point::new(1.0, 1.0)],
            }],
            closed: true,
        }]);
        assert_eq!(serialize(&lone), "M0,0 Z");
    }

    #[test]
    fn test_serialize_is_stable() {
        let inputs = [
            "M 0,21.5 C 4,21.5 4,0 12,0.5",
            "M 2,0 L 0,2 L 2,4 L 0,6 L 2,8 L 4,6 L 6,8 L 8,6 L 6,4 L 8,2 L 6,0 L 4,2 Z",
            "M0,0 Q5,5 10,0 T20,0 A3,3 0 0 1 26,0 h-4 v3",
            "M1,1 Z M5,5",
        ];
        for input in inputs {
            let once = serialize(&parse(input).unwrap());
            let twice = serialize(&parse(&once).unwrap());
            assert_eq!(once, twice, "unstable serialization for {input}");
        }
    }
}
