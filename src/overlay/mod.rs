//! Control-point overlay
//!
//! Decomposes a [`Path`] into one handle per editable coordinate, a drag box
//! per handle and the control lines of Bezier segments. Control lines are
//! wired to the handles at their two ends through a dependency table built
//! once by [`build_overlay`]; moving a handle walks only that table.

mod extract;

use std::fmt;

use crate::path::{Figure, Path, Point, PointRef, Segment};

pub use extract::build_overlay;

/// Screen-space side length of a drag box
pub const DEFAULT_BOX_SIZE: f64 = 8.0;

/// Options for overlay construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayOptions {
    /// Box side length in screen units (default: 8)
    pub box_size: f64,
    /// Current zoom factor; boxes shrink as it grows (default: 1)
    pub scale: f64,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            box_size: DEFAULT_BOX_SIZE,
            scale: 1.0,
        }
    }
}

impl OverlayOptions {
    /// Box side length in path units
    pub fn box_side(&self) -> f64 {
        if self.scale > 0.0 {
            self.box_size / self.scale
        } else {
            self.box_size
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub usize);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub usize);

/// Addressable reference to one editable coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlPointHandle {
    pub id: HandleId,
    pub target: PointRef,
}

/// Square drag target centered on a control point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayBox {
    pub handle: HandleId,
    pub center: Point,
    pub side: f64,
}

impl OverlayBox {
    /// Corners clockwise from the top-left
    pub fn corners(&self) -> [Point; 4] {
        let h = self.side / 2.0;
        let c = self.center;
        [
            c.offset(-h, -h),
            c.offset(h, -h),
            c.offset(h, h),
            c.offset(-h, h),
        ]
    }

    pub fn contains(&self, p: Point) -> bool {
        let h = self.side / 2.0;
        (p.x - self.center.x).abs() <= h && (p.y - self.center.y).abs() <= h
    }

    pub fn to_figure(&self) -> Figure {
        let [top_left, rest @ ..] = self.corners();
        Figure {
            start: top_left,
            segments: vec![Segment::PolyLine {
                points: rest.to_vec(),
            }],
            closed: true,
        }
    }
}

/// Which end of a control line a handle drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineEnd {
    /// The point the line hangs from (the segment's implicit start, or the
    /// end point for a cubic's second control)
    Anchor,
    /// The control point
    Free,
}

/// Two-point line from an anchor handle to a control-point handle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlLine {
    pub id: LineId,
    pub anchor: HandleId,
    pub free: HandleId,
    pub from: Point,
    pub to: Point,
}

impl ControlLine {
    fn set_end(&mut self, end: LineEnd, p: Point) {
        match end {
            LineEnd::Anchor => self.from = p,
            LineEnd::Free => self.to = p,
        }
    }

    pub fn to_figure(&self) -> Figure {
        Figure {
            start: self.from,
            segments: vec![Segment::Line { end: self.to }],
            closed: false,
        }
    }
}

/// Handles, boxes and control lines derived from one [`Path`]
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    handles: Vec<ControlPointHandle>,
    /// Indexed by handle id
    boxes: Vec<OverlayBox>,
    lines: Vec<ControlLine>,
    /// Lines touching each handle, indexed by handle id
    dependents: Vec<Vec<(LineId, LineEnd)>>,
    box_side: f64,
}

impl Overlay {
    pub fn handles(&self) -> &[ControlPointHandle] {
        &self.handles
    }

    pub fn boxes(&self) -> &[OverlayBox] {
        &self.boxes
    }

    pub fn lines(&self) -> &[ControlLine] {
        &self.lines
    }

    pub fn box_side(&self) -> f64 {
        self.box_side
    }

    pub fn handle(&self, id: HandleId) -> Option<&ControlPointHandle> {
        self.handles.get(id.0)
    }

    pub fn overlay_box(&self, id: HandleId) -> Option<&OverlayBox> {
        self.boxes.get(id.0)
    }

    pub fn line(&self, id: LineId) -> Option<&ControlLine> {
        self.lines.get(id.0)
    }

    /// Control lines with an end on this handle
    pub fn dependents(&self, id: HandleId) -> &[(LineId, LineEnd)] {
        self.dependents.get(id.0).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Topmost box containing `p`
    pub fn hit_box(&self, p: Point) -> Option<HandleId> {
        self.boxes
            .iter()
            .rev()
            .find(|b| b.contains(p))
            .map(|b| b.handle)
    }

    /// All boxes as closed square figures
    pub fn boxes_geometry(&self) -> Path {
        Path::new(self.boxes.iter().map(OverlayBox::to_figure).collect())
    }

    /// All control lines as open two-point figures
    pub fn lines_geometry(&self) -> Path {
        Path::new(self.lines.iter().map(ControlLine::to_figure).collect())
    }

    /// Re-center a handle's box and move the line ends attached to it.
    /// Other boxes never move. Returns the lines that changed.
    pub fn move_handle(&mut self, id: HandleId, p: Point) -> Vec<LineId> {
        let Some(b) = self.boxes.get_mut(id.0) else {
            return Vec::new();
        };
        b.center = p;

        let Some(deps) = self.dependents.get(id.0) else {
            return Vec::new();
        };
        let mut moved = Vec::with_capacity(deps.len());
        for &(line_id, end) in deps {
            if let Some(line) = self.lines.get_mut(line_id.0) {
                line.set_end(end, p);
                moved.push(line_id);
            }
        }
        moved
    }

    /// Re-read every handle of one figure from `path`. Returns the number of
    /// boxes refreshed.
    pub fn refresh_figure(&mut self, path: &Path, figure: usize) -> usize {
        let ids: Vec<HandleId> = self
            .handles
            .iter()
            .filter(|h| h.target.figure == figure)
            .map(|h| h.id)
            .collect();
        self.refresh_handles(path, &ids);
        ids.len()
    }

    fn refresh_handles(&mut self, path: &Path, ids: &[HandleId]) {
        for &id in ids {
            let Some(p) = self.handle(id).and_then(|h| path.point(h.target)) else {
                continue;
            };
            self.move_handle(id, p);
        }
    }

    /// Resize every box, e.g. after a zoom change.
    pub fn set_box_side(&mut self, side: f64) {
        self.box_side = side;
        for b in &mut self.boxes {
            b.side = side;
        }
    }
}
