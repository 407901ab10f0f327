//! Edit session: keeps the path, its overlay and the published path text in
//! sync while the user drags control points or whole figures.
//!
//! - A pointer move writes the new point through its handle into the path,
//!   re-centers that handle's box and moves the control-line ends wired to
//!   it. Nothing else moves, so a write never triggers another write.
//! - A pointer release commits: the path is serialized, the text is
//!   published and the session becomes dirty.
//!
//! Only one target can be captured at a time.

use std::fmt;

use kurbo::Rect;
use tracing::{debug, trace, warn};

use crate::document::{PathDocument, Style};
use crate::error::{EditError, LoadError, ParseError, SaveError};
use crate::overlay::{HandleId, LineId, Overlay, OverlayOptions, build_overlay};
use crate::path::{self, Path, Point};

/// Minimum hit distance, in screen units, for grabbing a figure's outline
const FIGURE_HIT_SLOP: f64 = 3.0;

/// What the current drag gesture has captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragTarget {
    Handle(HandleId),
    Figure(usize),
}

impl fmt::Display for DragTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DragTarget::Handle(id) => write!(f, "handle {}", id),
            DragTarget::Figure(idx) => write!(f, "figure {}", idx),
        }
    }
}

/// What one handle drag step changed
#[derive(Debug, Clone, PartialEq)]
pub struct DragUpdate {
    pub handle: HandleId,
    pub point: Point,
    pub moved_lines: Vec<LineId>,
}

#[derive(Debug, Clone)]
pub struct EditSession {
    path: Path,
    overlay: Overlay,
    text: String,
    style: Style,
    options: OverlayOptions,
    drag: Option<DragTarget>,
    dirty: bool,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(OverlayOptions::default())
    }
}

impl EditSession {
    pub fn new(options: OverlayOptions) -> Self {
        Self {
            path: Path::default(),
            overlay: Overlay::default(),
            text: String::new(),
            style: Style::default(),
            options,
            drag: None,
            dirty: false,
        }
    }

    pub fn from_text(text: &str, options: OverlayOptions) -> Result<Self, ParseError> {
        let mut session = Self::new(options);
        session.replace(path::parse(text)?, text.to_string());
        Ok(session)
    }

    pub fn from_document(doc: PathDocument, options: OverlayOptions) -> Result<Self, ParseError> {
        let mut session = Self::from_text(&doc.data, options)?;
        session.style = doc.style;
        Ok(session)
    }

    /// Open a path file. The session starts clean.
    pub fn open<P: AsRef<std::path::Path>>(
        file: P,
        options: OverlayOptions,
    ) -> Result<Self, LoadError> {
        let doc = PathDocument::load(file)?;
        Ok(Self::from_document(doc, options)?)
    }

    /// Save the published text and style. Clears the dirty flag.
    pub fn save<P: AsRef<std::path::Path>>(&mut self, file: P) -> Result<(), SaveError> {
        self.document().save(file)?;
        self.dirty = false;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// The last published path text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn active_drag(&self) -> Option<DragTarget> {
        self.drag
    }

    pub fn document(&self) -> PathDocument {
        PathDocument {
            data: self.text.clone(),
            style: self.style.clone(),
        }
    }

    /// Stroked bounds of the current geometry
    pub fn bounds(&self) -> Option<Rect> {
        path::bounds(&self.path, self.style.stroke_thickness)
    }

    /// Re-parse `text` and rebuild the overlay. On failure nothing changes.
    /// Any drag in progress is dropped.
    pub fn load_text(&mut self, text: &str) -> Result<(), ParseError> {
        let parsed = path::parse(text).inspect_err(|e| warn!("rejected path text: {}", e))?;
        self.replace(parsed, text.to_string());
        self.dirty = true;
        Ok(())
    }

    fn replace(&mut self, path: Path, text: String) {
        self.overlay = build_overlay(&path, &self.options);
        self.path = path;
        self.text = text;
        self.drag = None;
    }

    pub fn set_style(&mut self, style: Style) {
        if style != self.style {
            self.style = style;
            self.dirty = true;
        }
    }

    /// Change the zoom factor; boxes keep a constant on-screen size.
    pub fn set_scale(&mut self, scale: f64) {
        self.options.scale = scale;
        self.overlay.set_box_side(self.options.box_side());
    }

    /// Find what a pointer press at `p` grabs: boxes first, then figures
    /// (topmost first).
    pub fn hit_test(&self, p: Point) -> Option<DragTarget> {
        if let Some(id) = self.overlay.hit_box(p) {
            return Some(DragTarget::Handle(id));
        }

        let slop = FIGURE_HIT_SLOP * self.options.box_side() / self.options.box_size;
        self.path
            .figures
            .iter()
            .enumerate()
            .rev()
            .find(|(_, figure)| {
                path::figure_contains(figure, p, self.style.stroke_thickness, slop)
            })
            .map(|(idx, _)| DragTarget::Figure(idx))
    }

    /// Capture `target` for a new drag gesture. Re-capturing the current
    /// target is a no-op.
    pub fn begin_drag(&mut self, target: DragTarget) -> Result<(), EditError> {
        match target {
            DragTarget::Handle(id) => {
                self.resolve(id)?;
            }
            DragTarget::Figure(idx) => {
                if idx >= self.path.figures.len() {
                    return Err(EditError::NoSuchFigure(idx));
                }
            }
        }
        self.capture(target)
    }

    fn capture(&mut self, target: DragTarget) -> Result<(), EditError> {
        match self.drag {
            Some(active) if active != target => {
                warn!(%active, requested = %target, "drag conflict");
                Err(EditError::DragConflict {
                    active,
                    requested: target,
                })
            }
            Some(_) => Ok(()),
            None => {
                debug!(%target, "drag started");
                self.drag = Some(target);
                Ok(())
            }
        }
    }

    fn resolve(&self, id: HandleId) -> Result<Point, EditError> {
        self.overlay
            .handle(id)
            .and_then(|h| self.path.point(h.target))
            .ok_or(EditError::StaleHandle(id))
    }

    /// Move one control point. Captures the handle if nothing is captured.
    ///
    /// The write goes into the path first, then the handle's own box and the
    /// control lines wired to it follow. Sibling boxes never move, not even
    /// ones sharing the joint.
    pub fn apply_drag(&mut self, id: HandleId, to: Point) -> Result<DragUpdate, EditError> {
        let target = self
            .overlay
            .handle(id)
            .map(|h| h.target)
            .filter(|t| self.path.point(*t).is_some())
            .ok_or(EditError::StaleHandle(id))?;
        if !to.is_finite() {
            return Err(EditError::NonFinite(to));
        }
        self.capture(DragTarget::Handle(id))?;

        self.path.set_point(target, to);
        let moved_lines = self.overlay.move_handle(id, to);

        trace!(handle = %id, x = to.x, y = to.y, lines = moved_lines.len(), "drag step");
        Ok(DragUpdate {
            handle: id,
            point: to,
            moved_lines,
        })
    }

    /// Move a whole figure by (dx, dy). Captures the figure if nothing is
    /// captured. Every box and line of that figure follows.
    pub fn drag_figure(&mut self, figure: usize, dx: f64, dy: f64) -> Result<(), EditError> {
        if figure >= self.path.figures.len() {
            return Err(EditError::NoSuchFigure(figure));
        }
        let offset = Point::new(dx, dy);
        if !offset.is_finite() {
            return Err(EditError::NonFinite(offset));
        }
        self.capture(DragTarget::Figure(figure))?;

        self.path.figures[figure].translate(dx, dy);
        let refreshed = self.overlay.refresh_figure(&self.path, figure);

        trace!(figure, dx, dy, boxes = refreshed, "figure drag step");
        Ok(())
    }

    /// End the drag gesture: serialize the path, publish the text and mark
    /// the session dirty. Without an active drag the text is returned as is.
    pub fn commit_drag(&mut self) -> String {
        if let Some(target) = self.drag.take() {
            self.text = path::serialize(&self.path);
            self.dirty = true;
            debug!(%target, text = %self.text, "drag committed");
        }
        self.text.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(text: &str) -> EditSession {
        EditSession::from_text(text, OverlayOptions::default()).unwrap()
    }

    #[test]
    fn test_from_text_keeps_text_and_starts_clean() {
        let s = session("M 0,0 L 10,0");
        assert_eq!(s.text(), "M 0,0 L 10,0");
        assert!(!s.is_dirty());
        assert_eq!(s.overlay().handles().len(), 2);
    }

    #[test]
    fn test_load_text_failure_leaves_state() {
        let mut s = session("M0,0 L10,0");
        let before = s.path().clone();
        assert!(s.load_text("M0,0 L").is_err());
        assert_eq!(s.path(), &before);
        assert_eq!(s.text(), "M0,0 L10,0");
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_apply_drag_then_commit() {
        let mut s = session("M0,0 L10,0");
        let update = s.apply_drag(HandleId(1), Point::new(5.0, 5.0)).unwrap();
        assert!(update.moved_lines.is_empty());
        assert_eq!(s.active_drag(), Some(DragTarget::Handle(HandleId(1))));
        // Text is only published on release
        assert_eq!(s.text(), "M0,0 L10,0");

        assert_eq!(s.commit_drag(), "M0,0 L5,5");
        assert!(s.is_dirty());
        assert_eq!(s.active_drag(), None);
    }

    #[test]
    fn test_commit_without_drag_is_noop() {
        let mut s = session("M 1,1 L 2,2");
        assert_eq!(s.commit_drag(), "M 1,1 L 2,2");
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_drag_conflict() {
        let mut s = session("M0,0 L10,0 L10,10");
        s.apply_drag(HandleId(1), Point::new(1.0, 1.0)).unwrap();

        let before = s.path().clone();
        let err = s.apply_drag(HandleId(2), Point::new(9.0, 9.0)).unwrap_err();
        assert_eq!(
            err,
            EditError::DragConflict {
                active: DragTarget::Handle(HandleId(1)),
                requested: DragTarget::Handle(HandleId(2)),
            }
        );
        assert_eq!(s.path(), &before);
        assert!(s.drag_figure(0, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_stale_handle() {
        let mut s = session("M0,0 L10,0");
        let err = s.apply_drag(HandleId(7), Point::ZERO).unwrap_err();
        assert_eq!(err, EditError::StaleHandle(HandleId(7)));
        assert_eq!(s.active_drag(), None);
    }

    #[test]
    fn test_non_finite_drag_is_rejected() {
        let mut s = session("M0,0 L10,0");
        let before = s.path().clone();

        let bad = Point::new(f64::NAN, f64::INFINITY);
        let err = s.apply_drag(HandleId(1), bad).unwrap_err();
        assert!(matches!(err, EditError::NonFinite(p) if !p.is_finite()));
        assert!(matches!(
            s.drag_figure(0, 1.0, f64::NEG_INFINITY),
            Err(EditError::NonFinite(_))
        ));

        assert_eq!(s.path(), &before);
        assert_eq!(
            s.overlay().overlay_box(HandleId(1)).map(|b| b.center),
            Some(Point::new(10.0, 0.0))
        );
        assert_eq!(s.active_drag(), None);
        assert_eq!(s.commit_drag(), "M0,0 L10,0");
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_mark_saved_clears_dirty() {
        let mut s = session("M0,0 L10,0");
        s.apply_drag(HandleId(1), Point::new(1.0, 1.0)).unwrap();
        s.commit_drag();
        assert!(s.is_dirty());
        s.mark_saved();
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_hit_test_prefers_boxes() {
        let s = session("M0,0 L10,0 L10,10 L0,10 Z");
        assert_eq!(
            s.hit_test(Point::new(10.5, 0.5)),
            Some(DragTarget::Handle(HandleId(1)))
        );
        assert_eq!(s.hit_test(Point::new(5.0, 5.0)), Some(DragTarget::Figure(0)));
        assert_eq!(s.hit_test(Point::new(50.0, 50.0)), None);
    }

    #[test]
    fn test_set_scale_resizes_boxes() {
        let mut s = session("M0,0 L10,0");
        s.set_scale(2.0);
        assert!(s.overlay().boxes().iter().all(|b| b.side == 4.0));
    }

    #[test]
    fn test_set_style_marks_dirty_only_on_change() {
        let mut s = session("M0,0 L10,0");
        s.set_style(Style::default());
        assert!(!s.is_dirty());
        s.set_style(Style {
            stroke: "red".to_string(),
            ..Style::default()
        });
        assert!(s.is_dirty());
    }
}
