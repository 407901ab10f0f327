//! # path-maker
//!
//! Editing core for SVG path data.
//!
//! ## Features
//!
//! - **Path model**: parse `M/L/H/V/C/S/Q/T/A/Z` text into figures and
//!   segments, serialize back to canonical text, compute stroked bounds
//! - **Control-point overlay**: one drag box per editable coordinate plus
//!   the control lines of Bezier segments
//! - **Edit session**: drag points or whole figures, with dependent control
//!   lines kept in sync and text published on release
//! - **Path files**: a flat XML record with the path data and its style
//!
//! ## Example
//!
//! ```rust
//! use path_maker::{EditSession, HandleId, OverlayOptions, Point};
//!
//! let mut session = EditSession::from_text("M0,0 C2,0 8,10 10,10", OverlayOptions::default())?;
//! session.apply_drag(HandleId(1), Point::new(0.0, 5.0))?;
//! assert_eq!(session.commit_drag(), "M0,0 C0,5 8,10 10,10");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod document;
pub mod error;
pub mod overlay;
pub mod palette;
pub mod path;
pub mod session;

// Re-export commonly used items
pub use document::{PathDocument, Style, load_file, save_file};
pub use error::{EditError, LoadError, ParseError, SaveError};
pub use overlay::{
    ControlLine, ControlPointHandle, HandleId, LineEnd, LineId, Overlay, OverlayBox,
    OverlayOptions, build_overlay,
};
pub use path::{Figure, Path, Point, PointRef, PointSlot, Segment, SegmentKind, bounds, parse, serialize};
pub use session::{DragTarget, DragUpdate, EditSession};
