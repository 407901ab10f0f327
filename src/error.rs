use std::path::PathBuf;

use thiserror::Error;

use crate::overlay::HandleId;
use crate::path::Point;
use crate::session::DragTarget;

/// Malformed path text. The message comes from the path data parser.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid path data: {message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

/// Failure reading a path document
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed XML: {0}")]
    Xml(String),
    #[error("no <Path> element found")]
    MissingElement,
    #[error("<Path> element has no Data attribute")]
    MissingData,
    #[error("invalid StrokeThickness {0:?}")]
    InvalidThickness(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failure writing a path document
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode XML: {0}")]
    Xml(String),
}

/// Rejected edit; the session is left untouched
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("handle {0} does not resolve to a point")]
    StaleHandle(HandleId),
    #[error("figure {0} does not exist")]
    NoSuchFigure(usize),
    #[error("coordinates {0} are not finite")]
    NonFinite(Point),
    #[error("cannot drag {requested} while {active} is captured")]
    DragConflict {
        active: DragTarget,
        requested: DragTarget,
    },
}
