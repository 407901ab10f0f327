//! Path geometry model
//!
//! In-memory representation of SVG-style path data as figures of typed
//! segments, with parsing (through `svgtypes`), serialization back to path
//! text, and stroked bounds (through `kurbo`).

pub mod bounds;
pub mod parser;
pub mod serialize;
pub mod types;

pub use bounds::{bounds, figure_bounds, figure_contains, figure_to_bez_path, to_bez_path};
pub use parser::parse;
pub use serialize::serialize;
pub use types::*;
