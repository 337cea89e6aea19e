#![forbid(unsafe_code)]

//! Transit-map topology model (headless).
//!
//! Design goals:
//! - faithful geometry: station positions derive from the authored element
//!   walk, never from a layout solver
//! - deterministic, testable outputs (pure data in, pure data out)
//! - no ambient state: the [`Network`] registry is built once and passed
//!   explicitly to renderers

pub mod error;
pub mod geom;
pub mod schema;
pub mod topology;

pub use error::{Error, Result};
pub use geom::{Anchor, Direction, Orientation, Point, Vector, advance, point, vector};
pub use schema::{ElementDoc, LineDoc, LineKind, MapDocument, StationRef, TransferDoc};
pub use topology::{
    Element, Line, LineStyle, MAX_INDIRECT_HOPS, Network, SegmentElement, StationElement,
    StationId, Transfer, TransferLink, TurnElement,
};
