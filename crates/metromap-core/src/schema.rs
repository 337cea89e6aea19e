#![forbid(unsafe_code)]

//! Serde model of the declarative map description. This is the wire shape
//! only; [`crate::topology`] turns it into the in-memory network.

use crate::geom::{Anchor, Direction, Orientation};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct MapDocument {
    /// Full-map canvas size, stored `[height, width]`.
    pub image_resolution: (u32, u32),
    pub info_filename: String,
    pub font_filename: String,
    /// Placeholder image written when a linear map degenerates to fewer than
    /// two boardable stations.
    #[serde(default)]
    pub no_service_filename: Option<String>,
    pub lines: Vec<LineDoc>,
    #[serde(default)]
    pub transfers: Vec<TransferDoc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    #[default]
    Metro,
    /// Suburban through-running ("diameter") lines: smaller transfer nodes,
    /// extra clearance on transfer connectors.
    Mcd,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineDoc {
    pub name: String,
    #[serde(default)]
    pub line_color: Option<String>,
    #[serde(default)]
    pub line_filename: Option<String>,
    #[serde(default)]
    pub planned_line_color: Option<String>,
    #[serde(default)]
    pub planned_line_filename: Option<String>,
    pub logo_filename: String,
    #[serde(rename = "type", default)]
    pub kind: LineKind,
    pub priority: i32,
    /// Whether linear maps for this line carry a reverse-direction indicator
    /// block instead of being trimmed at planned stations.
    #[serde(default)]
    pub bidirectional: bool,
    #[serde(default)]
    pub start_logo_offset: Option<(Option<i32>, Option<i32>)>,
    #[serde(default)]
    pub end_logo_offset: Option<(Option<i32>, Option<i32>)>,
    pub start: (i32, i32),
    pub direction: Direction,
    pub elements: Vec<ElementDoc>,
}

impl LineDoc {
    /// A logo offset with a `null` component means "no logo at this end".
    pub fn resolved_logo_offset(
        offset: Option<(Option<i32>, Option<i32>)>,
    ) -> Option<(i32, i32)> {
        match offset {
            Some((Some(x), Some(y))) => Some((x, y)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementDoc {
    LineSegment {
        length: i32,
        #[serde(default)]
        is_planned: Option<bool>,
    },
    Turn {
        direction: Direction,
        #[serde(default)]
        is_planned: Option<bool>,
    },
    Station {
        name: String,
        #[serde(default)]
        name_offset: Option<(i32, i32)>,
        #[serde(default)]
        orientation: Option<Orientation>,
        #[serde(default)]
        name_relative_to: Option<Anchor>,
        #[serde(default)]
        hide_name: bool,
        #[serde(default)]
        is_planned: Option<bool>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferDoc {
    pub station1: StationRef,
    pub station2: StationRef,
    pub is_direct: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationRef {
    pub line_name: String,
    pub station_name: String,
}
