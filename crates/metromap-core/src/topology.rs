#![forbid(unsafe_code)]

//! In-memory network model built once from a [`MapDocument`]. Immutable per
//! render: renderers only read it (the linear-map pass synthesizes derived
//! lines instead of mutating these).

use crate::error::{Error, Result};
use crate::geom::{Anchor, Direction, Orientation, Point, advance, point};
use crate::schema::{ElementDoc, LineDoc, LineKind, MapDocument};

/// Index of a station inside the network: the owning line's index plus the
/// element index within it. Elements never hold owning references back to
/// their line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId {
    pub line: usize,
    pub element: usize,
}

/// How a line's stroke is painted: a flat color or a style image tiled along
/// the stroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineStyle {
    Color(String),
    Image(String),
}

#[derive(Debug, Clone)]
pub struct SegmentElement {
    pub length: i32,
    pub is_planned: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct TurnElement {
    pub direction: Direction,
    pub is_planned: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct TransferLink {
    pub station: StationId,
    pub is_direct: bool,
}

#[derive(Debug, Clone)]
pub struct StationElement {
    pub name: String,
    pub name_offset: (i32, i32),
    pub orientation: Orientation,
    pub name_relative_to: Anchor,
    pub hide_name: bool,
    pub is_planned: Option<bool>,
    /// Derived by walking nominal lengths from the line start; never stored
    /// in the document.
    pub position: Point,
    /// Symmetric closure of all transfers naming this station.
    pub transfers: Vec<TransferLink>,
}

impl StationElement {
    pub fn is_transfer(&self) -> bool {
        !self.transfers.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum Element {
    Segment(SegmentElement),
    Turn(TurnElement),
    Station(StationElement),
}

impl Element {
    pub fn planned_flag(&self) -> Option<bool> {
        match self {
            Self::Segment(s) => s.is_planned,
            Self::Turn(t) => t.is_planned,
            Self::Station(s) => s.is_planned,
        }
    }

    pub fn as_station(&self) -> Option<&StationElement> {
        match self {
            Self::Station(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_station(&self) -> bool {
        matches!(self, Self::Station(_))
    }
}

#[derive(Debug, Clone)]
pub struct Line {
    pub name: String,
    pub style: LineStyle,
    pub planned_style: Option<LineStyle>,
    pub logo_filename: String,
    pub kind: LineKind,
    pub priority: i32,
    pub bidirectional: bool,
    pub start_logo_offset: Option<(i32, i32)>,
    pub end_logo_offset: Option<(i32, i32)>,
    pub start: Point,
    pub direction: Direction,
    pub elements: Vec<Element>,
}

impl Line {
    pub fn station(&self, name: &str) -> Option<(usize, &StationElement)> {
        self.elements
            .iter()
            .enumerate()
            .find_map(|(i, el)| match el {
                Element::Station(s) if s.name == name => Some((i, s)),
                _ => None,
            })
    }

    pub fn stations(&self) -> impl Iterator<Item = (usize, &StationElement)> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(i, el)| el.as_station().map(|s| (i, s)))
    }

    /// Builds a synthetic variant of this line with new geometry, keeping
    /// styling and identity. Station positions are rederived by walking the
    /// new element sequence from `start`, so callers may hand in elements
    /// carrying stale positions.
    pub fn derived(&self, start: Point, direction: Direction, elements: Vec<Element>) -> Line {
        let mut line = Line {
            name: self.name.clone(),
            style: self.style.clone(),
            planned_style: self.planned_style.clone(),
            logo_filename: self.logo_filename.clone(),
            kind: self.kind,
            priority: self.priority,
            bidirectional: self.bidirectional,
            start_logo_offset: self.start_logo_offset,
            end_logo_offset: self.end_logo_offset,
            start,
            direction,
            elements,
        };
        line.refresh_positions();
        line
    }

    fn refresh_positions(&mut self) {
        let mut cursor = self.start;
        let mut direction = self.direction;
        for element in &mut self.elements {
            match element {
                Element::Segment(s) => cursor = advance(cursor, s.length, direction),
                Element::Turn(t) => direction = t.direction,
                Element::Station(s) => s.position = cursor,
            }
        }
    }

    /// Resolves an element's effective "planned" status. The flag is stored
    /// sparsely: scan forward and backward from `index` until an explicit
    /// flag or an unflagged Station terminates the scan. An explicit
    /// `is_planned: true` reachable in either direction makes the element
    /// planned, which is what lets one line mix built and planned stretches.
    pub fn is_actually_planned(&self, index: usize) -> bool {
        debug_assert!(index < self.elements.len());

        for el in &self.elements[index..] {
            match el.planned_flag() {
                Some(true) => return true,
                Some(false) => break,
                None if el.is_station() => break,
                None => {}
            }
        }

        for el in self.elements[..=index].iter().rev() {
            match el.planned_flag() {
                Some(true) => return true,
                Some(false) => break,
                None if el.is_station() => break,
                None => {}
            }
        }

        false
    }
}

#[derive(Debug, Clone)]
pub struct Transfer {
    pub stations: [StationId; 2],
    pub is_direct: bool,
}

/// Indirect transfers a traversal may pass through when collecting a
/// station's linked group. Direct (walkway) edges are free.
pub const MAX_INDIRECT_HOPS: usize = 1;

/// The whole map: lines, transfers and asset references. The single
/// top-level registry value passed explicitly to renderers.
#[derive(Debug, Clone)]
pub struct Network {
    pub image_resolution: (u32, u32),
    pub info_filename: String,
    pub font_filename: String,
    pub no_service_filename: Option<String>,
    lines: Vec<Line>,
    transfers: Vec<Transfer>,
}

impl Network {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let doc: MapDocument = serde_json::from_str(text)?;
        Self::from_document(&doc)
    }

    pub fn from_document(doc: &MapDocument) -> Result<Self> {
        let mut lines = Vec::with_capacity(doc.lines.len());
        for line_doc in &doc.lines {
            lines.push(build_line(line_doc)?);
        }

        let mut network = Self {
            image_resolution: doc.image_resolution,
            info_filename: doc.info_filename.clone(),
            font_filename: doc.font_filename.clone(),
            no_service_filename: doc.no_service_filename.clone(),
            lines,
            transfers: Vec::new(),
        };

        for transfer_doc in &doc.transfers {
            let a = network.station_id(
                &transfer_doc.station1.line_name,
                &transfer_doc.station1.station_name,
            )?;
            let b = network.station_id(
                &transfer_doc.station2.line_name,
                &transfer_doc.station2.station_name,
            )?;
            network.transfers.push(Transfer {
                stations: [a, b],
                is_direct: transfer_doc.is_direct,
            });
            network.link_stations(a, b, transfer_doc.is_direct);
            network.link_stations(b, a, transfer_doc.is_direct);
        }

        tracing::debug!(
            lines = network.lines.len(),
            transfers = network.transfers.len(),
            "network built"
        );
        Ok(network)
    }

    fn link_stations(&mut self, from: StationId, to: StationId, is_direct: bool) {
        if let Element::Station(s) = &mut self.lines[from.line].elements[from.element] {
            s.transfers.push(TransferLink {
                station: to,
                is_direct,
            });
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn line_index(&self, name: &str) -> Result<usize> {
        self.lines
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| Error::LineNotFound {
                name: name.to_string(),
            })
    }

    pub fn line(&self, name: &str) -> Result<&Line> {
        Ok(&self.lines[self.line_index(name)?])
    }

    pub fn line_at(&self, index: usize) -> &Line {
        &self.lines[index]
    }

    pub fn station_id(&self, line_name: &str, station_name: &str) -> Result<StationId> {
        let line = self.line_index(line_name)?;
        let (element, _) = self.lines[line].station(station_name).ok_or_else(|| {
            Error::StationNotFound {
                line: line_name.to_string(),
                station: station_name.to_string(),
            }
        })?;
        Ok(StationId { line, element })
    }

    pub fn station_at(&self, id: StationId) -> &StationElement {
        match &self.lines[id.line].elements[id.element] {
            Element::Station(s) => s,
            other => unreachable!("StationId points at a non-station element: {other:?}"),
        }
    }

    /// Stations reachable from `start` over transfer edges, direct edges
    /// free, at most [`MAX_INDIRECT_HOPS`] indirect edges per path. Returns
    /// the group excluding `start` itself, in deterministic id order.
    pub fn linked_stations(&self, start: StationId) -> Vec<StationId> {
        let mut best: std::collections::HashMap<StationId, usize> =
            std::collections::HashMap::new();
        best.insert(start, 0);
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((start, 0usize));

        while let Some((id, used)) = queue.pop_front() {
            for link in &self.station_at(id).transfers {
                let cost = used + usize::from(!link.is_direct);
                if cost > MAX_INDIRECT_HOPS {
                    continue;
                }
                let better = best.get(&link.station).is_none_or(|&prev| cost < prev);
                if better {
                    best.insert(link.station, cost);
                    queue.push_back((link.station, cost));
                }
            }
        }

        let mut out: Vec<StationId> = best.into_keys().filter(|id| *id != start).collect();
        out.sort();
        out
    }
}

fn build_line(doc: &LineDoc) -> Result<Line> {
    let style = match (&doc.line_color, &doc.line_filename) {
        (_, Some(file)) => LineStyle::Image(file.clone()),
        (Some(color), None) => LineStyle::Color(color.clone()),
        (None, None) => {
            return Err(Error::InvalidLine {
                name: doc.name.clone(),
                message: "neither line_color nor line_filename given".to_string(),
            });
        }
    };
    let planned_style = match (&doc.planned_line_color, &doc.planned_line_filename) {
        (_, Some(file)) => Some(LineStyle::Image(file.clone())),
        (Some(color), None) => Some(LineStyle::Color(color.clone())),
        (None, None) => None,
    };

    let mut elements = Vec::with_capacity(doc.elements.len());
    let mut cursor = point(doc.start.0, doc.start.1);
    let mut direction = doc.direction;
    for element in &doc.elements {
        match element {
            ElementDoc::LineSegment { length, is_planned } => {
                elements.push(Element::Segment(SegmentElement {
                    length: *length,
                    is_planned: *is_planned,
                }));
                cursor = advance(cursor, *length, direction);
            }
            ElementDoc::Turn {
                direction: new_direction,
                is_planned,
            } => {
                elements.push(Element::Turn(TurnElement {
                    direction: *new_direction,
                    is_planned: *is_planned,
                }));
                direction = *new_direction;
            }
            ElementDoc::Station {
                name,
                name_offset,
                orientation,
                name_relative_to,
                hide_name,
                is_planned,
            } => {
                elements.push(Element::Station(StationElement {
                    name: name.clone(),
                    name_offset: name_offset.unwrap_or((0, 0)),
                    orientation: orientation.unwrap_or(Orientation::Up),
                    name_relative_to: name_relative_to.unwrap_or(Anchor::Left),
                    hide_name: *hide_name,
                    is_planned: *is_planned,
                    position: cursor,
                    transfers: Vec::new(),
                }));
            }
        }
    }

    Ok(Line {
        name: doc.name.clone(),
        style,
        planned_style,
        logo_filename: doc.logo_filename.clone(),
        kind: doc.kind,
        priority: doc.priority,
        bidirectional: doc.bidirectional,
        start_logo_offset: LineDoc::resolved_logo_offset(doc.start_logo_offset),
        end_logo_offset: LineDoc::resolved_logo_offset(doc.end_logo_offset),
        start: point(doc.start.0, doc.start.1),
        direction: doc.direction,
        elements,
    })
}

#[cfg(test)]
mod tests;
