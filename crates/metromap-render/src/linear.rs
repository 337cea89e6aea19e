#![forbid(unsafe_code)]

//! Per-line linear strip maps: the horizontal diagrams hung above carriage
//! doors. A run-specific station sequence is laid out with label-collision
//! spacing, rebuilt as a synthetic straight line, and drawn with the same
//! walker the full map uses.

use metromap_core::{
    Anchor, Direction, Element, Error as CoreError, Line, Orientation, SegmentElement, StationId,
    point,
};

use crate::assets::{AssetId, logo_display_size};
use crate::error::Result;
use crate::map::draw_station_label;
use crate::primitives::DEFAULT_STROKE;
use crate::scene::{Canvas, Node, TextAlign};
use crate::walker::draw_line;
use crate::{LineArt, RenderContext};

pub const STRIP_HEIGHT: i32 = 180;
const LINE_Y: i32 = 90;
/// Minimum gap between a band's previous content and the next label.
const LABEL_CLEARANCE: i32 = 40;
/// Gap between adjacent logos in a transfer row (strips and signs).
pub(crate) const LOGO_GAP: i32 = 10;
/// Shortest leading filler when the strip starts mid-line.
const MIN_LEAD: i32 = 50;
/// Vertical gap from the path to a label's nearest edge.
const LABEL_DY: i32 = 26;
/// Vertical gap from the path to a transfer-logo row's nearest edge.
const LOGO_ROW_DY: i32 = 20;
const CORNER_RADIUS: i32 = 30;
const FRAME_GRID: i32 = 128;

const ARROW_LENGTH: i32 = 40;
const ARROW_HALF_HEIGHT: i32 = 10;
const INDICATOR_GAP: i32 = 10;
const INDICATOR_LEAD: i32 = 15;
const INDICATOR_TAIL: i32 = 25;
const ARROW_FALLBACK_COLOR: &str = "#333333";

/// One direction-specific strip: the station the rider boards at and which
/// way the train runs through the element sequence.
#[derive(Debug, Clone, Default)]
pub struct LinearMapRequest {
    pub reverse: bool,
    pub start_station: Option<String>,
}

/// A strip render either yields a map or the "no service in this direction"
/// placeholder; the latter is a routine outcome for terminal stations.
#[derive(Debug)]
pub enum LinearMapOutcome {
    Map(Canvas),
    NoService,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Top,
    Bottom,
}

impl Band {
    fn flip(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }
}

struct Stop {
    element: usize,
    station: metromap_core::StationElement,
    planned: bool,
}

struct Placement {
    band: Band,
    label_width: i32,
    logo_row: Vec<(AssetId, (i32, i32))>,
    logo_row_width: i32,
    position: i32,
}

pub fn linear_map(
    ctx: &RenderContext,
    line_name: &str,
    request: &LinearMapRequest,
) -> Result<LinearMapOutcome> {
    let line_index = ctx.network.line_index(line_name)?;
    let line = ctx.network.line_at(line_index);
    let art = ctx.line_art(line)?;

    if let Some(start) = &request.start_station {
        if line.station(start).is_none() {
            return Err(CoreError::StationNotFound {
                line: line.name.clone(),
                station: start.clone(),
            }
            .into());
        }
    }

    let (stops, skipped_any) = match boardable_stops(line, request) {
        Some(out) => out,
        None => return Ok(LinearMapOutcome::NoService),
    };
    if stops.len() < 2 {
        return Ok(LinearMapOutcome::NoService);
    }

    let placements = place_stops(ctx, line_index, &stops, request);
    let max_extent = placements
        .iter()
        .map(|p| {
            p.position + p.label_width.max(p.logo_row_width) / 2
        })
        .max()
        .unwrap_or(0);

    // Filler instead of an end cap when the rider boards mid-line: the path
    // runs off the left edge, the way the service continues past the strip.
    let lead = if skipped_any {
        (placements[0].position / 2).max(MIN_LEAD)
    } else {
        placements[0].position
    };

    let forward_width = indicator_width(ctx, &art, &stops[stops.len() - 1].station.name);
    let has_reverse = line.bidirectional
        && request
            .start_station
            .as_deref()
            .is_some_and(|s| s != stops[0].station.name);
    let reverse_width = if has_reverse {
        indicator_width(ctx, &art, &stops[0].station.name)
    } else {
        0
    };

    let shift = reverse_width + if skipped_any { lead - placements[0].position } else { 0 };
    let content_end = shift + max_extent;
    let total_width = content_end + forward_width;

    let strip = synthetic_strip(line, &stops, &placements, skipped_any, lead, shift);

    let mut canvas = Canvas::with_background(total_width, STRIP_HEIGHT, "white");
    let centers = draw_line(ctx, &strip, &mut canvas)?;

    for (i, (_, center)) in centers.iter().enumerate() {
        if let Some(Element::Station(station)) = strip.elements.iter().filter(|e| e.is_station()).nth(i) {
            draw_station_label(ctx, &mut canvas, station, *center);
        }
        let placement = &placements[i];
        if !placement.logo_row.is_empty() {
            draw_logo_row(&mut canvas, placement, *center);
        }
    }

    draw_indicator(
        &mut canvas,
        ctx,
        &art,
        &stops[stops.len() - 1].station.name,
        content_end,
        Direction::Right,
    );
    if has_reverse {
        draw_indicator(
            &mut canvas,
            ctx,
            &art,
            &stops[0].station.name,
            reverse_width,
            Direction::Left,
        );
    }

    canvas.corner_radius = Some(CORNER_RADIUS);
    canvas.pad_width_to(Canvas::padded_grid_width(canvas.width(), FRAME_GRID));

    tracing::debug!(
        line = %line.name,
        stations = stops.len(),
        width = canvas.width(),
        "linear map laid out"
    );
    Ok(LinearMapOutcome::Map(canvas))
}

/// Resolves which stations the strip shows, in travel order. `None` means no
/// boardable run exists for this direction. The second value reports whether
/// leading stations were skipped.
fn boardable_stops(line: &Line, request: &LinearMapRequest) -> Option<(Vec<Stop>, bool)> {
    let mut stops: Vec<Stop> = line
        .stations()
        .map(|(i, s)| Stop {
            element: i,
            station: s.clone(),
            planned: line.is_actually_planned(i),
        })
        .collect();
    if request.reverse {
        stops.reverse();
    }

    let mut skipped_any = false;
    if let Some(start) = &request.start_station {
        if !line.bidirectional {
            let pos = stops
                .iter()
                .position(|s| !s.planned && s.station.name == *start)?;
            skipped_any = pos > 0;
            stops.drain(..pos);
        }
    }
    if !line.bidirectional {
        if let Some(pos) = stops.iter().position(|s| s.planned) {
            stops.truncate(pos);
        }
    }
    Some((stops, skipped_any))
}

/// Assigns label bands and strip positions. Labels alternate above/below the
/// path; transfer stations, the final station and the boarding station reset
/// the alternation to the top band. A station's position clears both bands'
/// running extents by [`LABEL_CLEARANCE`] plus half the content landing in
/// each band (label in its own band, transfer-logo row opposite).
fn place_stops(
    ctx: &RenderContext,
    line_index: usize,
    stops: &[Stop],
    request: &LinearMapRequest,
) -> Vec<Placement> {
    let mut placements = Vec::with_capacity(stops.len());
    let mut next_band = Band::Top;
    let mut extent_top = 0i32;
    let mut extent_bottom = 0i32;

    for (i, stop) in stops.iter().enumerate() {
        let is_transfer = stop.station.is_transfer();
        let matches_start = request.start_station.as_deref() == Some(stop.station.name.as_str());
        let band = if is_transfer || i + 1 == stops.len() || matches_start {
            next_band = Band::Bottom;
            Band::Top
        } else {
            let band = next_band;
            next_band = band.flip();
            band
        };

        let label_width = if stop.station.hide_name || stop.station.name.is_empty() {
            0
        } else {
            ctx.measure(&stop.station.name).width.round() as i32
        };
        let (logo_row, logo_row_width) = transfer_logo_row(ctx, line_index, stop.element);

        let (own_width, opp_width) = if is_transfer {
            (logo_row_width, label_width)
        } else {
            (label_width, 0)
        };
        let (own_extent, opp_extent) = match band {
            Band::Top => (extent_top, extent_bottom),
            Band::Bottom => (extent_bottom, extent_top),
        };
        let position = (own_extent + LABEL_CLEARANCE + own_width / 2)
            .max(opp_extent + LABEL_CLEARANCE + opp_width / 2);
        match band {
            Band::Top => {
                extent_top = position + own_width / 2;
                extent_bottom = position + opp_width / 2;
            }
            Band::Bottom => {
                extent_bottom = position + own_width / 2;
                extent_top = position + opp_width / 2;
            }
        }

        placements.push(Placement {
            band,
            label_width,
            logo_row,
            logo_row_width,
            position,
        });
    }
    placements
}

/// Logos of the lines reachable by transfer from the station, sorted by line
/// priority, plus the row's total width including gaps. The entrance signs
/// reuse this for their own transfer row.
pub(crate) fn transfer_logo_row(
    ctx: &RenderContext,
    line_index: usize,
    element: usize,
) -> (Vec<(AssetId, (i32, i32))>, i32) {
    let id = StationId {
        line: line_index,
        element,
    };
    let mut line_indices: Vec<usize> = ctx
        .network
        .linked_stations(id)
        .iter()
        .map(|s| s.line)
        .collect();
    line_indices.sort_by_key(|&i| (ctx.network.line_at(i).priority, i));
    line_indices.dedup();

    let mut row = Vec::new();
    let mut width = 0;
    for index in line_indices {
        let linked = ctx.network.line_at(index);
        if let Some(logo) = ctx.assets.find(&linked.logo_filename) {
            let size = logo_display_size(ctx.assets.get(logo), DEFAULT_STROKE);
            if width > 0 {
                width += LOGO_GAP;
            }
            width += size.0;
            row.push((logo, size));
        }
    }
    (row, width)
}

/// Clones the line onto a straight horizontal baseline with the computed
/// spacings, re-anchoring every label for strip reading: band stations label
/// away from the path, transfer stations label below with their logo row
/// above.
fn synthetic_strip(
    line: &Line,
    stops: &[Stop],
    placements: &[Placement],
    skipped_any: bool,
    lead: i32,
    shift: i32,
) -> Line {
    let start = if skipped_any {
        point(shift - lead + placements[0].position, LINE_Y)
    } else {
        point(shift + placements[0].position, LINE_Y)
    };

    let mut elements = Vec::with_capacity(stops.len() * 2);
    if skipped_any {
        elements.push(Element::Segment(SegmentElement {
            length: lead,
            is_planned: None,
        }));
    }
    for (i, (stop, placement)) in stops.iter().zip(placements).enumerate() {
        if i > 0 {
            elements.push(Element::Segment(SegmentElement {
                length: placement.position - placements[i - 1].position,
                is_planned: None,
            }));
        }
        let mut station = stop.station.clone();
        station.is_planned = if stop.planned { Some(true) } else { None };
        if station.is_transfer() {
            station.orientation = Orientation::Up;
            station.name_relative_to = Anchor::Up;
            station.name_offset = (0, LABEL_DY);
        } else {
            match placement.band {
                Band::Top => {
                    station.orientation = Orientation::Up;
                    station.name_relative_to = Anchor::Down;
                    station.name_offset = (0, -LABEL_DY);
                }
                Band::Bottom => {
                    station.orientation = Orientation::Down;
                    station.name_relative_to = Anchor::Up;
                    station.name_offset = (0, LABEL_DY);
                }
            }
        }
        elements.push(Element::Station(station));
    }

    let mut strip = line.derived(start, Direction::Right, elements);
    // The indicator blocks carry the logo; no terminal logos on the path.
    strip.start_logo_offset = None;
    strip.end_logo_offset = None;
    strip
}

fn draw_logo_row(canvas: &mut Canvas, placement: &Placement, center: metromap_core::Point) {
    let mut x = center.x - placement.logo_row_width / 2;
    for (logo, (w, h)) in &placement.logo_row {
        canvas.push(Node::Image {
            asset: *logo,
            x,
            y: LINE_Y - LOGO_ROW_DY - h,
            w: *w,
            h: *h,
        });
        x += w + LOGO_GAP;
    }
}

fn indicator_width(ctx: &RenderContext, art: &LineArt, terminal: &str) -> i32 {
    let name_width = ctx.measure(terminal).width.round() as i32;
    INDICATOR_LEAD
        + ARROW_LENGTH
        + INDICATOR_GAP
        + art.logo_size.0
        + INDICATOR_GAP
        + name_width
        + INDICATOR_TAIL
}

/// Arrow, line logo and terminal name at one end of the strip. `edge` is the
/// content boundary the block grows away from; `facing` Right grows
/// rightward from it, Left grows leftward (the mirrored reverse block).
fn draw_indicator(
    canvas: &mut Canvas,
    ctx: &RenderContext,
    art: &LineArt,
    terminal: &str,
    edge: i32,
    facing: Direction,
) {
    let color = art
        .solid_color
        .clone()
        .unwrap_or_else(|| ARROW_FALLBACK_COLOR.to_string());
    let metrics = ctx.measure(terminal);
    let (name_w, name_h) = (metrics.width.round() as i32, metrics.height.round() as i32);
    let (logo_w, logo_h) = art.logo_size;

    match facing {
        Direction::Right => {
            let arrow_x = edge + INDICATOR_LEAD;
            canvas.push(Node::Polygon {
                points: vec![
                    (arrow_x, LINE_Y - ARROW_HALF_HEIGHT),
                    (arrow_x, LINE_Y + ARROW_HALF_HEIGHT),
                    (arrow_x + ARROW_LENGTH, LINE_Y),
                ],
                fill: color,
            });
            let logo_x = arrow_x + ARROW_LENGTH + INDICATOR_GAP;
            if let Some(logo) = art.logo {
                canvas.push(Node::Image {
                    asset: logo,
                    x: logo_x,
                    y: LINE_Y - logo_h / 2,
                    w: logo_w,
                    h: logo_h,
                });
            }
            canvas.push(Node::Text {
                x: logo_x + logo_w + INDICATOR_GAP,
                y: LINE_Y - name_h / 2,
                content: terminal.to_string(),
                size: crate::LABEL_FONT_SIZE,
                color: "#000000".to_string(),
                align: TextAlign::Start,
            });
        }
        Direction::Left => {
            let arrow_x = edge - INDICATOR_LEAD;
            canvas.push(Node::Polygon {
                points: vec![
                    (arrow_x, LINE_Y - ARROW_HALF_HEIGHT),
                    (arrow_x, LINE_Y + ARROW_HALF_HEIGHT),
                    (arrow_x - ARROW_LENGTH, LINE_Y),
                ],
                fill: color,
            });
            let logo_x = arrow_x - ARROW_LENGTH - INDICATOR_GAP - logo_w;
            if let Some(logo) = art.logo {
                canvas.push(Node::Image {
                    asset: logo,
                    x: logo_x,
                    y: LINE_Y - logo_h / 2,
                    w: logo_w,
                    h: logo_h,
                });
            }
            canvas.push(Node::Text {
                x: logo_x - INDICATOR_GAP - name_w,
                y: LINE_Y - name_h / 2,
                content: terminal.to_string(),
                size: crate::LABEL_FONT_SIZE,
                color: "#000000".to_string(),
                align: TextAlign::Start,
            });
        }
        Direction::Up | Direction::Down => unreachable!("strips are horizontal"),
    }
}
