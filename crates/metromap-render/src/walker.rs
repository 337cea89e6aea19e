#![forbid(unsafe_code)]

//! The line-drawing state machine: walks a line's element sequence with a
//! cursor position and facing direction, emitting the right primitive for
//! each element and deriving drawn segment lengths from the neighbors'
//! footprints.

use crate::error::Result;
use crate::primitives::{
    arc_extent, cap_extent, draw_end_cap, draw_platform, draw_strip, draw_transfer_node,
    draw_turn_arc, stroke_half, transfer_node_extent,
};
use crate::scene::{Canvas, Node, Paint};
use crate::{LineArt, RenderContext};
use metromap_core::{
    Anchor, Direction, Element, Error as CoreError, Line, LineKind, Orientation, Point, advance,
};

/// Station centers in element order, as drawn. Keys are station names;
/// callers that need network-wide lookup pair them with the line name.
pub type StationCenters = Vec<(String, Point)>;

/// Footprint a segment loses to the element before it. The extra pixel on
/// the leading side (stations only) keeps the shared joint pixel from being
/// drawn twice.
fn lead_correction(stroke: i32, kind: LineKind, prev: Option<&Element>) -> i32 {
    match prev {
        Some(Element::Station(s)) if s.is_transfer() => transfer_node_extent(kind) / 2 + 1,
        Some(Element::Station(_)) => cap_extent(stroke) / 2 + 1,
        Some(Element::Turn(_)) => arc_extent(stroke) - stroke_half(stroke),
        _ => 0,
    }
}

/// Footprint lost to the element after it. No extra pixel on this side; the
/// turn correction is one smaller than the leading one, mirroring the
/// walker's two-step arc advance.
fn trail_correction(stroke: i32, kind: LineKind, next: Option<&Element>) -> i32 {
    match next {
        Some(Element::Station(s)) if s.is_transfer() => transfer_node_extent(kind) / 2,
        Some(Element::Station(_)) => cap_extent(stroke) / 2,
        Some(Element::Turn(_)) => arc_extent(stroke) - stroke_half(stroke) - 1,
        _ => 0,
    }
}

fn paint_for<'a>(art: &'a LineArt, planned: bool) -> &'a Paint {
    if planned {
        art.planned_paint.as_ref().unwrap_or(&art.paint)
    } else {
        &art.paint
    }
}

fn anchor_towards(direction: Direction) -> Anchor {
    match direction {
        Direction::Left => Anchor::Left,
        Direction::Up => Anchor::Up,
        Direction::Right => Anchor::Right,
        Direction::Down => Anchor::Down,
    }
}

/// Draws `line` onto `canvas` and returns the station centers the label and
/// transfer passes anchor to.
pub fn draw_line(ctx: &RenderContext, line: &Line, canvas: &mut Canvas) -> Result<StationCenters> {
    if line.elements.is_empty() {
        return Err(CoreError::EmptyLine {
            line: line.name.clone(),
        }
        .into());
    }

    let art = ctx.line_art(line)?;
    let stroke = art.stroke;
    let last = line.elements.len() - 1;

    let mut pos = line.start;
    let mut direction = line.direction;
    let mut centers: StationCenters = Vec::new();

    for (index, element) in line.elements.iter().enumerate() {
        let planned = line.is_actually_planned(index);
        let paint = paint_for(&art, planned);

        match element {
            Element::Station(station) => {
                let center = if index == 0 {
                    let center = if station.is_transfer() {
                        draw_transfer_node(
                            canvas,
                            paint,
                            stroke,
                            pos,
                            anchor_towards(direction.opposite()),
                            direction.into(),
                            line.kind,
                        )
                    } else {
                        draw_end_cap(canvas, paint, stroke, pos, direction)
                    };
                    let extent = if station.is_transfer() {
                        transfer_node_extent(line.kind)
                    } else {
                        cap_extent(stroke)
                    };
                    pos = advance(pos, extent / 2 + 1, direction);
                    center
                } else if index != last {
                    if station.is_transfer() {
                        let orientation = if direction.is_horizontal() {
                            Orientation::Horizontal
                        } else {
                            Orientation::Vertical
                        };
                        let center = draw_transfer_node(
                            canvas,
                            paint,
                            stroke,
                            pos,
                            anchor_towards(direction.opposite()),
                            orientation,
                            line.kind,
                        );
                        pos = advance(pos, transfer_node_extent(line.kind), direction);
                        center
                    } else {
                        let extent = cap_extent(stroke);
                        let center = advance(pos, extent / 2, direction);
                        draw_platform(canvas, paint, stroke, center, station.orientation);
                        pos = advance(pos, extent, direction);
                        center
                    }
                } else if station.is_transfer() {
                    draw_transfer_node(
                        canvas,
                        paint,
                        stroke,
                        pos,
                        anchor_towards(direction.opposite()),
                        direction.opposite().into(),
                        line.kind,
                    )
                } else {
                    draw_end_cap(canvas, paint, stroke, pos, direction)
                };
                centers.push((station.name.clone(), center));
            }

            Element::Segment(segment) => {
                let lead = lead_correction(stroke, line.kind, index.checked_sub(1).map(|i| &line.elements[i]));
                let trail = trail_correction(stroke, line.kind, line.elements.get(index + 1));
                let effective = segment.length - lead - trail;
                if effective < 0 {
                    return Err(CoreError::SegmentTooShort {
                        line: line.name.clone(),
                        index,
                        length: effective,
                    }
                    .into());
                }
                draw_strip(canvas, paint, stroke, pos, effective, direction);
                pos = advance(pos, effective, direction);
            }

            Element::Turn(turn) => {
                if turn.direction == direction || turn.direction == direction.opposite() {
                    return Err(CoreError::InvalidLine {
                        name: line.name.clone(),
                        message: format!(
                            "turn at element {index} from {direction:?} to {:?} is not a quarter turn",
                            turn.direction
                        ),
                    }
                    .into());
                }
                draw_turn_arc(canvas, paint, stroke, pos, direction, turn.direction);
                // Two straight-line projections standing in for the curved
                // displacement; the old-direction step is one pixel shorter.
                pos = advance(pos, arc_extent(stroke) - stroke_half(stroke) - 1, direction);
                direction = turn.direction;
                pos = advance(pos, arc_extent(stroke) - stroke_half(stroke), direction);
            }
        }
    }

    draw_terminal_logos(ctx, line, &art, &centers, canvas);
    tracing::trace!(line = %line.name, stations = centers.len(), "line drawn");
    Ok(centers)
}

fn draw_terminal_logos(
    _ctx: &RenderContext,
    line: &Line,
    art: &LineArt,
    centers: &StationCenters,
    canvas: &mut Canvas,
) {
    let Some(logo) = art.logo else {
        return;
    };
    let (w, h) = art.logo_size;
    let mut place = |center: Point, offset: (i32, i32)| {
        canvas.push(Node::Image {
            asset: logo,
            x: center.x + offset.0 - w / 2,
            y: center.y + offset.1 - h / 2,
            w,
            h,
        });
    };
    if let (Some(offset), Some((_, center))) = (line.start_logo_offset, centers.first()) {
        place(*center, offset);
    }
    if let (Some(offset), Some((_, center))) = (line.end_logo_offset, centers.last()) {
        place(*center, offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetStore;
    use crate::{RenderContext, RenderOptions};
    use metromap_core::{Network, point};

    fn simple_network(elements: serde_json::Value) -> Network {
        let doc = serde_json::json!({
            "image_resolution": [300, 600],
            "info_filename": "info.png",
            "font_filename": "map.ttf",
            "lines": [{
                "name": "Тестовая",
                "line_color": "#d6083b",
                "logo_filename": "logo.png",
                "priority": 1,
                "start": [0, 0],
                "direction": "right",
                "elements": elements
            }]
        });
        Network::from_json_str(&doc.to_string()).unwrap()
    }

    fn draw(network: &Network) -> (Canvas, StationCenters) {
        let assets = AssetStore::new();
        let options = RenderOptions::default();
        let ctx = RenderContext::new(network, &assets, &options);
        let mut canvas = Canvas::new(600, 300);
        let centers = draw_line(&ctx, &network.lines()[0], &mut canvas).unwrap();
        (canvas, centers)
    }

    #[test]
    fn two_station_line_draws_adjusted_strip() {
        let network = simple_network(serde_json::json!([
            { "type": "station", "name": "А" },
            { "type": "line_segment", "length": 100 },
            { "type": "station", "name": "Б" }
        ]));
        let (canvas, centers) = draw(&network);

        // End cap half-width is 4: strip length 100 - (4 + 1) - 4 = 91.
        let strips: Vec<_> = canvas
            .nodes()
            .iter()
            .filter_map(|n| match n {
                Node::Rect { x, w, rx: 0, .. } => Some((*x, *w)),
                _ => None,
            })
            .collect();
        assert!(strips.contains(&(5, 91)), "strips: {strips:?}");

        // Centers: first cap centered 4 px in, last 100 px out.
        assert_eq!(centers[0], ("А".to_string(), point(4, 0)));
        assert_eq!(centers[1], ("Б".to_string(), point(100, 0)));
    }

    #[test]
    fn straight_line_conserves_path_length() {
        let network = simple_network(serde_json::json!([
            { "type": "station", "name": "А" },
            { "type": "line_segment", "length": 100 },
            { "type": "station", "name": "Б" },
            { "type": "line_segment", "length": 80 },
            { "type": "station", "name": "В" }
        ]));
        let (_, centers) = draw(&network);
        // Plain-station corrections cancel pairwise: every center lands at
        // the nominal distance from the line's start anchor.
        assert_eq!(centers[0].1, point(4, 0));
        assert_eq!(centers[1].1, point(100, 0));
        assert_eq!(centers[2].1, point(180, 0));
    }

    #[test]
    fn too_short_segment_is_fatal() {
        let network = simple_network(serde_json::json!([
            { "type": "station", "name": "А" },
            { "type": "line_segment", "length": 8 },
            { "type": "station", "name": "Б" }
        ]));
        let assets = AssetStore::new();
        let options = RenderOptions::default();
        let ctx = RenderContext::new(&network, &assets, &options);
        let mut canvas = Canvas::new(600, 300);
        let err = draw_line(&ctx, &network.lines()[0], &mut canvas).unwrap_err();
        assert!(
            matches!(
                err,
                crate::Error::Core(CoreError::SegmentTooShort { index: 1, .. })
            ),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn turn_updates_direction_and_advances_both_axes() {
        let network = simple_network(serde_json::json!([
            { "type": "station", "name": "А" },
            { "type": "line_segment", "length": 100 },
            { "type": "turn", "direction": "down" },
            { "type": "line_segment", "length": 100 },
            { "type": "station", "name": "Б" }
        ]));
        let (canvas, centers) = draw(&network);
        assert!(
            canvas
                .nodes()
                .iter()
                .any(|n| matches!(n, Node::ArcQuadrant { .. }))
        );
        // The final station lies below and to the right of the start.
        let b = centers[1].1;
        assert!(b.x > 0 && b.y > 0, "center: {b:?}");
    }

    #[test]
    fn half_turn_is_rejected() {
        let network = simple_network(serde_json::json!([
            { "type": "station", "name": "А" },
            { "type": "line_segment", "length": 100 },
            { "type": "turn", "direction": "left" },
            { "type": "line_segment", "length": 100 },
            { "type": "station", "name": "Б" }
        ]));
        let assets = AssetStore::new();
        let options = RenderOptions::default();
        let ctx = RenderContext::new(&network, &assets, &options);
        let mut canvas = Canvas::new(600, 300);
        let err = draw_line(&ctx, &network.lines()[0], &mut canvas).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Core(CoreError::InvalidLine { .. })
        ));
    }

    #[test]
    fn single_station_line_is_legal() {
        let network = simple_network(serde_json::json!([
            { "type": "station", "name": "Единственная" }
        ]));
        let (canvas, centers) = draw(&network);
        assert_eq!(centers.len(), 1);
        assert!(!canvas.nodes().is_empty());
    }

    #[test]
    fn planned_stretch_uses_planned_paint() {
        let doc = serde_json::json!({
            "image_resolution": [300, 600],
            "info_filename": "info.png",
            "font_filename": "map.ttf",
            "lines": [{
                "name": "Тестовая",
                "line_color": "#d6083b",
                "planned_line_color": "#f4a9b8",
                "logo_filename": "logo.png",
                "priority": 1,
                "start": [0, 0],
                "direction": "right",
                "elements": [
                    { "type": "station", "name": "А" },
                    { "type": "line_segment", "length": 100 },
                    { "type": "station", "name": "Б" },
                    { "type": "line_segment", "length": 100 },
                    { "type": "station", "name": "В", "is_planned": true }
                ]
            }]
        });
        let network = Network::from_json_str(&doc.to_string()).unwrap();
        let (canvas, _) = draw(&network);
        let planned_strips = canvas
            .nodes()
            .iter()
            .filter(|n| {
                matches!(n, Node::Rect { paint: Paint::Color(c), rx: 0, .. } if c == "#f4a9b8")
            })
            .count();
        // The second segment and the planned terminus render planned.
        assert!(planned_strips >= 1, "nodes: {:?}", canvas.nodes());
    }

    #[test]
    fn transfer_station_renders_node_not_platform() {
        let doc = serde_json::json!({
            "image_resolution": [300, 600],
            "info_filename": "info.png",
            "font_filename": "map.ttf",
            "lines": [
                {
                    "name": "Первая",
                    "line_color": "#d6083b",
                    "logo_filename": "logo1.png",
                    "priority": 1,
                    "start": [0, 100],
                    "direction": "right",
                    "elements": [
                        { "type": "station", "name": "А" },
                        { "type": "line_segment", "length": 100 },
                        { "type": "station", "name": "Пересадочная" },
                        { "type": "line_segment", "length": 100 },
                        { "type": "station", "name": "Б" }
                    ]
                },
                {
                    "name": "Вторая",
                    "line_color": "#0078bf",
                    "logo_filename": "logo2.png",
                    "priority": 2,
                    "start": [104, 0],
                    "direction": "down",
                    "elements": [
                        { "type": "station", "name": "В" },
                        { "type": "line_segment", "length": 100 },
                        { "type": "station", "name": "Г" }
                    ]
                }
            ],
            "transfers": [{
                "station1": { "line_name": "Первая", "station_name": "Пересадочная" },
                "station2": { "line_name": "Вторая", "station_name": "Г" },
                "is_direct": true
            }]
        });
        let network = Network::from_json_str(&doc.to_string()).unwrap();
        let (canvas, centers) = draw(&network);
        // Ring arcs plus the white core circle mark a transfer node.
        assert!(
            canvas
                .nodes()
                .iter()
                .any(|n| matches!(n, Node::Circle { fill, .. } if fill == "#FFFFFF"))
        );
        // The node's lead/trail corrections offset its 29 px advance, so the
        // path length is conserved through a transfer node too: Б's center
        // lands at the nominal 200 px from the line start.
        let b = centers.iter().find(|(n, _)| n == "Б").unwrap().1;
        assert_eq!(b, point(200, 100), "center: {b:?}");
    }
}
