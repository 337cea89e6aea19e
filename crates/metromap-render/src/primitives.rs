#![forbid(unsafe_code)]

//! Reusable visual primitives: straight strips, end caps, platform markers,
//! transfer nodes, quarter-turn arcs. All extents derive from the line's
//! stroke width (9 px for flat-color lines) except the transfer node, whose
//! outer extent is a fixed glyph size per line kind.

use crate::scene::{Canvas, Node, Paint, Quadrant, axis_rect};
use metromap_core::{Anchor, Direction, LineKind, Orientation, Point, Vector, advance, vector};

/// Stroke width of a flat-color line.
pub const DEFAULT_STROKE: i32 = 9;

/// White core radius of a transfer node.
const NODE_CORE_RADIUS: f64 = 9.0;

/// Width of the little line stubs a transfer node carries along its axis.
const NODE_STUB: i32 = 5;

pub fn stroke_half(stroke: i32) -> i32 {
    stroke / 2
}

/// Along-line footprint of an end cap or platform marker base.
pub fn cap_extent(stroke: i32) -> i32 {
    stroke
}

/// Side of the square tile a quarter-turn arc occupies.
pub fn arc_extent(stroke: i32) -> i32 {
    stroke * 3
}

/// Outer extent of a transfer node glyph. Fixed sizes, not stroke-scaled:
/// 29 px for metro rings, 25 px for the smaller mcd rings.
pub fn transfer_node_extent(kind: LineKind) -> i32 {
    match kind {
        LineKind::Metro => 29,
        LineKind::Mcd => 25,
    }
}

/// Straight stretch of line: `length` px along `direction` starting at the
/// path point `from`, `stroke` px across, centered on the path.
pub fn draw_strip(
    canvas: &mut Canvas,
    paint: &Paint,
    stroke: i32,
    from: Point,
    length: i32,
    direction: Direction,
) {
    if length <= 0 {
        return;
    }
    let (x, y, w, h) = axis_rect(from, length, stroke, direction);
    canvas.push(Node::Rect {
        x,
        y,
        w,
        h,
        rx: 0,
        paint: paint.clone(),
    });
}

/// Terminus cap: a rounded bar across the line, `cap_extent` along it and
/// three strokes across. `facing` is the direction the line continues in
/// (for a first station) or arrived from the opposite of (for a last one);
/// the cap's near edge sits at `at`. Returns the cap's on-path center.
pub fn draw_end_cap(
    canvas: &mut Canvas,
    paint: &Paint,
    stroke: i32,
    at: Point,
    facing: Direction,
) -> Point {
    let along = cap_extent(stroke);
    let across = stroke * 3;
    let (w, h) = if facing.is_horizontal() {
        (along, across)
    } else {
        (across, along)
    };
    let anchor = Anchor::from_direction(facing.opposite());
    let top_left = anchor.top_left(at, w, h);
    canvas.push(Node::Rect {
        x: top_left.x,
        y: top_left.y,
        w,
        h,
        rx: stroke_half(stroke),
        paint: paint.clone(),
    });
    anchor.center(at, w, h)
}

/// Mid-line platform marker for a plain station: a capsule bump extending
/// two strokes outward from the path center in the station's own declared
/// orientation.
pub fn draw_platform(
    canvas: &mut Canvas,
    paint: &Paint,
    stroke: i32,
    center: Point,
    orientation: Orientation,
) {
    let length = stroke * 2;
    let delta: Vector = match orientation {
        Orientation::Left | Orientation::Horizontal => vector(-length, 0),
        Orientation::Right => vector(length, 0),
        Orientation::Up | Orientation::Vertical => vector(0, -length),
        Orientation::Down => vector(0, length),
    };
    let tip = center + delta;
    let (x, y) = (center.x.min(tip.x), center.y.min(tip.y));
    let (w, h) = if orientation.is_horizontal() {
        (length + stroke_half(stroke), stroke)
    } else {
        (stroke, length + stroke_half(stroke))
    };
    let half = stroke_half(stroke);
    canvas.push(Node::Rect {
        x: x - if orientation.is_horizontal() { 0 } else { half },
        y: y - if orientation.is_horizontal() { half } else { 0 },
        w,
        h,
        rx: half,
        paint: paint.clone(),
    });
}

/// Transfer node: a ring in the line's paint with a white core and stub
/// ticks along the line axis. Symmetric orientations (Horizontal/Vertical)
/// get stubs on both sides; a directional orientation (line end) gets a
/// single stub pointing that way. The node's near edge sits at `at` per
/// `anchor`; returns the glyph center.
pub fn draw_transfer_node(
    canvas: &mut Canvas,
    paint: &Paint,
    stroke: i32,
    at: Point,
    anchor: Anchor,
    orientation: Orientation,
    kind: LineKind,
) -> Point {
    let extent = transfer_node_extent(kind);
    let center = anchor.center(at, extent, extent);
    let half = extent / 2;

    let stub_dirs: &[Direction] = match orientation {
        Orientation::Horizontal => &[Direction::Left, Direction::Right],
        Orientation::Vertical => &[Direction::Up, Direction::Down],
        Orientation::Left => &[Direction::Left],
        Orientation::Right => &[Direction::Right],
        Orientation::Up => &[Direction::Up],
        Orientation::Down => &[Direction::Down],
    };
    for dir in stub_dirs {
        let start = advance(center, half - NODE_STUB, *dir);
        draw_strip(canvas, paint, stroke, start, NODE_STUB, *dir);
    }

    let ring_radius = (extent as f64 - stroke as f64) / 2.0;
    canvas.push(Node::ArcQuadrant {
        cx: center.x,
        cy: center.y,
        radius: ring_radius.round() as i32,
        stroke,
        quadrant: Quadrant::TopLeft,
        paint: paint.clone(),
    });
    canvas.push(Node::ArcQuadrant {
        cx: center.x,
        cy: center.y,
        radius: ring_radius.round() as i32,
        stroke,
        quadrant: Quadrant::TopRight,
        paint: paint.clone(),
    });
    canvas.push(Node::ArcQuadrant {
        cx: center.x,
        cy: center.y,
        radius: ring_radius.round() as i32,
        stroke,
        quadrant: Quadrant::BottomRight,
        paint: paint.clone(),
    });
    canvas.push(Node::ArcQuadrant {
        cx: center.x,
        cy: center.y,
        radius: ring_radius.round() as i32,
        stroke,
        quadrant: Quadrant::BottomLeft,
        paint: paint.clone(),
    });
    canvas.push(Node::Circle {
        cx: center.x as f64,
        cy: center.y as f64,
        r: NODE_CORE_RADIUS,
        fill: "#FFFFFF".to_string(),
    });

    center
}

/// Which quarter of the arc circle a turn occupies, for the 8 valid
/// (incoming, outgoing) direction pairs.
pub fn turn_quadrant(from: Direction, to: Direction) -> Quadrant {
    use Direction::*;
    match (from, to) {
        (Right, Down) | (Up, Left) => Quadrant::TopRight,
        (Right, Up) | (Down, Left) => Quadrant::BottomRight,
        (Down, Right) | (Left, Up) => Quadrant::BottomLeft,
        (Up, Right) | (Left, Down) => Quadrant::TopLeft,
        _ => unreachable!("turn from {from:?} to {to:?} is not a quarter turn"),
    }
}

/// Per-pair pixel nudge aligning the arc tile with the inclusive-pixel
/// coordinates of the straight strips (leftward and upward strips own their
/// far pixel, so arcs meeting them shift by one).
fn turn_nudge(from: Direction, to: Direction) -> Vector {
    let mut nudge = vector(0, 0);
    if from == Direction::Left || to == Direction::Left {
        nudge.x += 1;
    }
    if from == Direction::Up || to == Direction::Up {
        nudge.y += 1;
    }
    nudge
}

/// Quarter-turn arc entered at path point `entry` travelling `from`, leaving
/// towards `to`. The centerline radius matches the walker's two-step cursor
/// advance so strip tangents meet the arc ends.
pub fn draw_turn_arc(
    canvas: &mut Canvas,
    paint: &Paint,
    stroke: i32,
    entry: Point,
    from: Direction,
    to: Direction,
) {
    let radius = arc_extent(stroke) - stroke_half(stroke);
    let center = advance(entry, radius, to) + turn_nudge(from, to);
    canvas.push(Node::ArcQuadrant {
        cx: center.x,
        cy: center.y,
        radius,
        stroke,
        quadrant: turn_quadrant(from, to),
        paint: paint.clone(),
    });
}

/// `Anchor` equivalent of a facing direction: the box edge the anchor point
/// sits on.
trait AnchorExt {
    fn from_direction(direction: Direction) -> Anchor;
}

impl AnchorExt for Anchor {
    fn from_direction(direction: Direction) -> Anchor {
        match direction {
            Direction::Left => Anchor::Left,
            Direction::Up => Anchor::Up,
            Direction::Right => Anchor::Right,
            Direction::Down => Anchor::Down,
        }
    }
}
