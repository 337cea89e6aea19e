//! Transfer connectors between station centers.
//!
//! Direct transfers read as a colored-to-white-to-colored bridge: each end
//! contributes a thick stroke in its own line color toward the midpoint, and
//! a thin white line is layered on top between the (possibly pulled-in)
//! centers. Indirect transfers are a dotted run of small filled circles.

use metromap_core::geom::Point;

use crate::scene::{Canvas, Node};

/// How far each end of a direct transfer is pulled toward the midpoint
/// before the colored strokes start.
const DIRECT_PULL: f64 = 10.0;
const DIRECT_STROKE: f64 = 9.0;
const WHITE_STROKE: f64 = 3.0;
/// Extra pull applied to the white connector when the end's line type
/// needs clearance around its transfer node.
const CLEARANCE_PULL: f64 = 7.0;

const INDIRECT_PULL: f64 = 12.5;
const INDIRECT_CLEARANCE_PULL: f64 = 1.0;
const DOT_SPACING: f64 = 6.0;
const DOT_RADIUS: f64 = 0.75;
const DOT_COLOR: &str = "rgb(134,164,193)";

/// One endpoint of a transfer connector.
#[derive(Debug, Clone)]
pub struct TransferEnd {
    /// Station center as recorded by the line walker.
    pub center: Point,
    /// Stroke color of the owning line.
    pub color: String,
    /// Whether the owning line's transfer nodes are the smaller, ringed
    /// variant that needs the connector pulled further in.
    pub extra_clearance: bool,
}

fn to_f64(p: Point) -> (f64, f64) {
    (f64::from(p.x), f64::from(p.y))
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    (dx * dx + dy * dy).sqrt()
}

/// Moves `from` by `delta` pixels along the ray toward `to`. Returns `from`
/// unchanged when the points coincide.
fn move_toward(from: (f64, f64), to: (f64, f64), delta: f64) -> (f64, f64) {
    let len = distance(from, to);
    if len == 0.0 {
        return from;
    }
    let scale = delta / len;
    (from.0 + (to.0 - from.0) * scale, from.1 + (to.1 - from.1) * scale)
}

/// Number of dot slots for an indirect connector of the given length.
fn dot_count(dist: f64) -> usize {
    (dist.round() / DOT_SPACING + 0.5).floor().max(2.0) as usize
}

fn line_node(from: (f64, f64), to: (f64, f64), color: &str, width: f64) -> Node {
    Node::StrokedLine {
        x1: from.0,
        y1: from.1,
        x2: to.0,
        y2: to.1,
        color: color.to_owned(),
        width,
    }
}

/// Draws one transfer connector onto the canvas.
pub fn draw_transfer(canvas: &mut Canvas, a: &TransferEnd, b: &TransferEnd, is_direct: bool) {
    let ca = to_f64(a.center);
    let cb = to_f64(b.center);
    let mid = ((ca.0 + cb.0) / 2.0, (ca.1 + cb.1) / 2.0);

    if is_direct {
        canvas.push(line_node(
            move_toward(ca, mid, DIRECT_PULL),
            mid,
            &a.color,
            DIRECT_STROKE,
        ));
        canvas.push(line_node(
            move_toward(cb, mid, DIRECT_PULL),
            mid,
            &b.color,
            DIRECT_STROKE,
        ));

        let mut wa = ca;
        let mut wb = cb;
        if a.extra_clearance {
            wa = move_toward(wa, mid, CLEARANCE_PULL);
        }
        if b.extra_clearance {
            wb = move_toward(wb, mid, CLEARANCE_PULL);
        }
        canvas.push(line_node(wa, wb, "white", WHITE_STROKE));
    } else {
        let pull_a = INDIRECT_PULL + if a.extra_clearance { INDIRECT_CLEARANCE_PULL } else { 0.0 };
        let pull_b = INDIRECT_PULL + if b.extra_clearance { INDIRECT_CLEARANCE_PULL } else { 0.0 };
        let da = move_toward(ca, mid, pull_a);
        let db = move_toward(cb, mid, pull_b);

        let dist = distance(da, db);
        let count = dot_count(dist);
        let delta = dist / count as f64;

        // Center the dot run: the first dot sits half of the leftover space
        // in from one end, keeping the pattern symmetric about the midpoint.
        let mut cursor = move_toward(da, db, (dist - delta * (count as f64 - 2.0)) / 2.0);
        for _ in 0..count - 1 {
            canvas.push(Node::Circle {
                cx: cursor.0,
                cy: cursor.1,
                r: DOT_RADIUS,
                fill: DOT_COLOR.to_owned(),
            });
            cursor = move_toward(cursor, db, delta);
        }
    }
}
