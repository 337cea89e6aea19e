#![forbid(unsafe_code)]

//! Retained scene the layout passes draw into. A [`Canvas`] is a display
//! list plus framing (background, rounded corners, horizontal padding); the
//! `svg` module serializes it, the facade crate rasterizes the SVG.

use crate::assets::AssetId;
use metromap_core::Point;

/// How a shape is filled or stroked: a CSS color, or a style image tiled as
/// an SVG pattern (textured line styles).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paint {
    Color(String),
    Asset(AssetId),
}

/// Quarter of an annulus, named by where the quarter sits relative to the
/// arc's circle center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Horizontal alignment of a text box around its layout x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Start,
    Middle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rect {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        rx: i32,
        paint: Paint,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: String,
    },
    StrokedLine {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: String,
        width: f64,
    },
    /// Quarter-turn arc: a stroked circular arc of the given centerline
    /// radius, stroke width `stroke`, occupying `quadrant` of the circle
    /// centered at (`cx`, `cy`).
    ArcQuadrant {
        cx: i32,
        cy: i32,
        radius: i32,
        stroke: i32,
        quadrant: Quadrant,
        paint: Paint,
    },
    /// Filled triangle, used for direction-indicator arrows.
    Polygon {
        points: Vec<(i32, i32)>,
        fill: String,
    },
    Image {
        asset: AssetId,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    },
    /// Text box: (`x`, `y`) is the box top edge at the aligned x; the
    /// serializer derives the baseline from the font size.
    Text {
        x: i32,
        y: i32,
        content: String,
        size: f64,
        color: String,
        align: TextAlign,
    },
}

#[derive(Debug, Clone)]
pub struct Canvas {
    width: i32,
    height: i32,
    /// Width of the drawn strip itself; stays put when the canvas is padded,
    /// so the background and rounded frame keep hugging the content.
    frame_width: i32,
    pub background: Option<String>,
    /// Radius for alpha-clearing the four frame corners (rounded frame).
    pub corner_radius: Option<i32>,
    /// Translation applied to all content, used to center a strip inside a
    /// padded frame.
    content_offset: (i32, i32),
    nodes: Vec<Node>,
}

impl Canvas {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            frame_width: width,
            background: None,
            corner_radius: None,
            content_offset: (0, 0),
            nodes: Vec::new(),
        }
    }

    pub fn with_background(width: i32, height: i32, color: &str) -> Self {
        let mut canvas = Self::new(width, height);
        canvas.background = Some(color.to_string());
        canvas
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn content_offset(&self) -> (i32, i32) {
        self.content_offset
    }

    pub fn frame_width(&self) -> i32 {
        self.frame_width
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Widens the canvas to `target` pixels, keeping the drawn content
    /// horizontally centered; the new margin is transparent fill.
    pub fn pad_width_to(&mut self, target: i32) {
        if target <= self.width {
            return;
        }
        self.content_offset.0 += (target - self.width) / 2;
        self.width = target;
    }

    /// Next width on a `grid`-pixel framing grid with an odd multiple count.
    pub fn padded_grid_width(width: i32, grid: i32) -> i32 {
        let mut multiple = ((width + grid - 1) / grid).max(1);
        if multiple % 2 == 0 {
            multiple += 1;
        }
        multiple * grid
    }
}

/// Shorthand used throughout the drawing passes: a rect covering `length`
/// pixels along an axis, `breadth` across, centered on the path point `from`
/// across the travel axis.
pub fn axis_rect(
    from: Point,
    length: i32,
    breadth: i32,
    direction: metromap_core::Direction,
) -> (i32, i32, i32, i32) {
    use metromap_core::Direction;
    let half = breadth / 2;
    match direction {
        Direction::Right => (from.x, from.y - half, length, breadth),
        Direction::Left => (from.x - length + 1, from.y - half, length, breadth),
        Direction::Down => (from.x - half, from.y, breadth, length),
        Direction::Up => (from.x - half, from.y - length + 1, breadth, length),
    }
}
