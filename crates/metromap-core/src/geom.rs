#![forbid(unsafe_code)]

//! Integer pixel geometry. All map layout is whole-pixel math; nothing here
//! is sub-pixel.

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<i32, Unit>;
pub type Vector = euclid::Vector2D<i32, Unit>;

pub fn point(x: i32, y: i32) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: i32, y: i32) -> Vector {
    euclid::vec2(x, y)
}

/// One of the four cardinal screen directions (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    pub fn clockwise(self) -> Self {
        match self {
            Self::Left => Self::Up,
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
        }
    }

    pub fn counterclockwise(self) -> Self {
        self.clockwise().clockwise().clockwise()
    }

    pub fn opposite(self) -> Self {
        self.clockwise().clockwise()
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    pub fn unit(self) -> Vector {
        match self {
            Self::Left => vector(-1, 0),
            Self::Up => vector(0, -1),
            Self::Right => vector(1, 0),
            Self::Down => vector(0, 1),
        }
    }

    /// The glyph axis a line travelling in this direction lies along.
    pub fn axis(self) -> Orientation {
        if self.is_horizontal() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

/// Glyph orientation: a facing direction for asymmetric glyphs (end caps,
/// platform markers) or an axis for symmetric ones (transfer nodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Left,
    Up,
    Right,
    Down,
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::Horizontal)
    }
}

impl From<Direction> for Orientation {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Left => Self::Left,
            Direction::Up => Self::Up,
            Direction::Right => Self::Right,
            Direction::Down => Self::Down,
        }
    }
}

/// Which point of a glyph's bounding box an anchor coordinate refers to when
/// compositing it onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    TopLeft,
    Left,
    Up,
    Right,
    Down,
    Center,
}

impl Anchor {
    /// Top-left corner of a `w`×`h` glyph anchored at `at`.
    pub fn top_left(self, at: Point, w: i32, h: i32) -> Point {
        let (half_w, half_h) = (w / 2, h / 2);
        match self {
            Self::TopLeft => at,
            Self::Left => point(at.x, at.y - half_h),
            Self::Right => point(at.x - (w - 1), at.y - half_h),
            Self::Up => point(at.x - half_w, at.y),
            Self::Down => point(at.x - half_w, at.y - (h - 1)),
            Self::Center => point(at.x - half_w, at.y - half_h),
        }
    }

    /// Center pixel of a `w`×`h` glyph anchored at `at`. This is what the
    /// walker records as a station center.
    pub fn center(self, at: Point, w: i32, h: i32) -> Point {
        self.top_left(at, w, h) + vector(w / 2, h / 2)
    }
}

/// Moves `p` by `delta` pixels along `direction`.
pub fn advance(p: Point, delta: i32, direction: Direction) -> Point {
    p + direction.unit() * delta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_turns_cycle() {
        assert_eq!(Direction::Left.clockwise(), Direction::Up);
        assert_eq!(Direction::Up.clockwise(), Direction::Right);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
        assert_eq!(Direction::Down.counterclockwise(), Direction::Right);
        for d in [
            Direction::Left,
            Direction::Up,
            Direction::Right,
            Direction::Down,
        ] {
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn advance_moves_along_axis() {
        let p = point(10, 10);
        assert_eq!(advance(p, 5, Direction::Right), point(15, 10));
        assert_eq!(advance(p, 5, Direction::Up), point(10, 5));
    }

    #[test]
    fn anchor_center_round_trips() {
        // A glyph anchored by its left edge midpoint is centered half its
        // width to the right of the anchor point.
        let c = Anchor::Left.center(point(100, 50), 29, 29);
        assert_eq!(c, point(114, 50));
        assert_eq!(Anchor::Center.center(point(100, 50), 29, 29), point(100, 50));
        assert_eq!(
            Anchor::TopLeft.top_left(point(3, 4), 10, 10),
            point(3, 4)
        );
    }

    #[test]
    fn direction_parses_from_json() {
        let d: Direction = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(d, Direction::Right);
    }
}
