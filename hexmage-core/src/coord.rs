//! Hex grid geometry with axial coordinates

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Distance between two hexes
    pub fn distance_to(&self, other: Coord) -> u32 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        let ds = ((self.x + self.y) - (other.x + other.y)).abs();
        ((dx + dy + ds) / 2) as u32
    }

    /// Distance from the origin
    pub fn length(&self) -> u32 {
        self.distance_to(Coord::new(0, 0))
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: usize) -> Coord {
        *self + DIRECTIONS[direction % 6]
    }

    /// All six neighbors, in `DIRECTIONS` order
    pub fn neighbors(&self) -> [Coord; 6] {
        DIRECTIONS.map(|d| *self + d)
    }

    /// Unit step toward `target` along the sign of each axis of the delta.
    ///
    /// Returns `None` when already there. A diagonal sign pair that is not a
    /// hex neighbor (`(1,1)` or `(-1,-1)`) is reduced to its x component.
    pub fn sign_step_toward(&self, target: Coord) -> Option<Coord> {
        let d = target - *self;
        let step = Coord::new(d.x.signum(), d.y.signum());
        match (step.x, step.y) {
            (0, 0) => None,
            (sx, sy) if sx == sy => Some(*self + Coord::new(sx, 0)),
            _ => Some(*self + step),
        }
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Direction vectors in axial coordinates (dx, dy)
pub const DIRECTIONS: [Coord; 6] = [
    Coord::new(-1, 0),
    Coord::new(1, 0),
    Coord::new(0, -1),
    Coord::new(0, 1),
    Coord::new(1, -1),
    Coord::new(-1, 1),
];
