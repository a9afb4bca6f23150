//! Walled hex map
//!
//! The map is a zero-based square of `size x size` axial coordinates. A
//! coordinate is valid iff `0 <= x < size && 0 <= y < size`; the pathfinder,
//! generator and scenario loader all go through [`Map::is_valid`].

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::error::GameError;

/// What occupies a map cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    #[default]
    Empty,
    Wall,
}

/// Bounded grid of cells
#[derive(Clone, Debug)]
pub struct Map {
    size: usize,
    cells: Vec<CellKind>,
}

impl Map {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![CellKind::Empty; size * size],
        }
    }

    /// Side length of the square
    pub fn size(&self) -> usize {
        self.size
    }

    /// Check if a coordinate is on the map
    pub fn is_valid(&self, c: Coord) -> bool {
        c.x >= 0 && c.y >= 0 && (c.x as usize) < self.size && (c.y as usize) < self.size
    }

    /// Row-major index of a coordinate, if valid
    pub(crate) fn index(&self, c: Coord) -> Option<usize> {
        self.is_valid(c)
            .then(|| c.y as usize * self.size + c.x as usize)
    }

    pub(crate) fn coord_of(&self, index: usize) -> Coord {
        Coord::new((index % self.size) as i32, (index / self.size) as i32)
    }

    /// Cell kind at a coordinate
    pub fn cell_at(&self, c: Coord) -> Result<CellKind, GameError> {
        self.index(c)
            .map(|i| self.cells[i])
            .ok_or(GameError::OutOfBounds(c))
    }

    pub fn is_wall(&self, c: Coord) -> bool {
        matches!(self.cell_at(c), Ok(CellKind::Wall))
    }

    /// Flip a cell between Empty and Wall, returning the new kind
    pub fn toggle_wall(&mut self, c: Coord) -> Result<CellKind, GameError> {
        let i = self.index(c).ok_or(GameError::OutOfBounds(c))?;
        let next = match self.cells[i] {
            CellKind::Empty => CellKind::Wall,
            CellKind::Wall => CellKind::Empty,
        };
        self.cells[i] = next;
        Ok(next)
    }

    /// Iterate every coordinate on the map, row by row
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.cells.len()).map(move |i| self.coord_of(i))
    }

    /// Iterate wall coordinates
    pub fn walls(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &kind)| kind == CellKind::Wall)
            .map(move |(i, _)| self.coord_of(i))
    }

    pub fn wall_count(&self) -> usize {
        self.cells.iter().filter(|&&k| k == CellKind::Wall).count()
    }
}
