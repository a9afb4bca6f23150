//! Single-source shortest paths over the hex map
//!
//! Breadth-first search with unit edge weights. Walls and cells held by living
//! mobs other than the searching mob are impassable. Results describe one
//! source only and are thrown away on the next run.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::coord::{Coord, DIRECTIONS};
use crate::error::GameError;
use crate::map::Map;
use crate::mob::{MobId, MobManager};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Iteration cap for a single run
pub const MAX_ITERATIONS: usize = 1_000_000;

/// Queue length cap for a single run
pub const MAX_QUEUE_LEN: usize = 100_000;

// ============================================================================
// TYPES
// ============================================================================

/// Search state of a cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VisitState {
    #[default]
    Unvisited,
    Open,
    Closed,
}

/// Per-cell search result
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathCell {
    /// Steps from the source; `None` if never reached
    pub distance: Option<u32>,
    /// Previous cell on a shortest path
    pub predecessor: Option<Coord>,
    pub state: VisitState,
    pub reachable: bool,
}

/// Runaway guards for a search
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfinderLimits {
    pub max_iterations: usize,
    pub max_queue_len: usize,
}

impl Default for PathfinderLimits {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            max_queue_len: MAX_QUEUE_LEN,
        }
    }
}

/// Distance and predecessor table for one source
#[derive(Clone, Debug)]
pub struct Pathfinder {
    size: usize,
    cells: Vec<PathCell>,
    source: Option<Coord>,
    limits: PathfinderLimits,
}

impl Pathfinder {
    pub fn new(size: usize) -> Self {
        Self::with_limits(size, PathfinderLimits::default())
    }

    pub fn with_limits(size: usize, limits: PathfinderLimits) -> Self {
        Self {
            size,
            cells: vec![PathCell::default(); size * size],
            source: None,
            limits,
        }
    }

    /// Source of the last successful run
    pub fn source(&self) -> Option<Coord> {
        self.source
    }

    pub fn limits(&self) -> PathfinderLimits {
        self.limits
    }

    fn index(&self, c: Coord) -> Option<usize> {
        let in_bounds =
            c.x >= 0 && c.y >= 0 && (c.x as usize) < self.size && (c.y as usize) < self.size;
        in_bounds.then(|| c.y as usize * self.size + c.x as usize)
    }

    /// Result cell for a coordinate (`None` off the map)
    pub fn cell(&self, c: Coord) -> Option<&PathCell> {
        self.index(c).map(|i| &self.cells[i])
    }

    /// Steps from the source, `None` if unreachable
    pub fn distance(&self, c: Coord) -> Option<u32> {
        self.cell(c).and_then(|p| p.distance)
    }

    pub fn is_reachable(&self, c: Coord) -> bool {
        self.cell(c).is_some_and(|p| p.reachable)
    }

    /// Iterate every reachable coordinate and its distance
    pub fn reachable(&self) -> impl Iterator<Item = (Coord, u32)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, p)| {
            let c = Coord::new((i % self.size) as i32, (i / self.size) as i32);
            match (p.reachable, p.distance) {
                (true, Some(d)) => Some((c, d)),
                _ => None,
            }
        })
    }

    // ========================================================================
    // SEARCH
    // ========================================================================

    /// Recompute distances from `source`
    pub fn run(&mut self, source: Coord, map: &Map, mobs: &MobManager) -> Result<(), GameError> {
        self.source = None;
        self.cells.fill(PathCell::default());

        let start = self.index(source).ok_or(GameError::OutOfBounds(source))?;
        let source_mob = mobs.mob_at(source);

        self.cells[start].distance = Some(0);
        self.cells[start].state = VisitState::Open;

        let mut queue = VecDeque::new();
        queue.push_back(source);
        let mut iterations = 0usize;

        while let Some(current) = queue.pop_front() {
            if iterations > self.limits.max_iterations || queue.len() > self.limits.max_queue_len {
                tracing::warn!(
                    "pathfinder stuck from {}: iterations {}, queue {}",
                    source,
                    iterations,
                    queue.len()
                );
                return Err(GameError::SearchOverflow {
                    iterations,
                    queue_len: queue.len(),
                });
            }
            iterations += 1;

            let Some(ci) = self.index(current) else { continue };
            if self.cells[ci].state == VisitState::Closed {
                continue;
            }
            self.cells[ci].state = VisitState::Closed;
            self.cells[ci].reachable = true;

            let Some(current_distance) = self.cells[ci].distance else {
                continue;
            };
            let candidate = current_distance + 1;

            for diff in DIRECTIONS {
                let neighbor = current + diff;
                let Some(ni) = self.index(neighbor) else { continue };
                if !map.is_valid(neighbor) || map.is_wall(neighbor) {
                    continue;
                }
                if mobs.mob_at(neighbor).is_some_and(|id| Some(id) != source_mob) {
                    continue;
                }

                let n = &mut self.cells[ni];
                if n.state == VisitState::Closed {
                    continue;
                }
                if n.state == VisitState::Unvisited || n.distance.map_or(true, |d| candidate < d) {
                    n.distance = Some(candidate);
                    n.predecessor = Some(current);
                    n.state = VisitState::Open;
                    queue.push_back(neighbor);
                }
            }
        }

        self.source = Some(source);
        tracing::trace!("pathfinder from {} closed after {} iterations", source, iterations);
        Ok(())
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Shortest route to `target`, stored target-first and without the source.
    ///
    /// The last element is the first step to take. Empty when the target is
    /// the source or cannot be reached.
    pub fn path_to(&self, target: Coord) -> Vec<Coord> {
        let mut path = Vec::new();
        let mut current = target;

        loop {
            let Some(cell) = self.cell(current) else {
                return Vec::new();
            };
            match (cell.distance, cell.predecessor) {
                (Some(0), _) => break,
                (Some(_), Some(prev)) if cell.reachable => {
                    path.push(current);
                    current = prev;
                }
                _ => return Vec::new(),
            }
            if path.len() > self.cells.len() {
                tracing::warn!("predecessor chain toward {} loops", target);
                return Vec::new();
            }
        }

        path
    }

    /// Graph distance into `target`, which may itself be occupied.
    ///
    /// A reachable target reports its own distance; otherwise this is one more
    /// than the closest reachable neighbor.
    pub fn distance_to(&self, target: Coord) -> Option<u32> {
        if self.is_reachable(target) {
            return self.distance(target);
        }
        target
            .neighbors()
            .into_iter()
            .filter(|&n| self.is_reachable(n))
            .filter_map(|n| self.distance(n))
            .min()
            .map(|d| d + 1)
    }

    /// Walk a mob along `path` one hex per AP.
    ///
    /// Steps are taken from the end of `path` (the step nearest the source)
    /// and removed from it. Stops when AP runs out, the path is consumed, or
    /// a step is rejected. Returns the number of steps taken.
    pub fn move_as_far_as_possible(
        map: &Map,
        mobs: &mut MobManager,
        mob: MobId,
        path: &mut Vec<Coord>,
    ) -> u32 {
        let mut steps = 0;
        while let Some(&next) = path.last() {
            match mobs.move_mob(map, mob, next) {
                Ok(()) => {
                    path.pop();
                    steps += 1;
                }
                Err(e) => {
                    tracing::debug!("mob {:?} stopped before {}: {}", mob, next, e);
                    break;
                }
            }
        }
        steps
    }
}
