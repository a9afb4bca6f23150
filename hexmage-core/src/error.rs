//! Error types
//!
//! Two families:
//! - [`GameError`]: precondition violations. Callers asked for something that
//!   cannot be answered (out-of-range coordinate, no active mob, stale paths).
//! - [`ActionError`]: a move or ability that the rules reject. These are
//!   ordinary outcomes and leave the game state untouched.

use crate::coord::Coord;
use crate::mob::{MobId, TeamId};

/// Precondition violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("coordinate {0} is outside the map")]
    OutOfBounds(Coord),

    #[error("the current turn is done, no mob is active")]
    TurnDone,

    #[error("unknown mob {0:?}")]
    UnknownMob(MobId),

    #[error("unknown team {0:?}")]
    UnknownTeam(TeamId),

    #[error("pathfinder results are stale, call refresh() first")]
    StalePaths,

    #[error("pathfinder gave up after {iterations} iterations (queue length {queue_len})")]
    SearchOverflow { iterations: usize, queue_len: usize },

    #[error("cell {0} is already occupied or walled")]
    CellOccupied(Coord),

    #[error("map has {available} free cells, {needed} needed")]
    NoFreeCells { needed: usize, available: usize },
}

/// Rejected actions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("not enough action points: need {needed}, have {available}")]
    InsufficientAp { needed: u32, available: u32 },

    #[error("target at distance {distance} is out of range {range}")]
    OutOfRange { range: u32, distance: u32 },

    #[error("{0} cannot be reached")]
    Unreachable(Coord),

    #[error("{0} is occupied")]
    Occupied(Coord),

    #[error("{0} is a wall")]
    Wall(Coord),

    #[error("{from} is not adjacent to {to}")]
    NotAdjacent { from: Coord, to: Coord },

    #[error("{0} is outside the map")]
    OutOfBounds(Coord),

    #[error("mob {0:?} is dead")]
    Dead(MobId),

    #[error("mob {mob:?} has no such ability at index {index}")]
    UnknownAbility { mob: MobId, index: usize },

    #[error("no usable ability against mob {0:?}")]
    NoUsableAbility(MobId),

    #[error("mob {0:?} is not an enemy")]
    NotAnEnemy(MobId),

    #[error(transparent)]
    Game(#[from] GameError),
}
