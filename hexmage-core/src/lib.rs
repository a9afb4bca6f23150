//! HexMage Core - Turn-based hex tactics engine
//!
//! This crate provides the core game logic for HexMage:
//! - Hex geometry (axial coordinates on a square map)
//! - Map cells and walls
//! - Mobs, abilities and teams in an index-based arena
//! - BFS pathfinding with runaway guards
//! - Turn order by remaining action points
//! - Human and greedy AI decision policies
//! - Random setups, JSON scenarios and a headless match driver

pub mod coord;
pub mod map;
pub mod mob;
pub mod pathfinder;
pub mod turn;
pub mod game;
pub mod player;
pub mod error;
pub mod config;
pub mod generator;
pub mod scenario;
pub mod driver;

// Re-exports for convenient access
pub use coord::{Coord, DIRECTIONS};
pub use map::{CellKind, Map};
pub use mob::{Ability, DamageReport, Mob, MobId, MobManager, Team, TeamId, DEFAULT_ABILITY_RANGE};
pub use pathfinder::{Pathfinder, PathfinderLimits, PathCell, VisitState};
pub use turn::TurnManager;
pub use game::{AbilityOutcome, Game, GameSnapshot, MobView, UsableAbility};
pub use player::{Action, Player};
pub use error::{ActionError, GameError};
pub use config::{GameConfig, GeneratorConfig};
pub use generator::{random_ability, random_game, random_mob};
pub use scenario::{MobSetup, Scenario, TeamSetup};
pub use driver::{play_match, MatchOutcome};
