//! Scenario - hand-authored match setups stored as JSON

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::coord::Coord;
use crate::error::GameError;
use crate::game::Game;
use crate::map::Map;
use crate::mob::{Ability, Mob};
use crate::player::Player;

/// A map, its walls and the starting teams
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    pub size: usize,
    #[serde(default)]
    pub walls: Vec<Coord>,
    pub teams: Vec<TeamSetup>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamSetup {
    #[serde(default)]
    pub player: Player,
    pub mobs: Vec<MobSetup>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MobSetup {
    pub max_hp: u32,
    pub max_ap: u32,
    pub position: Coord,
    #[serde(default)]
    pub abilities: Vec<Ability>,
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        let scenario = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse scenario {}", path.display()))?;
        Ok(scenario)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build a game. The scenario's size overrides `config.map_size`; the
    /// rest of the config (pathfinder limits) still applies.
    ///
    /// Repeated wall coordinates are ignored. Out-of-map coordinates and mobs
    /// on walls or on each other are rejected.
    pub fn to_game(&self, config: &GameConfig) -> Result<Game, GameError> {
        let mut game = Game::from_map(Map::new(self.size), config);

        for &c in &self.walls {
            if !game.map().is_wall(c) {
                game.toggle_wall(c)?;
            }
        }

        for setup in &self.teams {
            let team = game.add_team(setup.player);
            for mob in &setup.mobs {
                game.add_mob(Mob::new(
                    mob.max_hp,
                    mob.max_ap,
                    mob.abilities.clone(),
                    team,
                    mob.position,
                ))?;
            }
        }

        Ok(game)
    }
}
