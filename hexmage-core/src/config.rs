//! Configuration types for matches and map generation

use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::pathfinder::PathfinderLimits;

/// Match configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square map
    pub map_size: usize,
    /// Turns played before a match is called a draw
    pub max_rounds: u32,
    /// Policy calls allowed per mob per turn
    pub max_actions_per_mob: u32,
    /// Runaway guards for the pathfinder
    pub pathfinder: PathfinderLimits,
    /// Random setup parameters
    pub generator: GeneratorConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_size: 30,
            max_rounds: 100,
            max_actions_per_mob: 16,
            pathfinder: PathfinderLimits::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn with_map_size(mut self, map_size: usize) -> Self {
        self.map_size = map_size;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }
}

/// Parameters for random mobs and maps
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub teams: usize,
    pub mobs_per_team: usize,
    pub max_hp: u32,
    pub max_ap: u32,
    pub abilities_per_mob: usize,
    /// Inclusive `[min, max]` HP damage per ability
    pub damage_hp: [u32; 2],
    /// Inclusive `[min, max]` AP drain per ability
    pub damage_ap: [u32; 2],
    /// Inclusive `[min, max]` AP cost per ability
    pub cost: [u32; 2],
    /// Inclusive `[min, max]` range per ability
    pub range: [u32; 2],
    /// Fraction of cells turned into walls
    pub wall_density: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            teams: 2,
            mobs_per_team: 3,
            max_hp: 10,
            max_ap: 10,
            abilities_per_mob: 6,
            damage_hp: [1, 10],
            damage_ap: [0, 0],
            cost: [3, 7],
            range: [1, 5],
            wall_density: 0.1,
        }
    }
}

/// `[a, b]` as an inclusive range, tolerating reversed bounds
pub(crate) fn span([a, b]: [u32; 2]) -> RangeInclusive<u32> {
    a.min(b)..=a.max(b)
}
