//! Seeded random setups
//!
//! Every function takes the RNG by reference so callers control seeding.
//! With a `ChaCha8Rng` the same seed always yields the same game.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{span, GameConfig, GeneratorConfig};
use crate::coord::Coord;
use crate::error::GameError;
use crate::game::Game;
use crate::map::Map;
use crate::mob::{Ability, Mob, TeamId};
use crate::player::Player;

pub fn random_ability<R: Rng>(rng: &mut R, cfg: &GeneratorConfig) -> Ability {
    Ability::new(
        rng.gen_range(span(cfg.damage_hp)),
        rng.gen_range(span(cfg.damage_ap)),
        rng.gen_range(span(cfg.cost)),
        rng.gen_range(span(cfg.range)),
    )
}

/// Fresh mob at full HP and AP with `abilities_per_mob` random abilities
pub fn random_mob<R: Rng>(rng: &mut R, cfg: &GeneratorConfig, team: TeamId, position: Coord) -> Mob {
    let abilities = (0..cfg.abilities_per_mob)
        .map(|_| random_ability(rng, cfg))
        .collect();
    Mob::new(cfg.max_hp, cfg.max_ap, abilities, team, position)
}

/// Random map plus `teams x mobs_per_team` AI mobs on distinct free cells.
///
/// Wall density is capped so every mob still gets a cell.
pub fn random_game<R: Rng>(rng: &mut R, config: &GameConfig) -> Result<Game, GameError> {
    let cfg = &config.generator;
    let mut cells: Vec<Coord> = Map::new(config.map_size).coords().collect();
    let needed = cfg.teams * cfg.mobs_per_team;
    if needed > cells.len() {
        return Err(GameError::NoFreeCells {
            needed,
            available: cells.len(),
        });
    }

    cells.shuffle(rng);
    let density = cfg.wall_density.clamp(0.0, 1.0);
    let wall_count = ((cells.len() as f64 * density) as usize).min(cells.len() - needed);
    let (walls, free) = cells.split_at(wall_count);

    let mut game = Game::with_config(config);
    for &c in walls {
        game.toggle_wall(c)?;
    }

    let mut spots = free.iter().copied();
    for _ in 0..cfg.teams {
        let team = game.add_team(Player::Ai);
        for _ in 0..cfg.mobs_per_team {
            let position = spots.next().ok_or(GameError::NoFreeCells {
                needed,
                available: free.len(),
            })?;
            game.add_mob(random_mob(rng, cfg, team, position))?;
        }
    }

    tracing::debug!(
        "generated {}x{} map with {} walls and {} mobs",
        config.map_size,
        config.map_size,
        wall_count,
        needed
    );
    Ok(game)
}
