//! Decision policies: human input and a greedy AI

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::error::{ActionError, GameError};
use crate::game::{AbilityOutcome, Game, UsableAbility};
use crate::mob::MobId;

/// Who decides for a team
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    /// Acts only on explicit targets
    Human,
    /// Attacks or closes in on the nearest enemy
    #[default]
    Ai,
}

/// What a policy did with its call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Nothing to do
    Idle,
    Moved { mob: MobId, from: Coord, to: Coord, steps: u32 },
    UsedAbility(AbilityOutcome),
}

impl Player {
    /// Act on a coordinate: attack the enemy standing there, or walk toward it
    pub fn action_to(self, game: &mut Game, mob: MobId, target: Coord) -> Result<Action, ActionError> {
        game.ensure_paths_for(mob)?;

        if let Some(victim) = game.mob_at(target) {
            if !game.mobs().are_enemies(mob, victim) {
                return Err(ActionError::NotAnEnemy(victim));
            }
            let usable = game.usable_abilities_against(mob, victim)?;
            let best = best_ability(&usable).ok_or(ActionError::NoUsableAbility(victim))?;
            let outcome = best.apply(game)?;
            return Ok(Action::UsedAbility(outcome));
        }

        let from = position_of(game, mob)?;
        let steps = game.move_toward(mob, target)?;
        Ok(Action::Moved {
            mob,
            from,
            to: position_of(game, mob)?,
            steps,
        })
    }

    /// Act without an explicit target
    pub fn any_action(self, game: &mut Game, mob: MobId) -> Result<Action, ActionError> {
        match self {
            Player::Human => Ok(Action::Idle),
            Player::Ai => ai_action(self, game, mob),
        }
    }
}

// ============================================================================
// AI
// ============================================================================

fn ai_action(player: Player, game: &mut Game, mob: MobId) -> Result<Action, ActionError> {
    let me = game
        .mob(mob)
        .ok_or(GameError::UnknownMob(mob))?;
    if !me.is_alive() {
        return Err(ActionError::Dead(mob));
    }
    let (position, team, ap) = (me.position(), me.team(), me.ap());

    // Nearest living enemy by straight distance, lowest id on ties
    let nearest = game
        .mobs()
        .alive()
        .filter(|(_, other)| other.team() != team)
        .min_by_key(|(id, other)| (position.distance_to(other.position()), *id))
        .map(|(id, other)| (id, other.position()));

    let Some((enemy, enemy_pos)) = nearest else {
        return Ok(Action::Idle);
    };

    game.ensure_paths_for(mob)?;
    if !game.usable_abilities_against(mob, enemy)?.is_empty() {
        return player.action_to(game, mob, enemy_pos);
    }
    if ap == 0 {
        return Ok(Action::Idle);
    }

    // Closest free cell next to the enemy that we can actually reach
    let pathfinder = game.pathfinder();
    let goal = enemy_pos
        .neighbors()
        .into_iter()
        .filter(|&c| pathfinder.is_reachable(c))
        .filter_map(|c| pathfinder.distance(c).map(|d| (d, c)))
        .min();

    // One hex per call; the driver asks again until an ability is in range
    match goal {
        Some((0, _)) => Ok(Action::Idle),
        Some((_, goal)) => {
            let Some(&step) = pathfinder.path_to(goal).last() else {
                return Ok(Action::Idle);
            };
            game.move_mob(mob, step)?;
            Ok(Action::Moved {
                mob,
                from: position,
                to: step,
                steps: 1,
            })
        }
        None => {
            // Boxed in: one step along the sign of the delta, validated by the move
            let Some(step) = position.sign_step_toward(enemy_pos) else {
                return Ok(Action::Idle);
            };
            game.move_mob(mob, step)?;
            Ok(Action::Moved {
                mob,
                from: position,
                to: step,
                steps: 1,
            })
        }
    }
}

/// Highest HP damage, then highest AP drain, then cheapest, then first listed
fn best_ability(usable: &[UsableAbility]) -> Option<&UsableAbility> {
    usable.iter().min_by_key(|u| {
        (
            std::cmp::Reverse(u.ability().damage_hp),
            std::cmp::Reverse(u.ability().damage_ap),
            u.ability().cost,
            u.index(),
        )
    })
}

fn position_of(game: &Game, mob: MobId) -> Result<Coord, ActionError> {
    game.mob(mob)
        .map(|m| m.position())
        .ok_or_else(|| GameError::UnknownMob(mob).into())
}
