//! Headless match loop
//!
//! Plays a game to completion by asking each active mob's team policy for
//! actions until it idles, gets rejected or runs out of AP, then advancing
//! the turn cursor. Matches that do not finish within `max_rounds` turns are
//! draws.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{ActionError, GameError};
use crate::game::Game;
use crate::mob::{MobId, TeamId};
use crate::player::{Action, Player};

/// Result of a finished (or capped) match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Turns started
    pub rounds: u32,
    /// Moves and ability uses performed
    pub actions: u32,
    pub winner: Option<TeamId>,
    /// Stopped by `max_rounds` rather than elimination
    pub hit_round_cap: bool,
}

/// Play until one side is eliminated or the round cap is reached
pub fn play_match(game: &mut Game, config: &GameConfig) -> Result<MatchOutcome, GameError> {
    let mut rounds = 0;
    let mut actions = 0;

    while !game.is_finished() {
        if game.is_turn_done() {
            if rounds >= config.max_rounds {
                break;
            }
            game.start_next_turn();
            rounds += 1;
            continue;
        }

        let mob = game.current_mob()?;
        let player = game.player_of(mob)?;
        actions += play_mob(game, player, mob, config.max_actions_per_mob)?;
        game.move_next();
    }

    let outcome = MatchOutcome {
        rounds,
        actions,
        winner: game.winner(),
        hit_round_cap: !game.is_finished(),
    };
    tracing::debug!(
        "match over after {} rounds and {} actions, winner {:?}",
        outcome.rounds,
        outcome.actions,
        outcome.winner
    );
    Ok(outcome)
}

/// One mob's share of a turn; returns the number of actions taken
fn play_mob(game: &mut Game, player: Player, mob: MobId, max_actions: u32) -> Result<u32, GameError> {
    let mut taken = 0;

    while taken < max_actions && !game.is_finished() {
        if !game.mob(mob).is_some_and(|m| m.is_alive() && m.ap() > 0) {
            break;
        }
        game.refresh()?;

        match player.any_action(game, mob) {
            Ok(Action::Idle) => break,
            Ok(action) => {
                tracing::debug!("mob {:?}: {:?}", mob, action);
                taken += 1;
            }
            Err(ActionError::Game(e)) => return Err(e),
            Err(e) => {
                tracing::debug!("mob {:?} action rejected: {}", mob, e);
                break;
            }
        }
    }

    Ok(taken)
}
