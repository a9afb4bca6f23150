//! Game state: map, mobs, pathfinder and turn order under one owner

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::coord::Coord;
use crate::error::{ActionError, GameError};
use crate::map::{CellKind, Map};
use crate::mob::{Ability, DamageReport, Mob, MobId, MobManager, TeamId};
use crate::pathfinder::Pathfinder;
use crate::player::Player;
use crate::turn::TurnManager;

// ============================================================================
// USABLE ABILITIES
// ============================================================================

/// An ability bound to a caster and target that passed the legality checks.
///
/// Only [`Game::usable_abilities_against`] hands these out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UsableAbility {
    caster: MobId,
    target: MobId,
    /// Index into the caster's ability list
    index: usize,
    ability: Ability,
}

impl UsableAbility {
    pub fn caster(&self) -> MobId {
        self.caster
    }

    pub fn target(&self) -> MobId {
        self.target
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn ability(&self) -> Ability {
        self.ability
    }

    /// Resolve the ability against its target
    pub fn apply(&self, game: &mut Game) -> Result<AbilityOutcome, ActionError> {
        game.use_ability(self)
    }
}

/// What an ability did
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityOutcome {
    pub caster: MobId,
    pub target: MobId,
    pub index: usize,
    pub damage: DamageReport,
}

// ============================================================================
// SNAPSHOTS
// ============================================================================

/// Read-only view of a mob for renderers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobView {
    pub id: MobId,
    pub team: TeamId,
    pub hp: u32,
    pub max_hp: u32,
    pub ap: u32,
    pub max_ap: u32,
    pub position: Coord,
}

/// Read-only view of the whole game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub size: usize,
    pub walls: Vec<Coord>,
    pub mobs: Vec<MobView>,
    pub teams: Vec<Vec<MobId>>,
    pub turn: u32,
    pub active_mob: Option<MobId>,
    pub finished: bool,
    pub winner: Option<TeamId>,
}

// ============================================================================
// GAME
// ============================================================================

/// One match
#[derive(Clone, Debug)]
pub struct Game {
    map: Map,
    mobs: MobManager,
    pathfinder: Pathfinder,
    turns: TurnManager,
    /// Pathfinder results match the current map and occupancy
    paths_fresh: bool,
}

impl Game {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty game on a `size x size` map
    pub fn new(size: usize) -> Self {
        Self::from_map(Map::new(size), &GameConfig::default())
    }

    pub fn with_config(config: &GameConfig) -> Self {
        Self::from_map(Map::new(config.map_size), config)
    }

    pub fn from_map(map: Map, config: &GameConfig) -> Self {
        let size = map.size();
        Self {
            map,
            mobs: MobManager::new(),
            pathfinder: Pathfinder::with_limits(size, config.pathfinder),
            turns: TurnManager::new(),
            paths_fresh: false,
        }
    }

    pub fn add_team(&mut self, player: Player) -> TeamId {
        self.mobs.add_team(player)
    }

    pub fn add_mob(&mut self, mob: Mob) -> Result<MobId, GameError> {
        let id = self.mobs.add_mob(&self.map, mob)?;
        self.paths_fresh = false;
        Ok(id)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn size(&self) -> usize {
        self.map.size()
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn mobs(&self) -> &MobManager {
        &self.mobs
    }

    pub fn pathfinder(&self) -> &Pathfinder {
        &self.pathfinder
    }

    pub fn turn_manager(&self) -> &TurnManager {
        &self.turns
    }

    pub fn mob(&self, id: MobId) -> Option<&Mob> {
        self.mobs.mob(id)
    }

    pub fn mob_at(&self, c: Coord) -> Option<MobId> {
        self.mobs.mob_at(c)
    }

    pub fn cell_at(&self, c: Coord) -> Result<CellKind, GameError> {
        self.map.cell_at(c)
    }

    /// Decision policy of the team a mob belongs to
    pub fn player_of(&self, mob: MobId) -> Result<Player, GameError> {
        let team = self.mobs.get(mob)?.team();
        self.mobs
            .team(team)
            .map(|t| t.player())
            .ok_or(GameError::UnknownTeam(team))
    }

    // ========================================================================
    // TURNS
    // ========================================================================

    pub fn start_next_turn(&mut self) {
        self.turns.start_next_turn(&mut self.mobs);
        self.paths_fresh = false;
    }

    pub fn is_turn_done(&self) -> bool {
        self.turns.is_turn_done()
    }

    pub fn current_mob(&self) -> Result<MobId, GameError> {
        self.turns.current_mob()
    }

    /// Advance to the next mob; returns whether the turn is still active
    pub fn move_next(&mut self) -> bool {
        self.paths_fresh = false;
        self.turns.move_next()
    }

    // ========================================================================
    // PATHFINDING
    // ========================================================================

    /// Rerun the pathfinder from the active mob. No-op once the turn is done.
    pub fn refresh(&mut self) -> Result<(), GameError> {
        match self.turns.current_mob() {
            Ok(mob) => self.refresh_from(mob),
            Err(GameError::TurnDone) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Rerun the pathfinder from any mob's position
    pub fn refresh_from(&mut self, mob: MobId) -> Result<(), GameError> {
        let source = self.mobs.get(mob)?.position();
        self.paths_fresh = false;
        self.pathfinder.run(source, &self.map, &self.mobs)?;
        self.paths_fresh = true;
        Ok(())
    }

    /// Pathfinder results are current and sourced at this mob
    pub fn paths_fresh_for(&self, mob: MobId) -> bool {
        self.paths_fresh
            && self
                .mobs
                .mob(mob)
                .is_some_and(|m| self.pathfinder.source() == Some(m.position()))
    }

    /// Refresh from `mob` unless the results already belong to it
    pub fn ensure_paths_for(&mut self, mob: MobId) -> Result<(), GameError> {
        if self.paths_fresh_for(mob) {
            return Ok(());
        }
        self.refresh_from(mob)
    }

    /// Route from the last refresh source to `target` (target-first)
    pub fn path_to(&self, target: Coord) -> Result<Vec<Coord>, GameError> {
        if !self.paths_fresh {
            return Err(GameError::StalePaths);
        }
        Ok(self.pathfinder.path_to(target))
    }

    // ========================================================================
    // MAP AND MOVEMENT
    // ========================================================================

    /// Flip a cell between Empty and Wall. Cells holding a living mob cannot
    /// become walls.
    pub fn toggle_wall(&mut self, c: Coord) -> Result<CellKind, GameError> {
        if self.mobs.is_occupied(c) {
            return Err(GameError::CellOccupied(c));
        }
        let kind = self.map.toggle_wall(c)?;
        self.paths_fresh = false;
        Ok(kind)
    }

    /// Overwrite a mob's HP (clamped to its maximum). Setting 0 kills it.
    pub fn set_hp(&mut self, mob: MobId, hp: u32) -> Result<(), GameError> {
        self.mobs.set_hp(mob, hp)?;
        self.paths_fresh = false;
        Ok(())
    }

    /// Single validated step for 1 AP
    pub fn move_mob(&mut self, mob: MobId, to: Coord) -> Result<(), ActionError> {
        self.mobs.move_mob(&self.map, mob, to)?;
        self.paths_fresh = false;
        Ok(())
    }

    /// Walk a target-first path as far as AP allows
    pub fn move_along(&mut self, mob: MobId, path: &mut Vec<Coord>) -> u32 {
        let steps = Pathfinder::move_as_far_as_possible(&self.map, &mut self.mobs, mob, path);
        if steps > 0 {
            self.paths_fresh = false;
        }
        steps
    }

    /// Pathfind to `target` and move as far as AP allows
    pub fn move_toward(&mut self, mob: MobId, target: Coord) -> Result<u32, ActionError> {
        let m = self.mobs.get(mob)?;
        if !m.is_alive() {
            return Err(ActionError::Dead(mob));
        }
        if m.ap() == 0 {
            return Err(ActionError::InsufficientAp {
                needed: 1,
                available: 0,
            });
        }
        if !self.map.is_valid(target) {
            return Err(ActionError::OutOfBounds(target));
        }

        self.ensure_paths_for(mob)?;
        let mut path = self.pathfinder.path_to(target);
        if path.is_empty() {
            return Err(ActionError::Unreachable(target));
        }

        let steps = self.move_along(mob, &mut path);
        tracing::debug!("mob {:?} moved {} steps toward {}", mob, steps, target);
        Ok(steps)
    }

    // ========================================================================
    // ABILITIES
    // ========================================================================

    /// Abilities the mob can afford, regardless of target
    pub fn usable_abilities(&self, mob: MobId) -> Result<Vec<Ability>, GameError> {
        let m = self.mobs.get(mob)?;
        Ok(m.abilities()
            .iter()
            .filter(|a| a.cost <= m.ap())
            .copied()
            .collect())
    }

    /// Abilities the mob can afford and that reach `target` by graph distance.
    ///
    /// Requires fresh paths sourced at the caster.
    pub fn usable_abilities_against(
        &self,
        mob: MobId,
        target: MobId,
    ) -> Result<Vec<UsableAbility>, GameError> {
        let caster = self.mobs.get(mob)?;
        let victim = self.mobs.get(target)?;
        if !self.paths_fresh_for(mob) {
            return Err(GameError::StalePaths);
        }
        if mob == target || !caster.is_alive() || !victim.is_alive() {
            return Ok(Vec::new());
        }

        let Some(distance) = self.pathfinder.distance_to(victim.position()) else {
            return Ok(Vec::new());
        };

        Ok(caster
            .abilities()
            .iter()
            .enumerate()
            .filter(|(_, a)| a.cost <= caster.ap() && a.range >= distance)
            .map(|(index, &ability)| UsableAbility {
                caster: mob,
                target,
                index,
                ability,
            })
            .collect())
    }

    /// Resolve a usable ability: damage the target, charge the caster.
    ///
    /// Everything `usable_abilities_against` checked is checked again, range
    /// included, since the board may have changed in between.
    pub fn use_ability(&mut self, usable: &UsableAbility) -> Result<AbilityOutcome, ActionError> {
        let caster = self.mobs.get(usable.caster)?;
        if !caster.is_alive() {
            return Err(ActionError::Dead(usable.caster));
        }
        if caster.abilities().get(usable.index) != Some(&usable.ability) {
            return Err(ActionError::UnknownAbility {
                mob: usable.caster,
                index: usable.index,
            });
        }
        let target = self.mobs.get(usable.target)?;
        if !target.is_alive() {
            return Err(ActionError::Dead(usable.target));
        }
        if usable.caster == usable.target || !self.mobs.are_enemies(usable.caster, usable.target) {
            return Err(ActionError::NotAnEnemy(usable.target));
        }
        if caster.ap() < usable.ability.cost {
            return Err(ActionError::InsufficientAp {
                needed: usable.ability.cost,
                available: caster.ap(),
            });
        }

        let target_pos = target.position();
        self.ensure_paths_for(usable.caster)?;
        let distance = self
            .pathfinder
            .distance_to(target_pos)
            .ok_or(ActionError::Unreachable(target_pos))?;
        if distance > usable.ability.range {
            return Err(ActionError::OutOfRange {
                range: usable.ability.range,
                distance,
            });
        }

        self.mobs.spend_ap(usable.caster, usable.ability.cost)?;
        let damage = self.mobs.apply_damage(usable.target, &usable.ability)?;
        self.paths_fresh = false;

        tracing::debug!(
            "mob {:?} used ability {} on {:?}: -{} hp, -{} ap{}",
            usable.caster,
            usable.index,
            usable.target,
            damage.hp_lost,
            damage.ap_lost,
            if damage.killed { " (killed)" } else { "" }
        );

        Ok(AbilityOutcome {
            caster: usable.caster,
            target: usable.target,
            index: usable.index,
            damage,
        })
    }

    /// Living enemies within the mob's longest ability range (straight line)
    pub fn possible_targets(&self, mob: MobId) -> Result<Vec<MobId>, GameError> {
        let m = self.mobs.get(mob)?;
        let max_range = m.max_range();
        Ok(self
            .mobs
            .alive()
            .filter(|(_, other)| other.team() != m.team())
            .filter(|(_, other)| m.position().distance_to(other.position()) <= max_range)
            .map(|(id, _)| id)
            .collect())
    }

    // ========================================================================
    // RESULT
    // ========================================================================

    /// True once any team has no living mobs
    pub fn is_finished(&self) -> bool {
        self.mobs
            .teams()
            .iter()
            .any(|t| self.mobs.living_count(t.id()) == 0)
    }

    /// The only team with living mobs, once the game is finished
    pub fn winner(&self) -> Option<TeamId> {
        if !self.is_finished() {
            return None;
        }
        let mut alive = self
            .mobs
            .teams()
            .iter()
            .filter(|t| self.mobs.living_count(t.id()) > 0)
            .map(|t| t.id());
        match (alive.next(), alive.next()) {
            (Some(team), None) => Some(team),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            size: self.map.size(),
            walls: self.map.walls().collect(),
            mobs: self
                .mobs
                .iter()
                .map(|(id, m)| MobView {
                    id,
                    team: m.team(),
                    hp: m.hp(),
                    max_hp: m.max_hp(),
                    ap: m.ap(),
                    max_ap: m.max_ap(),
                    position: m.position(),
                })
                .collect(),
            teams: self.mobs.teams().iter().map(|t| t.mobs().to_vec()).collect(),
            turn: self.turns.turn_number(),
            active_mob: self.turns.current_mob().ok(),
            finished: self.is_finished(),
            winner: self.winner(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn duel() -> (Game, MobId, MobId) {
        let mut game = Game::new(8);
        let red = game.add_team(Player::Ai);
        let blue = game.add_team(Player::Ai);
        let a = game
            .add_mob(Mob::new(10, 10, vec![Ability::new(3, 0, 5, 5)], red, Coord::new(1, 1)))
            .unwrap();
        let b = game
            .add_mob(Mob::new(10, 10, vec![Ability::new(3, 0, 5, 5)], blue, Coord::new(3, 1)))
            .unwrap();
        (game, a, b)
    }

    #[test]
    fn test_use_ability_applies_damage_and_cost() {
        let (mut game, a, b) = duel();
        game.refresh_from(a).unwrap();
        let usable = game.usable_abilities_against(a, b).unwrap();
        assert_eq!(usable.len(), 1);

        usable[0].apply(&mut game).unwrap();
        assert_eq!(game.mob(b).unwrap().hp(), 7);
        assert_eq!(game.mob(a).unwrap().ap(), 5);
    }

    #[test]
    fn test_usable_abilities_filters_by_cost() {
        let mut game = Game::new(4);
        let team = game.add_team(Player::Human);
        let abilities = vec![
            Ability::new(1, 0, 2, 1),
            Ability::new(5, 0, 6, 1),
            Ability::new(9, 0, 11, 1),
        ];
        let a = game
            .add_mob(Mob::new(10, 6, abilities, team, Coord::new(0, 0)))
            .unwrap();
        let usable = game.usable_abilities(a).unwrap();
        assert_eq!(usable.iter().map(|a| a.cost).collect::<Vec<_>>(), vec![2, 6]);
    }

    #[test]
    fn test_legality_requires_fresh_paths() {
        let (mut game, a, b) = duel();
        assert_eq!(game.usable_abilities_against(a, b), Err(GameError::StalePaths));
        game.refresh_from(b).unwrap();
        // Fresh, but sourced at the wrong mob
        assert_eq!(game.usable_abilities_against(a, b), Err(GameError::StalePaths));
        game.refresh_from(a).unwrap();
        assert!(game.usable_abilities_against(a, b).is_ok());
        game.toggle_wall(Coord::new(5, 5)).unwrap();
        assert_eq!(game.usable_abilities_against(a, b), Err(GameError::StalePaths));
        assert_eq!(game.path_to(Coord::new(0, 0)), Err(GameError::StalePaths));
    }

    #[test]
    fn test_range_uses_graph_distance() {
        let mut game = Game::new(7);
        let red = game.add_team(Player::Ai);
        let blue = game.add_team(Player::Ai);
        let bolt = Ability::new(2, 0, 1, 3);
        let a = game
            .add_mob(Mob::new(10, 10, vec![bolt], red, Coord::new(0, 3)))
            .unwrap();
        let b = game
            .add_mob(Mob::new(10, 10, vec![bolt], blue, Coord::new(3, 3)))
            .unwrap();

        // Open map: hex distance 3 is in range
        game.refresh_from(a).unwrap();
        assert_eq!(game.usable_abilities_against(a, b).unwrap().len(), 1);

        // Wall off column x = 1 except the top row; the detour is longer than 3
        for y in 1..7 {
            game.toggle_wall(Coord::new(1, y)).unwrap();
        }
        game.refresh_from(a).unwrap();
        assert!(game.pathfinder().distance_to(Coord::new(3, 3)).unwrap() > 3);
        assert!(game.usable_abilities_against(a, b).unwrap().is_empty());
        // Straight distance still says 3, so it stays a possible target
        assert_eq!(game.possible_targets(a).unwrap(), vec![b]);
    }

    #[test]
    fn test_use_ability_revalidates() {
        let (mut game, a, b) = duel();
        game.refresh_from(a).unwrap();
        let usable = game.usable_abilities_against(a, b).unwrap()[0];

        usable.apply(&mut game).unwrap();
        usable.apply(&mut game).unwrap();
        assert_eq!(
            usable.apply(&mut game),
            Err(ActionError::InsufficientAp { needed: 5, available: 0 })
        );
        assert_eq!(game.mob(b).unwrap().hp(), 4);

        game.set_hp(b, 0).unwrap();
        game.start_next_turn();
        assert_eq!(usable.apply(&mut game), Err(ActionError::Dead(b)));
    }

    #[test]
    fn test_use_ability_rechecks_range() {
        let mut game = Game::new(8);
        let red = game.add_team(Player::Ai);
        let blue = game.add_team(Player::Ai);
        let jab = Ability::new(3, 0, 2, 2);
        let a = game
            .add_mob(Mob::new(10, 10, vec![jab], red, Coord::new(1, 1)))
            .unwrap();
        let b = game
            .add_mob(Mob::new(10, 10, vec![jab], blue, Coord::new(3, 1)))
            .unwrap();
        game.refresh_from(a).unwrap();
        let usable = game.usable_abilities_against(a, b).unwrap()[0];

        // Target steps back out of reach before the ability resolves
        game.move_mob(b, Coord::new(4, 1)).unwrap();
        assert_eq!(
            usable.apply(&mut game),
            Err(ActionError::OutOfRange { range: 2, distance: 3 })
        );
        assert_eq!(game.mob(b).unwrap().hp(), 10);
        assert_eq!(game.mob(a).unwrap().ap(), 10);
    }

    #[test]
    fn test_use_ability_rejects_abilities_the_caster_lacks() {
        let (mut game, a, b) = duel();
        let nuke = UsableAbility {
            caster: a,
            target: b,
            index: 0,
            ability: Ability::new(99, 0, 1, 0),
        };
        assert_eq!(
            game.use_ability(&nuke),
            Err(ActionError::UnknownAbility { mob: a, index: 0 })
        );

        let missing = UsableAbility {
            index: 3,
            ability: Ability::new(3, 0, 5, 5),
            ..nuke
        };
        assert_eq!(
            game.use_ability(&missing),
            Err(ActionError::UnknownAbility { mob: a, index: 3 })
        );
        assert_eq!(game.mob(b).unwrap().hp(), 10);
    }

    #[test]
    fn test_use_ability_rejects_allies_and_self() {
        let (mut game, a, _) = duel();
        let ally = game
            .add_mob(Mob::new(10, 10, vec![], TeamId(0), Coord::new(1, 2)))
            .unwrap();
        let strike = Ability::new(3, 0, 5, 5);

        let on_ally = UsableAbility {
            caster: a,
            target: ally,
            index: 0,
            ability: strike,
        };
        assert_eq!(game.use_ability(&on_ally), Err(ActionError::NotAnEnemy(ally)));

        let on_self = UsableAbility { target: a, ..on_ally };
        assert_eq!(game.use_ability(&on_self), Err(ActionError::NotAnEnemy(a)));

        assert_eq!(game.mob(ally).unwrap().hp(), 10);
        assert_eq!(game.mob(a).unwrap().hp(), 10);
        assert_eq!(game.mob(a).unwrap().ap(), 10);
    }

    #[test]
    fn test_possible_targets_excludes_allies_and_dead() {
        let mut game = Game::new(10);
        let red = game.add_team(Player::Ai);
        let blue = game.add_team(Player::Ai);
        let short = vec![Ability::new(1, 0, 1, 2)];
        let a = game
            .add_mob(Mob::new(5, 5, short.clone(), red, Coord::new(0, 0)))
            .unwrap();
        game.add_mob(Mob::new(5, 5, short.clone(), red, Coord::new(1, 0)))
            .unwrap();
        let near = game
            .add_mob(Mob::new(5, 5, short.clone(), blue, Coord::new(2, 0)))
            .unwrap();
        let dead = game
            .add_mob(Mob::new(5, 5, short.clone(), blue, Coord::new(0, 2)))
            .unwrap();
        game.add_mob(Mob::new(5, 5, short, blue, Coord::new(8, 8)))
            .unwrap();
        game.set_hp(dead, 0).unwrap();

        assert_eq!(game.possible_targets(a).unwrap(), vec![near]);
    }

    #[test]
    fn test_is_finished_on_elimination() {
        let (mut game, _, b) = duel();
        assert!(!game.is_finished());
        assert_eq!(game.winner(), None);
        game.set_hp(b, 0).unwrap();
        assert!(game.is_finished());
        assert_eq!(game.winner(), Some(TeamId(0)));
    }

    #[test]
    fn test_refresh_follows_active_mob() {
        let (mut game, a, b) = duel();
        game.start_next_turn();
        let first = game.current_mob().unwrap();
        assert_eq!(first, a);
        game.refresh().unwrap();
        assert!(game.paths_fresh_for(a));

        assert!(game.move_next());
        assert!(!game.paths_fresh_for(a));
        game.refresh().unwrap();
        assert!(game.paths_fresh_for(b));

        assert!(!game.move_next());
        assert_eq!(game.current_mob(), Err(GameError::TurnDone));
        assert_eq!(game.refresh(), Ok(()));
    }

    #[test]
    fn test_move_toward_and_walls() {
        let (mut game, a, _) = duel();
        let steps = game.move_toward(a, Coord::new(1, 6)).unwrap();
        assert_eq!(steps, 5);
        assert_eq!(game.mob(a).unwrap().position(), Coord::new(1, 6));
        assert_eq!(game.mob(a).unwrap().ap(), 5);

        assert_eq!(
            game.toggle_wall(Coord::new(1, 6)),
            Err(GameError::CellOccupied(Coord::new(1, 6)))
        );
        game.toggle_wall(Coord::new(7, 7)).unwrap();
        assert_eq!(
            game.move_toward(a, Coord::new(7, 7)),
            Err(ActionError::Unreachable(Coord::new(7, 7)))
        );
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let (mut game, a, b) = duel();
        game.toggle_wall(Coord::new(0, 0)).unwrap();
        game.start_next_turn();
        let snap = game.snapshot();
        assert_eq!(snap.size, 8);
        assert_eq!(snap.walls, vec![Coord::new(0, 0)]);
        assert_eq!(snap.mobs.len(), 2);
        assert_eq!(snap.teams, vec![vec![a], vec![b]]);
        assert_eq!(snap.active_mob, Some(a));
        assert_eq!(snap.turn, 1);
        assert!(!snap.finished);

        let json = serde_json::to_string(&snap).unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
