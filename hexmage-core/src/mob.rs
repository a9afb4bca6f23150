//! Mobs, abilities, teams and the mob arena

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::error::{ActionError, GameError};
use crate::map::Map;
use crate::player::Player;

/// Range given to abilities that do not specify one
pub const DEFAULT_ABILITY_RANGE: u32 = 5;

/// Stable handle of a mob (index into the arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MobId(pub usize);

/// Stable handle of a team (index into the arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub usize);

fn default_range() -> u32 {
    DEFAULT_ABILITY_RANGE
}

/// Something a mob can do to another mob
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    /// HP removed from the target
    pub damage_hp: u32,
    /// AP drained from the target
    #[serde(default)]
    pub damage_ap: u32,
    /// AP paid by the caster
    pub cost: u32,
    /// Maximum graph distance to the target
    #[serde(default = "default_range")]
    pub range: u32,
}

impl Ability {
    pub const fn new(damage_hp: u32, damage_ap: u32, cost: u32, range: u32) -> Self {
        Self {
            damage_hp,
            damage_ap,
            cost,
            range,
        }
    }
}

/// A unit on the map
#[derive(Clone, Debug)]
pub struct Mob {
    max_hp: u32,
    max_ap: u32,
    hp: u32,
    ap: u32,
    abilities: Vec<Ability>,
    position: Coord,
    team: TeamId,
}

impl Mob {
    /// Create a mob at full HP and AP
    pub fn new(max_hp: u32, max_ap: u32, abilities: Vec<Ability>, team: TeamId, position: Coord) -> Self {
        Self {
            max_hp,
            max_ap,
            hp: max_hp,
            ap: max_ap,
            abilities,
            position,
            team,
        }
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn max_ap(&self) -> u32 {
        self.max_ap
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn ap(&self) -> u32 {
        self.ap
    }

    pub fn abilities(&self) -> &[Ability] {
        &self.abilities
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    pub fn team(&self) -> TeamId {
        self.team
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Largest range among this mob's abilities
    pub fn max_range(&self) -> u32 {
        self.abilities.iter().map(|a| a.range).max().unwrap_or(0)
    }
}

/// A side in the match
#[derive(Clone, Debug)]
pub struct Team {
    id: TeamId,
    mobs: Vec<MobId>,
    player: Player,
}

impl Team {
    pub fn id(&self) -> TeamId {
        self.id
    }

    /// Members in insertion order
    pub fn mobs(&self) -> &[MobId] {
        &self.mobs
    }

    pub fn player(&self) -> Player {
        self.player
    }
}

/// Result of resolving an ability on a target
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageReport {
    pub hp_lost: u32,
    pub ap_lost: u32,
    pub killed: bool,
}

// ============================================================================
// MOB ARENA
// ============================================================================

/// Owns every mob and team; hands out index handles
#[derive(Clone, Debug, Default)]
pub struct MobManager {
    mobs: Vec<Mob>,
    teams: Vec<Team>,
    /// Living mobs by position
    occupancy: FxHashMap<Coord, MobId>,
}

impl MobManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_team(&mut self, player: Player) -> TeamId {
        let id = TeamId(self.teams.len());
        self.teams.push(Team {
            id,
            mobs: Vec::new(),
            player,
        });
        id
    }

    /// Place a mob on the map and register it with its team
    pub fn add_mob(&mut self, map: &Map, mob: Mob) -> Result<MobId, GameError> {
        if mob.team.0 >= self.teams.len() {
            return Err(GameError::UnknownTeam(mob.team));
        }
        let pos = mob.position;
        if !map.is_valid(pos) {
            return Err(GameError::OutOfBounds(pos));
        }
        if map.is_wall(pos) || (mob.is_alive() && self.occupancy.contains_key(&pos)) {
            return Err(GameError::CellOccupied(pos));
        }

        let id = MobId(self.mobs.len());
        if mob.is_alive() {
            self.occupancy.insert(pos, id);
        }
        self.teams[mob.team.0].mobs.push(id);
        self.mobs.push(mob);
        Ok(id)
    }

    pub fn mob(&self, id: MobId) -> Option<&Mob> {
        self.mobs.get(id.0)
    }

    pub(crate) fn get(&self, id: MobId) -> Result<&Mob, GameError> {
        self.mob(id).ok_or(GameError::UnknownMob(id))
    }

    fn get_mut(&mut self, id: MobId) -> Result<&mut Mob, GameError> {
        self.mobs.get_mut(id.0).ok_or(GameError::UnknownMob(id))
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(id.0)
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.mobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mobs.is_empty()
    }

    /// Iterate every mob, dead or alive
    pub fn iter(&self) -> impl Iterator<Item = (MobId, &Mob)> {
        self.mobs.iter().enumerate().map(|(i, m)| (MobId(i), m))
    }

    /// Iterate living mobs
    pub fn alive(&self) -> impl Iterator<Item = (MobId, &Mob)> {
        self.iter().filter(|(_, m)| m.is_alive())
    }

    /// Living mob standing at a coordinate
    pub fn mob_at(&self, c: Coord) -> Option<MobId> {
        self.occupancy.get(&c).copied()
    }

    pub fn is_occupied(&self, c: Coord) -> bool {
        self.occupancy.contains_key(&c)
    }

    pub fn living_count(&self, team: TeamId) -> usize {
        self.team(team)
            .map(|t| t.mobs.iter().filter(|&&id| self.mobs[id.0].is_alive()).count())
            .unwrap_or(0)
    }

    pub fn are_enemies(&self, a: MobId, b: MobId) -> bool {
        match (self.mob(a), self.mob(b)) {
            (Some(a), Some(b)) => a.team != b.team,
            _ => false,
        }
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Step a mob onto an adjacent free cell for 1 AP
    pub fn move_mob(&mut self, map: &Map, id: MobId, to: Coord) -> Result<(), ActionError> {
        let mob = self.get(id)?;
        let from = mob.position;

        if !mob.is_alive() {
            return Err(ActionError::Dead(id));
        }
        if mob.ap < 1 {
            return Err(ActionError::InsufficientAp {
                needed: 1,
                available: mob.ap,
            });
        }
        if !map.is_valid(to) {
            return Err(ActionError::OutOfBounds(to));
        }
        if map.is_wall(to) {
            return Err(ActionError::Wall(to));
        }
        if from.distance_to(to) != 1 {
            return Err(ActionError::NotAdjacent { from, to });
        }
        if self.occupancy.contains_key(&to) {
            return Err(ActionError::Occupied(to));
        }

        self.occupancy.remove(&from);
        self.occupancy.insert(to, id);
        let mob = self.get_mut(id)?;
        mob.position = to;
        mob.ap -= 1;
        tracing::trace!("mob {:?} stepped {} -> {}", id, from, to);
        Ok(())
    }

    /// Deduct AP from a mob
    pub fn spend_ap(&mut self, id: MobId, amount: u32) -> Result<(), ActionError> {
        let mob = self.get_mut(id)?;
        if mob.ap < amount {
            return Err(ActionError::InsufficientAp {
                needed: amount,
                available: mob.ap,
            });
        }
        mob.ap -= amount;
        Ok(())
    }

    /// Apply ability damage to a target, clamping at zero
    pub fn apply_damage(&mut self, id: MobId, ability: &Ability) -> Result<DamageReport, GameError> {
        let mob = self.get_mut(id)?;
        let hp_lost = ability.damage_hp.min(mob.hp);
        let ap_lost = ability.damage_ap.min(mob.ap);
        mob.hp -= hp_lost;
        mob.ap -= ap_lost;

        let killed = hp_lost > 0 && mob.hp == 0;
        let position = mob.position;
        if killed {
            self.occupancy.remove(&position);
        }
        Ok(DamageReport {
            hp_lost,
            ap_lost,
            killed,
        })
    }

    /// Set HP directly, clamped to `[0, max_hp]`
    pub fn set_hp(&mut self, id: MobId, hp: u32) -> Result<(), GameError> {
        let mob = self.get_mut(id)?;
        let was_alive = mob.is_alive();
        mob.hp = hp.min(mob.max_hp);
        let (alive, position) = (mob.is_alive(), mob.position);

        match (was_alive, alive) {
            (true, false) => {
                self.occupancy.remove(&position);
            }
            (false, true) => {
                if self.occupancy.contains_key(&position) {
                    let mob = self.get_mut(id)?;
                    mob.hp = 0;
                    return Err(GameError::CellOccupied(position));
                }
                self.occupancy.insert(position, id);
            }
            _ => {}
        }
        Ok(())
    }

    /// Refill AP of every living mob
    pub(crate) fn refill_ap(&mut self) {
        for mob in self.mobs.iter_mut().filter(|m| m.is_alive()) {
            mob.ap = mob.max_ap;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strike() -> Ability {
        Ability::new(3, 0, 5, 2)
    }

    fn arena() -> (Map, MobManager, MobId, MobId) {
        let map = Map::new(5);
        let mut mobs = MobManager::new();
        let red = mobs.add_team(Player::Ai);
        let blue = mobs.add_team(Player::Ai);
        let a = mobs
            .add_mob(&map, Mob::new(10, 10, vec![strike()], red, Coord::new(0, 0)))
            .unwrap();
        let b = mobs
            .add_mob(&map, Mob::new(10, 10, vec![strike()], blue, Coord::new(1, 0)))
            .unwrap();
        (map, mobs, a, b)
    }

    #[test]
    fn test_ids_are_indices() {
        let (_, mobs, a, b) = arena();
        assert_eq!(a, MobId(0));
        assert_eq!(b, MobId(1));
        assert_eq!(mobs.team(TeamId(0)).unwrap().mobs(), &[a]);
        assert_eq!(mobs.mob_at(Coord::new(1, 0)), Some(b));
        assert!(mobs.are_enemies(a, b));
        assert!(!mobs.are_enemies(a, a));
    }

    #[test]
    fn test_add_mob_rejects_overlap_and_walls() {
        let (mut map, mut mobs, _, _) = arena();
        let team = TeamId(0);
        let dup = Mob::new(5, 5, vec![], team, Coord::new(0, 0));
        assert_eq!(
            mobs.add_mob(&map, dup),
            Err(GameError::CellOccupied(Coord::new(0, 0)))
        );

        map.toggle_wall(Coord::new(2, 2)).unwrap();
        let walled = Mob::new(5, 5, vec![], team, Coord::new(2, 2));
        assert!(mobs.add_mob(&map, walled).is_err());

        let outside = Mob::new(5, 5, vec![], team, Coord::new(9, 0));
        assert_eq!(
            mobs.add_mob(&map, outside),
            Err(GameError::OutOfBounds(Coord::new(9, 0)))
        );

        let orphan = Mob::new(5, 5, vec![], TeamId(7), Coord::new(3, 3));
        assert_eq!(mobs.add_mob(&map, orphan), Err(GameError::UnknownTeam(TeamId(7))));
    }

    #[test]
    fn test_move_mob_validates() {
        let (mut map, mut mobs, a, _) = arena();

        assert_eq!(
            mobs.move_mob(&map, a, Coord::new(1, 0)),
            Err(ActionError::Occupied(Coord::new(1, 0)))
        );
        assert!(matches!(
            mobs.move_mob(&map, a, Coord::new(2, 0)),
            Err(ActionError::NotAdjacent { .. })
        ));
        assert_eq!(
            mobs.move_mob(&map, a, Coord::new(-1, 0)),
            Err(ActionError::OutOfBounds(Coord::new(-1, 0)))
        );
        map.toggle_wall(Coord::new(0, 1)).unwrap();
        assert_eq!(
            mobs.move_mob(&map, a, Coord::new(0, 1)),
            Err(ActionError::Wall(Coord::new(0, 1)))
        );

        // Nothing above changed the mob
        assert_eq!(mobs.mob(a).unwrap().ap(), 10);
        assert_eq!(mobs.mob(a).unwrap().position(), Coord::new(0, 0));
    }

    #[test]
    fn test_move_mob_updates_occupancy() {
        let (map, mut mobs, _, b) = arena();
        mobs.move_mob(&map, b, Coord::new(2, 0)).unwrap();
        let mob = mobs.mob(b).unwrap();
        assert_eq!(mob.position(), Coord::new(2, 0));
        assert_eq!(mob.ap(), 9);
        assert_eq!(mobs.mob_at(Coord::new(1, 0)), None);
        assert_eq!(mobs.mob_at(Coord::new(2, 0)), Some(b));
    }

    #[test]
    fn test_move_without_ap() {
        let (map, mut mobs, a, _) = arena();
        mobs.spend_ap(a, 10).unwrap();
        assert_eq!(
            mobs.move_mob(&map, a, Coord::new(0, 1)),
            Err(ActionError::InsufficientAp { needed: 1, available: 0 })
        );
    }

    #[test]
    fn test_damage_clamps_and_frees_cell() {
        let (_, mut mobs, _, b) = arena();
        let heavy = Ability::new(25, 4, 1, 1);
        let report = mobs.apply_damage(b, &heavy).unwrap();
        assert_eq!(
            report,
            DamageReport {
                hp_lost: 10,
                ap_lost: 4,
                killed: true
            }
        );
        let mob = mobs.mob(b).unwrap();
        assert_eq!(mob.hp(), 0);
        assert_eq!(mob.ap(), 6);
        assert!(!mob.is_alive());
        assert_eq!(mobs.mob_at(Coord::new(1, 0)), None);
        assert_eq!(mobs.living_count(TeamId(1)), 0);
    }

    #[test]
    fn test_set_hp_clamps() {
        let (_, mut mobs, a, _) = arena();
        mobs.set_hp(a, 99).unwrap();
        assert_eq!(mobs.mob(a).unwrap().hp(), 10);
        mobs.set_hp(a, 0).unwrap();
        assert!(!mobs.is_occupied(Coord::new(0, 0)));
        mobs.set_hp(a, 4).unwrap();
        assert_eq!(mobs.mob_at(Coord::new(0, 0)), Some(a));
    }
}
