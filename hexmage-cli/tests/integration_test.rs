//! Integration tests for the HexMage engine
//!
//! Tests the full stack: map and pathfinding, turn order, AI policy,
//! scenarios, random setups and the match driver

use hexmage_core::{
    play_match, random_game, Ability, Action, ActionError, CellKind, Coord, Game, GameConfig,
    GameError, Mob, MobId, Player, Scenario,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// Two teams of two facing each other across a short wall
fn skirmish() -> Game {
    let mut game = Game::new(10);
    let red = game.add_team(Player::Ai);
    let blue = game.add_team(Player::Ai);
    let sword = Ability::new(4, 0, 4, 1);
    let bow = Ability::new(2, 0, 3, 4);

    for (team, x) in [(red, 1), (blue, 8)] {
        game.add_mob(Mob::new(12, 10, vec![sword, bow], team, Coord::new(x, 3)))
            .unwrap();
        game.add_mob(Mob::new(8, 8, vec![bow], team, Coord::new(x, 6)))
            .unwrap();
    }
    for y in 3..7 {
        game.toggle_wall(Coord::new(5, y)).unwrap();
    }
    game
}

// ============================================================================
// TURN PROTOCOL
// ============================================================================

#[test]
fn test_turn_protocol_walkthrough() {
    let mut game = skirmish();
    assert_eq!(game.current_mob(), Err(GameError::TurnDone));

    game.start_next_turn();
    // Lower max AP acts first
    let first = game.current_mob().unwrap();
    assert_eq!(game.mob(first).unwrap().max_ap(), 8);

    game.refresh().unwrap();
    let path = game.path_to(Coord::new(4, 0)).unwrap();
    assert!(!path.is_empty());
    assert_eq!(path[0], Coord::new(4, 0));

    let mut visited = vec![first];
    while game.move_next() {
        visited.push(game.current_mob().unwrap());
    }
    visited.sort();
    assert_eq!(visited, vec![MobId(0), MobId(1), MobId(2), MobId(3)]);
    assert!(game.is_turn_done());
}

#[test]
fn test_paths_go_around_walls() {
    let mut game = skirmish();
    game.refresh_from(MobId(0)).unwrap();

    // (6,3) sits right behind the wall from (4,3)
    let path = game.path_to(Coord::new(6, 3)).unwrap();
    assert!(path.iter().all(|&c| game.cell_at(c) == Ok(CellKind::Empty)));
    assert!(path.len() > Coord::new(1, 3).distance_to(Coord::new(6, 3)) as usize);

    // Consecutive steps are adjacent hexes
    let mut steps = path.clone();
    steps.push(Coord::new(1, 3));
    for pair in steps.windows(2) {
        assert_eq!(pair[0].distance_to(pair[1]), 1);
    }
}

#[test]
fn test_rejected_actions_leave_state_untouched() {
    let mut game = skirmish();
    game.start_next_turn();
    let red = MobId(0);

    // Walk up to the wall
    assert_eq!(game.move_toward(red, Coord::new(4, 3)), Ok(3));
    let before = game.snapshot();

    assert_eq!(
        game.move_mob(red, Coord::new(5, 3)),
        Err(ActionError::Wall(Coord::new(5, 3)))
    );
    assert_eq!(
        game.move_mob(red, Coord::new(6, 3)),
        Err(ActionError::NotAdjacent {
            from: Coord::new(4, 3),
            to: Coord::new(6, 3),
        })
    );
    assert_eq!(
        Player::Human.action_to(&mut game, red, Coord::new(5, 3)),
        Err(ActionError::Unreachable(Coord::new(5, 3)))
    );
    assert_eq!(game.snapshot(), before);
}

#[test]
fn test_ai_goes_around_wall_then_shoots() {
    let mut game = skirmish();
    game.start_next_turn();
    let red = MobId(0);
    game.move_toward(red, Coord::new(4, 3)).unwrap();

    // Bow range 4, but the wall makes the graph distance 5: one step around it
    let moved = Player::Ai.any_action(&mut game, red).unwrap();
    assert_eq!(
        moved,
        Action::Moved {
            mob: red,
            from: Coord::new(4, 3),
            to: Coord::new(5, 2),
            steps: 1,
        }
    );
    assert_eq!(game.mob(red).unwrap().ap(), 6);

    // In range now, so it shoots instead of walking on
    for (hp, ap) in [(10, 3), (8, 0)] {
        let shot = Player::Ai.any_action(&mut game, red).unwrap();
        let Action::UsedAbility(outcome) = shot else {
            panic!("expected ability use, got {:?}", shot);
        };
        assert_eq!(outcome.target, MobId(2));
        assert_eq!(outcome.index, 1);
        assert_eq!(game.mob(MobId(2)).unwrap().hp(), hp);
        assert_eq!(game.mob(red).unwrap().ap(), ap);
    }
    assert_eq!(game.mob(red).unwrap().position(), Coord::new(5, 2));
    assert_eq!(Player::Ai.any_action(&mut game, red), Ok(Action::Idle));
}

// ============================================================================
// SCENARIOS AND MATCHES
// ============================================================================

#[test]
fn test_sample_scenario_plays_to_completion() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../scenarios/duel.json");
    let scenario = Scenario::load(&path).unwrap();
    let config = GameConfig::default();
    let mut game = scenario.to_game(&config).unwrap();
    assert_eq!(game.size(), scenario.size);

    let outcome = play_match(&mut game, &config).unwrap();
    assert!(!outcome.hit_round_cap);
    assert!(outcome.winner.is_some());
    assert_eq!(game.winner(), outcome.winner);
}

#[test]
fn test_random_matches_are_reproducible() {
    let config = GameConfig::default().with_map_size(12).with_max_rounds(40);

    let play = |seed: u64| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut game = random_game(&mut rng, &config).unwrap();
        let outcome = play_match(&mut game, &config).unwrap();
        (outcome, game.snapshot())
    };

    for seed in 0..5 {
        assert_eq!(play(seed), play(seed));
    }
}

#[test]
fn test_snapshot_json_after_match() {
    let config = GameConfig::default();
    let mut game = skirmish();
    play_match(&mut game, &config).unwrap();

    let json = serde_json::to_string(&game.snapshot()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["size"], 10);
    assert_eq!(value["walls"].as_array().unwrap().len(), 4);
    assert_eq!(value["mobs"].as_array().unwrap().len(), 4);
}
