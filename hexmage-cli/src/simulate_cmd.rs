//! Simulate command - play AI matches and aggregate the results
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_config(), load_scenario(), play_games(), report_results()
//! - Level 3: play_single_game(), compute_statistics()
//! - Level 4: rng and formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use hexmage_core::{play_match, random_game, GameConfig, MatchOutcome, Player, Scenario, TeamId};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    /// Scenario JSON file (random maps if not set)
    #[arg(long, value_name = "FILE")]
    pub scenario: Option<PathBuf>,

    /// Game configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Maximum rounds per game (overrides the config file)
    #[arg(long)]
    pub max_rounds: Option<u32>,

    /// Map size for random maps (overrides the config file)
    #[arg(long)]
    pub size: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    outcome: MatchOutcome,
    survivors: usize,
}

/// Aggregated simulation results
#[derive(Clone, Debug)]
struct SimulationResults {
    games: Vec<GameRecord>,
    /// Wins per team index
    wins: Vec<usize>,
    draws: usize,
    avg_rounds: f32,
    avg_actions: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run simulate command
///
/// 1. Load the config and optional scenario
/// 2. Play the games
/// 3. Report results
pub fn run(args: SimulateArgs, seed: Option<u64>) -> Result<()> {
    let config = load_config(&args)?;
    let scenario = load_scenario(&args)?;

    tracing::info!(
        "Starting simulation: {} games on {} (max {} rounds)",
        args.games,
        scenario
            .as_ref()
            .map_or_else(|| format!("random {0}x{0} maps", config.map_size), |s| s.name.clone()),
        config.max_rounds
    );

    let results = play_games(&config, scenario.as_ref(), &args, seed)?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Config file (or defaults) with command-line overrides applied
fn load_config(args: &SimulateArgs) -> Result<GameConfig> {
    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    Ok(apply_overrides(config, args))
}

fn load_scenario(args: &SimulateArgs) -> Result<Option<Scenario>> {
    let Some(path) = &args.scenario else {
        return Ok(None);
    };
    let scenario = Scenario::load(path)?;
    if scenario.teams.iter().any(|t| t.player == Player::Human) {
        tracing::warn!("Scenario {} has human teams; they will stay idle", scenario.name);
    }
    Ok(Some(scenario))
}

fn play_games(
    config: &GameConfig,
    scenario: Option<&Scenario>,
    args: &SimulateArgs,
    seed: Option<u64>,
) -> Result<SimulationResults> {
    let mut rng = create_rng(seed);
    let mut games = Vec::with_capacity(args.games);

    let progress = ProgressBar::new(args.games as u64);
    progress.set_style(ProgressStyle::with_template(
        "{spinner} [{bar:40}] {pos}/{len} games ({eta})",
    )?);

    for game_num in 0..args.games {
        let record = play_single_game(config, scenario, game_num + 1, &mut rng)?;

        tracing::debug!(
            "Game {}: winner {:?} ({} rounds, {} actions)",
            record.game_number,
            record.outcome.winner,
            record.outcome.rounds,
            record.outcome.actions
        );

        games.push(record);
        progress.inc(1);
    }
    progress.finish_and_clear();

    let team_count = scenario.map_or(config.generator.teams, |s| s.teams.len());
    Ok(compute_statistics(games, team_count))
}

fn report_results(results: &SimulationResults, args: &SimulateArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn play_single_game(
    config: &GameConfig,
    scenario: Option<&Scenario>,
    game_number: usize,
    rng: &mut ChaCha8Rng,
) -> Result<GameRecord> {
    let mut game = match scenario {
        Some(s) => s.to_game(config)?,
        None => random_game(rng, config)?,
    };

    let outcome = play_match(&mut game, config)
        .with_context(|| format!("Game {} aborted", game_number))?;

    Ok(GameRecord {
        game_number,
        outcome,
        survivors: game.mobs().alive().count(),
    })
}

fn compute_statistics(games: Vec<GameRecord>, team_count: usize) -> SimulationResults {
    let mut wins = vec![0; team_count];
    let mut draws = 0;
    for game in &games {
        match game.outcome.winner {
            Some(TeamId(team)) if team < wins.len() => wins[team] += 1,
            _ => draws += 1,
        }
    }

    let (avg_rounds, avg_actions) = if games.is_empty() {
        (0.0, 0.0)
    } else {
        let n = games.len() as f32;
        let rounds: u32 = games.iter().map(|g| g.outcome.rounds).sum();
        let actions: u32 = games.iter().map(|g| g.outcome.actions).sum();
        (rounds as f32 / n, actions as f32 / n)
    };

    SimulationResults {
        games,
        wins,
        draws,
        avg_rounds,
        avg_actions,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn apply_overrides(mut config: GameConfig, args: &SimulateArgs) -> GameConfig {
    if let Some(max_rounds) = args.max_rounds {
        config.max_rounds = max_rounds;
    }
    if let Some(size) = args.size {
        config.map_size = size;
    }
    config
}

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

fn print_json_results(results: &SimulationResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        winner: Option<usize>,
        rounds: u32,
        actions: u32,
        hit_round_cap: bool,
        survivors: usize,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        wins: Vec<usize>,
        draws: usize,
        avg_rounds: f32,
        avg_actions: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        wins: results.wins.clone(),
        draws: results.draws,
        avg_rounds: results.avg_rounds,
        avg_actions: results.avg_actions,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                winner: g.outcome.winner.map(|t| t.0),
                rounds: g.outcome.rounds,
                actions: g.outcome.actions,
                hit_round_cap: g.outcome.hit_round_cap,
                survivors: g.survivors,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_results(results: &SimulationResults) {
    let total = results.games.len();

    println!("\n=== Simulation Results ===");
    println!("Total games: {}", total);
    for (team, &wins) in results.wins.iter().enumerate() {
        println!("Team {} wins: {} ({:.1}%)", team, wins, percent(wins, total));
    }
    println!("Draws:       {} ({:.1}%)", results.draws, percent(results.draws, total));
    println!("Avg rounds:  {:.1}", results.avg_rounds);
    println!("Avg actions: {:.1}", results.avg_actions);

    println!("\nGame details:");
    for game in &results.games {
        let result = match game.outcome.winner {
            Some(team) => format!("team {} wins", team.0),
            None => "draw".to_string(),
        };
        println!(
            "  Game {}: {} in {} rounds ({} survivors)",
            game.game_number, result, game.outcome.rounds, game.survivors
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
