//! Bench command - time pathfinding and full matches on random maps
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: bench_config(), report_results()
//! - Level 3: benchmark_pathfinder(), benchmark_matches()
//! - Level 4: timing utilities, formatting

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hexmage_core::{play_match, random_game, GameConfig, MobId};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BenchArgs {
    /// Map side length
    #[arg(long, default_value = "30")]
    pub size: usize,

    /// Pathfinder runs to time
    #[arg(long, default_value = "1000")]
    pub runs: usize,

    /// Full AI matches to time
    #[arg(long, default_value = "10")]
    pub matches: usize,

    /// Fraction of cells that are walls
    #[arg(long, default_value = "0.1")]
    pub walls: f64,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Results of a single benchmark
#[derive(Clone, Debug)]
struct BenchmarkResult {
    name: String,
    iterations: usize,
    total_time: Duration,
    avg_time: Duration,
    per_second: f64,
    notes: String,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run bench command
///
/// 1. Time pathfinder runs from random mobs on one random map
/// 2. Time complete AI matches on fresh random maps
/// 3. Report all results
pub fn run(args: BenchArgs, seed: Option<u64>) -> Result<()> {
    tracing::info!(
        "Starting benchmarks: {0}x{0} map, {1:.0}% walls",
        args.size,
        args.walls * 100.0
    );

    let config = bench_config(&args);
    let mut rng = create_rng(seed);

    let results = vec![
        benchmark_pathfinder(&config, args.runs, &mut rng)?,
        benchmark_matches(&config, args.matches, &mut rng)?,
    ];

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn bench_config(args: &BenchArgs) -> GameConfig {
    let mut config = GameConfig::default().with_map_size(args.size);
    config.generator.wall_density = args.walls;
    config
}

fn report_results(results: &[BenchmarkResult], args: &BenchArgs) {
    if args.json {
        print_json_results(results, args);
    } else {
        print_text_results(results, args);
    }
}

// ============================================================================
// LEVEL 3 - BENCHMARKS
// ============================================================================

/// Rerun the pathfinder from randomly chosen mobs
fn benchmark_pathfinder(config: &GameConfig, runs: usize, rng: &mut ChaCha8Rng) -> Result<BenchmarkResult> {
    let mut game = random_game(rng, config)?;
    let mob_count = game.mobs().len();
    let mut reachable_total = 0usize;
    let mut total_time = Duration::ZERO;

    for _ in 0..runs {
        let mob = MobId(rng.gen_range(0..mob_count.max(1)));
        let start = Instant::now();
        game.refresh_from(mob)?;
        total_time += start.elapsed();
        reachable_total += game.pathfinder().reachable().count();
    }

    Ok(timed_result(
        "Pathfinder",
        runs,
        total_time,
        format!(
            "avg {:.1} reachable cells",
            reachable_total as f64 / runs.max(1) as f64
        ),
    ))
}

/// Play complete AI matches on fresh maps
fn benchmark_matches(config: &GameConfig, matches: usize, rng: &mut ChaCha8Rng) -> Result<BenchmarkResult> {
    let mut rounds = 0u32;
    let mut decided = 0usize;
    let mut total_time = Duration::ZERO;

    for _ in 0..matches {
        let mut game = random_game(rng, config)?;
        let start = Instant::now();
        let outcome = play_match(&mut game, config)?;
        total_time += start.elapsed();

        rounds += outcome.rounds;
        if outcome.winner.is_some() {
            decided += 1;
        }
    }

    Ok(timed_result(
        "AI matches",
        matches,
        total_time,
        format!(
            "{} decided, avg {:.1} rounds",
            decided,
            rounds as f64 / matches.max(1) as f64
        ),
    ))
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn timed_result(name: &str, iterations: usize, total_time: Duration, notes: String) -> BenchmarkResult {
    let avg_time = if iterations > 0 {
        total_time / iterations as u32
    } else {
        Duration::ZERO
    };
    let per_second = if total_time.is_zero() {
        0.0
    } else {
        iterations as f64 / total_time.as_secs_f64()
    };
    BenchmarkResult {
        name: name.to_string(),
        iterations,
        total_time,
        avg_time,
        per_second,
        notes,
    }
}

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn format_duration(d: Duration) -> String {
    if d.as_secs() >= 1 {
        format!("{:.2}s", d.as_secs_f64())
    } else if d.as_millis() >= 1 {
        format!("{:.1}ms", d.as_secs_f64() * 1000.0)
    } else {
        format!("{:.1}us", d.as_secs_f64() * 1_000_000.0)
    }
}

fn print_json_results(results: &[BenchmarkResult], args: &BenchArgs) {
    #[derive(serde::Serialize)]
    struct JsonResult {
        name: String,
        iterations: usize,
        total_time_ms: f64,
        avg_time_us: f64,
        per_second: f64,
        notes: String,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        size: usize,
        wall_density: f64,
        results: Vec<JsonResult>,
    }

    let output = JsonOutput {
        size: args.size,
        wall_density: args.walls,
        results: results
            .iter()
            .map(|r| JsonResult {
                name: r.name.clone(),
                iterations: r.iterations,
                total_time_ms: r.total_time.as_secs_f64() * 1000.0,
                avg_time_us: r.avg_time.as_secs_f64() * 1_000_000.0,
                per_second: r.per_second,
                notes: r.notes.clone(),
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_results(results: &[BenchmarkResult], args: &BenchArgs) {
    println!("\n=== Benchmark Results ===");
    println!("Map: {0}x{0}, walls {1:.0}%\n", args.size, args.walls * 100.0);
    println!(
        "{:<12} {:>8} {:>10} {:>10} {:>12}  Notes",
        "Benchmark", "Runs", "Total", "Avg", "Per sec"
    );
    println!("{}", "-".repeat(70));
    for r in results {
        println!(
            "{:<12} {:>8} {:>10} {:>10} {:>12.1}  {}",
            r.name,
            r.iterations,
            format_duration(r.total_time),
            format_duration(r.avg_time),
            r.per_second,
            r.notes
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
