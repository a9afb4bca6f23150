//! HexMage CLI - Command-line interface
//!
//! Commands:
//! - simulate: Play AI-vs-AI matches on a scenario or random maps
//! - bench: Time pathfinder runs on random maps

use clap::{Parser, Subcommand};

mod bench_cmd;
mod simulate_cmd;

#[derive(Parser)]
#[command(name = "hexmage")]
#[command(about = "HexMage turn-based hex tactics engine")]
struct Cli {
    /// Random seed (random if not set)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play headless matches and report the results
    Simulate(simulate_cmd::SimulateArgs),
    /// Benchmark the pathfinder
    Bench(bench_cmd::BenchArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so --json output stays clean
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => simulate_cmd::run(args, cli.seed),
        Commands::Bench(args) => bench_cmd::run(args, cli.seed),
    }
}
