//! Autopilot balance simulator CLI.
//!
//! Plays the built-in story many times with a simple player policy and
//! reports how far the runs got.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate                    # Default: 100 runs
//!   cargo run --bin simulate -- -n 500          # 500 runs
//!   cargo run --bin simulate -- --seed 42       # Reproducible run

use std::env;
use zorg::core::constants::LOG_ENV;
use zorg::simulator::{run_simulation, SimConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "warn")).init();

    let args: Vec<String> = env::args().collect();
    let config = parse_args(&args);

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              ZORG BALANCE SIMULATOR                           ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Runs:           {}", config.num_runs);
    println!("  Max Actions:    {}", config.max_actions_per_run);
    if let Some(seed) = config.seed {
        println!("  Seed:           {}", seed);
    }
    println!();
    println!("Running simulation...");
    println!();

    match run_simulation(&config) {
        Ok(report) => println!("{}", report.to_text()),
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn parse_args(args: &[String]) -> SimConfig {
    let mut config = SimConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--runs" => {
                if i + 1 < args.len() {
                    config.num_runs = args[i + 1].parse().unwrap_or(100);
                    i += 1;
                }
            }
            "-s" | "--seed" => {
                if i + 1 < args.len() {
                    config.seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "-a" | "--actions" => {
                if i + 1 < args.len() {
                    config.max_actions_per_run = args[i + 1].parse().unwrap_or(10_000);
                    i += 1;
                }
            }
            "-v" | "--verbose" => {
                config.verbosity = 2;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn print_help() {
    println!("Zorg Balance Simulator");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin simulate -- [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -n, --runs <N>      Number of playthroughs (default: 100)");
    println!("    -s, --seed <S>      Random seed for reproducibility");
    println!("    -a, --actions <A>   Max actions per run (default: 10,000)");
    println!("    -v, --verbose       Print every run");
    println!("    -h, --help          Show this help");
    println!();
    println!("Log output is controlled by {} (default: warn).", LOG_ENV);
}
