// Replays logged turns through the current engine and reports divergence
//
// Usage:
//   cargo run --bin replay -- <log_file> (--all | --turns <T,..> | --validate <T:M,..>) [options]

use std::env;
use std::process;

use pathy_snake::config::Config;
use pathy_snake::replay::{ReplayArgs, ReplayEngine, ReplayMode};

fn print_usage() {
    eprintln!("Battlesnake Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> (--all | --turns <T1,T2,...> | --validate <T:M,...>) [OPTIONS]");
    eprintln!();
    eprintln!("MODES:");
    eprintln!("  --all                   Replay every move entry");
    eprintln!("  --turns <T1,T2,...>     Replay the listed turns");
    eprintln!("  --validate <T:M,...>    Check logged moves, e.g. 5:up,10:left|right");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --config <path>         Engine configuration (default: Snake.toml)");
    eprintln!("  --seed <N>              Seed for entries logged without one (default: engine.seed, else 0)");
    eprintln!("  --verbose               Compare move, source, target and path length per turn");
    eprintln!("  --help                  Show this help message");
}

fn run(args: ReplayArgs) -> Result<(), String> {
    let config = match Config::from_file(&args.config_path) {
        Ok(config) => {
            println!("Loaded configuration from: {}", args.config_path);
            config
        }
        Err(e) => {
            eprintln!("Warning: {}, using default configuration", e);
            Config::default_hardcoded()
        }
    };

    let engine = ReplayEngine::new(config, args.seed, args.verbose);
    println!("Replay log file: {}", args.log_file);
    println!("Replay seed: {}", engine.seed());

    let entries = engine.load_log_file(&args.log_file)?;
    if entries.is_empty() {
        return Err("Log file is empty".to_string());
    }
    println!("Loaded {} log entries\n", entries.len());

    match &args.mode {
        ReplayMode::All => {
            let results = engine.replay_all(&entries)?;
            engine.print_report(&results);
        }
        ReplayMode::Turns(turns) => {
            println!("Replaying {} specific turn(s)...", turns.len());
            let results = engine.replay_turns(&entries, turns)?;
            engine.print_report(&results);
        }
        ReplayMode::Validate(expected) => {
            println!("Validating {} expected move(s)...", expected.len());
            engine
                .validate_expected_moves(&entries, expected)
                .map_err(|e| format!("Validation failed: {}", e))?;
            println!("All expected moves validated successfully");
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help") {
        print_usage();
        return;
    }
    if args.is_empty() {
        print_usage();
        process::exit(1);
    }

    let args = match ReplayArgs::parse(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
