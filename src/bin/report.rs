//! Performance Report Tool
//!
//! Summarizes every game in a directory of debug logs: outcome, death cause
//! and move sources per game, plus win rate, performance level and
//! recommendations across all of them.
//!
//! Usage:
//!   cargo run --release --bin report -- <log_directory> [--out <file.md>]
//!
//! Without `--out` the markdown report is printed to stdout.

use std::env;
use std::fs;
use std::process;

use pathy_snake::report::{render_markdown, summarize_dir, PerformanceReport};

fn print_usage() {
    eprintln!("Battlesnake Performance Report");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  report <log_directory> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --out <path>    Write the markdown report to a file");
    eprintln!("  --help          Show this help message");
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.contains(&"--help".to_string()) {
            0
        } else {
            1
        });
    }

    let log_dir = &args[1];
    let mut out_path: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--out" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --out requires an argument");
                    process::exit(1);
                }
                out_path = Some(args[i + 1].clone());
                i += 1;
            }
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let summaries = match summarize_dir(log_dir) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let report = PerformanceReport::from_summaries(&summaries);
    let markdown = match render_markdown(&report, &summaries) {
        Ok(markdown) => markdown,
        Err(e) => {
            eprintln!("Error: Failed to render report: {}", e);
            process::exit(1);
        }
    };

    match out_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &markdown) {
                eprintln!("Error: Failed to write report to '{}': {}", path, e);
                process::exit(1);
            }
            println!(
                "Wrote report for {} games to {} (win rate {:.1}%, level {})",
                report.games,
                path,
                report.win_rate,
                report.level.as_str()
            );
        }
        None => print!("{}", markdown),
    }
}
