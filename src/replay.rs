// Replay module for analyzing historical game states and debugging decision-making
//
// This module provides functionality to:
// 1. Parse JSONL debug logs
// 2. Rebuild the game state of each logged move and run the engine on it again
// 3. Compare logged vs replayed moves, sources, targets and path lengths
// 4. Generate detailed analysis reports
//
// Each turn is replayed with the seed the server logged for it. Entries from
// logs without seeds fall back to a seed derived from `--seed` or `engine.seed`.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::debug_logger::{EntryKind, LogEntry};
use crate::engine::{turn_seed, Decision, MoveEngine, MoveSource};
use crate::types::{Coord, Direction, Game, GameState};

/// What the replay tool was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayMode {
    All,
    Turns(Vec<i32>),
    /// Turn paired with every move accepted on it
    Validate(Vec<(i32, Vec<Direction>)>),
}

/// Command line of the replay tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayArgs {
    pub log_file: String,
    pub config_path: String,
    pub mode: ReplayMode,
    pub seed: Option<u64>,
    pub verbose: bool,
}

impl ReplayArgs {
    /// Parses the arguments that follow the program name
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let mut iter = args.iter();
        let log_file = iter.next().ok_or("Missing log file")?.clone();

        let mut config_path = "Snake.toml".to_string();
        let mut mode = None;
        let mut seed = None;
        let mut verbose = false;

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--all" => mode = Some(ReplayMode::All),
                "--turns" => mode = Some(ReplayMode::Turns(parse_turns(value_of(&mut iter, arg)?)?)),
                "--validate" => {
                    mode = Some(ReplayMode::Validate(parse_expected_moves(value_of(&mut iter, arg)?)?))
                }
                "--config" => config_path = value_of(&mut iter, arg)?.to_string(),
                "--seed" => {
                    let raw = value_of(&mut iter, arg)?;
                    seed = Some(
                        raw.parse::<u64>()
                            .map_err(|e| format!("Invalid seed '{}': {}", raw, e))?,
                    );
                }
                "--verbose" => verbose = true,
                other => return Err(format!("Unknown option '{}'", other)),
            }
        }

        Ok(ReplayArgs {
            log_file,
            config_path,
            mode: mode.ok_or("Must specify --all, --turns, or --validate")?,
            seed,
            verbose,
        })
    }
}

fn value_of<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a str, String> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires an argument", flag))
}

/// Parses `5,10,15`
pub fn parse_turns(s: &str) -> Result<Vec<i32>, String> {
    s.split(',')
        .map(|t| {
            t.trim()
                .parse::<i32>()
                .map_err(|e| format!("Invalid turn number '{}': {}", t, e))
        })
        .collect()
}

/// Parses `5:up,10:left|right`; `|` separates alternatives
pub fn parse_expected_moves(s: &str) -> Result<Vec<(i32, Vec<Direction>)>, String> {
    s.split(',')
        .map(|pair| -> Result<(i32, Vec<Direction>), String> {
            let (turn, moves) = pair
                .trim()
                .split_once(':')
                .ok_or_else(|| format!("Invalid format '{}', expected turn:move", pair))?;
            let turn = turn
                .trim()
                .parse::<i32>()
                .map_err(|e| format!("Invalid turn number '{}': {}", turn, e))?;
            let moves = moves
                .split('|')
                .map(str::parse::<Direction>)
                .collect::<Result<Vec<_>, _>>()?;
            Ok((turn, moves))
        })
        .collect()
}

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: i32,
    /// Seed the turn was replayed with
    pub seed: u64,
    pub original_move: Direction,
    pub replayed_move: Direction,
    pub matches: bool,
    pub original_source: Option<MoveSource>,
    pub replayed_source: MoveSource,
    pub original_target: Option<Coord>,
    pub replayed_target: Option<Coord>,
    pub original_path_len: usize,
    pub replayed_path_len: usize,
    pub computation_time_us: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
    pub sources: BTreeMap<&'static str, usize>,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    engine: MoveEngine,
    seed: u64,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine
    ///
    /// `seed` overrides the config seed; without either the replay uses seed 0.
    /// Either only applies to entries logged without a seed.
    pub fn new(config: Config, seed: Option<u64>, verbose: bool) -> Self {
        let seed = seed.or(config.engine.seed).unwrap_or(0);
        ReplayEngine {
            engine: MoveEngine::new(config),
            seed,
            verbose,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let entries = parse_entries(BufReader::new(file))?;
        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Runs the engine on a rebuilt state with the given turn seed
    pub fn replay_turn(&self, state: &GameState, seed: u64) -> Result<(Decision, u128), String> {
        let start_time = Instant::now();
        let mut rng = StdRng::seed_from_u64(seed);

        let decision = self
            .engine
            .decide(state, &mut rng)
            .map_err(|e| format!("Engine rejected turn {}: {}", state.turn, e))?;

        Ok((decision, start_time.elapsed().as_micros()))
    }

    /// Seed a logged turn is replayed with
    pub fn seed_for(&self, entry: &LogEntry) -> u64 {
        entry
            .seed
            .unwrap_or_else(|| turn_seed(Some(self.seed), entry.turn))
    }

    /// Replays a single move entry and compares the result
    pub fn replay_entry(&self, entry: &LogEntry) -> Result<ReplayResult, String> {
        if entry.kind != EntryKind::Move {
            return Err(format!("Turn {} is a game end entry, not a move", entry.turn));
        }

        let chosen = entry
            .chosen_move
            .as_deref()
            .ok_or_else(|| format!("Turn {} has no logged move", entry.turn))?;
        let original_move = Self::parse_direction(chosen)?;

        let seed = self.seed_for(entry);
        let (decision, computation_time_us) = self.replay_turn(&Self::state_of(entry), seed)?;
        debug!(
            "Turn {}: logged {} replayed {} via {} (seed {})",
            entry.turn,
            original_move,
            decision.direction,
            decision.source.as_str(),
            seed
        );

        Ok(ReplayResult {
            turn: entry.turn,
            seed,
            original_move,
            replayed_move: decision.direction,
            matches: original_move == decision.direction,
            original_source: entry.source,
            replayed_source: decision.source,
            original_target: entry.target,
            replayed_target: decision.target.map(|t| t.cell),
            original_path_len: entry.path_len,
            replayed_path_len: decision.path_len,
            computation_time_us,
        })
    }

    /// Replays every move entry in a log
    pub fn replay_all(&self, entries: &[LogEntry]) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for entry in entries.iter().filter(|e| e.kind == EntryKind::Move) {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", entry.turn, e);
                }
            }
        }

        Ok(results)
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(
        &self,
        entries: &[LogEntry],
        turn_numbers: &[i32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for turn_num in turn_numbers {
            let entry = Self::find_move(entries, *turn_num)?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", turn_num, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        let mut sources = BTreeMap::new();
        for result in results {
            *sources.entry(result.replayed_source.as_str()).or_insert(0) += 1;
        }

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
            sources,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Seed:           {}", self.seed);
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results.iter().map(|r| r.computation_time_us as f64).sum::<f64>()
                / results.len() as f64;
            println!("Average Computation Time:   {:.1}us", avg_time);
            for (source, count) in &stats.sources {
                println!("  {:<12} {}", source, count);
            }
            println!();
        }

        if self.verbose {
            println!("Turn  Move (logged -> replayed)  Source  Target  Path length");
            for r in results {
                println!(
                    "{:>4}  {} -> {}  {} -> {}  {} -> {}  {} -> {}  seed {}",
                    r.turn,
                    r.original_move,
                    r.replayed_move,
                    r.original_source.map_or("?", |s| s.as_str()),
                    r.replayed_source.as_str(),
                    cell_label(r.original_target),
                    cell_label(r.replayed_target),
                    r.original_path_len,
                    r.replayed_path_len,
                    r.seed
                );
            }
            println!();
        }

        // Show mismatches in detail
        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Turn {}: {} → {} (logged via {}, replayed via {})",
                    result.turn,
                    result.original_move,
                    result.replayed_move,
                    result.original_source.map(|s| s.as_str()).unwrap_or("?"),
                    result.replayed_source.as_str()
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were made
    pub fn validate_expected_moves(
        &self,
        entries: &[LogEntry],
        expected_moves: &[(i32, Vec<Direction>)], // (turn, acceptable_moves)
    ) -> Result<(), String> {
        for (turn, acceptable) in expected_moves {
            let entry = Self::find_move(entries, *turn)?;
            let chosen = entry
                .chosen_move
                .as_deref()
                .ok_or_else(|| format!("Turn {} has no logged move", turn))?;
            let actual_move = Self::parse_direction(chosen)?;

            if !acceptable.contains(&actual_move) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    turn,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    actual_move.as_str()
                ));
            }
        }

        Ok(())
    }

    /// Game state the server saw when it logged this entry
    pub fn state_of(entry: &LogEntry) -> GameState {
        GameState {
            game: Game {
                id: entry.game_id.clone(),
                ..Game::default()
            },
            turn: entry.turn,
            board: entry.board.clone(),
            you: entry.you.clone(),
        }
    }

    fn find_move(entries: &[LogEntry], turn: i32) -> Result<&LogEntry, String> {
        entries
            .iter()
            .find(|e| e.kind == EntryKind::Move && e.turn == turn)
            .ok_or_else(|| format!("Turn {} not found in log file", turn))
    }

    /// Helper to parse direction string
    pub fn parse_direction(s: &str) -> Result<Direction, String> {
        s.parse()
    }
}

fn cell_label(cell: Option<Coord>) -> String {
    cell.map_or_else(|| "-".to_string(), |c| c.to_string())
}

/// Parses JSONL log lines, skipping blank ones
pub fn parse_entries<R: BufRead>(reader: R) -> Result<Vec<LogEntry>, String> {
    let mut entries = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

        if line.trim().is_empty() {
            continue;
        }

        let entry: LogEntry = serde_json::from_str(&line)
            .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

        entries.push(entry);
    }

    Ok(entries)
}
