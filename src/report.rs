// Offline performance report over debug logs
//
// Every `*.jsonl` file in a directory is parsed in parallel, entries are
// grouped per game, and each game is summarized: how it ended, why the snake
// died if it did, and how its moves were produced. The summaries roll up into
// a `PerformanceReport` with a performance level and matching
// recommendations, rendered as markdown.

use log::{info, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::debug_logger::{EntryKind, LogEntry};
use crate::engine::MoveSource;
use crate::safety;
use crate::types::{Coord, Direction};

/// Games shorter than this many turns that end in a loss count as early failures
pub const EARLY_FAILURE_TURNS: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Outcome {
    /// Last snake standing
    Win,
    Loss,
    /// Game ended with us alive next to other survivors, or nobody left
    Draw,
    /// No end entry was logged
    Unfinished,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Draw => "draw",
            Outcome::Unfinished => "unfinished",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeathCause {
    Starvation,
    Wall,
    SelfCollision,
    OpponentCollision,
    HeadToHead,
    /// No legal move was left on the final turn
    Trapped,
    Unknown,
}

impl DeathCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeathCause::Starvation => "starvation",
            DeathCause::Wall => "wall",
            DeathCause::SelfCollision => "self-collision",
            DeathCause::OpponentCollision => "opponent collision",
            DeathCause::HeadToHead => "head-to-head",
            DeathCause::Trapped => "trapped",
            DeathCause::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameSummary {
    pub game_id: String,
    pub turns: i32,
    pub outcome: Outcome,
    pub final_health: i32,
    pub final_length: i32,
    pub death_cause: Option<DeathCause>,
    pub sources: BTreeMap<&'static str, usize>,
}

impl GameSummary {
    pub fn moves(&self) -> usize {
        self.sources.values().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceLevel {
    Elite,
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl PerformanceLevel {
    /// Level for a win rate given in percent
    pub fn from_win_rate(rate: f64) -> Self {
        if rate >= 90.0 {
            PerformanceLevel::Elite
        } else if rate >= 75.0 {
            PerformanceLevel::Excellent
        } else if rate >= 60.0 {
            PerformanceLevel::Good
        } else if rate >= 40.0 {
            PerformanceLevel::Fair
        } else {
            PerformanceLevel::NeedsImprovement
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceLevel::Elite => "ELITE",
            PerformanceLevel::Excellent => "EXCELLENT",
            PerformanceLevel::Good => "GOOD",
            PerformanceLevel::Fair => "FAIR",
            PerformanceLevel::NeedsImprovement => "NEEDS_IMPROVEMENT",
        }
    }

    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            PerformanceLevel::NeedsImprovement => &[
                "Fix basic survival first: most games are lost",
                "Audit wall and body avoidance on the turns before each death",
                "Raise the health threshold so food is sought earlier",
                "Check how often moves come from the fallback instead of a path",
            ],
            PerformanceLevel::Fair => &[
                "Weight paths away from cells next to longer opponents' heads",
                "Prefer exploration targets with more reachable space around them",
                "Look at early failures for repeated death causes",
            ],
            PerformanceLevel::Good => &[
                "Tune the health threshold per board size",
                "Use hazard step costs on boards with hazards",
                "Review long games for wasted turns spent wandering",
            ],
            PerformanceLevel::Excellent => &[
                "Analyze the remaining losses turn by turn with the replay tool",
                "Test against a wider set of opponents",
            ],
            PerformanceLevel::Elite => &[
                "Keep the configuration stable and track regressions",
                "Replay every remaining loss to confirm it was unavoidable",
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct PerformanceReport {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub unfinished: usize,
    /// Percent of finished games won
    pub win_rate: f64,
    pub early_failures: usize,
    /// Percent of finished games lost before `EARLY_FAILURE_TURNS`
    pub early_failure_rate: f64,
    pub causes: BTreeMap<DeathCause, usize>,
    pub average_turns: f64,
    /// Percent of moves not taken from a path
    pub fallback_rate: f64,
    pub level: PerformanceLevel,
}

impl PerformanceReport {
    pub fn from_summaries(summaries: &[GameSummary]) -> Self {
        let count = |o: Outcome| summaries.iter().filter(|s| s.outcome == o).count();
        let (wins, losses, draws, unfinished) = (
            count(Outcome::Win),
            count(Outcome::Loss),
            count(Outcome::Draw),
            count(Outcome::Unfinished),
        );
        let finished = wins + losses + draws;

        let early_failures = summaries
            .iter()
            .filter(|s| s.outcome == Outcome::Loss && s.turns < EARLY_FAILURE_TURNS)
            .count();

        let mut causes = BTreeMap::new();
        for cause in summaries.iter().filter_map(|s| s.death_cause) {
            *causes.entry(cause).or_insert(0) += 1;
        }

        let moves: usize = summaries.iter().map(GameSummary::moves).sum();
        let path_moves: usize = summaries
            .iter()
            .filter_map(|s| s.sources.get(MoveSource::Path.as_str()))
            .sum();

        let win_rate = percent(wins, finished);

        PerformanceReport {
            games: summaries.len(),
            wins,
            losses,
            draws,
            unfinished,
            win_rate,
            early_failures,
            early_failure_rate: percent(early_failures, finished),
            causes,
            average_turns: if summaries.is_empty() {
                0.0
            } else {
                summaries.iter().map(|s| s.turns as f64).sum::<f64>() / summaries.len() as f64
            },
            fallback_rate: percent(moves - path_moves, moves),
            level: PerformanceLevel::from_win_rate(win_rate),
        }
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Loads every `*.jsonl` file in `dir`, in parallel
pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<LogEntry>, String> {
    let dir = dir.as_ref();
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| format!("Failed to read log directory '{}': {}", dir.display(), e))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("jsonl"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(format!("No .jsonl files found in: {}", dir.display()));
    }

    let per_file: Vec<Vec<LogEntry>> = paths
        .par_iter()
        .map(|path| load_file(path))
        .collect::<Result<_, String>>()?;

    let entries: Vec<LogEntry> = per_file.into_iter().flatten().collect();
    info!("Loaded {} entries from {} files", entries.len(), paths.len());
    Ok(entries)
}

fn load_file(path: &Path) -> Result<Vec<LogEntry>, String> {
    let file = File::open(path).map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    crate::replay::parse_entries(BufReader::new(file))
        .map_err(|e| format!("{}: {}", path.display(), e))
}

/// Groups entries per game, each game sorted by turn with end entries last
pub fn group_by_game(entries: Vec<LogEntry>) -> BTreeMap<String, Vec<LogEntry>> {
    let mut games: BTreeMap<String, Vec<LogEntry>> = BTreeMap::new();
    for entry in entries {
        games.entry(entry.game_id.clone()).or_default().push(entry);
    }
    for entries in games.values_mut() {
        entries.sort_by_key(|e| (e.turn, e.kind == EntryKind::End));
    }
    games
}

/// Summarizes one game's entries
pub fn summarize_game(game_id: &str, entries: &[LogEntry]) -> GameSummary {
    let last_move = entries.iter().rev().find(|e| e.kind == EntryKind::Move);
    let end = entries.iter().rev().find(|e| e.kind == EntryKind::End);

    let outcome = match end {
        None => Outcome::Unfinished,
        Some(end) => {
            let alive = end.board.snakes.iter().any(|s| s.id == end.you.id);
            let others = end.board.snakes.iter().filter(|s| s.id != end.you.id).count();
            if alive && others == 0 {
                Outcome::Win
            } else if alive || (end.board.snakes.is_empty() && had_opponents(entries)) {
                Outcome::Draw
            } else {
                Outcome::Loss
            }
        }
    };

    let death_cause = if outcome == Outcome::Loss {
        Some(last_move.map_or(DeathCause::Unknown, |m| classify_death(m, end)))
    } else {
        None
    };

    let mut sources = BTreeMap::new();
    for source in entries.iter().filter_map(|e| e.source) {
        *sources.entry(source.as_str()).or_insert(0) += 1;
    }

    let final_state = end.or(last_move);
    GameSummary {
        game_id: game_id.to_string(),
        turns: entries.iter().map(|e| e.turn).max().unwrap_or(0),
        outcome,
        final_health: final_state.map_or(0, |e| e.you.health),
        final_length: final_state.map_or(0, |e| e.you.length),
        death_cause,
        sources,
    }
}

fn had_opponents(entries: &[LogEntry]) -> bool {
    entries
        .iter()
        .any(|e| e.board.snakes.iter().any(|s| s.id != e.you.id))
}

/// Works out why the move in `last` killed the snake
///
/// `end` is the board after the move, when it was logged. Causes are checked
/// in order: starvation, trapped, wall, self-collision, head-to-head,
/// opponent collision.
pub fn classify_death(last: &LogEntry, end: Option<&LogEntry>) -> DeathCause {
    let you = &last.you;
    let head = match you.body.first() {
        Some(head) => *head,
        None => return DeathCause::Unknown,
    };
    let next = match last
        .chosen_move
        .as_deref()
        .and_then(|m| m.parse::<Direction>().ok())
    {
        Some(dir) => dir.apply(&head),
        None => return DeathCause::Unknown,
    };

    if you.health <= 1 && !last.board.food.contains(&next) {
        return DeathCause::Starvation;
    }

    let opponents: Vec<&[Coord]> = last
        .board
        .snakes
        .iter()
        .filter(|s| s.id != you.id)
        .map(|s| s.body.as_slice())
        .collect();
    if safety::legal_moves(&you.body, last.board.width, last.board.height, &opponents).is_empty() {
        return DeathCause::Trapped;
    }

    if !last.board.contains(&next) {
        return DeathCause::Wall;
    }

    let own = if you.body.len() < 2 {
        &you.body[..0]
    } else if you.is_growing() {
        &you.body[1..]
    } else {
        &you.body[1..you.body.len() - 1]
    };
    if own.contains(&next) {
        return DeathCause::SelfCollision;
    }

    let hit_body = opponents.iter().any(|body| body.contains(&next));
    let head_on = match end {
        Some(end) => end.board.snakes.iter().any(|s| s.id != you.id && s.head == next),
        // Without the final board, a rival at least as long that could reach the same cell
        None => {
            !hit_body
                && last.board.snakes.iter().any(|s| {
                    s.id != you.id && s.length >= you.length && s.head.manhattan(&next) == 1
                })
        }
    };
    if head_on {
        return DeathCause::HeadToHead;
    }

    if hit_body {
        return DeathCause::OpponentCollision;
    }

    DeathCause::Unknown
}

/// Summaries for every game in `dir`
pub fn summarize_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<GameSummary>, String> {
    let games = group_by_game(load_dir(dir)?);
    let summaries: Vec<GameSummary> = games
        .iter()
        .map(|(id, entries)| summarize_game(id, entries))
        .collect();

    for s in summaries.iter().filter(|s| s.outcome == Outcome::Unfinished) {
        warn!("Game {} has no end entry", s.game_id);
    }
    Ok(summaries)
}

/// Renders the report and the per-game table as markdown
pub fn render_markdown(report: &PerformanceReport, summaries: &[GameSummary]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_markdown(&mut out, report, summaries)?;
    Ok(out)
}

fn write_markdown(out: &mut String, report: &PerformanceReport, summaries: &[GameSummary]) -> fmt::Result {
    writeln!(out, "# Battlesnake Performance Report")?;
    writeln!(out)?;
    writeln!(out, "Generated: {}", chrono::Utc::now().to_rfc3339())?;
    writeln!(out)?;
    writeln!(out, "## Summary")?;
    writeln!(out)?;
    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "|---|---|")?;
    writeln!(out, "| Games | {} |", report.games)?;
    writeln!(
        out,
        "| Wins / Losses / Draws | {} / {} / {} |",
        report.wins, report.losses, report.draws
    )?;
    writeln!(out, "| Unfinished | {} |", report.unfinished)?;
    writeln!(out, "| Win rate | {:.1}% |", report.win_rate)?;
    writeln!(
        out,
        "| Early failures (< {} turns) | {} ({:.1}%) |",
        EARLY_FAILURE_TURNS, report.early_failures, report.early_failure_rate
    )?;
    writeln!(out, "| Average turns | {:.1} |", report.average_turns)?;
    writeln!(out, "| Non-path moves | {:.1}% |", report.fallback_rate)?;
    writeln!(out, "| Performance level | **{}** |", report.level.as_str())?;
    writeln!(out)?;

    if !report.causes.is_empty() {
        writeln!(out, "## Death Causes")?;
        writeln!(out)?;
        let mut causes: Vec<_> = report.causes.iter().collect();
        causes.sort_by_key(|(_, n)| std::cmp::Reverse(**n));
        for (cause, n) in causes {
            writeln!(
                out,
                "- {}: {} ({:.1}%)",
                cause.as_str(),
                n,
                percent(*n, report.losses)
            )?;
        }
        writeln!(out)?;
    }

    writeln!(out, "## Recommendations")?;
    writeln!(out)?;
    for (i, rec) in report.level.recommendations().iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, rec)?;
    }
    writeln!(out)?;

    writeln!(out, "## Games")?;
    writeln!(out)?;
    writeln!(out, "| Game | Turns | Outcome | Cause | Health | Length | Moves by source |")?;
    writeln!(out, "|---|---|---|---|---|---|---|")?;
    for s in summaries {
        let sources = s
            .sources
            .iter()
            .map(|(k, v)| format!("{} {}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} |",
            s.game_id,
            s.turns,
            s.outcome.as_str(),
            s.death_cause.map_or("-", |c| c.as_str()),
            s.final_health,
            s.final_length,
            sources
        )?;
    }

    Ok(())
}
