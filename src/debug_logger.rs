// Debug logging module for asynchronous game state logging
//
// This module provides fire-and-forget async logging to avoid blocking
// the main request/response cycle. Each decision and each game end is
// appended to a JSONL file that the replay and report tools read back.

use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::engine::{Decision, MoveSource};
use crate::target::Target;
use crate::types::{Battlesnake, Board, Coord, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Move,
    End,
}

/// A single line of the debug log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub kind: EntryKind,
    pub game_id: String,
    pub turn: i32,
    #[serde(default)]
    pub you_id: String,
    pub you: Battlesnake,
    #[serde(default)]
    pub chosen_move: Option<String>,
    #[serde(default)]
    pub source: Option<MoveSource>,
    #[serde(default)]
    pub target: Option<Coord>,
    #[serde(default)]
    pub path_len: usize,
    /// Seed of the turn's random source, absent in older logs
    #[serde(default)]
    pub seed: Option<u64>,
    pub board: Board,
    pub timestamp: String,
}

impl LogEntry {
    pub fn for_move(state: &GameState, decision: &Decision) -> Self {
        LogEntry {
            kind: EntryKind::Move,
            game_id: state.game.id.clone(),
            turn: state.turn,
            you_id: state.you.id.clone(),
            you: state.you.clone(),
            chosen_move: Some(decision.direction.as_str().to_string()),
            source: Some(decision.source),
            target: decision.target.map(|t: Target| t.cell),
            path_len: decision.path_len,
            seed: None,
            board: state.board.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn for_end(state: &GameState) -> Self {
        LogEntry {
            kind: EntryKind::End,
            game_id: state.game.id.clone(),
            turn: state.turn,
            you_id: state.you.id.clone(),
            you: state.you.clone(),
            chosen_move: None,
            source: None,
            target: None,
            path_len: 0,
            seed: None,
            board: state.board.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Shared debug logger state
/// Uses Arc<Mutex<File>> to allow concurrent async writes from multiple tasks
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, opens the log file for appending so history survives restarts
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to open debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs an entry asynchronously (fire-and-forget)
    /// This spawns a tokio task that writes to the file without blocking
    pub fn log(&self, entry: LogEntry) {
        if !self.enabled {
            return;
        }

        let file_handle = self.file.clone();
        tokio::spawn(async move {
            Self::write_entry(file_handle, entry).await;
        });
    }

    /// Writes an entry and waits for it to reach the file
    pub async fn log_now(&self, entry: LogEntry) {
        if self.enabled {
            Self::write_entry(self.file.clone(), entry).await;
        }
    }

    async fn write_entry(file_handle: Arc<Mutex<Option<File>>>, entry: LogEntry) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write debug log entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush debug log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize debug log entry: {}", e);
                }
            }
        }
    }
}
