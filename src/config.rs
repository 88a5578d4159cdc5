// Configuration module for reading Snake.toml
// This module provides OOP-style configuration management for the Battlesnake bot

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub engine: EngineConfig,
    pub encoder: EncoderConfig,
    pub targeting: TargetingConfig,
    pub pathfinding: PathfindingConfig,
    pub appearance: AppearanceConfig,
    pub debug: DebugConfig,
}

/// Timing constants for the per-move deadline
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub response_time_budget_ms: u64,
    pub network_overhead_ms: u64,
}

impl TimingConfig {
    /// Computes the effective computation budget
    pub fn effective_budget_ms(&self) -> u64 {
        self.response_time_budget_ms.saturating_sub(self.network_overhead_ms)
    }
}

/// Which decision pipeline the engine runs
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    /// Target selection, path search and direction resolution, validated by the safety filter
    Pathfinding,
    /// Safety filter only, random choice among the surviving moves
    RuleBased,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    pub mode: EngineMode,
    /// Fixed seed for reproducible games; without it each turn draws a fresh seed that the debug log records
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Which cell of our own body the encoder re-opens
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReopenPolicy {
    /// Tail becomes walkable when we are not growing this turn
    Tail,
    /// Head becomes walkable (matches the deployed heuristic)
    Head,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EncoderConfig {
    pub reopen: ReopenPolicy,
}

/// How the hungry snake picks its food
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FoodPolicy {
    /// Minimum Manhattan distance, earliest listed wins ties
    Nearest,
    /// Last listed food, byte-compatible with the deployed heuristic
    LastListed,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TargetingConfig {
    /// Below this health we go for food
    pub health_threshold: i32,
    pub food_policy: FoodPolicy,
    /// Head rows at or below this explore the upper band, above it the lower band
    pub band_split_row: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathfindingConfig {
    /// Extra cost for stepping onto a hazard. Zero keeps the search unweighted.
    pub hazard_step_cost: u32,
}

/// Customizations returned from GET /
#[derive(Debug, Deserialize, Clone)]
pub struct AppearanceConfig {
    pub author: String,
    pub color: String,
    pub head: String,
    pub tail: String,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                response_time_budget_ms: 500,
                network_overhead_ms: 100,
            },
            engine: EngineConfig {
                mode: EngineMode::Pathfinding,
                seed: None,
            },
            encoder: EncoderConfig {
                reopen: ReopenPolicy::Tail,
            },
            targeting: TargetingConfig {
                health_threshold: 80,
                food_policy: FoodPolicy::Nearest,
                band_split_row: 5,
            },
            pathfinding: PathfindingConfig {
                hazard_step_cost: 0,
            },
            appearance: AppearanceConfig {
                author: "es-na-battlesnake".to_string(),
                color: "#C5B358".to_string(),
                head: "silly".to_string(),
                tail: "bolt".to_string(),
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "battlesnake_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Snake.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }
}
