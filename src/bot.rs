// Battlesnake bot: binds the move engine to the API endpoints
//
// The engine itself is synchronous and stateless. This layer owns the time
// budget: a safe fallback is computed before the engine starts, the engine runs
// on tokio's blocking pool, and whatever misses the deadline is replaced by the
// fallback.

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::debug_logger::{DebugLogger, LogEntry};
use crate::engine::{turn_seed, Decision, MoveEngine, MoveSource};
use crate::types::GameState;

/// Battlesnake Bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    engine: Arc<MoveEngine>,
    logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot instance with debug logging disabled
    pub fn new(config: Config) -> Self {
        Self::with_logger(config, DebugLogger::disabled())
    }

    pub fn with_logger(config: Config, logger: DebugLogger) -> Self {
        Bot {
            engine: Arc::new(MoveEngine::new(config)),
            logger,
        }
    }

    pub fn config(&self) -> &Config {
        self.engine.config()
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");
        let appearance = &self.config().appearance;

        json!({
            "apiversion": "1",
            "author": appearance.author,
            "color": appearance.color,
            "head": appearance.head,
            "tail": appearance.tail,
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, state: &GameState) {
        info!(
            "GAME START {} ({}x{}, {} snakes)",
            state.game.id,
            state.board.width,
            state.board.height,
            state.board.snakes.len()
        );
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, state: &GameState) {
        let survived = state.board.snakes.iter().any(|s| s.id == state.you.id);
        info!(
            "GAME OVER {} at turn {} ({})",
            state.game.id,
            state.turn,
            if survived { "survived" } else { "eliminated" }
        );
        self.logger.log(LogEntry::for_end(state));
    }

    /// Computes this turn's move within the time budget
    /// Corresponds to POST /move endpoint
    pub async fn get_move(&self, state: &GameState) -> Value {
        let seed = turn_seed(self.config().engine.seed, state.turn);
        let decision = self.decide_within_budget(state, seed).await;
        self.logger.log(LogEntry::for_move(state, &decision).with_seed(seed));
        json!({ "move": decision.direction.as_str() })
    }

    /// Runs the engine under the deadline, answering with the fallback on failure
    ///
    /// `seed` seeds the engine's random source for this turn.
    pub async fn decide_within_budget(&self, state: &GameState, seed: u64) -> Decision {
        let start_time = Instant::now();
        let budget = Duration::from_millis(self.config().timing.effective_budget_ms());

        let fallback = Decision {
            direction: MoveEngine::fallback_move(state),
            source: MoveSource::Fallback,
            target: None,
            path_len: 0,
            legal: MoveEngine::legal_moves(state),
        };

        let engine = self.engine.clone();
        let owned = state.clone();
        let task = tokio::task::spawn_blocking(move || {
            let mut rng = StdRng::seed_from_u64(seed);
            engine.decide(&owned, &mut rng)
        });

        let decision = match tokio::time::timeout(budget, task).await {
            Ok(Ok(Ok(decision))) => decision,
            Ok(Ok(Err(e))) => {
                error!("Turn {}: rejected game state: {}", state.turn, e);
                fallback
            }
            Ok(Err(e)) => {
                error!("Turn {}: engine task failed: {}", state.turn, e);
                fallback
            }
            Err(_) => {
                warn!(
                    "Turn {}: engine missed the {}ms budget, using fallback",
                    state.turn,
                    budget.as_millis()
                );
                fallback
            }
        };

        info!(
            "Turn {}: {} via {} (target {:?}, path {}) in {}ms",
            state.turn,
            decision.direction,
            decision.source.as_str(),
            decision.target.map(|t| t.cell),
            decision.path_len,
            start_time.elapsed().as_millis()
        );

        decision
    }
}
