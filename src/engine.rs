// Per-turn move decision
//
// One engine, two modes. `Pathfinding` encodes the board, picks a target,
// searches a path and turns its first step into a move; the safety filter
// validates that step and supplies the fallback. `RuleBased` skips straight to
// the safety filter. Both are pure functions of the game state and the
// injected random source.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{Config, EngineMode};
use crate::error::EngineError;
use crate::grid::Grid;
use crate::pathfinding::find_weighted_path;
use crate::resolver;
use crate::safety::{self, MoveSet};
use crate::target::{self, Target};
use crate::types::{Coord, Direction, GameState};

/// Largest board side the engine accepts
///
/// Standard boards are 7 to 25 cells per side. Anything far beyond that is a
/// malformed request, and encoding it would allocate the whole area up front.
pub const MAX_BOARD_SIDE: i32 = 100;

/// How a move was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveSource {
    /// First step of the path to the target
    Path,
    /// Uniform choice among the safety filter's legal moves
    SafeRandom,
    /// No legal move was left
    LeastBad,
    /// Precomputed answer used when the engine missed the deadline or failed
    Fallback,
}

impl MoveSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveSource::Path => "path",
            MoveSource::SafeRandom => "safe_random",
            MoveSource::LeastBad => "least_bad",
            MoveSource::Fallback => "fallback",
        }
    }
}

/// Result of one move decision
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub direction: Direction,
    pub source: MoveSource,
    pub target: Option<Target>,
    /// Cells in the path including the start, zero when there was none
    pub path_len: usize,
    pub legal: MoveSet,
}

/// Stateless move decision engine
#[derive(Debug, Clone)]
pub struct MoveEngine {
    config: Config,
}

impl MoveEngine {
    pub fn new(config: Config) -> Self {
        MoveEngine { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Rejects states the engine cannot reason about
    pub fn validate(state: &GameState) -> Result<(), EngineError> {
        let (width, height) = (state.board.width, state.board.height);
        if width < 1 || height < 1 {
            return Err(EngineError::InvalidDimensions { width, height });
        }
        if width > MAX_BOARD_SIDE || height > MAX_BOARD_SIDE || width.checked_mul(height).is_none() {
            return Err(EngineError::BoardTooLarge {
                width,
                height,
                max: MAX_BOARD_SIDE,
            });
        }
        if state.turn < 0 {
            return Err(EngineError::NegativeTurn(state.turn));
        }

        let in_bounds = |what: &'static str, coord: &Coord| {
            if state.board.contains(coord) {
                Ok(())
            } else {
                Err(EngineError::OutOfBounds { what, coord: *coord, width, height })
            }
        };

        for snake in state.board.snakes.iter().chain(std::iter::once(&state.you)) {
            let body_head = snake
                .body
                .first()
                .copied()
                .ok_or_else(|| EngineError::EmptyBody { id: snake.id.clone() })?;
            if snake.head != body_head {
                return Err(EngineError::HeadMismatch {
                    id: snake.id.clone(),
                    head: snake.head,
                    body_head,
                });
            }
            if !(0..=100).contains(&snake.health) {
                return Err(EngineError::InvalidHealth {
                    id: snake.id.clone(),
                    health: snake.health,
                });
            }
            for segment in &snake.body {
                in_bounds("snake body", segment)?;
            }
        }
        for item in &state.board.food {
            in_bounds("food", item)?;
        }
        for hazard in &state.board.hazards {
            in_bounds("hazard", hazard)?;
        }

        Ok(())
    }

    /// Moves that do not lead to certain death this turn
    pub fn legal_moves(state: &GameState) -> MoveSet {
        let opponents: Vec<&[Coord]> = state.opponents().map(|s| s.body.as_slice()).collect();
        safety::legal_moves(
            &state.you.body,
            state.board.width,
            state.board.height,
            &opponents,
        )
    }

    /// Cheap deterministic answer that is always available before the engine runs
    pub fn fallback_move(state: &GameState) -> Direction {
        Self::legal_moves(state).first().unwrap_or_else(|| {
            safety::least_bad_move(&state.you.body, state.board.width, state.board.height)
        })
    }

    /// Decides this turn's move
    pub fn decide<R: Rng + ?Sized>(&self, state: &GameState, rng: &mut R) -> Result<Decision, EngineError> {
        Self::validate(state)?;
        let legal = Self::legal_moves(state);

        match self.config.engine.mode {
            EngineMode::Pathfinding => self.decide_by_path(state, legal, rng),
            EngineMode::RuleBased => Ok(Self::decide_by_rules(state, legal, None, 0, rng)),
        }
    }

    fn decide_by_path<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        legal: MoveSet,
        rng: &mut R,
    ) -> Result<Decision, EngineError> {
        let grid = Grid::from_state(state, self.config.encoder.reopen);
        let head = state.you.body[0];

        let target = match target::select_target(state, &grid, &self.config.targeting, rng) {
            Ok(target) => Some(target),
            Err(EngineError::NoWalkableCell) => {
                warn!("Turn {}: no walkable cell to target", state.turn);
                None
            }
            Err(e) => return Err(e),
        };

        let path = target
            .map(|t| {
                find_weighted_path(&grid, head, t.cell, self.config.pathfinding.hazard_step_cost)
            })
            .unwrap_or_default();

        debug!(
            "Turn {}: target {:?}, path {:?}\n{}",
            state.turn, target, path, grid
        );

        let step = resolver::first_step(&path).filter(|dir| {
            let safe = legal.contains(*dir);
            if !safe {
                warn!(
                    "Turn {}: path step {} rejected, legal moves are {}",
                    state.turn, dir, legal
                );
            }
            safe
        });

        match step {
            Some(direction) => Ok(Decision {
                direction,
                source: MoveSource::Path,
                target,
                path_len: path.len(),
                legal,
            }),
            None => Ok(Self::decide_by_rules(state, legal, target, path.len(), rng)),
        }
    }

    fn decide_by_rules<R: Rng + ?Sized>(
        state: &GameState,
        legal: MoveSet,
        target: Option<Target>,
        path_len: usize,
        rng: &mut R,
    ) -> Decision {
        let (direction, source) = if legal.is_empty() {
            let dir = safety::least_bad_move(&state.you.body, state.board.width, state.board.height);
            (dir, MoveSource::LeastBad)
        } else {
            (resolver::fallback(legal, rng), MoveSource::SafeRandom)
        };

        Decision {
            direction,
            source,
            target,
            path_len,
            legal,
        }
    }
}

/// Seed for one turn's random source
///
/// With a game seed the result depends only on it and the turn. Without one a
/// fresh seed is drawn from the OS; the server logs it so the turn still
/// replays exactly.
pub fn turn_seed(seed: Option<u64>, turn: i32) -> u64 {
    match seed {
        Some(seed) => seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ turn as u64,
        None => rand::random(),
    }
}

/// Random source for one turn, see [`turn_seed`]
pub fn turn_rng(seed: Option<u64>, turn: i32) -> StdRng {
    StdRng::seed_from_u64(turn_seed(seed, turn))
}
