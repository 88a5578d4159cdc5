// Engine errors
//
// Every variant except `NoWalkableCell` describes a malformed game state. The
// engine refuses to guess a move for those; the caller picks the fallback.

use crate::types::Coord;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("board dimensions {width}x{height} must both be at least 1")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("board dimensions {width}x{height} exceed the {max}x{max} limit")]
    BoardTooLarge { width: i32, height: i32, max: i32 },

    #[error("snake '{id}' has an empty body")]
    EmptyBody { id: String },

    #[error("snake '{id}' reports head {head} but its body starts at {body_head}")]
    HeadMismatch {
        id: String,
        head: Coord,
        body_head: Coord,
    },

    #[error("{what} at {coord} lies outside the {width}x{height} board")]
    OutOfBounds {
        what: &'static str,
        coord: Coord,
        width: i32,
        height: i32,
    },

    #[error("snake '{id}' has health {health}, expected 0..=100")]
    InvalidHealth { id: String, health: i32 },

    #[error("turn {0} is negative")]
    NegativeTurn(i32),

    /// Not a malformed state: every cell is occupied
    #[error("no walkable cell left on the board")]
    NoWalkableCell,
}

impl EngineError {
    /// True for precondition violations in the submitted state
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, EngineError::NoWalkableCell)
    }
}
