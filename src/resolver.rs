// Converts the first step of a path into a cardinal move

use log::warn;
use rand::Rng;

use crate::safety::MoveSet;
use crate::types::{Coord, Direction};

/// Direction of the first step, `None` when there is no step to take
///
/// A non-adjacent first pair cannot come out of the path finder; it trips a
/// debug assertion and is treated as "no step" in release builds.
pub fn first_step(path: &[Coord]) -> Option<Direction> {
    if path.len() < 2 {
        return None;
    }
    let (current, next) = (path[0], path[1]);
    let dir = Direction::between(&current, &next);

    debug_assert!(
        dir.is_some(),
        "path step {} -> {} is not 4-adjacent",
        current,
        next
    );
    if dir.is_none() {
        warn!("Ignoring non-adjacent path step {} -> {}", current, next);
    }
    dir
}

/// Resolves a path into a move
///
/// Without a usable first step this falls back to a uniform choice among
/// `legal`, and only to a uniform choice over all four moves when `legal` is
/// empty.
pub fn resolve<R: Rng + ?Sized>(path: &[Coord], legal: MoveSet, rng: &mut R) -> Direction {
    first_step(path).unwrap_or_else(|| fallback(legal, rng))
}

/// Move to make when there is no usable path step
pub fn fallback<R: Rng + ?Sized>(legal: MoveSet, rng: &mut R) -> Direction {
    legal
        .choose(rng)
        .unwrap_or_else(|| Direction::all()[rng.random_range(0..4)])
}
