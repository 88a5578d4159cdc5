// Rule-based move filtering
//
// Starts from all four moves and strips the ones that are certainly fatal this
// turn: reversing onto the neck, leaving the board, hitting our own body, and
// hitting another snake's body.

use rand::seq::IteratorRandom;
use rand::Rng;
use serde::Serialize;
use std::fmt;

use crate::types::{Coord, Direction};

/// Fixed-size set of directions backed by a 4-bit mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MoveSet(u8);

impl MoveSet {
    pub const fn empty() -> Self {
        MoveSet(0)
    }

    pub const fn all() -> Self {
        MoveSet(0b1111)
    }

    fn bit(dir: Direction) -> u8 {
        match dir {
            Direction::Up => 0b0001,
            Direction::Down => 0b0010,
            Direction::Left => 0b0100,
            Direction::Right => 0b1000,
        }
    }

    pub fn insert(&mut self, dir: Direction) {
        self.0 |= Self::bit(dir);
    }

    /// Removing an absent move is a no-op
    pub fn remove(&mut self, dir: Direction) {
        self.0 &= !Self::bit(dir);
    }

    pub fn contains(&self, dir: Direction) -> bool {
        self.0 & Self::bit(dir) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in up, down, left, right order
    pub fn iter(&self) -> impl Iterator<Item = Direction> {
        let set = *self;
        Direction::all().into_iter().filter(move |d| set.contains(*d))
    }

    pub fn first(&self) -> Option<Direction> {
        self.iter().next()
    }

    /// Uniform choice among the members
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Direction> {
        self.iter().choose(rng)
    }
}

impl FromIterator<Direction> for MoveSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = MoveSet::empty();
        for dir in iter {
            set.insert(dir);
        }
        set
    }
}

impl fmt::Display for MoveSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|d| d.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

impl Serialize for MoveSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Computes the set of moves that do not lead to certain death this turn
///
/// # Arguments
/// * `body` - Our body, head first
/// * `width`, `height` - Board dimensions
/// * `opponents` - Bodies of every other snake
pub fn legal_moves(body: &[Coord], width: i32, height: i32, opponents: &[&[Coord]]) -> MoveSet {
    let mut moves = MoveSet::all();
    let head = match body.first() {
        Some(head) => *head,
        None => return moves,
    };

    avoid_neck(body, &mut moves);
    avoid_walls(&head, width, height, &mut moves);
    avoid_own_body(body, &mut moves);
    for other in opponents {
        avoid_body(&head, other, &mut moves);
    }

    moves
}

/// Removes the move that reverses onto the neck
pub fn avoid_neck(body: &[Coord], moves: &mut MoveSet) {
    if let (Some(head), Some(neck)) = (body.first(), body.get(1)) {
        if let Some(dir) = Direction::between(head, neck) {
            moves.remove(dir);
        }
    }
}

/// Removes moves that would leave the board
pub fn avoid_walls(head: &Coord, width: i32, height: i32, moves: &mut MoveSet) {
    for dir in Direction::all() {
        let next = dir.apply(head);
        if next.x < 0 || next.x >= width || next.y < 0 || next.y >= height {
            moves.remove(dir);
        }
    }
}

/// Removes moves onto our own body, except the tail when it vacates this turn
pub fn avoid_own_body(body: &[Coord], moves: &mut MoveSet) {
    let head = match body.first() {
        Some(head) => *head,
        None => return,
    };
    let growing = body.len() >= 2 && body[body.len() - 1] == body[body.len() - 2];
    let checked = if growing || body.len() < 2 {
        body
    } else {
        &body[..body.len() - 1]
    };

    avoid_body(&head, &checked[1.min(checked.len())..], moves);
}

/// Removes moves that land on any cell of `segments`
pub fn avoid_body(head: &Coord, segments: &[Coord], moves: &mut MoveSet) {
    for dir in Direction::all() {
        if segments.contains(&dir.apply(head)) {
            moves.remove(dir);
        }
    }
}

/// Picks a move when the legal set is empty: an in-bounds move that is not the
/// neck, then any in-bounds move, then `up`
pub fn least_bad_move(body: &[Coord], width: i32, height: i32) -> Direction {
    let head = match body.first() {
        Some(head) => *head,
        None => return Direction::Up,
    };

    let mut in_bounds = MoveSet::all();
    avoid_walls(&head, width, height, &mut in_bounds);

    let mut not_neck = in_bounds;
    avoid_neck(body, &mut not_neck);

    not_neck
        .first()
        .or_else(|| in_bounds.first())
        .unwrap_or(Direction::Up)
}

/// Standalone selection: uniform among the legal moves, else the least bad move
pub fn choose<R: Rng + ?Sized>(
    legal: MoveSet,
    body: &[Coord],
    width: i32,
    height: i32,
    rng: &mut R,
) -> Direction {
    legal
        .choose(rng)
        .unwrap_or_else(|| least_bad_move(body, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn coords(cells: &[(i32, i32)]) -> Vec<Coord> {
        cells.iter().map(|&(x, y)| Coord::new(x, y)).collect()
    }

    #[test]
    fn test_moveset_remove_is_idempotent() {
        let mut set = MoveSet::all();
        set.remove(Direction::Left);
        set.remove(Direction::Left);
        assert_eq!(set.len(), 3);
        assert!(!set.contains(Direction::Left));

        let mut empty = MoveSet::empty();
        empty.remove(Direction::Up);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_moveset_iterates_in_fixed_order() {
        let set: MoveSet = [Direction::Right, Direction::Up].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Direction::Up, Direction::Right]);
        assert_eq!(set.to_string(), "[up, right]");
    }

    #[test]
    fn test_neck_left_is_removed() {
        let body = coords(&[(5, 5), (4, 5), (3, 5)]);
        let mut moves = MoveSet::all();
        avoid_neck(&body, &mut moves);
        assert!(!moves.contains(Direction::Left));
        assert_eq!(moves.len(), 3);
    }

    #[test]
    fn test_neck_down_is_removed() {
        let body = coords(&[(5, 5), (5, 4), (5, 3)]);
        let moves = legal_moves(&body, 11, 11, &[]);
        assert!(!moves.contains(Direction::Down));
        assert_eq!(moves.len(), 3);
    }

    #[test]
    fn test_stacked_start_has_no_neck() {
        let body = coords(&[(5, 5), (5, 5), (5, 5)]);
        assert_eq!(legal_moves(&body, 11, 11, &[]), MoveSet::all());
    }

    #[test]
    fn test_corner_walls() {
        let body = coords(&[(0, 0), (1, 0), (2, 0)]);
        let moves = legal_moves(&body, 11, 11, &[]);
        assert_eq!(moves.iter().collect::<Vec<_>>(), vec![Direction::Up]);

        let body = coords(&[(10, 10), (9, 10), (8, 10)]);
        let moves = legal_moves(&body, 11, 11, &[]);
        assert_eq!(moves.iter().collect::<Vec<_>>(), vec![Direction::Down]);
    }

    #[test]
    fn test_own_body_blocks_but_tail_vacates() {
        // Coiled: head (5,5), body wraps so (5,6) is a mid segment and (6,5) is the tail
        let body = coords(&[(5, 5), (4, 5), (4, 6), (5, 6), (6, 6), (6, 5)]);
        let moves = legal_moves(&body, 11, 11, &[]);
        assert!(!moves.contains(Direction::Left));
        assert!(!moves.contains(Direction::Up));
        assert!(moves.contains(Direction::Right), "tail cell vacates this turn");
        assert!(moves.contains(Direction::Down));
    }

    #[test]
    fn test_growing_tail_stays_blocked() {
        let body = coords(&[(5, 5), (4, 5), (4, 6), (5, 6), (6, 6), (6, 5), (6, 5)]);
        let moves = legal_moves(&body, 11, 11, &[]);
        assert!(!moves.contains(Direction::Right));
    }

    #[test]
    fn test_opponent_bodies_removed() {
        let body = coords(&[(5, 5), (5, 4), (5, 3)]);
        let other = coords(&[(6, 6), (6, 5), (6, 4)]);
        let moves = legal_moves(&body, 11, 11, &[&other]);
        assert!(!moves.contains(Direction::Right));
        assert!(moves.contains(Direction::Up));
        assert!(moves.contains(Direction::Left));
    }

    #[test]
    fn test_least_bad_move_stays_in_bounds() {
        // Boxed in at the top wall: only down is in-bounds and not the neck
        let body = coords(&[(5, 10), (4, 10), (4, 9)]);
        assert_eq!(least_bad_move(&body, 11, 11), Direction::Down);

        // Neck is the only in-bounds cell left on a 1-wide board
        let body = coords(&[(0, 1), (0, 0)]);
        assert_eq!(least_bad_move(&body, 1, 2), Direction::Down);
    }

    #[test]
    fn test_choose_picks_only_legal_moves() {
        let body = coords(&[(5, 5), (4, 5), (3, 5)]);
        let legal = legal_moves(&body, 11, 11, &[]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let dir = choose(legal, &body, 11, 11, &mut rng);
            assert!(legal.contains(dir));
        }
    }

    #[test]
    fn test_choose_falls_back_when_empty() {
        let body = coords(&[(5, 10), (4, 10), (4, 9)]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(choose(MoveSet::empty(), &body, 11, 11, &mut rng), Direction::Down);
    }
}
