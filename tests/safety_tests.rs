// Safety filter tests
//
// Legal move filtering on hand-built bodies, and the choice made when the
// filter leaves nothing.

use pathy_snake::safety::{choose, least_bad_move, legal_moves, MoveSet};
use pathy_snake::types::{Coord, Direction};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn body(cells: &[(i32, i32)]) -> Vec<Coord> {
    cells.iter().map(|&(x, y)| Coord::new(x, y)).collect()
}

#[test]
fn test_neck_to_the_left_removes_left() {
    let moves = legal_moves(&body(&[(5, 5), (4, 5), (3, 5)]), 11, 11, &[]);
    assert!(!moves.contains(Direction::Left));
    assert_eq!(moves.len(), 3);
}

#[test]
fn test_neck_below_removes_down() {
    let moves = legal_moves(&body(&[(5, 5), (5, 4), (5, 3)]), 11, 11, &[]);
    assert!(!moves.contains(Direction::Down));
    assert_eq!(moves.len(), 3);
}

#[test]
fn test_corner_and_walls() {
    let moves = legal_moves(&body(&[(10, 10), (9, 10), (8, 10)]), 11, 11, &[]);
    let expected: MoveSet = [Direction::Down].into_iter().collect();
    assert_eq!(moves, expected);
}

#[test]
fn test_opponent_bodies_are_avoided() {
    let rival = body(&[(6, 5), (6, 6), (6, 7)]);
    let moves = legal_moves(&body(&[(5, 5), (4, 5), (3, 5)]), 11, 11, &[&rival]);
    assert!(!moves.contains(Direction::Right));
    assert!(moves.contains(Direction::Up));
    assert!(moves.contains(Direction::Down));
}

#[test]
fn test_own_tail_is_free_unless_growing() {
    // Coiled body whose tail sits right above the head
    let coiled = body(&[(5, 5), (6, 5), (6, 6), (5, 6)]);
    assert!(legal_moves(&coiled, 11, 11, &[]).contains(Direction::Up));

    let growing = body(&[(5, 5), (6, 5), (6, 6), (5, 6), (5, 6)]);
    assert!(!legal_moves(&growing, 11, 11, &[]).contains(Direction::Up));
}

#[test]
fn test_trapped_snake_still_gets_a_move() {
    let you = body(&[(0, 0), (0, 1), (0, 2)]);
    let rival = body(&[(1, 0), (1, 1), (1, 2)]);
    let moves = legal_moves(&you, 11, 11, &[&rival]);
    assert!(moves.is_empty());

    // Right stays on the board and is not the neck
    assert_eq!(least_bad_move(&you, 11, 11), Direction::Right);
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(choose(moves, &you, 11, 11, &mut rng), Direction::Right);
}

#[test]
fn test_choose_is_uniform_over_legal_moves() {
    let you = body(&[(5, 5), (4, 5), (3, 5)]);
    let legal = legal_moves(&you, 11, 11, &[]);
    let mut rng = StdRng::seed_from_u64(21);

    let mut seen = MoveSet::empty();
    for _ in 0..200 {
        let dir = choose(legal, &you, 11, 11, &mut rng);
        assert!(legal.contains(dir));
        seen.insert(dir);
    }
    assert_eq!(seen, legal);
}
