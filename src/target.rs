// Target selection: where the snake heads this turn
//
// Hungry snakes go for food. Otherwise the snake wanders to a random walkable
// cell inside a band picked from its current row. Every branch terminates:
// the band is enumerated up front instead of sampled until something fits.

use log::debug;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{FoodPolicy, TargetingConfig};
use crate::error::EngineError;
use crate::grid::Grid;
use crate::types::{Coord, GameState};

/// Why a target was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Food,
    Explore,
    /// Exploration band had no walkable cell
    Nearest,
    /// The head is the only walkable cell
    Stay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub cell: Coord,
    pub kind: TargetKind,
}

/// Inclusive rectangle of candidate exploration cells, empty when `lo > hi`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub x: (i32, i32),
    pub y: (i32, i32),
}

impl Band {
    pub fn contains(&self, c: &Coord) -> bool {
        c.x >= self.x.0 && c.x <= self.x.1 && c.y >= self.y.0 && c.y <= self.y.1
    }

    pub fn is_empty(&self) -> bool {
        self.x.0 > self.x.1 || self.y.0 > self.y.1
    }
}

/// Band explored from the given head position
///
/// A head at or below `split_row` explores rows `split_row..=height-2`,
/// otherwise rows `0..=width/2`. Columns span `0..=height-2`. Both ranges are
/// clipped to the board, which keeps the top row and the right column out on
/// square boards.
pub fn exploration_band(head: &Coord, width: i32, height: i32, split_row: i32) -> Band {
    let y = if head.y <= split_row {
        (split_row, height - 2)
    } else {
        (0, width / 2)
    };
    let x = (0, height - 2);

    Band {
        x: clip(x, width),
        y: clip(y, height),
    }
}

fn clip((lo, hi): (i32, i32), dim: i32) -> (i32, i32) {
    (lo.max(0), hi.min(dim - 1))
}

/// Chooses this turn's destination
///
/// Returns a walkable cell, or `NoWalkableCell` when the grid has none.
pub fn select_target<R: Rng + ?Sized>(
    state: &GameState,
    grid: &Grid,
    config: &TargetingConfig,
    rng: &mut R,
) -> Result<Target, EngineError> {
    let head = state
        .you
        .body
        .first()
        .copied()
        .ok_or_else(|| EngineError::EmptyBody { id: state.you.id.clone() })?;

    if state.you.health < config.health_threshold {
        if let Some(cell) = pick_food(&state.board.food, &head, grid, config.food_policy) {
            return Ok(Target { cell, kind: TargetKind::Food });
        }
        debug!("Health {} but no usable food, exploring", state.you.health);
    }

    explore(&head, grid, config.band_split_row, rng)
}

/// Picks a food cell that is walkable and not under our head
pub fn pick_food(food: &[Coord], head: &Coord, grid: &Grid, policy: FoodPolicy) -> Option<Coord> {
    let usable = food.iter().filter(|f| *f != head && grid.is_walkable(f));
    match policy {
        // min_by_key keeps the first of equal minima
        FoodPolicy::Nearest => usable.min_by_key(|f| f.manhattan(head)).copied(),
        FoodPolicy::LastListed => usable.last().copied(),
    }
}

fn explore<R: Rng + ?Sized>(
    head: &Coord,
    grid: &Grid,
    split_row: i32,
    rng: &mut R,
) -> Result<Target, EngineError> {
    let band = exploration_band(head, grid.width(), grid.height(), split_row);
    let candidates: Vec<Coord> = grid
        .walkable_cells()
        .filter(|c| c != head && band.contains(c))
        .collect();

    if let Some(cell) = candidates.choose(rng) {
        return Ok(Target { cell: *cell, kind: TargetKind::Explore });
    }

    debug!("Exploration band {:?} saturated, using nearest walkable cell", band);
    if let Some(cell) = nearest_walkable(grid, head) {
        return Ok(Target { cell, kind: TargetKind::Nearest });
    }

    if grid.is_walkable(head) {
        return Ok(Target { cell: *head, kind: TargetKind::Stay });
    }

    Err(EngineError::NoWalkableCell)
}

/// Closest walkable cell other than `head`, row-major order breaks ties
pub fn nearest_walkable(grid: &Grid, head: &Coord) -> Option<Coord> {
    grid.walkable_cells()
        .filter(|c| c != head)
        .min_by_key(|c| c.manhattan(head))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ReopenPolicy};
    use crate::types::{Battlesnake, Board, Game};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state(width: i32, height: i32, body: &[(i32, i32)], health: i32, food: &[(i32, i32)]) -> GameState {
        let body: Vec<Coord> = body.iter().map(|&(x, y)| Coord::new(x, y)).collect();
        let you = Battlesnake {
            id: "you".to_string(),
            name: "you".to_string(),
            health,
            head: body[0],
            length: body.len() as i32,
            body,
            latency: String::new(),
            shout: None,
        };
        GameState {
            game: Game::default(),
            turn: 3,
            board: Board {
                width,
                height,
                food: food.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
                snakes: vec![you.clone()],
                hazards: vec![],
            },
            you,
        }
    }

    fn targeting() -> TargetingConfig {
        Config::default_hardcoded().targeting
    }

    #[test]
    fn test_hungry_snake_targets_nearest_food() {
        let s = state(11, 11, &[(5, 5), (5, 4), (5, 3)], 50, &[(10, 10), (6, 7), (0, 0), (5, 8)]);
        let grid = Grid::from_state(&s, ReopenPolicy::Tail);
        let mut rng = StdRng::seed_from_u64(0);

        let target = select_target(&s, &grid, &targeting(), &mut rng).unwrap();
        // (6,7) and (5,8) are both 3 away; the earlier listed one wins
        assert_eq!(target, Target { cell: Coord::new(6, 7), kind: TargetKind::Food });
    }

    #[test]
    fn test_last_listed_policy_reproduces_deployed_behavior() {
        let food = [Coord::new(6, 7), Coord::new(0, 0), Coord::new(10, 10)];
        let grid = Grid::new(11, 11);
        let head = Coord::new(5, 5);
        assert_eq!(
            pick_food(&food, &head, &grid, FoodPolicy::LastListed),
            Some(Coord::new(10, 10))
        );
        assert_eq!(
            pick_food(&food, &head, &grid, FoodPolicy::Nearest),
            Some(Coord::new(6, 7))
        );
    }

    #[test]
    fn test_healthy_snake_explores_inside_band() {
        let s = state(11, 11, &[(2, 1), (2, 0), (1, 0)], 95, &[(3, 1)]);
        let grid = Grid::from_state(&s, ReopenPolicy::Tail);
        let band = exploration_band(&Coord::new(2, 1), 11, 11, 5);
        assert_eq!(band, Band { x: (0, 9), y: (5, 9) });

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let target = select_target(&s, &grid, &targeting(), &mut rng).unwrap();
            assert_eq!(target.kind, TargetKind::Explore);
            assert!(band.contains(&target.cell));
            assert!(grid.is_walkable(&target.cell));
        }
    }

    #[test]
    fn test_upper_head_explores_lower_band() {
        let band = exploration_band(&Coord::new(4, 8), 11, 11, 5);
        assert_eq!(band, Band { x: (0, 9), y: (0, 5) });
    }

    #[test]
    fn test_band_is_clipped_on_small_boards() {
        let band = exploration_band(&Coord::new(0, 0), 3, 3, 5);
        assert!(band.is_empty());
        let band = exploration_band(&Coord::new(0, 2), 7, 3, 1);
        assert_eq!(band, Band { x: (0, 1), y: (0, 2) });
    }

    #[test]
    fn test_saturated_band_falls_back_to_nearest_cell() {
        // 3x3 board: band is empty, only nearest-cell fallback can answer
        let s = state(3, 3, &[(0, 0), (0, 1), (0, 2)], 100, &[]);
        let grid = Grid::from_state(&s, ReopenPolicy::Tail);
        let mut rng = StdRng::seed_from_u64(9);

        let target = select_target(&s, &grid, &targeting(), &mut rng).unwrap();
        assert_eq!(target, Target { cell: Coord::new(1, 0), kind: TargetKind::Nearest });
    }

    #[test]
    fn test_full_board_reports_no_walkable_cell() {
        let s = state(2, 1, &[(0, 0), (1, 0), (1, 0)], 100, &[]);
        let grid = Grid::from_state(&s, ReopenPolicy::Tail);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            select_target(&s, &grid, &targeting(), &mut rng),
            Err(EngineError::NoWalkableCell)
        );
    }

    #[test]
    fn test_head_only_walkable_cell_stays() {
        let s = state(2, 1, &[(0, 0), (1, 0), (1, 0)], 100, &[]);
        let grid = Grid::from_state(&s, ReopenPolicy::Head);
        let mut rng = StdRng::seed_from_u64(0);
        let target = select_target(&s, &grid, &targeting(), &mut rng).unwrap();
        assert_eq!(target, Target { cell: Coord::new(0, 0), kind: TargetKind::Stay });
    }

    #[test]
    fn test_same_seed_same_target() {
        let s = state(11, 11, &[(5, 5), (5, 4), (5, 3)], 100, &[]);
        let grid = Grid::from_state(&s, ReopenPolicy::Tail);
        let a = select_target(&s, &grid, &targeting(), &mut StdRng::seed_from_u64(77)).unwrap();
        let b = select_target(&s, &grid, &targeting(), &mut StdRng::seed_from_u64(77)).unwrap();
        assert_eq!(a, b);
    }
}
