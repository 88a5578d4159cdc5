// Board encoding: turns the raw entity lists of a turn into a traversability grid
//
// The grid is rebuilt from scratch for every request and never shared between
// requests, so it carries no identity beyond the turn it was built for.

use serde::Serialize;
use std::fmt;

use crate::config::ReopenPolicy;
use crate::types::{Battlesnake, Coord, GameState};

/// Traversability class of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellClass {
    /// Occupied by a snake body segment
    Blocked,
    Open,
    /// Walkable, may carry an extra path cost
    Hazard,
    /// Walkable, preferred target
    Food,
}

impl CellClass {
    pub fn is_walkable(self) -> bool {
        !matches!(self, CellClass::Blocked)
    }

    fn symbol(self) -> char {
        match self {
            CellClass::Blocked => '#',
            CellClass::Open => '.',
            CellClass::Hazard => '~',
            CellClass::Food => '*',
        }
    }
}

/// Row-major traversability grid, `y = 0` is the bottom row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<CellClass>,
}

impl Grid {
    /// Creates a grid with every cell `Open`
    pub fn new(width: i32, height: i32) -> Self {
        let area = (width.max(0) as usize) * (height.max(0) as usize);
        Grid {
            width,
            height,
            cells: vec![CellClass::Open; area],
        }
    }

    /// Encodes the board for one turn
    ///
    /// Order matters: bodies are blocked first, then one of our own cells is
    /// re-opened according to `reopen`, then hazards, then food. Hazard and food
    /// marking never un-block a body cell.
    ///
    /// All coordinates must already be validated against the board bounds.
    pub fn encode(
        width: i32,
        height: i32,
        snakes: &[Battlesnake],
        you: &Battlesnake,
        hazards: &[Coord],
        food: &[Coord],
        reopen: ReopenPolicy,
    ) -> Self {
        let mut grid = Grid::new(width, height);

        // `you` is normally also listed in `snakes`; blocking it twice is harmless
        for snake in snakes.iter().chain(std::iter::once(you)) {
            for segment in &snake.body {
                grid.set(segment, CellClass::Blocked);
            }
        }

        if let Some(cell) = Self::reopened_cell(you, reopen) {
            grid.set(&cell, CellClass::Open);
        }

        for hazard in hazards {
            if grid.get(hazard).is_some_and(CellClass::is_walkable) {
                grid.set(hazard, CellClass::Hazard);
            }
        }

        for item in food {
            if grid.get(item).is_some_and(CellClass::is_walkable) {
                grid.set(item, CellClass::Food);
            }
        }

        grid
    }

    /// Encodes the board of a full game state
    pub fn from_state(state: &GameState, reopen: ReopenPolicy) -> Self {
        Self::encode(
            state.board.width,
            state.board.height,
            &state.board.snakes,
            &state.you,
            &state.board.hazards,
            &state.board.food,
            reopen,
        )
    }

    /// The single body cell of ours that the encoder makes walkable again, if any
    pub fn reopened_cell(you: &Battlesnake, reopen: ReopenPolicy) -> Option<Coord> {
        match reopen {
            ReopenPolicy::Head => you.body.first().copied(),
            ReopenPolicy::Tail => {
                // The tail only vacates when it is not stacked and is not also the head
                if you.body.len() < 2 || you.is_growing() {
                    return None;
                }
                you.tail()
            }
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, coord: &Coord) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }

    /// Class of a cell, `None` off the board
    pub fn get(&self, coord: &Coord) -> Option<CellClass> {
        self.index(coord).map(|idx| self.cells[idx])
    }

    pub fn is_walkable(&self, coord: &Coord) -> bool {
        self.get(coord).is_some_and(CellClass::is_walkable)
    }

    fn set(&mut self, coord: &Coord, class: CellClass) {
        debug_assert!(self.contains(coord), "{} is outside the grid", coord);
        if let Some(idx) = self.index(coord) {
            self.cells[idx] = class;
        }
    }

    fn index(&self, coord: &Coord) -> Option<usize> {
        if self.contains(coord) {
            Some((coord.y * self.width + coord.x) as usize)
        } else {
            None
        }
    }

    /// All walkable cells in row-major order (bottom row first)
    pub fn walkable_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().enumerate().filter_map(move |(idx, class)| {
            if class.is_walkable() {
                let idx = idx as i32;
                Some(Coord::new(idx % self.width, idx / self.width))
            } else {
                None
            }
        })
    }

    /// Number of cells of the given class
    pub fn count(&self, class: CellClass) -> usize {
        self.cells.iter().filter(|c| **c == class).count()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height).rev() {
            let row: String = (0..self.width)
                .filter_map(|x| self.get(&Coord::new(x, y)))
                .map(CellClass::symbol)
                .collect();
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
