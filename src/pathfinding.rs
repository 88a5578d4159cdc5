// Shortest 4-directional paths over the traversability grid
//
// Neighbors are always expanded up, down, left, right so equal-length paths
// resolve the same way on every run.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use crate::grid::{CellClass, Grid};
use crate::types::{Coord, Direction};

/// Finds a shortest path with uniform step cost (breadth-first search)
///
/// The start cell is accepted as the origin even when it is blocked (our own
/// head usually is). Returns `[start]` when `start == target` and an empty path
/// when the target is unreachable, off the board or blocked.
pub fn find_path(grid: &Grid, start: Coord, target: Coord) -> Vec<Coord> {
    if !grid.contains(&start) || !grid.contains(&target) {
        return Vec::new();
    }
    if start == target {
        return vec![start];
    }
    if !grid.is_walkable(&target) {
        return Vec::new();
    }

    let mut came_from: Vec<Option<Coord>> = vec![None; area(grid)];
    let mut visited = vec![false; area(grid)];
    let mut queue = VecDeque::new();

    visited[slot(grid, &start)] = true;
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if current == target {
            return rebuild(&came_from, grid, start, target);
        }

        for dir in Direction::all() {
            let next = dir.apply(&current);
            if !grid.is_walkable(&next) {
                continue;
            }
            let idx = slot(grid, &next);
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            came_from[idx] = Some(current);
            queue.push_back(next);
        }
    }

    Vec::new()
}

/// Finds a cheapest path where entering a hazard costs `1 + hazard_cost`
///
/// With `hazard_cost == 0` this produces the same path as [`find_path`].
pub fn find_weighted_path(grid: &Grid, start: Coord, target: Coord, hazard_cost: u32) -> Vec<Coord> {
    if hazard_cost == 0 {
        return find_path(grid, start, target);
    }
    if !grid.contains(&start) || !grid.contains(&target) {
        return Vec::new();
    }
    if start == target {
        return vec![start];
    }
    if !grid.is_walkable(&target) {
        return Vec::new();
    }

    let mut dist = vec![u32::MAX; area(grid)];
    let mut came_from: Vec<Option<Coord>> = vec![None; area(grid)];
    // Insertion counter keeps equal-cost entries in FIFO order
    let mut seq: u64 = 0;
    let mut heap = BinaryHeap::new();

    dist[slot(grid, &start)] = 0;
    heap.push(Reverse((0u32, seq, start)));

    while let Some(Reverse((cost, _, current))) = heap.pop() {
        if current == target {
            return rebuild(&came_from, grid, start, target);
        }
        if cost > dist[slot(grid, &current)] {
            continue;
        }

        for dir in Direction::all() {
            let next = dir.apply(&current);
            let step = match grid.get(&next) {
                Some(CellClass::Hazard) => 1 + hazard_cost,
                Some(class) if class.is_walkable() => 1,
                _ => continue,
            };
            let candidate = cost.saturating_add(step);
            let idx = slot(grid, &next);
            if candidate < dist[idx] {
                dist[idx] = candidate;
                came_from[idx] = Some(current);
                seq += 1;
                heap.push(Reverse((candidate, seq, next)));
            }
        }
    }

    Vec::new()
}

/// True when every consecutive pair is 4-adjacent and every cell after the
/// origin is walkable
pub fn is_valid_path(grid: &Grid, path: &[Coord]) -> bool {
    path.iter().skip(1).all(|c| grid.is_walkable(c))
        && path.windows(2).all(|w| w[0].manhattan(&w[1]) == 1)
}

fn area(grid: &Grid) -> usize {
    (grid.width().max(0) as usize) * (grid.height().max(0) as usize)
}

fn slot(grid: &Grid, coord: &Coord) -> usize {
    (coord.y * grid.width() + coord.x) as usize
}

fn rebuild(came_from: &[Option<Coord>], grid: &Grid, start: Coord, target: Coord) -> Vec<Coord> {
    let mut path = vec![target];
    let mut current = target;
    while current != start {
        match came_from[slot(grid, &current)] {
            Some(prev) => {
                path.push(prev);
                current = prev;
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}
