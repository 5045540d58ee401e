//! Informed path search (A*) over the grid's 8-neighborhoods
//!
//! The frontier is keyed by `g + h` with a straight-line heuristic. The
//! terrain cost model deliberately returns sentinel costs far above any
//! real per-step cost for cells worth avoiding; those break the strict
//! admissibility bound, so terrain paths are comparative ("this route is
//! much worse than that one") rather than provably shortest. Unit-cost
//! paths keep the optimality guarantee.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use super::world::{Coord, GridWorld};

/// Cost assigned to cells that should be avoided at (almost) all costs:
/// live or imminent blasts, monsters, planted bombs. Finite on purpose —
/// routes through them stay comparable, they never poison the search.
pub const HAZARD_COST: f64 = 999_999.0;

/// Straight-line distance between two cells.
pub fn euclidean(a: Coord, b: Coord) -> f64 {
    let dx = (a.0 - b.0) as f64;
    let dy = (a.1 - b.1) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Chessboard distance between two cells.
pub fn chebyshev(a: Coord, b: Coord) -> i32 {
    (a.0 - b.0).abs().max((a.1 - b.1).abs())
}

/// Per-cell traversal cost fed to the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostModel {
    /// Every step costs 1: fewest-step paths.
    Steps,
    /// Weighted steps: hazards carry [`HAZARD_COST`], board-edge columns
    /// cost 3, the outer quarter bands cost 2, the interior costs 1.
    Terrain,
}

/// The 8 cells surrounding `(x, y)` that are in bounds and not walls,
/// in fixed scan order. Wall cells are never offered as steps.
pub fn neighbors(world: &GridWorld, (x, y): Coord) -> Vec<Coord> {
    let mut cells = Vec::with_capacity(8);
    for dx in -1..=1 {
        for dy in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let (nx, ny) = (x + dx, y + dy);
            if world.in_bounds(nx, ny) && !world.wall_at(nx, ny) {
                cells.push((nx, ny));
            }
        }
    }
    cells
}

fn terrain_cost(world: &GridWorld, lookahead: &GridWorld, (x, y): Coord) -> f64 {
    let hazardous = world.blast_at(x, y).is_some()
        || lookahead.blast_at(x, y).is_some()
        || world.monster_at(x, y).is_some()
        || world.bomb_at(x, y).is_some();
    if hazardous {
        return HAZARD_COST;
    }

    let width = world.width() as f64;
    if x == 0 || x == world.width() as i32 - 1 {
        return 3.0;
    }
    let half = width / 2.0;
    let quarter = half / 2.0;
    if (x as f64) <= half - quarter || (x as f64) >= half + quarter {
        2.0
    } else {
        1.0
    }
}

/// Frontier entry ordered for a min-heap: lowest priority first, ties by
/// insertion order (first inserted wins).
#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    priority: f64,
    seq: u64,
    cell: Coord,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the greatest entry, so invert both keys.
        other
            .priority
            .total_cmp(&self.priority)
            .then(other.seq.cmp(&self.seq))
    }
}

/// Least-cost path from `start` to `goal`, exclusive of `start`.
///
/// Returns the empty sequence when `goal` is unreachable; callers treat
/// that as "no route", never as a failure.
pub fn path(world: &GridWorld, start: Coord, goal: Coord, model: CostModel) -> Vec<Coord> {
    if start == goal {
        return Vec::new();
    }

    // Hazard costs consider the world one tick ahead as well, so cells a
    // ticking bomb is about to cover already read as hazardous. `None`
    // means uniform unit steps.
    let lookahead = match model {
        CostModel::Terrain => Some(world.step().0),
        CostModel::Steps => None,
    };

    let mut frontier = BinaryHeap::new();
    let mut came_from: HashMap<Coord, Coord> = HashMap::new();
    let mut cost_so_far: HashMap<Coord, f64> = HashMap::new();
    let mut seq = 0u64;

    frontier.push(FrontierEntry {
        priority: 0.0,
        seq,
        cell: start,
    });
    cost_so_far.insert(start, 0.0);

    while let Some(entry) = frontier.pop() {
        let current = entry.cell;
        if current == goal {
            return reconstruct(&came_from, start, goal);
        }

        for next in neighbors(world, current) {
            let step_cost = match &lookahead {
                Some(ahead) => terrain_cost(world, ahead, next),
                None => 1.0,
            };
            let new_cost = cost_so_far[&current] + step_cost;
            let improved = cost_so_far
                .get(&next)
                .is_none_or(|&known| new_cost < known);
            if improved {
                cost_so_far.insert(next, new_cost);
                seq += 1;
                frontier.push(FrontierEntry {
                    priority: new_cost + euclidean(next, goal),
                    seq,
                    cell: next,
                });
                came_from.insert(next, current);
            }
        }
    }

    Vec::new()
}

fn reconstruct(came_from: &HashMap<Coord, Coord>, start: Coord, goal: Coord) -> Vec<Coord> {
    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        path.push(current);
        current = came_from[&current];
    }
    path.reverse();
    path
}
