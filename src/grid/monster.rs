//! Opponent behavior models for the grid game
//!
//! Each policy answers one question: given the current world, which moves
//! might this monster make next, and with what probability? The chance
//! layer of the expectimax search consumes the answer directly, and the
//! episode runner samples from it.

use serde::{Deserialize, Serialize};

use super::world::{Coord, GridWorld, Monster};

/// How far a monster spots the character, in chessboard distance.
pub const PURSUIT_DETECTION_RANGE: i32 = 2;

/// A closed set of monster behavior strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonsterPolicy {
    /// Moves uniformly at random over every reachable cell, staying put
    /// included.
    Wander,
    /// Steps straight toward a character in detection range; otherwise
    /// drifts uniformly over the safe adjacent cells.
    Pursuit,
}

impl MonsterPolicy {
    /// How close the character may safely come to a monster running this
    /// policy. Moves inside this radius are filtered out at the root of
    /// the expectimax search.
    pub fn safe_distance(self) -> f64 {
        match self {
            MonsterPolicy::Wander => 2.0,
            MonsterPolicy::Pursuit => 3.0,
        }
    }

    /// Possible displacements for a monster at `from`, with probabilities
    /// summing to 1.
    ///
    /// A unique pursuit step is a single-outcome distribution; every other
    /// case spreads probability uniformly. A cornered monster stays put
    /// with probability 1.
    pub fn possible_moves(self, world: &GridWorld, from: Coord) -> Vec<((i32, i32), f64)> {
        match self {
            MonsterPolicy::Wander => Self::wander_moves(world, from),
            MonsterPolicy::Pursuit => Self::pursuit_moves(world, from),
        }
    }

    fn wander_moves(world: &GridWorld, (x, y): Coord) -> Vec<((i32, i32), f64)> {
        let mut moves = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                let (nx, ny) = (x + dx, y + dy);
                if world.in_bounds(nx, ny) && !world.wall_at(nx, ny) {
                    moves.push((dx, dy));
                }
            }
        }
        uniform(moves)
    }

    fn pursuit_moves(world: &GridWorld, (x, y): Coord) -> Vec<((i32, i32), f64)> {
        // A spotted character pins the move to the unit step toward it.
        if let Some(character) = world.character() {
            let (dx, dy) = (character.x - x, character.y - y);
            if dx.abs().max(dy.abs()) <= PURSUIT_DETECTION_RANGE {
                let step = (dx.clamp(-1, 1), dy.clamp(-1, 1));
                let (nx, ny) = (x + step.0, y + step.1);
                if world.in_bounds(nx, ny) && !world.wall_at(nx, ny) {
                    return vec![(step, 1.0)];
                }
            }
        }

        // Otherwise drift over the safe adjacent cells.
        let mut safe = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (x + dx, y + dy);
                if world.in_bounds(nx, ny)
                    && (world.empty_at(nx, ny) || world.exit_at(nx, ny))
                    && world.blast_at(nx, ny).is_none()
                {
                    safe.push((dx, dy));
                }
            }
        }
        if safe.is_empty() {
            return vec![((0, 0), 1.0)];
        }
        uniform(safe)
    }
}

fn uniform(moves: Vec<(i32, i32)>) -> Vec<((i32, i32), f64)> {
    let p = 1.0 / moves.len() as f64;
    moves.into_iter().map(|m| (m, p)).collect()
}

/// Convenience: the distribution for a monster entity in its world.
pub fn monster_moves(world: &GridWorld, monster: &Monster) -> Vec<((i32, i32), f64)> {
    monster.policy.possible_moves(world, (monster.x, monster.y))
}
