//! Expectimax search against a modeled, stochastic opponent
//!
//! The maximizing role is the character; the chance role is the nearest
//! monster, whose move distribution comes from its [`MonsterPolicy`].
//! Both roles share one terminal contract, checked before anything else:
//! the character being gone from a hypothetical future is a terminal
//! loss, never a panic, regardless of remaining depth.
//!
//! [`MonsterPolicy`]: super::monster::MonsterPolicy

use std::collections::HashSet;

use super::{
    features::cutoff_score,
    monster::monster_moves,
    pathfinding::euclidean,
    world::{Coord, Event, GridMove, GridWorld},
};

/// Terminal value when the character is destroyed (or doomed).
pub const LOSS_VALUE: f64 = -1000.0;

/// Terminal value when the opposition is destroyed or the exit reached.
pub const WIN_VALUE: f64 = 1000.0;

/// Expectimax decision engine for the grid game.
#[derive(Debug, Clone, Copy)]
pub struct ExpectimaxAgent {
    max_depth: usize,
}

impl ExpectimaxAgent {
    pub fn new(max_depth: usize) -> crate::Result<Self> {
        if max_depth == 0 {
            return Err(crate::Error::ZeroSearchDepth);
        }
        Ok(ExpectimaxAgent { max_depth })
    }

    /// Pick a displacement for the character.
    ///
    /// Candidate moves exclude walls, out-of-bounds cells, and cells
    /// inside the nearest monster's safe radius. Ties keep the first
    /// candidate seen; when everything is filtered out (or the character
    /// is already gone) the stay move is returned.
    pub fn choose_move(&self, world: &GridWorld) -> GridMove {
        let Some(character) = world.character() else {
            return GridMove::stay();
        };
        let origin = (character.x, character.y);

        let mut best = GridMove::stay();
        let mut best_score = f64::NEG_INFINITY;

        for (dx, dy) in candidate_moves(world, origin) {
            let mut hypothetical = world.clone();
            if hypothetical.queue_character_move(dx, dy, false).is_err() {
                continue;
            }
            let (next, events) = hypothetical.step();
            let score = self.chance_value(&next, &events, self.max_depth, origin);
            if score > best_score {
                best_score = score;
                best = GridMove::walk(dx, dy);
            }
        }

        best
    }

    fn max_value(
        &self,
        world: &GridWorld,
        events: &HashSet<Event>,
        depth: usize,
        origin: Coord,
    ) -> f64 {
        if let Some(value) = terminal_value(world, events) {
            return value;
        }
        if depth == 0 {
            return cutoff_score(world, origin);
        }
        let here = match world.character() {
            Some(c) => (c.x, c.y),
            None => return LOSS_VALUE,
        };

        let mut v = f64::NEG_INFINITY;
        for (dx, dy) in candidate_moves(world, here) {
            let mut hypothetical = world.clone();
            if hypothetical.queue_character_move(dx, dy, false).is_err() {
                continue;
            }
            let (next, next_events) = hypothetical.step();
            v = v.max(self.chance_value(&next, &next_events, depth - 1, origin));
        }
        v
    }

    fn chance_value(
        &self,
        world: &GridWorld,
        events: &HashSet<Event>,
        depth: usize,
        origin: Coord,
    ) -> f64 {
        if let Some(value) = terminal_value(world, events) {
            return value;
        }
        if depth == 0 {
            return cutoff_score(world, origin);
        }
        let here = match world.character() {
            Some(c) => (c.x, c.y),
            None => return LOSS_VALUE,
        };
        let Some(index) = nearest_monster_index(world, here) else {
            return WIN_VALUE;
        };

        let monster = &world.monsters()[index];
        let moves = monster_moves(world, monster);

        let mut v = 0.0;
        for ((dx, dy), probability) in moves {
            let mut hypothetical = world.clone();
            if hypothetical.queue_monster_move(index, dx, dy).is_err() {
                continue;
            }
            let (next, next_events) = hypothetical.step();
            v += probability * self.max_value(&next, &next_events, depth - 1, origin);
        }
        v
    }
}

/// Shared terminal contract, evaluated before depth is even consulted.
fn terminal_value(world: &GridWorld, events: &HashSet<Event>) -> Option<f64> {
    if events.contains(&Event::CharacterReachedExit) {
        return Some(WIN_VALUE);
    }
    if world.character().is_none()
        || events.contains(&Event::BlastHitCharacter)
        || events.contains(&Event::CharacterKilledByMonster)
    {
        return Some(LOSS_VALUE);
    }
    if events.contains(&Event::BlastHitMonster) || world.monsters().is_empty() {
        return Some(WIN_VALUE);
    }
    None
}

/// The 8 displacements from `from` that stay in bounds, off walls, and
/// outside the nearest monster's safe radius.
fn candidate_moves(world: &GridWorld, from: Coord) -> Vec<(i32, i32)> {
    let nearest = world
        .nearest_monster(from.0, from.1)
        .map(|m| ((m.x, m.y), m.policy.safe_distance()));

    let mut moves = Vec::with_capacity(8);
    for dx in -1..=1 {
        for dy in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let target = (from.0 + dx, from.1 + dy);
            if !world.in_bounds(target.0, target.1) || world.wall_at(target.0, target.1) {
                continue;
            }
            if let Some((monster_cell, safe_distance)) = nearest {
                if euclidean(target, monster_cell) < safe_distance {
                    continue;
                }
            }
            moves.push((dx, dy));
        }
    }
    moves
}

fn nearest_monster_index(world: &GridWorld, (x, y): Coord) -> Option<usize> {
    world
        .monsters()
        .iter()
        .enumerate()
        .min_by_key(|(_, m)| (m.x - x).abs() + (m.y - y).abs())
        .map(|(index, _)| index)
}
