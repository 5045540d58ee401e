//! Online weight adaptation for the learned grid evaluator
//!
//! Linear function approximation with a temporal-difference correction:
//! after each real move the agent compares its estimate `Q(s,a)` against
//! `reward + γ·Q(s',a')` and nudges every weight along its feature value.
//! The weight vector is the only state that outlives a decision; it is
//! persisted to a flat text snapshot after every real update.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};

use super::{
    features::{Feature, feature_values, in_blast_zone},
    pathfinding::euclidean,
    world::{Coord, Event, GridMove, GridWorld},
};

/// Learning rate α of the update rule.
pub const LEARNING_RATE: f64 = 0.2;

/// Discount factor γ of the update rule.
pub const DISCOUNT: f64 = 0.9;

/// Reward for a transition that kills the character.
pub const DEATH_REWARD: f64 = -1000.0;

/// Time-pressure cost charged on every surviving, non-terminal step.
pub const STEP_REWARD: f64 = -1.0;

/// Ordered weights, co-indexed with [`Feature::ALL`].
///
/// The length invariant is enforced at every construction site; a
/// mismatched snapshot is a configuration error that fails before any
/// search runs, never mid-decision.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightVector(Vec<f64>);

impl WeightVector {
    /// One weight per feature, all moves judged by exit proximity alone
    /// until learning reshapes them.
    pub fn defaults() -> Self {
        WeightVector(vec![1.0, -1.0, 0.0])
    }

    pub fn from_values(values: Vec<f64>) -> crate::Result<Self> {
        if values.len() != Feature::ALL.len() {
            return Err(crate::Error::WeightCountMismatch {
                expected: Feature::ALL.len(),
                got: values.len(),
            });
        }
        Ok(WeightVector(values))
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn dot(&self, features: &[f64]) -> f64 {
        self.0.iter().zip(features).map(|(w, f)| w * f).sum()
    }

    /// Load a snapshot: one decimal number per line.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| crate::Error::io(format!("read weights from {}", path.display()), e))?;
        let mut values = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let value: f64 = trimmed
                .parse()
                .map_err(|_| crate::Error::MalformedWeight {
                    line: index + 1,
                    text: trimmed.to_string(),
                })?;
            values.push(value);
        }
        Self::from_values(values)
    }

    /// Write the snapshot: one decimal number per line.
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let mut text = String::new();
        for value in &self.0 {
            text.push_str(&format!("{value}\n"));
        }
        fs::write(path, text)
            .map_err(|e| crate::Error::io(format!("write weights to {}", path.display()), e))
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Greedy learning agent over the linear evaluator.
///
/// Exclusively owns its weight vector; two agents never share one.
#[derive(Debug)]
pub struct TdAgent {
    weights: WeightVector,
    epsilon: f64,
    rng: StdRng,
    snapshot_path: Option<PathBuf>,
    awaiting_blast: bool,
    last_delta: Option<f64>,
}

impl TdAgent {
    pub fn new(weights: WeightVector, epsilon: f64) -> Self {
        TdAgent {
            weights,
            epsilon,
            rng: build_rng(None),
            snapshot_path: None,
            awaiting_blast: false,
            last_delta: None,
        }
    }

    /// Seed the exploration RNG for reproducible episodes.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = build_rng(Some(seed));
        self
    }

    /// Persist the weight vector to `path` after every real update.
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    /// TD error of the most recent [`act`] call, for convergence checks.
    ///
    /// [`act`]: TdAgent::act
    pub fn last_delta(&self) -> Option<f64> {
        self.last_delta
    }

    /// Greedy scan over the 9 candidate cells (stay included) that are
    /// outside every bomb's imminent blast. Wall cells stay in the
    /// candidate set: heading into one is how the bomb policy learns to
    /// clear it. Returns the displacement, the target cell, and its Q.
    fn best(&self, world: &GridWorld) -> Option<((i32, i32), Coord, f64)> {
        let character = world.character()?;
        let mut best: Option<((i32, i32), Coord, f64)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let cell = (character.x + dx, character.y + dy);
                if !world.in_bounds(cell.0, cell.1) || in_blast_zone(world, cell) {
                    continue;
                }
                let q = self.weights.dot(&feature_values(world, cell));
                if best.is_none_or(|(_, _, best_q)| q > best_q) {
                    best = Some(((dx, dy), cell, q));
                }
            }
        }
        best
    }

    /// Predicted successor world: the chosen displacement for the
    /// character plus each monster's most likely move.
    fn predicted_next(&self, world: &GridWorld, (dx, dy): (i32, i32)) -> GridWorld {
        let mut next = world.clone();
        let _ = next.queue_character_move(dx, dy, false);
        for index in 0..next.monsters().len() {
            let monster = next.monsters()[index];
            let moves = monster.policy.possible_moves(world, (monster.x, monster.y));
            if let [(only, _)] = moves.as_slice() {
                let _ = next.queue_monster_move(index, only.0, only.1);
            }
        }
        next
    }

    /// Choose the real move for this turn and apply the TD correction.
    ///
    /// The update runs on the greedy choice even when exploration then
    /// overrides the returned displacement, and the snapshot is written
    /// before the move is handed back — weights never lag the decision
    /// they came from.
    pub fn act(&mut self, world: &GridWorld) -> crate::Result<GridMove> {
        if world.character().is_none() {
            return Ok(GridMove::stay());
        }
        let Some((displacement, target, q_sa)) = self.best(world) else {
            return Ok(GridMove::stay());
        };

        let place_bomb = self.bomb_policy(world, target);

        // One-step lookahead for Q(s',a') and the reward signal.
        let (next_world, events) = self.predicted_next(world, displacement).step();
        let q_next = if next_world.character().is_none() {
            0.0
        } else {
            self.best(&next_world).map(|(_, _, q)| q).unwrap_or(0.0)
        };
        let reward = transition_reward(&next_world, &events);

        let delta = reward + DISCOUNT * q_next - q_sa;
        self.last_delta = Some(delta);

        let target_features = feature_values(world, target);
        for (weight, feature) in self.weights.0.iter_mut().zip(&target_features) {
            *weight += LEARNING_RATE * delta * feature;
        }

        if let Some(path) = &self.snapshot_path {
            self.weights.save(path)?;
        }

        self.settle_bomb_wait(world);

        // ε-greedy exploration replaces the displacement, not the update.
        let (dx, dy) = if self.rng.random::<f64>() < self.epsilon {
            const DISPLACEMENTS: [(i32, i32); 9] = [
                (-1, -1),
                (-1, 0),
                (-1, 1),
                (0, -1),
                (0, 0),
                (0, 1),
                (1, -1),
                (1, 0),
                (1, 1),
            ];
            *DISPLACEMENTS
                .choose(&mut self.rng)
                .expect("displacement table is non-empty")
        } else {
            displacement
        };

        Ok(GridMove { dx, dy, place_bomb })
    }

    /// Drop a bomb when the greedy target is a wall, or when greedy play
    /// has stopped making progress toward the exit, but never while an
    /// earlier bomb is still pending.
    fn bomb_policy(&mut self, world: &GridWorld, target: Coord) -> bool {
        if self.awaiting_blast {
            return false;
        }
        if world.wall_at(target.0, target.1) {
            self.awaiting_blast = true;
            return true;
        }
        if let (Some(exit), Some(character)) = (world.exit_position(), world.character()) {
            let here = (character.x, character.y);
            if euclidean(target, exit) >= euclidean(here, exit) {
                self.awaiting_blast = true;
                return true;
            }
        }
        false
    }

    /// Clear the pending-bomb latch once the planted bomb has gone off.
    fn settle_bomb_wait(&mut self, world: &GridWorld) {
        if !self.awaiting_blast {
            return;
        }
        let (peek, _) = world.step();
        if peek.bombs().is_empty() && !peek.blasts().is_empty() {
            self.awaiting_blast = false;
        }
    }
}

/// Reward of one real transition, read off the successor state and its
/// event set.
fn transition_reward(next_world: &GridWorld, events: &std::collections::HashSet<Event>) -> f64 {
    let mut reward = if next_world.character().is_some() {
        STEP_REWARD
    } else {
        0.0
    };
    if events.contains(&Event::BlastHitCharacter)
        || events.contains(&Event::CharacterKilledByMonster)
    {
        reward += DEATH_REWARD;
    } else if events.contains(&Event::CharacterReachedExit) {
        reward += 2.0 * next_world.time_left() as f64;
    }
    reward
}
