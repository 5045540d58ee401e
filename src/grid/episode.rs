//! Episode orchestration for the grid game
//!
//! Drives one decision loop: the agent picks a move, every monster samples
//! one from its policy distribution, the world steps, and the loop ends on
//! death, escape, or an exhausted time budget.

use rand::{Rng, rngs::StdRng};
use serde::Serialize;

use super::{
    expectimax::ExpectimaxAgent,
    learning::TdAgent,
    monster::monster_moves,
    world::{Event, GridMove, GridWorld},
};

/// Anything that can pick a move for the character each turn.
pub trait GridAgent {
    fn choose(&mut self, world: &GridWorld) -> crate::Result<GridMove>;

    fn name(&self) -> &str;
}

impl GridAgent for ExpectimaxAgent {
    fn choose(&mut self, world: &GridWorld) -> crate::Result<GridMove> {
        Ok(self.choose_move(world))
    }

    fn name(&self) -> &str {
        "Expectimax"
    }
}

impl GridAgent for TdAgent {
    fn choose(&mut self, world: &GridWorld) -> crate::Result<GridMove> {
        self.act(world)
    }

    fn name(&self) -> &str {
        "TD"
    }
}

/// How an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOutcome {
    ReachedExit,
    Died,
    TimedOut,
}

/// Summary of one finished episode
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeReport {
    pub outcome: EpisodeOutcome,
    pub steps: usize,
    pub time_left: i32,
    pub walls_destroyed: usize,
}

/// Sample one displacement from a policy distribution.
fn sample_move(moves: &[((i32, i32), f64)], rng: &mut StdRng) -> (i32, i32) {
    let total: f64 = moves.iter().map(|(_, p)| p).sum();
    let mut threshold = rng.random::<f64>() * total;
    for &(mv, p) in moves {
        if threshold < p {
            return mv;
        }
        threshold -= p;
    }
    moves.last().map(|&(mv, _)| mv).unwrap_or((0, 0))
}

/// Run one episode to completion.
pub fn run_episode(
    mut world: GridWorld,
    agent: &mut dyn GridAgent,
    rng: &mut StdRng,
) -> crate::Result<EpisodeReport> {
    let mut steps = 0;
    let mut walls_destroyed = 0;

    loop {
        if world.character().is_none() {
            return Ok(EpisodeReport {
                outcome: EpisodeOutcome::Died,
                steps,
                time_left: world.time_left(),
                walls_destroyed,
            });
        }
        if world.time_left() <= 0 {
            return Ok(EpisodeReport {
                outcome: EpisodeOutcome::TimedOut,
                steps,
                time_left: 0,
                walls_destroyed,
            });
        }

        let chosen = agent.choose(&world)?;
        world.queue_character_move(chosen.dx, chosen.dy, chosen.place_bomb)?;
        for index in 0..world.monsters().len() {
            let monster = world.monsters()[index];
            let moves = monster_moves(&world, &monster);
            let (dx, dy) = sample_move(&moves, rng);
            world.queue_monster_move(index, dx, dy)?;
        }

        let (next, events) = world.step();
        steps += 1;
        if events.contains(&Event::BlastHitWall) {
            walls_destroyed += 1;
        }

        if events.contains(&Event::CharacterReachedExit) {
            return Ok(EpisodeReport {
                outcome: EpisodeOutcome::ReachedExit,
                steps,
                time_left: next.time_left(),
                walls_destroyed,
            });
        }
        if events.contains(&Event::BlastHitCharacter)
            || events.contains(&Event::CharacterKilledByMonster)
        {
            return Ok(EpisodeReport {
                outcome: EpisodeOutcome::Died,
                steps,
                time_left: next.time_left(),
                walls_destroyed,
            });
        }

        world = next;
    }
}
