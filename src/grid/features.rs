//! Static evaluation for the grid game
//!
//! Two evaluators live here. [`cutoff_score`] is the hand-tuned tier table
//! the expectimax search calls at its depth limit. [`Feature`] is the
//! closed set of learned-evaluator inputs; each maps a candidate cell to a
//! signal in roughly the 0..1 range via an inverse power of distance, so
//! being very close dominates being very far.

use serde::{Deserialize, Serialize};

use super::{
    pathfinding::{self, CostModel},
    world::{Coord, GridWorld},
};

/// Hand-tuned cutoff evaluation used by the expectimax search.
///
/// `origin` is the character's cell at decision time; progress toward the
/// exit is measured against it. Monster-distance tiers and goal-progress
/// tiers are additive between the groups, and the final `closer > 0`
/// bonus applies unconditionally.
pub fn cutoff_score(world: &GridWorld, origin: Coord) -> f64 {
    let Some(character) = world.character() else {
        return 0.0;
    };
    let here = (character.x, character.y);

    let mut monster_util = 0.0;
    let mut exit_util = 0.0;

    let spaces_closer = match world.exit_position() {
        Some(exit) => {
            let current = pathfinding::path(world, here, exit, CostModel::Steps).len() as i32;
            let initial = pathfinding::path(world, origin, exit, CostModel::Steps).len() as i32;
            initial - current
        }
        None => 0,
    };

    if let Some(monster) = world.nearest_monster(here.0, here.1) {
        let monster_distance =
            pathfinding::path(world, here, (monster.x, monster.y), CostModel::Steps).len() as i32;

        if monster_distance > 4 {
            monster_util += 100.0;
            if spaces_closer > 3 {
                exit_util += 100.0;
            } else if spaces_closer > 2 {
                exit_util += 25.0;
            } else if spaces_closer > 0 {
                exit_util += 10.0;
            }
        } else if monster_distance > 3 {
            monster_util += 50.0;
            if spaces_closer > 3 {
                exit_util += 50.0;
            } else if spaces_closer > 2 {
                exit_util += 10.0;
            } else if spaces_closer > 0 {
                exit_util += 5.0;
            }
        } else if monster_distance < 3 {
            monster_util -= 1000.0;
        }
    }

    if spaces_closer > 0 {
        exit_util += 10.0;
    }

    monster_util + exit_util
}

/// A learned-evaluator input, co-indexed with the weight vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// `1/d²` of the fewest-step path to the exit; 1.0 on the exit itself.
    ExitProximity,
    /// `1/d⁴` of the weighted path to the nearest monster; 0 without one.
    MonsterProximity,
    /// `1/d⁴` to the nearest wall straight below in the same column; the
    /// bottom edge counts as a wall but scores 0.
    WallBelowProximity,
}

impl Feature {
    /// Every feature, in weight-vector order. The order is part of the
    /// snapshot format and must not change between runs.
    pub const ALL: [Feature; 3] = [
        Feature::ExitProximity,
        Feature::MonsterProximity,
        Feature::WallBelowProximity,
    ];

    /// Evaluate this feature for a candidate cell.
    pub fn value(self, world: &GridWorld, cell: Coord) -> f64 {
        match self {
            Feature::ExitProximity => exit_proximity(world, cell),
            Feature::MonsterProximity => monster_proximity(world, cell),
            Feature::WallBelowProximity => wall_below_proximity(world, cell),
        }
    }
}

/// Evaluate every feature for a candidate cell, in [`Feature::ALL`] order.
pub fn feature_values(world: &GridWorld, cell: Coord) -> Vec<f64> {
    Feature::ALL.iter().map(|f| f.value(world, cell)).collect()
}

fn exit_proximity(world: &GridWorld, cell: Coord) -> f64 {
    let Some(exit) = world.exit_position() else {
        return 0.0;
    };
    let distance = 1 + pathfinding::path(world, cell, exit, CostModel::Steps).len();
    1.0 / (distance * distance) as f64
}

fn monster_proximity(world: &GridWorld, cell: Coord) -> f64 {
    let Some(monster) = world.nearest_monster(cell.0, cell.1) else {
        return 0.0;
    };
    let distance =
        1 + pathfinding::path(world, cell, (monster.x, monster.y), CostModel::Terrain).len();
    1.0 / (distance as f64).powi(4)
}

fn wall_below_proximity(world: &GridWorld, (x, y): Coord) -> f64 {
    // A column whose nearest "wall" below is only the bottom edge scores 0.
    let closest = (y..world.height() as i32).find(|&wy| world.wall_at(x, wy));
    match closest {
        Some(wy) if wy == y => 1.0,
        Some(wy) => 1.0 / ((wy - y) as f64).powi(4),
        None => 0.0,
    }
}

/// Whether a cell sits inside an active blast or the cross a planted bomb
/// will cover when it detonates. The greedy learned agent never steps
/// onto such a cell.
pub fn in_blast_zone(world: &GridWorld, (x, y): Coord) -> bool {
    if world.blast_at(x, y).is_some() {
        return true;
    }
    for bomb in world.bombs() {
        if bomb.x == x && bomb.y == y {
            return true;
        }
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            for reach in 1..=super::world::BLAST_RADIUS {
                let (bx, by) = (bomb.x + dx * reach, bomb.y + dy * reach);
                if !world.in_bounds(bx, by) || world.wall_at(bx, by) {
                    break;
                }
                if bx == x && by == y {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::world::Tile;

    fn world_with_exit() -> GridWorld {
        let mut world = GridWorld::new(5, 5, 100);
        world.set_tile(4, 4, Tile::Exit).unwrap();
        world
    }

    #[test]
    fn exit_proximity_is_one_on_the_exit() {
        let world = world_with_exit();
        assert_eq!(Feature::ExitProximity.value(&world, (4, 4)), 1.0);
    }

    #[test]
    fn exit_proximity_decays_with_distance() {
        let world = world_with_exit();
        let near = Feature::ExitProximity.value(&world, (3, 3));
        let far = Feature::ExitProximity.value(&world, (0, 0));
        assert!(near > far, "closer cells must score higher: {near} vs {far}");
        assert_eq!(near, 1.0 / 4.0); // one step away, d = 2
    }

    #[test]
    fn monster_proximity_without_monsters_is_zero() {
        let world = world_with_exit();
        assert_eq!(Feature::MonsterProximity.value(&world, (2, 2)), 0.0);
    }

    #[test]
    fn monster_proximity_spikes_next_to_one() {
        let mut world = world_with_exit();
        world
            .place_monster(2, 2, crate::grid::MonsterPolicy::Pursuit)
            .unwrap();
        let adjacent = Feature::MonsterProximity.value(&world, (1, 1));
        let distant = Feature::MonsterProximity.value(&world, (4, 0));
        assert!(adjacent > distant);
    }

    #[test]
    fn wall_below_ignores_wallless_worlds() {
        let world = world_with_exit();
        assert_eq!(Feature::WallBelowProximity.value(&world, (2, 2)), 0.0);
    }

    #[test]
    fn wall_below_measures_the_column() {
        let mut world = world_with_exit();
        world.set_tile(2, 4, Tile::Wall).unwrap();
        assert_eq!(Feature::WallBelowProximity.value(&world, (2, 4)), 1.0);
        assert_eq!(
            Feature::WallBelowProximity.value(&world, (2, 2)),
            1.0 / 16.0
        );
        // Other columns see no wall below, only the bottom edge
        assert_eq!(Feature::WallBelowProximity.value(&world, (0, 0)), 0.0);
    }

    #[test]
    fn cutoff_score_rewards_progress() {
        let world = {
            let mut w = world_with_exit();
            w.place_character(2, 2).unwrap();
            w
        };
        // origin (0,0): character already two diagonal steps closer
        let progressed = cutoff_score(&world, (0, 0));
        // origin at the character: no progress
        let fresh = cutoff_score(&world, (2, 2));
        assert!(progressed > fresh);
    }

    #[test]
    fn cutoff_score_punishes_close_monsters() {
        let mut world = world_with_exit();
        world.place_character(2, 2).unwrap();
        world
            .place_monster(3, 2, crate::grid::MonsterPolicy::Pursuit)
            .unwrap();
        assert!(cutoff_score(&world, (2, 2)) <= -1000.0);
    }

    #[test]
    fn blast_zone_covers_the_cross() {
        let mut world = world_with_exit();
        world.set_tile(2, 3, Tile::Wall).unwrap();
        world.plant_bomb(2, 2, 5).unwrap();
        assert!(in_blast_zone(&world, (2, 2)));
        assert!(in_blast_zone(&world, (4, 2)));
        assert!(!in_blast_zone(&world, (2, 4)), "the wall shields below");
        assert!(!in_blast_zone(&world, (3, 3)), "diagonals are safe");
    }
}
