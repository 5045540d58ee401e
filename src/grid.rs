//! Grid escape game: world model, A*, expectimax, and the learning agent

pub mod episode;
pub mod expectimax;
pub mod features;
pub mod learning;
pub mod monster;
pub mod pathfinding;
pub mod world;

pub use episode::{EpisodeOutcome, EpisodeReport, GridAgent, run_episode};
pub use expectimax::{ExpectimaxAgent, LOSS_VALUE, WIN_VALUE};
pub use features::{Feature, cutoff_score, feature_values, in_blast_zone};
pub use learning::{DISCOUNT, LEARNING_RATE, TdAgent, WeightVector};
pub use monster::{MonsterPolicy, monster_moves};
pub use pathfinding::{CostModel, HAZARD_COST, chebyshev, euclidean, neighbors, path};
pub use world::{
    Blast, Bomb, Character, Coord, Event, GridMove, GridWorld, Monster, Tile,
};
