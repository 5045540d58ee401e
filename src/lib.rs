//! Depth-bounded adversarial decision making
//!
//! This crate provides:
//! - Connect-N board game with alpha-beta minimax search and a threat-counting evaluator
//! - Grid escape game with expectimax search against modeled stochastic monsters
//! - Informed path search (A*) with pluggable per-cell cost models
//! - Online temporal-difference adaptation of a linear heuristic evaluator

pub mod cli;
pub mod connect;
pub mod error;
pub mod grid;

pub use error::{Error, Result};
