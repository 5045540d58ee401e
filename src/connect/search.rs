//! Depth-bounded minimax with alpha-beta pruning
//!
//! Two mutually recursive roles share one terminal contract: cutoff depth,
//! no free columns, or a decided outcome all hand the position to the
//! static evaluator. Decided outcomes dominate through [`evaluate`]'s
//! `±WIN_SCORE` constants, so a win found inside the horizon is never
//! traded for a heuristic score.

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

use super::{
    board::{Board, Outcome, Seat},
    threats::evaluate,
};

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Alpha-beta search agent for the connect-N board game.
#[derive(Debug)]
pub struct AlphaBetaAgent {
    max_depth: usize,
    rng: StdRng,
    nodes: u64,
}

impl AlphaBetaAgent {
    /// Create an agent searching `max_depth` plies deep.
    pub fn new(max_depth: usize) -> crate::Result<Self> {
        if max_depth == 0 {
            return Err(crate::Error::ZeroSearchDepth);
        }
        Ok(AlphaBetaAgent {
            max_depth,
            rng: build_rng(None),
            nodes: 0,
        })
    }

    /// Seed the fallback move selection for reproducible games.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = build_rng(Some(seed));
        self
    }

    /// Nodes expanded by the most recent [`choose_column`] call.
    ///
    /// [`choose_column`]: AlphaBetaAgent::choose_column
    pub fn nodes_expanded(&self) -> u64 {
        self.nodes
    }

    /// Pick a column for the side to move.
    ///
    /// Every free column is scored by the opponent's minimizing search with
    /// an unbounded window; a strictly greater score takes the move and
    /// ties keep the first column seen. When no column improves on −∞ (the
    /// search sees every line as lost) the agent picks uniformly at random
    /// among the free columns — exhausted search, not an error. Only a full
    /// board is an error.
    pub fn choose_column(&mut self, board: &Board) -> crate::Result<usize> {
        self.nodes = 0;
        let seat = board.to_move();
        let free = board.free_columns();
        if free.is_empty() {
            return Err(crate::Error::NoLegalMoves);
        }

        let mut best: Option<usize> = None;
        let mut best_score = f64::NEG_INFINITY;
        for &column in &free {
            let child = board.drop_token(column)?;
            let score = self.min_value(
                &child,
                f64::NEG_INFINITY,
                f64::INFINITY,
                self.max_depth - 1,
                seat,
            );
            if score > best_score {
                best_score = score;
                best = Some(column);
            }
        }

        match best {
            Some(column) => Ok(column),
            None => free
                .choose(&mut self.rng)
                .copied()
                .ok_or(crate::Error::NoLegalMoves),
        }
    }

    fn terminal(board: &Board, depth: usize) -> bool {
        depth == 0 || board.free_columns().is_empty() || board.outcome() != Outcome::Undecided
    }

    fn max_value(&mut self, board: &Board, mut alpha: f64, beta: f64, depth: usize, seat: Seat) -> f64 {
        self.nodes += 1;
        if Self::terminal(board, depth) {
            return evaluate(board, seat);
        }
        let mut v = f64::NEG_INFINITY;
        for column in board.free_columns() {
            let child = board
                .drop_token(column)
                .expect("free column enumeration should not fail");
            v = v.max(self.min_value(&child, alpha, beta, depth - 1, seat));
            if v >= beta {
                return v;
            }
            alpha = alpha.max(v);
        }
        v
    }

    fn min_value(&mut self, board: &Board, alpha: f64, mut beta: f64, depth: usize, seat: Seat) -> f64 {
        self.nodes += 1;
        if Self::terminal(board, depth) {
            return evaluate(board, seat);
        }
        let mut v = f64::INFINITY;
        for column in board.free_columns() {
            let child = board
                .drop_token(column)
                .expect("free column enumeration should not fail");
            v = v.min(self.max_value(&child, alpha, beta, depth - 1, seat));
            if v <= alpha {
                return v;
            }
            beta = beta.min(v);
        }
        v
    }
}

/// Unpruned reference search with the same terminal contract and tie-break
/// as [`AlphaBetaAgent`].
///
/// Returns `None` when no column improves on −∞ or no column is free; the
/// pruned agent answers those positions with its random fallback, so there
/// is no single action to agree on. Exists so the pruning can be validated
/// against exhaustive search.
pub fn full_minimax_choice(board: &Board, max_depth: usize) -> Option<usize> {
    let seat = board.to_move();
    let mut best: Option<usize> = None;
    let mut best_score = f64::NEG_INFINITY;
    for column in board.free_columns() {
        let child = board.drop_token(column).ok()?;
        let score = plain_value(&child, max_depth - 1, seat, false);
        if score > best_score {
            best_score = score;
            best = Some(column);
        }
    }
    best
}

fn plain_value(board: &Board, depth: usize, seat: Seat, maximizing: bool) -> f64 {
    if AlphaBetaAgent::terminal(board, depth) {
        return evaluate(board, seat);
    }
    let mut v = if maximizing {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    };
    for column in board.free_columns() {
        let child = board
            .drop_token(column)
            .expect("free column enumeration should not fail");
        let child_value = plain_value(&child, depth - 1, seat, !maximizing);
        v = if maximizing {
            v.max(child_value)
        } else {
            v.min(child_value)
        };
    }
    v
}
