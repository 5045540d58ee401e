//! Threat counting and the static board evaluator
//!
//! A threat is an aligned run one drop away from existing at a given
//! length: dropping the seat's token into some column would leave a run of
//! at least `n` of that seat's pieces anchored at the landed cell. Longer
//! threats outweigh shorter ones categorically through the 10^n weighting.

use super::board::{Board, DIRECTIONS, Outcome, Seat};

/// Score returned for a decided win; a decided loss returns its negation.
/// Dominates any heuristic score.
pub const WIN_SCORE: f64 = 1_000_000.0;

/// Count the runs of length at least `length` owned by `seat` that are
/// anchored at `(x, y)`, one per direction.
fn runs_anchored_at(board: &Board, x: usize, y: usize, length: usize, seat: Seat) -> usize {
    DIRECTIONS
        .iter()
        .filter(|&&(dx, dy)| board.run_at(x, y, dx, dy, length, seat))
        .count()
}

/// Count the new threats of length `length` a seat could create with one
/// drop: for every free column, hypothetically drop the seat's token and
/// count the runs anchored at the landed cell.
pub fn count_new_threats(board: &Board, seat: Seat, length: usize) -> usize {
    let mut threats = 0;
    for column in board.free_columns() {
        let Some(row) = board.landing_row(column) else {
            continue;
        };
        let mut hypothetical = board.clone();
        hypothetical.place_direct(column, row, seat);
        threats += runs_anchored_at(&hypothetical, column, row, length, seat);
    }
    threats
}

/// Static evaluation of `board` from `seat`'s point of view.
///
/// A decided outcome returns exactly `±WIN_SCORE` before any threat
/// counting runs. Otherwise the score is
/// `Σ_n (own_threats(n) − opponent_threats(n)) × 10^n`
/// for `n` from 2 up to the board's win length.
pub fn evaluate(board: &Board, seat: Seat) -> f64 {
    match board.outcome() {
        Outcome::Won(winner) if winner == seat => return WIN_SCORE,
        Outcome::Won(_) => return -WIN_SCORE,
        Outcome::Undecided => {}
    }

    let opponent = seat.opponent();
    let mut score = 0.0;
    for length in 2..=board.win_length() {
        let own = count_new_threats(board, seat, length) as f64;
        let theirs = count_new_threats(board, opponent, length) as f64;
        score += (own - theirs) * 10f64.powi(length as i32);
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_7x6() -> Board {
        Board::new(7, 6, 4).unwrap()
    }

    #[test]
    fn empty_board_evaluates_to_zero() {
        let board = board_7x6();
        assert_eq!(evaluate(&board, Seat::First), 0.0);
        assert_eq!(evaluate(&board, Seat::Second), 0.0);
    }

    #[test]
    fn decided_outcome_dominates() {
        let mut board = board_7x6();
        for x in 0..3 {
            board = board.drop_token(x).unwrap();
            board = board.drop_token(6).unwrap();
        }
        board = board.drop_token(3).unwrap();
        assert_eq!(board.outcome(), Outcome::Won(Seat::First));
        assert_eq!(evaluate(&board, Seat::First), WIN_SCORE);
        assert_eq!(evaluate(&board, Seat::Second), -WIN_SCORE);
    }

    #[test]
    fn pair_counts_as_threats() {
        // One lone token: dropping next to it makes several length-2 runs
        let board = board_7x6().drop_token(3).unwrap();
        let threats = count_new_threats(&board, Seat::First, 2);
        assert!(threats > 0, "adjacent drops should create pairs");
        // No run of 3 is one drop away yet
        assert_eq!(count_new_threats(&board, Seat::First, 3), 0);
    }

    #[test]
    fn longer_threats_dominate_shorter() {
        // First holds a horizontal pair at (2,0)-(3,0); Second holds a
        // single token far away.
        let mut board = board_7x6();
        board = board.drop_token(2).unwrap(); // X
        board = board.drop_token(6).unwrap(); // O
        board = board.drop_token(3).unwrap(); // X

        let score = evaluate(&board, Seat::First);
        assert!(
            score > 1000.0,
            "a pair one drop from a triple should score past the 10^3 tier, got {score}"
        );
    }

    #[test]
    fn seat_swap_negates_score() {
        let mut board = board_7x6();
        for &column in &[3, 2, 4, 2, 5] {
            board = board.drop_token(column).unwrap();
        }
        let score = evaluate(&board, Seat::First);
        let swapped = board.swap_seats();
        assert_eq!(
            evaluate(&swapped, Seat::First),
            -score,
            "piece swap with the mover swapped should negate the score"
        );
    }
}
