//! Board game properties: terminal dominance of the evaluator, threat
//! symmetry under a seat swap, and the bounded standard-board scenario.

use foresight::connect::{AlphaBetaAgent, Board, Outcome, Seat, WIN_SCORE, evaluate};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};

#[test]
fn evaluation_is_exactly_the_win_score_on_decided_boards() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut decided = 0;
    for _ in 0..200 {
        let mut board = Board::new(5, 5, 3).unwrap();
        while board.outcome() == Outcome::Undecided && !board.free_columns().is_empty() {
            let column = *board.free_columns().choose(&mut rng).unwrap();
            board = board.drop_token(column).unwrap();
        }
        let Outcome::Won(winner) = board.outcome() else {
            continue;
        };
        decided += 1;
        assert_eq!(evaluate(&board, winner), WIN_SCORE);
        assert_eq!(evaluate(&board, winner.opponent()), -WIN_SCORE);
        if decided >= 10 {
            return;
        }
    }
    panic!("random play on a 5x5 win-3 board should decide games regularly");
}

#[test]
fn seat_swap_negates_the_evaluation() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let mut board = Board::new(7, 6, 4).unwrap();
        let plies = rng.random_range(0..12);
        for _ in 0..plies {
            let free = board.free_columns();
            if free.is_empty() || board.outcome() != Outcome::Undecided {
                break;
            }
            board = board.drop_token(*free.choose(&mut rng).unwrap()).unwrap();
        }
        let score = evaluate(&board, Seat::First);
        assert_eq!(
            evaluate(&board.swap_seats(), Seat::First),
            -score,
            "swap must negate the score at position:\n{board}"
        );
    }
}

#[test]
fn opening_move_on_the_standard_board_is_legal_and_bounded() {
    let board = Board::new(7, 6, 4).unwrap();
    let mut agent = AlphaBetaAgent::new(4).unwrap().with_seed(3);

    let column = agent.choose_column(&board).unwrap();
    assert!(column < 7, "chosen column {column} is off the board");

    // The unpruned depth-4 tree: 7 children, each 1 + 7 + 49 + 343 nodes.
    let full_tree = 7 * (1 + 7 + 49 + 343);
    assert!(agent.nodes_expanded() > 0);
    assert!(
        agent.nodes_expanded() <= full_tree,
        "expanded {} nodes, full tree holds {full_tree}",
        agent.nodes_expanded()
    );
}

#[test]
fn self_play_terminates_within_the_board_capacity() {
    let mut board = Board::new(7, 6, 4).unwrap();
    let mut first = AlphaBetaAgent::new(4).unwrap().with_seed(1);
    let mut second = AlphaBetaAgent::new(4).unwrap().with_seed(2);

    let mut moves = 0;
    while !board.is_terminal() {
        let agent = match board.to_move() {
            Seat::First => &mut first,
            Seat::Second => &mut second,
        };
        let column = agent.choose_column(&board).unwrap();
        board = board.drop_token(column).unwrap();
        moves += 1;
        assert!(moves <= 42, "self-play must fill the board at most once");
    }
    assert!(board.is_terminal());
}
