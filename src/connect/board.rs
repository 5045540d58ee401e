//! Connect-N board representation and drop semantics

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Taken(Seat),
}

/// One of the two players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    /// Get the opposing seat
    pub fn opponent(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Seat::First => 'X',
            Seat::Second => 'O',
        }
    }
}

/// Result of the outcome query: either nobody has connected yet, or one
/// seat has a run of at least the win length on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Undecided,
    Won(Seat),
}

/// A connect-N board.
///
/// Cells are addressed as `(x, y)` with `y = 0` at the bottom; a dropped
/// token comes to rest on the lowest empty row of its column. The board is
/// immutable per ply: [`drop_token`] returns a fresh copy, so every search
/// frame owns its state and no aliasing crosses sibling branches.
///
/// [`drop_token`]: Board::drop_token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    width: usize,
    height: usize,
    win_length: usize,
    /// Row-major from the bottom: `cells[y * width + x]`
    cells: Vec<Cell>,
    to_move: Seat,
}

impl Board {
    /// Create an empty board. `win_length` must fit inside the board.
    pub fn new(width: usize, height: usize, win_length: usize) -> crate::Result<Self> {
        if win_length < 2 || (win_length > width && win_length > height) {
            return Err(crate::Error::InvalidWinLength {
                win_length,
                width,
                height,
            });
        }
        Ok(Board {
            width,
            height,
            win_length,
            cells: vec![Cell::Empty; width * height],
            to_move: Seat::First,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn win_length(&self) -> usize {
        self.win_length
    }

    /// Which seat drops the next token
    pub fn to_move(&self) -> Seat {
        self.to_move
    }

    /// Get cell at `(x, y)`; `y = 0` is the bottom row.
    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.cells[y * self.width + x]
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.cells[y * self.width + x] = cell;
    }

    /// Place a token directly, bypassing gravity and turn order. Used by
    /// the evaluator's hypothetical threat probes; regular play goes
    /// through [`Board::drop_token`].
    pub(crate) fn place_direct(&mut self, x: usize, y: usize, seat: Seat) {
        self.set(x, y, Cell::Taken(seat));
    }

    /// Columns that can still take a token, in ascending order.
    ///
    /// The enumeration order is fixed; search tie-breaking depends on it.
    pub fn free_columns(&self) -> Vec<usize> {
        (0..self.width)
            .filter(|&x| self.get(x, self.height - 1) == Cell::Empty)
            .collect()
    }

    /// The row a token dropped in `column` would land on, if any.
    pub fn landing_row(&self, column: usize) -> Option<usize> {
        (0..self.height).find(|&y| self.get(column, y) == Cell::Empty)
    }

    /// Drop the mover's token into `column` and return the new board.
    #[must_use = "drop_token returns a new board; the original is unchanged"]
    pub fn drop_token(&self, column: usize) -> crate::Result<Board> {
        if column >= self.width {
            return Err(crate::Error::ColumnOutOfRange {
                column,
                width: self.width,
            });
        }
        let row = self
            .landing_row(column)
            .ok_or(crate::Error::ColumnFull { column })?;

        let mut next = self.clone();
        next.set(column, row, Cell::Taken(self.to_move));
        next.to_move = self.to_move.opponent();
        Ok(next)
    }

    /// Swap the two seats' tokens and the mover, preserving the structure
    /// of the position from the other side's point of view.
    #[must_use = "swap_seats returns a new board; the original is unchanged"]
    pub fn swap_seats(&self) -> Board {
        let mut swapped = self.clone();
        for cell in &mut swapped.cells {
            if let Cell::Taken(seat) = cell {
                *seat = seat.opponent();
            }
        }
        swapped.to_move = self.to_move.opponent();
        swapped
    }

    /// Whether a run of `length` cells owned by `seat` starts at `(x, y)`
    /// and extends in direction `(dx, dy)` entirely in bounds.
    pub fn run_at(&self, x: usize, y: usize, dx: i32, dy: i32, length: usize, seat: Seat) -> bool {
        let end_x = x as i32 + (length as i32 - 1) * dx;
        let end_y = y as i32 + (length as i32 - 1) * dy;
        if end_x < 0 || end_x >= self.width as i32 || end_y < 0 || end_y >= self.height as i32 {
            return false;
        }
        (0..length as i32).all(|i| {
            let cx = (x as i32 + i * dx) as usize;
            let cy = (y as i32 + i * dy) as usize;
            self.get(cx, cy) == Cell::Taken(seat)
        })
    }

    /// Outcome query: has either seat connected `win_length` in a row?
    pub fn outcome(&self) -> Outcome {
        for y in 0..self.height {
            for x in 0..self.width {
                let Cell::Taken(seat) = self.get(x, y) else {
                    continue;
                };
                for (dx, dy) in DIRECTIONS {
                    if self.run_at(x, y, dx, dy, self.win_length, seat) {
                        return Outcome::Won(seat);
                    }
                }
            }
        }
        Outcome::Undecided
    }

    /// Whether the game is over: a decided outcome or no free columns.
    pub fn is_terminal(&self) -> bool {
        self.outcome() != Outcome::Undecided || self.free_columns().is_empty()
    }
}

/// The four scan directions: one orientation per axis, the two diagonals
/// counted as distinct directions.
pub const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let c = match self.get(x, y) {
                    Cell::Empty => '.',
                    Cell::Taken(seat) => seat.to_char(),
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_7x6() -> Board {
        Board::new(7, 6, 4).unwrap()
    }

    #[test]
    fn test_new_board() {
        let board = board_7x6();
        assert_eq!(board.to_move(), Seat::First);
        assert_eq!(board.free_columns(), vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(board.outcome(), Outcome::Undecided);
    }

    #[test]
    fn test_rejects_bad_win_length() {
        assert!(Board::new(3, 3, 5).is_err());
        assert!(Board::new(3, 3, 1).is_err());
    }

    #[test]
    fn test_tokens_stack() {
        let board = board_7x6();
        let board = board.drop_token(3).unwrap();
        assert_eq!(board.get(3, 0), Cell::Taken(Seat::First));
        assert_eq!(board.to_move(), Seat::Second);

        let board = board.drop_token(3).unwrap();
        assert_eq!(board.get(3, 1), Cell::Taken(Seat::Second));
        assert_eq!(board.to_move(), Seat::First);
    }

    #[test]
    fn test_full_column_rejected() {
        let mut board = board_7x6();
        for _ in 0..6 {
            board = board.drop_token(0).unwrap();
        }
        assert!(!board.free_columns().contains(&0));
        let err = board.drop_token(0).unwrap_err();
        assert!(err.to_string().contains("full"), "got: {err}");
    }

    #[test]
    fn test_horizontal_win() {
        let mut board = board_7x6();
        // First: 0,1,2,3 along the bottom; Second stacks on column 6
        for x in 0..3 {
            board = board.drop_token(x).unwrap();
            board = board.drop_token(6).unwrap();
        }
        board = board.drop_token(3).unwrap();
        assert_eq!(board.outcome(), Outcome::Won(Seat::First));
        assert!(board.is_terminal());
    }

    #[test]
    fn test_vertical_win() {
        let mut board = board_7x6();
        for _ in 0..3 {
            board = board.drop_token(2).unwrap();
            board = board.drop_token(5).unwrap();
        }
        board = board.drop_token(2).unwrap();
        assert_eq!(board.outcome(), Outcome::Won(Seat::First));
    }

    #[test]
    fn test_diagonal_win() {
        let mut board = board_7x6();
        // Stairs: First climbs the / diagonal starting at (0,0)
        let drops = [0, 1, 1, 2, 2, 3, 2, 3, 3, 5, 3];
        for &column in &drops {
            board = board.drop_token(column).unwrap();
        }
        assert_eq!(board.outcome(), Outcome::Won(Seat::First));
    }

    #[test]
    fn test_draw_is_terminal_without_winner() {
        let mut board = Board::new(4, 4, 3).unwrap();
        // Fill to the striped position
        //   OXOX
        //   OXOX
        //   XOXO
        //   XOXO
        // which holds no aligned run of three for either seat.
        for &column in &[0, 1, 0, 1, 2, 3, 2, 3, 1, 0, 1, 0, 3, 2, 3, 2] {
            board = board.drop_token(column).unwrap();
        }
        assert!(board.free_columns().is_empty());
        assert_eq!(board.outcome(), Outcome::Undecided);
        assert!(board.is_terminal());
    }

    #[test]
    fn test_display() {
        let board = board_7x6().drop_token(0).unwrap();
        let shown = format!("{board}");
        assert!(shown.ends_with("X......\n"));
    }
}
