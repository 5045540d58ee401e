//! Error types for the foresight crate

use thiserror::Error;

/// Main error type for the foresight crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("column {column} is out of range (board has {width} columns)")]
    ColumnOutOfRange { column: usize, width: usize },

    #[error("column {column} is full")]
    ColumnFull { column: usize },

    #[error("no legal moves available")]
    NoLegalMoves,

    #[error("win length {win_length} does not fit a {width}x{height} board")]
    InvalidWinLength {
        win_length: usize,
        width: usize,
        height: usize,
    },

    #[error("search depth must be at least 1")]
    ZeroSearchDepth,

    #[error("cell ({x}, {y}) is outside the {width}x{height} world")]
    CellOutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    #[error("world has no character to act for")]
    NoCharacter,

    #[error("monster index {index} does not exist ({count} monsters)")]
    UnknownMonster { index: usize, count: usize },

    #[error("weight snapshot holds {got} weights but {expected} features are defined")]
    WeightCountMismatch { expected: usize, got: usize },

    #[error("weight snapshot line {line} is not a number: '{text}'")]
    MalformedWeight { line: usize, text: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an I/O error with a description of the failed operation.
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            operation: operation.into(),
            source,
        }
    }
}
