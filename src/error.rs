//! Error types for position and move parsing.

use thiserror::Error;

/// Errors produced when parsing FEN strings, square names or UCI moves.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("FEN must have 4 to 6 fields, got {0}")]
    FenFieldCount(usize),

    #[error("invalid FEN piece placement: {0}")]
    FenPlacement(String),

    #[error("invalid FEN side to move: {0}")]
    FenSideToMove(String),

    #[error("invalid FEN castling rights: {0}")]
    FenCastling(String),

    #[error("invalid FEN en passant square: {0}")]
    FenEnPassant(String),

    #[error("invalid FEN clock field: {0}")]
    FenClock(String),

    #[error("invalid square name: {0}")]
    SquareName(String),

    #[error("invalid UCI move: {0}")]
    UciMove(String),
}
