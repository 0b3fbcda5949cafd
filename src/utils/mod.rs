pub mod bitboard;
pub mod magic;
pub mod zobrist;

pub use bitboard::*;
