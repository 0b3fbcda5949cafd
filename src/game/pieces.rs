use std::ops::Not;
use strum_macros::{EnumCount, EnumIter, FromRepr};

/// Piece kinds in Zobrist index order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, EnumIter, EnumCount, FromRepr)]
pub enum Piece {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, EnumIter, EnumCount, FromRepr)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Not for Color {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl Piece {
    pub fn from_char(c: char) -> Option<Piece> {
        match c {
            'p' => Some(Piece::Pawn),
            'n' => Some(Piece::Knight),
            'b' => Some(Piece::Bishop),
            'r' => Some(Piece::Rook),
            'q' => Some(Piece::Queen),
            'k' => Some(Piece::King),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }
}

pub type ColoredPiece = (Piece, Color);

/// FEN character for a piece: uppercase for white, lowercase for black.
pub fn fen_char((piece, color): ColoredPiece) -> char {
    match color {
        Color::White => piece.to_char().to_ascii_uppercase(),
        Color::Black => piece.to_char(),
    }
}

/// Parse a FEN piece character.
pub fn from_fen_char(c: char) -> Option<ColoredPiece> {
    let color = if c.is_ascii_uppercase() {
        Color::White
    } else {
        Color::Black
    };
    Piece::from_char(c.to_ascii_lowercase()).map(|piece| (piece, color))
}
