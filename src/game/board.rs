//! Bitboard board representation with a mailbox for O(1) lookups.

use strum::EnumCount;

use crate::game::pieces::{Color, ColoredPiece, Piece};
use crate::game::square::{Square, SquareExt};
use crate::utils::bitboard::{clear_bit, lsb, set_bit, square_bb, Bitboard, EMPTY_BB};

/// Twelve piece bitboards, per-color and overall occupancy aggregates,
/// plus a 64-slot mailbox. All four views are kept in sync by the three
/// mutating operations.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    pieces: [[Bitboard; Piece::COUNT]; Color::COUNT],
    occupied: [Bitboard; Color::COUNT],
    occupied_all: Bitboard,
    mailbox: [Option<ColoredPiece>; 64],
}

impl Board {
    pub fn empty() -> Self {
        Self {
            pieces: [[EMPTY_BB; Piece::COUNT]; Color::COUNT],
            occupied: [EMPTY_BB; Color::COUNT],
            occupied_all: EMPTY_BB,
            mailbox: [None; 64],
        }
    }

    /// Standard starting position.
    pub fn initial() -> Self {
        const BACK_RANK: [Piece; 8] = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];

        let mut board = Self::empty();
        for file in 0..8 {
            board.put_piece(Square::from_coords(file, 1), (Piece::Pawn, Color::White));
            board.put_piece(Square::from_coords(file, 6), (Piece::Pawn, Color::Black));
            board.put_piece(
                Square::from_coords(file, 0),
                (BACK_RANK[file as usize], Color::White),
            );
            board.put_piece(
                Square::from_coords(file, 7),
                (BACK_RANK[file as usize], Color::Black),
            );
        }
        board
    }

    // ── Mutations ───────────────────────────────────────────────────────

    /// Place a piece. The square must be empty.
    pub fn put_piece(&mut self, sq: Square, piece @ (kind, color): ColoredPiece) {
        debug_assert!(self.mailbox[sq as usize].is_none(), "square {sq} occupied");

        set_bit(&mut self.pieces[color as usize][kind as usize], sq);
        set_bit(&mut self.occupied[color as usize], sq);
        set_bit(&mut self.occupied_all, sq);
        self.mailbox[sq as usize] = Some(piece);
    }

    /// Remove and return the piece on a square. The square must be occupied.
    pub fn remove_piece(&mut self, sq: Square) -> ColoredPiece {
        debug_assert!(self.mailbox[sq as usize].is_some(), "square {sq} empty");

        let piece @ (kind, color) = self.mailbox[sq as usize].unwrap();
        clear_bit(&mut self.pieces[color as usize][kind as usize], sq);
        clear_bit(&mut self.occupied[color as usize], sq);
        clear_bit(&mut self.occupied_all, sq);
        self.mailbox[sq as usize] = None;
        piece
    }

    /// Move a piece. `from` must be occupied and `to` empty.
    pub fn move_piece(&mut self, from: Square, to: Square) {
        debug_assert!(self.mailbox[from as usize].is_some(), "square {from} empty");
        debug_assert!(self.mailbox[to as usize].is_none(), "square {to} occupied");

        let piece @ (kind, color) = self.mailbox[from as usize].unwrap();
        let mask = square_bb(from) | square_bb(to);
        self.pieces[color as usize][kind as usize] ^= mask;
        self.occupied[color as usize] ^= mask;
        self.occupied_all ^= mask;
        self.mailbox[to as usize] = Some(piece);
        self.mailbox[from as usize] = None;
    }

    // ── Queries ─────────────────────────────────────────────────────────

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<ColoredPiece> {
        self.mailbox[sq as usize]
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.mailbox[sq as usize].is_none()
    }

    #[inline]
    pub fn pieces(&self, color: Color, kind: Piece) -> Bitboard {
        self.pieces[color as usize][kind as usize]
    }

    #[inline]
    pub fn occupied(&self, color: Color) -> Bitboard {
        self.occupied[color as usize]
    }

    #[inline]
    pub fn occupied_all(&self) -> Bitboard {
        self.occupied_all
    }

    /// Square of the given color's king. Querying a board with no such
    /// king is a caller bug.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        let kings = self.pieces(color, Piece::King);
        debug_assert!(kings != 0, "no {color:?} king on the board");
        lsb(kings)
    }
}
