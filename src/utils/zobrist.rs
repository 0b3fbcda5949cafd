//! Zobrist hashing keys, generated at compile time.
//!
//! Keys are derived from a fixed seed with splitmix64 over sequential
//! indices, so the table is identical on every build and platform:
//! piece keys occupy indices `color * 384 + piece * 64 + square`, the
//! side-to-move key index 768, castling keys 769..=784 and en-passant
//! keys 785..=848.

use crate::game::pieces::{Color, Piece};
use strum::EnumCount;

pub const SEED: u64 = 0xA5B3_C7D9_E1F2_3412;

pub const fn splitmix64(state: u64) -> u64 {
    let mut z = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

const fn nth_key(index: u64) -> u64 {
    splitmix64(SEED.wrapping_add(index))
}

pub struct ZobristKeys {
    /// `pieces[color][piece][square]`, piece order Pawn..King.
    pub pieces: [[[u64; 64]; Piece::COUNT]; Color::COUNT],
    pub side_to_move: u64,
    /// Indexed by the 4-bit castling rights set.
    pub castling: [u64; 16],
    /// Indexed by the en-passant target square.
    pub en_passant: [u64; 64],
}

impl ZobristKeys {
    pub const fn new() -> Self {
        let mut pieces = [[[0u64; 64]; Piece::COUNT]; Color::COUNT];

        let mut color = 0;
        while color < Color::COUNT {
            let mut piece = 0;
            while piece < Piece::COUNT {
                let mut sq = 0;
                while sq < 64 {
                    pieces[color][piece][sq] = nth_key((color * 384 + piece * 64 + sq) as u64);
                    sq += 1;
                }
                piece += 1;
            }
            color += 1;
        }

        let side_to_move = nth_key(768);

        let mut castling = [0u64; 16];
        let mut idx = 0;
        while idx < 16 {
            castling[idx] = nth_key(769 + idx as u64);
            idx += 1;
        }

        let mut en_passant = [0u64; 64];
        let mut sq = 0;
        while sq < 64 {
            en_passant[sq] = nth_key(785 + sq as u64);
            sq += 1;
        }

        Self {
            pieces,
            side_to_move,
            castling,
            en_passant,
        }
    }

    #[inline]
    pub fn piece(&self, color: Color, piece: Piece, sq: crate::game::square::Square) -> u64 {
        self.pieces[color as usize][piece as usize][sq as usize]
    }
}

pub static ZOBRIST: ZobristKeys = ZobristKeys::new();
