//! Complete game state: board, side to move, castling rights, en
//! passant, clocks and the incrementally maintained Zobrist key.
//!
//! The position is mutated exclusively through strictly nested
//! `make_move` / `unmake_move` (and null-move) pairs; each make pushes
//! an undo snapshot so unmake is O(1) and bit-exact.

use fxhash::FxHashMap;

use crate::error::ParseError;
use crate::game::board::Board;
use crate::game::movegen;
use crate::game::moves::{Move, MoveFlag};
use crate::game::pieces::{self, Color, ColoredPiece, Piece};
use crate::game::square::{Square, SquareExt};
use crate::utils::bitboard::{king_attacks, knight_attacks, pawn_attacks};
use crate::utils::magic;
use crate::utils::zobrist::ZOBRIST;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// ── Castling rights ─────────────────────────────────────────────────────────

pub const WHITE_KINGSIDE: u8 = 0b0001;
pub const WHITE_QUEENSIDE: u8 = 0b0010;
pub const BLACK_KINGSIDE: u8 = 0b0100;
pub const BLACK_QUEENSIDE: u8 = 0b1000;
pub const CASTLING_NONE: u8 = 0;
pub const CASTLING_ALL: u8 = 0b1111;

/// Per-square castling rights to PRESERVE when the square appears as a
/// move's origin or destination: `castling &= MASK[from] & MASK[to]`.
/// One table covers king moves, rook moves and rook-home captures.
const fn castle_mask_table() -> [u8; 64] {
    let mut table = [CASTLING_ALL; 64];
    table[0] = CASTLING_ALL & !WHITE_QUEENSIDE; // a1
    table[7] = CASTLING_ALL & !WHITE_KINGSIDE; // h1
    table[4] = CASTLING_ALL & !(WHITE_KINGSIDE | WHITE_QUEENSIDE); // e1
    table[56] = CASTLING_ALL & !BLACK_QUEENSIDE; // a8
    table[63] = CASTLING_ALL & !BLACK_KINGSIDE; // h8
    table[60] = CASTLING_ALL & !(BLACK_KINGSIDE | BLACK_QUEENSIDE); // e8
    table
}

const CASTLE_MASK: [u8; 64] = castle_mask_table();

// ── Undo snapshot ───────────────────────────────────────────────────────────

/// State saved per make_move; unmake restores the key from the
/// snapshot instead of reversing the XORs.
#[derive(Copy, Clone)]
struct UndoInfo {
    castling: u8,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    captured: Option<ColoredPiece>,
    key: u64,
}

// ── Position ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Position {
    board: Board,
    side_to_move: Color,
    castling: u8,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    key: u64,
    undo_stack: Vec<UndoInfo>,
    key_history: Vec<u64>,
    key_counts: FxHashMap<u64, u32>,
}

impl Position {
    pub fn new(
        board: Board,
        side_to_move: Color,
        castling: u8,
        en_passant: Option<Square>,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) -> Self {
        let mut pos = Self {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            key: 0,
            undo_stack: Vec::with_capacity(256),
            key_history: Vec::with_capacity(256),
            key_counts: FxHashMap::default(),
        };
        pos.compute_key();
        pos
    }

    /// Standard starting position.
    pub fn initial() -> Self {
        Self::new(Board::initial(), Color::White, CASTLING_ALL, None, 0, 1)
    }

    // ── FEN ─────────────────────────────────────────────────────────────

    pub fn from_fen(fen: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(ParseError::FenFieldCount(fields.len()));
        }

        // 1. Piece placement, ranks top-down.
        let mut board = Board::empty();
        let mut rank: i32 = 7;
        let mut file: i32 = 0;
        for c in fields[0].chars() {
            match c {
                '/' => {
                    if file != 8 || rank == 0 {
                        return Err(ParseError::FenPlacement(fields[0].to_string()));
                    }
                    rank -= 1;
                    file = 0;
                }
                '1'..='8' => {
                    file += c as i32 - '0' as i32;
                    if file > 8 {
                        return Err(ParseError::FenPlacement(fields[0].to_string()));
                    }
                }
                _ => {
                    let piece = pieces::from_fen_char(c)
                        .ok_or_else(|| ParseError::FenPlacement(fields[0].to_string()))?;
                    if file >= 8 {
                        return Err(ParseError::FenPlacement(fields[0].to_string()));
                    }
                    board.put_piece(Square::from_coords(file as u8, rank as u8), piece);
                    file += 1;
                }
            }
        }
        if rank != 0 || file != 8 {
            return Err(ParseError::FenPlacement(fields[0].to_string()));
        }

        // 2. Side to move.
        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(ParseError::FenSideToMove(other.to_string())),
        };

        // 3. Castling rights.
        let mut castling = CASTLING_NONE;
        if fields[2] != "-" {
            for c in fields[2].chars() {
                castling |= match c {
                    'K' => WHITE_KINGSIDE,
                    'Q' => WHITE_QUEENSIDE,
                    'k' => BLACK_KINGSIDE,
                    'q' => BLACK_QUEENSIDE,
                    _ => return Err(ParseError::FenCastling(fields[2].to_string())),
                };
            }
        }

        // 4. En passant target.
        let en_passant = match fields[3] {
            "-" => None,
            name => Some(
                Square::parse(name).map_err(|_| ParseError::FenEnPassant(name.to_string()))?,
            ),
        };

        // 5-6. Clocks, optional.
        let halfmove_clock = match fields.get(4) {
            Some(text) => text
                .parse::<u32>()
                .map_err(|_| ParseError::FenClock(text.to_string()))?,
            None => 0,
        };
        let fullmove_number = match fields.get(5) {
            Some(text) => match text.parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => return Err(ParseError::FenClock(text.to_string())),
            },
            None => 1,
        };

        Ok(Self::new(
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        ))
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(80);

        for rank in (0..8).rev() {
            if rank < 7 {
                fen.push('/');
            }
            let mut empty = 0;
            for file in 0..8 {
                match self.board.piece_at(Square::from_coords(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push((b'0' + empty) as char);
                            empty = 0;
                        }
                        fen.push(pieces::fen_char(piece));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push((b'0' + empty) as char);
            }
        }

        fen.push(' ');
        fen.push(if self.side_to_move == Color::White { 'w' } else { 'b' });

        fen.push(' ');
        if self.castling == CASTLING_NONE {
            fen.push('-');
        } else {
            for (right, c) in [
                (WHITE_KINGSIDE, 'K'),
                (WHITE_QUEENSIDE, 'Q'),
                (BLACK_KINGSIDE, 'k'),
                (BLACK_QUEENSIDE, 'q'),
            ] {
                if self.castling & right != 0 {
                    fen.push(c);
                }
            }
        }

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.name()),
            None => fen.push('-'),
        }

        fen.push(' ');
        fen.push_str(&self.halfmove_clock.to_string());
        fen.push(' ');
        fen.push_str(&self.fullmove_number.to_string());

        fen
    }

    // ── Accessors ───────────────────────────────────────────────────────

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> u8 {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Whether a move captures, counting en passant.
    #[inline]
    pub fn is_capture(&self, m: Move) -> bool {
        m.flag == MoveFlag::EnPassant || self.board.piece_at(m.to).is_some()
    }

    // ── Make / unmake ───────────────────────────────────────────────────

    pub fn make_move(&mut self, m: Move) {
        let piece @ (kind, color) = self
            .board
            .piece_at(m.from)
            .expect("no piece on the move's origin square");

        // En passant captures one rank behind the target square.
        let capture_sq = if m.flag == MoveFlag::EnPassant {
            Square::from_coords(m.to.file(), m.from.rank())
        } else {
            m.to
        };
        let captured = self.board.piece_at(capture_sq);

        self.undo_stack.push(UndoInfo {
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            captured,
            key: self.key,
        });

        self.toggle_piece_hash(piece, m.from);
        self.board.remove_piece(m.from);

        if let Some(victim) = captured {
            self.toggle_piece_hash(victim, capture_sq);
            self.board.remove_piece(capture_sq);
        }

        let placed = match (m.flag, m.promotion) {
            (MoveFlag::Promotion, Some(promo)) => (promo, color),
            _ => piece,
        };
        self.board.put_piece(m.to, placed);
        self.toggle_piece_hash(placed, m.to);

        match m.flag {
            MoveFlag::CastleKingside => self.slide_rook(7, 5, m.from.rank()),
            MoveFlag::CastleQueenside => self.slide_rook(0, 3, m.from.rank()),
            _ => {}
        }

        if m.flag == MoveFlag::DoublePawn {
            let between = Square::from_coords(m.from.file(), (m.from.rank() + m.to.rank()) / 2);
            self.set_en_passant(Some(between));
        } else {
            self.set_en_passant(None);
        }

        self.set_castling(self.castling & CASTLE_MASK[m.from as usize] & CASTLE_MASK[m.to as usize]);

        if kind == Piece::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }

        self.side_to_move = !self.side_to_move;
        self.key ^= ZOBRIST.side_to_move;

        self.push_key();
    }

    pub fn unmake_move(&mut self, m: Move) {
        self.pop_key();
        let undo = self.undo_stack.pop().expect("unmake without matching make");

        self.side_to_move = !self.side_to_move;
        if self.side_to_move == Color::Black {
            self.fullmove_number -= 1;
        }

        let placed @ (_, color) = self
            .board
            .piece_at(m.to)
            .expect("no piece on the move's target square");

        // A promotion goes back as a pawn.
        let original = if m.flag == MoveFlag::Promotion {
            (Piece::Pawn, color)
        } else {
            placed
        };

        self.board.remove_piece(m.to);
        self.board.put_piece(m.from, original);

        if let Some(captured) = undo.captured {
            let capture_sq = if m.flag == MoveFlag::EnPassant {
                Square::from_coords(m.to.file(), m.from.rank())
            } else {
                m.to
            };
            self.board.put_piece(capture_sq, captured);
        }

        match m.flag {
            MoveFlag::CastleKingside => {
                let rank = m.from.rank();
                self.board
                    .move_piece(Square::from_coords(5, rank), Square::from_coords(7, rank));
            }
            MoveFlag::CastleQueenside => {
                let rank = m.from.rank();
                self.board
                    .move_piece(Square::from_coords(3, rank), Square::from_coords(0, rank));
            }
            _ => {}
        }

        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.key = undo.key;
    }

    /// Pass the turn. Must not be called while in check.
    pub fn make_null_move(&mut self) {
        debug_assert!(!self.is_in_check(self.side_to_move));

        self.undo_stack.push(UndoInfo {
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            captured: None,
            key: self.key,
        });

        self.set_en_passant(None);
        self.halfmove_clock += 1;
        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = !self.side_to_move;
        self.key ^= ZOBRIST.side_to_move;

        self.push_key();
    }

    pub fn unmake_null_move(&mut self) {
        self.pop_key();
        let undo = self.undo_stack.pop().expect("unmake without matching make");

        self.side_to_move = !self.side_to_move;
        if self.side_to_move == Color::Black {
            self.fullmove_number -= 1;
        }
        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.key = undo.key;
    }

    fn slide_rook(&mut self, from_file: u8, to_file: u8, rank: u8) {
        let rook_from = Square::from_coords(from_file, rank);
        let rook_to = Square::from_coords(to_file, rank);
        let rook = self
            .board
            .piece_at(rook_from)
            .expect("no rook on its home square while castling");
        self.toggle_piece_hash(rook, rook_from);
        self.board.move_piece(rook_from, rook_to);
        self.toggle_piece_hash(rook, rook_to);
    }

    // ── Attack queries ──────────────────────────────────────────────────

    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        let board = &self.board;
        let occ = board.occupied_all();

        // A pawn of `by` attacks sq iff sq's reverse pawn attacks hit one.
        if pawn_attacks(!by, sq) & board.pieces(by, Piece::Pawn) != 0 {
            return true;
        }
        if knight_attacks(sq) & board.pieces(by, Piece::Knight) != 0 {
            return true;
        }
        if king_attacks(sq) & board.pieces(by, Piece::King) != 0 {
            return true;
        }

        let diagonal = board.pieces(by, Piece::Bishop) | board.pieces(by, Piece::Queen);
        if magic::bishop_attacks(sq, occ) & diagonal != 0 {
            return true;
        }

        let straight = board.pieces(by, Piece::Rook) | board.pieces(by, Piece::Queen);
        magic::rook_attacks(sq, occ) & straight != 0
    }

    #[inline]
    pub fn is_in_check(&self, color: Color) -> bool {
        self.is_square_attacked(self.board.king_square(color), !color)
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        self.is_in_check(self.side_to_move)
    }

    // ── Repetition ──────────────────────────────────────────────────────

    /// How many times the current key has occurred, current included.
    pub fn repetition_count(&self) -> u32 {
        self.key_counts.get(&self.key).copied().unwrap_or(0)
    }

    // ── UCI resolution ──────────────────────────────────────────────────

    /// Resolve a UCI move string against the legal moves of this
    /// position, recovering castling / double-push / en-passant flags
    /// that the bare text cannot encode.
    pub fn find_move(&mut self, text: &str) -> Result<Move, ParseError> {
        let parsed = Move::from_uci(text)?;
        movegen::legal(self)
            .iter()
            .copied()
            .find(|m| {
                m.from == parsed.from && m.to == parsed.to && m.promotion == parsed.promotion
            })
            .ok_or_else(|| ParseError::UciMove(text.to_string()))
    }

    // ── Hash plumbing ───────────────────────────────────────────────────

    fn compute_key(&mut self) {
        self.key = ZOBRIST.castling[self.castling as usize];
        if self.side_to_move == Color::Black {
            self.key ^= ZOBRIST.side_to_move;
        }
        if let Some(ep) = self.en_passant {
            self.key ^= ZOBRIST.en_passant[ep as usize];
        }
        for sq in 0..64 {
            if let Some((kind, color)) = self.board.piece_at(sq) {
                self.key ^= ZOBRIST.piece(color, kind, sq);
            }
        }

        self.key_history.clear();
        self.key_counts.clear();
        self.push_key();
    }

    #[inline]
    fn toggle_piece_hash(&mut self, (kind, color): ColoredPiece, sq: Square) {
        self.key ^= ZOBRIST.piece(color, kind, sq);
    }

    fn set_castling(&mut self, castling: u8) {
        if castling == self.castling {
            return;
        }
        self.key ^= ZOBRIST.castling[self.castling as usize];
        self.castling = castling;
        self.key ^= ZOBRIST.castling[self.castling as usize];
    }

    fn set_en_passant(&mut self, en_passant: Option<Square>) {
        if en_passant == self.en_passant {
            return;
        }
        if let Some(old) = self.en_passant {
            self.key ^= ZOBRIST.en_passant[old as usize];
        }
        self.en_passant = en_passant;
        if let Some(new) = self.en_passant {
            self.key ^= ZOBRIST.en_passant[new as usize];
        }
    }

    fn push_key(&mut self) {
        self.key_history.push(self.key);
        *self.key_counts.entry(self.key).or_insert(0) += 1;
    }

    fn pop_key(&mut self) {
        if let Some(key) = self.key_history.pop() {
            if let Some(count) = self.key_counts.get_mut(&key) {
                if *count > 1 {
                    *count -= 1;
                } else {
                    self.key_counts.remove(&key);
                }
            }
        }
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.side_to_move == other.side_to_move
            && self.castling == other.castling
            && self.en_passant == other.en_passant
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
            && self.key == other.key
    }
}

impl std::fmt::Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Position({})", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::moves::MoveFlag;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    fn snapshot(pos: &Position) -> (String, u64) {
        (pos.to_fen(), pos.key())
    }

    #[test]
    fn fen_round_trip() {
        for fen in [
            STARTING_FEN,
            KIWIPETE,
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "4k3/8/8/3Pp3/8/8/8/4K3 w - e6 0 2",
        ] {
            let pos = Position::from_fen(fen).unwrap();
            assert_eq!(pos.to_fen(), fen);
            assert_eq!(Position::from_fen(&pos.to_fen()).unwrap(), pos);
        }
    }

    #[test]
    fn fen_defaults_missing_clocks() {
        let pos = Position::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -").unwrap();
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.fullmove_number(), 1);
    }

    #[test]
    fn fen_rejects_malformed_input() {
        let cases = [
            "",                                                         // no fields
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",          // 7 ranks
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", // bad digit
            "rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", // wide rank
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1", // bad side
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQxq - 0 1", // bad castling
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq z9 0 1", // bad ep
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1", // bad clock
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 0", // fullmove < 1
        ];
        for fen in cases {
            assert!(Position::from_fen(fen).is_err(), "{fen:?} should not parse");
        }
        // Four fields are enough; the clocks default.
        assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -").is_ok());
    }

    #[test]
    fn make_unmake_restores_everything() {
        let mut pos = Position::from_fen(KIWIPETE).unwrap();
        let before = snapshot(&pos);

        let moves = movegen::legal(&mut pos);
        assert!(!moves.is_empty());
        for &m in moves.iter() {
            pos.make_move(m);
            pos.unmake_move(m);
            assert_eq!(snapshot(&pos), before, "state changed after {m}");
        }
    }

    #[test]
    fn incremental_key_matches_recomputation() {
        let mut pos = Position::initial();
        for uci in ["e2e4", "c7c5", "g1f3", "d7d6", "f1b5", "c8d7", "e1g1"] {
            let m = pos.find_move(uci).unwrap();
            pos.make_move(m);
            let recomputed = Position::from_fen(&pos.to_fen()).unwrap();
            assert_eq!(pos.key(), recomputed.key(), "after {uci}");
        }
    }

    #[test]
    fn en_passant_capture_and_undo() {
        let mut pos = Position::from_fen("4k3/8/8/8/4p3/8/3P4/4K3 w - - 0 1").unwrap();
        let double = pos.find_move("d2d4").unwrap();
        assert_eq!(double.flag, MoveFlag::DoublePawn);
        pos.make_move(double);
        assert_eq!(pos.en_passant(), Some(Square::D3));

        let before = snapshot(&pos);
        let ep = pos.find_move("e4d3").unwrap();
        assert_eq!(ep.flag, MoveFlag::EnPassant);
        pos.make_move(ep);
        // The captured pawn disappears from d4, not d3.
        assert!(pos.board().is_empty(Square::D4));
        assert_eq!(pos.board().piece_at(Square::D3), Some((Piece::Pawn, Color::Black)));
        pos.unmake_move(ep);
        assert_eq!(snapshot(&pos), before);
    }

    #[test]
    fn castling_moves_rook_and_clears_rights() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let before = snapshot(&pos);

        let kingside = pos.find_move("e1g1").unwrap();
        assert_eq!(kingside.flag, MoveFlag::CastleKingside);
        pos.make_move(kingside);
        assert_eq!(pos.board().piece_at(Square::F1), Some((Piece::Rook, Color::White)));
        assert_eq!(pos.castling() & (WHITE_KINGSIDE | WHITE_QUEENSIDE), 0);
        pos.unmake_move(kingside);
        assert_eq!(snapshot(&pos), before);

        let queenside = pos.find_move("e1c1").unwrap();
        assert_eq!(queenside.flag, MoveFlag::CastleQueenside);
        pos.make_move(queenside);
        assert_eq!(pos.board().piece_at(Square::D1), Some((Piece::Rook, Color::White)));
        pos.unmake_move(queenside);
        assert_eq!(snapshot(&pos), before);
    }

    #[test]
    fn capturing_a_rook_home_square_clears_that_right() {
        let mut pos =
            Position::from_fen("r3k2r/8/8/8/8/8/6n1/R3K2R b KQkq - 0 1").unwrap();
        let capture = pos.find_move("g2h1").unwrap();
        pos.make_move(capture);
        assert_eq!(pos.castling() & WHITE_KINGSIDE, 0);
        assert_ne!(pos.castling() & WHITE_QUEENSIDE, 0);
    }

    #[test]
    fn promotion_and_undo() {
        let mut pos = Position::from_fen("7k/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let before = snapshot(&pos);
        let promo = pos.find_move("e7e8q").unwrap();
        pos.make_move(promo);
        assert_eq!(pos.board().piece_at(Square::E8), Some((Piece::Queen, Color::White)));
        pos.unmake_move(promo);
        assert_eq!(snapshot(&pos), before);
        assert_eq!(pos.board().piece_at(Square::E7), Some((Piece::Pawn, Color::White)));
    }

    #[test]
    fn null_move_round_trip() {
        let mut pos = Position::from_fen("4k3/8/8/3Pp3/8/8/8/4K3 w - e6 0 2").unwrap();
        let before = snapshot(&pos);
        pos.make_null_move();
        assert_eq!(pos.side_to_move(), Color::Black);
        assert_eq!(pos.en_passant(), None);
        assert_ne!(pos.key(), before.1);
        pos.unmake_null_move();
        assert_eq!(snapshot(&pos), before);
    }

    #[test]
    fn repetition_counting() {
        let mut pos = Position::initial();
        assert_eq!(pos.repetition_count(), 1);
        for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            let m = pos.find_move(uci).unwrap();
            pos.make_move(m);
        }
        // Back to the start shape; castling/EP state matches too.
        assert_eq!(pos.repetition_count(), 2);
        for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            let m = pos.find_move(uci).unwrap();
            pos.make_move(m);
        }
        assert_eq!(pos.repetition_count(), 3);
    }

    #[test]
    fn attack_queries() {
        let pos = Position::from_fen("4k3/8/8/8/8/5n2/8/R3K3 w Q - 0 1").unwrap();
        // Knight on f3 attacks e1.
        assert!(pos.is_square_attacked(Square::E1, Color::Black));
        assert!(pos.in_check());
        // Rook on a1 attacks a8 along the open file.
        assert!(pos.is_square_attacked(Square::A8, Color::White));
        assert!(!pos.is_square_attacked(Square::H7, Color::White));
    }

    #[test]
    fn halfmove_and_fullmove_bookkeeping() {
        let mut pos = Position::initial();
        let m = pos.find_move("g1f3").unwrap();
        pos.make_move(m);
        assert_eq!(pos.halfmove_clock(), 1);
        assert_eq!(pos.fullmove_number(), 1);
        let m = pos.find_move("b8c6").unwrap();
        pos.make_move(m);
        assert_eq!(pos.halfmove_clock(), 2);
        assert_eq!(pos.fullmove_number(), 2);
        let m = pos.find_move("e2e4").unwrap();
        pos.make_move(m);
        assert_eq!(pos.halfmove_clock(), 0); // pawn move resets
    }
}
