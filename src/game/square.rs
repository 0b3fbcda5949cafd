use crate::error::ParseError;
use crate::utils::bitboard::Bitboard;

/// Little-Endian Rank-File square index: a1 = 0, h1 = 7, a8 = 56, h8 = 63.
pub type Square = u8;

/// Sentinel for "no square".
pub const NO_SQUARE: Square = 64;

#[allow(dead_code)]
pub trait SquareExt {
    fn file(&self) -> u8;
    fn rank(&self) -> u8;
    fn from_coords(file: u8, rank: u8) -> Square;
    fn parse(text: &str) -> Result<Square, ParseError>;
    fn name(&self) -> String;
    fn bb(&self) -> Bitboard;

    const A1: Square = 0;
    const B1: Square = 1;
    const C1: Square = 2;
    const D1: Square = 3;
    const E1: Square = 4;
    const F1: Square = 5;
    const G1: Square = 6;
    const H1: Square = 7;

    const A2: Square = 8;
    const B2: Square = 9;
    const C2: Square = 10;
    const D2: Square = 11;
    const E2: Square = 12;
    const F2: Square = 13;
    const G2: Square = 14;
    const H2: Square = 15;

    const A3: Square = 16;
    const B3: Square = 17;
    const C3: Square = 18;
    const D3: Square = 19;
    const E3: Square = 20;
    const F3: Square = 21;
    const G3: Square = 22;
    const H3: Square = 23;

    const A4: Square = 24;
    const B4: Square = 25;
    const C4: Square = 26;
    const D4: Square = 27;
    const E4: Square = 28;
    const F4: Square = 29;
    const G4: Square = 30;
    const H4: Square = 31;

    const A5: Square = 32;
    const B5: Square = 33;
    const C5: Square = 34;
    const D5: Square = 35;
    const E5: Square = 36;
    const F5: Square = 37;
    const G5: Square = 38;
    const H5: Square = 39;

    const A6: Square = 40;
    const B6: Square = 41;
    const C6: Square = 42;
    const D6: Square = 43;
    const E6: Square = 44;
    const F6: Square = 45;
    const G6: Square = 46;
    const H6: Square = 47;

    const A7: Square = 48;
    const B7: Square = 49;
    const C7: Square = 50;
    const D7: Square = 51;
    const E7: Square = 52;
    const F7: Square = 53;
    const G7: Square = 54;
    const H7: Square = 55;

    const A8: Square = 56;
    const B8: Square = 57;
    const C8: Square = 58;
    const D8: Square = 59;
    const E8: Square = 60;
    const F8: Square = 61;
    const G8: Square = 62;
    const H8: Square = 63;
}

impl SquareExt for u8 {
    #[inline]
    fn file(&self) -> u8 {
        self & 7
    }

    #[inline]
    fn rank(&self) -> u8 {
        self >> 3
    }

    #[inline]
    fn from_coords(file: u8, rank: u8) -> Square {
        rank * 8 + file
    }

    fn parse(text: &str) -> Result<Square, ParseError> {
        let bytes = text.as_bytes();
        match bytes {
            [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => {
                Ok(Square::from_coords(file - b'a', rank - b'1'))
            }
            _ => Err(ParseError::SquareName(text.to_string())),
        }
    }

    fn name(&self) -> String {
        format!("{}{}", (self.file() + b'a') as char, (self.rank() + b'1') as char)
    }

    #[inline]
    fn bb(&self) -> Bitboard {
        1 << self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_name_round_trip() {
        for sq in 0..64u8 {
            assert_eq!(Square::parse(&sq.name()).unwrap(), sq);
        }
        assert_eq!(Square::parse("a1").unwrap(), Square::A1);
        assert_eq!(Square::parse("h8").unwrap(), Square::H8);
        assert_eq!(Square::parse("e4").unwrap(), Square::E4);
    }

    #[test]
    fn parse_rejects_garbage() {
        for text in ["", "a", "i1", "a9", "a0", "11", "aa", "e44"] {
            assert!(Square::parse(text).is_err(), "{text:?} should not parse");
        }
    }

    #[test]
    fn coords() {
        assert_eq!(Square::E4.file(), 4);
        assert_eq!(Square::E4.rank(), 3);
        assert_eq!(Square::from_coords(4, 3), Square::E4);
    }
}
