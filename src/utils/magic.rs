//! Magic bitboard attack tables for the sliding pieces.
//!
//! Tables are built once, lazily, behind a [`OnceLock`]. Magic
//! multipliers are found at init time by a deterministic xorshift*
//! search, which keeps the crate free of baked-in magic constants and
//! works for any square/bit layout.

use std::sync::OnceLock;

use crate::game::square::Square;
use crate::utils::bitboard::{popcount, set_bit, test_bit, Bitboard};

static MAGICS: OnceLock<Magics> = OnceLock::new();

/// Shared access to the sliding attack tables, built on first use.
#[inline]
pub fn magics() -> &'static Magics {
    MAGICS.get_or_init(Magics::build)
}

/// Pre-warm the attack tables. Idempotent.
pub fn init() {
    let _ = magics();
}

#[inline]
pub fn bishop_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    magics().bishop.attacks(sq, occupancy)
}

#[inline]
pub fn rook_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    magics().rook.attacks(sq, occupancy)
}

#[inline]
pub fn queen_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    let m = magics();
    m.bishop.attacks(sq, occupancy) | m.rook.attacks(sq, occupancy)
}

// ── PRNG for the magic search ───────────────────────────────────────────────

/// xorshift* with a fixed seed keeps the whole init deterministic.
struct Xorshift {
    state: u64,
}

impl Xorshift {
    const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Sparse draws make good magic candidates.
    fn sparse(&mut self) -> u64 {
        self.next() & self.next() & self.next()
    }
}

// ── Per-piece tables ────────────────────────────────────────────────────────

pub struct MagicTable {
    mask: [Bitboard; 64],
    magic: [u64; 64],
    shift: [u32; 64],
    offset: [usize; 64],
    attacks: Vec<Bitboard>,
}

impl MagicTable {
    #[inline]
    pub fn attacks(&self, sq: Square, occupancy: Bitboard) -> Bitboard {
        let s = sq as usize;
        let idx = self.offset[s]
            + (((occupancy & self.mask[s]).wrapping_mul(self.magic[s])) >> self.shift[s]) as usize;
        self.attacks[idx]
    }
}

pub struct Magics {
    pub bishop: MagicTable,
    pub rook: MagicTable,
}

impl Magics {
    fn build() -> Self {
        let mut rng = Xorshift::new(0x1234_5678_ABCD_EF01);
        let bishop = build_table(false, &mut rng);
        let rook = build_table(true, &mut rng);
        log::debug!(
            "magic tables built: bishop {} entries, rook {} entries",
            bishop.attacks.len(),
            rook.attacks.len()
        );
        Self { bishop, rook }
    }
}

fn build_table(is_rook: bool, rng: &mut Xorshift) -> MagicTable {
    let mut table = MagicTable {
        mask: [0; 64],
        magic: [0; 64],
        shift: [0; 64],
        offset: [0; 64],
        attacks: Vec::new(),
    };

    for sq in 0..64u8 {
        let mask = if is_rook { rook_mask(sq) } else { bishop_mask(sq) };
        let bits = popcount(mask);

        let (occupancies, attack_sets) = enumerate_subsets(sq, mask, is_rook);
        let magic = find_magic(bits, &occupancies, &attack_sets, rng);

        let s = sq as usize;
        table.mask[s] = mask;
        table.magic[s] = magic;
        table.shift[s] = 64 - bits;
        table.offset[s] = table.attacks.len();

        let size = 1usize << bits;
        table.attacks.resize(table.offset[s] + size, 0);
        for (occ, atk) in occupancies.iter().zip(&attack_sets) {
            let idx = (occ.wrapping_mul(magic) >> table.shift[s]) as usize;
            table.attacks[table.offset[s] + idx] = *atk;
        }
    }

    table
}

/// All subsets of `mask` via Carry-Rippler iteration, paired with their
/// slow ray attacks.
fn enumerate_subsets(sq: Square, mask: Bitboard, is_rook: bool) -> (Vec<Bitboard>, Vec<Bitboard>) {
    let mut occupancies = Vec::new();
    let mut attack_sets = Vec::new();
    let mut sub: Bitboard = 0;
    loop {
        occupancies.push(sub);
        attack_sets.push(if is_rook {
            rook_attacks_slow(sq, sub)
        } else {
            bishop_attacks_slow(sq, sub)
        });
        sub = sub.wrapping_sub(mask) & mask;
        if sub == 0 {
            break;
        }
    }
    (occupancies, attack_sets)
}

const MAX_MAGIC_ATTEMPTS: u32 = 100_000_000;

fn find_magic(
    bits: u32,
    occupancies: &[Bitboard],
    attack_sets: &[Bitboard],
    rng: &mut Xorshift,
) -> u64 {
    let size = 1usize << bits;
    let mask = occupancies.iter().fold(0, |acc, &o| acc | o);
    let mut used = vec![0u64; size];
    let mut filled = vec![false; size];

    for _ in 0..MAX_MAGIC_ATTEMPTS {
        let magic = rng.sparse();

        // Candidates whose high byte hashes poorly are rejected outright.
        if popcount(mask.wrapping_mul(magic) & 0xFF00_0000_0000_0000) < 6 {
            continue;
        }

        filled.iter_mut().for_each(|f| *f = false);

        let mut ok = true;
        for (occ, atk) in occupancies.iter().zip(attack_sets) {
            let idx = (occ.wrapping_mul(magic) >> (64 - bits)) as usize;
            if !filled[idx] {
                filled[idx] = true;
                used[idx] = *atk;
            } else if used[idx] != *atk {
                ok = false;
                break;
            }
            // A filled slot with identical attacks is a constructive
            // collision and perfectly fine.
        }
        if ok {
            return magic;
        }
    }

    panic!("magic search exhausted after {MAX_MAGIC_ATTEMPTS} attempts");
}

// ── Relevant occupancy masks ────────────────────────────────────────────────
// Ray squares that can block, excluding the board edge at the far end.

fn rook_mask(sq: Square) -> Bitboard {
    let (f0, r0) = (i32::from(sq) & 7, i32::from(sq) >> 3);
    let mut mask = 0;
    for f in f0 + 1..7 {
        set_bit(&mut mask, (r0 * 8 + f) as Square);
    }
    for f in 1..f0 {
        set_bit(&mut mask, (r0 * 8 + f) as Square);
    }
    for r in r0 + 1..7 {
        set_bit(&mut mask, (r * 8 + f0) as Square);
    }
    for r in 1..r0 {
        set_bit(&mut mask, (r * 8 + f0) as Square);
    }
    mask
}

fn bishop_mask(sq: Square) -> Bitboard {
    let (f0, r0) = (i32::from(sq) & 7, i32::from(sq) >> 3);
    let mut mask = 0;
    for (df, dr) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
        let (mut f, mut r) = (f0 + df, r0 + dr);
        while f > 0 && f < 7 && r > 0 && r < 7 {
            set_bit(&mut mask, (r * 8 + f) as Square);
            f += df;
            r += dr;
        }
    }
    mask
}

// ── Slow ray attacks (table construction and verification only) ─────────────

fn ray_attacks(sq: Square, occupancy: Bitboard, df: i32, dr: i32) -> Bitboard {
    let mut attacks = 0;
    let (mut f, mut r) = (i32::from(sq) & 7, i32::from(sq) >> 3);
    loop {
        f += df;
        r += dr;
        if !(0..8).contains(&f) || !(0..8).contains(&r) {
            break;
        }
        let s = (r * 8 + f) as Square;
        set_bit(&mut attacks, s);
        if test_bit(occupancy, s) {
            break;
        }
    }
    attacks
}

fn bishop_attacks_slow(sq: Square, occupancy: Bitboard) -> Bitboard {
    ray_attacks(sq, occupancy, 1, 1)
        | ray_attacks(sq, occupancy, 1, -1)
        | ray_attacks(sq, occupancy, -1, 1)
        | ray_attacks(sq, occupancy, -1, -1)
}

fn rook_attacks_slow(sq: Square, occupancy: Bitboard) -> Bitboard {
    ray_attacks(sq, occupancy, 1, 0)
        | ray_attacks(sq, occupancy, -1, 0)
        | ray_attacks(sq, occupancy, 0, 1)
        | ray_attacks(sq, occupancy, 0, -1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::square::{Square, SquareExt};
    use crate::utils::bitboard::square_bb;

    #[test]
    fn rook_on_empty_board() {
        let attacks = rook_attacks(Square::A1, 0);
        // Whole first rank plus the a-file, minus a1 itself.
        assert_eq!(popcount(attacks), 14);
        assert!(test_bit(attacks, Square::A8));
        assert!(test_bit(attacks, Square::H1));
        assert!(!test_bit(attacks, Square::A1));
    }

    #[test]
    fn rook_stops_at_blockers_inclusive() {
        let occ = square_bb(Square::D5) | square_bb(Square::F4);
        let attacks = rook_attacks(Square::D4, occ);
        assert!(test_bit(attacks, Square::D5)); // blocker included
        assert!(!test_bit(attacks, Square::D6)); // beyond blocker excluded
        assert!(test_bit(attacks, Square::F4));
        assert!(!test_bit(attacks, Square::G4));
        assert!(test_bit(attacks, Square::A4));
        assert!(test_bit(attacks, Square::D1));
    }

    #[test]
    fn bishop_diagonals() {
        let attacks = bishop_attacks(Square::C1, 0);
        assert!(test_bit(attacks, Square::A3));
        assert!(test_bit(attacks, Square::H6));
        assert_eq!(popcount(attacks), 7);

        let occ = square_bb(Square::E3);
        let blocked = bishop_attacks(Square::C1, occ);
        assert!(test_bit(blocked, Square::E3));
        assert!(!test_bit(blocked, Square::F4));
    }

    #[test]
    fn queen_is_rook_and_bishop_union() {
        let occ = square_bb(Square::D6) | square_bb(Square::G4) | square_bb(Square::B2);
        for sq in [Square::D4, Square::A1, Square::H8, Square::E5] {
            assert_eq!(
                queen_attacks(sq, occ),
                rook_attacks(sq, occ) | bishop_attacks(sq, occ)
            );
        }
    }

    #[test]
    fn magic_lookup_matches_slow_rays_on_samples() {
        // Spot-check the table against the reference ray walker for a
        // handful of occupancies per square.
        let mut rng = Xorshift::new(0xDEAD_BEEF_CAFE_F00D);
        for sq in 0..64u8 {
            for _ in 0..16 {
                let occ = rng.next() & rng.next();
                assert_eq!(rook_attacks(sq, occ), rook_attacks_slow(sq, occ), "rook sq {sq}");
                assert_eq!(
                    bishop_attacks(sq, occ),
                    bishop_attacks_slow(sq, occ),
                    "bishop sq {sq}"
                );
            }
        }
    }

    #[test]
    fn init_is_idempotent() {
        init();
        let first = magics() as *const Magics;
        init();
        assert_eq!(first, magics() as *const Magics);
    }
}
