//! Two-slot killer move table, indexed by ply.

use crate::game::moves::Move;

#[derive(Clone)]
pub struct KillerMoves {
    killers: Vec<[Move; 2]>,
}

impl KillerMoves {
    pub fn new(max_ply: usize) -> Self {
        Self {
            killers: vec![[Move::default(); 2]; max_ply],
        }
    }

    /// Record a quiet cutoff move. The previous primary shifts to the
    /// secondary slot; re-recording the primary is a no-op.
    pub fn record(&mut self, ply: usize, m: Move) {
        let Some(slots) = self.killers.get_mut(ply) else {
            return;
        };
        if slots[0] == m {
            return;
        }
        slots[1] = slots[0];
        slots[0] = m;
    }

    pub fn get(&self, ply: usize) -> [Move; 2] {
        self.killers
            .get(ply)
            .copied()
            .unwrap_or([Move::default(); 2])
    }

    pub fn clear(&mut self) {
        self.killers.fill([Move::default(); 2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::square::{Square, SquareExt};

    #[test]
    fn record_shifts_slots() {
        let mut killers = KillerMoves::new(8);
        let first = Move::new(Square::E2, Square::E4);
        let second = Move::new(Square::D2, Square::D4);

        killers.record(3, first);
        assert_eq!(killers.get(3), [first, Move::default()]);

        killers.record(3, second);
        assert_eq!(killers.get(3), [second, first]);

        // Re-recording the primary changes nothing.
        killers.record(3, second);
        assert_eq!(killers.get(3), [second, first]);
    }

    #[test]
    fn out_of_range_ply_is_ignored() {
        let mut killers = KillerMoves::new(4);
        killers.record(100, Move::new(Square::E2, Square::E4));
        assert_eq!(killers.get(100), [Move::default(); 2]);
    }
}
