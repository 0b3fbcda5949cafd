//! History heuristic: quiet moves that caused beta cutoffs earn a
//! depth-squared bonus on a (side, from, to) table.

use crate::game::moves::Move;
use crate::game::pieces::Color;

const HISTORY_MAX: i32 = 8_000;

pub struct HistoryTable {
    scores: Box<[[[i32; 64]; 64]; 2]>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            scores: Box::new([[[0; 64]; 64]; 2]),
        }
    }

    #[inline]
    pub fn get(&self, side: Color, m: Move) -> i32 {
        self.scores[side as usize][m.from as usize][m.to as usize]
    }

    pub fn update(&mut self, side: Color, m: Move, depth: i32) {
        let slot = &mut self.scores[side as usize][m.from as usize][m.to as usize];
        *slot = (*slot + depth * depth).min(HISTORY_MAX);
    }

    pub fn clear(&mut self) {
        self.scores.fill([[0; 64]; 64]);
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}
