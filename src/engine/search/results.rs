use std::fmt;

use crate::game::moves::Move;

/// Outcome of a search: the best move from the last fully completed
/// iteration. `best_move` is `None` only for terminal root positions.
#[derive(Clone, Copy, Debug)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score_cp: i32,
    pub depth: u32,
    pub nodes: u64,
}

impl SearchResult {
    pub fn terminal(score_cp: i32) -> Self {
        Self {
            best_move: None,
            score_cp,
            depth: 0,
            nodes: 0,
        }
    }

    /// UCI rendering of the best move; empty for terminal positions.
    pub fn uci(&self) -> String {
        self.best_move.map(|m| m.uci()).unwrap_or_default()
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} score {} depth {} nodes {}",
            self.uci(),
            self.score_cp,
            self.depth,
            self.nodes
        )
    }
}
