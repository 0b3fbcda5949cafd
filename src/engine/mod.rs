//! Engine facade: a transposition table plus the search, behind a
//! narrow API a host binding can wrap.

pub mod evaluate;
pub mod history;
pub mod killer;
pub mod search;
pub mod table;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ParseError;
use crate::game::position::Position;
use crate::engine::search::{Search, SearchLimits, SearchResult};
use crate::engine::table::TranspositionTable;

/// Cloneable handle for cancelling a running search from another
/// thread. The flag is polled at every node; cancellation is prompt
/// but not synchronous.
#[derive(Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Top-level engine: owns the transposition table and the cancel flag.
/// One search runs at a time; sequential searches share the table.
pub struct Engine {
    tt: TranspositionTable,
    cancel: Arc<AtomicBool>,
}

impl Engine {
    /// Create an engine with a transposition table of `tt_mb` mebibytes.
    pub fn new(tt_mb: usize) -> Self {
        Self {
            tt: TranspositionTable::new(tt_mb),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run a search on the given position. Resets the cancel flag, so a
    /// token obtained earlier only affects searches it overlaps.
    pub fn search(&mut self, pos: &mut Position, limits: SearchLimits) -> SearchResult {
        self.cancel.store(false, Ordering::Relaxed);
        Search::new(pos, &mut self.tt, limits, Arc::clone(&self.cancel)).run()
    }

    /// Parse a FEN and search it: the embeddable one-call surface.
    /// `time_limit_ms < 0` disables the time limit.
    pub fn search_fen(
        &mut self,
        fen: &str,
        max_depth: u32,
        time_limit_ms: i64,
    ) -> Result<SearchResult, ParseError> {
        let mut pos = Position::from_fen(fen)?;
        Ok(self.search(&mut pos, SearchLimits::new(max_depth, time_limit_ms)))
    }

    /// Request cancellation of the running search. Safe while idle.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// A handle that can cancel searches from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken(Arc::clone(&self.cancel))
    }

    /// Resize the transposition table. Clears it.
    pub fn set_tt_size(&mut self, mb: usize) {
        self.tt.resize(mb);
    }

    /// Clear the transposition table.
    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }
}
