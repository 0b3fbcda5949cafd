//! Transposition table: a power-of-two array of 16-byte entries with
//! an age counter for cross-search replacement.

use crate::game::moves::Move;

/// Kind of score a TT entry holds. `None` marks an empty slot.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[repr(u8)]
pub enum Bound {
    #[default]
    None = 0,
    /// Exact minimax score (PV node).
    Exact = 1,
    /// Fail-high: score is a lower bound.
    Lower = 2,
    /// Fail-low: score is an upper bound.
    Upper = 3,
}

/// One table slot. The upper 32 bits of the Zobrist key act as a
/// verification tag; index bits come from the lower half.
#[derive(Copy, Clone, Debug, Default)]
pub struct TTEntry {
    pub key32: u32,
    pub score: i16,
    pub static_eval: i16,
    pub best_move: Move,
    pub depth: u8,
    pub bound: Bound,
    pub age: u8,
}

// Entries are packed to a cache-friendly 16 bytes.
const _: () = assert!(std::mem::size_of::<TTEntry>() == 16);

pub struct TranspositionTable {
    entries: Vec<TTEntry>,
    mask: usize,
    age: u8,
}

impl TranspositionTable {
    pub const DEFAULT_SIZE_MB: usize = 64;
    const MIN_ENTRIES: usize = 1024;

    /// Build a table of roughly `mb` mebibytes, rounded down to a
    /// power-of-two entry count with a floor of 1024 entries.
    pub fn new(mb: usize) -> Self {
        let mut table = Self {
            entries: Vec::new(),
            mask: 0,
            age: 0,
        };
        table.resize(mb);
        table
    }

    /// Resize and clear the table.
    pub fn resize(&mut self, mb: usize) {
        let bytes = mb.max(1) * 1024 * 1024;
        let requested = bytes / std::mem::size_of::<TTEntry>();
        // Round down to a power of two so the index mask works.
        let count = if requested.is_power_of_two() {
            requested
        } else {
            requested.next_power_of_two() / 2
        }
        .max(Self::MIN_ENTRIES);

        self.entries = vec![TTEntry::default(); count];
        self.mask = count - 1;
        self.age = 0;
    }

    /// Zero all entries and reset the age.
    pub fn clear(&mut self) {
        self.entries.fill(TTEntry::default());
        self.age = 0;
    }

    /// Start a new search generation. The 8-bit age wraps freely;
    /// staleness is an equality check, not an ordering.
    pub fn new_search(&mut self) {
        self.age = self.age.wrapping_add(1);
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        key as usize & self.mask
    }

    #[inline]
    fn tag(key: u64) -> u32 {
        (key >> 32) as u32
    }

    /// Look up an entry; a hit needs a non-empty slot with matching tag.
    pub fn probe(&self, key: u64) -> Option<TTEntry> {
        let slot = &self.entries[self.index(key)];
        if slot.bound != Bound::None && slot.key32 == Self::tag(key) {
            Some(*slot)
        } else {
            None
        }
    }

    /// Store an entry, applying the replacement policy: replace empty
    /// slots, stale slots, shallower-or-equal slots, and non-exact
    /// slots losing to an exact entry.
    pub fn store(
        &mut self,
        key: u64,
        depth: u8,
        score: i16,
        bound: Bound,
        mut best_move: Move,
        static_eval: i16,
    ) {
        let age = self.age;
        let tag = Self::tag(key);
        let idx = self.index(key);
        let slot = &mut self.entries[idx];

        let should_replace = slot.bound == Bound::None
            || slot.age != age
            || depth >= slot.depth
            || (bound == Bound::Exact && slot.bound != Bound::Exact);
        if !should_replace {
            return;
        }

        // Keep a known best move rather than overwriting it with null.
        if slot.key32 == tag && best_move.is_null() && !slot.best_move.is_null() {
            best_move = slot.best_move;
        }

        *slot = TTEntry {
            key32: tag,
            score,
            static_eval,
            best_move,
            depth,
            bound,
            age,
        };
    }

    /// Per-mille of sampled slots that are filled with current-age
    /// entries. Samples at most the first 1000 slots.
    pub fn hashfull(&self) -> u32 {
        let sample = self.entries.len().min(1000);
        let used = self.entries[..sample]
            .iter()
            .filter(|e| e.bound != Bound::None && e.age == self.age)
            .count();
        (used * 1000 / sample) as u32
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn age(&self) -> u8 {
        self.age
    }
}
