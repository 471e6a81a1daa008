//! Global byte budget shared by every read in one run

/// Remaining allowance used when no global cap is configured
pub const UNLIMITED: u64 = 1 << 60;

/// Byte counter bounding total bytes read across a run
///
/// Owned by the traversal and passed by `&mut` into each capture, so it needs
/// no synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    remaining: u64,
}

impl Budget {
    /// Create a budget from an optional total cap (None = unlimited)
    pub fn new(total: Option<u64>) -> Self {
        Self {
            remaining: total.unwrap_or(UNLIMITED),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Number of bytes permitted for a read of `requested` bytes
    pub fn reserve(&self, requested: u64) -> u64 {
        requested.min(self.remaining)
    }

    /// Consume bytes actually retained by a read
    pub fn debit(&mut self, used: u64) {
        self.remaining = self.remaining.saturating_sub(used);
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::unlimited()
    }
}
