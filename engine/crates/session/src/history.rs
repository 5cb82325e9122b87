use std::collections::VecDeque;

use space::BlockPos;

/// Default number of recent platforms a session remembers.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Fixed-capacity FIFO of recently visited platforms.
#[derive(Debug, Clone)]
pub struct PlatformHistory {
    entries: VecDeque<BlockPos>,
    capacity: usize,
}

impl PlatformHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a position, evicting and returning the oldest one when full.
    pub fn push(&mut self, pos: BlockPos) -> Option<BlockPos> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(pos);
        evicted
    }

    pub fn contains(&self, pos: &BlockPos) -> bool {
        self.entries.contains(pos)
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &BlockPos> + '_ {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<BlockPos> {
        self.entries.back().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for PlatformHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
