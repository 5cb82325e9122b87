use std::collections::BTreeMap;

use session::GameSession;
use space::{BlockPos, PlayerId};

/// Which run owns each platform cell across all active runs.
///
/// A run keeps a cell in its history after the block is gone, so world
/// passability alone cannot tell whether another run may build there.
#[derive(Debug, Default)]
pub struct Claims {
    cells: BTreeMap<BlockPos, PlayerId>,
}

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self, pos: BlockPos) -> Option<PlayerId> {
        self.cells.get(&pos).copied()
    }

    pub fn is_claimed(&self, pos: BlockPos) -> bool {
        self.cells.contains_key(&pos)
    }

    /// Unclaimed, or claimed by `player` itself.
    pub fn is_free_for(&self, pos: BlockPos, player: PlayerId) -> bool {
        self.owner(pos).map_or(true, |owner| owner == player)
    }

    /// Make the ledger match the session's current set of owned cells.
    /// Cells another run already holds are left with that run.
    pub fn sync(&mut self, session: &GameSession) {
        let owned = session.owned_platforms();
        let player = session.player;
        self.cells
            .retain(|pos, owner| *owner != player || owned.contains(pos));
        for pos in owned {
            self.cells.entry(pos).or_insert(player);
        }
    }

    /// Drop every claim held by `player`.
    pub fn release(&mut self, player: PlayerId) {
        self.cells.retain(|_, owner| *owner != player);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
