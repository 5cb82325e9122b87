use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{BlockKind, BlockPos, PlayerId, World};

/// Configuration for a VoxelSpace instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoxelConfig {
    /// Lowest buildable Y (inclusive).
    pub min_y: i32,
    /// Highest buildable Y (inclusive).
    pub max_y: i32,
}

impl Default for VoxelConfig {
    fn default() -> Self {
        Self {
            min_y: -64,
            max_y: 319,
        }
    }
}

/// In-memory block world.
///
/// Horizontally unbounded, vertically bounded by `VoxelConfig`. All internal
/// structures use BTreeMap for deterministic iteration order.
#[derive(Debug, Default)]
pub struct VoxelSpace {
    config: VoxelConfig,
    /// Non-air cells.
    blocks: BTreeMap<BlockPos, BlockKind>,
    /// Connected player → occupied cell.
    players: BTreeMap<PlayerId, BlockPos>,
}

impl VoxelSpace {
    pub fn new(config: VoxelConfig) -> Self {
        Self {
            config,
            blocks: BTreeMap::new(),
            players: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &VoxelConfig {
        &self.config
    }

    pub fn in_bounds(&self, pos: BlockPos) -> bool {
        pos.y >= self.config.min_y && pos.y <= self.config.max_y
    }

    pub fn block_at(&self, pos: BlockPos) -> Option<BlockKind> {
        self.blocks.get(&pos).copied()
    }

    /// Number of non-air cells.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Fill the axis-aligned box between two corners (inclusive).
    pub fn fill(&mut self, from: BlockPos, to: BlockPos, kind: BlockKind) {
        for x in from.x.min(to.x)..=from.x.max(to.x) {
            for y in from.y.min(to.y)..=from.y.max(to.y) {
                for z in from.z.min(to.z)..=from.z.max(to.z) {
                    self.set_block(BlockPos::new(x, y, z), kind);
                }
            }
        }
    }

    /// Connect a player at the given cell. Reconnecting moves the player.
    pub fn connect(&mut self, player: PlayerId, pos: BlockPos) {
        self.players.insert(player, pos);
        tracing::debug!(player = %player, pos = %pos, "player connected");
    }

    /// Remove a player from the world, returning their last cell.
    pub fn disconnect(&mut self, player: PlayerId) -> Option<BlockPos> {
        let pos = self.players.remove(&player);
        if pos.is_some() {
            tracing::debug!(player = %player, "player disconnected");
        }
        pos
    }

    pub fn is_connected(&self, player: PlayerId) -> bool {
        self.players.contains_key(&player)
    }

    pub fn connected_players(&self) -> impl Iterator<Item = (PlayerId, BlockPos)> + '_ {
        self.players.iter().map(|(&id, &pos)| (id, pos))
    }
}

impl World for VoxelSpace {
    fn is_passable(&self, pos: BlockPos) -> bool {
        self.in_bounds(pos) && !self.blocks.contains_key(&pos)
    }

    fn set_block(&mut self, pos: BlockPos, kind: BlockKind) {
        if !self.in_bounds(pos) {
            tracing::warn!(pos = %pos, "ignoring block placement outside world bounds");
            return;
        }
        self.blocks.insert(pos, kind);
    }

    fn clear_block(&mut self, pos: BlockPos) {
        self.blocks.remove(&pos);
    }

    fn entity_position(&self, player: PlayerId) -> Option<BlockPos> {
        self.players.get(&player).copied()
    }

    fn teleport(&mut self, player: PlayerId, pos: BlockPos) {
        match self.players.get_mut(&player) {
            Some(slot) => *slot = pos,
            None => tracing::debug!(player = %player, "teleport ignored, player not connected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GlassColor;

    fn player(name: &str) -> PlayerId {
        PlayerId::from_name(name)
    }

    #[test]
    fn empty_space_is_passable() {
        let space = VoxelSpace::new(VoxelConfig::default());
        assert!(space.is_passable(BlockPos::new(0, 0, 0)));
        assert!(space.is_passable(BlockPos::new(-1000, 200, 1000)));
        assert_eq!(space.block_count(), 0);
    }

    #[test]
    fn out_of_bounds_is_not_passable() {
        let space = VoxelSpace::new(VoxelConfig::default());
        assert!(!space.is_passable(BlockPos::new(0, 320, 0)));
        assert!(!space.is_passable(BlockPos::new(0, -65, 0)));
        assert!(space.is_passable(BlockPos::new(0, 319, 0)));
        assert!(space.is_passable(BlockPos::new(0, -64, 0)));
    }

    #[test]
    fn set_and_clear_block() {
        let mut space = VoxelSpace::new(VoxelConfig::default());
        let pos = BlockPos::new(3, 100, -7);
        let kind = BlockKind::StainedGlass(GlassColor::Lime);

        space.set_block(pos, kind);
        assert!(!space.is_passable(pos));
        assert_eq!(space.block_at(pos), Some(kind));

        space.clear_block(pos);
        assert!(space.is_passable(pos));
        assert_eq!(space.block_at(pos), None);

        // Clearing air is a no-op
        space.clear_block(pos);
        assert_eq!(space.block_count(), 0);
    }

    #[test]
    fn set_block_outside_bounds_ignored() {
        let mut space = VoxelSpace::new(VoxelConfig { min_y: 0, max_y: 10 });
        space.set_block(BlockPos::new(0, 11, 0), BlockKind::Stone);
        assert_eq!(space.block_count(), 0);
    }

    #[test]
    fn fill_box_inclusive() {
        let mut space = VoxelSpace::new(VoxelConfig::default());
        space.fill(BlockPos::new(1, 1, 1), BlockPos::new(0, 0, 0), BlockKind::Stone);
        assert_eq!(space.block_count(), 8);
        assert!(!space.is_passable(BlockPos::new(1, 0, 1)));
        assert!(space.is_passable(BlockPos::new(2, 0, 0)));
    }

    #[test]
    fn connect_teleport_disconnect() {
        let mut space = VoxelSpace::new(VoxelConfig::default());
        let alice = player("alice");

        assert_eq!(space.entity_position(alice), None);
        space.connect(alice, BlockPos::new(0, 100, 0));
        assert!(space.is_connected(alice));

        space.teleport(alice, BlockPos::new(5, 201, 5));
        assert_eq!(space.entity_position(alice), Some(BlockPos::new(5, 201, 5)));

        assert_eq!(space.disconnect(alice), Some(BlockPos::new(5, 201, 5)));
        assert_eq!(space.entity_position(alice), None);
        assert_eq!(space.disconnect(alice), None);
    }

    #[test]
    fn teleport_unknown_player_is_ignored() {
        let mut space = VoxelSpace::new(VoxelConfig::default());
        let ghost = player("ghost");
        space.teleport(ghost, BlockPos::new(1, 2, 3));
        assert!(!space.is_connected(ghost));
        assert_eq!(space.connected_players().count(), 0);
    }

    #[test]
    fn players_do_not_block_cells() {
        let mut space = VoxelSpace::new(VoxelConfig::default());
        let pos = BlockPos::new(0, 100, 0);
        space.connect(player("bob"), pos);
        assert!(space.is_passable(pos));
    }

    #[test]
    fn block_pos_helpers() {
        let p = BlockPos::new(1, 2, 3);
        assert_eq!(p.down(), BlockPos::new(1, 1, 3));
        assert_eq!(p.up(), BlockPos::new(1, 3, 3));
        assert_eq!(p.offset(-1, 0, 4), BlockPos::new(0, 2, 7));
        assert_eq!(p.to_string(), "(1, 2, 3)");
    }

    #[test]
    fn player_id_from_name_is_stable() {
        assert_eq!(PlayerId::from_name("steve"), PlayerId::from_name("steve"));
        assert_ne!(PlayerId::from_name("steve"), PlayerId::from_name("alex"));
    }
}
