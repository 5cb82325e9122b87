use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable player identity. Serialized as the hyphenated UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Deterministic id derived from a display name (UUID v5).
    pub fn from_name(name: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 3D integer block coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn down(self) -> Self {
        self.offset(0, -1, 0)
    }

    pub fn up(self) -> Self {
        self.offset(0, 1, 0)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Horizontal cardinal direction. North is -z, east is +x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    pub const HORIZONTAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    pub fn offset_x(self) -> i32 {
        match self {
            Direction::West => -1,
            Direction::East => 1,
            Direction::North | Direction::South => 0,
        }
    }

    pub fn offset_z(self) -> i32 {
        match self {
            Direction::North => -1,
            Direction::South => 1,
            Direction::West | Direction::East => 0,
        }
    }
}

/// Stained glass colours used for platform blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GlassColor {
    White,
    LightGray,
    Gray,
    Black,
    Brown,
    Red,
    Orange,
    Yellow,
    Lime,
    Green,
    Cyan,
    LightBlue,
    Blue,
    Purple,
    Magenta,
    Pink,
}

impl GlassColor {
    pub const ALL: [GlassColor; 16] = [
        GlassColor::White,
        GlassColor::LightGray,
        GlassColor::Gray,
        GlassColor::Black,
        GlassColor::Brown,
        GlassColor::Red,
        GlassColor::Orange,
        GlassColor::Yellow,
        GlassColor::Lime,
        GlassColor::Green,
        GlassColor::Cyan,
        GlassColor::LightBlue,
        GlassColor::Blue,
        GlassColor::Purple,
        GlassColor::Magenta,
        GlassColor::Pink,
    ];
}

/// A solid block occupying one cell. Air is the absence of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Stone,
    StainedGlass(GlassColor),
}

/// The world the game runs in.
///
/// Every call is synchronous and must come from the thread that owns the
/// world (the tick thread).
pub trait World {
    /// True when the cell holds no block and lies inside the world.
    fn is_passable(&self, pos: BlockPos) -> bool;

    /// Place a block, replacing whatever was there.
    fn set_block(&mut self, pos: BlockPos, kind: BlockKind);

    /// Turn the cell into air. Clearing an empty cell is a no-op.
    fn clear_block(&mut self, pos: BlockPos);

    /// Cell occupied by a connected player, `None` when not connected.
    fn entity_position(&self, player: PlayerId) -> Option<BlockPos>;

    /// Move a connected player. Ignored for players that are not connected.
    fn teleport(&mut self, player: PlayerId, pos: BlockPos);
}
