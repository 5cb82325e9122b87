pub mod model;
pub mod voxel_space;

pub use model::{BlockKind, BlockPos, Direction, GlassColor, PlayerId, World};
pub use voxel_space::{VoxelConfig, VoxelSpace};
