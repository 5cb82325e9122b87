use rand::Rng;
use space::{BlockPos, World};

use crate::config::ParkourConfig;

/// Pick a random start cell with air at the cell and below it, and that
/// `is_free` accepts.
///
/// Falls back to `(0, spawn_elevation, 0)` when every attempt fails, moved up
/// past any cells `is_free` refuses.
pub fn find_spawn<W, R, F>(world: &W, rng: &mut R, config: &ParkourConfig, mut is_free: F) -> BlockPos
where
    W: World + ?Sized,
    R: Rng + ?Sized,
    F: FnMut(BlockPos) -> bool,
{
    let radius = config.spawn_radius.abs();
    for _ in 0..config.spawn_attempts {
        let pos = BlockPos::new(
            rng.gen_range(-radius..=radius),
            config.spawn_elevation,
            rng.gen_range(-radius..=radius),
        );
        if world.is_passable(pos) && world.is_passable(pos.down()) && is_free(pos) {
            return pos;
        }
    }

    let base = BlockPos::new(0, config.spawn_elevation, 0);
    let fallback = (0..=config.spawn_attempts as i32)
        .map(|dy| base.offset(0, dy, 0))
        .find(|&pos| is_free(pos))
        .unwrap_or(base);
    tracing::warn!(
        attempts = config.spawn_attempts,
        pos = %fallback,
        "no free spawn found, using fallback"
    );
    fallback
}
