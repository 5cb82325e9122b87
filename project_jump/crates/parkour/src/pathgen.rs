use rand::Rng;
use session::{GameSession, PlatformHistory};
use space::{BlockPos, Direction, World};

/// Longest horizontal jump. Jumps this long never rise.
pub const MAX_JUMP_DISTANCE: i32 = 4;

/// Outcome of one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    Placed(BlockPos),
    /// Every attempt was rejected; the session stays on its current platform.
    Stalled,
}

/// One random jump: a cardinal direction, 1..=4 blocks out, rising 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jump {
    pub direction: Direction,
    pub distance: i32,
    pub rise: i32,
}

impl Jump {
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let direction = Direction::HORIZONTAL[rng.gen_range(0..Direction::HORIZONTAL.len())];
        let distance = rng.gen_range(1..=MAX_JUMP_DISTANCE);
        let rise = if distance == MAX_JUMP_DISTANCE {
            0
        } else {
            rng.gen_range(0..=1)
        };
        Self {
            direction,
            distance,
            rise,
        }
    }

    pub fn apply(&self, from: BlockPos) -> BlockPos {
        from.offset(
            self.direction.offset_x() * self.distance,
            self.rise,
            self.direction.offset_z() * self.distance,
        )
    }
}

/// Pick the next platform cell without touching the world.
///
/// Rolls up to `max_attempts` jumps from `current`, rejecting cells in
/// `history` and cells `is_passable` refuses.
pub fn select_candidate<R, F>(
    rng: &mut R,
    current: BlockPos,
    history: &PlatformHistory,
    max_attempts: u32,
    mut is_passable: F,
) -> Generation
where
    R: Rng + ?Sized,
    F: FnMut(BlockPos) -> bool,
{
    for _ in 0..max_attempts {
        let candidate = Jump::roll(rng).apply(current);
        if history.contains(&candidate) || !is_passable(candidate) {
            continue;
        }
        return Generation::Placed(candidate);
    }
    Generation::Stalled
}

/// Generate and place the session's next platform.
///
/// A candidate must be passable in the world and accepted by `is_free`
/// (cells other runs still own). On success the block is placed in the
/// session's colour, recorded in its history and becomes `next_platform`.
/// On a stall nothing is placed and the session is flagged so the tick loop
/// retries.
pub fn next_platform<R, W, F>(
    rng: &mut R,
    session: &mut GameSession,
    world: &mut W,
    max_attempts: u32,
    mut is_free: F,
) -> Generation
where
    R: Rng + ?Sized,
    W: World + ?Sized,
    F: FnMut(BlockPos) -> bool,
{
    let outcome = select_candidate(
        rng,
        session.current_platform,
        &session.history,
        max_attempts,
        |pos| world.is_passable(pos) && is_free(pos),
    );

    match outcome {
        Generation::Placed(pos) => {
            world.set_block(pos, session.block_kind());
            session.history.push(pos);
            session.next_platform = pos;
            session.stalled = false;
        }
        Generation::Stalled => {
            if !session.stalled {
                tracing::warn!(
                    player = %session.player,
                    pos = %session.current_platform,
                    attempts = max_attempts,
                    "platform generation stalled"
                );
            }
            session.next_platform = session.current_platform;
            session.stalled = true;
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use space::{BlockKind, GlassColor, PlayerId, VoxelConfig, VoxelSpace};

    fn start() -> BlockPos {
        BlockPos::new(0, 200, 0)
    }

    fn session_at(pos: BlockPos) -> GameSession {
        GameSession::new(PlayerId::from_name("runner"), pos, GlassColor::Blue, 10, 0)
    }

    fn horizontal_distance(a: BlockPos, b: BlockPos) -> (i32, i32) {
        ((b.x - a.x).abs(), (b.z - a.z).abs())
    }

    #[test]
    fn long_jumps_are_flat() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut saw_rise = false;
        let mut saw_long = false;
        for _ in 0..5000 {
            let jump = Jump::roll(&mut rng);
            assert!((1..=MAX_JUMP_DISTANCE).contains(&jump.distance));
            assert!(jump.rise == 0 || jump.rise == 1);
            if jump.distance == MAX_JUMP_DISTANCE {
                saw_long = true;
                assert_eq!(jump.rise, 0);
            }
            saw_rise |= jump.rise == 1;
        }
        assert!(saw_rise && saw_long);
    }

    #[test]
    fn jump_moves_along_one_axis() {
        let jump = Jump {
            direction: Direction::West,
            distance: 3,
            rise: 1,
        };
        assert_eq!(jump.apply(start()), BlockPos::new(-3, 201, 0));

        let jump = Jump {
            direction: Direction::North,
            distance: 4,
            rise: 0,
        };
        assert_eq!(jump.apply(start()), BlockPos::new(0, 200, -4));
    }

    #[test]
    fn candidate_respects_history_and_passability() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut history = PlatformHistory::default();
        history.push(start());
        // History forbids every flat one-block jump, the predicate every +x cell.
        for d in Direction::HORIZONTAL {
            history.push(start().offset(d.offset_x(), 0, d.offset_z()));
        }
        let allowed = |pos: BlockPos| pos.x <= 0;

        for _ in 0..1000 {
            match select_candidate(&mut rng, start(), &history, 100, allowed) {
                Generation::Placed(pos) => {
                    assert!(!history.contains(&pos));
                    assert!(allowed(pos));
                    let (dx, dz) = horizontal_distance(start(), pos);
                    assert!(dx == 0 || dz == 0);
                    let distance = dx + dz;
                    assert!((1..=4).contains(&distance));
                    let rise = pos.y - start().y;
                    if distance == 4 {
                        assert_eq!(rise, 0);
                    } else {
                        assert!(rise == 0 || rise == 1);
                    }
                }
                Generation::Stalled => panic!("open directions remain"),
            }
        }
    }

    #[test]
    fn exhausted_attempts_stall() {
        let mut rng = StdRng::seed_from_u64(3);
        let history = PlatformHistory::default();
        let mut calls = 0;
        let outcome = select_candidate(&mut rng, start(), &history, 100, |_| {
            calls += 1;
            false
        });
        assert_eq!(outcome, Generation::Stalled);
        assert_eq!(calls, 100);
    }

    #[test]
    fn placed_platform_is_committed() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut world = VoxelSpace::new(VoxelConfig::default());
        let mut session = session_at(start());

        let outcome = next_platform(&mut rng, &mut session, &mut world, 100, |_| true);
        let Generation::Placed(pos) = outcome else {
            panic!("empty world never stalls");
        };
        assert_eq!(session.next_platform, pos);
        assert_eq!(session.history.latest(), Some(pos));
        assert_eq!(session.history.len(), 2);
        assert_eq!(world.block_at(pos), Some(BlockKind::StainedGlass(GlassColor::Blue)));
        assert!(!session.stalled);
    }

    #[test]
    fn refused_cells_are_never_built_on() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut world = VoxelSpace::new(VoxelConfig::default());
        // Another run still owns every cell west of the start column
        let owned_elsewhere = |pos: BlockPos| pos.x < 0;

        for _ in 0..200 {
            let mut session = session_at(start());
            match next_platform(&mut rng, &mut session, &mut world, 100, |pos| !owned_elsewhere(pos)) {
                Generation::Placed(pos) => {
                    assert!(!owned_elsewhere(pos));
                    world.clear_block(pos);
                }
                Generation::Stalled => panic!("three directions stay open"),
            }
        }
        assert_eq!(world.block_count(), 0);
    }

    #[test]
    fn walled_in_session_stalls_without_side_effects() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut world = VoxelSpace::new(VoxelConfig::default());
        world.fill(
            BlockPos::new(-4, 200, -4),
            BlockPos::new(4, 201, 4),
            BlockKind::Stone,
        );
        let mut session = session_at(start());
        let blocks_before = world.block_count();

        assert_eq!(next_platform(&mut rng, &mut session, &mut world, 100, |_| true), Generation::Stalled);
        assert!(session.stalled);
        assert_eq!(session.next_platform, session.current_platform);
        assert_eq!(session.history.len(), 1);
        assert_eq!(world.block_count(), blocks_before);

        // Terrain goes away: the retry succeeds and clears the flag.
        for x in -4..=4 {
            for y in 200..=201 {
                for z in -4..=4 {
                    world.clear_block(BlockPos::new(x, y, z));
                }
            }
        }
        assert!(matches!(
            next_platform(&mut rng, &mut session, &mut world, 100, |_| true),
            Generation::Placed(_)
        ));
        assert!(!session.stalled);
    }

    #[test]
    fn long_run_keeps_history_bounded_and_fresh() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut world = VoxelSpace::new(VoxelConfig::default());
        let mut session = session_at(start());
        world.set_block(start(), session.block_kind());

        for _ in 0..500 {
            let before: Vec<BlockPos> = session.history.iter().copied().collect();
            match next_platform(&mut rng, &mut session, &mut world, 100, |_| true) {
                Generation::Placed(pos) => {
                    assert!(!before.contains(&pos));
                    assert!(session.history.len() <= 10);
                    // Walk onto it like a player would.
                    let left = session.record_landing();
                    world.clear_block(left);
                }
                Generation::Stalled => panic!("open air never stalls"),
            }
        }
        assert_eq!(session.score, 500);
        assert_eq!(session.history.len(), 10);
    }
}
