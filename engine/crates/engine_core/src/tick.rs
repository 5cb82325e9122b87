use std::time::{Duration, Instant};

use space::World;

/// Tick loop configuration.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Ticks per second.
    pub tps: u32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self { tps: 20 }
    }
}

impl TickConfig {
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tps.max(1) as f64)
    }
}

/// Game logic driven once per world step.
pub trait TickSystem<W: World> {
    /// Advance one tick. Returns the number of sessions processed.
    fn run(&mut self, world: &mut W, tick: u64) -> usize;
}

/// Steps a `TickSystem` against the world it owns, so every world mutation
/// happens on the thread driving the steps. Pacing is up to the caller.
pub struct TickLoop<W: World> {
    pub space: W,
    pub config: TickConfig,
    pub current_tick: u64,
}

impl<W: World> TickLoop<W> {
    pub fn new(config: TickConfig, space: W) -> Self {
        Self {
            space,
            config,
            current_tick: 0,
        }
    }

    /// Execute a single tick of `system` against the world.
    pub fn step<S: TickSystem<W> + ?Sized>(&mut self, system: &mut S) -> observability::TickMetrics {
        let start = Instant::now();

        let session_count = system.run(&mut self.space, self.current_tick);

        self.current_tick += 1;
        let duration = start.elapsed();

        observability::TickMetrics {
            tick_number: self.current_tick,
            duration_us: duration.as_micros(),
            budget_us: self.config.tick_duration().as_micros(),
            session_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use space::{BlockKind, BlockPos, VoxelConfig, VoxelSpace};

    /// Places one stone block per tick at (tick, 0, 0).
    struct Builder {
        ticks_seen: Vec<u64>,
    }

    impl TickSystem<VoxelSpace> for Builder {
        fn run(&mut self, world: &mut VoxelSpace, tick: u64) -> usize {
            world.set_block(BlockPos::new(tick as i32, 0, 0), BlockKind::Stone);
            self.ticks_seen.push(tick);
            1
        }
    }

    fn make_tick_loop() -> TickLoop<VoxelSpace> {
        TickLoop::new(TickConfig { tps: 1000 }, VoxelSpace::new(VoxelConfig::default()))
    }

    #[test]
    fn tick_config_defaults() {
        let config = TickConfig::default();
        assert_eq!(config.tps, 20);
        let dur = config.tick_duration();
        assert!(dur.as_millis() >= 49 && dur.as_millis() <= 50);
    }

    #[test]
    fn zero_tps_does_not_divide_by_zero() {
        let config = TickConfig { tps: 0 };
        assert_eq!(config.tick_duration(), Duration::from_secs(1));
    }

    #[test]
    fn single_step() {
        let mut tick_loop = make_tick_loop();
        let mut system = Builder { ticks_seen: Vec::new() };
        let metrics = tick_loop.step(&mut system);
        assert_eq!(metrics.tick_number, 1);
        assert_eq!(metrics.session_count, 1);
        assert!(metrics.budget_us >= 999 && metrics.budget_us <= 1000);
        assert_eq!(system.ticks_seen, vec![0]);
        assert_eq!(tick_loop.space.block_count(), 1);
    }

    #[test]
    fn steps_count_up_from_zero() {
        let mut tick_loop = make_tick_loop();
        let mut system = Builder { ticks_seen: Vec::new() };
        let last = (0..10).map(|_| tick_loop.step(&mut system)).last().unwrap();
        assert_eq!(last.tick_number, 10);
        assert_eq!(tick_loop.current_tick, 10);
        assert_eq!(system.ticks_seen, (0..10).collect::<Vec<_>>());
        assert_eq!(tick_loop.space.block_count(), 10);
    }
}
