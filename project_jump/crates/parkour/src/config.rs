use space::BlockPos;

/// Gameplay constants for one server.
#[derive(Debug, Clone)]
pub struct ParkourConfig {
    /// Recent platforms a new one may not land on.
    pub history_capacity: usize,
    /// Candidate rolls per generation before stalling.
    pub max_generation_attempts: u32,
    /// Random spawn attempts before falling back to (0, elevation, 0).
    pub spawn_attempts: u32,
    pub spawn_elevation: i32,
    /// Spawn x/z are drawn from [-radius, radius].
    pub spawn_radius: i32,
    /// Blocks below the current platform that count as a fall.
    pub fall_threshold: i32,
    /// Where players go after falling out of a run.
    pub neutral_position: BlockPos,
    /// Fixed RNG seed; random when None.
    pub seed: Option<u64>,
}

impl Default for ParkourConfig {
    fn default() -> Self {
        Self {
            history_capacity: session::DEFAULT_HISTORY_CAPACITY,
            max_generation_attempts: 100,
            spawn_attempts: 100,
            spawn_elevation: 200,
            spawn_radius: 50,
            fall_threshold: 5,
            neutral_position: BlockPos::new(0, 95, 0),
            seed: None,
        }
    }
}
