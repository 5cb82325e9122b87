pub mod claims;
pub mod config;
pub mod game;
pub mod pathgen;
pub mod spawn;

pub use claims::Claims;
pub use config::ParkourConfig;
pub use game::{JumpAndRun, TerminationCause};
pub use pathgen::{next_platform, select_candidate, Generation, Jump};
pub use spawn::find_spawn;
