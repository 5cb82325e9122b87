pub mod tick;

pub use tick::{TickConfig, TickLoop, TickSystem};
