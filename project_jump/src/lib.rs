pub mod config;
pub mod console;
pub mod server;
pub mod shutdown;
