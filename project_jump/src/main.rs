use engine_core::tick::TickLoop;
use parkour::JumpAndRun;
use persistence::HighScoreStore;
use space::VoxelSpace;

use project_jump::config::{CliArgs, ServerConfig};
use project_jump::console::run_console;
use project_jump::server::{log_notifications, run_tick_thread};
use project_jump::shutdown::{self, shutdown_channel, ShutdownRx};

#[tokio::main]
async fn main() {
    observability::init_logging();

    let config = match CliArgs::parse(std::env::args().skip(1)).and_then(|cli| ServerConfig::from_cli(&cli)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Jump Server starting...");

    let high_scores = match HighScoreStore::load(&config.persistence.highscore_path) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to load high scores: {}", e);
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let server = tokio::spawn(run_jump_server(config, high_scores, shutdown_rx));

    let reason = shutdown::wait_for_signal().await;
    tracing::info!(%reason, "stopping server");
    shutdown_tx.trigger(reason);

    if let Err(e) = server.await {
        tracing::error!("Server task failed: {}", e);
    }

    tracing::info!("Server stopped.");
    // The stdin reader may still be parked in a blocking read.
    std::process::exit(0);
}

async fn run_jump_server(config: ServerConfig, high_scores: HighScoreStore, shutdown_rx: ShutdownRx) {
    // Channels between async tasks and the tick thread
    let (notify_tx, notify_rx) = tokio::sync::mpsc::unbounded_channel();
    let (command_tx, command_rx) = tokio::sync::mpsc::unbounded_channel();

    let game = JumpAndRun::new(config.to_parkour_config(), high_scores, notify_tx);

    tokio::spawn(log_notifications(notify_rx));
    tokio::spawn(run_console(
        tokio::io::BufReader::new(tokio::io::stdin()),
        command_tx,
        game.registry(),
        shutdown_rx.clone(),
    ));

    tracing::info!("Console ready: join/leave/start/stop/tp/status");

    let tick_loop = TickLoop::new(config.to_tick_config(), VoxelSpace::new(config.to_voxel_config()));
    let tick_handle = std::thread::spawn(move || {
        run_tick_thread(tick_loop, game, command_rx, shutdown_rx);
    });

    // Join without blocking the runtime
    match tokio::task::spawn_blocking(move || tick_handle.join()).await {
        Ok(Ok(())) => {}
        Ok(Err(_)) => tracing::error!("Tick thread panicked"),
        Err(e) => tracing::error!("Failed to join tick thread: {}", e),
    }
}
