use std::time::Instant;

use engine_core::tick::TickLoop;
use parkour::JumpAndRun;
use rand::Rng;
use session::NotificationRx;
use space::{VoxelSpace, World};

use crate::console::{log_status, CommandRx, ConsoleCommand};
use crate::shutdown::ShutdownRx;

/// Apply one console command to the world and the game. Tick thread only.
pub fn apply_command<R: Rng>(
    game: &mut JumpAndRun<R>,
    space: &mut VoxelSpace,
    command: ConsoleCommand,
    tick: u64,
) {
    match command {
        ConsoleCommand::Join { player, at } => {
            let pos = at.unwrap_or(game.config().neutral_position);
            space.connect(player, pos);
            tracing::info!(player = %player, pos = %pos, "player joined");
        }
        ConsoleCommand::Leave { player } => {
            game.on_stop_requested(space, player);
            if space.disconnect(player).is_some() {
                tracing::info!(player = %player, "player left");
            }
        }
        ConsoleCommand::Start { player } => {
            if !game.on_start_requested(space, player, tick) {
                tracing::warn!(player = %player, "cannot start run, player not connected");
            }
        }
        ConsoleCommand::Stop { player } => {
            game.on_stop_requested(space, player);
        }
        ConsoleCommand::Teleport { player, pos } => {
            if space.is_connected(player) {
                space.teleport(player, pos);
            } else {
                tracing::warn!(player = %player, "cannot teleport, player not connected");
            }
        }
        ConsoleCommand::Status => log_status(&game.registry()),
    }
}

/// Tick thread body: drain commands, step the game, sleep out the rest of
/// the tick. On shutdown every run is ended before returning.
pub fn run_tick_thread<R: Rng>(
    mut tick_loop: TickLoop<VoxelSpace>,
    mut game: JumpAndRun<R>,
    mut commands: CommandRx,
    shutdown_rx: ShutdownRx,
) -> (TickLoop<VoxelSpace>, JumpAndRun<R>) {
    let tick_duration = tick_loop.config.tick_duration();

    tracing::info!(tps = tick_loop.config.tps, "Jump tick loop running (Ctrl+C to stop)");

    loop {
        if let Some(reason) = shutdown_rx.reason() {
            let ended = game.shutdown(&mut tick_loop.space);
            tracing::info!(%reason, ended, "Jump tick loop: ending runs");
            break;
        }

        let tick_start = Instant::now();

        // 1. Console commands
        while let Ok(command) = commands.try_recv() {
            apply_command(&mut game, &mut tick_loop.space, command, tick_loop.current_tick);
        }

        // 2. Reconcile every run against player positions
        let metrics = tick_loop.step(&mut game);
        metrics.log();

        let elapsed = tick_start.elapsed();
        if elapsed < tick_duration {
            std::thread::sleep(tick_duration - elapsed);
        }
    }

    tracing::info!("Jump tick loop stopped");
    (tick_loop, game)
}

/// Stand-in for player chat: every notification becomes a log line.
pub async fn log_notifications(mut notifications: NotificationRx) {
    while let Some(notification) = notifications.recv().await {
        tracing::info!(
            player = %notification.player,
            kind = ?notification.kind,
            "notify"
        );
    }
}
