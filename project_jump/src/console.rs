use std::sync::Arc;

use session::SessionRegistry;
use space::{BlockPos, PlayerId};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shutdown::ShutdownRx;

/// Operator command read from the server console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Connect a player, optionally at a given cell.
    Join { player: PlayerId, at: Option<BlockPos> },
    /// Disconnect a player, ending any run.
    Leave { player: PlayerId },
    Start { player: PlayerId },
    Stop { player: PlayerId },
    Teleport { player: PlayerId, pos: BlockPos },
    Status,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

/// Console task -> tick thread.
pub type CommandTx = mpsc::UnboundedSender<ConsoleCommand>;
pub type CommandRx = mpsc::UnboundedReceiver<ConsoleCommand>;

/// A UUID token names that player directly; anything else is a player name.
pub fn parse_player(token: &str) -> PlayerId {
    match Uuid::parse_str(token) {
        Ok(id) => PlayerId::new(id),
        Err(_) => PlayerId::from_name(token),
    }
}

fn parse_pos(coords: &[&str]) -> Result<BlockPos, ConsoleError> {
    let mut parsed = [0i32; 3];
    for (slot, raw) in parsed.iter_mut().zip(coords) {
        *slot = raw
            .parse()
            .map_err(|_| ConsoleError::InvalidCoordinate(raw.to_string()))?;
    }
    Ok(BlockPos::new(parsed[0], parsed[1], parsed[2]))
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, ConsoleError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = parts.split_first() else {
        return Err(ConsoleError::Empty);
    };

    match (verb.to_ascii_lowercase().as_str(), args) {
        ("join", [name]) => Ok(ConsoleCommand::Join {
            player: parse_player(name),
            at: None,
        }),
        ("join", [name, coords @ ..]) if coords.len() == 3 => Ok(ConsoleCommand::Join {
            player: parse_player(name),
            at: Some(parse_pos(coords)?),
        }),
        ("join", _) => Err(ConsoleError::Usage("join <player> [x y z]")),
        ("leave", [name]) => Ok(ConsoleCommand::Leave {
            player: parse_player(name),
        }),
        ("leave", _) => Err(ConsoleError::Usage("leave <player>")),
        ("start", [name]) => Ok(ConsoleCommand::Start {
            player: parse_player(name),
        }),
        ("start", _) => Err(ConsoleError::Usage("start <player>")),
        ("stop", [name]) => Ok(ConsoleCommand::Stop {
            player: parse_player(name),
        }),
        ("stop", _) => Err(ConsoleError::Usage("stop <player>")),
        ("tp", [name, coords @ ..]) if coords.len() == 3 => Ok(ConsoleCommand::Teleport {
            player: parse_player(name),
            pos: parse_pos(coords)?,
        }),
        ("tp", _) => Err(ConsoleError::Usage("tp <player> <x> <y> <z>")),
        ("status", []) => Ok(ConsoleCommand::Status),
        ("status", _) => Err(ConsoleError::Usage("status")),
        (other, _) => Err(ConsoleError::Unknown(other.to_string())),
    }
}

/// Log one line per active run.
pub fn log_status(registry: &SessionRegistry) {
    let players = registry.player_ids();
    tracing::info!(active = players.len(), "jump and run status");
    for player in players {
        let summary = registry.with_session(player, |s| {
            (s.score, s.current_platform, s.next_platform, s.stalled)
        });
        if let Some((score, current, next, stalled)) = summary {
            tracing::info!(
                player = %player,
                score,
                current = %current,
                next = %next,
                stalled,
                "run"
            );
        }
    }
}

/// Read console lines until EOF or shutdown.
///
/// `status` is answered here from the shared registry; every other command
/// is forwarded to the tick thread.
pub async fn run_console<R>(
    reader: R,
    commands: CommandTx,
    registry: Arc<SessionRegistry>,
    mut shutdown: ShutdownRx,
) where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        let line = tokio::select! {
            _ = shutdown.wait() => break,
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!("console input closed");
                break;
            }
            Err(e) => {
                tracing::warn!("console read error: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(ConsoleCommand::Status) => log_status(&registry),
            Ok(command) => {
                if commands.send(command).is_err() {
                    tracing::warn!("tick thread gone, console stopping");
                    break;
                }
            }
            Err(e) => tracing::warn!(line = %line, "{}", e),
        }
    }
}
