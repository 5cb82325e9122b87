pub mod history;
pub mod registry;

use std::collections::BTreeSet;

use serde::Serialize;
use space::{BlockKind, BlockPos, GlassColor, PlayerId};
use tokio::sync::mpsc;

pub use history::{PlatformHistory, DEFAULT_HISTORY_CAPACITY};
pub use registry::{lock_session, SessionHandle, SessionRegistry, Visit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    /// Momentary; the session is removed from the registry right after.
    Terminated,
}

/// One player's run, from start signal to termination.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub player: PlayerId,
    pub state: SessionState,
    /// Platform the player is expected to stand on.
    pub current_platform: BlockPos,
    /// Most recently generated, not yet reached platform.
    pub next_platform: BlockPos,
    pub history: PlatformHistory,
    pub score: u32,
    /// Colour shared by every platform of this run.
    pub block_variant: GlassColor,
    /// Last generation exhausted its retries; `next_platform` equals
    /// `current_platform` until a retry succeeds.
    pub stalled: bool,
    pub started_tick: u64,
}

impl GameSession {
    /// New run standing on `spawn`. The caller places the spawn block and
    /// generates the first real `next_platform`.
    pub fn new(
        player: PlayerId,
        spawn: BlockPos,
        block_variant: GlassColor,
        history_capacity: usize,
        started_tick: u64,
    ) -> Self {
        let mut history = PlatformHistory::new(history_capacity);
        history.push(spawn);
        Self {
            player,
            state: SessionState::Active,
            current_platform: spawn,
            next_platform: spawn,
            history,
            score: 0,
            block_variant,
            stalled: false,
            started_tick,
        }
    }

    pub fn block_kind(&self) -> BlockKind {
        BlockKind::StainedGlass(self.block_variant)
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// The player's feet are on the pending platform.
    pub fn is_landing(&self, feet: BlockPos) -> bool {
        !self.stalled && self.next_platform != self.current_platform && feet == self.next_platform
    }

    /// Fell more than `threshold` blocks below the current platform.
    pub fn has_fallen(&self, feet: BlockPos, threshold: i32) -> bool {
        feet.y < self.current_platform.y - threshold
    }

    /// Score a landing and advance onto the pending platform.
    /// Returns the platform the player left.
    pub fn record_landing(&mut self) -> BlockPos {
        let left = self.current_platform;
        self.score += 1;
        self.current_platform = self.next_platform;
        left
    }

    /// Every cell this session may have a block in.
    pub fn owned_platforms(&self) -> BTreeSet<BlockPos> {
        let mut cells: BTreeSet<BlockPos> = self.history.iter().copied().collect();
        cells.insert(self.current_platform);
        cells.insert(self.next_platform);
        cells
    }

    pub fn terminate(&mut self) {
        self.state = SessionState::Terminated;
    }
}

/// Game event addressed to one player. Rendering it is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub player: PlayerId,
    pub kind: NotificationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationKind {
    /// Run started; carries the player's stored best.
    SessionStarted { high_score: u32 },
    Scored { score: u32 },
    NewHighScore { score: u32 },
    GameOver { final_score: u32 },
}

impl Notification {
    pub fn new(player: PlayerId, kind: NotificationKind) -> Self {
        Self { player, kind }
    }
}

/// Sender from the tick thread to whatever delivers notifications.
pub type NotificationTx = mpsc::UnboundedSender<Notification>;
/// Receiver side of the notification channel.
pub type NotificationRx = mpsc::UnboundedReceiver<Notification>;
