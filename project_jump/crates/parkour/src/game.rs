use std::sync::Arc;

use engine_core::TickSystem;
use persistence::HighScoreStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use session::{
    lock_session, GameSession, Notification, NotificationKind, NotificationTx, SessionRegistry, Visit,
};
use space::{BlockPos, GlassColor, PlayerId, World};

use crate::claims::Claims;
use crate::config::ParkourConfig;
use crate::pathgen::next_platform;
use crate::spawn::find_spawn;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationCause {
    /// Dropped below the fall threshold.
    Fell,
    /// Explicit stop (player left the server).
    Disconnected,
    /// Player no longer present at tick time.
    Vanished,
    /// Replaced by a fresh run for the same player.
    Restarted,
    /// Server shutting down.
    Shutdown,
}

impl TerminationCause {
    /// Whether the player is sent to the neutral position afterwards.
    pub fn relocates_player(self) -> bool {
        matches!(self, TerminationCause::Fell | TerminationCause::Shutdown)
    }
}

/// Jump-and-run service: owns every active run and the high score table.
pub struct JumpAndRun<R: Rng = StdRng> {
    config: ParkourConfig,
    registry: Arc<SessionRegistry>,
    high_scores: HighScoreStore,
    notifications: NotificationTx,
    claims: Claims,
    rng: R,
}

impl JumpAndRun<StdRng> {
    /// Seeded from `config.seed` when present, from OS entropy otherwise.
    pub fn new(config: ParkourConfig, high_scores: HighScoreStore, notifications: NotificationTx) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, high_scores, notifications, rng)
    }
}

impl<R: Rng> JumpAndRun<R> {
    pub fn with_rng(
        config: ParkourConfig,
        high_scores: HighScoreStore,
        notifications: NotificationTx,
        rng: R,
    ) -> Self {
        Self {
            config,
            registry: Arc::new(SessionRegistry::new()),
            high_scores,
            notifications,
            claims: Claims::new(),
            rng,
        }
    }

    pub fn config(&self) -> &ParkourConfig {
        &self.config
    }

    /// Shared view of the active runs, safe to read from other threads.
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn high_scores(&self) -> &HighScoreStore {
        &self.high_scores
    }

    /// Platform cells owned by active runs.
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Start a run for a connected player.
    ///
    /// A player already in a run has that run terminated (score kept,
    /// platforms cleared) before the new one starts. Returns false when the
    /// player is not connected.
    pub fn on_start_requested<W: World + ?Sized>(&mut self, world: &mut W, player: PlayerId, tick: u64) -> bool {
        if world.entity_position(player).is_none() {
            tracing::warn!(player = %player, "start requested for player not in world");
            return false;
        }

        if let Some(handle) = self.registry.get(player) {
            {
                let mut previous = lock_session(&handle);
                if previous.is_active() {
                    terminate(
                        &mut previous,
                        TerminationCause::Restarted,
                        world,
                        &mut self.claims,
                        &mut self.high_scores,
                        &self.notifications,
                        self.config.neutral_position,
                    );
                }
            }
            self.registry.remove(player);
        }

        let claims = &self.claims;
        let spawn = find_spawn(world, &mut self.rng, &self.config, |pos| !claims.is_claimed(pos));
        world.teleport(player, spawn.up());

        let variant = GlassColor::ALL[self.rng.gen_range(0..GlassColor::ALL.len())];
        let mut session = GameSession::new(player, spawn, variant, self.config.history_capacity, tick);
        world.set_block(spawn, session.block_kind());

        notify(
            &self.notifications,
            player,
            NotificationKind::SessionStarted {
                high_score: self.high_scores.get(player),
            },
        );

        self.claims.sync(&session);

        let claims = &self.claims;
        next_platform(
            &mut self.rng,
            &mut session,
            world,
            self.config.max_generation_attempts,
            |pos| claims.is_free_for(pos, player),
        );
        self.claims.sync(&session);

        tracing::info!(
            player = %player,
            spawn = %spawn,
            next = %session.next_platform,
            variant = ?variant,
            "jump and run started"
        );
        self.registry.create(session);
        true
    }

    /// End a player's run right away (disconnect). Returns false when the
    /// player had no run.
    pub fn on_stop_requested<W: World + ?Sized>(&mut self, world: &mut W, player: PlayerId) -> bool {
        let Some(handle) = self.registry.get(player) else {
            tracing::debug!(player = %player, "stop requested without active run");
            return false;
        };

        {
            let mut session = lock_session(&handle);
            if session.is_active() {
                terminate(
                    &mut session,
                    TerminationCause::Disconnected,
                    world,
                    &mut self.claims,
                    &mut self.high_scores,
                    &self.notifications,
                    self.config.neutral_position,
                );
            }
        }
        self.registry.remove(player);
        true
    }

    /// Terminate every run. Called once before the world goes away.
    pub fn shutdown<W: World + ?Sized>(&mut self, world: &mut W) -> usize {
        let Self {
            config,
            registry,
            high_scores,
            notifications,
            claims,
            ..
        } = self;

        let ended = registry.for_each_snapshot(|_, session| {
            terminate(
                session,
                TerminationCause::Shutdown,
                &mut *world,
                &mut *claims,
                &mut *high_scores,
                notifications,
                config.neutral_position,
            );
            Visit::Remove
        });
        tracing::info!(sessions = ended, "jump and run shut down");
        ended
    }
}

impl<R: Rng, W: World> TickSystem<W> for JumpAndRun<R> {
    fn run(&mut self, world: &mut W, _tick: u64) -> usize {
        let Self {
            config,
            registry,
            high_scores,
            notifications,
            claims,
            rng,
        } = self;

        registry.for_each_snapshot(|_, session| {
            reconcile(
                session,
                &mut *world,
                &mut *rng,
                config,
                &mut *claims,
                &mut *high_scores,
                notifications,
            )
        })
    }
}

/// Advance or end one run against the player's current position.
fn reconcile<W, R>(
    session: &mut GameSession,
    world: &mut W,
    rng: &mut R,
    config: &ParkourConfig,
    claims: &mut Claims,
    high_scores: &mut HighScoreStore,
    notifications: &NotificationTx,
) -> Visit
where
    W: World + ?Sized,
    R: Rng + ?Sized,
{
    let player = session.player;
    let Some(position) = world.entity_position(player) else {
        terminate(
            session,
            TerminationCause::Vanished,
            world,
            claims,
            high_scores,
            notifications,
            config.neutral_position,
        );
        return Visit::Remove;
    };

    if session.stalled {
        let held = &*claims;
        next_platform(rng, session, world, config.max_generation_attempts, |pos| {
            held.is_free_for(pos, player)
        });
        claims.sync(session);
    }

    let feet = position.down();
    if session.is_landing(feet) {
        let left = session.record_landing();
        if claims.is_free_for(left, player) {
            world.clear_block(left);
        }
        let held = &*claims;
        next_platform(rng, session, world, config.max_generation_attempts, |pos| {
            held.is_free_for(pos, player)
        });
        claims.sync(session);
        tracing::debug!(
            player = %player,
            score = session.score,
            next = %session.next_platform,
            "landed"
        );
        notify(
            notifications,
            player,
            NotificationKind::Scored {
                score: session.score,
            },
        );
        Visit::Keep
    } else if session.has_fallen(feet, config.fall_threshold) {
        terminate(
            session,
            TerminationCause::Fell,
            world,
            claims,
            high_scores,
            notifications,
            config.neutral_position,
        );
        Visit::Remove
    } else {
        Visit::Keep
    }
}

/// Settle the score, clear every platform the run owns and release the
/// player. Cells another active run has claimed are left alone. Leaves the
/// session Terminated; the caller removes it.
fn terminate<W>(
    session: &mut GameSession,
    cause: TerminationCause,
    world: &mut W,
    claims: &mut Claims,
    high_scores: &mut HighScoreStore,
    notifications: &NotificationTx,
    neutral_position: BlockPos,
) where
    W: World + ?Sized,
{
    let player = session.player;
    let score = session.score;

    if score > high_scores.get(player) {
        if let Err(e) = high_scores.record_if_higher(player, score) {
            tracing::warn!(player = %player, score, error = %e, "failed to persist high score");
        }
        notify(notifications, player, NotificationKind::NewHighScore { score });
    } else {
        notify(
            notifications,
            player,
            NotificationKind::GameOver { final_score: score },
        );
    }

    let mut cleared = 0;
    for pos in session.owned_platforms() {
        if claims.is_free_for(pos, player) {
            world.clear_block(pos);
            cleared += 1;
        }
    }
    claims.release(player);

    if cause.relocates_player() {
        world.teleport(player, neutral_position);
    }

    session.terminate();
    tracing::info!(
        player = %player,
        score,
        cause = ?cause,
        cleared,
        "jump and run ended"
    );
}

fn notify(tx: &NotificationTx, player: PlayerId, kind: NotificationKind) {
    let _ = tx.send(Notification::new(player, kind));
}
