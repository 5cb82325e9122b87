use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use space::PlayerId;

use crate::{GameSession, SessionState};

/// Shared handle to one registered session.
pub type SessionHandle = Arc<Mutex<GameSession>>;

/// What a snapshot visitor wants done with the visited session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Keep,
    Remove,
}

/// Lock a session, recovering the data if a previous holder panicked.
pub fn lock_session(handle: &SessionHandle) -> MutexGuard<'_, GameSession> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Concurrency-safe map of active sessions keyed by player.
///
/// Each session sits behind its own lock so a tick pass can work on one
/// session while start/stop handlers touch the map.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<BTreeMap<PlayerId, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, BTreeMap<PlayerId, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a session, returning the handle it displaced (if any).
    ///
    /// Never releases anything the displaced session owns; callers decide
    /// what to do with an existing session before creating a new one.
    pub fn create(&self, session: GameSession) -> Option<SessionHandle> {
        let player = session.player;
        self.map().insert(player, Arc::new(Mutex::new(session)))
    }

    pub fn get(&self, player: PlayerId) -> Option<SessionHandle> {
        self.map().get(&player).cloned()
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.map().contains_key(&player)
    }

    pub fn remove(&self, player: PlayerId) -> Option<SessionHandle> {
        self.map().remove(&player)
    }

    /// Run `f` against one session under its lock.
    pub fn with_session<T>(&self, player: PlayerId, f: impl FnOnce(&mut GameSession) -> T) -> Option<T> {
        let handle = self.get(player)?;
        let mut session = lock_session(&handle);
        Some(f(&mut session))
    }

    pub fn active_count(&self) -> usize {
        self.map().len()
    }

    /// Registered players in key order.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.map().keys().copied().collect()
    }

    /// Visit every session registered at call time, in key order.
    ///
    /// `f` runs without the map lock held. Sessions removed before their
    /// turn are skipped. `Visit::Remove` requests are applied after the pass,
    /// and only when the map still holds the visited session, so a session
    /// recreated mid-pass survives. Returns the number of sessions visited.
    pub fn for_each_snapshot<F>(&self, mut f: F) -> usize
    where
        F: FnMut(PlayerId, &mut GameSession) -> Visit,
    {
        let snapshot: Vec<(PlayerId, SessionHandle)> = self
            .map()
            .iter()
            .map(|(&id, handle)| (id, Arc::clone(handle)))
            .collect();

        let mut removals = Vec::new();
        let mut visited = 0;
        for (player, handle) in &snapshot {
            if !self.holds(*player, handle) {
                continue;
            }
            let mut session = lock_session(handle);
            if session.state == SessionState::Terminated {
                continue;
            }
            visited += 1;
            if f(*player, &mut *session) == Visit::Remove {
                removals.push((*player, handle));
            }
        }

        if !removals.is_empty() {
            let mut map = self.map();
            for (player, handle) in removals {
                let same = map
                    .get(&player)
                    .is_some_and(|current| Arc::ptr_eq(current, handle));
                if same {
                    map.remove(&player);
                }
            }
        }

        visited
    }

    fn holds(&self, player: PlayerId, handle: &SessionHandle) -> bool {
        self.map()
            .get(&player)
            .is_some_and(|current| Arc::ptr_eq(current, handle))
    }
}
