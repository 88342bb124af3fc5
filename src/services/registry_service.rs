use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::question::GameSnapshot;
use crate::services::session_service::SessionEngine;
use crate::utils::clock::Clock;

#[derive(Default)]
struct RegistryInner {
    by_game: HashMap<Uuid, Arc<SessionEngine>>,
    by_session: HashMap<Uuid, Arc<SessionEngine>>,
    by_player: HashMap<Uuid, Uuid>,
}

/// Maps game, session, and player identifiers to engines, and enforces the
/// one rule that spans sessions: a game has at most one active session.
/// Ended sessions stay resolvable so results pages keep working.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RwLock<RegistryInner>>,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RegistryInner::default())),
            clock,
        }
    }

    /// Create and register a session over the given snapshot. The active
    /// check and the insert happen under one write lock, so two concurrent
    /// starts for the same game cannot both succeed.
    pub fn start(&self, snapshot: GameSnapshot) -> Result<Uuid> {
        if snapshot.questions.is_empty() {
            return Err(Error::BadRequest(
                "Cannot start a session for a game with no questions".into(),
            ));
        }
        let mut inner = self.write();
        if let Some(existing) = inner.by_game.get(&snapshot.game_id) {
            if existing.with_state(|state| state.active) {
                return Err(Error::AlreadyActive);
            }
        }
        let engine = Arc::new(SessionEngine::new(snapshot, self.clock.clone()));
        let session_id = engine.session_id();
        inner.by_game.insert(engine.game_id(), engine.clone());
        inner.by_session.insert(session_id, engine);
        tracing::info!(%session_id, "session registered");
        Ok(session_id)
    }

    /// Admit a player and remember which session owns the id, so player
    /// endpoints can route on the player id alone.
    pub fn join(&self, session_id: Uuid, display_name: &str) -> Result<Uuid> {
        let engine = self.resolve_by_session(session_id)?;
        let player_id = engine.join(display_name)?;
        self.write().by_player.insert(player_id, session_id);
        Ok(player_id)
    }

    pub fn resolve_by_game(&self, game_id: Uuid) -> Result<Arc<SessionEngine>> {
        self.read()
            .by_game
            .get(&game_id)
            .cloned()
            .ok_or_else(|| Error::NotFound("No session for this game".into()))
    }

    pub fn resolve_by_session(&self, session_id: Uuid) -> Result<Arc<SessionEngine>> {
        self.read()
            .by_session
            .get(&session_id)
            .cloned()
            .ok_or_else(|| Error::NotFound("Unknown session id".into()))
    }

    pub fn resolve_by_player(&self, player_id: Uuid) -> Result<Arc<SessionEngine>> {
        let session_id = self
            .read()
            .by_player
            .get(&player_id)
            .copied()
            .ok_or_else(|| Error::NotFound("Unknown player id".into()))?;
        self.resolve_by_session(session_id)
    }

    /// Session id of the game's active session, if it has one.
    pub fn active_session_for_game(&self, game_id: Uuid) -> Option<Uuid> {
        let inner = self.read();
        let engine = inner.by_game.get(&game_id)?;
        engine
            .with_state(|state| state.active)
            .then(|| engine.session_id())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().expect("registry lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().expect("registry lock poisoned")
    }
}
