use crate::GameError;
use crate::PairKey;
use crate::PlayerId;
use crate::Session;
use std::collections::HashMap;

/// Live sessions keyed by their unordered player pair.
///
/// Creation enforces at most one session per player, which subsumes the
/// exact-pair guard and keeps player lookup unambiguous. Removal is
/// idempotent: the timeout and command paths may race to tear down the
/// same session, and whichever arrives second finds nothing to do.
#[derive(Debug, Default)]
pub struct Registry {
    sessions: HashMap<PairKey, Session>,
}

impl Registry {
    /// Registers a new session, rejecting it while either player is seated.
    pub fn create(&mut self, session: Session) -> Result<&mut Session, GameError> {
        let pair = session.pair();
        let [a, b] = pair.players();
        if self.key_of(a).is_some() || self.key_of(b).is_some() {
            return Err(GameError::SessionAlreadyActive);
        }
        Ok(self.sessions.entry(pair).or_insert(session))
    }
    /// The pair a player is currently seated in, if any.
    pub fn key_of(&self, player: PlayerId) -> Option<PairKey> {
        self.sessions.keys().copied().find(|k| k.contains(player))
    }
    pub fn get(&self, pair: PairKey) -> Option<&Session> {
        self.sessions.get(&pair)
    }
    pub fn get_mut(&mut self, pair: PairKey) -> Option<&mut Session> {
        self.sessions.get_mut(&pair)
    }
    /// Removes and returns the session for destruction; absent pairs are
    /// a no-op, not an error.
    pub fn remove(&mut self, pair: PairKey) -> Option<Session> {
        self.sessions.remove(&pair)
    }
    pub fn contains(&self, pair: PairKey) -> bool {
        self.sessions.contains_key(&pair)
    }
    pub fn len(&self) -> usize {
        self.sessions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
