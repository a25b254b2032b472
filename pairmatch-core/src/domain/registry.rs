use crate::domain::session::{Session, SessionId};
use std::collections::HashMap;

/// Holds one record per connected participant.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh record for `id`, replacing any stale one.
    pub fn register(&mut self, id: SessionId) {
        self.sessions.insert(id.clone(), Session::new(id));
    }

    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Delete the record. The caller must already have detached any
    /// peer or queue reference pointing at it.
    pub fn remove(&mut self, id: &SessionId) -> Option<Session> {
        self.sessions.remove(id)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_creates_fresh_record() {
        let mut registry = SessionRegistry::new();
        let id = SessionId::from("alice");
        registry.register(id.clone());

        let session = registry.get(&id).unwrap();
        assert_eq!(session.id, id);
        assert!(!session.is_paired());
    }

    #[test]
    fn reregistering_replaces_the_record() {
        let mut registry = SessionRegistry::new();
        let id = SessionId::from("alice");
        registry.register(id.clone());
        registry.get_mut(&id).unwrap().peer_id = Some(SessionId::from("bob"));

        registry.register(id.clone());
        assert_eq!(registry.len(), 1);
        assert!(!registry.get(&id).unwrap().is_paired());
    }

    #[test]
    fn remove_deletes_the_record() {
        let mut registry = SessionRegistry::new();
        let id = SessionId::from("alice");
        registry.register(id.clone());
        assert!(registry.remove(&id).is_some());
        assert!(!registry.contains(&id));
        assert!(registry.remove(&id).is_none());
    }
}
