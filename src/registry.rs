//! Participant registry
//!
//! The authoritative set of currently connected participants, keyed by
//! username and guarded by a single lock. The map itself is never handed
//! out; callers get single entries or a snapshot.
//!
//! Lock order: the registry lock is never held while a participant lock
//! is taken.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ChatError;
use crate::participant::Participant;

/// Registry of connected participants
#[derive(Debug)]
pub struct Registry {
    /// username -> participant
    members: Mutex<HashMap<String, Arc<Participant>>>,
    /// Capacity given to every new participant's mailbox
    mailbox_capacity: usize,
}

impl Registry {
    /// Create an empty registry
    pub fn new(mailbox_capacity: usize) -> Self {
        Self {
            members: Mutex::new(HashMap::new()),
            mailbox_capacity,
        }
    }

    /// Register a new participant under `username`
    ///
    /// The uniqueness check and the insert happen under one lock
    /// acquisition. Usernames are compared exactly (case-sensitive).
    pub fn insert(&self, username: &str) -> Result<Arc<Participant>, ChatError> {
        if username.trim().is_empty() {
            return Err(ChatError::InvalidUsername);
        }

        let mut members = self.members.lock();
        if members.contains_key(username) {
            return Err(ChatError::UsernameTaken(username.to_string()));
        }

        let participant = Arc::new(Participant::new(username, self.mailbox_capacity));
        members.insert(username.to_string(), participant.clone());
        Ok(participant)
    }

    /// Remove `participant` if it is the one registered under its name
    ///
    /// Returns `false` when it was already removed, including when its
    /// username now belongs to a newer participant.
    pub fn remove(&self, participant: &Participant) -> bool {
        let mut members = self.members.lock();
        let registered = members
            .get(participant.username())
            .is_some_and(|current| current.id() == participant.id());
        if registered {
            members.remove(participant.username());
        }
        registered
    }

    /// Find the connected participant with this username
    pub fn lookup(&self, username: &str) -> Option<Arc<Participant>> {
        self.members.lock().get(username).cloned()
    }

    /// All registered participants at one instant
    pub fn snapshot(&self) -> Vec<Arc<Participant>> {
        self.members.lock().values().cloned().collect()
    }

    /// Check if a username is registered
    pub fn contains(&self, username: &str) -> bool {
        self.members.lock().contains_key(username)
    }

    /// Sorted list of registered usernames
    pub fn usernames(&self) -> Vec<String> {
        let mut names: Vec<String> = self.members.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered participants
    pub fn len(&self) -> usize {
        self.members.lock().len()
    }

    /// Check if nobody is registered
    pub fn is_empty(&self) -> bool {
        self.members.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let registry = Registry::new(8);

        let alice = registry.insert("alice").unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("alice"));

        let found = registry.lookup("alice").unwrap();
        assert_eq!(found.id(), alice.id());
        assert!(registry.lookup("bob").is_none());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let registry = Registry::new(8);
        registry.insert("alice").unwrap();

        assert_eq!(
            registry.insert("alice").unwrap_err(),
            ChatError::UsernameTaken("alice".to_string())
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_usernames_are_case_sensitive() {
        let registry = Registry::new(8);
        registry.insert("alice").unwrap();
        registry.insert("Alice").unwrap();

        assert_eq!(registry.usernames(), vec!["Alice", "alice"]);
    }

    #[test]
    fn test_blank_username_rejected() {
        let registry = Registry::new(8);

        assert_eq!(registry.insert("   ").unwrap_err(), ChatError::InvalidUsername);
        assert_eq!(registry.insert("").unwrap_err(), ChatError::InvalidUsername);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = Registry::new(8);
        let alice = registry.insert("alice").unwrap();

        assert!(registry.remove(&alice));
        assert!(!registry.remove(&alice));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_stale_remove_keeps_new_owner() {
        let registry = Registry::new(8);
        let old = registry.insert("alice").unwrap();
        registry.remove(&old);

        let new = registry.insert("alice").unwrap();
        assert!(!registry.remove(&old));
        assert_eq!(registry.lookup("alice").unwrap().id(), new.id());
    }

    #[test]
    fn test_snapshot_contains_everyone() {
        let registry = Registry::new(4);
        for name in ["alice", "bob", "carol"] {
            registry.insert(name).unwrap();
        }

        let mut names: Vec<String> = registry
            .snapshot()
            .iter()
            .map(|p| p.username().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
        assert!(registry.snapshot().iter().all(|p| p.capacity() == 4));
    }
}
