//! Room membership registry.
//!
//! The registry maintains bidirectional mappings: room → member sessions
//! (for fan-out) and session → room (for cleanup on disconnect). This gives
//! O(1) lookups in both directions.
//!
//! A room exists exactly as long as it has members - the last leave deletes
//! the entry. A session belongs to at most one room at a time; joining a
//! second room moves the session rather than duplicating it.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

/// Outcome of removing a session from its room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// Room the session was removed from.
    pub room_key: String,
    /// Members still in the room after the removal. Empty means the room
    /// entry itself was deleted.
    pub remaining: Vec<Uuid>,
}

/// Tracks which sessions belong to which room.
///
/// The registry references sessions by id only; sockets are owned by the
/// runtime. All operations are total: leaving an unknown session or asking
/// for the members of an unknown room is a no-op, which keeps concurrent
/// disconnect races harmless.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room key → member sessions
    rooms: HashMap<String, HashSet<Uuid>>,
    /// Session → room key (reverse index)
    session_rooms: HashMap<Uuid, String>,
}

impl RoomRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session to a room, creating the room if absent.
    ///
    /// Joining the room the session is already in is a no-op. Joining a
    /// different room moves the session there. Returns `true` if membership
    /// changed.
    pub fn join(&mut self, room_key: &str, session_id: Uuid) -> bool {
        if self.session_rooms.get(&session_id).is_some_and(|r| r == room_key) {
            return false;
        }
        self.leave(session_id);

        self.rooms.entry(room_key.to_owned()).or_default().insert(session_id);
        self.session_rooms.insert(session_id, room_key.to_owned());
        true
    }

    /// Remove a session from its room via the reverse index.
    ///
    /// Deletes the room entry when the last member leaves. Returns `None`
    /// for sessions the registry does not know, so a double disconnect is
    /// safe.
    pub fn leave(&mut self, session_id: Uuid) -> Option<LeaveOutcome> {
        let room_key = self.session_rooms.remove(&session_id)?;

        let mut remaining = Vec::new();
        if let Some(members) = self.rooms.get_mut(&room_key) {
            members.remove(&session_id);
            if members.is_empty() {
                self.rooms.remove(&room_key);
            } else {
                remaining = members.iter().copied().collect();
            }
        }

        Some(LeaveOutcome { room_key, remaining })
    }

    /// All members of a room. Unknown room ⇒ empty.
    pub fn members(&self, room_key: &str) -> impl Iterator<Item = Uuid> + '_ {
        self.rooms.get(room_key).into_iter().flat_map(|s| s.iter().copied())
    }

    /// Room a session currently belongs to.
    pub fn room_of(&self, session_id: Uuid) -> Option<&str> {
        self.session_rooms.get(&session_id).map(String::as_str)
    }

    /// Check whether a room currently exists (i.e. has members).
    pub fn contains_room(&self, room_key: &str) -> bool {
        self.rooms.contains_key(room_key)
    }

    /// Check whether a session is a member of a room.
    pub fn is_member(&self, room_key: &str, session_id: Uuid) -> bool {
        self.rooms.get(room_key).is_some_and(|s| s.contains(&session_id))
    }

    /// Number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of members in a room. Unknown room ⇒ 0.
    pub fn member_count(&self, room_key: &str) -> usize {
        self.rooms.get(room_key).map_or(0, HashSet::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn join_and_lookup() {
        let mut registry = RoomRegistry::new();

        assert!(registry.join("abc", sid(1)));
        assert!(registry.is_member("abc", sid(1)));
        assert_eq!(registry.room_of(sid(1)), Some("abc"));
        assert!(!registry.is_member("abc", sid(2)));
    }

    #[test]
    fn duplicate_join_is_noop() {
        let mut registry = RoomRegistry::new();

        assert!(registry.join("abc", sid(1)));
        assert!(!registry.join("abc", sid(1)));
        assert_eq!(registry.member_count("abc"), 1);
    }

    #[test]
    fn join_second_room_moves_session() {
        let mut registry = RoomRegistry::new();

        registry.join("abc", sid(1));
        assert!(registry.join("def", sid(1)));

        assert_eq!(registry.room_of(sid(1)), Some("def"));
        assert!(!registry.contains_room("abc"));
        assert!(registry.is_member("def", sid(1)));
    }

    #[test]
    fn leave_reports_remaining_members() {
        let mut registry = RoomRegistry::new();

        registry.join("abc", sid(1));
        registry.join("abc", sid(2));

        let outcome = registry.leave(sid(1)).map(|o| (o.room_key, o.remaining));
        assert_eq!(outcome, Some(("abc".to_owned(), vec![sid(2)])));
    }

    #[test]
    fn last_leave_deletes_room() {
        let mut registry = RoomRegistry::new();

        registry.join("abc", sid(1));
        let outcome = registry.leave(sid(1));

        assert!(outcome.is_some_and(|o| o.remaining.is_empty()));
        assert!(!registry.contains_room("abc"));
        assert_eq!(registry.room_count(), 0);
        assert_eq!(registry.members("abc").count(), 0);
    }

    #[test]
    fn leave_unknown_session_is_noop() {
        let mut registry = RoomRegistry::new();

        assert!(registry.leave(sid(99)).is_none());

        registry.join("abc", sid(1));
        assert!(registry.leave(sid(99)).is_none());
        assert_eq!(registry.member_count("abc"), 1);
    }

    #[test]
    fn double_leave_is_noop() {
        let mut registry = RoomRegistry::new();

        registry.join("abc", sid(1));
        assert!(registry.leave(sid(1)).is_some());
        assert!(registry.leave(sid(1)).is_none());
    }

    #[test]
    fn members_snapshot_per_room() {
        let mut registry = RoomRegistry::new();

        registry.join("r1", sid(1));
        registry.join("r1", sid(2));
        registry.join("r2", sid(3));

        let r1: HashSet<Uuid> = registry.members("r1").collect();
        assert_eq!(r1, HashSet::from([sid(1), sid(2)]));
        assert_eq!(registry.members("r2").count(), 1);
        assert_eq!(registry.room_count(), 2);
    }
}
