// Per-room presence registry with lazy TTL eviction.
//
// Rooms map user ids to their last heartbeat. Liveness is computed at query
// time against the caller's TTL; stale entries are removed by the query that
// discovers them, and a room disappears once its last entry is evicted.

pub mod sweeper;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use roomwatch_common::clock::{Clock, SystemClock};
use roomwatch_common::presence::{PresenceEntry, PresenceUser, DEFAULT_PRESENCE_TTL};
use tracing::debug;

type RoomEntries = HashMap<String, PresenceEntry>;

/// Shared presence store. One instance per relay process, wrapped in `Arc`.
///
/// All operations take a single global lock, so a list-and-evict pass over a
/// room can never interleave with a heartbeat for that room.
#[derive(Debug)]
pub struct PresenceRegistry<C: Clock = SystemClock> {
    rooms: Mutex<HashMap<String, RoomEntries>>,
    clock: C,
}

impl Default for PresenceRegistry<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl PresenceRegistry<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> PresenceRegistry<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { rooms: Mutex::new(HashMap::new()), clock }
    }

    /// Record a heartbeat for `user` in `room`.
    ///
    /// Room keys are opaque and stored as given; a key that is blank after
    /// trimming, or a user without an id, is ignored. A later heartbeat for
    /// the same `(room, user_id)` overwrites the earlier one.
    pub fn touch(&self, room: &str, user: &PresenceUser) {
        if room.trim().is_empty() {
            debug!("ignoring heartbeat without room key");
            return;
        }
        let Some(user) = user.normalize() else {
            debug!(room, "ignoring heartbeat without user id");
            return;
        };

        let now = self.clock.now();
        let mut rooms = self.lock();
        rooms
            .entry(room.to_string())
            .or_default()
            .insert(user.user_id.clone(), user.into_entry(now));
    }

    /// Live entries for `room`, most recently seen first.
    ///
    /// Entries older than `ttl` are deleted as part of the call, and the room
    /// itself is dropped once it holds no entries.
    pub fn list_active(&self, room: &str, ttl: Duration) -> Vec<PresenceEntry> {
        let now = self.clock.now();
        let mut rooms = self.lock();

        let Some(entries) = rooms.get_mut(room) else {
            return Vec::new();
        };

        let before = entries.len();
        entries.retain(|_, entry| entry.is_live_at(now, ttl));
        let evicted = before - entries.len();

        let mut active: Vec<PresenceEntry> = entries.values().cloned().collect();
        if entries.is_empty() {
            rooms.remove(room);
        }
        drop(rooms);

        if evicted > 0 {
            debug!(room, evicted, remaining = active.len(), "evicted stale presence entries");
        }

        active.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        active
    }

    /// [`list_active`](Self::list_active) with the 45 s default TTL.
    pub fn list_active_default(&self, room: &str) -> Vec<PresenceEntry> {
        self.list_active(room, DEFAULT_PRESENCE_TTL)
    }

    /// Evict expired entries across every room. Returns the number of entries removed.
    pub fn evict_expired(&self, ttl: Duration) -> usize {
        let now = self.clock.now();
        let mut rooms = self.lock();
        let mut evicted = 0;
        rooms.retain(|_, entries| {
            let before = entries.len();
            entries.retain(|_, entry| entry.is_live_at(now, ttl));
            evicted += before - entries.len();
            !entries.is_empty()
        });
        evicted
    }

    /// Number of rooms currently retained.
    pub fn room_count(&self) -> usize {
        self.lock().len()
    }

    pub fn contains_room(&self, room: &str) -> bool {
        self.lock().contains_key(room)
    }

    /// Stored entries for `room`, including ones that have expired but were not yet evicted.
    pub fn entry_count(&self, room: &str) -> usize {
        self.lock().get(room).map_or(0, HashMap::len)
    }

    // Every critical section is a plain map mutation, so state behind a
    // poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, RoomEntries>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
