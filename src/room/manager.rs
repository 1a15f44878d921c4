//! The process-wide rooms table.
//!
//! The table itself needs only coarse synchronization (`DashMap`); each
//! room's inner state sits behind its own `tokio::sync::Mutex` so rooms
//! progress independently. Timer callbacks hold a room *code*, not a
//! pointer, so a lookup after deletion simply misses.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::errors::DomainError;
use crate::room::join_code::generate_room_code;
use crate::room::{GameMode, Room};

pub struct RoomSlot {
    pub room: Mutex<Room>,
}

#[derive(Default)]
pub struct RoomManager {
    rooms: DashMap<String, Arc<RoomSlot>>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Create a room with a fresh unique code and the host seated.
    pub fn create_room(
        &self,
        host_id: Uuid,
        host_name: &str,
        mode: GameMode,
    ) -> Result<(String, Arc<RoomSlot>), DomainError> {
        crate::room::validate_name(host_name)?;
        // Collisions are regenerated; entry() makes the claim atomic.
        loop {
            let code = generate_room_code();
            let entry = self.rooms.entry(code.clone());
            if let dashmap::mapref::entry::Entry::Vacant(vacant) = entry {
                let room = Room::new(code.clone(), host_id, host_name, mode);
                let slot = Arc::new(RoomSlot {
                    room: Mutex::new(room),
                });
                vacant.insert(slot.clone());
                info!(room_code = %code, host = host_name, "Room created");
                return Ok((code, slot));
            }
        }
    }

    pub fn get(&self, code: &str) -> Option<Arc<RoomSlot>> {
        self.rooms
            .get(&code.to_ascii_uppercase())
            .map(|r| r.value().clone())
    }

    pub fn remove(&self, code: &str) {
        if self.rooms.remove(code).is_some() {
            info!(room_code = %code, "Room deleted");
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Scan for the room holding this session. O(rooms × players), fine at
    /// this scale.
    pub async fn find_player_room(&self, session_id: Uuid) -> Option<(String, Arc<RoomSlot>)> {
        let slots: Vec<(String, Arc<RoomSlot>)> = self
            .rooms
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        for (code, slot) in slots {
            let room = slot.room.lock().await;
            if room.players.iter().any(|p| p.id == session_id) {
                drop(room);
                return Some((code, slot));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_and_lookup_room() {
        let manager = RoomManager::new();
        let host = Uuid::new_v4();
        let (code, _slot) = manager
            .create_room(host, "host", GameMode::Individual)
            .unwrap();
        assert_eq!(code.len(), 6);
        assert!(manager.get(&code).is_some());
        assert!(manager.get(&code.to_lowercase()).is_some());
        assert!(manager.get("NOSUCH").is_none());
    }

    #[tokio::test]
    async fn find_player_room_scans_all_rooms() {
        let manager = RoomManager::new();
        let host_a = Uuid::new_v4();
        let host_b = Uuid::new_v4();
        manager.create_room(host_a, "a", GameMode::Individual).unwrap();
        let (code_b, _) = manager.create_room(host_b, "b", GameMode::Individual).unwrap();

        let found = manager.find_player_room(host_b).await;
        assert_eq!(found.map(|(c, _)| c), Some(code_b));
        assert!(manager.find_player_room(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn remove_deletes_room() {
        let manager = RoomManager::new();
        let (code, _) = manager
            .create_room(Uuid::new_v4(), "host", GameMode::Individual)
            .unwrap();
        manager.remove(&code);
        assert!(manager.get(&code).is_none());
        assert_eq!(manager.room_count(), 0);
    }
}
