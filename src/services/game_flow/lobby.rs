//! Lobby events: room creation, joining/reconnecting, readiness, team
//! configuration, leaving, and transport disconnects.

use tracing::info;
use uuid::Uuid;

use super::GameFlowService;
use crate::errors::DomainError;
use crate::room::GameMode;

impl GameFlowService {
    pub(super) async fn create_room(
        &self,
        session: Uuid,
        name: &str,
        mode: GameMode,
    ) -> Result<String, DomainError> {
        let (code, slot) = self.rooms().create_room(session, name, mode)?;
        self.registry().bind(session, &code);
        let room = slot.room.lock().await;
        self.broadcast_room_update(&room);
        Ok(code)
    }

    pub(super) async fn join_room(
        &self,
        session: Uuid,
        code: &str,
        name: &str,
    ) -> Result<String, DomainError> {
        let slot = self.rooms().get(code).ok_or(DomainError::RoomNotFound)?;
        let mut room = slot.room.lock().await;
        let reconnected = room.join(session, name)?;
        self.registry().bind(session, &room.code);
        info!(
            room_code = %room.code,
            player = name,
            reconnected,
            "Player joined room"
        );
        self.broadcast_room_update(&room);
        if reconnected {
            // The rejoining client needs the live snapshot; everyone else
            // sees the seat come back.
            self.broadcast_game_state(&room);
        }
        Ok(room.code.clone())
    }

    pub(super) async fn toggle_ready(
        &self,
        session: Uuid,
        code: &str,
    ) -> Result<(), DomainError> {
        let slot = self.rooms().get(code).ok_or(DomainError::RoomNotFound)?;
        let mut room = slot.room.lock().await;
        room.toggle_ready(session)?;
        self.broadcast_room_update(&room);
        Ok(())
    }

    pub(super) async fn set_game_mode(
        &self,
        session: Uuid,
        code: &str,
        mode: GameMode,
    ) -> Result<(), DomainError> {
        let slot = self.rooms().get(code).ok_or(DomainError::RoomNotFound)?;
        let mut room = slot.room.lock().await;
        if room.player(session).is_none() {
            return Err(DomainError::NotInRoom);
        }
        room.set_game_mode(mode)?;
        self.broadcast_room_update(&room);
        Ok(())
    }

    pub(super) async fn assign_team(
        &self,
        session: Uuid,
        code: &str,
        player_name: &str,
        team_name: &str,
    ) -> Result<(), DomainError> {
        let slot = self.rooms().get(code).ok_or(DomainError::RoomNotFound)?;
        let mut room = slot.room.lock().await;
        if room.player(session).is_none() {
            return Err(DomainError::NotInRoom);
        }
        room.assign_team(player_name, team_name)?;
        self.broadcast_room_update(&room);
        Ok(())
    }

    pub(super) async fn update_teams(
        &self,
        session: Uuid,
        code: &str,
        num_teams: usize,
    ) -> Result<(), DomainError> {
        let slot = self.rooms().get(code).ok_or(DomainError::RoomNotFound)?;
        let mut room = slot.room.lock().await;
        if room.player(session).is_none() {
            return Err(DomainError::NotInRoom);
        }
        room.update_teams(num_teams)?;
        self.broadcast_room_update(&room);
        Ok(())
    }

    pub(super) async fn leave_room(
        &self,
        session: Uuid,
        code: &str,
    ) -> Result<(), DomainError> {
        let slot = self.rooms().get(code).ok_or(DomainError::RoomNotFound)?;
        let mut room = slot.room.lock().await;
        if room.started {
            // Mid-game the seat is retained as disconnected so the player
            // can come back under the same name; leave-game is the
            // explicit removal.
            if !room.mark_disconnected(session) {
                return Err(DomainError::NotInRoom);
            }
            self.registry().unbind(session);
            self.broadcast_room_update(&room);
            drop(room);
            self.schedule_disconnect_check(code);
            return Ok(());
        }

        if room.remove_entry(session).is_none() {
            return Err(DomainError::NotInRoom);
        }
        self.registry().unbind(session);
        if room.is_empty() {
            self.rooms().remove(&room.code);
        } else {
            self.broadcast_room_update(&room);
        }
        Ok(())
    }

    /// Transport-level disconnect. Lobby seats vanish; mid-game seats are
    /// retained as disconnected and the auto-progress check is armed after
    /// a reconnection grace period.
    pub async fn handle_disconnect(&self, session: Uuid) {
        let code = match self.registry().unregister_connection(session) {
            Some(code) => code,
            None => match self.rooms().find_player_room(session).await {
                Some((code, _)) => code,
                None => return,
            },
        };
        let Some(slot) = self.rooms().get(&code) else {
            return;
        };
        let mut room = slot.room.lock().await;
        if !room.mark_disconnected(session) {
            return;
        }
        info!(room_code = %room.code, session_id = %session, "Player disconnected");

        if room.is_empty() {
            self.rooms().remove(&room.code);
            return;
        }
        self.broadcast_room_update(&room);
        if room.started {
            drop(room);
            self.schedule_disconnect_check(&code);
        }
    }
}
