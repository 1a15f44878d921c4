//! In-game events: start, nil decisions, bids, card plays, round advance,
//! restart, end, and explicit mid-game leave.
//!
//! Host-only actions from non-hosts are ignored without error: the client
//! UI gates them, and a stale request must not disturb the game.

use rand::thread_rng;
use tracing::info;
use uuid::Uuid;

use super::GameFlowService;
use crate::domain::cards::CardId;
use crate::domain::state::GameState;
use crate::domain::{bidding, transitions, tricks};
use crate::errors::DomainError;
use crate::room::GameMode;
use crate::ws::protocol::ServerMsg;

impl GameFlowService {
    pub(super) async fn start_game(
        &self,
        session: Uuid,
        code: &str,
    ) -> Result<(), DomainError> {
        let slot = self.rooms().get(code).ok_or(DomainError::RoomNotFound)?;
        let mut room = slot.room.lock().await;
        if !room.is_host(session) {
            return Ok(());
        }
        room.can_start()?;

        let order: Vec<String> = room.players.iter().map(|p| p.name.clone()).collect();
        let teams = match room.game_mode {
            GameMode::Teams => room.teams.clone(),
            GameMode::Individual => None,
        };
        let mut game = GameState::new(order, teams);
        transitions::start_round(&mut game, &mut thread_rng())?;

        room.started = true;
        room.game = Some(game);
        info!(room_code = %room.code, players = room.players.len(), "Game started");

        self.broadcast_room_update(&room);
        self.broadcast_game_state(&room);
        drop(room);
        self.schedule_turn_check(code);
        Ok(())
    }

    pub(super) async fn nil_decision(
        &self,
        session: Uuid,
        code: &str,
        go_nil: bool,
    ) -> Result<(), DomainError> {
        let slot = self.rooms().get(code).ok_or(DomainError::RoomNotFound)?;
        let mut room = slot.room.lock().await;
        let name = room
            .player_name(session)
            .ok_or(DomainError::NotInRoom)?
            .to_string();
        {
            let game = room.game.as_mut().ok_or(DomainError::PhaseMismatch)?;
            bidding::nil_decision(game, &name, go_nil)?;
        }
        info!(room_code = %room.code, player = %name, go_nil, "Nil decision");
        self.broadcast_game_state(&room);
        drop(room);
        self.schedule_turn_check(code);
        Ok(())
    }

    pub(super) async fn place_bid(
        &self,
        session: Uuid,
        code: &str,
        bid: u8,
    ) -> Result<(), DomainError> {
        let slot = self.rooms().get(code).ok_or(DomainError::RoomNotFound)?;
        let mut room = slot.room.lock().await;
        let name = room
            .player_name(session)
            .ok_or(DomainError::NotInRoom)?
            .to_string();
        {
            let game = room.game.as_mut().ok_or(DomainError::PhaseMismatch)?;
            bidding::place_bid(game, &name, bid)?;
        }
        info!(room_code = %room.code, player = %name, bid, "Bid placed");
        self.broadcast_game_state(&room);
        drop(room);
        self.schedule_turn_check(code);
        Ok(())
    }

    /// The one handler that must not wait on the lock: a second play-card
    /// racing the first means the client already has an attempt in flight,
    /// and the loser is rejected outright.
    pub(super) async fn play_card(
        &self,
        session: Uuid,
        code: &str,
        card_id: CardId,
    ) -> Result<(), DomainError> {
        let slot = self.rooms().get(code).ok_or(DomainError::RoomNotFound)?;
        let mut room = slot.room.try_lock().map_err(|_| DomainError::RoomBusy)?;
        let name = room
            .player_name(session)
            .ok_or(DomainError::NotInRoom)?
            .to_string();
        let complete = {
            let game = room.game.as_mut().ok_or(DomainError::PhaseMismatch)?;
            tricks::play_card(game, &name, card_id)?
        };
        self.broadcast_game_state(&room);
        drop(room);
        if complete {
            self.schedule_trick_settle(code);
        } else {
            self.schedule_turn_check(code);
        }
        Ok(())
    }

    pub(super) async fn next_round(
        &self,
        session: Uuid,
        code: &str,
    ) -> Result<(), DomainError> {
        let slot = self.rooms().get(code).ok_or(DomainError::RoomNotFound)?;
        let mut room = slot.room.lock().await;
        if !room.is_host(session) {
            return Ok(());
        }
        {
            let game = room.game.as_mut().ok_or(DomainError::PhaseMismatch)?;
            transitions::advance_round(game, &mut thread_rng())?;
        }
        let round = room.game.as_ref().map(|g| g.current_round).unwrap_or(0);
        info!(room_code = %room.code, round, "Next round dealt");
        self.broadcast_game_state(&room);
        drop(room);
        self.schedule_turn_check(code);
        Ok(())
    }

    pub(super) async fn restart_game(
        &self,
        session: Uuid,
        code: &str,
    ) -> Result<(), DomainError> {
        let slot = self.rooms().get(code).ok_or(DomainError::RoomNotFound)?;
        let mut room = slot.room.lock().await;
        if !room.is_host(session) {
            return Ok(());
        }
        room.reset();
        info!(room_code = %room.code, "Game reset to lobby");
        self.broadcast_to_room(&room, ServerMsg::GameReset);
        self.broadcast_room_update(&room);
        Ok(())
    }

    pub(super) async fn end_game(
        &self,
        session: Uuid,
        code: &str,
    ) -> Result<(), DomainError> {
        let slot = self.rooms().get(code).ok_or(DomainError::RoomNotFound)?;
        let room = slot.room.lock().await;
        if !room.is_host(session) {
            return Ok(());
        }
        info!(room_code = %room.code, "Game ended by host");
        self.broadcast_to_room(&room, ServerMsg::GameEnded);
        self.registry().evict_room(&room.code);
        self.rooms().remove(&room.code);
        Ok(())
    }

    /// Explicit mid-game leave: the seat is gone for good, the game shrinks
    /// around it.
    pub(super) async fn leave_game(
        &self,
        session: Uuid,
        code: &str,
    ) -> Result<(), DomainError> {
        let slot = self.rooms().get(code).ok_or(DomainError::RoomNotFound)?;
        let mut room = slot.room.lock().await;
        let removed = room.remove_entry(session).ok_or(DomainError::NotInRoom)?;
        self.registry().unbind(session);
        info!(room_code = %room.code, player = %removed.name, "Player left game");

        if let Some(game) = room.game.as_mut() {
            transitions::remove_player(game, &removed.name);
        }
        if room.is_empty() {
            self.rooms().remove(&room.code);
            return Ok(());
        }

        self.broadcast_room_update(&room);
        self.broadcast_game_state(&room);
        let settle_pending = Self::trick_awaiting_settle(&room);
        drop(room);
        // Their departure may have completed the trick or left a
        // disconnected actor on turn.
        if settle_pending {
            self.schedule_trick_settle(code);
        } else {
            self.schedule_turn_check(code);
        }
        Ok(())
    }
}
