//! Room membership: players, readiness, team configuration, host handling.
//!
//! All operations here are synchronous and pure over room state; the
//! orchestrator holds the room lock around them.

pub mod join_code;
pub mod manager;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::state::GameState;
use crate::errors::DomainError;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 8;
pub const MAX_NAME_LEN: usize = 15;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Individual,
    Teams,
}

/// A seat at the table. `id` is the current session handle and changes on
/// reconnect; `name` is the stable identity within the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub ready: bool,
    pub connected: bool,
}

#[derive(Debug)]
pub struct Room {
    pub code: String,
    pub host_id: Uuid,
    pub game_mode: GameMode,
    pub players: Vec<Player>,
    pub teams: Option<BTreeMap<String, Vec<String>>>,
    pub started: bool,
    pub game: Option<GameState>,
}

pub(crate) fn validate_name(name: &str) -> Result<(), DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidName("name is empty".into()));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(DomainError::InvalidName(format!(
            "name exceeds {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn team_name(i: usize) -> String {
    format!("Team {}", i + 1)
}

impl Room {
    pub fn new(code: String, host_id: Uuid, host_name: &str, game_mode: GameMode) -> Self {
        let teams = match game_mode {
            GameMode::Teams => Some(
                (0..2)
                    .map(|i| (team_name(i), Vec::new()))
                    .collect::<BTreeMap<_, _>>(),
            ),
            GameMode::Individual => None,
        };
        Self {
            code,
            host_id,
            game_mode,
            players: vec![Player {
                id: host_id,
                name: host_name.trim().to_string(),
                ready: false,
                connected: true,
            }],
            teams,
            started: false,
            game: None,
        }
    }

    pub fn player(&self, id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: Uuid) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn player_name(&self, id: Uuid) -> Option<&str> {
        self.player(id).map(|p| p.name.as_str())
    }

    pub fn is_host(&self, id: Uuid) -> bool {
        self.host_id == id
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Join or reconnect. During a started game a disconnected seat with the
    /// same name is reclaimed: the session id is rebound and, when that seat
    /// held host, hostship follows it.
    pub fn join(&mut self, session_id: Uuid, name: &str) -> Result<bool, DomainError> {
        validate_name(name)?;
        let name = name.trim();

        if self.started {
            let Some(existing) = self.players.iter_mut().find(|p| p.name == name) else {
                return Err(DomainError::GameAlreadyStarted);
            };
            if existing.connected {
                return Err(DomainError::NameTaken);
            }
            let was_host = self.host_id == existing.id;
            existing.id = session_id;
            existing.connected = true;
            if was_host {
                self.host_id = session_id;
            }
            return Ok(true);
        }

        if self.players.iter().any(|p| p.name == name) {
            return Err(DomainError::NameTaken);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(DomainError::RoomFull);
        }
        self.players.push(Player {
            id: session_id,
            name: name.to_string(),
            ready: false,
            connected: true,
        });
        Ok(false)
    }

    /// Handle a transport-level disconnect. In the lobby the seat is
    /// dropped entirely; mid-game the entry is retained so the player can
    /// reconnect under the same name.
    pub fn mark_disconnected(&mut self, session_id: Uuid) -> bool {
        if self.started {
            if let Some(p) = self.player_mut(session_id) {
                p.connected = false;
                return true;
            }
            return false;
        }
        self.remove_entry(session_id).is_some()
    }

    /// Remove a seat outright; transfers host to the first remaining player
    /// when needed. Also unassigns the name from any team.
    pub fn remove_entry(&mut self, session_id: Uuid) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.id == session_id)?;
        let removed = self.players.remove(idx);
        if let Some(teams) = &mut self.teams {
            for members in teams.values_mut() {
                members.retain(|n| n != &removed.name);
            }
        }
        if self.host_id == removed.id {
            if let Some(next) = self.players.first() {
                self.host_id = next.id;
            }
        }
        Some(removed)
    }

    pub fn toggle_ready(&mut self, session_id: Uuid) -> Result<(), DomainError> {
        if self.started {
            return Err(DomainError::GameAlreadyStarted);
        }
        let player = self
            .player_mut(session_id)
            .ok_or(DomainError::NotInRoom)?;
        player.ready = !player.ready;
        Ok(())
    }

    pub fn set_game_mode(&mut self, mode: GameMode) -> Result<(), DomainError> {
        if self.started {
            return Err(DomainError::GameAlreadyStarted);
        }
        self.game_mode = mode;
        self.teams = match mode {
            GameMode::Teams => {
                let count = (self.players.len() / 2).max(1);
                Some((0..count).map(|i| (team_name(i), Vec::new())).collect())
            }
            GameMode::Individual => None,
        };
        Ok(())
    }

    pub fn assign_team(&mut self, player_name: &str, team: &str) -> Result<(), DomainError> {
        if self.started {
            return Err(DomainError::GameAlreadyStarted);
        }
        if !self.players.iter().any(|p| p.name == player_name) {
            return Err(DomainError::NotInRoom);
        }
        let teams = self
            .teams
            .as_mut()
            .ok_or_else(|| DomainError::validation("Room is not in team mode"))?;
        if !teams.contains_key(team) {
            return Err(DomainError::validation(format!("No such team: {team}")));
        }
        for members in teams.values_mut() {
            members.retain(|n| n != player_name);
        }
        teams
            .get_mut(team)
            .expect("team presence checked above")
            .push(player_name.to_string());
        Ok(())
    }

    /// Reconfigure to `num_teams` empty teams, dropping all assignments.
    pub fn update_teams(&mut self, num_teams: usize) -> Result<(), DomainError> {
        if self.started {
            return Err(DomainError::GameAlreadyStarted);
        }
        if self.game_mode != GameMode::Teams {
            return Err(DomainError::validation("Room is not in team mode"));
        }
        if num_teams == 0 || num_teams > MAX_PLAYERS / 2 {
            return Err(DomainError::validation(format!(
                "Team count must be 1..={}",
                MAX_PLAYERS / 2
            )));
        }
        self.teams = Some((0..num_teams).map(|i| (team_name(i), Vec::new())).collect());
        Ok(())
    }

    pub fn can_start(&self) -> Result<(), DomainError> {
        if self.started {
            return Err(DomainError::GameAlreadyStarted);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(DomainError::CannotStart(format!(
                "need at least {MIN_PLAYERS} players"
            )));
        }
        if !self.players.iter().all(|p| p.ready) {
            return Err(DomainError::CannotStart("not everyone is ready".into()));
        }
        if self.game_mode == GameMode::Teams {
            if self.players.len() % 2 != 0 {
                return Err(DomainError::CannotStart(
                    "team play needs an even player count".into(),
                ));
            }
            let teams = self
                .teams
                .as_ref()
                .ok_or_else(|| DomainError::CannotStart("teams not configured".into()))?;
            let assigned: usize = teams.values().map(Vec::len).sum();
            if assigned != self.players.len() {
                return Err(DomainError::CannotStart(
                    "every player must be on a team".into(),
                ));
            }
            for p in &self.players {
                let memberships = teams.values().filter(|m| m.contains(&p.name)).count();
                if memberships != 1 {
                    return Err(DomainError::CannotStart(format!(
                        "{} must be on exactly one team",
                        p.name
                    )));
                }
            }
            if teams.values().any(Vec::is_empty) {
                return Err(DomainError::CannotStart("a team is empty".into()));
            }
        }
        Ok(())
    }

    /// Return to the lobby: game discarded, ready flags cleared.
    pub fn reset(&mut self) {
        self.started = false;
        self.game = None;
        for p in &mut self.players {
            p.ready = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> Room {
        Room::new("ABCDEF".into(), Uuid::new_v4(), "host", GameMode::Individual)
    }

    #[test]
    fn join_rejects_duplicate_name() {
        let mut r = room();
        assert!(r.join(Uuid::new_v4(), "guest").is_ok());
        assert_eq!(r.join(Uuid::new_v4(), "guest"), Err(DomainError::NameTaken));
        assert_eq!(r.join(Uuid::new_v4(), "host"), Err(DomainError::NameTaken));
    }

    #[test]
    fn join_enforces_capacity() {
        let mut r = room();
        for i in 1..MAX_PLAYERS {
            assert!(r.join(Uuid::new_v4(), &format!("p{i}")).is_ok());
        }
        assert_eq!(r.join(Uuid::new_v4(), "late"), Err(DomainError::RoomFull));
    }

    #[test]
    fn join_validates_names() {
        let mut r = room();
        assert!(matches!(
            r.join(Uuid::new_v4(), "   "),
            Err(DomainError::InvalidName(_))
        ));
        assert!(matches!(
            r.join(Uuid::new_v4(), "abcdefghijklmnop"),
            Err(DomainError::InvalidName(_))
        ));
    }

    #[test]
    fn started_room_rejects_strangers_but_reconnects_by_name() {
        let mut r = room();
        let guest_id = Uuid::new_v4();
        r.join(guest_id, "guest").unwrap();
        r.started = true;

        assert_eq!(
            r.join(Uuid::new_v4(), "somebody"),
            Err(DomainError::GameAlreadyStarted)
        );
        // Still connected: the name is not reclaimable.
        assert_eq!(r.join(Uuid::new_v4(), "guest"), Err(DomainError::NameTaken));

        r.player_mut(guest_id).unwrap().connected = false;
        let new_id = Uuid::new_v4();
        assert_eq!(r.join(new_id, "guest"), Ok(true));
        let p = r.player(new_id).unwrap();
        assert!(p.connected);
        assert_eq!(p.name, "guest");
    }

    #[test]
    fn reconnecting_host_keeps_hostship() {
        let host_id = Uuid::new_v4();
        let mut r = Room::new("ABCDEF".into(), host_id, "host", GameMode::Individual);
        r.join(Uuid::new_v4(), "guest").unwrap();
        r.started = true;
        r.player_mut(host_id).unwrap().connected = false;

        let new_id = Uuid::new_v4();
        assert_eq!(r.join(new_id, "host"), Ok(true));
        assert_eq!(r.host_id, new_id);
    }

    #[test]
    fn lobby_disconnect_drops_entry_and_transfers_host() {
        let host_id = Uuid::new_v4();
        let mut r = Room::new("ABCDEF".into(), host_id, "host", GameMode::Individual);
        let guest_id = Uuid::new_v4();
        r.join(guest_id, "guest").unwrap();

        assert!(r.mark_disconnected(host_id));
        assert_eq!(r.players.len(), 1);
        assert_eq!(r.host_id, guest_id);
    }

    #[test]
    fn mid_game_disconnect_retains_entry() {
        let mut r = room();
        let guest_id = Uuid::new_v4();
        r.join(guest_id, "guest").unwrap();
        r.started = true;

        assert!(r.mark_disconnected(guest_id));
        let p = r.player(guest_id).unwrap();
        assert!(!p.connected);
        assert_eq!(r.players.len(), 2);
    }

    #[test]
    fn can_start_requires_two_ready_players() {
        let mut r = room();
        assert!(matches!(r.can_start(), Err(DomainError::CannotStart(_))));
        r.join(Uuid::new_v4(), "guest").unwrap();
        assert!(matches!(r.can_start(), Err(DomainError::CannotStart(_))));
        for p in &mut r.players {
            p.ready = true;
        }
        assert!(r.can_start().is_ok());
    }

    #[test]
    fn team_mode_start_requirements() {
        let host_id = Uuid::new_v4();
        let mut r = Room::new("ABCDEF".into(), host_id, "a", GameMode::Teams);
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            r.join(*id, &format!("p{i}")).unwrap();
        }
        for p in &mut r.players {
            p.ready = true;
        }

        // Nobody assigned yet.
        assert!(matches!(r.can_start(), Err(DomainError::CannotStart(_))));

        r.assign_team("a", "Team 1").unwrap();
        r.assign_team("p0", "Team 1").unwrap();
        r.assign_team("p1", "Team 2").unwrap();
        r.assign_team("p2", "Team 2").unwrap();
        assert!(r.can_start().is_ok());

        // Odd player count fails even when assigned.
        r.join(Uuid::new_v4(), "p3").unwrap();
        r.player_mut(r.players.last().unwrap().id).unwrap().ready = true;
        r.assign_team("p3", "Team 2").unwrap();
        assert!(matches!(r.can_start(), Err(DomainError::CannotStart(_))));
    }

    #[test]
    fn assign_team_moves_between_teams() {
        let mut r = Room::new("ABCDEF".into(), Uuid::new_v4(), "a", GameMode::Teams);
        r.assign_team("a", "Team 1").unwrap();
        r.assign_team("a", "Team 2").unwrap();
        let teams = r.teams.as_ref().unwrap();
        assert!(teams["Team 1"].is_empty());
        assert_eq!(teams["Team 2"], vec!["a".to_string()]);
    }

    #[test]
    fn switching_mode_rebuilds_teams() {
        let mut r = room();
        for i in 0..5 {
            r.join(Uuid::new_v4(), &format!("p{i}")).unwrap();
        }
        r.set_game_mode(GameMode::Teams).unwrap();
        // floor(6 / 2) teams
        assert_eq!(r.teams.as_ref().unwrap().len(), 3);
        r.set_game_mode(GameMode::Individual).unwrap();
        assert!(r.teams.is_none());
    }

    #[test]
    fn reset_clears_game_and_ready() {
        let mut r = room();
        r.join(Uuid::new_v4(), "guest").unwrap();
        for p in &mut r.players {
            p.ready = true;
        }
        r.started = true;
        r.reset();
        assert!(!r.started);
        assert!(r.game.is_none());
        assert!(r.players.iter().all(|p| !p.ready));
    }
}
