//! Wire protocol: tagged JSON unions for client requests and server
//! messages, plus the public room projection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::cards::{Card, CardId};
use crate::domain::scoring::RoundSummary;
use crate::domain::state::{RoundRecord, TrickPlay};
use crate::domain::PlayerGameView;
use crate::room::{GameMode, Room};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMsg {
    CreateRoom {
        player_name: String,
        game_mode: GameMode,
    },
    /// Also the reconnect path: a disconnected seat with the same name is
    /// reclaimed.
    JoinRoom {
        room_code: String,
        player_name: String,
    },
    ToggleReady {
        room_code: String,
    },
    SetGameMode {
        room_code: String,
        game_mode: GameMode,
    },
    AssignTeam {
        room_code: String,
        player_name: String,
        team_name: String,
    },
    UpdateTeams {
        room_code: String,
        num_teams: usize,
    },
    StartGame {
        room_code: String,
    },
    NilDecision {
        room_code: String,
        go_nil: bool,
    },
    PlaceBid {
        room_code: String,
        bid: u8,
    },
    PlayCard {
        room_code: String,
        card_id: CardId,
    },
    NextRound {
        room_code: String,
    },
    RestartGame {
        room_code: String,
    },
    EndGame {
        room_code: String,
    },
    LeaveGame {
        room_code: String,
    },
    LeaveRoom {
        room_code: String,
    },
}

impl ClientMsg {
    /// Wire name echoed back in the ack.
    pub fn request_name(&self) -> &'static str {
        match self {
            ClientMsg::CreateRoom { .. } => "create-room",
            ClientMsg::JoinRoom { .. } => "join-room",
            ClientMsg::ToggleReady { .. } => "toggle-ready",
            ClientMsg::SetGameMode { .. } => "set-game-mode",
            ClientMsg::AssignTeam { .. } => "assign-team",
            ClientMsg::UpdateTeams { .. } => "update-teams",
            ClientMsg::StartGame { .. } => "start-game",
            ClientMsg::NilDecision { .. } => "nil-decision",
            ClientMsg::PlaceBid { .. } => "place-bid",
            ClientMsg::PlayCard { .. } => "play-card",
            ClientMsg::NextRound { .. } => "next-round",
            ClientMsg::RestartGame { .. } => "restart-game",
            ClientMsg::EndGame { .. } => "end-game",
            ClientMsg::LeaveGame { .. } => "leave-game",
            ClientMsg::LeaveRoom { .. } => "leave-room",
        }
    }
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMsg {
    Ack {
        request: &'static str,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        room_code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    RoomUpdate {
        room: RoomView,
    },

    /// Per-recipient: hands are redacted to the viewer.
    GameState {
        game: PlayerGameView,
    },

    TrickResult {
        winner: String,
        winning_card: Card,
        trick: Vec<TrickPlay>,
    },

    RoundEnd {
        #[serde(flatten)]
        summary: RoundSummary,
        round_history: std::collections::HashMap<String, Vec<RoundRecord>>,
    },

    InvalidPlay {
        message: String,
    },

    GameReset,

    GameEnded,

    Error {
        code: ErrorCode,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
}

/// Membership-level room data broadcast to everyone in the room.
#[derive(Debug, Clone, Serialize)]
pub struct RoomView {
    pub code: String,
    pub host_name: Option<String>,
    pub game_mode: GameMode,
    pub players: Vec<PlayerPublic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<BTreeMap<String, Vec<String>>>,
    pub started: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerPublic {
    pub name: String,
    pub ready: bool,
    pub connected: bool,
    pub is_host: bool,
}

impl RoomView {
    pub fn from_room(room: &Room) -> Self {
        Self {
            code: room.code.clone(),
            host_name: room.player_name(room.host_id).map(str::to_string),
            game_mode: room.game_mode,
            players: room
                .players
                .iter()
                .map(|p| PlayerPublic {
                    name: p.name.clone(),
                    ready: p.ready,
                    connected: p.connected,
                    is_host: room.host_id == p.id,
                })
                .collect(),
            teams: room.teams.clone(),
            started: room.started,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_msg_parses_kebab_case_tags() {
        let msg: ClientMsg = serde_json::from_str(
            r#"{"type":"join-room","room_code":"ABCDEF","player_name":"ana"}"#,
        )
        .unwrap();
        assert!(matches!(msg, ClientMsg::JoinRoom { .. }));
        assert_eq!(msg.request_name(), "join-room");
    }

    #[test]
    fn ack_serializes_without_empty_fields() {
        let ack = ServerMsg::Ack {
            request: "toggle-ready",
            success: true,
            room_code: None,
            error: None,
        };
        let json = serde_json::to_string(&ack).unwrap();
        assert!(!json.contains("error"));
        assert!(!json.contains("room_code"));
        assert!(json.contains(r#""type":"ack""#));
    }
}
