//! The session orchestrator.
//!
//! Every client event, disconnect, and timer callback runs under the
//! owning room's lock for its whole transition, fan-out included: within a
//! room, transitions are strictly serialized, and snapshots for one
//! transition are dispatched before the lock is released. Timer callbacks
//! carry only a room code and re-look-up under the lock; after the room is
//! gone they are no-ops.

mod game_actions;
mod lobby;
mod timers;

use std::sync::{Arc, Weak};

use tracing::debug;
use uuid::Uuid;

use crate::domain::{player_view, Phase};
use crate::room::manager::RoomManager;
use crate::room::Room;
use crate::ws::hub::SessionRegistry;
use crate::ws::protocol::{ClientMsg, RoomView, ServerMsg};

pub struct GameFlowService {
    rooms: RoomManager,
    registry: Arc<SessionRegistry>,
    /// Handle to our own Arc for timer tasks; set once in `new`.
    self_ref: Weak<GameFlowService>,
}

impl GameFlowService {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            rooms: RoomManager::new(),
            registry: Arc::new(SessionRegistry::new()),
            self_ref: weak.clone(),
        })
    }

    pub fn registry(&self) -> Arc<SessionRegistry> {
        self.registry.clone()
    }

    pub fn rooms(&self) -> &RoomManager {
        &self.rooms
    }

    /// Route a client request to its handler and shape the ack. Play
    /// legality failures additionally push an `invalid-play` to the caller;
    /// stale phase/turn events are dropped without further noise.
    pub async fn dispatch(&self, session: Uuid, msg: ClientMsg) -> ServerMsg {
        let request = msg.request_name();
        let result = match msg {
            ClientMsg::CreateRoom {
                player_name,
                game_mode,
            } => self
                .create_room(session, &player_name, game_mode)
                .await
                .map(Some),
            ClientMsg::JoinRoom {
                room_code,
                player_name,
            } => self
                .join_room(session, &room_code, &player_name)
                .await
                .map(Some),
            ClientMsg::ToggleReady { room_code } => {
                self.toggle_ready(session, &room_code).await.map(|_| None)
            }
            ClientMsg::SetGameMode {
                room_code,
                game_mode,
            } => self
                .set_game_mode(session, &room_code, game_mode)
                .await
                .map(|_| None),
            ClientMsg::AssignTeam {
                room_code,
                player_name,
                team_name,
            } => self
                .assign_team(session, &room_code, &player_name, &team_name)
                .await
                .map(|_| None),
            ClientMsg::UpdateTeams {
                room_code,
                num_teams,
            } => self
                .update_teams(session, &room_code, num_teams)
                .await
                .map(|_| None),
            ClientMsg::StartGame { room_code } => {
                self.start_game(session, &room_code).await.map(|_| None)
            }
            ClientMsg::NilDecision { room_code, go_nil } => self
                .nil_decision(session, &room_code, go_nil)
                .await
                .map(|_| None),
            ClientMsg::PlaceBid { room_code, bid } => {
                self.place_bid(session, &room_code, bid).await.map(|_| None)
            }
            ClientMsg::PlayCard { room_code, card_id } => self
                .play_card(session, &room_code, card_id)
                .await
                .map(|_| None),
            ClientMsg::NextRound { room_code } => {
                self.next_round(session, &room_code).await.map(|_| None)
            }
            ClientMsg::RestartGame { room_code } => {
                self.restart_game(session, &room_code).await.map(|_| None)
            }
            ClientMsg::EndGame { room_code } => {
                self.end_game(session, &room_code).await.map(|_| None)
            }
            ClientMsg::LeaveGame { room_code } => {
                self.leave_game(session, &room_code).await.map(|_| None)
            }
            ClientMsg::LeaveRoom { room_code } => {
                self.leave_room(session, &room_code).await.map(|_| None)
            }
        };

        match result {
            Ok(room_code) => ServerMsg::Ack {
                request,
                success: true,
                room_code,
                error: None,
            },
            Err(err) => {
                if err.is_invalid_play() {
                    self.registry.send(
                        session,
                        ServerMsg::InvalidPlay {
                            message: err.to_string(),
                        },
                    );
                }
                if err.is_stale_event() {
                    debug!(session_id = %session, request, error = %err, "Dropping stale event");
                }
                ServerMsg::Ack {
                    request,
                    success: false,
                    room_code: None,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    // --- fan-out, always called while holding the room lock ---

    pub(crate) fn broadcast_to_room(&self, room: &Room, msg: ServerMsg) {
        for p in room.players.iter().filter(|p| p.connected) {
            self.registry.send(p.id, msg.clone());
        }
    }

    pub(crate) fn broadcast_room_update(&self, room: &Room) {
        let view = RoomView::from_room(room);
        self.broadcast_to_room(room, ServerMsg::RoomUpdate { room: view });
    }

    /// Per-player snapshots: each recipient sees only their own hand.
    pub(crate) fn broadcast_game_state(&self, room: &Room) {
        let Some(game) = &room.game else { return };
        for p in room.players.iter().filter(|p| p.connected) {
            self.registry.send(
                p.id,
                ServerMsg::GameState {
                    game: player_view(game, &p.name),
                },
            );
        }
    }

    /// Every live seat has played into the current trick, so settlement is
    /// due: either play-card already scheduled it, or a departure just
    /// completed the trick (leavers take their in-flight card with them,
    /// so the count is exact).
    pub(crate) fn trick_awaiting_settle(room: &Room) -> bool {
        room.game.as_ref().is_some_and(|g| {
            g.phase == Phase::Playing
                && !g.current_trick.is_empty()
                && g.current_trick.len() >= g.player_count()
        })
    }
}

pub(crate) fn is_disconnected(room: &Room, name: &str) -> bool {
    !room
        .players
        .iter()
        .any(|p| p.name == name && p.connected)
}
