//! Scheduled transitions and auto-progress.
//!
//! Delays here are pacing for client animation, never correctness: every
//! callback re-acquires the room lock and re-validates state before acting,
//! so a late or duplicate timer is a no-op.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use super::{is_disconnected, GameFlowService};
use crate::domain::cards::CardId;
use crate::domain::state::{NilChoice, Phase};
use crate::domain::{bidding, transitions, tricks};
use crate::ws::protocol::ServerMsg;

/// Pause between the full-trick broadcast and trick resolution.
pub const TRICK_RESOLVE_DELAY: Duration = Duration::from_millis(500);
/// Pause between trick resolution and the next-trick snapshot.
pub const NEXT_TRICK_DELAY: Duration = Duration::from_millis(1500);
/// Pause between the last trick's resolution and round scoring.
pub const ROUND_END_DELAY: Duration = Duration::from_millis(2000);
/// Grace after any state change before checking for a disconnected actor.
pub const TURN_CHECK_DELAY: Duration = Duration::from_millis(300);
/// Grace after a disconnect before auto-progress kicks in, allowing a quick
/// reconnect to keep the seat live.
pub const DISCONNECT_GRACE: Duration = Duration::from_secs(5);

impl GameFlowService {
    /// Grab an owned handle for a spawned task; `None` only during teardown.
    fn handle(&self) -> Option<Arc<Self>> {
        self.self_ref.upgrade()
    }

    pub(crate) fn schedule_trick_settle(&self, code: &str) {
        let Some(svc) = self.handle() else { return };
        let code = code.to_string();
        tokio::spawn(async move {
            sleep(TRICK_RESOLVE_DELAY).await;
            svc.settle_trick(&code).await;
        });
    }

    async fn settle_trick(&self, code: &str) {
        let Some(slot) = self.rooms().get(code) else {
            return;
        };
        let mut room = slot.room.lock().await;
        let result = {
            let Some(game) = room.game.as_mut() else {
                return;
            };
            if game.phase != Phase::Playing
                || game.current_trick.is_empty()
                || game.current_trick.len() < game.player_count()
            {
                return;
            }
            match tricks::resolve_trick(game) {
                Ok(result) => result,
                Err(_) => return,
            }
        };
        info!(
            room_code = %room.code,
            winner = %result.winner,
            trick_number = room.game.as_ref().map(|g| g.trick_number).unwrap_or(0),
            "Trick resolved"
        );
        self.broadcast_to_room(
            &room,
            ServerMsg::TrickResult {
                winner: result.winner.clone(),
                winning_card: result.winning_card,
                trick: result.trick.clone(),
            },
        );
        drop(room);
        if result.round_over {
            self.schedule_round_settle(code);
        } else {
            self.schedule_next_trick_broadcast(code);
        }
    }

    fn schedule_next_trick_broadcast(&self, code: &str) {
        let Some(svc) = self.handle() else { return };
        let code = code.to_string();
        tokio::spawn(async move {
            sleep(NEXT_TRICK_DELAY).await;
            let Some(slot) = svc.rooms().get(&code) else {
                return;
            };
            let room = slot.room.lock().await;
            svc.broadcast_game_state(&room);
            drop(room);
            svc.schedule_turn_check(&code);
        });
    }

    fn schedule_round_settle(&self, code: &str) {
        let Some(svc) = self.handle() else { return };
        let code = code.to_string();
        tokio::spawn(async move {
            sleep(ROUND_END_DELAY).await;
            svc.settle_round(&code).await;
        });
    }

    async fn settle_round(&self, code: &str) {
        let Some(slot) = self.rooms().get(code) else {
            return;
        };
        let mut room = slot.room.lock().await;
        let (summary, history) = {
            let Some(game) = room.game.as_mut() else {
                return;
            };
            if game.phase != Phase::Playing || game.trick_number != game.current_round {
                return;
            }
            let summary = match transitions::resolve_round(game) {
                Ok(summary) => summary,
                Err(_) => return,
            };
            (summary, game.round_history.clone())
        };
        info!(
            room_code = %room.code,
            round = summary.round,
            penalties = summary.penalties.len(),
            "Round resolved"
        );
        self.broadcast_to_room(
            &room,
            ServerMsg::RoundEnd {
                summary,
                round_history: history,
            },
        );
        self.broadcast_game_state(&room);
    }

    pub(crate) fn schedule_turn_check(&self, code: &str) {
        let Some(svc) = self.handle() else { return };
        let code = code.to_string();
        tokio::spawn(async move {
            sleep(TURN_CHECK_DELAY).await;
            svc.handle_disconnected_turn(&code).await;
        });
    }

    pub(crate) fn schedule_disconnect_check(&self, code: &str) {
        let Some(svc) = self.handle() else { return };
        let code = code.to_string();
        tokio::spawn(async move {
            sleep(DISCONNECT_GRACE).await;
            svc.handle_disconnected_turn(&code).await;
        });
    }

    /// Auto-progress: while the actor on turn is disconnected, act for them
    /// (decline nil, bid 0, play the first legal card). Bounded by the
    /// player count so a room of ghosts cannot spin forever; trick and
    /// round settlement re-arm the check after their own delays.
    pub async fn handle_disconnected_turn(&self, code: &str) {
        enum Action {
            DeclineNils(Vec<String>),
            AutoBid(String),
            AutoPlay(String, CardId),
            Stop,
        }

        let Some(slot) = self.rooms().get(code) else {
            return;
        };
        let mut room = slot.room.lock().await;
        if !room.started {
            return;
        }

        let max_iterations = room.players.len();
        for _ in 0..=max_iterations {
            let action = {
                let Some(game) = room.game.as_ref() else {
                    return;
                };
                match game.phase {
                    Phase::NilPrompt => {
                        let undecided: Vec<String> = game
                            .player_order
                            .iter()
                            .filter(|p| {
                                matches!(
                                    game.nil_bids.get(*p),
                                    Some(NilChoice::Undecided) | None
                                ) && is_disconnected(&room, p.as_str())
                            })
                            .cloned()
                            .collect();
                        if undecided.is_empty() {
                            Action::Stop
                        } else {
                            Action::DeclineNils(undecided)
                        }
                    }
                    Phase::Bidding => match game.current_player() {
                        Some(cur) if is_disconnected(&room, cur) => {
                            Action::AutoBid(cur.to_string())
                        }
                        _ => Action::Stop,
                    },
                    Phase::Playing => {
                        if game.current_trick.len() >= game.player_count() {
                            // Full trick: settlement owns the next step.
                            Action::Stop
                        } else {
                            match game.current_player() {
                                Some(cur) if is_disconnected(&room, cur) => {
                                    match tricks::legal_moves(game, cur).first() {
                                        Some(card) => Action::AutoPlay(cur.to_string(), card.id),
                                        None => Action::Stop,
                                    }
                                }
                                _ => Action::Stop,
                            }
                        }
                    }
                    Phase::RoundEnd | Phase::GameOver => Action::Stop,
                }
            };

            match action {
                Action::Stop => break,
                Action::DeclineNils(names) => {
                    let Some(game) = room.game.as_mut() else { return };
                    for name in &names {
                        if bidding::nil_decision(game, name, false).is_err() {
                            break;
                        }
                    }
                    info!(
                        room_code = %room.code,
                        count = names.len(),
                        "Declined nil for disconnected players"
                    );
                    self.broadcast_game_state(&room);
                }
                Action::AutoBid(name) => {
                    let Some(game) = room.game.as_mut() else { return };
                    if bidding::place_bid(game, &name, 0).is_err() {
                        break;
                    }
                    info!(room_code = %room.code, player = %name, "Auto-bid 0 for disconnected player");
                    self.broadcast_game_state(&room);
                }
                Action::AutoPlay(name, card_id) => {
                    let complete = {
                        let Some(game) = room.game.as_mut() else { return };
                        match tricks::play_card(game, &name, card_id) {
                            Ok(complete) => complete,
                            Err(_) => break,
                        }
                    };
                    info!(room_code = %room.code, player = %name, card_id, "Auto-played for disconnected player");
                    self.broadcast_game_state(&room);
                    if complete {
                        drop(room);
                        self.schedule_trick_settle(code);
                        return;
                    }
                }
            }
        }
    }
}
