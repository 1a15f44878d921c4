//! Full game scenarios through the orchestrator, with the clock paused so
//! pacing timers (trick settle, round end, auto-progress) fire
//! deterministically.

mod support;

use std::time::Duration;

use tokio::time::sleep;

use spades_server::domain::Phase;
use spades_server::services::game_flow::GameFlowService;
use spades_server::ws::protocol::ClientMsg;

use support::{ack_err, ack_ok, client_named, pick_legal, setup_started_game, TestClient};

/// Long enough (in paused time) to cover trick settle + round end pacing.
const SETTLE: Duration = Duration::from_secs(5);

async fn bid_zero_round(svc: &std::sync::Arc<GameFlowService>, code: &str, clients: &[TestClient]) {
    loop {
        let view = clients[0].last_game_view().unwrap();
        if view.phase != Phase::Bidding {
            break;
        }
        let cur = view.current_player.clone().unwrap();
        ack_ok(
            svc,
            client_named(clients, &cur),
            ClientMsg::PlaceBid {
                room_code: code.to_string(),
                bid: 0,
            },
        )
        .await;
    }
}

/// Drive the current round to RoundEnd (or GameOver), making every play
/// through per-player views exactly as a client would.
async fn play_out_round(
    svc: &std::sync::Arc<GameFlowService>,
    code: &str,
    clients: &[TestClient],
    nil_volunteer: Option<&str>,
) {
    loop {
        let view = clients[0].last_game_view().unwrap();
        match view.phase {
            Phase::NilPrompt => {
                for name in view.player_order.clone() {
                    let go_nil = nil_volunteer == Some(name.as_str());
                    ack_ok(
                        svc,
                        client_named(clients, &name),
                        ClientMsg::NilDecision {
                            room_code: code.to_string(),
                            go_nil,
                        },
                    )
                    .await;
                }
            }
            Phase::Bidding => bid_zero_round(svc, code, clients).await,
            Phase::Playing => {
                if view.current_trick.len() == view.player_order.len() {
                    sleep(SETTLE).await;
                } else {
                    let cur = view.current_player.clone().unwrap();
                    let client = client_named(clients, &cur);
                    let own = client.last_game_view().unwrap();
                    let card_id = pick_legal(&own);
                    ack_ok(
                        svc,
                        client,
                        ClientMsg::PlayCard {
                            room_code: code.to_string(),
                            card_id,
                        },
                    )
                    .await;
                }
            }
            Phase::RoundEnd | Phase::GameOver => break,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn round_one_trick_and_scores() {
    let svc = GameFlowService::new();
    let (code, clients) = setup_started_game(&svc, &["alice", "bob", "carol"]).await;

    // Round 1, dealer alice, bidding starts at bob.
    let view = clients[0].last_game_view().unwrap();
    assert_eq!(view.current_round, 1);
    assert_eq!(view.dealer_index, 0);
    assert_eq!(view.current_player.as_deref(), Some("bob"));

    bid_zero_round(&svc, &code, &clients).await;
    let view = clients[0].last_game_view().unwrap();
    assert_eq!(view.phase, Phase::Playing);
    // First lead in round 1 is left of the dealer.
    assert_eq!(view.current_player.as_deref(), Some("bob"));

    play_out_round(&svc, &code, &clients, None).await;

    for client in &clients {
        assert!(client.received_trick_result(), "{} saw no trick", client.name);
        assert_eq!(client.round_end_count(), 1);
    }

    // Everyone bid 0: the trick winner scored 1, the rest 0.
    let view = clients[0].last_game_view().unwrap();
    assert_eq!(view.phase, Phase::RoundEnd);
    assert_eq!(view.current_round, 2);
    let mut totals: Vec<i32> = view.scores.values().copied().collect();
    totals.sort_unstable();
    assert_eq!(totals, vec![0, 0, 1]);
    let winner = view.last_trick_winner.clone().unwrap();
    assert_eq!(view.scores[&winner], 1);
    assert_eq!(view.overtrick_bag[&winner], 1);

    // Host deals round 2.
    ack_ok(
        &svc,
        &clients[0],
        ClientMsg::NextRound {
            room_code: code.clone(),
        },
    )
    .await;
    let view = clients[1].last_game_view().unwrap();
    assert_eq!(view.current_round, 2);
    assert_eq!(view.phase, Phase::Bidding);
    assert_eq!(view.hand.len(), 2);
    assert_eq!(view.last_trick_winner.as_deref(), Some(winner.as_str()));
}

#[tokio::test(start_paused = true)]
async fn double_play_second_attempt_rejected() {
    let svc = GameFlowService::new();
    let (code, clients) = setup_started_game(&svc, &["alice", "bob", "carol"]).await;
    bid_zero_round(&svc, &code, &clients).await;

    let view = clients[0].last_game_view().unwrap();
    let cur = view.current_player.clone().unwrap();
    let client = client_named(&clients, &cur);
    let card_id = pick_legal(&client.last_game_view().unwrap());

    ack_ok(
        &svc,
        client,
        ClientMsg::PlayCard {
            room_code: code.clone(),
            card_id,
        },
    )
    .await;
    // Same card again: it is no longer in hand and the turn has moved.
    let err = ack_err(
        &svc,
        client,
        ClientMsg::PlayCard {
            room_code: code.clone(),
            card_id,
        },
    )
    .await;
    assert!(!err.is_empty());
    // The caller was told via invalid-play or a turn rejection; state is
    // unchanged either way.
    let view = clients[1].last_game_view().unwrap();
    assert_eq!(view.current_trick.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn play_card_rejected_while_room_lock_held() {
    let svc = GameFlowService::new();
    let (code, clients) = setup_started_game(&svc, &["alice", "bob"]).await;
    bid_zero_round(&svc, &code, &clients).await;

    let view = clients[0].last_game_view().unwrap();
    let cur = view.current_player.clone().unwrap();
    let client = client_named(&clients, &cur);
    let card_id = pick_legal(&client.last_game_view().unwrap());

    // Hold the room lock as a concurrent transition would.
    let slot = svc.rooms().get(&code).unwrap();
    let guard = slot.room.lock().await;
    let err = ack_err(
        &svc,
        client,
        ClientMsg::PlayCard {
            room_code: code.clone(),
            card_id,
        },
    )
    .await;
    assert!(err.contains("busy"), "{err}");
    drop(guard);

    // With the lock free the same attempt goes through.
    ack_ok(
        &svc,
        client,
        ClientMsg::PlayCard {
            room_code: code,
            card_id,
        },
    )
    .await;
}

#[tokio::test(start_paused = true)]
async fn disconnected_bidder_is_auto_skipped() {
    let svc = GameFlowService::new();
    let (code, clients) = setup_started_game(&svc, &["alice", "bob", "carol"]).await;

    let view = clients[0].last_game_view().unwrap();
    let cur = view.current_player.clone().unwrap();
    let absent = client_named(&clients, &cur);
    svc.handle_disconnect(absent.id).await;

    let room = clients[0].last_room_view().unwrap();
    let seat = room.players.iter().find(|p| p.name == cur).unwrap();
    assert!(!seat.connected);

    // Past the grace period the server bids 0 for them.
    sleep(Duration::from_secs(6)).await;
    let view = clients[0].last_game_view().unwrap();
    assert_eq!(view.bids.get(&cur), Some(&0));
    assert_ne!(view.current_player.as_deref(), Some(cur.as_str()));
}

#[tokio::test(start_paused = true)]
async fn quick_reconnect_prevents_auto_action_and_restores_hand() {
    let svc = GameFlowService::new();
    let (code, clients) = setup_started_game(&svc, &["alice", "bob", "carol"]).await;

    let view = clients[0].last_game_view().unwrap();
    let cur = view.current_player.clone().unwrap();
    let absent = client_named(&clients, &cur);
    let expected_hand = absent.last_game_view().unwrap().hand;
    svc.handle_disconnect(absent.id).await;

    // Rejoin under the same name from a fresh session.
    let revenant = TestClient::connect(&svc, &cur);
    let ack_code = ack_ok(
        &svc,
        &revenant,
        ClientMsg::JoinRoom {
            room_code: code.clone(),
            player_name: cur.clone(),
        },
    )
    .await;
    assert_eq!(ack_code.as_deref(), Some(code.as_str()));

    let view = revenant.last_game_view().unwrap();
    assert_eq!(view.hand, expected_hand);

    sleep(Duration::from_secs(6)).await;
    // Still this player's turn, no bid forced.
    let view = revenant.last_game_view().unwrap();
    assert!(view.bids.get(&cur).is_none());
    assert_eq!(view.current_player.as_deref(), Some(cur.as_str()));
}

#[tokio::test(start_paused = true)]
async fn mid_game_leave_shrinks_the_game() {
    let svc = GameFlowService::new();
    let (code, clients) = setup_started_game(&svc, &["alice", "bob", "carol"]).await;
    bid_zero_round(&svc, &code, &clients).await;

    ack_ok(
        &svc,
        &clients[2],
        ClientMsg::LeaveGame {
            room_code: code.clone(),
        },
    )
    .await;
    let view = clients[0].last_game_view().unwrap();
    assert_eq!(view.player_order, vec!["alice", "bob"]);
    assert!(view.other_hand_counts.get("carol").is_none());
    let room = clients[0].last_room_view().unwrap();
    assert_eq!(room.players.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn full_game_runs_to_game_over_with_nil_rounds() {
    let svc = GameFlowService::new();
    let (code, clients) = setup_started_game(&svc, &["alice", "bob", "carol"]).await;

    loop {
        let view = clients[0].last_game_view().unwrap();
        if view.game_over {
            break;
        }
        let nil_volunteer = (view.current_round == 10).then_some("alice");
        play_out_round(&svc, &code, &clients, nil_volunteer).await;

        let view = clients[0].last_game_view().unwrap();
        if view.phase == Phase::RoundEnd {
            ack_ok(
                &svc,
                &clients[0],
                ClientMsg::NextRound {
                    room_code: code.clone(),
                },
            )
            .await;
        }
    }

    let view = clients[1].last_game_view().unwrap();
    assert_eq!(view.phase, Phase::GameOver);
    let winner = view.winner.as_ref().expect("game over names a winner");
    assert_eq!(view.scores[&winner.name], winner.score);

    for client in &clients {
        assert_eq!(client.round_end_count(), 11);
    }

    // History reconciles: eleven rows each, totals match the running sum.
    for name in &view.player_order {
        let rows = &view.round_history[name];
        assert_eq!(rows.len(), 11);
        let expected: i32 = rows
            .iter()
            .map(|r| r.round_score - if r.penalty_applied { 55 } else { 0 })
            .sum();
        assert_eq!(view.scores[name], expected);
    }

    // Alice answered the round-10 nil prompt in the affirmative: her row is
    // a nil row worth exactly +-100.
    let alice_rows = &view.round_history["alice"];
    let nil_row = &alice_rows[9];
    assert!(nil_row.nil);
    assert_eq!(nil_row.bid, 0);
    assert!(nil_row.round_score == 100 || nil_row.round_score == -100);

    // Round 11 prompted again; nobody went nil there.
    assert!(view.round_history["bob"].iter().all(|r| !r.nil));
}
