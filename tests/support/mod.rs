//! Shared helpers for orchestrator integration tests: an in-memory session
//! sink standing in for a websocket, and lobby bootstrap shortcuts.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use spades_server::domain::PlayerGameView;
use spades_server::room::GameMode;
use spades_server::services::game_flow::GameFlowService;
use spades_server::ws::hub::SessionSink;
use spades_server::ws::protocol::{ClientMsg, RoomView, ServerMsg};

#[derive(Default)]
pub struct CaptureSink {
    messages: Mutex<Vec<ServerMsg>>,
}

impl SessionSink for CaptureSink {
    fn deliver(&self, msg: ServerMsg) {
        self.messages.lock().unwrap().push(msg);
    }
}

pub struct TestClient {
    pub id: Uuid,
    pub name: String,
    pub sink: Arc<CaptureSink>,
}

impl TestClient {
    pub fn connect(svc: &Arc<GameFlowService>, name: &str) -> Self {
        let id = Uuid::new_v4();
        let sink = Arc::new(CaptureSink::default());
        svc.registry().register_connection(id, sink.clone());
        Self {
            id,
            name: name.to_string(),
            sink,
        }
    }

    pub fn messages(&self) -> Vec<ServerMsg> {
        self.sink.messages.lock().unwrap().clone()
    }

    pub fn last_game_view(&self) -> Option<PlayerGameView> {
        self.sink
            .messages
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|m| match m {
                ServerMsg::GameState { game } => Some(game.clone()),
                _ => None,
            })
    }

    pub fn last_room_view(&self) -> Option<RoomView> {
        self.sink
            .messages
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|m| match m {
                ServerMsg::RoomUpdate { room } => Some(room.clone()),
                _ => None,
            })
    }

    pub fn received_trick_result(&self) -> bool {
        self.messages()
            .iter()
            .any(|m| matches!(m, ServerMsg::TrickResult { .. }))
    }

    pub fn round_end_count(&self) -> usize {
        self.messages()
            .iter()
            .filter(|m| matches!(m, ServerMsg::RoundEnd { .. }))
            .count()
    }
}

/// Dispatch and assert a successful ack; returns the ack's room code.
pub async fn ack_ok(svc: &Arc<GameFlowService>, client: &TestClient, msg: ClientMsg) -> Option<String> {
    match svc.dispatch(client.id, msg).await {
        ServerMsg::Ack {
            success,
            room_code,
            error,
            request,
        } => {
            assert!(success, "{request} failed: {error:?}");
            room_code
        }
        other => panic!("expected ack, got {other:?}"),
    }
}

/// Dispatch and assert a failed ack; returns the error message.
pub async fn ack_err(svc: &Arc<GameFlowService>, client: &TestClient, msg: ClientMsg) -> String {
    match svc.dispatch(client.id, msg).await {
        ServerMsg::Ack { success, error, .. } => {
            assert!(!success, "expected failure");
            error.unwrap_or_default()
        }
        other => panic!("expected ack, got {other:?}"),
    }
}

/// Create a room with `names[0]` as host, join the rest, ready everyone up.
pub async fn setup_lobby(
    svc: &Arc<GameFlowService>,
    names: &[&str],
) -> (String, Vec<TestClient>) {
    let host = TestClient::connect(svc, names[0]);
    let code = ack_ok(
        svc,
        &host,
        ClientMsg::CreateRoom {
            player_name: names[0].to_string(),
            game_mode: GameMode::Individual,
        },
    )
    .await
    .expect("create-room ack carries the code");

    let mut clients = vec![host];
    for name in &names[1..] {
        let client = TestClient::connect(svc, name);
        ack_ok(
            svc,
            &client,
            ClientMsg::JoinRoom {
                room_code: code.clone(),
                player_name: name.to_string(),
            },
        )
        .await;
        clients.push(client);
    }
    for client in &clients {
        ack_ok(
            svc,
            client,
            ClientMsg::ToggleReady {
                room_code: code.clone(),
            },
        )
        .await;
    }
    (code, clients)
}

/// Lobby plus start-game from the host.
pub async fn setup_started_game(
    svc: &Arc<GameFlowService>,
    names: &[&str],
) -> (String, Vec<TestClient>) {
    let (code, clients) = setup_lobby(svc, names).await;
    ack_ok(
        svc,
        &clients[0],
        ClientMsg::StartGame {
            room_code: code.clone(),
        },
    )
    .await;
    (code, clients)
}

pub fn client_named<'a>(clients: &'a [TestClient], name: &str) -> &'a TestClient {
    clients
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("no client named {name}"))
}

/// First card satisfying the follow-suit rule from the viewer's own hand.
pub fn pick_legal(view: &PlayerGameView) -> u8 {
    if let Some(lead) = view.led_suit {
        if let Some(card) = view.hand.iter().find(|c| c.suit == lead) {
            return card.id;
        }
    }
    view.hand.first().expect("hand is empty").id
}
