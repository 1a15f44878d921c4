//! Websocket session actor.
//!
//! One actor per connected client: heartbeats, JSON parsing, dispatch into
//! the orchestrator, and delivery of outbound messages. Game state never
//! lives here; the actor is a dumb pipe with a session id.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::game_flow::GameFlowService;
use crate::ws::hub::SessionSink;
use crate::ws::protocol::{ClientMsg, ErrorCode, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct OutboundMessage(pub ServerMsg);

/// Sink handed to the registry: delivery is a non-blocking actor send.
pub struct RecipientSink {
    recipient: Recipient<OutboundMessage>,
}

impl SessionSink for RecipientSink {
    fn deliver(&self, msg: ServerMsg) {
        self.recipient.do_send(OutboundMessage(msg));
    }
}

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    service: web::Data<Arc<GameFlowService>>,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(service.get_ref().clone());
    ws::start(session, &req, stream)
}

pub struct WsSession {
    conn_id: Uuid,
    service: Arc<GameFlowService>,
    last_heartbeat: Instant,
}

impl WsSession {
    pub fn new(service: Arc<GameFlowService>) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            service,
            last_heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "Failed to serialize outbound message"),
        }
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = %actor.conn_id, "Heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "Websocket session started");
        let sink = Arc::new(RecipientSink {
            recipient: ctx.address().recipient::<OutboundMessage>(),
        });
        self.service.registry().register_connection(self.conn_id, sink);
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "Websocket session stopped");
        let service = self.service.clone();
        let conn_id = self.conn_id;
        actix::spawn(async move {
            service.handle_disconnect(conn_id).await;
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();

                let parsed: Result<ClientMsg, _> = serde_json::from_str(&text);
                let Ok(cmd) = parsed else {
                    Self::send_json(
                        ctx,
                        &ServerMsg::Error {
                            code: ErrorCode::BadRequest,
                            message: "Malformed request".to_string(),
                        },
                    );
                    return;
                };

                let service = self.service.clone();
                let conn_id = self.conn_id;
                ctx.spawn(
                    async move { service.dispatch(conn_id, cmd).await }
                        .into_actor(self)
                        .map(|ack, _actor, ctx| Self::send_json(ctx, &ack)),
                );
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                Self::send_json(
                    ctx,
                    &ServerMsg::Error {
                        code: ErrorCode::BadRequest,
                        message: "Binary not supported".to_string(),
                    },
                );
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "Websocket protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<OutboundMessage> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: OutboundMessage, ctx: &mut Self::Context) -> Self::Result {
        Self::send_json(ctx, &msg.0);
    }
}
