//! Connection registry: outbound sinks for live sessions.
//!
//! The sink is a trait so the orchestrator (and its tests) never depend on
//! actix actors; the real implementation wraps a `Recipient` in
//! `ws::session`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use crate::ws::protocol::ServerMsg;

pub trait SessionSink: Send + Sync {
    fn deliver(&self, msg: ServerMsg);
}

#[derive(Default)]
pub struct SessionRegistry {
    connections: DashMap<Uuid, Arc<dyn SessionSink>>,
    /// Session -> room code, maintained from join/create until leave/evict.
    bindings: DashMap<Uuid, String>,
    active_connections: AtomicUsize,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_connection(&self, session_id: Uuid, sink: Arc<dyn SessionSink>) {
        self.connections.insert(session_id, sink);
        let active = self.active_connections.fetch_add(1, Ordering::Relaxed) + 1;
        info!(session_id = %session_id, active_connections = active, "Session registered");
    }

    pub fn unregister_connection(&self, session_id: Uuid) -> Option<String> {
        let was_present = self.connections.remove(&session_id).is_some();
        if was_present {
            let active = self
                .active_connections
                .fetch_sub(1, Ordering::Relaxed)
                .saturating_sub(1);
            info!(session_id = %session_id, active_connections = active, "Session unregistered");
        }
        self.bindings.remove(&session_id).map(|(_, code)| code)
    }

    pub fn bind(&self, session_id: Uuid, room_code: &str) {
        self.bindings.insert(session_id, room_code.to_string());
    }

    pub fn unbind(&self, session_id: Uuid) {
        self.bindings.remove(&session_id);
    }

    pub fn binding(&self, session_id: Uuid) -> Option<String> {
        self.bindings.get(&session_id).map(|c| c.clone())
    }

    /// Drop every binding into a room; used when the host tears it down.
    pub fn evict_room(&self, room_code: &str) {
        self.bindings.retain(|_, code| code != room_code);
    }

    pub fn send(&self, session_id: Uuid, msg: ServerMsg) {
        if let Some(sink) = self.connections.get(&session_id) {
            sink.deliver(msg);
        }
    }

    pub fn active_connections_count(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct CaptureSink {
        messages: Mutex<Vec<ServerMsg>>,
    }

    impl SessionSink for CaptureSink {
        fn deliver(&self, msg: ServerMsg) {
            self.messages.lock().unwrap().push(msg);
        }
    }

    #[test]
    fn register_send_unregister() {
        let registry = SessionRegistry::new();
        let id = Uuid::new_v4();
        let sink = Arc::new(CaptureSink::default());
        registry.register_connection(id, sink.clone());
        assert_eq!(registry.active_connections_count(), 1);

        registry.send(id, ServerMsg::GameEnded);
        assert_eq!(sink.messages.lock().unwrap().len(), 1);

        registry.unregister_connection(id);
        assert_eq!(registry.active_connections_count(), 0);
        registry.send(id, ServerMsg::GameEnded);
        assert_eq!(sink.messages.lock().unwrap().len(), 1);
    }

    #[test]
    fn bindings_follow_room_lifecycle() {
        let registry = SessionRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        registry.bind(a, "AAAAAA");
        registry.bind(b, "AAAAAA");
        assert_eq!(registry.binding(a).as_deref(), Some("AAAAAA"));

        registry.evict_room("AAAAAA");
        assert_eq!(registry.binding(a), None);
        assert_eq!(registry.binding(b), None);
    }
}
