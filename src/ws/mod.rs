pub mod hub;
pub mod protocol;
pub mod session;

pub use hub::{SessionRegistry, SessionSink};
pub use protocol::{ClientMsg, RoomView, ServerMsg};
