//! Domain-level error type used across the room manager, game engine, and
//! session orchestrator.
//!
//! The ws boundary classifies each error: membership errors travel back in
//! the request ack, play-legality errors become `invalid-play` messages to
//! the single caller, and stale phase/turn events are dropped without a
//! broadcast. No error path mutates state.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // Membership
    #[error("Room not found")]
    RoomNotFound,
    #[error("That name is already taken")]
    NameTaken,
    #[error("Room is full")]
    RoomFull,
    #[error("Game already started")]
    GameAlreadyStarted,
    #[error("Invalid player name: {0}")]
    InvalidName(String),
    #[error("Not a member of this room")]
    NotInRoom,
    #[error("Cannot start: {0}")]
    CannotStart(String),

    // Phase / turn (stale events; dropped silently at the boundary)
    #[error("Wrong phase for this action")]
    PhaseMismatch,
    #[error("Not your turn")]
    OutOfTurn,

    // Play legality (surfaced to the caller as invalid-play)
    #[error("Card is not in your hand")]
    CardNotInHand,
    #[error("You must follow the led suit")]
    MustFollowSuit,
    #[error("Bid must be between 0 and the round number")]
    InvalidBid,
    #[error("A nil bid is locked at zero")]
    NilBidLocked,

    // Contention: a second event raced the room lock
    #[error("Room is busy")]
    RoomBusy,

    #[error("{0}")]
    Validation(String),
}

impl DomainError {
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation(detail.into())
    }

    /// Stale-event errors are ignored rather than surfaced: the client acted
    /// on a snapshot that has since moved on.
    pub fn is_stale_event(&self) -> bool {
        matches!(self, Self::PhaseMismatch | Self::OutOfTurn)
    }

    /// Errors reported to the single caller via an `invalid-play` message.
    pub fn is_invalid_play(&self) -> bool {
        matches!(
            self,
            Self::CardNotInHand | Self::MustFollowSuit | Self::InvalidBid | Self::NilBidLocked
        )
    }
}
