//! Trick play: legality, card placement, and trick resolution.

use serde::Serialize;

use crate::domain::cards::{card_beats, hand_has_suit, Card, CardId};
use crate::domain::state::{GameState, Phase, TrickPlay};
use crate::errors::DomainError;

/// Result of resolving a completed trick.
#[derive(Debug, Clone, Serialize)]
pub struct TrickResult {
    pub winner: String,
    pub winning_card: Card,
    pub trick: Vec<TrickPlay>,
    pub round_over: bool,
}

/// Cards `player` may legally put into the current trick, independent of
/// turn enforcement. Leading is unrestricted, spades included.
pub fn legal_moves(state: &GameState, player: &str) -> Vec<Card> {
    if state.phase != Phase::Playing {
        return Vec::new();
    }
    let hand = state.hand(player);
    if let Some(lead) = state.led_suit {
        if hand_has_suit(hand, lead) {
            return hand.iter().copied().filter(|c| c.suit == lead).collect();
        }
    }
    hand.to_vec()
}

/// Play a card into the current trick, enforcing phase, turn, possession,
/// and suit-following. Returns whether the trick is now complete (the
/// caller schedules resolution; state holds the full trick until then).
pub fn play_card(state: &mut GameState, player: &str, card_id: CardId) -> Result<bool, DomainError> {
    if state.phase != Phase::Playing {
        return Err(DomainError::PhaseMismatch);
    }
    // A full trick is waiting on resolution; any further play is stale.
    if state.current_trick.len() >= state.player_count() {
        return Err(DomainError::OutOfTurn);
    }
    if state.current_player() != Some(player) {
        return Err(DomainError::OutOfTurn);
    }

    let hand = state.hand(player);
    let Some(pos) = hand.iter().position(|c| c.id == card_id) else {
        return Err(DomainError::CardNotInHand);
    };
    let card = hand[pos];
    if let Some(lead) = state.led_suit {
        if card.suit != lead && hand_has_suit(hand, lead) {
            return Err(DomainError::MustFollowSuit);
        }
    }

    if let Some(hand) = state.hands.get_mut(player) {
        hand.remove(pos);
    }
    if state.current_trick.is_empty() {
        state.led_suit = Some(card.suit);
    }
    if card.is_spade() {
        state.spades_broken = true;
    }
    state.current_trick.push(TrickPlay {
        player: player.to_string(),
        card,
    });

    let complete = state.current_trick.len() == state.player_count();
    if !complete {
        state.current_player_index = (state.current_player_index + 1) % state.player_count();
    }
    #[cfg(debug_assertions)]
    state.debug_check_conservation();
    Ok(complete)
}

/// Resolve the full current trick: fold `card_beats` left to right, credit
/// the winner, and either hand them the next lead or flag the round as over.
pub fn resolve_trick(state: &mut GameState) -> Result<TrickResult, DomainError> {
    if state.phase != Phase::Playing {
        return Err(DomainError::PhaseMismatch);
    }
    // Every live seat must have played. A mid-trick leaver's card is
    // stripped at removal, so the count is exact against the current table.
    if state.current_trick.is_empty() || state.current_trick.len() < state.player_count() {
        return Err(DomainError::validation("Trick is not complete"));
    }
    let lead = state
        .led_suit
        .ok_or_else(|| DomainError::validation("Trick has no led suit"))?;

    let mut best = 0usize;
    for i in 1..state.current_trick.len() {
        if card_beats(state.current_trick[i].card, state.current_trick[best].card, lead) {
            best = i;
        }
    }
    let winner = state.current_trick[best].player.clone();
    let winning_card = state.current_trick[best].card;

    *state.tricks_won.entry(winner.clone()).or_insert(0) += 1;
    state.last_trick_winner = Some(winner.clone());
    state.trick_number += 1;

    let trick = std::mem::take(&mut state.current_trick);
    state.led_suit = None;

    let round_over = state.trick_number == state.current_round;
    if !round_over {
        if let Some(idx) = state.index_of(&winner) {
            state.current_player_index = idx;
        }
    }

    Ok(TrickResult {
        winner,
        winning_card,
        trick,
        round_over,
    })
}
