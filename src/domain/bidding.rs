//! Nil declarations and bidding.

use crate::domain::state::{GameState, NilChoice, Phase};
use crate::errors::DomainError;

/// Record a player's nil decision during the NilPrompt phase.
///
/// Going nil locks the bid at 0. Once every player has decided, bidding
/// opens at the seat left of the dealer, skipping nil players.
pub fn nil_decision(state: &mut GameState, player: &str, go_nil: bool) -> Result<(), DomainError> {
    if state.phase != Phase::NilPrompt {
        return Err(DomainError::PhaseMismatch);
    }
    if state.index_of(player).is_none() {
        return Err(DomainError::NotInRoom);
    }
    match state.nil_bids.get(player) {
        Some(NilChoice::Undecided) | None => {}
        // Already decided: the event is stale.
        Some(_) => return Err(DomainError::PhaseMismatch),
    }

    let choice = if go_nil {
        NilChoice::Nil
    } else {
        NilChoice::SeeCards
    };
    state.nil_bids.insert(player.to_string(), choice);
    if go_nil {
        state.bids.insert(player.to_string(), 0);
    }

    maybe_open_bidding(state);
    Ok(())
}

/// Open bidding once every seat has answered the prompt.
fn maybe_open_bidding(state: &mut GameState) {
    if state.phase != Phase::NilPrompt {
        return;
    }
    let all_decided = state
        .player_order
        .iter()
        .all(|p| !matches!(state.nil_bids.get(p), Some(NilChoice::Undecided) | None));
    if all_decided {
        state.phase = Phase::Bidding;
        let from = state.bidding_start_index;
        advance_to_next_bidder(state, from);
    }
}

/// Re-evaluate progression after a seat is removed mid-round: the departed
/// player may have been the last one the nil prompt or the bidding was
/// waiting on, or the one on turn.
pub(crate) fn refresh_after_removal(state: &mut GameState) {
    match state.phase {
        Phase::NilPrompt => maybe_open_bidding(state),
        Phase::Bidding => {
            let from = state.current_player_index;
            advance_to_next_bidder(state, from);
        }
        _ => {}
    }
}

/// Place a bid for `player`. Requires the Bidding phase, being in turn, no
/// nil lock, and `0 <= bid <= current_round`.
pub fn place_bid(state: &mut GameState, player: &str, bid: u8) -> Result<(), DomainError> {
    if state.phase != Phase::Bidding {
        return Err(DomainError::PhaseMismatch);
    }
    if state.current_player() != Some(player) {
        return Err(DomainError::OutOfTurn);
    }
    if state.is_nil(player) {
        return Err(DomainError::NilBidLocked);
    }
    if bid > state.current_round {
        return Err(DomainError::InvalidBid);
    }

    state.bids.insert(player.to_string(), bid);
    let from = (state.current_player_index + 1) % state.player_count();
    advance_to_next_bidder(state, from);
    Ok(())
}

/// Move `current_player_index` to the next seat (from `from`, inclusive,
/// scanning cyclically) still owing a bid. When none remains, bidding is
/// complete and trick play begins at the first lead.
fn advance_to_next_bidder(state: &mut GameState, from: usize) {
    let n = state.player_count();
    for step in 0..n {
        let idx = (from + step) % n;
        let name = &state.player_order[idx];
        if !state.bids.contains_key(name) {
            state.current_player_index = idx;
            return;
        }
    }
    begin_playing(state);
}

fn begin_playing(state: &mut GameState) {
    state.phase = Phase::Playing;
    state.trick_number = 0;
    state.current_trick.clear();
    state.led_suit = None;
    state.current_player_index = state.first_lead_index;
}
