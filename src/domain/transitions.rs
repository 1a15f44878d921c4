//! Round lifecycle: dealing into a round, resolving it, advancing to the
//! next, and mid-game seat removal.

use rand::Rng;

use crate::domain::bidding;
use crate::domain::dealing::deal;
use crate::domain::scoring::{apply_round_scoring, compute_winner, RoundSummary};
use crate::domain::state::{GameState, NilChoice, Phase, MAX_ROUNDS, NIL_FIRST_ROUND};
use crate::errors::DomainError;

/// (Re)initialize state for `current_round`: deal that many cards to each
/// player, reset per-round bookkeeping, rotate the dealer, and open with the
/// nil prompt in rounds 10–11.
pub fn start_round(state: &mut GameState, rng: &mut impl Rng) -> Result<(), DomainError> {
    let round = state.current_round;
    if round == 0 || round > MAX_ROUNDS {
        return Err(DomainError::validation(format!("Invalid round {round}")));
    }
    let n = state.player_count();
    if n < 2 {
        return Err(DomainError::validation("Need at least two players"));
    }

    state.hands = deal(&state.player_order, round, rng)?;
    state.bids.clear();
    state.tricks_won = state
        .player_order
        .iter()
        .map(|p| (p.clone(), 0))
        .collect();
    state.current_trick.clear();
    state.trick_number = 0;
    state.led_suit = None;
    state.spades_broken = false;

    state.dealer_index = (round as usize - 1) % n;
    state.bidding_start_index = (state.dealer_index + 1) % n;
    state.first_lead_index = state
        .last_trick_winner
        .as_deref()
        .and_then(|w| state.index_of(w))
        .unwrap_or(state.bidding_start_index);
    state.current_player_index = state.bidding_start_index;

    let nil_round = round >= NIL_FIRST_ROUND;
    let initial = if nil_round {
        NilChoice::Undecided
    } else {
        NilChoice::SeeCards
    };
    state.nil_bids = state
        .player_order
        .iter()
        .map(|p| (p.clone(), initial))
        .collect();
    state.phase = if nil_round {
        Phase::NilPrompt
    } else {
        Phase::Bidding
    };
    Ok(())
}

/// Score the finished round and transition. Round 11 ends the game and
/// picks the winner; earlier rounds park in RoundEnd until the host's
/// next-round trigger.
pub fn resolve_round(state: &mut GameState) -> Result<RoundSummary, DomainError> {
    if state.phase != Phase::Playing {
        return Err(DomainError::PhaseMismatch);
    }
    if state.trick_number != state.current_round {
        return Err(DomainError::validation("Round still has tricks to play"));
    }

    let summary = apply_round_scoring(state);

    if state.current_round == MAX_ROUNDS {
        state.phase = Phase::GameOver;
        state.game_over = true;
        state.winner = compute_winner(state);
    } else {
        state.phase = Phase::RoundEnd;
        state.current_round += 1;
    }
    Ok(summary)
}

/// Host-triggered deal of the next round after RoundEnd.
pub fn advance_round(state: &mut GameState, rng: &mut impl Rng) -> Result<(), DomainError> {
    if state.phase != Phase::RoundEnd || state.game_over {
        return Err(DomainError::PhaseMismatch);
    }
    start_round(state, rng)
}

/// Remove a player who explicitly left mid-game. Their seat disappears from
/// the order, their remaining cards leave play, and any card they had
/// already put into the current trick goes with them: a departed seat can
/// neither complete nor win a trick, and the per-seat completion counts
/// stay exact against the shrunk table. Indices are shifted so every
/// pointer still names the same seat, then clamped into range.
pub fn remove_player(state: &mut GameState, name: &str) {
    let Some(removed) = state.index_of(name) else {
        return;
    };
    state.player_order.remove(removed);
    state.hands.remove(name);
    state.current_trick.retain(|p| p.player != name);
    // The led suit follows the trick's (possibly new) first card.
    state.led_suit = state.current_trick.first().map(|p| p.card.suit);

    let n = state.player_count();
    if n == 0 {
        return;
    }
    for idx in [
        &mut state.dealer_index,
        &mut state.bidding_start_index,
        &mut state.first_lead_index,
        &mut state.current_player_index,
    ] {
        if *idx > removed {
            *idx -= 1;
        }
        if *idx >= n {
            *idx = 0;
        }
    }
    if state.last_trick_winner.as_deref() == Some(name) {
        state.last_trick_winner = None;
    }
    // The departed player may have been the last answer the nil prompt or
    // the bidding was waiting on.
    bidding::refresh_after_removal(state);
}
