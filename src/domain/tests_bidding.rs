use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::bidding::{nil_decision, place_bid};
use crate::domain::state::{GameState, NilChoice, Phase};
use crate::domain::test_gens::player_names;
use crate::domain::transitions::start_round;
use crate::errors::DomainError;

fn game_at_round(n: usize, round: u8, seed: u64) -> GameState {
    let mut game = GameState::new(player_names(n), None);
    game.current_round = round;
    start_round(&mut game, &mut StdRng::seed_from_u64(seed)).unwrap();
    game
}

#[test]
fn nil_prompt_only_in_rounds_ten_and_eleven() {
    for round in 1..=9u8 {
        assert_eq!(game_at_round(3, round, 1).phase, Phase::Bidding);
    }
    assert_eq!(game_at_round(3, 10, 1).phase, Phase::NilPrompt);
    assert_eq!(game_at_round(3, 11, 1).phase, Phase::NilPrompt);
}

#[test]
fn nil_decision_rejected_outside_prompt() {
    let mut game = game_at_round(3, 5, 1);
    assert_eq!(
        nil_decision(&mut game, "p0", true),
        Err(DomainError::PhaseMismatch)
    );
}

#[test]
fn going_nil_locks_bid_at_zero() {
    let mut game = game_at_round(3, 10, 1);
    nil_decision(&mut game, "p1", true).unwrap();
    assert_eq!(game.bids.get("p1"), Some(&0));
    assert_eq!(game.nil_bids.get("p1"), Some(&NilChoice::Nil));

    nil_decision(&mut game, "p0", false).unwrap();
    nil_decision(&mut game, "p2", false).unwrap();
    assert_eq!(game.phase, Phase::Bidding);

    // p1 is locked out of normal bidding entirely.
    let err = place_bid(&mut game, "p1", 2).unwrap_err();
    assert!(matches!(
        err,
        DomainError::OutOfTurn | DomainError::NilBidLocked
    ));
}

#[test]
fn bidding_skips_nil_players() {
    // Round 10, 3 players: dealer is p0 ((10-1) % 3 = 0), bidding starts p1.
    let mut game = game_at_round(3, 10, 1);
    assert_eq!(game.dealer_index, 0);
    nil_decision(&mut game, "p1", true).unwrap();
    nil_decision(&mut game, "p0", false).unwrap();
    nil_decision(&mut game, "p2", false).unwrap();

    // p1 went nil, so the first live bidder is p2.
    assert_eq!(game.current_player(), Some("p2"));
    place_bid(&mut game, "p2", 3).unwrap();
    assert_eq!(game.current_player(), Some("p0"));
    place_bid(&mut game, "p0", 0).unwrap();
    assert_eq!(game.phase, Phase::Playing);
}

#[test]
fn all_nil_goes_straight_to_playing() {
    let mut game = game_at_round(2, 10, 1);
    nil_decision(&mut game, "p0", true).unwrap();
    nil_decision(&mut game, "p1", true).unwrap();
    assert_eq!(game.phase, Phase::Playing);
    assert_eq!(game.current_player_index, game.first_lead_index);
}

#[test]
fn bid_must_be_within_round_range() {
    let mut game = game_at_round(3, 2, 1);
    let first = game.current_player().unwrap().to_string();
    assert_eq!(
        place_bid(&mut game, &first, 3),
        Err(DomainError::InvalidBid)
    );
    // The round number itself is a legal bid.
    assert!(place_bid(&mut game, &first, 2).is_ok());
}

#[test]
fn out_of_turn_bid_rejected() {
    let mut game = game_at_round(3, 1, 1);
    // Bidding starts left of the dealer (p1); p2 may not preempt.
    assert_eq!(game.current_player(), Some("p1"));
    assert_eq!(place_bid(&mut game, "p2", 1), Err(DomainError::OutOfTurn));
    assert!(game.bids.is_empty());
}

#[test]
fn bidding_completion_moves_to_first_lead() {
    let mut game = game_at_round(3, 1, 1);
    place_bid(&mut game, "p1", 1).unwrap();
    place_bid(&mut game, "p2", 0).unwrap();
    assert_eq!(game.phase, Phase::Bidding);
    place_bid(&mut game, "p0", 0).unwrap();
    assert_eq!(game.phase, Phase::Playing);
    // Round 1 has no previous trick winner: first lead is left of dealer.
    assert_eq!(game.current_player_index, game.bidding_start_index);
    assert_eq!(game.trick_number, 0);
    assert!(game.current_trick.is_empty());
}
