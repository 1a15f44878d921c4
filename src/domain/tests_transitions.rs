use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::bidding::{nil_decision, place_bid};
use crate::domain::cards::{Card, Rank, Suit};
use crate::domain::state::{GameState, NilChoice, Phase, WinnerKind, MAX_ROUNDS};
use crate::domain::test_gens::player_names;
use crate::domain::transitions::{advance_round, remove_player, resolve_round, start_round};
use crate::domain::tricks::{play_card, resolve_trick};
use crate::errors::DomainError;

fn fresh(n: usize) -> GameState {
    GameState::new(player_names(n), None)
}

fn c(id: u8, suit: Suit, rank: Rank) -> Card {
    Card {
        id,
        suit,
        rank,
        deck_num: if id >= 52 { 1 } else { 0 },
    }
}

/// A Playing-phase game with hand-built hands, bypassing the dealer.
fn playing_game(order: &[&str], hands: Vec<Vec<Card>>, lead_index: usize) -> GameState {
    let order: Vec<String> = order.iter().map(|s| s.to_string()).collect();
    let mut game = GameState::new(order.clone(), None);
    game.current_round = hands[0].len() as u8;
    game.phase = Phase::Playing;
    game.hands = order.iter().cloned().zip(hands).collect();
    game.tricks_won = order.iter().map(|p| (p.clone(), 0)).collect();
    game.nil_bids = order
        .iter()
        .map(|p| (p.clone(), NilChoice::SeeCards))
        .collect();
    game.first_lead_index = lead_index;
    game.current_player_index = lead_index;
    game
}

#[test]
fn start_round_deals_round_cards_each() {
    for n in 2..=8usize {
        for round in 1..=MAX_ROUNDS {
            let mut game = fresh(n);
            game.current_round = round;
            start_round(&mut game, &mut StdRng::seed_from_u64(9)).unwrap();
            for p in &game.player_order {
                assert_eq!(game.hand(p).len(), round as usize);
            }
            assert_eq!(game.trick_number, 0);
            assert!(game.current_trick.is_empty());
            assert!(!game.spades_broken);
            assert!(game.bids.is_empty());
        }
    }
}

#[test]
fn dealer_rotates_with_round_number() {
    for round in 1..=MAX_ROUNDS {
        let mut game = fresh(4);
        game.current_round = round;
        start_round(&mut game, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(game.dealer_index, (round as usize - 1) % 4);
        assert_eq!(game.bidding_start_index, (game.dealer_index + 1) % 4);
    }
}

#[test]
fn first_lead_follows_last_trick_winner() {
    let mut game = fresh(3);
    game.current_round = 2;
    game.last_trick_winner = Some("p2".to_string());
    start_round(&mut game, &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(game.first_lead_index, 2);
    // Bidding still starts left of the dealer.
    assert_eq!(game.current_player_index, game.bidding_start_index);
}

#[test]
fn first_round_lead_defaults_to_left_of_dealer() {
    let mut game = fresh(3);
    start_round(&mut game, &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(game.first_lead_index, game.bidding_start_index);
}

#[test]
fn resolve_round_parks_in_round_end_and_bumps_round() {
    let mut game = fresh(2);
    game.current_round = 3;
    game.phase = Phase::Playing;
    game.trick_number = 3;
    for p in player_names(2) {
        game.bids.insert(p.clone(), 0);
        game.tricks_won.insert(p.clone(), if p == "p0" { 3 } else { 0 });
        game.hands.insert(p, Vec::new());
    }
    let summary = resolve_round(&mut game).unwrap();
    assert_eq!(summary.round, 3);
    assert_eq!(game.phase, Phase::RoundEnd);
    assert_eq!(game.current_round, 4);
    assert!(!game.game_over);

    // The host trigger re-deals for round 4.
    advance_round(&mut game, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(game.phase, Phase::Bidding);
    for p in &game.player_order {
        assert_eq!(game.hand(p).len(), 4);
    }
}

#[test]
fn resolve_round_rejects_unfinished_round() {
    let mut game = fresh(2);
    game.current_round = 3;
    game.phase = Phase::Playing;
    game.trick_number = 2;
    assert!(resolve_round(&mut game).is_err());
}

#[test]
fn round_eleven_ends_the_game_with_a_winner() {
    let mut game = fresh(3);
    game.current_round = MAX_ROUNDS;
    game.phase = Phase::Playing;
    game.trick_number = MAX_ROUNDS;
    for (i, p) in player_names(3).into_iter().enumerate() {
        game.bids.insert(p.clone(), 0);
        game.tricks_won
            .insert(p.clone(), if i == 0 { MAX_ROUNDS } else { 0 });
        game.hands.insert(p.clone(), Vec::new());
        game.scores.insert(p, (i as i32) * 10);
    }
    resolve_round(&mut game).unwrap();
    assert_eq!(game.phase, Phase::GameOver);
    assert!(game.game_over);
    let winner = game.winner.as_ref().unwrap();
    assert_eq!(winner.kind, WinnerKind::Player);
    // p0: 0 + 11 tricks on a zero bid = 11; p1: 10; p2: 20. p2 wins.
    assert_eq!(winner.name, "p2");
    assert_eq!(winner.score, 20);

    assert!(advance_round(&mut game, &mut StdRng::seed_from_u64(1)).is_err());
}

#[test]
fn advance_round_requires_round_end() {
    let mut game = fresh(2);
    start_round(&mut game, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(
        advance_round(&mut game, &mut StdRng::seed_from_u64(2)),
        Err(DomainError::PhaseMismatch)
    );
}

#[test]
fn remove_player_shifts_and_clamps_indices() {
    let mut game = fresh(4);
    start_round(&mut game, &mut StdRng::seed_from_u64(8)).unwrap();
    game.current_player_index = 3;
    game.dealer_index = 1;

    remove_player(&mut game, "p1");
    assert_eq!(game.player_order, vec!["p0", "p2", "p3"]);
    assert!(game.hands.get("p1").is_none());
    // Index 3 pointed at p3, which slid down to 2.
    assert_eq!(game.current_player_index, 2);
    // The dealer seat itself vanished; its pointer stays in range.
    assert!(game.dealer_index < game.player_count());

    // Removing an unknown name is a no-op.
    remove_player(&mut game, "nobody");
    assert_eq!(game.player_count(), 3);
}

#[test]
fn leaver_takes_their_trick_card_along() {
    // p0 leads into the trick and then leaves: the play disappears, the
    // next seat leads fresh, and the remaining seats finish the trick.
    let heart_five = c(0, Suit::Hearts, Rank::Five);
    let club_ace = c(1, Suit::Clubs, Rank::Ace);
    let heart_two = c(2, Suit::Hearts, Rank::Two);
    let mut game = playing_game(
        &["p0", "p1", "p2"],
        vec![vec![heart_five], vec![club_ace], vec![heart_two]],
        0,
    );

    assert!(!play_card(&mut game, "p0", heart_five.id).unwrap());
    remove_player(&mut game, "p0");

    assert_eq!(game.player_order, vec!["p1", "p2"]);
    assert!(game.current_trick.is_empty());
    assert_eq!(game.led_suit, None);
    assert_eq!(game.current_player(), Some("p1"));
    // Dealt cards over the remaining seats are fully accounted for.
    assert_eq!(game.cards_in_play(), game.current_round as usize * 2);

    // The trick only completes once BOTH live seats have played.
    assert!(!play_card(&mut game, "p1", club_ace.id).unwrap());
    assert_eq!(game.led_suit, Some(Suit::Clubs));
    assert!(play_card(&mut game, "p2", heart_two.id).unwrap());

    let result = resolve_trick(&mut game).unwrap();
    assert_eq!(result.winner, "p1");
    assert_eq!(game.tricks_won.get("p1"), Some(&1));
    assert!(result.round_over);
}

#[test]
fn leaver_mid_trick_keeps_led_suit_of_remaining_lead() {
    // p0 led and p1 followed before p0 leaves: p1's card is now the
    // trick's first play and the led suit stays with it.
    let heart_five = c(0, Suit::Hearts, Rank::Five);
    let heart_king = c(1, Suit::Hearts, Rank::King);
    let club_two = c(2, Suit::Clubs, Rank::Two);
    let mut game = playing_game(
        &["p0", "p1", "p2"],
        vec![vec![heart_five], vec![heart_king], vec![club_two]],
        0,
    );

    play_card(&mut game, "p0", heart_five.id).unwrap();
    play_card(&mut game, "p1", heart_king.id).unwrap();
    remove_player(&mut game, "p0");

    assert_eq!(game.current_trick.len(), 1);
    assert_eq!(game.led_suit, Some(Suit::Hearts));
    assert_eq!(game.current_player(), Some("p2"));

    assert!(play_card(&mut game, "p2", club_two.id).unwrap());
    let result = resolve_trick(&mut game).unwrap();
    assert_eq!(result.winner, "p1");
}

#[test]
fn departure_completes_a_waiting_trick() {
    // Two seats have played and the third leaves instead of playing: the
    // trick is complete as it stands and resolves among the live plays.
    let heart_five = c(0, Suit::Hearts, Rank::Five);
    let heart_king = c(1, Suit::Hearts, Rank::King);
    let club_two = c(2, Suit::Clubs, Rank::Two);
    let mut game = playing_game(
        &["p0", "p1", "p2"],
        vec![vec![heart_five], vec![heart_king], vec![club_two]],
        0,
    );

    play_card(&mut game, "p0", heart_five.id).unwrap();
    play_card(&mut game, "p1", heart_king.id).unwrap();
    remove_player(&mut game, "p2");

    assert_eq!(game.current_trick.len(), game.player_count());
    let result = resolve_trick(&mut game).unwrap();
    assert_eq!(result.winner, "p1");
    assert!(result.round_over);
    assert_eq!(game.last_trick_winner.as_deref(), Some("p1"));
}

#[test]
fn removing_the_last_bidder_opens_play() {
    let mut game = fresh(3);
    game.current_round = 2;
    start_round(&mut game, &mut StdRng::seed_from_u64(21)).unwrap();
    // Round 2: dealer p1, bidding starts at p2.
    place_bid(&mut game, "p2", 0).unwrap();
    place_bid(&mut game, "p0", 0).unwrap();
    assert_eq!(game.current_player(), Some("p1"));

    remove_player(&mut game, "p1");
    assert_eq!(game.phase, Phase::Playing);
    assert_eq!(game.player_order, vec!["p0", "p2"]);
    assert_eq!(game.current_player_index, game.first_lead_index);
}

#[test]
fn removing_the_last_nil_holdout_opens_bidding() {
    let mut game = fresh(3);
    game.current_round = 10;
    start_round(&mut game, &mut StdRng::seed_from_u64(22)).unwrap();
    nil_decision(&mut game, "p0", false).unwrap();
    nil_decision(&mut game, "p1", true).unwrap();
    assert_eq!(game.phase, Phase::NilPrompt);

    remove_player(&mut game, "p2");
    assert_eq!(game.phase, Phase::Bidding);
    // p1 went nil and is skipped; p0 is the first live bidder.
    assert_eq!(game.current_player(), Some("p0"));
}
