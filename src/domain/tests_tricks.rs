use crate::domain::cards::{Card, Rank, Suit};
use crate::domain::state::{GameState, NilChoice, Phase};
use crate::domain::tricks::{legal_moves, play_card, resolve_trick};
use crate::errors::DomainError;

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
fn spade_trumps_led_suit() {
    // B leads 5H, C follows KH, A ruffs 2S: A takes the trick.
    let five_h = c(0, Suit::Hearts, Rank::Five);
    let king_h = c(1, Suit::Hearts, Rank::King);
    let two_s = c(2, Suit::Spades, Rank::Two);
    let mut game = playing_game(
        &["A", "B", "C"],
        vec![vec![two_s], vec![five_h], vec![king_h]],
        1,
    );

    assert!(!play_card(&mut game, "B", five_h.id).unwrap());
    assert_eq!(game.led_suit, Some(Suit::Hearts));
    assert!(!play_card(&mut game, "C", king_h.id).unwrap());
    assert!(play_card(&mut game, "A", two_s.id).unwrap());
    assert!(game.spades_broken);

    let result = resolve_trick(&mut game).unwrap();
    assert_eq!(result.winner, "A");
    assert_eq!(result.winning_card.id, two_s.id);
    assert!(result.round_over);
    assert_eq!(game.tricks_won.get("A"), Some(&1));
    assert_eq!(game.tricks_won.get("B"), Some(&0));
    assert_eq!(game.last_trick_winner.as_deref(), Some("A"));
}

#[test]
fn must_follow_led_suit_when_able() {
    let lead = c(0, Suit::Hearts, Rank::Nine);
    let heart = c(1, Suit::Hearts, Rank::Two);
    let club = c(2, Suit::Clubs, Rank::Ace);
    let filler = c(3, Suit::Diamonds, Rank::Six);
    let mut game = playing_game(
        &["A", "B"],
        vec![vec![lead, filler], vec![heart, club]],
        0,
    );

    play_card(&mut game, "A", lead.id).unwrap();
    assert_eq!(
        play_card(&mut game, "B", club.id),
        Err(DomainError::MustFollowSuit)
    );
    // The illegal attempt left everything in place.
    assert_eq!(game.hand("B").len(), 2);
    assert_eq!(game.current_trick.len(), 1);
    assert!(play_card(&mut game, "B", heart.id).is_ok());
}

#[test]
fn void_in_led_suit_may_discard_anything() {
    let lead = c(0, Suit::Hearts, Rank::Nine);
    let club = c(1, Suit::Clubs, Rank::Three);
    let mut game = playing_game(&["A", "B"], vec![vec![lead], vec![club]], 0);

    play_card(&mut game, "A", lead.id).unwrap();
    assert!(play_card(&mut game, "B", club.id).is_ok());
}

#[test]
fn leading_spades_is_always_legal() {
    let spade = c(0, Suit::Spades, Rank::Ace);
    let heart = c(1, Suit::Hearts, Rank::Two);
    let other = c(2, Suit::Clubs, Rank::Two);
    let mut game = playing_game(
        &["A", "B"],
        vec![vec![spade, heart], vec![other, c(3, Suit::Diamonds, Rank::Two)]],
        0,
    );

    // Spades not yet broken; leading one is still fine in this variant.
    assert!(!game.spades_broken);
    let legal = legal_moves(&game, "A");
    assert!(legal.iter().any(|card| card.id == spade.id));
    assert!(play_card(&mut game, "A", spade.id).is_ok());
    assert!(game.spades_broken);
}

#[test]
fn twin_cards_later_play_wins_trick() {
    let first_nine = c(7, Suit::Hearts, Rank::Nine);
    let second_nine = c(59, Suit::Hearts, Rank::Nine);
    let low = c(1, Suit::Hearts, Rank::Two);
    let mut game = playing_game(
        &["A", "B", "C"],
        vec![vec![first_nine], vec![second_nine], vec![low]],
        0,
    );

    play_card(&mut game, "A", first_nine.id).unwrap();
    play_card(&mut game, "B", second_nine.id).unwrap();
    play_card(&mut game, "C", low.id).unwrap();
    let result = resolve_trick(&mut game).unwrap();
    assert_eq!(result.winner, "B");
    assert_eq!(result.winning_card.id, second_nine.id);
}

#[test]
fn winner_leads_next_trick() {
    let ace_h = c(0, Suit::Hearts, Rank::Ace);
    let two_h = c(1, Suit::Hearts, Rank::Two);
    let filler_a = c(2, Suit::Clubs, Rank::Five);
    let filler_b = c(3, Suit::Diamonds, Rank::Five);
    let mut game = playing_game(
        &["A", "B"],
        vec![vec![ace_h, filler_a], vec![two_h, filler_b]],
        1,
    );

    play_card(&mut game, "B", two_h.id).unwrap();
    play_card(&mut game, "A", ace_h.id).unwrap();
    let result = resolve_trick(&mut game).unwrap();
    assert_eq!(result.winner, "A");
    assert!(!result.round_over);
    // A leads trick two; the trick state is cleared.
    assert_eq!(game.current_player(), Some("A"));
    assert!(game.current_trick.is_empty());
    assert_eq!(game.led_suit, None);
    assert_eq!(game.trick_number, 1);
}

#[test]
fn play_rejected_when_trick_is_full() {
    let a1 = c(0, Suit::Hearts, Rank::Three);
    let a2 = c(1, Suit::Clubs, Rank::Three);
    let b1 = c(2, Suit::Hearts, Rank::Four);
    let b2 = c(3, Suit::Clubs, Rank::Four);
    let mut game = playing_game(&["A", "B"], vec![vec![a1, a2], vec![b1, b2]], 0);

    play_card(&mut game, "A", a1.id).unwrap();
    assert!(play_card(&mut game, "B", b1.id).unwrap());
    // Settlement has not run yet; nobody may slip in another card.
    assert_eq!(play_card(&mut game, "A", a2.id), Err(DomainError::OutOfTurn));
    assert_eq!(play_card(&mut game, "B", b2.id), Err(DomainError::OutOfTurn));
}

#[test]
fn replaying_a_spent_card_is_rejected() {
    let a1 = c(0, Suit::Hearts, Rank::Three);
    let b1 = c(2, Suit::Hearts, Rank::Four);
    let a2 = c(1, Suit::Clubs, Rank::Three);
    let b2 = c(3, Suit::Clubs, Rank::Four);
    let mut game = playing_game(&["A", "B"], vec![vec![a1, a2], vec![b1, b2]], 0);

    play_card(&mut game, "A", a1.id).unwrap();
    play_card(&mut game, "B", b1.id).unwrap();
    resolve_trick(&mut game).unwrap();

    // The duplicate of an earlier race: the card is simply gone.
    let winner = game.current_player().unwrap().to_string();
    let spent = if winner == "A" { a1.id } else { b1.id };
    assert_eq!(
        play_card(&mut game, &winner, spent),
        Err(DomainError::CardNotInHand)
    );
}
