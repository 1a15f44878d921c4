// Trick comparison and resolution properties.

use proptest::prelude::*;

use crate::domain::cards::{card_beats, Card, Suit};
use crate::domain::state::{GameState, NilChoice, Phase};
use crate::domain::test_gens::{self, player_names};
use crate::domain::tricks::{play_card, resolve_trick};

proptest! {
    #![proptest_config(crate::domain::test_prelude::proptest_config())]

    /// `card_beats` is transitive for a fixed led suit.
    #[test]
    fn card_beats_is_transitive(
        lead in test_gens::suit(),
        cards in test_gens::unique_cards(3),
    ) {
        let (a, b, c) = (cards[0], cards[1], cards[2]);
        if card_beats(a, b, lead) && card_beats(b, c, lead) {
            prop_assert!(
                card_beats(a, c, lead),
                "{a:?} beats {b:?} beats {c:?} but not {a:?} beats {c:?} (lead {lead:?})"
            );
        }
    }

    /// Resolving a full trick of single-card hands: a spade wins whenever
    /// one was played, otherwise the led suit wins; the winner's tally and
    /// the trick counter move exactly once.
    #[test]
    fn trick_winner_respects_trump_and_lead(cards in test_gens::unique_cards_up_to(8)) {
        prop_assume!(cards.len() >= 2);
        let n = cards.len();
        let names = player_names(n);
        let mut game = GameState::new(names.clone(), None);
        game.current_round = 1;
        game.phase = Phase::Playing;
        for (name, card) in names.iter().zip(&cards) {
            game.hands.insert(name.clone(), vec![*card]);
            game.tricks_won.insert(name.clone(), 0);
            game.nil_bids.insert(name.clone(), NilChoice::SeeCards);
        }

        for (name, card) in names.iter().zip(&cards) {
            // One-card hands are always legal to play.
            play_card(&mut game, name, card.id).unwrap();
        }
        let lead = cards[0].suit;
        let result = resolve_trick(&mut game).unwrap();
        let winner_idx = names.iter().position(|p| *p == result.winner).unwrap();
        let winning: Card = cards[winner_idx];

        if cards.iter().any(|c| c.suit == Suit::Spades) {
            prop_assert_eq!(winning.suit, Suit::Spades);
            let best = cards
                .iter()
                .filter(|c| c.suit == Suit::Spades)
                .map(|c| c.value())
                .max()
                .unwrap();
            prop_assert_eq!(winning.value(), best);
        } else {
            prop_assert_eq!(winning.suit, lead);
            let best = cards
                .iter()
                .filter(|c| c.suit == lead)
                .map(|c| c.value())
                .max()
                .unwrap();
            prop_assert_eq!(winning.value(), best);
        }

        prop_assert_eq!(game.tricks_won[&result.winner], 1);
        let total: u8 = game.tricks_won.values().sum();
        prop_assert_eq!(total, 1);
        prop_assert!(result.round_over);
    }
}
