// Follow-suit legality properties over arbitrary hands.

use std::collections::HashSet;

use proptest::prelude::*;

use crate::domain::cards::{hand_has_suit, Card, CardId};
use crate::domain::state::{GameState, Phase};
use crate::domain::test_gens::{self, player_names};
use crate::domain::tricks::legal_moves;

fn playing_state_with_hand(hand: Vec<Card>, led: Option<crate::domain::cards::Suit>) -> GameState {
    let mut game = GameState::new(player_names(2), None);
    game.phase = Phase::Playing;
    game.current_round = hand.len().max(1) as u8;
    game.hands.insert("p0".to_string(), hand);
    game.hands.insert("p1".to_string(), Vec::new());
    game.led_suit = led;
    game
}

proptest! {
    #![proptest_config(crate::domain::test_prelude::proptest_config())]

    /// With lead-suit cards in hand, every legal play follows the lead and
    /// none is missing.
    #[test]
    fn legal_plays_follow_lead_when_possible(
        lead in test_gens::suit(),
        hand in test_gens::hand(),
    ) {
        let game = playing_state_with_hand(hand.clone(), Some(lead));
        let legal = legal_moves(&game, "p0");

        if hand_has_suit(&hand, lead) {
            prop_assert!(!legal.is_empty());
            for card in &legal {
                prop_assert_eq!(card.suit, lead);
            }
            let lead_count = hand.iter().filter(|c| c.suit == lead).count();
            prop_assert_eq!(legal.len(), lead_count);
        } else {
            prop_assert_eq!(&legal, &hand);
        }
    }

    /// Without a led suit (leading), the entire hand is legal, spades
    /// included.
    #[test]
    fn leading_allows_entire_hand(hand in test_gens::hand()) {
        let game = playing_state_with_hand(hand.clone(), None);
        let legal = legal_moves(&game, "p0");
        prop_assert_eq!(&legal, &hand);
    }

    /// Legal plays are always a duplicate-free subset of the hand.
    #[test]
    fn legal_plays_subset_of_hand(
        hand in test_gens::hand(),
        lead in proptest::option::of(test_gens::suit()),
    ) {
        let game = playing_state_with_hand(hand.clone(), lead);
        let legal = legal_moves(&game, "p0");

        let ids: HashSet<CardId> = legal.iter().map(|c| c.id).collect();
        prop_assert_eq!(ids.len(), legal.len());
        for card in &legal {
            prop_assert!(hand.contains(card));
        }
    }
}
