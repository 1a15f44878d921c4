// Proptest generators for domain types. Cards are drawn from the actual
// double deck so ids stay unique by construction.

use proptest::prelude::*;
use rand::Rng as _;

use crate::domain::cards::{double_deck, Card, Suit};

pub fn suit() -> impl Strategy<Value = Suit> {
    prop_oneof![
        Just(Suit::Spades),
        Just(Suit::Hearts),
        Just(Suit::Diamonds),
        Just(Suit::Clubs),
    ]
}

/// `count` distinct-id cards, a random subset of the double deck.
pub fn unique_cards(count: usize) -> impl Strategy<Value = Vec<Card>> {
    Just(()).prop_perturb(move |_, mut rng| {
        let mut deck = double_deck();
        let take = count.min(deck.len());
        for i in 0..take {
            let j = rng.gen_range(i..deck.len());
            deck.swap(i, j);
        }
        deck.truncate(take);
        deck
    })
}

pub fn unique_cards_up_to(max_count: usize) -> impl Strategy<Value = Vec<Card>> {
    (1..=max_count).prop_flat_map(unique_cards)
}

/// A hand of 1..=11 cards (the largest round deals 11).
pub fn hand() -> impl Strategy<Value = Vec<Card>> {
    unique_cards_up_to(11)
}

pub fn player_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("p{i}")).collect()
}
