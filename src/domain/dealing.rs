//! Shuffling and dealing over the double deck.
//!
//! Production callers shuffle with the thread RNG; tests pass a seeded
//! `StdRng` so deals are reproducible.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::cards::{double_deck, sort_hand, Card, DECK_SIZE};
use crate::errors::DomainError;

/// Fisher-Yates shuffle of a fresh double deck.
pub fn shuffled_deck(rng: &mut impl Rng) -> Vec<Card> {
    let mut deck = double_deck();
    deck.shuffle(rng);
    deck
}

/// Deal `hand_size` cards to each player in order, as consecutive blocks off
/// the top of a shuffled deck. Hands come back display-sorted.
pub fn deal(
    player_order: &[String],
    hand_size: u8,
    rng: &mut impl Rng,
) -> Result<HashMap<String, Vec<Card>>, DomainError> {
    let needed = player_order.len() * hand_size as usize;
    if needed > DECK_SIZE {
        return Err(DomainError::validation(format!(
            "Cannot deal {hand_size} cards to {} players from {DECK_SIZE}",
            player_order.len()
        )));
    }

    let deck = shuffled_deck(rng);
    let mut hands = HashMap::with_capacity(player_order.len());
    for (i, name) in player_order.iter().enumerate() {
        let start = i * hand_size as usize;
        let mut hand = deck[start..start + hand_size as usize].to_vec();
        sort_hand(&mut hand);
        hands.insert(name.clone(), hand);
    }
    Ok(hands)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::domain::cards::CardId;

    fn players(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("p{i}")).collect()
    }

    #[test]
    fn deal_is_deterministic_for_a_seed() {
        let order = players(4);
        let h1 = deal(&order, 7, &mut StdRng::seed_from_u64(12345)).unwrap();
        let h2 = deal(&order, 7, &mut StdRng::seed_from_u64(12345)).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn deal_different_seeds_differ() {
        let order = players(4);
        let h1 = deal(&order, 7, &mut StdRng::seed_from_u64(12345)).unwrap();
        let h2 = deal(&order, 7, &mut StdRng::seed_from_u64(54321)).unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn deal_no_duplicate_ids_across_hands() {
        for round in 1..=11u8 {
            for n in 2..=8usize {
                let order = players(n);
                let hands = deal(&order, round, &mut StdRng::seed_from_u64(42)).unwrap();
                let mut seen: HashSet<CardId> = HashSet::new();
                for name in &order {
                    let hand = &hands[name];
                    assert_eq!(hand.len(), round as usize);
                    for c in hand {
                        assert!(seen.insert(c.id), "card id {} dealt twice", c.id);
                    }
                }
                assert_eq!(seen.len(), round as usize * n);
            }
        }
    }

    #[test]
    fn deal_rejects_oversized_request() {
        let order = players(8);
        // 8 players x 14 cards = 112 > 104
        assert!(deal(&order, 14, &mut StdRng::seed_from_u64(1)).is_err());
        assert!(deal(&order, 13, &mut StdRng::seed_from_u64(1)).is_ok());
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let shuffled = shuffled_deck(&mut StdRng::seed_from_u64(7));
        let mut ids: Vec<CardId> = shuffled.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        let expected: Vec<CardId> = (0..DECK_SIZE as u8).collect();
        assert_eq!(ids, expected);
    }
}
