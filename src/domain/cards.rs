//! Core card types and trick comparison for the double deck.
//!
//! Two physical decks are in play (104 cards), so `(suit, rank)` alone does
//! not identify a card; `id` does, and it is stable for the life of a deal.

use serde::{Deserialize, Serialize};

pub const DECK_SIZE: usize = 104;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Numeric strength: 2..=10 at face value, J=11, Q=12, K=13, A=14.
    pub fn value(self) -> u8 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten => 10,
            Rank::Jack => 11,
            Rank::Queen => 12,
            Rank::King => 13,
            Rank::Ace => 14,
        }
    }
}

pub type CardId = u8;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub suit: Suit,
    pub rank: Rank,
    /// Which physical deck the card came from (0 or 1).
    pub deck_num: u8,
}

impl Card {
    pub fn value(&self) -> u8 {
        self.rank.value()
    }

    pub fn is_spade(&self) -> bool {
        self.suit == Suit::Spades
    }
}

/// Build both decks: ids 0..51 for deck 0, 52..103 for deck 1.
pub fn double_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    let mut id: CardId = 0;
    for deck_num in 0..2u8 {
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                deck.push(Card {
                    id,
                    suit,
                    rank,
                    deck_num,
                });
                id = id.wrapping_add(1);
            }
        }
    }
    deck
}

pub fn hand_has_suit(hand: &[Card], suit: Suit) -> bool {
    hand.iter().any(|c| c.suit == suit)
}

/// Stable display order: Spades, Hearts, Diamonds, Clubs; descending value
/// within a suit. Never used for game logic.
pub fn sort_hand(hand: &mut [Card]) {
    hand.sort_by(|a, b| {
        a.suit
            .cmp(&b.suit)
            .then_with(|| b.value().cmp(&a.value()))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Trick comparison with spades as permanent trump.
///
/// `challenger` was played after `incumbent`; on a dead tie (the twin card
/// from the other deck) the later play wins, hence the `>=`.
pub fn card_beats(challenger: Card, incumbent: Card, lead: Suit) -> bool {
    match (challenger.is_spade(), incumbent.is_spade()) {
        (true, false) => true,
        (false, true) => false,
        (true, true) => challenger.value() >= incumbent.value(),
        (false, false) => {
            let challenger_follows = challenger.suit == lead;
            let incumbent_follows = incumbent.suit == lead;
            if challenger_follows && !incumbent_follows {
                return true;
            }
            if incumbent_follows && !challenger_follows {
                return false;
            }
            if challenger_follows && incumbent_follows {
                return challenger.value() >= incumbent.value();
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: CardId, suit: Suit, rank: Rank) -> Card {
        Card {
            id,
            suit,
            rank,
            deck_num: if id >= 52 { 1 } else { 0 },
        }
    }

    #[test]
    fn double_deck_has_104_unique_ids() {
        let deck = double_deck();
        assert_eq!(deck.len(), DECK_SIZE);
        let mut ids: Vec<CardId> = deck.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), DECK_SIZE);
        assert_eq!(ids[0], 0);
        assert_eq!(ids[DECK_SIZE - 1], 103);
    }

    #[test]
    fn double_deck_has_two_of_each_suit_rank() {
        let deck = double_deck();
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                let copies: Vec<&Card> = deck
                    .iter()
                    .filter(|c| c.suit == suit && c.rank == rank)
                    .collect();
                assert_eq!(copies.len(), 2);
                assert_ne!(copies[0].deck_num, copies[1].deck_num);
            }
        }
    }

    #[test]
    fn spade_beats_any_non_spade() {
        let two_spades = card(0, Suit::Spades, Rank::Two);
        let ace_hearts = card(1, Suit::Hearts, Rank::Ace);
        assert!(card_beats(two_spades, ace_hearts, Suit::Hearts));
        assert!(!card_beats(ace_hearts, two_spades, Suit::Hearts));
    }

    #[test]
    fn within_lead_suit_value_decides() {
        let king_hearts = card(0, Suit::Hearts, Rank::King);
        let five_hearts = card(1, Suit::Hearts, Rank::Five);
        assert!(card_beats(king_hearts, five_hearts, Suit::Hearts));
        assert!(!card_beats(five_hearts, king_hearts, Suit::Hearts));
    }

    #[test]
    fn off_suit_never_beats_lead() {
        let ace_clubs = card(0, Suit::Clubs, Rank::Ace);
        let two_hearts = card(1, Suit::Hearts, Rank::Two);
        assert!(!card_beats(ace_clubs, two_hearts, Suit::Hearts));
        assert!(card_beats(two_hearts, ace_clubs, Suit::Hearts));
    }

    #[test]
    fn twin_card_later_play_wins() {
        // Same suit and rank from the two decks: the challenger (played
        // later) takes the trick.
        let first = card(7, Suit::Hearts, Rank::Nine);
        let second = card(59, Suit::Hearts, Rank::Nine);
        assert!(card_beats(second, first, Suit::Hearts));
        assert!(card_beats(first, second, Suit::Hearts));
    }

    #[test]
    fn sort_hand_orders_spades_first_descending() {
        let mut hand = vec![
            card(0, Suit::Clubs, Rank::Ace),
            card(1, Suit::Spades, Rank::Three),
            card(2, Suit::Hearts, Rank::King),
            card(3, Suit::Spades, Rank::Queen),
            card(4, Suit::Diamonds, Rank::Two),
        ];
        sort_hand(&mut hand);
        let order: Vec<(Suit, u8)> = hand.iter().map(|c| (c.suit, c.value())).collect();
        assert_eq!(
            order,
            vec![
                (Suit::Spades, 12),
                (Suit::Spades, 3),
                (Suit::Hearts, 13),
                (Suit::Diamonds, 2),
                (Suit::Clubs, 14),
            ]
        );
    }
}
