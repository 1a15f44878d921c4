//! Per-recipient projection of game state.
//!
//! The full `GameState` never leaves the server: each player receives their
//! own hand plus card counts for everyone else. A player who has not yet
//! answered the nil prompt sees no hand at all, since going nil means deciding
//! before seeing cards.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::cards::{Card, Suit};
use crate::domain::state::{
    GameState, NilChoice, Phase, RoundRecord, TrickPlay, Winner,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerGameView {
    pub current_round: u8,
    pub phase: Phase,
    pub player_order: Vec<String>,
    pub dealer_index: usize,
    pub current_player_index: usize,
    pub current_player: Option<String>,
    pub hand: Vec<Card>,
    pub other_hand_counts: HashMap<String, usize>,
    pub bids: HashMap<String, u8>,
    pub nil_bids: HashMap<String, NilChoice>,
    pub tricks_won: HashMap<String, u8>,
    pub current_trick: Vec<TrickPlay>,
    pub trick_number: u8,
    pub led_suit: Option<Suit>,
    pub spades_broken: bool,
    pub last_trick_winner: Option<String>,
    pub scores: HashMap<String, i32>,
    pub overtrick_bag: HashMap<String, u32>,
    pub round_history: HashMap<String, Vec<RoundRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub team_scores: BTreeMap<String, i32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub team_overtrick_bag: BTreeMap<String, u32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub team_round_history: BTreeMap<String, Vec<RoundRecord>>,
    pub game_over: bool,
    pub winner: Option<Winner>,
}

pub fn player_view(state: &GameState, viewer: &str) -> PlayerGameView {
    let undecided = state.phase == Phase::NilPrompt
        && matches!(
            state.nil_bids.get(viewer),
            Some(NilChoice::Undecided) | None
        );
    let hand = if undecided {
        Vec::new()
    } else {
        state.hand(viewer).to_vec()
    };

    let other_hand_counts = state
        .player_order
        .iter()
        .filter(|p| p.as_str() != viewer)
        .map(|p| (p.clone(), state.hand(p).len()))
        .collect();

    PlayerGameView {
        current_round: state.current_round,
        phase: state.phase,
        player_order: state.player_order.clone(),
        dealer_index: state.dealer_index,
        current_player_index: state.current_player_index,
        current_player: state.current_player().map(str::to_string),
        hand,
        other_hand_counts,
        bids: state.bids.clone(),
        nil_bids: state.nil_bids.clone(),
        tricks_won: state.tricks_won.clone(),
        current_trick: state.current_trick.clone(),
        trick_number: state.trick_number,
        led_suit: state.led_suit,
        spades_broken: state.spades_broken,
        last_trick_winner: state.last_trick_winner.clone(),
        scores: state.scores.clone(),
        overtrick_bag: state.overtrick_bag.clone(),
        round_history: state.round_history.clone(),
        teams: state.teams.clone(),
        team_scores: state.team_scores.clone(),
        team_overtrick_bag: state.team_overtrick_bag.clone(),
        team_round_history: state.team_round_history.clone(),
        game_over: state.game_over,
        winner: state.winner.clone(),
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::domain::bidding::nil_decision;
    use crate::domain::transitions::start_round;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("p{i}")).collect()
    }

    #[test]
    fn view_redacts_other_hands_to_counts() {
        let mut game = GameState::new(names(3), None);
        game.current_round = 4;
        start_round(&mut game, &mut StdRng::seed_from_u64(11)).unwrap();

        let view = player_view(&game, "p1");
        assert_eq!(view.hand.len(), 4);
        assert_eq!(view.hand, game.hand("p1").to_vec());
        assert!(view.other_hand_counts.get("p1").is_none());
        assert_eq!(view.other_hand_counts.get("p0"), Some(&4));
        assert_eq!(view.other_hand_counts.get("p2"), Some(&4));
    }

    #[test]
    fn undecided_nil_viewer_sees_no_hand() {
        let mut game = GameState::new(names(2), None);
        game.current_round = 10;
        start_round(&mut game, &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(game.phase, Phase::NilPrompt);

        let hidden = player_view(&game, "p0");
        assert!(hidden.hand.is_empty());
        // Counts stay truthful: the prompt hides only the viewer's cards.
        assert_eq!(hidden.other_hand_counts.get("p1"), Some(&10));

        nil_decision(&mut game, "p0", false).unwrap();
        let shown = player_view(&game, "p0");
        assert_eq!(shown.hand.len(), 10);
    }
}
