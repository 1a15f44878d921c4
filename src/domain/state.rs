//! The game snapshot: a plain tree of state the engine transitions over.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::cards::{Card, Suit};

pub const MAX_ROUNDS: u8 = 11;
/// Nil bidding is offered only from this round on.
pub const NIL_FIRST_ROUND: u8 = 10;

/// Game progression phases.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Players decide whether to go nil before seeing their cards.
    NilPrompt,
    /// Players bid in fixed turn order.
    Bidding,
    /// Trick play within the round.
    Playing,
    /// Round scored; waiting for the host to trigger the next deal.
    RoundEnd,
    /// All rounds complete.
    GameOver,
}

/// A player's nil declaration state. `Undecided` exists only while the
/// NilPrompt phase is live; rounds without a prompt start at `SeeCards`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NilChoice {
    #[default]
    Undecided,
    Nil,
    SeeCards,
}

/// One card placed into the current trick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickPlay {
    pub player: String,
    pub card: Card,
}

/// A per-round scoring row as recorded in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u8,
    pub bid: u8,
    pub nil: bool,
    pub tricks_won: u8,
    pub round_score: i32,
    pub penalty_applied: bool,
    pub total_after: i32,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinnerKind {
    Player,
    Team,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub name: String,
    pub score: i32,
    pub kind: WinnerKind,
}

/// Entire game container, sufficient for pure engine operations.
///
/// Maps are keyed by player name, the stable identity within a room;
/// session ids churn across reconnects. Team maps are `BTreeMap` so
/// iteration (and thus tie-breaking) is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// 1-based, 1..=11.
    pub current_round: u8,
    pub phase: Phase,
    /// Fixed cyclic seating for the game.
    pub player_order: Vec<String>,
    pub dealer_index: usize,
    pub bidding_start_index: usize,
    pub first_lead_index: usize,
    pub current_player_index: usize,
    pub hands: HashMap<String, Vec<Card>>,
    pub bids: HashMap<String, u8>,
    pub nil_bids: HashMap<String, NilChoice>,
    pub tricks_won: HashMap<String, u8>,
    pub current_trick: Vec<TrickPlay>,
    /// Completed tricks this round, 0-based until the round ends at
    /// `current_round`.
    pub trick_number: u8,
    pub led_suit: Option<Suit>,
    pub spades_broken: bool,
    pub last_trick_winner: Option<String>,
    pub scores: HashMap<String, i32>,
    pub overtrick_bag: HashMap<String, u32>,
    pub round_history: HashMap<String, Vec<RoundRecord>>,
    /// Team name -> members, present in team mode only.
    pub teams: Option<BTreeMap<String, Vec<String>>>,
    pub team_scores: BTreeMap<String, i32>,
    pub team_overtrick_bag: BTreeMap<String, u32>,
    pub team_round_history: BTreeMap<String, Vec<RoundRecord>>,
    pub game_over: bool,
    pub winner: Option<Winner>,
}

impl GameState {
    /// Fresh game for the given seating. The caller must run
    /// `transitions::start_round` before play begins.
    pub fn new(player_order: Vec<String>, teams: Option<BTreeMap<String, Vec<String>>>) -> Self {
        let scores = player_order.iter().map(|p| (p.clone(), 0)).collect();
        let overtrick_bag = player_order.iter().map(|p| (p.clone(), 0)).collect();
        let round_history = player_order
            .iter()
            .map(|p| (p.clone(), Vec::new()))
            .collect();
        let team_scores = teams
            .iter()
            .flat_map(|t| t.keys())
            .map(|t| (t.clone(), 0))
            .collect();
        let team_overtrick_bag = teams
            .iter()
            .flat_map(|t| t.keys())
            .map(|t| (t.clone(), 0))
            .collect();
        let team_round_history = teams
            .iter()
            .flat_map(|t| t.keys())
            .map(|t| (t.clone(), Vec::new()))
            .collect();

        Self {
            current_round: 1,
            phase: Phase::Bidding,
            player_order,
            dealer_index: 0,
            bidding_start_index: 0,
            first_lead_index: 0,
            current_player_index: 0,
            hands: HashMap::new(),
            bids: HashMap::new(),
            nil_bids: HashMap::new(),
            tricks_won: HashMap::new(),
            current_trick: Vec::new(),
            trick_number: 0,
            led_suit: None,
            spades_broken: false,
            last_trick_winner: None,
            scores,
            overtrick_bag,
            round_history,
            teams,
            team_scores,
            team_overtrick_bag,
            team_round_history,
            game_over: false,
            winner: None,
        }
    }

    pub fn player_count(&self) -> usize {
        self.player_order.len()
    }

    pub fn current_player(&self) -> Option<&str> {
        self.player_order
            .get(self.current_player_index)
            .map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.player_order.iter().position(|p| p == name)
    }

    pub fn is_nil(&self, name: &str) -> bool {
        matches!(self.nil_bids.get(name), Some(NilChoice::Nil))
    }

    pub fn hand(&self, name: &str) -> &[Card] {
        self.hands.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Card conservation: dealt cards are exactly partitioned between hands,
    /// the current trick, and completed (discarded) tricks.
    pub fn cards_in_play(&self) -> usize {
        let in_hands: usize = self.player_order.iter().map(|p| self.hand(p).len()).sum();
        in_hands
            + self.current_trick.len()
            + self.trick_number as usize * self.player_count()
    }

    #[cfg(debug_assertions)]
    pub fn debug_check_conservation(&self) {
        if self.phase == Phase::Playing {
            debug_assert_eq!(
                self.cards_in_play(),
                self.current_round as usize * self.player_count(),
                "card conservation violated in round {}",
                self.current_round
            );
        }
    }
}
