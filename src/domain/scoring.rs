//! Round scoring: bid formulas, the overtrick bag, the ends-in-5 running
//! total penalty, team aggregation, and winner selection.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::domain::state::{GameState, NilChoice, RoundRecord, Winner, WinnerKind};

pub const NIL_BONUS: i32 = 100;
pub const PENALTY: i32 = 55;

/// Everything the round-end broadcast needs about the scoring pass.
#[derive(Debug, Clone, Serialize)]
pub struct RoundSummary {
    pub round: u8,
    pub round_scores: HashMap<String, i32>,
    pub scores: HashMap<String, i32>,
    pub penalties: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub team_round_scores: BTreeMap<String, i32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub team_scores: BTreeMap<String, i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub team_penalties: Vec<String>,
}

/// Score a non-nil unit. Returns `(round score, overtricks for the bag)`.
///
/// Bid 0 scores one point per trick and every trick is an overtrick; a made
/// positive bid earns `10·bid` plus overtricks; a failed bid loses `10·bid`.
pub fn score_non_nil(bid: u8, tricks: u8) -> (i32, u32) {
    if bid == 0 {
        (tricks as i32, tricks as u32)
    } else if tricks >= bid {
        let over = (tricks - bid) as i32;
        (10 * bid as i32 + over, over as u32)
    } else {
        (-10 * bid as i32, 0)
    }
}

/// Nil outcome: +100 for zero tricks, −100 otherwise. No bag contribution.
pub fn score_nil(tricks: u8) -> i32 {
    if tricks == 0 {
        NIL_BONUS
    } else {
        -NIL_BONUS
    }
}

/// Whether a running total has landed on an integer whose absolute value
/// ends in the digit 5 (15, 25, −5, ...). Such a total costs 55 points.
pub fn ends_in_five(total: i32) -> bool {
    total.abs() % 10 == 5
}

fn settle(total: &mut i32, delta: i32) -> (i32, bool) {
    let mut next = *total + delta;
    let penalty = ends_in_five(next);
    if penalty {
        next -= PENALTY;
    }
    *total = next;
    (next, penalty)
}

/// Apply the round's scoring to every unit and record history rows.
///
/// Individual rows are always recorded (in team mode they are display-only;
/// the team total drives winning). Mutates totals and bags; does not touch
/// the phase; `transitions::resolve_round` owns that.
pub fn apply_round_scoring(state: &mut GameState) -> RoundSummary {
    let round = state.current_round;
    let mut round_scores = HashMap::new();
    let mut penalties = Vec::new();

    for name in state.player_order.clone() {
        let tricks = state.tricks_won.get(&name).copied().unwrap_or(0);
        let bid = state.bids.get(&name).copied().unwrap_or(0);
        let nil = state.is_nil(&name);

        let (delta, overtricks) = if nil {
            (score_nil(tricks), 0)
        } else {
            score_non_nil(bid, tricks)
        };
        *state.overtrick_bag.entry(name.clone()).or_insert(0) += overtricks;

        let total = state.scores.entry(name.clone()).or_insert(0);
        let (total_after, penalty_applied) = settle(total, delta);
        if penalty_applied {
            penalties.push(name.clone());
        }

        round_scores.insert(name.clone(), delta);
        state
            .round_history
            .entry(name.clone())
            .or_default()
            .push(RoundRecord {
                round,
                bid,
                nil,
                tricks_won: tricks,
                round_score: delta,
                penalty_applied,
                total_after,
            });
    }

    let mut team_round_scores = BTreeMap::new();
    let mut team_penalties = Vec::new();
    if let Some(teams) = state.teams.clone() {
        for (team, members) in teams {
            let mut team_bid = 0u8;
            let mut team_tricks = 0u8;
            let mut nil_delta = 0i32;
            for member in &members {
                let tricks = state.tricks_won.get(member).copied().unwrap_or(0);
                if state.is_nil(member) {
                    nil_delta += score_nil(tricks);
                } else {
                    team_bid += state.bids.get(member).copied().unwrap_or(0);
                    team_tricks += tricks;
                }
            }
            let (non_nil_delta, overtricks) = score_non_nil(team_bid, team_tricks);
            let delta = non_nil_delta + nil_delta;
            *state.team_overtrick_bag.entry(team.clone()).or_insert(0) += overtricks;

            let total = state.team_scores.entry(team.clone()).or_insert(0);
            let (total_after, penalty_applied) = settle(total, delta);
            if penalty_applied {
                team_penalties.push(team.clone());
            }

            team_round_scores.insert(team.clone(), delta);
            state
                .team_round_history
                .entry(team.clone())
                .or_default()
                .push(RoundRecord {
                    round,
                    bid: team_bid,
                    nil: false,
                    tricks_won: team_tricks,
                    round_score: delta,
                    penalty_applied,
                    total_after,
                });
        }
    }

    RoundSummary {
        round,
        round_scores,
        scores: state.scores.clone(),
        penalties,
        team_round_scores,
        team_scores: state.team_scores.clone(),
        team_penalties,
    }
}

/// Pick the winning unit: the maximum total, ties going to the first unit
/// encountered: `player_order` for Individual, team-name order for Teams.
pub fn compute_winner(state: &GameState) -> Option<Winner> {
    if state.teams.is_some() {
        let mut best: Option<Winner> = None;
        for (team, total) in &state.team_scores {
            if best.as_ref().map_or(true, |w| *total > w.score) {
                best = Some(Winner {
                    name: team.clone(),
                    score: *total,
                    kind: WinnerKind::Team,
                });
            }
        }
        best
    } else {
        let mut best: Option<Winner> = None;
        for name in &state.player_order {
            let total = state.scores.get(name).copied().unwrap_or(0);
            if best.as_ref().map_or(true, |w| total > w.score) {
                best = Some(Winner {
                    name: name.clone(),
                    score: total,
                    kind: WinnerKind::Player,
                });
            }
        }
        best
    }
}
