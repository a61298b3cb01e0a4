//! Turning a round's outcome into point deltas.

use std::collections::BTreeMap;

use huddle_core::{PlayerIndex, RoleAssignment, Submission, Vote, VoteResult};
use serde::{Deserialize, Serialize};

/// Point changes for one round, keyed by player. Every player at the table
/// has an entry, zero included.
pub type ScoreDeltas = BTreeMap<PlayerIndex, i32>;

// ---------------------------------------------------------------------------
// RuleTable
// ---------------------------------------------------------------------------

/// Declarative scoring rules.
///
/// Point values are data so a host can tune them; the shape of each rule
/// is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleTable {
    /// Find the special player.
    ///
    /// If the vote's winner is the special player, everyone who voted for
    /// them earns `caught_points`. Otherwise the special player earns
    /// `escape_points` and nobody else scores.
    MinorityDetection { caught_points: i32, escape_points: i32 },

    /// Write the most convincing wrong answer.
    ///
    /// A correct answer scores `correct_penalty` and a missing one
    /// `missing_penalty`. Remaining answers are ranked by votes received
    /// (ties to the lowest index); a ranked answer with at least one vote
    /// takes the matching entry of `placement_points`, and everything else
    /// takes `participation_points`.
    BestBluff {
        correct_penalty: i32,
        missing_penalty: i32,
        placement_points: Vec<i32>,
        participation_points: i32,
    },
}

impl RuleTable {
    /// +100 for each correct voter when caught, +200 to the special player
    /// when they escape.
    pub fn minority_detection() -> Self {
        Self::MinorityDetection {
            caught_points: 100,
            escape_points: 200,
        }
    }

    /// -50 for the correct answer, -25 for no answer, 100/50/25 for the
    /// top three bluffs, +10 for any other.
    pub fn best_bluff() -> Self {
        Self::BestBluff {
            correct_penalty: -50,
            missing_penalty: -25,
            placement_points: vec![100, 50, 25],
            participation_points: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// RoundOutcome
// ---------------------------------------------------------------------------

/// Everything a finished round produced. Input to [`ScoreEngine::score`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round_index: u32,
    pub player_count: usize,
    pub assignment: RoleAssignment,
    /// Empty for variants without submissions.
    pub submissions: Vec<Submission>,
    /// Counted votes only, in casting order.
    pub votes: Vec<Vote>,
    pub result: VoteResult,
}

impl RoundOutcome {
    /// Whether the vote landed on the special player.
    pub fn special_caught(&self) -> bool {
        self.assignment.special_index.is_some()
            && self.result.winning_index == self.assignment.special_index
    }
}

// ---------------------------------------------------------------------------
// ScoreEngine
// ---------------------------------------------------------------------------

/// Pure scoring: same outcome and rules in, same deltas out.
pub struct ScoreEngine;

impl ScoreEngine {
    /// Computes per-player deltas (not totals).
    ///
    /// Missing data never errors: a round with no special player in a
    /// detection game, or no submissions in a bluffing game, scores zero
    /// for everyone.
    pub fn score(outcome: &RoundOutcome, rules: &RuleTable) -> ScoreDeltas {
        let mut deltas: ScoreDeltas = PlayerIndex::all(outcome.player_count)
            .map(|p| (p, 0))
            .collect();

        match rules {
            RuleTable::MinorityDetection {
                caught_points,
                escape_points,
            } => score_minority(outcome, *caught_points, *escape_points, &mut deltas),
            RuleTable::BestBluff {
                correct_penalty,
                missing_penalty,
                placement_points,
                participation_points,
            } => score_bluff(
                outcome,
                *correct_penalty,
                *missing_penalty,
                placement_points,
                *participation_points,
                &mut deltas,
            ),
        }

        deltas
    }
}

fn credit(deltas: &mut ScoreDeltas, player: PlayerIndex, points: i32) {
    if let Some(d) = deltas.get_mut(&player) {
        *d += points;
    }
}

fn score_minority(outcome: &RoundOutcome, caught: i32, escape: i32, deltas: &mut ScoreDeltas) {
    let Some(special) = outcome.assignment.special_index else {
        return;
    };

    if outcome.result.winning_index == Some(special) {
        for vote in outcome.votes.iter().filter(|v| v.target == special) {
            credit(deltas, vote.voter, caught);
        }
    } else {
        // No winner at all counts as "nobody identified".
        credit(deltas, special, escape);
    }
}

fn score_bluff(
    outcome: &RoundOutcome,
    correct_penalty: i32,
    missing_penalty: i32,
    placement_points: &[i32],
    participation_points: i32,
    deltas: &mut ScoreDeltas,
) {
    let mut ranked: Vec<(PlayerIndex, u32)> = Vec::new();

    for submission in &outcome.submissions {
        match submission.answer() {
            None => credit(deltas, submission.player, missing_penalty),
            Some(text) if outcome.assignment.matches_answer(text) => {
                credit(deltas, submission.player, correct_penalty)
            }
            Some(_) => ranked.push((
                submission.player,
                outcome.result.votes_for(submission.player),
            )),
        }
    }

    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    for (place, (player, votes)) in ranked.into_iter().enumerate() {
        let points = if votes == 0 {
            participation_points
        } else {
            placement_points
                .get(place)
                .copied()
                .unwrap_or(participation_points)
        };
        credit(deltas, player, points);
    }
}
