//! Cumulative scores for a session.

use huddle_core::PlayerIndex;
use serde::Serialize;
use tracing::warn;

use crate::ScoreDeltas;

/// A player's place in the standings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub player: PlayerIndex,
    pub score: i64,
}

/// Running totals, one per player, all starting at zero.
///
/// The length is fixed at setup. Totals only change through
/// [`ScoreBoard::apply`] with deltas from the score engine. Lives in memory
/// for the session; serializing it is the host's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBoard {
    totals: Vec<i64>,
}

impl ScoreBoard {
    pub fn new(player_count: usize) -> Self {
        Self {
            totals: vec![0; player_count],
        }
    }

    /// Adds a round's deltas to the totals.
    ///
    /// Entries for players outside the table are ignored with a warning.
    pub fn apply(&mut self, deltas: &ScoreDeltas) {
        for (player, delta) in deltas {
            match self.totals.get_mut(player.get()) {
                Some(total) => *total += i64::from(*delta),
                None => warn!(%player, delta, "score delta for unknown player ignored"),
            }
        }
    }

    pub fn total(&self, player: PlayerIndex) -> Option<i64> {
        self.totals.get(player.get()).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Totals in seat order.
    pub fn totals(&self) -> &[i64] {
        &self.totals
    }

    /// Players ranked by score, highest first; equal scores keep seat order.
    pub fn standings(&self) -> Vec<Standing> {
        let mut standings: Vec<Standing> = self
            .totals
            .iter()
            .enumerate()
            .map(|(i, &score)| Standing {
                player: PlayerIndex(i),
                score,
            })
            .collect();
        standings.sort_by(|a, b| b.score.cmp(&a.score).then(a.player.cmp(&b.player)));
        standings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deltas(pairs: &[(usize, i32)]) -> ScoreDeltas {
        pairs.iter().map(|&(p, d)| (PlayerIndex(p), d)).collect()
    }

    #[test]
    fn test_starts_at_zero() {
        let board = ScoreBoard::new(3);
        assert_eq!(board.totals(), &[0, 0, 0]);
        assert_eq!(board.len(), 3);
    }

    #[test]
    fn test_apply_accumulates() {
        let mut board = ScoreBoard::new(3);
        board.apply(&deltas(&[(0, 100), (1, -25), (2, 0)]));
        board.apply(&deltas(&[(0, 50), (2, 10)]));
        assert_eq!(board.totals(), &[150, -25, 10]);
    }

    #[test]
    fn test_apply_ignores_unknown_player() {
        let mut board = ScoreBoard::new(2);
        board.apply(&deltas(&[(5, 100)]));
        assert_eq!(board.totals(), &[0, 0]);
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_standings_sorted_with_index_tiebreak() {
        let mut board = ScoreBoard::new(4);
        board.apply(&deltas(&[(0, 50), (1, 200), (2, 50), (3, 10)]));
        let order: Vec<_> = board.standings().iter().map(|s| s.player.get()).collect();
        assert_eq!(order, vec![1, 0, 2, 3]);
    }
}
