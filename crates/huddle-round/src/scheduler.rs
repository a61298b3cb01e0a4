//! Round bookkeeping: which round we're on and whether another follows.

use tracing::{debug, warn};

use crate::ScoreBoard;

/// What [`RoundScheduler::advance`] decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundAdvance {
    /// `true` if another round should be played.
    pub continues: bool,
    /// The round index after this call. Equals `total_rounds` once the
    /// session is over.
    pub next_round_index: u32,
}

/// Tracks the round index against the session's total.
///
/// The index starts at zero, rises by exactly one per [`advance`](Self::advance),
/// and never goes past `total_rounds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundScheduler {
    round_index: u32,
    total_rounds: u32,
}

impl RoundScheduler {
    pub fn new(total_rounds: u32) -> Self {
        Self {
            round_index: 0,
            total_rounds,
        }
    }

    /// Pure form of the decision: given the round just played, what comes
    /// next.
    pub fn next_round(round_index: u32, total_rounds: u32) -> RoundAdvance {
        let next_round_index = round_index.saturating_add(1).min(total_rounds);
        RoundAdvance {
            continues: next_round_index < total_rounds,
            next_round_index,
        }
    }

    /// Closes the current round and moves the index on.
    ///
    /// `board` is carried forward as-is; this only checks its shape hasn't
    /// changed. Calling again after the last round is a no-op.
    pub fn advance(&mut self, board: &ScoreBoard) -> RoundAdvance {
        if self.is_finished() {
            warn!(
                round = self.round_index,
                total = self.total_rounds,
                "advance called after the final round"
            );
            return RoundAdvance {
                continues: false,
                next_round_index: self.total_rounds,
            };
        }

        let decision = Self::next_round(self.round_index, self.total_rounds);
        self.round_index = decision.next_round_index;
        debug!(
            round = self.round_index,
            total = self.total_rounds,
            continues = decision.continues,
            players = board.len(),
            "round closed"
        );
        decision
    }

    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn is_finished(&self) -> bool {
        self.round_index >= self.total_rounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_round_does_not_continue() {
        let advance = RoundScheduler::next_round(2, 3);
        assert!(!advance.continues);
        assert_eq!(advance.next_round_index, 3);
    }

    #[test]
    fn test_middle_round_continues() {
        let advance = RoundScheduler::next_round(0, 3);
        assert!(advance.continues);
        assert_eq!(advance.next_round_index, 1);
    }

    #[test]
    fn test_index_never_exceeds_total() {
        let board = ScoreBoard::new(3);
        let mut sched = RoundScheduler::new(2);
        assert!(sched.advance(&board).continues);
        assert!(!sched.advance(&board).continues);
        assert_eq!(sched.round_index(), 2);

        let again = sched.advance(&board);
        assert!(!again.continues);
        assert_eq!(again.next_round_index, 2);
        assert_eq!(sched.round_index(), 2);
        assert!(sched.is_finished());
    }

    #[test]
    fn test_next_round_is_clamped() {
        assert_eq!(RoundScheduler::next_round(7, 3).next_round_index, 3);
        assert_eq!(RoundScheduler::next_round(u32::MAX, u32::MAX).next_round_index, u32::MAX);
    }
}
