//! Vote aggregation.

use std::collections::{BTreeMap, BTreeSet};

use huddle_core::{PlayerIndex, Vote, VoteResult};
use tracing::warn;

/// Turns a round's votes into per-target counts and a winner.
pub struct VoteTally;

impl VoteTally {
    /// Tallies `votes` over `eligible` targets.
    ///
    /// - Votes for targets outside `eligible` are dropped, not errors.
    /// - Self-votes and second votes from the same voter are dropped. The
    ///   controller never records either, so these only guard the
    ///   invariant.
    /// - The winner is the target with the most votes; among equals the
    ///   lowest index wins and `tie` is set.
    /// - With no counted votes there is no winner and `tie` is `true`.
    pub fn tally(votes: &[Vote], eligible: &BTreeSet<PlayerIndex>) -> VoteResult {
        let mut counts: BTreeMap<PlayerIndex, u32> =
            eligible.iter().map(|&target| (target, 0)).collect();
        let mut seen = BTreeSet::new();

        for vote in votes {
            if vote.voter == vote.target {
                warn!(voter = %vote.voter, "self-vote discarded");
                continue;
            }
            if !seen.insert(vote.voter) {
                warn!(voter = %vote.voter, "duplicate vote discarded");
                continue;
            }
            // Ineligible targets (e.g. the correct answer) are simply ignored.
            if let Some(count) = counts.get_mut(&vote.target) {
                *count += 1;
            }
        }

        let top = counts.values().copied().max().unwrap_or(0);
        if top == 0 {
            return VoteResult {
                counts,
                winning_index: None,
                tie: true,
            };
        }

        // BTreeMap iterates in ascending index order, so the first match
        // is the lowest index.
        let mut leaders = counts.iter().filter(|(_, c)| **c == top).map(|(t, _)| *t);
        let winning_index = leaders.next();
        let tie = leaders.next().is_some();

        VoteResult {
            counts,
            winning_index,
            tie,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(voter: usize, target: usize) -> Vote {
        Vote::new(PlayerIndex(voter), PlayerIndex(target))
    }

    fn everyone(n: usize) -> BTreeSet<PlayerIndex> {
        PlayerIndex::all(n).collect()
    }

    #[test]
    fn test_clear_winner() {
        let result = VoteTally::tally(&[v(0, 2), v(1, 2), v(2, 0), v(3, 2)], &everyone(4));
        assert_eq!(result.winning_index, Some(PlayerIndex(2)));
        assert!(!result.tie);
        assert_eq!(result.votes_for(PlayerIndex(2)), 3);
        assert_eq!(result.total(), 4);
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let result = VoteTally::tally(&[v(0, 3), v(1, 2), v(2, 3), v(3, 2)], &everyone(4));
        assert_eq!(result.winning_index, Some(PlayerIndex(2)));
        assert!(result.tie);
    }

    #[test]
    fn test_ineligible_targets_are_dropped() {
        let eligible: BTreeSet<_> = [PlayerIndex(1), PlayerIndex(2)].into_iter().collect();
        let result = VoteTally::tally(&[v(0, 1), v(1, 0), v(2, 1)], &eligible);
        assert_eq!(result.total(), 2);
        assert_eq!(result.votes_for(PlayerIndex(0)), 0);
        assert!(!result.counts.contains_key(&PlayerIndex(0)));
        assert_eq!(result.winning_index, Some(PlayerIndex(1)));
    }

    #[test]
    fn test_self_and_duplicate_votes_are_dropped() {
        let result = VoteTally::tally(&[v(0, 0), v(1, 2), v(1, 0)], &everyone(3));
        assert_eq!(result.total(), 1);
        assert_eq!(result.winning_index, Some(PlayerIndex(2)));
    }

    #[test]
    fn test_no_votes_has_no_winner() {
        let result = VoteTally::tally(&[], &everyone(3));
        assert_eq!(result.winning_index, None);
        assert!(result.tie);
        assert_eq!(result.counts.len(), 3);
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_no_eligible_targets() {
        let result = VoteTally::tally(&[v(0, 1)], &BTreeSet::new());
        assert!(result.counts.is_empty());
        assert_eq!(result.winning_index, None);
        assert!(result.tie);
    }
}
