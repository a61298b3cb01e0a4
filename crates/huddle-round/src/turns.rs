//! Pass-the-device turn order.

use std::collections::BTreeSet;

use huddle_core::PlayerIndex;
use tracing::trace;

/// Result of [`TurnSequencer::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStep {
    /// The device passes to this player.
    Next(PlayerIndex),
    /// Everyone has had their turn.
    AllDone,
}

/// Walks the table one player at a time, in ascending index order.
///
/// Each player is current exactly once per pass and never two at once.
/// Advancing is a synchronous call made when the current player confirms.
#[derive(Debug, Clone)]
pub struct TurnSequencer {
    player_count: usize,
    current: Option<PlayerIndex>,
    completed: BTreeSet<PlayerIndex>,
}

impl TurnSequencer {
    /// Starts a pass with player `#0` holding the device.
    pub fn new(player_count: usize) -> Self {
        Self {
            player_count,
            current: (player_count > 0).then_some(PlayerIndex(0)),
            completed: BTreeSet::new(),
        }
    }

    /// The player holding the device, or `None` once the pass is done.
    pub fn current(&self) -> Option<PlayerIndex> {
        self.current
    }

    /// Marks the current player done and hands the device on.
    ///
    /// Calling this after the pass finished keeps returning
    /// [`TurnStep::AllDone`].
    pub fn advance(&mut self) -> TurnStep {
        let Some(done) = self.current.take() else {
            return TurnStep::AllDone;
        };
        self.completed.insert(done);

        self.current = PlayerIndex::all(self.player_count)
            .skip(done.get() + 1)
            .find(|p| !self.completed.contains(p));

        trace!(%done, next = ?self.current, "turn advanced");
        match self.current {
            Some(next) => TurnStep::Next(next),
            None => TurnStep::AllDone,
        }
    }

    /// Whether every player has completed their step.
    pub fn is_done(&self) -> bool {
        self.current.is_none()
    }

    pub fn has_completed(&self, player: PlayerIndex) -> bool {
        self.completed.contains(&player)
    }

    /// Players who haven't completed, current player first.
    pub fn pending(&self) -> Vec<PlayerIndex> {
        PlayerIndex::all(self.player_count)
            .filter(|p| !self.completed.contains(p))
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn player_count(&self) -> usize {
        self.player_count
    }
}
