//! Error types for the round engine.
//!
//! Two families, kept apart on purpose: [`ConfigError`] is fatal and only
//! raised at setup, [`ActionError`] rejects a single player action and
//! leaves the game exactly as it was.

use huddle_core::PlayerIndex;

use crate::Phase;

/// Setup validation failures. A session with one of these never starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Fewer players than the variant needs.
    #[error("{variant} needs at least {required} players, got {actual}")]
    InsufficientPlayers {
        variant: &'static str,
        required: usize,
        actual: usize,
    },

    /// More players than the variant supports.
    #[error("{variant} supports at most {max} players, got {actual}")]
    TooManyPlayers {
        variant: &'static str,
        max: usize,
        actual: usize,
    },

    /// The content pool has nothing to draw from.
    #[error("content pool is empty")]
    InsufficientContent,

    /// `total_rounds` was zero.
    #[error("a session needs at least one round")]
    NoRounds,

    /// A player's `index` doesn't match their position in the list.
    #[error("player at position {position} has index {index}")]
    PlayerIndexMismatch { position: usize, index: PlayerIndex },

    /// Two players share a display name, which makes the pass-the-device
    /// prompts ambiguous.
    #[error("player name {0:?} is used more than once")]
    DuplicatePlayerName(String),

    /// A phase duration was zero.
    #[error("{phase} duration must be at least one second")]
    InvalidDuration { phase: &'static str },
}

/// A player action the engine refused. State is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The event doesn't belong to the current phase.
    #[error("{event} is not allowed during {actual}")]
    WrongPhase { event: &'static str, actual: Phase },

    /// Someone other than the player holding the device tried to act.
    #[error("it is {expected}'s turn, not {got}'s")]
    NotYourTurn {
        expected: PlayerIndex,
        got: PlayerIndex,
    },

    /// The index doesn't name a seat at this table.
    #[error("no player {0}")]
    UnknownPlayer(PlayerIndex),

    #[error("player {0} cannot vote for themselves")]
    SelfVote(PlayerIndex),

    /// The target isn't voteable this round (e.g. it holds the correct
    /// answer in a bluffing game, or submitted nothing).
    #[error("player {0} is not an eligible vote target")]
    IneligibleTarget(PlayerIndex),

    #[error("player {0} has already voted")]
    AlreadyVoted(PlayerIndex),

    #[error("player {0} has already submitted")]
    AlreadySubmitted(PlayerIndex),

    #[error("submission from {0} is empty")]
    EmptySubmission(PlayerIndex),

    /// The event exists but this variant doesn't use it (e.g. `EndTurn`
    /// in a game where everyone answers at once).
    #[error("{event} is not used by {variant}")]
    Unsupported {
        event: &'static str,
        variant: &'static str,
    },

    /// The session reached its final standings.
    #[error("the session is over")]
    SessionOver,

    /// Dealing a round failed a setup check.
    #[error(transparent)]
    Setup(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages_are_actionable() {
        let err = ConfigError::InsufficientPlayers {
            variant: "impostor",
            required: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "impostor needs at least 3 players, got 2");
        assert_eq!(
            ConfigError::InvalidDuration { phase: "vote" }.to_string(),
            "vote duration must be at least one second"
        );
    }

    #[test]
    fn test_action_error_messages() {
        let err = ActionError::NotYourTurn {
            expected: PlayerIndex(1),
            got: PlayerIndex(3),
        };
        assert_eq!(err.to_string(), "it is #1's turn, not #3's");
        let err = ActionError::WrongPhase {
            event: "CastVote",
            actual: Phase::Reveal,
        };
        assert!(err.to_string().contains("Reveal"));
    }
}
