//! Unified error type for Huddle.

use huddle_round::{ActionError, ConfigError};

/// Top-level error that wraps the engine's errors.
///
/// Hosts using the `huddle` facade deal with this single type. The
/// `#[from]` attributes let `?` convert engine errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum HuddleError {
    /// Setup failed; the session never started.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A player action was rejected; the game is unchanged.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// The session actor has stopped (shut down or dropped).
    #[error("game session is unavailable")]
    Unavailable,
}

impl HuddleError {
    /// Returns `true` for errors that end the session rather than a
    /// single action.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::PlayerIndex;

    #[test]
    fn test_from_config_error() {
        let err: HuddleError = ConfigError::InsufficientContent.into();
        assert!(matches!(err, HuddleError::Config(_)));
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "content pool is empty");
    }

    #[test]
    fn test_from_action_error() {
        let err: HuddleError = ActionError::SelfVote(PlayerIndex(2)).into();
        assert!(matches!(err, HuddleError::Action(_)));
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("#2"));
    }
}
