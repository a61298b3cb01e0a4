//! Session configuration and the phase state machine.

use std::collections::HashSet;
use std::time::Duration;

use huddle_core::{ContentPool, Player};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{ConfigError, GameVariant, RuleTable};

// ---------------------------------------------------------------------------
// RoundDurations
// ---------------------------------------------------------------------------

/// Time budgets for the phases of a round, in whole seconds.
///
/// `reveal_secs` is advisory: the reveal is paced by each player confirming
/// they've seen their card, and hosts use it for how long the card stays
/// visible. `action_secs` and `vote_secs` drive real countdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundDurations {
    pub reveal_secs: u64,
    pub action_secs: u64,
    pub vote_secs: u64,
}

impl Default for RoundDurations {
    fn default() -> Self {
        Self {
            reveal_secs: 10,
            action_secs: 60,
            vote_secs: 30,
        }
    }
}

impl RoundDurations {
    /// Longest budget any phase may have.
    pub const MAX_SECS: u64 = 600;

    /// Caps every budget at [`Self::MAX_SECS`], warning when it does.
    ///
    /// Zero budgets are left alone so that setup validation can reject them.
    pub fn validated(mut self) -> Self {
        for (phase, secs) in [
            ("reveal", &mut self.reveal_secs),
            ("action", &mut self.action_secs),
            ("vote", &mut self.vote_secs),
        ] {
            if *secs > Self::MAX_SECS {
                warn!(phase, secs = *secs, max = Self::MAX_SECS, "phase duration exceeds maximum — clamping");
                *secs = Self::MAX_SECS;
            }
        }
        self
    }

    pub fn reveal(&self) -> Duration {
        Duration::from_secs(self.reveal_secs)
    }

    pub fn action(&self) -> Duration {
        Duration::from_secs(self.action_secs)
    }

    pub fn vote(&self) -> Duration {
        Duration::from_secs(self.vote_secs)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.reveal_secs == 0 {
            return Err(ConfigError::InvalidDuration { phase: "reveal" });
        }
        if self.action_secs == 0 {
            return Err(ConfigError::InvalidDuration { phase: "action" });
        }
        if self.vote_secs == 0 {
            return Err(ConfigError::InvalidDuration { phase: "vote" });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Everything the setup screen hands the engine.
///
/// Deserializable so a host can keep presets as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seats in turn order. `players[i].index` must be `i`.
    pub players: Vec<Player>,
    /// Words or questions to draw from.
    pub content_pool: ContentPool,
    #[serde(default)]
    pub durations: RoundDurations,
    pub total_rounds: u32,
    /// Overrides the variant's default scoring when set.
    #[serde(default)]
    pub rules: Option<RuleTable>,
}

impl SessionConfig {
    pub fn new(players: Vec<Player>, content_pool: ContentPool, total_rounds: u32) -> Self {
        Self {
            players,
            content_pool,
            durations: RoundDurations::default(),
            total_rounds,
            rules: None,
        }
    }

    pub fn with_durations(mut self, durations: RoundDurations) -> Self {
        self.durations = durations;
        self
    }

    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Checks the config against `V`'s requirements.
    ///
    /// This is the whole of SETUP: any error here means the session
    /// must not start.
    pub fn validate<V: GameVariant>(&self) -> Result<(), ConfigError> {
        let actual = self.players.len();
        if actual < V::min_players() {
            return Err(ConfigError::InsufficientPlayers {
                variant: V::name(),
                required: V::min_players(),
                actual,
            });
        }
        if actual > V::max_players() {
            return Err(ConfigError::TooManyPlayers {
                variant: V::name(),
                max: V::max_players(),
                actual,
            });
        }
        if self.content_pool.is_empty() {
            return Err(ConfigError::InsufficientContent);
        }
        if self.total_rounds == 0 {
            return Err(ConfigError::NoRounds);
        }

        let mut names = HashSet::new();
        for (position, player) in self.players.iter().enumerate() {
            if player.index.get() != position {
                return Err(ConfigError::PlayerIndexMismatch {
                    position,
                    index: player.index,
                });
            }
            if !names.insert(player.name.as_str()) {
                return Err(ConfigError::DuplicatePlayerName(player.name.clone()));
            }
        }

        self.durations.check()
    }

    /// Scoring rules in effect: the override if set, else the variant's.
    pub fn rules_for<V: GameVariant>(&self) -> RuleTable {
        self.rules.clone().unwrap_or_else(V::rule_table)
    }
}

// ---------------------------------------------------------------------------
// RoundConfig
// ---------------------------------------------------------------------------

/// Per-round parameters, derived from the session config and scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundConfig {
    /// Zero-based.
    pub round_index: u32,
    pub total_rounds: u32,
    pub durations: RoundDurations,
}

impl RoundConfig {
    /// Returns `true` for the last round of the session.
    pub fn is_last(&self) -> bool {
        self.round_index + 1 >= self.total_rounds
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a session is in its lifecycle.
///
/// ```text
/// Setup → Reveal → Action → Vote → Result ─┬→ Reveal (next round)
///                                          └→ Final
/// ```
///
/// - **Setup**: config validated, roles not yet dealt.
/// - **Reveal**: the device goes round the table; each player privately
///   sees their card and confirms.
/// - **Action**: players answer (all at once) or perform (one at a time).
/// - **Vote**: the device goes round again; each player casts one vote.
/// - **Result**: votes tallied, points applied, outcome on screen.
/// - **Final**: all rounds played; standings are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    Reveal,
    Action,
    Vote,
    Result,
    Final,
}

impl Phase {
    /// Phases reachable in one step from `self`.
    pub fn successors(self) -> &'static [Phase] {
        match self {
            Self::Setup => &[Self::Reveal],
            Self::Reveal => &[Self::Action],
            Self::Action => &[Self::Vote],
            Self::Vote => &[Self::Result],
            Self::Result => &[Self::Reveal, Self::Final],
            Self::Final => &[],
        }
    }

    /// Returns `true` if moving to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.successors().contains(&target)
    }

    /// Returns `true` for phases that run against a countdown.
    pub fn is_timed(self) -> bool {
        matches!(self, Self::Action | Self::Vote)
    }

    /// Returns `true` while a round is being played.
    pub fn is_in_round(self) -> bool {
        matches!(self, Self::Reveal | Self::Action | Self::Vote)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup => write!(f, "Setup"),
            Self::Reveal => write!(f, "Reveal"),
            Self::Action => write!(f, "Action"),
            Self::Vote => write!(f, "Vote"),
            Self::Result => write!(f, "Result"),
            Self::Final => write!(f, "Final"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ImpostorDrawing, WrongAnswer};
    use huddle_core::{ContentItem, PlayerIndex};

    fn config(names: &[&str]) -> SessionConfig {
        SessionConfig::new(
            Player::table(names.iter().copied()),
            ContentPool::words(["apple", "pear"]),
            3,
        )
    }

    #[test]
    fn test_phase_transitions_follow_round_cycle() {
        assert!(Phase::Setup.can_transition_to(Phase::Reveal));
        assert!(Phase::Reveal.can_transition_to(Phase::Action));
        assert!(Phase::Action.can_transition_to(Phase::Vote));
        assert!(Phase::Vote.can_transition_to(Phase::Result));
        assert!(Phase::Result.can_transition_to(Phase::Reveal));
        assert!(Phase::Result.can_transition_to(Phase::Final));
        assert!(!Phase::Reveal.can_transition_to(Phase::Vote));
        assert!(!Phase::Final.can_transition_to(Phase::Reveal));
        assert!(Phase::Final.successors().is_empty());
    }

    #[test]
    fn test_phase_is_timed() {
        assert!(Phase::Action.is_timed());
        assert!(Phase::Vote.is_timed());
        assert!(!Phase::Reveal.is_timed());
        assert!(!Phase::Result.is_timed());
    }

    #[test]
    fn test_durations_default_and_clamp() {
        let d = RoundDurations::default();
        assert_eq!(d.action(), Duration::from_secs(60));

        let d = RoundDurations {
            reveal_secs: 5,
            action_secs: 9_000,
            vote_secs: 30,
        }
        .validated();
        assert_eq!(d.action_secs, RoundDurations::MAX_SECS);
        assert_eq!(d.reveal_secs, 5);
    }

    #[test]
    fn test_validate_accepts_good_config() {
        assert_eq!(config(&["Ana", "Ben", "Cy"]).validate::<ImpostorDrawing>(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_too_few_players() {
        let err = config(&["Ana", "Ben"]).validate::<ImpostorDrawing>().unwrap_err();
        assert_eq!(
            err,
            ConfigError::InsufficientPlayers {
                variant: ImpostorDrawing::name(),
                required: 3,
                actual: 2,
            }
        );
        // Two is enough when there's no minority role.
        assert!(config(&["Ana", "Ben"]).validate::<WrongAnswer>().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_pool_and_zero_rounds() {
        let mut cfg = config(&["Ana", "Ben", "Cy"]);
        cfg.content_pool = ContentPool::default();
        assert_eq!(
            cfg.validate::<ImpostorDrawing>(),
            Err(ConfigError::InsufficientContent)
        );

        let mut cfg = config(&["Ana", "Ben", "Cy"]);
        cfg.total_rounds = 0;
        assert_eq!(cfg.validate::<ImpostorDrawing>(), Err(ConfigError::NoRounds));
    }

    #[test]
    fn test_validate_rejects_bad_player_list() {
        let mut cfg = config(&["Ana", "Ben", "Cy"]);
        cfg.players[2].index = PlayerIndex(5);
        assert!(matches!(
            cfg.validate::<ImpostorDrawing>(),
            Err(ConfigError::PlayerIndexMismatch { position: 2, .. })
        ));

        let cfg = config(&["Ana", "Ben", "Ana"]);
        assert_eq!(
            cfg.validate::<ImpostorDrawing>(),
            Err(ConfigError::DuplicatePlayerName("Ana".into()))
        );
    }

    #[test]
    fn test_validate_rejects_zero_duration() {
        let cfg = config(&["Ana", "Ben", "Cy"]).with_durations(RoundDurations {
            vote_secs: 0,
            ..RoundDurations::default()
        });
        assert_eq!(
            cfg.validate::<ImpostorDrawing>(),
            Err(ConfigError::InvalidDuration { phase: "vote" })
        );
    }

    #[test]
    fn test_session_config_from_json() {
        let cfg: SessionConfig = serde_json::from_str(
            r#"{
                "players": [
                    {"index": 0, "name": "Ana", "color_tag": "red"},
                    {"index": 1, "name": "Ben"}
                ],
                "content_pool": [{"text": "Capital of France?", "answer": "Paris"}],
                "durations": {"vote_secs": 15},
                "total_rounds": 2
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.players[0].color_tag, "red");
        assert_eq!(cfg.players[1].color_tag, "");
        assert_eq!(cfg.durations.vote_secs, 15);
        assert_eq!(cfg.durations.action_secs, 60);
        assert_eq!(
            cfg.content_pool.get(0),
            Some(&ContentItem::question("Capital of France?", "Paris"))
        );
        assert!(cfg.validate::<WrongAnswer>().is_ok());
        assert_eq!(cfg.rules_for::<WrongAnswer>(), RuleTable::best_bluff());
    }
}
