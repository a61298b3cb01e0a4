//! The `GameVariant` trait and the two built-in games.
//!
//! A variant is a bundle of static rules: how many players it needs, whether
//! one of them gets a secret minority role, whether the action phase is
//! played one-at-a-time or all at once, who can be voted for, and how
//! votes turn into points. The [`PhaseController`](crate::PhaseController)
//! is generic over it and calls these functions at the right time.

use std::collections::{BTreeMap, BTreeSet};

use huddle_core::{Player, PlayerIndex, RoleAssignment, Submission};

use crate::RuleTable;

/// Whether a round deals a secret minority role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleMode {
    /// One player is picked as the special role (e.g. the impostor) and
    /// does not see the shared content.
    SpecialRole,
    /// Everyone sees the same content.
    Shared,
}

/// How the ACTION phase is paced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMode {
    /// Pass the device: players perform one at a time in index order, each
    /// against their own countdown.
    Sequential,
    /// Everyone answers at once against a single phase countdown.
    Simultaneous,
}

/// The extension point for a game's rules.
///
/// All functions are associated (no `self`): a variant is a type-level
/// choice, like `PhaseController<ImpostorDrawing>`.
pub trait GameVariant: Send + Sync + 'static {
    /// Short name used in logs and error messages.
    fn name() -> &'static str;

    /// Fewest players that make a playable round.
    fn min_players() -> usize;

    /// Most players the variant supports. Default: 12.
    fn max_players() -> usize {
        12
    }

    fn role_mode() -> RoleMode;

    fn action_mode() -> ActionMode;

    /// Default scoring rules. Hosts may override per session.
    fn rule_table() -> RuleTable;

    /// Players who may receive votes this round.
    ///
    /// Called once when the VOTE phase opens. A voter is never allowed to
    /// pick themselves regardless of this set. Default: everyone.
    fn eligible_targets(
        _assignment: &RoleAssignment,
        _submissions: &BTreeMap<PlayerIndex, Submission>,
        players: &[Player],
    ) -> BTreeSet<PlayerIndex> {
        players.iter().map(|p| p.index).collect()
    }
}

// ---------------------------------------------------------------------------
// Built-in variants
// ---------------------------------------------------------------------------

/// Impostor drawing game.
///
/// Everyone but the impostor sees a secret word. Players take turns drawing
/// it on the shared device, then vote on who they think was faking.
#[derive(Debug, Clone, Copy)]
pub struct ImpostorDrawing;

impl GameVariant for ImpostorDrawing {
    fn name() -> &'static str {
        "impostor-drawing"
    }

    fn min_players() -> usize {
        3
    }

    fn role_mode() -> RoleMode {
        RoleMode::SpecialRole
    }

    fn action_mode() -> ActionMode {
        ActionMode::Sequential
    }

    fn rule_table() -> RuleTable {
        RuleTable::minority_detection()
    }
}

/// "Wrong answer" bluffing game.
///
/// Everyone sees a trivia question and secretly writes a convincing *wrong*
/// answer. Players then vote for the answer they like best; the correct
/// answer and empty slots can't be voted for.
#[derive(Debug, Clone, Copy)]
pub struct WrongAnswer;

impl GameVariant for WrongAnswer {
    fn name() -> &'static str {
        "wrong-answer"
    }

    fn min_players() -> usize {
        2
    }

    fn role_mode() -> RoleMode {
        RoleMode::Shared
    }

    fn action_mode() -> ActionMode {
        ActionMode::Simultaneous
    }

    fn rule_table() -> RuleTable {
        RuleTable::best_bluff()
    }

    /// Only players who submitted a wrong answer in time can be voted for.
    fn eligible_targets(
        assignment: &RoleAssignment,
        submissions: &BTreeMap<PlayerIndex, Submission>,
        _players: &[Player],
    ) -> BTreeSet<PlayerIndex> {
        submissions
            .values()
            .filter_map(|s| {
                let text = s.answer()?;
                (!assignment.matches_answer(text)).then_some(s.player)
            })
            .collect()
    }
}
