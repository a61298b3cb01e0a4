//! Round-based social-deduction engine for Huddle.
//!
//! Everything a pass-the-device party game needs between "players sat
//! down" and "final standings": dealing secret roles, walking the device
//! around the table, collecting answers and votes, tallying, and scoring.
//! The engine is synchronous and deterministic given its injected RNG;
//! countdowns are driven from outside through
//! [`PhaseController::expire`].
//!
//! # Key types
//!
//! - [`GameVariant`] — the trait a game implements ([`ImpostorDrawing`],
//!   [`WrongAnswer`] are built in)
//! - [`PhaseController`] — the session state machine
//! - [`RoleAssigner`], [`TurnSequencer`], [`VoteTally`], [`ScoreEngine`],
//!   [`RoundScheduler`] — the pieces it composes
//! - [`SessionConfig`] — what setup hands in
//! - [`ScoreBoard`] — cumulative totals and final standings

mod board;
mod config;
mod controller;
mod error;
mod roles;
mod scheduler;
mod score;
mod tally;
mod turns;
mod variant;

pub use board::{ScoreBoard, Standing};
pub use config::{Phase, RoundConfig, RoundDurations, SessionConfig};
pub use controller::{
    BallotEntry, GameEvent, GameNotice, PhaseController, PhaseView, RevealCard, TimerEpoch,
};
pub use error::{ActionError, ConfigError};
pub use roles::RoleAssigner;
pub use scheduler::{RoundAdvance, RoundScheduler};
pub use score::{RoundOutcome, RuleTable, ScoreDeltas, ScoreEngine};
pub use tally::VoteTally;
pub use turns::{TurnSequencer, TurnStep};
pub use variant::{ActionMode, GameVariant, ImpostorDrawing, RoleMode, WrongAnswer};
