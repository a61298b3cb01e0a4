//! # Huddle
//!
//! Engine for local pass-the-device social-deduction party games.
//!
//! One device goes around the table. Each player privately sees a secret
//! (or learns they are the odd one out), everyone performs or answers,
//! the table votes, and the round is scored. Huddle runs that loop for
//! any game that implements [`GameVariant`](huddle_round::GameVariant),
//! with phase countdowns driven by Tokio.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use huddle::prelude::*;
//!
//! # async fn demo() -> Result<(), HuddleError> {
//! let players = Player::table(["Ada", "Bo", "Cy"]);
//! let pool = ContentPool::words(["lighthouse", "volcano", "bicycle"]);
//! let config = SessionConfig::new(players, pool, 3);
//!
//! let (game, mut updates) = spawn_session::<ImpostorDrawing>(config)?;
//! game.start().await?;
//! while let Some(update) = updates.recv().await {
//!     // render the update, collect input, call game.act(...)
//!     # let _ = update;
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod session;

pub use error::HuddleError;
pub use session::{
    GameHandle, SessionUpdate, UpdateReceiver, spawn_session, spawn_session_with_rng,
};

pub mod prelude {
    pub use crate::{GameHandle, HuddleError, SessionUpdate, UpdateReceiver, spawn_session};

    pub use huddle_core::{
        ContentItem, ContentPool, Player, PlayerIndex, RoleAssignment, Submission, Vote,
        VoteResult,
    };
    pub use huddle_round::{
        BallotEntry, GameEvent, GameNotice, GameVariant, ImpostorDrawing, Phase, PhaseView,
        RevealCard, RoundDurations, RuleTable, SessionConfig, Standing, WrongAnswer,
    };
}
