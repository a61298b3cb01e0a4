//! Shared data model for Huddle.
//!
//! Every crate in the workspace speaks in these types: who the players are,
//! what secret content a round hands out, and what players submit and vote
//! for. Nothing here has behavior beyond construction and small queries;
//! the rules live in `huddle-round`.
//!
//! # Key types
//!
//! - [`PlayerIndex`] — positional player identity, stable for a session
//! - [`Player`] — a seat at the table (index, display name, color tag)
//! - [`ContentPool`] / [`ContentItem`] — words or questions to draw from
//! - [`RoleAssignment`] — the secret handed out at the start of a round
//! - [`Submission`] / [`Vote`] — what players do during a round
//! - [`VoteResult`] — the tallied outcome of a vote

mod types;

pub use types::{
    normalize_answer, ContentItem, ContentPool, Player, PlayerIndex, RoleAssignment, Submission,
    Vote, VoteResult,
};
