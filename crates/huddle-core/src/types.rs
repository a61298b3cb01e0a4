//! Core data types shared by the engine and its hosts.
//!
//! These types describe one session of a pass-the-device game: the seats
//! around the table, the content pool the game draws secrets from, and the
//! records a round produces (submissions, votes, tallies).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Positional identity of a player.
///
/// A player *is* their seat: index `2` is the third entry in the player list
/// handed to the engine at setup, and it stays that way for the whole
/// session. Newtype so a vote target can't be confused with a vote count or
/// a round number.
///
/// `Ord` is derived because ordering matters: turn order is ascending index,
/// and every tie in the engine is broken toward the lowest index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerIndex(pub usize);

impl PlayerIndex {
    /// All indices for a table of `count` players, in turn order.
    pub fn all(count: usize) -> impl Iterator<Item = PlayerIndex> {
        (0..count).map(PlayerIndex)
    }

    /// Returns the raw position, for indexing into per-player vectors.
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for PlayerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One seat at the table.
///
/// Created at setup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Position in the player list. Must equal the player's offset in the
    /// list passed to the engine.
    pub index: PlayerIndex,
    /// Display name shown on the pass-the-device prompts.
    pub name: String,
    /// Free-form color tag chosen by the host UI (e.g. `"teal"`).
    #[serde(default)]
    pub color_tag: String,
}

impl Player {
    /// Creates a player with an empty color tag.
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index: PlayerIndex(index),
            name: name.into(),
            color_tag: String::new(),
        }
    }

    /// Builder-style setter for the color tag.
    pub fn with_color(mut self, color_tag: impl Into<String>) -> Self {
        self.color_tag = color_tag.into();
        self
    }

    /// Builds a table from a list of names, assigning indices in order.
    pub fn table<I, S>(names: I) -> Vec<Player>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Player::new(i, name))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// One entry in a content pool.
///
/// For impostor-style games `text` is the secret word and `answer` is
/// `None`. For bluffing games `text` is the question shown to everyone and
/// `answer` is the objectively correct answer, hidden until the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl ContentItem {
    /// A bare word with no correct answer attached.
    pub fn word(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            answer: None,
        }
    }

    /// A question paired with its correct answer.
    pub fn question(text: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            answer: Some(answer.into()),
        }
    }
}

/// The opaque library of words or questions a game draws from.
///
/// The engine never interprets the content; it only picks from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentPool {
    items: Vec<ContentItem>,
}

impl ContentPool {
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self { items }
    }

    /// Convenience constructor for a pool of bare words.
    pub fn words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(words.into_iter().map(ContentItem::word).collect())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&ContentItem> {
        self.items.get(i)
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }
}

impl FromIterator<ContentItem> for ContentPool {
    fn from_iter<I: IntoIterator<Item = ContentItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Round records
// ---------------------------------------------------------------------------

/// The secret handed out at the start of a round. Immutable for the round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// The minority-role player (e.g. the impostor). `None` in variants
    /// where everyone shares the same information.
    pub special_index: Option<PlayerIndex>,
    /// The shared content: the secret word or the question.
    pub content: String,
    /// The objectively correct answer, for variants that have one.
    pub answer: Option<String>,
}

impl RoleAssignment {
    /// Returns `true` if `player` holds the special role this round.
    pub fn is_special(&self, player: PlayerIndex) -> bool {
        self.special_index == Some(player)
    }

    /// Returns `true` if `text` matches the correct answer after
    /// normalization. Always `false` when the round has no answer.
    pub fn matches_answer(&self, text: &str) -> bool {
        self.answer
            .as_deref()
            .is_some_and(|answer| normalize_answer(answer) == normalize_answer(text))
    }
}

/// Lowercases, trims, and collapses internal whitespace so that
/// `"  paris "` and `"Paris"` compare equal.
pub fn normalize_answer(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// One player's answer in an answer-based round.
///
/// `text` is `None` exactly when `timed_out` is `true`; the constructors
/// are the only way the engine builds these, which keeps the two fields
/// consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub player: PlayerIndex,
    pub text: Option<String>,
    pub timed_out: bool,
}

impl Submission {
    pub fn answered(player: PlayerIndex, text: impl Into<String>) -> Self {
        Self {
            player,
            text: Some(text.into()),
            timed_out: false,
        }
    }

    pub fn timed_out(player: PlayerIndex) -> Self {
        Self {
            player,
            text: None,
            timed_out: true,
        }
    }

    /// The submitted text, if the player answered in time.
    pub fn answer(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// A single vote. Self-votes are rejected before one of these is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter: PlayerIndex,
    pub target: PlayerIndex,
}

impl Vote {
    pub fn new(voter: PlayerIndex, target: PlayerIndex) -> Self {
        Self { voter, target }
    }
}

/// The tallied outcome of a vote.
///
/// `counts` holds every eligible target, including those with zero votes.
/// `winning_index` is `None` only when no valid vote was cast; in that case
/// `tie` is `true`. When several targets share the top count the lowest
/// index wins and `tie` is set so a UI can say so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResult {
    pub counts: BTreeMap<PlayerIndex, u32>,
    pub winning_index: Option<PlayerIndex>,
    pub tie: bool,
}

/// The result of a vote nobody took part in: no winner, counted as a tie.
impl Default for VoteResult {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
            winning_index: None,
            tie: true,
        }
    }
}

impl VoteResult {
    /// Votes received by `target` (zero if it wasn't an eligible target).
    pub fn votes_for(&self, target: PlayerIndex) -> u32 {
        self.counts.get(&target).copied().unwrap_or(0)
    }

    /// Total number of counted votes.
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}
