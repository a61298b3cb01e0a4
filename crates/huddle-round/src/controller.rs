//! The phase state machine that runs a session.
//!
//! [`PhaseController`] owns all round state: the deal, submissions, votes,
//! and the scoreboard. It changes only through two entry points:
//!
//! - [`PhaseController::apply`] for player actions, which are validated
//!   first and rejected without side effects when invalid;
//! - [`PhaseController::expire`] for countdown expiry, the single path a
//!   timer can take into the state.
//!
//! Both return the [`GameNotice`]s a host should show. Nothing here
//! sleeps or spawns; the countdown itself lives with the host (see the
//! `huddle` crate's session actor), which arms a timer whenever
//! [`timer_epoch`](PhaseController::timer_epoch) changes.

use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;
use std::time::Duration;

use huddle_core::{Player, PlayerIndex, RoleAssignment, Submission, Vote};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    ActionError, ActionMode, ConfigError, GameVariant, Phase, RoleAssigner, RoleMode,
    RoundConfig, RoundOutcome, RoundScheduler, RuleTable, ScoreBoard, ScoreDeltas, ScoreEngine,
    SessionConfig, Standing, TurnSequencer, TurnStep, VoteTally,
};

// ---------------------------------------------------------------------------
// Events, notices, views
// ---------------------------------------------------------------------------

/// Identifies one armed countdown. Bumped on every phase entry and every
/// turn change in a sequential action phase, so an expiry carrying an old
/// epoch is recognisably stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TimerEpoch(pub u64);

/// A player action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Leave SETUP and deal the first round.
    Start,
    /// The player holding the device has seen their card.
    ConfirmReveal { player: PlayerIndex },
    /// An answer, in variants where everyone answers at once.
    Submit { player: PlayerIndex, text: String },
    /// The performing player is done, in pass-the-device action phases.
    EndTurn { player: PlayerIndex },
    CastVote {
        voter: PlayerIndex,
        target: PlayerIndex,
    },
    /// Leave RESULT for the next round or the final standings.
    NextRound,
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::ConfirmReveal { .. } => "ConfirmReveal",
            Self::Submit { .. } => "Submit",
            Self::EndTurn { .. } => "EndTurn",
            Self::CastVote { .. } => "CastVote",
            Self::NextRound => "NextRound",
        }
    }
}

/// Something that happened, for the host to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GameNotice {
    PhaseEntered { round_index: u32, phase: Phase },
    /// The device goes to `player`.
    TurnPassed { phase: Phase, player: PlayerIndex },
    /// The answer countdown ran out before `player` submitted.
    SubmissionTimedOut { player: PlayerIndex },
    /// `player`'s performing turn ran out of time.
    TurnTimedOut { player: PlayerIndex },
    /// `voter` had nobody eligible to vote for.
    VoterSkipped { voter: PlayerIndex },
    /// The vote countdown ran out; a random eligible vote was cast for `voter`.
    VoteAutoAssigned {
        voter: PlayerIndex,
        target: PlayerIndex,
    },
    RoundScored {
        outcome: RoundOutcome,
        deltas: ScoreDeltas,
    },
    GameOver { standings: Vec<Standing> },
}

/// What the current player sees on the reveal screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RevealCard {
    Secret { content: String },
    /// The minority role: no content, just the news.
    Special,
}

/// A voteable answer on the ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BallotEntry {
    pub player: PlayerIndex,
    /// The submitted answer, in answer-based variants.
    pub answer: Option<String>,
}

/// Everything a screen needs to render the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseView {
    pub phase: Phase,
    pub round_index: u32,
    pub total_rounds: u32,
    /// The player holding the device, in pass-the-device steps.
    pub current_player: Option<PlayerIndex>,
    /// Set during REVEAL for the current player.
    pub reveal: Option<RevealCard>,
    /// The shared question during ACTION and VOTE, for variants without a
    /// secret.
    pub prompt: Option<String>,
    /// Who the current voter may pick, during VOTE.
    pub ballot: Vec<BallotEntry>,
    /// Players who have answered so far, during a simultaneous ACTION.
    pub submitted: Vec<PlayerIndex>,
    /// Full countdown length for the current phase or turn.
    pub time_budget: Option<Duration>,
    /// Time left on the countdown. The controller has no clock; hosts with
    /// a running timer fill this in.
    pub remaining: Option<Duration>,
}

// ---------------------------------------------------------------------------
// PhaseController
// ---------------------------------------------------------------------------

/// The session state machine, generic over the game variant and the
/// injected random source.
pub struct PhaseController<V: GameVariant, R: Rng = StdRng> {
    config: SessionConfig,
    rules: RuleTable,
    assigner: RoleAssigner,
    rng: R,
    phase: Phase,
    epoch: TimerEpoch,
    scheduler: RoundScheduler,
    board: ScoreBoard,
    assignment: RoleAssignment,
    previous_content: Option<String>,
    turns: TurnSequencer,
    submissions: BTreeMap<PlayerIndex, Submission>,
    /// Keyed by voter: one vote per player by construction.
    votes: BTreeMap<PlayerIndex, Vote>,
    eligible: BTreeSet<PlayerIndex>,
    history: Vec<RoundOutcome>,
    _variant: PhantomData<V>,
}

impl<V: GameVariant> PhaseController<V, StdRng> {
    /// Validates `config` and creates a controller in SETUP, seeded from
    /// the operating system.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }
}

impl<V: GameVariant, R: Rng> PhaseController<V, R> {
    /// Validates `config` and creates a controller in SETUP that draws all
    /// randomness from `rng`.
    ///
    /// # Errors
    /// Any [`ConfigError`]; the session must not start.
    pub fn with_rng(mut config: SessionConfig, rng: R) -> Result<Self, ConfigError> {
        config.durations = config.durations.validated();
        config.validate::<V>()?;

        let player_count = config.players.len();
        let rules = config.rules_for::<V>();
        info!(
            variant = V::name(),
            players = player_count,
            rounds = config.total_rounds,
            "session configured"
        );

        Ok(Self {
            rules,
            assigner: RoleAssigner::for_variant::<V>(),
            rng,
            phase: Phase::Setup,
            epoch: TimerEpoch(0),
            scheduler: RoundScheduler::new(config.total_rounds),
            board: ScoreBoard::new(player_count),
            assignment: RoleAssignment {
                special_index: None,
                content: String::new(),
                answer: None,
            },
            previous_content: None,
            turns: TurnSequencer::new(player_count),
            submissions: BTreeMap::new(),
            votes: BTreeMap::new(),
            eligible: BTreeSet::new(),
            history: Vec::new(),
            config,
            _variant: PhantomData,
        })
    }

    // -- accessors ----------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.config.players
    }

    pub fn player_count(&self) -> usize {
        self.config.players.len()
    }

    pub fn round_index(&self) -> u32 {
        self.scheduler.round_index()
    }

    pub fn round_config(&self) -> RoundConfig {
        RoundConfig {
            round_index: self.scheduler.round_index(),
            total_rounds: self.scheduler.total_rounds(),
            durations: self.config.durations,
        }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn scoreboard(&self) -> &ScoreBoard {
        &self.board
    }

    /// The current round's deal. `None` before the first round.
    pub fn assignment(&self) -> Option<&RoleAssignment> {
        (self.phase != Phase::Setup).then_some(&self.assignment)
    }

    /// Votes recorded so far this round.
    pub fn votes(&self) -> impl Iterator<Item = &Vote> {
        self.votes.values()
    }

    /// Submissions recorded so far this round.
    pub fn submissions(&self) -> impl Iterator<Item = &Submission> {
        self.submissions.values()
    }

    /// Every scored round so far, oldest first. In memory only.
    pub fn history(&self) -> &[RoundOutcome] {
        &self.history
    }

    pub fn last_outcome(&self) -> Option<&RoundOutcome> {
        self.history.last()
    }

    /// Epoch of the countdown the current phase wants.
    pub fn timer_epoch(&self) -> TimerEpoch {
        self.epoch
    }

    /// Countdown length for the current phase (or turn), if it is timed.
    pub fn time_budget(&self) -> Option<Duration> {
        match self.phase {
            Phase::Action => Some(self.config.durations.action()),
            Phase::Vote => Some(self.config.durations.vote()),
            _ => None,
        }
    }

    /// Players `voter` may vote for: eligible targets other than themselves.
    pub fn vote_options(&self, voter: PlayerIndex) -> Vec<PlayerIndex> {
        self.eligible.iter().copied().filter(|t| *t != voter).collect()
    }

    pub fn view(&self) -> PhaseView {
        let current_player = match (self.phase, V::action_mode()) {
            (Phase::Reveal | Phase::Vote, _) | (Phase::Action, ActionMode::Sequential) => {
                self.turns.current()
            }
            _ => None,
        };

        let reveal = match (self.phase, current_player) {
            (Phase::Reveal, Some(p)) if self.assignment.is_special(p) => Some(RevealCard::Special),
            (Phase::Reveal, Some(_)) => Some(RevealCard::Secret {
                content: self.assignment.content.clone(),
            }),
            _ => None,
        };

        let prompt = match (self.phase, V::role_mode()) {
            (Phase::Action | Phase::Vote, RoleMode::Shared) => Some(self.assignment.content.clone()),
            _ => None,
        };

        let ballot = match (self.phase, current_player) {
            (Phase::Vote, Some(voter)) => self
                .vote_options(voter)
                .into_iter()
                .map(|player| BallotEntry {
                    player,
                    answer: self
                        .submissions
                        .get(&player)
                        .and_then(|s| s.text.clone()),
                })
                .collect(),
            _ => Vec::new(),
        };

        let submitted = match (self.phase, V::action_mode()) {
            (Phase::Action, ActionMode::Simultaneous) => self.submissions.keys().copied().collect(),
            _ => Vec::new(),
        };

        PhaseView {
            phase: self.phase,
            round_index: self.scheduler.round_index(),
            total_rounds: self.scheduler.total_rounds(),
            current_player,
            reveal,
            prompt,
            ballot,
            submitted,
            time_budget: self.time_budget(),
            remaining: None,
        }
    }

    // -- player actions -----------------------------------------------------

    /// Applies a player action.
    ///
    /// # Errors
    /// An [`ActionError`] if the action isn't valid right now. A rejected
    /// action changes nothing.
    pub fn apply(&mut self, event: GameEvent) -> Result<Vec<GameNotice>, ActionError> {
        if self.phase == Phase::Final {
            return Err(ActionError::SessionOver);
        }

        let mut notices = Vec::new();
        match event {
            GameEvent::Start => {
                self.expect_phase(Phase::Setup, "Start")?;
                let assignment = self.deal()?;
                self.start_round(assignment, &mut notices);
            }
            GameEvent::ConfirmReveal { player } => {
                self.expect_phase(Phase::Reveal, "ConfirmReveal")?;
                self.expect_current(player)?;
                match self.turns.advance() {
                    TurnStep::Next(next) => notices.push(GameNotice::TurnPassed {
                        phase: Phase::Reveal,
                        player: next,
                    }),
                    TurnStep::AllDone => self.enter_action(&mut notices),
                }
            }
            GameEvent::Submit { player, text } => {
                self.expect_phase(Phase::Action, "Submit")?;
                self.expect_mode(ActionMode::Simultaneous, "Submit")?;
                self.expect_player(player)?;
                if self.submissions.contains_key(&player) {
                    return Err(ActionError::AlreadySubmitted(player));
                }
                let text = text.trim();
                if text.is_empty() {
                    return Err(ActionError::EmptySubmission(player));
                }
                self.submissions
                    .insert(player, Submission::answered(player, text));
                debug!(%player, "answer submitted");
                if self.submissions.len() == self.player_count() {
                    self.enter_vote(&mut notices);
                }
            }
            GameEvent::EndTurn { player } => {
                self.expect_phase(Phase::Action, "EndTurn")?;
                self.expect_mode(ActionMode::Sequential, "EndTurn")?;
                self.expect_current(player)?;
                self.advance_action_turn(&mut notices);
            }
            GameEvent::CastVote { voter, target } => {
                self.expect_phase(Phase::Vote, "CastVote")?;
                self.expect_player(voter)?;
                self.expect_player(target)?;
                if self.votes.contains_key(&voter) {
                    return Err(ActionError::AlreadyVoted(voter));
                }
                self.expect_current(voter)?;
                if voter == target {
                    return Err(ActionError::SelfVote(voter));
                }
                if !self.eligible.contains(&target) {
                    return Err(ActionError::IneligibleTarget(target));
                }
                self.votes.insert(voter, Vote::new(voter, target));
                debug!(%voter, %target, "vote cast");
                self.turns.advance();
                self.settle_vote_turn(&mut notices);
            }
            GameEvent::NextRound => {
                self.expect_phase(Phase::Result, "NextRound")?;
                let upcoming = RoundScheduler::next_round(
                    self.scheduler.round_index(),
                    self.scheduler.total_rounds(),
                );
                if upcoming.continues {
                    // Deal before moving the round index so a failed deal
                    // leaves the session untouched.
                    let assignment = self.deal()?;
                    self.scheduler.advance(&self.board);
                    self.start_round(assignment, &mut notices);
                } else {
                    self.scheduler.advance(&self.board);
                    self.enter(Phase::Final, &mut notices);
                    let standings = self.board.standings();
                    info!(
                        variant = V::name(),
                        rounds = self.scheduler.total_rounds(),
                        leader = ?standings.first().map(|s| s.player),
                        "game over"
                    );
                    notices.push(GameNotice::GameOver { standings });
                }
            }
        }
        Ok(notices)
    }

    // -- timer path ---------------------------------------------------------

    /// Handles expiry of the countdown armed for `epoch`.
    ///
    /// Stale epochs (the phase or turn has already moved on) are ignored.
    /// Otherwise the timeout policy is applied and the phase proceeds as if
    /// everyone had finished:
    ///
    /// - simultaneous ACTION: every missing answer is recorded as timed out;
    /// - sequential ACTION: the current performer's turn ends;
    /// - VOTE: every player yet to vote gets a vote chosen uniformly at
    ///   random among their eligible targets.
    pub fn expire(&mut self, epoch: TimerEpoch) -> Vec<GameNotice> {
        let mut notices = Vec::new();
        if epoch != self.epoch || !self.phase.is_timed() {
            debug!(?epoch, current = ?self.epoch, phase = %self.phase, "stale timer ignored");
            return notices;
        }

        match (self.phase, V::action_mode()) {
            (Phase::Action, ActionMode::Simultaneous) => {
                for player in PlayerIndex::all(self.player_count()) {
                    if !self.submissions.contains_key(&player) {
                        self.submissions
                            .insert(player, Submission::timed_out(player));
                        notices.push(GameNotice::SubmissionTimedOut { player });
                    }
                }
                debug!(missing = notices.len(), "answer time expired");
                self.enter_vote(&mut notices);
            }
            (Phase::Action, ActionMode::Sequential) => {
                if let Some(player) = self.turns.current() {
                    debug!(%player, "performing turn expired");
                    notices.push(GameNotice::TurnTimedOut { player });
                }
                self.advance_action_turn(&mut notices);
            }
            (Phase::Vote, _) => {
                for voter in self.turns.pending() {
                    let options = self.vote_options(voter);
                    if options.is_empty() {
                        notices.push(GameNotice::VoterSkipped { voter });
                        continue;
                    }
                    let target = options[self.rng.random_range(0..options.len())];
                    self.votes.insert(voter, Vote::new(voter, target));
                    notices.push(GameNotice::VoteAutoAssigned { voter, target });
                }
                while self.turns.current().is_some() {
                    self.turns.advance();
                }
                self.resolve(&mut notices);
            }
            _ => {}
        }
        notices
    }

    // -- transitions --------------------------------------------------------

    fn enter(&mut self, phase: Phase, notices: &mut Vec<GameNotice>) {
        debug_assert!(
            self.phase.can_transition_to(phase),
            "illegal transition {} -> {}",
            self.phase,
            phase
        );
        self.phase = phase;
        self.bump_epoch();
        debug!(round = self.scheduler.round_index(), %phase, "phase entered");
        notices.push(GameNotice::PhaseEntered {
            round_index: self.scheduler.round_index(),
            phase,
        });
    }

    fn bump_epoch(&mut self) {
        self.epoch = TimerEpoch(self.epoch.0 + 1);
    }

    fn deal(&mut self) -> Result<RoleAssignment, ActionError> {
        let assignment = self.assigner.assign(
            &self.config.players,
            &self.config.content_pool,
            self.previous_content.as_deref(),
            &mut self.rng,
        )?;
        Ok(assignment)
    }

    fn start_round(&mut self, assignment: RoleAssignment, notices: &mut Vec<GameNotice>) {
        self.previous_content = Some(assignment.content.clone());
        self.assignment = assignment;
        self.submissions.clear();
        self.votes.clear();
        self.eligible.clear();
        self.turns = TurnSequencer::new(self.player_count());

        info!(
            variant = V::name(),
            round = self.scheduler.round_index(),
            total = self.scheduler.total_rounds(),
            "round started"
        );
        self.enter(Phase::Reveal, notices);
        self.push_turn(Phase::Reveal, notices);
    }

    fn enter_action(&mut self, notices: &mut Vec<GameNotice>) {
        self.turns = TurnSequencer::new(self.player_count());
        self.enter(Phase::Action, notices);
        if V::action_mode() == ActionMode::Sequential {
            self.push_turn(Phase::Action, notices);
        }
    }

    fn advance_action_turn(&mut self, notices: &mut Vec<GameNotice>) {
        match self.turns.advance() {
            TurnStep::Next(player) => {
                // Fresh countdown for the next performer.
                self.bump_epoch();
                notices.push(GameNotice::TurnPassed {
                    phase: Phase::Action,
                    player,
                });
            }
            TurnStep::AllDone => self.enter_vote(notices),
        }
    }

    fn enter_vote(&mut self, notices: &mut Vec<GameNotice>) {
        self.eligible =
            V::eligible_targets(&self.assignment, &self.submissions, &self.config.players);
        self.turns = TurnSequencer::new(self.player_count());
        self.enter(Phase::Vote, notices);
        self.settle_vote_turn(notices);
    }

    /// Hands the device to the next voter who has someone to vote for,
    /// skipping those who don't. Resolves the round when nobody is left.
    fn settle_vote_turn(&mut self, notices: &mut Vec<GameNotice>) {
        while let Some(voter) = self.turns.current() {
            if !self.vote_options(voter).is_empty() {
                notices.push(GameNotice::TurnPassed {
                    phase: Phase::Vote,
                    player: voter,
                });
                return;
            }
            debug!(%voter, "voter has no eligible target, skipping");
            notices.push(GameNotice::VoterSkipped { voter });
            self.turns.advance();
        }
        self.resolve(notices);
    }

    fn resolve(&mut self, notices: &mut Vec<GameNotice>) {
        let votes: Vec<Vote> = self.votes.values().copied().collect();
        let result = VoteTally::tally(&votes, &self.eligible);
        debug_assert_eq!(result.total() as usize, votes.len(), "every recorded vote is counted");

        let outcome = RoundOutcome {
            round_index: self.scheduler.round_index(),
            player_count: self.player_count(),
            assignment: self.assignment.clone(),
            submissions: self.submissions.values().cloned().collect(),
            votes,
            result,
        };
        let deltas = ScoreEngine::score(&outcome, &self.rules);
        self.board.apply(&deltas);

        info!(
            round = outcome.round_index,
            winner = ?outcome.result.winning_index,
            tie = outcome.result.tie,
            votes = outcome.votes.len(),
            "round scored"
        );

        self.history.push(outcome.clone());
        self.enter(Phase::Result, notices);
        notices.push(GameNotice::RoundScored { outcome, deltas });
    }

    fn push_turn(&self, phase: Phase, notices: &mut Vec<GameNotice>) {
        if let Some(player) = self.turns.current() {
            notices.push(GameNotice::TurnPassed { phase, player });
        }
    }

    // -- validation ---------------------------------------------------------

    fn expect_phase(&self, phase: Phase, event: &'static str) -> Result<(), ActionError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(ActionError::WrongPhase {
                event,
                actual: self.phase,
            })
        }
    }

    fn expect_mode(&self, mode: ActionMode, event: &'static str) -> Result<(), ActionError> {
        if V::action_mode() == mode {
            Ok(())
        } else {
            Err(ActionError::Unsupported {
                event,
                variant: V::name(),
            })
        }
    }

    fn expect_player(&self, player: PlayerIndex) -> Result<(), ActionError> {
        if player.get() < self.player_count() {
            Ok(())
        } else {
            Err(ActionError::UnknownPlayer(player))
        }
    }

    fn expect_current(&self, player: PlayerIndex) -> Result<(), ActionError> {
        self.expect_player(player)?;
        match self.turns.current() {
            Some(expected) if expected == player => Ok(()),
            Some(expected) => Err(ActionError::NotYourTurn {
                expected,
                got: player,
            }),
            // Pass already complete; the phase transition would have
            // moved us on, so this is a stray event.
            None => Err(ActionError::WrongPhase {
                event: "turn",
                actual: self.phase,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ImpostorDrawing, RoundDurations, WrongAnswer};
    use huddle_core::ContentPool;

    fn p(i: usize) -> PlayerIndex {
        PlayerIndex(i)
    }

    fn impostor(players: usize, rounds: u32) -> PhaseController<ImpostorDrawing> {
        let names: Vec<String> = (0..players).map(|i| format!("P{i}")).collect();
        let config = SessionConfig::new(
            Player::table(names),
            ContentPool::words(["kite", "boat", "lamp"]),
            rounds,
        );
        PhaseController::with_rng(config, StdRng::seed_from_u64(11)).unwrap()
    }

    fn reveal_all<V: GameVariant, R: Rng>(c: &mut PhaseController<V, R>) {
        for i in 0..c.player_count() {
            c.apply(GameEvent::ConfirmReveal { player: p(i) }).unwrap();
        }
    }

    #[test]
    fn test_new_controller_is_in_setup() {
        let c = impostor(3, 1);
        assert_eq!(c.phase(), Phase::Setup);
        assert!(c.assignment().is_none());
        assert_eq!(c.scoreboard().totals(), &[0, 0, 0]);
        assert_eq!(c.time_budget(), None);
    }

    #[test]
    fn test_setup_rejects_invalid_config() {
        let config = SessionConfig::new(Player::table(["A", "B"]), ContentPool::words(["x"]), 1);
        let err = PhaseController::<ImpostorDrawing>::new(config).err();
        assert!(matches!(err, Some(ConfigError::InsufficientPlayers { .. })));
    }

    #[test]
    fn test_start_deals_and_enters_reveal() {
        let mut c = impostor(4, 1);
        let notices = c.apply(GameEvent::Start).unwrap();
        assert_eq!(c.phase(), Phase::Reveal);
        assert!(notices.contains(&GameNotice::PhaseEntered {
            round_index: 0,
            phase: Phase::Reveal
        }));
        assert!(notices.contains(&GameNotice::TurnPassed {
            phase: Phase::Reveal,
            player: p(0)
        }));
        let special = c.assignment().unwrap().special_index.unwrap();
        assert!(special.get() < 4);
    }

    #[test]
    fn test_reveal_card_hides_content_from_special_player() {
        let mut c = impostor(3, 1);
        c.apply(GameEvent::Start).unwrap();
        let special = c.assignment().unwrap().special_index.unwrap();
        for i in 0..3 {
            let view = c.view();
            assert_eq!(view.current_player, Some(p(i)));
            if p(i) == special {
                assert_eq!(view.reveal, Some(RevealCard::Special));
            } else {
                assert!(matches!(view.reveal, Some(RevealCard::Secret { .. })));
            }
            assert_eq!(view.prompt, None);
            c.apply(GameEvent::ConfirmReveal { player: p(i) }).unwrap();
        }
        assert_eq!(c.phase(), Phase::Action);
    }

    #[test]
    fn test_out_of_turn_reveal_is_rejected_without_change() {
        let mut c = impostor(3, 1);
        c.apply(GameEvent::Start).unwrap();
        let err = c.apply(GameEvent::ConfirmReveal { player: p(1) }).unwrap_err();
        assert_eq!(
            err,
            ActionError::NotYourTurn {
                expected: p(0),
                got: p(1)
            }
        );
        assert_eq!(c.view().current_player, Some(p(0)));
    }

    #[test]
    fn test_wrong_phase_and_unsupported_events() {
        let mut c = impostor(3, 1);
        assert!(matches!(
            c.apply(GameEvent::CastVote { voter: p(0), target: p(1) }),
            Err(ActionError::WrongPhase { actual: Phase::Setup, .. })
        ));
        c.apply(GameEvent::Start).unwrap();
        reveal_all(&mut c);
        assert!(matches!(
            c.apply(GameEvent::Submit { player: p(0), text: "x".into() }),
            Err(ActionError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_sequential_action_bumps_epoch_per_turn() {
        let mut c = impostor(3, 1);
        c.apply(GameEvent::Start).unwrap();
        reveal_all(&mut c);
        let first = c.timer_epoch();
        assert_eq!(c.time_budget(), Some(Duration::from_secs(60)));

        c.apply(GameEvent::EndTurn { player: p(0) }).unwrap();
        let second = c.timer_epoch();
        assert!(second > first);

        // The first performer's countdown is now stale.
        assert!(c.expire(first).is_empty());
        assert_eq!(c.view().current_player, Some(p(1)));

        let notices = c.expire(second);
        assert!(notices.contains(&GameNotice::TurnTimedOut { player: p(1) }));
        assert_eq!(c.view().current_player, Some(p(2)));
    }

    #[test]
    fn test_vote_validation() {
        let mut c = impostor(3, 1);
        c.apply(GameEvent::Start).unwrap();
        reveal_all(&mut c);
        for i in 0..3 {
            c.apply(GameEvent::EndTurn { player: p(i) }).unwrap();
        }
        assert_eq!(c.phase(), Phase::Vote);

        assert_eq!(
            c.apply(GameEvent::CastVote { voter: p(0), target: p(0) }),
            Err(ActionError::SelfVote(p(0)))
        );
        assert_eq!(
            c.apply(GameEvent::CastVote { voter: p(0), target: p(9) }),
            Err(ActionError::UnknownPlayer(p(9)))
        );
        c.apply(GameEvent::CastVote { voter: p(0), target: p(1) })
            .unwrap();
        assert_eq!(
            c.apply(GameEvent::CastVote { voter: p(0), target: p(2) }),
            Err(ActionError::AlreadyVoted(p(0)))
        );
        assert_eq!(c.votes().count(), 1);
    }

    #[test]
    fn test_bluff_rejects_vote_for_correct_answer_at_cast_time() {
        let config = SessionConfig::new(
            Player::table(["Ana", "Ben", "Cy"]),
            ContentPool::new(vec![huddle_core::ContentItem::question(
                "Capital of France?",
                "Paris",
            )]),
            1,
        );
        let mut c =
            PhaseController::<WrongAnswer>::with_rng(config, StdRng::seed_from_u64(5)).unwrap();
        c.apply(GameEvent::Start).unwrap();
        reveal_all(&mut c);
        c.apply(GameEvent::Submit { player: p(0), text: "Paris".into() }).unwrap();
        c.apply(GameEvent::Submit { player: p(1), text: "Lyon".into() }).unwrap();
        assert_eq!(
            c.apply(GameEvent::Submit { player: p(1), text: "Nice".into() }),
            Err(ActionError::AlreadySubmitted(p(1)))
        );
        assert_eq!(
            c.apply(GameEvent::Submit { player: p(2), text: "   ".into() }),
            Err(ActionError::EmptySubmission(p(2)))
        );
        c.apply(GameEvent::Submit { player: p(2), text: "Marseille".into() }).unwrap();
        assert_eq!(c.phase(), Phase::Vote);

        assert_eq!(
            c.apply(GameEvent::CastVote { voter: p(0), target: p(0) }),
            Err(ActionError::SelfVote(p(0)))
        );
        c.apply(GameEvent::CastVote { voter: p(0), target: p(1) }).unwrap();
        // #0 wrote the correct answer, so nobody may vote for it.
        assert_eq!(
            c.apply(GameEvent::CastVote { voter: p(1), target: p(0) }),
            Err(ActionError::IneligibleTarget(p(0)))
        );
        let view = c.view();
        assert_eq!(view.prompt.as_deref(), Some("Capital of France?"));
        assert_eq!(
            view.ballot,
            vec![BallotEntry {
                player: p(2),
                answer: Some("Marseille".into())
            }]
        );
    }

    #[test]
    fn test_durations_are_clamped_on_construction() {
        let names = ["A", "B", "C"];
        let config = SessionConfig::new(Player::table(names), ContentPool::words(["x", "y"]), 1)
            .with_durations(RoundDurations {
                reveal_secs: 5,
                action_secs: 5_000,
                vote_secs: 20,
            });
        let c = PhaseController::<ImpostorDrawing>::with_rng(config, StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(
            c.round_config().durations.action_secs,
            RoundDurations::MAX_SECS
        );
    }

    #[test]
    fn test_events_after_final_are_rejected() {
        let mut c = impostor(3, 1);
        c.apply(GameEvent::Start).unwrap();
        reveal_all(&mut c);
        for i in 0..3 {
            c.apply(GameEvent::EndTurn { player: p(i) }).unwrap();
        }
        for i in 0..3 {
            let target = p((i + 1) % 3);
            c.apply(GameEvent::CastVote { voter: p(i), target }).unwrap();
        }
        assert_eq!(c.phase(), Phase::Result);
        let notices = c.apply(GameEvent::NextRound).unwrap();
        assert_eq!(c.phase(), Phase::Final);
        assert!(matches!(notices.last(), Some(GameNotice::GameOver { .. })));
        assert_eq!(c.apply(GameEvent::NextRound), Err(ActionError::SessionOver));
    }

    #[test]
    fn test_failed_deal_leaves_result_phase_untouched() {
        let mut c = impostor(3, 2);
        c.apply(GameEvent::Start).unwrap();
        reveal_all(&mut c);
        for i in 0..3 {
            c.apply(GameEvent::EndTurn { player: p(i) }).unwrap();
        }
        for i in 0..3 {
            let target = p((i + 1) % 3);
            c.apply(GameEvent::CastVote { voter: p(i), target }).unwrap();
        }
        assert_eq!(c.phase(), Phase::Result);
        let epoch = c.timer_epoch();
        let content = c.assignment().unwrap().content.clone();

        c.config.content_pool = ContentPool::new(Vec::new());
        assert_eq!(
            c.apply(GameEvent::NextRound),
            Err(ActionError::Setup(ConfigError::InsufficientContent))
        );
        assert_eq!(c.phase(), Phase::Result);
        assert_eq!(c.round_index(), 0);
        assert_eq!(c.timer_epoch(), epoch);
        assert_eq!(c.assignment().unwrap().content, content);
    }
}
