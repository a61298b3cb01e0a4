//! Session actor: a Tokio task that owns one game and its countdown.
//!
//! The actor pairs a [`PhaseController`] with a [`PhaseTimer`] and runs them
//! in a single `select!` loop, so player actions and timer expiry are never
//! processed at the same time. The outside world talks to it through a
//! [`GameHandle`] and listens on an update channel.
//!
//! Whenever the controller's timer epoch changes (new phase, new
//! performing turn) the running countdown is cancelled and, if the new
//! phase is timed, a fresh one is armed. A countdown therefore cannot fire
//! into a phase it wasn't armed for, and the controller ignores stale
//! epochs as a second line.

use huddle_round::{
    ActionError, GameEvent, GameNotice, GameVariant, PhaseController, PhaseView, SessionConfig,
    Standing, TimerEpoch,
};
use huddle_timer::PhaseTimer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::HuddleError;

/// Capacity of the command channel. Callers wait when it's full.
const COMMAND_BUFFER: usize = 32;

/// Something the session wants the screens to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SessionUpdate {
    Notice(GameNotice),
    /// Fresh render data, sent after every change.
    View(PhaseView),
}

/// Receiving end of a session's updates.
pub type UpdateReceiver = mpsc::UnboundedReceiver<SessionUpdate>;

enum SessionCommand {
    Act {
        event: GameEvent,
        reply: oneshot::Sender<Result<PhaseView, ActionError>>,
    },
    View {
        reply: oneshot::Sender<PhaseView>,
    },
    Standings {
        reply: oneshot::Sender<Vec<Standing>>,
    },
    Shutdown,
}

/// Handle to a running session. Cheap to clone.
#[derive(Clone)]
pub struct GameHandle {
    sender: mpsc::Sender<SessionCommand>,
}

impl GameHandle {
    /// Applies a player action and returns the view that follows it.
    ///
    /// # Errors
    /// [`HuddleError::Action`] if the engine rejected the action (nothing
    /// changed), [`HuddleError::Unavailable`] if the session has stopped.
    pub async fn act(&self, event: GameEvent) -> Result<PhaseView, HuddleError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Act {
                event,
                reply: reply_tx,
            })
            .await
            .map_err(|_| HuddleError::Unavailable)?;
        let result = reply_rx.await.map_err(|_| HuddleError::Unavailable)?;
        Ok(result?)
    }

    /// Leaves SETUP and deals the first round.
    pub async fn start(&self) -> Result<PhaseView, HuddleError> {
        self.act(GameEvent::Start).await
    }

    /// Current render data, with the time left on any running countdown.
    pub async fn view(&self) -> Result<PhaseView, HuddleError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::View { reply: reply_tx })
            .await
            .map_err(|_| HuddleError::Unavailable)?;
        reply_rx.await.map_err(|_| HuddleError::Unavailable)
    }

    /// Current standings, highest score first.
    pub async fn standings(&self) -> Result<Vec<Standing>, HuddleError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Standings { reply: reply_tx })
            .await
            .map_err(|_| HuddleError::Unavailable)?;
        reply_rx.await.map_err(|_| HuddleError::Unavailable)
    }

    /// Stops the session. Pending countdowns are cancelled.
    pub async fn shutdown(&self) -> Result<(), HuddleError> {
        self.sender
            .send(SessionCommand::Shutdown)
            .await
            .map_err(|_| HuddleError::Unavailable)
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Validates `config`, spawns a session for variant `V`, and returns its
/// handle and update stream. Randomness is seeded from the OS.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
/// [`HuddleError::Config`] if setup validation fails; nothing is spawned.
pub fn spawn_session<V: GameVariant>(
    config: SessionConfig,
) -> Result<(GameHandle, UpdateReceiver), HuddleError> {
    spawn_session_with_rng::<V, _>(config, StdRng::from_os_rng())
}

/// Like [`spawn_session`] with an injected random source, for reproducible
/// games.
pub fn spawn_session_with_rng<V, R>(
    config: SessionConfig,
    rng: R,
) -> Result<(GameHandle, UpdateReceiver), HuddleError>
where
    V: GameVariant,
    R: Rng + Send + 'static,
{
    let controller = PhaseController::<V, R>::with_rng(config, rng)?;
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let (updates_tx, updates_rx) = mpsc::unbounded_channel();

    let actor = SessionActor {
        controller,
        timer: PhaseTimer::new(),
        synced_epoch: None,
        receiver: rx,
        updates: updates_tx,
    };
    tokio::spawn(actor.run());

    Ok((GameHandle { sender: tx }, updates_rx))
}

/// The actor state. Runs inside a Tokio task.
struct SessionActor<V: GameVariant, R: Rng> {
    controller: PhaseController<V, R>,
    timer: PhaseTimer<TimerEpoch>,
    /// Epoch the timer was last synced to.
    synced_epoch: Option<TimerEpoch>,
    receiver: mpsc::Receiver<SessionCommand>,
    updates: mpsc::UnboundedSender<SessionUpdate>,
}

impl<V: GameVariant, R: Rng> SessionActor<V, R> {
    async fn run(mut self) {
        info!(
            variant = V::name(),
            players = self.controller.player_count(),
            "session actor started"
        );

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else {
                        debug!("all handles dropped");
                        break;
                    };
                    match cmd {
                        SessionCommand::Act { event, reply } => {
                            let name = event.name();
                            match self.controller.apply(event) {
                                Ok(notices) => {
                                    self.publish(notices);
                                    let _ = reply.send(Ok(self.view()));
                                }
                                Err(err) => {
                                    debug!(event = name, error = %err, "action rejected");
                                    let _ = reply.send(Err(err));
                                }
                            }
                        }
                        SessionCommand::View { reply } => {
                            let _ = reply.send(self.view());
                        }
                        SessionCommand::Standings { reply } => {
                            let _ = reply.send(self.controller.scoreboard().standings());
                        }
                        SessionCommand::Shutdown => {
                            info!(variant = V::name(), "session shutting down");
                            break;
                        }
                    }
                }
                epoch = self.timer.wait_for_expiry() => {
                    debug!(?epoch, phase = %self.controller.phase(), "phase countdown expired");
                    let notices = self.controller.expire(epoch);
                    if !notices.is_empty() {
                        self.publish(notices);
                    }
                }
            }
        }

        self.timer.cancel();
        info!(variant = V::name(), "session actor stopped");
    }

    /// Re-syncs the countdown, then sends notices and a fresh view.
    /// Silently drops updates if nobody is listening.
    fn publish(&mut self, notices: Vec<GameNotice>) {
        self.sync_timer();
        for notice in notices {
            let _ = self.updates.send(SessionUpdate::Notice(notice));
        }
        let _ = self.updates.send(SessionUpdate::View(self.view()));
    }

    fn sync_timer(&mut self) {
        let epoch = self.controller.timer_epoch();
        if self.synced_epoch == Some(epoch) {
            return;
        }
        self.synced_epoch = Some(epoch);
        self.timer.cancel();
        if let Some(budget) = self.controller.time_budget() {
            self.timer.arm(epoch, budget);
        }
    }

    fn view(&self) -> PhaseView {
        let mut view = self.controller.view();
        view.remaining = self.timer.remaining();
        view
    }
}
