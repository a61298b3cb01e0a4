//! Terminal hot-seat demo: one keyboard passed around the table.
//!
//! ```text
//! pass-and-play [impostor|bluff] [session.json]
//! ```
//!
//! Without a config file a three-player table with a small built-in pool
//! is used. Set `RUST_LOG=huddle_round=debug` to watch the engine.

use std::env;
use std::error::Error;

use huddle::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Game {
    Impostor,
    Bluff,
}

impl Game {
    fn parse(arg: Option<&str>) -> Result<Self, String> {
        match arg {
            None | Some("impostor") => Ok(Self::Impostor),
            Some("bluff") => Ok(Self::Bluff),
            Some(other) => Err(format!("unknown game {other:?}, expected impostor or bluff")),
        }
    }
}

fn default_config(game: Game) -> SessionConfig {
    let players = Player::table(["Ada", "Bo", "Cy"]);
    let pool = match game {
        Game::Impostor => ContentPool::words(["lighthouse", "volcano", "bicycle", "octopus"]),
        Game::Bluff => ContentPool::new(vec![
            ContentItem::question("What is the capital of Australia?", "Canberra"),
            ContentItem::question("Which planet has the most moons?", "Saturn"),
            ContentItem::question("What does a lepidopterist study?", "Butterflies"),
        ]),
    };
    SessionConfig::new(players, pool, 3)
}

fn load_config(path: &str) -> Result<SessionConfig, Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

struct Table {
    players: Vec<Player>,
}

impl Table {
    fn name(&self, player: PlayerIndex) -> &str {
        self.players
            .get(player.get())
            .map_or("?", |p| p.name.as_str())
    }

    fn render_view(&self, view: &PhaseView) {
        let clock = view
            .remaining
            .map(|left| format!(" [{}s left]", left.as_secs()))
            .unwrap_or_default();

        match (view.phase, view.current_player) {
            (Phase::Reveal, Some(player)) => {
                println!("\n--- {}, your card (everyone else look away) ---", self.name(player));
                match &view.reveal {
                    Some(RevealCard::Secret { content }) => println!("    the word is: {content}"),
                    Some(RevealCard::Special) => println!("    you are the IMPOSTOR"),
                    None => {}
                }
                println!("press enter, then pass the device on");
            }
            (Phase::Action, Some(player)) => {
                println!("{} is performing{clock}. Press enter when done.", self.name(player));
            }
            (Phase::Action, None) => {
                if let Some(prompt) = &view.prompt {
                    println!("Q: {prompt}{clock}");
                }
                let answered: Vec<_> = view.submitted.iter().map(|p| self.name(*p)).collect();
                println!("type `<seat> <answer>` (answered so far: {answered:?})");
            }
            (Phase::Vote, Some(voter)) => {
                println!("\n{}, cast your vote{clock}:", self.name(voter));
                for (i, entry) in view.ballot.iter().enumerate() {
                    match &entry.answer {
                        Some(answer) => println!("  {}) {answer}", i + 1),
                        None => println!("  {}) {}", i + 1, self.name(entry.player)),
                    }
                }
            }
            (Phase::Result, _) => println!("press enter to continue"),
            _ => {}
        }
    }

    fn render_notice(&self, notice: &GameNotice) {
        match notice {
            GameNotice::PhaseEntered { round_index, phase } => {
                println!("\n=== round {} : {phase} ===", round_index + 1);
            }
            GameNotice::TurnPassed { .. } => {}
            GameNotice::SubmissionTimedOut { player } => {
                println!("  {} ran out of time", self.name(*player));
            }
            GameNotice::TurnTimedOut { player } => {
                println!("  time's up for {}", self.name(*player));
            }
            GameNotice::VoterSkipped { voter } => {
                println!("  {} has nobody to vote for", self.name(*voter));
            }
            GameNotice::VoteAutoAssigned { voter, target } => {
                println!(
                    "  {} didn't vote; picked {} at random",
                    self.name(*voter),
                    self.name(*target)
                );
            }
            GameNotice::RoundScored { outcome, deltas } => {
                let assignment = &outcome.assignment;
                match (&assignment.answer, assignment.special_index) {
                    (Some(answer), _) => println!("the correct answer was: {answer}"),
                    (None, Some(special)) => println!(
                        "the word was {:?}; the impostor was {}",
                        assignment.content,
                        self.name(special)
                    ),
                    (None, None) => println!("the word was {:?}", assignment.content),
                }
                for (player, delta) in deltas {
                    println!("  {:>10}  {delta:+}", self.name(*player));
                }
            }
            GameNotice::GameOver { standings } => {
                println!("\n=== final standings ===");
                for (rank, standing) in standings.iter().enumerate() {
                    println!(
                        "  {}. {:<10} {}",
                        rank + 1,
                        self.name(standing.player),
                        standing.score
                    );
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Turns a line of input into an engine event for the current view.
/// Seats and ballot entries are numbered from 1 on screen.
fn event_for(view: &PhaseView, line: &str) -> Option<GameEvent> {
    match view.phase {
        Phase::Reveal => view
            .current_player
            .map(|player| GameEvent::ConfirmReveal { player }),
        Phase::Action => match view.current_player {
            Some(player) => Some(GameEvent::EndTurn { player }),
            None => {
                let (seat, text) = line.split_once(' ')?;
                let seat: usize = seat.parse().ok()?;
                Some(GameEvent::Submit {
                    player: PlayerIndex(seat.checked_sub(1)?),
                    text: text.to_string(),
                })
            }
        },
        Phase::Vote => {
            let voter = view.current_player?;
            let choice: usize = line.parse().ok()?;
            let entry = view.ballot.get(choice.checked_sub(1)?)?;
            Some(GameEvent::CastVote {
                voter,
                target: entry.player,
            })
        }
        Phase::Result => Some(GameEvent::NextRound),
        Phase::Setup | Phase::Final => None,
    }
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let game = Game::parse(args.next().as_deref())?;
    let config = match args.next() {
        Some(path) => load_config(&path)?,
        None => default_config(game),
    };
    let table = Table {
        players: config.players.clone(),
    };

    let (handle, mut updates) = match game {
        Game::Impostor => spawn_session::<ImpostorDrawing>(config)?,
        Game::Bluff => spawn_session::<WrongAnswer>(config)?,
    };
    info!(?game, players = table.players.len(), "starting game");
    let mut view = handle.start().await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                match update {
                    SessionUpdate::Notice(notice) => table.render_notice(&notice),
                    SessionUpdate::View(next) => {
                        table.render_view(&next);
                        view = next;
                    }
                }
                if view.phase == Phase::Final {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(event) = event_for(&view, line.trim()) else {
                    println!("  ? didn't understand {line:?}");
                    continue;
                };
                debug!(event = event.name(), "input");
                match handle.act(event).await {
                    // The new view arrives on the update channel.
                    Ok(_) => {}
                    Err(HuddleError::Action(err)) => println!("  ! {err}"),
                    Err(err) => return Err(err.into()),
                }
            }
        }
    }

    let _ = handle.shutdown().await;
    Ok(())
}
