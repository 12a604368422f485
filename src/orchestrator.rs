//! Async runtime around the session state machine.
//!
//! [`GameOrchestrator`] is a single tokio task that owns the [`GameSession`].
//! Player commands, timer ticks and fetch results all funnel into its loop
//! and are applied one at a time, so no operation ever sees a half-updated
//! session.
//!
//! Timers are derived from state after every event: a timer whose
//! [`TimerKind::is_active`] predicate holds gets a fresh interval if it has
//! none, and one whose predicate fails is dropped. Resuming from pause
//! therefore counts a full tick from the frozen value.

use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use derive_more::{Display, Error};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, Sleep, interval_at, sleep};
use tracing::{debug, info, instrument};

use crate::facts::FactService;
use crate::game::{Country, Effect, GameSession, RoundId, SessionSnapshot, TimerKind, Transition};

/// Player commands accepted by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start or restart a game.
    Start,
    /// Answer the current round.
    Guess(Country),
    /// Move on after a correct answer.
    Advance,
    /// Pause or resume.
    TogglePause,
    /// Ask for the extended description.
    RequestDetail,
    /// Stop the orchestrator.
    Shutdown,
}

/// Fetch results coming back from spawned tasks.
#[derive(Debug)]
enum Fetched {
    Fact { round: RoundId, text: String },
    Detail { round: RoundId, text: String },
}

/// What woke the loop.
#[derive(Debug)]
enum Wake {
    Command(Option<Command>),
    Fetched(Fetched),
    SessionTick,
    QuestionTick(RoundId),
    PenaltyElapsed(RoundId),
}

/// Orchestrator error.
#[derive(Debug, Clone, Display, Error)]
#[display("Orchestrator error: {} at {}:{}", message, file, line)]
pub struct OrchestratorError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl OrchestratorError {
    /// Creates a new orchestrator error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Client side of a running orchestrator.
#[derive(Debug, Clone)]
pub struct GameHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl GameHandle {
    /// Sends a command.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError`] if the orchestrator has stopped.
    #[instrument(skip(self))]
    pub fn send(&self, command: Command) -> Result<(), OrchestratorError> {
        self.commands
            .send(command)
            .map_err(|_| OrchestratorError::new("Orchestrator has stopped"))
    }

    /// Latest published state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }
}

type Ticker = Option<Interval>;
type RoundTicker = Option<(RoundId, Interval)>;
type Penalty = Option<(RoundId, Pin<Box<Sleep>>)>;

/// Single owner of a [`GameSession`].
pub struct GameOrchestrator {
    session: GameSession,
    facts: Arc<dyn FactService>,
    commands: mpsc::UnboundedReceiver<Command>,
    fetched_tx: mpsc::UnboundedSender<Fetched>,
    fetched_rx: mpsc::UnboundedReceiver<Fetched>,
    snapshots: watch::Sender<SessionSnapshot>,
    session_ticker: Ticker,
    question_ticker: RoundTicker,
    penalty: Penalty,
}

impl GameOrchestrator {
    /// Spawns the orchestrator on the current tokio runtime.
    #[instrument(skip_all)]
    pub fn spawn(session: GameSession, facts: Arc<dyn FactService>) -> (GameHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (fetched_tx, fetched_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

        let orchestrator = Self {
            session,
            facts,
            commands: command_rx,
            fetched_tx,
            fetched_rx,
            snapshots: snapshot_tx,
            session_ticker: None,
            question_ticker: None,
            penalty: None,
        };

        let task = tokio::spawn(orchestrator.run());
        info!("Game orchestrator spawned");

        (
            GameHandle {
                commands: command_tx,
                snapshots: snapshot_rx,
            },
            task,
        )
    }

    /// Runs until shut down or every handle is dropped.
    async fn run(mut self) {
        info!("Game orchestrator running");

        loop {
            self.arm_timers();

            let wake = tokio::select! {
                command = self.commands.recv() => Wake::Command(command),
                Some(fetched) = self.fetched_rx.recv() => Wake::Fetched(fetched),
                _ = next_tick(&mut self.session_ticker) => Wake::SessionTick,
                round = next_round_tick(&mut self.question_ticker) => Wake::QuestionTick(round),
                round = penalty_elapsed(&mut self.penalty) => Wake::PenaltyElapsed(round),
            };

            let transition = match wake {
                Wake::Command(None) | Wake::Command(Some(Command::Shutdown)) => break,
                Wake::Command(Some(command)) => self.apply_command(command),
                Wake::Fetched(Fetched::Fact { round, text }) => self.session.apply_fact(round, text),
                Wake::Fetched(Fetched::Detail { round, text }) => {
                    self.session.apply_detail(round, text)
                }
                Wake::SessionTick => self.session.tick_session(),
                Wake::QuestionTick(round) => {
                    if self.session.round_id() == Some(round) {
                        self.session.tick_question()
                    } else {
                        debug!(%round, "Dropping tick for a previous round");
                        Ok(None)
                    }
                }
                Wake::PenaltyElapsed(round) => {
                    self.penalty = None;
                    self.session.complete_penalty(round)
                }
            };

            match transition {
                Ok(Some(effect)) => self.launch(effect),
                Ok(None) => {}
                Err(reason) => debug!(%reason, "Event ignored"),
            }

            self.publish();
        }

        info!("Game orchestrator stopped");
    }

    #[instrument(skip(self))]
    fn apply_command(&mut self, command: Command) -> Transition {
        match command {
            Command::Start => self.session.start_game(),
            Command::Guess(country) => self.session.submit_guess(&country),
            Command::Advance => self.session.advance_round(),
            Command::TogglePause => self.session.toggle_pause(),
            Command::RequestDetail => self.session.request_detail(),
            Command::Shutdown => Ok(None),
        }
    }

    /// Starts a fetch without waiting for it.
    #[instrument(skip(self))]
    fn launch(&self, effect: Effect) {
        let facts = Arc::clone(&self.facts);
        let tx = self.fetched_tx.clone();

        tokio::spawn(async move {
            let fetched = match effect {
                Effect::FetchFact { round, country } => Fetched::Fact {
                    round,
                    text: facts.short_fact(country.name()).await,
                },
                Effect::FetchDetail { round, country } => Fetched::Detail {
                    round,
                    text: facts.detailed_info(country.name()).await,
                },
            };
            if tx.send(fetched).is_err() {
                debug!("Orchestrator gone, dropping fetch result");
            }
        });
    }

    /// Starts and stops timers to match the session state.
    fn arm_timers(&mut self) {
        let period = *self.session.rules().tick_interval();

        if TimerKind::Session.is_active(&self.session) {
            if self.session_ticker.is_none() {
                debug!("Session timer started");
                self.session_ticker = Some(ticker(period));
            }
        } else if self.session_ticker.take().is_some() {
            debug!("Session timer stopped");
        }

        match self.session.round_id() {
            Some(round) if TimerKind::Question.is_active(&self.session) => {
                let armed_for = self.question_ticker.as_ref().map(|(r, _)| *r);
                if armed_for != Some(round) {
                    debug!(%round, "Question timer started");
                    self.question_ticker = Some((round, ticker(period)));
                }
            }
            _ => {
                if self.question_ticker.take().is_some() {
                    debug!("Question timer stopped");
                }
            }
        }

        match self.session.round_id() {
            Some(round) if TimerKind::Penalty.is_active(&self.session) => {
                let armed_for = self.penalty.as_ref().map(|(r, _)| *r);
                if armed_for != Some(round) {
                    let delay = *self.session.rules().penalty_delay();
                    debug!(%round, ?delay, "Penalty delay started");
                    self.penalty = Some((round, Box::pin(sleep(delay))));
                }
            }
            _ => {
                if self.penalty.take().is_some() {
                    debug!("Penalty delay cancelled");
                }
            }
        }
    }

    /// Publishes the session state if it changed.
    fn publish(&self) {
        let next = self.session.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

/// Interval whose first tick lands one full period from now.
fn ticker(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(ticker: &mut Ticker) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending::<()>().await,
    }
}

async fn next_round_tick(ticker: &mut RoundTicker) -> RoundId {
    match ticker {
        Some((round, interval)) => {
            interval.tick().await;
            *round
        }
        None => pending().await,
    }
}

async fn penalty_elapsed(penalty: &mut Penalty) -> RoundId {
    match penalty {
        Some((round, delay)) => {
            delay.as_mut().await;
            *round
        }
        None => pending().await,
    }
}
