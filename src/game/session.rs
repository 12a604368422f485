//! Session state machine.
//!
//! [`GameSession`] owns every piece of mutable game state and is the only
//! thing that changes it. Each entry point checks its guard (see
//! [`crate::game::guards`]) and either applies a complete transition or
//! returns [`Ignored`] without touching anything.
//!
//! ```text
//! LOBBY ──start_game──▶ PLAYING ──lives = 0 / session time = 0──▶ GAME_OVER
//!                          ▲                                         │
//!                          └──────────────start_game─────────────────┘
//! ```
//!
//! Time does not pass on its own here: the owner calls [`GameSession::tick_session`],
//! [`GameSession::tick_question`] and [`GameSession::complete_penalty`] when the
//! corresponding timers fire.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use strum::Display;
use tracing::{debug, error, info, instrument, warn};

use crate::game::country::{Country, CountryCatalog};
use crate::game::guards::{
    CanAdvance, CanCompletePenalty, CanGuess, CanRequestDetail, CanStart, CanTickQuestion,
    CanTickSession, CanTogglePause, CurrentRound, Guard, Ignored, check_invariants,
};
use crate::game::round::{Round, RoundId, generate_round};
use crate::game::rules::GameRules;
use crate::game::summary::GameSummary;
use crate::game::timer::{Countdown, Tick};
use crate::high_score::HighScoreStore;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// Waiting for the first game.
    Lobby,
    /// A game is running.
    Playing,
    /// The last game has ended.
    GameOver,
}

/// Resolution of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GuessOutcome {
    /// No answer yet.
    Undecided,
    /// Answered correctly; waiting for the player to advance.
    Correct,
    /// Answered wrongly or timed out; waiting out the penalty delay.
    Incorrect,
}

/// Asynchronous work a transition asks its owner to start.
///
/// Both variants are tagged with the round they were requested for so the
/// result can be dropped if that round is gone by the time it arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch a one-sentence fact, then call [`GameSession::apply_fact`].
    FetchFact {
        /// Round the fact is for.
        round: RoundId,
        /// Country to describe.
        country: Country,
    },
    /// Fetch an extended description, then call [`GameSession::apply_detail`].
    FetchDetail {
        /// Round the detail is for.
        round: RoundId,
        /// Country to describe.
        country: Country,
    },
}

/// Result of a session entry point: the effect to launch, if any, or the
/// reason the call was ignored.
pub type Transition = Result<Option<Effect>, Ignored>;

/// Point-in-time copy of the session's observable state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Lifecycle status.
    pub status: GameStatus,
    /// Correct answers this game.
    pub score: u32,
    /// Rounds presented this game.
    pub total_rounds: u32,
    /// Lives left.
    pub lives: u32,
    /// Lives at game start.
    pub max_lives: u32,
    /// Seconds left in the session.
    pub session_time_remaining: u32,
    /// Seconds left for the current question.
    pub question_time_remaining: u32,
    /// Current round id.
    pub round: Option<RoundId>,
    /// Country to identify.
    pub target: Option<Country>,
    /// Options in presentation order.
    pub options: Vec<Country>,
    /// Resolution of the current round.
    pub outcome: GuessOutcome,
    /// Whether the timers are frozen.
    pub is_paused: bool,
    /// Best score on record.
    pub high_score: u32,
    /// Whether the last finished game set the record.
    pub is_new_record: bool,
    /// Short fact for the current round.
    pub fact_text: Option<String>,
    /// Extended description for the current round.
    pub detail_text: Option<String>,
    /// A fact request is in flight.
    pub fact_loading: bool,
    /// A detail request is in flight.
    pub detail_loading: bool,
    /// Final figures, present in GAME_OVER.
    pub summary: Option<GameSummary>,
}

/// The session state machine.
#[derive(Debug)]
pub struct GameSession {
    rules: GameRules,
    catalog: CountryCatalog,
    store: Arc<dyn HighScoreStore>,
    rng: StdRng,
    last_round_id: RoundId,
    round: Option<Round>,
    status: GameStatus,
    outcome: GuessOutcome,
    score: u32,
    total_rounds: u32,
    lives: u32,
    session_clock: Countdown,
    question_clock: Countdown,
    paused: bool,
    high_score: u32,
    is_new_record: bool,
    fact_text: Option<String>,
    detail_text: Option<String>,
    fact_loading: bool,
    detail_loading: bool,
    summary: Option<GameSummary>,
}

impl GameSession {
    /// Creates a session in LOBBY, reading the stored high score.
    #[instrument(skip(catalog, store))]
    pub fn new(rules: GameRules, catalog: CountryCatalog, store: Arc<dyn HighScoreStore>) -> Self {
        Self::with_rng(rules, catalog, store, StdRng::from_entropy())
    }

    /// Creates a session whose rounds are drawn from a seeded generator.
    #[instrument(skip(catalog, store))]
    pub fn with_seed(
        rules: GameRules,
        catalog: CountryCatalog,
        store: Arc<dyn HighScoreStore>,
        seed: u64,
    ) -> Self {
        Self::with_rng(rules, catalog, store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        rules: GameRules,
        catalog: CountryCatalog,
        store: Arc<dyn HighScoreStore>,
        rng: StdRng,
    ) -> Self {
        let high_score = match store.load() {
            Ok(stored) => stored.unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "Could not read high score, starting from 0");
                0
            }
        };
        info!(high_score, "Session created");

        Self {
            rules,
            catalog,
            store,
            rng,
            last_round_id: RoundId(0),
            round: None,
            status: GameStatus::Lobby,
            outcome: GuessOutcome::Undecided,
            score: 0,
            total_rounds: 0,
            lives: *rules.max_lives(),
            session_clock: Countdown::new(*rules.session_seconds()),
            question_clock: Countdown::new(*rules.question_seconds()),
            paused: false,
            high_score,
            is_new_record: false,
            fact_text: None,
            detail_text: None,
            fact_loading: false,
            detail_loading: false,
            summary: None,
        }
    }

    // ─────────────────────────────────────────────────────────
    //  Entry points
    // ─────────────────────────────────────────────────────────

    /// Starts a fresh game from LOBBY or GAME_OVER.
    ///
    /// The first round counts as round 1.
    #[instrument(skip(self), fields(status = %self.status))]
    pub fn start_game(&mut self) -> Transition {
        CanStart::check(self)?;

        self.score = 0;
        self.lives = *self.rules.max_lives();
        self.session_clock.reset();
        self.paused = false;
        self.is_new_record = false;
        self.summary = None;
        self.status = GameStatus::Playing;
        self.total_rounds = 1;
        self.begin_round();

        info!(round = ?self.round_id(), "Game started");
        self.verify();
        Ok(None)
    }

    /// Submits the player's answer for the current round.
    ///
    /// A correct answer scores and asks for a fact; the round then waits for
    /// [`GameSession::advance_round`]. A wrong answer costs a life.
    #[instrument(skip(self, guess), fields(guess = %guess.code()))]
    pub fn submit_guess(&mut self, guess: &Country) -> Transition {
        CanGuess::check(self)?;
        let Some(round) = &self.round else {
            return Err(Ignored::NoTarget);
        };

        if round.is_correct(guess) {
            let effect = Effect::FetchFact {
                round: round.id(),
                country: round.target().clone(),
            };
            self.score += 1;
            self.outcome = GuessOutcome::Correct;
            self.fact_loading = true;
            info!(score = self.score, "Correct guess");
            self.verify();
            Ok(Some(effect))
        } else {
            info!(target = %round.target(), "Wrong guess");
            self.register_miss();
            self.verify();
            Ok(None)
        }
    }

    /// Moves on after a correct answer.
    #[instrument(skip(self))]
    pub fn advance_round(&mut self) -> Transition {
        CanAdvance::check(self)?;
        self.next_round();
        self.verify();
        Ok(None)
    }

    /// Ends the wrong-answer delay for `round` and presents the next round.
    #[instrument(skip(self))]
    pub fn complete_penalty(&mut self, round: RoundId) -> Transition {
        CanCompletePenalty::check(self)?;
        CurrentRound::check(self, round)?;
        self.next_round();
        self.verify();
        Ok(None)
    }

    /// Freezes or unfreezes the game.
    #[instrument(skip(self), fields(paused = self.paused))]
    pub fn toggle_pause(&mut self) -> Transition {
        CanTogglePause::check(self)?;
        self.paused = !self.paused;
        info!(paused = self.paused, "Pause toggled");
        Ok(None)
    }

    /// Asks for an extended description of the current target.
    ///
    /// A second request while one is in flight, or once text has arrived, is
    /// ignored.
    #[instrument(skip(self))]
    pub fn request_detail(&mut self) -> Transition {
        CanRequestDetail::check(self)?;
        let Some(round) = &self.round else {
            return Err(Ignored::NoTarget);
        };

        let effect = Effect::FetchDetail {
            round: round.id(),
            country: round.target().clone(),
        };
        self.detail_loading = true;
        debug!("Detail requested");
        Ok(Some(effect))
    }

    /// Stores a fetched fact if `round` is still current.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub fn apply_fact(&mut self, round: RoundId, text: String) -> Transition {
        CurrentRound::check(self, round)?;
        self.fact_text = Some(text);
        self.fact_loading = false;
        debug!("Fact stored");
        Ok(None)
    }

    /// Stores fetched detail text if `round` is still current.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub fn apply_detail(&mut self, round: RoundId, text: String) -> Transition {
        CurrentRound::check(self, round)?;
        self.detail_text = Some(text);
        self.detail_loading = false;
        debug!("Detail stored");
        Ok(None)
    }

    /// One tick of the session clock; ends the game at zero.
    #[instrument(skip(self), fields(remaining = self.session_clock.remaining()))]
    pub fn tick_session(&mut self) -> Transition {
        CanTickSession::check(self)?;
        if let Tick::Expired = self.session_clock.tick() {
            info!("Session time is up");
            self.finish_game();
        }
        self.verify();
        Ok(None)
    }

    /// One tick of the question clock; a timeout counts as a wrong answer.
    #[instrument(skip(self), fields(remaining = self.question_clock.remaining()))]
    pub fn tick_question(&mut self) -> Transition {
        CanTickQuestion::check(self)?;
        if let Tick::Expired = self.question_clock.tick() {
            info!("Question timed out");
            self.register_miss();
        }
        self.verify();
        Ok(None)
    }

    // ─────────────────────────────────────────────────────────
    //  Internal transitions
    // ─────────────────────────────────────────────────────────

    /// Presents a new round without touching the round count.
    fn begin_round(&mut self) {
        self.last_round_id = self.last_round_id.next();
        self.round = Some(generate_round(&self.catalog, self.last_round_id, &mut self.rng));
        self.question_clock.reset();
        self.outcome = GuessOutcome::Undecided;
        self.fact_text = None;
        self.detail_text = None;
        self.fact_loading = false;
        self.detail_loading = false;
    }

    /// Counts and presents the next round.
    fn next_round(&mut self) {
        self.total_rounds += 1;
        self.begin_round();
        debug!(total_rounds = self.total_rounds, round = ?self.round_id(), "Next round");
    }

    /// Applies a wrong answer or timeout.
    fn register_miss(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            info!("Out of lives");
            self.finish_game();
        } else {
            self.outcome = GuessOutcome::Incorrect;
            debug!(lives = self.lives, "Life lost");
        }
    }

    /// Enters GAME_OVER and settles the high score.
    fn finish_game(&mut self) {
        self.status = GameStatus::GameOver;
        self.outcome = GuessOutcome::Undecided;
        self.paused = false;

        let persisted = match self.store.load() {
            Ok(stored) => stored.unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "Could not re-read high score, using session value");
                self.high_score
            }
        };

        self.is_new_record = self.score > persisted;
        if self.is_new_record {
            if let Err(e) = self.store.save(self.score) {
                error!(error = %e, score = self.score, "Failed to persist new high score");
            }
            self.high_score = self.score;
            info!(score = self.score, previous = persisted, "New high score");
        } else {
            self.high_score = self.high_score.max(persisted);
        }

        let summary = GameSummary::new(
            self.score,
            self.total_rounds,
            self.high_score,
            self.is_new_record,
        );
        info!(
            score = self.score,
            total_rounds = self.total_rounds,
            accuracy = %format!("{:.1}%", summary.accuracy()),
            rank = %summary.rank(),
            "Game over"
        );
        self.summary = Some(summary);
    }

    fn verify(&self) {
        if let Err(violation) = check_invariants(self) {
            error!(%violation, "Session invariant broken");
            debug_assert!(false, "{}", violation);
        }
    }

    // ─────────────────────────────────────────────────────────
    //  Accessors
    // ─────────────────────────────────────────────────────────

    /// Rules this session runs under.
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Lifecycle status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Resolution of the current round.
    pub fn outcome(&self) -> GuessOutcome {
        self.outcome
    }

    /// Correct answers this game.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Rounds presented this game.
    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    /// Lives left.
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Seconds left in the session.
    pub fn session_time_remaining(&self) -> u32 {
        self.session_clock.remaining()
    }

    /// Seconds left for the current question.
    pub fn question_time_remaining(&self) -> u32 {
        self.question_clock.remaining()
    }

    /// Current round id.
    pub fn round_id(&self) -> Option<RoundId> {
        self.round.as_ref().map(Round::id)
    }

    /// Country the player must identify.
    pub fn current_target(&self) -> Option<&Country> {
        self.round.as_ref().map(Round::target)
    }

    /// Options for the current round; empty before the first game.
    pub fn options(&self) -> &[Country] {
        self.round.as_ref().map(Round::options).unwrap_or(&[])
    }

    /// Whether the timers are frozen.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Best score on record.
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Whether the last finished game set the record.
    pub fn is_new_record(&self) -> bool {
        self.is_new_record
    }

    /// Fact for the current round.
    pub fn fact_text(&self) -> Option<&str> {
        self.fact_text.as_deref()
    }

    /// Extended description for the current round.
    pub fn detail_text(&self) -> Option<&str> {
        self.detail_text.as_deref()
    }

    /// A fact request is in flight.
    pub fn is_fact_loading(&self) -> bool {
        self.fact_loading
    }

    /// A detail request is in flight.
    pub fn is_detail_loading(&self) -> bool {
        self.detail_loading
    }

    /// Final figures of the last finished game.
    pub fn summary(&self) -> Option<&GameSummary> {
        self.summary.as_ref()
    }

    /// Copies the observable state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            score: self.score,
            total_rounds: self.total_rounds,
            lives: self.lives,
            max_lives: *self.rules.max_lives(),
            session_time_remaining: self.session_clock.remaining(),
            question_time_remaining: self.question_clock.remaining(),
            round: self.round_id(),
            target: self.current_target().cloned(),
            options: self.options().to_vec(),
            outcome: self.outcome,
            is_paused: self.paused,
            high_score: self.high_score,
            is_new_record: self.is_new_record,
            fact_text: self.fact_text.clone(),
            detail_text: self.detail_text.clone(),
            fact_loading: self.fact_loading,
            detail_loading: self.detail_loading,
            summary: self.summary,
        }
    }
}
