//! FlagQuest library - a timed flag trivia game
//!
//! The player is shown a flag and picks the matching country from four
//! options, racing a session clock and a per-question clock with a limited
//! number of lives.
//!
//! # Architecture
//!
//! - **Game**: the session state machine, round generator and countdowns
//! - **Orchestrator**: a tokio task that owns the session and drives its timers
//! - **Facts**: flavor text from an LLM, discarded if its round has moved on
//! - **High score**: a storage port with in-memory and SQLite backends
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use flag_quest::{
//!     Command, CountryCatalog, GameOrchestrator, GameRules, GameSession,
//!     MemoryHighScoreStore, OfflineFactService,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let session = GameSession::new(
//!     GameRules::default(),
//!     CountryCatalog::builtin()?,
//!     Arc::new(MemoryHighScoreStore::new()),
//! );
//! let (handle, _task) = GameOrchestrator::spawn(session, Arc::new(OfflineFactService));
//! handle.send(Command::Start)?;
//! println!("{:?}", handle.snapshot().status);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod console;
mod db;
mod facts;
mod game;
mod high_score;
mod llm_client;
mod orchestrator;

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError, FactProvider};

// Crate-level exports - Console front end
pub use console::{Input, StatusRenderer, parse_input, run_console};

// Crate-level exports - Persistence
pub use db::{HighScore, HighScoreRepository, NewHighScore, StoreError};
pub use high_score::{HIGH_SCORE_KEY, HighScoreStore, MemoryHighScoreStore};

// Crate-level exports - Fact service
pub use facts::{
    EMPTY_DETAIL, EMPTY_FACT, FALLBACK_DETAIL, FALLBACK_FACT, FactService, LlmFactService,
    OfflineFactService, fact_service_from_config,
};

// Crate-level exports - LLM client
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Orchestrator
pub use orchestrator::{Command, GameHandle, GameOrchestrator, OrchestratorError};

// Crate-level exports - Game types
pub use game::{
    CanAdvance, CanCompletePenalty, CanGuess, CanRequestDetail, CanStart, CanTickQuestion,
    CanTickSession, CanTogglePause, Countdown, Country, CountryCatalog, Effect, GameRules,
    GameSession, GameStatus, GameSummary, Guard, GuessOutcome, Ignored, InvariantViolation,
    MAX_LIVES, OPTION_COUNT, PENALTY_DELAY, QUESTION_SECONDS, Rank, Round, RoundId,
    SESSION_SECONDS, SessionSnapshot, TICK_INTERVAL, Tick, TimerKind, Transition,
    check_invariants, format_clock, generate_round,
};
