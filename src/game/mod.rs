//! Flag quiz game core: reference set, rounds, timers and the session state machine.

mod country;
mod guards;
mod round;
mod rules;
mod session;
mod summary;
mod timer;

pub use country::{Country, CountryCatalog};
pub use guards::{
    CanAdvance, CanCompletePenalty, CanGuess, CanRequestDetail, CanStart, CanTickQuestion,
    CanTickSession, CanTogglePause, Guard, Ignored, InvariantViolation, check_invariants,
};
pub use round::{Round, RoundId, generate_round};
pub use rules::{
    GameRules, MAX_LIVES, OPTION_COUNT, PENALTY_DELAY, QUESTION_SECONDS, SESSION_SECONDS,
    TICK_INTERVAL,
};
pub use session::{Effect, GameSession, GameStatus, GuessOutcome, SessionSnapshot, Transition};
pub use summary::{GameSummary, Rank};
pub use timer::{Countdown, Tick, TimerKind, format_clock};
