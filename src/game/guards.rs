//! Guard conditions for session entry points.
//!
//! Every state-machine operation checks a composite guard before touching
//! state. A failed guard turns the call into a no-op and reports why.
//!
//! | Operation          | Guard                                                     |
//! |--------------------|-----------------------------------------------------------|
//! | `start_game`       | not playing                                               |
//! | `submit_guess`     | playing, round undecided, not paused                      |
//! | `advance_round`    | playing, round correct, not paused                        |
//! | `complete_penalty` | playing, round incorrect, not paused, round is current    |
//! | `toggle_pause`     | playing                                                   |
//! | `request_detail`   | target set, not paused, detail neither loading nor loaded |
//! | `apply_fact`       | round is current                                          |
//! | `apply_detail`     | round is current                                          |
//! | `tick_session`     | playing, not paused, session time left                    |
//! | `tick_question`    | playing, round undecided, not paused                      |
//!
//! Guards on `lastGuessOutcome` are what keep a guess and a timeout from
//! both resolving the same round: whichever runs first moves the outcome
//! off undecided and the other is rejected.

use tracing::{debug, instrument, warn};

use crate::game::round::RoundId;
use crate::game::rules::OPTION_COUNT;
use crate::game::session::{GameSession, GameStatus, GuessOutcome};

/// Why a session call was ignored.
///
/// This is not an error: ignored calls are expected whenever input races
/// the game clock, and callers drop them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Ignored {
    /// The game is not being played.
    #[display("game is not in progress")]
    NotPlaying,

    /// A game is already being played.
    #[display("game is already in progress")]
    AlreadyPlaying,

    /// The game is paused.
    #[display("game is paused")]
    Paused,

    /// The round already has an outcome.
    #[display("round already resolved")]
    RoundResolved,

    /// The round was not answered correctly.
    #[display("round has not been answered correctly")]
    RoundNotCorrect,

    /// The round is not waiting out a wrong-answer delay.
    #[display("round is not in its penalty delay")]
    NoPenalty,

    /// No country is on screen.
    #[display("no current target")]
    NoTarget,

    /// A detail request is in flight.
    #[display("detail is already loading")]
    DetailLoading,

    /// Detail text is already present.
    #[display("detail is already loaded")]
    DetailLoaded,

    /// The event belongs to a round that is no longer current.
    #[display("round {} is no longer current", _0)]
    StaleRound(RoundId),

    /// The session clock has already run out.
    #[display("session time is exhausted")]
    TimeExhausted,
}

/// A single precondition over session state.
pub trait Guard {
    /// Checks the precondition.
    fn check(session: &GameSession) -> Result<(), Ignored>;
}

/// Precondition: status is PLAYING.
pub struct IsPlaying;

impl Guard for IsPlaying {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        if session.status() == GameStatus::Playing {
            Ok(())
        } else {
            Err(Ignored::NotPlaying)
        }
    }
}

/// Precondition: status is not PLAYING.
pub struct NotPlaying;

impl Guard for NotPlaying {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        if session.status() == GameStatus::Playing {
            Err(Ignored::AlreadyPlaying)
        } else {
            Ok(())
        }
    }
}

/// Precondition: the session is not paused.
pub struct NotPaused;

impl Guard for NotPaused {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        if session.is_paused() {
            Err(Ignored::Paused)
        } else {
            Ok(())
        }
    }
}

/// Precondition: the current round has no outcome yet.
pub struct RoundUndecided;

impl Guard for RoundUndecided {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        match session.outcome() {
            GuessOutcome::Undecided => Ok(()),
            _ => Err(Ignored::RoundResolved),
        }
    }
}

/// Precondition: the current round was answered correctly.
pub struct RoundCorrect;

impl Guard for RoundCorrect {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        match session.outcome() {
            GuessOutcome::Correct => Ok(()),
            _ => Err(Ignored::RoundNotCorrect),
        }
    }
}

/// Precondition: the current round was missed and is waiting out its delay.
pub struct RoundIncorrect;

impl Guard for RoundIncorrect {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        match session.outcome() {
            GuessOutcome::Incorrect => Ok(()),
            _ => Err(Ignored::NoPenalty),
        }
    }
}

/// Precondition: a target country is set.
pub struct HasTarget;

impl Guard for HasTarget {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        if session.current_target().is_some() {
            Ok(())
        } else {
            Err(Ignored::NoTarget)
        }
    }
}

/// Precondition: no detail is loading or loaded for this round.
pub struct DetailIdle;

impl Guard for DetailIdle {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        if session.is_detail_loading() {
            Err(Ignored::DetailLoading)
        } else if session.detail_text().is_some() {
            Err(Ignored::DetailLoaded)
        } else {
            Ok(())
        }
    }
}

/// Precondition: session time remains.
pub struct TimeLeft;

impl Guard for TimeLeft {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        if session.session_time_remaining() > 0 {
            Ok(())
        } else {
            Err(Ignored::TimeExhausted)
        }
    }
}

/// Precondition: `round` is the round currently on screen.
pub struct CurrentRound;

impl CurrentRound {
    /// Checks that `round` matches the session's current round.
    #[instrument(skip(session))]
    pub fn check(session: &GameSession, round: RoundId) -> Result<(), Ignored> {
        if session.round_id() == Some(round) {
            Ok(())
        } else {
            debug!(current = ?session.round_id(), "Event for a stale round");
            Err(Ignored::StaleRound(round))
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Composite guards, one per entry point
// ─────────────────────────────────────────────────────────────

/// Guard for `start_game`.
pub struct CanStart;

impl Guard for CanStart {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        NotPlaying::check(session)
    }
}

/// Guard for `submit_guess`.
pub struct CanGuess;

impl Guard for CanGuess {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        IsPlaying::check(session)?;
        NotPaused::check(session)?;
        RoundUndecided::check(session)
    }
}

/// Guard for `advance_round`.
pub struct CanAdvance;

impl Guard for CanAdvance {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        IsPlaying::check(session)?;
        NotPaused::check(session)?;
        RoundCorrect::check(session)
    }
}

/// Guard for `toggle_pause`.
pub struct CanTogglePause;

impl Guard for CanTogglePause {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        IsPlaying::check(session)
    }
}

/// Guard for `request_detail`.
pub struct CanRequestDetail;

impl Guard for CanRequestDetail {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        HasTarget::check(session)?;
        NotPaused::check(session)?;
        DetailIdle::check(session)
    }
}

/// Guard for `complete_penalty`, minus the round check.
pub struct CanCompletePenalty;

impl Guard for CanCompletePenalty {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        IsPlaying::check(session)?;
        NotPaused::check(session)?;
        RoundIncorrect::check(session)
    }
}

/// Guard for `tick_session`.
pub struct CanTickSession;

impl Guard for CanTickSession {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        IsPlaying::check(session)?;
        NotPaused::check(session)?;
        TimeLeft::check(session)
    }
}

/// Guard for `tick_question`.
pub struct CanTickQuestion;

impl Guard for CanTickQuestion {
    fn check(session: &GameSession) -> Result<(), Ignored> {
        IsPlaying::check(session)?;
        NotPaused::check(session)?;
        RoundUndecided::check(session)
    }
}

// ─────────────────────────────────────────────────────────────
//  Invariants
// ─────────────────────────────────────────────────────────────

/// A violated session invariant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Invariant violation: {}", _0)]
pub struct InvariantViolation(pub String);

/// Checks the session invariants that must hold between operations.
///
/// - options hold the target exactly once, with no duplicate codes
/// - lives never exceed the rule maximum
/// - the round outcome is undecided unless the game is being played
#[instrument(skip(session))]
pub fn check_invariants(session: &GameSession) -> Result<(), InvariantViolation> {
    if let Some(target) = session.current_target() {
        let options = session.options();
        if options.len() != OPTION_COUNT {
            return Err(InvariantViolation(format!(
                "expected {} options, found {}",
                OPTION_COUNT,
                options.len()
            )));
        }

        let hits = options.iter().filter(|c| c.same_as(target)).count();
        if hits != 1 {
            return Err(InvariantViolation(format!(
                "target {} appears {} times in options",
                target, hits
            )));
        }

        for (i, a) in options.iter().enumerate() {
            if options[i + 1..].iter().any(|b| a.same_as(b)) {
                return Err(InvariantViolation(format!("duplicate option {}", a)));
            }
        }
    }

    if session.lives() > *session.rules().max_lives() {
        return Err(InvariantViolation(format!(
            "lives {} exceed maximum {}",
            session.lives(),
            session.rules().max_lives()
        )));
    }

    if session.status() != GameStatus::Playing && session.outcome() != GuessOutcome::Undecided {
        warn!(status = ?session.status(), outcome = ?session.outcome(), "Outcome outside play");
        return Err(InvariantViolation(format!(
            "outcome {:?} while {:?}",
            session.outcome(),
            session.status()
        )));
    }

    Ok(())
}
