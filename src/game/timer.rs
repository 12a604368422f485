//! Countdown values and the predicates that decide when each timer runs.
//!
//! Timers here are pure: a [`Countdown`] only moves when it is ticked, and
//! [`TimerKind::is_active`] says whether the owner should be ticking it.
//! Scheduling real ticks is the orchestrator's job.

use strum::Display;

use crate::game::session::{GameSession, GameStatus, GuessOutcome};

/// Result of ticking a countdown once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still counting; seconds left.
    Running(u32),
    /// Reached zero on this tick.
    Expired,
}

/// Whole-second countdown that never goes below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    initial: u32,
    remaining: u32,
}

impl Countdown {
    /// Creates a full countdown.
    pub fn new(seconds: u32) -> Self {
        Self {
            initial: seconds,
            remaining: seconds,
        }
    }

    /// Seconds left.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Refills to the initial value.
    pub fn reset(&mut self) {
        self.remaining = self.initial;
    }

    /// Removes one second.
    ///
    /// Ticking an expired countdown reports [`Tick::Expired`] again without
    /// underflowing.
    pub fn tick(&mut self) -> Tick {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }
}

/// The timers a session needs driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TimerKind {
    /// Session-wide countdown.
    Session,
    /// Per-question countdown.
    Question,
    /// One-shot delay between a wrong answer and the next round.
    Penalty,
}

impl TimerKind {
    /// Whether this timer should be running for the session's current state.
    ///
    /// A timer whose predicate turns false must be stopped outright, not
    /// merely ignored, so nothing is carried across a pause.
    pub fn is_active(self, session: &GameSession) -> bool {
        let live = session.status() == GameStatus::Playing && !session.is_paused();
        match self {
            TimerKind::Session => live && session.session_time_remaining() > 0,
            TimerKind::Question => live && session.outcome() == GuessOutcome::Undecided,
            TimerKind::Penalty => live && session.outcome() == GuessOutcome::Incorrect,
        }
    }
}

/// Formats seconds as `m:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
