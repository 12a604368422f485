//! Fixed game rules.

use std::time::Duration;

use derive_getters::Getters;
use derive_new::new;

/// Length of a session in seconds.
pub const SESSION_SECONDS: u32 = 120;

/// Time allowed per question in seconds.
pub const QUESTION_SECONDS: u32 = 5;

/// Lives at the start of a session.
pub const MAX_LIVES: u32 = 5;

/// Options presented per round, target included.
pub const OPTION_COUNT: usize = 4;

/// Input lock after a wrong answer before the next round appears.
pub const PENALTY_DELAY: Duration = Duration::from_millis(800);

/// Period of both countdowns.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Rule set a session runs under.
///
/// The binary always plays with [`GameRules::default`]; other values exist
/// so tests can exercise short sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, new)]
pub struct GameRules {
    session_seconds: u32,
    question_seconds: u32,
    max_lives: u32,
    penalty_delay: Duration,
    tick_interval: Duration,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            session_seconds: SESSION_SECONDS,
            question_seconds: QUESTION_SECONDS,
            max_lives: MAX_LIVES,
            penalty_delay: PENALTY_DELAY,
            tick_interval: TICK_INTERVAL,
        }
    }
}
