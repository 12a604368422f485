//! Tests for countdowns and timer activation.

use std::sync::Arc;

use flag_quest::{
    Countdown, CountryCatalog, GameRules, GameSession, MemoryHighScoreStore, Tick, TimerKind,
    format_clock,
};

fn playing_session() -> GameSession {
    let catalog = CountryCatalog::builtin().expect("Built-in catalog");
    let mut session = GameSession::with_seed(
        GameRules::default(),
        catalog,
        Arc::new(MemoryHighScoreStore::new()),
        3,
    );
    session.start_game().expect("Start");
    session
}

#[test]
fn test_countdown_ticks_down_to_zero() {
    let mut countdown = Countdown::new(3);
    assert_eq!(countdown.tick(), Tick::Running(2));
    assert_eq!(countdown.tick(), Tick::Running(1));
    assert_eq!(countdown.tick(), Tick::Expired);
    assert_eq!(countdown.remaining(), 0);
}

#[test]
fn test_countdown_never_goes_negative() {
    let mut countdown = Countdown::new(1);
    assert_eq!(countdown.tick(), Tick::Expired);
    assert_eq!(countdown.tick(), Tick::Expired);
    assert_eq!(countdown.remaining(), 0);
}

#[test]
fn test_countdown_reset_restores_initial() {
    let mut countdown = Countdown::new(5);
    countdown.tick();
    countdown.tick();
    countdown.reset();
    assert_eq!(countdown.remaining(), 5);
    assert_eq!(countdown.tick(), Tick::Running(4));
}

#[test]
fn test_format_clock() {
    assert_eq!(format_clock(120), "2:00");
    assert_eq!(format_clock(65), "1:05");
    assert_eq!(format_clock(9), "0:09");
    assert_eq!(format_clock(0), "0:00");
}

#[test]
fn test_no_timer_runs_in_lobby() {
    let catalog = CountryCatalog::builtin().expect("Built-in catalog");
    let session = GameSession::new(
        GameRules::default(),
        catalog,
        Arc::new(MemoryHighScoreStore::new()),
    );
    assert!(!TimerKind::Session.is_active(&session));
    assert!(!TimerKind::Question.is_active(&session));
    assert!(!TimerKind::Penalty.is_active(&session));
}

#[test]
fn test_undecided_round_runs_session_and_question_timers() {
    let session = playing_session();
    assert!(TimerKind::Session.is_active(&session));
    assert!(TimerKind::Question.is_active(&session));
    assert!(!TimerKind::Penalty.is_active(&session));
}

#[test]
fn test_correct_round_stops_question_timer() {
    let mut session = playing_session();
    let guess = session.current_target().cloned().expect("Target");
    session.submit_guess(&guess).expect("Guess");

    assert!(TimerKind::Session.is_active(&session));
    assert!(!TimerKind::Question.is_active(&session));
    assert!(!TimerKind::Penalty.is_active(&session));
}

#[test]
fn test_incorrect_round_runs_penalty() {
    let mut session = playing_session();
    let target = session.current_target().cloned().expect("Target");
    let wrong = session
        .options()
        .iter()
        .find(|c| !c.same_as(&target))
        .cloned()
        .expect("Distractor");
    session.submit_guess(&wrong).expect("Guess");

    assert!(TimerKind::Session.is_active(&session));
    assert!(!TimerKind::Question.is_active(&session));
    assert!(TimerKind::Penalty.is_active(&session));
}

#[test]
fn test_pause_stops_every_timer() {
    let mut session = playing_session();
    session.toggle_pause().expect("Pause");
    assert!(!TimerKind::Session.is_active(&session));
    assert!(!TimerKind::Question.is_active(&session));
    assert!(!TimerKind::Penalty.is_active(&session));
}
