//! Tests for the session state machine.

use std::sync::Arc;
use std::time::Duration;

use flag_quest::{
    Country, CountryCatalog, Effect, GameRules, GameSession, GameStatus, GuessOutcome,
    HighScoreStore, Ignored, MemoryHighScoreStore, Rank, StoreError, check_invariants,
};

/// Store whose every call fails.
#[derive(Debug)]
struct BrokenStore;

impl HighScoreStore for BrokenStore {
    fn load(&self) -> Result<Option<u32>, StoreError> {
        Err(StoreError::new("disk on fire"))
    }

    fn save(&self, _score: u32) -> Result<(), StoreError> {
        Err(StoreError::new("disk on fire"))
    }
}

fn session_with(store: Arc<dyn HighScoreStore>) -> GameSession {
    let catalog = CountryCatalog::builtin().expect("Built-in catalog");
    GameSession::with_seed(GameRules::default(), catalog, store, 11)
}

fn new_session() -> GameSession {
    session_with(Arc::new(MemoryHighScoreStore::new()))
}

fn playing_session() -> GameSession {
    let mut session = new_session();
    session.start_game().expect("Start from lobby");
    session
}

fn target(session: &GameSession) -> Country {
    session.current_target().expect("Round has a target").clone()
}

fn wrong_option(session: &GameSession) -> Country {
    let target = target(session);
    session
        .options()
        .iter()
        .find(|c| !c.same_as(&target))
        .expect("Round has a distractor")
        .clone()
}

fn answer_correctly(session: &mut GameSession) -> Option<Effect> {
    let guess = target(session);
    session.submit_guess(&guess).expect("Guess accepted")
}

fn answer_wrongly(session: &mut GameSession) {
    let guess = wrong_option(session);
    session.submit_guess(&guess).expect("Guess accepted");
}

/// Wrong answer followed by the end of its penalty delay.
fn miss_and_recover(session: &mut GameSession) {
    answer_wrongly(session);
    if session.status() == GameStatus::Playing {
        let round = session.round_id().expect("Round id");
        session.complete_penalty(round).expect("Penalty completes");
    }
}

#[test]
fn test_new_session_waits_in_lobby() {
    let session = new_session();
    assert_eq!(session.status(), GameStatus::Lobby);
    assert_eq!(session.score(), 0);
    assert_eq!(session.total_rounds(), 0);
    assert!(session.current_target().is_none());
    assert!(session.options().is_empty());
    assert_eq!(session.high_score(), 0);
}

#[test]
fn test_stored_high_score_loaded_at_construction() {
    let session = session_with(Arc::new(MemoryHighScoreStore::with_score(7)));
    assert_eq!(session.high_score(), 7);
}

#[test]
fn test_unreadable_high_score_defaults_to_zero() {
    let mut session = session_with(Arc::new(BrokenStore));
    assert_eq!(session.high_score(), 0);

    // Saving also fails; the game still finishes.
    session.start_game().expect("Start");
    answer_correctly(&mut session);
    session.advance_round().expect("Advance");
    for _ in 0..5 {
        miss_and_recover(&mut session);
    }
    assert_eq!(session.status(), GameStatus::GameOver);
    assert!(session.is_new_record());
    assert_eq!(session.high_score(), 1);
}

#[test]
fn test_start_game_initializes_play() {
    let session = playing_session();
    assert_eq!(session.status(), GameStatus::Playing);
    assert_eq!(session.score(), 0);
    assert_eq!(session.total_rounds(), 1);
    assert_eq!(session.lives(), 5);
    assert_eq!(session.session_time_remaining(), 120);
    assert_eq!(session.question_time_remaining(), 5);
    assert_eq!(session.outcome(), GuessOutcome::Undecided);
    assert_eq!(session.options().len(), 4);
    assert!(!session.is_paused());
    assert!(check_invariants(&session).is_ok());
}

#[test]
fn test_start_while_playing_is_ignored() {
    let mut session = playing_session();
    let round = session.round_id();
    assert_eq!(session.start_game(), Err(Ignored::AlreadyPlaying));
    assert_eq!(session.round_id(), round);
}

#[test]
fn test_correct_guess_scores_and_requests_fact() {
    let mut session = playing_session();
    let round = session.round_id().expect("Round id");
    let expected = target(&session);

    let effect = answer_correctly(&mut session);

    assert_eq!(
        effect,
        Some(Effect::FetchFact {
            round,
            country: expected
        })
    );
    assert_eq!(session.score(), 1);
    assert_eq!(session.outcome(), GuessOutcome::Correct);
    assert!(session.is_fact_loading());
    assert_eq!(session.lives(), 5);
}

#[test]
fn test_round_cannot_be_resolved_twice() {
    let mut session = playing_session();
    answer_correctly(&mut session);

    let again = target(&session);
    assert_eq!(session.submit_guess(&again), Err(Ignored::RoundResolved));
    assert_eq!(session.tick_question(), Err(Ignored::RoundResolved));
    assert_eq!(session.score(), 1);
    assert_eq!(session.lives(), 5);
}

#[test]
fn test_advance_after_correct_presents_new_round() {
    let mut session = playing_session();
    let first = session.round_id();
    answer_correctly(&mut session);
    session
        .apply_fact(first.expect("Round id"), "Fun fact".to_string())
        .expect("Fact applies");

    session.advance_round().expect("Advance");

    assert_ne!(session.round_id(), first);
    assert_eq!(session.total_rounds(), 2);
    assert_eq!(session.outcome(), GuessOutcome::Undecided);
    assert_eq!(session.question_time_remaining(), 5);
    assert!(session.fact_text().is_none());
    assert!(!session.is_fact_loading());
}

#[test]
fn test_advance_requires_correct_answer() {
    let mut session = playing_session();
    assert_eq!(session.advance_round(), Err(Ignored::RoundNotCorrect));

    answer_wrongly(&mut session);
    assert_eq!(session.advance_round(), Err(Ignored::RoundNotCorrect));
}

#[test]
fn test_wrong_guess_costs_a_life_then_penalty_advances() {
    let mut session = playing_session();
    let round = session.round_id().expect("Round id");

    answer_wrongly(&mut session);
    assert_eq!(session.lives(), 4);
    assert_eq!(session.outcome(), GuessOutcome::Incorrect);
    assert_eq!(session.score(), 0);

    let retry = target(&session);
    assert_eq!(session.submit_guess(&retry), Err(Ignored::RoundResolved));

    session.complete_penalty(round).expect("Penalty completes");
    assert_eq!(session.total_rounds(), 2);
    assert_ne!(session.round_id(), Some(round));
    assert_eq!(session.outcome(), GuessOutcome::Undecided);
}

#[test]
fn test_penalty_for_stale_round_is_ignored() {
    let mut session = playing_session();
    let round = session.round_id().expect("Round id");
    answer_wrongly(&mut session);
    session.complete_penalty(round).expect("Penalty completes");
    answer_wrongly(&mut session);

    assert_eq!(session.complete_penalty(round), Err(Ignored::StaleRound(round)));
    assert_eq!(session.total_rounds(), 2);
}

#[test]
fn test_penalty_without_wrong_answer_is_ignored() {
    let mut session = playing_session();
    let round = session.round_id().expect("Round id");
    assert_eq!(session.complete_penalty(round), Err(Ignored::NoPenalty));
}

#[test]
fn test_question_timeout_counts_as_miss() {
    let mut session = playing_session();
    for expected in (1..5).rev() {
        session.tick_question().expect("Tick");
        assert_eq!(session.question_time_remaining(), expected);
        assert_eq!(session.outcome(), GuessOutcome::Undecided);
    }

    session.tick_question().expect("Final tick");
    assert_eq!(session.question_time_remaining(), 0);
    assert_eq!(session.outcome(), GuessOutcome::Incorrect);
    assert_eq!(session.lives(), 4);

    let late = target(&session);
    assert_eq!(session.submit_guess(&late), Err(Ignored::RoundResolved));
    assert_eq!(session.tick_question(), Err(Ignored::RoundResolved));
}

#[test]
fn test_losing_all_lives_ends_game() {
    let mut session = playing_session();
    for _ in 0..4 {
        miss_and_recover(&mut session);
        assert_eq!(session.status(), GameStatus::Playing);
    }
    assert_eq!(session.lives(), 1);

    answer_wrongly(&mut session);

    assert_eq!(session.status(), GameStatus::GameOver);
    assert_eq!(session.lives(), 0);
    assert_eq!(session.outcome(), GuessOutcome::Undecided);
    assert!(!session.is_new_record());
    let summary = session.summary().expect("Summary at game over");
    assert_eq!(*summary.score(), 0);
    assert_eq!(*summary.total_rounds(), 5);
    assert_eq!(summary.rank(), Rank::KeepExploring);
}

#[test]
fn test_session_clock_ends_game() {
    let rules = GameRules::new(3, 5, 5, Duration::from_millis(800), Duration::from_secs(1));
    let catalog = CountryCatalog::builtin().expect("Built-in catalog");
    let mut session =
        GameSession::with_seed(rules, catalog, Arc::new(MemoryHighScoreStore::new()), 5);
    session.start_game().expect("Start");
    answer_correctly(&mut session);

    session.tick_session().expect("Tick");
    session.tick_session().expect("Tick");
    assert_eq!(session.status(), GameStatus::Playing);
    session.tick_session().expect("Tick");

    assert_eq!(session.session_time_remaining(), 0);
    assert_eq!(session.status(), GameStatus::GameOver);
    assert_eq!(session.outcome(), GuessOutcome::Undecided);
    assert_eq!(session.tick_session(), Err(Ignored::NotPlaying));
}

#[test]
fn test_new_record_is_persisted() {
    let store = Arc::new(MemoryHighScoreStore::with_score(3));
    let mut session = session_with(store.clone());
    session.start_game().expect("Start");

    for _ in 0..7 {
        answer_correctly(&mut session);
        session.advance_round().expect("Advance");
    }
    for _ in 0..5 {
        miss_and_recover(&mut session);
    }

    assert_eq!(session.status(), GameStatus::GameOver);
    assert!(session.is_new_record());
    assert_eq!(session.high_score(), 7);
    assert_eq!(store.load().expect("Load"), Some(7));
    assert_eq!(
        session.summary().map(|s| s.rank()),
        Some(Rank::NewRecord)
    );
}

#[test]
fn test_lower_score_leaves_record_untouched() {
    let store = Arc::new(MemoryHighScoreStore::with_score(10));
    let mut session = session_with(store.clone());
    session.start_game().expect("Start");
    answer_correctly(&mut session);
    session.advance_round().expect("Advance");
    for _ in 0..5 {
        miss_and_recover(&mut session);
    }

    assert!(!session.is_new_record());
    assert_eq!(session.high_score(), 10);
    assert_eq!(store.load().expect("Load"), Some(10));
}

#[test]
fn test_record_compared_against_store_at_game_over() {
    let store = Arc::new(MemoryHighScoreStore::new());
    let mut session = session_with(store.clone());
    session.start_game().expect("Start");
    answer_correctly(&mut session);
    session.advance_round().expect("Advance");

    // Another writer raised the record mid-game.
    store.save(4).expect("Save");

    for _ in 0..5 {
        miss_and_recover(&mut session);
    }
    assert!(!session.is_new_record());
    assert_eq!(session.high_score(), 4);
    assert_eq!(store.load().expect("Load"), Some(4));
}

#[test]
fn test_restart_after_game_over_resets_play() {
    let mut session = playing_session();
    answer_correctly(&mut session);
    session.advance_round().expect("Advance");
    for _ in 0..5 {
        miss_and_recover(&mut session);
    }
    assert_eq!(session.status(), GameStatus::GameOver);
    let last_round = session.round_id().expect("Round id");

    session.start_game().expect("Restart");

    assert_eq!(session.status(), GameStatus::Playing);
    assert_eq!(session.score(), 0);
    assert_eq!(session.lives(), 5);
    assert_eq!(session.total_rounds(), 1);
    assert_eq!(session.session_time_remaining(), 120);
    assert!(!session.is_new_record());
    assert!(session.summary().is_none());
    assert!(session.round_id().expect("Round id") > last_round);
}

#[test]
fn test_pause_blocks_play_and_ticks() {
    let mut session = playing_session();
    session.toggle_pause().expect("Pause");
    assert!(session.is_paused());

    let guess = target(&session);
    assert_eq!(session.submit_guess(&guess), Err(Ignored::Paused));
    assert_eq!(session.tick_session(), Err(Ignored::Paused));
    assert_eq!(session.tick_question(), Err(Ignored::Paused));
    assert_eq!(session.request_detail(), Err(Ignored::Paused));
    assert_eq!(session.session_time_remaining(), 120);
    assert_eq!(session.question_time_remaining(), 5);

    session.toggle_pause().expect("Resume");
    assert!(!session.is_paused());
    session.tick_session().expect("Tick after resume");
    assert_eq!(session.session_time_remaining(), 119);
}

#[test]
fn test_pause_freezes_penalty() {
    let mut session = playing_session();
    let round = session.round_id().expect("Round id");
    answer_wrongly(&mut session);
    session.toggle_pause().expect("Pause");

    assert_eq!(session.complete_penalty(round), Err(Ignored::Paused));
    assert_eq!(session.outcome(), GuessOutcome::Incorrect);

    session.toggle_pause().expect("Resume");
    session.complete_penalty(round).expect("Penalty completes");
}

#[test]
fn test_pause_outside_play_is_ignored() {
    let mut session = new_session();
    assert_eq!(session.toggle_pause(), Err(Ignored::NotPlaying));
    assert!(!session.is_paused());
}

#[test]
fn test_detail_request_is_idempotent() {
    let mut session = playing_session();
    let round = session.round_id().expect("Round id");
    let expected = target(&session);

    let effect = session.request_detail().expect("Detail requested");
    assert_eq!(
        effect,
        Some(Effect::FetchDetail {
            round,
            country: expected
        })
    );
    assert!(session.is_detail_loading());
    assert_eq!(session.request_detail(), Err(Ignored::DetailLoading));

    session
        .apply_detail(round, "Capital, landmark, trivia.".to_string())
        .expect("Detail applies");
    assert!(!session.is_detail_loading());
    assert_eq!(session.detail_text(), Some("Capital, landmark, trivia."));
    assert_eq!(session.request_detail(), Err(Ignored::DetailLoaded));
}

#[test]
fn test_detail_without_target_is_ignored() {
    let mut session = new_session();
    assert_eq!(session.request_detail(), Err(Ignored::NoTarget));
}

#[test]
fn test_stale_fact_is_discarded() {
    let mut session = playing_session();
    let first = session.round_id().expect("Round id");
    answer_correctly(&mut session);
    session.advance_round().expect("Advance");

    let result = session.apply_fact(first, "Too late".to_string());

    assert_eq!(result, Err(Ignored::StaleRound(first)));
    assert!(session.fact_text().is_none());
    assert!(!session.is_fact_loading());
}

#[test]
fn test_stale_detail_is_discarded() {
    let mut session = playing_session();
    let first = session.round_id().expect("Round id");
    session.request_detail().expect("Detail requested");
    answer_wrongly(&mut session);
    session.complete_penalty(first).expect("Penalty completes");

    assert_eq!(
        session.apply_detail(first, "Too late".to_string()),
        Err(Ignored::StaleRound(first))
    );
    assert!(session.detail_text().is_none());
    assert!(!session.is_detail_loading());
}

#[test]
fn test_score_counts_accepted_correct_guesses() {
    let mut session = playing_session();
    let mut accepted = 0;

    for i in 0..20 {
        let target = target(&session);

        // Rejected while paused.
        session.toggle_pause().expect("Pause");
        assert_eq!(session.submit_guess(&target), Err(Ignored::Paused));
        session.toggle_pause().expect("Resume");

        if i % 3 == 0 {
            miss_and_recover(&mut session);
        } else {
            if let Ok(Some(Effect::FetchFact { .. })) = session.submit_guess(&target) {
                accepted += 1;
            }
            // Rejected once the round is resolved.
            assert_eq!(session.submit_guess(&target), Err(Ignored::RoundResolved));
            session.advance_round().expect("Advance");
        }

        assert_eq!(session.score(), accepted);
        assert!(session.score() <= session.total_rounds());
        assert!(check_invariants(&session).is_ok());
        if session.status() != GameStatus::Playing {
            break;
        }
    }

    assert_eq!(accepted, 8);
    assert_eq!(session.status(), GameStatus::GameOver);
}

#[test]
fn test_snapshot_mirrors_session() {
    let mut session = playing_session();
    answer_correctly(&mut session);
    let snapshot = session.snapshot();

    assert_eq!(snapshot.status, GameStatus::Playing);
    assert_eq!(snapshot.score, 1);
    assert_eq!(snapshot.total_rounds, 1);
    assert_eq!(snapshot.lives, 5);
    assert_eq!(snapshot.max_lives, 5);
    assert_eq!(snapshot.round, session.round_id());
    assert_eq!(snapshot.target.as_ref(), session.current_target());
    assert_eq!(snapshot.options, session.options());
    assert_eq!(snapshot.outcome, GuessOutcome::Correct);
    assert!(snapshot.fact_loading);
    assert!(snapshot.summary.is_none());
}
