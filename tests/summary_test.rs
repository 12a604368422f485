//! Tests for the end-of-game summary.

use flag_quest::{GameSummary, Rank};
use strum::IntoEnumIterator;

#[test]
fn test_accuracy_with_no_rounds_is_zero() {
    let summary = GameSummary::new(0, 0, 0, false);
    assert_eq!(summary.accuracy(), 0.0);
    assert_eq!(summary.rank(), Rank::KeepExploring);
}

#[test]
fn test_accuracy_percentage() {
    let summary = GameSummary::new(3, 4, 10, false);
    assert!((summary.accuracy() - 75.0).abs() < f64::EPSILON);
}

#[test]
fn test_rank_thresholds() {
    assert_eq!(GameSummary::new(9, 10, 20, false).rank(), Rank::GlobalLegend);
    assert_eq!(GameSummary::new(7, 10, 20, false).rank(), Rank::ExceptionalExplorer);
    assert_eq!(GameSummary::new(5, 10, 20, false).rank(), Rank::AdventurousSpirit);
    assert_eq!(GameSummary::new(4, 10, 20, false).rank(), Rank::KeepExploring);
}

#[test]
fn test_new_record_outranks_accuracy() {
    assert_eq!(GameSummary::new(2, 10, 2, true).rank(), Rank::NewRecord);
}

#[test]
fn test_zero_score_is_never_a_record_rank() {
    assert_eq!(GameSummary::new(0, 3, 0, true).rank(), Rank::KeepExploring);
}

#[test]
fn test_every_rank_has_text() {
    for rank in Rank::iter() {
        assert!(!rank.title().is_empty(), "{} has no title", rank);
        assert!(!rank.message().is_empty(), "{} has no message", rank);
    }
}
