//! End-of-game summary.

use derive_getters::Getters;
use strum::{Display, EnumIter};

/// Performance tier shown at game over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Rank {
    /// Beat the stored record with a non-zero score.
    NewRecord,
    /// At least 90% accuracy.
    GlobalLegend,
    /// At least 70% accuracy.
    ExceptionalExplorer,
    /// At least 50% accuracy.
    AdventurousSpirit,
    /// Anything else.
    KeepExploring,
}

impl Rank {
    /// Headline for this rank.
    pub fn title(self) -> &'static str {
        match self {
            Rank::NewRecord => "New World Record!",
            Rank::GlobalLegend => "Global Legend!",
            Rank::ExceptionalExplorer => "Exceptional Explorer!",
            Rank::AdventurousSpirit => "Adventurous Spirit!",
            Rank::KeepExploring => "Keep Exploring!",
        }
    }

    /// Encouragement line for this rank.
    pub fn message(self) -> &'static str {
        match self {
            Rank::NewRecord => {
                "History has been made! You've officially surpassed your previous best. You're a true master of geography!"
            }
            Rank::GlobalLegend => {
                "Your knowledge of world flags is truly unmatched. You're practically a world ambassador!"
            }
            Rank::ExceptionalExplorer => {
                "Magnificent performance! You have a keen eye for detail and a great memory."
            }
            Rank::AdventurousSpirit => {
                "Great job! You're well on your way to mastering the world map. Keep it up!"
            }
            Rank::KeepExploring => {
                "The world is big and full of colors. Every round makes you smarter. Ready to try again?"
            }
        }
    }
}

/// Final figures for a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct GameSummary {
    score: u32,
    total_rounds: u32,
    high_score: u32,
    is_new_record: bool,
}

impl GameSummary {
    /// Creates a summary.
    pub fn new(score: u32, total_rounds: u32, high_score: u32, is_new_record: bool) -> Self {
        Self {
            score,
            total_rounds,
            high_score,
            is_new_record,
        }
    }

    /// Percentage of presented rounds answered correctly; 0 with no rounds.
    pub fn accuracy(&self) -> f64 {
        if self.total_rounds == 0 {
            0.0
        } else {
            (self.score as f64 / self.total_rounds as f64) * 100.0
        }
    }

    /// Tier earned by this session.
    pub fn rank(&self) -> Rank {
        let accuracy = self.accuracy();
        if self.is_new_record && self.score > 0 {
            Rank::NewRecord
        } else if accuracy >= 90.0 {
            Rank::GlobalLegend
        } else if accuracy >= 70.0 {
            Rank::ExceptionalExplorer
        } else if accuracy >= 50.0 {
            Rank::AdventurousSpirit
        } else {
            Rank::KeepExploring
        }
    }
}
