//! High score persistence port.
//!
//! The session reads and writes a single integer through [`HighScoreStore`]
//! instead of reaching for global storage, so any backend (or none) can be
//! injected.

use std::sync::Mutex;

use tracing::{debug, instrument};

use crate::db::StoreError;

/// Storage key the high score lives under.
pub const HIGH_SCORE_KEY: &str = "flagquest_highscore";

/// Read-one/write-one access to the persisted high score.
pub trait HighScoreStore: std::fmt::Debug + Send + Sync {
    /// Reads the stored score; `None` if nothing has been stored.
    fn load(&self) -> Result<Option<u32>, StoreError>;

    /// Replaces the stored score.
    fn save(&self, score: u32) -> Result<(), StoreError>;
}

/// Process-local high score storage.
#[derive(Debug, Default)]
pub struct MemoryHighScoreStore {
    value: Mutex<Option<u32>>,
}

impl MemoryHighScoreStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `score`.
    pub fn with_score(score: u32) -> Self {
        Self {
            value: Mutex::new(Some(score)),
        }
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    #[instrument(skip(self))]
    fn load(&self) -> Result<Option<u32>, StoreError> {
        let value = self
            .value
            .lock()
            .map_err(|e| StoreError::new(format!("High score lock poisoned: {}", e)))?;
        debug!(stored = ?*value, "High score loaded from memory");
        Ok(*value)
    }

    #[instrument(skip(self))]
    fn save(&self, score: u32) -> Result<(), StoreError> {
        let mut value = self
            .value
            .lock()
            .map_err(|e| StoreError::new(format!("High score lock poisoned: {}", e)))?;
        *value = Some(score);
        debug!("High score saved to memory");
        Ok(())
    }
}
