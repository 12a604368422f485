//! Database repository for the persisted high score.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::db::{HighScore, NewHighScore, StoreError, schema};
use crate::high_score::{HIGH_SCORE_KEY, HighScoreStore};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// High score storage in a SQLite file.
///
/// Each operation opens its own connection, so the path must name a file;
/// an in-memory database would be empty on every call.
#[derive(Debug, Clone)]
pub struct HighScoreRepository {
    db_path: String,
    key: String,
}

impl HighScoreRepository {
    /// Opens the database at `db_path`, creating it and applying pending
    /// migrations as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, StoreError> {
        info!(path = %db_path, "Opening high score database");
        let repo = Self {
            db_path,
            key: HIGH_SCORE_KEY.to_string(),
        };

        let mut conn = repo.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::new(format!("Failed to run migrations: {}", e)))?;
        debug!(applied = applied.len(), "Migrations applied");

        Ok(repo)
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| StoreError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Gets the stored high score row, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn record(&self) -> Result<Option<HighScore>, StoreError> {
        debug!(key = %self.key, "Loading high score row");
        let mut conn = self.connection()?;

        let row = schema::high_scores::table
            .filter(schema::high_scores::key.eq(&self.key))
            .select(HighScore::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row)
    }
}

impl HighScoreStore for HighScoreRepository {
    #[instrument(skip(self))]
    fn load(&self) -> Result<Option<u32>, StoreError> {
        let Some(row) = self.record()? else {
            debug!("No high score stored");
            return Ok(None);
        };

        match u32::try_from(*row.score()) {
            Ok(score) => {
                debug!(score, "High score loaded");
                Ok(Some(score))
            }
            Err(_) => {
                warn!(stored = row.score(), "Stored high score is negative, ignoring it");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    fn save(&self, score: u32) -> Result<(), StoreError> {
        let score = i32::try_from(score)
            .map_err(|_| StoreError::new(format!("High score {} does not fit the column", score)))?;
        let mut conn = self.connection()?;

        let row = NewHighScore::new(self.key.clone(), score, chrono::Utc::now().naive_utc());
        diesel::replace_into(schema::high_scores::table)
            .values(&row)
            .execute(&mut conn)?;

        info!(score, "High score saved");
        Ok(())
    }
}
