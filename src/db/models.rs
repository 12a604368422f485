//! Database models.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;

use crate::db::schema;

/// Stored high score row.
#[derive(Debug, Clone, Queryable, Selectable, Getters)]
#[diesel(table_name = schema::high_scores)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HighScore {
    key: String,
    score: i32,
    updated_at: NaiveDateTime,
}

/// Insertable high score row.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::high_scores)]
pub struct NewHighScore {
    key: String,
    score: i32,
    updated_at: NaiveDateTime,
}
