//! SQLite persistence for the high score.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::StoreError;
pub use models::{HighScore, NewHighScore};
pub use repository::HighScoreRepository;
