//! Command-line interface for flag_quest.

use clap::{Parser, Subcommand};

/// FlagQuest - identify countries from their flags against the clock
#[derive(Parser, Debug)]
#[command(name = "flag_quest")]
#[command(about = "Timed flag trivia in the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a session in the console
    Play {
        /// Path to the configuration file
        #[arg(short, long, default_value = "flag_quest.toml")]
        config: std::path::PathBuf,

        /// Database file for the high score (overrides the config file;
        /// `:memory:` keeps it for this run only)
        #[arg(long)]
        db_path: Option<String>,

        /// Use built-in fact text instead of calling a model
        #[arg(long)]
        offline: bool,
    },

    /// Show the stored high score
    HighScore {
        /// Path to the configuration file
        #[arg(short, long, default_value = "flag_quest.toml")]
        config: std::path::PathBuf,

        /// Database file for the high score (overrides the config file)
        #[arg(long)]
        db_path: Option<String>,
    },
}
