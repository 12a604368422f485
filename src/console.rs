//! Line-oriented console front end.
//!
//! Reads one command per line from stdin, forwards it to the orchestrator,
//! and prints whatever changed in the published state.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument};

use crate::game::{GameStatus, GuessOutcome, SessionSnapshot, format_clock};
use crate::orchestrator::{Command, GameHandle};

/// Seconds left at which the question clock starts being announced.
const HURRY_SECONDS: u32 = 2;

const HELP: &str = "\
Commands:
  1-4   pick an option
  n     next flag (after a correct answer)
  d     deep dive on the country (after a correct answer)
  p     pause / resume
  s     start a new game
  h     show this help
  q     quit";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Forward to the orchestrator.
    Command(Command),
    /// Print the command list.
    Help,
    /// Leave the game.
    Quit,
    /// Not understood.
    Unknown(String),
}

/// Parses a console line against the state currently on screen.
///
/// Option numbers are 1-based and resolve to the country shown in that slot.
/// The deep dive names the target, so it is only offered once the round has
/// been answered correctly.
pub fn parse_input(line: &str, snapshot: &SessionSnapshot) -> Input {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "n" | "next" => Input::Command(Command::Advance),
        "d" | "detail" if snapshot.outcome == GuessOutcome::Correct => {
            Input::Command(Command::RequestDetail)
        }
        "p" | "pause" => Input::Command(Command::TogglePause),
        "s" | "start" => Input::Command(Command::Start),
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        other => match other.parse::<usize>() {
            Ok(slot) if slot >= 1 && slot <= snapshot.options.len() => {
                Input::Command(Command::Guess(snapshot.options[slot - 1].clone()))
            }
            _ => Input::Unknown(line.to_string()),
        },
    }
}

/// Turns successive snapshots into console lines.
#[derive(Debug, Default)]
pub struct StatusRenderer {
    last: Option<SessionSnapshot>,
}

impl StatusRenderer {
    /// Creates a renderer that has printed nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines describing what changed since the previous snapshot.
    pub fn render(&mut self, snapshot: &SessionSnapshot) -> Vec<String> {
        let mut lines = Vec::new();
        let prev = self.last.as_ref();

        match snapshot.status {
            GameStatus::Lobby => {
                if prev.is_none() {
                    lines.push(format!(
                        "FlagQuest | personal best: {} | type 's' to start, 'h' for help",
                        snapshot.high_score
                    ));
                }
            }
            GameStatus::Playing => {
                if prev.map(|p| p.round) != Some(snapshot.round) {
                    lines.extend(round_lines(snapshot));
                }
                lines.extend(progress_lines(prev, snapshot));
            }
            GameStatus::GameOver => {
                if prev.map(|p| p.status) != Some(GameStatus::GameOver) {
                    lines.extend(game_over_lines(snapshot));
                }
            }
        }

        self.last = Some(snapshot.clone());
        lines
    }
}

fn lives_bar(snapshot: &SessionSnapshot) -> String {
    let lost = snapshot.max_lives.saturating_sub(snapshot.lives) as usize;
    format!("{}{}", "♥".repeat(snapshot.lives as usize), "♡".repeat(lost))
}

fn round_lines(snapshot: &SessionSnapshot) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!(
            "Flag {} | score {} | {} | time {}",
            snapshot.total_rounds,
            snapshot.score,
            lives_bar(snapshot),
            format_clock(snapshot.session_time_remaining)
        ),
    ];
    if let Some(target) = &snapshot.target {
        lines.push(format!("Identify this flag: {}", target.flag_url()));
    }
    for (i, option) in snapshot.options.iter().enumerate() {
        lines.push(format!("  {}) {}", i + 1, option.name()));
    }
    lines
}

fn progress_lines(prev: Option<&SessionSnapshot>, snapshot: &SessionSnapshot) -> Vec<String> {
    let mut lines = Vec::new();
    let target_name = snapshot
        .target
        .as_ref()
        .map(|t| t.name().as_str())
        .unwrap_or("?");
    let same_round = prev.map(|p| p.round) == Some(snapshot.round);

    if let Some(prev) = prev
        && prev.is_paused != snapshot.is_paused
    {
        lines.push(if snapshot.is_paused {
            "Paused. Press 'p' to resume.".to_string()
        } else {
            "Resumed.".to_string()
        });
    }

    if prev.map(|p| p.outcome) != Some(snapshot.outcome) || !same_round {
        match snapshot.outcome {
            GuessOutcome::Correct => {
                lines.push(format!("Correct! That's {}. Score {}.", target_name, snapshot.score));
                lines.push("  'n' for the next flag, 'd' for a deep dive.".to_string());
            }
            GuessOutcome::Incorrect => {
                lines.push(format!(
                    "Wrong! It was {}. {} left.",
                    target_name,
                    lives_bar(snapshot)
                ));
            }
            GuessOutcome::Undecided => {}
        }
    }

    if let Some(fact) = &snapshot.fact_text
        && prev.and_then(|p| p.fact_text.as_ref()) != Some(fact)
    {
        lines.push(format!("Fact: \"{}\"", fact));
    }

    if snapshot.detail_loading && !prev.is_some_and(|p| p.detail_loading) {
        lines.push("Fetching archives...".to_string());
    }

    if let Some(detail) = &snapshot.detail_text
        && prev.and_then(|p| p.detail_text.as_ref()) != Some(detail)
    {
        lines.push(format!("Deep dive: {}", detail));
    }

    if snapshot.outcome == GuessOutcome::Undecided
        && !snapshot.is_paused
        && snapshot.question_time_remaining <= HURRY_SECONDS
        && same_round
        && prev.map(|p| p.question_time_remaining) != Some(snapshot.question_time_remaining)
    {
        lines.push(format!("  {}s left!", snapshot.question_time_remaining));
    }

    lines
}

fn game_over_lines(snapshot: &SessionSnapshot) -> Vec<String> {
    let mut lines = vec![String::new(), "GAME OVER".to_string()];
    if let Some(summary) = &snapshot.summary {
        let rank = summary.rank();
        lines.push(rank.title().to_string());
        lines.push(rank.message().to_string());
        lines.push(format!(
            "Score {} of {} flags ({:.0}% accuracy) | personal best {}",
            summary.score(),
            summary.total_rounds(),
            summary.accuracy(),
            summary.high_score()
        ));
        if *summary.is_new_record() {
            lines.push("New record set!".to_string());
        }
    }
    lines.push("Type 's' to explore again or 'q' to quit.".to_string());
    lines
}

/// Runs the console until the player quits or input ends.
#[instrument(skip_all)]
pub async fn run_console(handle: GameHandle) -> Result<()> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut snapshots = handle.subscribe();
    let mut renderer = StatusRenderer::new();

    print_lines(&renderer.render(&snapshots.borrow_and_update().clone()));

    loop {
        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                let snapshot = handle.snapshot();
                match parse_input(&line, &snapshot) {
                    Input::Command(command) => handle.send(command)?,
                    Input::Help => println!("{}", HELP),
                    Input::Quit => break,
                    Input::Unknown(text) if text.is_empty() => {}
                    Input::Unknown(text) => println!("Unknown command '{}'. Type 'h' for help.", text),
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    debug!("Orchestrator closed the state channel");
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                print_lines(&renderer.render(&snapshot));
            }
        }
    }

    info!("Leaving console");
    if let Err(e) = handle.send(Command::Shutdown) {
        debug!(error = %e, "Orchestrator already stopped");
    }
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
