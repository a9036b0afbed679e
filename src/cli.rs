use crate::constraints::DuplicatePolicy;
use crate::game_state::{AttemptReport, PuzzleOutcome, SolveConfig};
use crate::solver::Marks;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LEAGUE: &str = "bot_league_5l_5m";

/// WWM puzzle bot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a cleaned, newline-delimited lowercase word list
    #[arg(short = 'i', long = "dictionary")]
    pub dictionary_path: Option<PathBuf>,

    /// League to play in
    #[arg(short, long, default_value = DEFAULT_LEAGUE)]
    pub league: String,

    /// Hidden answers for the local puzzle service, one puzzle each
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub answers: Vec<String>,

    /// Letters per word in the local league
    #[arg(long, default_value_t = 5)]
    pub letters: usize,

    /// Guesses allowed per puzzle in the local league
    #[arg(long, default_value_t = 6)]
    pub max_guesses: usize,

    /// Pause between attempts, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// Seed for guess selection; random if omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Exclude every missed letter globally, even when the same guess marks it elsewhere
    #[arg(long)]
    pub literal_duplicates: bool,

    /// Solve every unsolved puzzle instead of only the first
    #[arg(long)]
    pub all: bool,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    #[must_use]
    pub fn solve_config(&self) -> SolveConfig {
        SolveConfig {
            delay: Duration::from_millis(self.delay_ms),
            policy: if self.literal_duplicates {
                DuplicatePolicy::Literal
            } else {
                DuplicatePolicy::Corrected
            },
        }
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// One numbered line of the attempt table, stamped with the local time the
/// guess was scored.
#[must_use]
pub fn attempt_line(number: usize, attempt: &AttemptReport) -> String {
    format!(
        "{number}. [{}] {} {} ({} candidates)",
        attempt.at.format("%H:%M:%S"),
        attempt.guess,
        Marks(&attempt.marks),
        attempt.pool_size
    )
}

pub fn display_outcome(outcome: &PuzzleOutcome) {
    println!("Puzzle {}:", outcome.puzzle_id);
    for (i, attempt) in outcome.attempts.iter().enumerate() {
        println!("{}", attempt_line(i + 1, attempt));
    }
    if !outcome.rejected.is_empty() {
        println!("Rejected: {}", outcome.rejected.join(", "));
    }
    let verdict = if outcome.correct { "solved" } else { "not solved" };
    match &outcome.answer {
        Some(answer) => println!("{verdict} in {} guesses, answer: {answer}", outcome.guess_count),
        None => println!("{verdict} in {} guesses", outcome.guess_count),
    }
}

pub fn display_summary(outcomes: &[PuzzleOutcome]) {
    let solved = outcomes.iter().filter(|o| o.correct).count();
    println!("Solved {solved} of {} puzzles.", outcomes.len());
}
