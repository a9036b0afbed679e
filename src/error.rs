//! Error types for the bot.
//!
//! Dictionary and transport failures are fatal for the run. A rejected guess is
//! normally handled inside the solve loop as an outcome, and an exhausted
//! candidate pool ends the puzzle it happened in.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    /// Dictionary source could not be read
    #[error("dictionary I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The puzzle service refused a guess (e.g. not a recognised word)
    #[error("guess '{guess}' rejected: {reason}")]
    ValidationRejected { guess: String, reason: String },

    /// Any other failure talking to the puzzle service
    #[error("transport error: {0}")]
    Transport(String),

    /// Every dictionary word has been ruled out
    #[error("no candidate words remain")]
    EmptyCandidateSet,

    /// A guess record whose letters and marks do not line up, or carry an unknown symbol
    #[error("invalid guess record: {0}")]
    InvalidGuess(String),

    #[error("unknown league '{0}'")]
    UnknownLeague(String),

    #[error("malformed guess result: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BotError>;
