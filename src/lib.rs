// Library interface for wwm-bot
// This allows integration tests to access internal modules

pub mod cli;
pub mod constraints;
pub mod error;
pub mod game_state;
pub mod logging;
pub mod solver;
pub mod transport;
pub mod wordbank;

// Re-export commonly used items for easier testing
pub use constraints::{ConstraintSet, DuplicatePolicy, extract};
pub use error::{BotError, Result};
pub use game_state::{
    AttemptReport, Pause, PuzzleOutcome, PuzzleSolver, SolveConfig, SolveState, ThreadSleep,
    solve_league,
};
pub use solver::{Guess, GuessHistory, LetterMark, filter_candidates, get_feedback, select_guess};
pub use transport::{
    GuessRecord, GuessResult, League, LocalTransport, Puzzle, PuzzleTransport, SubmitOutcome,
};
pub use wordbank::{Dictionary, load_wordbank_from_file, load_wordbank_from_str};
