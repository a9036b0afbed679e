//! The puzzle service boundary.
//!
//! `PuzzleTransport` is what the solve loop talks to. The wire records mirror
//! the service's JSON (`{"guess": "crane", "result": ["+", " ", "-", ...]}`)
//! and are decoded into `Guess` values here, so nothing past this module sees
//! raw result symbols. `LocalTransport` plays puzzles in-process against known
//! answers.

use crate::error::{BotError, Result};
use crate::solver::{Guess, GuessHistory, LetterMark, get_feedback};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub league_slug: String,
    #[serde(default)]
    pub league_name: String,
    /// Word length for every puzzle in the league
    pub letters: usize,
    pub max_guesses: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub wordle_answer_id: u64,
    pub league_slug: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRecord {
    pub guess: String,
    pub result: Vec<char>,
}

impl GuessRecord {
    #[must_use]
    pub fn from_guess(guess: &Guess) -> Self {
        Self {
            guess: guess.word().to_string(),
            result: guess.marks().iter().map(|m| m.to_wire()).collect(),
        }
    }

    pub fn to_guess(&self) -> Result<Guess> {
        let marks = self
            .result
            .iter()
            .map(|c| {
                LetterMark::from_wire(*c).ok_or_else(|| {
                    BotError::InvalidGuess(format!(
                        "unknown result symbol {c:?} for '{}'",
                        self.guess
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Guess::new(&self.guess, marks)
    }
}

/// Puzzle state as returned after fetching or submitting a guess. It always
/// carries every guess made on the puzzle so far.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResult {
    pub completed: bool,
    pub correct: bool,
    pub answer: Option<String>,
    #[serde(default)]
    pub guesses: Vec<GuessRecord>,
}

impl GuessResult {
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes the wire records into a guess history, oldest first.
    pub fn history(&self) -> Result<GuessHistory> {
        self.guesses.iter().map(GuessRecord::to_guess).collect()
    }

    /// Like `history`, but every guess must have exactly `letters` letters.
    pub fn history_of_length(&self, letters: usize) -> Result<GuessHistory> {
        let history = self.history()?;
        if let Some(bad) = history.iter().find(|g| g.len() != letters) {
            return Err(BotError::InvalidGuess(format!(
                "'{}' has {} letters, puzzle words have {letters}",
                bad.word(),
                bad.len()
            )));
        }
        Ok(history)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(GuessResult),
    /// The service refused the word; carries its human-readable reason
    Rejected(String),
}

/// Blocking calls to the puzzle service. Any `Err` other than
/// `BotError::ValidationRejected` is treated as fatal by the solve loop.
pub trait PuzzleTransport {
    fn league(&mut self, league_slug: &str) -> Result<League>;
    fn active_puzzles(&mut self, league_slug: &str) -> Result<Vec<Puzzle>>;
    fn guesses(&mut self, puzzle: &Puzzle) -> Result<GuessResult>;
    fn submit(&mut self, puzzle: &Puzzle, guess: &str) -> Result<SubmitOutcome>;
}

struct LocalPuzzle {
    puzzle: Puzzle,
    answer: String,
    result: GuessResult,
}

/// One league of puzzles with known answers, scored in-process.
pub struct LocalTransport {
    league: League,
    valid_words: HashSet<String>,
    puzzles: Vec<LocalPuzzle>,
}

impl LocalTransport {
    pub fn new<I, S>(league: League, valid_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            league,
            valid_words: valid_words.into_iter().map(Into::into).collect(),
            puzzles: Vec::new(),
        }
    }

    /// Adds a puzzle with the given hidden answer and returns its handle.
    pub fn add_puzzle(&mut self, answer: &str) -> Puzzle {
        let puzzle = Puzzle {
            wordle_answer_id: self.puzzles.len() as u64 + 1,
            league_slug: self.league.league_slug.clone(),
            completed: false,
        };
        self.puzzles.push(LocalPuzzle {
            puzzle: puzzle.clone(),
            answer: answer.to_lowercase(),
            result: GuessResult::default(),
        });
        puzzle
    }

    fn check_league(&self, league_slug: &str) -> Result<()> {
        if league_slug == self.league.league_slug {
            Ok(())
        } else {
            Err(BotError::UnknownLeague(league_slug.to_string()))
        }
    }

    fn find_mut(&mut self, puzzle: &Puzzle) -> Result<&mut LocalPuzzle> {
        self.check_league(&puzzle.league_slug)?;
        self.puzzles
            .iter_mut()
            .find(|p| p.puzzle.wordle_answer_id == puzzle.wordle_answer_id)
            .ok_or_else(|| {
                BotError::Transport(format!("no puzzle with id {}", puzzle.wordle_answer_id))
            })
    }
}

impl PuzzleTransport for LocalTransport {
    fn league(&mut self, league_slug: &str) -> Result<League> {
        self.check_league(league_slug)?;
        Ok(self.league.clone())
    }

    fn active_puzzles(&mut self, league_slug: &str) -> Result<Vec<Puzzle>> {
        self.check_league(league_slug)?;
        Ok(self.puzzles.iter().map(|p| p.puzzle.clone()).collect())
    }

    fn guesses(&mut self, puzzle: &Puzzle) -> Result<GuessResult> {
        Ok(self.find_mut(puzzle)?.result.clone())
    }

    fn submit(&mut self, puzzle: &Puzzle, guess: &str) -> Result<SubmitOutcome> {
        let letters = self.league.letters;
        let max_guesses = self.league.max_guesses;
        let guess = guess.to_lowercase();
        let known = self.valid_words.contains(&guess);
        let local = self.find_mut(puzzle)?;

        if local.result.completed {
            return Err(BotError::Transport(format!(
                "puzzle {} is already completed",
                puzzle.wordle_answer_id
            )));
        }
        if guess.chars().count() != letters {
            return Ok(SubmitOutcome::Rejected(format!(
                "'{guess}' must be {letters} letters long"
            )));
        }
        if !known {
            return Ok(SubmitOutcome::Rejected(format!("'{guess}' is not a valid word")));
        }

        let marks = get_feedback(&guess, &local.answer);
        local.result.guesses.push(GuessRecord {
            guess: guess.clone(),
            result: marks.iter().map(|m| m.to_wire()).collect(),
        });
        local.result.correct = guess == local.answer;
        local.result.completed = local.result.correct || local.result.guesses.len() >= max_guesses;
        if local.result.completed {
            local.result.answer = Some(local.answer.clone());
            local.puzzle.completed = true;
        }
        Ok(SubmitOutcome::Accepted(local.result.clone()))
    }
}
