use crate::constraints::ConstraintSet;
use crate::error::{BotError, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;

/// Per-position feedback for one submitted letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LetterMark {
    Miss,
    Present,
    Correct,
}

impl LetterMark {
    /// Decodes the puzzle service's symbols: `' '` miss, `'-'` present, `'+'` correct.
    #[must_use]
    pub fn from_wire(c: char) -> Option<Self> {
        match c {
            ' ' => Some(LetterMark::Miss),
            '-' => Some(LetterMark::Present),
            '+' => Some(LetterMark::Correct),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_wire(self) -> char {
        match self {
            LetterMark::Miss => ' ',
            LetterMark::Present => '-',
            LetterMark::Correct => '+',
        }
    }

    /// Colour shorthand used in logs and tests: G=correct, Y=present, X=miss.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'G' => Some(LetterMark::Correct),
            'Y' => Some(LetterMark::Present),
            'X' => Some(LetterMark::Miss),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_char(self) -> char {
        match self {
            LetterMark::Correct => 'G',
            LetterMark::Present => 'Y',
            LetterMark::Miss => 'X',
        }
    }

    /// Parses a whole colour string such as `"GYXXG"`.
    #[must_use]
    pub fn parse_marks(s: &str) -> Option<Vec<LetterMark>> {
        s.chars().map(LetterMark::from_char).collect()
    }
}

/// Renders marks as a colour string, e.g. `GYXXG`.
pub struct Marks<'a>(pub &'a [LetterMark]);

impl fmt::Display for Marks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mark in self.0 {
            write!(f, "{}", mark.to_char())?;
        }
        Ok(())
    }
}

/// One submitted word together with its feedback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Guess {
    word: String,
    marks: Vec<LetterMark>,
}

impl Guess {
    pub fn new(word: &str, marks: Vec<LetterMark>) -> Result<Self> {
        let word = word.to_lowercase();
        let letters = word.chars().count();
        if letters != marks.len() {
            return Err(BotError::InvalidGuess(format!(
                "'{word}' has {letters} letters but {} marks",
                marks.len()
            )));
        }
        Ok(Self { word, marks })
    }

    /// Builds a guess from a colour string, e.g. `Guess::parse("crane", "GGXXG")`.
    pub fn parse(word: &str, marks: &str) -> Result<Self> {
        let parsed = LetterMark::parse_marks(marks)
            .ok_or_else(|| BotError::InvalidGuess(format!("bad marks '{marks}'")))?;
        Self::new(word, parsed)
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn marks(&self) -> &[LetterMark] {
        &self.marks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Position, letter and mark for each slot of the guess.
    pub fn slots(&self) -> impl Iterator<Item = (usize, char, LetterMark)> + '_ {
        self.word
            .chars()
            .zip(self.marks.iter().copied())
            .enumerate()
            .map(|(i, (c, m))| (i, c, m))
    }
}

/// Chronological, append-only guesses for one puzzle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuessHistory {
    guesses: Vec<Guess>,
}

impl GuessHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.guesses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guesses.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Guess> {
        self.guesses.iter()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Guess> {
        self.guesses.last()
    }
}

impl FromIterator<Guess> for GuessHistory {
    fn from_iter<I: IntoIterator<Item = Guess>>(iter: I) -> Self {
        Self {
            guesses: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a GuessHistory {
    type Item = &'a Guess;
    type IntoIter = std::slice::Iter<'a, Guess>;

    fn into_iter(self) -> Self::IntoIter {
        self.guesses.iter()
    }
}

/// Keeps the dictionary words consistent with `constraints`, in dictionary order.
pub fn filter_candidates(words: &[String], constraints: &ConstraintSet) -> Vec<String> {
    words
        .iter()
        .filter(|word| constraints.allows(word))
        .cloned()
        .collect()
}

/// Picks a guess uniformly at random from the pool.
pub fn select_guess<'a, R: Rng + ?Sized>(candidates: &'a [String], rng: &mut R) -> Result<&'a str> {
    candidates
        .choose(rng)
        .map(String::as_str)
        .ok_or(BotError::EmptyCandidateSet)
}

/// Scores `guess` against `answer`: greens first, then yellows consuming the
/// answer letters that are left over.
pub fn get_feedback(guess: &str, answer: &str) -> Vec<LetterMark> {
    let guess_chars: Vec<char> = guess.chars().collect();
    let mut answer_chars: Vec<Option<char>> = answer.chars().map(Some).collect();
    let mut feedback = vec![LetterMark::Miss; guess_chars.len()];
    // First pass: greens
    for (i, g) in guess_chars.iter().enumerate() {
        if answer_chars.get(i).copied().flatten() == Some(*g) {
            feedback[i] = LetterMark::Correct;
            answer_chars[i] = None;
        }
    }
    // Second pass: yellows
    for (i, g) in guess_chars.iter().enumerate() {
        if feedback[i] == LetterMark::Correct {
            continue;
        }
        if let Some(pos) = answer_chars.iter().position(|c| *c == Some(*g)) {
            feedback[i] = LetterMark::Present;
            answer_chars[pos] = None;
        }
    }
    feedback
}
