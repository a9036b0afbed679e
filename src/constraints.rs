//! Folds a guess history into the positional and global letter rules that
//! every remaining candidate has to satisfy.
//!
//! The set only ever grows as guesses are appended: fixed letters are never
//! cleared and the exclusion/requirement sets only gain members.

use crate::debug_log;
use crate::solver::{Guess, GuessHistory, LetterMark};
use std::collections::{BTreeMap, BTreeSet};

/// Lowercase alphabet the dictionary is drawn from.
pub const ALPHABET: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// How a missed letter is treated when the same guess also marks that letter
/// present or correct somewhere else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Every missed letter is excluded from the whole word, duplicates or not.
    /// Matches the behaviour of the first bots written against the service.
    Literal,
    /// A missed letter is excluded globally only if it has no present/correct
    /// mark in the same guess; otherwise it is only excluded at the missed slot.
    #[default]
    Corrected,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintSet {
    word_length: usize,
    fixed_position: BTreeMap<usize, char>,
    excluded_at_position: BTreeMap<usize, BTreeSet<char>>,
    excluded_globally: BTreeSet<char>,
    required_anywhere: BTreeSet<char>,
}

impl ConstraintSet {
    /// The empty constraint set: every word of `word_length` letters passes.
    #[must_use]
    pub fn new(word_length: usize) -> Self {
        Self {
            word_length,
            fixed_position: BTreeMap::new(),
            excluded_at_position: BTreeMap::new(),
            excluded_globally: BTreeSet::new(),
            required_anywhere: BTreeSet::new(),
        }
    }

    /// Adds the rules learned from one more guess.
    #[must_use]
    pub fn with_guess(mut self, guess: &Guess, policy: DuplicatePolicy) -> Self {
        let mut misses: Vec<(usize, char)> = Vec::new();
        let mut confirmed: BTreeSet<char> = BTreeSet::new();

        for (i, letter, mark) in guess.slots().take(self.word_length) {
            match mark {
                LetterMark::Correct => {
                    self.fixed_position.insert(i, letter);
                    confirmed.insert(letter);
                }
                LetterMark::Present => {
                    self.excluded_at_position.entry(i).or_default().insert(letter);
                    self.required_anywhere.insert(letter);
                    confirmed.insert(letter);
                }
                LetterMark::Miss => misses.push((i, letter)),
            }
        }

        for (i, letter) in misses {
            if policy == DuplicatePolicy::Corrected && confirmed.contains(&letter) {
                self.excluded_at_position.entry(i).or_default().insert(letter);
            } else {
                self.excluded_globally.insert(letter);
            }
        }
        self
    }

    #[must_use]
    pub fn word_length(&self) -> usize {
        self.word_length
    }

    #[must_use]
    pub fn fixed_at(&self, position: usize) -> Option<char> {
        self.fixed_position.get(&position).copied()
    }

    #[must_use]
    pub fn fixed_positions(&self) -> &BTreeMap<usize, char> {
        &self.fixed_position
    }

    /// Letters known to be wrong at `position`; empty if nothing is known.
    #[must_use]
    pub fn excluded_at(&self, position: usize) -> BTreeSet<char> {
        self.excluded_at_position
            .get(&position)
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn excluded_globally(&self) -> &BTreeSet<char> {
        &self.excluded_globally
    }

    #[must_use]
    pub fn required_anywhere(&self) -> &BTreeSet<char> {
        &self.required_anywhere
    }

    /// Whether `letter` may sit at `position`.
    #[must_use]
    pub fn permits(&self, position: usize, letter: char) -> bool {
        match self.fixed_position.get(&position) {
            Some(fixed) => *fixed == letter,
            None => {
                !self.excluded_globally.contains(&letter)
                    && !self
                        .excluded_at_position
                        .get(&position)
                        .is_some_and(|set| set.contains(&letter))
            }
        }
    }

    /// The explicit allowed-letter set for one position.
    #[must_use]
    pub fn allowed_letters(&self, position: usize) -> BTreeSet<char> {
        ALPHABET
            .iter()
            .copied()
            .filter(|c| self.permits(position, *c))
            .collect()
    }

    /// Whether `word` is consistent with every rule in the set.
    #[must_use]
    pub fn allows(&self, word: &str) -> bool {
        if word.chars().count() != self.word_length {
            return false;
        }
        if !word.chars().enumerate().all(|(i, c)| self.permits(i, c)) {
            return false;
        }
        self.required_anywhere.iter().all(|c| word.contains(*c))
    }
}

/// Folds the history, oldest guess first, into one constraint set.
#[must_use]
pub fn extract(word_length: usize, history: &GuessHistory, policy: DuplicatePolicy) -> ConstraintSet {
    let constraints = history
        .iter()
        .fold(ConstraintSet::new(word_length), |set, guess| {
            set.with_guess(guess, policy)
        });
    debug_log!(
        "extract() - {} guesses: fixed={:?} excluded={:?} required={:?}",
        history.len(),
        constraints.fixed_position,
        constraints.excluded_globally,
        constraints.required_anywhere
    );
    constraints
}
