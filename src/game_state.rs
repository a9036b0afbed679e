use crate::constraints::{DuplicatePolicy, extract};
use crate::error::{BotError, Result};
use crate::solver::{LetterMark, Marks, filter_candidates, select_guess};
use crate::transport::{GuessResult, League, Puzzle, PuzzleTransport, SubmitOutcome};
use crate::wordbank::Dictionary;
use crate::{debug_log, info_log};
use chrono::{DateTime, Local};
use log::{info, warn};
use rand::Rng;
use std::collections::BTreeSet;
use std::fmt;
use std::thread;
use std::time::Duration;

pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Where a puzzle solve currently is.
///
/// `Start` → `AwaitingHistory` → `Guessing` → `Submitting` → `Evaluating`, then
/// back to `Guessing` until the service reports completion. Terminal states:
/// `Completed`, `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveState {
    Start,
    AwaitingHistory,
    Guessing,
    Submitting,
    Evaluating,
    Completed,
    Failed,
}

/// Waits between attempts so the service is not hammered.
pub trait Pause {
    fn pause(&mut self, delay: Duration);
}

pub struct ThreadSleep;

impl Pause for ThreadSleep {
    fn pause(&mut self, delay: Duration) {
        thread::sleep(delay);
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SolveConfig {
    /// Fixed pause between consecutive attempts
    pub delay: Duration,
    pub policy: DuplicatePolicy,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            policy: DuplicatePolicy::default(),
        }
    }
}

/// Progress data for one accepted guess.
#[derive(Clone, Debug)]
pub struct AttemptReport {
    pub guess: String,
    pub marks: Vec<LetterMark>,
    pub correct: bool,
    pub completed: bool,
    pub answer: Option<String>,
    /// Candidates the guess was drawn from
    pub pool_size: usize,
    pub at: DateTime<Local>,
}

impl AttemptReport {
    fn new(guess: &str, pool_size: usize, result: &GuessResult) -> Result<Self> {
        let history = result.history()?;
        let marks = history
            .iter()
            .rev()
            .find(|g| g.word() == guess)
            .map(|g| g.marks().to_vec())
            .unwrap_or_default();
        Ok(Self {
            guess: guess.to_string(),
            marks,
            correct: result.correct,
            completed: result.completed,
            answer: result.answer.clone(),
            pool_size,
            at: Local::now(),
        })
    }
}

impl fmt::Display for AttemptReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "correct={}, completed={}, guess={}, marks={}, pool={}, answer={}",
            self.correct,
            self.completed,
            self.guess,
            Marks(&self.marks),
            self.pool_size,
            self.answer.as_deref().unwrap_or("-")
        )
    }
}

#[derive(Clone, Debug)]
pub struct PuzzleOutcome {
    pub puzzle_id: u64,
    pub correct: bool,
    pub answer: Option<String>,
    pub attempts: Vec<AttemptReport>,
    /// Words the service refused, in the order they were tried
    pub rejected: Vec<String>,
    /// Total guesses on record, including ones made before this run
    pub guess_count: usize,
}

/// Runs one puzzle to a terminal state.
pub struct PuzzleSolver<'a, T, P, R>
where
    T: PuzzleTransport,
    P: Pause,
    R: Rng,
{
    transport: &'a mut T,
    dictionary: &'a Dictionary,
    pause: &'a mut P,
    rng: &'a mut R,
    config: SolveConfig,
    league: League,
    puzzle: Puzzle,
    state: SolveState,
}

impl<'a, T, P, R> PuzzleSolver<'a, T, P, R>
where
    T: PuzzleTransport,
    P: Pause,
    R: Rng,
{
    pub fn new(
        transport: &'a mut T,
        dictionary: &'a Dictionary,
        pause: &'a mut P,
        rng: &'a mut R,
        config: SolveConfig,
        league: League,
        puzzle: Puzzle,
    ) -> Self {
        Self {
            transport,
            dictionary,
            pause,
            rng,
            config,
            league,
            puzzle,
            state: SolveState::Start,
        }
    }

    #[must_use]
    pub fn state(&self) -> SolveState {
        self.state
    }

    /// Solves the puzzle. Any error leaves the solver in `Failed` and is
    /// returned as-is.
    pub fn run(&mut self) -> Result<PuzzleOutcome> {
        let outcome = self.drive();
        if let Err(e) = &outcome {
            warn!("Puzzle {} failed: {}", self.puzzle.wordle_answer_id, e);
            self.enter(SolveState::Failed);
        }
        outcome
    }

    fn enter(&mut self, state: SolveState) {
        debug_log!("puzzle {} - {:?} -> {:?}", self.puzzle.wordle_answer_id, self.state, state);
        self.state = state;
    }

    fn drive(&mut self) -> Result<PuzzleOutcome> {
        let letters = self.league.letters;
        let words = self.dictionary.words(letters)?;

        self.enter(SolveState::AwaitingHistory);
        let mut current = self.transport.guesses(&self.puzzle)?;
        let mut history = current.history_of_length(letters)?;
        let mut attempts = Vec::new();
        let mut rejected: BTreeSet<String> = BTreeSet::new();
        let mut rejected_order = Vec::new();
        info_log!(
            "Puzzle {}: {} letters, {} guesses already made",
            self.puzzle.wordle_answer_id,
            letters,
            history.len()
        );

        while !current.completed {
            self.enter(SolveState::Guessing);
            let constraints = extract(letters, &history, self.config.policy);
            let pool: Vec<String> = filter_candidates(&words, &constraints)
                .into_iter()
                .filter(|w| !rejected.contains(w))
                .collect();
            debug_log!("Puzzle {}: {} candidates", self.puzzle.wordle_answer_id, pool.len());
            let guess = select_guess(&pool, &mut *self.rng)?.to_string();

            self.enter(SolveState::Submitting);
            let outcome = self.transport.submit(&self.puzzle, &guess);

            self.enter(SolveState::Evaluating);
            match outcome {
                Ok(SubmitOutcome::Accepted(result)) => {
                    history = result.history_of_length(letters)?;
                    let report = AttemptReport::new(&guess, pool.len(), &result)?;
                    info!("Puzzle {}: {}", self.puzzle.wordle_answer_id, report);
                    attempts.push(report);
                    current = result;
                }
                Ok(SubmitOutcome::Rejected(reason))
                | Err(BotError::ValidationRejected { reason, .. }) => {
                    warn!("Our guess '{}' was not accepted: {}", guess, reason);
                    rejected.insert(guess.clone());
                    rejected_order.push(guess);
                }
                Err(e) => return Err(e),
            }

            if !current.completed {
                self.pause.pause(self.config.delay);
            }
        }

        self.enter(SolveState::Completed);
        Ok(PuzzleOutcome {
            puzzle_id: self.puzzle.wordle_answer_id,
            correct: current.correct,
            answer: current.answer.clone(),
            attempts,
            rejected: rejected_order,
            guess_count: history.len(),
        })
    }
}

/// Solves the league's unsolved active puzzles: only the first one unless
/// `all` is set. A puzzle whose candidate pool runs dry is skipped (the solver
/// has already logged it); any other error aborts the run.
pub fn solve_league<T, P, R>(
    transport: &mut T,
    dictionary: &Dictionary,
    pause: &mut P,
    rng: &mut R,
    config: SolveConfig,
    league_slug: &str,
    all: bool,
) -> Result<Vec<PuzzleOutcome>>
where
    T: PuzzleTransport,
    P: Pause,
    R: Rng,
{
    let league = transport.league(league_slug)?;
    let unsolved: Vec<Puzzle> = transport
        .active_puzzles(league_slug)?
        .into_iter()
        .filter(|p| !p.completed)
        .collect();
    info!(
        "League {}: {} unsolved puzzles, {} letters",
        league.league_slug,
        unsolved.len(),
        league.letters
    );

    let take = if all { unsolved.len() } else { 1 };
    let mut outcomes = Vec::new();
    for puzzle in unsolved.into_iter().take(take) {
        let mut solver = PuzzleSolver::new(
            transport,
            dictionary,
            pause,
            rng,
            config,
            league.clone(),
            puzzle,
        );
        match solver.run() {
            Ok(outcome) => outcomes.push(outcome),
            // Already reported by the solver; move on to the next puzzle
            Err(BotError::EmptyCandidateSet) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{GuessRecord, LocalTransport};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const DICT: [&str; 5] = ["brine", "crane", "crate", "grate", "trace"];

    #[derive(Default)]
    struct RecordingPause {
        calls: Vec<Duration>,
    }

    impl Pause for RecordingPause {
        fn pause(&mut self, delay: Duration) {
            self.calls.push(delay);
        }
    }

    fn league() -> League {
        League {
            league_slug: "bot_league_5l_5m".to_string(),
            league_name: String::new(),
            letters: 5,
            max_guesses: 6,
        }
    }

    fn config() -> SolveConfig {
        SolveConfig {
            delay: Duration::from_millis(250),
            policy: DuplicatePolicy::Corrected,
        }
    }

    /// Refuses every word in `refuse`, otherwise defers to a local game.
    struct PickyTransport {
        inner: LocalTransport,
        refuse: Vec<&'static str>,
        submitted: Vec<String>,
    }

    impl PuzzleTransport for PickyTransport {
        fn league(&mut self, slug: &str) -> Result<League> {
            self.inner.league(slug)
        }
        fn active_puzzles(&mut self, slug: &str) -> Result<Vec<Puzzle>> {
            self.inner.active_puzzles(slug)
        }
        fn guesses(&mut self, puzzle: &Puzzle) -> Result<GuessResult> {
            self.inner.guesses(puzzle)
        }
        fn submit(&mut self, puzzle: &Puzzle, guess: &str) -> Result<SubmitOutcome> {
            self.submitted.push(guess.to_string());
            if self.refuse.iter().any(|w| *w == guess) {
                return Ok(SubmitOutcome::Rejected("not in word list".to_string()));
            }
            self.inner.submit(puzzle, guess)
        }
    }

    /// Serves a fixed history and fails every submission.
    struct BrokenTransport {
        history: GuessResult,
        submits: usize,
    }

    impl PuzzleTransport for BrokenTransport {
        fn league(&mut self, _slug: &str) -> Result<League> {
            Ok(league())
        }
        fn active_puzzles(&mut self, slug: &str) -> Result<Vec<Puzzle>> {
            Ok(vec![Puzzle {
                wordle_answer_id: 9,
                league_slug: slug.to_string(),
                completed: false,
            }])
        }
        fn guesses(&mut self, _puzzle: &Puzzle) -> Result<GuessResult> {
            Ok(self.history.clone())
        }
        fn submit(&mut self, _puzzle: &Puzzle, _guess: &str) -> Result<SubmitOutcome> {
            self.submits += 1;
            Err(BotError::Transport("500 Internal Server Error".to_string()))
        }
    }

    /// Echoes every submission back with a six-letter record appended.
    struct LongRecordTransport;

    impl PuzzleTransport for LongRecordTransport {
        fn league(&mut self, _slug: &str) -> Result<League> {
            Ok(league())
        }
        fn active_puzzles(&mut self, _slug: &str) -> Result<Vec<Puzzle>> {
            Ok(Vec::new())
        }
        fn guesses(&mut self, _puzzle: &Puzzle) -> Result<GuessResult> {
            Ok(GuessResult::default())
        }
        fn submit(&mut self, _puzzle: &Puzzle, guess: &str) -> Result<SubmitOutcome> {
            Ok(SubmitOutcome::Accepted(GuessResult {
                completed: true,
                correct: true,
                answer: Some(guess.to_string()),
                guesses: vec![GuessRecord {
                    guess: format!("{guess}s"),
                    result: vec!['+'; 6],
                }],
            }))
        }
    }

    #[test]
    fn test_solves_local_puzzle() {
        let dictionary = Dictionary::from_words(DICT);
        let mut transport = LocalTransport::new(league(), DICT);
        let puzzle = transport.add_puzzle("crate");
        let mut pause = RecordingPause::default();
        let mut rng = StdRng::seed_from_u64(3);

        let mut solver = PuzzleSolver::new(
            &mut transport,
            &dictionary,
            &mut pause,
            &mut rng,
            config(),
            league(),
            puzzle,
        );
        let outcome = solver.run().unwrap();
        assert_eq!(solver.state(), SolveState::Completed);
        assert!(outcome.correct);
        assert_eq!(outcome.answer.as_deref(), Some("crate"));
        let last = outcome.attempts.last().unwrap();
        assert_eq!(last.guess, "crate");
        assert!(last.completed);
        assert!(last.marks.iter().all(|m| *m == LetterMark::Correct));
        // One pause per attempt that did not finish the puzzle
        assert_eq!(pause.calls.len(), outcome.attempts.len() - 1);
        assert!(pause.calls.iter().all(|d| *d == Duration::from_millis(250)));
    }

    #[test]
    fn test_rejected_guess_is_retried_after_one_delay() {
        let dict = ["crane", "crate"];
        let dictionary = Dictionary::from_words(dict);
        let mut inner = LocalTransport::new(league(), dict);
        let puzzle = inner.add_puzzle("crate");
        let mut transport = PickyTransport {
            inner,
            refuse: vec!["crane"],
            submitted: Vec::new(),
        };
        // Find a seed whose first pick is the refused word
        let pool: Vec<String> = dict.iter().map(|w| w.to_string()).collect();
        let seed = (0..1000u64)
            .find(|s| select_guess(&pool, &mut StdRng::seed_from_u64(*s)).unwrap() == "crane")
            .unwrap();
        let mut pause = RecordingPause::default();
        let mut rng = StdRng::seed_from_u64(seed);

        let outcome = PuzzleSolver::new(
            &mut transport,
            &dictionary,
            &mut pause,
            &mut rng,
            config(),
            league(),
            puzzle,
        )
        .run()
        .unwrap();

        assert_eq!(outcome.rejected, vec!["crane"]);
        assert_eq!(transport.submitted, vec!["crane", "crate"]);
        // The refused word never reaches history
        assert_eq!(outcome.guess_count, 1);
        assert_eq!(outcome.attempts.len(), 1);
        assert!(outcome.correct);
        assert_eq!(pause.calls, vec![Duration::from_millis(250)]);
    }

    #[test]
    fn test_rejections_bounded_by_candidate_exhaustion() {
        let dictionary = Dictionary::from_words(DICT);
        let mut inner = LocalTransport::new(league(), DICT);
        let puzzle = inner.add_puzzle("crate");
        let mut transport = PickyTransport {
            inner,
            refuse: DICT.to_vec(),
            submitted: Vec::new(),
        };
        let mut pause = RecordingPause::default();
        let mut rng = StdRng::seed_from_u64(5);

        let mut solver = PuzzleSolver::new(
            &mut transport,
            &dictionary,
            &mut pause,
            &mut rng,
            config(),
            league(),
            puzzle,
        );
        assert!(matches!(solver.run(), Err(BotError::EmptyCandidateSet)));
        assert_eq!(solver.state(), SolveState::Failed);
        let mut submitted = transport.submitted.clone();
        submitted.sort();
        assert_eq!(submitted, DICT);
        assert_eq!(pause.calls.len(), DICT.len());
    }

    #[test]
    fn test_short_guess_in_history_is_invalid() {
        let dictionary = Dictionary::from_words(DICT);
        let history = GuessResult {
            guesses: vec![GuessRecord {
                guess: "cra".to_string(),
                result: vec!['+', '+', '+'],
            }],
            ..GuessResult::default()
        };
        let mut transport = BrokenTransport { history, submits: 0 };
        let mut pause = RecordingPause::default();
        let mut rng = StdRng::seed_from_u64(1);
        let puzzle = transport.active_puzzles("bot_league_5l_5m").unwrap().remove(0);

        let mut solver = PuzzleSolver::new(
            &mut transport,
            &dictionary,
            &mut pause,
            &mut rng,
            config(),
            league(),
            puzzle,
        );
        assert!(matches!(solver.run(), Err(BotError::InvalidGuess(_))));
        assert_eq!(solver.state(), SolveState::Failed);
        assert_eq!(transport.submits, 0);
    }

    #[test]
    fn test_submit_result_with_wrong_length_guess_is_invalid() {
        let dictionary = Dictionary::from_words(DICT);
        let mut transport = LongRecordTransport;
        let mut pause = RecordingPause::default();
        let mut rng = StdRng::seed_from_u64(1);
        let puzzle = Puzzle {
            wordle_answer_id: 4,
            league_slug: "bot_league_5l_5m".to_string(),
            completed: false,
        };

        let mut solver = PuzzleSolver::new(
            &mut transport,
            &dictionary,
            &mut pause,
            &mut rng,
            config(),
            league(),
            puzzle,
        );
        assert!(matches!(solver.run(), Err(BotError::InvalidGuess(_))));
        assert_eq!(solver.state(), SolveState::Failed);
    }

    #[test]
    fn test_transport_failure_is_fatal() {
        let dictionary = Dictionary::from_words(DICT);
        let mut transport = BrokenTransport {
            history: GuessResult::default(),
            submits: 0,
        };
        let mut pause = RecordingPause::default();
        let mut rng = StdRng::seed_from_u64(1);
        let puzzle = transport.active_puzzles("bot_league_5l_5m").unwrap().remove(0);

        let mut solver = PuzzleSolver::new(
            &mut transport,
            &dictionary,
            &mut pause,
            &mut rng,
            config(),
            league(),
            puzzle,
        );
        let err = solver.run().unwrap_err();
        assert!(matches!(err, BotError::Transport(ref msg) if msg.contains("500")));
        assert_eq!(solver.state(), SolveState::Failed);
        assert_eq!(transport.submits, 1);
        assert!(pause.calls.is_empty());
    }

    #[test]
    fn test_inconsistent_history_submits_nothing() {
        let dictionary = Dictionary::from_words(DICT);
        // Every letter of every dictionary word has been ruled out
        let history = GuessResult {
            guesses: vec![
                GuessRecord {
                    guess: "crane".to_string(),
                    result: vec![' '; 5],
                },
                GuessRecord {
                    guess: "tribe".to_string(),
                    result: vec![' '; 5],
                },
            ],
            ..GuessResult::default()
        };
        let mut transport = BrokenTransport { history, submits: 0 };
        let mut pause = RecordingPause::default();
        let mut rng = StdRng::seed_from_u64(1);
        let puzzle = transport.active_puzzles("bot_league_5l_5m").unwrap().remove(0);

        let mut solver = PuzzleSolver::new(
            &mut transport,
            &dictionary,
            &mut pause,
            &mut rng,
            config(),
            league(),
            puzzle,
        );
        assert!(matches!(solver.run(), Err(BotError::EmptyCandidateSet)));
        assert_eq!(transport.submits, 0);
    }

    #[test]
    fn test_already_completed_puzzle() {
        let dictionary = Dictionary::from_words(DICT);
        let mut transport = LocalTransport::new(league(), DICT);
        let puzzle = transport.add_puzzle("brine");
        transport.submit(&puzzle, "brine").unwrap();
        let mut pause = RecordingPause::default();
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = PuzzleSolver::new(
            &mut transport,
            &dictionary,
            &mut pause,
            &mut rng,
            config(),
            league(),
            puzzle,
        )
        .run()
        .unwrap();
        assert!(outcome.correct);
        assert!(outcome.attempts.is_empty());
        assert_eq!(outcome.guess_count, 1);
    }

    #[test]
    fn test_solve_league_skips_exhausted_puzzles() {
        let dictionary = Dictionary::from_words(DICT);
        let mut transport = LocalTransport::new(league(), DICT);
        // Not in the dictionary: the pool runs dry before it is found
        transport.add_puzzle("zzzzz");
        transport.add_puzzle("trace");
        let mut pause = RecordingPause::default();
        let mut rng = StdRng::seed_from_u64(8);

        let outcomes = solve_league(
            &mut transport,
            &dictionary,
            &mut pause,
            &mut rng,
            config(),
            "bot_league_5l_5m",
            true,
        )
        .unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].answer.as_deref(), Some("trace"));
    }

    #[test]
    fn test_solve_league_first_only() {
        let dictionary = Dictionary::from_words(DICT);
        let mut transport = LocalTransport::new(league(), DICT);
        transport.add_puzzle("crane");
        transport.add_puzzle("trace");
        let mut pause = RecordingPause::default();
        let mut rng = StdRng::seed_from_u64(8);

        let outcomes = solve_league(
            &mut transport,
            &dictionary,
            &mut pause,
            &mut rng,
            config(),
            "bot_league_5l_5m",
            false,
        )
        .unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].puzzle_id, 1);
        let remaining = transport.active_puzzles("bot_league_5l_5m").unwrap();
        assert!(!remaining[1].completed);
    }
}
