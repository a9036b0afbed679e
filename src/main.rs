use rand::SeedableRng;
use rand::rngs::StdRng;
use std::process::ExitCode;
use wwm_bot::cli::{Cli, display_outcome, display_summary, parse_cli};
use wwm_bot::wordbank::default_dictionary_path;
use wwm_bot::{
    Dictionary, League, LocalTransport, PuzzleOutcome, Result, ThreadSleep, logging, solve_league,
};

fn main() -> ExitCode {
    let cli = parse_cli();
    logging::init(cli.verbose);
    match run(&cli) {
        Ok(outcomes) => {
            for outcome in &outcomes {
                display_outcome(outcome);
            }
            display_summary(&outcomes);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("wwm-bot: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<Vec<PuzzleOutcome>> {
    let path = cli
        .dictionary_path
        .clone()
        .unwrap_or_else(default_dictionary_path);
    let dictionary = Dictionary::from_file(&path);
    // Without a dictionary nothing can be solved, so load before touching the league
    let words = dictionary.words(cli.letters)?;
    println!("Loaded {} words of {} letters.", words.len(), cli.letters);

    let league = League {
        league_slug: cli.league.clone(),
        league_name: cli.league.clone(),
        letters: cli.letters,
        max_guesses: cli.max_guesses,
    };
    let mut transport = LocalTransport::new(league, words.iter().cloned());
    for answer in &cli.answers {
        transport.add_puzzle(answer);
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    solve_league(
        &mut transport,
        &dictionary,
        &mut ThreadSleep,
        &mut rng,
        cli.solve_config(),
        &cli.league,
        cli.all,
    )
}
