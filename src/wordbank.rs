use crate::error::Result;
use crate::info_log;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

pub const DEFAULT_DICTIONARY_FILE: &str = "collins.2019.txt.clean";

/// Where the cleaned word list lives unless `--dictionary` says otherwise.
#[must_use]
pub fn default_dictionary_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("wwm-bot").join(DEFAULT_DICTIONARY_FILE))
        .filter(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DICTIONARY_FILE))
}

/// Keeps the words of exactly `length` characters, sorted and de-duplicated.
fn words_of_length<I, S>(words: I, length: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut words: Vec<String> = words
        .into_iter()
        .filter_map(|word| {
            let word = word.as_ref().trim();
            (word.chars().count() == length).then(|| word.to_string())
        })
        .collect();
    words.sort();
    words.dedup();
    words
}

pub fn load_wordbank_from_str(data: &str, length: usize) -> Vec<String> {
    words_of_length(data.lines(), length)
}

pub fn load_wordbank_from_file<P: AsRef<Path>>(path: P, length: usize) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let lines = BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<String>>>()?;
    Ok(words_of_length(lines, length))
}

enum Source {
    File(PathBuf),
    Memory(Vec<String>),
}

/// Length-indexed word lists, each loaded on first request and kept for the
/// rest of the run. Share one instance across sequential solves.
pub struct Dictionary {
    source: Source,
    cache: Mutex<HashMap<usize, Arc<[String]>>>,
}

impl Dictionary {
    pub fn from_file<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            source: Source::File(path.into()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: Source::Memory(words.into_iter().map(Into::into).collect()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// All words of `length` letters. The source is read at most once per length.
    pub fn words(&self, length: usize) -> Result<Arc<[String]>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(words) = cache.get(&length) {
            return Ok(Arc::clone(words));
        }
        let words: Arc<[String]> = match &self.source {
            Source::File(path) => {
                let words = load_wordbank_from_file(path, length)?;
                info_log!(
                    "Loaded {} words of length {} from {}",
                    words.len(),
                    length,
                    path.display()
                );
                words.into()
            }
            Source::Memory(all) => words_of_length(all, length).into(),
        };
        cache.insert(length, Arc::clone(&words));
        Ok(words)
    }

    /// Lengths loaded so far.
    #[must_use]
    pub fn cached_lengths(&self) -> Vec<usize> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let mut lengths: Vec<usize> = cache.keys().copied().collect();
        lengths.sort_unstable();
        lengths
    }
}
