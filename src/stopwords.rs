use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::observer::{Event, EventBus, SubscriptionId};

static STOP_WORDS: OnceLock<HashSet<String>> = OnceLock::new();

/// Built-in English stop-word list.
pub fn default_stopwords() -> &'static HashSet<String> {
    STOP_WORDS.get_or_init(|| {
        stop_words::get(stop_words::LANGUAGE::English)
            .into_iter()
            .map(|x| x.to_string())
            .collect()
    })
}

/// Reads a stop-word file: one word per line, surrounding whitespace trimmed, blank lines skipped.
pub fn read_stopfile(path: &Path) -> Result<HashSet<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect())
}

/// Words filtered out of the cloud.
///
/// Entries keep the case they were given in; matching against tokens is done on
/// lower-cased forms (see [`StopWords::lowercased`]). Duplicate detection on insert is
/// exact and case-sensitive.
pub struct StopWords {
    words: HashSet<String>,
    stopfile: Option<PathBuf>,
    events: EventBus<StopWords>,
}

impl StopWords {
    pub fn new() -> Self {
        Self::from_words(default_stopwords().iter().cloned())
    }

    pub fn empty() -> Self {
        Self::from_words(Vec::<String>::new())
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            stopfile: None,
            events: EventBus::new(),
        }
    }

    /// Replaces the whole set with the contents of `path` and remembers the path.
    pub fn set_stopfile(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "{} stop file cannot be found!",
                path.display()
            )));
        }
        self.words = read_stopfile(path)?;
        self.stopfile = Some(path.to_path_buf());
        log::info!(
            "loaded {} stop words from {}",
            self.words.len(),
            path.display()
        );
        self.notify();
        Ok(())
    }

    pub fn get_stopfile(&self) -> Option<&Path> {
        self.stopfile.as_deref()
    }

    pub fn get_stopwords(&self) -> &HashSet<String> {
        &self.words
    }

    pub fn get_alphabetic_stopwords(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self.words.iter().map(String::as_str).collect();
        words.sort_unstable();
        words
    }

    pub fn get_unsorted_stopwords(&self) -> Vec<&str> {
        self.words.iter().map(String::as_str).collect()
    }

    /// The set in the form used for matching tokens.
    pub fn lowercased(&self) -> HashSet<String> {
        self.words.iter().map(|w| w.to_lowercase()).collect()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn add_stopword(&mut self, word: &str) -> Result<()> {
        if self.words.contains(word) {
            return Err(Error::AlreadyExists(word.to_string()));
        }
        self.words.insert(word.to_string());
        self.notify();
        Ok(())
    }

    /// Adds every word. Stops at the first duplicate; words added before it stay added.
    pub fn add_stopwords<I, S>(&mut self, words: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let word = word.as_ref();
            if self.words.contains(word) {
                return Err(Error::AlreadyExists(word.to_string()));
            }
            self.words.insert(word.to_string());
        }
        self.notify();
        Ok(())
    }

    pub fn del_stopword(&mut self, word: &str) -> Result<()> {
        if !self.words.remove(word) {
            return Err(Error::word_not_listed(word));
        }
        self.notify();
        Ok(())
    }

    /// Removes every named word. Stops at the first missing one; earlier removals stay applied.
    pub fn del_stopwords<I, S>(&mut self, words: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let word = word.as_ref();
            if !self.words.remove(word) {
                return Err(Error::word_not_listed(word));
            }
        }
        self.notify();
        Ok(())
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&StopWords) + Send + Sync + 'static,
    {
        self.events.subscribe(Event::StopWordsChanged, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Result<()> {
        self.events.unsubscribe(id)
    }

    fn notify(&self) {
        self.events.emit(Event::StopWordsChanged, self);
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StopWords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopWords")
            .field("len", &self.words.len())
            .field("stopfile", &self.stopfile)
            .field("events", &self.events)
            .finish()
    }
}
