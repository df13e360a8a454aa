use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::observer::{Event, EventBus, SubscriptionId};

#[derive(Debug, Clone, Copy)]
struct Slot {
    count: u64,
    seq: u64,
}

/// Word → count mapping that remembers first-insertion order.
///
/// Order only matters for ranking ties; equality ignores it. A word that is
/// removed and added again moves to the end.
#[derive(Debug, Clone, Default)]
pub struct FrequencyMap {
    slots: HashMap<String, Slot>,
    next_seq: u64,
}

impl FrequencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `word`, inserting it with count 1 if absent.
    pub fn increment(&mut self, word: String) -> u64 {
        let seq = self.next_seq;
        let slot = self.slots.entry(word).or_insert_with(|| Slot { count: 0, seq });
        if slot.count == 0 {
            self.next_seq += 1;
        }
        slot.count += 1;
        slot.count
    }

    /// Sets the count for `word`. A count of zero removes the word, counts are never stored as 0.
    pub fn insert(&mut self, word: impl Into<String>, count: u64) {
        let word = word.into();
        if count == 0 {
            self.slots.remove(&word);
            return;
        }
        match self.slots.get_mut(&word) {
            Some(slot) => slot.count = count,
            None => {
                self.slots.insert(
                    word,
                    Slot {
                        count,
                        seq: self.next_seq,
                    },
                );
                self.next_seq += 1;
            }
        }
    }

    pub fn remove(&mut self, word: &str) -> Option<u64> {
        self.slots.remove(word).map(|s| s.count)
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.slots.get(word).map(|s| s.count)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.slots.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.slots.values().map(|s| s.count).sum()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        let mut entries: Vec<(&String, &Slot)> = self.slots.iter().collect();
        entries.sort_by_key(|(_, slot)| slot.seq);
        entries.into_iter().map(|(w, slot)| (w.as_str(), slot.count))
    }

    pub fn words(&self) -> Vec<&str> {
        self.iter().map(|(w, _)| w).collect()
    }

    /// Entries by descending count; ties keep insertion order.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    /// Keeps only the entries for which `keep` returns true. Order is preserved.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, u64) -> bool) {
        self.slots.retain(|w, slot| keep(w, slot.count));
    }
}

impl PartialEq for FrequencyMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(w, c)| other.get(w) == Some(c))
    }
}

impl Eq for FrequencyMap {}

impl<S: Into<String>> FromIterator<(S, u64)> for FrequencyMap {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut map = FrequencyMap::new();
        for (word, count) in iter {
            map.insert(word, count);
        }
        map
    }
}

impl Serialize for FrequencyMap {
    fn serialize<Se: Serializer>(&self, serializer: Se) -> std::result::Result<Se::Ok, Se::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (word, count) in self.iter() {
            map.serialize_entry(word, &count)?;
        }
        map.end()
    }
}

/// The words to cloudify and how often each one was seen.
///
/// Words are lower-cased on the way in. Every successful mutation notifies
/// subscribers once, batches included.
pub struct WordFrequencies {
    words: FrequencyMap,
    events: EventBus<WordFrequencies>,
}

impl WordFrequencies {
    pub fn new() -> Self {
        Self {
            words: FrequencyMap::new(),
            events: EventBus::new(),
        }
    }

    pub fn add_word(&mut self, word: &str) {
        self.words.increment(word.to_lowercase());
        self.notify();
    }

    pub fn add_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.words.increment(word.as_ref().to_lowercase());
        }
        self.notify();
    }

    pub fn remove_word(&mut self, word: &str) -> Result<()> {
        let word = word.to_lowercase();
        if self.words.remove(&word).is_none() {
            return Err(Error::word_not_listed(&word));
        }
        self.notify();
        Ok(())
    }

    /// Removes every word in `words`.
    ///
    /// Stops at the first word that is not present and returns `NotFound`. Words removed
    /// before that point stay removed and no notification is sent.
    pub fn remove_words<I, S>(&mut self, words: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let word = word.as_ref().to_lowercase();
            if self.words.remove(&word).is_none() {
                return Err(Error::word_not_listed(&word));
            }
        }
        self.notify();
        Ok(())
    }

    /// Live view of the counts.
    pub fn get_word_count(&self) -> &FrequencyMap {
        &self.words
    }

    pub fn get_word_list(&self) -> Vec<&str> {
        self.words.words()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&WordFrequencies) + Send + Sync + 'static,
    {
        self.events.subscribe(Event::WordsChanged, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Result<()> {
        self.events.unsubscribe(id)
    }

    fn notify(&self) {
        log::debug!("word counts changed: {} distinct words", self.words.len());
        self.events.emit(Event::WordsChanged, self);
    }
}

impl Default for WordFrequencies {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WordFrequencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordFrequencies")
            .field("words", &self.words)
            .field("events", &self.events)
            .finish()
    }
}
