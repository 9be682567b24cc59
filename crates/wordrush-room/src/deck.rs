//! The per-game word queue.

use std::collections::{HashSet, VecDeque};

use rand::Rng;
use rand::seq::SliceRandom;
use wordrush_words::WordRecord;

/// Shuffled words for one game, plus the words already solved.
///
/// A word that is solved is never drawn again in the same game. A word
/// that times out goes to the back of the queue, so a small catalogue can
/// still fill the whole game clock; the game only runs out of words once
/// every word in the catalogue has been solved.
///
/// A word can therefore come back within a game, but only after it timed
/// out unsolved.
#[derive(Debug, Default)]
pub struct WordDeck {
    queue: VecDeque<WordRecord>,
    used: HashSet<String>,
}

impl WordDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the deck with a shuffled copy of `catalogue`. Duplicate
    /// words keep their first occurrence. Returns the number of distinct
    /// words.
    pub fn shuffle_from<R: Rng + ?Sized>(&mut self, catalogue: &[WordRecord], rng: &mut R) -> usize {
        self.clear();
        let mut seen = HashSet::new();
        let mut words: Vec<WordRecord> = catalogue
            .iter()
            .filter(|record| seen.insert(record.word.clone()))
            .cloned()
            .collect();
        words.shuffle(rng);
        self.queue = words.into();
        self.queue.len()
    }

    /// Takes the next unsolved word off the front of the queue.
    pub fn draw(&mut self) -> Option<WordRecord> {
        while let Some(record) = self.queue.pop_front() {
            if !self.used.contains(&record.word) {
                return Some(record);
            }
        }
        None
    }

    /// Records a solved word so it is never drawn again this game.
    pub fn mark_solved(&mut self, record: &WordRecord) {
        self.used.insert(record.word.clone());
    }

    /// Puts an unsolved word back at the end of the queue.
    pub fn recycle(&mut self, record: WordRecord) {
        if !self.used.contains(&record.word) {
            self.queue.push_back(record);
        }
    }

    pub fn is_used(&self, word: &str) -> bool {
        self.used.contains(word)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.used.clear();
    }

    /// Words still in the queue.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}
