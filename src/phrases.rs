//! # Phrases
//! Pool of filler lines handed out when the pop queue is empty.
//!
//! The random source is injected so tests can seed it.

use rand::{Rng, RngCore};

/// Built-in pool used when no phrases are configured.
pub const DEFAULT_PHRASES: &[&str] = &[
    "No letters in the sack yet, so the elf hums a tune instead.",
    "The mailbox is quiet; the candles still burn bright.",
    "Snow on the roof and nothing in the queue. Write something!",
    "While the cluster scales and the traffic roars, the board keeps the holiday doors.",
    "A parcel soft and round awaits; first, someone has to post.",
];

/// Owned phrase list with a random pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhrasePool {
    phrases: Vec<String>,
}

impl PhrasePool {
    /// Blank lines are dropped. An empty result falls back to [`DEFAULT_PHRASES`].
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cleaned: Vec<String> = phrases
            .into_iter()
            .map(Into::into)
            .filter(|p| !p.trim().is_empty())
            .collect();
        if cleaned.is_empty() {
            return Self::default();
        }
        Self { phrases: cleaned }
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.phrases.iter().any(|p| p == phrase)
    }

    /// Uniformly random phrase.
    pub fn pick(&self, rng: &mut dyn RngCore) -> &str {
        match self.phrases.len() {
            0 => "",
            n => &self.phrases[rng.random_range(0..n)],
        }
    }
}

impl Default for PhrasePool {
    fn default() -> Self {
        Self {
            phrases: DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }
}
