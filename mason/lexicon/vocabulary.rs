use indexmap::IndexMap;

/// Frequency-weighted word list harvested from domain text.
///
/// Words are lowercased alphabetic runs; frequency counts bias correction
/// towards the terms the domain actually uses.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    counts: IndexMap<String, usize>,
}

impl Vocabulary {
    /// Builds a vocabulary from arbitrary text fragments.
    #[must_use]
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts = IndexMap::new();
        for text in texts {
            for word in words_of(text.as_ref()) {
                *counts.entry(word).or_insert(0) += 1;
            }
        }
        Self { counts }
    }

    /// True when the word (lowercased) is known.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.counts.contains_key(&word.to_lowercase())
    }

    /// Occurrence count for a word, zero when unknown.
    #[must_use]
    pub fn frequency(&self, word: &str) -> usize {
        self.counts.get(&word.to_lowercase()).copied().unwrap_or(0)
    }

    /// Number of distinct words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when no words were harvested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates `(word, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts
            .iter()
            .map(|(word, count)| (word.as_str(), *count))
    }
}

fn words_of(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|ch: char| !ch.is_alphabetic())
        .filter(|word| word.len() >= 2)
        .map(str::to_lowercase)
}
