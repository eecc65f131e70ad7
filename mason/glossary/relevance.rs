use std::collections::HashSet;

use crate::store::GlossaryStore;

/// High-frequency English function words excluded from the domain term
/// set. Without this, answer prose like "is" or "the" would mark every
/// utterance as in-domain.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "is", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "do", "does", "did", "will", "would", "shall", "should", "may",
    "might", "can", "could", "must", "to", "of", "in", "for", "on", "with", "at", "by", "from",
    "into", "about", "and", "or", "but", "not", "no", "if", "then", "than", "so", "as", "it",
    "its", "such", "like", "only", "also", "per", "each", "other", "when", "where", "how", "why",
    "what", "which", "who", "used", "uses", "use", "using", "between", "under", "over", "more",
    "most", "very",
];

/// Harvests lowercase content words (three letters or longer, stop words
/// removed) from glossary keys and answers.
pub(crate) fn harvest_terms<'a>(
    entries: impl Iterator<Item = (&'a str, &'a str)>,
) -> HashSet<String> {
    let stop: HashSet<&str> = STOP_WORDS.iter().copied().collect();
    let mut terms = HashSet::new();
    for (key, answer) in entries {
        for word in words_of(key).chain(words_of(answer)) {
            if word.len() >= 3 && !stop.contains(word.as_str()) {
                terms.insert(word);
            }
        }
    }
    terms
}

fn words_of(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|ch: char| !ch.is_alphabetic())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

impl GlossaryStore {
    /// Decides whether an utterance is in-domain.
    ///
    /// True when the lowercased text contains a glossary key as a
    /// substring, or mentions any content word drawn from the glossary's
    /// keys and answers. The vocabulary widening keeps the generative path
    /// reachable: with key containment alone, every relevant utterance
    /// would already have a knowledge answer and the model would never be
    /// consulted.
    #[must_use]
    pub fn is_relevant(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        if self.iter().any(|(key, _)| lowered.contains(key)) {
            return true;
        }
        let mentions_term = words_of(&lowered).any(|word| self.domain_terms().contains(&word));
        mentions_term
    }
}
