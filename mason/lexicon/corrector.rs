use strsim::levenshtein;
use thiserror::Error;

use crate::vocabulary::Vocabulary;

/// Longest token the corrector will attempt to repair.
const MAX_TOKEN_LEN: usize = 24;

/// Errors raised by spell correctors. Callers must treat these as
/// non-fatal and fall back to the uncorrected text.
#[derive(Debug, Error)]
pub enum CorrectionError {
    /// The corrector has no vocabulary to correct against.
    #[error("correction vocabulary is empty")]
    EmptyVocabulary,
}

/// Maps raw input text to a corrected text.
pub trait SpellCorrector: Send + Sync {
    /// Produces a corrected rendition of `text`.
    fn correct(&self, text: &str) -> Result<String, CorrectionError>;
}

/// Corrector that repairs tokens to the nearest vocabulary word by edit
/// distance.
///
/// Tokens already in the vocabulary, tokens shorter than three characters,
/// and tokens outside every word's distance budget pass through unchanged,
/// so out-of-domain phrasing is never mangled.
#[derive(Debug, Clone)]
pub struct LexiconCorrector {
    vocabulary: Vocabulary,
}

impl LexiconCorrector {
    /// Creates a corrector over the given vocabulary.
    #[must_use]
    pub const fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Read access to the underlying vocabulary.
    #[must_use]
    pub const fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn correct_token(&self, token: &str) -> Option<String> {
        if token.len() < 3 || token.len() > MAX_TOKEN_LEN {
            return None;
        }
        let lowered = token.to_lowercase();
        if self.vocabulary.contains(&lowered) {
            return None;
        }

        let budget = if lowered.chars().count() <= 4 { 1 } else { 2 };
        let mut best: Option<(usize, usize, &str)> = None;
        for (word, frequency) in self.vocabulary.iter() {
            let distance = levenshtein(&lowered, word);
            if distance == 0 || distance > budget {
                continue;
            }
            let better = match best {
                None => true,
                Some((best_distance, best_frequency, _)) => {
                    distance < best_distance
                        || (distance == best_distance && frequency > best_frequency)
                }
            };
            if better {
                best = Some((distance, frequency, word));
            }
        }

        best.map(|(_, _, word)| restore_case(token, word))
    }
}

impl SpellCorrector for LexiconCorrector {
    fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        if self.vocabulary.is_empty() {
            return Err(CorrectionError::EmptyVocabulary);
        }

        let mut corrected = String::with_capacity(text.len());
        let mut token = String::new();
        for ch in text.chars() {
            if ch.is_alphabetic() {
                token.push(ch);
            } else {
                flush_token(&mut corrected, &mut token, self);
                corrected.push(ch);
            }
        }
        flush_token(&mut corrected, &mut token, self);
        Ok(corrected)
    }
}

fn flush_token(out: &mut String, token: &mut String, corrector: &LexiconCorrector) {
    if token.is_empty() {
        return;
    }
    match corrector.correct_token(token) {
        Some(replacement) => out.push_str(&replacement),
        None => out.push_str(token),
    }
    token.clear();
}

fn restore_case(original: &str, replacement: &str) -> String {
    if original.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = replacement.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    } else {
        replacement.to_string()
    }
}
