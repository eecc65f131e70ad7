use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use thiserror::Error;

use crate::relevance::harvest_terms;

/// Errors raised while loading or validating the glossary resource.
/// All variants are fatal configuration errors; a process without a valid
/// glossary must not serve requests.
#[derive(Debug, Error)]
pub enum GlossaryError {
    /// Backing file could not be read.
    #[error("reading glossary {path:?}: {source}")]
    Io {
        /// Resource path.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Backing file is not a flat string-to-string JSON object.
    #[error("glossary {path:?} is not a flat string-to-string JSON object: {source}")]
    Malformed {
        /// Resource path.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// Two keys collide after case normalization.
    #[error("glossary key {key:?} appears more than once after lowercasing")]
    DuplicateKey {
        /// The colliding lowercased key.
        key: String,
    },
    /// The glossary contains no entries.
    #[error("glossary contains no entries")]
    Empty,
}

/// Immutable keyword-to-answer mapping loaded once at startup.
///
/// Keys are lowercased at construction and kept in insertion order; a
/// match-order index sorted longest-key-first makes lookup tie-breaks
/// deterministic instead of inheriting container iteration order.
#[derive(Debug, Clone)]
pub struct GlossaryStore {
    entries: IndexMap<String, String>,
    match_order: Vec<String>,
    domain_terms: HashSet<String>,
}

impl GlossaryStore {
    /// Loads the glossary from a JSON file containing a flat
    /// string-to-string object.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GlossaryError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| GlossaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: IndexMap<String, String> =
            serde_json::from_str(&data).map_err(|source| GlossaryError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_entries(raw)
    }

    /// Builds a glossary from in-memory entries, normalizing keys to
    /// lowercase.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, GlossaryError> {
        let mut normalized = IndexMap::new();
        for (key, answer) in entries {
            let key = key.trim().to_lowercase();
            if normalized.insert(key.clone(), answer).is_some() {
                return Err(GlossaryError::DuplicateKey { key });
            }
        }
        if normalized.is_empty() {
            return Err(GlossaryError::Empty);
        }

        let mut match_order: Vec<String> = normalized.keys().cloned().collect();
        // Stable sort keeps insertion order among equal-length keys.
        match_order.sort_by(|a, b| b.len().cmp(&a.len()));

        let domain_terms = harvest_terms(
            normalized
                .iter()
                .map(|(key, answer)| (key.as_str(), answer.as_str())),
        );

        Ok(Self {
            entries: normalized,
            match_order,
            domain_terms,
        })
    }

    /// Returns the answer stored under an exact lowercased key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the glossary holds no entries. Construction rejects this
    /// state, so it only occurs for a store obtained by other means.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, answer)| (key.as_str(), answer.as_str()))
    }

    /// Keys ordered longest-first for deterministic matching.
    pub(crate) fn match_order(&self) -> &[String] {
        &self.match_order
    }

    pub(crate) fn answer_for(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Content words harvested from keys and answers, for relevance
    /// checking beyond exact key containment.
    pub(crate) fn domain_terms(&self) -> &HashSet<String> {
        &self.domain_terms
    }
}
