use crate::store::GlossaryStore;

impl GlossaryStore {
    /// Returns the canned answer of the first glossary key found as a
    /// substring of the lowercased input, or `None` when nothing matches.
    ///
    /// Candidates are scanned longest-key-first so the most specific entry
    /// wins when several keys are present in the same utterance. Keys match
    /// anywhere in the text, not at word boundaries, so very short keys can
    /// match inside unrelated words; glossary curation is expected to avoid
    /// stop-word-sized keys.
    #[must_use]
    pub fn lookup(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        self.match_order()
            .iter()
            .find(|key| text.contains(key.as_str()))
            .and_then(|key| self.answer_for(key))
    }
}

#[cfg(test)]
mod tests {
    use crate::store::GlossaryStore;

    fn store() -> GlossaryStore {
        GlossaryStore::from_entries(vec![
            ("cement".to_string(), "Cement is a binding material.".to_string()),
            (
                "cement grade".to_string(),
                "Cement grades denote compressive strength.".to_string(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn matches_key_as_substring() {
        assert_eq!(
            store().lookup("what is cement"),
            Some("Cement is a binding material.")
        );
    }

    #[test]
    fn longest_key_wins_when_several_match() {
        assert_eq!(
            store().lookup("which cement grade should I use"),
            Some("Cement grades denote compressive strength.")
        );
    }

    #[test]
    fn no_match_returns_none() {
        assert_eq!(store().lookup("explain IS 456 mix design"), None);
    }

    #[test]
    fn lookup_is_case_insensitive_and_idempotent() {
        let store = store();
        let first = store.lookup("WHAT IS CEMENT");
        let second = store.lookup("WHAT IS CEMENT");
        assert_eq!(first, Some("Cement is a binding material."));
        assert_eq!(first, second);
    }
}
