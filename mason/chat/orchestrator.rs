use std::sync::Arc;

use serde::{Deserialize, Serialize};

use mason_glossary::GlossaryStore;
use mason_lexicon::SpellCorrector;
use mason_responder::ModelResponder;

use crate::{history::ChatHistory, prompt::build_prompt, telemetry::ChatTelemetry};

/// Fixed refusal shown for out-of-domain questions.
pub const REFUSAL: &str = "Sorry, I only answer construction-related questions.";

/// States visited while deciding a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrchestratorState {
    /// Waiting for input.
    Idle,
    /// Running the spell corrector.
    SpellChecking,
    /// Evaluating the relevance filter.
    FilteringRelevance,
    /// Out-of-domain input refused.
    Refused,
    /// Scanning the glossary for a canned answer.
    LookingUpKnowledge,
    /// A glossary entry answered the question.
    KnowledgeAnswered,
    /// Falling through to the generative model.
    Generating,
    /// Terminal state.
    Done,
}

impl OrchestratorState {
    /// Returns human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SpellChecking => "spell_checking",
            Self::FilteringRelevance => "filtering_relevance",
            Self::Refused => "refused",
            Self::LookingUpKnowledge => "looking_up_knowledge",
            Self::KnowledgeAnswered => "knowledge_answered",
            Self::Generating => "generating",
            Self::Done => "done",
        }
    }
}

/// Which branch produced the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Out-of-domain refusal.
    Refused,
    /// Verbatim glossary answer.
    Knowledge,
    /// Generated by the language model.
    Generated,
    /// Model failed; the apology was substituted.
    ModelRecovered,
}

impl Resolution {
    /// Returns human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Refused => "refused",
            Self::Knowledge => "knowledge",
            Self::Generated => "generated",
            Self::ModelRecovered => "model_recovered",
        }
    }
}

/// Result of one orchestrated exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatOutcome {
    /// User-visible reply.
    pub reply: String,
    /// Informational "did you mean" message; never persisted as a turn.
    pub advisory: Option<String>,
    /// Branch that produced the reply.
    pub resolution: Resolution,
    /// States visited, in order.
    pub trace: Vec<OrchestratorState>,
}

/// Turns one raw utterance plus read-only history into one reply.
///
/// Pipeline: spell-correct, filter relevance, attempt knowledge lookup,
/// else prompt the generative model. Collaborators are injected at
/// construction; the orchestrator holds no mutable state.
#[derive(Clone)]
pub struct ResponseOrchestrator {
    glossary: GlossaryStore,
    corrector: Arc<dyn SpellCorrector>,
    responder: ModelResponder,
    telemetry: Option<ChatTelemetry>,
}

impl std::fmt::Debug for ResponseOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseOrchestrator")
            .field("glossary_entries", &self.glossary.len())
            .finish_non_exhaustive()
    }
}

impl ResponseOrchestrator {
    /// Creates an orchestrator over the injected collaborators.
    #[must_use]
    pub fn new(
        glossary: GlossaryStore,
        corrector: Arc<dyn SpellCorrector>,
        responder: ModelResponder,
    ) -> Self {
        Self {
            glossary,
            corrector,
            responder,
            telemetry: None,
        }
    }

    /// Attaches telemetry recording each exchange.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: ChatTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Decides the reply for one submitted utterance.
    ///
    /// Corrector failure falls back to the raw text; model failure is
    /// absorbed by the responder. Neither ever escapes as an error.
    pub async fn respond(&self, raw: &str, history: &ChatHistory) -> ChatOutcome {
        let mut trace = vec![OrchestratorState::Idle, OrchestratorState::SpellChecking];

        let corrected = self
            .corrector
            .correct(raw)
            .unwrap_or_else(|_| raw.to_string());
        let advisory = (corrected.to_lowercase() != raw.to_lowercase())
            .then(|| format!("did you mean: {corrected}"));

        trace.push(OrchestratorState::FilteringRelevance);
        let outcome = if self.glossary.is_relevant(&corrected) {
            trace.push(OrchestratorState::LookingUpKnowledge);
            if let Some(answer) = self.glossary.lookup(&corrected) {
                trace.push(OrchestratorState::KnowledgeAnswered);
                trace.push(OrchestratorState::Done);
                ChatOutcome {
                    reply: answer.to_string(),
                    advisory,
                    resolution: Resolution::Knowledge,
                    trace,
                }
            } else {
                trace.push(OrchestratorState::Generating);
                let prompt = build_prompt(history, &corrected);
                let reply = self.responder.respond(&prompt).await;
                trace.push(OrchestratorState::Done);
                ChatOutcome {
                    reply: reply.text,
                    advisory,
                    resolution: if reply.recovered {
                        Resolution::ModelRecovered
                    } else {
                        Resolution::Generated
                    },
                    trace,
                }
            }
        } else {
            trace.push(OrchestratorState::Refused);
            trace.push(OrchestratorState::Done);
            ChatOutcome {
                reply: REFUSAL.to_string(),
                advisory,
                resolution: Resolution::Refused,
                trace,
            }
        };

        if let Some(telemetry) = &self.telemetry {
            if let Err(err) = telemetry.record_exchange(&outcome).await {
                eprintln!("chat telemetry failed: {err:?}");
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::runtime::Runtime;

    use mason_lexicon::{CorrectionError, LexiconCorrector, Vocabulary};
    use mason_responder::{GenerateRequest, ModelBackend, ModelError, APOLOGY};

    /// Backend that counts invocations and optionally fails.
    struct CountingBackend {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl ModelBackend for CountingBackend {
        async fn generate(&self, request: GenerateRequest) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ModelError::Transport("backend down".into()));
            }
            Ok(format!("generated for: {}", request.prompt))
        }
    }

    struct BrokenCorrector;

    impl SpellCorrector for BrokenCorrector {
        fn correct(&self, _text: &str) -> Result<String, CorrectionError> {
            Err(CorrectionError::EmptyVocabulary)
        }
    }

    fn glossary() -> GlossaryStore {
        GlossaryStore::from_entries(vec![(
            "cement".to_string(),
            "Cement is a binding material used in concrete structures.".to_string(),
        )])
        .unwrap()
    }

    fn corrector(store: &GlossaryStore) -> Arc<dyn SpellCorrector> {
        let texts: Vec<String> = store
            .iter()
            .flat_map(|(key, answer)| [key.to_string(), answer.to_string()])
            .collect();
        Arc::new(LexiconCorrector::new(Vocabulary::from_texts(texts)))
    }

    fn orchestrator(fail: bool) -> (ResponseOrchestrator, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = glossary();
        let corrector = corrector(&store);
        let responder = ModelResponder::new(Arc::new(CountingBackend {
            calls: calls.clone(),
            fail,
        }));
        (
            ResponseOrchestrator::new(store, corrector, responder),
            calls,
        )
    }

    #[test]
    fn misspelled_knowledge_question_is_corrected_and_answered() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let (orchestrator, calls) = orchestrator(false);
            let outcome = orchestrator.respond("what is cemant", &ChatHistory::new()).await;

            assert_eq!(
                outcome.reply,
                "Cement is a binding material used in concrete structures."
            );
            assert_eq!(
                outcome.advisory.as_deref(),
                Some("did you mean: what is cement")
            );
            assert_eq!(outcome.resolution, Resolution::Knowledge);
            assert_eq!(calls.load(Ordering::SeqCst), 0);
            assert!(outcome.trace.contains(&OrchestratorState::KnowledgeAnswered));
        });
    }

    #[test]
    fn out_of_domain_question_is_refused_without_model_call() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let (orchestrator, calls) = orchestrator(false);
            let outcome = orchestrator
                .respond("what's the weather today", &ChatHistory::new())
                .await;

            assert_eq!(outcome.reply, REFUSAL);
            assert_eq!(outcome.advisory, None);
            assert_eq!(outcome.resolution, Resolution::Refused);
            assert_eq!(calls.load(Ordering::SeqCst), 0);
            assert!(outcome.trace.contains(&OrchestratorState::Refused));
            assert!(!outcome.trace.contains(&OrchestratorState::LookingUpKnowledge));
        });
    }

    #[test]
    fn relevant_question_without_knowledge_match_reaches_the_model() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let (orchestrator, calls) = orchestrator(false);
            let mut history = ChatHistory::new();
            history.push(crate::history::Speaker::User, "hello");

            // "concrete" appears only in the answer text, so relevance
            // passes while no key matches.
            let outcome = orchestrator
                .respond("explain the concrete slab curing schedule", &history)
                .await;

            assert_eq!(outcome.resolution, Resolution::Generated);
            assert_eq!(calls.load(Ordering::SeqCst), 1);
            assert!(outcome.reply.starts_with("generated for: You are a civil engineer expert."));
            assert!(outcome.reply.contains("User: explain the concrete slab curing schedule"));
            assert!(outcome.trace.contains(&OrchestratorState::Generating));
        });
    }

    #[test]
    fn model_failure_degrades_to_the_apology() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let (orchestrator, calls) = orchestrator(true);
            let outcome = orchestrator
                .respond("explain the concrete slab curing schedule", &ChatHistory::new())
                .await;

            assert_eq!(outcome.reply, APOLOGY);
            assert_eq!(outcome.resolution, Resolution::ModelRecovered);
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        });
    }

    #[test]
    fn corrector_failure_falls_back_to_raw_text() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let calls = Arc::new(AtomicUsize::new(0));
            let responder = ModelResponder::new(Arc::new(CountingBackend {
                calls: calls.clone(),
                fail: false,
            }));
            let orchestrator =
                ResponseOrchestrator::new(glossary(), Arc::new(BrokenCorrector), responder);

            let outcome = orchestrator.respond("what is cement", &ChatHistory::new()).await;

            assert_eq!(
                outcome.reply,
                "Cement is a binding material used in concrete structures."
            );
            assert_eq!(outcome.advisory, None);
            assert_eq!(calls.load(Ordering::SeqCst), 0);
        });
    }
}
