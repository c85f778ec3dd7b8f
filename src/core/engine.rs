// src/core/engine.rs — Turn pipeline controller
//
// Drives one submitted question through session bookkeeping, the
// simulated retrieval-reasoning delay, the completion call, the
// progressive reveal, and the post-reveal escalation/suggestion pass.
// Strictly sequential within a turn; a second submission while a turn is
// in flight is rejected. Work in flight is tagged with the epoch and chat
// id it started under, and results whose tag has gone stale are discarded
// instead of being written into a session that superseded them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use super::classifier;
use super::escalation::{EscalationDetector, EscalationPolicy};
use super::reveal::{RevealScheduler, DEFAULT_REVEAL_INTERVAL};
use super::suggestions;
use super::types::{
    EscalationOutcome, Message, TurnEvent, TurnOutcome, TurnPhase, TurnReport,
};
use crate::infra::config::Config;
use crate::infra::errors::TownhallError;
use crate::persona::Persona;
use crate::provider::{CompletionProvider, CompletionRequest};
use crate::session::{Session, SessionStore};

/// Substituted for the reply whenever the gateway fails; the failure is
/// logged, never retried, never surfaced as an error to the user.
pub const GATEWAY_APOLOGY: &str =
    "I apologize, I encountered a technical issue. Please check your API key and try again.";

/// Shown briefly for questions that skip the reasoning simulation.
const PROCESSING_PLACEHOLDER: &str = "Processing your question...";
const PROCESSING_PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub model: String,
    pub temperature: f32,
    pub reveal_interval: Duration,
    pub escalation_policy: EscalationPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            model: crate::provider::openai::DEFAULT_MODEL.into(),
            temperature: crate::provider::DEFAULT_TEMPERATURE,
            reveal_interval: DEFAULT_REVEAL_INTERVAL,
            escalation_policy: EscalationPolicy::default(),
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Result<Self, TownhallError> {
        Ok(Self {
            model: config.model.model.clone(),
            temperature: config.model.temperature,
            reveal_interval: config.reveal.interval(),
            escalation_policy: config.escalation.policy()?,
        })
    }
}

type EventCallback = Box<dyn Fn(TurnEvent) + Send + Sync>;

/// Tag carried by in-flight work so late results can be discarded.
struct TurnToken {
    epoch: u64,
    chat_id: String,
}

pub struct TurnEngine {
    provider: Arc<dyn CompletionProvider>,
    store: Mutex<SessionStore>,
    detector: EscalationDetector,
    persona: Persona,
    settings: EngineSettings,
    rng: Mutex<StdRng>,
    epoch: AtomicU64,
    busy: AtomicBool,
    phase: Mutex<TurnPhase>,
    on_event: Option<EventCallback>,
}

impl TurnEngine {
    pub fn new(provider: Arc<dyn CompletionProvider>, persona: Persona, settings: EngineSettings) -> Self {
        let mut detector = EscalationDetector::new(settings.escalation_policy);
        if let Some(refusal) = &persona.refusal_sentence {
            detector = detector.with_refusal_sentence(refusal.clone());
        }
        Self {
            provider,
            store: Mutex::new(SessionStore::new()),
            detector,
            persona,
            settings,
            rng: Mutex::new(StdRng::from_entropy()),
            epoch: AtomicU64::new(0),
            busy: AtomicBool::new(false),
            phase: Mutex::new(TurnPhase::Idle),
            on_event: None,
        }
    }

    /// Seed the step-padding RNG, for reproducible sequences in tests.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Register a callback for turn lifecycle events.
    pub fn with_event_handler(mut self, cb: impl Fn(TurnEvent) + Send + Sync + 'static) -> Self {
        self.on_event = Some(Box::new(cb));
        self
    }

    pub fn phase(&self) -> TurnPhase {
        *self.lock(&self.phase)
    }

    /// True while a turn is mid-flight; hosts disable input then.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Abandon whatever is active and begin a fresh draft conversation.
    /// Any in-flight turn for the previous chat will discard its results.
    pub fn start_new_chat(&self) -> String {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.lock(&self.store).start_new_chat()
    }

    /// Switch to a persisted session, cancelling in-flight work.
    pub fn select_chat(&self, chat_id: &str) -> Result<(), TownhallError> {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.lock(&self.store).select(chat_id)
    }

    pub fn active_chat_id(&self) -> Option<String> {
        self.lock(&self.store).active_chat_id()
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.lock(&self.store).snapshot()
    }

    pub fn messages(&self, chat_id: &str) -> Vec<Message> {
        self.lock(&self.store).messages(chat_id)
    }

    pub fn last_user_question(&self, chat_id: &str) -> Option<String> {
        self.lock(&self.store).user_questions(chat_id).pop()
    }

    pub fn escalation_sent(&self, chat_id: &str) -> bool {
        self.lock(&self.store).escalation_sent(chat_id)
    }

    /// Record that the host dispatched a hand-off for this session.
    pub fn mark_escalation_sent(&self, chat_id: &str) {
        self.lock(&self.store).mark_escalation_sent(chat_id);
    }

    /// Run one full turn for the active chat (a draft is created when
    /// nothing is active yet).
    pub async fn submit(&self, input: &str) -> Result<TurnOutcome, TownhallError> {
        let question = input.trim().to_string();
        if question.is_empty() {
            return Err(TownhallError::EmptySubmission);
        }

        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| TownhallError::TurnInFlight)?;
        let _reset = PipelineReset { engine: self };

        let chat_id = {
            let mut store = self.lock(&self.store);
            match store.active_chat_id() {
                Some(id) => id,
                None => store.start_new_chat(),
            }
        };
        let token = TurnToken {
            epoch: self.epoch.load(Ordering::SeqCst),
            chat_id: chat_id.clone(),
        };

        self.lock(&self.store).append_user(&chat_id, &question);

        let max_tokens = classifier::token_budget(&question);

        if classifier::should_show_reasoning(&question) {
            self.set_phase(TurnPhase::Stepping);
            let plan = {
                let mut rng = self.lock(&self.rng);
                classifier::plan(&question, &mut *rng)
            };
            for step in &plan.steps {
                self.emit(TurnEvent::ReasoningStep { text: step.clone() });
                let jitter = {
                    let mut rng = self.lock(&self.rng);
                    plan.timing.jitter.mul_f64(rng.gen::<f64>())
                };
                sleep(plan.timing.base + jitter).await;
                if self.is_stale(&token) {
                    return Ok(TurnOutcome::Cancelled);
                }
            }
            self.emit(TurnEvent::ReasoningDone);
        } else {
            self.emit(TurnEvent::ReasoningStep {
                text: PROCESSING_PLACEHOLDER.to_string(),
            });
            sleep(PROCESSING_PAUSE).await;
            if self.is_stale(&token) {
                return Ok(TurnOutcome::Cancelled);
            }
            self.emit(TurnEvent::ReasoningDone);
        }

        self.set_phase(TurnPhase::AwaitingReply);
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            system: self.persona.system_prompt.clone(),
            user_message: question.clone(),
            max_tokens,
            temperature: self.settings.temperature,
        };
        let (reply, gateway_failed) = match self.provider.complete(request).await {
            Ok(completion) => (completion.content, false),
            Err(e) => {
                tracing::warn!(error = %e, "completion gateway failed, substituting apology");
                (GATEWAY_APOLOGY.to_string(), true)
            }
        };
        if self.is_stale(&token) {
            return Ok(TurnOutcome::Cancelled);
        }

        let message_id = {
            let mut store = self.lock(&self.store);
            let msg = store.append_assistant(&chat_id, &reply);
            // The draft earns its slot on the first successful reply; an
            // apology turn does not promote.
            if !gateway_failed {
                store.promote(&chat_id);
            }
            msg.id
        };
        self.emit(TurnEvent::ReplyStarted {
            message_id: message_id.clone(),
        });

        self.set_phase(TurnPhase::Revealing);
        let mut reveal = RevealScheduler::new(&reply, self.settings.reveal_interval);
        while let Some(chunk) = reveal.next_chunk() {
            self.emit(TurnEvent::RevealChunk {
                message_id: message_id.clone(),
                chunk,
            });
            sleep(reveal.interval()).await;
            if self.is_stale(&token) {
                return Ok(TurnOutcome::Cancelled);
            }
        }
        if reveal.complete() {
            self.lock(&self.store).finish_reveal(&chat_id, &message_id);
            self.emit(TurnEvent::RevealDone {
                message_id: message_id.clone(),
            });
        }

        // Escalation and suggestions run only once the reveal finished,
        // so affordances never appear mid-reveal.
        let mut escalation = EscalationOutcome::default();
        let mut follow_ups = Vec::new();
        if !gateway_failed {
            let messages = self.lock(&self.store).messages(&chat_id);
            escalation = self.detector.evaluate(&messages);
            if escalation.needs_escalation {
                self.lock(&self.store).flag_escalation(&chat_id, &message_id);
                self.emit(TurnEvent::EscalationFlagged {
                    message_id: message_id.clone(),
                    trigger: escalation.trigger.clone(),
                });
            } else {
                let prior = self.lock(&self.store).user_questions(&chat_id);
                follow_ups = suggestions::follow_ups(&reply, &prior);
                if !follow_ups.is_empty() {
                    self.emit(TurnEvent::SuggestionsReady {
                        items: follow_ups.clone(),
                    });
                }
            }
        }

        Ok(TurnOutcome::Completed(TurnReport {
            chat_id,
            message_id,
            reply,
            needs_escalation: escalation.needs_escalation,
            escalation_trigger: escalation.trigger,
            suggestions: follow_ups,
            gateway_failed,
        }))
    }

    fn is_stale(&self, token: &TurnToken) -> bool {
        if self.epoch.load(Ordering::SeqCst) != token.epoch {
            return true;
        }
        self.lock(&self.store).active_chat_id().as_deref() != Some(token.chat_id.as_str())
    }

    fn set_phase(&self, phase: TurnPhase) {
        *self.lock(&self.phase) = phase;
    }

    fn emit(&self, event: TurnEvent) {
        if let Some(cb) = &self.on_event {
            cb(event);
        }
    }

    /// Lock helper that shrugs off poisoning; none of the guarded state
    /// can be left in a torn shape by a panicking reader.
    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Resets the pipeline to Idle however a submission ends: completion,
/// cancellation, or a gateway error path.
struct PipelineReset<'a> {
    engine: &'a TurnEngine,
}

impl Drop for PipelineReset<'_> {
    fn drop(&mut self) {
        self.engine.set_phase(TurnPhase::Idle);
        self.engine.busy.store(false, Ordering::SeqCst);
    }
}
