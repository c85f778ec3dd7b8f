// src/core/types.rs — Core domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One message in a conversation. Immutable once created except for the
/// two transient flags: `revealing` is cleared exactly once when the
/// progressive reveal finishes, `needs_escalation` is set at most once
/// and never cleared within the same session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub revealing: bool,
    pub needs_escalation: bool,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            created_at: Utc::now(),
            revealing: false,
            needs_escalation: false,
        }
    }

    /// Assistant messages start mid-reveal; the reveal loop clears the flag.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: content.into(),
            created_at: Utc::now(),
            revealing: true,
            needs_escalation: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Where the pipeline currently is for the active session. Input must be
/// rejected in every state except `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Stepping,
    AwaitingReply,
    Revealing,
}

/// Perceived complexity of a question, shared between the reasoning gate
/// and the per-step delay tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryComplexity {
    Greeting,
    Simple,
    Moderate,
    Comprehensive,
}

/// Per-step delay range for the reasoning simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTiming {
    pub base: Duration,
    pub jitter: Duration,
}

/// The canned steps selected for one question, plus how long each one is
/// held on screen. Recomputed per submission, never persisted.
#[derive(Debug, Clone)]
pub struct ReasoningPlan {
    pub steps: Vec<String>,
    pub timing: StepTiming,
}

/// Result of the escalation classifier for one assistant reply.
#[derive(Debug, Clone, Default)]
pub struct EscalationOutcome {
    pub needs_escalation: bool,
    /// The literal phrase that tripped the classifier, when one did.
    pub trigger: Option<String>,
}

/// Lifecycle notifications emitted while a turn runs, for a host UI to
/// render. Ordering within one turn is guaranteed: reasoning steps, then
/// reply start, then reveal chunks, then reveal done, then escalation and
/// suggestions.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    ReasoningStep { text: String },
    ReasoningDone,
    ReplyStarted { message_id: String },
    RevealChunk { message_id: String, chunk: char },
    RevealDone { message_id: String },
    EscalationFlagged { message_id: String, trigger: Option<String> },
    SuggestionsReady { items: Vec<String> },
}

/// What a completed submission produced.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub chat_id: String,
    pub message_id: String,
    pub reply: String,
    pub needs_escalation: bool,
    pub escalation_trigger: Option<String>,
    pub suggestions: Vec<String>,
    /// True when the reply is the fixed apology substituted for a gateway
    /// failure.
    pub gateway_failed: bool,
}

/// A submission either runs to completion or is abandoned because the
/// host switched sessions while it was in flight. Cancelled turns have
/// written nothing into the session that superseded them.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    Completed(TurnReport),
    Cancelled,
}

impl TurnOutcome {
    pub fn report(&self) -> Option<&TurnReport> {
        match self {
            TurnOutcome::Completed(r) => Some(r),
            TurnOutcome::Cancelled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_defaults() {
        let m = Message::user("What are your housing plans?");
        assert_eq!(m.role, Role::User);
        assert!(!m.revealing);
        assert!(!m.needs_escalation);
        assert!(!m.id.is_empty());
    }

    #[test]
    fn test_assistant_message_starts_revealing() {
        let m = Message::assistant("We are expanding the shuttle.");
        assert_eq!(m.role, Role::Assistant);
        assert!(m.revealing);
    }

    #[test]
    fn test_message_ids_unique() {
        let a = Message::user("one");
        let b = Message::user("one");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_outcome_report_accessor() {
        assert!(TurnOutcome::Cancelled.report().is_none());
    }
}
