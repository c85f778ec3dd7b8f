// src/core/escalation.rs — Human-escalation classifier
//
// Inspects a finished assistant reply (and, under the conversation-window
// policy, the recent exchange history) and decides whether the automated
// answer is insufficient. The detector only classifies; dispatching the
// hand-off is the host's job.

use serde::Deserialize;

use super::types::{EscalationOutcome, Message, Role};

/// Assistant phrasing that signals the model is hedging.
const UNCERTAINTY_PHRASES: &[&str] = &[
    "i'm not sure",
    "i don't have specific",
    "unclear",
    "i apologize, i don't have",
    "i don't have access to",
    "would need to check",
    "specific details aren't available",
    "i'd recommend contacting",
];

/// User phrasing that asks for details the persona likely can't supply.
const SPECIFICITY_PHRASES: &[&str] = &[
    "specific",
    "exactly",
    "exact date",
    "precise",
    "what time",
    "which date",
    "how much",
    "phone number",
    "email address",
    "contact information",
];

/// Topical vocabulary used for repeated-topic tracking, first match wins.
const TOPIC_KEYWORDS: &[&str] = &[
    "housing",
    "transportation",
    "great park",
    "budget",
    "development",
    "bike lanes",
    "shuttle",
    "policy",
    "meeting",
    "council",
    "vote",
    "ordinance",
];

/// How many trailing messages the conversation-window policy scans.
const WINDOW: usize = 6;

/// Minimum messages (two full exchanges) before the window policy fires.
const MIN_WINDOW_MESSAGES: usize = 4;

/// The two observed escalation policies. They produce materially different
/// false-positive rates, so the choice is a configuration knob rather than
/// a hard-coded merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EscalationPolicy {
    /// Uncertainty in a recent assistant message AND the same user topic
    /// repeated at least twice within the last [`WINDOW`] messages.
    #[default]
    ConversationWindow,
    /// Uncertainty in the latest assistant message OR specificity-seeking
    /// phrasing in the latest user message.
    LastTurn,
}

#[derive(Debug, Clone)]
pub struct EscalationDetector {
    policy: EscalationPolicy,
    /// Canonical refusal sentence for strict personas. When set, a reply
    /// trim-equal to it escalates before any phrase heuristic runs.
    refusal_sentence: Option<String>,
}

impl EscalationDetector {
    pub fn new(policy: EscalationPolicy) -> Self {
        Self {
            policy,
            refusal_sentence: None,
        }
    }

    pub fn with_refusal_sentence(mut self, sentence: impl Into<String>) -> Self {
        self.refusal_sentence = Some(sentence.into());
        self
    }

    /// Classify the conversation as it stands after the latest assistant
    /// reply. Only the latest reply is ever flagged; earlier messages are
    /// never retroactively altered.
    pub fn evaluate(&self, messages: &[Message]) -> EscalationOutcome {
        let Some(last_assistant) = messages.iter().rev().find(|m| m.role == Role::Assistant)
        else {
            return EscalationOutcome::default();
        };

        // Exact-match refusal takes precedence over the phrase heuristics.
        if let Some(refusal) = &self.refusal_sentence {
            if last_assistant.content.trim() == refusal.trim() {
                return EscalationOutcome {
                    needs_escalation: true,
                    trigger: Some(refusal.trim().to_string()),
                };
            }
        }

        match self.policy {
            EscalationPolicy::ConversationWindow => self.evaluate_window(messages),
            EscalationPolicy::LastTurn => self.evaluate_last_turn(messages),
        }
    }

    fn evaluate_window(&self, messages: &[Message]) -> EscalationOutcome {
        if messages.len() < MIN_WINDOW_MESSAGES {
            return EscalationOutcome::default();
        }

        let start = messages.len().saturating_sub(WINDOW);
        let recent = &messages[start..];

        let uncertainty = recent
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .find_map(|m| uncertainty_phrase(&m.content));

        let Some(phrase) = uncertainty else {
            return EscalationOutcome::default();
        };

        // Count how often each extracted topic recurs in the user turns.
        let topics: Vec<&str> = recent
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| extract_topic(&m.content))
            .collect();
        let repeated = topics
            .iter()
            .any(|t| topics.iter().filter(|x| *x == t).count() >= 2);

        if repeated {
            EscalationOutcome {
                needs_escalation: true,
                trigger: Some(phrase.to_string()),
            }
        } else {
            EscalationOutcome::default()
        }
    }

    fn evaluate_last_turn(&self, messages: &[Message]) -> EscalationOutcome {
        let last_assistant = messages.iter().rev().find(|m| m.role == Role::Assistant);
        let last_user = messages.iter().rev().find(|m| m.role == Role::User);

        if let Some(phrase) = last_assistant.and_then(|m| uncertainty_phrase(&m.content)) {
            return EscalationOutcome {
                needs_escalation: true,
                trigger: Some(phrase.to_string()),
            };
        }

        if let Some(phrase) = last_user.and_then(|m| specificity_phrase(&m.content)) {
            return EscalationOutcome {
                needs_escalation: true,
                trigger: Some(phrase.to_string()),
            };
        }

        EscalationOutcome::default()
    }
}

fn uncertainty_phrase(content: &str) -> Option<&'static str> {
    let lower = content.to_lowercase();
    UNCERTAINTY_PHRASES
        .iter()
        .find(|p| lower.contains(*p))
        .copied()
}

fn specificity_phrase(content: &str) -> Option<&'static str> {
    let lower = content.to_lowercase();
    SPECIFICITY_PHRASES
        .iter()
        .find(|p| lower.contains(*p))
        .copied()
}

/// First matching keyword from the topical vocabulary, else "general".
pub fn extract_topic(content: &str) -> &'static str {
    let lower = content.to_lowercase();
    TOPIC_KEYWORDS
        .iter()
        .find(|k| lower.contains(*k))
        .copied()
        .unwrap_or("general")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Message;

    fn exchange(pairs: &[(&str, &str)]) -> Vec<Message> {
        let mut out = Vec::new();
        for (q, a) in pairs {
            out.push(Message::user(*q));
            out.push(Message::assistant(*a));
        }
        out
    }

    #[test]
    fn test_window_needs_two_exchanges() {
        let d = EscalationDetector::new(EscalationPolicy::ConversationWindow);
        let msgs = exchange(&[("housing timeline?", "I'm not sure about that.")]);
        assert!(!d.evaluate(&msgs).needs_escalation);
    }

    #[test]
    fn test_window_uncertainty_and_repeated_topic() {
        let d = EscalationDetector::new(EscalationPolicy::ConversationWindow);
        let msgs = exchange(&[
            ("what about housing?", "We have several initiatives underway."),
            ("when will housing open?", "I'm not sure about the exact dates."),
        ]);
        let out = d.evaluate(&msgs);
        assert!(out.needs_escalation);
        assert_eq!(out.trigger.as_deref(), Some("i'm not sure"));
    }

    #[test]
    fn test_window_uncertainty_without_repeat_is_quiet() {
        let d = EscalationDetector::new(EscalationPolicy::ConversationWindow);
        let msgs = exchange(&[
            ("what about housing?", "We have several initiatives underway."),
            ("and the shuttle?", "I'm not sure about the exact dates."),
        ]);
        assert!(!d.evaluate(&msgs).needs_escalation);
    }

    #[test]
    fn test_window_repeat_without_uncertainty_is_quiet() {
        let d = EscalationDetector::new(EscalationPolicy::ConversationWindow);
        let msgs = exchange(&[
            ("what about housing?", "Several initiatives are underway."),
            ("when will housing open?", "Phase one opens next spring."),
        ]);
        assert!(!d.evaluate(&msgs).needs_escalation);
    }

    #[test]
    fn test_last_turn_fires_on_single_exchange() {
        let d = EscalationDetector::new(EscalationPolicy::LastTurn);
        let msgs = exchange(&[("housing timeline?", "I'd recommend contacting the city clerk.")]);
        let out = d.evaluate(&msgs);
        assert!(out.needs_escalation);
        assert_eq!(out.trigger.as_deref(), Some("i'd recommend contacting"));
    }

    #[test]
    fn test_last_turn_fires_on_specific_question() {
        let d = EscalationDetector::new(EscalationPolicy::LastTurn);
        let msgs = exchange(&[(
            "What is the exact date of the vote?",
            "The council will take it up soon.",
        )]);
        assert!(d.evaluate(&msgs).needs_escalation);
    }

    #[test]
    fn test_last_turn_quiet_on_plain_exchange() {
        let d = EscalationDetector::new(EscalationPolicy::LastTurn);
        let msgs = exchange(&[("how are bike lanes going?", "Construction starts this fall.")]);
        assert!(!d.evaluate(&msgs).needs_escalation);
    }

    #[test]
    fn test_refusal_exact_match_escalates() {
        let refusal = "I don't have that information, please contact my team directly.";
        let d = EscalationDetector::new(EscalationPolicy::ConversationWindow)
            .with_refusal_sentence(refusal);
        let msgs = exchange(&[("who won the 1987 vote?", refusal)]);
        let out = d.evaluate(&msgs);
        assert!(out.needs_escalation);
        assert_eq!(out.trigger.as_deref(), Some(refusal));
    }

    #[test]
    fn test_refusal_match_is_trimmed() {
        let refusal = "I don't have that information, please contact my team directly.";
        let d =
            EscalationDetector::new(EscalationPolicy::LastTurn).with_refusal_sentence(refusal);
        let msgs = exchange(&[("hm?", "  I don't have that information, please contact my team directly.  ")]);
        assert!(d.evaluate(&msgs).needs_escalation);
    }

    #[test]
    fn test_refusal_superstring_does_not_exact_match() {
        let refusal = "I don't have that information, please contact my team directly.";
        let d = EscalationDetector::new(EscalationPolicy::ConversationWindow)
            .with_refusal_sentence(refusal);
        // One extra trailing word: not an exact match, and the window
        // policy needs two exchanges, so nothing fires.
        let msgs = exchange(&[(
            "who won the 1987 vote?",
            "I don't have that information, please contact my team directly. Sorry!",
        )]);
        assert!(!d.evaluate(&msgs).needs_escalation);
    }

    #[test]
    fn test_extract_topic_first_match_and_default() {
        assert_eq!(extract_topic("the housing and budget mess"), "housing");
        assert_eq!(extract_topic("tell me a joke"), "general");
    }

    #[test]
    fn test_empty_conversation() {
        let d = EscalationDetector::new(EscalationPolicy::LastTurn);
        assert!(!d.evaluate(&[]).needs_escalation);
    }
}
