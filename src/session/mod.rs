// src/session/mod.rs — Session bookkeeping
//
// Owns the list of chat sessions and the ephemeral draft conversation
// that precedes a session's first completed exchange. Every mutation of
// the session list is a whole-list replacement, so a snapshot handed to a
// reader is never seen mid-update. Nothing outside this module mutates
// Message or Session state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::{Message, Role};
use crate::infra::errors::TownhallError;
use crate::util::ellipsize;

/// Titles keep at most this many characters of the first user message.
const TITLE_LEN: usize = 30;

const UNTITLED: &str = "New Chat";

/// A persisted conversation. Messages are append-only; the title is
/// assigned exactly once, at promotion, and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub last_modified: DateTime<Utc>,
    pub archived: bool,
    pub escalation_sent: bool,
}

/// A conversation that has not yet earned a slot in the session list.
#[derive(Debug, Clone)]
struct Draft {
    id: String,
    messages: Vec<Message>,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Vec<Session>,
    draft: Option<Draft>,
    active: Option<String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a fresh draft conversation and make it active. Any previous
    /// draft that never completed an exchange is discarded.
    pub fn start_new_chat(&mut self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.draft = Some(Draft {
            id: id.clone(),
            messages: Vec::new(),
        });
        self.active = Some(id.clone());
        id
    }

    /// Switch to an existing session. Drops the current draft.
    pub fn select(&mut self, chat_id: &str) -> Result<(), TownhallError> {
        if !self.sessions.iter().any(|s| s.id == chat_id) {
            return Err(TownhallError::UnknownChat {
                id: chat_id.to_string(),
            });
        }
        self.draft = None;
        self.active = Some(chat_id.to_string());
        Ok(())
    }

    pub fn active_chat_id(&self) -> Option<String> {
        self.active.clone()
    }

    /// Read-only view of the session list, most recent first.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// An owned copy for readers that outlive the borrow.
    pub fn snapshot(&self) -> Vec<Session> {
        self.sessions.clone()
    }

    pub fn is_draft(&self, chat_id: &str) -> bool {
        self.draft.as_ref().is_some_and(|d| d.id == chat_id)
    }

    /// Messages for a chat, whether drafted or persisted.
    pub fn messages(&self, chat_id: &str) -> Vec<Message> {
        if let Some(d) = self.draft.as_ref().filter(|d| d.id == chat_id) {
            return d.messages.clone();
        }
        self.sessions
            .iter()
            .find(|s| s.id == chat_id)
            .map(|s| s.messages.clone())
            .unwrap_or_default()
    }

    /// Every user question asked so far in a chat, in order.
    pub fn user_questions(&self, chat_id: &str) -> Vec<String> {
        self.messages(chat_id)
            .into_iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content)
            .collect()
    }

    /// Append a user message to the draft or the persisted session that
    /// owns `chat_id`. Returns the stored message.
    pub fn append_user(&mut self, chat_id: &str, content: &str) -> Message {
        let msg = Message::user(content);
        self.append(chat_id, msg.clone());
        msg
    }

    /// Append an assistant message (reveal-in-progress).
    pub fn append_assistant(&mut self, chat_id: &str, content: &str) -> Message {
        let msg = Message::assistant(content);
        self.append(chat_id, msg.clone());
        msg
    }

    fn append(&mut self, chat_id: &str, msg: Message) {
        if let Some(d) = self.draft.as_mut().filter(|d| d.id == chat_id) {
            d.messages.push(msg);
            return;
        }
        self.update_session(chat_id, |s| {
            s.messages.push(msg.clone());
            s.last_modified = Utc::now();
        });
    }

    /// Move the draft into the session list. Called after the first
    /// successful assistant reply; idempotent — a chat id already in the
    /// list is never duplicated, and a re-entrant call just drops the
    /// stale draft. Returns true when a new entry was created.
    pub fn promote(&mut self, chat_id: &str) -> bool {
        if self.sessions.iter().any(|s| s.id == chat_id) {
            if self.draft.as_ref().is_some_and(|d| d.id == chat_id) {
                self.draft = None;
            }
            return false;
        }

        let draft = match self.draft.take() {
            Some(d) if d.id == chat_id => d,
            other => {
                self.draft = other;
                return false;
            }
        };

        let title = draft
            .messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| ellipsize(&m.content, TITLE_LEN))
            .unwrap_or_else(|| UNTITLED.to_string());

        let session = Session {
            id: draft.id,
            title,
            messages: draft.messages,
            last_modified: Utc::now(),
            archived: false,
            escalation_sent: false,
        };

        // Whole-list replacement, newest first.
        let mut next = Vec::with_capacity(self.sessions.len() + 1);
        next.push(session);
        next.extend(self.sessions.drain(..));
        self.sessions = next;
        true
    }

    /// Clear a message's reveal-in-progress flag. Returns true only when
    /// the flag was actually set; a second call is a no-op.
    pub fn finish_reveal(&mut self, chat_id: &str, message_id: &str) -> bool {
        let mut changed = false;
        self.update_message(chat_id, message_id, |m| {
            if m.revealing {
                m.revealing = false;
                changed = true;
            }
        });
        changed
    }

    /// Set a message's needs-escalation flag. Never cleared once set.
    pub fn flag_escalation(&mut self, chat_id: &str, message_id: &str) {
        self.update_message(chat_id, message_id, |m| {
            m.needs_escalation = true;
        });
    }

    /// Record that a human hand-off has been dispatched for a session.
    pub fn mark_escalation_sent(&mut self, chat_id: &str) {
        self.update_session(chat_id, |s| {
            s.escalation_sent = true;
        });
    }

    pub fn escalation_sent(&self, chat_id: &str) -> bool {
        self.sessions
            .iter()
            .find(|s| s.id == chat_id)
            .map(|s| s.escalation_sent)
            .unwrap_or(false)
    }

    pub fn set_archived(&mut self, chat_id: &str, archived: bool) {
        self.update_session(chat_id, |s| {
            s.archived = archived;
        });
    }

    /// Rebuild the list with one session transformed. Readers holding a
    /// previous snapshot keep observing the old list.
    fn update_session(&mut self, chat_id: &str, mut f: impl FnMut(&mut Session)) {
        self.sessions = self
            .sessions
            .iter()
            .map(|s| {
                if s.id == chat_id {
                    let mut updated = s.clone();
                    f(&mut updated);
                    updated
                } else {
                    s.clone()
                }
            })
            .collect();
    }

    fn update_message(&mut self, chat_id: &str, message_id: &str, mut f: impl FnMut(&mut Message)) {
        if let Some(d) = self.draft.as_mut().filter(|d| d.id == chat_id) {
            if let Some(m) = d.messages.iter_mut().find(|m| m.id == message_id) {
                f(m);
            }
            return;
        }
        self.update_session(chat_id, |s| {
            if let Some(m) = s.messages.iter_mut().find(|m| m.id == message_id) {
                f(m);
            }
        });
    }
}
