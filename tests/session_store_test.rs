// tests/session_store_test.rs — Session bookkeeping scenarios

use townhall::session::SessionStore;

/// Two questions queued in a new chat before any assistant reply must
/// still produce exactly one session entry once the first reply lands.
#[test]
fn test_promotion_is_exactly_once() {
    let mut store = SessionStore::new();
    let chat = store.start_new_chat();

    store.append_user(&chat, "What are your housing plans?");
    store.append_user(&chat, "Also, what about the shuttle?");
    assert!(store.sessions().is_empty());

    store.append_assistant(&chat, "Here is the housing picture.");
    assert!(store.promote(&chat));
    // A re-entrant promotion is a no-op, never a duplicate.
    assert!(!store.promote(&chat));

    let sessions = store.sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].messages.len(), 3);
    assert_eq!(sessions[0].title, "What are your housing plans?");
}

/// After promotion, appends land on the persisted session, and a reader
/// holding an older snapshot never observes them.
#[test]
fn test_snapshot_readers_never_see_partial_writes() {
    let mut store = SessionStore::new();
    let chat = store.start_new_chat();
    store.append_user(&chat, "first");
    store.append_assistant(&chat, "reply");
    store.promote(&chat);

    let before = store.snapshot();
    store.append_user(&chat, "second");
    store.append_assistant(&chat, "another reply");

    assert_eq!(before[0].messages.len(), 2);
    assert_eq!(store.messages(&chat).len(), 4);
}

/// The reveal completion handler tolerates being invoked twice.
#[test]
fn test_reveal_completion_handler_is_idempotent() {
    let mut store = SessionStore::new();
    let chat = store.start_new_chat();
    store.append_user(&chat, "question");
    let reply = store.append_assistant(&chat, "answer");
    store.promote(&chat);

    assert!(store.finish_reveal(&chat, &reply.id));
    assert!(!store.finish_reveal(&chat, &reply.id));

    let messages = store.messages(&chat);
    assert!(!messages[1].revealing);
}

/// Switching chats abandons the draft; its messages are unreachable.
#[test]
fn test_draft_abandoned_on_switch() {
    let mut store = SessionStore::new();
    let first = store.start_new_chat();
    store.append_user(&first, "q");
    store.append_assistant(&first, "a");
    store.promote(&first);

    let second = store.start_new_chat();
    store.append_user(&second, "never answered");

    store.select(&first).unwrap();
    assert!(store.messages(&second).is_empty());
    assert_eq!(store.active_chat_id().as_deref(), Some(first.as_str()));
}

/// The escalation-sent flag lives on the session and survives appends.
#[test]
fn test_escalation_sent_sticks() {
    let mut store = SessionStore::new();
    let chat = store.start_new_chat();
    store.append_user(&chat, "q");
    store.append_assistant(&chat, "a");
    store.promote(&chat);

    store.mark_escalation_sent(&chat);
    store.append_user(&chat, "follow-up");
    assert!(store.escalation_sent(&chat));
}
