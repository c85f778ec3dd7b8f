// src/cli/chat.rs — Interactive REPL
//
// Thin host around the turn engine: reads questions, relays slash
// commands, and nudges toward the hand-off when a reply was flagged.
// All rendering of reasoning steps, reveal chunks, and suggestions
// happens in the engine's event handler (wired up in main).

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::core::engine::TurnEngine;
use crate::core::types::TurnOutcome;
use crate::handoff::TeamHandoff;

pub async fn run_chat(
    engine: Arc<TurnEngine>,
    handoff: Arc<dyn TeamHandoff>,
    persona_name: &str,
) -> anyhow::Result<()> {
    eprintln!(
        "townhall v{} | chatting with {}\n",
        env!("CARGO_PKG_VERSION"),
        persona_name,
    );

    engine.start_new_chat();

    while let Some(input) = read_input() {
        let trimmed = input.trim();

        if trimmed == "quit" || trimmed == "exit" || trimmed == "/quit" {
            break;
        }

        if trimmed.starts_with('/') {
            handle_slash_command(trimmed, &engine, &handoff).await;
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }

        match engine.submit(trimmed).await {
            Ok(TurnOutcome::Completed(report)) => {
                if report.needs_escalation {
                    let sent = engine.escalation_sent(&report.chat_id);
                    if sent {
                        eprintln!("  (already forwarded to {}'s team)", persona_name);
                    } else {
                        eprintln!(
                            "  Need more specific information? Type /escalate to send this question to {}'s team.",
                            persona_name,
                        );
                    }
                }
            }
            Ok(TurnOutcome::Cancelled) => {}
            Err(e) => {
                eprintln!("[error] {}", e);
            }
        }
    }

    Ok(())
}

fn read_input() -> Option<String> {
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line),
        Err(_) => None,
    }
}

async fn handle_slash_command(input: &str, engine: &Arc<TurnEngine>, handoff: &Arc<dyn TeamHandoff>) {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/new" => {
            engine.start_new_chat();
            eprintln!("  Started a new chat.");
        }

        "/sessions" => {
            let sessions = engine.sessions();
            if sessions.is_empty() {
                eprintln!("  No saved chats yet.");
            } else {
                eprintln!("  Saved chats ({}):", sessions.len());
                for (i, s) in sessions.iter().enumerate() {
                    let marker = if s.escalation_sent { " [escalated]" } else { "" };
                    eprintln!(
                        "  {}. {} | {} message(s){}",
                        i + 1,
                        s.title,
                        s.messages.len(),
                        marker,
                    );
                }
                eprintln!("  Usage: /open <n>");
            }
        }

        "/open" => {
            let sessions = engine.sessions();
            match arg.parse::<usize>() {
                Ok(n) if n >= 1 && n <= sessions.len() => {
                    let target = &sessions[n - 1];
                    match engine.select_chat(&target.id) {
                        Ok(()) => eprintln!("  Switched to \"{}\".", target.title),
                        Err(e) => eprintln!("  {}", e),
                    }
                }
                _ => eprintln!("  Usage: /open <n> (see /sessions)"),
            }
        }

        "/escalate" => {
            let Some(chat_id) = engine.active_chat_id() else {
                eprintln!("  Nothing to escalate yet.");
                return;
            };
            let Some(question) = engine.last_user_question(&chat_id) else {
                eprintln!("  Nothing to escalate yet.");
                return;
            };
            if engine.escalation_sent(&chat_id) {
                eprintln!("  Already forwarded for this chat.");
                return;
            }
            let context = engine
                .messages(&chat_id)
                .iter()
                .map(|m| format!("{:?}: {}", m.role, m.content))
                .collect::<Vec<_>>()
                .join("\n");
            match handoff.escalate(&question, &context).await {
                Ok(()) => {
                    engine.mark_escalation_sent(&chat_id);
                    eprintln!("  Question forwarded ✓ You'll receive a response soon.");
                }
                Err(e) => eprintln!("  Could not forward the question: {}", e),
            }
        }

        "/help" => {
            eprintln!("Slash commands:");
            eprintln!("  /new               Start a new chat");
            eprintln!("  /sessions          List saved chats");
            eprintln!("  /open <n>          Switch to a saved chat");
            eprintln!("  /escalate          Forward the last question to the team");
            eprintln!("  /help              Show this help");
            eprintln!("  /quit, quit, exit  End session");
        }

        _ => {
            eprintln!("Unknown command: {}. Type /help for commands.", cmd);
        }
    }
}
