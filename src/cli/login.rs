// src/cli/login.rs — Credential entry

use std::io::{self, BufRead, Write};

use crate::infra::credentials::{self, Credentials};

/// Prompt for an API key, validate the format locally, and persist it.
pub fn run_login() -> anyhow::Result<()> {
    eprintln!("The key is stored in ~/.townhall/credentials.json and never leaves this machine.");
    eprint!("OpenAI API key (sk-...): ");
    io::stderr().flush().ok();

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let key = line.trim();

    credentials::validate_key(key)?;

    let creds = Credentials {
        openai_api_key: Some(key.to_string()),
    };
    creds.save()?;
    eprintln!("Saved.");
    Ok(())
}
