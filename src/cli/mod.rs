// src/cli/mod.rs — CLI definition (clap derive)

use clap::{Parser, Subcommand};

pub mod chat;
pub mod login;

#[derive(Parser)]
#[command(
    name = "townhall",
    version,
    about = "Chat with your councilmember's assistant"
)]
pub struct Cli {
    /// Path to a config.toml (defaults to ~/.townhall/config.toml)
    #[arg(long)]
    pub config: Option<String>,

    /// Seed the reasoning-step RNG for reproducible sequences
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store the OpenAI API key used for completions
    Login,
}
