//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "draftbot", version, about = "Message-triage assistant for chat channels")]
pub struct Cli {
    /// Path to the config file (default: ~/.draftbot/draftbot.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect to the chat transport and run the triage pipeline (default)
    Run,
    /// List models accessible with the configured credential
    Models,
}
