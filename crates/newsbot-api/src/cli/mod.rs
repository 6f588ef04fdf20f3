//! CLI command definitions for the `newsbot` binary.
//!
//! `serve` runs the REST API; the remaining commands drive the same chat
//! pipeline and history store directly from the terminal.

pub mod chat;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use newsbot_types::chat::SessionId;

/// Ask questions about the news, grounded in an indexed article corpus.
#[derive(Parser)]
#[command(name = "newsbot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config.toml (defaults to the data directory).
    #[arg(long, global = true, env = "NEWSBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (overrides config).
        #[arg(short, long, env = "NEWSBOT_PORT")]
        port: Option<u16>,

        /// Host to bind to (overrides config).
        #[arg(long, env = "NEWSBOT_HOST")]
        host: Option<String>,
    },

    /// Ask a single question and print the reply.
    Ask {
        /// Session to continue. A new one is started when omitted.
        #[arg(short, long)]
        session: Option<SessionId>,

        /// The question.
        message: String,
    },

    /// Show the history of a session.
    History {
        /// Session UUID.
        session_id: SessionId,
    },

    /// List every active session.
    #[command(alias = "ls")]
    Sessions,

    /// Clear the history of a session.
    #[command(alias = "rm")]
    Clear {
        /// Session UUID.
        session_id: SessionId,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_session() {
        let cli = Cli::try_parse_from([
            "newsbot",
            "ask",
            "--session",
            "6f1c2b1e-8d4a-4c59-9a57-2f0f8c7d9b10",
            "What happened today?",
        ])
        .unwrap();
        match cli.command {
            Commands::Ask { session, message } => {
                assert_eq!(
                    session.unwrap().to_string(),
                    "6f1c2b1e-8d4a-4c59-9a57-2f0f8c7d9b10"
                );
                assert_eq!(message, "What happened today?");
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_history_rejects_non_uuid() {
        assert!(Cli::try_parse_from(["newsbot", "history", "abc"]).is_err());
        assert!(
            Cli::try_parse_from(["newsbot", "clear", "6f1c2b1e8d4a4c599a572f0f8c7d9b10"]).is_err()
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["newsbot", "sessions", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Sessions));
    }
}
