use crate::types::{LogLevel, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chatfold")]
#[command(about = "Replay chat event feeds and account for their token usage", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: $CHATFOLD_CONFIG, then the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    /// Ignored when CHATFOLD_LOG is set
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fold a JSONL event feed into messages
    Replay {
        /// Event feed, one event per line ("-" for stdin)
        file: PathBuf,

        /// Only fold events of this workspace
        #[arg(long)]
        workspace: Option<String>,
    },

    /// Per-message and session token usage with costs
    Usage {
        file: PathBuf,

        #[arg(long)]
        workspace: Option<String>,
    },

    /// Resolve pricing for a model id
    Price {
        /// e.g. "anthropic:claude-sonnet-4-5"
        model: String,
    },

    /// Repair tool inputs and redact tool outputs of a JSON message array
    Sanitize {
        file: PathBuf,

        /// Override the large-content threshold (bytes)
        #[arg(long)]
        threshold: Option<usize>,
    },

    /// Per-model rollups and the recency timestamp
    Stats {
        file: PathBuf,

        #[arg(long)]
        workspace: Option<String>,

        /// Workspace creation time (RFC 3339)
        #[arg(long)]
        created_at: Option<String>,
    },

    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective config
    Show,
}
