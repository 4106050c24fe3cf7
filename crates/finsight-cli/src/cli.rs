//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// FinSight - AI expense intelligence
#[derive(Parser)]
#[command(name = "finsight")]
#[command(about = "Grounded AI analysis of raw expense statements", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Model to use instead of the configured default
    #[arg(long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze expense data (reads stdin when no file is given)
    Analyze {
        /// CSV or text file with expense lines
        #[arg(short, long, conflicts_with = "demo")]
        file: Option<PathBuf>,

        /// Analyze the bundled sample statement
        #[arg(long)]
        demo: bool,

        /// Print the report as JSON instead of a dashboard
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "allow-origin")]
        allowed_origins: Vec<String>,
    },

    /// Show AI backend configuration and health
    Status,

    /// Inspect the analysis prompt (defaults to `show`)
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Print the bundled sample statement
    Demo,
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// Preview the prompt with placeholder data filled in
    Show {
        /// Print the template as stored, placeholders included
        #[arg(long)]
        raw: bool,
    },

    /// Check that the active prompt loads and embeds the expense text
    Check,

    /// Show where a prompt override should be placed
    Path,
}
