//! FinSight CLI - AI expense intelligence
//!
//! Usage:
//!   finsight analyze --file statement.csv   Analyze a statement
//!   finsight analyze --demo                 Analyze the bundled sample
//!   finsight serve --port 3000              Start web server
//!   finsight status                         Check AI backend

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so `analyze --json` output stays clean
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let model = cli.model.as_deref();

    match cli.command {
        Commands::Analyze { file, demo, json } => {
            commands::cmd_analyze(file.as_deref(), demo, json, model).await
        }
        Commands::Serve {
            port,
            host,
            static_dir,
            allowed_origins,
        } => {
            commands::cmd_serve(&host, port, static_dir.as_deref(), allowed_origins, model).await
        }
        Commands::Status => commands::cmd_status(model).await,
        Commands::Prompts { action } => match action {
            None => commands::cmd_prompts_show(false),
            Some(PromptsAction::Show { raw }) => commands::cmd_prompts_show(raw),
            Some(PromptsAction::Check) => commands::cmd_prompts_check(),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
        Commands::Demo => commands::cmd_demo(),
    }
}
