//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Expense analysis and the text dashboard
//! - `demo` - Bundled sample statement
//! - `prompts` - Analysis prompt preview, check and override path
//! - `serve` - Web server command
//! - `status` - AI backend configuration and health

pub mod analyze;
pub mod demo;
pub mod prompts;
pub mod serve;
pub mod status;

// Re-export command functions for main.rs
pub use analyze::*;
pub use demo::*;
pub use prompts::*;
pub use serve::*;
pub use status::*;

use anyhow::{Context, Result};
use finsight_core::{AIClient, AnalysisSettings, ReportRequestor};

/// Resolve settings from config file, environment and an optional model flag
pub fn load_settings(model: Option<&str>) -> Result<AnalysisSettings> {
    let settings = AnalysisSettings::load()
        .context("Failed to load analysis settings")?
        .with_env_overrides();
    Ok(match model {
        Some(model) => settings.with_model(model),
        None => settings,
    })
}

/// Build a requestor from the environment
pub fn build_requestor(model: Option<&str>) -> Result<ReportRequestor> {
    let settings = load_settings(model)?;
    let client = AIClient::from_env(&settings);
    Ok(ReportRequestor::new(client, settings))
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a dollar amount with thousands separators
pub fn format_money(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        cents % 100
    )
}
