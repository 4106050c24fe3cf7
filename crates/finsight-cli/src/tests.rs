//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use clap::Parser;
use finsight_core::models::{
    CategorySummary, ExpenseRecord, GroundingSource, MonthlyTrend, Predictions, TrendDirection,
};
use finsight_core::{AnalysisReport, PromptLibrary};

use crate::cli::{Cli, Commands, PromptsAction};
use crate::commands::{self, format_money, truncate};

fn sample_report() -> AnalysisReport {
    AnalysisReport {
        categorization_summary: vec![
            ExpenseRecord {
                date: "2023-11-02".into(),
                description: "Rent - Apt 4B".into(),
                amount: 1200.0,
                category: "Housing".into(),
            },
            ExpenseRecord {
                date: "2023-11-01".into(),
                description: "Starbucks".into(),
                amount: 5.5,
                category: "Dining".into(),
            },
        ],
        top_categories: vec![
            CategorySummary {
                category: "Housing".into(),
                amount: 1200.0,
                percentage: 95.5,
            },
            CategorySummary {
                category: "Dining".into(),
                amount: 5.5,
                percentage: 4.5,
            },
        ],
        recurring_expenses: vec!["Netflix $15.99/month".into()],
        spending_spikes: vec![],
        monthly_trends: vec![MonthlyTrend {
            month: "Dec 2023".into(),
            change: "+12.1%".into(),
            trend: TrendDirection::Rising,
        }],
        predictions: Predictions {
            next_month_total: 1750.0,
            high_risk_categories: vec!["Dining".into()],
            stable_categories: vec![],
        },
        key_insights: vec!["Rent dominates fixed costs.".into()],
        recommendations: vec!["Review streaming subscriptions.".into()],
        grounding_sources: vec![GroundingSource {
            title: "Consumer Price Index".into(),
            uri: "https://www.bls.gov/cpi/".into(),
        }],
    }
}

fn empty_report() -> AnalysisReport {
    AnalysisReport {
        categorization_summary: vec![],
        top_categories: vec![],
        recurring_expenses: vec![],
        spending_spikes: vec![],
        monthly_trends: vec![],
        predictions: Predictions {
            next_month_total: 0.0,
            high_risk_categories: vec![],
            stable_categories: vec![],
        },
        key_insights: vec![],
        recommendations: vec![],
        grounding_sources: vec![],
    }
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("Christmas Shopping - Mall", 12), "Christmas...");
    // Multi-byte characters are counted, not bytes
    assert_eq!(truncate("Café Café Café", 8), "Café ...");
}

#[test]
fn test_format_money() {
    assert_eq!(format_money(5.5), "$5.50");
    assert_eq!(format_money(1200.0), "$1,200.00");
    assert_eq!(format_money(1234567.891), "$1,234,567.89");
    assert_eq!(format_money(-42.0), "-$42.00");
    assert_eq!(format_money(0.0), "$0.00");
}

// ========== Input Tests ==========

#[test]
fn test_read_input_demo() {
    let input = commands::read_input(None, true).unwrap();
    assert_eq!(input, finsight_core::demo::DEMO_CSV);
}

#[test]
fn test_read_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("statement.csv");
    std::fs::write(&path, "2024-01-01,Coffee,5.00\n").unwrap();

    let input = commands::read_input(Some(&path), false).unwrap();
    assert_eq!(input, "2024-01-01,Coffee,5.00\n");
}

#[test]
fn test_read_input_missing_file() {
    let result = commands::read_input(Some(std::path::Path::new("/nonexistent.csv")), false);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("/nonexistent.csv"));
}

// ========== Dashboard Tests ==========

#[test]
fn test_render_dashboard() {
    let out = commands::render_dashboard(&sample_report());

    assert!(out.contains("Predicted Next Month:  $1,750.00"));
    assert!(out.contains("Top Category:          Housing ($1,200.00, 95.5%)"));
    assert!(out.contains("Latest Trend:          +12.1% (rising)"));
    assert!(out.contains("Recurring:             1 Items"));
    assert!(out.contains("Categorized Spend:     $1,205.50"));
    assert!(out.contains("Spending Distribution"));
    assert!(out.contains("▲ Dec 2023"));
    assert!(out.contains("High Risk Categories: Dining"));
    assert!(out.contains("Stable Sectors:       (none)"));
    assert!(out.contains("\"Rent dominates fixed costs.\""));
    assert!(out.contains("1. Review streaming subscriptions."));
    assert!(out.contains("Consumer Price Index <https://www.bls.gov/cpi/>"));
    assert!(out.contains("Categorized Intelligence Log (2 Transactions)"));
    assert!(out.contains("Rent - Apt 4B"));
}

#[test]
fn test_render_dashboard_tolerates_empty_lists() {
    let out = commands::render_dashboard(&empty_report());

    assert!(out.contains("Top Category:          N/A"));
    assert!(out.contains("Latest Trend:          0%"));
    assert!(out.contains("Recurring:             0 Items"));
    assert!(out.contains("Categorized Intelligence Log (0 Transactions)"));
    assert!(!out.contains("Spending Distribution"));
    assert!(!out.contains("Market Research"));
    assert!(!out.contains("DESCRIPTION"));
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_analyze_args() {
    let cli = Cli::try_parse_from([
        "finsight", "--model", "gemini-2.5-pro", "analyze", "--file", "x.csv", "--json",
    ])
    .unwrap();

    assert_eq!(cli.model.as_deref(), Some("gemini-2.5-pro"));
    match cli.command {
        Commands::Analyze { file, demo, json } => {
            assert_eq!(file.unwrap().to_str(), Some("x.csv"));
            assert!(!demo);
            assert!(json);
        }
        _ => panic!("expected analyze"),
    }
}

#[test]
fn test_parse_analyze_file_conflicts_with_demo() {
    let result = Cli::try_parse_from(["finsight", "analyze", "--file", "x.csv", "--demo"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_serve_defaults() {
    let cli = Cli::try_parse_from(["finsight", "serve"]).unwrap();
    match cli.command {
        Commands::Serve {
            port,
            host,
            static_dir,
            allowed_origins,
        } => {
            assert_eq!(port, 3000);
            assert_eq!(host, "127.0.0.1");
            assert!(static_dir.is_none());
            assert!(allowed_origins.is_empty());
        }
        _ => panic!("expected serve"),
    }
}

#[test]
fn test_parse_prompts_actions() {
    let cli = Cli::try_parse_from(["finsight", "prompts", "show", "--raw"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Prompts {
            action: Some(PromptsAction::Show { raw: true })
        }
    ));

    let cli = Cli::try_parse_from(["finsight", "prompts"]).unwrap();
    assert!(matches!(cli.command, Commands::Prompts { action: None }));

    let cli = Cli::try_parse_from(["finsight", "prompts", "check"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Prompts {
            action: Some(PromptsAction::Check)
        }
    ));
}

// ========== Command Tests ==========

fn write_prompt_override(dir: &std::path::Path, user_section: &str) {
    std::fs::write(
        dir.join("analyze_expenses.md"),
        format!(
            "---\nid: analyze_expenses\nversion: 3\ntask_type: custom\n---\n\n# User\n{}\n",
            user_section
        ),
    )
    .unwrap();
}

#[test]
fn test_render_prompt_preview() {
    let mut library = PromptLibrary::embedded_only();
    let out = commands::render_prompt(&mut library, false).unwrap();

    assert!(out.starts_with("📝 analyze_expenses v1 (embedded)"));
    assert!(out.contains(&format!("DATA:\n{}", commands::SAMPLE_EXPENSES)));
    assert!(!out.contains("{{expenses}}"));
}

#[test]
fn test_render_prompt_raw_keeps_placeholder() {
    let mut library = PromptLibrary::embedded_only();
    let out = commands::render_prompt(&mut library, true).unwrap();
    assert!(out.contains("{{expenses}}"));
    assert!(!out.contains(commands::SAMPLE_EXPENSES));
}

#[test]
fn test_check_prompt_embedded() {
    let mut library = PromptLibrary::embedded_only();
    let out = commands::check_prompt(&mut library).unwrap();
    assert_eq!(out, "✅ 📝 analyze_expenses v1 (embedded): embeds {{expenses}}");
}

#[test]
fn test_check_prompt_override() {
    let dir = tempfile::tempdir().unwrap();
    write_prompt_override(dir.path(), "Summarize: {{expenses}}");

    let mut library = PromptLibrary::with_override_dir(dir.path().to_path_buf());
    let out = commands::check_prompt(&mut library).unwrap();
    assert!(out.contains("v3 (override "));

    let preview = commands::render_prompt(&mut library, false).unwrap();
    assert!(preview.contains("Summarize: <your expense data>"));
}

#[test]
fn test_check_prompt_rejects_override_without_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    write_prompt_override(dir.path(), "Analyze my spending.");

    let mut library = PromptLibrary::with_override_dir(dir.path().to_path_buf());
    let err = commands::check_prompt(&mut library).unwrap_err();
    assert!(format!("{:#}", err).contains("{{expenses}}"));
    assert!(commands::render_prompt(&mut library, false).is_err());
}

#[test]
fn test_cmd_demo() {
    assert!(commands::cmd_demo().is_ok());
}
