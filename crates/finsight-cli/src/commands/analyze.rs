//! Analyze command implementation

use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use finsight_core::{demo::DEMO_CSV, AIBackend, AnalysisReport};

use super::{build_requestor, format_money, truncate};

/// Width of the bar in the spending distribution chart
const BAR_WIDTH: usize = 30;

/// Analyze expense data and print the report
pub async fn cmd_analyze(
    file: Option<&Path>,
    demo: bool,
    json: bool,
    model: Option<&str>,
) -> Result<()> {
    let input = read_input(file, demo)?;
    if input.trim().is_empty() {
        bail!("Please provide some expense data first.");
    }

    let requestor = build_requestor(model)?;

    if !json {
        eprintln!(
            "🔍 Analyzing {} line(s) with {}...",
            input.lines().filter(|l| !l.trim().is_empty()).count(),
            requestor.client().model()
        );
    }

    let report = requestor.analyze(&input).await.map_err(|e| {
        if e.is_analysis_failure() {
            anyhow::Error::new(e)
                .context("Analysis failed. Please ensure the data format is correct.")
        } else {
            anyhow::Error::new(e)
        }
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "   Generated {} · model {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M"),
            requestor.client().model()
        );
        print!("{}", render_dashboard(&report));
    }

    Ok(())
}

/// Read analysis input from the demo data, a file, or stdin
pub fn read_input(file: Option<&Path>, demo: bool) -> Result<String> {
    if demo {
        return Ok(DEMO_CSV.to_string());
    }

    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read expense data from stdin")?;
            Ok(buf)
        }
    }
}

/// Render a report as a terminal dashboard
pub fn render_dashboard(report: &AnalysisReport) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_dashboard(&mut out, report);
    out
}

fn write_dashboard(out: &mut String, report: &AnalysisReport) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "╭─────────────────────────────────────────╮")?;
    writeln!(out, "│        🧠 FinSight Intelligence         │")?;
    writeln!(out, "╰─────────────────────────────────────────╯")?;
    writeln!(out)?;

    // Top level metrics
    writeln!(
        out,
        "  Predicted Next Month:  {}",
        format_money(report.predictions.next_month_total)
    )?;
    match report.top_category() {
        Some(top) => writeln!(
            out,
            "  Top Category:          {} ({}, {}%)",
            top.category,
            format_money(top.amount),
            top.percentage
        )?,
        None => writeln!(out, "  Top Category:          N/A")?,
    }
    writeln!(
        out,
        "  Latest Trend:          {}",
        report
            .latest_trend()
            .map(|t| format!("{} ({})", t.change, t.trend))
            .unwrap_or_else(|| "0%".to_string())
    )?;
    writeln!(
        out,
        "  Recurring:             {} Items",
        report.recurring_expenses.len()
    )?;
    writeln!(
        out,
        "  Categorized Spend:     {}",
        format_money(report.total_spend())
    )?;

    // Spending distribution
    let categories = report.category_chart();
    if !categories.is_empty() {
        writeln!(out)?;
        writeln!(out, "📊 Spending Distribution")?;
        writeln!(out, "   ─────────────────────────────")?;
        let max = categories.iter().map(|c| c.value).fold(0.0_f64, f64::max);
        for point in &categories {
            let filled = if max > 0.0 {
                ((point.value / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            writeln!(
                out,
                "   {:<20} {:<width$} {}",
                truncate(&point.name, 20),
                "█".repeat(filled.min(BAR_WIDTH)),
                format_money(point.value),
                width = BAR_WIDTH
            )?;
        }
    }

    // Monthly change
    if !report.monthly_trends.is_empty() {
        writeln!(out)?;
        writeln!(out, "📈 Monthly Change (%)")?;
        writeln!(out, "   ─────────────────────────────")?;
        for trend in &report.monthly_trends {
            let icon = match trend.trend {
                finsight_core::TrendDirection::Rising => "▲",
                finsight_core::TrendDirection::Declining => "▼",
                finsight_core::TrendDirection::Stable => "■",
            };
            writeln!(
                out,
                "   {} {:<14} {:>8}  {}",
                icon, trend.month, trend.change, trend.trend
            )?;
        }
    }

    if !report.spending_spikes.is_empty() {
        writeln!(out)?;
        writeln!(out, "⚡ Spending Spikes")?;
        for spike in &report.spending_spikes {
            writeln!(out, "   • {}", spike)?;
        }
    }

    if !report.recurring_expenses.is_empty() {
        writeln!(out)?;
        writeln!(out, "🔁 Recurring Expenses")?;
        for item in &report.recurring_expenses {
            writeln!(out, "   • {}", item)?;
        }
    }

    // Predictive intelligence
    writeln!(out)?;
    writeln!(out, "🔮 Predictive Intelligence")?;
    writeln!(out, "   ─────────────────────────────")?;
    writeln!(
        out,
        "   High Risk Categories: {}",
        join_or_none(&report.predictions.high_risk_categories)
    )?;
    writeln!(
        out,
        "   Stable Sectors:       {}",
        join_or_none(&report.predictions.stable_categories)
    )?;
    if let Some(insight) = report.key_insights.first() {
        writeln!(out, "   \"{}\"", insight)?;
    }
    for insight in report.key_insights.iter().skip(1) {
        writeln!(out, "   • {}", insight)?;
    }

    if !report.recommendations.is_empty() {
        writeln!(out)?;
        writeln!(out, "✅ Actionable Recommendations")?;
        for (i, rec) in report.recommendations.iter().enumerate() {
            writeln!(out, "   {}. {}", i + 1, rec)?;
        }
    }

    if !report.grounding_sources.is_empty() {
        writeln!(out)?;
        writeln!(out, "🌐 Market Research & Sources")?;
        for source in &report.grounding_sources {
            writeln!(out, "   • {} <{}>", source.title, source.uri)?;
        }
    }

    // Expense log
    writeln!(out)?;
    writeln!(
        out,
        "🧾 Categorized Intelligence Log ({} Transactions)",
        report.categorization_summary.len()
    )?;
    if !report.categorization_summary.is_empty() {
        writeln!(
            out,
            "   {:<12} {:<32} {:>12}  {}",
            "DATE", "DESCRIPTION", "AMOUNT", "CATEGORY"
        )?;
        writeln!(out, "   {}", "-".repeat(72))?;
        for record in &report.categorization_summary {
            writeln!(
                out,
                "   {:<12} {:<32} {:>12}  {}",
                truncate(&record.date, 12),
                truncate(&record.description, 32),
                format_money(record.amount),
                record.category
            )?;
        }
    }

    Ok(())
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
