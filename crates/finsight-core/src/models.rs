//! Report data model for FinSight
//!
//! These types are the shape contract between the report requestor and any
//! renderer. Field names on the wire are camelCase and every field is
//! required: a missing list is a decode error, not an empty list.

use serde::{Deserialize, Serialize};

/// One categorized transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    /// Date as supplied in the input (format not validated)
    pub date: String,
    pub description: String,
    pub amount: f64,
    /// Category label assigned by the model
    pub category: String,
}

/// Aggregate spend for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category: String,
    pub amount: f64,
    /// Share of total spend (0-100)
    pub percentage: f64,
}

/// Direction of a month-over-month trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Declining,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Declining => "declining",
            Self::Stable => "stable",
        }
    }

    /// All labels accepted on the wire
    pub fn all() -> &'static [TrendDirection] {
        &[Self::Rising, Self::Declining, Self::Stable]
    }
}

impl std::str::FromStr for TrendDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "rising" => Ok(Self::Rising),
            "declining" => Ok(Self::Declining),
            "stable" => Ok(Self::Stable),
            _ => Err(format!("Unknown trend: {}", s)),
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One calendar period's change in spending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    pub month: String,
    /// Percentage formatted as text, e.g. "12.4%"
    pub change: String,
    pub trend: TrendDirection,
}

impl MonthlyTrend {
    /// Numeric value of `change` ("+12.4%" -> 12.4)
    pub fn change_percent(&self) -> Option<f64> {
        self.change
            .trim()
            .trim_end_matches('%')
            .trim()
            .trim_start_matches('+')
            .parse()
            .ok()
    }
}

/// Forward-looking block of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predictions {
    pub next_month_total: f64,
    pub high_risk_categories: Vec<String>,
    pub stable_categories: Vec<String>,
}

/// A web citation attached by the provider's search grounding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Report body as emitted by the provider (no citations)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub categorization_summary: Vec<ExpenseRecord>,
    pub top_categories: Vec<CategorySummary>,
    pub recurring_expenses: Vec<String>,
    pub spending_spikes: Vec<String>,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub predictions: Predictions,
    pub key_insights: Vec<String>,
    pub recommendations: Vec<String>,
}

/// A complete analysis report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub categorization_summary: Vec<ExpenseRecord>,
    pub top_categories: Vec<CategorySummary>,
    pub recurring_expenses: Vec<String>,
    pub spending_spikes: Vec<String>,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub predictions: Predictions,
    pub key_insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub grounding_sources: Vec<GroundingSource>,
}

/// A name/value pair for charting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
}

impl AnalysisReport {
    /// Attach citations to a decoded provider payload
    pub fn from_payload(payload: ReportPayload, grounding_sources: Vec<GroundingSource>) -> Self {
        Self {
            categorization_summary: payload.categorization_summary,
            top_categories: payload.top_categories,
            recurring_expenses: payload.recurring_expenses,
            spending_spikes: payload.spending_spikes,
            monthly_trends: payload.monthly_trends,
            predictions: payload.predictions,
            key_insights: payload.key_insights,
            recommendations: payload.recommendations,
            grounding_sources,
        }
    }

    /// Largest spending category, if the provider listed any
    pub fn top_category(&self) -> Option<&CategorySummary> {
        self.top_categories.first()
    }

    /// Most recent month-over-month trend
    pub fn latest_trend(&self) -> Option<&MonthlyTrend> {
        self.monthly_trends.first()
    }

    /// Sum of all categorized transaction amounts
    pub fn total_spend(&self) -> f64 {
        self.categorization_summary.iter().map(|r| r.amount).sum()
    }

    /// Category breakdown as chart points (category -> amount)
    pub fn category_chart(&self) -> Vec<ChartPoint> {
        self.top_categories
            .iter()
            .map(|c| ChartPoint {
                name: c.category.clone(),
                value: c.amount,
            })
            .collect()
    }

    /// Trend series as chart points (month -> percent change)
    ///
    /// Months whose change text is not a number are skipped.
    pub fn trend_chart(&self) -> Vec<ChartPoint> {
        self.monthly_trends
            .iter()
            .filter_map(|t| {
                t.change_percent().map(|value| ChartPoint {
                    name: t.month.clone(),
                    value,
                })
            })
            .collect()
    }
}
