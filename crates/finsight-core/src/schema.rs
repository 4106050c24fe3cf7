//! Structured output schema for the analysis request
//!
//! Gemini accepts an OpenAPI-style schema subset in `responseSchema`. The
//! descriptor here mirrors [`crate::models::ReportPayload`] field for field;
//! `required` lists match the serde model so that anything the provider is
//! allowed to omit would also fail to decode.

use serde_json::{json, Value};

use crate::models::TrendDirection;

/// Top-level fields every report payload must carry
pub const REQUIRED_REPORT_FIELDS: &[&str] = &[
    "categorizationSummary",
    "topCategories",
    "recurringExpenses",
    "spendingSpikes",
    "monthlyTrends",
    "predictions",
    "keyInsights",
    "recommendations",
];

fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

/// Build the response schema for an expense analysis
pub fn analysis_schema() -> Value {
    let trend_labels: Vec<&str> = TrendDirection::all().iter().map(|t| t.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "categorizationSummary": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "date": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "amount": { "type": "NUMBER" },
                        "category": { "type": "STRING" }
                    },
                    "required": ["date", "description", "amount", "category"]
                }
            },
            "topCategories": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "category": { "type": "STRING" },
                        "amount": { "type": "NUMBER" },
                        "percentage": { "type": "NUMBER" }
                    },
                    "required": ["category", "amount", "percentage"]
                }
            },
            "recurringExpenses": string_array(),
            "spendingSpikes": string_array(),
            "monthlyTrends": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "month": { "type": "STRING" },
                        "change": { "type": "STRING" },
                        "trend": {
                            "type": "STRING",
                            "format": "enum",
                            "enum": trend_labels
                        }
                    },
                    "required": ["month", "change", "trend"]
                }
            },
            "predictions": {
                "type": "OBJECT",
                "properties": {
                    "nextMonthTotal": { "type": "NUMBER" },
                    "highRiskCategories": string_array(),
                    "stableCategories": string_array()
                },
                "required": ["nextMonthTotal", "highRiskCategories", "stableCategories"]
            },
            "keyInsights": string_array(),
            "recommendations": string_array()
        },
        "required": REQUIRED_REPORT_FIELDS
    })
}
