//! Decoding helpers for AI backend responses
//!
//! The provider is asked for `application/json`, so the response text should
//! be a bare JSON object. Some models still wrap it in a Markdown fence or a
//! sentence; the object between the first `{` and the last `}` is decoded.
//! Nothing is defaulted: a missing field or unknown trend label is an error.

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{GroundingSource, ReportPayload};

use super::types::GroundingMetadata;

/// Maximum characters of raw response echoed into error messages
const RAW_PREVIEW_CHARS: usize = 200;

/// Decode a report payload from the provider's response text
pub fn parse_report(response: Option<&str>) -> Result<ReportPayload> {
    let response = response.map(str::trim).unwrap_or_default();
    if response.is_empty() {
        return Err(Error::EmptyResponse);
    }

    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => {
            let json_str = &response[s..=e];
            serde_json::from_str(json_str).map_err(|e| {
                Error::Decode(format!(
                    "Invalid report JSON from provider: {} | Raw: {}",
                    e,
                    preview(json_str)
                ))
            })
        }
        _ => Err(Error::Decode(format!(
            "No JSON object found in provider response | Raw: {}",
            preview(response)
        ))),
    }
}

/// Collect web citations that carry both a URI and a title, in order
pub fn extract_sources(metadata: &GroundingMetadata) -> Vec<GroundingSource> {
    metadata
        .grounding_chunks
        .iter()
        .enumerate()
        .filter_map(|(index, chunk)| {
            let web = chunk.web.as_ref()?;
            let uri = web.uri.as_deref().filter(|s| !s.is_empty());
            let title = web.title.as_deref().filter(|s| !s.is_empty());
            match (uri, title) {
                (Some(uri), Some(title)) => Some(GroundingSource {
                    title: title.to_string(),
                    uri: uri.to_string(),
                }),
                _ => {
                    debug!(index, "Skipping grounding chunk without uri/title");
                    None
                }
            }
        })
        .collect()
}

/// Truncate on a char boundary for error messages
fn preview(s: &str) -> String {
    match s.char_indices().nth(RAW_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::{GroundingChunk, WebChunk};
    use crate::models::TrendDirection;

    const COFFEE_REPORT: &str = r#"{"categorizationSummary":[{"date":"2024-01-01","description":"Coffee","amount":5.0,"category":"Dining"}], "topCategories":[{"category":"Dining","amount":5.0,"percentage":100}], "recurringExpenses":[], "spendingSpikes":[], "monthlyTrends":[], "predictions":{"nextMonthTotal":5.0,"highRiskCategories":[],"stableCategories":["Dining"]}, "keyInsights":[], "recommendations":[]}"#;

    #[test]
    fn test_parse_report() {
        let payload = parse_report(Some(COFFEE_REPORT)).unwrap();
        assert_eq!(payload.categorization_summary.len(), 1);
        assert_eq!(payload.categorization_summary[0].category, "Dining");
        assert_eq!(payload.top_categories[0].percentage, 100.0);
        assert_eq!(payload.predictions.stable_categories, vec!["Dining"]);
        assert!(payload.monthly_trends.is_empty());
    }

    #[test]
    fn test_parse_report_with_fence() {
        let response = format!("```json\n{}\n```", COFFEE_REPORT);
        let payload = parse_report(Some(&response)).unwrap();
        assert_eq!(payload.predictions.next_month_total, 5.0);
    }

    #[test]
    fn test_parse_report_trend() {
        let response = COFFEE_REPORT.replace(
            r#""monthlyTrends":[]"#,
            r#""monthlyTrends":[{"month":"Jan","change":"-2.0%","trend":"declining"}]"#,
        );
        let payload = parse_report(Some(&response)).unwrap();
        assert_eq!(payload.monthly_trends[0].trend, TrendDirection::Declining);
    }

    #[test]
    fn test_empty_response_is_not_an_empty_report() {
        assert!(matches!(parse_report(None), Err(Error::EmptyResponse)));
        assert!(matches!(parse_report(Some("")), Err(Error::EmptyResponse)));
        assert!(matches!(parse_report(Some("  \n")), Err(Error::EmptyResponse)));
    }

    #[test]
    fn test_empty_object_is_rejected() {
        // An empty object is missing every required field
        let result = parse_report(Some("{}"));
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let response = COFFEE_REPORT.replace(r#""keyInsights":[], "#, "");
        let err = parse_report(Some(&response)).unwrap_err();
        match err {
            Error::Decode(msg) => assert!(msg.contains("keyInsights")),
            other => panic!("Expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_trend_is_rejected() {
        let response = COFFEE_REPORT.replace(
            r#""monthlyTrends":[]"#,
            r#""monthlyTrends":[{"month":"Jan","change":"2%","trend":"up"}]"#,
        );
        assert!(matches!(
            parse_report(Some(&response)),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let response = COFFEE_REPORT.replace(r#""amount":5.0,"category""#, r#""amount":"5.00","category""#);
        assert!(matches!(
            parse_report(Some(&response)),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(matches!(
            parse_report(Some("{\"categorizationSummary\": [")),
            Err(Error::Decode(_))
        ));
        assert!(matches!(
            parse_report(Some("I could not analyze this data.")),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_preview_is_char_safe() {
        let long = "é".repeat(300);
        let out = preview(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), RAW_PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_extract_sources_skips_chunks_without_web() {
        let metadata = GroundingMetadata {
            grounding_chunks: vec![
                GroundingChunk::web("https://example.com", "Example"),
                GroundingChunk::default(),
            ],
        };
        let sources = extract_sources(&metadata);
        assert_eq!(
            sources,
            vec![GroundingSource {
                title: "Example".into(),
                uri: "https://example.com".into(),
            }]
        );
    }

    #[test]
    fn test_extract_sources_filters_and_preserves_order() {
        let metadata = GroundingMetadata {
            grounding_chunks: vec![
                GroundingChunk::web("https://a.example", "A"),
                GroundingChunk {
                    web: Some(WebChunk {
                        uri: Some("https://no-title.example".into()),
                        title: None,
                    }),
                },
                GroundingChunk {
                    web: Some(WebChunk {
                        uri: None,
                        title: Some("No URI".into()),
                    }),
                },
                GroundingChunk::web("", "Empty URI"),
                GroundingChunk::web("https://b.example", "B"),
            ],
        };

        let sources = extract_sources(&metadata);
        let titles: Vec<&str> = sources.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);

        // Idempotent
        assert_eq!(extract_sources(&metadata), sources);
    }

    #[test]
    fn test_extract_sources_from_wire_json() {
        let metadata: GroundingMetadata = serde_json::from_str(
            r#"{"groundingChunks":[{"web":{"uri":"https://example.com","title":"Example"}},{"retrievedContext":{}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_sources(&metadata).len(), 1);

        let empty: GroundingMetadata = serde_json::from_str("{}").unwrap();
        assert!(extract_sources(&empty).is_empty());
    }
}
