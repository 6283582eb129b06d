//! JSON parsing helpers for advisor responses
//!
//! These functions extract JSON from model responses, which often include
//! extra text before/after the JSON payload.

use crate::error::{Error, Result};

use super::types::AdvisorSuggestion;

/// Parse a classification suggestion from an advisor response
pub fn parse_advisor_suggestion(response: &str) -> Result<AdvisorSuggestion> {
    // Try to find JSON in the response
    let response = response.trim();

    // Look for JSON object
    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => {
            let json_str = &response[s..=e];
            serde_json::from_str(json_str).map_err(|e| {
                // Truncate long responses for the error message
                let truncated = if json_str.len() > 200 {
                    format!("{}...", &json_str[..200])
                } else {
                    json_str.to_string()
                };
                Error::InvalidData(format!(
                    "Invalid JSON from advisor: {} | Raw: {}",
                    e, truncated
                ))
            })
        }
        _ => Err(Error::InvalidData(format!(
            "No JSON found in advisor response | Raw: {}",
            if response.len() > 200 {
                format!("{}...", &response[..200])
            } else {
                response.to_string()
            }
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let suggestion = parse_advisor_suggestion(
            r#"{"classification": "Gasolina y peajes", "deductible_percentage": 50, "justification": "Combustible"}"#,
        )
        .unwrap();
        assert_eq!(suggestion.classification, "Gasolina y peajes");
        assert_eq!(suggestion.deductible_percentage, 50);
    }

    #[test]
    fn test_parse_json_with_surrounding_text() {
        let suggestion = parse_advisor_suggestion(
            "Aquí está la clasificación:\n```json\n{\"classification\": \"Seguros\", \"deductible_percentage\": 100, \"justification\": \"Prima de seguro\"}\n```",
        )
        .unwrap();
        assert_eq!(suggestion.classification, "Seguros");
    }

    #[test]
    fn test_parse_missing_justification_defaults_empty() {
        let suggestion = parse_advisor_suggestion(
            r#"{"classification": "Publicidad", "deductible_percentage": 100}"#,
        )
        .unwrap();
        assert_eq!(suggestion.justification, "");
    }

    #[test]
    fn test_parse_no_json() {
        assert!(parse_advisor_suggestion("no puedo clasificar esto").is_err());
    }

    #[test]
    fn test_parse_malformed_json() {
        assert!(parse_advisor_suggestion(r#"{"classification": }"#).is_err());
    }
}
