//! Gemini-compatible advisor backend
//!
//! HTTP client for the Google Generative Language REST API
//! (`models/{model}:generateContent`). Any endpoint speaking the same wire
//! shape works; `FISCOMED_ADVISOR_URL` overrides the base URL, which the
//! tests use to point at the mock advisor server.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::parsing::parse_advisor_suggestion;
use super::types::{AdvisorRequest, AdvisorSuggestion};
use super::AdvisorBackend;

/// Default Google Generative Language API endpoint
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini-compatible advisor backend
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Create a new instance with a different model
    ///
    /// Used when the advisor chain lists several models on the same backend.
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: model.to_string(),
        }
    }

    /// Create from environment variables
    ///
    /// Requires `GEMINI_API_KEY`; `FISCOMED_ADVISOR_URL` overrides the base
    /// URL and `GEMINI_MODEL` the model name.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").ok()?;
        let base_url =
            std::env::var("FISCOMED_ADVISOR_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());
        Some(Self::new(&base_url, &api_key, &model))
    }

    fn build_prompt(request: &AdvisorRequest) -> String {
        let mut prompt = String::from(
            "Eres un contador experto en fiscalidad para médicos en México.\n\
             Clasifica la siguiente transacción en UNA de las clasificaciones \
             fiscales permitidas.\n\nTRANSACCIÓN:\n",
        );
        prompt.push_str(&format!("- Concepto: {}\n", request.concept));
        if !request.provider.is_empty() {
            prompt.push_str(&format!("- Proveedor: {}\n", request.provider));
        }
        prompt.push_str(&format!("- Monto: ${:.2}\n", request.amount));

        prompt.push_str("\nCLASIFICACIONES PERMITIDAS:\n");
        for name in &request.allowed {
            prompt.push_str(&format!("- {}\n", name));
        }

        prompt.push_str(
            "\nResponde ÚNICAMENTE con un objeto JSON con esta estructura exacta:\n\
             {\"classification\": \"nombre exacto de la lista\", \
             \"deductible_percentage\": 0, \
             \"justification\": \"breve justificación\"}",
        );

        prompt
    }
}

/// Request to the generateContent endpoint
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

/// Response from the generateContent endpoint
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl AdvisorBackend for GeminiBackend {
    async fn classify_expense(&self, request: &AdvisorRequest) -> Result<AdvisorSuggestion> {
        let prompt = Self::build_prompt(request);

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self.http_client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(Error::Http(response.error_for_status().unwrap_err()));
        }

        let payload: GenerateContentResponse = response.json().await?;
        let text = payload
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| Error::InvalidData("Empty advisor response".into()))?;

        debug!("Advisor response: {}", text);

        parse_advisor_suggestion(text)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/v1beta/models?key={}", self.base_url, self.api_key);
        match self.http_client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;

    #[test]
    fn test_prompt_lists_allowed_classifications() {
        let request = AdvisorRequest {
            concept: "Gasolina".to_string(),
            provider: "Pemex".to_string(),
            amount: 450.0,
            kind: TransactionKind::Expense,
            allowed: vec!["Gasolina y peajes", "Gastos personales"],
        };

        let prompt = GeminiBackend::build_prompt(&request);
        assert!(prompt.contains("Concepto: Gasolina"));
        assert!(prompt.contains("Proveedor: Pemex"));
        assert!(prompt.contains("- Gasolina y peajes"));
        assert!(prompt.contains("deductible_percentage"));
    }

    #[test]
    fn test_prompt_omits_empty_provider() {
        let request = AdvisorRequest {
            concept: "Papelería".to_string(),
            provider: String::new(),
            amount: 100.0,
            kind: TransactionKind::Expense,
            allowed: vec!["Papelería y artículos escritorio"],
        };

        let prompt = GeminiBackend::build_prompt(&request);
        assert!(!prompt.contains("Proveedor:"));
    }
}
