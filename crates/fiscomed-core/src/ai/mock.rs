//! Mock advisor backend for testing
//!
//! Returns keyword-driven canned answers for all advisor operations.
//! Useful for unit tests and development without API credentials.

use async_trait::async_trait;

use crate::error::Result;

use super::types::{AdvisorRequest, AdvisorSuggestion};
use super::AdvisorBackend;

/// Mock advisor backend
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self { healthy: true }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self { healthy: false }
    }
}

#[async_trait]
impl AdvisorBackend for MockBackend {
    async fn classify_expense(&self, request: &AdvisorRequest) -> Result<AdvisorSuggestion> {
        let concept = request.concept.to_lowercase();

        let (classification, percentage, justification) = if concept.contains("gasolina")
            || concept.contains("peaje")
        {
            ("Gasolina y peajes", 50, "Combustible para la actividad profesional")
        } else if concept.contains("renta") {
            ("Renta de consultorio", 100, "Renta del local profesional")
        } else if concept.contains("material") || concept.contains("curación") {
            ("Material de curación", 100, "Material médico")
        } else if concept.contains("internet") || concept.contains("teléfono") {
            ("Teléfono e internet", 100, "Servicios de comunicación")
        } else if concept.contains("curso") || concept.contains("congreso") {
            ("Capacitación y congresos", 100, "Actualización profesional")
        } else if concept.contains("papeler") || concept.contains("oficina") {
            ("Papelería y artículos escritorio", 100, "Material de oficina")
        } else if concept.contains("seguro") {
            ("Seguros", 100, "Prima de seguro profesional")
        } else if concept.contains("multa") || concept.contains("recargo") {
            ("Multas y recargos", 0, "Sanción no deducible")
        } else {
            ("Gastos personales", 0, "Sin relación clara con la actividad")
        };

        Ok(AdvisorSuggestion {
            classification: classification.to_string(),
            deductible_percentage: percentage,
            justification: justification.to_string(),
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;

    fn request(concept: &str) -> AdvisorRequest {
        AdvisorRequest {
            concept: concept.to_string(),
            provider: String::new(),
            amount: 100.0,
            kind: TransactionKind::Expense,
            allowed: vec![],
        }
    }

    #[tokio::test]
    async fn test_mock_keyword_classification() {
        let backend = MockBackend::new();

        let suggestion = backend.classify_expense(&request("Gasolina Pemex")).await.unwrap();
        assert_eq!(suggestion.classification, "Gasolina y peajes");
        assert_eq!(suggestion.deductible_percentage, 50);

        let suggestion = backend
            .classify_expense(&request("Renta de local marzo"))
            .await
            .unwrap();
        assert_eq!(suggestion.classification, "Renta de consultorio");
    }

    #[tokio::test]
    async fn test_mock_unknown_concept_is_non_deductible() {
        let backend = MockBackend::new();
        let suggestion = backend.classify_expense(&request("xyz123")).await.unwrap();
        assert_eq!(suggestion.classification, "Gastos personales");
        assert_eq!(suggestion.deductible_percentage, 0);
    }
}
