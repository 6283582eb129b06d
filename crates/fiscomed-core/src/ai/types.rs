//! Advisor request/response types
//!
//! These types are backend-agnostic and used across all advisor implementations.

use serde::{Deserialize, Serialize};

use crate::models::TransactionKind;

/// A bounded classification request for the reasoning advisor
#[derive(Debug, Clone)]
pub struct AdvisorRequest {
    /// Free-text concept of the transaction
    pub concept: String,
    /// Provider name; empty when unknown
    pub provider: String,
    pub amount: f64,
    pub kind: TransactionKind,
    /// The full list of valid catalog classification names for the kind.
    /// The advisor must answer with one of these; anything else is discarded.
    pub allowed: Vec<&'static str>,
}

/// Advisor answer, constrained to the JSON contract
/// `{classification, deductible_percentage, justification}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorSuggestion {
    pub classification: String,
    pub deductible_percentage: i64,
    #[serde(default)]
    pub justification: String,
}
