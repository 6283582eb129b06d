//! Domain models for Fiscomed

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Transaction kind - income or expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" | "ingreso" => Ok(Self::Income),
            "expense" | "gasto" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validation status of a transaction
///
/// Transitions only move forward from `pending`; re-validation may switch
/// between the three terminal states but never back to `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Adjusted,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Adjusted => "adjusted",
        }
    }
}

impl std::str::FromStr for ValidationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" | "pendiente" => Ok(Self::Pending),
            "approved" | "aprobado" => Ok(Self::Approved),
            "rejected" | "rechazado" => Ok(Self::Rejected),
            "adjusted" | "ajustado" => Ok(Self::Adjusted),
            _ => Err(format!("Unknown validation status: {}", s)),
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Confidence tier of a classification suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// How a classification suggestion was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionMethod {
    /// Exact match against a learned rule
    LearnedRule,
    /// Substring-similarity match against a learned rule
    Similarity,
    /// External reasoning advisor, validated against the catalog
    External,
    /// Manual classification supplied at intake
    Manual,
    /// No match - unclassified fallback
    Default,
}

impl SuggestionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LearnedRule => "learned_rule",
            Self::Similarity => "similarity",
            Self::External => "external",
            Self::Manual => "manual",
            Self::Default => "default",
        }
    }
}

/// A classification suggestion produced by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub classification: String,
    /// Deductibility percentage (0-100)
    pub deductible_percentage: i64,
    pub confidence: Confidence,
    pub method: SuggestionMethod,
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// Physician identifier owning this transaction
    pub owner_id: String,
    pub kind: TransactionKind,
    pub date: NaiveDate,
    /// Always positive; kind distinguishes income from expense
    pub amount: f64,
    /// Free-text concept as entered
    pub concept: String,
    /// Provider name; empty when unknown
    pub provider: String,
    /// CFDI (fiscal document) reference, used for duplicate detection
    pub cfdi_uuid: Option<Uuid>,
    pub cfdi_valid: bool,
    /// SAT payment-method code or "CODE - Description" label
    pub payment_method: String,
    /// Classification attached by the engine at intake
    pub suggested_classification: Option<String>,
    /// Classification confirmed by the accountant (None until validated)
    pub confirmed_classification: Option<String>,
    /// Deductibility percentage (0-100)
    pub deductible_percentage: i64,
    pub status: ValidationStatus,
    pub notes: Option<String>,
    pub validated_by: Option<String>,
    pub validated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A new transaction to be recorded (before DB insertion)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub date: NaiveDate,
    pub amount: f64,
    pub concept: String,
    pub provider: String,
    pub cfdi_uuid: Option<Uuid>,
    pub cfdi_valid: bool,
    pub payment_method: String,
    /// Manual classification supplied by the caller; wins over the engine
    /// when it passes catalog validation for the kind
    pub manual_classification: Option<String>,
}

/// A learned (concept, provider) -> classification association
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub id: i64,
    pub owner_id: String,
    /// Verbatim concept string used as the matching key
    pub concept_pattern: String,
    /// Empty string means "any provider"
    pub provider: String,
    pub classification: String,
    pub deductible_percentage: i64,
    /// Number of accountant approvals observed; never decreases
    pub usage_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Accountant decision applied to a pending transaction
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationRequest {
    pub status: ValidationStatus,
    pub classification: Option<String>,
    /// Explicit percentage; always wins over the catalog default
    pub percentage_override: Option<i64>,
    pub notes: Option<String>,
    pub validator: String,
}

/// Financial summary across an owner's transactions
#[derive(Debug, Clone, Serialize)]
pub struct FinancialSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    /// Expense amounts weighted by their stored deductibility percentage
    pub deductible_expenses: f64,
    pub net_profit: f64,
    pub pending_validation: i64,
}
