//! Fiscomed Core Library
//!
//! Shared functionality for the Fiscomed fiscal transaction classifier:
//! - Database access and migrations
//! - Fiscal classification catalog (Mexican tax legislation)
//! - SAT payment-method catalog and the cash-deductibility rule
//! - Learned classification rules with a similarity fallback
//! - Classification engine with pluggable reasoning advisors
//! - Accountant validation and learning loop

pub mod ai;
pub mod catalog;
pub mod db;
pub mod engine;
pub mod error;
pub mod intake;
pub mod learning;
pub mod models;
pub mod payment;

/// Test utilities including the mock advisor server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AdvisorBackend, AdvisorChain, AdvisorClient, AdvisorRequest, AdvisorSuggestion};
pub use db::{AuditEntry, Database, TransactionInsertResult};
pub use engine::{Classifier, UNCLASSIFIED};
pub use error::{Error, Result};
pub use intake::{record_transaction, IntakeResult, RecordedTransaction};
pub use learning::validate_transaction;
pub use models::{
    ClassificationRule, Confidence, FinancialSummary, NewTransaction, Suggestion,
    SuggestionMethod, Transaction, TransactionKind, ValidationRequest, ValidationStatus,
};
