//! Transaction intake
//!
//! Records an incoming transaction with the engine's suggestion attached and
//! status `pending`. The cash-payment policy runs for expenses and overrides
//! any classification-derived percentage; duplicate fiscal documents are
//! reported, not re-inserted.

use tracing::info;

use crate::catalog;
use crate::db::{Database, TransactionInsertResult};
use crate::engine::Classifier;
use crate::error::{Error, Result};
use crate::models::{
    Confidence, NewTransaction, Suggestion, SuggestionMethod, TransactionKind,
};
use crate::payment;

/// Outcome of recording a transaction
#[derive(Debug, Clone)]
pub enum IntakeResult {
    Recorded(RecordedTransaction),
    /// The CFDI UUID matched an existing row; nothing was inserted
    Duplicate { existing_id: i64 },
}

/// A freshly recorded transaction
#[derive(Debug, Clone)]
pub struct RecordedTransaction {
    pub transaction_id: i64,
    pub suggestion: Suggestion,
    /// Human-readable cash-policy warning, when the payment is cash over the limit
    pub cash_warning: Option<String>,
}

/// Record a transaction, attaching a classification suggestion
///
/// Boundary checks (positive amount, known payment-method code) are rejected
/// here with `InvalidData` before any engine or storage work happens.
pub async fn record_transaction(
    db: &Database,
    classifier: &Classifier<'_>,
    owner: &str,
    tx: &NewTransaction,
) -> Result<IntakeResult> {
    if tx.amount <= 0.0 {
        return Err(Error::InvalidData(format!(
            "Transaction amount must be positive, got {}",
            tx.amount
        )));
    }

    if !tx.payment_method.is_empty() && !payment::is_valid_code(&tx.payment_method) {
        return Err(Error::InvalidData(format!(
            "Unknown payment method: {}",
            tx.payment_method
        )));
    }

    // A valid manual classification wins over the engine
    let mut suggestion = match tx
        .manual_classification
        .as_deref()
        .filter(|name| catalog::is_valid(name, tx.kind))
    {
        Some(name) => Suggestion {
            classification: name.to_string(),
            deductible_percentage: if tx.kind == TransactionKind::Income {
                0
            } else {
                catalog::default_percentage(name)
            },
            confidence: Confidence::High,
            method: SuggestionMethod::Manual,
        },
        None => {
            classifier
                .classify(owner, &tx.concept, &tx.provider, tx.kind, tx.amount)
                .await?
        }
    };

    // The cash rule overrides whatever deductibility the classification implied
    let mut cash_warning = None;
    if tx.kind == TransactionKind::Expense {
        let cash = payment::evaluate_cash_deductibility(tx.amount, &tx.payment_method);
        if !cash.is_deductible {
            suggestion.deductible_percentage = 0;
            cash_warning = cash.message;
        }
    }

    match db.insert_transaction(owner, tx, &suggestion)? {
        TransactionInsertResult::Duplicate(existing_id) => {
            info!(
                cfdi_uuid = ?tx.cfdi_uuid,
                existing_id,
                "Skipping duplicate fiscal document"
            );
            Ok(IntakeResult::Duplicate { existing_id })
        }
        TransactionInsertResult::Inserted(transaction_id) => {
            info!(
                transaction_id,
                kind = %tx.kind,
                classification = %suggestion.classification,
                method = suggestion.method.as_str(),
                "Transaction recorded"
            );
            Ok(IntakeResult::Recorded(RecordedTransaction {
                transaction_id,
                suggestion,
                cash_warning,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidationStatus;
    use chrono::NaiveDate;
    use uuid::Uuid;

    const OWNER: &str = "default";

    fn expense(concept: &str, amount: f64, payment_method: &str) -> NewTransaction {
        NewTransaction {
            kind: TransactionKind::Expense,
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            amount,
            concept: concept.to_string(),
            provider: String::new(),
            cfdi_uuid: None,
            cfdi_valid: false,
            payment_method: payment_method.to_string(),
            manual_classification: None,
        }
    }

    #[tokio::test]
    async fn test_record_attaches_suggestion_and_pending_status() {
        let db = Database::in_memory().unwrap();
        db.upsert_rule(OWNER, "Gasolina", "", "Gasolina y peajes", 50).unwrap();
        let classifier = Classifier::new(&db);

        let result = record_transaction(
            &db,
            &classifier,
            OWNER,
            &expense("Gasolina", 450.0, "04 - Tarjeta de crédito"),
        )
        .await
        .unwrap();

        let recorded = match result {
            IntakeResult::Recorded(r) => r,
            other => panic!("Expected Recorded, got {:?}", other),
        };
        assert_eq!(recorded.suggestion.classification, "Gasolina y peajes");
        assert!(recorded.cash_warning.is_none());

        let stored = db.get_transaction(recorded.transaction_id).unwrap().unwrap();
        assert_eq!(stored.status, ValidationStatus::Pending);
        assert_eq!(
            stored.suggested_classification.as_deref(),
            Some("Gasolina y peajes")
        );
        assert_eq!(stored.deductible_percentage, 50);
        assert!(stored.confirmed_classification.is_none());
    }

    #[tokio::test]
    async fn test_cash_over_limit_forces_zero_percentage() {
        let db = Database::in_memory().unwrap();
        db.upsert_rule(OWNER, "Renta de consultorio", "", "Renta de consultorio", 100)
            .unwrap();
        let classifier = Classifier::new(&db);

        let result = record_transaction(
            &db,
            &classifier,
            OWNER,
            &expense("Renta de consultorio", 8500.0, "01 - Efectivo"),
        )
        .await
        .unwrap();

        let recorded = match result {
            IntakeResult::Recorded(r) => r,
            other => panic!("Expected Recorded, got {:?}", other),
        };
        // Classification survives, but the cash rule wins on deductibility
        assert_eq!(recorded.suggestion.classification, "Renta de consultorio");
        assert_eq!(recorded.suggestion.deductible_percentage, 0);
        assert!(recorded.cash_warning.is_some());
    }

    #[tokio::test]
    async fn test_manual_classification_wins_when_valid() {
        let db = Database::in_memory().unwrap();
        let classifier = Classifier::new(&db);

        let mut tx = expense("Algo raro", 300.0, "03 - Transferencia electrónica");
        tx.manual_classification = Some("Publicidad".to_string());

        let result = record_transaction(&db, &classifier, OWNER, &tx).await.unwrap();
        let recorded = match result {
            IntakeResult::Recorded(r) => r,
            other => panic!("Expected Recorded, got {:?}", other),
        };
        assert_eq!(recorded.suggestion.classification, "Publicidad");
        assert_eq!(recorded.suggestion.method, SuggestionMethod::Manual);
        assert_eq!(recorded.suggestion.deductible_percentage, 100);
    }

    #[tokio::test]
    async fn test_invalid_manual_classification_falls_through_to_engine() {
        let db = Database::in_memory().unwrap();
        let classifier = Classifier::new(&db);

        let mut tx = expense("Algo raro", 300.0, "03");
        // An income-only name is invalid for an expense
        tx.manual_classification = Some("Ingresos exentos".to_string());

        let result = record_transaction(&db, &classifier, OWNER, &tx).await.unwrap();
        let recorded = match result {
            IntakeResult::Recorded(r) => r,
            other => panic!("Expected Recorded, got {:?}", other),
        };
        assert_eq!(recorded.suggestion.method, SuggestionMethod::Default);
    }

    #[tokio::test]
    async fn test_duplicate_cfdi_uuid_is_reported() {
        let db = Database::in_memory().unwrap();
        let classifier = Classifier::new(&db);

        let uuid = Uuid::new_v4();
        let mut tx = expense("Material de oficina", 650.0, "04");
        tx.cfdi_uuid = Some(uuid);
        tx.cfdi_valid = true;

        let first = record_transaction(&db, &classifier, OWNER, &tx).await.unwrap();
        let first_id = match first {
            IntakeResult::Recorded(r) => r.transaction_id,
            other => panic!("Expected Recorded, got {:?}", other),
        };

        let second = record_transaction(&db, &classifier, OWNER, &tx).await.unwrap();
        match second {
            IntakeResult::Duplicate { existing_id } => assert_eq!(existing_id, first_id),
            other => panic!("Expected Duplicate, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejects_non_positive_amount() {
        let db = Database::in_memory().unwrap();
        let classifier = Classifier::new(&db);

        let result =
            record_transaction(&db, &classifier, OWNER, &expense("Gasolina", 0.0, "01")).await;
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_rejects_unknown_payment_method() {
        let db = Database::in_memory().unwrap();
        let classifier = Classifier::new(&db);

        let result =
            record_transaction(&db, &classifier, OWNER, &expense("Gasolina", 100.0, "77")).await;
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }
}
