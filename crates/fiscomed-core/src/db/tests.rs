//! Database layer tests

use chrono::NaiveDate;

use super::{Database, TransactionInsertResult};
use crate::models::{
    Confidence, NewTransaction, Suggestion, SuggestionMethod, TransactionKind, ValidationStatus,
};

const OWNER: &str = "default";

fn new_expense(concept: &str, provider: &str, amount: f64) -> NewTransaction {
    NewTransaction {
        kind: TransactionKind::Expense,
        date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        amount,
        concept: concept.to_string(),
        provider: provider.to_string(),
        cfdi_uuid: None,
        cfdi_valid: false,
        payment_method: "03 - Transferencia electrónica".to_string(),
        manual_classification: None,
    }
}

fn default_suggestion() -> Suggestion {
    Suggestion {
        classification: "Unclassified".to_string(),
        deductible_percentage: 0,
        confidence: Confidence::Low,
        method: SuggestionMethod::Default,
    }
}

fn insert(db: &Database, tx: &NewTransaction) -> i64 {
    match db.insert_transaction(OWNER, tx, &default_suggestion()).unwrap() {
        TransactionInsertResult::Inserted(id) => id,
        TransactionInsertResult::Duplicate(_) => panic!("Unexpected duplicate"),
    }
}

#[test]
fn test_insert_and_get_round_trip() {
    let db = Database::in_memory().unwrap();

    let mut tx = new_expense("Gasolina", "Pemex", 450.0);
    tx.cfdi_uuid = Some(uuid::Uuid::new_v4());
    tx.cfdi_valid = true;
    let id = insert(&db, &tx);

    let stored = db.get_transaction(id).unwrap().unwrap();
    assert_eq!(stored.concept, "Gasolina");
    assert_eq!(stored.provider, "Pemex");
    assert_eq!(stored.kind, TransactionKind::Expense);
    assert_eq!(stored.amount, 450.0);
    assert_eq!(stored.cfdi_uuid, tx.cfdi_uuid);
    assert!(stored.cfdi_valid);
    assert_eq!(stored.status, ValidationStatus::Pending);
    assert_eq!(stored.date, tx.date);
}

#[test]
fn test_get_missing_transaction() {
    let db = Database::in_memory().unwrap();
    assert!(db.get_transaction(42).unwrap().is_none());
}

#[test]
fn test_duplicate_cfdi_uuid_detected() {
    let db = Database::in_memory().unwrap();

    let mut tx = new_expense("Material de oficina", "Office Depot", 650.0);
    tx.cfdi_uuid = Some(uuid::Uuid::new_v4());
    let id = insert(&db, &tx);

    match db.insert_transaction(OWNER, &tx, &default_suggestion()).unwrap() {
        TransactionInsertResult::Duplicate(existing) => assert_eq!(existing, id),
        TransactionInsertResult::Inserted(_) => panic!("Duplicate not detected"),
    }
}

#[test]
fn test_transactions_without_cfdi_never_collide() {
    let db = Database::in_memory().unwrap();

    let tx = new_expense("Gasolina", "Pemex", 450.0);
    insert(&db, &tx);
    insert(&db, &tx);

    let listed = db.list_transactions(OWNER, None, None, 100, 0).unwrap();
    assert_eq!(listed.len(), 2);
}

#[test]
fn test_list_filters_by_status_and_kind() {
    let db = Database::in_memory().unwrap();

    let expense_id = insert(&db, &new_expense("Gasolina", "Pemex", 450.0));
    let mut income = new_expense("Consulta médica", "Paciente", 1500.0);
    income.kind = TransactionKind::Income;
    insert(&db, &income);

    db.apply_validation(
        expense_id,
        ValidationStatus::Approved,
        Some("Gasolina y peajes"),
        50,
        None,
        "contador",
    )
    .unwrap();

    let pending = db
        .list_transactions(OWNER, Some(ValidationStatus::Pending), None, 100, 0)
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].kind, TransactionKind::Income);

    let expenses = db
        .list_transactions(OWNER, None, Some(TransactionKind::Expense), 100, 0)
        .unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].id, expense_id);
}

#[test]
fn test_apply_validation_returns_false_for_missing_row() {
    let db = Database::in_memory().unwrap();
    let updated = db
        .apply_validation(777, ValidationStatus::Approved, Some("Seguros"), 100, None, "c")
        .unwrap();
    assert!(!updated);
}

#[test]
fn test_find_rule_exact_key() {
    let db = Database::in_memory().unwrap();
    db.upsert_rule(OWNER, "Gasolina", "Pemex", "Gasolina y peajes", 50).unwrap();

    assert!(db.find_rule(OWNER, "Gasolina", "Pemex").unwrap().is_some());
    // Provider is part of the key
    assert!(db.find_rule(OWNER, "Gasolina", "Shell").unwrap().is_none());
    // So is the owner
    assert!(db.find_rule("other", "Gasolina", "Pemex").unwrap().is_none());
}

#[test]
fn test_find_similar_both_directions() {
    let db = Database::in_memory().unwrap();
    db.upsert_rule(OWNER, "Material médico", "", "Material de curación", 100)
        .unwrap();

    // Stored pattern is a substring of the query
    let hit = db
        .find_similar(OWNER, "Material médico - Guantes y cubrebocas")
        .unwrap();
    assert!(hit.is_some());

    // Query is a substring of the stored pattern
    let hit = db.find_similar(OWNER, "médico").unwrap();
    assert!(hit.is_some());

    // No containment either way
    assert!(db.find_similar(OWNER, "Papelería").unwrap().is_none());

    // Empty concepts never match anything
    assert!(db.find_similar(OWNER, "").unwrap().is_none());
}

#[test]
fn test_find_similar_prefers_higher_usage() {
    let db = Database::in_memory().unwrap();
    db.upsert_rule(OWNER, "Gasolina", "Pemex", "Gasolina y peajes", 50).unwrap();
    db.upsert_rule(OWNER, "Gasolina premium", "Shell", "Gastos personales", 0)
        .unwrap();

    // Reinforce the second rule twice
    db.upsert_rule(OWNER, "Gasolina premium", "Shell", "Gastos personales", 0)
        .unwrap();
    db.upsert_rule(OWNER, "Gasolina premium", "Shell", "Gastos personales", 0)
        .unwrap();

    let hit = db.find_similar(OWNER, "Gasolina premium magna").unwrap().unwrap();
    assert_eq!(hit.classification, "Gastos personales");
    assert_eq!(hit.usage_count, 3);
}

#[test]
fn test_upsert_reinforces_and_overwrites() {
    let db = Database::in_memory().unwrap();

    db.upsert_rule(OWNER, "internet", "Telcel", "Teléfono e internet", 100).unwrap();
    let rule = db.find_rule(OWNER, "internet", "Telcel").unwrap().unwrap();
    assert_eq!(rule.usage_count, 1);

    // Same key: usage grows, classification/percentage follow the last writer
    db.upsert_rule(OWNER, "internet", "Telcel", "Gastos personales", 0).unwrap();
    let rule = db.find_rule(OWNER, "internet", "Telcel").unwrap().unwrap();
    assert_eq!(rule.usage_count, 2);
    assert_eq!(rule.classification, "Gastos personales");
    assert_eq!(rule.deductible_percentage, 0);

    // Only one row exists for the key
    assert_eq!(db.rule_stats(OWNER).unwrap(), (1, 2));
}

#[test]
fn test_list_rules_ordered_by_usage() {
    let db = Database::in_memory().unwrap();

    db.upsert_rule(OWNER, "Gasolina", "Pemex", "Gasolina y peajes", 50).unwrap();
    db.upsert_rule(OWNER, "Renta", "", "Renta de consultorio", 100).unwrap();
    db.upsert_rule(OWNER, "Renta", "", "Renta de consultorio", 100).unwrap();

    let rules = db.list_rules(OWNER, 10).unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].concept_pattern, "Renta");
    assert_eq!(rules[0].usage_count, 2);
}

#[test]
fn test_financial_summary() {
    let db = Database::in_memory().unwrap();

    let mut income = new_expense("Consulta", "Paciente", 1500.0);
    income.kind = TransactionKind::Income;
    insert(&db, &income);

    let expense_id = insert(&db, &new_expense("Gasolina", "Pemex", 400.0));
    db.apply_validation(
        expense_id,
        ValidationStatus::Approved,
        Some("Gasolina y peajes"),
        50,
        None,
        "contador",
    )
    .unwrap();

    let summary = db.financial_summary(OWNER).unwrap();
    assert_eq!(summary.total_income, 1500.0);
    assert_eq!(summary.total_expenses, 400.0);
    // 400 at 50% deductibility
    assert_eq!(summary.deductible_expenses, 200.0);
    assert_eq!(summary.net_profit, 1100.0);
    assert_eq!(summary.pending_validation, 1);
}

#[test]
fn test_audit_log_round_trip() {
    let db = Database::in_memory().unwrap();

    db.log_audit("contador", "validate", Some("transaction"), Some(1), Some("approved"))
        .unwrap();
    db.log_audit("api", "list", Some("rules"), None, None).unwrap();

    let entries = db.list_audit(10).unwrap();
    assert_eq!(entries.len(), 2);
    // Newest first
    assert_eq!(entries[0].user, "api");
    assert_eq!(entries[1].action, "validate");
    assert_eq!(entries[1].entity_id, Some(1));
}
