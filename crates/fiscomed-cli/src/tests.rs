//! CLI command tests against a temp database

use fiscomed_core::db::Database;
use fiscomed_core::models::ValidationStatus;

use crate::commands;

const OWNER: &str = "default";

#[tokio::test]
async fn test_seed_populates_transactions_and_rules() {
    let db = Database::in_memory().unwrap();

    commands::cmd_seed(&db, OWNER).await.unwrap();

    let transactions = db.list_transactions(OWNER, None, None, 100, 0).unwrap();
    assert_eq!(transactions.len(), 9);

    let (rule_count, uses) = db.rule_stats(OWNER).unwrap();
    assert!(rule_count >= 5);
    // Seed validations reinforce some starter rules
    assert!(uses > rule_count);

    // Seeded expenses picked up the starter rules at intake
    let gasolina = transactions
        .iter()
        .find(|t| t.concept == "Gasolina" && t.payment_method.starts_with("04"))
        .unwrap();
    assert_eq!(
        gasolina.suggested_classification.as_deref(),
        Some("Gasolina y peajes")
    );

    // The cash fill-up over the limit was forced to 0%
    let cash = transactions
        .iter()
        .find(|t| t.payment_method.starts_with("01"))
        .unwrap();
    assert_eq!(cash.deductible_percentage, 0);
}

#[tokio::test]
async fn test_seed_is_rerunnable() {
    let db = Database::in_memory().unwrap();

    commands::cmd_seed(&db, OWNER).await.unwrap();
    commands::cmd_seed(&db, OWNER).await.unwrap();

    // Seed rows carry no CFDI UUIDs, so they insert again; rules stay unique
    let (rule_count, _) = db.rule_stats(OWNER).unwrap();
    assert_eq!(rule_count, 5);
}

#[tokio::test]
async fn test_add_and_validate_commands() {
    let db = Database::in_memory().unwrap();

    commands::cmd_add(
        &db,
        OWNER,
        "expense",
        450.0,
        "Gasolina",
        "Pemex",
        Some("2024-03-15"),
        "04 - Tarjeta de crédito",
        None,
        None,
    )
    .await
    .unwrap();

    let transactions = db.list_transactions(OWNER, None, None, 10, 0).unwrap();
    assert_eq!(transactions.len(), 1);
    let id = transactions[0].id;

    commands::cmd_validate(
        &db,
        id,
        "approved",
        Some("Gasolina y peajes".to_string()),
        None,
        None,
        "contador",
    )
    .unwrap();

    let tx = db.get_transaction(id).unwrap().unwrap();
    assert_eq!(tx.status, ValidationStatus::Approved);
    assert_eq!(tx.deductible_percentage, 50);

    // Validating a missing transaction reports, but does not error
    commands::cmd_validate(&db, 9999, "rejected", None, None, None, "contador").unwrap();
}

#[tokio::test]
async fn test_add_rejects_bad_kind() {
    let db = Database::in_memory().unwrap();

    let result = commands::cmd_add(
        &db,
        OWNER,
        "transfer",
        100.0,
        "Algo",
        "",
        None,
        "04",
        None,
        None,
    )
    .await;
    assert!(result.is_err());
}
