//! Seed the database with demo data
//!
//! Mirrors a typical month of a small medical practice: consultation income,
//! recurring expenses, a starter rule set, and a couple of validated rows so
//! the summary has something to show.

use anyhow::Result;
use chrono::{Duration, Utc};

use fiscomed_core::db::Database;
use fiscomed_core::engine::Classifier;
use fiscomed_core::intake::{record_transaction, IntakeResult};
use fiscomed_core::learning;
use fiscomed_core::models::{
    NewTransaction, TransactionKind, ValidationRequest, ValidationStatus,
};

struct SeedRow {
    kind: TransactionKind,
    days_ago: i64,
    amount: f64,
    concept: &'static str,
    provider: &'static str,
    payment_method: &'static str,
}

const SEED_ROWS: &[SeedRow] = &[
    // Income
    SeedRow {
        kind: TransactionKind::Income,
        days_ago: 5,
        amount: 1500.0,
        concept: "Consulta médica general",
        provider: "Paciente: Juan Pérez",
        payment_method: "04 - Tarjeta de crédito",
    },
    SeedRow {
        kind: TransactionKind::Income,
        days_ago: 4,
        amount: 2500.0,
        concept: "Consulta de especialidad",
        provider: "Paciente: María González",
        payment_method: "03 - Transferencia electrónica",
    },
    SeedRow {
        kind: TransactionKind::Income,
        days_ago: 2,
        amount: 3000.0,
        concept: "Procedimiento menor",
        provider: "Paciente: Ana López",
        payment_method: "28 - Tarjeta de débito",
    },
    // Expenses
    SeedRow {
        kind: TransactionKind::Expense,
        days_ago: 6,
        amount: 8500.0,
        concept: "Renta de consultorio",
        provider: "Inmobiliaria del Centro",
        payment_method: "03 - Transferencia electrónica",
    },
    SeedRow {
        kind: TransactionKind::Expense,
        days_ago: 5,
        amount: 450.0,
        concept: "Gasolina",
        provider: "Pemex",
        payment_method: "04 - Tarjeta de crédito",
    },
    SeedRow {
        kind: TransactionKind::Expense,
        days_ago: 4,
        amount: 1200.0,
        concept: "Material médico - Guantes y cubrebocas",
        provider: "Distribuidora Médica SA",
        payment_method: "04 - Tarjeta de crédito",
    },
    SeedRow {
        kind: TransactionKind::Expense,
        days_ago: 3,
        amount: 350.0,
        concept: "Servicio de internet",
        provider: "Telcel",
        payment_method: "28 - Tarjeta de débito",
    },
    SeedRow {
        kind: TransactionKind::Expense,
        days_ago: 2,
        amount: 2800.0,
        concept: "Curso de actualización médica",
        provider: "Colegio Médico Nacional",
        payment_method: "03 - Transferencia electrónica",
    },
    SeedRow {
        kind: TransactionKind::Expense,
        days_ago: 0,
        amount: 2300.0,
        // Cash over the limit: recorded, but flagged non-deductible
        concept: "Gasolina",
        provider: "Pemex",
        payment_method: "01 - Efectivo",
    },
];

/// Starter rules: (concept pattern, provider, classification, percentage)
const SEED_RULES: &[(&str, &str, &str, i64)] = &[
    ("Renta de consultorio", "Inmobiliaria del Centro", "Renta de consultorio", 100),
    ("Gasolina", "Pemex", "Gasolina y peajes", 50),
    ("Material médico", "", "Material de curación", 100),
    ("Curso", "", "Capacitación y congresos", 100),
    ("internet", "Telcel", "Teléfono e internet", 100),
];

pub async fn cmd_seed(db: &Database, owner: &str) -> Result<()> {
    println!("🌱 Seeding demo data...");

    // Rules first, so intake already benefits from them
    for (pattern, provider, classification, percentage) in SEED_RULES {
        db.upsert_rule(owner, pattern, provider, classification, *percentage)?;
    }
    println!("   🧠 {} starter rules", SEED_RULES.len());

    let classifier = Classifier::new(db);
    let today = Utc::now().date_naive();

    let mut recorded_ids = Vec::new();
    for row in SEED_ROWS {
        let tx = NewTransaction {
            kind: row.kind,
            date: today - Duration::days(row.days_ago),
            amount: row.amount,
            concept: row.concept.to_string(),
            provider: row.provider.to_string(),
            cfdi_uuid: None,
            cfdi_valid: false,
            payment_method: row.payment_method.to_string(),
            manual_classification: None,
        };

        match record_transaction(db, &classifier, owner, &tx).await? {
            IntakeResult::Recorded(recorded) => {
                println!(
                    "   ✅ {} ${:.2} - {} → {}",
                    row.kind.as_str(),
                    row.amount,
                    row.concept,
                    recorded.suggestion.classification
                );
                recorded_ids.push((recorded.transaction_id, recorded.suggestion));
            }
            IntakeResult::Duplicate { existing_id } => {
                println!("   ⏭️  duplicate of {}", existing_id);
            }
        }
    }

    // Validate a couple of expenses so the learning loop has run
    let mut validated = 0;
    for (id, suggestion) in recorded_ids.iter().take(5) {
        if suggestion.classification == fiscomed_core::engine::UNCLASSIFIED {
            continue;
        }
        let request = ValidationRequest {
            status: ValidationStatus::Approved,
            classification: Some(suggestion.classification.clone()),
            percentage_override: None,
            notes: Some("Validado automáticamente en seed".to_string()),
            validator: "sistema".to_string(),
        };
        if learning::validate_transaction(db, *id, &request)? {
            validated += 1;
        }
    }
    println!("   ✓ {} transactions validated", validated);

    let summary = db.financial_summary(owner)?;
    println!();
    println!("📊 Seeded totals:");
    println!("   💰 Income:  ${:.2}", summary.total_income);
    println!("   💸 Expenses: ${:.2}", summary.total_expenses);
    println!("   ⏳ Pending validation: {}", summary.pending_validation);

    println!();
    println!("✨ Done. Try: fiscomed transactions, fiscomed rules, fiscomed serve");

    Ok(())
}
