//! Transaction commands: add, classify, validate, list, summary

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;

use fiscomed_core::ai::AdvisorChain;
use fiscomed_core::db::Database;
use fiscomed_core::engine::Classifier;
use fiscomed_core::intake::{record_transaction, IntakeResult};
use fiscomed_core::learning;
use fiscomed_core::models::{
    NewTransaction, TransactionKind, ValidationRequest, ValidationStatus,
};

/// Build a classifier, wiring in the advisor chain when configured
fn classifier<'a>(db: &'a Database, advisors: &'a Option<AdvisorChain>) -> Classifier<'a> {
    match advisors {
        Some(chain) => Classifier::with_advisors(db, chain),
        None => Classifier::new(db),
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn cmd_add(
    db: &Database,
    owner: &str,
    kind: &str,
    amount: f64,
    concept: &str,
    provider: &str,
    date: Option<&str>,
    payment_method: &str,
    cfdi_uuid: Option<&str>,
    classification: Option<String>,
) -> Result<()> {
    let kind: TransactionKind = kind.parse().map_err(|e: String| anyhow!(e))?;
    let date = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .context("Invalid --date format (use YYYY-MM-DD)")?,
        None => chrono::Utc::now().date_naive(),
    };
    let cfdi_uuid = cfdi_uuid
        .map(|s| s.parse().context("Invalid --cfdi-uuid (expected a UUID)"))
        .transpose()?;

    let tx = NewTransaction {
        kind,
        date,
        amount,
        concept: concept.to_string(),
        provider: provider.to_string(),
        cfdi_uuid,
        cfdi_valid: cfdi_uuid.is_some(),
        payment_method: payment_method.to_string(),
        manual_classification: classification,
    };

    let advisors = AdvisorChain::from_env();
    let classifier = classifier(db, &advisors);

    match record_transaction(db, &classifier, owner, &tx).await? {
        IntakeResult::Recorded(recorded) => {
            println!("✅ Transaction {} recorded", recorded.transaction_id);
            println!(
                "   Suggestion: {} ({}%, {} via {})",
                recorded.suggestion.classification,
                recorded.suggestion.deductible_percentage,
                recorded.suggestion.confidence.as_str(),
                recorded.suggestion.method.as_str(),
            );
            if let Some(warning) = recorded.cash_warning {
                println!("   ⚠️  {}", warning);
            }
        }
        IntakeResult::Duplicate { existing_id } => {
            println!(
                "⏭️  Skipped: fiscal document already recorded as transaction {}",
                existing_id
            );
        }
    }

    Ok(())
}

pub async fn cmd_classify(
    db: &Database,
    owner: &str,
    concept: &str,
    provider: &str,
    kind: &str,
    amount: f64,
) -> Result<()> {
    let kind: TransactionKind = kind.parse().map_err(|e: String| anyhow!(e))?;

    let advisors = AdvisorChain::from_env();
    if advisors.is_none() {
        println!("   💡 Tip: Set GEMINI_API_KEY to enable advisor escalation");
    }
    let classifier = classifier(db, &advisors);

    let suggestion = classifier.classify(owner, concept, provider, kind, amount).await?;

    println!("🔎 {}", concept);
    println!("   Classification: {}", suggestion.classification);
    println!("   Deductible: {}%", suggestion.deductible_percentage);
    println!("   Confidence: {}", suggestion.confidence.as_str());
    println!("   Method: {}", suggestion.method.as_str());

    Ok(())
}

pub fn cmd_validate(
    db: &Database,
    id: i64,
    status: &str,
    classification: Option<String>,
    percentage: Option<i64>,
    notes: Option<String>,
    validator: &str,
) -> Result<()> {
    let status: ValidationStatus = status.parse().map_err(|e: String| anyhow!(e))?;

    let request = ValidationRequest {
        status,
        classification,
        percentage_override: percentage,
        notes,
        validator: validator.to_string(),
    };

    if learning::validate_transaction(db, id, &request)? {
        let tx = db.get_transaction(id)?.context("Transaction vanished")?;
        println!("✅ Transaction {} {}", id, status);
        println!(
            "   Classification: {} ({}% deductible)",
            tx.confirmed_classification.as_deref().unwrap_or("-"),
            tx.deductible_percentage
        );
    } else {
        println!("❌ Transaction {} not found", id);
    }

    Ok(())
}

pub fn cmd_transactions(
    db: &Database,
    owner: &str,
    limit: i64,
    status: Option<&str>,
) -> Result<()> {
    let status = status
        .map(|s| s.parse::<ValidationStatus>().map_err(|e| anyhow!(e)))
        .transpose()?;

    let transactions = db.list_transactions(owner, status, None, limit, 0)?;
    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!(
        "{:>5}  {:<10}  {:<8}  {:>10}  {:<30}  {:<10}  {}",
        "ID", "DATE", "KIND", "AMOUNT", "CONCEPT", "STATUS", "CLASSIFICATION"
    );
    for tx in transactions {
        let classification = tx
            .confirmed_classification
            .or(tx.suggested_classification)
            .unwrap_or_default();
        println!(
            "{:>5}  {:<10}  {:<8}  {:>10.2}  {:<30}  {:<10}  {} ({}%)",
            tx.id,
            tx.date,
            tx.kind.as_str(),
            tx.amount,
            truncate(&tx.concept, 30),
            tx.status.as_str(),
            classification,
            tx.deductible_percentage,
        );
    }

    Ok(())
}

pub fn cmd_summary(db: &Database, owner: &str) -> Result<()> {
    let summary = db.financial_summary(owner)?;

    println!("📊 Financial summary");
    println!("   ─────────────────────────────");
    println!("   💰 Total income:        ${:>12.2}", summary.total_income);
    println!("   💸 Total expenses:      ${:>12.2}", summary.total_expenses);
    println!("   🧾 Deductible expenses: ${:>12.2}", summary.deductible_expenses);
    println!("   📈 Net profit:          ${:>12.2}", summary.net_profit);
    println!("   ⏳ Pending validation:  {:>13}", summary.pending_validation);

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
