//! Validation and learning loop
//!
//! Applies an accountant decision to a pending transaction and, on approval,
//! feeds the confirmed classification back into the rule store. Approvals are
//! the sole write path into the store - rejections and adjustments do not
//! teach the engine.

use tracing::{debug, info};

use crate::catalog;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{TransactionKind, ValidationRequest, ValidationStatus};

/// Apply an accountant decision to a transaction
///
/// Returns `Ok(false)` when the transaction does not exist (or no row was
/// affected); re-validation of an already-validated transaction simply
/// overwrites the previous decision.
///
/// Percentage resolution: a classification valid for the transaction's kind
/// defaults to the catalog percentage; an explicit override always wins;
/// an absent or invalid classification falls back to the override or 0.
/// Income transactions always resolve to 0.
pub fn validate_transaction(
    db: &Database,
    transaction_id: i64,
    request: &ValidationRequest,
) -> Result<bool> {
    if request.status == ValidationStatus::Pending {
        return Err(Error::InvalidData(
            "Validation status must be approved, rejected, or adjusted".to_string(),
        ));
    }

    let tx = match db.get_transaction(transaction_id)? {
        Some(tx) => tx,
        None => {
            debug!(transaction_id, "Validation target not found");
            return Ok(false);
        }
    };

    let classification = request
        .classification
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let classification_valid = classification
        .map(|name| catalog::is_valid(name, tx.kind))
        .unwrap_or(false);

    let mut percentage = if classification_valid {
        // Accountant discretion: an explicit override beats the catalog default
        request
            .percentage_override
            .unwrap_or_else(|| catalog::default_percentage(classification.unwrap()))
    } else {
        request.percentage_override.unwrap_or(0)
    };
    percentage = percentage.clamp(0, 100);

    if tx.kind == TransactionKind::Income {
        percentage = 0;
    }

    let updated = db.apply_validation(
        transaction_id,
        request.status,
        classification,
        percentage,
        request.notes.as_deref(),
        &request.validator,
    )?;

    if !updated {
        return Ok(false);
    }

    // Only approvals with a classification teach the engine
    if request.status == ValidationStatus::Approved {
        if let Some(name) = classification {
            db.upsert_rule(&tx.owner_id, &tx.concept, &tx.provider, name, percentage)?;
            info!(
                transaction_id,
                owner = %tx.owner_id,
                concept = %tx.concept,
                classification = name,
                percentage,
                "Learned classification rule from approval"
            );
        }
    }

    Ok(true)
}
