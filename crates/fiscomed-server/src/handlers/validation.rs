//! Accountant validation handler

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::{get_user, AppError, AppState, SuccessResponse};
use fiscomed_core::learning;
use fiscomed_core::models::{ValidationRequest, ValidationStatus};

/// Request body for validating a transaction
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    /// approved, rejected, or adjusted
    pub status: String,
    pub classification: Option<String>,
    /// Explicit percentage; wins over the catalog default
    pub percentage_override: Option<i64>,
    pub notes: Option<String>,
    pub validator: Option<String>,
}

/// POST /api/transactions/:id/validate - Apply an accountant decision
pub async fn validate_transaction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let user = get_user(&headers);

    let status = req
        .status
        .parse::<ValidationStatus>()
        .map_err(AppError::bad_request)?;
    if status == ValidationStatus::Pending {
        return Err(AppError::bad_request(
            "Validation status must be approved, rejected, or adjusted",
        ));
    }

    let validator = req.validator.clone().unwrap_or_else(|| user.clone());
    let request = ValidationRequest {
        status,
        classification: req.classification.clone(),
        percentage_override: req.percentage_override,
        notes: req.notes.clone(),
        validator,
    };

    let updated = learning::validate_transaction(&state.db, id, &request)?;
    if !updated {
        return Err(AppError::not_found(format!("Transaction {} not found", id)));
    }

    state.db.log_audit(
        &user,
        "validate",
        Some("transaction"),
        Some(id),
        Some(&format!(
            "status={}, classification={:?}",
            status, req.classification
        )),
    )?;

    Ok(Json(SuccessResponse { success: true }))
}
