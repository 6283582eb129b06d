//! Catalog handlers (classifications and payment methods)

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use fiscomed_core::models::TransactionKind;
use fiscomed_core::{catalog, payment};

/// Query parameters for the classification catalog
#[derive(Debug, Deserialize)]
pub struct ClassificationQuery {
    /// income or expense
    pub kind: String,
}

/// A catalog entry as served to dropdowns
#[derive(Serialize)]
pub struct ClassificationEntry {
    pub name: &'static str,
    pub percentage: i64,
    pub description: &'static str,
}

/// GET /api/catalog/classifications?kind= - Valid classifications for a kind
pub async fn list_classifications(
    State(_state): State<Arc<AppState>>,
    Query(params): Query<ClassificationQuery>,
) -> Result<Json<Vec<ClassificationEntry>>, AppError> {
    let kind = params
        .kind
        .parse::<TransactionKind>()
        .map_err(AppError::bad_request)?;

    let entries = catalog::classifications_for(kind)
        .map(|entry| ClassificationEntry {
            name: entry.name,
            percentage: entry.percentage,
            description: entry.description,
        })
        .collect();

    Ok(Json(entries))
}

/// GET /api/catalog/payment-methods - SAT payment methods as dropdown labels
pub async fn list_payment_methods(
    State(_state): State<Arc<AppState>>,
) -> Json<Vec<String>> {
    Json(payment::payment_methods())
}
