//! Reporting handlers (financial summary, audit log)

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::{get_user, AppError, AppState, MAX_PAGE_LIMIT};
use fiscomed_core::db::AuditEntry;
use fiscomed_core::models::FinancialSummary;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    #[serde(default = "default_owner")]
    pub owner: String,
}

fn default_owner() -> String {
    "default".to_string()
}

/// GET /api/summary - Financial summary for an owner
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<SummaryQuery>,
) -> Result<Json<FinancialSummary>, AppError> {
    let user = get_user(&headers);

    let summary = state.db.financial_summary(&params.owner)?;

    state
        .db
        .log_audit(&user, "get", Some("summary"), None, Some(&params.owner))?;

    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_audit_limit")]
    pub limit: i64,
}

fn default_audit_limit() -> i64 {
    100
}

/// GET /api/audit - Recent audit entries, newest first
pub async fn list_audit(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let limit = params.limit.max(1).min(MAX_PAGE_LIMIT);
    let entries = state.db.list_audit(limit)?;
    Ok(Json(entries))
}
