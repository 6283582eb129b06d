//! Learned-rule handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::{get_user, AppError, AppState, MAX_PAGE_LIMIT};
use fiscomed_core::models::ClassificationRule;

/// Query parameters for listing rules
#[derive(Debug, Deserialize)]
pub struct RuleQuery {
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_owner() -> String {
    "default".to_string()
}

fn default_limit() -> i64 {
    100
}

/// GET /api/rules - List an owner's learned rules, most used first
pub async fn list_rules(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<RuleQuery>,
) -> Result<Json<Vec<ClassificationRule>>, AppError> {
    let user = get_user(&headers);

    let limit = params.limit.max(1).min(MAX_PAGE_LIMIT);
    let rules = state.db.list_rules(&params.owner, limit)?;

    state.db.log_audit(
        &user,
        "list",
        Some("rule"),
        None,
        Some(&format!("owner={}, returned={}", params.owner, rules.len())),
    )?;

    Ok(Json(rules))
}
