//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{get_user, AppError, AppState, MAX_PAGE_LIMIT};
use fiscomed_core::engine::Classifier;
use fiscomed_core::intake::{self, IntakeResult};
use fiscomed_core::models::{
    NewTransaction, Suggestion, Transaction, TransactionKind, ValidationStatus,
};

fn default_owner() -> String {
    "default".to_string()
}

fn default_limit() -> i64 {
    50
}

/// Build a classifier over the request state
fn classifier(state: &AppState) -> Classifier<'_> {
    match &state.advisors {
        Some(chain) => Classifier::with_advisors(&state.db, chain),
        None => Classifier::new(&state.db),
    }
}

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    /// Filter by validation status (pending, approved, rejected, adjusted)
    pub status: Option<String>,
    /// Filter by kind (income, expense)
    pub kind: Option<String>,
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub transactions: Vec<Transaction>,
    pub limit: i64,
    pub offset: i64,
}

/// GET /api/transactions - List transactions
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<TransactionResponse>, AppError> {
    let user = get_user(&headers);

    // Input validation: clamp pagination parameters
    let limit = params.limit.max(1).min(MAX_PAGE_LIMIT);
    let offset = params.offset.max(0);

    let status = params
        .status
        .as_deref()
        .map(|s| {
            s.parse::<ValidationStatus>()
                .map_err(AppError::bad_request)
        })
        .transpose()?;
    let kind = params
        .kind
        .as_deref()
        .map(|s| s.parse::<TransactionKind>().map_err(AppError::bad_request))
        .transpose()?;

    let transactions = state
        .db
        .list_transactions(&params.owner, status, kind, limit, offset)?;

    state.db.log_audit(
        &user,
        "list",
        Some("transaction"),
        None,
        Some(&format!(
            "owner={}, status={:?}, kind={:?}, returned={}",
            params.owner,
            params.status,
            params.kind,
            transactions.len()
        )),
    )?;

    Ok(Json(TransactionResponse {
        transactions,
        limit,
        offset,
    }))
}

/// GET /api/transactions/:id - Get a single transaction
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    let user = get_user(&headers);

    let tx = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::not_found(format!("Transaction {} not found", id)))?;

    state
        .db
        .log_audit(&user, "get", Some("transaction"), Some(id), None)?;

    Ok(Json(tx))
}

/// Request body for creating a transaction
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(default = "default_owner")]
    pub owner: String,
    pub kind: String,
    /// Date as YYYY-MM-DD; defaults to today
    pub date: Option<String>,
    pub amount: f64,
    pub concept: String,
    #[serde(default)]
    pub provider: String,
    pub cfdi_uuid: Option<Uuid>,
    #[serde(default)]
    pub cfdi_valid: bool,
    #[serde(default)]
    pub payment_method: String,
    /// Manual classification; wins over the engine when valid for the kind
    pub classification: Option<String>,
}

#[derive(Serialize)]
pub struct CreateTransactionResponse {
    pub id: i64,
    pub duplicate: bool,
    pub suggestion: Option<Suggestion>,
    pub cash_warning: Option<String>,
}

/// POST /api/transactions - Record a transaction with an attached suggestion
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<Json<CreateTransactionResponse>, AppError> {
    let user = get_user(&headers);

    let kind = req
        .kind
        .parse::<TransactionKind>()
        .map_err(AppError::bad_request)?;
    let date = match req.date.as_deref() {
        Some(s) => chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| AppError::bad_request("Invalid date format (use YYYY-MM-DD)"))?,
        None => chrono::Utc::now().date_naive(),
    };
    if req.concept.trim().is_empty() {
        return Err(AppError::bad_request("Concept must not be empty"));
    }

    let tx = NewTransaction {
        kind,
        date,
        amount: req.amount,
        concept: req.concept.trim().to_string(),
        provider: req.provider.trim().to_string(),
        cfdi_uuid: req.cfdi_uuid,
        cfdi_valid: req.cfdi_valid,
        payment_method: req.payment_method.trim().to_string(),
        manual_classification: req.classification,
    };

    let classifier = classifier(&state);
    let result = intake::record_transaction(&state.db, &classifier, &req.owner, &tx).await?;

    let response = match result {
        IntakeResult::Recorded(recorded) => {
            state.db.log_audit(
                &user,
                "create",
                Some("transaction"),
                Some(recorded.transaction_id),
                Some(&format!(
                    "kind={}, amount={}, classification={}",
                    kind, req.amount, recorded.suggestion.classification
                )),
            )?;
            CreateTransactionResponse {
                id: recorded.transaction_id,
                duplicate: false,
                suggestion: Some(recorded.suggestion),
                cash_warning: recorded.cash_warning,
            }
        }
        IntakeResult::Duplicate { existing_id } => {
            state.db.log_audit(
                &user,
                "create_duplicate",
                Some("transaction"),
                Some(existing_id),
                Some(&format!("cfdi_uuid={:?}", req.cfdi_uuid)),
            )?;
            CreateTransactionResponse {
                id: existing_id,
                duplicate: true,
                suggestion: None,
                cash_warning: None,
            }
        }
    };

    Ok(Json(response))
}

/// Request body for a standalone classification
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default = "default_owner")]
    pub owner: String,
    pub concept: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub amount: f64,
}

fn default_kind() -> String {
    "expense".to_string()
}

/// POST /api/classify - Classify a concept without persisting anything
pub async fn classify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ClassifyRequest>,
) -> Result<Json<Suggestion>, AppError> {
    let user = get_user(&headers);

    let kind = req
        .kind
        .parse::<TransactionKind>()
        .map_err(AppError::bad_request)?;

    let classifier = classifier(&state);
    let suggestion = classifier
        .classify(&req.owner, &req.concept, &req.provider, kind, req.amount)
        .await?;

    state.db.log_audit(
        &user,
        "classify",
        Some("suggestion"),
        None,
        Some(&format!(
            "concept={}, result={}, method={}",
            req.concept,
            suggestion.classification,
            suggestion.method.as_str()
        )),
    )?;

    Ok(Json(suggestion))
}
