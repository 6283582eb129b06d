//! Transaction operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{
    FinancialSummary, NewTransaction, Suggestion, Transaction, TransactionKind, ValidationStatus,
};

/// Result of inserting a transaction
#[derive(Debug, Clone)]
pub enum TransactionInsertResult {
    /// Transaction was inserted successfully, contains new transaction ID
    Inserted(i64),
    /// Transaction was a duplicate (same CFDI UUID), contains existing transaction ID
    Duplicate(i64),
}

impl Database {
    /// Insert a transaction with its engine suggestion attached
    ///
    /// Duplicate detection is by CFDI UUID: a repeated fiscal document
    /// reference reports the existing row instead of inserting.
    pub fn insert_transaction(
        &self,
        owner: &str,
        tx: &NewTransaction,
        suggestion: &Suggestion,
    ) -> Result<TransactionInsertResult> {
        let conn = self.conn()?;

        // Check for duplicate fiscal document reference
        if let Some(uuid) = tx.cfdi_uuid {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT id FROM transactions WHERE cfdi_uuid = ?",
                    params![uuid.to_string()],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_id) = existing {
                return Ok(TransactionInsertResult::Duplicate(existing_id));
            }
        }

        conn.execute(
            r#"
            INSERT INTO transactions (
                owner_id, kind, date, amount, concept, provider,
                cfdi_uuid, cfdi_valid, payment_method,
                suggested_classification, deductible_percentage, status
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending')
            "#,
            params![
                owner,
                tx.kind.as_str(),
                tx.date.to_string(),
                tx.amount,
                tx.concept,
                tx.provider,
                tx.cfdi_uuid.map(|u| u.to_string()),
                tx.cfdi_valid,
                tx.payment_method,
                suggestion.classification,
                suggestion.deductible_percentage,
            ],
        )?;

        Ok(TransactionInsertResult::Inserted(conn.last_insert_rowid()))
    }

    /// Get a transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;

        let tx = conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_TRANSACTION),
                params![id],
                Self::row_to_transaction,
            )
            .optional()?;

        Ok(tx)
    }

    /// List an owner's transactions with optional filters, newest first
    pub fn list_transactions(
        &self,
        owner: &str,
        status: Option<ValidationStatus>,
        kind: Option<TransactionKind>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        // Build dynamic WHERE clause
        let mut conditions = vec!["owner_id = ?".to_string()];
        let mut query_params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(owner.to_string())];

        if let Some(status) = status {
            conditions.push("status = ?".to_string());
            query_params.push(Box::new(status.as_str().to_string()));
        }

        if let Some(kind) = kind {
            conditions.push("kind = ?".to_string());
            query_params.push(Box::new(kind.as_str().to_string()));
        }

        let sql = format!(
            "{} WHERE {} ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
            SELECT_TRANSACTION,
            conditions.join(" AND ")
        );
        query_params.push(Box::new(limit));
        query_params.push(Box::new(offset));

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            query_params.iter().map(|p| p.as_ref()).collect();

        let transactions = stmt
            .query_map(params_refs.as_slice(), Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Apply an accountant decision to a transaction
    ///
    /// Overwrites the validation fields unconditionally (re-validation is
    /// permitted for corrections). Returns false when no row was affected.
    pub fn apply_validation(
        &self,
        id: i64,
        status: ValidationStatus,
        classification: Option<&str>,
        percentage: i64,
        notes: Option<&str>,
        validator: &str,
    ) -> Result<bool> {
        let conn = self.conn()?;

        let affected = conn.execute(
            r#"
            UPDATE transactions
            SET status = ?,
                confirmed_classification = ?,
                deductible_percentage = ?,
                notes = ?,
                validated_by = ?,
                validated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
            params![status.as_str(), classification, percentage, notes, validator, id],
        )?;

        Ok(affected > 0)
    }

    /// Financial summary across an owner's transactions
    pub fn financial_summary(&self, owner: &str) -> Result<FinancialSummary> {
        let conn = self.conn()?;

        let (total_income, total_expenses, deductible_expenses, pending_validation): (
            f64,
            f64,
            f64,
            i64,
        ) = conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN kind = 'income' THEN amount END), 0),
                COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount END), 0),
                COALESCE(SUM(CASE WHEN kind = 'expense'
                             THEN amount * deductible_percentage / 100.0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0)
            FROM transactions
            WHERE owner_id = ?
            "#,
            params![owner],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        Ok(FinancialSummary {
            total_income,
            total_expenses,
            deductible_expenses,
            net_profit: total_income - total_expenses,
            pending_validation,
        })
    }

    fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
        let kind_str: String = row.get(2)?;
        let date_str: String = row.get(3)?;
        let cfdi_uuid: Option<String> = row.get(7)?;
        let status_str: String = row.get(13)?;
        let validated_at: Option<String> = row.get(16)?;
        let created_at: String = row.get(17)?;

        Ok(Transaction {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            kind: kind_str.parse().unwrap_or(TransactionKind::Expense),
            date: chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                .unwrap_or_else(|_| chrono::Utc::now().date_naive()),
            amount: row.get(4)?,
            concept: row.get(5)?,
            provider: row.get(6)?,
            cfdi_uuid: cfdi_uuid.and_then(|s| s.parse().ok()),
            cfdi_valid: row.get(8)?,
            payment_method: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
            suggested_classification: row.get(10)?,
            confirmed_classification: row.get(11)?,
            deductible_percentage: row.get(12)?,
            status: status_str.parse().unwrap_or(ValidationStatus::Pending),
            notes: row.get(14)?,
            validated_by: row.get(15)?,
            validated_at: validated_at.map(|s| parse_datetime(&s)),
            created_at: parse_datetime(&created_at),
        })
    }
}

const SELECT_TRANSACTION: &str = r#"
    SELECT id, owner_id, kind, date, amount, concept, provider,
           cfdi_uuid, cfdi_valid, payment_method,
           suggested_classification, confirmed_classification, deductible_percentage,
           status, notes, validated_by, validated_at, created_at
    FROM transactions
"#;
