//! Learned classification rules (the rule store)
//!
//! Rules map (owner, concept pattern, provider) to a classification and
//! deductibility percentage. They are created and reinforced exclusively by
//! accountant approvals, and never deleted: stale rules are superseded by
//! more frequent, more recent corrections rather than pruned.

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::ClassificationRule;

impl Database {
    /// Exact-match lookup on the (owner, concept, provider) uniqueness key
    ///
    /// The uniqueness constraint should make at most one row match; the
    /// highest usage count wins defensively if duplicates ever exist.
    pub fn find_rule(
        &self,
        owner: &str,
        concept: &str,
        provider: &str,
    ) -> Result<Option<ClassificationRule>> {
        let conn = self.conn()?;

        let rule = conn
            .query_row(
                &format!(
                    "{} WHERE owner_id = ? AND concept_pattern = ? AND provider = ? \
                     ORDER BY usage_count DESC LIMIT 1",
                    SELECT_RULE
                ),
                params![owner, concept, provider],
                Self::row_to_rule,
            )
            .optional()?;

        Ok(rule)
    }

    /// Fallback substring lookup: a stored pattern contained in the query
    /// concept, or the query concept contained in a stored pattern
    ///
    /// Deliberately crude (see the engine's confidence tiers); ties break by
    /// usage count, then recency.
    pub fn find_similar(&self, owner: &str, concept: &str) -> Result<Option<ClassificationRule>> {
        if concept.trim().is_empty() {
            return Ok(None);
        }

        let conn = self.conn()?;

        let rule = conn
            .query_row(
                &format!(
                    "{} WHERE owner_id = ?1 AND concept_pattern <> '' \
                     AND (instr(lower(?2), lower(concept_pattern)) > 0 \
                          OR instr(lower(concept_pattern), lower(?2)) > 0) \
                     ORDER BY usage_count DESC, updated_at DESC LIMIT 1",
                    SELECT_RULE
                ),
                params![owner, concept],
                Self::row_to_rule,
            )
            .optional()?;

        Ok(rule)
    }

    /// Insert or reinforce a rule
    ///
    /// Atomic on the uniqueness key: concurrent approvals of the same
    /// (owner, concept, provider) pair land on one row, last writer's
    /// classification/percentage wins, and the usage count reflects the
    /// approvals observed.
    pub fn upsert_rule(
        &self,
        owner: &str,
        concept: &str,
        provider: &str,
        classification: &str,
        percentage: i64,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO classification_rules
                (owner_id, concept_pattern, provider, classification, deductible_percentage)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(owner_id, concept_pattern, provider) DO UPDATE SET
                classification = excluded.classification,
                deductible_percentage = excluded.deductible_percentage,
                usage_count = usage_count + 1,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![owner, concept, provider, classification, percentage],
        )?;
        Ok(())
    }

    /// List an owner's rules, most used first
    pub fn list_rules(&self, owner: &str, limit: i64) -> Result<Vec<ClassificationRule>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE owner_id = ? ORDER BY usage_count DESC, updated_at DESC LIMIT ?",
            SELECT_RULE
        ))?;

        let rules = stmt
            .query_map(params![owner, limit], Self::row_to_rule)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rules)
    }

    /// Rule store statistics: (rule count, total approvals observed)
    pub fn rule_stats(&self, owner: &str) -> Result<(i64, i64)> {
        let conn = self.conn()?;

        let stats = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(usage_count), 0) \
             FROM classification_rules WHERE owner_id = ?",
            params![owner],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(stats)
    }

    fn row_to_rule(row: &Row<'_>) -> rusqlite::Result<ClassificationRule> {
        let created_at: String = row.get(7)?;
        let updated_at: String = row.get(8)?;

        Ok(ClassificationRule {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            concept_pattern: row.get(2)?,
            provider: row.get(3)?,
            classification: row.get(4)?,
            deductible_percentage: row.get(5)?,
            usage_count: row.get(6)?,
            created_at: parse_datetime(&created_at),
            updated_at: parse_datetime(&updated_at),
        })
    }
}

const SELECT_RULE: &str = r#"
    SELECT id, owner_id, concept_pattern, provider, classification,
           deductible_percentage, usage_count, created_at, updated_at
    FROM classification_rules
"#;
