//! Classification engine
//!
//! Produces a best-effort classification for a transaction's free-text
//! concept/provider by consulting the learned rule store.
//! Priority: exact rule (high) → substring similarity (medium) → unclassified
//! default (low). Low-confidence results optionally escalate to the external
//! reasoning advisor chain; an advisor answer is only trusted when its
//! classification passes catalog validation for the transaction kind.
//!
//! A suggestion is always produced - the engine is never the reason a
//! transaction cannot be recorded.

use tracing::{debug, warn};

use crate::ai::{AdvisorChain, AdvisorRequest};
use crate::catalog;
use crate::db::Database;
use crate::error::Result;
use crate::models::{Confidence, Suggestion, SuggestionMethod, TransactionKind};

/// Classification name used when no rule applies
pub const UNCLASSIFIED: &str = "Unclassified";

/// Classification engine over the rule store, with optional advisor escalation
pub struct Classifier<'a> {
    db: &'a Database,
    advisors: Option<&'a AdvisorChain>,
}

impl<'a> Classifier<'a> {
    /// Create a classifier without advisor escalation
    pub fn new(db: &'a Database) -> Self {
        Self { db, advisors: None }
    }

    /// Create a classifier that escalates low-confidence results to advisors
    pub fn with_advisors(db: &'a Database, advisors: &'a AdvisorChain) -> Self {
        Self {
            db,
            advisors: Some(advisors),
        }
    }

    /// Local three-tier suggestion, first hit wins
    pub fn suggest(&self, owner: &str, concept: &str, provider: &str) -> Result<Suggestion> {
        // 1. Exact match on the (concept, provider) key
        if let Some(rule) = self.db.find_rule(owner, concept, provider)? {
            debug!(
                concept,
                classification = %rule.classification,
                "Exact rule matched"
            );
            return Ok(Suggestion {
                classification: rule.classification,
                deductible_percentage: rule.deductible_percentage,
                confidence: Confidence::High,
                method: SuggestionMethod::LearnedRule,
            });
        }

        // 2. Substring-similarity fallback
        if let Some(rule) = self.db.find_similar(owner, concept)? {
            debug!(
                concept,
                pattern = %rule.concept_pattern,
                classification = %rule.classification,
                "Similar rule matched"
            );
            return Ok(Suggestion {
                classification: rule.classification,
                deductible_percentage: rule.deductible_percentage,
                confidence: Confidence::Medium,
                method: SuggestionMethod::Similarity,
            });
        }

        // 3. No match - safe default
        Ok(Suggestion {
            classification: UNCLASSIFIED.to_string(),
            deductible_percentage: 0,
            confidence: Confidence::Low,
            method: SuggestionMethod::Default,
        })
    }

    /// Full classification: local tiers, then advisor escalation when the
    /// local result is low-confidence
    ///
    /// Advisor failures of any kind (unreachable, timeout, malformed JSON,
    /// out-of-catalog classification) keep the local default; they never
    /// propagate to the caller.
    pub async fn classify(
        &self,
        owner: &str,
        concept: &str,
        provider: &str,
        kind: TransactionKind,
        amount: f64,
    ) -> Result<Suggestion> {
        let local = self.suggest(owner, concept, provider)?;

        let mut suggestion = if local.confidence == Confidence::Low {
            match self.escalate(concept, provider, kind, amount).await {
                Some(external) => external,
                None => local,
            }
        } else {
            local
        };

        // Income is never a deduction, whatever the source said
        if kind == TransactionKind::Income {
            suggestion.deductible_percentage = 0;
        }

        Ok(suggestion)
    }

    /// Ask the advisor chain; None on any failure or out-of-catalog answer
    async fn escalate(
        &self,
        concept: &str,
        provider: &str,
        kind: TransactionKind,
        amount: f64,
    ) -> Option<Suggestion> {
        let advisors = self.advisors?;

        let request = AdvisorRequest {
            concept: concept.to_string(),
            provider: provider.to_string(),
            amount,
            kind,
            allowed: catalog::names_for(kind),
        };

        let answer = match advisors.classify_expense(&request).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(concept, "Advisor escalation failed: {}", e);
                return None;
            }
        };

        // Never trust a classification outside the closed catalog: an
        // unvalidated answer could end up in the rule store permanently.
        if !catalog::is_valid(&answer.classification, kind) {
            warn!(
                concept,
                classification = %answer.classification,
                "Advisor answered outside the catalog, keeping local default"
            );
            return None;
        }

        Some(Suggestion {
            classification: answer.classification,
            deductible_percentage: answer.deductible_percentage.clamp(0, 100),
            confidence: Confidence::Medium,
            method: SuggestionMethod::External,
        })
    }
}
