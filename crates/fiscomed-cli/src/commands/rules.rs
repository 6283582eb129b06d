//! Learned-rule commands

use anyhow::Result;

use fiscomed_core::db::Database;

pub fn cmd_rules(db: &Database, owner: &str, limit: i64) -> Result<()> {
    let rules = db.list_rules(owner, limit)?;
    if rules.is_empty() {
        println!("No learned rules yet. Approving validated transactions teaches the engine.");
        return Ok(());
    }

    let (count, uses) = db.rule_stats(owner)?;
    println!("🧠 {} learned rules ({} approvals observed)", count, uses);
    println!();
    println!(
        "{:>5}  {:<30}  {:<25}  {:<30}  {:>4}  {:>5}",
        "ID", "CONCEPT PATTERN", "PROVIDER", "CLASSIFICATION", "%", "USES"
    );
    for rule in rules {
        println!(
            "{:>5}  {:<30}  {:<25}  {:<30}  {:>4}  {:>5}",
            rule.id,
            rule.concept_pattern,
            if rule.provider.is_empty() { "(any)" } else { &rule.provider },
            rule.classification,
            rule.deductible_percentage,
            rule.usage_count,
        );
    }

    Ok(())
}
