//! Reference data listing.

use super::Context;
use crate::output::{self, print_json};
use anyhow::Result;
use serde_json::json;

/// Show all reference lists.
pub async fn references(ctx: &Context) -> Result<()> {
    ctx.require_session()?;

    let mut cache = ctx.api.reference_cache();
    cache.fetch_all().await?;

    if ctx.format.is_json() {
        print_json(&json!({
            "currencies": cache.currencies(),
            "storage_locations": cache.storage_locations(),
            "storage_accounts": cache.storage_accounts(),
            "income_sources": cache.income_sources(),
            "expense_categories": cache.expense_categories(),
        }));
        return Ok(());
    }

    output::print_heading("Currencies");
    for currency in cache.currencies() {
        println!("  #{:<4} {} ({})", currency.id, currency.code, currency.symbol);
    }

    output::print_heading("Storage locations");
    for location in cache.storage_locations() {
        println!("  #{:<4} {}", location.id, location.name);
    }

    output::print_heading("Storage accounts");
    for account in cache.storage_accounts() {
        println!("  #{:<4} {}", account.id, cache.storage_account_label(account));
    }

    output::print_heading("Income sources");
    for source in cache.income_sources() {
        println!("  #{:<4} {}", source.id, source.name);
    }

    output::print_heading("Expense categories");
    for category in cache.expense_categories() {
        let mut flags = Vec::new();
        if category.is_tax {
            flags.push("tax");
        }
        if category.is_rent {
            flags.push("rent");
        }
        println!(
            "  #{:<4} {:<24} {:>12} {}",
            category.id,
            category.name,
            category.monthly_amount.to_string(),
            flags.join(", ")
        );
    }
    Ok(())
}
