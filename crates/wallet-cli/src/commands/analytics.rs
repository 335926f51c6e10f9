//! Analytics reports.

use super::Context;
use crate::output::{self, print_json};
use anyhow::Result;
use wallet_api::{format_period, AnalyticsParams, BudgetParams, CurrencyAmounts};

fn currency_totals(amounts: &CurrencyAmounts) -> String {
    amounts
        .iter()
        .map(|(code, amount)| format!("{} {}", amount, code))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Income, profit and balances per period.
pub async fn analytics_summary(ctx: &Context, params: AnalyticsParams) -> Result<()> {
    ctx.require_session()?;
    let entries = ctx.api.analytics.summary(&params).await?;

    if ctx.format.is_json() {
        print_json(&entries);
        return Ok(());
    }

    output::print_heading("Summary");
    println!(
        "  {:<10} {:>14} {:>14} {:>14}  Balances",
        "Period", "Income", "Expense", "Profit"
    );
    for entry in &entries {
        println!(
            "  {:<10} {:>14} {:>14} {:>14}  {}",
            format_period(&entry.period),
            entry.income.to_string(),
            entry.derived_expense.to_string(),
            entry.profit.to_string(),
            currency_totals(&entry.balances),
        );
    }
    if let Some(last) = entries.last() {
        output::print_row("Avg income", &last.avg_income.to_string());
        output::print_row("Avg profit", &last.avg_profit.to_string());
    }
    Ok(())
}

/// Income split by source per period.
pub async fn analytics_income(ctx: &Context, params: AnalyticsParams) -> Result<()> {
    ctx.require_session()?;
    let entries = ctx.api.analytics.income_by_source(&params).await?;

    if ctx.format.is_json() {
        print_json(&entries);
        return Ok(());
    }

    output::print_heading("Income by source");
    for entry in &entries {
        println!("  {:<10} {:>14}", format_period(&entry.period), entry.total.to_string());
        for (source, amount) in &entry.sources {
            println!("    {:<24} {:>14}", source, amount.to_string());
        }
    }
    Ok(())
}

/// Balances per storage account per period.
pub async fn analytics_balances(ctx: &Context, params: AnalyticsParams) -> Result<()> {
    ctx.require_session()?;
    let entries = ctx.api.analytics.balance_by_storage(&params).await?;

    if ctx.format.is_json() {
        print_json(&entries);
        return Ok(());
    }

    output::print_heading("Balances by storage");
    for entry in &entries {
        println!("  {:<10} {}", format_period(&entry.period), currency_totals(&entry.totals));
        for account in &entry.accounts {
            println!(
                "    {:<24} {:>14} {}",
                account.name,
                account.amount.to_string(),
                account.currency
            );
        }
    }
    Ok(())
}

/// Monthly budget template and, for one month, actual spending against it.
pub async fn analytics_budget(ctx: &Context, params: BudgetParams) -> Result<()> {
    ctx.require_session()?;
    let template = ctx.api.analytics.expense_template().await?;
    let comparison = ctx.api.analytics.expense_vs_budget(&params).await?;

    if ctx.format.is_json() {
        print_json(&serde_json::json!({ "template": template, "comparison": comparison }));
        return Ok(());
    }

    output::print_heading("Budget template");
    for item in &template.items {
        println!("  {:<24} {:>14}", item.name, item.budgeted_amount.to_string());
    }
    output::print_row("Total", &template.total.to_string());
    output::print_row("Without tax", &template.without_tax.to_string());
    output::print_row("Without rent", &template.without_rent.to_string());
    output::print_row("Without both", &template.without_tax_and_rent.to_string());

    output::print_heading("Spending vs budget");
    println!(
        "  {:<24} {:>14} {:>14} {:>14}",
        "Category", "Budgeted", "Actual", "Remaining"
    );
    for item in &comparison {
        println!(
            "  {:<24} {:>14} {:>14} {:>14}",
            item.name,
            item.budgeted.to_string(),
            item.actual.to_string(),
            item.remaining.to_string(),
        );
    }
    Ok(())
}
