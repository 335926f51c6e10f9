//! Transaction commands.

use super::Context;
use crate::output::{self, print_json};
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use wallet_api::{
    Amount, ReferenceCache, Transaction, TransactionCreate, TransactionFilters, TransactionType,
};

/// Fields for a new transaction.
#[derive(Debug, Args)]
pub struct TransactionArgs {
    /// income or expense
    #[arg(long = "type", value_parser = parse_type)]
    pub kind: TransactionType,
    /// Date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,
    #[arg(long)]
    pub amount: f64,
    #[arg(long)]
    pub currency: i64,
    /// Storage account ID
    #[arg(long)]
    pub account: i64,
    /// Income source ID (income only)
    #[arg(long)]
    pub source: Option<i64>,
    /// Expense category ID (expense only)
    #[arg(long)]
    pub category: Option<i64>,
    #[arg(long)]
    pub description: Option<String>,
}

fn parse_type(value: &str) -> Result<TransactionType, String> {
    value.parse()
}

/// List transactions.
pub async fn transactions_list(ctx: &Context, filters: TransactionFilters) -> Result<()> {
    ctx.require_session()?;
    let transactions = ctx.api.transactions.list(&filters).await?;

    if ctx.format.is_json() {
        print_json(&transactions);
        return Ok(());
    }

    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    let mut cache = ctx.api.reference_cache();
    cache.fetch_all().await?;

    output::print_heading(&format!("Transactions ({})", transactions.len()));
    for transaction in &transactions {
        println!("{}", describe(transaction, &cache));
    }
    Ok(())
}

fn describe(transaction: &Transaction, cache: &ReferenceCache) -> String {
    let category = match transaction.kind {
        TransactionType::Income => transaction
            .income_source_id
            .and_then(|id| cache.income_source(id))
            .map(|s| s.name.as_str()),
        TransactionType::Expense => transaction
            .expense_category_id
            .and_then(|id| cache.expense_category(id))
            .map(|c| c.name.as_str()),
    };
    let code = cache
        .currency(transaction.currency_id)
        .map_or("?", |c| c.code.as_str());

    format!(
        "  #{:<6} {} {:<8} {:>14} {:<4} {:<20} {:<16} {}",
        transaction.id,
        transaction.date,
        transaction.kind,
        transaction.amount.to_string(),
        code,
        cache.storage_account_label_by_id(transaction.storage_account_id),
        category.unwrap_or("-"),
        transaction.description.as_deref().unwrap_or(""),
    )
}

/// Record a transaction.
pub async fn transactions_add(ctx: &Context, args: TransactionArgs) -> Result<()> {
    ctx.require_session()?;

    let (income_source_id, expense_category_id) = match args.kind {
        TransactionType::Income => (args.source, None),
        TransactionType::Expense => (None, args.category),
    };
    let created = ctx
        .api
        .transactions
        .create(&TransactionCreate {
            kind: args.kind,
            date: args.date,
            amount: Amount(args.amount),
            description: args.description,
            currency_id: args.currency,
            storage_account_id: args.account,
            income_source_id,
            expense_category_id,
        })
        .await?;

    if ctx.format.is_json() {
        print_json(&created);
    } else {
        output::print_success(
            &format!("Created {} #{} of {}", created.kind, created.id, created.amount),
            ctx.format,
        );
    }
    Ok(())
}

/// Delete a transaction.
pub async fn transactions_delete(ctx: &Context, id: i64) -> Result<()> {
    ctx.require_session()?;
    ctx.api.transactions.delete(id).await?;
    output::print_success(&format!("Deleted transaction #{}", id), ctx.format);
    Ok(())
}
