//! Aggregated analytics over transactions and balance snapshots.

use crate::Amount;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wallet_auth::{ApiClient, ClientResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Month,
    Quarter,
    Year,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsParams {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub group_by: Option<GroupBy>,
}

impl AnalyticsParams {
    pub fn new(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            date_from,
            date_to,
            group_by: None,
        }
    }

    pub fn group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = Some(group_by);
        self
    }
}

/// Per-currency amounts keyed by currency code.
pub type CurrencyAmounts = BTreeMap<String, Amount>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub period: String,
    pub income: Amount,
    pub profit: Amount,
    pub derived_expense: Amount,
    pub avg_income: Amount,
    pub avg_profit: Amount,
    #[serde(default)]
    pub balances: CurrencyAmounts,
    #[serde(default)]
    pub balance_change: CurrencyAmounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeBySourceEntry {
    pub period: String,
    pub total: Amount,
    #[serde(default)]
    pub sources: BTreeMap<String, Amount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceByStorageAccount {
    pub name: String,
    pub currency: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceByStorageEntry {
    pub period: String,
    #[serde(default)]
    pub accounts: Vec<BalanceByStorageAccount>,
    #[serde(default)]
    pub totals: CurrencyAmounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseTemplateItem {
    pub id: i64,
    pub name: String,
    #[serde(alias = "monthly_amount")]
    pub budgeted_amount: Amount,
    pub is_tax: bool,
    pub is_rent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseTemplate {
    pub items: Vec<ExpenseTemplateItem>,
    pub total: Amount,
    pub without_tax: Amount,
    pub without_rent: Amount,
    pub without_tax_and_rent: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseVsBudgetItem {
    pub id: i64,
    pub name: String,
    pub budgeted: Amount,
    pub actual: Amount,
    pub remaining: Amount,
}

/// Month selector for the budget comparison; unset fields mean "current".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BudgetParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// `/analytics/*`
#[derive(Clone)]
pub struct AnalyticsApi {
    client: ApiClient,
}

impl AnalyticsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn summary(&self, params: &AnalyticsParams) -> ClientResult<Vec<SummaryEntry>> {
        self.client.get_with_query("analytics/summary", params).await
    }

    pub async fn income_by_source(
        &self,
        params: &AnalyticsParams,
    ) -> ClientResult<Vec<IncomeBySourceEntry>> {
        self.client
            .get_with_query("analytics/income-by-source", params)
            .await
    }

    pub async fn balance_by_storage(
        &self,
        params: &AnalyticsParams,
    ) -> ClientResult<Vec<BalanceByStorageEntry>> {
        self.client
            .get_with_query("analytics/balance-by-storage", params)
            .await
    }

    pub async fn expense_template(&self) -> ClientResult<ExpenseTemplate> {
        self.client.get("analytics/expense-template").await
    }

    pub async fn expense_vs_budget(
        &self,
        params: &BudgetParams,
    ) -> ClientResult<Vec<ExpenseVsBudgetItem>> {
        self.client
            .get_with_query("analytics/expense-vs-budget", params)
            .await
    }
}
