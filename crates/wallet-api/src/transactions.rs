//! Income and expense transactions.

use crate::{Amount, Collection};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use wallet_auth::{ApiClient, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!("unknown transaction type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub date: NaiveDate,
    pub amount: Amount,
    pub description: Option<String>,
    pub currency_id: i64,
    pub storage_account_id: i64,
    pub income_source_id: Option<i64>,
    pub expense_category_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionCreate {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub date: NaiveDate,
    pub amount: Amount,
    pub description: Option<String>,
    pub currency_id: i64,
    pub storage_account_id: i64,
    pub income_source_id: Option<i64>,
    pub expense_category_id: Option<i64>,
}

/// Partial update; unset fields are left out of the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionUpdate {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_account_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_source_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_category_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionFilters {
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub income_source_id: Option<i64>,
    pub expense_category_id: Option<i64>,
    pub storage_account_id: Option<i64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// `/transactions/`
#[derive(Clone)]
pub struct TransactionsApi {
    collection: Collection<Transaction>,
}

impl TransactionsApi {
    pub fn new(client: ApiClient) -> Self {
        Self {
            collection: Collection::new(client, "transactions/"),
        }
    }

    pub async fn list(&self, filters: &TransactionFilters) -> ClientResult<Vec<Transaction>> {
        self.collection.list_with(filters).await
    }

    pub async fn create(&self, transaction: &TransactionCreate) -> ClientResult<Transaction> {
        self.collection.create(transaction).await
    }

    pub async fn update(&self, id: i64, update: &TransactionUpdate) -> ClientResult<Transaction> {
        self.collection.update(id, update).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.collection.delete(id).await
    }
}
