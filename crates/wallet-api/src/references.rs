//! Reference data: currencies, storage locations and accounts, income
//! sources and expense categories.

use crate::{Amount, Collection};
use serde::{Deserialize, Serialize};
use wallet_auth::ApiClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub id: i64,
    pub code: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageLocation {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageAccount {
    pub id: i64,
    pub storage_location_id: i64,
    pub currency_id: i64,
    #[serde(default)]
    pub storage_location: Option<StorageLocation>,
    #[serde(default)]
    pub currency: Option<Currency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSource {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub id: i64,
    pub name: String,
    #[serde(alias = "budgeted_amount")]
    pub monthly_amount: Amount,
    pub is_tax: bool,
    pub is_rent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyInput {
    pub code: String,
    pub symbol: String,
}

/// Body for resources that only carry a name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameInput {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageAccountInput {
    pub storage_location_id: i64,
    pub currency_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseCategoryInput {
    pub name: String,
    pub monthly_amount: Amount,
    pub is_tax: bool,
    pub is_rent: bool,
}

/// The five reference collections.
#[derive(Clone)]
pub struct References {
    pub currencies: Collection<Currency>,
    pub storage_locations: Collection<StorageLocation>,
    pub storage_accounts: Collection<StorageAccount>,
    pub income_sources: Collection<IncomeSource>,
    pub expense_categories: Collection<ExpenseCategory>,
}

impl References {
    pub fn new(client: ApiClient) -> Self {
        Self {
            currencies: Collection::new(client.clone(), "currencies/"),
            storage_locations: Collection::new(client.clone(), "storage-locations/"),
            storage_accounts: Collection::new(client.clone(), "storage-accounts/"),
            income_sources: Collection::new(client.clone(), "income-sources/"),
            expense_categories: Collection::new(client, "expense-categories/"),
        }
    }
}
