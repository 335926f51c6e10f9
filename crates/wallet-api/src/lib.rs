//! Typed access to the wallet backend's resources.
//!
//! Every call goes through [`wallet_auth::ApiClient`], so bearer tokens,
//! refresh and error notifications apply uniformly.

mod amount;
mod analytics;
mod cache;
mod collection;
mod format;
mod references;
mod snapshots;
mod transactions;


pub use amount::Amount;
pub use analytics::{
    AnalyticsApi, AnalyticsParams, BalanceByStorageAccount, BalanceByStorageEntry, BudgetParams,
    CurrencyAmounts, ExpenseTemplate, ExpenseTemplateItem, ExpenseVsBudgetItem, GroupBy,
    IncomeBySourceEntry, SummaryEntry,
};
pub use cache::ReferenceCache;
pub use collection::Collection;
pub use format::{format_amount, format_period};
pub use references::{
    Currency, CurrencyInput, ExpenseCategory, ExpenseCategoryInput, IncomeSource, NameInput,
    References, StorageAccount, StorageAccountInput, StorageLocation,
};
pub use snapshots::{
    BalanceSnapshot, BalanceSnapshotCreate, BalanceSnapshotUpdate, BalanceSnapshotsApi,
    SnapshotFilters,
};
pub use transactions::{
    Transaction, TransactionCreate, TransactionFilters, TransactionType, TransactionUpdate,
    TransactionsApi,
};

use wallet_auth::ApiClient;

/// All resource wrappers over one shared client.
#[derive(Clone)]
pub struct WalletApi {
    pub transactions: TransactionsApi,
    pub references: References,
    pub snapshots: BalanceSnapshotsApi,
    pub analytics: AnalyticsApi,
}

impl WalletApi {
    pub fn new(client: ApiClient) -> Self {
        Self {
            transactions: TransactionsApi::new(client.clone()),
            references: References::new(client.clone()),
            snapshots: BalanceSnapshotsApi::new(client.clone()),
            analytics: AnalyticsApi::new(client),
        }
    }

    /// A fresh, unloaded cache over the reference collections.
    pub fn reference_cache(&self) -> ReferenceCache {
        ReferenceCache::new(self.references.clone())
    }
}
