//! In-memory cache of the reference lists.

use crate::{
    Currency, ExpenseCategory, IncomeSource, References, StorageAccount, StorageLocation,
};
use std::collections::HashMap;
use tracing::debug;
use wallet_auth::ClientResult;

const UNKNOWN: &str = "?";

/// A list plus an id index into it.
#[derive(Debug)]
struct Indexed<T> {
    items: Vec<T>,
    by_id: HashMap<i64, usize>,
}

impl<T> Default for Indexed<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            by_id: HashMap::new(),
        }
    }
}

impl<T> Indexed<T> {
    fn build(items: Vec<T>, id: impl Fn(&T) -> i64) -> Self {
        let by_id = items
            .iter()
            .enumerate()
            .map(|(idx, item)| (id(item), idx))
            .collect();
        Self { items, by_id }
    }

    fn get(&self, id: i64) -> Option<&T> {
        self.by_id.get(&id).map(|&idx| &self.items[idx])
    }
}

/// Reference data loaded once and looked up by id.
pub struct ReferenceCache {
    references: References,
    currencies: Indexed<Currency>,
    storage_locations: Indexed<StorageLocation>,
    storage_accounts: Indexed<StorageAccount>,
    income_sources: Indexed<IncomeSource>,
    expense_categories: Indexed<ExpenseCategory>,
    loaded: bool,
}

impl ReferenceCache {
    pub fn new(references: References) -> Self {
        Self {
            references,
            currencies: Indexed::default(),
            storage_locations: Indexed::default(),
            storage_accounts: Indexed::default(),
            income_sources: Indexed::default(),
            expense_categories: Indexed::default(),
            loaded: false,
        }
    }

    /// Fetch all five lists concurrently. On any failure the cache keeps
    /// its previous contents.
    pub async fn fetch_all(&mut self) -> ClientResult<()> {
        let refs = &self.references;
        let (currencies, locations, accounts, sources, categories) = tokio::try_join!(
            refs.currencies.list(),
            refs.storage_locations.list(),
            refs.storage_accounts.list(),
            refs.income_sources.list(),
            refs.expense_categories.list(),
        )?;

        debug!(
            currencies = currencies.len(),
            storage_locations = locations.len(),
            storage_accounts = accounts.len(),
            income_sources = sources.len(),
            expense_categories = categories.len(),
            "Reference data loaded"
        );

        self.currencies = Indexed::build(currencies, |c| c.id);
        self.storage_locations = Indexed::build(locations, |l| l.id);
        self.storage_accounts = Indexed::build(accounts, |a| a.id);
        self.income_sources = Indexed::build(sources, |s| s.id);
        self.expense_categories = Indexed::build(categories, |c| c.id);
        self.loaded = true;
        Ok(())
    }

    pub fn loaded(&self) -> bool {
        self.loaded
    }

    pub fn currencies(&self) -> &[Currency] {
        &self.currencies.items
    }

    pub fn storage_locations(&self) -> &[StorageLocation] {
        &self.storage_locations.items
    }

    pub fn storage_accounts(&self) -> &[StorageAccount] {
        &self.storage_accounts.items
    }

    pub fn income_sources(&self) -> &[IncomeSource] {
        &self.income_sources.items
    }

    pub fn expense_categories(&self) -> &[ExpenseCategory] {
        &self.expense_categories.items
    }

    pub fn currency(&self, id: i64) -> Option<&Currency> {
        self.currencies.get(id)
    }

    pub fn storage_location(&self, id: i64) -> Option<&StorageLocation> {
        self.storage_locations.get(id)
    }

    pub fn storage_account(&self, id: i64) -> Option<&StorageAccount> {
        self.storage_accounts.get(id)
    }

    pub fn income_source(&self, id: i64) -> Option<&IncomeSource> {
        self.income_sources.get(id)
    }

    pub fn expense_category(&self, id: i64) -> Option<&ExpenseCategory> {
        self.expense_categories.get(id)
    }

    /// `"<location> <currency code>"`, with `?` for whichever part is unknown.
    pub fn storage_account_label(&self, account: &StorageAccount) -> String {
        let location = self
            .storage_location(account.storage_location_id)
            .map_or(UNKNOWN, |l| l.name.as_str());
        let code = self
            .currency(account.currency_id)
            .map_or(UNKNOWN, |c| c.code.as_str());
        format!("{location} {code}")
    }

    pub fn storage_account_label_by_id(&self, id: i64) -> String {
        match self.storage_account(id) {
            Some(account) => self.storage_account_label(account),
            None => UNKNOWN.to_string(),
        }
    }
}
