//! Balance snapshots of storage accounts.

use crate::{Amount, Collection};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wallet_auth::{ApiClient, ClientResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub id: i64,
    pub storage_account_id: i64,
    pub date: NaiveDate,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceSnapshotCreate {
    pub storage_account_id: i64,
    pub date: NaiveDate,
    pub amount: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BalanceSnapshotUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotFilters {
    pub storage_account_id: Option<i64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// `/balance-snapshots/`
#[derive(Clone)]
pub struct BalanceSnapshotsApi {
    collection: Collection<BalanceSnapshot>,
}

impl BalanceSnapshotsApi {
    pub fn new(client: ApiClient) -> Self {
        Self {
            collection: Collection::new(client, "balance-snapshots/"),
        }
    }

    pub async fn list(&self, filters: &SnapshotFilters) -> ClientResult<Vec<BalanceSnapshot>> {
        self.collection.list_with(filters).await
    }

    pub async fn create(&self, snapshot: &BalanceSnapshotCreate) -> ClientResult<BalanceSnapshot> {
        self.collection.create(snapshot).await
    }

    pub async fn update(&self, id: i64, update: &BalanceSnapshotUpdate) -> ClientResult<BalanceSnapshot> {
        self.collection.update(id, update).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.collection.delete(id).await
    }
}
