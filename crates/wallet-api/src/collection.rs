//! Generic CRUD access to one backend collection.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use wallet_auth::{ApiClient, ClientResult};

/// A collection endpoint such as `currencies/`, with items at `currencies/{id}`.
pub struct Collection<T> {
    client: ApiClient,
    path: &'static str,
    _item: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            path: self.path,
            _item: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Collection<T> {
    /// `path` must end with a slash.
    pub fn new(client: ApiClient, path: &'static str) -> Self {
        Self {
            client,
            path,
            _item: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    fn item_path(&self, id: i64) -> String {
        format!("{}{}", self.path, id)
    }

    pub async fn list(&self) -> ClientResult<Vec<T>> {
        self.client.get(self.path).await
    }

    /// List with query parameters; `None` fields are omitted.
    pub async fn list_with<Q: Serialize + ?Sized>(&self, query: &Q) -> ClientResult<Vec<T>> {
        self.client.get_with_query(self.path, query).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> ClientResult<T> {
        self.client.post(self.path, body).await
    }

    pub async fn update<B: Serialize + ?Sized>(&self, id: i64, body: &B) -> ClientResult<T> {
        self.client.put(&self.item_path(id), body).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.client.delete(&self.item_path(id)).await
    }
}
