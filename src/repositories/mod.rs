//! Persistence gateway: a small generic CRUD contract and its SQLite
//! implementation for products.

pub mod product_repository;

use std::future::Future;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record `{0}` not found")]
    NotFound(i64),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// CRUD over one entity type keyed by an integer identity.
///
/// Every call is its own unit of work; nothing spans calls.
pub trait Repository<T>: Clone + Send + Sync + 'static {
    /// All records, ordered by identity.
    fn get_all(&self) -> impl Future<Output = RepositoryResult<Vec<T>>> + Send;

    fn get(&self, id: i64) -> impl Future<Output = RepositoryResult<Option<T>>> + Send;

    /// Insert `entity`, ignoring its identity, and return it with the
    /// identity the store assigned.
    fn add(&self, entity: T) -> impl Future<Output = RepositoryResult<T>> + Send;

    /// Overwrite the stored record with the same identity. `None` means no
    /// such record exists.
    fn update(&self, entity: T) -> impl Future<Output = RepositoryResult<Option<T>>> + Send;

    /// Remove a record. Fails with [`RepositoryError::NotFound`] when there
    /// was nothing to remove.
    fn delete(&self, id: i64) -> impl Future<Output = RepositoryResult<()>> + Send;
}
