//! Listing persistence
//!
//! Implement [`ListingStore`] to plug in a storage backend. Two are
//! provided: [`MemoryListingStore`] for tests and embedding, and
//! [`FileListingStore`] which keeps one checksummed JSON record per line.
//!
//! Stores keep listings in their record shape (see
//! [`ListingRecord`](crate::listing::ListingRecord)) and decode on read, so
//! records of older schema versions are migrated transparently.

pub mod file;
pub mod memory;

pub use file::FileListingStore;
pub use memory::MemoryListingStore;

use crate::config::StorageConfig;
use crate::listing::Listing;
use crate::search::ListingFilter;
use crate::{EstateError, Result};
use std::sync::Arc;
use uuid::Uuid;

/// Listing storage trait
#[async_trait::async_trait]
pub trait ListingStore: Send + Sync {
    /// Store a new listing; fails if the id is already taken
    async fn create(&self, listing: Listing) -> Result<Listing>;

    async fn get(&self, id: Uuid) -> Result<Option<Listing>>;

    /// Replace an existing listing; fails with `NotFound` if it is missing
    async fn update(&self, listing: Listing) -> Result<Listing>;

    /// Returns whether a listing was removed
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Matching listings, most recently updated first
    async fn list(&self, filter: &ListingFilter) -> Result<Vec<Listing>>;

    async fn count(&self) -> Result<usize>;

    /// Create or replace
    async fn upsert(&self, listing: Listing) -> Result<Listing> {
        if self.get(listing.id).await?.is_some() {
            self.update(listing).await
        } else {
            self.create(listing).await
        }
    }
}

#[async_trait::async_trait]
impl<S: ListingStore + ?Sized> ListingStore for Arc<S> {
    async fn create(&self, listing: Listing) -> Result<Listing> {
        (**self).create(listing).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Listing>> {
        (**self).get(id).await
    }

    async fn update(&self, listing: Listing) -> Result<Listing> {
        (**self).update(listing).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        (**self).delete(id).await
    }

    async fn list(&self, filter: &ListingFilter) -> Result<Vec<Listing>> {
        (**self).list(filter).await
    }

    async fn count(&self) -> Result<usize> {
        (**self).count().await
    }

    async fn upsert(&self, listing: Listing) -> Result<Listing> {
        (**self).upsert(listing).await
    }
}

/// Open the store described by `config`
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn ListingStore>> {
    if config.in_memory {
        log::debug!("Using in-memory listing store");
        return Ok(Arc::new(MemoryListingStore::new()));
    }
    Ok(Arc::new(FileListingStore::open(config.data_path())?))
}

pub(crate) fn poisoned<T>(_: std::sync::PoisonError<T>) -> EstateError {
    EstateError::Persistence("listing store lock poisoned".to_string())
}
