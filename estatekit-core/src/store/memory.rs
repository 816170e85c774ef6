//! In-memory listing storage

use super::{poisoned, ListingStore};
use crate::listing::{Listing, ListingRecord};
use crate::search::ListingFilter;
use crate::{EstateError, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Thread-safe listing storage using `RwLock<HashMap>`.
/// Contents are lost when the process exits.
///
/// ```
/// use estatekit_core::store::MemoryListingStore;
///
/// let store = MemoryListingStore::new();
/// ```
#[derive(Clone, Default)]
pub struct MemoryListingStore {
    records: Arc<RwLock<HashMap<Uuid, ListingRecord>>>,
}

impl MemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw record of any schema version
    pub fn insert_record(&self, record: ListingRecord) -> Result<Uuid> {
        let id = record
            .id()
            .ok_or_else(|| EstateError::Schema("record has no valid id".to_string()))?;
        self.records.write().map_err(poisoned)?.insert(id, record);
        Ok(id)
    }
}

#[async_trait::async_trait]
impl ListingStore for MemoryListingStore {
    async fn create(&self, listing: Listing) -> Result<Listing> {
        let record = listing.to_record()?;
        let mut records = self.records.write().map_err(poisoned)?;
        if records.contains_key(&listing.id) {
            return Err(EstateError::Persistence(format!("listing {} already exists", listing.id)));
        }
        records.insert(listing.id, record);
        Ok(listing)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Listing>> {
        let record = self.records.read().map_err(poisoned)?.get(&id).cloned();
        record.map(Listing::from_record).transpose()
    }

    async fn update(&self, listing: Listing) -> Result<Listing> {
        let record = listing.to_record()?;
        let mut records = self.records.write().map_err(poisoned)?;
        match records.get_mut(&listing.id) {
            Some(slot) => *slot = record,
            None => return Err(EstateError::NotFound(listing.id)),
        }
        Ok(listing)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.records.write().map_err(poisoned)?.remove(&id).is_some())
    }

    async fn list(&self, filter: &ListingFilter) -> Result<Vec<Listing>> {
        let records: Vec<ListingRecord> =
            self.records.read().map_err(poisoned)?.values().cloned().collect();
        let mut listings = Vec::with_capacity(records.len());
        for record in records {
            match Listing::from_record(record) {
                Ok(listing) => listings.push(listing),
                Err(e) => log::warn!("Skipping unreadable listing record: {}", e),
            }
        }
        Ok(filter.apply(listings))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().map_err(poisoned)?.len())
    }
}
