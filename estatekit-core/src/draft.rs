//! Upload form session
//!
//! A [`ListingDraft`] holds what the owner has typed so far. Layout edits go
//! through the pure functions in [`crate::layout::manager`]; the
//! collaborator calls ([`resolve_address`](ListingDraft::resolve_address),
//! [`attach_photo`](ListingDraft::attach_photo),
//! [`save`](ListingDraft::save)) only touch the draft once they succeed.

use crate::geocode::{GeocodeResult, Geocoder};
use crate::layout::{self, LayoutPatch, LayoutPolicy, LayoutSet, UpdateMeta};
use crate::listing::{GeoPoint, Listing, ListingMode};
use crate::media::MediaStore;
use crate::schema::CURRENT_SCHEMA_VERSION;
use crate::store::ListingStore;
use crate::{EstateError, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub address: String,
    pub display_address: Option<String>,
    pub location: Option<GeoPoint>,
    pub mode: ListingMode,
    pub owner_id: String,
    pub layouts: LayoutSet,
    pub policy: LayoutPolicy,
    /// Set once the draft has been saved
    pub listing_id: Option<Uuid>,
    created_at: Option<DateTime<Utc>>,
}

impl ListingDraft {
    pub fn new(mode: ListingMode, owner_id: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            address: String::new(),
            display_address: None,
            location: None,
            mode,
            owner_id: owner_id.into(),
            layouts: LayoutSet::new(mode),
            policy: LayoutPolicy::synced(),
            listing_id: None,
            created_at: None,
        }
    }

    pub fn with_policy(mut self, policy: LayoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reopen a stored listing for editing
    pub fn from_listing(listing: &Listing, policy: LayoutPolicy) -> Self {
        Self {
            title: listing.title.clone(),
            address: listing.address.clone(),
            display_address: listing.display_address.clone(),
            location: listing.location,
            mode: listing.mode,
            owner_id: listing.owner_id.clone(),
            layouts: listing.layouts.clone(),
            policy,
            listing_id: Some(listing.id),
            created_at: Some(listing.created_at),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// A new address drops the pin resolved for the old one
    pub fn set_address(&mut self, address: impl Into<String>) {
        let address = address.into();
        if address != self.address {
            self.address = address;
            self.display_address = None;
            self.location = None;
        }
    }

    pub fn set_layout_count(&mut self, count: usize) -> &LayoutSet {
        self.layouts = layout::set_layout_count(&self.layouts, count, &self.policy);
        &self.layouts
    }

    /// Reference edits reach attached layouts only when the policy syncs
    pub fn update_layout(&mut self, index: usize, patch: LayoutPatch, meta: UpdateMeta) -> &LayoutSet {
        self.layouts = layout::update_layout_with_policy(&self.layouts, index, &patch, meta, &self.policy);
        &self.layouts
    }

    /// Pin the draft on the map via `geocoder`
    pub async fn resolve_address(&mut self, geocoder: &dyn Geocoder) -> Result<GeocodeResult> {
        let result = geocoder
            .geocode(&self.address)
            .await?
            .ok_or_else(|| EstateError::AddressNotFound(self.address.clone()))?;

        self.location = Some(result.point());
        self.display_address = Some(result.display_address.clone());
        Ok(result)
    }

    /// Upload a photo and append its URL to the layout at `index`
    pub async fn attach_photo(
        &mut self,
        index: usize,
        media: &dyn MediaStore,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String> {
        let Some(target) = self.layouts.get(index) else {
            return Err(EstateError::Media(format!("no layout at position {}", index)));
        };
        let mut photos = target.unit.photos.clone();

        let url = media.store(file_name, bytes).await?;
        if !photos.contains(&url) {
            photos.push(url.clone());
        }
        let patch = LayoutPatch { photos: Some(photos), ..Default::default() };
        self.layouts =
            layout::update_layout_with_policy(&self.layouts, index, &patch, UpdateMeta::default(), &self.policy);
        Ok(url)
    }

    /// The listing this draft would save as
    pub fn to_listing(&self) -> Listing {
        let now = Utc::now();
        let mut listing = Listing {
            id: self.listing_id.unwrap_or_else(Uuid::new_v4),
            owner_id: self.owner_id.clone(),
            title: self.title.clone(),
            address: self.address.clone(),
            display_address: self.display_address.clone(),
            location: self.location,
            mode: self.mode,
            status: crate::listing::ListingStatus::Incomplete,
            layouts: self.layouts.clone(),
            schema_version: CURRENT_SCHEMA_VERSION,
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        };
        listing.status = listing.compute_status();
        listing
    }

    /// Create or update the listing in `store`.
    ///
    /// On failure the draft is exactly as it was before the call.
    pub async fn save(&mut self, store: &dyn ListingStore) -> Result<Listing> {
        let listing = self.to_listing();
        let saved = match self.listing_id {
            Some(_) => store.update(listing).await?,
            None => store.create(listing).await?,
        };

        self.listing_id = Some(saved.id);
        self.created_at = Some(saved.created_at);
        log::info!("Saved listing {} ({}, {} layouts)", saved.id, saved.mode, saved.layouts.len());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::StaticGeocoder;
    use crate::listing::ListingStatus;
    use crate::media::LocalMediaStore;
    use crate::pricing::Price;
    use crate::search::ListingFilter;
    use crate::store::MemoryListingStore;

    /// Store whose writes always fail
    struct BrokenStore;

    #[async_trait::async_trait]
    impl ListingStore for BrokenStore {
        async fn create(&self, _: Listing) -> Result<Listing> {
            Err(EstateError::Persistence("disk full".into()))
        }
        async fn get(&self, _: Uuid) -> Result<Option<Listing>> {
            Ok(None)
        }
        async fn update(&self, _: Listing) -> Result<Listing> {
            Err(EstateError::Persistence("disk full".into()))
        }
        async fn delete(&self, _: Uuid) -> Result<bool> {
            Ok(false)
        }
        async fn list(&self, _: &ListingFilter) -> Result<Vec<Listing>> {
            Ok(Vec::new())
        }
        async fn count(&self) -> Result<usize> {
            Ok(0)
        }
    }

    fn geocoder() -> StaticGeocoder {
        StaticGeocoder::new().with(
            "1 Harbourfront Walk",
            GeocodeResult { lat: 1.2644, lng: 103.8222, display_address: "1 HarbourFront Walk, Singapore".into() },
        )
    }

    #[tokio::test]
    async fn test_save_creates_then_updates() {
        let store = MemoryListingStore::new();
        let mut draft = ListingDraft::new(ListingMode::Sale, "owner-1");
        draft.set_title("Harbour Residences");
        draft.set_layout_count(2);

        let first = draft.save(&store).await.unwrap();
        assert_eq!(draft.listing_id, Some(first.id));
        assert_eq!(first.status, ListingStatus::Incomplete);

        draft.update_layout(0, LayoutPatch::price(Price::Single(1_200_000.0)), UpdateMeta::default());
        draft.set_address("1 Harbourfront Walk");
        draft.resolve_address(&geocoder()).await.unwrap();
        let second = draft.save(&store).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.status, ListingStatus::Available);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_draft_unchanged() {
        let mut draft = ListingDraft::new(ListingMode::Rent, "owner-2");
        draft.set_layout_count(3);
        let before = draft.clone();

        let err = draft.save(&BrokenStore).await.unwrap_err();
        assert!(matches!(err, EstateError::Persistence(_)));
        assert_eq!(draft, before);
    }

    #[tokio::test]
    async fn test_unknown_address_leaves_draft_unchanged() {
        let mut draft = ListingDraft::new(ListingMode::Hotel, "owner-3");
        draft.set_address("Nowhere Lane");
        let before = draft.clone();

        let err = draft.resolve_address(&geocoder()).await.unwrap_err();
        assert!(matches!(err, EstateError::AddressNotFound(ref a) if a == "Nowhere Lane"));
        assert_eq!(draft, before);
    }

    #[tokio::test]
    async fn test_changing_address_drops_location() {
        let mut draft = ListingDraft::new(ListingMode::Sale, "o");
        draft.set_address("1 Harbourfront Walk");
        draft.resolve_address(&geocoder()).await.unwrap();
        assert!(draft.location.is_some());

        draft.set_address("2 Harbourfront Walk");
        assert!(draft.location.is_none());
        assert!(draft.display_address.is_none());
    }

    #[tokio::test]
    async fn test_attach_photo() {
        let dir = tempfile::tempdir().unwrap();
        let media = LocalMediaStore::new(dir.path(), "/media");
        let mut draft = ListingDraft::new(ListingMode::Homestay, "o");
        draft.set_layout_count(2);

        let url = draft.attach_photo(1, &media, "bedroom.jpg", b"jpeg bytes").await.unwrap();
        draft.attach_photo(1, &media, "bedroom-again.jpg", b"jpeg bytes").await.unwrap();

        assert_eq!(draft.layouts.get(1).unwrap().unit.photos, vec![url]);
        // Photos are not a common field, so the layout stays attached
        assert_eq!(draft.layouts.get(1).unwrap().inherit_common, Some(true));

        assert!(draft.attach_photo(5, &media, "x.jpg", b"x").await.is_err());
    }

    #[test]
    fn test_reference_edit_stays_local_without_sync() {
        let mut draft = ListingDraft::new(ListingMode::Sale, "o").with_policy(LayoutPolicy::default());
        draft.set_layout_count(2);
        draft.update_layout(0, LayoutPatch::facilities(vec!["gym".into()]), UpdateMeta::common_edit());

        assert_eq!(draft.layouts.get(0).unwrap().common.facilities, vec!["gym".to_string()]);
        assert!(draft.layouts.get(1).unwrap().common.facilities.is_empty());
        assert_eq!(draft.layouts.get(1).unwrap().inherit_common, Some(true));

        let mut synced = ListingDraft::new(ListingMode::Sale, "o");
        synced.set_layout_count(2);
        synced.update_layout(0, LayoutPatch::facilities(vec!["gym".into()]), UpdateMeta::common_edit());
        assert_eq!(synced.layouts.get(1).unwrap().common.facilities, vec!["gym".to_string()]);
    }

    #[test]
    fn test_typed_count_is_capped() {
        let mut draft =
            ListingDraft::new(ListingMode::Rent, "o").with_policy(LayoutPolicy::synced().with_max_layouts(4));
        draft.set_layout_count(layout::parse_layout_count("12"));
        assert_eq!(draft.layouts.len(), 4);

        draft.set_layout_count(layout::parse_layout_count("1e20"));
        assert!(draft.layouts.is_empty());
    }

    #[tokio::test]
    async fn test_from_listing_round_trip() {
        let store = MemoryListingStore::new();
        let mut draft = ListingDraft::new(ListingMode::Sale, "o");
        draft.set_layout_count(1);
        let saved = draft.save(&store).await.unwrap();

        let reopened = ListingDraft::from_listing(&saved, LayoutPolicy::synced());
        assert_eq!(reopened.listing_id, Some(saved.id));
        assert_eq!(reopened.layouts, saved.layouts);
    }
}
