//! EstateKit - Core
//!
//! Typed building blocks for property listing upload forms and listing search.
//!
//! # Overview
//!
//! A listing (sale, rent, homestay or hotel) owns an ordered set of unit
//! layouts. The owner declares how many layouts the project has, edits each
//! one, and optionally lets a designated set of "common" fields follow the
//! first layout. Everything around that (persistence, geocoding, photo
//! storage) is reached through small async traits.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use estatekit_core::prelude::*;
//!
//! let mut draft = ListingDraft::new(ListingMode::Sale, "owner-1");
//! draft.set_layout_count(3);
//! draft.update_layout(0, LayoutPatch::facilities(vec!["gym".into()]), UpdateMeta::default());
//!
//! let store = MemoryListingStore::new();
//! let listing = draft.save(&store).await?;
//! ```
//!
//! # Architecture
//!
//! - [`layout`] - Layout records, common fields and the layout set manager
//! - [`area`] - Area unit normalization to square feet
//! - [`pricing`] - Price and price-per-square-foot rendering
//! - [`listing`] - Listing record and its stored shape
//! - [`schema`] - Versioned migration of stored records
//! - [`store`], [`geocode`], [`media`] - External collaborators
//! - [`draft`] - Upload form session
//! - [`search`] - Buyer-side filtering
//! - [`config`], [`logging`] - Ambient configuration and logging

pub mod area;
pub mod config; // Configuration system with TOML support
pub mod draft;
pub mod geocode;
pub mod layout;
pub mod listing;
pub mod logging; // Logging built on the standard log crate
pub mod media;
pub mod pricing;
pub mod schema; // Versioned record migration
pub mod search;
pub mod store;

// Prelude module for convenient imports
pub mod prelude;

// Re-exports of main types
pub use draft::ListingDraft;
pub use layout::{
    CommonField, CommonFields, InheritState, Layout, LayoutId, LayoutPatch, LayoutPolicy,
    LayoutSet, UpdateMeta, COMMON_FIELDS,
};
pub use listing::{Listing, ListingMode, ListingStatus};

/// Main result type for the crate
pub type Result<T> = std::result::Result<T, EstateError>;

/// Main error type for EstateKit
#[derive(thiserror::Error, Debug)]
pub enum EstateError {
    /// The geocoder had no match for the address
    #[error("Address not found: {0}")]
    AddressNotFound(String),
    /// The geocoding provider failed or answered with garbage
    #[error("Geocoding error: {0}")]
    Geocoding(String),
    /// The listing store rejected or failed an operation
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Listing not found: {0}")]
    NotFound(uuid::Uuid),
    /// Photo storage errors
    #[error("Media error: {0}")]
    Media(String),
    /// A stored record could not be migrated to the current schema
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
