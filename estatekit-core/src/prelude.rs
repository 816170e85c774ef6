//! Common imports for EstateKit users
//!
//! ```rust,ignore
//! use estatekit_core::prelude::*;
//! ```

pub use crate::area::{convert_to_square_feet, AreaDetails, AreaMeasurement, AreaUnit};
pub use crate::config::EstateConfig;
pub use crate::draft::ListingDraft;
pub use crate::geocode::{GeocodeResult, Geocoder, NominatimGeocoder, StaticGeocoder, TileCoord};
pub use crate::layout::{
    parse_layout_count, set_layout_count, update_layout, update_layout_with_policy, CommonField,
    CommonFields, InheritState, Layout, LayoutId, LayoutPatch, LayoutPolicy, LayoutSet, UpdateMeta,
    COMMON_FIELDS,
};
pub use crate::listing::{GeoPoint, Listing, ListingMode, ListingStatus};
pub use crate::media::{LocalMediaStore, MediaStore};
pub use crate::pricing::{calculate_psf, Price};
pub use crate::search::{ListingFilter, MapBounds};
pub use crate::store::{FileListingStore, ListingStore, MemoryListingStore};
pub use crate::{EstateError, Result};
