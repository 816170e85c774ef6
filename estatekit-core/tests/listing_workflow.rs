//! End-to-end tests: upload form edits, persistence and search

use estatekit_core::prelude::*;
use estatekit_core::layout::TransitInfo;
use serde_json::json;

fn facilities(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn growing_a_synced_set_copies_the_reference() {
    let policy = LayoutPolicy::synced();
    let mut set = set_layout_count(&LayoutSet::new(ListingMode::Sale), 1, &policy);
    set = update_layout(
        &set,
        0,
        &LayoutPatch {
            facilities: Some(facilities(&["gym", "pool"])),
            transit: Some(TransitInfo { note: Some("5 min to MRT".into()), ..Default::default() }),
            ..Default::default()
        },
        UpdateMeta::common_edit(),
    );

    let set = set_layout_count(&set, 3, &policy);

    assert_eq!(set.len(), 3);
    let reference = set.get(0).unwrap();
    assert_eq!(reference.inherit_common, Some(false));
    for layout in set.iter().skip(1) {
        assert_eq!(layout.common, reference.common);
        assert_eq!(layout.inherit_common, Some(true));
    }
}

#[test]
fn manual_edit_detaches_and_reference_edits_skip_it() {
    let policy = LayoutPolicy::synced();
    let set = set_layout_count(&LayoutSet::new(ListingMode::Rent), 3, &policy);

    let set = update_layout(&set, 1, &LayoutPatch::facilities(facilities(&["pool"])), UpdateMeta::common_edit());
    assert_eq!(set.get(1).unwrap().inherit_common, Some(false));
    assert_eq!(set.inherit_state(1), Some(InheritState::Detached));

    let set = update_layout(&set, 0, &LayoutPatch::facilities(facilities(&["gym"])), UpdateMeta::common_edit());
    assert_eq!(set.get(2).unwrap().common.facilities, facilities(&["gym"]));
    assert_eq!(set.get(1).unwrap().common.facilities, facilities(&["pool"]));

    // Re-attaching catches up with the reference immediately
    let set = update_layout(&set, 1, &LayoutPatch::default(), UpdateMeta::toggle(true));
    assert_eq!(set.get(1).unwrap().common.facilities, facilities(&["gym"]));
    assert_eq!(set.inherit_state(1), Some(InheritState::Attached));
}

#[test]
fn shrinking_keeps_surviving_layouts() {
    let policy = LayoutPolicy::default();
    let set = set_layout_count(&LayoutSet::new(ListingMode::Hotel), 4, &policy);
    let set = update_layout(&set, 1, &LayoutPatch::price(Price::Single(320.0)), UpdateMeta::default());
    let ids: Vec<LayoutId> = set.iter().map(|l| l.id).collect();

    let shrunk = set_layout_count(&set, 2, &policy);
    assert_eq!(shrunk.len(), 2);
    assert_eq!(shrunk.get(1).unwrap(), set.get(1).unwrap());
    assert_eq!(shrunk.get(0).unwrap().id, ids[0]);

    let regrown = set_layout_count(&shrunk, 3, &policy);
    assert!(!ids[2..].contains(&regrown.get(2).unwrap().id));

    assert!(set_layout_count(&regrown, parse_layout_count("-2"), &policy).is_empty());
}

#[test]
fn area_and_psf() {
    assert!((convert_to_square_feet(100.0, "square meter") - 1076.39).abs() < 0.01);
    assert_eq!(convert_to_square_feet(1.0, "acre"), 43560.0);
    assert_eq!(convert_to_square_feet(500.0, "sqft"), 500.0);
    assert_eq!(convert_to_square_feet(-5.0, "sqft"), 0.0);
    assert_eq!(convert_to_square_feet("abc", "sqft"), 0.0);

    assert_eq!(calculate_psf(&Price::Single(500_000.0), 1000.0).as_deref(), Some("500.00"));
    assert_eq!(
        calculate_psf(&Price::range(400_000.0, 600_000.0), 1000.0).as_deref(),
        Some("400.00 ~ 600.00")
    );
    assert_eq!(calculate_psf(&Price::Single(500_000.0), 0.0), None);
}

#[tokio::test]
async fn draft_to_file_store_to_search() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileListingStore::open(dir.path()).unwrap();
    let geocoder = StaticGeocoder::new().with(
        "8 Marina Boulevard",
        GeocodeResult { lat: 1.2806, lng: 103.8537, display_address: "8 Marina Blvd, Singapore".into() },
    );

    let mut draft = ListingDraft::new(ListingMode::Sale, "agent-7");
    draft.set_title("Marina Bay Suites");
    draft.set_address("8 Marina Boulevard");
    draft.resolve_address(&geocoder).await.unwrap();
    draft.set_layout_count(2);
    draft.update_layout(
        0,
        LayoutPatch {
            price: Some(Price::range(2_100_000.0, 2_400_000.0)),
            bedrooms: Some(3),
            area: Some(AreaDetails::built_up(1400.0, AreaUnit::SquareFeet)),
            ..Default::default()
        },
        UpdateMeta::default(),
    );
    let saved = draft.save(&store).await.unwrap();
    assert_eq!(saved.status, ListingStatus::Available);
    assert_eq!(saved.layouts.get(0).unwrap().psf().as_deref(), Some("1500.00 ~ 1714.29"));

    let reopened = FileListingStore::open(dir.path()).unwrap();
    let found = reopened
        .list(
            &ListingFilter::new()
                .within(MapBounds::new(1.2, 103.6, 1.5, 104.1))
                .price_between(Some(2_000_000.0), None)
                .min_bedrooms(3),
        )
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, saved.id);
    assert_eq!(found[0].display_address.as_deref(), Some("8 Marina Blvd, Singapore"));
}

#[tokio::test]
async fn legacy_records_migrate_on_import() {
    let records = vec![
        json!({
            "title": "Sunrise Homestay",
            "saleType": "homestay",
            "layouts": json!([
                {"category": "Villa", "price": "350", "extraSpaces": ["garden"], "maxGuests": "6"},
                {"category": "Villa", "price": 280, "_inheritCommon": true}
            ]).to_string(),
        }),
        json!({"schema_version": 7}),
    ];

    let (listings, stats) = estatekit_core::schema::migrate_records(records);
    assert_eq!(stats.records_read, 2);
    assert_eq!(stats.upgraded, 1);
    assert_eq!(stats.errors.len(), 1);

    let listing = &listings[0];
    assert_eq!(listing.mode, ListingMode::Homestay);
    assert_eq!(listing.layouts.len(), 2);
    assert_eq!(listing.lowest_price(), Some(280.0));
    assert_eq!(listing.layouts.get(0).unwrap().common.extra_spaces, vec!["garden".to_string()]);

    let store = MemoryListingStore::new();
    store.create(listing.clone()).await.unwrap();
    assert_eq!(store.get(listing.id).await.unwrap().as_ref(), Some(listing));
}
