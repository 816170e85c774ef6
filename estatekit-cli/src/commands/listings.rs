use super::Context;
use anyhow::{bail, Context as _, Result};
use estatekit_core::layout::parse_layout_count;
use estatekit_core::listing::{Listing, ListingMode};
use estatekit_core::schema::migrate_records;
use estatekit_core::search::ListingFilter;
use estatekit_core::ListingDraft;
use serde_json::Value;
use std::fmt::Write as _;
use std::path::Path;
use uuid::Uuid;

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id.trim()).with_context(|| format!("invalid listing id: \"{}\"", id))
}

async fn fetch(ctx: &Context, id: &str) -> Result<Listing> {
    let id = parse_id(id)?;
    match ctx.store.get(id).await? {
        Some(listing) => Ok(listing),
        None => bail!("listing {} not found", id),
    }
}

pub fn build_filter(
    mode: Option<String>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    bedrooms: Option<u32>,
    text: Option<String>,
) -> Result<ListingFilter> {
    let mut filter = ListingFilter::new().price_between(min_price, max_price);
    if let Some(mode) = mode {
        filter = filter.mode(mode.parse::<ListingMode>()?);
    }
    if let Some(bedrooms) = bedrooms {
        filter = filter.min_bedrooms(bedrooms);
    }
    if let Some(text) = text {
        filter = filter.text(text);
    }
    Ok(filter)
}

/// Import a JSON array (or a single object) of listing records
pub async fn import(ctx: &Context, file: &Path) -> Result<String> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;
    let records = match value {
        Value::Array(records) => records,
        other => vec![other],
    };

    let (listings, stats) = migrate_records(records);
    for mut listing in listings {
        listing.status = listing.compute_status();
        ctx.store.upsert(listing).await?;
    }

    let mut out = stats.summary();
    for error in &stats.errors {
        let _ = write!(out, "\n  {}", error);
    }
    Ok(out)
}

pub async fn list(ctx: &Context, filter: &ListingFilter) -> Result<String> {
    let listings = ctx.store.list(filter).await?;
    if listings.is_empty() {
        return Ok("No listings found.".to_string());
    }

    let mut out = String::new();
    for listing in &listings {
        let price = match listing.lowest_price() {
            Some(p) => format!("{:.2}", p),
            None => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "{}  {:<8}  {:<10}  {:>12}  {} layout(s)  {}",
            listing.id,
            listing.mode,
            format!("{:?}", listing.status).to_lowercase(),
            price,
            listing.layouts.len(),
            listing.title
        );
    }
    let _ = write!(out, "{} listing(s)", listings.len());
    Ok(out)
}

pub async fn show(ctx: &Context, id: &str) -> Result<String> {
    let listing = fetch(ctx, id).await?;
    Ok(serde_json::to_string_pretty(&listing)?)
}

pub async fn delete(ctx: &Context, id: &str) -> Result<String> {
    let id = parse_id(id)?;
    if !ctx.store.delete(id).await? {
        bail!("listing {} not found", id);
    }
    Ok(format!("Deleted listing {}", id))
}

/// Resize the layout set of a stored listing
pub async fn layouts(ctx: &Context, id: &str, count: &str, no_sync: bool) -> Result<String> {
    let listing = fetch(ctx, id).await?;
    let mut policy = ctx.config.layouts.policy();
    if no_sync {
        policy.enable_sync = false;
    }

    let count = parse_layout_count(count);
    let mut draft = ListingDraft::from_listing(&listing, policy);
    let before = draft.layouts.len();
    draft.set_layout_count(count);
    let saved = draft.save(ctx.store.as_ref()).await?;

    let mut out = format!("Listing {}: {} -> {} layout(s)", saved.id, before, saved.layouts.len());
    for (index, layout) in saved.layouts.iter().enumerate() {
        let state = saved
            .layouts
            .inherit_state(index)
            .map(|s| format!("{:?}", s).to_lowercase())
            .unwrap_or_default();
        let _ = write!(out, "\n  #{} {}  {}", index + 1, layout.id, state);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use estatekit_core::config::EstateConfig;
    use serde_json::json;

    fn context(dir: &Path) -> Context {
        let mut config = EstateConfig::default();
        config.storage.data_dir = dir.to_string_lossy().into_owned();
        Context::with_config(config).unwrap()
    }

    fn write_records(dir: &Path, records: Value) -> std::path::PathBuf {
        let path = dir.join("import.json");
        std::fs::write(&path, records.to_string()).unwrap();
        path
    }

    #[tokio::test]
    async fn import_then_list_and_show() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(&tmp.path().join("data"));
        let id = Uuid::new_v4();
        let file = write_records(
            tmp.path(),
            json!([
                {"id": id.to_string(), "title": "Garden Terrace", "saleType": "sale",
                 "price": "780,000", "bedrooms": "4", "lat": 3.1, "lng": 101.6},
                "not a record"
            ]),
        );

        let summary = import(&ctx, &file).await.unwrap();
        assert!(summary.contains("2 records read"));
        assert!(summary.contains("errors: 1"));

        let listed = list(&ctx, &ListingFilter::new()).await.unwrap();
        assert!(listed.contains("Garden Terrace"));
        assert!(listed.contains("available"));

        let shown = show(&ctx, &id.to_string()).await.unwrap();
        assert!(shown.contains("\"schema_version\": 2"));
    }

    #[tokio::test]
    async fn layouts_resizes_and_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(tmp.path());
        let listing = Listing::new(ListingMode::Sale, "o", "Tower A");
        ctx.store.create(listing.clone()).await.unwrap();

        let out = layouts(&ctx, &listing.id.to_string(), "3", false).await.unwrap();
        assert!(out.contains("0 -> 3 layout(s)"));
        assert!(out.contains("#2 layout-2  attached"));

        let reopened = context(tmp.path());
        let stored = reopened.store.get(listing.id).await.unwrap().unwrap();
        assert_eq!(stored.layouts.len(), 3);
    }

    #[tokio::test]
    async fn layouts_respects_configured_cap() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = EstateConfig::default();
        config.storage.data_dir = tmp.path().to_string_lossy().into_owned();
        config.layouts.max_layouts = 4;
        let ctx = Context::with_config(config).unwrap();
        let listing = Listing::new(ListingMode::Rent, "o", "Shophouse");
        ctx.store.create(listing.clone()).await.unwrap();

        let out = layouts(&ctx, &listing.id.to_string(), "9", false).await.unwrap();
        assert!(out.contains("0 -> 4 layout(s)"));

        let out = layouts(&ctx, &listing.id.to_string(), "1e20", false).await.unwrap();
        assert!(out.contains("4 -> 0 layout(s)"));
    }

    #[tokio::test]
    async fn unknown_ids_are_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(tmp.path());
        assert!(show(&ctx, "not-a-uuid").await.is_err());
        assert!(delete(&ctx, &Uuid::new_v4().to_string()).await.is_err());
    }

    #[test]
    fn filter_rejects_unknown_mode() {
        assert!(build_filter(Some("castle".into()), None, None, None, None).is_err());
        let filter = build_filter(Some("rent".into()), Some(1.0), None, Some(2), None).unwrap();
        assert_eq!(filter.mode, Some(ListingMode::Rent));
        assert_eq!(filter.min_bedrooms, Some(2));
    }
}
