//! File-backed listing storage
//!
//! All listings live in `<dir>/listings.jsonl`, one record per line:
//!
//! ```text
//! <crc32 hex, 8 chars>:<record json>
//! ```
//!
//! Lines whose checksum does not match are skipped with a warning when the
//! file is opened. Lines without a prefix are accepted as-is, so a file of
//! plain JSON records can be dropped in and gets checksummed on the next
//! write. Every mutation rewrites the whole file through a temporary file
//! and a rename.

use super::{poisoned, ListingStore};
use crate::listing::{Listing, ListingRecord};
use crate::search::ListingFilter;
use crate::{EstateError, Result};
use crc32fast::Hasher as Crc32Hasher;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use uuid::Uuid;

pub const LISTINGS_FILE: &str = "listings.jsonl";

pub fn calculate_crc32(data: &[u8]) -> u32 {
    let mut hasher = Crc32Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// `"<crc32_hex>:<json>"`
pub fn format_line(json: &str) -> String {
    format!("{:08x}:{}", calculate_crc32(json.as_bytes()), json)
}

/// The JSON part of a stored line, or why it was rejected
pub fn parse_line(line: &str) -> std::result::Result<&str, String> {
    if line.len() > 9 && line.as_bytes()[8] == b':' {
        let (crc_hex, json) = (&line[..8], &line[9..]);
        let expected = u32::from_str_radix(crc_hex, 16)
            .map_err(|_| format!("invalid CRC32 hex: {}", crc_hex))?;
        let actual = calculate_crc32(json.as_bytes());
        if expected != actual {
            return Err(format!("CRC32 mismatch: expected {:08x}, got {:08x}", expected, actual));
        }
        Ok(json)
    } else {
        Ok(line)
    }
}

pub struct FileListingStore {
    path: PathBuf,
    listings: RwLock<HashMap<Uuid, Listing>>,
}

impl FileListingStore {
    /// Open (creating if needed) the store in `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| {
            EstateError::Persistence(format!("Failed to create {}: {}", dir.display(), e))
        })?;
        let path = dir.join(LISTINGS_FILE);
        let listings = load(&path)?;
        Ok(Self { path, listings: RwLock::new(listings) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the listings, persist the copy, then
    /// publish it. Nothing changes in memory if the write fails.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut HashMap<Uuid, Listing>) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.listings.write().map_err(poisoned)?;
        let mut next = guard.clone();
        let out = change(&mut next)?;
        write_all(&self.path, &next)?;
        *guard = next;
        Ok(out)
    }
}

fn load(path: &Path) -> Result<HashMap<Uuid, Listing>> {
    let mut listings = HashMap::new();
    if !path.exists() {
        log::debug!("No listings file at {}, starting empty", path.display());
        return Ok(listings);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| EstateError::Persistence(format!("Failed to read {}: {}", path.display(), e)))?;

    let mut rejected = 0usize;
    for (line_num, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match decode_line(line) {
            Ok(listing) => {
                listings.insert(listing.id, listing);
            }
            Err(e) => {
                rejected += 1;
                log::warn!("Skipping {}:{}: {}", path.display(), line_num + 1, e);
            }
        }
    }

    if rejected > 0 {
        log::warn!("Loaded {} listings, {} lines rejected", listings.len(), rejected);
    } else {
        log::info!("Loaded {} listings from {}", listings.len(), path.display());
    }
    Ok(listings)
}

fn decode_line(line: &str) -> std::result::Result<Listing, String> {
    let json = parse_line(line)?;
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| e.to_string())?;
    let record = ListingRecord::from_value(value).map_err(|e| e.to_string())?;
    Listing::from_record(record).map_err(|e| e.to_string())
}

fn write_all(path: &Path, listings: &HashMap<Uuid, Listing>) -> Result<()> {
    let mut ordered: Vec<&Listing> = listings.values().collect();
    ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let mut buf = String::new();
    for listing in ordered {
        let json = serde_json::to_string(&listing.to_record()?)?;
        buf.push_str(&format_line(&json));
        buf.push('\n');
    }

    let tmp = path.with_extension("jsonl.tmp");
    let persist = || -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(buf.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    };
    persist().map_err(|e| {
        EstateError::Persistence(format!("Failed to write {}: {}", path.display(), e))
    })
}

#[async_trait::async_trait]
impl ListingStore for FileListingStore {
    async fn create(&self, listing: Listing) -> Result<Listing> {
        self.mutate(|all| {
            if all.contains_key(&listing.id) {
                return Err(EstateError::Persistence(format!(
                    "listing {} already exists",
                    listing.id
                )));
            }
            all.insert(listing.id, listing.clone());
            Ok(())
        })?;
        log::debug!("Created listing {}", listing.id);
        Ok(listing)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Listing>> {
        Ok(self.listings.read().map_err(poisoned)?.get(&id).cloned())
    }

    async fn update(&self, listing: Listing) -> Result<Listing> {
        self.mutate(|all| match all.get_mut(&listing.id) {
            Some(slot) => {
                *slot = listing.clone();
                Ok(())
            }
            None => Err(EstateError::NotFound(listing.id)),
        })?;
        log::debug!("Updated listing {}", listing.id);
        Ok(listing)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        if !self.listings.read().map_err(poisoned)?.contains_key(&id) {
            return Ok(false);
        }
        self.mutate(|all| Ok(all.remove(&id).is_some()))
    }

    async fn list(&self, filter: &ListingFilter) -> Result<Vec<Listing>> {
        let all: Vec<Listing> = self.listings.read().map_err(poisoned)?.values().cloned().collect();
        Ok(filter.apply(all))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.listings.read().map_err(poisoned)?.len())
    }
}
