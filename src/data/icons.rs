//! Icon thumbnails and their decoded cache.
//!
//! ## Two-level storage
//! 1. **Disk**: one `<uuid>.png` per item/category, sized to [`ICON_SIZE`]
//! 2. **Memory**: decoded RGBA keyed by uuid, filled lazily on first access
//!
//! Entries are only invalidated explicitly (icon assign/clear, item destroy).

use image::imageops::FilterType;
use image::ImageFormat;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;

use crate::core::errors::CoreError;

pub const ICON_SIZE: u32 = 92;

/// Decoded icon pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedIcon {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Global icon cache (parking_lot::RwLock doesn't poison)
static ICON_CACHE: RwLock<Option<IconCache>> = RwLock::new(None);

#[derive(Debug, Default)]
pub struct IconCache {
    icons: HashMap<String, CachedIcon>,
}

impl IconCache {
    pub fn new() -> Self {
        Self {
            icons: HashMap::new(),
        }
    }

    pub fn insert(&mut self, uuid: String, icon: CachedIcon) {
        self.icons.insert(uuid, icon);
    }

    pub fn get(&self, uuid: &str) -> Option<&CachedIcon> {
        self.icons.get(uuid)
    }

    pub fn remove(&mut self, uuid: &str) -> Option<CachedIcon> {
        self.icons.remove(uuid)
    }

    pub fn clear(&mut self) {
        self.icons.clear();
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

fn cache_insert(uuid: &str, icon: CachedIcon) {
    let mut guard = ICON_CACHE.write();
    guard
        .get_or_insert_with(IconCache::new)
        .insert(uuid.to_string(), icon);
}

fn decode_icon(path: &Path) -> Result<CachedIcon, CoreError> {
    let rgba = image::open(path)?.to_rgba8();
    Ok(CachedIcon {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// Build a thumbnail from any decodable image at `source` and store it at `dest`.
pub fn assign_icon(uuid: &str, source: &Path, dest: &Path) -> Result<CachedIcon, CoreError> {
    let thumbnail = image::open(source)?
        .resize_exact(ICON_SIZE, ICON_SIZE, FilterType::Triangle)
        .to_rgba8();

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    thumbnail.save_with_format(dest, ImageFormat::Png)?;

    let icon = CachedIcon {
        width: thumbnail.width(),
        height: thumbnail.height(),
        rgba: thumbnail.into_raw(),
    };
    cache_insert(uuid, icon.clone());
    tracing::debug!("Assigned icon {} from {:?}", uuid, source);
    Ok(icon)
}

/// Get a decoded icon, reading `path` on a memory miss.
pub fn get_icon(uuid: &str, path: &Path) -> Option<CachedIcon> {
    {
        let guard = ICON_CACHE.read();
        if let Some(icon) = guard.as_ref().and_then(|cache| cache.get(uuid)) {
            return Some(icon.clone());
        }
    }

    if !path.is_file() {
        return None;
    }

    match decode_icon(path) {
        Ok(icon) => {
            cache_insert(uuid, icon.clone());
            Some(icon)
        }
        Err(err) => {
            tracing::warn!("Failed to decode icon {} at {:?}: {}", uuid, path, err);
            None
        }
    }
}

/// Drop the cached pixels only; the file stays.
pub fn invalidate_icon(uuid: &str) {
    let mut guard = ICON_CACHE.write();
    if let Some(cache) = guard.as_mut() {
        cache.remove(uuid);
    }
}

/// Drop the cached pixels and delete the icon file.
pub fn clear_icon(uuid: &str, path: &Path) {
    invalidate_icon(uuid);
    if path.is_file() {
        if let Err(err) = std::fs::remove_file(path) {
            tracing::warn!("Failed to remove icon {:?}: {}", path, err);
        }
    }
}

/// Copy icon bytes from one uuid to another. Returns false when there is no source icon.
pub fn copy_icon(source: &Path, dest_uuid: &str, dest: &Path) -> Result<bool, CoreError> {
    if !source.is_file() {
        return Ok(false);
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(source, dest)?;
    invalidate_icon(dest_uuid);
    Ok(true)
}

pub fn clear_icon_cache() {
    let mut guard = ICON_CACHE.write();
    match guard.as_mut() {
        Some(cache) => {
            tracing::debug!("Clearing {} cached icons", cache.len());
            cache.clear();
        }
        None => *guard = Some(IconCache::new()),
    }
}

pub fn is_icon_cached(uuid: &str) -> bool {
    let guard = ICON_CACHE.read();
    guard
        .as_ref()
        .map(|cache| cache.get(uuid).is_some())
        .unwrap_or(false)
}
