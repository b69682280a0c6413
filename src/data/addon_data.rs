//! Per-mode aggregate root and the process-wide registry of them.
//!
//! ## Snapshot format
//! `data/<MODE>.bin` holds a bincode `u32` version followed by the bincode
//! encoded [`AddonDataByMode`]. Owner back-references are never part of the
//! encoding; [`AddonDataByMode::ensure_owners`] rebuilds them after decoding.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use super::cats::{BrushCatCollection, CatCollection, TextureCatCollection};
use super::events::{self, DataEvent};
use super::host::Host;
use super::icons;
use super::items::{BrushItem, ItemKind, TextureItem};
use crate::core::config::ManagerConfig;
use crate::core::context::{ContextMode, ItemType, UiContext};
use crate::core::errors::CoreError;
use crate::core::paths::Paths;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything the manager knows for one editing mode.
#[derive(Debug, Serialize, Deserialize)]
pub struct AddonDataByMode {
    mode: ContextMode,
    pub brush_cats: BrushCatCollection,
    pub texture_cats: TextureCatCollection,
    /// `(category uuid, item uuid)`
    active_brush: Option<(String, String)>,
    active_texture: Option<(String, String)>,
    #[serde(skip)]
    importing: bool,
}

impl AddonDataByMode {
    pub fn new(mode: ContextMode) -> Self {
        Self {
            mode,
            brush_cats: BrushCatCollection::with_owner(mode),
            texture_cats: TextureCatCollection::with_owner(mode),
            active_brush: None,
            active_texture: None,
            importing: false,
        }
    }

    pub fn mode(&self) -> ContextMode {
        self.mode
    }

    /// Set while a library import streams into this data set.
    pub fn is_importing(&self) -> bool {
        self.importing
    }

    pub(crate) fn set_importing(&mut self, importing: bool) {
        self.importing = importing;
    }

    pub fn active_brush(&self) -> Option<&BrushItem> {
        let (cat, item) = self.active_brush.as_ref()?;
        self.brush_cats.get(cat.as_str())?.items().get(item.as_str())
    }

    pub fn active_texture(&self) -> Option<&TextureItem> {
        let (cat, item) = self.active_texture.as_ref()?;
        self.texture_cats.get(cat.as_str())?.items().get(item.as_str())
    }

    pub fn active_brush_ids(&self) -> Option<(&str, &str)> {
        self.active_brush
            .as_ref()
            .map(|(cat, item)| (cat.as_str(), item.as_str()))
    }

    pub fn active_texture_ids(&self) -> Option<(&str, &str)> {
        self.active_texture
            .as_ref()
            .map(|(cat, item)| (cat.as_str(), item.as_str()))
    }

    /// Record the active brush and install it in the host, cascading to its
    /// linked texture. Returns false when the item is unknown or has no payload.
    pub fn set_active_brush(
        &mut self,
        cat_uuid: &str,
        item_uuid: &str,
        host: &mut dyn Host,
        paths: &Paths,
    ) -> Result<bool, CoreError> {
        let Some(cat) = self.brush_cats.get_mut(cat_uuid) else {
            return Ok(false);
        };
        if !cat.items_mut().set_active(item_uuid) {
            return Ok(false);
        }
        self.active_brush = Some((cat_uuid.to_string(), item_uuid.to_string()));

        let mode = self.mode;
        let Some(item) = self.active_brush() else {
            return Ok(false);
        };
        let linked = item.data.texture_uuid.clone();
        if !item.install(mode, host, paths)? {
            return Ok(false);
        }

        if let Some(texture_uuid) = linked {
            let texture_cat = self
                .texture_cats
                .find_item(&texture_uuid)
                .map(|(cat, _)| cat.uuid().to_string());
            match texture_cat {
                Some(texture_cat) => {
                    self.set_active_texture(&texture_cat, &texture_uuid, host, paths)?;
                }
                None => tracing::warn!(
                    "Brush {} links missing texture {}",
                    item_uuid,
                    texture_uuid
                ),
            }
        }
        Ok(true)
    }

    pub fn set_active_texture(
        &mut self,
        cat_uuid: &str,
        item_uuid: &str,
        host: &mut dyn Host,
        paths: &Paths,
    ) -> Result<bool, CoreError> {
        let Some(cat) = self.texture_cats.get_mut(cat_uuid) else {
            return Ok(false);
        };
        if !cat.items_mut().set_active(item_uuid) {
            return Ok(false);
        }
        self.active_texture = Some((cat_uuid.to_string(), item_uuid.to_string()));

        let mode = self.mode;
        match self.active_texture() {
            Some(item) => item.install(mode, host, paths),
            None => Ok(false),
        }
    }

    pub fn find_texture(&self, uuid: &str) -> Option<&TextureItem> {
        self.texture_cats.find_item(uuid).map(|(_, item)| item)
    }

    pub fn find_brush(&self, uuid: &str) -> Option<&BrushItem> {
        self.brush_cats.find_item(uuid).map(|(_, item)| item)
    }

    /// Clear every brush link that no longer resolves to a texture of this
    /// data set. Returns how many links were cleared.
    pub fn heal_texture_links(&mut self) -> usize {
        let textures: HashSet<&str> = self.texture_cats.all_items().map(|t| t.uuid()).collect();
        let mut cleared = 0;
        for cat in self.brush_cats.iter_mut() {
            cleared += cat
                .items_mut()
                .clear_links_where(|texture| !textures.contains(texture));
        }
        if cleared > 0 {
            tracing::warn!("Cleared {} dangling texture links in {}", cleared, self.mode);
        }
        cleared
    }

    /// Move an item between two categories of `item_type`. When the moved
    /// item is the active brush or texture, the active pair follows it.
    pub fn move_item(&mut self, item_type: ItemType, item_uuid: &str, from: &str, to: &str) -> bool {
        match item_type {
            ItemType::Brush => {
                follow_move(&mut self.brush_cats, &mut self.active_brush, item_uuid, from, to)
            }
            ItemType::Texture => {
                follow_move(&mut self.texture_cats, &mut self.active_texture, item_uuid, from, to)
            }
        }
    }

    /// Remove a texture item and clear the brush links that pointed at it.
    pub fn remove_texture(
        &mut self,
        cat_uuid: &str,
        item_uuid: &str,
        paths: &Paths,
    ) -> Option<TextureItem> {
        let removed = self
            .texture_cats
            .get_mut(cat_uuid)?
            .items_mut()
            .remove(item_uuid, paths);
        if removed.is_some() {
            self.heal_texture_links();
        }
        removed
    }

    /// Remove a texture category with its items, clearing the brush links into it.
    pub fn remove_texture_cat(&mut self, cat_uuid: &str, paths: &Paths) -> bool {
        let removed = self.texture_cats.remove(cat_uuid, paths);
        if removed {
            self.heal_texture_links();
        }
        removed
    }

    /// Rebuild every owner back-reference and drop dangling texture links.
    /// Safe to call any number of times.
    pub fn ensure_owners(&mut self) {
        self.brush_cats.relink(self.mode);
        self.texture_cats.relink(self.mode);
        self.heal_texture_links();
    }

    /// Persist the category/item graph to the per-mode snapshot file.
    pub fn save(&mut self, paths: &Paths) -> Result<(), CoreError> {
        let path = paths.snapshot_file(self.mode);
        std::fs::create_dir_all(paths.data_dir())?;

        let tmp = path.with_extension("bin.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            bincode::serialize_into(&mut writer, &SNAPSHOT_VERSION)?;
            bincode::serialize_into(&mut writer, &*self)?;
            writer.flush()?;
        }
        std::fs::rename(&tmp, &path)?;

        self.ensure_owners();
        tracing::info!(
            "Saved {} data: {} brush categories, {} texture categories",
            self.mode,
            self.brush_cats.len(),
            self.texture_cats.len()
        );
        events::emit(&DataEvent::DataSaved {
            mode: self.mode,
            path,
        });
        Ok(())
    }

    /// Write every loaded item's payload, then the snapshot.
    pub fn save_with_payloads(
        &mut self,
        host: &mut dyn Host,
        paths: &Paths,
        compress: bool,
    ) -> Result<(), CoreError> {
        self.brush_cats.save_items(host, paths, compress)?;
        self.texture_cats.save_items(host, paths, compress)?;
        self.save(paths)
    }

    /// Read the per-mode snapshot. `Ok(None)` when there is none yet.
    pub fn load(mode: ContextMode, paths: &Paths) -> Result<Option<Self>, CoreError> {
        let path = paths.snapshot_file(mode);
        if !path.is_file() {
            return Ok(None);
        }

        let mut reader = BufReader::new(File::open(&path)?);
        let version: u32 = bincode::deserialize_from(&mut reader)?;
        if version != SNAPSHOT_VERSION {
            return Err(CoreError::Snapshot(format!(
                "Unsupported snapshot version {} in {:?}",
                version, path
            )));
        }
        let mut data: Self = bincode::deserialize_from(&mut reader)?;

        if data.mode != mode {
            tracing::warn!("Snapshot {:?} was written for {}", path, data.mode);
            data.mode = mode;
        }
        data.ensure_owners();

        tracing::info!(
            "Loaded {} data: {} brushes, {} textures",
            mode,
            data.brush_cats.item_count(),
            data.texture_cats.item_count()
        );
        events::emit(&DataEvent::DataLoaded { mode, path });
        Ok(Some(data))
    }

    /// Load the items of every `load_on_boot` category into the host.
    pub fn load_boot_items(&self, host: &mut dyn Host, paths: &Paths) -> Result<usize, CoreError> {
        let mut loaded = 0;
        for cat in self.brush_cats.iter().filter(|cat| cat.load_on_boot) {
            loaded += cat.load_items(host, paths)?;
        }
        for cat in self.texture_cats.iter().filter(|cat| cat.load_on_boot) {
            loaded += cat.load_items(host, paths)?;
        }
        Ok(loaded)
    }
}

fn follow_move<K: ItemKind>(
    cats: &mut CatCollection<K>,
    active: &mut Option<(String, String)>,
    item_uuid: &str,
    from: &str,
    to: &str,
) -> bool {
    if !cats.move_item(item_uuid, from, to) {
        return false;
    }
    if let Some((cat, item)) = active.as_mut() {
        if item == item_uuid {
            *cat = to.to_string();
            if let Some(target) = cats.get_mut(to) {
                target.items_mut().set_active(item_uuid);
            }
        }
    }
    true
}

/// Seeds default content into a freshly created data set.
pub type Initializer = Box<dyn FnMut(&mut AddonDataByMode) + Send + Sync>;

/// Cache of per-mode data sets, loaded on first access.
pub struct AddonData {
    paths: Paths,
    compress_payloads: bool,
    modes: HashMap<ContextMode, AddonDataByMode>,
    pending_init: Vec<ContextMode>,
    initializer: Option<Initializer>,
}

impl std::fmt::Debug for AddonData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddonData")
            .field("paths", &self.paths)
            .field("modes", &self.modes.keys().collect::<Vec<_>>())
            .field("pending_init", &self.pending_init)
            .finish()
    }
}

impl AddonData {
    pub fn new(paths: Paths) -> Self {
        Self {
            paths,
            compress_payloads: true,
            modes: HashMap::new(),
            pending_init: Vec::new(),
            initializer: None,
        }
    }

    pub fn from_config(config: &ManagerConfig) -> Self {
        let mut data = Self::new(Paths::from_config(config));
        data.compress_payloads = config.compress_payloads;
        data
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn set_initializer<F>(&mut self, initializer: F)
    where
        F: FnMut(&mut AddonDataByMode) + Send + Sync + 'static,
    {
        self.initializer = Some(Box::new(initializer));
    }

    pub fn is_cached(&self, mode: ContextMode) -> bool {
        self.modes.contains_key(&mode)
    }

    pub fn peek(&self, mode: ContextMode) -> Option<&AddonDataByMode> {
        self.modes.get(&mode)
    }

    /// Data for `mode`: cached, else from disk, else fresh with a deferred init.
    pub fn get_data(&mut self, mode: ContextMode) -> &mut AddonDataByMode {
        if !self.modes.contains_key(&mode) {
            let data = match AddonDataByMode::load(mode, &self.paths) {
                Ok(Some(data)) => data,
                Ok(None) => self.fresh(mode),
                Err(err) => {
                    tracing::warn!("Failed to load {} data, starting fresh: {}", mode, err);
                    self.fresh(mode)
                }
            };
            self.modes.insert(mode, data);
        }
        self.modes
            .entry(mode)
            .or_insert_with(|| AddonDataByMode::new(mode))
    }

    pub fn get_data_by_context(&mut self, ui: UiContext) -> &mut AddonDataByMode {
        self.get_data(ui.mode)
    }

    /// Data for the context together with the on-disk layout.
    pub fn context_mut(&mut self, ui: UiContext) -> (&mut AddonDataByMode, &Paths) {
        self.get_data(ui.mode);
        let data = self
            .modes
            .entry(ui.mode)
            .or_insert_with(|| AddonDataByMode::new(ui.mode));
        (data, &self.paths)
    }

    fn fresh(&mut self, mode: ContextMode) -> AddonDataByMode {
        tracing::info!("Creating {} data", mode);
        if !self.pending_init.contains(&mode) {
            self.pending_init.push(mode);
        }
        AddonDataByMode::new(mode)
    }

    pub fn has_pending_init(&self) -> bool {
        !self.pending_init.is_empty()
    }

    /// Run the initializer on data sets created since the last call, once the
    /// host is ready to accept content. Returns how many were initialized.
    pub fn run_deferred_init(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending_init);
        let mut count = 0;
        for mode in pending {
            let Some(data) = self.modes.get_mut(&mode) else {
                continue;
            };
            if let Some(initializer) = self.initializer.as_mut() {
                initializer(data);
            }
            data.ensure_owners();
            events::emit(&DataEvent::DataInitialized { mode });
            count += 1;
        }
        count
    }

    pub fn save_all(&mut self) -> Result<(), CoreError> {
        for data in self.modes.values_mut() {
            data.save(&self.paths)?;
        }
        Ok(())
    }

    pub fn save_all_with_payloads(&mut self, host: &mut dyn Host) -> Result<(), CoreError> {
        for data in self.modes.values_mut() {
            data.save_with_payloads(host, &self.paths, self.compress_payloads)?;
        }
        Ok(())
    }

    /// Forget every cached mode and wipe snapshots, payloads and icons.
    pub fn clear_all(&mut self) -> Result<(), CoreError> {
        self.modes.clear();
        self.pending_init.clear();

        let mut dirs = vec![self.paths.data_dir(), self.paths.icons_dir()];
        dirs.push(self.paths.payload_dir(ItemType::Brush));
        dirs.push(self.paths.payload_dir(ItemType::Texture));
        for dir in dirs {
            if dir.exists() {
                std::fs::remove_dir_all(&dir)?;
            }
        }
        icons::clear_icon_cache();
        self.paths.ensure_dirs()?;
        tracing::info!("Cleared all data under {:?}", self.paths.root());
        Ok(())
    }
}

/// Global registry (parking_lot::RwLock doesn't poison)
static REGISTRY: RwLock<Option<AddonData>> = RwLock::new(None);

/// Create the data directory tree and install a fresh registry.
pub fn init_registry(config: &ManagerConfig) -> Result<(), CoreError> {
    let data = AddonData::from_config(config);
    data.paths().ensure_dirs()?;
    tracing::info!("Brush manager data at {:?}", data.paths().root());
    *REGISTRY.write() = Some(data);
    Ok(())
}

pub fn with_registry_read<F, R>(f: F) -> Result<R, CoreError>
where
    F: FnOnce(&AddonData) -> R,
{
    let guard = REGISTRY.read();
    let data = guard
        .as_ref()
        .ok_or_else(|| CoreError::InvalidInput("Registry not initialized".into()))?;
    Ok(f(data))
}

/// Events raised by `f` reach subscribers after the write lock is released.
pub fn with_registry_write<F, R>(f: F) -> Result<R, CoreError>
where
    F: FnOnce(&mut AddonData) -> R,
{
    events::deferred(|| {
        let mut guard = REGISTRY.write();
        let data = guard
            .as_mut()
            .ok_or_else(|| CoreError::InvalidInput("Registry not initialized".into()))?;
        Ok(f(data))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::data::host::MemoryHost;
    use crate::data::items::{BrushData, NewItem, TextureData};

    fn paths() -> (tempfile::TempDir, Paths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::new(dir.path(), "blend");
        paths.ensure_dirs().unwrap();
        (dir, paths)
    }

    /// One texture category with one texture, one brush category with a brush linking it.
    fn populated(mode: ContextMode) -> (AddonDataByMode, String, String, String, String) {
        let mut data = AddonDataByMode::new(mode);
        let tex_cat = data.texture_cats.add("Textures", None);
        let tex_cat_uuid = tex_cat.uuid().to_string();
        let texture = tex_cat
            .items_mut()
            .add(NewItem::new("noise", TextureData::default()))
            .uuid()
            .to_string();

        let brush_cat = data.brush_cats.add("Brushes", None);
        let brush_cat_uuid = brush_cat.uuid().to_string();
        let brush = brush_cat
            .items_mut()
            .add(NewItem::new(
                "clay",
                BrushData {
                    texture_uuid: Some(texture.clone()),
                },
            ))
            .uuid()
            .to_string();
        (data, tex_cat_uuid, texture, brush_cat_uuid, brush)
    }

    #[test]
    fn active_resolution_is_lazy() {
        let (mut data, _, _, brush_cat, brush) = populated(ContextMode::Sculpt);
        assert!(data.active_brush().is_none());

        data.active_brush = Some((brush_cat.clone(), brush.clone()));
        assert_eq!(data.active_brush().unwrap().uuid(), brush);

        data.active_brush = Some(("gone".to_string(), brush));
        assert!(data.active_brush().is_none());
    }

    #[test]
    fn set_active_brush_cascades_to_texture() {
        let (_dir, paths) = paths();
        let mut host = MemoryHost::new();
        let (mut data, tex_cat, texture, brush_cat, brush) = populated(ContextMode::Sculpt);

        host.insert(ItemType::Brush, &brush, "clay", vec![1]);
        host.insert(ItemType::Texture, &texture, "noise", vec![2]);
        data.save_with_payloads(&mut host, &paths, true).unwrap();
        let mut host = MemoryHost::new();

        assert!(data
            .set_active_brush(&brush_cat, &brush, &mut host, &paths)
            .unwrap());
        assert_eq!(
            host.active_tool(ContextMode::Sculpt, ItemType::Brush),
            Some(brush.as_str())
        );
        assert_eq!(
            host.active_tool(ContextMode::Sculpt, ItemType::Texture),
            Some(texture.as_str())
        );
        assert_eq!(data.active_texture_ids(), Some((tex_cat.as_str(), texture.as_str())));

        assert!(!data
            .set_active_brush(&brush_cat, "unknown", &mut host, &paths)
            .unwrap());
    }

    #[test]
    fn removing_texture_heals_links() {
        let (_dir, paths) = paths();
        let (mut data, tex_cat, texture, _, brush) = populated(ContextMode::ImagePaint);

        assert!(data.remove_texture(&tex_cat, &texture, &paths).is_some());
        assert!(data.find_brush(&brush).unwrap().data.texture_uuid.is_none());
    }

    #[test]
    fn snapshot_roundtrip_relinks() {
        let (_dir, paths) = paths();
        let (mut data, _, texture, brush_cat, brush) = populated(ContextMode::Sculpt);
        data.active_brush = Some((brush_cat.clone(), brush.clone()));
        data.save(&paths).unwrap();

        let loaded = AddonDataByMode::load(ContextMode::Sculpt, &paths)
            .unwrap()
            .unwrap();
        assert_eq!(loaded.active_brush().unwrap().uuid(), brush);
        let item = loaded.find_brush(&brush).unwrap();
        assert_eq!(item.owner(), Some(brush_cat.as_str()));
        assert_eq!(item.data.texture_uuid.as_deref(), Some(texture.as_str()));
        assert_eq!(loaded.brush_cats[0].owner(), Some(ContextMode::Sculpt));
        assert!(!loaded.is_importing());
    }

    #[test]
    fn unknown_snapshot_version_is_rejected() {
        let (_dir, paths) = paths();
        let file = paths.snapshot_file(ContextMode::Sculpt);
        std::fs::write(&file, bincode::serialize(&99u32).unwrap()).unwrap();
        assert!(matches!(
            AddonDataByMode::load(ContextMode::Sculpt, &paths),
            Err(CoreError::Snapshot(_))
        ));
    }

    #[test]
    fn registry_defers_init_and_reloads() {
        let (_dir, paths) = paths();
        let mut registry = AddonData::new(paths.clone());
        registry.set_initializer(|data| {
            data.brush_cats.add("Unassigned", Some("unassigned"));
        });

        assert!(registry.get_data(ContextMode::Sculpt).brush_cats.is_empty());
        assert!(registry.has_pending_init());
        assert_eq!(registry.run_deferred_init(), 1);
        assert_eq!(registry.run_deferred_init(), 0);
        assert_eq!(registry.get_data(ContextMode::Sculpt).brush_cats.len(), 1);
        registry.save_all().unwrap();

        let mut reopened = AddonData::new(paths);
        let data = reopened.get_data(ContextMode::Sculpt);
        assert_eq!(data.brush_cats.active_uuid(), Some("unassigned"));
        assert!(!reopened.has_pending_init());
    }

    #[test]
    fn corrupt_snapshot_falls_back_to_fresh() {
        let (_dir, paths) = paths();
        std::fs::write(paths.snapshot_file(ContextMode::PaintGpencil), b"garbage").unwrap();
        let mut registry = AddonData::new(paths);
        assert!(registry.get_data(ContextMode::PaintGpencil).brush_cats.is_empty());
        assert!(registry.has_pending_init());
    }

    #[test]
    fn clear_all_wipes_disk() {
        let (_dir, paths) = paths();
        let mut registry = AddonData::new(paths.clone());
        registry.get_data(ContextMode::Sculpt).brush_cats.add("a", None);
        registry.save_all().unwrap();
        assert!(paths.snapshot_file(ContextMode::Sculpt).exists());

        registry.clear_all().unwrap();
        assert!(!registry.is_cached(ContextMode::Sculpt));
        assert!(!paths.snapshot_file(ContextMode::Sculpt).exists());
        assert!(paths.data_dir().is_dir());
    }

    #[test]
    fn moving_the_active_brush_keeps_it_active() {
        let (mut data, _, _, brush_cat, brush) = populated(ContextMode::Sculpt);
        let other = data.brush_cats.add("Other", None).uuid().to_string();
        data.active_brush = Some((brush_cat.clone(), brush.clone()));

        assert!(data.move_item(ItemType::Brush, &brush, &brush_cat, &other));
        assert_eq!(data.active_brush_ids(), Some((other.as_str(), brush.as_str())));
        assert_eq!(data.active_brush().unwrap().uuid(), brush);
        assert_eq!(
            data.brush_cats[other.as_str()].items().active_uuid(),
            Some(brush.as_str())
        );
        assert!(!data.move_item(ItemType::Brush, &brush, &brush_cat, &other));
    }

    #[test]
    fn moving_another_texture_leaves_active_alone() {
        let (mut data, tex_cat, texture, _, _) = populated(ContextMode::Sculpt);
        let spare = data
            .texture_cats
            .get_mut(tex_cat.as_str())
            .unwrap()
            .items_mut()
            .add(NewItem::new("spare", TextureData::default()))
            .uuid()
            .to_string();
        let other = data.texture_cats.add("Other", None).uuid().to_string();
        data.active_texture = Some((tex_cat.clone(), texture.clone()));

        assert!(data.move_item(ItemType::Texture, &spare, &tex_cat, &other));
        assert_eq!(data.active_texture_ids(), Some((tex_cat.as_str(), texture.as_str())));
    }

    #[test]
    fn save_and_load_announce_the_snapshot() {
        use parking_lot::Mutex;
        use std::sync::Arc;

        let (_dir, paths) = paths();
        let snapshot = paths.snapshot_file(ContextMode::ImagePaint);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let watched = snapshot.clone();
        let id = events::subscribe(move |event| match event {
            DataEvent::DataSaved { path, .. } if *path == watched => sink.lock().push("saved"),
            DataEvent::DataLoaded { path, .. } if *path == watched => sink.lock().push("loaded"),
            _ => {}
        });

        let (mut data, ..) = populated(ContextMode::ImagePaint);
        data.save(&paths).unwrap();
        AddonDataByMode::load(ContextMode::ImagePaint, &paths)
            .unwrap()
            .unwrap();
        events::unsubscribe(id);

        assert_eq!(*seen.lock(), vec!["saved", "loaded"]);
    }
}
