//! Brush/texture items and the ordered collection each category owns.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::ops::Index;
use std::path::{Path, PathBuf};

use super::common::{new_uuid, Key};
use super::events::{self, DataEvent};
use super::host::{DatablockRef, Host};
use super::icons::{self, CachedIcon};
use crate::core::context::{ContextMode, ItemType};
use crate::core::errors::CoreError;
use crate::core::paths::{IconKind, Paths};

/// Kind-specific part of an item.
pub trait ItemKind: Debug + Default + Clone + Serialize + DeserializeOwned {
    const ITEM_TYPE: ItemType;
    const ICON_KIND: IconKind;
    const CATEGORY_ICON_KIND: IconKind;
    /// Keeps a `<uuid>.default.<ext>` payload that `reset` restores from.
    const HAS_DEFAULT_PAYLOAD: bool;

    fn linked_texture(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushData {
    /// The brush's paint texture, by texture item uuid.
    pub texture_uuid: Option<String>,
}

impl ItemKind for BrushData {
    const ITEM_TYPE: ItemType = ItemType::Brush;
    const ICON_KIND: IconKind = IconKind::Brush;
    const CATEGORY_ICON_KIND: IconKind = IconKind::BrushCategory;
    const HAS_DEFAULT_PAYLOAD: bool = true;

    fn linked_texture(&self) -> Option<&str> {
        self.texture_uuid.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureData {
    pub format: String,
}

impl ItemKind for TextureData {
    const ITEM_TYPE: ItemType = ItemType::Texture;
    const ICON_KIND: IconKind = IconKind::Texture;
    const CATEGORY_ICON_KIND: IconKind = IconKind::TextureCategory;
    const HAS_DEFAULT_PAYLOAD: bool = false;
}

/// Fields for a new item. The uuid is never part of it.
#[derive(Debug, Clone, Default)]
pub struct NewItem<K> {
    pub name: String,
    pub kind: String,
    pub use_custom_icon: bool,
    pub favorite: bool,
    pub data: K,
}

impl<K: ItemKind> NewItem<K> {
    pub fn new(name: impl Into<String>, data: K) -> Self {
        Self {
            name: name.into(),
            kind: String::new(),
            use_custom_icon: false,
            favorite: false,
            data,
        }
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn custom_icon(mut self, use_custom_icon: bool) -> Self {
        self.use_custom_icon = use_custom_icon;
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Item<K> {
    uuid: String,
    pub name: String,
    /// Brush tool type or texture type tag.
    #[serde(rename = "type")]
    pub kind: String,
    pub selected: bool,
    pub favorite: bool,
    pub use_custom_icon: bool,
    pub data: K,
    /// Uuid of the owning category; rebuilt after load.
    #[serde(skip)]
    owner: Option<String>,
}

pub type BrushItem = Item<BrushData>;
pub type TextureItem = Item<TextureData>;

impl<K: ItemKind> Item<K> {
    fn from_new(uuid: String, new: NewItem<K>) -> Self {
        Self {
            uuid,
            name: new.name,
            kind: new.kind,
            selected: false,
            favorite: new.favorite,
            use_custom_icon: new.use_custom_icon,
            data: new.data,
            owner: None,
        }
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn item_type(&self) -> ItemType {
        K::ITEM_TYPE
    }

    pub fn payload_path(&self, paths: &Paths, default: bool) -> PathBuf {
        paths.payload_file(K::ITEM_TYPE, &self.uuid, default)
    }

    pub fn icon_path(&self, paths: &Paths) -> PathBuf {
        paths.icon_file(K::ICON_KIND, &self.uuid)
    }

    pub fn icon(&self, paths: &Paths) -> Option<CachedIcon> {
        icons::get_icon(&self.uuid, &self.icon_path(paths))
    }

    pub fn assign_icon(&mut self, paths: &Paths, source: &Path) -> Result<(), CoreError> {
        icons::assign_icon(&self.uuid, source, &self.icon_path(paths))?;
        self.use_custom_icon = true;
        Ok(())
    }

    pub fn clear_icon(&mut self, paths: &Paths) {
        icons::clear_icon(&self.uuid, &self.icon_path(paths));
        self.use_custom_icon = false;
    }

    pub fn is_loaded(&self, host: &dyn Host) -> bool {
        host.has_datablock(K::ITEM_TYPE, &self.uuid)
    }

    fn datablock_ref(&self) -> DatablockRef {
        DatablockRef {
            item_type: K::ITEM_TYPE,
            uuid: self.uuid.clone(),
        }
    }

    /// Pull the payload into the host, replacing any live datablock with this uuid.
    /// Returns `None` when the payload file is missing.
    pub fn load(
        &self,
        host: &mut dyn Host,
        paths: &Paths,
        from_default: bool,
    ) -> Result<Option<DatablockRef>, CoreError> {
        let path = self.payload_path(paths, from_default && K::HAS_DEFAULT_PAYLOAD);
        if !path.is_file() {
            tracing::warn!(
                "Missing payload for {} '{}': {:?}",
                K::ITEM_TYPE.name(),
                self.name,
                path
            );
            return Ok(None);
        }

        if host.remove_datablock(K::ITEM_TYPE, &self.uuid) {
            tracing::debug!("Replaced live datablock {}", self.uuid);
        }

        host.load_datablock(K::ITEM_TYPE, &self.uuid, &path)?;
        host.rename_datablock(K::ITEM_TYPE, &self.uuid, &self.name);
        Ok(Some(self.datablock_ref()))
    }

    /// Write the live datablock to its payload file. No live datablock is a no-op.
    pub fn save(
        &self,
        host: &mut dyn Host,
        paths: &Paths,
        compress: bool,
        save_default: bool,
    ) -> Result<(), CoreError> {
        if !host.has_datablock(K::ITEM_TYPE, &self.uuid) {
            tracing::debug!("Skip save of {}: not loaded", self.uuid);
            return Ok(());
        }

        let save_default = save_default && K::HAS_DEFAULT_PAYLOAD;
        let path = self.payload_path(paths, save_default);
        if !save_default && path.is_file() && !host.is_dirty(K::ITEM_TYPE, &self.uuid) {
            return Ok(());
        }

        host.write_datablock(K::ITEM_TYPE, &self.uuid, &path, compress)?;
        tracing::debug!("Saved {} payload {:?}", K::ITEM_TYPE.name(), path);
        Ok(())
    }

    /// Reload from the default payload and make it the regular one.
    pub fn reset(
        &self,
        host: &mut dyn Host,
        paths: &Paths,
    ) -> Result<Option<DatablockRef>, CoreError> {
        let handle = self.load(host, paths, true)?;
        if handle.is_some() && K::HAS_DEFAULT_PAYLOAD {
            std::fs::copy(
                self.payload_path(paths, true),
                self.payload_path(paths, false),
            )?;
        }
        Ok(handle)
    }

    /// Live datablock handle, loading it on demand.
    pub fn ensure_loaded(
        &self,
        host: &mut dyn Host,
        paths: &Paths,
    ) -> Result<Option<DatablockRef>, CoreError> {
        if self.is_loaded(host) {
            return Ok(Some(self.datablock_ref()));
        }
        self.load(host, paths, false)
    }

    /// Install as the host's current tool. Returns false when nothing could be loaded.
    pub fn install(
        &self,
        mode: ContextMode,
        host: &mut dyn Host,
        paths: &Paths,
    ) -> Result<bool, CoreError> {
        if self.ensure_loaded(host, paths)?.is_none() {
            return Ok(false);
        }
        host.set_active_tool(mode, K::ITEM_TYPE, &self.uuid)?;
        Ok(true)
    }

    /// Release the cached icon, icon file and payload files.
    fn destroy(&self, paths: &Paths) {
        icons::clear_icon(&self.uuid, &self.icon_path(paths));

        let mut payloads = vec![self.payload_path(paths, false)];
        if K::HAS_DEFAULT_PAYLOAD {
            payloads.push(self.payload_path(paths, true));
        }
        for path in payloads {
            if path.is_file() {
                if let Err(err) = std::fs::remove_file(&path) {
                    tracing::warn!("Failed to remove payload {:?}: {}", path, err);
                }
            }
        }
        tracing::debug!("Destroyed {} {}", K::ITEM_TYPE.name(), self.uuid);
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemCollection<K> {
    items: IndexMap<String, Item<K>>,
    active: Option<String>,
    /// Uuid of the owning category; rebuilt after load.
    #[serde(skip)]
    owner: Option<String>,
}

pub type BrushItemCollection = ItemCollection<BrushData>;
pub type TextureItemCollection = ItemCollection<TextureData>;

impl<K> Default for ItemCollection<K> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
            active: None,
            owner: None,
        }
    }
}

impl<K: ItemKind> ItemCollection<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_owner(owner: &str) -> Self {
        Self {
            owner: Some(owner.to_string()),
            ..Self::default()
        }
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, uuid: &str) -> bool {
        self.items.contains_key(uuid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item<K>> {
        self.items.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Item<K>> {
        self.items.values_mut()
    }

    pub fn uuids(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn index_of(&self, uuid: &str) -> Option<usize> {
        self.items.get_index_of(uuid)
    }

    fn resolve<'a>(&'a self, key: Key<'a>) -> Option<&'a str> {
        match key {
            Key::Index(index) => self.items.get_index(index).map(|(uuid, _)| uuid.as_str()),
            Key::Uuid(uuid) => self.items.contains_key(uuid).then_some(uuid),
        }
    }

    pub fn get<'a>(&self, key: impl Into<Key<'a>>) -> Option<&Item<K>> {
        match key.into() {
            Key::Index(index) => self.items.get_index(index).map(|(_, item)| item),
            Key::Uuid(uuid) => self.items.get(uuid),
        }
    }

    pub fn get_mut<'a>(&mut self, key: impl Into<Key<'a>>) -> Option<&mut Item<K>> {
        match key.into() {
            Key::Index(index) => self.items.get_index_mut(index).map(|(_, item)| item),
            Key::Uuid(uuid) => self.items.get_mut(uuid),
        }
    }

    pub fn active(&self) -> Option<&Item<K>> {
        self.active.as_deref().and_then(|uuid| self.items.get(uuid))
    }

    pub fn active_uuid(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Mark an item active. Unknown keys leave the selection untouched.
    pub fn set_active<'a>(&mut self, key: impl Into<Key<'a>>) -> bool {
        match self.resolve(key.into()).map(str::to_string) {
            Some(uuid) => {
                self.active = Some(uuid);
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = &Item<K>> {
        self.items.values().filter(|item| item.selected)
    }

    pub fn favorites(&self) -> impl Iterator<Item = &Item<K>> {
        self.items.values().filter(|item| item.favorite)
    }

    pub fn set_selection(&mut self, selected: bool) {
        for item in self.items.values_mut() {
            item.selected = selected;
        }
    }

    fn attach(&mut self, mut item: Item<K>) -> &mut Item<K> {
        item.owner = self.owner.clone();
        let uuid = item.uuid.clone();
        let (index, _) = self.items.insert_full(uuid.clone(), item);
        events::emit(&DataEvent::ItemAdded {
            item_type: K::ITEM_TYPE,
            category: self.owner.clone(),
            item: uuid,
        });
        &mut self.items[index]
    }

    /// Append a new item with a fresh uuid.
    pub fn add(&mut self, new: NewItem<K>) -> &mut Item<K> {
        let item = Item::from_new(new_uuid(), new);
        self.attach(item)
    }

    /// Append a new item under a uuid chosen elsewhere (import manifests).
    /// Returns `None` when the uuid is already taken.
    pub fn add_with_uuid(&mut self, uuid: &str, new: NewItem<K>) -> Option<&mut Item<K>> {
        if self.items.contains_key(uuid) {
            tracing::debug!("Item {} already present, skipping", uuid);
            return None;
        }
        let item = Item::from_new(uuid.to_string(), new);
        Some(self.attach(item))
    }

    /// Take the item out without releasing its resources.
    pub fn detach<'a>(&mut self, key: impl Into<Key<'a>>) -> Option<Item<K>> {
        let uuid = self.resolve(key.into())?.to_string();
        let mut item = self.items.shift_remove(&uuid)?;
        if self.active.as_deref() == Some(uuid.as_str()) {
            self.active = None;
        }
        item.owner = None;
        Some(item)
    }

    /// Remove and destroy the item: icon, icon file and payload files go with it.
    pub fn remove<'a>(&mut self, key: impl Into<Key<'a>>, paths: &Paths) -> Option<Item<K>> {
        let uuid = self.resolve(key.into())?.to_string();
        events::emit(&DataEvent::ItemRemoved {
            item_type: K::ITEM_TYPE,
            category: self.owner.clone(),
            item: uuid.clone(),
        });

        let item = self.detach(uuid.as_str())?;
        item.destroy(paths);
        Some(item)
    }

    /// Remove and destroy every item, in order.
    pub fn clear(&mut self, paths: &Paths) {
        let uuids: Vec<String> = self.items.keys().cloned().collect();
        for uuid in uuids {
            self.remove(uuid.as_str(), paths);
        }
        self.active = None;
    }

    /// Transfer an item to `other`, keeping its resources.
    pub fn move_to(&mut self, uuid: &str, other: &mut ItemCollection<K>) -> bool {
        if !self.items.contains_key(uuid) {
            return false;
        }

        events::emit(&DataEvent::ItemMovePre {
            item_type: K::ITEM_TYPE,
            item: uuid.to_string(),
            from: self.owner.clone(),
            to: other.owner.clone(),
        });

        let Some(item) = self.detach(uuid) else {
            return false;
        };
        other.insert_moved(item);

        events::emit(&DataEvent::ItemMovePost {
            item_type: K::ITEM_TYPE,
            item: uuid.to_string(),
            from: self.owner.clone(),
            to: other.owner.clone(),
        });
        true
    }

    pub(crate) fn insert_moved(&mut self, mut item: Item<K>) {
        item.owner = self.owner.clone();
        self.items.insert(item.uuid.clone(), item);
    }

    /// Copy an item under a fresh uuid: kind, data, custom icon and payloads.
    /// Selection and favorite state are not copied.
    pub fn duplicate<'a>(
        &mut self,
        key: impl Into<Key<'a>>,
        paths: &Paths,
    ) -> Result<Option<&mut Item<K>>, CoreError> {
        let Some(source) = self.get(key) else {
            return Ok(None);
        };

        let new = NewItem {
            name: source.name.clone(),
            kind: source.kind.clone(),
            use_custom_icon: source.use_custom_icon,
            favorite: false,
            data: source.data.clone(),
        };
        let source_uuid = source.uuid.clone();
        let source_icon = source.icon_path(paths);
        let mut payloads = vec![(source.payload_path(paths, false), false)];
        if K::HAS_DEFAULT_PAYLOAD {
            payloads.push((source.payload_path(paths, true), true));
        }

        let duplicate = Item::from_new(new_uuid(), new);
        if duplicate.use_custom_icon {
            icons::copy_icon(&source_icon, &duplicate.uuid, &duplicate.icon_path(paths))?;
        }
        for (path, default) in payloads {
            if path.is_file() {
                std::fs::copy(&path, duplicate.payload_path(paths, default))?;
            }
        }

        tracing::debug!("Duplicated {} -> {}", source_uuid, duplicate.uuid);
        Ok(Some(self.attach(duplicate)))
    }

    /// Drop texture links for which `dangling` holds. Returns how many were cleared.
    pub(crate) fn clear_links_where(&mut self, mut dangling: impl FnMut(&str) -> bool) -> usize
    where
        K: LinkTexture,
    {
        let mut cleared = 0;
        for item in self.items.values_mut() {
            if item.data.linked_texture().is_some_and(&mut dangling) {
                item.data.unlink_texture();
                cleared += 1;
            }
        }
        cleared
    }

    pub(crate) fn relink(&mut self, owner: &str) {
        self.owner = Some(owner.to_string());
        for item in self.items.values_mut() {
            item.owner = Some(owner.to_string());
        }
    }

    pub fn save_all(
        &self,
        host: &mut dyn Host,
        paths: &Paths,
        compress: bool,
    ) -> Result<(), CoreError> {
        for item in self.items.values() {
            item.save(host, paths, compress, false)?;
        }
        Ok(())
    }
}

/// Kinds whose items can point at a texture item.
pub trait LinkTexture: ItemKind {
    fn unlink_texture(&mut self);
}

impl LinkTexture for BrushData {
    fn unlink_texture(&mut self) {
        self.texture_uuid = None;
    }
}

impl<K: ItemKind> Index<usize> for ItemCollection<K> {
    type Output = Item<K>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<K: ItemKind> Index<&str> for ItemCollection<K> {
    type Output = Item<K>;

    fn index(&self, uuid: &str) -> &Self::Output {
        &self.items[uuid]
    }
}

impl<'a, K: ItemKind> IntoIterator for &'a ItemCollection<K> {
    type Item = &'a Item<K>;
    type IntoIter = indexmap::map::Values<'a, String, Item<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.values()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::data::host::MemoryHost;

    fn paths() -> (tempfile::TempDir, Paths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::new(dir.path(), "blend");
        paths.ensure_dirs().unwrap();
        (dir, paths)
    }

    fn brush(name: &str) -> NewItem<BrushData> {
        NewItem::new(name, BrushData::default()).kind("DRAW")
    }

    #[test]
    fn removal_is_announced_while_the_item_still_exists() {
        use parking_lot::Mutex;
        use std::sync::Arc;

        let (_dir, paths) = paths();
        let mut items = BrushItemCollection::with_owner("cat");
        let uuid = items.add(brush("doomed")).uuid().to_string();
        let payload = items[uuid.as_str()].payload_path(&paths, false);
        std::fs::create_dir_all(payload.parent().unwrap()).unwrap();
        std::fs::write(&payload, b"payload").unwrap();

        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let watched = uuid.clone();
        let file = payload.clone();
        let id = events::subscribe(move |event| {
            if let DataEvent::ItemRemoved { item, category, .. } = event {
                if *item == watched {
                    *sink.lock() = Some((category.clone(), file.exists()));
                }
            }
        });

        assert!(items.remove(uuid.as_str(), &paths).is_some());
        events::unsubscribe(id);

        assert_eq!(*seen.lock(), Some((Some("cat".to_string()), true)));
        assert!(!payload.exists());
        assert!(!items.contains(&uuid));
    }

    #[test]
    fn add_preserves_order_and_dual_addressing() {
        let mut items = BrushItemCollection::with_owner("cat");
        let a = items.add(brush("a")).uuid().to_string();
        let b = items.add(brush("b")).uuid().to_string();
        let c = items.add(brush("c")).uuid().to_string();

        assert_eq!(items[0].uuid(), a);
        assert_eq!(items[b.as_str()].name, "b");
        assert_eq!(items.get(b.as_str()).unwrap().uuid(), b);
        assert_eq!(items.get(2).unwrap().uuid(), c);
        assert!(items.get(3).is_none());
        assert_eq!(items[1].owner(), Some("cat"));
    }

    #[test]
    fn add_with_taken_uuid_is_rejected() {
        let mut items = TextureItemCollection::new();
        let uuid = new_uuid();
        assert!(items
            .add_with_uuid(&uuid, NewItem::new("t", TextureData::default()))
            .is_some());
        assert!(items
            .add_with_uuid(&uuid, NewItem::new("t2", TextureData::default()))
            .is_none());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "t");
    }

    #[test]
    fn remove_by_index_releases_payloads() {
        let (_dir, paths) = paths();
        let mut items = BrushItemCollection::new();
        let uuid = items.add(brush("gone")).uuid().to_string();
        let keep = items.add(brush("kept")).uuid().to_string();

        let regular = paths.payload_file(ItemType::Brush, &uuid, false);
        let default = paths.payload_file(ItemType::Brush, &uuid, true);
        std::fs::write(&regular, b"x").unwrap();
        std::fs::write(&default, b"x").unwrap();

        let removed = items.remove(0, &paths).unwrap();
        assert_eq!(removed.uuid(), uuid);
        assert!(removed.owner().is_none());
        assert!(!regular.exists());
        assert!(!default.exists());
        assert_eq!(items.uuids().collect::<Vec<_>>(), vec![keep.as_str()]);
    }

    #[test]
    fn detach_keeps_payloads_and_clears_active() {
        let (_dir, paths) = paths();
        let mut items = BrushItemCollection::new();
        let uuid = items.add(brush("a")).uuid().to_string();
        let regular = paths.payload_file(ItemType::Brush, &uuid, false);
        std::fs::write(&regular, b"x").unwrap();
        assert!(items.set_active(uuid.as_str()));

        let item = items.detach(uuid.as_str()).unwrap();
        assert_eq!(item.uuid(), uuid);
        assert!(regular.exists());
        assert!(items.active().is_none());
    }

    #[test]
    fn move_rewrites_owner() {
        let mut from = BrushItemCollection::with_owner("from");
        let mut to = BrushItemCollection::with_owner("to");
        let uuid = from.add(brush("m")).uuid().to_string();

        assert!(from.move_to(&uuid, &mut to));
        assert!(!from.contains(&uuid));
        assert_eq!(to[uuid.as_str()].owner(), Some("to"));
        assert!(!from.move_to(&uuid, &mut to));
    }

    #[test]
    fn duplicate_copies_content_not_identity() {
        let (_dir, paths) = paths();
        let mut items = BrushItemCollection::new();
        let original = items.add(brush("orig").custom_icon(true));
        original.data.texture_uuid = Some("tex".to_string());
        original.favorite = true;
        original.selected = true;
        let uuid = original.uuid().to_string();

        let icon = paths.icon_file(IconKind::Brush, &uuid);
        std::fs::write(&icon, b"png-bytes").unwrap();

        let dup = items.duplicate(uuid.as_str(), &paths).unwrap().unwrap();
        assert_ne!(dup.uuid(), uuid);
        assert_eq!(dup.kind, "DRAW");
        assert_eq!(dup.data.texture_uuid.as_deref(), Some("tex"));
        assert!(dup.use_custom_icon);
        assert!(!dup.favorite);
        assert!(!dup.selected);
        let dup_uuid = dup.uuid().to_string();
        dup.name = "renamed".to_string();

        assert_eq!(
            std::fs::read(paths.icon_file(IconKind::Brush, &dup_uuid)).unwrap(),
            b"png-bytes"
        );
        assert_eq!(items[uuid.as_str()].name, "orig");
        assert!(items[uuid.as_str()].selected);
    }

    #[test]
    fn filtered_views() {
        let mut items = TextureItemCollection::new();
        items.add(NewItem::new("a", TextureData::default())).selected = true;
        items.add(NewItem::new("b", TextureData::default())).favorite = true;
        items.add(NewItem::new("c", TextureData::default()));

        assert_eq!(items.selected().count(), 1);
        assert_eq!(items.favorites().count(), 1);
        items.set_selection(true);
        assert_eq!(items.selected().count(), 3);
    }

    #[test]
    fn load_missing_payload_returns_none() {
        let (_dir, paths) = paths();
        let mut host = MemoryHost::new();
        let mut items = BrushItemCollection::new();
        let item = items.add(brush("nofile"));
        assert!(item.load(&mut host, &paths, false).unwrap().is_none());
    }

    #[test]
    fn save_load_reset_cycle() {
        let (_dir, paths) = paths();
        let mut host = MemoryHost::new();
        let mut items = BrushItemCollection::new();
        let item = items.add(brush("Clay"));
        let uuid = item.uuid().to_string();

        // Not loaded: save is a silent no-op.
        item.save(&mut host, &paths, true, false).unwrap();
        assert!(!item.payload_path(&paths, false).exists());

        host.insert(ItemType::Brush, &uuid, "Clay", b"factory".to_vec());
        item.save(&mut host, &paths, true, true).unwrap();
        item.save(&mut host, &paths, true, false).unwrap();

        host.edit(ItemType::Brush, &uuid, b"tweaked".to_vec());
        item.save(&mut host, &paths, true, false).unwrap();

        host.remove_datablock(ItemType::Brush, &uuid);
        item.load(&mut host, &paths, false).unwrap().unwrap();
        assert_eq!(host.get(ItemType::Brush, &uuid).unwrap().bytes, b"tweaked");
        assert_eq!(host.get(ItemType::Brush, &uuid).unwrap().name, "Clay");

        item.reset(&mut host, &paths).unwrap().unwrap();
        assert_eq!(host.get(ItemType::Brush, &uuid).unwrap().bytes, b"factory");

        host.remove_datablock(ItemType::Brush, &uuid);
        item.load(&mut host, &paths, false).unwrap().unwrap();
        assert_eq!(host.get(ItemType::Brush, &uuid).unwrap().bytes, b"factory");
    }

    #[test]
    fn install_activates_tool() {
        let (_dir, paths) = paths();
        let mut host = MemoryHost::new();
        let mut items = BrushItemCollection::new();
        let item = items.add(brush("b"));
        let uuid = item.uuid().to_string();

        assert!(!item.install(ContextMode::Sculpt, &mut host, &paths).unwrap());

        host.insert(ItemType::Brush, &uuid, "b", vec![1]);
        item.save(&mut host, &paths, false, false).unwrap();
        host.remove_datablock(ItemType::Brush, &uuid);

        assert!(item.install(ContextMode::Sculpt, &mut host, &paths).unwrap());
        assert_eq!(
            host.active_tool(ContextMode::Sculpt, ItemType::Brush),
            Some(uuid.as_str())
        );
    }
}
