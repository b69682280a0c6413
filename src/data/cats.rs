//! Categories and the ordered collection of them per item kind.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::ops::Index;
use std::path::{Path, PathBuf};

use super::common::{new_uuid, Key};
use super::events::{self, DataEvent};
use super::host::Host;
use super::icons::{self, CachedIcon};
use super::items::{BrushData, Item, ItemCollection, ItemKind, TextureData};
use crate::core::context::ContextMode;
use crate::core::errors::CoreError;
use crate::core::paths::Paths;

#[derive(Debug, Serialize, Deserialize)]
pub struct Category<K> {
    uuid: String,
    pub name: String,
    pub favorite: bool,
    /// Load every item of this category when a host document opens.
    pub load_on_boot: bool,
    pub use_custom_icon: bool,
    items: ItemCollection<K>,
    #[serde(skip)]
    owner: Option<ContextMode>,
}

pub type BrushCat = Category<BrushData>;
pub type TextureCat = Category<TextureData>;

impl<K: ItemKind> Category<K> {
    fn new(uuid: String, name: String, owner: Option<ContextMode>) -> Self {
        Self {
            items: ItemCollection::with_owner(&uuid),
            uuid,
            name,
            favorite: false,
            load_on_boot: false,
            use_custom_icon: false,
            owner,
        }
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Mode of the data set this category lives in.
    pub fn owner(&self) -> Option<ContextMode> {
        self.owner
    }

    pub fn items(&self) -> &ItemCollection<K> {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut ItemCollection<K> {
        &mut self.items
    }

    pub fn icon_path(&self, paths: &Paths) -> PathBuf {
        paths.icon_file(K::CATEGORY_ICON_KIND, &self.uuid)
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

    /// Write every loaded member to its payload file.
    pub fn save_items(
        &self,
        host: &mut dyn Host,
        paths: &Paths,
        compress: bool,
    ) -> Result<(), CoreError> {
        self.items.save_all(host, paths, compress)
    }

    /// Restore every member from its default payload. Returns how many were reset.
    pub fn reset_items(&self, host: &mut dyn Host, paths: &Paths) -> Result<usize, CoreError> {
        let mut reset = 0;
        for item in self.items.iter() {
            if item.reset(host, paths)?.is_some() {
                reset += 1;
            }
        }
        Ok(reset)
    }

    /// Pull every member into the host. Returns how many were loaded.
    pub fn load_items(&self, host: &mut dyn Host, paths: &Paths) -> Result<usize, CoreError> {
        let mut loaded = 0;
        for item in self.items.iter() {
            if item.ensure_loaded(host, paths)?.is_some() {
                loaded += 1;
            }
        }
        tracing::debug!("Loaded {}/{} items of '{}'", loaded, self.items.len(), self.name);
        Ok(loaded)
    }

    fn destroy(&mut self, paths: &Paths) {
        icons::clear_icon(&self.uuid, &self.icon_path(paths));
        self.items.clear(paths);
    }

    pub(crate) fn relink(&mut self, owner: Option<ContextMode>) {
        self.owner = owner;
        self.items.relink(&self.uuid);
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatCollection<K> {
    cats: IndexMap<String, Category<K>>,
    active: Option<String>,
    #[serde(skip)]
    owner: Option<ContextMode>,
}

pub type BrushCatCollection = CatCollection<BrushData>;
pub type TextureCatCollection = CatCollection<TextureData>;

impl<K> Default for CatCollection<K> {
    fn default() -> Self {
        Self {
            cats: IndexMap::new(),
            active: None,
            owner: None,
        }
    }
}

impl<K: ItemKind> CatCollection<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_owner(owner: ContextMode) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    pub fn owner(&self) -> Option<ContextMode> {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.cats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cats.is_empty()
    }

    pub fn contains(&self, uuid: &str) -> bool {
        self.cats.contains_key(uuid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category<K>> {
        self.cats.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Category<K>> {
        self.cats.values_mut()
    }

    pub fn uuids(&self) -> impl Iterator<Item = &str> {
        self.cats.keys().map(String::as_str)
    }

    pub fn index_of(&self, uuid: &str) -> Option<usize> {
        self.cats.get_index_of(uuid)
    }

    fn resolve<'a>(&'a self, key: Key<'a>) -> Option<&'a str> {
        match key {
            Key::Index(index) => self.cats.get_index(index).map(|(uuid, _)| uuid.as_str()),
            Key::Uuid(uuid) => self.cats.contains_key(uuid).then_some(uuid),
        }
    }

    pub fn get<'a>(&self, key: impl Into<Key<'a>>) -> Option<&Category<K>> {
        match key.into() {
            Key::Index(index) => self.cats.get_index(index).map(|(_, cat)| cat),
            Key::Uuid(uuid) => self.cats.get(uuid),
        }
    }

    pub fn get_mut<'a>(&mut self, key: impl Into<Key<'a>>) -> Option<&mut Category<K>> {
        match key.into() {
            Key::Index(index) => self.cats.get_index_mut(index).map(|(_, cat)| cat),
            Key::Uuid(uuid) => self.cats.get_mut(uuid),
        }
    }

    pub fn active(&self) -> Option<&Category<K>> {
        self.active.as_deref().and_then(|uuid| self.cats.get(uuid))
    }

    pub fn active_mut(&mut self) -> Option<&mut Category<K>> {
        let uuid = self.active.as_deref()?;
        self.cats.get_mut(uuid)
    }

    pub fn active_uuid(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn set_active<'a>(&mut self, key: impl Into<Key<'a>>) -> bool {
        match self.resolve(key.into()).map(str::to_string) {
            Some(uuid) => {
                self.active = Some(uuid);
                true
            }
            None => false,
        }
    }

    /// Create a category and make it active.
    ///
    /// A `custom_uuid` pins the identity; when a category with that uuid already
    /// exists it is reused (and activated) instead of duplicated.
    pub fn add(&mut self, name: &str, custom_uuid: Option<&str>) -> &mut Category<K> {
        let uuid = match custom_uuid {
            Some(uuid) if !uuid.is_empty() => uuid.to_string(),
            _ => new_uuid(),
        };

        if !self.cats.contains_key(&uuid) {
            let cat = Category::new(uuid.clone(), name.to_string(), self.owner);
            self.cats.insert(uuid.clone(), cat);
            events::emit(&DataEvent::CategoryAdded {
                item_type: K::ITEM_TYPE,
                category: uuid.clone(),
            });
            tracing::debug!("Added {} category '{}' ({})", K::ITEM_TYPE.name(), name, uuid);
        }

        let index = self.cats.get_index_of(&uuid).unwrap_or_default();
        self.active = Some(uuid);
        &mut self.cats[index]
    }

    /// Delete a category along with its items, icon and payload files.
    pub fn remove<'a>(&mut self, key: impl Into<Key<'a>>, paths: &Paths) -> bool {
        let Some(uuid) = self.resolve(key.into()).map(str::to_string) else {
            return false;
        };

        events::emit(&DataEvent::CategoryRemoved {
            item_type: K::ITEM_TYPE,
            category: uuid.clone(),
        });

        let Some((index, _, mut cat)) = self.cats.shift_remove_full(&uuid) else {
            return false;
        };
        cat.destroy(paths);

        if self.active.as_deref() == Some(uuid.as_str()) {
            self.active = self
                .cats
                .get_index(index.saturating_sub(1))
                .map(|(uuid, _)| uuid.clone());
        }
        tracing::debug!("Removed {} category {}", K::ITEM_TYPE.name(), uuid);
        true
    }

    /// Move an item between two categories of this collection.
    pub fn move_item(&mut self, item_uuid: &str, from: &str, to: &str) -> bool {
        if from == to || !self.cats.contains_key(to) {
            return false;
        }
        let Some(mut target) = self.cats.get_mut(to).map(|cat| std::mem::take(&mut cat.items))
        else {
            return false;
        };

        let moved = self
            .cats
            .get_mut(from)
            .map(|cat| cat.items.move_to(item_uuid, &mut target))
            .unwrap_or(false);

        if let Some(cat) = self.cats.get_mut(to) {
            cat.items = target;
        }
        moved
    }

    /// Locate an item anywhere in the collection.
    pub fn find_item(&self, item_uuid: &str) -> Option<(&Category<K>, &Item<K>)> {
        self.cats
            .values()
            .find_map(|cat| cat.items.get(item_uuid).map(|item| (cat, item)))
    }

    pub fn find_item_mut(&mut self, item_uuid: &str) -> Option<&mut Item<K>> {
        self.cats
            .values_mut()
            .find_map(|cat| cat.items.get_mut(item_uuid))
    }

    pub fn contains_item(&self, item_uuid: &str) -> bool {
        self.cats.values().any(|cat| cat.items.contains(item_uuid))
    }

    /// Every item across all categories, in category then item order.
    pub fn all_items(&self) -> impl Iterator<Item = &Item<K>> {
        self.cats.values().flat_map(|cat| cat.items.iter())
    }

    pub fn selected_items(&self) -> impl Iterator<Item = &Item<K>> {
        self.all_items().filter(|item| item.selected)
    }

    pub fn item_count(&self) -> usize {
        self.cats.values().map(|cat| cat.items.len()).sum()
    }

    pub(crate) fn relink(&mut self, owner: ContextMode) {
        self.owner = Some(owner);
        for cat in self.cats.values_mut() {
            cat.relink(Some(owner));
        }
    }

    pub fn save_items(
        &self,
        host: &mut dyn Host,
        paths: &Paths,
        compress: bool,
    ) -> Result<(), CoreError> {
        for cat in self.cats.values() {
            cat.save_items(host, paths, compress)?;
        }
        Ok(())
    }
}

impl<K: ItemKind> Index<usize> for CatCollection<K> {
    type Output = Category<K>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.cats[index]
    }
}

impl<K: ItemKind> Index<&str> for CatCollection<K> {
    type Output = Category<K>;

    fn index(&self, uuid: &str) -> &Self::Output {
        &self.cats[uuid]
    }
}
