//! User actions on the active category of a context.
//!
//! Every action takes the [`UiContext`] it acts on; nothing reads ambient UI
//! state. Texture removals heal brush links before returning.

use std::path::Path;

use super::addon_data::AddonData;
use super::cats::CatCollection;
use super::host::Host;
use super::items::ItemKind;
use crate::core::context::{ItemType, UiContext};
use crate::core::errors::CoreError;
use crate::core::paths::Paths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAction {
    Toggle,
    SelectAll,
    DeselectAll,
}

/// Run `$body` with `$cats` bound to the brush or texture categories of the context.
macro_rules! with_cats {
    ($data:expr, $ui:expr, |$cats:ident| $body:expr) => {
        match $ui.item_type {
            ItemType::Brush => {
                let $cats = &mut $data.brush_cats;
                $body
            }
            ItemType::Texture => {
                let $cats = &mut $data.texture_cats;
                $body
            }
        }
    };
}

pub fn new_category(registry: &mut AddonData, ui: UiContext, name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::InvalidInput("Category name is empty".into()));
    }
    let data = registry.get_data_by_context(ui);
    Ok(with_cats!(data, ui, |cats| cats.add(name, None).uuid().to_string()))
}

pub fn remove_active_category(registry: &mut AddonData, ui: UiContext) -> bool {
    let (data, paths) = registry.context_mut(ui);
    match ui.item_type {
        ItemType::Brush => match data.brush_cats.active_uuid().map(str::to_string) {
            Some(uuid) => data.brush_cats.remove(uuid.as_str(), paths),
            None => false,
        },
        ItemType::Texture => match data.texture_cats.active_uuid().map(str::to_string) {
            Some(uuid) => data.remove_texture_cat(&uuid, paths),
            None => false,
        },
    }
}

pub fn select_category(registry: &mut AddonData, ui: UiContext, cat_uuid: &str) -> bool {
    let data = registry.get_data_by_context(ui);
    with_cats!(data, ui, |cats| cats.set_active(cat_uuid))
}

/// Toggle the selection of one item of the active category.
pub fn select_item(registry: &mut AddonData, ui: UiContext, item_uuid: &str) -> bool {
    let data = registry.get_data_by_context(ui);
    with_cats!(data, ui, |cats| toggle_selected(cats, item_uuid))
}

fn toggle_selected<K: ItemKind>(cats: &mut CatCollection<K>, item_uuid: &str) -> bool {
    match cats.active_mut().and_then(|cat| cat.items_mut().get_mut(item_uuid)) {
        Some(item) => {
            item.selected = !item.selected;
            true
        }
        None => false,
    }
}

/// Returns false when there is no active category.
pub fn select_all(registry: &mut AddonData, ui: UiContext, action: SelectAction) -> bool {
    let data = registry.get_data_by_context(ui);
    with_cats!(data, ui, |cats| apply_selection(cats, action))
}

fn apply_selection<K: ItemKind>(cats: &mut CatCollection<K>, action: SelectAction) -> bool {
    let Some(cat) = cats.active_mut() else {
        return false;
    };
    match action {
        SelectAction::Toggle => {
            for item in cat.items_mut().iter_mut() {
                item.selected = !item.selected;
            }
        }
        SelectAction::SelectAll => cat.items_mut().set_selection(true),
        SelectAction::DeselectAll => cat.items_mut().set_selection(false),
    }
    true
}

/// Move the selected items of the active category into `target`, which then
/// becomes active with nothing selected. Returns how many items moved.
pub fn move_selected_to_category(registry: &mut AddonData, ui: UiContext, target: &str) -> usize {
    let data = registry.get_data_by_context(ui);
    let Some((source, selected)) = with_cats!(data, ui, |cats| selected_in_active(cats, target))
    else {
        return 0;
    };

    let moved = selected
        .iter()
        .filter(|uuid| data.move_item(ui.item_type, uuid, &source, target))
        .count();

    with_cats!(data, ui, |cats| {
        cats.set_active(target);
        if let Some(cat) = cats.active_mut() {
            cat.items_mut().set_selection(false);
        }
    });
    moved
}

/// The active category and its selected items, unless it is `target` itself
/// or `target` does not exist.
fn selected_in_active<K: ItemKind>(
    cats: &CatCollection<K>,
    target: &str,
) -> Option<(String, Vec<String>)> {
    let source = cats.active_uuid()?;
    if source == target || !cats.contains(target) {
        return None;
    }
    let selected = cats[source]
        .items()
        .selected()
        .map(|item| item.uuid().to_string())
        .collect();
    Some((source.to_string(), selected))
}

/// Remove (and destroy) the selected items of the active category.
pub fn remove_selected_from_active_category(registry: &mut AddonData, ui: UiContext) -> usize {
    let (data, paths) = registry.context_mut(ui);
    let removed = with_cats!(data, ui, |cats| remove_selected(cats, paths));
    if ui.item_type == ItemType::Texture && removed > 0 {
        data.heal_texture_links();
    }
    removed
}

fn remove_selected<K: ItemKind>(cats: &mut CatCollection<K>, paths: &Paths) -> usize {
    let Some(cat) = cats.active_mut() else {
        return 0;
    };
    let selected: Vec<String> = cat
        .items()
        .selected()
        .map(|item| item.uuid().to_string())
        .collect();
    selected
        .iter()
        .filter(|uuid| cat.items_mut().remove(uuid.as_str(), paths).is_some())
        .count()
}

/// Duplicate the selected items of the active category. Returns the new uuids.
pub fn duplicate_selected(registry: &mut AddonData, ui: UiContext) -> Result<Vec<String>, CoreError> {
    let (data, paths) = registry.context_mut(ui);
    with_cats!(data, ui, |cats| duplicate_in_active(cats, paths))
}

fn duplicate_in_active<K: ItemKind>(
    cats: &mut CatCollection<K>,
    paths: &Paths,
) -> Result<Vec<String>, CoreError> {
    let Some(cat) = cats.active_mut() else {
        return Ok(Vec::new());
    };
    let selected: Vec<String> = cat
        .items()
        .selected()
        .map(|item| item.uuid().to_string())
        .collect();

    let mut created = Vec::with_capacity(selected.len());
    for uuid in &selected {
        if let Some(item) = cat.items_mut().duplicate(uuid.as_str(), paths)? {
            created.push(item.uuid().to_string());
        }
    }
    Ok(created)
}

pub fn assign_icon_to_active_category(
    registry: &mut AddonData,
    ui: UiContext,
    source: &Path,
) -> Result<bool, CoreError> {
    let (data, paths) = registry.context_mut(ui);
    with_cats!(data, ui, |cats| match cats.active_mut() {
        Some(cat) => cat.assign_icon(paths, source).map(|_| true),
        None => Ok(false),
    })
}

/// Give an item a custom icon. `None` targets the context's active item.
pub fn assign_icon_to_item(
    registry: &mut AddonData,
    ui: UiContext,
    item_uuid: Option<&str>,
    source: &Path,
) -> Result<bool, CoreError> {
    let (data, paths) = registry.context_mut(ui);
    let active = match ui.item_type {
        ItemType::Brush => data.active_brush_ids(),
        ItemType::Texture => data.active_texture_ids(),
    }
    .map(|(_, item)| item.to_string());

    let Some(item_uuid) = item_uuid.map(str::to_string).or(active) else {
        return Ok(false);
    };
    with_cats!(data, ui, |cats| match cats.find_item_mut(&item_uuid) {
        Some(item) => item.assign_icon(paths, source).map(|_| true),
        None => Ok(false),
    })
}

pub fn toggle_favorite(registry: &mut AddonData, ui: UiContext, item_uuid: &str) -> bool {
    let data = registry.get_data_by_context(ui);
    with_cats!(data, ui, |cats| match cats.find_item_mut(item_uuid) {
        Some(item) => {
            item.favorite = !item.favorite;
            true
        }
        None => false,
    })
}

/// Rename an item, retagging its live datablock when loaded.
pub fn rename_item(
    registry: &mut AddonData,
    ui: UiContext,
    host: &mut dyn Host,
    item_uuid: &str,
    name: &str,
) -> bool {
    let data = registry.get_data_by_context(ui);
    let renamed = with_cats!(data, ui, |cats| match cats.find_item_mut(item_uuid) {
        Some(item) => {
            item.name = name.to_string();
            true
        }
        None => false,
    });
    if renamed && host.has_datablock(ui.item_type, item_uuid) {
        host.rename_datablock(ui.item_type, item_uuid, name);
    }
    renamed
}
