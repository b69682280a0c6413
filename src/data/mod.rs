//! Category/item data model, persistence and the per-mode registry.

pub mod actions;
pub mod addon_data;
pub mod cats;
pub mod common;
pub mod events;
pub mod host;
pub mod icons;
pub mod items;

pub use addon_data::{
    init_registry, with_registry_read, with_registry_write, AddonData, AddonDataByMode,
    Initializer, SNAPSHOT_VERSION,
};
pub use cats::{BrushCat, BrushCatCollection, CatCollection, Category, TextureCat, TextureCatCollection};
pub use common::{new_uuid, Key};
pub use events::{subscribe, unsubscribe, DataEvent, SubscriptionId};
pub use host::{DatablockRef, Host, MemoryHost};
pub use items::{
    BrushData, BrushItem, BrushItemCollection, Item, ItemCollection, ItemKind, NewItem, TextureData,
    TextureItem, TextureItemCollection,
};
