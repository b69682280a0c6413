//! Boundary to the host application's document.
//!
//! The live brush/texture settings stay in the host; this crate only asks it
//! to pull a payload file into the document, write a live datablock back to a
//! file, and make a datablock the current tool. Datablocks are keyed by the
//! item uuid.

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use std::collections::HashMap;
use std::path::Path;

use crate::core::context::{ContextMode, ItemType};
use crate::core::errors::CoreError;

/// Handle to a live datablock in the host document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatablockRef {
    pub item_type: ItemType,
    pub uuid: String,
}

pub trait Host {
    fn has_datablock(&self, item_type: ItemType, uuid: &str) -> bool;

    /// Whether the live datablock changed since it was last loaded or written.
    fn is_dirty(&self, item_type: ItemType, uuid: &str) -> bool;

    fn remove_datablock(&mut self, item_type: ItemType, uuid: &str) -> bool;

    /// Pull the payload stored at `path` into the document under `uuid`.
    fn load_datablock(&mut self, item_type: ItemType, uuid: &str, path: &Path)
        -> Result<(), CoreError>;

    /// Tag the live datablock with a display name.
    fn rename_datablock(&mut self, item_type: ItemType, uuid: &str, name: &str);

    fn write_datablock(
        &mut self,
        item_type: ItemType,
        uuid: &str,
        path: &Path,
        compress: bool,
    ) -> Result<(), CoreError>;

    fn set_active_tool(
        &mut self,
        mode: ContextMode,
        item_type: ItemType,
        uuid: &str,
    ) -> Result<(), CoreError>;
}

const MAGIC_RAW: &[u8; 4] = b"BMR1";
const MAGIC_LZ4: &[u8; 4] = b"BMZ1";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Datablock {
    pub name: String,
    pub bytes: Vec<u8>,
    pub dirty: bool,
}

/// In-process host document. Payload files carry a 4-byte tag followed by the
/// raw or LZ4-compressed datablock bytes.
#[derive(Debug, Default)]
pub struct MemoryHost {
    brushes: HashMap<String, Datablock>,
    textures: HashMap<String, Datablock>,
    active_tools: HashMap<(ContextMode, ItemType), String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn blocks(&self, item_type: ItemType) -> &HashMap<String, Datablock> {
        match item_type {
            ItemType::Brush => &self.brushes,
            ItemType::Texture => &self.textures,
        }
    }

    fn blocks_mut(&mut self, item_type: ItemType) -> &mut HashMap<String, Datablock> {
        match item_type {
            ItemType::Brush => &mut self.brushes,
            ItemType::Texture => &mut self.textures,
        }
    }

    /// Create or overwrite a live datablock, marking it dirty.
    pub fn insert(&mut self, item_type: ItemType, uuid: &str, name: &str, bytes: Vec<u8>) {
        self.blocks_mut(item_type).insert(
            uuid.to_string(),
            Datablock {
                name: name.to_string(),
                bytes,
                dirty: true,
            },
        );
    }

    pub fn get(&self, item_type: ItemType, uuid: &str) -> Option<&Datablock> {
        self.blocks(item_type).get(uuid)
    }

    /// Replace the settings of a live datablock. Returns false when it isn't loaded.
    pub fn edit(&mut self, item_type: ItemType, uuid: &str, bytes: Vec<u8>) -> bool {
        match self.blocks_mut(item_type).get_mut(uuid) {
            Some(block) => {
                block.bytes = bytes;
                block.dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn datablock_count(&self, item_type: ItemType) -> usize {
        self.blocks(item_type).len()
    }

    pub fn active_tool(&self, mode: ContextMode, item_type: ItemType) -> Option<&str> {
        self.active_tools
            .get(&(mode, item_type))
            .map(String::as_str)
    }
}

impl Host for MemoryHost {
    fn has_datablock(&self, item_type: ItemType, uuid: &str) -> bool {
        self.blocks(item_type).contains_key(uuid)
    }

    fn is_dirty(&self, item_type: ItemType, uuid: &str) -> bool {
        self.get(item_type, uuid)
            .map(|block| block.dirty)
            .unwrap_or(false)
    }

    fn remove_datablock(&mut self, item_type: ItemType, uuid: &str) -> bool {
        self.blocks_mut(item_type).remove(uuid).is_some()
    }

    fn load_datablock(
        &mut self,
        item_type: ItemType,
        uuid: &str,
        path: &Path,
    ) -> Result<(), CoreError> {
        let raw = std::fs::read(path)?;
        if raw.len() < 4 {
            return Err(CoreError::Host(format!("Truncated payload: {:?}", path)));
        }

        let (tag, body) = raw.split_at(4);
        let bytes = if tag == MAGIC_LZ4 {
            decompress_size_prepended(body)
                .map_err(|err| CoreError::Host(format!("Corrupt payload {:?}: {}", path, err)))?
        } else if tag == MAGIC_RAW {
            body.to_vec()
        } else {
            return Err(CoreError::Host(format!("Unknown payload format: {:?}", path)));
        };

        self.blocks_mut(item_type).insert(
            uuid.to_string(),
            Datablock {
                name: uuid.to_string(),
                bytes,
                dirty: false,
            },
        );
        Ok(())
    }

    fn rename_datablock(&mut self, item_type: ItemType, uuid: &str, name: &str) {
        if let Some(block) = self.blocks_mut(item_type).get_mut(uuid) {
            block.name = name.to_string();
        }
    }

    fn write_datablock(
        &mut self,
        item_type: ItemType,
        uuid: &str,
        path: &Path,
        compress: bool,
    ) -> Result<(), CoreError> {
        let block = self
            .blocks_mut(item_type)
            .get_mut(uuid)
            .ok_or_else(|| CoreError::Host(format!("No datablock for {}", uuid)))?;

        let mut out = Vec::with_capacity(block.bytes.len() + 8);
        if compress {
            out.extend_from_slice(MAGIC_LZ4);
            out.extend_from_slice(&compress_prepend_size(&block.bytes));
        } else {
            out.extend_from_slice(MAGIC_RAW);
            out.extend_from_slice(&block.bytes);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, out)?;
        block.dirty = false;
        Ok(())
    }

    fn set_active_tool(
        &mut self,
        mode: ContextMode,
        item_type: ItemType,
        uuid: &str,
    ) -> Result<(), CoreError> {
        if !self.has_datablock(item_type, uuid) {
            return Err(CoreError::Host(format!(
                "Cannot activate unloaded {} {}",
                item_type.name(),
                uuid
            )));
        }
        self.active_tools.insert((mode, item_type), uuid.to_string());
        Ok(())
    }
}
