//! On-disk layout.
//!
//! ```text
//! <data_dir>/
//!   data/<MODE>.bin                  per-mode snapshot
//!   payloads/brushes/<uuid>.<ext>    (+ <uuid>.default.<ext>)
//!   payloads/textures/<uuid>.<ext>
//!   icons/{brushes,textures,cat_brushes,cat_textures}/<uuid>.png
//!   scripts/export.json              worker manifest
//! ```

use std::path::{Path, PathBuf};

use super::config::ManagerConfig;
use super::context::{ContextMode, ItemType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKind {
    Brush,
    Texture,
    BrushCategory,
    TextureCategory,
}

impl IconKind {
    pub const ALL: [IconKind; 4] = [
        Self::Brush,
        Self::Texture,
        Self::BrushCategory,
        Self::TextureCategory,
    ];

    fn dir_name(&self) -> &'static str {
        match self {
            Self::Brush => "brushes",
            Self::Texture => "textures",
            Self::BrushCategory => "cat_brushes",
            Self::TextureCategory => "cat_textures",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    root: PathBuf,
    payload_extension: String,
}

impl Paths {
    pub fn new(root: impl Into<PathBuf>, payload_extension: &str) -> Self {
        Self {
            root: root.into(),
            payload_extension: payload_extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn from_config(config: &ManagerConfig) -> Self {
        Self::new(config.data_dir.clone(), &config.payload_extension)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn snapshot_file(&self, mode: ContextMode) -> PathBuf {
        self.data_dir().join(format!("{}.bin", mode.name()))
    }

    pub fn payload_dir(&self, item_type: ItemType) -> PathBuf {
        let dir = match item_type {
            ItemType::Brush => "brushes",
            ItemType::Texture => "textures",
        };
        self.root.join("payloads").join(dir)
    }

    pub fn payload_file(&self, item_type: ItemType, uuid: &str, default: bool) -> PathBuf {
        let filename = if default {
            format!("{}.default.{}", uuid, self.payload_extension)
        } else {
            format!("{}.{}", uuid, self.payload_extension)
        };
        self.payload_dir(item_type).join(filename)
    }

    pub fn icons_dir(&self) -> PathBuf {
        self.root.join("icons")
    }

    pub fn icon_dir(&self, kind: IconKind) -> PathBuf {
        self.icons_dir().join(kind.dir_name())
    }

    pub fn icon_file(&self, kind: IconKind, uuid: &str) -> PathBuf {
        self.icon_dir(kind).join(format!("{}.png", uuid))
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join("scripts")
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.scripts_dir().join("export.json")
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.data_dir())?;
        std::fs::create_dir_all(self.payload_dir(ItemType::Brush))?;
        std::fs::create_dir_all(self.payload_dir(ItemType::Texture))?;
        for kind in IconKind::ALL {
            std::fs::create_dir_all(self.icon_dir(kind))?;
        }
        std::fs::create_dir_all(self.scripts_dir())?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn payload_names_follow_uuid() {
        let paths = Paths::new("/lib", ".blend");
        assert_eq!(
            paths.payload_file(ItemType::Brush, "abc", false),
            PathBuf::from("/lib/payloads/brushes/abc.blend")
        );
        assert_eq!(
            paths.payload_file(ItemType::Brush, "abc", true),
            PathBuf::from("/lib/payloads/brushes/abc.default.blend")
        );
        assert_eq!(
            paths.icon_file(IconKind::TextureCategory, "abc"),
            PathBuf::from("/lib/icons/cat_textures/abc.png")
        );
        assert_eq!(
            paths.snapshot_file(ContextMode::ImagePaint),
            PathBuf::from("/lib/data/IMAGE_PAINT.bin")
        );
    }

    #[test]
    fn ensure_dirs_creates_tree() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::new(dir.path(), "blend");
        paths.ensure_dirs().unwrap();
        assert!(paths.icon_dir(IconKind::BrushCategory).is_dir());
        assert!(paths.payload_dir(ItemType::Texture).is_dir());
        assert!(paths.scripts_dir().is_dir());
    }
}
