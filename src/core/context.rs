//! Editing-context identifiers threaded explicitly through every operation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::CoreError;

/// Host editing mode. Each mode owns an independent data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContextMode {
    Sculpt,
    ImagePaint,
    PaintGpencil,
}

impl ContextMode {
    pub const ALL: [ContextMode; 3] = [Self::Sculpt, Self::ImagePaint, Self::PaintGpencil];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sculpt => "SCULPT",
            Self::ImagePaint => "IMAGE_PAINT",
            Self::PaintGpencil => "PAINT_GPENCIL",
        }
    }

    /// Argument handed to the export worker.
    pub fn worker_arg(&self) -> &'static str {
        match self {
            Self::Sculpt => "sculpt",
            Self::ImagePaint => "image_paint",
            Self::PaintGpencil => "paint_gpencil",
        }
    }
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContextMode {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sculpt" => Ok(Self::Sculpt),
            "image_paint" | "texture_paint" => Ok(Self::ImagePaint),
            "paint_gpencil" | "gpencil_paint" => Ok(Self::PaintGpencil),
            other => Err(CoreError::InvalidInput(format!(
                "Invalid context mode: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Brush,
    Texture,
}

impl ItemType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Brush => "BRUSH",
            Self::Texture => "TEXTURE",
        }
    }
}

/// What the presentation layer is currently editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiContext {
    pub mode: ContextMode,
    pub item_type: ItemType,
}

impl UiContext {
    pub fn new(mode: ContextMode, item_type: ItemType) -> Self {
        Self { mode, item_type }
    }

    pub fn brushes(mode: ContextMode) -> Self {
        Self::new(mode, ItemType::Brush)
    }

    pub fn textures(mode: ContextMode) -> Self {
        Self::new(mode, ItemType::Texture)
    }
}
