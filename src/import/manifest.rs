//! JSON manifest written by the export worker.
//!
//! ```json
//! {
//!   "brushes":  [{"uuid": "..", "name": "Clay", "type": "CLAY",
//!                 "use_custom_icon": false, "texture_uuid": ".."}],
//!   "textures": [{"uuid": "..", "name": "Noise", "type": "IMAGE"}]
//! }
//! ```

use serde::Deserialize;
use std::collections::HashSet;

use super::ImportError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ManifestBrush {
    pub uuid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub use_custom_icon: bool,
    /// Empty string in the file means no linked texture.
    pub texture_uuid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ManifestTexture {
    pub uuid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub format: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub brushes: Vec<ManifestBrush>,
    pub textures: Vec<ManifestTexture>,
}

impl Manifest {
    /// Parse and validate manifest text.
    pub fn parse(text: &str) -> Result<Self, ImportError> {
        let mut manifest: Manifest = serde_json::from_str(text)
            .map_err(|err| ImportError::InvalidManifest(err.to_string()))?;

        let mut seen = HashSet::new();
        let uuids = manifest
            .textures
            .iter()
            .map(|t| t.uuid.as_str())
            .chain(manifest.brushes.iter().map(|b| b.uuid.as_str()));
        for uuid in uuids {
            if uuid.is_empty() {
                return Err(ImportError::InvalidManifest("Entry without uuid".into()));
            }
            if !seen.insert(uuid) {
                return Err(ImportError::InvalidManifest(format!(
                    "Duplicate uuid {}",
                    uuid
                )));
            }
        }

        for brush in &mut manifest.brushes {
            if brush.texture_uuid.as_deref().is_some_and(str::is_empty) {
                brush.texture_uuid = None;
            }
        }
        Ok(manifest)
    }

    pub fn is_empty(&self) -> bool {
        self.brushes.is_empty() && self.textures.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_worker_output() {
        let manifest = Manifest::parse(
            r#"{
                "brushes": [
                    {"uuid": "b1", "name": "Clay", "type": "CLAY", "use_custom_icon": true, "texture_uuid": "t1"},
                    {"uuid": "b2", "name": "Draw", "type": "DRAW", "use_custom_icon": false, "texture_uuid": ""}
                ],
                "textures": [{"uuid": "t1", "name": "Noise", "type": "IMAGE"}]
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.brushes.len(), 2);
        assert_eq!(manifest.brushes[0].texture_uuid.as_deref(), Some("t1"));
        assert!(manifest.brushes[0].use_custom_icon);
        assert!(manifest.brushes[1].texture_uuid.is_none());
        assert_eq!(manifest.textures[0].kind, "IMAGE");
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let manifest = Manifest::parse(r#"{"brushes": []}"#).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn rejects_bad_entries() {
        assert!(matches!(
            Manifest::parse("not json"),
            Err(ImportError::InvalidManifest(_))
        ));
        assert!(Manifest::parse(r#"{"textures": [{"name": "x"}]}"#).is_err());
        assert!(Manifest::parse(
            r#"{"textures": [{"uuid": "a"}], "brushes": [{"uuid": "a"}]}"#
        )
        .is_err());
    }
}
