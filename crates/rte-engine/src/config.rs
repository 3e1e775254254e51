use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// Engine-wide settings shared by the runtime and the renderer.
///
/// Every field has a default, so a config file only needs to list what it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub title: String,
    /// Initial window size in physical pixels.
    pub width: u32,
    pub height: u32,
    /// Post-process pixelation factor; the scene renders at `size / pixel_size`.
    pub pixel_size: u32,
    /// Directory holding `models/` and `textures/`.
    pub asset_root: PathBuf,
    pub clear_color: [f32; 4],
    /// `env_logger` filter; `None` falls back to `RUST_LOG`.
    pub log_filter: Option<String>,
    pub vsync: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "rte".to_string(),
            width: 800,
            height: 600,
            pixel_size: 1,
            asset_root: PathBuf::from("assets"),
            clear_color: [0.05, 0.05, 0.08, 1.0],
            log_filter: None,
            vsync: true,
        }
    }
}

impl EngineConfig {
    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => RenderError::AssetNotFound {
                path: path.to_path_buf(),
            },
            _ => RenderError::AssetRead {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| RenderError::Config(e.to_string()))?;
        Ok(config.sanitized())
    }

    /// Clamps values the renderer cannot work with.
    pub fn sanitized(mut self) -> Self {
        if self.pixel_size == 0 {
            log::warn!("pixel_size 0 is invalid; using 1");
            self.pixel_size = 1;
        }
        self.width = self.width.max(1);
        self.height = self.height.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = EngineConfig::from_json(r#"{ "pixel_size": 4, "vsync": false }"#).unwrap();
        assert_eq!(config.pixel_size, 4);
        assert!(!config.vsync);
        assert_eq!(config.width, 800);
    }

    #[test]
    fn zero_pixel_size_is_clamped() {
        let config = EngineConfig::from_json(r#"{ "pixel_size": 0 }"#).unwrap();
        assert_eq!(config.pixel_size, 1);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = EngineConfig::from_json("{ width: ").unwrap_err();
        assert!(matches!(err, RenderError::Config(_)));
    }
}
