use std::path::{Path, PathBuf};

use crate::error::{RenderError, Result};

/// Resolves asset names below a root directory.
///
/// Layout:
/// - `<root>/models/<name>` for mesh files
/// - `<root>/textures/<name>` for images
#[derive(Debug, Clone)]
pub struct Assets {
    root: PathBuf,
}

impl Assets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn model_path(&self, name: &str) -> Result<PathBuf> {
        self.existing(self.root.join("models").join(name))
    }

    pub fn texture_path(&self, name: &str) -> Result<PathBuf> {
        self.existing(self.root.join("textures").join(name))
    }

    /// Reads a mesh file as text.
    pub fn read_model(&self, name: &str) -> Result<String> {
        let path = self.model_path(name)?;
        log::debug!("reading model {}", path.display());
        std::fs::read_to_string(&path).map_err(|source| RenderError::AssetRead { path, source })
    }

    fn existing(&self, path: PathBuf) -> Result<PathBuf> {
        if path.is_file() {
            Ok(path)
        } else {
            Err(RenderError::AssetNotFound { path })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_reports_full_path() {
        let assets = Assets::new("definitely/not/here");
        match assets.read_model("cube.obj") {
            Err(RenderError::AssetNotFound { path }) => {
                assert!(path.ends_with("models/cube.obj"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn reads_existing_model() {
        let root = std::env::temp_dir().join(format!("rte-assets-{}", std::process::id()));
        std::fs::create_dir_all(root.join("models")).unwrap();
        std::fs::write(root.join("models").join("tri.obj"), "v 0 0 0\n").unwrap();

        let assets = Assets::new(&root);
        assert_eq!(assets.read_model("tri.obj").unwrap(), "v 0 0 0\n");

        std::fs::remove_dir_all(&root).unwrap();
    }
}
