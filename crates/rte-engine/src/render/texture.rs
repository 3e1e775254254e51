use crate::assets::Assets;
use crate::error::{RenderError, Result};
use crate::gpu::{GpuApi, TextureId};

/// An RGBA8 GPU texture with an explicit release.
#[derive(Debug)]
pub struct Texture {
    name: String,
    id: Option<TextureId>,
    size: (u32, u32),
}

impl Texture {
    /// Decodes `textures/<name>` from `assets` and uploads it.
    pub fn load(gpu: &mut dyn GpuApi, assets: &Assets, name: &str) -> Result<Self> {
        let path = assets.texture_path(name)?;
        let image = image::open(&path)
            .map_err(|source| RenderError::TextureDecode {
                path: path.clone(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        log::debug!("texture `{name}`: decoded {width}x{height} from {}", path.display());
        Self::from_rgba(gpu, name, width, height, image.as_raw())
    }

    /// Uploads `width * height` RGBA8 pixels.
    pub fn from_rgba(
        gpu: &mut dyn GpuApi,
        name: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<Self> {
        let id = gpu.create_texture(width, height, Some(pixels))?;
        Ok(Self {
            name: name.to_string(),
            id: Some(id),
            size: (width, height),
        })
    }

    /// 1x1 opaque white, sampled by textured materials without an image.
    pub fn white(gpu: &mut dyn GpuApi) -> Result<Self> {
        Self::from_rgba(gpu, "white", 1, 1, &[255, 255, 255, 255])
    }

    /// Uninitialized texture to render into.
    pub fn render_target(gpu: &mut dyn GpuApi, width: u32, height: u32) -> Result<Self> {
        let id = gpu.create_texture(width, height, None)?;
        Ok(Self {
            name: "render target".to_string(),
            id: Some(id),
            size: (width, height),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` once released.
    pub fn id(&self) -> Option<TextureId> {
        self.id
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn release(&mut self, gpu: &mut dyn GpuApi) {
        if let Some(id) = self.id.take() {
            gpu.delete_texture(id);
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            log::warn!("texture `{}` dropped without release; leaking {}", self.name, id.raw());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::HeadlessApi;

    #[test]
    fn missing_file_is_asset_not_found() {
        let mut gpu = HeadlessApi::new(4, 4);
        let err = Texture::load(&mut gpu, &Assets::new("nowhere"), "brick.png").unwrap_err();
        assert!(matches!(err, RenderError::AssetNotFound { .. }));
        assert_eq!(gpu.live_textures(), 0);
    }

    #[test]
    fn decodes_png_from_assets() {
        let root = std::env::temp_dir().join(format!("rte-texture-{}", std::process::id()));
        std::fs::create_dir_all(root.join("textures")).unwrap();
        image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]))
            .save(root.join("textures").join("tile.png"))
            .unwrap();

        let mut gpu = HeadlessApi::new(4, 4);
        let mut tex = Texture::load(&mut gpu, &Assets::new(&root), "tile.png").unwrap();
        assert_eq!(tex.size(), (2, 3));
        assert_eq!(gpu.texture_size(tex.id().unwrap()), Some((2, 3)));

        tex.release(&mut gpu);
        assert_eq!(gpu.live_textures(), 0);
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn corrupt_image_is_a_decode_error() {
        let root = std::env::temp_dir().join(format!("rte-texture-bad-{}", std::process::id()));
        std::fs::create_dir_all(root.join("textures")).unwrap();
        std::fs::write(root.join("textures").join("bad.png"), b"not a png").unwrap();

        let mut gpu = HeadlessApi::new(4, 4);
        let err = Texture::load(&mut gpu, &Assets::new(&root), "bad.png").unwrap_err();
        assert!(matches!(err, RenderError::TextureDecode { .. }));
        std::fs::remove_dir_all(&root).unwrap();
    }
}
