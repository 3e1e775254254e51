//! Scene viewer: loads a JSON scene description and renders it in a window.
//!
//! Usage: `rte-viewer [scene.json]` (default `assets/scene.json`). A relative
//! `asset_root` in the scene's `engine` section resolves against the directory
//! of the scene file. Escape closes the window.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::Vec3;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use rte_engine::assets::Assets;
use rte_engine::coords::Viewport;
use rte_engine::core::{App, AppControl, FrameCtx};
use rte_engine::gpu::GpuApi;
use rte_engine::logging::{LoggingConfig, init_logging};
use rte_engine::render::Renderer;
use rte_engine::scene::{Scene, SceneDescription};
use rte_engine::window::Runtime;

const DEFAULT_SCENE: &str = "assets/scene.json";

/// Turntable speed in radians per second.
const SPIN_RATE: f32 = 0.4;

struct Viewer {
    description: SceneDescription,
    assets: Assets,
    renderer: Option<Renderer>,
    scene: Option<Scene>,
}

impl Viewer {
    fn new(description: SceneDescription, assets: Assets) -> Self {
        Self {
            description,
            assets,
            renderer: None,
            scene: None,
        }
    }
}

impl App for Viewer {
    fn on_start(&mut self, gpu: &mut dyn GpuApi, viewport: Viewport) -> rte_engine::Result<()> {
        let mut renderer = Renderer::new(gpu, viewport, self.description.engine.clear_color)?;
        match self.description.instantiate(gpu, &self.assets, renderer.shaders()) {
            Ok(scene) => {
                self.scene = Some(scene);
                self.renderer = Some(renderer);
                Ok(())
            }
            Err(e) => {
                renderer.release(gpu);
                Err(e)
            }
        }
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                AppControl::Exit
            }
            _ => AppControl::Continue,
        }
    }

    fn on_resize(&mut self, gpu: &mut dyn GpuApi, viewport: Viewport) -> rte_engine::Result<()> {
        match self.renderer.as_mut() {
            Some(renderer) => renderer.resize(gpu, viewport.width, viewport.height),
            None => Ok(()),
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> rte_engine::Result<AppControl> {
        let (Some(renderer), Some(scene)) = (self.renderer.as_mut(), self.scene.as_mut()) else {
            return Ok(AppControl::Continue);
        };

        let spin = Vec3::new(0.0, SPIN_RATE * ctx.time.dt, 0.0);
        for actor in scene.actors_mut() {
            actor.transform.rotate(spin);
        }

        renderer.render(ctx.gpu, scene)?;
        Ok(AppControl::Continue)
    }

    fn on_exit(&mut self, gpu: &mut dyn GpuApi) {
        if let Some(mut scene) = self.scene.take() {
            scene.release(gpu);
        }
        if let Some(mut renderer) = self.renderer.take() {
            renderer.release(gpu);
        }
    }
}

fn asset_root(scene_path: &Path, configured: &Path) -> PathBuf {
    match scene_path.parent() {
        Some(dir) if configured.is_relative() => dir.join(configured),
        _ => configured.to_path_buf(),
    }
}

fn main() -> Result<()> {
    let scene_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SCENE));

    let description = SceneDescription::load(&scene_path)
        .with_context(|| format!("failed to load scene {}", scene_path.display()))?;

    init_logging(LoggingConfig::from_config(&description.engine));

    let assets = Assets::new(asset_root(&scene_path, &description.engine.asset_root));
    log::info!(
        "viewing scene `{}` with assets from {}",
        description.name,
        assets.root().display()
    );

    let config = description.engine.clone();
    Runtime::run(config, Viewer::new(description, assets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_asset_root_follows_scene_file() {
        let root = asset_root(Path::new("demo/scene.json"), Path::new("."));
        assert_eq!(root, Path::new("demo").join("."));

        let absolute = std::env::temp_dir();
        assert_eq!(asset_root(Path::new("demo/scene.json"), &absolute), absolute);
    }
}
