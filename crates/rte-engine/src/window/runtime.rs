use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::EngineConfig;
use crate::coords::Viewport;
use crate::core::{App, AppControl, FrameCtx};
use crate::device::{GpuContext, GpuInit};
use crate::gpu::{GpuApi, WgpuApi};
use crate::time::FrameClock;

/// Entry point for the runtime: one window, one device, one app.
pub struct Runtime;

impl Runtime {
    /// Opens the window described by `config` and drives `app` until the
    /// window closes or the app asks to exit.
    ///
    /// Returns the first error raised by the app or by GPU bring-up.
    pub fn run<A>(config: EngineConfig, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config.sanitized(), app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: WgpuApi<'this>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: EngineConfig,
    app: A,

    entry: Option<WindowEntry>,
    viewport: Viewport,
    failure: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: EngineConfig, app: A) -> Self {
        let viewport = Viewport::new(config.width, config.height, config.pixel_size);
        Self {
            config,
            app,
            entry: None,
            viewport,
            failure: None,
            exit_requested: false,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let size = window.inner_size();
        let init = GpuInit::from_config(&self.config);

        let entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(GpuContext::new(w, init)).map(WgpuApi::new),
        }
        .try_build()
        .context("GPU initialization failed for window")?;

        self.viewport = Viewport::new(size.width, size.height, self.config.pixel_size);
        self.entry = Some(entry);

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, entry, viewport) = (&mut self.app, &mut self.entry, self.viewport);
        if let Some(entry) = entry {
            entry
                .with_gpu_mut(|gpu| app.on_start(gpu, viewport))
                .context("application failed to start")?;
            entry.with_window(|w| w.request_redraw());
        }
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        let Some(entry) = self.entry.as_mut() else {
            return Ok(());
        };
        entry.with_gpu_mut(|gpu| gpu.resize(size.width, size.height));

        let viewport = self.viewport.resized(size.width, size.height);
        if viewport.is_empty() {
            // Minimized: keep the last usable viewport.
            return Ok(());
        }
        self.viewport = viewport;

        let app = &mut self.app;
        entry.with_gpu_mut(|gpu| app.on_resize(gpu, viewport))?;
        entry.with_mut(|fields| fields.clock.reset());
        entry.with_window(|w| w.request_redraw());
        Ok(())
    }

    fn redraw(&mut self) -> Result<AppControl> {
        let (app, viewport) = (&mut self.app, self.viewport);
        let Some(entry) = self.entry.as_mut() else {
            return Ok(AppControl::Continue);
        };

        let control = entry.with_mut(|fields| -> crate::Result<AppControl> {
            if !fields.gpu.begin_frame()? {
                return Ok(AppControl::Continue);
            }

            let time = fields.clock.tick();
            let control = {
                let mut ctx = FrameCtx {
                    gpu: &mut *fields.gpu,
                    time,
                    viewport,
                };
                app.on_frame(&mut ctx)
            };

            // Submit even on failure so the surface texture is presented.
            fields.gpu.end_frame();
            control
        })?;
        Ok(control)
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        if self.failure.is_none() {
            self.failure = Some(error);
        }
        self.shutdown(event_loop);
    }

    /// Gives the app a chance to release GPU resources, then drops the device
    /// before the window.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        if let Some(mut entry) = self.entry.take() {
            let app = &mut self.app;
            entry.with_gpu_mut(|gpu| app.on_exit(gpu));
            if let Err(e) = entry.with_gpu_mut(|gpu| crate::gpu::check_gpu(gpu, "shutdown")) {
                log::warn!("{e}");
            }
            drop(entry);
            log::info!("window closed");
        }
        event_loop.exit();
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: the scene may animate every frame.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.shutdown(event_loop);
            return;
        }

        // Runtime-managed window lifecycle / resize / redraw handling.
        match &event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(new_size) => {
                if let Err(e) = self.resize(*new_size) {
                    self.fail(event_loop, e.context("resize failed"));
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = self.entry.as_ref().map(|e| e.with_window(|w| w.inner_size()));
                if let Some(new_size) = new_size {
                    if let Err(e) = self.resize(new_size) {
                        self.fail(event_loop, e.context("resize failed"));
                    }
                }
            }

            WindowEvent::RedrawRequested => match self.redraw() {
                Ok(AppControl::Continue) => {}
                Ok(AppControl::Exit) => self.shutdown(event_loop),
                Err(e) => self.fail(event_loop, e.context("frame failed")),
            },

            _ => {}
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            self.shutdown(event_loop);
        }
    }
}
