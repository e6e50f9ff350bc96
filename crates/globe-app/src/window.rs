//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]. The GPU and the
//! renderer are created on the first `resumed`; after that every
//! `RedrawRequested` runs one render loop cycle, which requests the next.

use std::sync::Arc;

use globe_config::Config;
use globe_input::{KeyboardState, MouseState};
use globe_render::{AssetPaths, WgpuSceneRenderer, init_render_context_blocking};
use globe_scene::Scene;
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::{AppContext, AppError, FrameScheduler, InputBridge, RenderLoop};

pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// Schedules frames by asking the window for a redraw.
struct WindowScheduler<'a>(&'a Window);

impl FrameScheduler for WindowScheduler<'_> {
    fn request_frame(&mut self) {
        self.0.request_redraw();
    }
}

pub struct AppState {
    config: Config,
    bridge: InputBridge,
    render_loop: RenderLoop,
    /// Handed to the renderer on the first `resumed`.
    pending: Option<(Scene, AssetPaths)>,
    window: Option<Arc<Window>>,
    ctx: Option<AppContext>,
    keyboard: KeyboardState,
    mouse: MouseState,
    error: Option<AppError>,
}

impl AppState {
    pub fn new(config: Config, bridge: InputBridge, scene: Scene, assets: AssetPaths) -> Self {
        let render_loop = RenderLoop::new(config.debug.stats_interval);
        Self {
            config,
            bridge,
            render_loop,
            pending: Some((scene, assets)),
            window: None,
            ctx: None,
            keyboard: KeyboardState::new(),
            mouse: MouseState::new(),
            error: None,
        }
    }

    /// The startup error that ended the event loop, if any.
    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let Some((scene, assets)) = self.pending.take() else {
            return Ok(());
        };

        let window = Arc::new(event_loop.create_window(window_attributes_from_config(&self.config))?);
        let size = window.inner_size();
        info!(
            "Window created: {}x{} (scale: {:.2})",
            size.width,
            size.height,
            window.scale_factor()
        );

        let gpu = init_render_context_blocking(window.clone(), self.config.window.vsync)?;
        let renderer = WgpuSceneRenderer::new(gpu, &scene, assets);
        let mut ctx = AppContext::new(&self.config, scene, Box::new(renderer));
        ctx.resize(size.width, size.height);

        self.render_loop.start(&mut WindowScheduler(&window));
        self.ctx = Some(ctx);
        self.window = Some(window);
        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.initialize(event_loop) {
            error!("Startup failed: {e}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(window), Some(ctx)) = (self.window.as_ref(), self.ctx.as_mut()) else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => ctx.resize(size.width, size.height),
            WindowEvent::KeyboardInput { event, .. } => {
                self.keyboard.process_event(&event);
                self.bridge.handle_keyboard(&self.keyboard, ctx);
                self.keyboard.clear_transients();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::CursorEntered { .. } => self.mouse.on_cursor_entered(),
            WindowEvent::CursorLeft { .. } => self.mouse.on_cursor_left(),
            WindowEvent::MouseInput { state, button, .. } => self.mouse.on_button(button, state),
            WindowEvent::MouseWheel { delta, .. } => self.mouse.on_scroll(delta),
            WindowEvent::RedrawRequested => {
                ctx.controls.handle_input(&self.mouse);
                self.mouse.clear_transients();
                self.render_loop
                    .run_frame(&mut WindowScheduler(window), ctx);
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        let stats = self.render_loop.stats();
        info!(
            frames = stats.frames,
            skipped = stats.skipped,
            "Viewer exiting"
        );
    }
}

/// Open the window and run until it is closed.
pub fn run_windowed(
    config: Config,
    bridge: InputBridge,
    scene: Scene,
    assets: AssetPaths,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut state = AppState::new(config, bridge, scene, assets);
    event_loop.run_app(&mut state)?;
    match state.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
