//! Starscape - scroll-driven procedural space scene

mod backend;
mod clock;
mod config;
mod events;
mod lifecycle;
mod scene;
mod scroll;

use anyhow::Result;
use lifecycle::Viewport;
use renderer::Renderer;
use scroll::ScrollContainer;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// Everything alive while the window is open.
pub struct ViewerState {
    window: Arc<Window>,
    viewport: Viewport<Renderer>,
    page: ScrollContainer,
    title: String,
}

impl ViewerState {
    fn new(window: Arc<Window>, config: &config::ViewConfig) -> Result<Self> {
        let size = window.inner_size();
        let mut viewport = Viewport::new(config.scene_settings());

        let ready = Rc::new(Cell::new(false));
        let flag = ready.clone();
        viewport.on_ready(move || flag.set(true));

        let renderer_settings = config.renderer_settings();
        let backend_window = window.clone();
        viewport.mount(
            move || pollster::block_on(Renderer::new(backend_window, renderer_settings)),
            size.width,
            size.height,
        )?;

        if ready.get() {
            window.set_visible(true);
        }

        let mut state = Self {
            window,
            viewport,
            page: ScrollContainer::new(size.height as f32),
            title: config.title.clone(),
        };
        // Pick up the initial scroll position before the first frame.
        state.sync_scroll();
        Ok(state)
    }

    /// Push the page's scroll position through the mapper and show progress in the title.
    pub(crate) fn sync_scroll(&mut self) {
        self.viewport.scroll(
            self.page.offset(),
            self.page.document_height(),
            self.page.viewport_height(),
        );
        let progress = self.viewport.scroll_progress();
        self.window
            .set_title(&format!("{} - {:.0}%", self.title, progress.progress * 100.0));
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.viewport.unmount() {
            log::warn!("Teardown incomplete: {}", e);
            for failure in &e.failures {
                log::warn!("  {}", failure);
            }
        }
    }
}

/// Application handler for winit.
struct App {
    state: Option<ViewerState>,
}

impl App {
    fn new() -> Self {
        Self { state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_none() {
            let config = config::ViewConfig::load();
            if !config::config_path().exists() {
                config.save();
            }
            // Hidden until the scene is ready.
            let window_attrs = Window::default_attributes()
                .with_title(config.title.clone())
                .with_visible(false)
                .with_inner_size(winit::dpi::LogicalSize::new(config.window_width, config.window_height));

            let window = match event_loop.create_window(window_attrs) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            match ViewerState::new(window.clone(), &config) {
                Ok(s) => {
                    self.state = Some(s);
                    window.request_redraw();
                }
                Err(e) => {
                    log::error!("Failed to initialize view: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) {
                event_loop.exit();
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut state) = self.state.take() {
            state.shutdown();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Starscape");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
