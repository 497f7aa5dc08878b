//! Mount, resize and teardown of the space view.

use renderer::{ObjectId, RenderError};

use crate::backend::RenderBackend;
use crate::clock::{self, AnimationClock};
use crate::scene::{SceneContext, SceneSettings};
use crate::scroll::{self, ScrollProgress};

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("view is already mounted")]
    AlreadyMounted,
    #[error("failed to create render backend: {0}")]
    Backend(#[source] anyhow::Error),
    /// Generation or upload failed. `cleanup` holds any disposal failures
    /// from releasing what had already been uploaded.
    #[error("failed to build scene: {source}")]
    Scene {
        #[source]
        source: RenderError,
        cleanup: Vec<RenderError>,
    },
}

/// Every disposal failure seen during one teardown.
#[derive(Debug, thiserror::Error)]
#[error("{} resource(s) failed to dispose", .failures.len())]
pub struct TeardownError {
    pub failures: Vec<RenderError>,
}

/// Cancellable repeating frame task. Once cancelled it refuses every tick.
#[derive(Debug, Default)]
pub struct FrameLoop {
    running: bool,
    ticks: u64,
}

impl FrameLoop {
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop the loop. Returns `true` only for the call that actually stopped it.
    pub fn cancel(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Claim the next tick; `false` when the loop is not running.
    pub fn try_tick(&mut self) -> bool {
        if self.running {
            self.ticks += 1;
        }
        self.running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Owns the scene context for the lifetime of one mounted view.
pub struct Viewport<B> {
    settings: SceneSettings,
    context: Option<SceneContext<B>>,
    frame_loop: FrameLoop,
    clock: AnimationClock,
    progress: ScrollProgress,
    on_ready: Option<Box<dyn FnOnce()>>,
}

impl<B: RenderBackend> Viewport<B> {
    pub fn new(settings: SceneSettings) -> Self {
        Self {
            settings,
            context: None,
            frame_loop: FrameLoop::default(),
            clock: AnimationClock::new(),
            progress: ScrollProgress::default(),
            on_ready: None,
        }
    }

    /// Register the callback fired once, after the first successful mount.
    pub fn on_ready(&mut self, callback: impl FnOnce() + 'static) {
        self.on_ready = Some(Box::new(callback));
    }

    /// Build the backend and scene, start the frame loop and signal ready.
    pub fn mount<F>(&mut self, create_backend: F, width: u32, height: u32) -> Result<(), ViewError>
    where
        F: FnOnce() -> anyhow::Result<B>,
    {
        if self.context.is_some() {
            return Err(ViewError::AlreadyMounted);
        }

        let backend = create_backend().map_err(ViewError::Backend)?;
        let mut ctx = SceneContext::new(backend, &self.settings, width, height);
        let mut rng = self.settings.rng();
        if let Err(source) = ctx.populate(&self.settings, &mut rng) {
            let cleanup = release(&mut ctx);
            return Err(ViewError::Scene { source, cleanup });
        }

        self.context = Some(ctx);
        self.clock = AnimationClock::new();
        self.frame_loop.start();
        log::info!("View mounted at {}x{}", width, height);

        if let Some(ready) = self.on_ready.take() {
            log::info!("View ready");
            ready();
        }
        Ok(())
    }

    /// Run one frame: advance the clock, animate and render. Returns `false`
    /// when the frame loop refused the tick.
    pub fn frame(&mut self) -> Result<bool, RenderError> {
        let t = self.clock.advance();
        self.frame_at(t)
    }

    /// Run one frame at an explicit time (seconds since mount).
    pub fn frame_at(&mut self, t: f32) -> Result<bool, RenderError> {
        let Some(ctx) = self.context.as_mut() else {
            return Ok(false);
        };
        if !self.frame_loop.try_tick() {
            return Ok(false);
        }
        clock::tick(ctx, t);
        ctx.render()?;
        Ok(true)
    }

    /// Map a scroll event onto the scene. Returns the new progress.
    pub fn scroll(&mut self, scroll_y: f32, document_height: f32, viewport_height: f32) -> ScrollProgress {
        let progress = ScrollProgress::from_scroll(scroll_y, document_height, viewport_height);
        if progress.section != self.progress.section {
            log::debug!("Entered section {} (progress {:.2})", progress.section, progress.progress);
        }
        self.progress = progress;
        if let Some(ctx) = self.context.as_mut() {
            scroll::apply(ctx, &progress);
        }
        progress
    }

    /// Last normalized scroll progress.
    pub fn scroll_progress(&self) -> ScrollProgress {
        self.progress
    }

    /// Propagate a new output size. Ignored before mount, after teardown and for zero sizes.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(ctx) = self.context.as_mut() {
            ctx.resize(width, height);
        }
    }

    /// Stop the frame loop, then dispose every object and the output surface.
    /// A second call is a no-op.
    pub fn unmount(&mut self) -> Result<(), TeardownError> {
        self.frame_loop.cancel();
        let Some(mut ctx) = self.context.take() else {
            return Ok(());
        };

        let failures = release(&mut ctx);
        log::info!(
            "View unmounted after {} frames ({} disposal failures)",
            self.frame_loop.ticks(),
            failures.len()
        );
        if failures.is_empty() {
            Ok(())
        } else {
            Err(TeardownError { failures })
        }
    }

    #[cfg(test)]
    pub fn context(&self) -> Option<&SceneContext<B>> {
        self.context.as_ref()
    }

    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }
}

/// Best-effort disposal of everything the context uploaded, surface last.
fn release<B: RenderBackend>(ctx: &mut SceneContext<B>) -> Vec<RenderError> {
    let ids: Vec<ObjectId> = ctx.scene.objects().iter().map(|o| o.id).collect();
    let mut failures = Vec::new();
    for id in ids {
        if let Err(e) = ctx.backend.dispose_object(id) {
            log::warn!("Failed to dispose {:?}: {}", id, e);
            failures.push(e);
        }
    }
    ctx.scene.clear();
    if let Err(e) = ctx.backend.dispose_surface() {
        log::warn!("Failed to dispose render surface: {}", e);
        failures.push(e);
    }
    failures
}
