//! The per-frame update and draw cycle.
//!
//! Each cycle runs four steps in a fixed order: request the next cycle,
//! advance the body's animation, draw, then step the orbit controls. A draw
//! failure is logged and counted as a skipped frame; the loop keeps going.
//!
//! The windowed app calls [`RenderLoop::run_frame`] from `RedrawRequested`
//! with the window as scheduler. [`RenderLoop::run`] drives the same cycle
//! from a [`FrameClock`] until the clock stops, for headless runs and tests.

use tracing::{debug, info, warn};

use crate::AppContext;

/// Something that can be asked for another frame.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// A scheduler that also decides when the next requested frame happens.
pub trait FrameClock: FrameScheduler {
    /// Block until the next frame is due. Returns `false` to stop.
    fn wait_for_frame(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames started, drawn or not.
    pub frames: u64,
    /// Frames whose draw failed.
    pub skipped: u64,
}

impl FrameStats {
    pub fn drawn(&self) -> u64 {
        self.frames - self.skipped
    }
}

pub struct RenderLoop {
    state: LoopState,
    stats: FrameStats,
    /// Log stats every this many frames; 0 disables.
    stats_interval: u64,
}

impl RenderLoop {
    pub fn new(stats_interval: u64) -> Self {
        Self {
            state: LoopState::Idle,
            stats: FrameStats::default(),
            stats_interval,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Leave `Idle` and request the first frame. Later calls do nothing.
    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if self.state == LoopState::Running {
            return;
        }
        self.state = LoopState::Running;
        info!("Render loop started");
        scheduler.request_frame();
    }

    /// Run one cycle. Returns whether the frame was drawn. An idle loop
    /// draws nothing.
    pub fn run_frame<S: FrameScheduler + ?Sized>(
        &mut self,
        scheduler: &mut S,
        ctx: &mut AppContext,
    ) -> bool {
        if self.state == LoopState::Idle {
            debug!("Frame requested before the render loop started");
            return false;
        }

        scheduler.request_frame();
        ctx.scene.body.animate();
        let drawn = match ctx.renderer.render(&ctx.scene, &ctx.camera) {
            Ok(()) => true,
            Err(e) => {
                warn!(frame = self.stats.frames, error = %e, "Skipping frame");
                self.stats.skipped += 1;
                false
            }
        };
        ctx.controls.update(&mut ctx.camera);

        self.stats.frames += 1;
        if self.stats_interval > 0 && self.stats.frames % self.stats_interval == 0 {
            info!(
                frames = self.stats.frames,
                skipped = self.stats.skipped,
                "Render loop stats"
            );
        }
        drawn
    }

    /// Start if needed, then run cycles until the clock stops.
    pub fn run<C: FrameClock + ?Sized>(
        &mut self,
        clock: &mut C,
        ctx: &mut AppContext,
    ) -> FrameStats {
        self.start(clock);
        while clock.wait_for_frame() {
            self.run_frame(clock, ctx);
        }
        info!(
            frames = self.stats.frames,
            skipped = self.stats.skipped,
            "Render loop stopped"
        );
        self.stats
    }
}

/// Runs a fixed number of frames back to back.
///
/// A frame only happens if the previous one requested it, so a cycle that
/// forgets to schedule ends the run.
#[derive(Debug)]
pub struct FixedFrameClock {
    remaining: u64,
    requested: bool,
    requests: u64,
}

impl FixedFrameClock {
    pub fn new(frames: u64) -> Self {
        Self {
            remaining: frames,
            requested: false,
            requests: 0,
        }
    }

    /// Total `request_frame` calls seen.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

impl FrameScheduler for FixedFrameClock {
    fn request_frame(&mut self) {
        self.requested = true;
        self.requests += 1;
    }
}

impl FrameClock for FixedFrameClock {
    fn wait_for_frame(&mut self) -> bool {
        if self.remaining == 0 || !self.requested {
            return false;
        }
        self.requested = false;
        self.remaining -= 1;
        true
    }
}
