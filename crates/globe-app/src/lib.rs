//! Globe viewer application: the render loop, the layer toggle bridge, and
//! the winit window that drives both.

pub mod bridge;
pub mod context;
pub mod error;
pub mod platform;
pub mod render_loop;
pub mod window;

pub use bridge::InputBridge;
pub use context::AppContext;
pub use error::AppError;
pub use platform::PlatformDirs;
pub use render_loop::{
    FixedFrameClock, FrameClock, FrameScheduler, FrameStats, LoopState, RenderLoop,
};
pub use window::{AppState, run_windowed};
