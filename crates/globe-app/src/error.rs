//! Startup failures. Each one ends the process with status 1.

use globe_config::ConfigError;
use globe_input::ControlError;
use globe_render::{AssetError, RenderContextError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("controls: {0}")]
    Controls(#[from] ControlError),

    #[error("assets: {0}")]
    Asset(#[from] AssetError),

    #[error("GPU: {0}")]
    RenderContext(#[from] RenderContextError),

    #[error("failed to create directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
}
