//! Configuration system for the globe viewer.
//!
//! Settings persist to disk as a RON file, accept CLI overrides via clap, and
//! deserialize forward/backward compatibly (missing fields take defaults).

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AssetConfig, CameraConfig, Config, ControlConfig, DebugConfig, GlobeConfig, StarfieldConfig,
    WindowConfig, MAX_GLOBE_DETAIL,
};
pub use error::ConfigError;
