//! Command-line argument parsing for the globe viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Globe viewer command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "globe", about = "Interactive layered globe viewer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Directory containing the texture images.
    #[arg(long)]
    pub textures: Option<PathBuf>,

    /// Number of stars in the backdrop.
    #[arg(long)]
    pub stars: Option<u32>,

    /// Per-frame layer rotation in radians.
    #[arg(long)]
    pub animation_rate: Option<f32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Run this many frames without a window, then exit.
    #[arg(long)]
    pub headless_frames: Option<u64>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(ref dir) = args.textures {
            self.assets.texture_dir = dir.clone();
        }
        if let Some(count) = args.stars {
            self.starfield.count = count;
        }
        if let Some(rate) = args.animation_rate {
            self.globe.animation_rate = rate;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
