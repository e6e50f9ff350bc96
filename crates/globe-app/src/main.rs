//! The `globe` binary.

use clap::Parser;
use globe_app::{AppContext, AppError, FixedFrameClock, InputBridge, PlatformDirs, RenderLoop};
use globe_config::{CliArgs, Config};
use globe_render::{HeadlessRenderer, check_assets};
use globe_scene::Scene;

fn main() {
    let args = CliArgs::parse();
    if let Err(e) = run(args) {
        tracing::error!("{e}");
        eprintln!("globe: {e}");
        std::process::exit(1);
    }
}

fn run(args: CliArgs) -> Result<(), AppError> {
    let dirs = PlatformDirs::resolve(args.config.as_deref())?;
    dirs.create_dirs()?;

    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(&args);
    globe_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    config.validate()?;
    tracing::info!(config_dir = %dirs.config_dir.display(), "Starting globe viewer");

    let bridge = InputBridge::from_config(&config.controls)?;
    let scene = Scene::from_config(&config);

    if let Some(frames) = args.headless_frames {
        let mut ctx = AppContext::new(&config, scene, Box::new(HeadlessRenderer::new()));
        let stats = RenderLoop::new(config.debug.stats_interval)
            .run(&mut FixedFrameClock::new(frames), &mut ctx);
        tracing::info!(
            frames = stats.frames,
            attached = ctx.scene.body.attached_layers().count(),
            "Headless run finished"
        );
        return Ok(());
    }

    let assets = check_assets(&config.assets)?;
    globe_app::run_windowed(config, bridge, scene, assets)
}
