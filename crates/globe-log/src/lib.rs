//! Structured logging for the globe viewer.
//!
//! Installs a `tracing` subscriber with console output (uptime, module path,
//! level), plus a JSON log file in debug builds. The filter comes from
//! `RUST_LOG` when set, otherwise from the config's `debug.log_level`.

use globe_config::Config;
use std::path::Path;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// File name of the JSON log written in debug builds.
pub const LOG_FILE_NAME: &str = "globe.log";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - whether to also write the JSON log file
/// * `config` - optional configuration supplying the log level
///
/// Calling this more than once is harmless: later calls keep the first
/// subscriber.
///
/// ```no_run
/// use globe_log::init_logging;
/// use globe_config::Config;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = filter_string(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true) // the texture loader thread is named
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let _ = subscriber.with(json_file_layer(log_file)).try_init();
        return;
    }

    let _ = subscriber.try_init();
}

/// One JSON object per event, written to `file`.
fn json_file_layer<S>(file: std::fs::File) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::uptime())
        .json()
}

/// The filter directive string for the given config.
///
/// A bare level from the config (e.g. `debug`) keeps the wgpu/naga noise
/// suppression; a full directive list is used as-is.
pub fn filter_string(config: Option<&Config>) -> String {
    match config.map(|c| c.debug.log_level.trim()) {
        Some(level) if !level.is_empty() && !level.contains(['=', ',']) => {
            format!("{level},wgpu=warn,naga=warn")
        }
        Some(directives) if !directives.is_empty() => directives.to_string(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Create an `EnvFilter` with the default filter string.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
