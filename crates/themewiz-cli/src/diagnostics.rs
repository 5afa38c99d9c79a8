use std::backtrace::Backtrace;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_ENV: &str = "THEMEWIZ_LOG";

static HOOK_ONCE: Once = Once::new();
static LOG_PATH: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Logging for one CLI run: stderr filtered by `THEMEWIZ_LOG`, plus a debug
/// log file when diagnostics are enabled.
pub struct DiagnosticsSession {
    path: Option<PathBuf>,
}

impl DiagnosticsSession {
    pub fn initialize(enabled: bool) -> Result<Self> {
        let log_file = if enabled {
            let path = create_diagnostics_log_path()?;
            let file = open_log_file(&path)?;
            Some((path, file))
        } else {
            None
        };

        let path = log_file.as_ref().map(|(path, _)| path.clone());
        let _ = LOG_PATH.set(path.clone());

        let stderr_filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(stderr_filter);
        let file_layer = log_file.map(|(_, file)| {
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(LevelFilter::DEBUG)
        });

        tracing_subscriber::registry()
            .with(stderr_layer)
            .with(file_layer)
            .try_init()
            .map_err(|error| anyhow!("failed to install log subscriber: {error}"))?;

        install_panic_hook();
        tracing::debug!(
            version = env!("CARGO_PKG_VERSION"),
            argv = ?std::env::args().collect::<Vec<String>>(),
            "themewiz started"
        );

        Ok(Self { path })
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    let mut file = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)
        .with_context(|| format!("failed to create diagnostics log at {}", path.display()))?;

    writeln!(
        file,
        "themewiz diagnostics start\nversion={}\nstart_epoch_ms={}\npid={}",
        env!("CARGO_PKG_VERSION"),
        epoch_millis(),
        std::process::id()
    )
    .with_context(|| format!("failed to write diagnostics header to {}", path.display()))?;

    Ok(file)
}

fn install_panic_hook() {
    HOOK_ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|panic_info| {
            let payload = panic_payload(panic_info);
            let location = panic_info
                .location()
                .map(|value| format!("{}:{}:{}", value.file(), value.line(), value.column()))
                .unwrap_or_else(|| "unknown".to_string());
            let backtrace = Backtrace::force_capture();

            tracing::error!(
                payload = %payload,
                location = %location,
                backtrace = ?backtrace,
                "panic captured"
            );

            eprintln!("Fatal internal error in themewiz.");
            match LOG_PATH.get().and_then(Option::as_ref) {
                Some(path) => eprintln!("Diagnostics written to {}", path.display()),
                None => eprintln!("Run `themewiz --diagnostics` to capture a diagnostics log."),
            }
        }));
    });
}

fn panic_payload(panic_info: &std::panic::PanicHookInfo<'_>) -> String {
    if let Some(payload) = panic_info.payload().downcast_ref::<&str>() {
        return (*payload).to_string();
    }
    if let Some(payload) = panic_info.payload().downcast_ref::<String>() {
        return payload.clone();
    }
    "unknown panic payload".to_string()
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

fn create_diagnostics_log_path() -> Result<PathBuf> {
    let config_path = themewiz_core::config::resolve_config_path()
        .context("failed to resolve themewiz config path for diagnostics")?;
    let config_dir = config_path.parent().ok_or_else(|| {
        anyhow!(
            "failed to resolve diagnostics directory from config path {}",
            config_path.display()
        )
    })?;

    let diagnostics_dir = config_dir.join("diagnostics");
    fs::create_dir_all(&diagnostics_dir).with_context(|| {
        format!(
            "failed to create diagnostics directory {}",
            diagnostics_dir.display()
        )
    })?;

    Ok(diagnostics_dir.join(format!("{}.log", epoch_millis())))
}
