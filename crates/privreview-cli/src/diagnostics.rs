use std::backtrace::Backtrace;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static HOOK_ONCE: Once = Once::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingOptions {
    pub diagnostics: bool,
    pub interactive: bool,
    /// Level from the config file, used when `RUST_LOG` is unset.
    pub level: String,
}

/// Keeps the diagnostics writer alive; buffered lines flush on drop.
pub struct DiagnosticsSession {
    path: Option<PathBuf>,
    _guard: Option<WorkerGuard>,
}

impl DiagnosticsSession {
    pub fn initialize(config_dir: &Path, options: &LoggingOptions) -> Result<Self> {
        install_panic_hook();

        if options.diagnostics {
            return Self::to_file(config_dir, &options.level);
        }

        // Stderr belongs to the terminal UI while it runs.
        if !options.interactive {
            let _ = tracing_subscriber::registry()
                .with(env_filter("warn"))
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init();
        }

        Ok(Self {
            path: None,
            _guard: None,
        })
    }

    fn to_file(config_dir: &Path, level: &str) -> Result<Self> {
        let diagnostics_dir = config_dir.join("diagnostics");
        fs::create_dir_all(&diagnostics_dir).with_context(|| {
            format!(
                "failed to create diagnostics directory {}",
                diagnostics_dir.display()
            )
        })?;

        let file_name = format!("{}.log", epoch_millis());
        let path = diagnostics_dir.join(&file_name);
        let appender = tracing_appender::rolling::never(&diagnostics_dir, &file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        tracing_subscriber::registry()
            .with(env_filter(level))
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer),
            )
            .try_init()
            .context("failed to install diagnostics logger")?;

        let _ = LOG_PATH.set(path.clone());
        info!(
            version = env!("CARGO_PKG_VERSION"),
            pid = std::process::id(),
            argv = ?std::env::args().collect::<Vec<String>>(),
            "privreview diagnostics start"
        );

        Ok(Self {
            path: Some(path),
            _guard: Some(guard),
        })
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
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

            error!(
                panic_message = %payload,
                panic_location = %location,
                panic_backtrace = %backtrace,
                "panic captured"
            );

            eprintln!("Fatal internal error in privreview: {payload}");
            match LOG_PATH.get() {
                Some(path) => eprintln!("Diagnostics written to {}", path.display()),
                None => {
                    eprintln!("Run `privreview --diagnostics` to capture a diagnostics log.")
                }
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
