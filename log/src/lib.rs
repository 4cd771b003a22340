//! Logging setup for margin with file output and optional stderr.
//!
//! Logs always go to a file at `warn` level (or whatever the environment asks for).
//! Stderr logging is enabled when `MARGIN_LOG` or `RUST_LOG` is set, or in debug builds.
//!
//! ## Environment Variables
//!
//! 1. **`MARGIN_LOG`** (highest priority) - margin-specific logging control
//! 2. **`RUST_LOG`** - Standard tracing environment variable
//! 3. **Default** - `warn` globally, `info` for margin crates
//!
//! ## Log File Location
//!
//! Default: `<data_local_dir>/margin/logs/margin-<pid>.log`
//! - macOS: `~/Library/Application Support/margin/logs/margin-12345.log`
//! - Linux: `~/.local/share/margin/logs/margin-12345.log`
//!
//! Override with `--log-file <path>` or `MARGIN_LOG_FILE`.

use std::{
    env,
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const MARGIN_CRATES: &[&str] = &["margin", "margin_bin", "margin_log"];

/// Returned from [`init`]; must be held alive to ensure log file flushing.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

#[derive(Debug, Default)]
pub struct LogConfig {
    pub log_file_path: Option<PathBuf>,
}

/// Initialize logging.
///
/// Filters follow the priority described in the module docs:
/// `MARGIN_LOG` > `RUST_LOG` > default settings.
///
/// The returned [`LogGuard`] must be held for the lifetime of the program --
/// dropping it flushes and stops the background file writer.
pub fn init(config: LogConfig) -> Result<LogGuard, BoxError> {
    let (log_dir, filename) = resolve_log_path(config.log_file_path);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(create_file_filter());

    let stderr_enabled =
        env::var("MARGIN_LOG").is_ok() || env::var("RUST_LOG").is_ok() || cfg!(debug_assertions);

    let stderr_layer = if stderr_enabled {
        Some(fmt::layer().with_writer(std::io::stderr).with_filter(create_filter()))
    } else {
        None
    };

    Registry::default()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: log_dir.join(filename),
    })
}

/// Initialize logging for tests.
///
/// Test-writer only, no file output. Will not crash if called multiple times or if
/// logging is already initialized by another test.
pub fn test() {
    let _ = fmt()
        .with_env_filter(create_filter())
        .with_test_writer()
        .try_init();
}

/// Split the requested log location into directory and file name.
///
/// A path with an extension names the file itself; anything else is a
/// directory that receives the default per-process file name.
fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("margin-{}.log", std::process::id());
    let override_path =
        override_path.or_else(|| env::var_os("MARGIN_LOG_FILE").map(PathBuf::from));

    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(filename);
            return (dir, name);
        }
        return (path, filename);
    }

    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("margin")
        .join("logs");

    (dir, filename)
}

/// File filter: uses the user-specified level if set, otherwise `warn`.
fn create_file_filter() -> EnvFilter {
    if env::var("MARGIN_LOG").is_ok() || env::var("RUST_LOG").is_ok() {
        return create_filter();
    }
    EnvFilter::new("warn")
}

/// Create the [`EnvFilter`] for the current environment.
fn create_filter() -> EnvFilter {
    if let Ok(margin_log) = env::var("MARGIN_LOG") {
        return expand_margin_log(&margin_log);
    }

    if let Ok(rust_log) = env::var("RUST_LOG") {
        return EnvFilter::new(rust_log);
    }

    EnvFilter::new(crate_directives("info"))
}

/// Expand a `MARGIN_LOG` value into a full tracing filter string.
///
/// - `MARGIN_LOG=debug` becomes `warn,margin=debug,margin_bin=debug,...`
/// - `MARGIN_LOG=margin=trace,margin_bin=debug` is used as-is
fn expand_margin_log(margin_log: &str) -> EnvFilter {
    if margin_log.contains('=') || margin_log.contains(':') || margin_log.contains(',') {
        return EnvFilter::new(margin_log);
    }
    EnvFilter::new(crate_directives(margin_log))
}

fn crate_directives(level: &str) -> String {
    let mut directives = String::from("warn");
    for name in MARGIN_CRATES {
        directives.push_str(&format!(",{name}={level}"));
    }
    directives
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn directives_cover_every_crate() {
        assert_eq!(
            crate_directives("debug"),
            "warn,margin=debug,margin_bin=debug,margin_log=debug"
        );
    }

    #[test]
    fn file_override_with_extension() {
        let tmp_dir = tempdir().unwrap();
        let file = tmp_dir.path().join("session.log");
        let (dir, name) = resolve_log_path(Some(file));
        assert_eq!(dir, tmp_dir.path());
        assert_eq!(name, "session.log");
    }

    #[test]
    fn directory_override_gets_default_name() {
        let tmp_dir = tempdir().unwrap();
        let (dir, name) = resolve_log_path(Some(tmp_dir.path().to_path_buf()));
        assert_eq!(dir, tmp_dir.path());
        assert_eq!(name, format!("margin-{}.log", std::process::id()));
    }

    #[test]
    fn test_init_is_repeatable() {
        test();
        test();
        tracing::info!("logging initialized twice without panicking");
    }
}
