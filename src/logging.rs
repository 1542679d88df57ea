use std::fs;
use std::path::Path;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILE: &str = "lulc_catalog.log";

/// Install the global subscriber with the default log location
pub fn init_logging() {
    init_logging_in(DEFAULT_LOG_DIR, DEFAULT_LOG_FILE);
}

/// Install a console layer on stderr plus a daily-rotated JSON file under `dir`.
///
/// stdout is left to the CLI's JSON output. `RUST_LOG` overrides the filter.
pub fn init_logging_in(dir: impl AsRef<Path>, file_name: &str) {
    let dir = dir.as_ref();
    // The console layer still works if the directory cannot be created
    let _ = fs::create_dir_all(dir);

    let (file_writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file_name));

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lulc_catalog=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();

    // Flushes pending file writes on drop; the subscriber lives for the whole process
    std::mem::forget(guard);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_logging_creates_requested_directory() {
        let root = tempdir().unwrap();
        let dir = root.path().join("nested").join("logs");

        init_logging_in(&dir, "catalog-test.log");
        tracing::info!("logging initialized for test");

        assert!(dir.is_dir());
    }
}
