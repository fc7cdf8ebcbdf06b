use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use board_core::settings::Settings;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the data directory hierarchy exists.
///
/// Creates the data directory with its `logs/` and `headlines/`
/// subdirectories if absent.
pub fn ensure_directories(settings: &Settings) -> anyhow::Result<()> {
    for dir in [
        settings.resolve_data_dir(),
        settings.logs_dir(),
        settings.headlines_dir(),
    ] {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating directory {}", dir.display()))?;
    }
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a Python-style level name onto a tracing filter directive.
fn normalise_level(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to stderr, and additionally to `log_file` (appending, no
/// colours) when one is given. Unrecognised levels fall back to `"info"`.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(normalise_level(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn settings_in(data_dir: &std::path::Path) -> Settings {
        let dir = data_dir.to_str().unwrap().to_string();
        Settings::parse_from(["batchboard", "--data-dir", &dir, "report", "history"])
    }

    #[test]
    fn test_ensure_directories() {
        let tmp = TempDir::new().expect("tempdir");
        let data_dir = tmp.path().join(".batchboard");

        ensure_directories(&settings_in(&data_dir)).expect("ensure_directories should succeed");

        assert!(data_dir.is_dir(), "data dir must exist");
        assert!(data_dir.join("logs").is_dir(), "logs subdir must exist");
        assert!(
            data_dir.join("headlines").is_dir(),
            "headlines subdir must exist"
        );
    }

    #[test]
    fn test_ensure_directories_is_idempotent() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = settings_in(tmp.path());
        ensure_directories(&settings).unwrap();
        ensure_directories(&settings).unwrap();
        assert!(tmp.path().join("logs").is_dir());
    }

    #[test]
    fn test_normalise_level() {
        assert_eq!(normalise_level("DEBUG"), "debug");
        assert_eq!(normalise_level("info"), "info");
        assert_eq!(normalise_level("WARNING"), "warn");
        assert_eq!(normalise_level("CRITICAL"), "error");
        assert_eq!(normalise_level("trace"), "trace");
    }
}
